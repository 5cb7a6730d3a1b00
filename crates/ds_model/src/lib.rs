/// Errors raised while validating model inputs.
mod error;

/// The six model parameters and their domains.
mod parameters;

/// Cell counts (s, r).
mod state;

/// The right-hand side of the ODE system.
mod derivative;

/// Fixed points of the model.
mod equilibria;

pub use error::*;
pub use parameters::*;
pub use state::*;
pub use derivative::*;
pub use equilibria::*;

