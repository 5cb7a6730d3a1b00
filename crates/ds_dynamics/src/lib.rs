pub mod ode;
pub mod views;
pub mod sweep;
pub mod trajectory_io;
pub mod trajectory_plotting;

mod simulation;
mod trajectory;

pub use simulation::*;
pub use trajectory::*;
