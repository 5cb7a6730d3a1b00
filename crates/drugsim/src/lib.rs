//! # drugsim
//!
//! Command line front-end for the sensitive/resistant cell model.
//!
//! This crate re-exports the model and simulation crates and provides the
//! argument groups and input parsers shared by the `ds-*` binaries.

pub mod input_parsers;
pub mod model_parsers;
pub mod simulation_parsers;
pub mod report;

pub mod model {
    pub use ::ds_model::*;
}

pub mod dynamics {
    pub use ::ds_dynamics::*;
}

use std::io::Write;
use env_logger::Builder;

/// Message-only logging on stderr; `verbosity` counts `-v` flags.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            // no prefix, just the message
            writeln!(buf, "{}", record.args())
        })
        .init();
}
