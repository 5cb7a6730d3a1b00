use std::fmt;
use serde::{Serialize, Deserialize};

use crate::ModelError;

/// Sensitive (`s`) and resistant (`r`) cell counts at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct State {
    pub s: f64,
    pub r: f64,
}

impl State {
    pub fn new(s: f64, r: f64) -> Self {
        Self { s, r }
    }

    /// Total number of cells.
    pub fn total(&self) -> f64 {
        self.s + self.r
    }

    pub fn is_finite(&self) -> bool {
        self.s.is_finite() && self.r.is_finite()
    }

    /// Initial conditions have to be biologically meaningful. Later states
    /// produced by an integrator are not checked here.
    pub fn validate_initial(&self) -> Result<(), ModelError> {
        for (component, value) in [("s", self.s), ("r", self.r)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::InvalidState { component, value });
            }
        }
        Ok(())
    }
}

impl From<(f64, f64)> for State {
    fn from((s, r): (f64, f64)) -> Self {
        Self { s, r }
    }
}

impl From<State> for (f64, f64) {
    fn from(state: State) -> Self {
        (state.s, state.r)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S0={}, R0={}", format_count(self.s), format_count(self.r))
    }
}

/// Short label for a cell count: thousands are written as `12.3k`.
pub fn format_count(x: f64) -> String {
    if x >= 1000.0 {
        format!("{:.1}k", x / 1000.0)
    } else {
        format!("{}", x)
    }
}
