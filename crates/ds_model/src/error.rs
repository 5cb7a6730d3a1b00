use std::fmt;

use crate::ParameterName;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A parameter is outside of its domain, e.g. K <= 0.
    InvalidParameter {
        name: ParameterName,
        value: f64,
        requirement: &'static str,
    },
    /// An initial state component is negative or not finite.
    InvalidState {
        component: &'static str,
        value: f64,
    },
    /// A parameter name that does not exist (CLI/JSON input).
    UnknownParameter(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidParameter { name, value, requirement } => {
                write!(f, "parameter {} must be {} (got {})", name, requirement, value)
            }
            ModelError::InvalidState { component, value } => {
                write!(f, "initial {} must be finite and non-negative (got {})", component, value)
            }
            ModelError::UnknownParameter(name) => {
                write!(f, "unknown parameter '{}' (expected one of: rho, m, K, alpha, beta, C)", name)
            }
        }
    }
}

impl std::error::Error for ModelError {}

