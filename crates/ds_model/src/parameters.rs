use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};

use crate::ModelError;

/// Names of the six model parameters, as used on the command line and in
/// sweep labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterName {
    Rho,
    M,
    K,
    Alpha,
    Beta,
    C,
}

impl ParameterName {
    pub const ALL: [ParameterName; 6] = [
        ParameterName::Rho,
        ParameterName::M,
        ParameterName::K,
        ParameterName::Alpha,
        ParameterName::Beta,
        ParameterName::C,
    ];
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParameterName::Rho => "rho",
            ParameterName::M => "m",
            ParameterName::K => "K",
            ParameterName::Alpha => "alpha",
            ParameterName::Beta => "beta",
            ParameterName::C => "C",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ParameterName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "rho" | "ρ" => Ok(ParameterName::Rho),
            "m" => Ok(ParameterName::M),
            "K" | "k" => Ok(ParameterName::K),
            "alpha" | "α" => Ok(ParameterName::Alpha),
            "beta" | "β" => Ok(ParameterName::Beta),
            "C" | "c" | "conc" => Ok(ParameterName::C),
            other => Err(ModelError::UnknownParameter(other.to_string())),
        }
    }
}

/// Unvalidated parameter record, e.g. straight from a JSON file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterValues {
    pub rho: f64,
    pub m: f64,
    pub k: f64,
    pub alpha: f64,
    pub beta: f64,
    pub c: f64,
}

/// Validated model parameters.
///
/// The fields are private: every constructor checks the domains, so a
/// `Parameters` value always has K > 0 and finite, non-negative coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParameterValues", into = "ParameterValues")]
pub struct Parameters {
    rho: f64,
    m: f64,
    k: f64,
    alpha: f64,
    beta: f64,
    c: f64,
}

fn check(name: ParameterName, value: f64, strictly_positive: bool) -> Result<f64, ModelError> {
    let ok = value.is_finite() && if strictly_positive { value > 0.0 } else { value >= 0.0 };
    if ok {
        Ok(value)
    } else {
        Err(ModelError::InvalidParameter {
            name,
            value,
            requirement: if strictly_positive { "positive" } else { "non-negative" },
        })
    }
}

impl Parameters {
    /// Build a parameter set, rejecting any value outside its domain.
    pub fn new(rho: f64, m: f64, k: f64, alpha: f64, beta: f64, c: f64) -> Result<Self, ModelError> {
        Ok(Self {
            rho: check(ParameterName::Rho, rho, true)?,
            m: check(ParameterName::M, m, false)?,
            k: check(ParameterName::K, k, true)?,
            alpha: check(ParameterName::Alpha, alpha, false)?,
            beta: check(ParameterName::Beta, beta, false)?,
            c: check(ParameterName::C, c, false)?,
        })
    }

    pub fn rho(&self) -> f64 { self.rho }
    pub fn m(&self) -> f64 { self.m }
    pub fn k(&self) -> f64 { self.k }
    pub fn alpha(&self) -> f64 { self.alpha }
    pub fn beta(&self) -> f64 { self.beta }
    pub fn conc(&self) -> f64 { self.c }

    pub fn get(&self, name: ParameterName) -> f64 {
        match name {
            ParameterName::Rho => self.rho,
            ParameterName::M => self.m,
            ParameterName::K => self.k,
            ParameterName::Alpha => self.alpha,
            ParameterName::Beta => self.beta,
            ParameterName::C => self.c,
        }
    }

    /// Return a copy with one parameter replaced. The result is re-validated.
    pub fn with(&self, name: ParameterName, value: f64) -> Result<Self, ModelError> {
        let mut values = self.values();
        match name {
            ParameterName::Rho => values.rho = value,
            ParameterName::M => values.m = value,
            ParameterName::K => values.k = value,
            ParameterName::Alpha => values.alpha = value,
            ParameterName::Beta => values.beta = value,
            ParameterName::C => values.c = value,
        }
        Self::try_from(values)
    }

    pub fn values(&self) -> ParameterValues {
        ParameterValues {
            rho: self.rho,
            m: self.m,
            k: self.k,
            alpha: self.alpha,
            beta: self.beta,
            c: self.c,
        }
    }
}

/// Values of the in-vitro experiment: K is a Petri dish capacity in cells,
/// rates are per hour and C is in nM.
impl Default for Parameters {
    fn default() -> Self {
        let k = 4.8e6;
        Self {
            rho: 0.031,
            m: 30.0,
            k,
            alpha: 0.06,
            beta: k * 6.25e-7,
            c: 0.9,
        }
    }
}

impl TryFrom<ParameterValues> for Parameters {
    type Error = ModelError;

    fn try_from(v: ParameterValues) -> Result<Self, Self::Error> {
        Parameters::new(v.rho, v.m, v.k, v.alpha, v.beta, v.c)
    }
}

impl From<Parameters> for ParameterValues {
    fn from(p: Parameters) -> Self {
        p.values()
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rho={} m={} K={} alpha={} beta={} C={}",
            self.rho, self.m, self.k, self.alpha, self.beta, self.c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let p = Parameters::default();
        assert!(Parameters::try_from(p.values()).is_ok());
        assert!((p.beta() - 3.0).abs() < 1e-12);
        assert_eq!(p.k(), 4.8e6);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let err = Parameters::new(0.5, 1.0, 0.0, 0.1, 0.05, 1.0).unwrap_err();
        assert_eq!(err, ModelError::InvalidParameter {
            name: ParameterName::K,
            value: 0.0,
            requirement: "positive",
        });
        assert!(err.to_string().contains("K must be positive"));
    }

    #[test]
    fn test_domains() {
        assert!(Parameters::new(0.0, 1.0, 100.0, 0.1, 0.05, 1.0).is_err()); // rho
        assert!(Parameters::new(0.5, -1.0, 100.0, 0.1, 0.05, 1.0).is_err()); // m
        assert!(Parameters::new(0.5, 1.0, -5.0, 0.1, 0.05, 1.0).is_err()); // K
        assert!(Parameters::new(0.5, 1.0, 100.0, -0.1, 0.05, 1.0).is_err()); // alpha
        assert!(Parameters::new(0.5, 1.0, 100.0, 0.1, f64::NAN, 1.0).is_err()); // beta
        assert!(Parameters::new(0.5, 1.0, 100.0, 0.1, 0.05, f64::INFINITY).is_err()); // C

        // zero is allowed everywhere except rho and K
        assert!(Parameters::new(0.5, 0.0, 100.0, 0.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn test_error_names_offending_parameter() {
        let err = Parameters::new(0.5, 1.0, 100.0, 0.1, -0.05, 1.0).unwrap_err();
        assert!(err.to_string().contains("beta"), "{}", err);
        let err = Parameters::new(0.5, 1.0, 100.0, 0.1, 0.05, -2.0).unwrap_err();
        assert!(err.to_string().contains("parameter C"), "{}", err);
    }

    #[test]
    fn test_with_replaces_and_validates() {
        let p = Parameters::new(0.5, 1.0, 100.0, 0.1, 0.05, 1.0).unwrap();
        let q = p.with(ParameterName::C, 2.5).unwrap();
        assert_eq!(q.conc(), 2.5);
        assert_eq!(q.rho(), p.rho());
        assert_eq!(p.conc(), 1.0);
        assert!(p.with(ParameterName::K, 0.0).is_err());
    }

    #[test]
    fn test_parameter_names() {
        for name in ParameterName::ALL {
            let parsed: ParameterName = name.to_string().parse().unwrap();
            assert_eq!(parsed, name);
        }
        assert_eq!("conc".parse::<ParameterName>().unwrap(), ParameterName::C);
        assert!("gamma".parse::<ParameterName>().is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok = r#"{"rho":0.5,"m":1.0,"k":100.0,"alpha":0.1,"beta":0.05,"c":1.0}"#;
        let p: Parameters = serde_json::from_str(ok).unwrap();
        assert_eq!(p.k(), 100.0);

        let bad = r#"{"rho":0.5,"m":1.0,"k":0.0,"alpha":0.1,"beta":0.05,"c":1.0}"#;
        let err = serde_json::from_str::<Parameters>(bad).unwrap_err();
        assert!(err.to_string().contains("K must be positive"));
    }
}
