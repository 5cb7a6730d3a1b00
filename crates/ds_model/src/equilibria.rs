use std::fmt;
use log::debug;
use serde::{Serialize, Deserialize};

use crate::Parameters;
use crate::State;
use crate::format_count;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquilibriumKind {
    Extinction,
    ResistantOnly,
    SensitiveOnly,
    Coexistence,
}

/// A fixed point of the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equilibrium {
    pub kind: EquilibriumKind,
    pub state: State,
}

impl fmt::Display for Equilibrium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", format_count(self.state.s), format_count(self.state.r))
    }
}

/// All biologically meaningful (non-negative) fixed points.
///
/// Without drug the sensitive-only point is (K, 0); the drug moves it to
/// K(1 - alpha C / rho) and removes it once alpha C >= rho.
pub fn equilibria(p: &Parameters) -> Vec<Equilibrium> {
    let mut points = vec![Equilibrium {
        kind: EquilibriumKind::Extinction,
        state: State::new(0.0, 0.0),
    }];

    if p.m() > 0.0 {
        points.push(Equilibrium {
            kind: EquilibriumKind::ResistantOnly,
            state: State::new(0.0, p.k() / p.m()),
        });
    }

    let kill = p.alpha() * p.conc() / p.rho();
    if kill < 1.0 {
        points.push(Equilibrium {
            kind: EquilibriumKind::SensitiveOnly,
            state: State::new(p.k() * (1.0 - kill), 0.0),
        });
    }

    if p.beta() > 0.0 && p.m() > 0.0 {
        // growth term equals alpha C for s and beta s/K for r
        let s = p.alpha() * p.conc() * p.k() / p.beta();
        let r = (p.k() * (1.0 - kill) - s) / p.m();
        if s > 0.0 && r > 0.0 {
            points.push(Equilibrium {
                kind: EquilibriumKind::Coexistence,
                state: State::new(s, r),
            });
        } else {
            debug!("No coexistence equilibrium (s* = {}, r* = {})", s, r);
        }
    }
    points
}
