use crate::Parameters;
use crate::State;

/// Right-hand side of the sensitive/resistant model:
///
/// ```text
/// s' = rho (1 - (s + m r)/K) s - alpha C s
/// r' = rho (1 - (s + m r)/K) r - beta (s/K) r
/// ```
///
/// The system is autonomous, `t` is accepted so that integrators can call it
/// like any other right-hand side. Any finite state is allowed, including the
/// slightly negative values an integrator may evaluate.
#[inline]
pub fn derivative(_t: f64, state: &State, p: &Parameters) -> (f64, f64) {
    let State { s, r } = *state;
    let growth = p.rho() * (1.0 - (s + p.m() * r) / p.k());
    let ds = growth * s - p.alpha() * p.conc() * s;
    let dr = growth * r - p.beta() * (s / p.k()) * r;
    (ds, dr)
}
