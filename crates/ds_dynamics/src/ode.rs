//! Fixed-grid sampling on top of the `ode_solvers` Dormand–Prince 5(4)
//! integrator.
//!
//! The stepper chooses its own steps under local error control and emits
//! dense output every `dx`; this module matches that output to the caller's
//! evenly spaced grid and turns solver failures into [`OdeError`].

use std::fmt;
use ode_solvers::dop_shared::{IntegrationError, Stats};
use ode_solvers::{Dopri5, System, Vector2};

/// State vector of a two-variable system.
pub type Vector = Vector2<f64>;

#[derive(Debug, Clone, PartialEq)]
pub enum OdeError {
    /// Grid or initial values not usable.
    InvalidInput(String),
    /// The controller asked for a step too small to make progress.
    StepSizeUnderflow { t: f64 },
    /// The problem became stiff and the explicit method gave up.
    Stiff { t: f64 },
    /// The system produced NaN or infinite values.
    NonFinite { t: f64 },
    /// Step budget exhausted before reaching the end of the grid.
    MaxStepsExceeded { t: f64 },
}

impl fmt::Display for OdeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid solver input: {}", msg),
            Self::StepSizeUnderflow { t } => write!(f, "step size underflow at t = {}", t),
            Self::Stiff { t } => write!(f, "problem became stiff at t = {}", t),
            Self::NonFinite { t } => write!(f, "non-finite values produced at t = {}", t),
            Self::MaxStepsExceeded { t } => write!(f, "step limit exceeded at t = {}", t),
        }
    }
}

impl std::error::Error for OdeError {}

impl From<IntegrationError> for OdeError {
    fn from(e: IntegrationError) -> Self {
        match e {
            IntegrationError::MaxNumStepReached { x, .. } => Self::MaxStepsExceeded { t: x },
            IntegrationError::StepSizeUnderflow { x, .. } => Self::StepSizeUnderflow { t: x },
            IntegrationError::StiffnessDetected { x, .. } => Self::Stiff { t: x },
        }
    }
}

/// Solver tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdeOptions {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for OdeOptions {
    fn default() -> Self {
        Self { rtol: 1e-6, atol: 1e-6 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OdeStats {
    pub accepted: usize,
    pub rejected: usize,
    pub rhs_evals: usize,
}

impl From<Stats> for OdeStats {
    fn from(s: Stats) -> Self {
        Self {
            accepted: s.accepted_steps as usize,
            rejected: s.rejected_steps as usize,
            rhs_evals: s.num_eval as usize,
        }
    }
}

/// Solution sampled on the requested grid.
#[derive(Debug, Clone)]
pub struct OdeSolution {
    pub t: Vec<f64>,
    pub y: Vec<Vector>,
    pub stats: OdeStats,
}

fn is_finite(v: &Vector) -> bool {
    v.iter().all(|x| x.is_finite())
}

fn validate_grid(grid: &[f64]) -> Result<(), OdeError> {
    if grid.len() < 2 {
        return Err(OdeError::InvalidInput("need at least 2 grid points".into()));
    }
    if grid.iter().any(|t| !t.is_finite()) {
        return Err(OdeError::InvalidInput("output grid contains non-finite times".into()));
    }
    if grid.windows(2).any(|w| w[1] <= w[0]) {
        return Err(OdeError::InvalidInput("output grid must be strictly increasing".into()));
    }
    Ok(())
}

/// Integrate `system` from `grid[0]` and return the solution at every time
/// of the evenly spaced `grid`. The first sample is `y0` itself and the
/// sample times are the grid times, not the stepper's accumulated ones.
pub fn dopri5_on_grid<S>(
    system: S,
    y0: Vector,
    grid: &[f64],
    opts: &OdeOptions,
) -> Result<OdeSolution, OdeError>
where
    S: System<f64, Vector>,
{
    validate_grid(grid)?;
    let t0 = grid[0];
    let t1 = grid[grid.len() - 1];
    if !is_finite(&y0) {
        return Err(OdeError::InvalidInput("initial values must be finite".into()));
    }

    let mut dy = Vector::zeros();
    system.system(t0, &y0, &mut dy);
    if !is_finite(&dy) {
        return Err(OdeError::NonFinite { t: t0 });
    }

    let dx = (t1 - t0) / (grid.len() - 1) as f64;
    // Dense output times are accumulated, so the point at t1 may land a
    // rounding error past it. Half a step of slack keeps it in range.
    let mut stepper = Dopri5::new(system, t0, t1 + 0.5 * dx, dx, y0, opts.rtol, opts.atol);
    let stats = OdeStats::from(stepper.integrate()?);

    let tol = 1e-6 * dx;
    let mut outputs = stepper.x_out().iter()
        .zip(stepper.y_out())
        .filter(|(x, _)| **x > t0 + tol);

    let mut t = Vec::with_capacity(grid.len());
    let mut y = Vec::with_capacity(grid.len());
    t.push(t0);
    y.push(y0);

    for &tg in &grid[1..] {
        let (x, yx) = outputs.next().ok_or_else(|| OdeError::InvalidInput(
            format!("no solver output for t = {}", tg)))?;
        if (x - tg).abs() > tol {
            return Err(OdeError::InvalidInput(format!(
                "solver output at t = {} does not match grid time {}", x, tg)));
        }
        if !is_finite(yx) {
            return Err(OdeError::NonFinite { t: tg });
        }
        t.push(tg);
        y.push(*yx);
    }

    Ok(OdeSolution { t, y, stats })
}
