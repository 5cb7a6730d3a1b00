use std::fmt;
use std::error::Error;
use log::{debug, warn};
use serde::{Serialize, Deserialize};

use ds_model::ModelError;
use ds_model::Parameters;
use ds_model::State;
use ds_model::derivative;

use ode_solvers::System;

use crate::ode::{dopri5_on_grid, OdeError, OdeOptions, Vector};
use crate::trajectory::{Sample, Trajectory};

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Parameters or initial state outside of their domain.
    InvalidInput(ModelError),
    /// Empty or reversed time span, or fewer than two output points.
    DegenerateScenario(String),
    /// The integrator could not complete the run.
    Integration(OdeError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(e) => write!(f, "{}", e),
            Self::DegenerateScenario(msg) => write!(f, "degenerate scenario: {}", msg),
            Self::Integration(e) => write!(f, "integration did not converge: {}", e),
        }
    }
}

impl Error for SimulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(e) => Some(e),
            Self::Integration(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ModelError> for SimulationError {
    fn from(e: ModelError) -> Self { Self::InvalidInput(e) }
}

impl From<OdeError> for SimulationError {
    fn from(e: OdeError) -> Self { Self::Integration(e) }
}

/// Closed time interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// `n` evenly spaced times from `start` to `end`, both included.
    /// The last time is exactly `end`.
    pub fn grid(&self, n: usize) -> Vec<f64> {
        if n < 2 {
            return vec![self.start; n];
        }
        let step = self.duration() / (n - 1) as f64;
        (0..n)
            .map(|i| if i + 1 == n { self.end } else { self.start + i as f64 * step })
            .collect()
    }
}

impl From<(f64, f64)> for TimeSpan {
    fn from((start, end): (f64, f64)) -> Self {
        Self { start, end }
    }
}

/// Everything that determines a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub initial: State,
    pub parameters: Parameters,
    pub span: TimeSpan,
    pub n_points: usize,
}

impl Scenario {
    /// Build a scenario; rejects invalid initial states and degenerate spans.
    pub fn new(
        initial: State,
        parameters: Parameters,
        span: impl Into<TimeSpan>,
        n_points: usize,
    ) -> Result<Self, SimulationError> {
        let scenario = Self { initial, parameters, span: span.into(), n_points };
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        self.initial.validate_initial()?;
        let TimeSpan { start, end } = self.span;
        if !start.is_finite() || !end.is_finite() {
            return Err(SimulationError::DegenerateScenario(
                format!("time span [{}, {}] is not finite", start, end)));
        }
        if start >= end {
            return Err(SimulationError::DegenerateScenario(
                format!("t0 ({}) must be smaller than t1 ({})", start, end)));
        }
        if self.n_points < 2 {
            return Err(SimulationError::DegenerateScenario(
                format!("need at least 2 output points (got {})", self.n_points)));
        }
        if self.span.grid(self.n_points).windows(2).any(|w| w[1] <= w[0]) {
            return Err(SimulationError::DegenerateScenario(format!(
                "time span [{}, {}] is too narrow for {} distinct output times",
                start, end, self.n_points)));
        }
        Ok(())
    }

    pub fn with_initial(&self, initial: State) -> Result<Self, SimulationError> {
        Scenario::new(initial, self.parameters, self.span, self.n_points)
    }

    pub fn with_parameters(&self, parameters: Parameters) -> Self {
        Self { parameters, ..*self }
    }

    /// Integrate this scenario. See [`simulate`].
    pub fn run(&self) -> Result<Trajectory, SimulationError> {
        self.validate()?;
        let grid = self.span.grid(self.n_points);
        let system = CellPopulation(self.parameters);
        let y0 = Vector::new(self.initial.s, self.initial.r);

        let solution = dopri5_on_grid(system, y0, &grid, &OdeOptions::default())?;
        debug!("{}: {} accepted, {} rejected steps, {} rhs evaluations",
            self.initial, solution.stats.accepted, solution.stats.rejected, solution.stats.rhs_evals);

        if solution.t.len() != self.n_points {
            return Err(SimulationError::Integration(OdeError::InvalidInput(format!(
                "solver returned {} samples, expected {}", solution.t.len(), self.n_points))));
        }

        let samples: Vec<Sample> = solution.t.iter().zip(&solution.y)
            .map(|(&t, y)| Sample { t, s: y[0], r: y[1] })
            .collect();
        let trajectory = Trajectory::new(*self, samples);

        let negative = trajectory.negative_excursions();
        if let (Some(first), Some(last)) = (negative.first(), negative.last()) {
            warn!("negative cell counts in {} of {} samples (t = {} .. {}); numerical artifact, not clamped",
                negative.len(), trajectory.len(),
                trajectory.samples()[*first].t, trajectory.samples()[*last].t);
        }
        Ok(trajectory)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | t=[{}, {}] | n={}",
            self.initial, self.parameters, self.span.start, self.span.end, self.n_points)
    }
}

/// Adapter between the model and the solver.
struct CellPopulation(Parameters);

impl System<f64, Vector> for CellPopulation {
    fn system(&self, t: f64, y: &Vector, dy: &mut Vector) {
        let (ds, dr) = derivative(t, &State::new(y[0], y[1]), &self.0);
        dy[0] = ds;
        dy[1] = dr;
    }
}

/// Integrate the model from `initial` over `span` and sample it at
/// `n_points` evenly spaced times.
///
/// Invalid input is rejected before integration. If the integrator fails no
/// trajectory is returned.
pub fn simulate(
    initial: State,
    parameters: &Parameters,
    span: impl Into<TimeSpan>,
    n_points: usize,
) -> Result<Trajectory, SimulationError> {
    Scenario::new(initial, *parameters, span, n_points)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> Parameters {
        Parameters::new(0.5, 1.0, 100.0, 0.1, 0.05, 1.0).unwrap()
    }

    #[test]
    fn test_grid_contract() {
        for n in [2, 3, 100, 501] {
            let traj = simulate(State::new(50.0, 10.0), &example(), (0.0, 50.0), n).unwrap();
            assert_eq!(traj.len(), n);
            let samples = traj.samples();
            assert_eq!(samples[0].t, 0.0);
            assert_eq!(samples[n - 1].t, 50.0);
            let dt = 50.0 / (n - 1) as f64;
            for (i, w) in samples.windows(2).enumerate() {
                assert!(w[1].t > w[0].t);
                assert!((w[1].t - w[0].t - dt).abs() < 1e-9, "step {i}");
            }
        }
    }

    #[test]
    fn test_grid_with_offset_start() {
        let traj = simulate(State::new(50.0, 10.0), &example(), (10.0, 12.5), 6).unwrap();
        let times: Vec<f64> = traj.times().collect();
        assert_eq!(times, vec![10.0, 10.5, 11.0, 11.5, 12.0, 12.5]);
    }

    #[test]
    fn test_first_sample_is_initial_state() {
        let traj = simulate(State::new(50.0, 10.0), &example(), (0.0, 50.0), 100).unwrap();
        let first = traj.first();
        assert_eq!((first.s, first.r), (50.0, 10.0));
    }

    #[test]
    fn test_determinism() {
        let p = Parameters::default();
        let a = simulate(State::new(1e6, 5000.0), &p, (0.0, 700.0), 500).unwrap();
        let b = simulate(State::new(1e6, 5000.0), &p, (0.0, 700.0), 500).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_logistic_saturation() {
        let p = Parameters::new(0.5, 1.0, 100.0, 0.0, 0.0, 0.0).unwrap();
        let traj = simulate(State::new(5.0, 3.0), &p, (0.0, 200.0), 400).unwrap();
        let totals: Vec<f64> = traj.total_population().collect();
        // local error control allows deviations of about rtol K + atol
        let tol = 10.0 * (1e-6 * 100.0 + 1e-6);
        for w in totals.windows(2) {
            assert!(w[1] >= w[0] - tol, "total must increase towards K");
        }
        for total in &totals {
            assert!(*total <= 100.0 + tol);
        }
        // far from K the growth is clearly visible
        assert!(totals[20] > totals[0] + 10.0);
        let last = *totals.last().unwrap();
        assert!((last - 100.0).abs() < tol, "total {last} did not saturate at K");
    }

    #[test]
    fn test_empty_subpopulation_stays_empty() {
        let p = example();
        let traj = simulate(State::new(0.0, 10.0), &p, (0.0, 50.0), 100).unwrap();
        assert!(traj.iter().all(|x| x.s == 0.0));
        assert!(traj.last().r > 10.0);

        let traj = simulate(State::new(50.0, 0.0), &p, (0.0, 50.0), 100).unwrap();
        assert!(traj.iter().all(|x| x.r == 0.0));
    }

    #[test]
    fn test_example_scenario() {
        let p = example();
        let traj = simulate(State::new(50.0, 10.0), &p, (0.0, 50.0), 100).unwrap();
        assert_eq!(traj.len(), 100);
        for x in traj.iter() {
            assert!(x.s + x.r <= 100.0 + 1e-3, "total exceeds K at t={}", x.t);
            assert!(x.s >= 0.0 && x.r >= 0.0);
        }
        // drug pushes the sensitive fraction down
        let ratios: Vec<f64> = traj.iter().map(|x| x.s / x.r).collect();
        for w in ratios.windows(2) {
            assert!(w[1] < w[0]);
        }
        assert!(traj.last().s < traj.last().r);
        assert!(traj.negative_excursions().is_empty());
    }

    #[test]
    fn test_default_experiment_runs() {
        let traj = simulate(State::new(1e6, 5000.0), &Parameters::default(), (0.0, 700.0), 500).unwrap();
        assert_eq!(traj.len(), 500);
        assert!(traj.iter().all(|x| x.s.is_finite() && x.r.is_finite()));
        // C = 0.9: alpha C = 0.054 > rho, sensitive cells decline
        assert!(traj.last().s < 1e6);
    }

    #[test]
    fn test_degenerate_scenarios() {
        let p = example();
        let x = State::new(50.0, 10.0);
        assert!(matches!(simulate(x, &p, (5.0, 5.0), 10), Err(SimulationError::DegenerateScenario(_))));
        assert!(matches!(simulate(x, &p, (5.0, 1.0), 10), Err(SimulationError::DegenerateScenario(_))));
        assert!(matches!(simulate(x, &p, (0.0, f64::INFINITY), 10), Err(SimulationError::DegenerateScenario(_))));
        assert!(matches!(simulate(x, &p, (0.0, 1.0), 1), Err(SimulationError::DegenerateScenario(_))));
        assert!(matches!(simulate(x, &p, (0.0, 1.0), 0), Err(SimulationError::DegenerateScenario(_))));
    }

    #[test]
    fn test_unrepresentable_grid_is_degenerate() {
        // at 1e16 the spacing of f64 is 2, so a step of 1 cannot be resolved
        let err = Scenario::new(State::new(50.0, 10.0), example(), (1e16, 1e16 + 4.0), 5).unwrap_err();
        assert!(matches!(err, SimulationError::DegenerateScenario(_)));
        assert!(err.to_string().contains("too narrow"));
        assert!(Scenario::new(State::new(50.0, 10.0), example(), (1e16, 1e16 + 4.0), 3).is_ok());
    }

    #[test]
    fn test_integration_failure_is_reported() {
        let err = simulate(State::new(1e200, 1.0), &Parameters::default(), (0.0, 700.0), 500).unwrap_err();
        assert!(matches!(err, SimulationError::Integration(OdeError::NonFinite { .. })));
        assert!(err.to_string().starts_with("integration did not converge"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_invalid_initial_state() {
        let err = simulate(State::new(-1.0, 10.0), &example(), (0.0, 1.0), 10).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidInput(ModelError::InvalidState { .. })));
        assert!(err.to_string().contains("initial s"));
    }

    #[test]
    fn test_zero_capacity_never_reaches_the_solver() {
        let err: SimulationError = Parameters::new(0.5, 1.0, 0.0, 0.1, 0.05, 1.0)
            .map_err(SimulationError::from)
            .and_then(|p| simulate(State::new(50.0, 10.0), &p, (0.0, 50.0), 100))
            .unwrap_err();
        assert!(err.to_string().contains("K must be positive"));
        assert!(err.source().is_some());
    }
}
