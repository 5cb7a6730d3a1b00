use log::info;

use ds_model::ParameterName;
use ds_model::State;

use crate::simulation::{Scenario, SimulationError};
use crate::trajectory::Trajectory;
use crate::views::LabelBy;

/// One parameter varied over a list of values, all else taken from `base`.
#[derive(Debug, Clone)]
pub struct Sweep {
    pub base: Scenario,
    pub parameter: ParameterName,
    pub values: Vec<f64>,
}

impl Sweep {
    pub fn new(base: Scenario, parameter: ParameterName, values: Vec<f64>) -> Self {
        Self { base, parameter, values }
    }

    /// `steps` evenly spaced values from `from` to `to` (inclusive).
    pub fn linear(base: Scenario, parameter: ParameterName, from: f64, to: f64, steps: usize) -> Self {
        let values = match steps {
            0 => vec![],
            1 => vec![from],
            _ => (0..steps)
                .map(|i| if i + 1 == steps { to } else { from + (to - from) * i as f64 / (steps - 1) as f64 })
                .collect(),
        };
        Self::new(base, parameter, values)
    }

    /// Every scenario of the sweep, validated before anything is integrated.
    pub fn scenarios(&self) -> Result<Vec<Scenario>, SimulationError> {
        self.values.iter()
            .map(|&v| -> Result<Scenario, SimulationError> {
                Ok(self.base.with_parameters(self.base.parameters.with(self.parameter, v)?))
            })
            .collect()
    }

    /// Run all scenarios in order. The first failure aborts the sweep.
    pub fn run(&self) -> Result<Vec<Trajectory>, SimulationError> {
        let scenarios = self.scenarios()?;
        info!("Sweeping {} over {} values", self.parameter, scenarios.len());
        scenarios.iter().map(Scenario::run).collect()
    }

    /// Legend labelling matching this sweep.
    pub fn label_by(&self) -> LabelBy {
        LabelBy::Parameter(self.parameter)
    }
}

/// One trajectory per initial state, sharing the parameters, span and grid of
/// `base`. The first failure aborts the scan.
pub fn initial_condition_scan(base: &Scenario, initial_states: &[State]) -> Result<Vec<Trajectory>, SimulationError> {
    let scenarios = initial_states.iter()
        .map(|&x| base.with_initial(x))
        .collect::<Result<Vec<_>, _>>()?;
    info!("Scanning {} initial conditions", scenarios.len());
    scenarios.iter().map(Scenario::run).collect()
}
