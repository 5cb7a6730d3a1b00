use std::fmt;
use serde::{Serialize, Deserialize};

use ds_model::State;

use crate::simulation::Scenario;

/// One output time with both cell counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub t: f64,
    pub s: f64,
    pub r: f64,
}

impl Sample {
    pub fn state(&self) -> State {
        State::new(self.s, self.r)
    }

    pub fn total(&self) -> f64 {
        self.s + self.r
    }
}

/// Result of one simulation run: `n_points` samples on the evenly spaced
/// grid of its scenario. Only the simulator and the file loader, which both
/// check the grid, construct trajectories.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    scenario: Scenario,
    samples: Vec<Sample>,
}

impl Trajectory {
    pub(crate) fn new(scenario: Scenario, samples: Vec<Sample>) -> Self {
        debug_assert_eq!(samples.len(), scenario.n_points);
        Self { scenario, samples }
    }

    /// The scenario that produced this trajectory.
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn first(&self) -> &Sample {
        &self.samples[0]
    }

    pub fn last(&self) -> &Sample {
        &self.samples[self.samples.len() - 1]
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|x| x.t)
    }

    pub fn total_population(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|x| x.total())
    }

    /// Indices of samples with a negative cell count. The integrator does not
    /// clamp, so these are numerical artifacts worth reporting.
    pub fn negative_excursions(&self) -> Vec<usize> {
        self.samples.iter().enumerate()
            .filter(|(_, x)| x.s < 0.0 || x.r < 0.0)
            .map(|(i, _)| i)
            .collect()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>13} {:>16} {:>16} {:>16}", "time", "sensitive", "resistant", "total")?;
        for x in &self.samples {
            writeln!(f, "{:13.6} {:16.4} {:16.4} {:16.4}", x.t, x.s, x.r, x.total())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds_model::Parameters;

    fn handmade() -> Trajectory {
        let scenario = Scenario::new(
            State::new(1.0, 2.0),
            Parameters::default(),
            (0.0, 2.0),
            3,
        ).unwrap();
        Trajectory::new(scenario, vec![
            Sample { t: 0.0, s: 1.0, r: 2.0 },
            Sample { t: 1.0, s: -1e-9, r: 3.0 },
            Sample { t: 2.0, s: 0.5, r: 4.0 },
        ])
    }

    #[test]
    fn test_accessors() {
        let traj = handmade();
        assert_eq!(traj.len(), 3);
        assert!(!traj.is_empty());
        assert_eq!(traj.first().t, 0.0);
        assert_eq!(traj.last().r, 4.0);
        assert_eq!(traj.times().collect::<Vec<_>>(), vec![0.0, 1.0, 2.0]);
        assert_eq!(traj.total_population().collect::<Vec<_>>()[2], 4.5);
        assert_eq!(traj.scenario().n_points, 3);
    }

    #[test]
    fn test_negative_excursions_are_reported() {
        let traj = handmade();
        assert_eq!(traj.negative_excursions(), vec![1]);
        // kept as computed, not clamped
        assert!(traj.samples()[1].s < 0.0);
    }

    #[test]
    fn test_display_table() {
        let table = handmade().to_string();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("sensitive"));
        assert!(lines[3].trim_start().starts_with("2.000000"));
    }
}
