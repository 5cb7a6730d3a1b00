use std::fmt;
use std::fs;
use std::path::Path;
use std::error::Error;
use serde::{Serialize, Deserialize};

use ds_model::Parameters;
use ds_model::ParameterValues;
use ds_model::State;

use crate::simulation::{Scenario, SimulationError, TimeSpan};
use crate::trajectory::{Sample, Trajectory};

#[derive(Debug)]
pub enum TrajectoryError {
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidScenario(SimulationError),
    SampleCountMismatch { found: usize, expected: usize },
    TimeMismatch { index: usize, file_time: f64, expected_time: f64 },
    NonFiniteSample(usize),
}

impl fmt::Display for TrajectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Json(e) => write!(f, "JSON parse error: {}", e),
            Self::InvalidScenario(e) => write!(f, "invalid scenario in trajectory file: {}", e),
            Self::SampleCountMismatch { found, expected } =>
                write!(f, "Trajectory file has {found} samples, expected {expected}"),
            Self::TimeMismatch { index, file_time, expected_time } =>
                write!(f, "Time mismatch at sample {index}: {file_time} vs {expected_time}"),
            Self::NonFiniteSample(index) =>
                write!(f, "Sample {index} contains non-finite values"),
        }
    }
}

impl Error for TrajectoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::InvalidScenario(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TrajectoryError {
    fn from(e: std::io::Error) -> Self { Self::Io(e) }
}

impl From<serde_json::Error> for TrajectoryError {
    fn from(e: serde_json::Error) -> Self { Self::Json(e) }
}

impl From<SimulationError> for TrajectoryError {
    fn from(e: SimulationError) -> Self { Self::InvalidScenario(e) }
}

/// On-disk form of a trajectory. Parameters are stored unvalidated so that a
/// bad file yields a domain error rather than a JSON error.
#[derive(Debug, Serialize, Deserialize)]
pub struct SerializableTrajectory {
    initial: State,
    parameters: ParameterValues,
    t_start: f64,
    t_end: f64,
    n_points: usize,
    samples: Vec<Sample>,
}

impl Trajectory {
    pub fn to_serializable(&self) -> SerializableTrajectory {
        let scenario = self.scenario();
        SerializableTrajectory {
            initial: scenario.initial,
            parameters: scenario.parameters.values(),
            t_start: scenario.span.start,
            t_end: scenario.span.end,
            n_points: scenario.n_points,
            samples: self.samples().to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String, TrajectoryError> {
        Ok(serde_json::to_string_pretty(&self.to_serializable())?)
    }

    /// Rebuild a trajectory, checking the scenario and the grid contract.
    pub fn from_serializable(serial: SerializableTrajectory) -> Result<Self, TrajectoryError> {
        let parameters = Parameters::try_from(serial.parameters).map_err(SimulationError::from)?;
        let span = TimeSpan::new(serial.t_start, serial.t_end);
        let scenario = Scenario::new(serial.initial, parameters, span, serial.n_points)?;

        if serial.samples.len() != scenario.n_points {
            return Err(TrajectoryError::SampleCountMismatch {
                found: serial.samples.len(),
                expected: scenario.n_points,
            });
        }

        for (index, (sample, expected_time)) in serial.samples.iter()
            .zip(span.grid(scenario.n_points))
            .enumerate()
        {
            if (sample.t - expected_time).abs() >= 1e-9 {
                return Err(TrajectoryError::TimeMismatch {
                    index,
                    file_time: sample.t,
                    expected_time,
                });
            }
            if !sample.s.is_finite() || !sample.r.is_finite() {
                return Err(TrajectoryError::NonFiniteSample(index));
            }
        }
        Ok(Trajectory::new(scenario, serial.samples))
    }

    pub fn from_json(data: &str) -> Result<Self, TrajectoryError> {
        let serial: SerializableTrajectory = serde_json::from_str(data)?;
        Self::from_serializable(serial)
    }

    /// Load a trajectory from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrajectoryError> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TrajectoryError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
