use std::path::PathBuf;
use clap::Args;
use anyhow::Result;
use anyhow::bail;

use ds_dynamics::TimeSpan;

#[derive(Debug, Args)]
pub struct TimeSpanArguments {
    /// Simulation start time.
    #[arg(long, default_value_t = 0.0)]
    pub t_start: f64,

    /// Simulation stop time (hours).
    #[arg(long, default_value_t = 700.0)]
    pub t_end: f64,

    /// Number of evenly spaced output points in [t-start, t-end].
    #[arg(short = 'n', long, default_value_t = 500)]
    pub points: usize,
}

impl TimeSpanArguments {
    /// Validate that all parameters make sense.
    pub fn validate(&self) -> Result<()> {
        if !self.t_start.is_finite() || !self.t_end.is_finite() {
            bail!("t_start ({}) and t_end ({}) must be finite", self.t_start, self.t_end);
        }
        if self.t_end <= self.t_start {
            bail!("t_end ({}) must be greater than t_start ({})", self.t_end, self.t_start);
        }
        if self.points < 2 {
            bail!("need at least 2 output points (got {})", self.points);
        }
        Ok(())
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.t_start, self.t_end)
    }
}

#[derive(Debug, Args)]
pub struct OutputArguments {
    /// Prefix for the generated SVG files.
    #[arg(short, long, default_value = "ds")]
    pub prefix: String,

    /// Store the computed trajectory (JSON) in this file.
    #[arg(long, value_name = "FILE")]
    pub trajectory: Option<PathBuf>,
}

impl OutputArguments {
    pub fn svg(&self, kind: &str) -> String {
        format!("{}_{}.svg", self.prefix, kind)
    }

    /// Where to store trajectory `index` of `count`. Several trajectories
    /// get the index inserted before the extension: `run.json` -> `run_2.json`.
    pub fn trajectory_path(&self, index: usize, count: usize) -> Option<PathBuf> {
        let path = self.trajectory.as_ref()?;
        if count <= 1 {
            return Some(path.clone());
        }
        let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        let name = match path.extension() {
            Some(ext) => format!("{}_{}.{}", stem, index, ext.to_string_lossy()),
            None => format!("{}_{}", stem, index),
        };
        Some(path.with_file_name(name))
    }
}
