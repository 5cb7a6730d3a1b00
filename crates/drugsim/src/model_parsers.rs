use clap::Args;
use anyhow::Result;
use log::debug;

use ds_model::Parameters;
use ds_model::State;

/// Model parameters. Defaults are those of the in-vitro experiment
/// (rates per hour, K in cells, C in nM).
#[derive(Debug, Args)]
pub struct ModelArguments {
    /// Intrinsic growth rate rho (> 0).
    #[arg(long, default_value_t = Parameters::default().rho())]
    pub rho: f64,

    /// Competition coefficient m, the size ratio between s and r (>= 0).
    #[arg(short, long, default_value_t = Parameters::default().m())]
    pub m: f64,

    /// Carrying capacity K in cells (> 0).
    #[arg(short = 'k', long = "capacity", default_value_t = Parameters::default().k())]
    pub k: f64,

    /// Drug effect on sensitive cells alpha (>= 0).
    #[arg(long, default_value_t = Parameters::default().alpha())]
    pub alpha: f64,

    /// Action of sensitive on resistant cells beta (>= 0).
    #[arg(long, default_value_t = Parameters::default().beta())]
    pub beta: f64,

    /// Drug concentration C (>= 0).
    #[arg(short = 'c', long = "conc", default_value_t = Parameters::default().conc())]
    pub conc: f64,
}

impl ModelArguments {
    pub fn build_parameters(&self) -> Result<Parameters> {
        let params = Parameters::new(self.rho, self.m, self.k, self.alpha, self.beta, self.conc)?;
        debug!("Model parameters: {}", params);
        Ok(params)
    }
}

/// Initial cell counts.
#[derive(Debug, Args)]
pub struct InitialStateArguments {
    /// Initial number of sensitive cells.
    #[arg(long, default_value_t = 1e6)]
    pub s0: f64,

    /// Initial number of resistant cells.
    #[arg(long, default_value_t = 5000.0)]
    pub r0: f64,
}

impl InitialStateArguments {
    pub fn build_state(&self) -> Result<State> {
        let state = State::new(self.s0, self.r0);
        state.validate_initial()?;
        Ok(state)
    }
}
