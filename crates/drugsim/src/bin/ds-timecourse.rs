use clap::Parser;
use anyhow::Result;
use colored::*;
use log::info;
use std::path::PathBuf;

use ds_model::equilibria;
use ds_dynamics::Scenario;
use ds_dynamics::Trajectory;
use ds_dynamics::views::Overlay;
use ds_dynamics::trajectory_plotting::plot_time_series;

use drugsim::init_logging;
use drugsim::model_parsers::{ModelArguments, InitialStateArguments};
use drugsim::simulation_parsers::{TimeSpanArguments, OutputArguments};
use drugsim::report::{final_state_summary, equilibria_summary};

#[derive(Debug, Parser)]
#[command(name = "ds-timecourse")]
#[command(version, about = "Sensitive and resistant cell counts over time")]
pub struct Cli {
    /// Re-plot a stored trajectory (JSON) instead of simulating.
    #[arg(long, value_name = "FILE", conflicts_with = "trajectory")]
    load: Option<PathBuf>,

    /// Only print the final state, not the full table.
    #[arg(long)]
    summary: bool,

    /// Verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten, next_help_heading = "Output")]
    output: OutputArguments,

    #[command(flatten, next_help_heading = "Initial state")]
    initial: InitialStateArguments,

    #[command(flatten, next_help_heading = "Simulation parameters")]
    simulation: TimeSpanArguments,

    #[command(flatten, next_help_heading = "Model parameters")]
    model: ModelArguments,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let trajectory = if let Some(path) = &cli.load {
        println!("Loading trajectory from: {}", path.display());
        Trajectory::from_file(path)?
    } else {
        cli.simulation.validate()?;
        let scenario = Scenario::new(
            cli.initial.build_state()?,
            cli.model.build_parameters()?,
            cli.simulation.span(),
            cli.simulation.points,
        )?;
        info!("Simulating {}", scenario);
        scenario.run()?
    };

    let scenario = trajectory.scenario();
    println!("{}", format!("{}", scenario.initial).yellow());
    println!("{}", scenario.parameters);
    println!("Equilibria:\n{}", equilibria_summary(&equilibria(&scenario.parameters)));

    if !cli.summary {
        println!("{}", trajectory);
    }
    println!("{}", final_state_summary(&trajectory).green());

    let negative = trajectory.negative_excursions();
    if !negative.is_empty() {
        println!("{}", format!("{} samples with negative cell counts (kept as computed)",
            negative.len()).red());
    }

    let filename = cli.output.svg("timecourse");
    plot_time_series(&Overlay::single(&trajectory), &filename, "Cells Population Dynamics")?;
    println!("Plot written to: {}", filename);

    if let Some(path) = &cli.output.trajectory {
        trajectory.to_file(path)?;
        println!("Trajectory stored in: {}", path.display());
    }

    Ok(())
}
