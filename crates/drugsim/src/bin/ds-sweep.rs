use clap::Parser;
use anyhow::{bail, Result};
use colored::*;

use ds_model::ParameterName;
use ds_dynamics::Scenario;
use ds_dynamics::sweep::Sweep;
use ds_dynamics::views::Overlay;
use ds_dynamics::trajectory_plotting::{plot_phase_plane, plot_time_series};

use drugsim::init_logging;
use drugsim::model_parsers::{ModelArguments, InitialStateArguments};
use drugsim::simulation_parsers::{TimeSpanArguments, OutputArguments};
use drugsim::report::overlay_table;

#[derive(Debug, Parser)]
#[command(name = "ds-sweep")]
#[command(version, about = "Compare trajectories across values of one model parameter")]
pub struct Cli {
    /// Parameter to vary (rho, m, K, alpha, beta, C).
    #[arg(long, default_value = "C")]
    param: ParameterName,

    /// Explicit parameter values, comma separated.
    #[arg(long, value_delimiter = ',', num_args = 1.., conflicts_with_all = ["from", "to", "steps"])]
    values: Vec<f64>,

    /// First value of an evenly spaced range.
    #[arg(long, requires = "to")]
    from: Option<f64>,

    /// Last value of an evenly spaced range.
    #[arg(long, requires = "from")]
    to: Option<f64>,

    /// Number of values in the range.
    #[arg(long, default_value_t = 5)]
    steps: usize,

    /// Verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten, next_help_heading = "Output")]
    output: OutputArguments,

    #[command(flatten, next_help_heading = "Initial state")]
    initial: InitialStateArguments,

    #[command(flatten, next_help_heading = "Simulation parameters")]
    simulation: TimeSpanArguments,

    #[command(flatten, next_help_heading = "Model parameters (base values)")]
    model: ModelArguments,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    cli.simulation.validate()?;

    let base = Scenario::new(
        cli.initial.build_state()?,
        cli.model.build_parameters()?,
        cli.simulation.span(),
        cli.simulation.points,
    )?;

    let sweep = match (cli.from, cli.to) {
        (Some(from), Some(to)) => Sweep::linear(base, cli.param, from, to, cli.steps),
        _ if !cli.values.is_empty() => Sweep::new(base, cli.param, cli.values.clone()),
        _ => bail!("give either --values or --from/--to"),
    };
    if sweep.values.is_empty() {
        bail!("nothing to sweep");
    }

    println!("{}", format!("{}", base.initial).yellow());
    println!("Varying {} over {:?}", cli.param, sweep.values);

    let trajectories = sweep.run()?;
    print!("{}", overlay_table(&trajectories, sweep.label_by()));

    for traj in &trajectories {
        let negative = traj.negative_excursions();
        if !negative.is_empty() {
            println!("{}", format!("{} = {}: {} samples with negative cell counts",
                cli.param, traj.scenario().parameters.get(cli.param), negative.len()).red());
        }
    }

    let overlay = Overlay::new(&trajectories, sweep.label_by());
    let filename = cli.output.svg("sweep_timecourse");
    plot_time_series(&overlay, &filename, &format!("Cells Population Dynamics ({} sweep)", cli.param))?;
    println!("{} {}", "Plot written to:".green(), filename);

    let filename = cli.output.svg("sweep_phaseplane");
    plot_phase_plane(&overlay, &[], &filename, &format!("Phase Plane Analysis ({} sweep)", cli.param))?;
    println!("{} {}", "Plot written to:".green(), filename);

    for (i, traj) in trajectories.iter().enumerate() {
        if let Some(path) = cli.output.trajectory_path(i, trajectories.len()) {
            traj.to_file(&path)?;
            println!("Trajectory stored in: {}", path.display());
        }
    }

    Ok(())
}
