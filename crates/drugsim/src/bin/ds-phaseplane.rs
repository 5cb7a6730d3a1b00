use clap::Parser;
use anyhow::Result;
use colored::*;
use log::info;

use ds_model::State;
use ds_model::equilibria;
use ds_dynamics::Scenario;
use ds_dynamics::sweep::initial_condition_scan;
use ds_dynamics::views::{LabelBy, Overlay};
use ds_dynamics::trajectory_plotting::{plot_phase_plane, plot_time_series};

use drugsim::init_logging;
use drugsim::input_parsers::{parse_state, read_initial_conditions_input, default_phase_plane_conditions};
use drugsim::model_parsers::ModelArguments;
use drugsim::simulation_parsers::{TimeSpanArguments, OutputArguments};
use drugsim::report::{overlay_table, equilibria_summary};

#[derive(Debug, Parser)]
#[command(name = "ds-phaseplane")]
#[command(version, about = "Phase plane of sensitive vs resistant cells")]
pub struct Cli {
    /// Initial condition "S0,R0" (repeatable).
    #[arg(short, long = "init", value_name = "S0,R0", value_parser = parse_state)]
    inits: Vec<State>,

    /// File with one "S0 R0" pair per line, or "-" for stdin.
    #[arg(long, value_name = "FILE", conflicts_with = "inits")]
    init_file: Option<String>,

    /// Also plot all trajectories over time.
    #[arg(long)]
    timecourse: bool,

    /// Verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten, next_help_heading = "Output")]
    output: OutputArguments,

    #[command(flatten, next_help_heading = "Simulation parameters")]
    simulation: TimeSpanArguments,

    #[command(flatten, next_help_heading = "Model parameters")]
    model: ModelArguments,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    cli.simulation.validate()?;

    let parameters = cli.model.build_parameters()?;
    let states = if let Some(input) = &cli.init_file {
        read_initial_conditions_input(input)?
    } else if !cli.inits.is_empty() {
        cli.inits.clone()
    } else {
        default_phase_plane_conditions(&parameters)
    };
    info!("{} initial conditions", states.len());

    let base = Scenario::new(states[0], parameters, cli.simulation.span(), cli.simulation.points)?;
    let trajectories = initial_condition_scan(&base, &states)?;

    let points = equilibria(&parameters);
    println!("{}", parameters);
    println!("Equilibria:\n{}", equilibria_summary(&points));
    print!("{}", overlay_table(&trajectories, LabelBy::InitialCondition));

    for traj in &trajectories {
        let negative = traj.negative_excursions();
        if !negative.is_empty() {
            println!("{}", format!("{}: {} samples with negative cell counts",
                traj.scenario().initial, negative.len()).red());
        }
    }

    let overlay = Overlay::new(&trajectories, LabelBy::InitialCondition);
    let filename = cli.output.svg("phaseplane");
    let title = format!("Phase Plane Analysis (C = {})", parameters.conc());
    plot_phase_plane(&overlay, &points, &filename, &title)?;
    println!("{} {}", "Plot written to:".green(), filename);

    if cli.timecourse {
        let filename = cli.output.svg("timecourse");
        plot_time_series(&overlay, &filename, "Cells Population Dynamics")?;
        println!("{} {}", "Plot written to:".green(), filename);
    }

    for (i, traj) in trajectories.iter().enumerate() {
        if let Some(path) = cli.output.trajectory_path(i, trajectories.len()) {
            traj.to_file(&path)?;
            println!("Trajectory stored in: {}", path.display());
        }
    }

    Ok(())
}
