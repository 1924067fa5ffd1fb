use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use dvr::framework::SimParams;
use dvr::logging::{FileLogFactory, NullLogFactory};
use dvr::simulation::{Simulation, SimulationReport};
use dvr::topology::Topology;
use dvr::util::fmt_metric;
use log::{error, info, warn};
use simplelog::*;

/// Simulates distance vector routing over a topology file
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// topology file: router count, router ids, then one `<a> <b> <cost>` link per line
    topology: PathBuf,

    /// directory receiving one `<router>_output.txt` log per router
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,

    /// do not write per-router logs
    #[arg(long)]
    no_logs: bool,

    /// pause every router takes before each exchange, in milliseconds
    #[arg(long, default_value_t = 0)]
    interval_ms: u64,

    /// compare the final tables with Dijkstra, fail on any difference
    #[arg(long)]
    verify: bool,

    /// print the final tables as JSON
    #[arg(long)]
    json: bool,

    /// more terminal output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn print_tables(report: &SimulationReport) {
    for (node, table) in &report.tables {
        println!("Router {node}:");
        for (dest, metric) in table {
            println!("  {dest}: {}", fmt_metric(*metric));
        }
    }
}

async fn run(args: Args) -> anyhow::Result<bool> {
    let topology = Topology::load(&args.topology)?;
    info!(
        "Loaded {} routers and {} links from {}",
        topology.nodes().len(),
        topology.links().count(),
        args.topology.display()
    );

    let params = SimParams::default().with_round_interval(Duration::from_millis(args.interval_ms));
    let simulation = Simulation::new(topology, params);
    let report = if args.no_logs {
        simulation.run(&NullLogFactory).await?
    } else {
        info!("Writing router logs to {}", args.log_dir.display());
        simulation.run(&FileLogFactory::new(&args.log_dir)).await?
    };

    println!("All routers have converged. Terminating simulation.");
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print_tables(&report);
    }

    if args.verify {
        let mismatches = report.mismatches(simulation.topology());
        if !mismatches.is_empty() {
            for mismatch in &mismatches {
                error!("{mismatch}");
            }
            return Ok(false);
        }
        info!("Every routing table matches the shortest paths");
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(err) = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("Failed to init logger: {err}");
    }

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            warn!("Simulation converged to tables that are not shortest paths");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
