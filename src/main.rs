//! Orrery CLI - run the layout and clustering pipeline over a JSON graph.
//!
//! Loads one input document, runs the pipeline once, and prints the
//! finalized records as JSON on stdout. All algorithmic work lives in the
//! library; this is the thin front end a renderer would replace.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use orrery::{ForceConfig, Pipeline, PipelineConfig};

#[derive(Parser)]
#[command(name = "orrery")]
#[command(about = "3D force-directed layout and community clustering for graph visualization")]
struct Cli {
    /// Input graph document (attributed {nodes, edges} object or bare
    /// [{source, target}] array)
    input: PathBuf,

    /// Number of simulation steps
    #[arg(long, default_value_t = orrery::LAYOUT_STEPS)]
    steps: u32,

    /// Spring rest length
    #[arg(long)]
    spring_length: Option<f64>,

    /// Spring stiffness coefficient
    #[arg(long)]
    spring_coefficient: Option<f64>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,

    /// Run in verbose mode
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("orrery: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(&cli.input)?;

    let mut config = PipelineConfig {
        steps: cli.steps,
        ..Default::default()
    };
    let defaults = config.force;
    config.force = ForceConfig {
        spring_length: cli.spring_length.unwrap_or(defaults.spring_length),
        spring_coefficient: cli
            .spring_coefficient
            .unwrap_or(defaults.spring_coefficient),
        ..defaults
    };

    let pipeline = Pipeline::new(config);
    let output = pipeline.run_json(&text)?;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}
