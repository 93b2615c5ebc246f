use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod analyze;
mod demo;
mod info;
mod query;

mod config;

/// hdxstat - Residue-level statistics for HDX-MS experiments
#[derive(Parser)]
#[command(name = "hdxstat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Analysis options shared by `analyze` and `query`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct AnalysisArgs {
    /// TOML configuration file with an [analysis] table
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Include the exposure 0 reference in position statistics
    #[arg(long)]
    pub include_reference: bool,

    /// Number of worker threads (default: available parallelism)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// ANOVA significance level gating the Tukey test (default: 0.05)
    #[arg(long)]
    pub alpha: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-position statistics and write them as CSV
    Analyze {
        /// Input cluster CSV file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output CSV file (defaults to <INPUT stem>_positions.csv)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Show states, exposures and proteins of a cluster CSV file
    Info {
        /// Input cluster CSV file
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Print one cached view as JSON
    Query {
        /// Input cluster CSV file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Protein identifier
        #[arg(short, long)]
        protein: String,

        /// Exposure in seconds
        #[arg(short, long)]
        exposure: f64,

        /// Baseline state (omit or pass `no_ref` for the plain view)
        #[arg(short, long)]
        state: Option<String>,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Generate a synthetic two-state cluster CSV file
    Demo {
        /// Output CSV file
        #[arg(value_name = "OUTPUT", default_value = "demo_cluster.csv")]
        output: PathBuf,

        /// Replicates per peptide, exposure and state
        #[arg(short, long, default_value = "3")]
        replicates: usize,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            analysis,
        } => analyze::run(input, output, analysis),
        Commands::Info { input } => info::run(input),
        Commands::Query {
            input,
            protein,
            exposure,
            state,
            analysis,
        } => query::run(input, protein, exposure, state, analysis),
        Commands::Demo { output, replicates } => demo::run(output, replicates),
    }
}
