//! # hdxstat
//!
//! A command-line tool for residue-level statistics of HDX-MS cluster exports.
//!
//! ## Usage
//!
//! ```bash
//! # Compute the position table
//! hdxstat analyze cluster.csv --output positions.csv
//!
//! # List states, exposures and proteins
//! hdxstat info cluster.csv
//!
//! # Print one cached view as JSON
//! hdxstat query cluster.csv --protein P1 --exposure 30 --state apo
//!
//! # Generate demo data
//! hdxstat demo demo_cluster.csv
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::{dispatch, init_logging, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    dispatch(cli)
}
