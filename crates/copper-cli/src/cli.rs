use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Snapshot maps of solved power networks", long_about = None)]
pub struct Cli {
    /// Set the logging level (defaults to the config file, then "info")
    #[arg(long)]
    pub log_level: Option<tracing::Level>,

    /// Configuration file (defaults to <config dir>/copper/copper.toml)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a map figure colored by one quantity
    Plot {
        /// PyPSA CSV folder export
        #[arg(value_hint = ValueHint::DirPath)]
        network: PathBuf,
        /// load, generation, curtailment, marginal_price or net_power
        #[arg(long, default_value = "net_power")]
        mode: String,
        /// Keep only generators whose name contains this (generation, curtailment)
        #[arg(long)]
        technology: Option<String>,
        /// Snapshot shown first
        #[arg(long, default_value_t = 0)]
        snapshot: usize,
        /// Output file; `.html` writes a dashboard page, anything else JSON
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
    /// Write the net power dashboard page
    Dashboard {
        #[arg(value_hint = ValueHint::DirPath)]
        network: PathBuf,
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
        #[arg(long, default_value_t = 0)]
        snapshot: usize,
    },
    /// Print load and generation per bus at one snapshot
    Snapshot {
        #[arg(value_hint = ValueHint::DirPath)]
        network: PathBuf,
        /// Position in the snapshot list
        #[arg(long, default_value_t = 0)]
        index: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Group generators by technology instead of carrier
        #[arg(long)]
        group_carriers: bool,
    },
    /// Summarize a network: element counts, snapshots, congestion
    Inspect {
        #[arg(value_hint = ValueHint::DirPath)]
        network: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
