use anyhow::Result;
use clap::Parser;
use copper_cli::{Cli, Commands, CopperConfig};
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() {
    let cli = Cli::parse();

    let config = match CopperConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(2);
        }
    };
    let level = match cli.log_level {
        Some(level) => level,
        None => config.log_level().unwrap_or(tracing::Level::INFO),
    };

    // Logs go to stderr so JSON on stdout stays parseable.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {err}");
    }

    if let Err(err) = run(&cli, &config) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, config: &CopperConfig) -> Result<()> {
    match &cli.command {
        Commands::Plot {
            network,
            mode,
            technology,
            snapshot,
            output,
        } => commands::plot::handle(
            config,
            network,
            mode,
            technology.as_deref(),
            *snapshot,
            output.as_deref(),
        ),
        Commands::Dashboard {
            network,
            output,
            snapshot,
        } => commands::dashboard::handle(config, network, output, *snapshot),
        Commands::Snapshot {
            network,
            index,
            format,
            group_carriers,
        } => commands::snapshot::handle(network, *index, *format, *group_carriers),
        Commands::Inspect { network } => commands::inspect::handle(network),
    }
}
