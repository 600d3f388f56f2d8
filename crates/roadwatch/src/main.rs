mod cli;
mod commands;
mod sidecar;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so reports on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Analyze {
            image,
            location,
            detections,
            assessor,
            no_alerts,
        } => commands::analyze::run(commands::analyze::AnalyzeArgs {
            image,
            location,
            detections,
            assessor,
            alerts: !no_alerts,
        }),
        Commands::History { location, limit } => commands::history::run(&location, limit),
        Commands::Recent { limit } => commands::recent::run(limit),
        Commands::Check { location } => commands::check::run(&location),
        Commands::Runs { stats, limit } => commands::runs::run(stats, limit),
        Commands::Status => commands::status::run(),
        Commands::Version => commands::version::run(),
    }
}
