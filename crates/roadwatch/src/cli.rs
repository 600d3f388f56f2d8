use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "roadwatch")]
#[command(version)]
#[command(about = "Road hazard triage with duplicate-report suppression")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory, default config and memory store
    Init,

    /// Run one observation through the pipeline
    Analyze {
        /// Image path (empty aborts the run)
        image: String,

        /// Location key, usually "lat,lon"
        #[arg(short, long, default_value = "6.9271,79.8612", allow_hyphen_values = true)]
        location: String,

        /// Detector output (defaults to <image>.detections.json)
        #[arg(short, long)]
        detections: Option<String>,

        /// Severity assessor to use
        #[arg(long, value_enum, default_value_t = AssessorKind::Rules)]
        assessor: AssessorKind,

        /// Skip voice and authority alerts
        #[arg(long)]
        no_alerts: bool,
    },

    /// Show stored reports for one location
    History {
        #[arg(allow_hyphen_values = true)]
        location: String,

        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },

    /// Show the newest stored reports across all locations
    Recent {
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },

    /// Check whether a location was reported inside the recency window
    Check {
        #[arg(allow_hyphen_values = true)]
        location: String,
    },

    /// View the run log
    Runs {
        /// Show outcome counts instead of individual runs
        #[arg(long)]
        stats: bool,

        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Show paths, configuration and store size
    Status,

    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AssessorKind {
    /// Local confidence and size rules
    Rules,
    /// Hosted language model ($ANTHROPIC_API_KEY)
    Remote,
    /// Always the configured default_severity
    Fixed,
}
