use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

#[derive(Parser)]
#[command(name = "warranty")]
#[command(version, about = "Device warranty and maintenance period tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a schedule file (TOML) overriding the standard period durations
    #[arg(short, long, global = true)]
    schedule: Option<PathBuf>,

    /// Log engine decisions to stderr
    #[arg(short, long, global = true, action)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the warranty periods for an inspection date
    Status {
        /// Inspection date of the completed report (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        inspection_date: String,

        /// Evaluate as of this instant instead of now (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        now: Option<String>,

        /// Print JSON instead of a table
        #[arg(long, action)]
        json: bool,
    },

    /// Evaluate the warranty periods for a report exported as JSON
    Report {
        /// Path to the report JSON ({"inspectionDate": ..., "status": ...})
        #[arg(long)]
        file: PathBuf,

        /// Evaluate as of this instant instead of now (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        now: Option<String>,

        /// Print JSON instead of a table
        #[arg(long, action)]
        json: bool,
    },

    /// Show the effective period schedule
    Periods,

    /// Write the standard schedule to a file for editing
    Init {
        /// Destination of the schedule file
        #[arg(long, default_value = "warranty.toml")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default_level),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Status { inspection_date, now, json } => {
            commands::status(cli.schedule, inspection_date, now, json).await?
        }
        Commands::Report { file, now, json } => commands::report(cli.schedule, file, now, json).await?,
        Commands::Periods => commands::periods(cli.schedule).await?,
        Commands::Init { out } => commands::init(out).await?,
    }

    Ok(())
}
