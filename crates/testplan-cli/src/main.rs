use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "testplan")]
#[command(about = "Aggregate Jira, GitHub and Figma context for an issue", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the aggregated context for an issue
    Fetch {
        /// Issue key, e.g. SHOP-123
        key: String,
        /// Print the context as JSON
        #[arg(long)]
        json: bool,
        /// Also print the description merged with the parent context
        #[arg(long, conflicts_with = "json")]
        description: bool,
    },
    /// Check the configured service tokens
    Health,
    /// Post or update the generated test plan comment on an issue
    Comment {
        key: String,
        /// File holding the comment text
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.log_json);

    let result: Result<()> = match cli.command {
        Commands::Fetch { key, json, description } => commands::fetch::run(&key, json, description).await,
        Commands::Health => commands::health::run().await,
        Commands::Comment { key, file } => commands::comment::run(&key, &file).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            commands::report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(verbose: bool, json: bool) {
    let default = if verbose { "testplan=debug" } else { "testplan=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}
