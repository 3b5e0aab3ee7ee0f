//! selfcheck CLI: load a question dataset and check answers against it.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use selfcheck_core::TaskId;

mod commands;

#[derive(Parser)]
#[command(name = "selfcheck", version, about = "Numeric self-check quiz engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where to find the dataset.
#[derive(Args)]
struct SourceArgs {
    /// Dataset file path or http(s) URL (overrides the config)
    #[arg(long)]
    dataset: Option<String>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a dataset and report skipped rows and warnings
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List weeks, or the tasks of one week
    List {
        #[command(flatten)]
        source: SourceArgs,

        /// Show the tasks of this week
        #[arg(long)]
        week: Option<u32>,
    },

    /// Show a question's prompt, inputs and variants
    Show {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long)]
        week: u32,

        /// Task id, e.g. "3" or "7.1"
        #[arg(long)]
        task: TaskId,

        /// Select the bonus question of that task
        #[arg(long)]
        bonus: bool,
    },

    /// Check answers for a question
    Check {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long)]
        week: u32,

        /// Task id, e.g. "3" or "7.1"
        #[arg(long)]
        task: TaskId,

        /// Select the bonus question of that task
        #[arg(long)]
        bonus: bool,

        /// Variant number as listed by `show` (starting at 1)
        #[arg(long)]
        variant: Option<usize>,

        /// Answers, comma-separated, one per input
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        answers: Vec<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create a starter config and example dataset
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("selfcheck_core=info,selfcheck_source=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { source } => {
            commands::validate::execute(source.dataset, source.config).await
        }
        Commands::List { source, week } => {
            commands::list::execute(source.dataset, source.config, week).await
        }
        Commands::Show {
            source,
            week,
            task,
            bonus,
        } => commands::show::execute(source.dataset, source.config, week, task, bonus).await,
        Commands::Check {
            source,
            week,
            task,
            bonus,
            variant,
            answers,
            format,
        } => {
            commands::check::execute(
                source.dataset,
                source.config,
                week,
                task,
                bonus,
                variant,
                answers,
                format,
            )
            .await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
