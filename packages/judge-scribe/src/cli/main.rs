//! Command-line front end for judge-scribe.
//!
//! Drives the capture pipeline against saved page snapshots and manages
//! the stored credentials used by the explanation and publishing steps.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use judge_scribe::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "judge-scribe")]
#[command(about = "Capture accepted online-judge submissions into problem records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a record from one saved page snapshot
    Extract {
        /// HTML file of the problem page
        file: PathBuf,

        /// Page location (selects the judge adapter)
        #[arg(long)]
        url: String,

        /// Request an explanation of the submitted code
        #[arg(long)]
        explain: bool,

        /// Directory for the JSON artifact (default: ARTIFACT_DIR)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Also commit the artifact to a repository (default: last selected)
        #[arg(long, value_name = "OWNER/REPO", num_args = 0..=1)]
        publish: Option<Option<String>>,

        /// Repository folder for published artifacts (default: judge name)
        #[arg(long, requires = "publish")]
        folder: Option<String>,
    },

    /// Replay a sequence of snapshots through a live session
    ///
    /// Each snapshot is FILE, or URL=FILE to navigate to URL first.
    Replay {
        /// Initial page location
        #[arg(long)]
        url: String,

        /// Snapshots in render order
        #[arg(required = true)]
        snapshots: Vec<String>,

        /// Pause between snapshots
        #[arg(long, default_value_t = 200)]
        interval_ms: u64,

        /// Request explanations of submitted code
        #[arg(long)]
        explain: bool,

        /// Directory for JSON artifacts (default: ARTIFACT_DIR)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List repositories of the stored GitHub token
    Repos,

    /// Show one repository and remember it for publishing
    Repo {
        /// Repository as owner/name
        full_name: String,
    },

    /// Manage stored credentials
    #[command(subcommand)]
    Key(KeyCommand),
}

#[derive(Subcommand)]
enum KeyCommand {
    /// Store a value
    Set { name: KeyName, value: String },

    /// Remove a value
    Clear { name: KeyName },
}

#[derive(Clone, Copy, ValueEnum)]
enum KeyName {
    /// Generative-AI API key
    Gemini,
    /// GitHub access token
    Github,
    /// Repository used by --publish
    Repo,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,judge_scribe=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Extract {
            file,
            url,
            explain,
            out,
            publish,
            folder,
        } => {
            commands::extract(
                &config,
                commands::ExtractArgs {
                    file,
                    url,
                    explain,
                    out,
                    publish,
                    folder,
                },
            )
            .await
        }
        Commands::Replay {
            url,
            snapshots,
            interval_ms,
            explain,
            out,
        } => {
            commands::replay(
                &config,
                commands::ReplayArgs {
                    url,
                    snapshots,
                    interval_ms,
                    explain,
                    out,
                },
            )
            .await
        }
        Commands::Repos => commands::list_repos(&config).await,
        Commands::Repo { full_name } => commands::show_repo(&config, &full_name).await,
        Commands::Key(KeyCommand::Set { name, value }) => {
            commands::set_key(&config, name.store_key(), value).await
        }
        Commands::Key(KeyCommand::Clear { name }) => {
            commands::clear_key(&config, name.store_key()).await
        }
    }
}

impl KeyName {
    fn store_key(self) -> &'static str {
        use judge_scribe::traits::store::{GEMINI_API_KEY, GITHUB_TOKEN, LAST_SELECTED_REPO};
        match self {
            KeyName::Gemini => GEMINI_API_KEY,
            KeyName::Github => GITHUB_TOKEN,
            KeyName::Repo => LAST_SELECTED_REPO,
        }
    }
}
