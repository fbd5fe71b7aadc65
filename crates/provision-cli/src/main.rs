use anyhow::Result;
use clap::{Parser, Subcommand};
use provision_core::client::KeyValueClient;
use provision_core::config::Config;
use provision_core::report::ReportStore;
use provision_http::HttpClient;
use provision_local::LocalRunner;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Outcome;

#[derive(Parser)]
#[command(name = "provision", version)]
#[command(about = "Idempotent, resumable local provisioning from a key-value server", long_about = None)]
struct Cli {
    /// URL of the key-value server
    #[arg(short, long, global = true, value_name = "URL")]
    url: Option<String>,

    /// Levels of specialization, most generic first (repeat or comma-separate)
    #[arg(short, long, global = true, value_delimiter = ',', value_name = "LEVEL")]
    levels: Option<Vec<String>>,

    /// Lifetime of cached HTTP responses, in seconds
    #[arg(short, long, global = true, value_name = "SECONDS")]
    cache: Option<u64>,

    /// Path to the configuration file
    #[arg(short = 'f', long, global = true, value_name = "PATH")]
    configuration_file: Option<PathBuf>,

    /// Path to the reports' directory
    #[arg(short, long, global = true, value_name = "PATH")]
    reports_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the script's tasks along with their current status
    Show {
        /// The script's key
        #[arg(default_value = "script")]
        key: String,
    },

    /// Execute the script's tasks, skipping those already successful
    Run {
        /// The script's key
        #[arg(default_value = "script")]
        key: String,

        /// Maximum number of attempts before reporting a failure
        #[arg(long)]
        attempts: Option<u32>,

        /// Delay in seconds between two attempts
        #[arg(long, value_parser = parse_pause)]
        pause: Option<f64>,
    },

    /// List the reports, oldest first, without their output
    Log {},

    /// Step through the script's tasks interactively
    Debug {
        /// The script's key
        #[arg(default_value = "script")]
        key: String,
    },

    /// Show the configuration in effect
    Config {
        /// Write a sample configuration file
        #[arg(long)]
        init: bool,
    },
}

fn parse_pause(s: &str) -> Result<f64, String> {
    let pause: f64 = s.parse().map_err(|e| format!("invalid pause '{}': {}", s, e))?;
    if !pause.is_finite() || pause < 0.0 {
        return Err(format!("pause must be a non-negative number of seconds, got {}", s));
    }
    Ok(pause)
}

impl Cli {
    fn config_path(&self) -> PathBuf {
        self.configuration_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }

    /// File values first, then command-line overrides. A missing file
    /// means defaults, whichever path was asked for.
    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_or_default(&self.config_path())?;

        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(levels) = &self.levels {
            config.levels = levels.clone();
        }
        if let Some(cache) = self.cache {
            config.cache = cache;
        }
        if let Some(reports_path) = &self.reports_path {
            config.reports_path = reports_path.clone();
        }
        if let Commands::Run { attempts, pause, .. } = &self.command {
            if let Some(attempts) = attempts {
                config.attempts = *attempts;
            }
            if let Some(pause) = pause {
                config.pause = *pause;
            }
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;
    let store = ReportStore::new(&config.reports_path);
    let mut out = std::io::stdout();

    let outcome = match &cli.command {
        Commands::Log {} => commands::log::run(&store, &mut out)?,
        Commands::Config { init } => commands::config::run(&cli.config_path(), &config, *init, &mut out)?,
        Commands::Show { key } => {
            let client = HttpClient::from_config(&config)?;
            commands::show::run(&client, &store, key, &mut out).await?
        }
        Commands::Run { key, .. } => {
            let client: Arc<dyn KeyValueClient> = Arc::new(HttpClient::from_config(&config)?);
            let runner = LocalRunner::new(client.clone());
            commands::run::run(client.as_ref(), &store, &runner, key, config.retry_policy(), &mut out).await?
        }
        Commands::Debug { key } => {
            let client: Arc<dyn KeyValueClient> = Arc::new(HttpClient::from_config(&config)?);
            let runner = LocalRunner::new(client.clone());
            let mut input = std::io::stdin().lock();
            commands::debug::run(client.as_ref(), &store, &runner, key, &mut input, &mut out).await?
        }
    };

    Ok(match outcome {
        Outcome::Stopped => ExitCode::FAILURE,
        Outcome::Completed | Outcome::Quit => ExitCode::SUCCESS,
    })
}
