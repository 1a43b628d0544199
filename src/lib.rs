pub mod cli;
pub mod completion;
pub mod config;
pub mod logging;
pub mod model;
pub mod providers;
pub mod sanitize;
pub mod session;
pub mod transcript;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use std::io;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info};

use cli::Cli;
use completion::OpenAiCompletion;
use config::Config;
use session::{run_oneshot, run_repl};
use transcript::Transcript;

pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let _log_guard = logging::init();

    let cfg = Config::from_env();
    info!(
        base_url = %cfg.base_url,
        model = %cfg.model,
        timeout_secs = cfg.timeout_secs,
        api_key_present = cfg.api_key.is_some(),
        "loaded runtime configuration"
    );

    let client = Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .context("Failed to initialize HTTP client")?;
    let invoker = OpenAiCompletion::new(&client, &cfg);

    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();

    match cli.oneshot_message() {
        None => {
            let mut transcript = Transcript::new();
            run_repl(
                io::stdin().lock(),
                &mut stdout,
                &mut stderr,
                &invoker,
                &mut transcript,
            )
            .await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(message) => {
            let ignored = cli.ignored_arg_count();
            if ignored > 0 {
                debug!(ignored, "extra arguments ignored in oneshot mode");
            }
            let status = run_oneshot(&message, &mut stdout, &mut stderr, &invoker).await?;
            Ok(status.exit_code())
        }
    }
}
