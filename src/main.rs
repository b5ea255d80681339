mod aggregate;
mod config;
mod error;
mod github;
mod render;
mod stats;

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use config::Config;
use github::{Api, GithubClient};
use render::Template;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let client = GithubClient::new(&config);
    let today = Utc::now().date_naive();

    match run(&config, &client, today).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(
                "Stats refresh failed, {} left untouched: {e:#}",
                config.output_path.display()
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the template, aggregate, render, write. The output file is only
/// touched once everything before it has succeeded.
async fn run<A: Api>(config: &Config, api: &A, today: NaiveDate) -> Result<()> {
    let template = Template::load(&config.template_path)?;
    let summary = aggregate::aggregate(api, config, today)
        .await
        .context("Failed to collect GitHub stats")?;
    let rendered = template
        .render(&summary)
        .with_context(|| format!("Failed to render {}", template.path().display()))?;

    fs::write(&config.output_path, rendered)
        .with_context(|| format!("Failed to write {}", config.output_path.display()))?;

    info!("Generated {} successfully.", config.output_path.display());
    Ok(())
}
