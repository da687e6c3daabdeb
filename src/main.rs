// Main entry point for rp-replay

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use rp_reporter::cli::{Cli, OutputFormat};
use rp_reporter::config::Config;
use rp_reporter::time::FixedClock;
use rp_reporter::{PortalReporter, RecordingClient, logging, replay};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)?.with_env_overrides(),
        None => Config::load().unwrap_or_else(|| Config::default().with_env_overrides()),
    };

    if cli.show_config {
        print!("{}", config.to_toml());
        return Ok(());
    }

    let events = replay::load_events(&cli.events)?;
    info!(
        "Replaying {} events from {}",
        events.len(),
        cli.events.display()
    );

    let mut reporter = PortalReporter::from_config(RecordingClient::new(), &config);
    if let Some(millis) = cli.fixed_time {
        reporter = reporter.with_clock(FixedClock(millis));
    }
    if let Some(dir) = &cli.screenshots {
        reporter = reporter.with_screenshots_dir(dir);
    }

    let calls = replay::replay(&reporter, &events).await;

    match cli.format {
        OutputFormat::Console => print!("{}", replay::render_console(&calls)),
        OutputFormat::Json => {
            let json = replay::render_json(&calls).context("Failed to render calls")?;
            println!("{}", json);
        }
    }

    Ok(())
}
