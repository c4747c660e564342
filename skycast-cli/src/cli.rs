use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use skycast_core::{
    ClockFormatter, Config, OpenWeatherProvider, SearchController, provider_from_config,
};
use tracing::info;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "City weather search")]
pub struct Cli {
    /// Print times in UTC instead of the local time zone.
    #[arg(long, global = true)]
    pub utc: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and base URL.
    Configure,

    /// Show current conditions and a five-day outlook for a city.
    Show {
        /// City name, optionally with country code, e.g. "Paris,FR".
        city: String,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search cities one after another. Esc or Ctrl-C quits.
    Search,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let formatter = if self.utc { ClockFormatter::utc() } else { ClockFormatter::local() };

        match self.command {
            Command::Configure => configure(),
            Command::Show { city, json } => show(&city, json, &formatter).await,
            Command::Search => interactive(&formatter).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let base_url = Text::new("API base URL:")
        .with_default(&cfg.base_url)
        .prompt()
        .context("Failed to read base URL")?;

    cfg.set_api_key(api_key.trim().to_string());
    cfg.base_url = base_url.trim().to_string();

    let path = cfg.save()?;
    info!(path = %path.display(), "configuration saved");
    println!("Saved configuration to {}", path.display());

    Ok(())
}

fn controller() -> Result<SearchController<OpenWeatherProvider>> {
    let cfg = Config::resolve()?;
    Ok(SearchController::new(provider_from_config(&cfg)?))
}

async fn show(city: &str, json: bool, formatter: &ClockFormatter) -> Result<()> {
    let mut ctl = controller()?;

    if !ctl.search(city).await {
        bail!("City name must not be empty");
    }

    let state = ctl.state();
    if json {
        println!("{}", serde_json::to_string_pretty(&render::json_report(state))?);
    } else if state.error().is_none() {
        print!("{}", render::report(state, formatter));
    }

    if let Some(message) = state.error() {
        bail!("{message}");
    }

    Ok(())
}

async fn interactive(formatter: &ClockFormatter) -> Result<()> {
    let mut ctl = controller()?;

    loop {
        let line = match Text::new("City:").with_help_message("Esc or Ctrl-C to quit").prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read city name"),
        };

        ctl.set_query(line);
        if ctl.submit().await {
            println!("{}", render::report(ctl.state(), formatter));
        }
    }

    Ok(())
}
