//! Marine Weather
//!
//! Core library for resolving a station on the NDBC mobile site, scraping its
//! current marine conditions, rebuilding the NWS hourly digital forecast for
//! the station's position, and turning both into a short text message.
//!
//! See DESIGN.md for layout. The binary crate calls `run`.

pub mod config;
pub mod coordinates;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod forecast;
pub mod html;
pub mod location;
pub mod message;
pub mod readings;
pub mod send;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

pub use config::Config;
pub use coordinates::Coordinates;
pub use error::WeatherError;
pub use extractor::{SessionState, WeatherExtractor};
pub use fetch::Fetcher;
pub use forecast::{ForecastEntry, ForecastMarkup, ForecastTable};
pub use html::{HtmlDocument, RawSection};
pub use location::{LocationDirectory, LocationResolver};
pub use readings::{GroupedReadings, Readings};

/// Read config, fetch, format and deliver one weather message.
///
/// The message is printed instead of sent when `dry_run` is set or the
/// config has no email section.
pub async fn run(config_path: &Path, dry_run: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let body = build_message(&config).await?;

    match (&config.email, dry_run) {
        (Some(email), false) => send::send_message(email, &body)?,
        _ => println!("{body}"),
    }
    Ok(())
}

/// Resolve, extract and format the message described by `config`.
pub async fn build_message(config: &Config) -> Result<String> {
    let fetcher = Fetcher::new()?;
    let mut extractor = WeatherExtractor::new(fetcher, &config.time_zone);

    extractor
        .resolve(&config.noaa.location, &config.noaa.region)
        .await
        .inspect_err(|e| warn!("{}", e.user_message()))
        .context("location lookup failed")?;

    let readings = extractor
        .extract(config.send_all)
        .await
        .context("failed to read current conditions")?;

    let forecast = if config.forecast_hours > 0 {
        match extractor.forecast(config.forecast_hours).await {
            Ok(entries) => message::render_forecast(entries),
            Err(e) => {
                warn!("Sending without forecast: {e}");
                String::new()
            }
        }
    } else {
        String::new()
    };

    info!("Built weather message for '{}'", config.noaa.location);
    Ok(message::compose(&config.noaa.location, &readings, &forecast))
}
