//! YAML configuration.
//!
//! ```yaml
//! noaa:
//!   region: https://www.ndbc.noaa.gov/mobile/region.php?reg=west
//!   location: San Francisco
//! time_zone: PDT
//! send_all: false
//! forecast_hours: 6
//! email:
//!   username: me@gmail.com
//!   password: app-password
//!   recipient: 5551234567@vtext.com
//! ```

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::{env, fs, path::Path};

/// Upper bound on hours of forecast per field.
pub const MAX_FORECAST_HOURS: usize = 24;

/// Overrides `email.password` when set.
const PASSWORD_ENV: &str = "MARINE_WEATHER_SMTP_PASSWORD";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub noaa: NoaaSettings,
    pub time_zone: String,
    #[serde(default)]
    pub send_all: bool,
    #[serde(default = "default_forecast_hours")]
    pub forecast_hours: usize,
    #[serde(default)]
    pub email: Option<EmailSettings>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct NoaaSettings {
    /// Directory page listing the region's stations
    pub region: String,
    /// Search key matched against station labels
    pub location: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct EmailSettings {
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub recipient: String,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
}

fn default_forecast_hours() -> usize {
    crate::forecast::DEFAULT_HOURS_AHEAD
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

impl Config {
    /// Read, parse and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config = Self::from_yaml(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        if let (Some(email), Ok(password)) = (config.email.as_mut(), env::var(PASSWORD_ENV)) {
            email.password = password;
        }
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.noaa.region.trim().is_empty() {
            return Err(anyhow!("missing 'noaa.region'"));
        }
        url::Url::parse(&self.noaa.region)
            .with_context(|| format!("'noaa.region' is not a URL: {}", self.noaa.region))?;
        if self.noaa.location.trim().is_empty() {
            return Err(anyhow!("missing 'noaa.location'"));
        }
        if self.time_zone.trim().is_empty() {
            return Err(anyhow!("missing 'time_zone'"));
        }
        if self.forecast_hours > MAX_FORECAST_HOURS {
            return Err(anyhow!(
                "'forecast_hours' must be at most {MAX_FORECAST_HOURS}, got {}",
                self.forecast_hours
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
noaa:
  region: https://www.ndbc.noaa.gov/mobile/region.php?reg=west
  location: San Francisco
time_zone: PDT
"#;

    #[test]
    fn defaults_apply() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        assert!(!config.send_all);
        assert_eq!(config.forecast_hours, 6);
        assert!(config.email.is_none());
        assert_eq!(config.noaa.location, "San Francisco");
    }

    #[test]
    fn email_section_gets_default_host() {
        let text = format!(
            "{MINIMAL}email:\n  username: me@gmail.com\n  password: pw\n  recipient: 5551234567@vtext.com\n"
        );
        let config = Config::from_yaml(&text).unwrap();
        let email = config.email.unwrap();
        assert_eq!(email.smtp_host, "smtp.gmail.com");
        assert_eq!(email.recipient, "5551234567@vtext.com");
    }

    #[test]
    fn too_many_forecast_hours_rejected() {
        let text = format!("{MINIMAL}forecast_hours: 48\n");
        let err = Config::from_yaml(&text).unwrap_err();
        assert!(err.to_string().contains("at most 24"));
    }

    #[test]
    fn blank_location_rejected() {
        let text = MINIMAL.replace("San Francisco", "\"  \"");
        let err = Config::from_yaml(&text).unwrap_err();
        assert!(err.to_string().contains("noaa.location"));
    }

    #[test]
    fn region_must_be_url() {
        let text = MINIMAL.replace("https://www.ndbc.noaa.gov/mobile/region.php?reg=west", "west");
        assert!(Config::from_yaml(&text).is_err());
    }
}
