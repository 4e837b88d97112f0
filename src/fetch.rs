//! Plain HTTP GET of report, directory and forecast pages.

use reqwest::Client;
use tracing::debug;

use crate::error::{Result, WeatherError};

const USER_AGENT: &str = concat!("marine-weather/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client. Requests are issued one at a time and never retried.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| WeatherError::Fetch {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }

    /// GET `url` and return the body, failing on transport errors and
    /// non-success statuses.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {url}");
        let fetch_err = |source| WeatherError::Fetch {
            url: url.to_string(),
            source,
        };
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_err)?;
        resp.text().await.map_err(fetch_err)
    }
}
