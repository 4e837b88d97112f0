//! Error taxonomy for the extraction core.

use thiserror::Error;

/// Every failure the fetch/parse pipeline can surface to its caller.
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Network or HTTP status failure while fetching a page
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The page did not have the structure the extractor expects
    #[error("unrecognized page structure: {message}")]
    Parse { message: String },

    /// The search key matched no entry of the location directory
    #[error("no location matching '{search_key}' in {directory}")]
    NotFound {
        search_key: String,
        directory: String,
    },

    /// Extraction was requested before any source URL was resolved
    #[error("no weather sources resolved yet")]
    SourcesNotSet,

    /// A forecast was requested without sources or coordinates to locate it
    #[error("no location selected; resolve a location or supply coordinates first")]
    SelectionRequired,

    /// The forecast grid's value cells do not fill its declared geometry
    #[error(
        "forecast table has {found} value cells, expected {expected} ({fields} rows x {hours} hours)"
    )]
    MalformedTable {
        fields: usize,
        hours: usize,
        expected: usize,
        found: usize,
    },
}

impl WeatherError {
    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::Fetch { url, .. } => {
                format!("Could not reach {url}. Please check your internet connection.")
            }
            WeatherError::Parse { .. } => {
                "The weather site returned a page in an unexpected format.".to_string()
            }
            WeatherError::NotFound {
                search_key,
                directory,
            } => format!("No location matches '{search_key}'. Valid locations are listed at {directory}"),
            WeatherError::SourcesNotSet | WeatherError::SelectionRequired => {
                "Select a location before requesting weather data.".to_string()
            }
            WeatherError::MalformedTable { .. } => {
                "The forecast table could not be read.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, WeatherError>;
