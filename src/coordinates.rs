//! Station coordinates as printed on report pages ("37.755N 122.839W").

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// A numeric token optionally followed by one hemisphere letter.
static COORD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\d+(?:\.\d+)?)[NSEWnsew]?$").unwrap());

/// Latitude/longitude kept as the numeric strings the page printed, with the
/// hemisphere letters removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

impl Coordinates {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }

    /// Read the first two whitespace-separated tokens of `text`.
    ///
    /// Returns `None` unless both tokens are numbers once a trailing
    /// hemisphere letter is dropped.
    pub fn from_leading_tokens(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let latitude = strip_hemisphere(tokens.next()?)?;
        let longitude = strip_hemisphere(tokens.next()?)?;
        Some(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

fn strip_hemisphere(token: &str) -> Option<String> {
    COORD_TOKEN
        .captures(token)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_hemisphere_letters() {
        let c = Coordinates::from_leading_tokens("37.755N 122.839W").unwrap();
        assert_eq!(c, Coordinates::new("37.755", "122.839"));
    }

    #[test]
    fn ignores_trailing_tokens() {
        let c = Coordinates::from_leading_tokens("21.67S 158.12E (Station)").unwrap();
        assert_eq!(c.latitude, "21.67");
        assert_eq!(c.longitude, "158.12");
    }

    #[test]
    fn rejects_non_numeric_tokens() {
        assert!(Coordinates::from_leading_tokens("Station 46026").is_none());
        assert!(Coordinates::from_leading_tokens("37.755N").is_none());
        assert!(Coordinates::from_leading_tokens("").is_none());
    }

    #[test]
    fn display_joins_pair() {
        assert_eq!(Coordinates::new("37.7", "122.8").to_string(), "37.7, 122.8");
    }
}
