//! Weather extraction session.
//!
//! A [`WeatherExtractor`] walks through four states: no sources yet, sources
//! resolved, coordinates known and forecast known. Coordinates and the
//! forecast table are learned once and kept for the life of the session.

use std::mem;
use tracing::{debug, info, warn};
use url::Url;

use crate::coordinates::Coordinates;
use crate::error::{Result, WeatherError};
use crate::fetch::Fetcher;
use crate::forecast::{self, ForecastEntries, ForecastMarkup, ForecastTable};
use crate::html::{HtmlDocument, RawSection};
use crate::location::LocationResolver;
use crate::readings::{self, GroupedReadings, Readings};

/// Elements whose text makes up a report page's flat fragment list.
const CONTENT_TAGS: [&str; 3] = ["p", "h1", "h2"];
/// Top-level heading; the station position follows it.
const TITLE_TAG: &str = "h1";
/// Sub-heading that opens a section of readings.
const SECTION_TAG: &str = "h2";

#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Unresolved,
    Resolved {
        sources: Vec<Url>,
    },
    CoordinatesKnown {
        sources: Vec<Url>,
        coordinates: Coordinates,
    },
    ForecastKnown {
        sources: Vec<Url>,
        coordinates: Coordinates,
        table: ForecastTable,
    },
}

impl SessionState {
    pub fn sources(&self) -> &[Url] {
        match self {
            SessionState::Unresolved => &[],
            SessionState::Resolved { sources }
            | SessionState::CoordinatesKnown { sources, .. }
            | SessionState::ForecastKnown { sources, .. } => sources,
        }
    }

    pub fn coordinates(&self) -> Option<&Coordinates> {
        match self {
            SessionState::CoordinatesKnown { coordinates, .. }
            | SessionState::ForecastKnown { coordinates, .. } => Some(coordinates),
            _ => None,
        }
    }

    pub fn table(&self) -> Option<&ForecastTable> {
        match self {
            SessionState::ForecastKnown { table, .. } => Some(table),
            _ => None,
        }
    }

    /// Replace the sources, keeping anything already learned.
    fn with_sources(self, new_sources: Vec<Url>) -> Self {
        match self {
            SessionState::Unresolved | SessionState::Resolved { .. } => SessionState::Resolved {
                sources: new_sources,
            },
            SessionState::CoordinatesKnown { coordinates, .. } => SessionState::CoordinatesKnown {
                sources: new_sources,
                coordinates,
            },
            SessionState::ForecastKnown {
                coordinates, table, ..
            } => SessionState::ForecastKnown {
                sources: new_sources,
                coordinates,
                table,
            },
        }
    }

    /// Record coordinates unless some are already known.
    fn with_coordinates(self, coordinates: Coordinates) -> Self {
        match self {
            SessionState::Unresolved => SessionState::CoordinatesKnown {
                sources: Vec::new(),
                coordinates,
            },
            SessionState::Resolved { sources } => SessionState::CoordinatesKnown {
                sources,
                coordinates,
            },
            known => known,
        }
    }

    /// Record the forecast table. Only valid once coordinates are known.
    fn with_table(self, table: ForecastTable) -> Self {
        match self {
            SessionState::CoordinatesKnown {
                sources,
                coordinates,
            } => SessionState::ForecastKnown {
                sources,
                coordinates,
                table,
            },
            other => other,
        }
    }
}

/// Single-session extractor. Not meant to be shared between tasks; give
/// each concurrent request its own instance.
pub struct WeatherExtractor {
    fetcher: Fetcher,
    time_zone: String,
    forecast_base: String,
    markup: ForecastMarkup,
    state: SessionState,
    fragments: Vec<String>,
    sections: Vec<RawSection>,
}

impl WeatherExtractor {
    pub fn new(fetcher: Fetcher, time_zone: impl Into<String>) -> Self {
        Self {
            fetcher,
            time_zone: time_zone.into(),
            forecast_base: forecast::forecast_base(),
            markup: ForecastMarkup::default(),
            state: SessionState::Unresolved,
            fragments: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Start a session at known coordinates, skipping the directory lookup.
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.learn_coordinates(coordinates);
        self
    }

    pub fn with_forecast_base(mut self, base: impl Into<String>) -> Self {
        self.forecast_base = base.into();
        self
    }

    pub fn with_markup(mut self, markup: ForecastMarkup) -> Self {
        self.markup = markup;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn coordinates(&self) -> Option<&Coordinates> {
        self.state.coordinates()
    }

    /// Fragments gathered by the last `extract_all`, even if it failed part way.
    pub fn collected_fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Sections gathered by the last `extract_grouped`, even if it failed part way.
    pub fn collected_sections(&self) -> &[RawSection] {
        &self.sections
    }

    pub fn set_sources(&mut self, sources: Vec<Url>) {
        let state = mem::take(&mut self.state);
        self.state = state.with_sources(sources);
    }

    /// Resolve `search_key` against the directory and keep the matches.
    pub async fn resolve(&mut self, search_key: &str, directory_url: &str) -> Result<&[Url]> {
        let sources = LocationResolver::new(&self.fetcher)
            .resolve(search_key, directory_url)
            .await?;
        self.set_sources(sources);
        Ok(self.state.sources())
    }

    fn learn_coordinates(&mut self, coordinates: Coordinates) {
        if self.state.coordinates().is_some() {
            return;
        }
        info!("Station coordinates: {coordinates}");
        let state = mem::take(&mut self.state);
        self.state = state.with_coordinates(coordinates);
    }

    fn require_sources(&self) -> Result<Vec<Url>> {
        let sources = self.state.sources();
        if sources.is_empty() {
            return Err(WeatherError::SourcesNotSet);
        }
        Ok(sources.to_vec())
    }

    /// Every text fragment of every source page, boilerplate and blanks removed.
    ///
    /// If coordinates are still unknown they are guessed from the first
    /// fragment. A failed fetch stops the walk; fragments from earlier pages
    /// stay available through [`collected_fragments`](Self::collected_fragments).
    pub async fn extract_all(&mut self) -> Result<Vec<String>> {
        let sources = self.require_sources()?;
        self.fragments.clear();
        for url in &sources {
            let body = self.fetcher.get_text(url.as_str()).await?;
            let lines = HtmlDocument::parse(&body).lines_of(&CONTENT_TAGS)?;
            let cleaned = readings::clean_fragments(lines);
            debug!("{url}: {} fragments", cleaned.len());
            self.fragments.extend(cleaned);

            if self.coordinates().is_none() && !self.fragments.is_empty() {
                let guess = Coordinates::from_leading_tokens(&self.fragments[0]);
                match guess {
                    Some(coordinates) => self.learn_coordinates(coordinates),
                    None => debug!("First fragment does not start with coordinates"),
                }
            }
        }
        Ok(self.fragments.clone())
    }

    /// Section title → field → value across all source pages.
    ///
    /// Coordinates, when unknown, are read from the text after each page's
    /// title heading until one page yields them.
    pub async fn extract_grouped(&mut self) -> Result<GroupedReadings> {
        let sources = self.require_sources()?;
        self.sections.clear();
        for url in &sources {
            let body = self.fetcher.get_text(url.as_str()).await?;
            let doc = HtmlDocument::parse(&body);

            if self.coordinates().is_none() {
                match header_coordinates(&doc)? {
                    Some(coordinates) => self.learn_coordinates(coordinates),
                    None => warn!("No coordinates after the title of {url}"),
                }
            }

            for section in doc.sections(SECTION_TAG)? {
                if self.sections.iter().any(|s| s.title == section.title) {
                    debug!("Ignoring repeated section '{}' on {url}", section.title);
                    continue;
                }
                self.sections.push(section);
            }
        }
        Ok(readings::group_sections(&self.sections, &self.time_zone))
    }

    /// Flat or grouped readings depending on `flat`.
    pub async fn extract(&mut self, flat: bool) -> Result<Readings> {
        if flat {
            Ok(Readings::Flat(self.extract_all().await?))
        } else {
            Ok(Readings::Grouped(self.extract_grouped().await?))
        }
    }

    /// Fetch the hourly forecast for the session's coordinates.
    ///
    /// Returns whether the table has any field rows. Once a table is known
    /// it is reused and nothing is fetched again.
    pub async fn get_forecast(&mut self) -> Result<bool> {
        if let Some(table) = self.state.table() {
            return Ok(!table.is_empty());
        }

        let known = self.coordinates().cloned();
        let coordinates = match known {
            Some(coordinates) => coordinates,
            None => {
                let first = self
                    .state
                    .sources()
                    .first()
                    .cloned()
                    .ok_or(WeatherError::SelectionRequired)?;
                let body = self.fetcher.get_text(first.as_str()).await?;
                let coordinates = header_coordinates(&HtmlDocument::parse(&body))?
                    .ok_or_else(|| {
                        WeatherError::parse(format!("no station coordinates on {first}"))
                    })?;
                self.learn_coordinates(coordinates.clone());
                coordinates
            }
        };

        let url = forecast::forecast_url(&self.forecast_base, &coordinates);
        let body = self.fetcher.get_text(&url).await?;
        let table = forecast::parse_table(&HtmlDocument::parse(&body), &self.markup)?;
        info!("Forecast table has {} field rows", table.rows.len());

        let has_rows = !table.is_empty();
        let state = mem::take(&mut self.state);
        self.state = state.with_table(table);
        Ok(has_rows)
    }

    /// The first `hours_ahead` `(field, hour, value)` entries of every
    /// forecast row, fetching the table first if needed.
    pub async fn forecast(&mut self, hours_ahead: usize) -> Result<ForecastEntries<'_>> {
        self.get_forecast().await?;
        self.state
            .table()
            .map(|table| table.entries(hours_ahead))
            .ok_or(WeatherError::SelectionRequired)
    }
}

/// Coordinates printed right after the page title.
fn header_coordinates(doc: &HtmlDocument) -> Result<Option<Coordinates>> {
    Ok(doc
        .text_after_first(TITLE_TAG)?
        .and_then(|text| Coordinates::from_leading_tokens(&text)))
}
