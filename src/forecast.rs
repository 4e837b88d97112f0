//! Hourly digital forecast grid.
//!
//! The forecast page lays the grid out as positional cells: one run of hour
//! labels, one label per field row, and the values flattened row by row.
//! [`build_table`] puts them back together.

use std::env;
use tracing::debug;

use crate::coordinates::Coordinates;
use crate::error::{Result, WeatherError};
use crate::html::HtmlDocument;

/// Default number of hours `forecast` yields per field.
pub const DEFAULT_HOURS_AHEAD: usize = 6;

/// Row label that precedes the date cells; not a field.
const DATE_LABEL: &str = "Date";

/// Gets the base url of the forecast service
pub fn forecast_base() -> String {
    env::var("NOAA_FORECAST_BASE").unwrap_or_else(|_| "http://forecast.weather.gov".to_string())
}

/// Digital forecast URL for `coords`.
///
/// The longitude is always sent negated, which is only right for the
/// western hemisphere.
pub fn forecast_url(base: &str, coords: &Coordinates) -> String {
    format!(
        "{}/MapClick.php?lat={}&lon=-{}&unit=0&lg=english&FcstType=digital",
        base.trim_end_matches('/'),
        urlencoding::encode(&coords.latitude),
        urlencoding::encode(&coords.longitude)
    )
}

/// CSS patterns picking the three kinds of cell out of the forecast page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastMarkup {
    pub hour_cells: String,
    pub field_labels: String,
    pub value_cells: String,
}

impl Default for ForecastMarkup {
    fn default() -> Self {
        Self {
            hour_cells: r#"td[class="hour"][width="3%"]"#.to_string(),
            field_labels: r#"td[align="left"][width="5%"]"#.to_string(),
            value_cells: r#"td[align="center"][width="3%"]"#.to_string(),
        }
    }
}

/// Hour label → value for one field, in page order. Blank cells are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRow {
    pub field: String,
    pub hours: Vec<(String, Option<String>)>,
}

impl ForecastRow {
    pub fn value_at(&self, hour: &str) -> Option<&str> {
        self.hours
            .iter()
            .find(|(h, _)| h == hour)
            .and_then(|(_, v)| v.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastTable {
    pub rows: Vec<ForecastRow>,
}

impl ForecastTable {
    pub fn row(&self, field: &str) -> Option<&ForecastRow> {
        self.rows.iter().find(|r| r.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first `hours_ahead` entries of every row, skipping blanks.
    pub fn entries(&self, hours_ahead: usize) -> ForecastEntries<'_> {
        ForecastEntries {
            table: self,
            hours_ahead,
            row: 0,
            col: 0,
        }
    }
}

/// One `(field, hour, value)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastEntry<'a> {
    pub field: &'a str,
    pub hour: &'a str,
    pub value: &'a str,
}

/// Lazy walk over a [`ForecastTable`], row by row.
#[derive(Debug, Clone)]
pub struct ForecastEntries<'a> {
    table: &'a ForecastTable,
    hours_ahead: usize,
    row: usize,
    col: usize,
}

impl<'a> Iterator for ForecastEntries<'a> {
    type Item = ForecastEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        while let Some(row) = table.rows.get(self.row) {
            let window = row.hours.len().min(self.hours_ahead);
            while self.col < window {
                let (hour, value) = &row.hours[self.col];
                self.col += 1;
                if let Some(value) = value {
                    return Some(ForecastEntry {
                        field: &row.field,
                        hour,
                        value,
                    });
                }
            }
            self.row += 1;
            self.col = 0;
        }
        None
    }
}

/// Rebuild the grid from its positional parts.
///
/// `values` must hold exactly `fields.len() * hours.len()` cells; chunk `i`
/// of `hours.len()` values belongs to `fields[i]`.
pub fn build_table(
    hours: &[String],
    fields: &[String],
    values: Vec<Option<String>>,
) -> Result<ForecastTable> {
    let expected = hours.len() * fields.len();
    if values.len() != expected {
        return Err(WeatherError::MalformedTable {
            fields: fields.len(),
            hours: hours.len(),
            expected,
            found: values.len(),
        });
    }

    let mut values = values.into_iter();
    let rows = fields
        .iter()
        .map(|field| ForecastRow {
            field: field.clone(),
            hours: hours.iter().cloned().zip(values.by_ref()).collect(),
        })
        .collect();
    Ok(ForecastTable { rows })
}

/// Read the forecast grid out of a digital forecast page.
pub fn parse_table(doc: &HtmlDocument, markup: &ForecastMarkup) -> Result<ForecastTable> {
    let hours = doc.cell_texts(&markup.hour_cells)?;
    let fields: Vec<String> = doc
        .cell_texts(&markup.field_labels)?
        .into_iter()
        .filter(|label| label != DATE_LABEL)
        .collect();
    let values = doc
        .cell_texts(&markup.value_cells)?
        .into_iter()
        .map(|v| if v.is_empty() { None } else { Some(v) })
        .collect();
    debug!("Forecast grid: {} fields x {} hours", fields.len(), hours.len());
    build_table(&hours, &fields, values)
}
