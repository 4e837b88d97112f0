//! Plain-text rendering of readings and forecast entries.

use crate::forecast::ForecastEntry;
use crate::readings::{Readings, TIME_KEY};

/// Render readings as newline-separated text.
pub fn render_readings(readings: &Readings) -> String {
    match readings {
        Readings::Flat(fragments) => fragments.join("\n"),
        Readings::Grouped(grouped) => {
            let mut s = String::new();
            for section in &grouped.sections {
                s.push_str(&section.title);
                s.push('\n');
                for field in &section.fields {
                    s.push_str(&format!("{} {}\n", field.name, field.value));
                }
            }
            if let Some(time) = &grouped.time {
                s.push_str(&format!("{TIME_KEY}\n{time}\n"));
            }
            s
        }
    }
}

/// One `field\thour\tvalue` row per entry.
pub fn render_forecast<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = ForecastEntry<'a>>,
{
    entries
        .into_iter()
        .map(|e| format!("{}\t{}\t{}\n", e.field, e.hour, e.value))
        .collect()
}

/// The full message: location label, readings, then the forecast if any.
pub fn compose(location: &str, readings: &Readings, forecast: &str) -> String {
    let mut msg = format!("{location}\n{}", render_readings(readings));
    if !forecast.is_empty() {
        if !msg.ends_with('\n') {
            msg.push('\n');
        }
        msg.push_str("Forecast\n");
        msg.push_str(forecast);
    }
    msg
}
