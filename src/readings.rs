//! Current-condition readings in the two shapes the extractor produces.

use crate::html::RawSection;

/// Tokens that mark site boilerplate (footer, feedback and contact lines).
pub const NOISE_TOKENS: [&str; 3] = ["Feedback:", "Main", "webmaster.ndbc@noaa.gov"];

/// Token that marks a UTC timestamp line.
pub const GMT_MARKER: &str = "GMT";

/// Title of the synthesized timestamp entry.
pub const TIME_KEY: &str = "Time";

/// Readings as handed to the message formatter.
#[derive(Debug, Clone, PartialEq)]
pub enum Readings {
    /// Every text fragment of the report pages, boilerplate removed
    Flat(Vec<String>),
    /// Field values grouped by section title
    Grouped(GroupedReadings),
}

/// One `name: value` reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub fields: Vec<Field>,
}

impl Section {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Section title → field name → value, plus a page-level time when no
/// section carried one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedReadings {
    pub sections: Vec<Section>,
    pub time: Option<String>,
}

impl GroupedReadings {
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.time.is_none()
    }
}

/// True when some word of `text`, with surrounding punctuation removed,
/// equals `token`. Matches "PDT" in "(6:50 am PDT)" but not in "PDTX".
fn has_token(text: &str, token: &str) -> bool {
    text.split_whitespace()
        .any(|t| t.trim_matches(|c: char| !c.is_alphanumeric()) == token)
}

/// True when any token of `fragment` is a known boilerplate token.
pub fn is_noise(fragment: &str) -> bool {
    fragment
        .split_whitespace()
        .any(|t| NOISE_TOKENS.contains(&t))
}

/// Drop boilerplate and blank fragments, trimming the rest.
pub fn clean_fragments<I>(fragments: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    fragments
        .into_iter()
        .filter(|f| !is_noise(f))
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Split `item` at its first colon into a trimmed `(name, value)`.
fn split_field(item: &str) -> Option<Field> {
    let (name, value) = item.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(Field {
        name: name.to_string(),
        value: value.trim().to_string(),
    })
}

/// Normalize raw sections into grouped readings.
///
/// The first section with a given title wins; later ones are ignored even
/// when their content differs. Items that are blank, carry the GMT marker or
/// the `time_zone` marker, or have no colon are not fields. When no section
/// produced a `Time` field, the first item anywhere carrying `time_zone`
/// becomes the page-level time.
pub fn group_sections(raw: &[RawSection], time_zone: &str) -> GroupedReadings {
    let mut seen: Vec<&str> = Vec::new();
    let mut grouped = GroupedReadings::default();

    for section in raw {
        if seen.contains(&section.title.as_str()) {
            continue;
        }
        seen.push(&section.title);

        let mut fields: Vec<Field> = Vec::new();
        for item in &section.items {
            if item.trim().is_empty() || has_token(item, GMT_MARKER) || has_token(item, time_zone) {
                continue;
            }
            let Some(field) = split_field(item) else {
                continue;
            };
            match fields.iter_mut().find(|f| f.name == field.name) {
                Some(existing) => existing.value = field.value,
                None => fields.push(field),
            }
        }
        if !fields.is_empty() {
            grouped.sections.push(Section {
                title: section.title.clone(),
                fields,
            });
        }
    }

    let has_time = grouped.sections.iter().any(|s| s.get(TIME_KEY).is_some());
    if !has_time {
        grouped.time = raw
            .iter()
            .flat_map(|s| s.items.iter())
            .find(|item| has_token(item, time_zone))
            .map(|item| item.trim().to_string());
    }
    grouped
}
