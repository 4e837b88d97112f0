//! Location directory lookup.
//!
//! A region page on the mobile site lists stations as plain hyperlinks.
//! This module turns that page into a label → URL directory and picks the
//! report pages whose label matches a search key.

use tracing::{debug, info};
use url::Url;

use crate::error::{Result, WeatherError};
use crate::fetch::Fetcher;
use crate::html::HtmlDocument;

/// One directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationEntry {
    pub label: String,
    pub url: Url,
}

/// Ordered label → URL mapping read from a directory page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationDirectory {
    entries: Vec<LocationEntry>,
}

impl LocationDirectory {
    /// Insert or replace in place, keeping first-seen order.
    pub fn insert(&mut self, label: String, url: Url) {
        match self.entries.iter_mut().find(|e| e.label == label) {
            Some(entry) => entry.url = url,
            None => self.entries.push(LocationEntry { label, url }),
        }
    }

    pub fn get(&self, label: &str) -> Option<&Url> {
        self.entries.iter().find(|e| e.label == label).map(|e| &e.url)
    }

    pub fn entries(&self) -> &[LocationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// URLs of every entry whose label contains `search_key`, ignoring case.
    pub fn matching(&self, search_key: &str) -> Vec<Url> {
        let needle = search_key.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.label.to_lowercase().contains(&needle))
            .map(|e| e.url.clone())
            .collect()
    }
}

/// Build the directory from an already parsed page at `page_url`.
///
/// Mail links (labels containing `@`) and anchors with no label are left
/// out; hrefs are resolved against `page_url`.
pub fn parse_directory(doc: &HtmlDocument, page_url: &Url) -> Result<LocationDirectory> {
    let links = doc.links()?;
    if links.is_empty() {
        return Err(WeatherError::parse(format!("no hyperlinks found at {page_url}")));
    }

    let mut directory = LocationDirectory::default();
    for (label, href) in links {
        if label.is_empty() || label.contains('@') {
            continue;
        }
        match page_url.join(&href) {
            Ok(url) => directory.insert(label, url),
            Err(e) => debug!("Skipping link '{label}' with unusable href {href}: {e}"),
        }
    }
    Ok(directory)
}

/// Fetches directory pages and resolves search keys to report URLs.
pub struct LocationResolver<'a> {
    fetcher: &'a Fetcher,
}

impl<'a> LocationResolver<'a> {
    pub fn new(fetcher: &'a Fetcher) -> Self {
        Self { fetcher }
    }

    /// Fetch and parse the directory page at `directory_url`.
    pub async fn list_locations(&self, directory_url: &str) -> Result<LocationDirectory> {
        let page_url = Url::parse(directory_url)
            .map_err(|e| WeatherError::parse(format!("bad directory URL {directory_url}: {e}")))?;
        let body = self.fetcher.get_text(page_url.as_str()).await?;
        let directory = parse_directory(&HtmlDocument::parse(&body), &page_url)?;
        debug!("Directory {directory_url} lists {} locations", directory.len());
        Ok(directory)
    }

    /// Report URLs whose label contains `search_key`, in directory order.
    pub async fn resolve(&self, search_key: &str, directory_url: &str) -> Result<Vec<Url>> {
        let directory = self.list_locations(directory_url).await?;
        let sources = directory.matching(search_key);
        if sources.is_empty() {
            return Err(WeatherError::NotFound {
                search_key: search_key.to_string(),
                directory: directory_url.to_string(),
            });
        }
        info!("Resolved '{search_key}' to {} source(s)", sources.len());
        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGION: &str = r#"<html><body>
        <h1>West Coast</h1>
        <a href="station.php?station=46026">46026 - San Francisco</a><br>
        <a href="station.php?station=46237">46237 - San Francisco Bar</a><br>
        <a href="/mobile/station.php?station=46042">46042 - Monterey</a><br>
        <a href="mailto:webmaster.ndbc@noaa.gov">webmaster.ndbc@noaa.gov</a>
        <a href="index.php">Main</a>
    </body></html>"#;

    fn page_url() -> Url {
        Url::parse("https://www.ndbc.noaa.gov/mobile/region.php?reg=west").unwrap()
    }

    #[test]
    fn excludes_mail_links_and_resolves_hrefs() {
        let dir = parse_directory(&HtmlDocument::parse(REGION), &page_url()).unwrap();
        assert_eq!(dir.len(), 4);
        assert!(dir.entries().iter().all(|e| !e.label.contains('@')));
        assert_eq!(
            dir.get("46026 - San Francisco").unwrap().as_str(),
            "https://www.ndbc.noaa.gov/mobile/station.php?station=46026"
        );
        assert_eq!(
            dir.get("46042 - Monterey").unwrap().as_str(),
            "https://www.ndbc.noaa.gov/mobile/station.php?station=46042"
        );
    }

    #[test]
    fn matching_is_case_insensitive_and_ordered() {
        let dir = parse_directory(&HtmlDocument::parse(REGION), &page_url()).unwrap();
        let urls = dir.matching("san francisco");
        assert_eq!(urls.len(), 2);
        assert!(urls[0].as_str().ends_with("46026"));
        assert!(urls[1].as_str().ends_with("46237"));
        assert_eq!(dir.matching("MONTEREY").len(), 1);
        assert!(dir.matching("Seattle").is_empty());
    }

    #[test]
    fn repeated_label_replaces_url_in_place() {
        let mut dir = LocationDirectory::default();
        dir.insert("A".into(), Url::parse("http://x/1").unwrap());
        dir.insert("B".into(), Url::parse("http://x/2").unwrap());
        dir.insert("A".into(), Url::parse("http://x/3").unwrap());
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.entries()[0].url.as_str(), "http://x/3");
    }

    #[test]
    fn page_without_links_is_parse_error() {
        let err = parse_directory(&HtmlDocument::parse("<p>down for maintenance</p>"), &page_url())
            .unwrap_err();
        assert!(matches!(err, WeatherError::Parse { .. }));
    }
}
