//! Narrow view over a parsed HTML page.
//!
//! All knowledge of the sites' markup goes through the handful of queries
//! here: line-wise text of tagged elements, hyperlinks, the text after a
//! heading, sub-heading sections, and cells matching a CSS pattern.

use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, WeatherError};

/// Elements that end the current line of text when they open or close.
const BLOCK_TAGS: [&str; 13] = [
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "table", "tr", "li", "ul", "hr",
];

/// A parsed page.
pub struct HtmlDocument {
    html: Html,
}

/// A sub-heading and the lines of text that follow it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSection {
    pub title: String,
    pub items: Vec<String>,
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| WeatherError::parse(format!("invalid selector '{css}': {e:?}")))
}

/// Collapse whitespace runs into single spaces and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn flush_line(lines: &mut Vec<String>, current: &mut String) {
    let line = normalize_ws(current);
    if !line.is_empty() {
        lines.push(line);
    }
    current.clear();
}

fn collect_lines(element: ElementRef<'_>, lines: &mut Vec<String>, current: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            current.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if name == "br" {
                flush_line(lines, current);
            } else if BLOCK_TAGS.contains(&name) {
                flush_line(lines, current);
                collect_lines(child_el, lines, current);
                flush_line(lines, current);
            } else {
                collect_lines(child_el, lines, current);
            }
        }
    }
}

/// Text of an element split into lines at `<br>` and block boundaries.
pub fn element_lines(element: ElementRef<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    collect_lines(element, &mut lines, &mut current);
    flush_line(&mut lines, &mut current);
    lines
}

impl HtmlDocument {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// Lines of text of every element named in `tags`, in document order.
    pub fn lines_of(&self, tags: &[&str]) -> Result<Vec<String>> {
        let sel = selector(&tags.join(", "))?;
        Ok(self.html.select(&sel).flat_map(element_lines).collect())
    }

    /// `(label, href)` for every anchor carrying an `href`.
    pub fn links(&self) -> Result<Vec<(String, String)>> {
        let sel = selector("a[href]")?;
        Ok(self
            .html
            .select(&sel)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                Some((normalize_ws(&a.text().collect::<String>()), href.to_string()))
            })
            .collect())
    }

    /// Text immediately following the first `tag` element.
    ///
    /// Blank text nodes between the heading and its neighbour are skipped.
    pub fn text_after_first(&self, tag: &str) -> Result<Option<String>> {
        let sel = selector(tag)?;
        let Some(heading) = self.html.select(&sel).next() else {
            return Ok(None);
        };
        for sibling in heading.next_siblings() {
            if let Some(text) = sibling.value().as_text() {
                let text = normalize_ws(text);
                if !text.is_empty() {
                    return Ok(Some(text));
                }
            } else if let Some(el) = ElementRef::wrap(sibling) {
                let text = element_lines(el).join(" ");
                if !text.is_empty() {
                    return Ok(Some(text));
                }
            }
        }
        Ok(None)
    }

    /// Every `tag` heading with the content that directly follows it.
    ///
    /// The content is the next sibling element, stepping over at most one
    /// blank text node first. When the heading is followed by bare text
    /// instead, the run of text and inline markup up to the next block
    /// element is taken.
    pub fn sections(&self, tag: &str) -> Result<Vec<RawSection>> {
        let sel = selector(tag)?;
        let mut out = Vec::new();
        for heading in self.html.select(&sel) {
            let title = normalize_ws(&heading.text().collect::<String>());
            let mut siblings = heading.next_siblings().peekable();
            if siblings
                .peek()
                .and_then(|n| n.value().as_text())
                .is_some_and(|t| t.trim().is_empty())
            {
                siblings.next();
            }

            let mut items = Vec::new();
            let mut current = String::new();
            let next_el = siblings.peek().and_then(|n| ElementRef::wrap(*n));
            match next_el {
                Some(el) if BLOCK_TAGS.contains(&el.value().name()) => items = element_lines(el),
                _ => {
                    for node in siblings {
                        if let Some(text) = node.value().as_text() {
                            current.push_str(text);
                        } else if let Some(el) = ElementRef::wrap(node) {
                            let name = el.value().name();
                            if name == "br" {
                                flush_line(&mut items, &mut current);
                            } else if BLOCK_TAGS.contains(&name) {
                                break;
                            } else {
                                collect_lines(el, &mut items, &mut current);
                            }
                        }
                    }
                }
            }
            flush_line(&mut items, &mut current);
            out.push(RawSection { title, items });
        }
        Ok(out)
    }

    /// Trimmed text of every cell matching the CSS pattern, in order.
    pub fn cell_texts(&self, css: &str) -> Result<Vec<String>> {
        let sel = selector(css)?;
        Ok(self
            .html
            .select(&sel)
            .map(|cell| normalize_ws(&cell.text().collect::<String>()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_split_on_breaks_and_join_inline_markup() {
        let doc = HtmlDocument::parse(
            "<html><body><p><b>Wind:</b> W (270&#176;), 11.7 kt<br>\n<b>Air Temp:</b>   55.0 &#176;F</p></body></html>",
        );
        let lines = doc.lines_of(&["p"]).unwrap();
        assert_eq!(lines, vec!["Wind: W (270°), 11.7 kt", "Air Temp: 55.0 °F"]);
    }

    #[test]
    fn text_after_heading_skips_blank_nodes() {
        let doc = HtmlDocument::parse(
            "<body><h1>Station 46026</h1>\n  <p>37.755N 122.839W</p></body>",
        );
        assert_eq!(
            doc.text_after_first("h1").unwrap().as_deref(),
            Some("37.755N 122.839W")
        );
    }

    #[test]
    fn text_after_heading_reads_bare_text() {
        let doc = HtmlDocument::parse("<body><h1>Station</h1>37.755N 122.839W<br></body>");
        assert_eq!(
            doc.text_after_first("h1").unwrap().as_deref(),
            Some("37.755N 122.839W")
        );
    }

    #[test]
    fn missing_heading_is_none() {
        let doc = HtmlDocument::parse("<body><p>nothing</p></body>");
        assert_eq!(doc.text_after_first("h1").unwrap(), None);
    }

    #[test]
    fn sections_take_following_paragraph() {
        let doc = HtmlDocument::parse(
            "<body><h2>Weather Conditions</h2>\n<p>Air Temp: 66.0<br>Wind: 10 mph</p>\
             <h2>Wave Summary</h2><p>Seas: 4 ft</p></body>",
        );
        let sections = doc.sections("h2").unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Weather Conditions");
        assert_eq!(sections[0].items, vec!["Air Temp: 66.0", "Wind: 10 mph"]);
        assert_eq!(sections[1].items, vec!["Seas: 4 ft"]);
    }

    #[test]
    fn sections_take_bare_text_run_until_next_block() {
        let doc = HtmlDocument::parse(
            "<body><h2>Conditions</h2><b>Air Temp:</b> 66.0<br>Wind: 10 mph<br><h2>Next</h2></body>",
        );
        let sections = doc.sections("h2").unwrap();
        assert_eq!(sections[0].items, vec!["Air Temp: 66.0", "Wind: 10 mph"]);
        assert!(sections[1].items.is_empty());
    }

    #[test]
    fn links_keep_label_and_href() {
        let doc = HtmlDocument::parse(
            r#"<body><a href="station.php?station=46026">San Francisco</a><a>no href</a></body>"#,
        );
        assert_eq!(
            doc.links().unwrap(),
            vec![(
                "San Francisco".to_string(),
                "station.php?station=46026".to_string()
            )]
        );
    }

    #[test]
    fn cell_texts_match_attribute_pattern() {
        let doc = HtmlDocument::parse(
            r#"<table><tr><td class="a">1</td><td class="b">x</td><td class="a"> 2 </td></tr></table>"#,
        );
        assert_eq!(doc.cell_texts(r#"td[class="a"]"#).unwrap(), vec!["1", "2"]);
    }
}
