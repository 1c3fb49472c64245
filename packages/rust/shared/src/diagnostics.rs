//! Diagnostic accumulator for one scrape run.
//!
//! Collects what the normalizer and annotator saw (tags, classes, URLs, icon
//! glyphs, recognized entities) so the run can be reviewed afterwards. One
//! instance is created per scrape and passed around explicitly.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Distinct values observed while processing a site.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    /// Tag name → CSS classes seen on it.
    pub tag_classes: BTreeMap<String, BTreeSet<String>>,
    /// Tag name → normalized child types seen under it.
    pub tag_item_types: BTreeMap<String, BTreeSet<String>>,
    /// Rewritten link targets.
    pub urls: BTreeSet<String>,
    /// Private-use glyph (as `U+XXXX`) → mapped icon name.
    pub icons: BTreeMap<String, Option<String>>,
    /// Markup tags that had no conversion rule.
    pub unknown_tags: BTreeSet<String>,
    /// Pages whose fetch failed or returned nothing.
    pub failed_urls: BTreeSet<String>,
    pub missions: BTreeSet<String>,
    pub events: BTreeSet<String>,
    pub entries: BTreeSet<String>,
    pub rewards: BTreeSet<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_classes<'a>(&mut self, tag: &str, classes: impl IntoIterator<Item = &'a str>) {
        self.tag_classes
            .entry(tag.to_string())
            .or_default()
            .extend(classes.into_iter().map(str::to_string));
    }

    pub fn record_item_types<'a>(&mut self, tag: &str, types: impl IntoIterator<Item = &'a str>) {
        self.tag_item_types
            .entry(tag.to_string())
            .or_default()
            .extend(types.into_iter().map(str::to_string));
    }

    pub fn record_url(&mut self, url: &str) {
        self.urls.insert(url.to_string());
    }

    pub fn record_icon(&mut self, glyph: char, name: Option<&str>) {
        self.icons
            .insert(glyph_key(glyph), name.map(str::to_string));
    }

    pub fn record_unknown_tag(&mut self, tag: &str) {
        self.unknown_tags.insert(tag.to_string());
    }

    pub fn record_failed_url(&mut self, url: &str) {
        self.failed_urls.insert(url.to_string());
    }
}

/// Render a glyph as `U+E012` so dumps stay readable.
fn glyph_key(glyph: char) -> String {
    format!("U+{:04X}", glyph as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_distinct_and_sorted() {
        let mut diag = Diagnostics::new();
        diag.record_classes("span", ["red_text", "blue_text"]);
        diag.record_classes("span", ["red_text"]);
        diag.record_url("/b");
        diag.record_url("/a");
        diag.record_url("/b");

        let classes: Vec<_> = diag.tag_classes["span"].iter().cloned().collect();
        assert_eq!(classes, vec!["blue_text", "red_text"]);
        let urls: Vec<_> = diag.urls.iter().cloned().collect();
        assert_eq!(urls, vec!["/a", "/b"]);
    }

    #[test]
    fn icons_keyed_by_codepoint() {
        let mut diag = Diagnostics::new();
        diag.record_icon('\u{e012}', Some("connection"));
        diag.record_icon('\u{e0ff}', None);
        assert_eq!(diag.icons["U+E012"].as_deref(), Some("connection"));
        assert_eq!(diag.icons["U+E0FF"], None);
    }

    #[test]
    fn separate_runs_are_independent() {
        let mut first = Diagnostics::new();
        first.record_unknown_tag("table");
        let second = Diagnostics::new();
        assert!(second.unknown_tags.is_empty());
    }
}
