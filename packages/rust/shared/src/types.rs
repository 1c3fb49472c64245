//! Core domain types shared across the valleydocs crates.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValleyDocsError;

/// Maps a crawled page path (trailing slash stripped) to its resource id.
pub type UrlTable = HashMap<String, String>;

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// A navigation link to a child page, as listed by the active sub-menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildLink {
    /// Slug of the child's navigation label.
    pub id: String,
    /// Display title of the child link.
    pub title: String,
    /// Site-relative href with trailing slash stripped.
    pub url: String,
}

/// One crawled page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Slash-separated path of slugified breadcrumb labels.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Site-relative URL the page was fetched from.
    pub url: String,
    /// Children listed in the active sub-navigation, in order.
    pub child_links: Vec<ChildLink>,
    /// Outer HTML of the content region; `None` for navigation hubs.
    pub content_html: Option<String>,
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// `{id, title}` pair used for navigation, anchors and lookup listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub title: String,
}

impl Link {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output modes
// ---------------------------------------------------------------------------

/// How icon nodes are rendered in markup output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconMode {
    /// Bracketed text form, e.g. `[harm]`.
    Text,
    /// Structured `<icon icon="harm">` element.
    #[default]
    Element,
}

/// Encoding of the `content` field in resource records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// Markup string.
    #[default]
    Xhtml,
    /// Nested plain objects.
    Json,
}

impl fmt::Display for IconMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IconMode::Text => write!(f, "text"),
            IconMode::Element => write!(f, "element"),
        }
    }
}

impl FromStr for IconMode {
    type Err = ValleyDocsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(IconMode::Text),
            "element" => Ok(IconMode::Element),
            other => Err(ValleyDocsError::validation(format!(
                "unknown icon mode: {other}"
            ))),
        }
    }
}

impl fmt::Display for ContentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentMode::Xhtml => write!(f, "xhtml"),
            ContentMode::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ContentMode {
    type Err = ValleyDocsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xhtml" => Ok(ContentMode::Xhtml),
            "json" => Ok(ContentMode::Json),
            other => Err(ValleyDocsError::validation(format!(
                "unknown content mode: {other}"
            ))),
        }
    }
}
