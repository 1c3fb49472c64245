//! Site crawling for valleydocs.
//!
//! This crate provides:
//! - [`fetch`]: the [`PageSource`] seam and the cached, retrying [`HttpPageSource`]
//! - [`navigation`]: breadcrumb, sub-navigation, title and content extraction
//! - [`engine`]: the depth-first [`Crawler`]

pub mod engine;
pub mod fetch;
pub mod navigation;

pub use engine::{Crawler, parse_page};
pub use fetch::{HttpPageSource, PageSource};
