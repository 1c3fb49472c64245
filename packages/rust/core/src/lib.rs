//! Scrape pipeline for valleydocs.
//!
//! This crate ties together crawling, content transformation and output into
//! one run ([`pipeline::scrape`]), and owns the cross-page indexes the run
//! builds along the way.

pub mod index;
pub mod output;
pub mod pipeline;

pub use index::{Narration, ResourceIndex, anchors, lookup_group, narrations};
pub use output::{ResourceRecord, TranscriptRow};
pub use pipeline::{ProgressReporter, ScrapeResult, SilentProgress, Site, build_site, scrape};
