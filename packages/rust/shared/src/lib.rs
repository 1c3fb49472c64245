//! Shared types, error model, diagnostics and configuration for valleydocs.
//!
//! This crate is the foundation depended on by all other valleydocs crates.
//! It provides:
//! - [`ValleyDocsError`]: the unified error type
//! - Domain types ([`Resource`], [`ChildLink`], [`Link`], [`UrlTable`])
//! - [`Diagnostics`]: the per-run accumulator of observed tags, URLs and entities
//! - Configuration ([`AppConfig`], [`ScrapeConfig`], config loading)

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod slug;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchConfig, OutputConfig, ScrapeConfig, SiteConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use diagnostics::Diagnostics;
pub use error::{Result, ValleyDocsError};
pub use slug::{clean_url, slugify};
pub use types::{ChildLink, ContentMode, IconMode, Link, Resource, UrlTable};
