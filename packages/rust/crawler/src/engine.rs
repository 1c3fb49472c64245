//! Depth-first crawler over the site's navigation tree.
//!
//! Each page is fetched, its breadcrumb and sub-navigation read, and its
//! children visited before its next sibling. Pages are fetched one at a time.

use std::collections::HashSet;

use scraper::Html;
use tracing::{debug, info, instrument, warn};

use valleydocs_shared::{Diagnostics, Resource, clean_url};

use crate::fetch::PageSource;
use crate::navigation;

/// Crawls a site through a [`PageSource`].
pub struct Crawler<S> {
    source: S,
}

impl<S: PageSource> Crawler<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Crawl every entry path and its descendants, in pre-order.
    pub async fn crawl(&self, entry_paths: &[String], diagnostics: &mut Diagnostics) -> Vec<Resource> {
        self.crawl_with(entry_paths, diagnostics, |_| {}).await
    }

    /// Like [`crawl`](Self::crawl), calling `on_page` as each resource is found.
    ///
    /// A page that fails to fetch or comes back empty is logged, recorded in
    /// `diagnostics.failed_urls` and skipped along with its would-be children.
    /// A path already visited in this crawl is skipped.
    #[instrument(skip_all, fields(entries = entry_paths.len()))]
    pub async fn crawl_with(
        &self,
        entry_paths: &[String],
        diagnostics: &mut Diagnostics,
        mut on_page: impl FnMut(&Resource),
    ) -> Vec<Resource> {
        let mut stack: Vec<String> = entry_paths.iter().rev().cloned().collect();
        let mut visited = HashSet::new();
        let mut resources = Vec::new();

        info!("starting crawl");

        while let Some(path) = stack.pop() {
            let path = clean_url(&path).to_string();
            if !visited.insert(path.clone()) {
                warn!(%path, "page already visited, skipping");
                continue;
            }

            let body = match self.source.fetch(&path).await {
                Ok(body) if !body.trim().is_empty() => body,
                Ok(_) => {
                    warn!(%path, "page is empty");
                    diagnostics.record_failed_url(&path);
                    continue;
                }
                Err(e) => {
                    warn!(%path, error = %e, "failed to fetch page");
                    diagnostics.record_failed_url(&path);
                    continue;
                }
            };

            let resource = parse_page(&path, &body);
            debug!(
                %path,
                resource_id = %resource.id,
                children = resource.child_links.len(),
                "crawled page"
            );

            stack.extend(resource.child_links.iter().rev().map(|link| link.url.clone()));
            on_page(&resource);
            resources.push(resource);
        }

        info!(
            pages = resources.len(),
            failed = diagnostics.failed_urls.len(),
            "crawl completed"
        );
        resources
    }
}

/// Build a [`Resource`] from a fetched page.
pub fn parse_page(path: &str, body: &str) -> Resource {
    let doc = Html::parse_document(body);
    Resource {
        id: navigation::resource_id(&doc),
        title: navigation::page_title(&doc),
        url: path.to_string(),
        child_links: navigation::child_links(&doc),
        content_html: navigation::content_html(&doc),
    }
}
