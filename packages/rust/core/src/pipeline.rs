//! End-to-end scrape: crawl → index → normalize/annotate → render → write.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use valleydocs_crawler::{Crawler, PageSource};
use valleydocs_markup::{
    NarrationIds, NormalizeContext, Session, Tag, annotate, narration_text, normalize_fragment,
    to_markup, to_plain,
};
use valleydocs_shared::{
    ContentMode, Diagnostics, Link, Resource, Result, ScrapeConfig, ValleyDocsError, clean_url,
};

use crate::index::{self, Narration, ResourceIndex, lookup_group};
use crate::output::{self, ResourceRecord, TranscriptRow};

/// Summary of a completed scrape.
#[derive(Debug)]
pub struct ScrapeResult {
    /// Pages written (excluding the root record).
    pub resources: usize,
    /// Narration rows across all transcripts.
    pub narrations: usize,
    /// Pages that could not be fetched.
    pub failed_urls: usize,
    pub elapsed: Duration,
}

/// Everything produced for one site, ready to write.
#[derive(Debug)]
pub struct Site {
    pub root: ResourceRecord,
    pub records: Vec<ResourceRecord>,
    /// Lookup group → transcript rows, in crawl order.
    pub transcripts: BTreeMap<String, Vec<TranscriptRow>>,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called as each page is crawled.
    fn page_crawled(&self, url: &str, count: usize);
    /// Called as each page is rendered.
    fn page_rendered(&self, resource_id: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &ScrapeResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_crawled(&self, _url: &str, _count: usize) {}
    fn page_rendered(&self, _resource_id: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &ScrapeResult) {}
}

/// Run the full scrape.
///
/// 1. Crawl every entry page once, keeping each page's content
/// 2. Build the URL, title and lookup indexes
/// 3. Render every page into a record and collect narrations
/// 4. Clear the output and log directories and write everything
#[instrument(skip_all, fields(base_url = %config.base_url))]
pub async fn scrape<S: PageSource>(
    config: &ScrapeConfig,
    source: S,
    progress: &dyn ProgressReporter,
) -> Result<ScrapeResult> {
    let start = Instant::now();
    let mut diagnostics = Diagnostics::new();

    info!(entries = config.entry_pages.len(), "starting scrape");

    // --- Phase 1: Crawl ---
    progress.phase("Crawling site");
    let crawler = Crawler::new(source);
    let mut crawled = 0;
    let resources = crawler
        .crawl_with(&config.entry_pages, &mut diagnostics, |resource| {
            crawled += 1;
            progress.page_crawled(&resource.url, crawled);
        })
        .await;

    if resources.is_empty() {
        return Err(ValleyDocsError::validation(
            "no pages could be fetched from the configured entry pages",
        ));
    }

    // --- Phase 2: Index ---
    progress.phase("Indexing resources");
    let index = ResourceIndex::build(&resources);

    // --- Phase 3: Render ---
    progress.phase("Rendering pages");
    let site = build_site(config, &resources, &index, &mut diagnostics, progress)?;

    // --- Phase 4: Write ---
    progress.phase("Writing output");
    output::reset_dir(&config.output_dir)?;
    output::reset_dir(&config.log_dir)?;
    output::write_records(&config.output_dir, &site.root, &site.records)?;
    output::write_transcripts(&config.output_dir, &site.transcripts)?;
    output::write_diagnostics(&config.log_dir, &diagnostics)?;

    let result = ScrapeResult {
        resources: site.records.len(),
        narrations: site.transcripts.values().map(Vec::len).sum(),
        failed_urls: diagnostics.failed_urls.len(),
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        resources = result.resources,
        narrations = result.narrations,
        failed_urls = result.failed_urls,
        elapsed_ms = result.elapsed.as_millis(),
        "scrape complete"
    );

    Ok(result)
}

/// Render crawled resources into records, the root record and transcripts.
pub fn build_site(
    config: &ScrapeConfig,
    resources: &[Resource],
    index: &ResourceIndex,
    diagnostics: &mut Diagnostics,
    progress: &dyn ProgressReporter,
) -> Result<Site> {
    let mut narration_ids = NarrationIds::new();
    let mut records = Vec::with_capacity(resources.len());
    let mut transcripts: BTreeMap<String, Vec<TranscriptRow>> = BTreeMap::new();

    for (i, resource) in resources.iter().enumerate() {
        let items = match &resource.content_html {
            Some(html) => {
                let ctx = NormalizeContext::new(&resource.id, &config.base_url, &index.urls);
                let mut session = Session {
                    diagnostics: &mut *diagnostics,
                    narrations: &mut narration_ids,
                };
                let items = normalize_fragment(&ctx, html, &mut session);
                annotate(&resource.id, items, diagnostics)
            }
            None => Vec::new(),
        };

        if let Some(group) = lookup_group(&resource.id) {
            let rows = index::narrations(&resource.id, &resource.url, &items)
                .iter()
                .map(|narration| transcript_row(config, narration))
                .collect::<Vec<_>>();
            if !rows.is_empty() {
                transcripts.entry(group).or_default().extend(rows);
            }
        }

        records.push(resource_record(config, resource, index, &items)?);
        progress.page_rendered(&resource.id, i + 1, resources.len());
        debug!(resource_id = %resource.id, items = items.len(), "rendered page");
    }

    Ok(Site {
        root: root_record(config, index),
        records,
        transcripts,
    })
}

fn resource_record(
    config: &ScrapeConfig,
    resource: &Resource,
    index: &ResourceIndex,
    items: &[Tag],
) -> Result<ResourceRecord> {
    let content = if items.is_empty() {
        None
    } else {
        Some(match config.content_mode {
            ContentMode::Xhtml => {
                serde_json::Value::String(to_markup(&resource.id, items, config.icon_mode))
            }
            ContentMode::Json => to_plain(items)?,
        })
    };

    let mut links: Vec<Link> = resource
        .child_links
        .iter()
        .map(|child| Link::new(format!("{}/{}", resource.id, child.id), &child.title))
        .collect();
    links.extend(index::anchors(items));

    Ok(ResourceRecord {
        id: resource.id.clone(),
        title: resource.title.clone(),
        content,
        links,
        lookup: index.lookup_listing(&resource.id),
        url: clean_url(&resource.url).to_string(),
    })
}

/// The synthetic top-level record listing the entry pages.
fn root_record(config: &ScrapeConfig, index: &ResourceIndex) -> ResourceRecord {
    let links = config
        .entry_pages
        .iter()
        .filter_map(|page| {
            let page = clean_url(page);
            match (index.urls.get(page), index.titles.get(page)) {
                (Some(id), Some(title)) => Some(Link::new(id, title)),
                _ => {
                    warn!(%page, "entry page was not crawled, omitted from root");
                    None
                }
            }
        })
        .collect();

    ResourceRecord {
        id: String::new(),
        title: config.site_title.clone(),
        content: None,
        links,
        lookup: None,
        url: config.base_url.to_string(),
    }
}

fn transcript_row(config: &ScrapeConfig, narration: &Narration) -> TranscriptRow {
    let locator = format!("{}/{}", narration.resource_id, narration.narration_id).replace('/', ".");
    let url = config
        .base_url
        .join(&narration.url)
        .map(String::from)
        .unwrap_or_else(|_| narration.url.clone());
    TranscriptRow {
        locator,
        url,
        text: narration_text(&narration.items),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use url::Url;
    use uuid::Uuid;
    use valleydocs_shared::IconMode;

    use super::*;

    /// In-memory page source keyed by path.
    struct StaticPages(HashMap<&'static str, String>);

    impl PageSource for StaticPages {
        async fn fetch(&self, path: &str) -> Result<String> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| ValleyDocsError::Network(format!("{path}: HTTP 404 Not Found")))
        }
    }

    /// Sidebar with the given breadcrumb labels active (root first), and
    /// `children` listed under the last one.
    fn page(crumbs: &[&str], children: &[(&str, &str)], body: Option<&str>) -> String {
        let items: String = children
            .iter()
            .map(|(title, href)| {
                format!(r#"<li class="menu__list-item"><a class="menu__link" href="{href}">{title}</a></li>"#)
            })
            .collect();
        let mut nav = format!(r#"<ul class="menu__list">{items}</ul>"#);
        for (depth, crumb) in crumbs.iter().enumerate().rev() {
            let expanded = if depth == crumbs.len() - 1 && !children.is_empty() {
                " menu__list-item-collapsible--active"
            } else {
                ""
            };
            nav = format!(
                r#"<ul class="menu__list"><li class="menu__list-item"><div class="menu__list-item-collapsible{expanded}"><a class="menu__link menu__link--active" href="/x">{crumb}</a></div>{nav}</li></ul>"#
            );
        }
        let title = crumbs.last().copied().unwrap_or_default();
        let content = body
            .map(|b| format!(r#"<div class="theme-doc-markdown markdown">{b}</div>"#))
            .unwrap_or_default();
        format!(r#"<html><body><nav class="menu">{nav}</nav><h1>{title}</h1>{content}</body></html>"#)
    }

    fn site_pages() -> StaticPages {
        StaticPages(HashMap::from([
            (
                "/docs/category/campaign-guides",
                page(
                    &["Campaign Guides"],
                    &[("Valley", "/docs/campaign_guides/valley/")],
                    None,
                ),
            ),
            (
                "/docs/campaign_guides/valley",
                page(
                    &["Campaign Guides", "Valley"],
                    &[("Intro", "/docs/campaign_guides/valley/intro")],
                    Some("<p>The valley guide.</p>"),
                ),
            ),
            (
                "/docs/campaign_guides/valley/intro",
                page(
                    &["Campaign Guides", "Valley", "Intro"],
                    &[],
                    Some(concat!(
                        r#"<h2 class="anchor" id="arrival">Arrival</h2>"#,
                        "<blockquote><p>The wind rises.</p></blockquote>",
                        r#"<p>See <a href="/docs/faq#rest">resting</a> and <strong>VALLEY CROSSING, RUINS:</strong></p>"#,
                    )),
                ),
            ),
            ("/docs/faq", page(&["FAQ"], &[], Some(r#"<h2 class="anchor" id="rest">Rest</h2>"#))),
        ]))
    }

    fn config(dir: &std::path::Path, content_mode: ContentMode) -> ScrapeConfig {
        ScrapeConfig {
            base_url: Url::parse("https://docs.example.com").unwrap(),
            site_title: "The Living Valley".into(),
            entry_pages: vec![
                "/docs/category/campaign-guides".into(),
                "/docs/faq".into(),
                "/docs/missing".into(),
            ],
            output_dir: dir.join("output"),
            log_dir: dir.join("log"),
            icon_mode: IconMode::Element,
            content_mode,
        }
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("valleydocs-pipeline-test-{}", Uuid::now_v7()))
    }

    fn read_json(path: PathBuf) -> serde_json::Value {
        let text = std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing {path:?}"));
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn scrape_writes_records_transcripts_and_logs() {
        let dir = temp_dir();
        let config = config(&dir, ContentMode::Xhtml);

        let result = scrape(&config, site_pages(), &SilentProgress).await.unwrap();
        assert_eq!(result.resources, 4);
        assert_eq!(result.narrations, 1);
        assert_eq!(result.failed_urls, 1);

        let out = &config.output_dir;
        let intro = read_json(out.join("data/campaign_guides/valley/intro.json"));
        assert_eq!(intro["title"], "Intro");
        assert_eq!(intro["url"], "/docs/campaign_guides/valley/intro");
        assert_eq!(intro["links"][0]["id"], "#arrival");
        let content = intro["content"].as_str().unwrap();
        assert!(content.starts_with(r#"<h1 id="arrival">Arrival</h1><blockquote id="narration_1">"#));
        assert!(content.contains(r#"<a href="faq#rest">resting</a>"#));
        assert!(content.contains("<mission>VALLEY CROSSING</mission>, <mission>RUINS</mission>:"));
        assert!(intro["lookup"].is_null());

        let valley = read_json(out.join("data/campaign_guides/valley.json"));
        assert_eq!(valley["links"][0]["id"], "campaign_guides/valley/intro");
        assert_eq!(valley["lookup"][0]["id"], "campaign_guides/valley/intro");

        let hub = read_json(out.join("data/campaign_guides.json"));
        assert!(hub["content"].is_null());
        assert_eq!(hub["links"][0]["id"], "campaign_guides/valley");

        let root = read_json(out.join("data.json"));
        assert_eq!(root["id"], "");
        assert_eq!(root["title"], "The Living Valley");
        assert_eq!(root["url"], "https://docs.example.com/");
        assert_eq!(root["links"].as_array().unwrap().len(), 2);
        assert_eq!(root["links"][1]["id"], "faq");

        let csv = std::fs::read_to_string(out.join("csv/campaign_guides/valley.csv")).unwrap();
        assert_eq!(
            csv,
            concat!(
                "locator,url,text\r\n",
                "campaign_guides.valley.intro.narration_1,",
                "https://docs.example.com/docs/campaign_guides/valley/intro#arrival,",
                "The wind rises.\r\n",
            )
        );

        let missions = read_json(config.log_dir.join("missions.json"));
        assert_eq!(missions, serde_json::json!(["RUINS", "VALLEY CROSSING"]));
        let failed = read_json(config.log_dir.join("failed_urls.json"));
        assert_eq!(failed, serde_json::json!(["/docs/missing"]));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn json_content_mode_round_trips() {
        let dir = temp_dir();
        let config = config(&dir, ContentMode::Json);
        scrape(&config, site_pages(), &SilentProgress).await.unwrap();

        let faq = read_json(config.output_dir.join("data/faq.json"));
        let items = valleydocs_markup::from_plain(faq["content"].clone()).unwrap();
        assert_eq!(
            items,
            vec![Tag::Title {
                kind: valleydocs_markup::TitleKind::H1,
                anchor: Some("rest".into()),
                items: vec![Tag::text("Rest")],
            }]
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn scrape_without_pages_fails() {
        let dir = temp_dir();
        let config = config(&dir, ContentMode::Xhtml);
        let err = scrape(&config, StaticPages(HashMap::new()), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, ValleyDocsError::Validation { .. }));
        assert!(!config.output_dir.exists());
    }
}
