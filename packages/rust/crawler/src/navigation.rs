//! Extraction of navigation and content from a Docusaurus page.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use valleydocs_shared::{ChildLink, clean_url, slugify};

static ACTIVE_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("nav.menu a.menu__link--active").expect("valid selector"));

static EXPANDED_CATEGORY_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("nav.menu li.menu__list-item > div.menu__list-item-collapsible--active")
        .expect("valid selector")
});

static MENU_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.menu__link").expect("valid selector"));

static H1_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("valid selector"));

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

static CONTENT_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.theme-doc-markdown.markdown").expect("valid selector")
});

/// Resource id from the active sidebar breadcrumb: the slugified labels of
/// the active link and each enclosing category, root first, joined by `/`.
pub fn resource_id(doc: &Html) -> String {
    let Some(leaf) = doc.select(&ACTIVE_LINK_SEL).last() else {
        return String::new();
    };

    let mut labels = vec![link_text(leaf)];
    let enclosing = leaf
        .ancestors()
        .filter_map(ElementRef::wrap)
        .filter(|el| is_menu_item(el))
        .skip(1);
    for item in enclosing {
        if let Some(link) = own_link(item) {
            labels.push(link_text(link));
        }
    }

    labels
        .iter()
        .rev()
        .map(|label| slugify(label))
        .filter(|slug| !slug.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Links listed under the current page's expanded category, in order.
pub fn child_links(doc: &Html) -> Vec<ChildLink> {
    let mut links = Vec::new();
    for toggle in doc.select(&EXPANDED_CATEGORY_SEL) {
        let Some(item) = toggle.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        let sublists = item
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "ul");
        for sublist in sublists {
            for link in sublist.select(&MENU_LINK_SEL) {
                let title = link_text(link);
                links.push(ChildLink {
                    id: slugify(&title),
                    url: clean_url(link.value().attr("href").unwrap_or("")).to_string(),
                    title,
                });
            }
        }
    }
    links
}

/// First `h1`, falling back to the document title without its site suffix.
pub fn page_title(doc: &Html) -> String {
    if let Some(h1) = doc.select(&H1_SEL).next() {
        let text = link_text(h1);
        if !text.is_empty() {
            return text;
        }
    }
    doc.select(&TITLE_SEL)
        .next()
        .map(|title| {
            let text = title.text().collect::<String>();
            let page = text.split(" | ").next().unwrap_or("");
            page.trim().to_string()
        })
        .unwrap_or_default()
}

/// Outer HTML of the markdown content region, if the page has one.
pub fn content_html(doc: &Html) -> Option<String> {
    doc.select(&CONTENT_SEL).next().map(|el| el.html())
}

fn link_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn is_menu_item(el: &ElementRef<'_>) -> bool {
    el.value().name() == "li" && el.value().classes().any(|c| c == "menu__list-item")
}

/// A menu item's own link: a direct `a`, or the one inside its collapsible toggle.
fn own_link(item: ElementRef<'_>) -> Option<ElementRef<'_>> {
    item.children().filter_map(ElementRef::wrap).find_map(|child| {
        match child.value().name() {
            "a" => Some(child),
            "div" if child.value().classes().any(|c| c == "menu__list-item-collapsible") => child
                .children()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == "a"),
            _ => None,
        }
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A guide page two levels deep, with its own expanded sub-category.
    pub(crate) const GUIDE_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Valley Intro | The Living Valley</title></head>
<body>
<div class="sidebar_njMd"><nav class="menu thin-scrollbar menu_SIkG">
<ul class="theme-doc-sidebar-menu menu__list">
  <li class="theme-doc-sidebar-item-category menu__list-item">
    <div class="menu__list-item-collapsible">
      <a class="menu__link menu__link--sublist menu__link--active" href="/docs/category/campaign-guides">Campaign Guides</a>
    </div>
    <ul class="menu__list">
      <li class="theme-doc-sidebar-item-category menu__list-item">
        <div class="menu__list-item-collapsible menu__list-item-collapsible--active">
          <a class="menu__link menu__link--sublist menu__link--active" href="/docs/campaign_guides/valley/">The Valley</a>
        </div>
        <ul class="menu__list">
          <li class="menu__list-item"><a class="menu__link" href="/docs/campaign_guides/valley/intro/">1. Intro</a></li>
          <li class="menu__list-item"><a class="menu__link" href="/docs/campaign_guides/valley/day_2">Day 2 - Rain</a></li>
        </ul>
      </li>
      <li class="menu__list-item"><a class="menu__link" href="/docs/campaign_guides/other">Other</a></li>
    </ul>
  </li>
  <li class="menu__list-item"><a class="menu__link" href="/docs/faq">FAQ</a></li>
</ul>
</nav></div>
<main>
<header><h1>The Valley</h1></header>
<div class="theme-doc-markdown markdown"><p>Welcome.</p></div>
</main>
</body></html>"#;

    #[test]
    fn resource_id_follows_breadcrumb() {
        let doc = Html::parse_document(GUIDE_PAGE);
        assert_eq!(resource_id(&doc), "campaign_guides/the_valley");
    }

    #[test]
    fn child_links_of_expanded_category() {
        let doc = Html::parse_document(GUIDE_PAGE);
        let links = child_links(&doc);
        assert_eq!(
            links,
            vec![
                ChildLink {
                    id: "1_intro".into(),
                    title: "1. Intro".into(),
                    url: "/docs/campaign_guides/valley/intro".into(),
                },
                ChildLink {
                    id: "day_2_rain".into(),
                    title: "Day 2 - Rain".into(),
                    url: "/docs/campaign_guides/valley/day_2".into(),
                },
            ]
        );
    }

    #[test]
    fn title_and_content() {
        let doc = Html::parse_document(GUIDE_PAGE);
        assert_eq!(page_title(&doc), "The Valley");
        assert_eq!(
            content_html(&doc).as_deref(),
            Some(r#"<div class="theme-doc-markdown markdown"><p>Welcome.</p></div>"#)
        );
    }

    #[test]
    fn title_falls_back_to_document_title() {
        let doc = Html::parse_document(
            "<html><head><title>Updates | The Living Valley</title></head><body></body></html>",
        );
        assert_eq!(page_title(&doc), "Updates");
    }

    #[test]
    fn page_without_navigation() {
        let doc = Html::parse_document("<html><body><p>bare</p></body></html>");
        assert_eq!(resource_id(&doc), "");
        assert!(child_links(&doc).is_empty());
        assert!(content_html(&doc).is_none());
    }

    #[test]
    fn leaf_page_has_no_children() {
        let page = r#"<html><body><nav class="menu"><ul class="menu__list">
            <li class="menu__list-item"><a class="menu__link menu__link--active" href="/docs/faq">FAQ</a></li>
        </ul></nav></body></html>"#;
        let doc = Html::parse_document(page);
        assert_eq!(resource_id(&doc), "faq");
        assert!(child_links(&doc).is_empty());
    }
}
