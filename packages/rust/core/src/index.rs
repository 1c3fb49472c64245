//! Cross-reference indexes built from a crawl: the URL and title tables,
//! lookup groups, page anchors and narrations.

use std::collections::{BTreeMap, HashMap};

use valleydocs_markup::Tag;
use valleydocs_shared::{Link, Resource, UrlTable};

/// Collections whose sub-trees each form their own lookup group.
const COLLECTION_ROOTS: &[&str] = &["campaign_guides", "one_day_missions"];

/// Glossary whose pages all share one lookup group.
const GLOSSARY_ROOT: &str = "rules_glossary";

/// Lookup group a resource belongs to, if any.
pub fn lookup_group(resource_id: &str) -> Option<String> {
    let mut parts = resource_id.split('/');
    let first = parts.next()?;
    if COLLECTION_ROOTS.contains(&first) {
        return parts
            .next()
            .filter(|second| !second.is_empty())
            .map(|second| format!("{first}/{second}"));
    }
    (first == GLOSSARY_ROOT).then(|| GLOSSARY_ROOT.to_string())
}

// ---------------------------------------------------------------------------
// ResourceIndex
// ---------------------------------------------------------------------------

/// Tables built from the whole crawl before any page is rendered.
#[derive(Debug, Default)]
pub struct ResourceIndex {
    /// Page path → resource id.
    pub urls: UrlTable,
    /// Page path → title.
    pub titles: HashMap<String, String>,
    /// Group id → its members, excluding the group's own root page.
    pub lookup_groups: BTreeMap<String, Vec<Link>>,
}

impl ResourceIndex {
    pub fn build(resources: &[Resource]) -> Self {
        let mut index = Self::default();
        for resource in resources {
            index.urls.insert(resource.url.clone(), resource.id.clone());
            index.titles.insert(resource.url.clone(), resource.title.clone());

            if let Some(group) = lookup_group(&resource.id) {
                if group != resource.id {
                    index
                        .lookup_groups
                        .entry(group)
                        .or_default()
                        .push(Link::new(&resource.id, &resource.title));
                }
            }
        }
        index
    }

    /// Sibling listing for a page: the group root lists every member, and a
    /// member lists every other member.
    pub fn lookup_listing(&self, resource_id: &str) -> Option<Vec<Link>> {
        let group = lookup_group(resource_id)?;
        let members = self.lookup_groups.get(&group)?;
        let listing: Vec<Link> = members
            .iter()
            .filter(|member| member.id != resource_id)
            .cloned()
            .collect();
        (!listing.is_empty()).then_some(listing)
    }
}

// ---------------------------------------------------------------------------
// Anchors
// ---------------------------------------------------------------------------

/// In-page navigation links: every anchored title as `(#anchor, text)`.
pub fn anchors(items: &[Tag]) -> Vec<Link> {
    let mut links = Vec::new();
    collect_anchors(items, &mut links);
    links
}

fn collect_anchors(items: &[Tag], links: &mut Vec<Link>) {
    for item in items {
        if let Tag::Title {
            anchor: Some(anchor),
            ..
        } = item
        {
            links.push(Link::new(format!("#{anchor}"), item.flatten_text()));
        }
        if let Some(children) = item.items() {
            collect_anchors(children, links);
        }
    }
}

// ---------------------------------------------------------------------------
// Narrations
// ---------------------------------------------------------------------------

/// A narration block and where it can be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    pub resource_id: String,
    pub narration_id: String,
    /// Page path, with `#anchor` of the nearest preceding anchored title.
    pub url: String,
    pub items: Vec<Tag>,
}

/// Every blockquote on a page, tagged with its nearest preceding anchor.
pub fn narrations(resource_id: &str, url: &str, items: &[Tag]) -> Vec<Narration> {
    let mut found = Vec::new();
    collect_narrations(resource_id, url, None, items, &mut found);
    found
}

fn collect_narrations<'a>(
    resource_id: &str,
    url: &str,
    mut anchor: Option<&'a str>,
    items: &'a [Tag],
    found: &mut Vec<Narration>,
) {
    for item in items {
        if let Tag::Title {
            anchor: title_anchor,
            ..
        } = item
        {
            anchor = title_anchor.as_deref();
        }

        if let Tag::Blockquote {
            narration_id,
            items,
            ..
        } = item
        {
            found.push(Narration {
                resource_id: resource_id.to_string(),
                narration_id: narration_id.clone(),
                url: match anchor {
                    Some(anchor) => format!("{url}#{anchor}"),
                    None => url.to_string(),
                },
                items: items.clone(),
            });
        }

        if let Some(children) = item.items() {
            collect_narrations(resource_id, url, anchor, children, found);
        }
    }
}
