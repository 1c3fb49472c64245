//! Element normalizer: converts the content region's element tree into the
//! tag model, dropping redundant wrappers and hoisting colors.

use std::collections::HashMap;

use scraper::node::Node;
use scraper::{ElementRef, Html};
use tracing::{trace, warn};
use url::Url;

use valleydocs_shared::{Diagnostics, UrlTable, clean_url};

use crate::constants::{
    CLASS_ANCHOR, CLASS_BUTTON, HIGHLIGHT_COLORS, ICON_COLORS, TEXT_COLORS, color_for_classes,
    rename_tag,
};
use crate::resolve::resolve_href;
use crate::segment::segment;
use crate::tag::{Color, EmptyKind, LinkKind, Tag, TextKind, TitleKind};

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Read-only inputs threaded through the recursion.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    pub resource_id: &'a str,
    pub base_url: &'a Url,
    pub urls: &'a UrlTable,
    /// Icon color inherited from the nearest ancestor declaring one.
    pub icon_color: Option<Color>,
}

impl<'a> NormalizeContext<'a> {
    pub fn new(resource_id: &'a str, base_url: &'a Url, urls: &'a UrlTable) -> Self {
        Self {
            resource_id,
            base_url,
            urls,
            icon_color: None,
        }
    }

    fn with_icon_color(self, icon_color: Option<Color>) -> Self {
        Self { icon_color, ..self }
    }
}

/// Sequential narration ids, one counter per resource id.
#[derive(Debug, Default)]
pub struct NarrationIds {
    counters: HashMap<String, u32>,
}

impl NarrationIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id for `resource_id`: `narration_1`, `narration_2`, ...
    pub fn next(&mut self, resource_id: &str) -> String {
        let counter = self.counters.entry(resource_id.to_string()).or_insert(0);
        *counter += 1;
        format!("narration_{counter}")
    }
}

/// Mutable collectors written while normalizing.
pub struct Session<'s> {
    pub diagnostics: &'s mut Diagnostics,
    pub narrations: &'s mut NarrationIds,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse a content region's outer HTML and normalize its children.
pub fn normalize_fragment(ctx: &NormalizeContext<'_>, html: &str, session: &mut Session<'_>) -> Vec<Tag> {
    let fragment = Html::parse_fragment(html);
    let root = fragment.root_element();
    match root.children().find_map(ElementRef::wrap) {
        Some(content) => normalize_children(ctx, content, session),
        None => normalize_children(ctx, root, session),
    }
}

/// Normalize every child node of `parent`, in order.
pub fn normalize_children(
    ctx: &NormalizeContext<'_>,
    parent: ElementRef<'_>,
    session: &mut Session<'_>,
) -> Vec<Tag> {
    let mut items = Vec::new();

    for child in parent.children() {
        match child.value() {
            Node::Text(text) => {
                let text: &str = text;
                if is_layout_whitespace(text) {
                    continue;
                }
                items.extend(segment(text, ctx.icon_color, session.diagnostics));
            }
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    items.extend(normalize_element(ctx, element, session));
                }
            }
            _ => {}
        }
    }

    items
}

/// Whitespace-only runs spanning a line break are source indentation.
fn is_layout_whitespace(text: &str) -> bool {
    text.contains('\n') && text.trim().is_empty()
}

/// Convert one element into zero or more tags.
pub fn normalize_element(
    ctx: &NormalizeContext<'_>,
    element: ElementRef<'_>,
    session: &mut Session<'_>,
) -> Vec<Tag> {
    let classes: Vec<&str> = element.value().classes().collect();
    let mut tag = rename_tag(element.value().name());
    if tag == "a" && classes.contains(&CLASS_BUTTON) {
        tag = "button";
    }

    session.diagnostics.record_classes(tag, classes.iter().copied());

    // Elements that are dropped or replaced wholesale are settled before
    // their children are visited, so nothing inside them takes a narration id.
    match tag {
        "hr" => return vec![Tag::Empty { kind: EmptyKind::Hr }],
        "br" => return vec![Tag::Empty { kind: EmptyKind::Br }],
        "title" | "mark" => {
            trace!(tag, "ignored tag");
            return Vec::new();
        }
        "choice" | "branch" => return choice_title(element, tag, &classes, session),
        other if !has_rule(other) => {
            warn!(tag = other, resource_id = ctx.resource_id, "unrecognized markup tag, dropping");
            session.diagnostics.record_unknown_tag(other);
            return Vec::new();
        }
        _ => {}
    }

    let mut color = color_for_classes(&classes, TEXT_COLORS);
    let child_ctx =
        ctx.with_icon_color(color_for_classes(&classes, ICON_COLORS).or(ctx.icon_color));
    let mut items = normalize_children(&child_ctx, element, session);

    session
        .diagnostics
        .record_item_types(tag, items.iter().map(Tag::type_name));

    if tag == "span" && color.is_none() {
        return items;
    }

    if tag == "p" {
        items = drop_trailing_space_in_only_child(items);
    }

    if matches!(tag, "p" | "b" | "i" | "span") {
        match hoist_only_child(tag, color, items) {
            Hoisted::Collapsed(inner) => return vec![inner],
            Hoisted::Kept { color: hoisted, items: kept } => {
                color = hoisted;
                items = kept;
            }
        }
    }

    build(ctx, element, tag, &classes, color, items, session)
}

/// Tags with a conversion rule in [`build`].
fn has_rule(tag: &str) -> bool {
    TitleKind::from_tag(tag).is_some()
        || TextKind::from_tag(tag).is_some()
        || matches!(tag, "a" | "button" | "blockquote" | "img")
}

fn title_anchor(element: ElementRef<'_>, classes: &[&str]) -> Option<String> {
    classes
        .contains(&CLASS_ANCHOR)
        .then(|| element.value().id().map(str::to_string))
        .flatten()
}

/// Choice and branch headings keep only their full text, upper-cased.
fn choice_title(
    element: ElementRef<'_>,
    tag: &str,
    classes: &[&str],
    session: &mut Session<'_>,
) -> Vec<Tag> {
    let Some(kind) = TitleKind::from_tag(tag) else {
        return Vec::new();
    };
    let text: String = element.text().collect();
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    session.diagnostics.record_item_types(tag, ["text"]);
    vec![Tag::Title {
        kind,
        anchor: title_anchor(element, classes),
        items: vec![Tag::text(text.to_uppercase())],
    }]
}

// ---------------------------------------------------------------------------
// Simplification
// ---------------------------------------------------------------------------

/// Inside a paragraph's single styled child, drop a trailing `" "` text node.
/// A child left empty by this is removed.
fn drop_trailing_space_in_only_child(items: Vec<Tag>) -> Vec<Tag> {
    match <[Tag; 1]>::try_from(items) {
        Ok([only]) if only.is_styled_or_blockquote() => {
            let trimmed = only.map_items(|mut children| {
                if matches!(children.last(), Some(Tag::Text { text }) if text == " ") {
                    children.pop();
                }
                children
            });
            if trimmed.items().is_some_and(<[Tag]>::is_empty) {
                Vec::new()
            } else {
                vec![trimmed]
            }
        }
        Ok([only]) => vec![only],
        Err(items) => items,
    }
}

enum Hoisted {
    /// The wrapper disappeared into its only child.
    Collapsed(Tag),
    /// The wrapper stays, possibly with its child's color.
    Kept { color: Option<Color>, items: Vec<Tag> },
}

/// Move a single styled child's color onto the wrapper, collapsing the two
/// when the child has the same kind or is a plain `span`/`p`.
fn hoist_only_child(tag: &str, color: Option<Color>, items: Vec<Tag>) -> Hoisted {
    let only = match <[Tag; 1]>::try_from(items) {
        Ok([only]) if only.is_styled_or_blockquote() => only,
        Ok([only]) => return Hoisted::Kept { color, items: vec![only] },
        Err(items) => return Hoisted::Kept { color, items },
    };

    let color = only.color().or(color);
    let inner = only.with_color(None);

    let collapses = match (&inner, TextKind::from_tag(tag)) {
        (Tag::FormattedText { kind, .. }, Some(outer)) => {
            *kind == outer || matches!(kind, TextKind::Span | TextKind::P)
        }
        _ => false,
    };

    match TextKind::from_tag(tag) {
        Some(outer) if collapses => {
            Hoisted::Collapsed(inner.with_text_kind(outer).with_color(color))
        }
        _ => Hoisted::Kept {
            color,
            items: vec![inner],
        },
    }
}

// ---------------------------------------------------------------------------
// Variant construction
// ---------------------------------------------------------------------------

fn build(
    ctx: &NormalizeContext<'_>,
    element: ElementRef<'_>,
    tag: &str,
    classes: &[&str],
    color: Option<Color>,
    items: Vec<Tag>,
    session: &mut Session<'_>,
) -> Vec<Tag> {
    if let Some(kind) = TitleKind::from_tag(tag) {
        if items.is_empty() {
            return Vec::new();
        }
        return vec![Tag::Title {
            kind,
            anchor: title_anchor(element, classes),
            items,
        }];
    }

    if let Some(kind) = TextKind::from_tag(tag) {
        if items.is_empty() {
            return Vec::new();
        }
        if kind == TextKind::P {
            if let Some(highlight_color) = color_for_classes(classes, HIGHLIGHT_COLORS) {
                return vec![Tag::Highlight {
                    highlight_color,
                    items,
                }];
            }
        }
        return vec![Tag::formatted(kind, color, items)];
    }

    match tag {
        "a" | "button" => {
            if items.is_empty() {
                return Vec::new();
            }
            let raw = element.value().attr("href").unwrap_or("");
            let href = resolve_href(ctx.base_url, clean_url(raw), ctx.urls);
            session.diagnostics.record_url(&href);

            if href.is_empty() {
                return vec![Tag::formatted(TextKind::Span, color, items)];
            }
            let kind = if tag == "button" {
                LinkKind::Button
            } else {
                LinkKind::A
            };
            vec![Tag::Link { kind, href, items }]
        }
        "blockquote" => vec![Tag::Blockquote {
            narration_id: session.narrations.next(ctx.resource_id),
            color,
            items,
        }],
        "img" => {
            let src = element.value().attr("src").unwrap_or("");
            let src = if src.starts_with('/') {
                ctx.base_url
                    .join(src)
                    .map(String::from)
                    .unwrap_or_else(|_| src.to_string())
            } else {
                src.to_string()
            };
            vec![Tag::Image { src }]
        }
        // Everything else was dropped before its children were visited.
        _ => Vec::new(),
    }
}
