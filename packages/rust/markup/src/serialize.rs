//! Output encodings for a normalized page: markup text, plain JSON objects,
//! and narration transcripts.

use valleydocs_shared::{IconMode, Result, ValleyDocsError};

use crate::tag::{Tag, TextKind};

// ---------------------------------------------------------------------------
// Markup
// ---------------------------------------------------------------------------

/// Render `items` as markup. Hrefs pointing into `resource_id` itself are
/// shortened to their `#fragment`.
pub fn to_markup(resource_id: &str, items: &[Tag], icon_mode: IconMode) -> String {
    let mut out = String::new();
    for item in items {
        write_tag(&mut out, resource_id, item, icon_mode);
    }
    out
}

fn write_tag(out: &mut String, resource_id: &str, tag: &Tag, icon_mode: IconMode) {
    let (anchor, highlight, icon, href, src, color) = match tag {
        Tag::Text { text } => {
            out.push_str(text);
            return;
        }
        Tag::Icon { icon_name, .. } if icon_mode == IconMode::Text => {
            out.push('[');
            out.push_str(icon_name.as_deref().unwrap_or("icon"));
            out.push(']');
            return;
        }
        Tag::Title { anchor, .. } => (anchor.as_deref(), None, None, None, None, None),
        Tag::FormattedText { color, .. } => (None, None, None, None, None, color.map(|c| c.as_str())),
        Tag::Blockquote {
            narration_id,
            color,
            ..
        } => (
            Some(narration_id.as_str()),
            None,
            None,
            None,
            None,
            color.map(|c| c.as_str()),
        ),
        Tag::Highlight {
            highlight_color, ..
        } => (None, Some(highlight_color.as_str()), None, None, None, None),
        Tag::Icon { icon_name, .. } => (None, None, icon_name.as_deref(), None, None, None),
        Tag::Link { href, .. } => (
            None,
            None,
            None,
            Some(local_href(resource_id, href)),
            None,
            None,
        ),
        Tag::Image { src } => (None, None, None, None, Some(src.as_str()), None),
        Tag::Empty { .. } | Tag::Mission { .. } | Tag::Event { .. } | Tag::Entry { .. } | Tag::Reward { .. } => {
            (None, None, None, None, None, None)
        }
    };

    let name = tag.type_name();
    out.push('<');
    out.push_str(name);
    for (key, value) in [
        ("id", anchor),
        ("highlight", highlight),
        ("icon", icon),
        ("href", href),
        ("src", src),
        ("color", color),
    ] {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            push_escaped(out, value);
            out.push('"');
        }
    }

    let Some(children) = tag.items() else {
        out.push_str(" />");
        return;
    };
    out.push('>');
    for child in children {
        write_tag(out, resource_id, child, icon_mode);
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn local_href<'a>(resource_id: &str, href: &'a str) -> &'a str {
    match href.strip_prefix(resource_id) {
        Some(rest) if !resource_id.is_empty() && rest.starts_with('#') => rest,
        _ => href,
    }
}

fn push_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
}

// ---------------------------------------------------------------------------
// Plain objects
// ---------------------------------------------------------------------------

/// Encode `items` as nested JSON objects, one per node. `type` holds the
/// element name, matching the markup encoding.
pub fn to_plain(items: &[Tag]) -> Result<serde_json::Value> {
    serde_json::to_value(items).map_err(|e| ValleyDocsError::Serialization(e.to_string()))
}

/// Inverse of [`to_plain`].
pub fn from_plain(value: serde_json::Value) -> Result<Vec<Tag>> {
    serde_json::from_value(value).map_err(|e| ValleyDocsError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// Transcripts
// ---------------------------------------------------------------------------

/// Plain text of a narration. Top-level items and the children of every
/// paragraph go on separate lines; other containers concatenate. Leaves
/// without text contribute nothing.
pub fn narration_text(items: &[Tag]) -> String {
    items.iter().filter_map(text_block).collect::<Vec<_>>().join("\n")
}

fn text_block(tag: &Tag) -> Option<String> {
    if let Tag::Text { text } = tag {
        return Some(text.clone());
    }
    let children = tag.items()?.iter().filter_map(text_block);
    let separator = match tag {
        Tag::FormattedText {
            kind: TextKind::P, ..
        } => "\n",
        _ => "",
    };
    Some(children.collect::<Vec<_>>().join(separator))
}
