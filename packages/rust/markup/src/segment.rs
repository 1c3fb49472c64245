//! Splits raw text runs around icon-font glyphs.

use valleydocs_shared::Diagnostics;

use crate::constants::{ICON_PLACEHOLDER, icon_name, is_private_use};
use crate::tag::{Color, Tag, TextKind};

const ZERO_WIDTH_SPACE: &str = "\u{200b}";

/// Convert a text run into text and icon nodes.
///
/// Every private-use glyph ends the current text span and becomes an icon
/// node (named if the glyph is in the icon table). With an icon color in
/// effect, icons are wrapped in a colored `span`.
pub fn segment(text: &str, icon_color: Option<Color>, diagnostics: &mut Diagnostics) -> Vec<Tag> {
    let mut out = Vec::new();
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if !is_private_use(c) {
            continue;
        }

        let name = icon_name(c);
        diagnostics.record_icon(c, name);

        push_span(&mut out, &text[start..i]);
        out.push(icon(name, icon_color));
        start = i + c.len_utf8();
    }

    push_span(&mut out, &text[start..]);
    out
}

fn push_span(out: &mut Vec<Tag>, span: &str) {
    if span.is_empty() || span == ZERO_WIDTH_SPACE {
        return;
    }
    out.push(Tag::text(span.replace('\n', " ")));
}

fn icon(name: Option<&str>, color: Option<Color>) -> Tag {
    let icon = Tag::Icon {
        icon_name: name.map(str::to_string),
        items: vec![Tag::text(ICON_PLACEHOLDER)],
    };
    match color {
        Some(color) => Tag::formatted(TextKind::Span, Some(color), vec![icon]),
        None => icon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named_icon(name: &str) -> Tag {
        Tag::Icon {
            icon_name: Some(name.into()),
            items: vec![Tag::text("&nbsp;")],
        }
    }

    #[test]
    fn glyph_splits_text() {
        let mut diag = Diagnostics::new();
        let tags = segment("Go to \u{e012} now", None, &mut diag);
        assert_eq!(
            tags,
            vec![Tag::text("Go to "), named_icon("connection"), Tag::text(" now")]
        );
        assert_eq!(diag.icons["U+E012"].as_deref(), Some("connection"));
    }

    #[test]
    fn icon_color_wraps_in_span() {
        let mut diag = Diagnostics::new();
        let tags = segment("\u{e015}", Some(Color::Red), &mut diag);
        assert_eq!(
            tags,
            vec![Tag::formatted(
                TextKind::Span,
                Some(Color::Red),
                vec![named_icon("harm")]
            )]
        );
    }

    #[test]
    fn newlines_become_spaces_and_zero_width_space_is_dropped() {
        let mut diag = Diagnostics::new();
        let tags = segment("line one\nline two", None, &mut diag);
        assert_eq!(tags, vec![Tag::text("line one line two")]);

        let tags = segment("\u{200b}\u{e010}\u{200b}", None, &mut diag);
        assert_eq!(tags, vec![named_icon("reason")]);
    }

    #[test]
    fn unmapped_glyph_yields_unnamed_icon() {
        let mut diag = Diagnostics::new();
        let tags = segment("a\u{e0ff}b", None, &mut diag);
        assert_eq!(tags.len(), 3);
        assert_eq!(
            tags[1],
            Tag::Icon {
                icon_name: None,
                items: vec![Tag::text("&nbsp;")]
            }
        );
        assert_eq!(diag.icons["U+E0FF"], None);
    }

    #[test]
    fn adjacent_glyphs_emit_no_empty_text() {
        let mut diag = Diagnostics::new();
        let tags = segment("\u{e010}\u{e011}", None, &mut diag);
        assert_eq!(tags, vec![named_icon("reason"), named_icon("conflict")]);
    }
}
