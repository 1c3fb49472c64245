//! Fixed tables for the documentation theme: tag renames, CSS class colors
//! and the icon font's private-use glyphs.

use crate::tag::Color;

/// Class marking a heading whose `id` is a page anchor.
pub(crate) const CLASS_ANCHOR: &str = "anchor";

/// Class turning an `a` into a `button`.
pub(crate) const CLASS_BUTTON: &str = "button";

/// Text placed inside every icon node.
pub const ICON_PLACEHOLDER: &str = "&nbsp;";

pub(crate) const TEXT_COLORS: &[(&str, Color)] = &[
    ("blue_text", Color::Blue),
    ("red_text", Color::Red),
    ("gold_text", Color::Gold),
    ("green_text", Color::Green),
];

pub(crate) const ICON_COLORS: &[(&str, Color)] = &[
    ("ranger_icons", Color::Black),
    ("ranger_icons_red", Color::Red),
];

pub(crate) const HIGHLIGHT_COLORS: &[(&str, Color)] = &[("blue_highlight", Color::Blue)];

/// Structural substitutions applied before any other rule.
///
/// `h1` is the page title already captured by the crawler, so it maps to the
/// ignored `title` tag; remaining heading levels shift up by one.
pub(crate) fn rename_tag(tag: &str) -> &str {
    match tag {
        "h1" => "title",
        "h2" => "h1",
        "h3" => "h2",
        "h4" => "choice",
        "h5" => "branch",
        "strong" => "b",
        "em" => "i",
        "div" => "p",
        "figcaption" => "imgfooter",
        "header" | "figure" => "span",
        other => other,
    }
}

/// First table color whose class is present, in table order.
pub(crate) fn color_for_classes(classes: &[&str], table: &[(&str, Color)]) -> Option<Color> {
    table
        .iter()
        .find(|(class, _)| classes.contains(class))
        .map(|(_, color)| *color)
}

/// Whether `c` lies in the Basic Multilingual Plane private-use area.
pub fn is_private_use(c: char) -> bool {
    ('\u{e000}'..='\u{f8ff}').contains(&c)
}

/// Icon name for a glyph of the ranger icon font.
pub fn icon_name(glyph: char) -> Option<&'static str> {
    let name = match glyph {
        '\u{e010}' => "reason",
        '\u{e011}' => "conflict",
        '\u{e012}' => "connection",
        '\u{e013}' => "exploration",
        '\u{e014}' => "presence",
        '\u{e015}' => "harm",
        '\u{e016}' => "progress",
        '\u{e017}' => "crest",
        '\u{e018}' => "mountain",
        '\u{e019}' => "sun",
        '\u{e01a}' => "reshuffle",
        '\u{e01b}' => "conditional",
        '\u{e01c}' => "guide_entry",
        '\u{e01d}' => "per_ranger",
        '\u{e01e}' => "ranger_token",
        '\u{e020}' => "write",
        '\u{e021}' => "flooded_passage",
        '\u{e022}' => "locked_passage",
        '\u{e023}' => "overgrown_passage",
        '\u{e024}' => "two_cards",
        '\u{e025}' => "per_g",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_shift_and_inline_tags_rename() {
        assert_eq!(rename_tag("h1"), "title");
        assert_eq!(rename_tag("h3"), "h2");
        assert_eq!(rename_tag("strong"), "b");
        assert_eq!(rename_tag("table"), "table");
    }

    #[test]
    fn color_lookup_follows_table_order() {
        let classes = ["red_text", "blue_text"];
        assert_eq!(color_for_classes(&classes, TEXT_COLORS), Some(Color::Blue));
        assert_eq!(color_for_classes(&["plain"], TEXT_COLORS), None);
    }

    #[test]
    fn icon_table() {
        assert_eq!(icon_name('\u{e012}'), Some("connection"));
        assert_eq!(icon_name('\u{e01f}'), None);
        assert!(is_private_use('\u{e01f}'));
        assert!(!is_private_use('a'));
    }
}
