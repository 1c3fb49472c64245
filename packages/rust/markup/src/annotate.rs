//! Entity annotation passes over a normalized page.
//!
//! Each pass walks the tree and replaces matched nodes with new ones; nodes
//! that don't match are rebuilt unchanged around their rewritten children.
//! Choice and branch titles are never descended into.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use valleydocs_shared::Diagnostics;

use crate::tag::{Color, Tag, TextKind, TitleKind, flatten_items};

/// Bold directives that are instructions to the reader, not missions.
static DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(IF|READ|PDF|GO TO)\b").expect("valid regex"));

/// Rules-reference labels such as `1.04` or `3.12a`.
static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+[A-Za-z]?$").expect("valid regex"));

static REWARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)gain the (.+?) reward").expect("valid regex"));

const NOT_A_REWARD: &[&str] = &["following", "same"];

// ---------------------------------------------------------------------------
// Tree rewriting
// ---------------------------------------------------------------------------

/// Outcome of a rule applied to one node.
enum Rewrite {
    /// The node is replaced by these siblings; they are not revisited.
    Replaced(Vec<Tag>),
    /// No match; the walk continues into the node's children.
    Unchanged(Tag),
}

fn rewrite(items: Vec<Tag>, rule: &mut dyn FnMut(Tag) -> Rewrite) -> Vec<Tag> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match rule(item) {
            Rewrite::Replaced(tags) => out.extend(tags),
            Rewrite::Unchanged(tag) if is_barrier(&tag) => out.push(tag),
            Rewrite::Unchanged(tag) => out.push(tag.map_items(|children| rewrite(children, rule))),
        }
    }
    out
}

fn is_barrier(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Title {
            kind: TitleKind::Choice | TitleKind::Branch,
            ..
        }
    )
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run every pass in order: missions, events, entries, rewards, then any
/// page-specific patch.
pub fn annotate(resource_id: &str, items: Vec<Tag>, diagnostics: &mut Diagnostics) -> Vec<Tag> {
    let items = rewrite(items, &mut |tag| mission_rule(tag, diagnostics));
    let items = rewrite(items, &mut |tag| event_rule(tag, diagnostics));
    let items = rewrite(items, &mut |tag| entry_rule(tag, diagnostics));
    let items = rewrite(items, &mut |tag| reward_rule(tag, diagnostics));
    apply_patches(resource_id, items, diagnostics)
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn mission_rule(tag: Tag, diagnostics: &mut Diagnostics) -> Rewrite {
    let text = match &tag {
        Tag::FormattedText {
            kind: TextKind::B,
            items,
            ..
        } => shouted_text(items),
        _ => None,
    };
    let Some(text) = text.filter(|text| !DIRECTIVE_RE.is_match(text)) else {
        return Rewrite::Unchanged(tag);
    };

    let items = wrap_clauses(&text, |clause| {
        diagnostics.missions.insert(clause.to_string());
        Tag::Mission {
            items: vec![Tag::text(clause)],
        }
    });
    Rewrite::Replaced(vec![tag.with_items(items)])
}

fn event_rule(tag: Tag, diagnostics: &mut Diagnostics) -> Rewrite {
    let text = match &tag {
        Tag::FormattedText {
            kind: TextKind::Span,
            color: Some(Color::Blue),
            items,
        } => shouted_text(items),
        _ => None,
    };
    let Some(text) = text else {
        return Rewrite::Unchanged(tag);
    };

    let items = wrap_clauses(&text, |clause| {
        let items = vec![Tag::text(clause)];
        if ENTRY_RE.is_match(clause) {
            diagnostics.entries.insert(clause.to_string());
            Tag::Entry { items }
        } else {
            diagnostics.events.insert(clause.to_string());
            Tag::Event { items }
        }
    });
    Rewrite::Replaced(vec![tag.with_items(items)])
}

fn entry_rule(tag: Tag, diagnostics: &mut Diagnostics) -> Rewrite {
    let label = match &tag {
        Tag::Link { items, .. } if !contains_entry(items) => {
            Some(flatten_items(items).trim().to_string())
        }
        _ => None,
    };
    let Some(label) = label.filter(|label| ENTRY_RE.is_match(label)) else {
        return Rewrite::Unchanged(tag);
    };

    diagnostics.entries.insert(label);
    Rewrite::Replaced(vec![tag.map_items(|items| vec![Tag::Entry { items }])])
}

fn contains_entry(items: &[Tag]) -> bool {
    items.iter().any(|item| match item {
        Tag::Entry { .. } => true,
        other => other.items().is_some_and(contains_entry),
    })
}

fn reward_rule(tag: Tag, diagnostics: &mut Diagnostics) -> Rewrite {
    let text = match tag {
        Tag::Text { text } => text,
        other => return Rewrite::Unchanged(other),
    };
    let name = REWARD_RE
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1))
        .find(|name| !NOT_A_REWARD.contains(&name.as_str().to_lowercase().as_str()));
    let Some(name) = name else {
        return Rewrite::Unchanged(Tag::Text { text });
    };

    diagnostics.rewards.insert(name.as_str().to_string());
    let (prefix, suffix) = (&text[..name.start()], &text[name.end()..]);
    let mut out = Vec::with_capacity(3);
    if !prefix.is_empty() {
        out.push(Tag::text(prefix));
    }
    out.push(Tag::Reward {
        items: vec![Tag::text(name.as_str())],
    });
    if !suffix.is_empty() {
        out.push(Tag::text(suffix));
    }
    Rewrite::Replaced(out)
}

/// Flattened text of an all-text item list that reads as a heading in caps.
fn shouted_text(items: &[Tag]) -> Option<String> {
    if !all_text(items) {
        return None;
    }
    Some(flatten_items(items)).filter(|text| is_shouted(text))
}

fn all_text(items: &[Tag]) -> bool {
    !items.is_empty() && items.iter().all(|item| matches!(item, Tag::Text { .. }))
}

/// Upper-case or non-alphabetic throughout, with at least one letter.
fn is_shouted(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

// ---------------------------------------------------------------------------
// Clauses
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Piece<'a> {
    Clause(&'a str),
    Gap(&'a str),
}

/// Split on `,` and `:` outside parentheses. Delimiters and the whitespace
/// around each clause come back as gaps.
fn split_clauses(text: &str) -> Vec<Piece<'_>> {
    let mut ranges = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' | ':' if depth == 0 => {
                ranges.push((start, i));
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    ranges.push((start, text.len()));

    let mut pieces = Vec::new();
    let mut gap_start = 0;
    for (start, end) in ranges {
        let raw = &text[start..end];
        let clause = raw.trim();
        if clause.is_empty() {
            continue;
        }
        let clause_start = start + (raw.len() - raw.trim_start().len());
        if gap_start < clause_start {
            pieces.push(Piece::Gap(&text[gap_start..clause_start]));
        }
        pieces.push(Piece::Clause(clause));
        gap_start = clause_start + clause.len();
    }
    if gap_start < text.len() {
        pieces.push(Piece::Gap(&text[gap_start..]));
    }
    pieces
}

fn wrap_clauses(text: &str, mut wrap: impl FnMut(&str) -> Tag) -> Vec<Tag> {
    split_clauses(text)
        .into_iter()
        .map(|piece| match piece {
            Piece::Clause(clause) => wrap(clause),
            Piece::Gap(gap) => Tag::text(gap),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Page patches
// ---------------------------------------------------------------------------

/// A structural fix for one page whose markup breaks the general rules.
pub struct Patch {
    pub resource_id: &'static str,
    pub apply: fn(Vec<Tag>, &mut Diagnostics) -> Vec<Tag>,
}

pub static PATCHES: &[Patch] = &[Patch {
    resource_id: "one_day_missions/rewards",
    apply: event_reward_pair,
}];

fn apply_patches(resource_id: &str, items: Vec<Tag>, diagnostics: &mut Diagnostics) -> Vec<Tag> {
    PATCHES
        .iter()
        .filter(|patch| patch.resource_id == resource_id)
        .fold(items, |items, patch| {
            debug!(resource_id, "applying page patch");
            (patch.apply)(items, diagnostics)
        })
}

/// The first two-item list becomes an explicit event / reward pair.
fn event_reward_pair(items: Vec<Tag>, diagnostics: &mut Diagnostics) -> Vec<Tag> {
    let mut patched = false;
    rewrite(items, &mut |tag| {
        if patched || !is_pair_list(&tag) {
            return Rewrite::Unchanged(tag);
        }
        patched = true;

        let list = tag.map_items(|lis| {
            lis.into_iter()
                .enumerate()
                .map(|(i, li)| {
                    li.map_items(|items| {
                        if i == 0 {
                            vec![Tag::Event { items }]
                        } else {
                            vec![Tag::Reward { items }]
                        }
                    })
                })
                .collect()
        });

        if let Some([event, reward]) = list.items() {
            diagnostics.events.insert(event.flatten_text());
            diagnostics.rewards.insert(reward.flatten_text());
        }
        Rewrite::Replaced(vec![list])
    })
}

fn is_pair_list(tag: &Tag) -> bool {
    match tag {
        Tag::FormattedText {
            kind: TextKind::Ul | TextKind::Ol,
            items,
            ..
        } => {
            items.len() == 2
                && items.iter().all(|item| {
                    matches!(
                        item,
                        Tag::FormattedText {
                            kind: TextKind::Li,
                            ..
                        }
                    )
                })
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold(text: &str) -> Tag {
        Tag::formatted(TextKind::B, None, vec![Tag::text(text)])
    }

    fn blue(text: &str) -> Tag {
        Tag::formatted(TextKind::Span, Some(Color::Blue), vec![Tag::text(text)])
    }

    fn li(text: &str) -> Tag {
        Tag::formatted(TextKind::Li, None, vec![Tag::text(text)])
    }

    fn mission(text: &str) -> Tag {
        Tag::Mission {
            items: vec![Tag::text(text)],
        }
    }

    #[test]
    fn bold_caps_split_into_missions() {
        let mut diag = Diagnostics::new();
        let out = annotate("faq", vec![bold("VALLEY CROSSING, RUINS:")], &mut diag);
        assert_eq!(
            out,
            vec![Tag::formatted(
                TextKind::B,
                None,
                vec![
                    mission("VALLEY CROSSING"),
                    Tag::text(", "),
                    mission("RUINS"),
                    Tag::text(":"),
                ]
            )]
        );
        let missions: Vec<_> = diag.missions.iter().cloned().collect();
        assert_eq!(missions, vec!["RUINS", "VALLEY CROSSING"]);
    }

    #[test]
    fn directives_and_mixed_case_are_not_missions() {
        let mut diag = Diagnostics::new();
        let items = vec![
            bold("IF YOU HAVE A GUIDE"),
            bold("GO TO 1.02"),
            bold("Valley Crossing"),
            bold("1, 2"),
        ];
        let out = annotate("faq", items.clone(), &mut diag);
        assert_eq!(out, items);
        assert!(diag.missions.is_empty());
    }

    #[test]
    fn parentheses_keep_their_commas() {
        assert_eq!(
            split_clauses("ANCIENT TREE (EAST, WEST), LAKE"),
            vec![
                Piece::Clause("ANCIENT TREE (EAST, WEST)"),
                Piece::Gap(", "),
                Piece::Clause("LAKE"),
            ]
        );
        assert_eq!(split_clauses(" : "), vec![Piece::Gap(" : ")]);
    }

    #[test]
    fn blue_caps_split_into_events_and_entries() {
        let mut diag = Diagnostics::new();
        let out = annotate("faq", vec![blue("ROCKSLIDE, 1.04A")], &mut diag);
        assert_eq!(
            out,
            vec![Tag::formatted(
                TextKind::Span,
                Some(Color::Blue),
                vec![
                    Tag::Event {
                        items: vec![Tag::text("ROCKSLIDE")]
                    },
                    Tag::text(", "),
                    Tag::Entry {
                        items: vec![Tag::text("1.04A")]
                    },
                ]
            )]
        );
        assert!(diag.events.contains("ROCKSLIDE"));
        assert!(diag.entries.contains("1.04A"));
    }

    #[test]
    fn entry_links_wrap_their_text() {
        let mut diag = Diagnostics::new();
        let link = |text: &str| Tag::Link {
            kind: crate::tag::LinkKind::A,
            href: "campaign_guides/valley/1#1_02".into(),
            items: vec![Tag::text(text)],
        };
        let out = annotate("faq", vec![link("1.02"), link("see 1.02")], &mut diag);
        assert_eq!(
            out[0],
            Tag::Link {
                kind: crate::tag::LinkKind::A,
                href: "campaign_guides/valley/1#1_02".into(),
                items: vec![Tag::Entry {
                    items: vec![Tag::text("1.02")]
                }],
            }
        );
        assert_eq!(out[1], link("see 1.02"));
    }

    #[test]
    fn reward_phrase_splits_text() {
        let mut diag = Diagnostics::new();
        let para = Tag::formatted(
            TextKind::P,
            None,
            vec![Tag::text("Each Ranger may gain the Sturdy Boots reward now.")],
        );
        let out = annotate("faq", vec![para], &mut diag);
        assert_eq!(
            out[0].items().unwrap(),
            &[
                Tag::text("Each Ranger may gain the "),
                Tag::Reward {
                    items: vec![Tag::text("Sturdy Boots")]
                },
                Tag::text(" reward now."),
            ]
        );
        assert!(diag.rewards.contains("Sturdy Boots"));

        let untouched = vec![Tag::text("Gain the following reward:")];
        assert_eq!(annotate("faq", untouched.clone(), &mut diag), untouched);
    }

    #[test]
    fn reward_skips_placeholder_phrases() {
        let mut diag = Diagnostics::new();
        let text = "Gain the following reward: if not, gain the Boots reward.";
        let out = annotate("faq", vec![Tag::text(text)], &mut diag);
        assert_eq!(
            out,
            vec![
                Tag::text("Gain the following reward: if not, gain the "),
                Tag::Reward {
                    items: vec![Tag::text("Boots")]
                },
                Tag::text(" reward."),
            ]
        );
        assert!(!diag.rewards.contains("following"));
    }

    #[test]
    fn links_around_an_entry_are_not_wrapped_again() {
        let mut diag = Diagnostics::new();
        let link = Tag::Link {
            kind: crate::tag::LinkKind::A,
            href: "campaign_guides/valley/1#1_04a".into(),
            items: vec![blue("1.04A")],
        };
        let out = annotate("faq", vec![link], &mut diag);
        assert_eq!(
            out,
            vec![Tag::Link {
                kind: crate::tag::LinkKind::A,
                href: "campaign_guides/valley/1#1_04a".into(),
                items: vec![Tag::formatted(
                    TextKind::Span,
                    Some(Color::Blue),
                    vec![Tag::Entry {
                        items: vec![Tag::text("1.04A")]
                    }]
                )],
            }]
        );
        assert!(diag.entries.contains("1.04A"));
    }

    #[test]
    fn choice_titles_are_not_annotated() {
        let mut diag = Diagnostics::new();
        let title = Tag::Title {
            kind: TitleKind::Choice,
            anchor: None,
            items: vec![bold("FOLLOW THE RIVER")],
        };
        let out = annotate("faq", vec![title.clone()], &mut diag);
        assert_eq!(out, vec![title]);
    }

    #[test]
    fn bold_with_nested_markup_is_descended_into() {
        let mut diag = Diagnostics::new();
        let nested = Tag::formatted(TextKind::B, None, vec![Tag::text("A "), blue("STORM")]);
        let out = annotate("faq", vec![nested], &mut diag);
        assert_eq!(
            out[0].items().unwrap()[1].items().unwrap(),
            &[Tag::Event {
                items: vec![Tag::text("STORM")]
            }]
        );
        assert!(diag.missions.is_empty());
    }

    #[test]
    fn rewards_page_patch_pairs_first_list() {
        let mut diag = Diagnostics::new();
        let list = |kind| Tag::formatted(kind, None, vec![li("Find the herbs"), li("Herbal kit")]);
        let items = vec![list(TextKind::Ul), list(TextKind::Ol)];

        let out = annotate("one_day_missions/rewards", items.clone(), &mut diag);
        assert_eq!(
            out[0],
            Tag::formatted(
                TextKind::Ul,
                None,
                vec![
                    Tag::formatted(
                        TextKind::Li,
                        None,
                        vec![Tag::Event {
                            items: vec![Tag::text("Find the herbs")]
                        }]
                    ),
                    Tag::formatted(
                        TextKind::Li,
                        None,
                        vec![Tag::Reward {
                            items: vec![Tag::text("Herbal kit")]
                        }]
                    ),
                ]
            )
        );
        assert_eq!(out[1], items[1]);
        assert!(diag.rewards.contains("Herbal kit"));

        let elsewhere = annotate("faq", items.clone(), &mut diag);
        assert_eq!(elsewhere, items);
    }
}
