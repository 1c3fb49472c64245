//! The canonical document model: a closed set of tag variants.
//!
//! Nodes are never mutated once handed out; rewrites go through the
//! consuming `with_*` / `map_items` constructors, which build a new node.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Kinds and colors
// ---------------------------------------------------------------------------

/// Named colors carried by styled text, icons and highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Blue,
    Red,
    Gold,
    Green,
    Black,
}

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Blue => "blue",
            Color::Red => "red",
            Color::Gold => "gold",
            Color::Green => "green",
            Color::Black => "black",
        }
    }
}

/// Heading-like containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleKind {
    H1,
    H2,
    Choice,
    Branch,
    Imgfooter,
}

impl TitleKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(TitleKind::H1),
            "h2" => Some(TitleKind::H2),
            "choice" => Some(TitleKind::Choice),
            "branch" => Some(TitleKind::Branch),
            "imgfooter" => Some(TitleKind::Imgfooter),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TitleKind::H1 => "h1",
            TitleKind::H2 => "h2",
            TitleKind::Choice => "choice",
            TitleKind::Branch => "branch",
            TitleKind::Imgfooter => "imgfooter",
        }
    }
}

/// Generic styled containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    P,
    B,
    I,
    Span,
    Ol,
    Ul,
    Li,
    Code,
}

impl TextKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "p" => Some(TextKind::P),
            "b" => Some(TextKind::B),
            "i" => Some(TextKind::I),
            "span" => Some(TextKind::Span),
            "ol" => Some(TextKind::Ol),
            "ul" => Some(TextKind::Ul),
            "li" => Some(TextKind::Li),
            "code" => Some(TextKind::Code),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextKind::P => "p",
            TextKind::B => "b",
            TextKind::I => "i",
            TextKind::Span => "span",
            TextKind::Ol => "ol",
            TextKind::Ul => "ul",
            TextKind::Li => "li",
            TextKind::Code => "code",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    A,
    Button,
}

impl LinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkKind::A => "a",
            LinkKind::Button => "button",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyKind {
    Hr,
    Br,
}

impl EmptyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EmptyKind::Hr => "hr",
            EmptyKind::Br => "br",
        }
    }
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// One node of a normalized page.
///
/// As a plain object, a node is keyed by its element name under `type`
/// (`"p"`, `"h1"`, `"a"`, ...), the same name its markup form uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Text {
        text: String,
    },
    Title {
        kind: TitleKind,
        anchor: Option<String>,
        items: Vec<Tag>,
    },
    FormattedText {
        kind: TextKind,
        color: Option<Color>,
        items: Vec<Tag>,
    },
    Blockquote {
        narration_id: String,
        color: Option<Color>,
        items: Vec<Tag>,
    },
    Highlight {
        highlight_color: Color,
        items: Vec<Tag>,
    },
    Icon {
        icon_name: Option<String>,
        items: Vec<Tag>,
    },
    Link {
        kind: LinkKind,
        href: String,
        items: Vec<Tag>,
    },
    Image {
        src: String,
    },
    Empty {
        kind: EmptyKind,
    },
    Mission {
        items: Vec<Tag>,
    },
    Event {
        items: Vec<Tag>,
    },
    Entry {
        items: Vec<Tag>,
    },
    Reward {
        items: Vec<Tag>,
    },
}

impl Tag {
    pub fn text(text: impl Into<String>) -> Self {
        Tag::Text { text: text.into() }
    }

    pub fn formatted(kind: TextKind, color: Option<Color>, items: Vec<Tag>) -> Self {
        Tag::FormattedText { kind, color, items }
    }

    /// Markup element name (or `text` for text runs).
    pub fn type_name(&self) -> &'static str {
        match self {
            Tag::Text { .. } => "text",
            Tag::Title { kind, .. } => kind.as_str(),
            Tag::FormattedText { kind, .. } => kind.as_str(),
            Tag::Blockquote { .. } => "blockquote",
            Tag::Highlight { .. } => "highlight",
            Tag::Icon { .. } => "icon",
            Tag::Link { kind, .. } => kind.as_str(),
            Tag::Image { .. } => "img",
            Tag::Empty { kind } => kind.as_str(),
            Tag::Mission { .. } => "mission",
            Tag::Event { .. } => "event",
            Tag::Entry { .. } => "entry",
            Tag::Reward { .. } => "reward",
        }
    }

    /// Children of container variants; `None` for leaves.
    pub fn items(&self) -> Option<&[Tag]> {
        match self {
            Tag::Title { items, .. }
            | Tag::FormattedText { items, .. }
            | Tag::Blockquote { items, .. }
            | Tag::Highlight { items, .. }
            | Tag::Icon { items, .. }
            | Tag::Link { items, .. }
            | Tag::Mission { items }
            | Tag::Event { items }
            | Tag::Entry { items }
            | Tag::Reward { items } => Some(items),
            Tag::Text { .. } | Tag::Image { .. } | Tag::Empty { .. } => None,
        }
    }

    /// Rebuild a container with `f` applied to its children. Leaves pass through.
    pub fn map_items(self, f: impl FnOnce(Vec<Tag>) -> Vec<Tag>) -> Tag {
        match self {
            Tag::Title { kind, anchor, items } => Tag::Title {
                kind,
                anchor,
                items: f(items),
            },
            Tag::FormattedText { kind, color, items } => Tag::FormattedText {
                kind,
                color,
                items: f(items),
            },
            Tag::Blockquote {
                narration_id,
                color,
                items,
            } => Tag::Blockquote {
                narration_id,
                color,
                items: f(items),
            },
            Tag::Highlight {
                highlight_color,
                items,
            } => Tag::Highlight {
                highlight_color,
                items: f(items),
            },
            Tag::Icon { icon_name, items } => Tag::Icon {
                icon_name,
                items: f(items),
            },
            Tag::Link { kind, href, items } => Tag::Link {
                kind,
                href,
                items: f(items),
            },
            Tag::Mission { items } => Tag::Mission { items: f(items) },
            Tag::Event { items } => Tag::Event { items: f(items) },
            Tag::Entry { items } => Tag::Entry { items: f(items) },
            Tag::Reward { items } => Tag::Reward { items: f(items) },
            leaf @ (Tag::Text { .. } | Tag::Image { .. } | Tag::Empty { .. }) => leaf,
        }
    }

    pub fn with_items(self, items: Vec<Tag>) -> Tag {
        self.map_items(|_| items)
    }

    /// Color of styled containers and blockquotes.
    pub fn color(&self) -> Option<Color> {
        match self {
            Tag::FormattedText { color, .. } | Tag::Blockquote { color, .. } => *color,
            _ => None,
        }
    }

    /// Copy with the color replaced; other variants pass through.
    pub fn with_color(self, color: Option<Color>) -> Tag {
        match self {
            Tag::FormattedText { kind, items, .. } => Tag::FormattedText { kind, color, items },
            Tag::Blockquote {
                narration_id,
                items,
                ..
            } => Tag::Blockquote {
                narration_id,
                color,
                items,
            },
            other => other,
        }
    }

    /// Copy of a styled container with its kind replaced.
    pub fn with_text_kind(self, kind: TextKind) -> Tag {
        match self {
            Tag::FormattedText { color, items, .. } => Tag::FormattedText { kind, color, items },
            other => other,
        }
    }

    pub fn is_styled_or_blockquote(&self) -> bool {
        matches!(self, Tag::FormattedText { .. } | Tag::Blockquote { .. })
    }

    /// Concatenated text of this node and all descendants.
    pub fn flatten_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Tag::Text { text } => out.push_str(text),
            other => {
                for item in other.items().unwrap_or_default() {
                    item.collect_text(out);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Plain objects
// ---------------------------------------------------------------------------

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.type_name())?;
        if let Some(items) = self.items() {
            map.serialize_entry("items", items)?;
        }
        match self {
            Tag::Text { text } => map.serialize_entry("text", text)?,
            Tag::Title { anchor, .. } => map.serialize_entry("anchor", anchor)?,
            Tag::FormattedText { color, .. } => map.serialize_entry("color", color)?,
            Tag::Blockquote {
                narration_id,
                color,
                ..
            } => {
                map.serialize_entry("anchor", narration_id)?;
                map.serialize_entry("color", color)?;
            }
            Tag::Highlight {
                highlight_color, ..
            } => map.serialize_entry("highlight", highlight_color)?,
            Tag::Icon { icon_name, .. } => map.serialize_entry("icon", icon_name)?,
            Tag::Link { href, .. } => map.serialize_entry("href", href)?,
            Tag::Image { src } => map.serialize_entry("src", src)?,
            Tag::Empty { .. }
            | Tag::Mission { .. }
            | Tag::Event { .. }
            | Tag::Entry { .. }
            | Tag::Reward { .. } => {}
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let plain = PlainTag::deserialize(deserializer)?;
        Tag::try_from(plain).map_err(serde::de::Error::custom)
    }
}

/// Flat wire form of a node: the element name plus every attribute any
/// element can carry.
#[derive(Deserialize)]
struct PlainTag {
    #[serde(rename = "type")]
    name: String,
    #[serde(default)]
    items: Option<Vec<Tag>>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    anchor: Option<String>,
    #[serde(default)]
    color: Option<Color>,
    #[serde(default)]
    highlight: Option<Color>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    href: Option<String>,
    #[serde(default)]
    src: Option<String>,
}

fn required<T>(value: Option<T>, name: &str, field: &str) -> Result<T, String> {
    value.ok_or_else(|| format!("`{name}` node is missing `{field}`"))
}

impl TryFrom<PlainTag> for Tag {
    type Error = String;

    fn try_from(plain: PlainTag) -> Result<Self, Self::Error> {
        let PlainTag {
            name,
            items,
            text,
            anchor,
            color,
            highlight,
            icon,
            href,
            src,
        } = plain;
        let items = || required(items, &name, "items");

        if let Some(kind) = TitleKind::from_tag(&name) {
            return Ok(Tag::Title {
                kind,
                anchor,
                items: items()?,
            });
        }
        if let Some(kind) = TextKind::from_tag(&name) {
            return Ok(Tag::FormattedText {
                kind,
                color,
                items: items()?,
            });
        }

        let tag = match name.as_str() {
            "text" => Tag::Text {
                text: required(text, &name, "text")?,
            },
            "blockquote" => Tag::Blockquote {
                narration_id: required(anchor, &name, "anchor")?,
                color,
                items: items()?,
            },
            "highlight" => Tag::Highlight {
                highlight_color: required(highlight, &name, "highlight")?,
                items: items()?,
            },
            "icon" => Tag::Icon {
                icon_name: icon,
                items: items()?,
            },
            "a" | "button" => Tag::Link {
                kind: if name == "a" { LinkKind::A } else { LinkKind::Button },
                href: required(href, &name, "href")?,
                items: items()?,
            },
            "img" => Tag::Image {
                src: required(src, &name, "src")?,
            },
            "hr" => Tag::Empty { kind: EmptyKind::Hr },
            "br" => Tag::Empty { kind: EmptyKind::Br },
            "mission" => Tag::Mission { items: items()? },
            "event" => Tag::Event { items: items()? },
            "entry" => Tag::Entry { items: items()? },
            "reward" => Tag::Reward { items: items()? },
            other => return Err(format!("unknown tag type `{other}`")),
        };
        Ok(tag)
    }
}

/// Concatenated text of a sequence of nodes.
pub fn flatten_items(items: &[Tag]) -> String {
    items.iter().map(Tag::flatten_text).collect()
}
