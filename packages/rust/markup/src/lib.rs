//! Page content model and transformations for valleydocs.
//!
//! The flow for one page is:
//! 1. [`normalize_fragment`] turns the content region's HTML into a [`Tag`] tree
//! 2. [`annotate`] marks missions, events, entries and rewards
//! 3. [`to_markup`] or [`to_plain`] encodes the result for output

pub mod annotate;
pub mod constants;
pub mod normalize;
pub mod resolve;
pub mod segment;
pub mod serialize;
pub mod tag;

pub use annotate::{PATCHES, Patch, annotate};
pub use normalize::{NarrationIds, NormalizeContext, Session, normalize_children, normalize_element, normalize_fragment};
pub use resolve::resolve_href;
pub use segment::segment;
pub use serialize::{from_plain, narration_text, to_markup, to_plain};
pub use tag::{Color, EmptyKind, LinkKind, Tag, TextKind, TitleKind, flatten_items};
