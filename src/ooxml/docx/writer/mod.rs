//! Rendering of WordprocessingML parts.
//!
//! A part is described by a tree of [`Node`]s and rendered against a
//! [`SectionContext`] by [`DocumentRenderer`]. Relationship ids are drawn from
//! a caller-supplied [`RelationshipRegistry`](crate::ooxml::opc::rel::RelationshipRegistry).

pub mod batch;
pub mod bookmark;
pub mod context;
pub mod embed;
pub mod hyperlink;
pub mod image;
pub mod list;
pub mod node;
pub mod paragraph;
pub mod render;
pub mod run;
pub mod section;
pub mod table;
pub mod toc;

// Re-export the render entry points
pub use batch::{PartKind, RenderJob, RenderedPart, render_batch};
pub use context::{DefaultStyle, HeaderFooterPart, ListStyle, Namespace, SectionContext};
pub use render::{DocumentRenderer, RenderSession};

// Re-export the content tree
pub use node::{Node, NodeId, NodeKind, contents_for};

// Re-export content types
pub use bookmark::Bookmark;
pub use embed::{EmbedSource, EmbeddedDocument};
pub use hyperlink::{Link, LinkTarget};
pub use image::Image;
pub use list::{List, ListItem, ListType};
pub use paragraph::{Indent, IndentSide, Paragraph, Rule, TabStop};
pub use run::{Field, PageBreak, RunAttributes, Text};
pub use section::{PageOrientation, SectionProperties};
pub use table::{
    Border, Borders, CellMargins, CellPlacement, Table, TableCell, TableLayout, TableRow,
    VerticalMerge,
};
pub use toc::{TableOfContents, TocEntry};
