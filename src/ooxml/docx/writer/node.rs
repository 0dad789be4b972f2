//! The content tree consumed by the renderer.
//!
//! A document part is a sequence of [`Node`]s. Each node owns its children
//! (paragraphs own runs, tables own rows own cells own block content), so the
//! tree can be built bottom-up and handed to the renderer in one piece.
use std::sync::atomic::{AtomicU64, Ordering};

use super::bookmark::Bookmark;
use super::embed::EmbeddedDocument;
use super::hyperlink::Link;
use super::image::Image;
use super::list::{List, ListItem};
use super::paragraph::{Paragraph, Rule};
use super::run::{Field, PageBreak, Text};
use super::table::{Table, TableCell, TableRow};
use super::toc::TableOfContents;
use crate::ooxml::docx::format::ParagraphAlignment;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier assigned when a node is constructed.
///
/// Synthesized bookmark names are derived from it, so two renders of the same
/// tree produce the same names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate the next identifier.
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Every kind of content the renderer understands.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Paragraph(Paragraph),
    Text(Text),
    Image(Image),
    Table(Table),
    /// A table row; only valid as part of a [`Table`]
    Row(TableRow),
    /// A table cell; only valid as part of a [`TableRow`]
    Cell(TableCell),
    List(List),
    /// A list item; only valid as part of a [`List`]
    ListItem(ListItem),
    Bookmark(Bookmark),
    Link(Link),
    Field(Field),
    PageBreak(PageBreak),
    LineBreak,
    Rule(Rule),
    /// Markup copied to the output verbatim
    RawXml(String),
    TableOfContents(TableOfContents),
    EmbeddedDocument(EmbeddedDocument),
}

impl NodeKind {
    /// Short name used in diagnostics and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Paragraph(_) => "paragraph",
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Table(_) => "table",
            Self::Row(_) => "row",
            Self::Cell(_) => "cell",
            Self::List(_) => "list",
            Self::ListItem(_) => "list item",
            Self::Bookmark(_) => "bookmark",
            Self::Link(_) => "link",
            Self::Field(_) => "field",
            Self::PageBreak(_) => "page break",
            Self::LineBreak => "line break",
            Self::Rule(_) => "rule",
            Self::RawXml(_) => "raw xml",
            Self::TableOfContents(_) => "table of contents",
            Self::EmbeddedDocument(_) => "embedded document",
        }
    }
}

/// A content node: identity, header/footer zone and payload.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    alignment: Option<ParagraphAlignment>,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::next(),
            alignment: None,
            kind,
        }
    }

    /// Place the node in a header/footer zone.
    pub fn aligned(mut self, alignment: ParagraphAlignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn alignment(&self) -> Option<ParagraphAlignment> {
        self.alignment
    }

    pub fn line_break() -> Self {
        Self::new(NodeKind::LineBreak)
    }

    pub fn raw_xml(xml: impl Into<String>) -> Self {
        Self::new(NodeKind::RawXml(xml.into()))
    }
}

/// A clone is a new node with its own [`NodeId`], and so is every node
/// nested in it. The same subtree can appear twice in one tree without the
/// copies sharing bookmark names or list numbering.
impl Clone for Node {
    fn clone(&self) -> Self {
        Self {
            id: NodeId::next(),
            alignment: self.alignment,
            kind: self.kind.clone(),
        }
    }
}

macro_rules! node_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Node::new(NodeKind::$variant(value))
                }
            }
        )*
    };
}

node_from! {
    Paragraph => Paragraph,
    Text => Text,
    Image => Image,
    Table => Table,
    TableRow => Row,
    TableCell => Cell,
    List => List,
    ListItem => ListItem,
    Bookmark => Bookmark,
    Link => Link,
    Field => Field,
    PageBreak => PageBreak,
    Rule => Rule,
    TableOfContents => TableOfContents,
    EmbeddedDocument => EmbeddedDocument,
}

/// Nodes of a header/footer that belong to one alignment zone, in order.
pub fn contents_for(nodes: &[Node], alignment: ParagraphAlignment) -> Vec<&Node> {
    nodes
        .iter()
        .filter(|node| node.alignment == Some(alignment))
        .collect()
}
