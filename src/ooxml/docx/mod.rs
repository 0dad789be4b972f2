//! Word (.docx) document parts.
//!
//! `format` holds the enumerations shared by the writer's formatting
//! properties; `writer` turns content trees into part XML.
//!
//! # Example
//!
//! ```rust
//! use longan::ooxml::docx::writer::{DocumentRenderer, Node, Paragraph, SectionContext, Text};
//! use longan::ooxml::opc::rel::Relationships;
//!
//! let ctx = SectionContext::default();
//! let mut nodes: Vec<Node> = vec![Paragraph::new().child(Text::new("Hello")).into()];
//! let mut rels = Relationships::new();
//!
//! let xml = DocumentRenderer::new(&ctx).render(&mut nodes, &mut rels)?;
//! assert!(xml.contains("Hello"));
//! # Ok::<(), longan::ooxml::OoxmlError>(())
//! ```
pub mod format;
pub mod writer;

pub use format::{
    BorderStyle, HeaderFooterType, ImageFormat, ParagraphAlignment, TabAlignment, TabLeader,
    UnderlineStyle, VerticalAlignment, VerticalTextAlignment,
};
