//! Longan - a renderer for WordprocessingML document parts
//!
//! A document is described as a tree of typed content nodes (paragraphs,
//! runs, tables, lists, images, links, bookmarks, fields, a table of
//! contents, embedded documents) and rendered into the XML of
//! `word/document.xml` or of a header/footer part. Image, hyperlink and
//! header/footer references are resolved through a relationship registry
//! while the tree is walked.
//!
//! # Example
//!
//! ```
//! use longan::ooxml::docx::writer::{
//!     DocumentRenderer, List, ListItem, ListType, Node, Paragraph, SectionContext, Text,
//! };
//! use longan::ooxml::opc::Relationships;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = SectionContext::default();
//! let mut nodes: Vec<Node> = vec![
//!     Paragraph::new().style_id("Heading1").child(Text::new("Report")).into(),
//!     List::new(ListType::Unordered)
//!         .item(ListItem::new(ListType::Unordered, 0).child(Text::new("first")))
//!         .into(),
//! ];
//!
//! let mut rels = Relationships::with_package_defaults();
//! let document_xml = DocumentRenderer::new(&ctx).render(&mut nodes, &mut rels)?;
//! let rels_xml = rels.to_rels_xml()?;
//! assert!(document_xml.contains("<w:numId w:val=\"1\"/>"));
//! assert!(rels_xml.contains("styles.xml"));
//! # Ok(())
//! # }
//! ```

/// Shared helpers: XML escaping and unit conversion
pub mod common;

/// OOXML parts, relationships and the WordprocessingML renderer
pub mod ooxml;

// Re-export the entry points for convenience
pub use ooxml::docx::writer::{DocumentRenderer, Node, SectionContext, render_batch};
pub use ooxml::{OoxmlError, Result};
