//! The render dispatcher.
//!
//! [`DocumentRenderer`] turns a content tree into the XML of one part. Each
//! call opens a [`RenderSession`] that holds everything accumulated while
//! walking the tree (relationship registry access, top-level list numbering,
//! resolved table-of-contents entries) and is passed by `&mut` into every
//! rendering rule.
use super::context::SectionContext;
use super::node::{Node, NodeKind};
use super::toc::{self, TocEntry};
use crate::common::xml::escape_xml;
use crate::ooxml::docx::format::HeaderFooterType;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::rel::{Relationship, RelationshipKind, RelationshipRegistry};
use bytes::Bytes;
use std::fmt::Write as FmtWrite;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// State of one render call.
pub struct RenderSession<'a> {
    ctx: &'a SectionContext,
    registry: &'a mut dyn RelationshipRegistry,
    /// Level-0 lists met so far; the latest one's numbering id
    toplevel_lists: usize,
    /// Highest bookmark id in use
    bookmark_id: u32,
    toc_entries: Vec<TocEntry>,
    rendered: usize,
}

impl<'a> RenderSession<'a> {
    pub(crate) fn new(
        ctx: &'a SectionContext,
        registry: &'a mut dyn RelationshipRegistry,
        toc_entries: Vec<TocEntry>,
    ) -> Self {
        Self {
            ctx,
            registry,
            toplevel_lists: 0,
            bookmark_id: 0,
            toc_entries,
            rendered: 0,
        }
    }

    #[inline]
    pub fn ctx(&self) -> &'a SectionContext {
        self.ctx
    }

    /// Resolve (or mint) a relationship. Visible to every later node.
    pub fn relationship(
        &mut self,
        kind: RelationshipKind,
        target: &str,
        data: Option<Bytes>,
    ) -> Relationship {
        self.registry.relationship(kind, target, data)
    }

    pub fn relationships_by_kind(&self, kind: RelationshipKind) -> Vec<Relationship> {
        self.registry.relationships_by_kind(kind)
    }

    /// Register a top-level list and return its 1-based numbering id.
    pub(crate) fn register_list(&mut self) -> usize {
        self.toplevel_lists += 1;
        self.toplevel_lists
    }

    /// Numbering id of the most recently registered top-level list.
    pub(crate) fn current_list(&self) -> Option<usize> {
        (self.toplevel_lists > 0).then_some(self.toplevel_lists)
    }

    /// A bookmark id above every id of the tree and every id handed out
    /// before, for markup that does not come from the tree.
    pub fn next_bookmark_id(&mut self) -> u32 {
        self.bookmark_id += 1;
        self.bookmark_id
    }

    pub(crate) fn toc_entries(&self) -> &[TocEntry] {
        &self.toc_entries
    }

    pub(crate) fn render_nodes(&mut self, xml: &mut String, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            self.render_node(xml, node)?;
        }
        Ok(())
    }

    /// Dispatch one node to its rendering rule.
    pub(crate) fn render_node(&mut self, xml: &mut String, node: &Node) -> Result<()> {
        self.rendered += 1;
        match &node.kind {
            NodeKind::Paragraph(paragraph) => paragraph.to_xml(xml, self),
            NodeKind::Text(text) => text.to_xml(xml),
            NodeKind::Image(image) => image.to_xml(xml, self),
            NodeKind::Table(table) => table.to_xml(xml, self),
            NodeKind::List(list) => list.to_xml(xml, self),
            NodeKind::Bookmark(bookmark) => bookmark.to_xml(xml),
            NodeKind::Link(link) => link.to_xml(xml, self),
            NodeKind::Field(field) => field.to_xml(xml),
            NodeKind::PageBreak(page_break) => {
                page_break.to_xml(xml);
                Ok(())
            },
            NodeKind::LineBreak => {
                xml.push_str("<w:r><w:br/></w:r>");
                Ok(())
            },
            NodeKind::Rule(rule) => rule.to_xml(xml),
            NodeKind::RawXml(raw) => {
                xml.push_str(raw);
                Ok(())
            },
            NodeKind::TableOfContents(toc) => toc.to_xml(xml, self),
            #[cfg(feature = "embed")]
            NodeKind::EmbeddedDocument(embedded) => embedded.to_xml(xml, self),
            #[cfg(not(feature = "embed"))]
            NodeKind::EmbeddedDocument(_) => Err(unsupported(node, "built without `embed`")),
            NodeKind::Row(_) | NodeKind::Cell(_) => Err(unsupported(node, "outside a table")),
            NodeKind::ListItem(_) => Err(unsupported(node, "outside a list")),
        }
    }
}

fn unsupported(node: &Node, position: &str) -> OoxmlError {
    OoxmlError::UnsupportedNodeType(format!("{} {}", node.kind.name(), position))
}

/// Renders content trees against one [`SectionContext`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentRenderer<'a> {
    ctx: &'a SectionContext,
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(ctx: &'a SectionContext) -> Self {
        Self { ctx }
    }

    /// Render the main document part (`word/document.xml`).
    ///
    /// The header and footer parts declared by the context are registered
    /// first, then the tree is rendered in document order. The trailing section
    /// properties reference every header/footer relationship known to the
    /// registry.
    ///
    /// When the tree contains a table of contents, headings that carry no
    /// bookmark get one inserted into `nodes` before rendering starts. This is
    /// the only mutation of the tree; render a clone if the tree is shared.
    ///
    /// Any error aborts the whole render; no partial output is returned.
    pub fn render(
        &self,
        nodes: &mut [Node],
        registry: &mut dyn RelationshipRegistry,
    ) -> Result<String> {
        for part in &self.ctx.headers {
            registry.relationship(RelationshipKind::Header, &part.target, None);
        }
        for part in &self.ctx.footers {
            registry.relationship(RelationshipKind::Footer, &part.target, None);
        }

        let mut xml = String::with_capacity(4096);
        xml.push_str(XML_DECLARATION);
        xml.push_str("<w:document");
        self.write_root_attributes(&mut xml)?;
        xml.push('>');
        write!(
            xml,
            r#"<w:background w:color="{}"/>"#,
            escape_xml(&self.ctx.background_color)
        )?;
        xml.push_str("<w:body>");

        let mut session = self.open_session(nodes, registry);
        session.render_nodes(&mut xml, nodes)?;

        let headers = self.section_parts(&session, RelationshipKind::Header);
        let footers = self.section_parts(&session, RelationshipKind::Footer);
        self.ctx.page.to_xml(&mut xml, &headers, &footers)?;
        xml.push_str("</w:body></w:document>");

        log::debug!(
            "rendered document: {} nodes, {} headers, {} footers, {} bytes",
            session.rendered,
            headers.len(),
            footers.len(),
            xml.len()
        );
        Ok(xml)
    }

    /// Render a header part (`word/headerN.xml`).
    pub fn render_header(
        &self,
        nodes: &mut [Node],
        registry: &mut dyn RelationshipRegistry,
    ) -> Result<String> {
        self.render_story("w:hdr", nodes, registry)
    }

    /// Render a footer part (`word/footerN.xml`).
    pub fn render_footer(
        &self,
        nodes: &mut [Node],
        registry: &mut dyn RelationshipRegistry,
    ) -> Result<String> {
        self.render_story("w:ftr", nodes, registry)
    }

    fn render_story(
        &self,
        root: &str,
        nodes: &mut [Node],
        registry: &mut dyn RelationshipRegistry,
    ) -> Result<String> {
        let mut xml = String::with_capacity(1024);
        xml.push_str(XML_DECLARATION);
        write!(xml, "<{}", root)?;
        self.write_root_attributes(&mut xml)?;
        xml.push('>');

        let mut session = self.open_session(nodes, registry);
        session.render_nodes(&mut xml, nodes)?;
        if nodes.is_empty() {
            // A header or footer must hold at least one block
            xml.push_str("<w:p/>");
        }
        write!(xml, "</{}>", root)?;

        log::debug!("rendered {}: {} nodes", root, session.rendered);
        Ok(xml)
    }

    fn open_session<'s>(
        &'s self,
        nodes: &mut [Node],
        registry: &'s mut dyn RelationshipRegistry,
    ) -> RenderSession<'s> {
        let toc_entries = if toc::contains_toc(nodes) {
            toc::resolve_headings(nodes, &self.ctx.outline_styles)
        } else {
            Vec::new()
        };
        let mut session = RenderSession::new(self.ctx, registry, toc_entries);
        session.bookmark_id = toc::max_bookmark_id(nodes);
        session
    }

    fn write_root_attributes(&self, xml: &mut String) -> Result<()> {
        for ns in &self.ctx.namespaces {
            write!(xml, r#" xmlns:{}="{}""#, ns.prefix, escape_xml(&ns.href))?;
        }
        if !self.ctx.ignorables.is_empty() {
            write!(
                xml,
                r#" mc:Ignorable="{}""#,
                escape_xml(&self.ctx.ignorables.join(" "))
            )?;
        }
        Ok(())
    }

    fn section_parts(
        &self,
        session: &RenderSession<'_>,
        kind: RelationshipKind,
    ) -> Vec<(Relationship, HeaderFooterType)> {
        session
            .relationships_by_kind(kind)
            .into_iter()
            .map(|rel| {
                let part_type = match kind {
                    RelationshipKind::Footer => self.ctx.footer_type(rel.target()),
                    _ => self.ctx.header_type(rel.target()),
                };
                (rel, part_type)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::format::ParagraphAlignment;
    use crate::ooxml::docx::writer::context::HeaderFooterPart;
    use crate::ooxml::docx::writer::image::Image;
    use crate::ooxml::docx::writer::list::{List, ListItem, ListType};
    use crate::ooxml::docx::writer::paragraph::Paragraph;
    use crate::ooxml::docx::writer::run::Text;
    use crate::ooxml::docx::writer::table::{Table, TableCell, TableRow};
    use crate::ooxml::opc::rel::Relationships;

    fn render(ctx: &SectionContext, nodes: &mut [Node]) -> Result<(String, Relationships)> {
        let mut rels = Relationships::new();
        let xml = DocumentRenderer::new(ctx).render(nodes, &mut rels)?;
        Ok((xml, rels))
    }

    #[test]
    fn test_document_skeleton() {
        let ctx = SectionContext {
            ignorables: vec!["w14".to_string(), "wp14".to_string()],
            ..Default::default()
        };
        let mut nodes: Vec<Node> = vec![Paragraph::new().child(Text::new("Hello")).into()];
        let (xml, _) = render(&ctx, &mut nodes).unwrap();

        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains(
            r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#
        ));
        assert!(xml.contains(r#"mc:Ignorable="w14 wp14""#));
        assert!(xml.contains(r#"<w:background w:color="FFFFFF"/><w:body><w:p>"#));
        assert!(xml.contains("Hello"));
        assert!(xml.ends_with("</w:sectPr></w:body></w:document>"));
    }

    #[test]
    fn test_no_ignorable_attribute_when_empty() {
        let ctx = SectionContext::default();
        let (xml, _) = render(&ctx, &mut []).unwrap();
        assert!(!xml.contains("mc:Ignorable"));
    }

    #[test]
    fn test_header_and_footer_references() {
        let ctx = SectionContext {
            headers: vec![
                HeaderFooterPart::new("header1.xml", HeaderFooterType::Default),
                HeaderFooterPart::new("header2.xml", HeaderFooterType::First),
            ],
            footers: vec![HeaderFooterPart::new("footer1.xml", HeaderFooterType::Even)],
            ..Default::default()
        };
        let (xml, rels) = render(&ctx, &mut []).unwrap();

        assert_eq!(rels.len(), 3);
        assert!(xml.contains(r#"<w:headerReference r:id="rId1" w:type="default"/>"#));
        assert!(xml.contains(r#"<w:headerReference r:id="rId2" w:type="first"/>"#));
        assert!(xml.contains(r#"<w:footerReference r:id="rId3" w:type="even"/>"#));
    }

    #[test]
    fn test_headers_registered_before_body_relationships() {
        let ctx = SectionContext {
            headers: vec![HeaderFooterPart::new("header1.xml", HeaderFooterType::Default)],
            ..Default::default()
        };
        let link = crate::ooxml::docx::writer::hyperlink::Link::external("site", "https://example.com");
        let mut nodes: Vec<Node> = vec![Paragraph::new().child(link).into()];
        let (xml, _) = render(&ctx, &mut nodes).unwrap();
        assert!(xml.contains(r#"<w:hyperlink r:id="rId2">"#));
    }

    #[test]
    fn test_rows_cells_and_items_outside_their_parent_are_rejected() {
        let ctx = SectionContext::default();
        for node in [
            Node::from(TableRow::new()),
            Node::from(TableCell::new()),
            Node::from(ListItem::new(ListType::Ordered, 0)),
        ] {
            let err = render(&ctx, &mut [node]).unwrap_err();
            assert!(matches!(err, OoxmlError::UnsupportedNodeType(_)), "{:?}", err);
        }
    }

    #[cfg(not(feature = "embed"))]
    #[test]
    fn test_embedded_document_needs_embed_feature() {
        use crate::ooxml::docx::writer::embed::EmbeddedDocument;

        let ctx = SectionContext::default();
        let mut nodes = [Node::from(EmbeddedDocument::from_bytes("other.docx", Vec::new()))];
        let err = render(&ctx, &mut nodes).unwrap_err();
        assert!(
            matches!(err, OoxmlError::UnsupportedNodeType(ref what) if what.starts_with("embedded document")),
            "{:?}",
            err
        );
    }

    #[test]
    fn test_missing_default_style_fails_without_output() {
        let ctx = SectionContext {
            default_style: None,
            ..Default::default()
        };
        let mut nodes: Vec<Node> = vec![
            Paragraph::new().child(Text::new("before")).into(),
            Image::new("logo.png", 100, 50).into(),
        ];
        let mut rels = Relationships::new();
        let result = DocumentRenderer::new(&ctx).render(&mut nodes, &mut rels);

        assert!(matches!(result, Err(OoxmlError::MissingDefaultStyle)));
        // The image never reached the registry
        assert!(rels.is_empty());
    }

    #[test]
    fn test_rowspan_merges_two_rows() {
        let ctx = SectionContext::default();
        let table = Table::new(vec![
            TableRow::from_cells(vec![
                TableCell::new().rowspan(2).child(Paragraph::new().child(Text::new("merged"))),
                TableCell::new().child(Paragraph::new().child(Text::new("r1c1"))),
            ]),
            TableRow::from_cells(vec![
                TableCell::new(),
                TableCell::new().child(Paragraph::new().child(Text::new("r2c1"))),
            ]),
        ])
        .column_widths(vec![2000, 3000]);
        let (xml, _) = render(&ctx, &mut [table.into()]).unwrap();

        assert_eq!(xml.matches("<w:gridCol ").count(), 2);
        assert_eq!(xml.matches(r#"<w:vMerge w:val="restart"/>"#).count(), 1);
        assert_eq!(xml.matches(r#"<w:vMerge w:val="continue"/>"#).count(), 1);
        assert_eq!(xml.matches("merged").count(), 1);
        assert_eq!(xml.matches("<w:tc>").count(), 4);
    }

    #[test]
    fn test_lists_number_in_document_order() {
        let ctx = SectionContext::default();
        let list = |text: &str| {
            let item = ListItem::new(ListType::Unordered, 0).child(Text::new(text));
            Node::from(List::new(ListType::Unordered).item(item))
        };
        let mut nodes = vec![list("first"), list("second")];
        let (xml, _) = render(&ctx, &mut nodes).unwrap();

        let first = xml.find(r#"<w:numId w:val="1"/>"#).unwrap();
        let second = xml.find(r#"<w:numId w:val="2"/>"#).unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_render_header_and_footer() {
        let ctx = SectionContext::default();
        let renderer = DocumentRenderer::new(&ctx);
        let mut rels = Relationships::new();

        let mut nodes = vec![Node::from(Paragraph::new().child(Text::new("Page header")))
            .aligned(ParagraphAlignment::Center)];
        let header = renderer.render_header(&mut nodes, &mut rels).unwrap();
        assert!(header.contains("<w:hdr xmlns:mc="));
        assert!(header.ends_with("</w:hdr>"));
        assert!(!header.contains("w:sectPr"));

        let footer = renderer.render_footer(&mut [], &mut rels).unwrap();
        assert!(footer.ends_with("<w:p/></w:ftr>"));
    }

    #[test]
    fn test_raw_xml_and_breaks_pass_through() {
        let ctx = SectionContext::default();
        let mut nodes: Vec<Node> = vec![
            Node::raw_xml(r#"<w:p><w:r><w:t>raw</w:t></w:r></w:p>"#),
            Paragraph::new().child(Node::line_break()).into(),
        ];
        let (xml, _) = render(&ctx, &mut nodes).unwrap();
        assert!(xml.contains(r#"<w:p><w:r><w:t>raw</w:t></w:r></w:p>"#));
        assert!(xml.contains("<w:r><w:br/></w:r>"));
    }
}
