/// Table of contents support for DOCX documents.
///
/// A TOC is a complex field whose cached result lists the document's
/// headings. Each entry links to a bookmark around its heading; headings
/// without one get a `_Toc<node id>` bookmark before rendering starts.
use crate::common::xml::{escape_xml, push_escaped};
use crate::ooxml::error::Result;
use std::collections::HashSet;
use std::fmt::Write as FmtWrite;

use super::bookmark::Bookmark;
use super::node::{Node, NodeKind};
use super::paragraph::{Paragraph, TabAlignment, TabLeader, TabStop};
use super::render::RenderSession;

/// Deepest heading level recognized by style id (`Heading1`..`Heading6`).
const MAX_HEADING_LEVEL: u8 = 6;

/// A table of contents field.
#[derive(Debug, Clone)]
pub struct TableOfContents {
    /// First heading level listed (default: 1)
    start_level: u8,
    /// Last heading level listed, inclusive (default: 3)
    end_level: u8,
    title: Option<String>,
}

impl TableOfContents {
    pub fn new() -> Self {
        Self {
            start_level: 1,
            end_level: 3,
            title: None,
        }
    }

    /// Set the inclusive range of heading levels to list.
    pub fn heading_levels(mut self, start: u8, end: u8) -> Self {
        self.start_level = start.clamp(1, MAX_HEADING_LEVEL);
        self.end_level = end.clamp(self.start_level, MAX_HEADING_LEVEL);
        self
    }

    /// Title paragraph (style `TOCHeading`) placed above the field.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn start_level(&self) -> u8 {
        self.start_level
    }

    pub fn end_level(&self) -> u8 {
        self.end_level
    }

    #[inline]
    pub fn includes(&self, level: u8) -> bool {
        (self.start_level..=self.end_level).contains(&level)
    }

    /// Build the field instruction.
    ///
    /// Format: `TOC \o "1-3" \h \z \u`
    /// - `\o` lists outline levels in the range
    /// - `\h` makes entries hyperlinks
    /// - `\z` hides tab leader and page numbers in Web Layout view
    /// - `\u` uses the paragraph outline level
    pub fn build_field_instruction(&self) -> String {
        format!(
            r#"TOC \o "{}-{}" \h \z \u"#,
            self.start_level, self.end_level
        )
    }

    pub(crate) fn to_xml(&self, xml: &mut String, session: &mut RenderSession<'_>) -> Result<()> {
        if let Some(ref title) = self.title {
            xml.push_str(r#"<w:p><w:pPr><w:pStyle w:val="TOCHeading"/></w:pPr><w:r><w:t>"#);
            push_escaped(xml, title);
            xml.push_str("</w:t></w:r></w:p>");
        }

        xml.push_str(r#"<w:p><w:r><w:fldChar w:fldCharType="begin"/></w:r>"#);
        xml.push_str(r#"<w:r><w:instrText xml:space="preserve"> "#);
        push_escaped(xml, &self.build_field_instruction());
        xml.push_str(" </w:instrText></w:r>");
        xml.push_str(r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r></w:p>"#);

        let tab = TabStop::new(
            TabAlignment::Right,
            session.ctx().page.content_width(),
            TabLeader::Dot,
        );
        let mut listed = 0;
        for entry in session.toc_entries().iter().filter(|e| self.includes(e.level)) {
            write!(
                xml,
                r#"<w:p><w:pPr><w:pStyle w:val="TOC{}"/><w:tabs>"#,
                entry.level
            )?;
            tab.to_xml(xml)?;
            xml.push_str("</w:tabs></w:pPr>");

            let name = escape_xml(&entry.name);
            write!(xml, r#"<w:hyperlink w:anchor="{}" w:history="1">"#, name)?;
            xml.push_str(r#"<w:r><w:rPr><w:rStyle w:val="Hyperlink"/></w:rPr><w:t xml:space="preserve">"#);
            push_escaped(xml, &entry.text);
            xml.push_str("</w:t></w:r><w:r><w:tab/></w:r>");
            xml.push_str(r#"<w:r><w:fldChar w:fldCharType="begin"/></w:r>"#);
            write!(
                xml,
                r#"<w:r><w:instrText xml:space="preserve"> PAGEREF {} \h </w:instrText></w:r>"#,
                name
            )?;
            xml.push_str(r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r>"#);
            xml.push_str(r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#);
            xml.push_str("</w:hyperlink></w:p>");
            listed += 1;
        }

        xml.push_str(r#"<w:p><w:r><w:fldChar w:fldCharType="end"/></w:r></w:p>"#);
        log::debug!(
            "table of contents {}-{}: {} entries",
            self.start_level,
            self.end_level,
            listed
        );
        Ok(())
    }
}

impl Default for TableOfContents {
    fn default() -> Self {
        Self::new()
    }
}

/// A heading found in the tree, with the bookmark that marks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Bookmark name
    pub name: String,
    pub text: String,
    pub level: u8,
}

/// Heading level of a `HeadingN` style id.
fn heading_level(style_id: &str) -> Option<u8> {
    style_id
        .strip_prefix("Heading")?
        .parse::<u8>()
        .ok()
        .filter(|level| (1..=MAX_HEADING_LEVEL).contains(level))
}

/// Whether any node of the tree is a table of contents.
pub(crate) fn contains_toc(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match &node.kind {
        NodeKind::TableOfContents(_) => true,
        NodeKind::Paragraph(paragraph) => contains_toc(&paragraph.children),
        NodeKind::Table(table) => table
            .rows
            .iter()
            .flat_map(|row| &row.cells)
            .any(|cell| contains_toc(&cell.contents)),
        NodeKind::Cell(cell) => contains_toc(&cell.contents),
        _ => false,
    })
}

/// Bookmark ids and names already present in a tree.
#[derive(Debug, Default)]
struct BookmarkIndex {
    max_id: u32,
    names: HashSet<String>,
}

impl BookmarkIndex {
    fn of(nodes: &[Node]) -> Self {
        let mut index = Self::default();
        index.visit(nodes);
        index
    }

    fn visit(&mut self, nodes: &[Node]) {
        for node in nodes {
            match &node.kind {
                NodeKind::Bookmark(bookmark) => {
                    self.max_id = self.max_id.max(bookmark.id());
                    if let Some(name) = bookmark.name() {
                        self.names.insert(name.to_string());
                    }
                },
                NodeKind::Paragraph(paragraph) => self.visit(&paragraph.children),
                NodeKind::Table(table) => {
                    for cell in table.rows.iter().flat_map(|row| &row.cells) {
                        self.visit(&cell.contents);
                    }
                },
                NodeKind::Cell(cell) => self.visit(&cell.contents),
                NodeKind::List(list) => {
                    for item in list.recursive_items() {
                        self.visit(&item.children);
                    }
                },
                _ => {},
            }
        }
    }
}

/// Largest bookmark id used anywhere in the tree.
pub(crate) fn max_bookmark_id(nodes: &[Node]) -> u32 {
    BookmarkIndex::of(nodes).max_id
}

/// Collect the headings of the tree in document order and make sure each
/// one is bookmarked under a name no other heading uses.
///
/// Headings are paragraphs styled with one of `outline_styles` that parse as
/// `HeadingN`; headings without visible text are skipped. Synthesized
/// bookmarks take ids above every id already in the tree and names no
/// bookmark of the tree carries.
pub(crate) fn resolve_headings(nodes: &mut [Node], outline_styles: &[String]) -> Vec<TocEntry> {
    let index = BookmarkIndex::of(nodes);
    let mut resolver = HeadingResolver {
        outline_styles,
        next_id: index.max_id,
        taken: index.names,
        claimed: HashSet::new(),
        synthesized: 0,
        entries: Vec::new(),
    };
    resolver.visit(nodes);
    log::debug!(
        "resolved {} headings, {} bookmarks synthesized",
        resolver.entries.len(),
        resolver.synthesized
    );
    resolver.entries
}

struct HeadingResolver<'s> {
    outline_styles: &'s [String],
    /// Last bookmark id handed out
    next_id: u32,
    /// Every bookmark name in the tree, synthesized ones included
    taken: HashSet<String>,
    /// Names already pointed at by an entry
    claimed: HashSet<String>,
    synthesized: usize,
    entries: Vec<TocEntry>,
}

impl HeadingResolver<'_> {
    fn visit(&mut self, nodes: &mut [Node]) {
        for node in nodes {
            let id = node.id();
            match &mut node.kind {
                NodeKind::Paragraph(paragraph) => {
                    if let Some(level) = self.heading(paragraph) {
                        let name = self.bookmark(paragraph, id.get());
                        self.claimed.insert(name.clone());
                        self.entries.push(TocEntry {
                            name,
                            text: paragraph.plain_text(),
                            level,
                        });
                    }
                },
                NodeKind::Table(table) => {
                    for cell in table.rows.iter_mut().flat_map(|row| row.cells.iter_mut()) {
                        self.visit(&mut cell.contents);
                    }
                },
                NodeKind::Cell(cell) => self.visit(&mut cell.contents),
                _ => {},
            }
        }
    }

    fn heading(&self, paragraph: &Paragraph) -> Option<u8> {
        let style = paragraph.style_id.as_deref()?;
        if !self.outline_styles.iter().any(|s| s == style) || paragraph.is_empty() {
            return None;
        }
        heading_level(style)
    }

    /// Name of the heading's first bookmark, inserting one when it has none
    /// or when an earlier heading already links to that name.
    fn bookmark(&mut self, paragraph: &mut Paragraph, node_id: u64) -> String {
        let existing = paragraph.children.iter().find_map(|child| match &child.kind {
            NodeKind::Bookmark(bookmark) => bookmark.name().map(str::to_string),
            _ => None,
        });
        if let Some(name) = existing
            && !self.claimed.contains(&name)
        {
            return name;
        }

        let mut name = format!("_Toc{}", node_id);
        let mut suffix = 0;
        while self.taken.contains(&name) {
            suffix += 1;
            name = format!("_Toc{}_{}", node_id, suffix);
        }
        self.taken.insert(name.clone());

        self.next_id += 1;
        self.synthesized += 1;
        paragraph
            .children
            .insert(0, Bookmark::start(self.next_id, name.clone()).into());
        paragraph.children.push(Bookmark::end(self.next_id).into());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::writer::context::SectionContext;
    use crate::ooxml::docx::writer::render::DocumentRenderer;
    use crate::ooxml::docx::writer::run::Text;
    use crate::ooxml::docx::writer::table::{Table, TableCell, TableRow};
    use crate::ooxml::opc::rel::Relationships;

    fn heading(style: &str, text: &str) -> Node {
        Paragraph::new().style_id(style).child(Text::new(text)).into()
    }

    fn outline() -> Vec<String> {
        (1..=6).map(|n| format!("Heading{}", n)).collect()
    }

    fn render(nodes: &mut [Node]) -> String {
        let ctx = SectionContext::default();
        let mut rels = Relationships::new();
        DocumentRenderer::new(&ctx).render(nodes, &mut rels).unwrap()
    }

    #[test]
    fn test_field_instruction() {
        let toc = TableOfContents::new().heading_levels(2, 4);
        assert_eq!(toc.build_field_instruction(), r#"TOC \o "2-4" \h \z \u"#);
        assert!(toc.includes(2) && toc.includes(4));
        assert!(!toc.includes(1) && !toc.includes(5));
    }

    #[test]
    fn test_heading_levels_are_clamped() {
        let toc = TableOfContents::new().heading_levels(0, 12);
        assert_eq!((toc.start_level(), toc.end_level()), (1, 6));
        let toc = TableOfContents::new().heading_levels(4, 2);
        assert_eq!((toc.start_level(), toc.end_level()), (4, 4));
    }

    #[test]
    fn test_heading_level_parsing() {
        assert_eq!(heading_level("Heading1"), Some(1));
        assert_eq!(heading_level("Heading6"), Some(6));
        assert_eq!(heading_level("Heading7"), None);
        assert_eq!(heading_level("Title"), None);
        assert_eq!(heading_level("HeadingX"), None);
    }

    #[test]
    fn test_toc_with_two_headings() {
        let mut nodes: Vec<Node> = vec![
            TableOfContents::new().into(),
            heading("Heading1", "Intro"),
            heading("Heading2", "Details"),
        ];
        let intro = nodes[1].id().get();
        let details = nodes[2].id().get();
        let xml = render(&mut nodes);

        assert!(xml.contains(r#"<w:instrText xml:space="preserve"> TOC \o &quot;1-3&quot; \h \z \u </w:instrText>"#));
        assert!(xml.contains(r#"<w:pStyle w:val="TOC1"/>"#));
        assert!(xml.contains(r#"<w:pStyle w:val="TOC2"/>"#));
        assert!(xml.contains(r#"<w:tab w:val="right" w:pos="9360" w:leader="dot"/>"#));
        assert!(xml.contains(&format!(r#"<w:hyperlink w:anchor="_Toc{}" w:history="1">"#, intro)));
        assert!(xml.contains(&format!("PAGEREF _Toc{} \\h", details)));
        assert!(xml.contains(&format!(r#"<w:bookmarkStart w:id="1" w:name="_Toc{}"/>"#, intro)));
        assert!(xml.contains(&format!(r#"<w:bookmarkStart w:id="2" w:name="_Toc{}"/>"#, details)));
        assert_eq!(xml.matches("<w:bookmarkStart ").count(), xml.matches("<w:bookmarkEnd ").count());

        let begin = xml.find(r#"w:fldCharType="begin""#).unwrap();
        let first_entry = xml.find(r#"w:val="TOC1""#).unwrap();
        let heading_para = xml.find(r#"<w:pStyle w:val="Heading1"/>"#).unwrap();
        assert!(begin < first_entry && first_entry < heading_para);
    }

    #[test]
    fn test_headings_out_of_range_are_bookmarked_but_not_listed() {
        let mut nodes: Vec<Node> = vec![
            TableOfContents::new().heading_levels(1, 1).into(),
            heading("Heading1", "Kept"),
            heading("Heading3", "Skipped"),
        ];
        let xml = render(&mut nodes);

        assert_eq!(xml.matches("PAGEREF").count(), 1);
        assert!(!xml.contains(r#"w:val="TOC3""#));
        assert_eq!(xml.matches("<w:bookmarkStart ").count(), 2);
    }

    #[test]
    fn test_existing_bookmark_is_reused() {
        let mut nodes: Vec<Node> = vec![
            TableOfContents::new().into(),
            Paragraph::new()
                .style_id("Heading1")
                .child(Bookmark::start(7, "intro"))
                .child(Text::new("Intro"))
                .child(Bookmark::end(7))
                .into(),
            heading("Heading1", "Next"),
        ];
        let entries = resolve_headings(&mut nodes, &outline());

        assert_eq!(entries[0].name, "intro");
        // Synthesized ids start above the largest id in the tree
        let NodeKind::Paragraph(ref next) = nodes[2].kind else {
            panic!("expected a paragraph");
        };
        assert!(matches!(next.children[0].kind, NodeKind::Bookmark(Bookmark::Start { id: 8, .. })));
        assert!(matches!(next.children[2].kind, NodeKind::Bookmark(Bookmark::End { id: 8 })));
    }

    #[test]
    fn test_cloned_headings_get_distinct_bookmarks() {
        let intro = heading("Heading1", "Intro");
        let mut nodes: Vec<Node> = vec![TableOfContents::new().into(), intro.clone(), intro];
        let xml = render(&mut nodes);

        let names: Vec<&str> = xml
            .split(r#"<w:hyperlink w:anchor=""#)
            .skip(1)
            .map(|rest| &rest[..rest.find('"').unwrap()])
            .collect();
        assert_eq!(names.len(), 2);
        assert_ne!(names[0], names[1]);
        for name in names {
            let start = format!(r#"w:name="{}""#, name);
            assert_eq!(xml.matches(&start).count(), 1, "{}", name);
        }
    }

    #[test]
    fn test_shared_bookmark_name_is_claimed_once() {
        let bookmarked = Node::from(
            Paragraph::new()
                .style_id("Heading1")
                .child(Bookmark::start(3, "intro"))
                .child(Text::new("Intro"))
                .child(Bookmark::end(3)),
        );
        let mut nodes = vec![bookmarked.clone(), bookmarked];
        let entries = resolve_headings(&mut nodes, &outline());

        assert_eq!(entries[0].name, "intro");
        assert!(entries[1].name.starts_with("_Toc"));
        let NodeKind::Paragraph(ref second) = nodes[1].kind else {
            panic!("expected a paragraph");
        };
        assert!(matches!(second.children[0].kind, NodeKind::Bookmark(Bookmark::Start { id: 4, .. })));
    }

    #[test]
    fn test_synthesized_name_avoids_existing_bookmark() {
        let mut nodes: Vec<Node> = vec![heading("Heading1", "Intro")];
        let taken = format!("_Toc{}", nodes[0].id().get());
        nodes.push(
            Paragraph::new()
                .child(Bookmark::start(1, taken.clone()))
                .child(Text::new("elsewhere"))
                .child(Bookmark::end(1))
                .into(),
        );
        let entries = resolve_headings(&mut nodes, &outline());

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, format!("{}_1", taken));
    }

    #[test]
    fn test_heading_before_toc_is_bookmarked() {
        let mut nodes: Vec<Node> = vec![heading("Heading1", "Preface"), TableOfContents::new().into()];
        let xml = render(&mut nodes);

        let bookmark = xml.find("<w:bookmarkStart ").unwrap();
        let toc = xml.find(r#"w:val="TOC1""#).unwrap();
        assert!(bookmark < toc);
        assert!(xml.contains(">Preface<"));
    }

    #[test]
    fn test_empty_and_unlisted_styles_are_skipped() {
        let mut nodes: Vec<Node> = vec![
            heading("Heading1", "   "),
            heading("Title", "Cover"),
            heading("Heading2", "Real"),
        ];
        let entries = resolve_headings(&mut nodes, &outline());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "Real");
        assert_eq!(entries[0].level, 2);

        let entries = resolve_headings(&mut nodes, &["Heading1".to_string()]);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_headings_inside_table_cells() {
        let mut nodes: Vec<Node> = vec![Table::new(vec![TableRow::from_cells(vec![
            TableCell::new().child(heading("Heading2", "In a cell")),
        ])])
        .into()];
        let entries = resolve_headings(&mut nodes, &outline());
        assert_eq!(entries.len(), 1);
        assert!(entries[0].name.starts_with("_Toc"));
    }

    #[test]
    fn test_no_toc_leaves_tree_untouched() {
        let mut nodes: Vec<Node> = vec![heading("Heading1", "Alone")];
        let xml = render(&mut nodes);
        assert!(!xml.contains("bookmarkStart"));
        assert!(!contains_toc(&nodes));
    }

    #[test]
    fn test_toc_title() {
        let mut nodes: Vec<Node> = vec![TableOfContents::new().title("Contents").into()];
        let xml = render(&mut nodes);
        assert!(xml.contains(r#"<w:pStyle w:val="TOCHeading"/></w:pPr><w:r><w:t>Contents</w:t>"#));
    }
}
