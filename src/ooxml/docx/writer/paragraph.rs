/// Paragraph types and implementation for DOCX documents.
use crate::common::xml::escape_xml;
use crate::ooxml::error::Result;
use smallvec::SmallVec;
use std::fmt::Write as FmtWrite;

pub use super::super::format::{BorderStyle, ParagraphAlignment, TabAlignment, TabLeader};
use super::node::{Node, NodeKind};
use super::render::RenderSession;
use super::run::{RunAttributes, run_attribute_setters};

/// A custom tab stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabStop {
    pub alignment: TabAlignment,
    /// Position in twips from the leading edge of the text area
    pub position: u32,
    pub leader: TabLeader,
}

impl TabStop {
    /// A left-aligned tab stop without leader.
    pub fn at(position: u32) -> Self {
        Self {
            alignment: TabAlignment::Start,
            position,
            leader: TabLeader::None,
        }
    }

    pub fn new(alignment: TabAlignment, position: u32, leader: TabLeader) -> Self {
        Self {
            alignment,
            position,
            leader,
        }
    }

    pub(crate) fn to_xml(&self, xml: &mut String) -> Result<()> {
        write!(
            xml,
            r#"<w:tab w:val="{}" w:pos="{}" w:leader="{}"/>"#,
            self.alignment.as_str(),
            self.position,
            self.leader.as_str()
        )?;
        Ok(())
    }
}

/// Which edge an indentation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentSide {
    Start,
    End,
    Left,
    Right,
    FirstLine,
    Hanging,
}

impl IndentSide {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Left => "left",
            Self::Right => "right",
            Self::FirstLine => "firstLine",
            Self::Hanging => "hanging",
        }
    }
}

/// Paragraph indentation in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indent {
    pub side: IndentSide,
    pub value: u32,
}

/// A paragraph and its inline children.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    /// Paragraph style id
    pub style_id: Option<String>,
    pub keep_next: bool,
    pub tabs: SmallVec<[TabStop; 4]>,
    pub indent: Option<Indent>,
    pub alignment: Option<ParagraphAlignment>,
    /// Formatting of the paragraph mark
    pub attributes: RunAttributes,
    pub children: Vec<Node>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the paragraph style (e.g., "Heading1").
    pub fn style_id(mut self, style_id: impl Into<String>) -> Self {
        self.style_id = Some(style_id.into());
        self
    }

    pub fn keep_next(mut self, keep_next: bool) -> Self {
        self.keep_next = keep_next;
        self
    }

    pub fn tab(mut self, tab: TabStop) -> Self {
        self.tabs.push(tab);
        self
    }

    pub fn indent(mut self, side: IndentSide, value: u32) -> Self {
        self.indent = Some(Indent { side, value });
        self
    }

    pub fn align(mut self, alignment: ParagraphAlignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Concatenated text of the text and link children.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            match &child.kind {
                NodeKind::Text(run) => text.push_str(&run.content),
                NodeKind::Link(link) => text.push_str(&link.content),
                _ => {},
            }
        }
        text
    }

    /// Whether the paragraph shows no text at all.
    pub fn is_empty(&self) -> bool {
        self.plain_text().trim().is_empty()
    }

    fn has_properties(&self) -> bool {
        self.style_id.is_some()
            || self.keep_next
            || !self.tabs.is_empty()
            || self.indent.is_some()
            || self.alignment.is_some()
            || !self.attributes.is_empty()
    }

    pub(crate) fn to_xml(&self, xml: &mut String, session: &mut RenderSession<'_>) -> Result<()> {
        xml.push_str("<w:p>");

        if self.has_properties() {
            xml.push_str("<w:pPr>");
            if let Some(ref style) = self.style_id {
                write!(xml, r#"<w:pStyle w:val="{}"/>"#, escape_xml(style))?;
            }
            if self.keep_next {
                xml.push_str("<w:keepNext/>");
            }
            if !self.tabs.is_empty() {
                xml.push_str("<w:tabs>");
                for tab in &self.tabs {
                    tab.to_xml(xml)?;
                }
                xml.push_str("</w:tabs>");
            }
            if let Some(indent) = self.indent {
                write!(xml, r#"<w:ind w:{}="{}"/>"#, indent.side.as_str(), indent.value)?;
            }
            if !self.tabs.is_empty() {
                xml.push_str(r#"<w:contextualSpacing w:val="0"/>"#);
            }
            if let Some(alignment) = self.alignment {
                write!(xml, r#"<w:jc w:val="{}"/>"#, alignment.as_str())?;
            }
            self.attributes.to_xml(xml)?;
            xml.push_str("</w:pPr>");
        }

        session.render_nodes(xml, &self.children)?;
        xml.push_str("</w:p>");
        Ok(())
    }
}

run_attribute_setters!(Paragraph);

/// A horizontal rule: an empty paragraph with a top border.
#[derive(Debug, Clone)]
pub struct Rule {
    pub color: String,
    /// Line width in eighths of a point
    pub size: u32,
    pub line: BorderStyle,
    /// Distance from the text in points
    pub spacing: u32,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            color: "auto".to_string(),
            size: 8,
            line: BorderStyle::Single,
            spacing: 1,
        }
    }
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn line(mut self, line: BorderStyle) -> Self {
        self.line = line;
        self
    }

    pub(crate) fn to_xml(&self, xml: &mut String) -> Result<()> {
        write!(
            xml,
            r#"<w:p><w:pPr><w:pBdr><w:top w:val="{}" w:sz="{}" w:space="{}" w:color="{}"/></w:pBdr></w:pPr></w:p>"#,
            self.line.as_str(),
            self.size,
            self.spacing,
            escape_xml(&self.color)
        )?;
        Ok(())
    }
}
