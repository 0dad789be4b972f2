/// Run-level content: text, fields and breaks.
use crate::common::xml::escape_xml;
use crate::ooxml::error::Result;
use std::fmt::Write as FmtWrite;

pub use super::super::format::{UnderlineStyle, VerticalTextAlignment};

/// Character formatting shared by every inline content kind.
///
/// Unset attributes are omitted from the output rather than written with a
/// default value, so the paragraph or character style stays in charge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunAttributes {
    /// Character style id
    pub style: Option<String>,
    /// Font family applied to all scripts
    pub font: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// Text color in hex RGB (e.g., "1F497D")
    pub color: Option<String>,
    /// Font size in half-points (e.g., 24 = 12pt)
    pub size: Option<u32>,
    /// Highlight color name (e.g., "yellow")
    pub highlight: Option<String>,
    pub underline: Option<UnderlineStyle>,
    /// Background shading fill in hex RGB
    pub background: Option<String>,
    pub vertical_align: Option<VerticalTextAlignment>,
}

impl RunAttributes {
    pub fn is_empty(&self) -> bool {
        self.style.is_none()
            && self.font.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.color.is_none()
            && self.size.is_none()
            && self.highlight.is_none()
            && self.underline.is_none()
            && self.background.is_none()
            && self.vertical_align.is_none()
    }

    /// Write `w:rPr`. Nothing is written when no attribute is set.
    pub(crate) fn to_xml(&self, xml: &mut String) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        xml.push_str("<w:rPr>");
        if let Some(ref style) = self.style {
            write!(xml, r#"<w:rStyle w:val="{}"/>"#, escape_xml(style))?;
        }
        if let Some(ref font) = self.font {
            let font = escape_xml(font);
            write!(
                xml,
                r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:eastAsia="{0}" w:cs="{0}"/>"#,
                font
            )?;
        }
        if let Some(bold) = self.bold {
            write!(xml, r#"<w:b w:val="{}"/>"#, on_off(bold))?;
        }
        if let Some(italic) = self.italic {
            write!(xml, r#"<w:i w:val="{}"/>"#, on_off(italic))?;
        }
        if let Some(ref color) = self.color {
            write!(xml, r#"<w:color w:val="{}"/>"#, escape_xml(color))?;
        }
        if let Some(size) = self.size {
            write!(xml, r#"<w:sz w:val="{}"/>"#, size)?;
        }
        if let Some(ref highlight) = self.highlight {
            write!(xml, r#"<w:highlight w:val="{}"/>"#, escape_xml(highlight))?;
        }
        if let Some(underline) = self.underline {
            write!(xml, r#"<w:u w:val="{}"/>"#, underline.as_str())?;
        }
        if let Some(ref background) = self.background {
            write!(
                xml,
                r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                escape_xml(background)
            )?;
        }
        if let Some(vertical_align) = self.vertical_align {
            write!(xml, r#"<w:vertAlign w:val="{}"/>"#, vertical_align.as_str())?;
        }
        xml.push_str("</w:rPr>");
        Ok(())
    }
}

#[inline]
fn on_off(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Builder methods shared by every node that carries [`RunAttributes`].
macro_rules! run_attribute_setters {
    ($ty:ty) => {
        impl $ty {
            pub fn style(mut self, style: impl Into<String>) -> Self {
                self.attributes.style = Some(style.into());
                self
            }

            pub fn font(mut self, font: impl Into<String>) -> Self {
                self.attributes.font = Some(font.into());
                self
            }

            pub fn bold(mut self, bold: bool) -> Self {
                self.attributes.bold = Some(bold);
                self
            }

            pub fn italic(mut self, italic: bool) -> Self {
                self.attributes.italic = Some(italic);
                self
            }

            pub fn color(mut self, color: impl Into<String>) -> Self {
                self.attributes.color = Some(color.into());
                self
            }

            /// Font size in half-points.
            pub fn size(mut self, size: u32) -> Self {
                self.attributes.size = Some(size);
                self
            }

            pub fn highlight(mut self, color: impl Into<String>) -> Self {
                self.attributes.highlight = Some(color.into());
                self
            }

            pub fn underline(
                mut self,
                underline: $crate::ooxml::docx::format::UnderlineStyle,
            ) -> Self {
                self.attributes.underline = Some(underline);
                self
            }

            pub fn background(mut self, fill: impl Into<String>) -> Self {
                self.attributes.background = Some(fill.into());
                self
            }

            pub fn vertical_align(
                mut self,
                align: $crate::ooxml::docx::format::VerticalTextAlignment,
            ) -> Self {
                self.attributes.vertical_align = Some(align);
                self
            }

            pub fn attributes(&self) -> &$crate::ooxml::docx::writer::run::RunAttributes {
                &self.attributes
            }
        }
    };
}

pub(crate) use run_attribute_setters;

/// A run of text.
#[derive(Debug, Clone, Default)]
pub struct Text {
    pub content: String,
    pub attributes: RunAttributes,
    /// Append a tab character after the text
    pub end_tab: bool,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn end_tab(mut self, end_tab: bool) -> Self {
        self.end_tab = end_tab;
        self
    }

    pub(crate) fn to_xml(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<w:r>");
        self.attributes.to_xml(xml)?;
        write!(
            xml,
            r#"<w:t xml:space="preserve">{}</w:t>"#,
            escape_xml(&self.content)
        )?;
        if self.end_tab {
            xml.push_str("<w:tab/>");
        }
        xml.push_str("</w:r>");
        Ok(())
    }
}

run_attribute_setters!(Text);

/// A complex field (e.g. `PAGE`, `NUMPAGES`, `DATE \@ "yyyy"`).
///
/// The result is left empty; the consuming application computes it.
#[derive(Debug, Clone, Default)]
pub struct Field {
    pub instruction: String,
    pub attributes: RunAttributes,
}

impl Field {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            ..Default::default()
        }
    }

    pub(crate) fn to_xml(&self, xml: &mut String) -> Result<()> {
        self.field_char(xml, "begin")?;
        xml.push_str("<w:r>");
        self.attributes.to_xml(xml)?;
        write!(
            xml,
            r#"<w:instrText xml:space="preserve"> {} </w:instrText>"#,
            escape_xml(self.instruction.trim())
        )?;
        xml.push_str("</w:r>");
        self.field_char(xml, "separate")?;
        self.field_char(xml, "end")
    }

    fn field_char(&self, xml: &mut String, kind: &str) -> Result<()> {
        xml.push_str("<w:r>");
        self.attributes.to_xml(xml)?;
        write!(xml, r#"<w:fldChar w:fldCharType="{}"/>"#, kind)?;
        xml.push_str("</w:r>");
        Ok(())
    }
}

run_attribute_setters!(Field);

/// A hard page break.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageBreak {
    /// Wrap the break in its own paragraph (for use between blocks)
    pub wrap: bool,
}

impl PageBreak {
    pub fn new(wrap: bool) -> Self {
        Self { wrap }
    }

    pub(crate) fn to_xml(&self, xml: &mut String) {
        if self.wrap {
            xml.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
        } else {
            xml.push_str(r#"<w:r><w:br w:type="page"/></w:r>"#);
        }
    }
}
