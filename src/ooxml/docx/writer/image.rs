/// Image support for DOCX documents.
use crate::common::unit::{DEFAULT_PPI, px_to_emu};
use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::rel::{Relationship, RelationshipKind};
use bytes::Bytes;
use std::fmt::Write as FmtWrite;

pub use super::super::format::{ImageFormat, ParagraphAlignment};
use super::render::RenderSession;

/// An image placed in its own paragraph.
///
/// Sizes and distances are given in pixels at `ppi` pixels per inch and
/// converted to EMUs on output.
#[derive(Debug, Clone)]
pub struct Image {
    /// Source of the image; also the deduplication key in the registry
    pub url: String,
    /// Image bytes to be stored in the package
    pub data: Option<Bytes>,
    pub width: u32,
    pub height: u32,
    pub ppi: u32,
    pub align: ParagraphAlignment,
    /// Float the image (anchored to the page) instead of placing it inline
    pub anchor: bool,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
    pub margin_right: u32,
    /// Alternative text
    pub description: String,
}

impl Image {
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            url: url.into(),
            data: None,
            width,
            height,
            ppi: DEFAULT_PPI,
            align: ParagraphAlignment::Left,
            anchor: false,
            margin_top: 0,
            margin_bottom: 0,
            margin_left: 0,
            margin_right: 0,
            description: String::new(),
        }
    }

    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn ppi(mut self, ppi: u32) -> Self {
        self.ppi = ppi;
        self
    }

    pub fn align(mut self, align: ParagraphAlignment) -> Self {
        self.align = align;
        self
    }

    pub fn anchor(mut self, anchor: bool) -> Self {
        self.anchor = anchor;
        self
    }

    /// Distance from surrounding text on every side, in pixels.
    pub fn margins(mut self, top: u32, bottom: u32, left: u32, right: u32) -> Self {
        self.margin_top = top;
        self.margin_bottom = bottom;
        self.margin_left = left;
        self.margin_right = right;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[inline]
    fn emu(&self, px: u32) -> i64 {
        px_to_emu(px, self.ppi)
    }

    /// `align` value for page-relative positioning.
    fn position_align(&self) -> &'static str {
        match self.align {
            ParagraphAlignment::Center => "center",
            ParagraphAlignment::Right => "right",
            ParagraphAlignment::Left | ParagraphAlignment::Justify => "left",
        }
    }

    pub(crate) fn to_xml(&self, xml: &mut String, session: &mut RenderSession<'_>) -> Result<()> {
        let default_style = session
            .ctx()
            .default_style
            .as_ref()
            .ok_or(OoxmlError::MissingDefaultStyle)?;

        let rel = session.relationship(RelationshipKind::Image, &self.url, self.data.clone());

        xml.push_str("<w:p><w:pPr>");
        write!(
            xml,
            r#"<w:spacing w:lineRule="auto" w:line="{}"/><w:contextualSpacing w:val="0"/><w:jc w:val="{}"/>"#,
            default_style.line,
            self.align.as_str()
        )?;
        xml.push_str("</w:pPr><w:r><w:drawing>");

        let dist = format!(
            r#"distT="{}" distB="{}" distL="{}" distR="{}""#,
            self.emu(self.margin_top),
            self.emu(self.margin_bottom),
            self.emu(self.margin_left),
            self.emu(self.margin_right)
        );
        if self.anchor {
            write!(
                xml,
                r#"<wp:anchor {} simplePos="0" relativeHeight="0" behindDoc="0" locked="1" layoutInCell="0" allowOverlap="0">"#,
                dist
            )?;
            xml.push_str(r#"<wp:simplePos x="0" y="0"/>"#);
            write!(
                xml,
                r#"<wp:positionH relativeFrom="page"><wp:align>{}</wp:align></wp:positionH>"#,
                self.position_align()
            )?;
            xml.push_str(r#"<wp:positionV relativeFrom="page"><wp:align>top</wp:align></wp:positionV>"#);
            self.write_graphic(xml, &rel)?;
            xml.push_str("</wp:anchor>");
        } else {
            write!(xml, "<wp:inline {}>", dist)?;
            self.write_graphic(xml, &rel)?;
            xml.push_str("</wp:inline>");
        }

        xml.push_str("</w:drawing></w:r></w:p>");
        Ok(())
    }

    /// Extent, frame properties and the picture itself.
    fn write_graphic(&self, xml: &mut String, rel: &Relationship) -> Result<()> {
        let cx = self.emu(self.width);
        let cy = self.emu(self.height);
        let name = escape_xml(rel.formatted_target());
        let descr = escape_xml(&self.description);

        write!(xml, r#"<wp:extent cx="{}" cy="{}"/>"#, cx, cy)?;
        xml.push_str(r#"<wp:effectExtent l="0" t="0" r="0" b="0"/>"#);
        if self.anchor {
            xml.push_str("<wp:wrapTopAndBottom/>");
        }
        write!(
            xml,
            r#"<wp:docPr id="{}" name="{}" descr="{}"/>"#,
            rel.id(),
            name,
            descr
        )?;
        xml.push_str(r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#);
        write!(
            xml,
            concat!(
                r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                r#"<pic:pic><pic:nvPicPr><pic:cNvPr id="{}" name="{}" descr="{}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
                r#"<pic:blipFill><a:blip r:embed="{}"/><a:srcRect/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
                r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:ln/></pic:spPr>"#,
                r#"</pic:pic></a:graphicData></a:graphic>"#
            ),
            rel.id(),
            name,
            descr,
            rel.formatted_id(),
            cx,
            cy
        )?;
        Ok(())
    }
}
