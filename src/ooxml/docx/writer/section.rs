/// Page geometry and the trailing `w:sectPr` of a rendered part.
use crate::common::unit::inch_to_twip;
use crate::ooxml::docx::format::HeaderFooterType;
use crate::ooxml::error::Result;
use crate::ooxml::opc::rel::Relationship;
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;

/// Page orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOrientation {
    #[default]
    Portrait,
    Landscape,
}

impl PageOrientation {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

/// Page size and margins, all in twips (1440 = 1 inch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionProperties {
    pub page_width: u32,
    pub page_height: u32,
    pub orientation: PageOrientation,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
    pub margin_right: u32,
}

impl Default for SectionProperties {
    fn default() -> Self {
        // US Letter size: 8.5" x 11" = 12240 x 15840 twips
        Self {
            page_width: 12240,
            page_height: 15840,
            orientation: PageOrientation::Portrait,
            margin_top: 1440,
            margin_bottom: 1440,
            margin_left: 1440,
            margin_right: 1440,
        }
    }
}

impl SectionProperties {
    /// Create A4 page size (210mm x 297mm).
    pub fn a4() -> Self {
        Self {
            page_width: 11906,
            page_height: 16838,
            ..Default::default()
        }
    }

    /// Create US Letter page size (8.5" x 11").
    pub fn letter() -> Self {
        Self::default()
    }

    /// Set page to landscape orientation.
    pub fn landscape(mut self) -> Self {
        if self.orientation == PageOrientation::Portrait {
            std::mem::swap(&mut self.page_width, &mut self.page_height);
        }
        self.orientation = PageOrientation::Landscape;
        self
    }

    /// Set margins (all in inches).
    pub fn margins(mut self, top: f64, bottom: f64, left: f64, right: f64) -> Self {
        self.margin_top = inch_to_twip(top);
        self.margin_bottom = inch_to_twip(bottom);
        self.margin_left = inch_to_twip(left);
        self.margin_right = inch_to_twip(right);
        self
    }

    /// Width available between the left and right margins.
    pub fn content_width(&self) -> u32 {
        self.page_width
            .saturating_sub(self.margin_left)
            .saturating_sub(self.margin_right)
    }

    /// Write `w:sectPr` with the given header and footer references.
    pub(crate) fn to_xml(
        &self,
        xml: &mut String,
        headers: &[(Relationship, HeaderFooterType)],
        footers: &[(Relationship, HeaderFooterType)],
    ) -> Result<()> {
        xml.push_str("<w:sectPr>");
        for (rel, kind) in headers {
            write!(
                xml,
                r#"<w:headerReference r:id="{}" w:type="{}"/>"#,
                rel.formatted_id(),
                kind.as_str()
            )?;
        }
        for (rel, kind) in footers {
            write!(
                xml,
                r#"<w:footerReference r:id="{}" w:type="{}"/>"#,
                rel.formatted_id(),
                kind.as_str()
            )?;
        }
        write!(
            xml,
            r#"<w:pgSz w:w="{}" w:h="{}" w:orient="{}"/>"#,
            self.page_width,
            self.page_height,
            self.orientation.as_str()
        )?;
        write!(
            xml,
            r#"<w:pgMar w:top="{}" w:bottom="{}" w:left="{}" w:right="{}"/>"#,
            self.margin_top, self.margin_bottom, self.margin_left, self.margin_right
        )?;
        xml.push_str("</w:sectPr>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::rel::{RelationshipKind, RelationshipRegistry, Relationships};

    #[test]
    fn test_landscape_swaps_once() {
        let page = SectionProperties::letter().landscape().landscape();
        assert_eq!(page.page_width, 15840);
        assert_eq!(page.page_height, 12240);
        assert_eq!(page.orientation, PageOrientation::Landscape);
    }

    #[test]
    fn test_content_width() {
        let page = SectionProperties::default().margins(1.0, 1.0, 0.5, 0.5);
        assert_eq!(page.content_width(), 12240 - 1440);
    }

    #[test]
    fn test_sect_pr_order() {
        let mut rels = Relationships::new();
        let header = rels.relationship(RelationshipKind::Header, "header1.xml", None);
        let footer = rels.relationship(RelationshipKind::Footer, "footer1.xml", None);

        let mut xml = String::new();
        SectionProperties::default()
            .to_xml(
                &mut xml,
                &[(header, HeaderFooterType::First)],
                &[(footer, HeaderFooterType::Default)],
            )
            .unwrap();

        assert_eq!(
            xml,
            concat!(
                r#"<w:sectPr><w:headerReference r:id="rId1" w:type="first"/>"#,
                r#"<w:footerReference r:id="rId2" w:type="default"/>"#,
                r#"<w:pgSz w:w="12240" w:h="15840" w:orient="portrait"/>"#,
                r#"<w:pgMar w:top="1440" w:bottom="1440" w:left="1440" w:right="1440"/>"#,
                "</w:sectPr>"
            )
        );
    }
}
