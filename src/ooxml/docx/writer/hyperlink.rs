/// Hyperlink support for DOCX documents.
use crate::common::xml::escape_xml;
use crate::ooxml::error::Result;
use crate::ooxml::opc::rel::RelationshipKind;
use std::fmt::Write as FmtWrite;

use super::render::RenderSession;
use super::run::{RunAttributes, run_attribute_setters};

/// Where a hyperlink points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// A URL outside the package, referenced through a relationship
    External(String),
    /// A bookmark name inside the document
    Anchor(String),
}

/// A hyperlink with a single run of display text.
#[derive(Debug, Clone)]
pub struct Link {
    pub content: String,
    pub target: LinkTarget,
    pub attributes: RunAttributes,
}

impl Link {
    pub fn external(content: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            target: LinkTarget::External(href.into()),
            attributes: RunAttributes::default(),
        }
    }

    /// Link to a bookmark in the same document.
    pub fn anchor(content: impl Into<String>, bookmark: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            target: LinkTarget::Anchor(bookmark.into()),
            attributes: RunAttributes::default(),
        }
    }

    pub(crate) fn to_xml(&self, xml: &mut String, session: &mut RenderSession<'_>) -> Result<()> {
        match &self.target {
            LinkTarget::External(href) => {
                let rel = session.relationship(RelationshipKind::Link, href, None);
                write!(xml, r#"<w:hyperlink r:id="{}">"#, rel.formatted_id())?;
            },
            LinkTarget::Anchor(name) => {
                write!(xml, r#"<w:hyperlink w:anchor="{}">"#, escape_xml(name))?;
            },
        }
        xml.push_str("<w:r>");
        self.attributes.to_xml(xml)?;
        write!(
            xml,
            r#"<w:t xml:space="preserve">{}</w:t>"#,
            escape_xml(&self.content)
        )?;
        xml.push_str("</w:r></w:hyperlink>");
        Ok(())
    }
}

run_attribute_setters!(Link);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::writer::context::SectionContext;
    use crate::ooxml::opc::rel::{RelationshipRegistry, Relationships};

    #[test]
    fn test_external_links_share_relationship() {
        let ctx = SectionContext::default();
        let mut rels = Relationships::new();
        let mut xml = String::new();
        {
            let mut session = RenderSession::new(&ctx, &mut rels, Vec::new());
            let link = Link::external("Docs", "https://example.com/docs").color("0563C1");
            link.to_xml(&mut xml, &mut session).unwrap();
            link.to_xml(&mut xml, &mut session).unwrap();
        }

        assert_eq!(xml.matches(r#"<w:hyperlink r:id="rId1">"#).count(), 2);
        assert!(xml.contains(r#"<w:color w:val="0563C1"/>"#));
        assert_eq!(rels.len(), 1);
        assert!(rels
            .find_relationship(RelationshipKind::Link, "https://example.com/docs")
            .is_some());
    }

    #[test]
    fn test_internal_link_uses_anchor() {
        let ctx = SectionContext::default();
        let mut rels = Relationships::new();
        let mut xml = String::new();
        {
            let mut session = RenderSession::new(&ctx, &mut rels, Vec::new());
            Link::anchor("See intro", "_Toc7")
                .to_xml(&mut xml, &mut session)
                .unwrap();
        }

        assert!(xml.starts_with(r#"<w:hyperlink w:anchor="_Toc7"><w:r><w:t"#));
        assert!(rels.is_empty());
    }
}
