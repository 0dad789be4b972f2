/// Bookmark writer support for DOCX documents.
use crate::common::xml::escape_xml;
use crate::ooxml::error::Result;
use std::fmt::Write as FmtWrite;

/// One side of a bookmark pair.
///
/// A start and its end share the same `id`; only the start carries the name
/// hyperlinks and fields refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bookmark {
    Start { id: u32, name: String },
    End { id: u32 },
}

impl Bookmark {
    pub fn start(id: u32, name: impl Into<String>) -> Self {
        Self::Start {
            id,
            name: name.into(),
        }
    }

    pub fn end(id: u32) -> Self {
        Self::End { id }
    }

    #[inline]
    pub fn id(&self) -> u32 {
        match self {
            Self::Start { id, .. } | Self::End { id } => *id,
        }
    }

    /// The bookmark name, for starts.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Start { name, .. } => Some(name),
            Self::End { .. } => None,
        }
    }

    pub(crate) fn to_xml(&self, xml: &mut String) -> Result<()> {
        match self {
            Self::Start { id, name } => write!(
                xml,
                r#"<w:bookmarkStart w:id="{}" w:name="{}"/>"#,
                id,
                escape_xml(name)
            )?,
            Self::End { id } => write!(xml, r#"<w:bookmarkEnd w:id="{}"/>"#, id)?,
        }
        Ok(())
    }
}
