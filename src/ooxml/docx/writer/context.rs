//! Per-part configuration consumed while rendering.
//!
//! A [`SectionContext`] carries everything the renderer needs to know about
//! the surrounding package without owning any of it: page geometry, the
//! namespace table written on the root element, which paragraph styles count
//! as headings, list indentation and the header/footer parts the section links
//! to. Every field has a default, so a context can be loaded from a partial
//! YAML document.
use super::list::ListType;
use super::section::SectionProperties;
use crate::ooxml::docx::format::HeaderFooterType;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace;
use serde::{Deserialize, Serialize};

/// The document's default paragraph style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultStyle {
    /// Style id (e.g., "Normal")
    pub id: String,
    /// Line spacing in 240ths of a line
    pub line: u32,
}

impl Default for DefaultStyle {
    fn default() -> Self {
        Self {
            id: "Normal".to_string(),
            line: 360,
        }
    }
}

/// One `xmlns:<prefix>` declaration on the root element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub prefix: String,
    pub href: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            href: href.into(),
        }
    }
}

/// Indentation of one list level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStyle {
    #[serde(rename = "type")]
    pub list_type: ListType,
    pub level: u8,
    /// Left edge of the item text, in twips
    pub left: u32,
    /// Width reserved for the bullet or number, in twips
    pub indent: u32,
}

impl ListStyle {
    /// Hanging indent written for items of this style.
    pub fn hanging(&self) -> i64 {
        self.left as i64 - self.indent as i64 - 1
    }

    /// Nine levels per list type, indented half an inch per level.
    pub fn defaults() -> Vec<ListStyle> {
        [ListType::Ordered, ListType::Unordered]
            .into_iter()
            .flat_map(|list_type| {
                (0..9u8).map(move |level| ListStyle {
                    list_type,
                    level,
                    left: 720 * (level as u32 + 1),
                    indent: 360,
                })
            })
            .collect()
    }
}

/// A header or footer part the section links to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFooterPart {
    /// Part target relative to the main document (e.g., "header1.xml")
    pub target: String,
    #[serde(default, rename = "type")]
    pub kind: HeaderFooterType,
}

impl HeaderFooterPart {
    pub fn new(target: impl Into<String>, kind: HeaderFooterType) -> Self {
        Self {
            target: target.into(),
            kind,
        }
    }
}

/// Configuration of the part being rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionContext {
    pub page: SectionProperties,
    /// Page background in hex RGB
    pub background_color: String,
    /// Required by image rendering
    pub default_style: Option<DefaultStyle>,
    pub namespaces: Vec<Namespace>,
    /// Prefixes listed in `mc:Ignorable`
    pub ignorables: Vec<String>,
    /// Paragraph style ids treated as headings (`Heading1`..`Heading6`)
    pub outline_styles: Vec<String>,
    pub list_styles: Vec<ListStyle>,
    pub headers: Vec<HeaderFooterPart>,
    pub footers: Vec<HeaderFooterPart>,
}

impl Default for SectionContext {
    fn default() -> Self {
        Self {
            page: SectionProperties::default(),
            background_color: "FFFFFF".to_string(),
            default_style: Some(DefaultStyle::default()),
            namespaces: default_namespaces(),
            ignorables: Vec::new(),
            outline_styles: (1..=6).map(|level| format!("Heading{}", level)).collect(),
            list_styles: ListStyle::defaults(),
            headers: Vec::new(),
            footers: Vec::new(),
        }
    }
}

impl SectionContext {
    /// Load a context from YAML. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml).map_err(|e| OoxmlError::Config(e.to_string()))
    }

    /// Look up the list style for `(list_type, level)`.
    pub fn find_list_style(&self, list_type: ListType, level: u8) -> Result<&ListStyle> {
        self.list_styles
            .iter()
            .find(|style| style.list_type == list_type && style.level == level)
            .ok_or_else(|| OoxmlError::MissingListStyle {
                list_type: list_type.as_str().to_string(),
                level,
            })
    }

    /// URI bound to `prefix` in the namespace table.
    pub fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|ns| ns.prefix == prefix)
            .map(|ns| ns.href.as_str())
    }

    pub(crate) fn header_type(&self, target: &str) -> HeaderFooterType {
        part_type(&self.headers, target)
    }

    pub(crate) fn footer_type(&self, target: &str) -> HeaderFooterType {
        part_type(&self.footers, target)
    }
}

fn part_type(parts: &[HeaderFooterPart], target: &str) -> HeaderFooterType {
    parts
        .iter()
        .find(|part| part.target == target)
        .map(|part| part.kind)
        .unwrap_or_default()
}

fn default_namespaces() -> Vec<Namespace> {
    [
        ("mc", namespace::MC),
        ("o", namespace::VML_OFFICE),
        ("r", namespace::OFC_RELATIONSHIPS),
        ("m", namespace::OFC_MATH),
        ("v", namespace::VML),
        ("wp", namespace::DML_WORDPROCESSING_DRAWING),
        ("w10", namespace::VML_WORD),
        ("w", namespace::WML_MAIN),
        ("wne", namespace::WML_WNE),
        ("sl", namespace::SCHEMA_LIBRARY),
        ("a", namespace::DML_MAIN),
        ("pic", namespace::DML_PICTURE),
        ("c", namespace::DML_CHART),
        ("lc", namespace::DML_LOCKED_CANVAS),
        ("dgm", namespace::DML_DIAGRAM),
    ]
    .into_iter()
    .map(|(prefix, href)| Namespace::new(prefix, href))
    .collect()
}
