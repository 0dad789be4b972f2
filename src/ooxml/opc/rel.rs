//! Relationship registry for a rendered part.
//!
//! The renderer never stores relationship ids itself: every image, external
//! hyperlink and header/footer reference is resolved through a
//! [`RelationshipRegistry`] at the moment its node is rendered, so ids are
//! assigned in document order and stay stable for the rest of the render.
use crate::ooxml::docx::format::ImageFormat;
use crate::ooxml::opc::constants::{namespace, relationship_type, target_mode};
use bytes::Bytes;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::sync::Arc;

/// The kind of resource a relationship points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Image,
    Link,
    Header,
    Footer,
    Styles,
    Numbering,
    Settings,
    FontTable,
    Theme,
}

impl RelationshipKind {
    /// Relationship type URI written to the `.rels` part.
    pub fn reltype(&self) -> &'static str {
        match self {
            Self::Image => relationship_type::IMAGE,
            Self::Link => relationship_type::HYPERLINK,
            Self::Header => relationship_type::HEADER,
            Self::Footer => relationship_type::FOOTER,
            Self::Styles => relationship_type::STYLES,
            Self::Numbering => relationship_type::NUMBERING,
            Self::Settings => relationship_type::SETTINGS,
            Self::FontTable => relationship_type::FONT_TABLE,
            Self::Theme => relationship_type::THEME,
        }
    }

    /// Whether the target lives outside the package.
    #[inline]
    pub fn is_external(&self) -> bool {
        matches!(self, Self::Link)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Link => "link",
            Self::Header => "header",
            Self::Footer => "footer",
            Self::Styles => "styles",
            Self::Numbering => "numbering",
            Self::Settings => "settings",
            Self::FontTable => "fontTable",
            Self::Theme => "theme",
        }
    }
}

/// A single relationship from the rendered part to a target.
#[derive(Debug, Clone)]
pub struct Relationship {
    id: u32,
    kind: RelationshipKind,
    target: String,
    formatted_id: String,
    formatted_target: String,
    /// Payload for internal media targets (image bytes)
    data: Option<Bytes>,
}

impl Relationship {
    fn new(id: u32, kind: RelationshipKind, target: &str, data: Option<Bytes>) -> Self {
        let formatted_target = match kind {
            RelationshipKind::Image => {
                format!("media/image{}.{}", id, image_extension(target, data.as_deref()))
            },
            _ => target.to_string(),
        };
        Self {
            id,
            kind,
            target: target.to_string(),
            formatted_id: format!("rId{}", id),
            formatted_target,
            data,
        }
    }

    /// Numeric relationship id (1-based).
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    /// The target as requested by the caller.
    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Relationship reference as used in `r:id`/`r:embed` (e.g. `rId7`).
    #[inline]
    pub fn formatted_id(&self) -> &str {
        &self.formatted_id
    }

    /// Target as written to the `.rels` part.
    ///
    /// Images are renamed to `media/image<id>.<ext>` so that two images with the
    /// same file name never collide inside the package.
    #[inline]
    pub fn formatted_target(&self) -> &str {
        &self.formatted_target
    }

    #[inline]
    pub fn data(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }
}

/// Pick the media file extension for an image relationship.
fn image_extension(target: &str, data: Option<&[u8]>) -> String {
    if let Some(format) = data.and_then(ImageFormat::detect_from_bytes) {
        return format.extension().to_string();
    }

    let path = target.split(['?', '#']).next().unwrap_or(target);
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        },
        _ => "png".to_string(),
    }
}

/// Contract of the relationship store consumed by the renderer.
///
/// Implementations must assign strictly increasing positive ids and must keep
/// an id stable once it has been handed out for a `(kind, target)` pair.
pub trait RelationshipRegistry {
    /// Resolve the relationship for `(kind, target)`, minting a new id if the
    /// pair has not been seen before.
    fn relationship(
        &mut self,
        kind: RelationshipKind,
        target: &str,
        data: Option<Bytes>,
    ) -> Relationship;

    /// Look up an existing relationship without minting.
    fn find_relationship(&self, kind: RelationshipKind, target: &str) -> Option<Relationship>;

    /// All relationships of one kind, in id order.
    fn relationships_by_kind(&self, kind: RelationshipKind) -> Vec<Relationship>;
}

/// In-memory relationship registry for one document part.
///
/// Identical `(kind, target)` pairs are deduplicated onto the first id minted
/// for them; the payload of later requests is ignored.
#[derive(Debug, Default)]
pub struct Relationships {
    rels: Vec<Relationship>,
    index: HashMap<(RelationshipKind, String), usize>,
    counter: u32,
}

impl Relationships {
    /// Create an empty registry; the first id minted is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-seeded with the parts every main document links to.
    pub fn with_package_defaults() -> Self {
        let mut rels = Self::new();
        rels.relationship(RelationshipKind::FontTable, "fontTable.xml", None);
        rels.relationship(RelationshipKind::Numbering, "numbering.xml", None);
        rels.relationship(RelationshipKind::Settings, "settings.xml", None);
        rels.relationship(RelationshipKind::Styles, "styles.xml", None);
        rels
    }

    /// Number of relationships registered so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Iterate relationships in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    /// Render the `.rels` part for everything registered.
    pub fn to_rels_xml(&self) -> crate::ooxml::error::Result<String> {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(xml, r#"<Relationships xmlns="{}">"#, namespace::OPC_RELATIONSHIPS)?;
        for rel in &self.rels {
            write!(
                xml,
                r#"<Relationship Id="{}" Type="{}" Target=""#,
                rel.formatted_id,
                rel.kind.reltype()
            )?;
            crate::common::xml::push_escaped(&mut xml, &rel.formatted_target);
            xml.push('"');
            if rel.kind.is_external() {
                write!(xml, r#" TargetMode="{}""#, target_mode::EXTERNAL)?;
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        Ok(xml)
    }
}

impl RelationshipRegistry for Relationships {
    fn relationship(
        &mut self,
        kind: RelationshipKind,
        target: &str,
        data: Option<Bytes>,
    ) -> Relationship {
        if let Some(&pos) = self.index.get(&(kind, target.to_string())) {
            return self.rels[pos].clone();
        }

        self.counter += 1;
        let rel = Relationship::new(self.counter, kind, target, data);
        log::debug!(
            "minted {} relationship {} -> {}",
            kind.as_str(),
            rel.formatted_id,
            rel.formatted_target
        );
        self.index.insert((kind, target.to_string()), self.rels.len());
        self.rels.push(rel.clone());
        rel
    }

    fn find_relationship(&self, kind: RelationshipKind, target: &str) -> Option<Relationship> {
        self.index
            .get(&(kind, target.to_string()))
            .map(|&pos| self.rels[pos].clone())
    }

    fn relationships_by_kind(&self, kind: RelationshipKind) -> Vec<Relationship> {
        self.rels.iter().filter(|r| r.kind == kind).cloned().collect()
    }
}

/// A registry shared between threads rendering parts of the same document.
///
/// Minting is serialized by a lock so two parts resolving the same target never
/// race on id assignment.
#[derive(Debug, Default)]
pub struct SharedRelationships<R = Relationships> {
    inner: Arc<Mutex<R>>,
}

impl<R> Clone for SharedRelationships<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: RelationshipRegistry> SharedRelationships<R> {
    pub fn new(registry: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Lock the underlying registry.
    pub fn lock(&self) -> MutexGuard<'_, R> {
        self.inner.lock()
    }
}

impl<R: RelationshipRegistry> RelationshipRegistry for SharedRelationships<R> {
    fn relationship(
        &mut self,
        kind: RelationshipKind,
        target: &str,
        data: Option<Bytes>,
    ) -> Relationship {
        self.inner.lock().relationship(kind, target, data)
    }

    fn find_relationship(&self, kind: RelationshipKind, target: &str) -> Option<Relationship> {
        self.inner.lock().find_relationship(kind, target)
    }

    fn relationships_by_kind(&self, kind: RelationshipKind) -> Vec<Relationship> {
        self.inner.lock().relationships_by_kind(kind)
    }
}
