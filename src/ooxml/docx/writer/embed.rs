//! Embedding the body of another WordprocessingML package.
//!
//! The body children of the foreign `word/document.xml` are spliced into the
//! part being rendered. The foreign package's image and hyperlink
//! relationships are re-minted in the host registry and every reference in
//! the fragment is renumbered to the host ids.
use bytes::Bytes;
use std::path::PathBuf;

/// Where the embedded package comes from.
#[derive(Debug, Clone)]
pub enum EmbedSource {
    /// A `.docx` file on disk
    Path(PathBuf),
    /// An in-memory `.docx`; `name` identifies it in targets and errors
    Bytes { name: String, data: Bytes },
}

/// A foreign document whose body is spliced in at the node's position.
#[derive(Debug, Clone)]
pub struct EmbeddedDocument {
    pub source: EmbedSource,
}

impl EmbeddedDocument {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: EmbedSource::Path(path.into()),
        }
    }

    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            source: EmbedSource::Bytes {
                name: name.into(),
                data: data.into(),
            },
        }
    }

    /// Name used to qualify relationship targets and in error messages.
    pub fn source_name(&self) -> String {
        match &self.source {
            EmbedSource::Path(path) => path.display().to_string(),
            EmbedSource::Bytes { name, .. } => name.clone(),
        }
    }
}

#[cfg(feature = "embed")]
mod splice {
    use super::{EmbedSource, EmbeddedDocument};
    use crate::ooxml::docx::writer::context::SectionContext;
    use crate::ooxml::docx::writer::render::RenderSession;
    use crate::ooxml::error::{OoxmlError, Result};
    use crate::ooxml::opc::constants::{namespace, part_name, relationship_type};
    use crate::ooxml::opc::phys_pkg::{PhysPkgReader, SerializedRelationship, resolve_part_name};
    use crate::ooxml::opc::rel::{Relationship, RelationshipKind};
    use bytes::Bytes;
    use quick_xml::events::attributes::Attribute;
    use quick_xml::events::{BytesStart, Event};
    use quick_xml::name::QName;
    use quick_xml::{Reader, Writer};
    use std::borrow::Cow;
    use std::collections::{BTreeSet, HashMap};

    fn malformed(source: &str, reason: impl Into<String>) -> OoxmlError {
        OoxmlError::MalformedEmbeddedPackage {
            source_name: source.to_string(),
            reason: reason.into(),
        }
    }

    fn unresolvable(source: &str, r_id: &str) -> OoxmlError {
        OoxmlError::UnresolvableRelationshipReference {
            source_name: source.to_string(),
            r_id: r_id.to_string(),
        }
    }

    impl EmbeddedDocument {
        fn open(&self) -> Result<PhysPkgReader> {
            match &self.source {
                EmbedSource::Path(path) => PhysPkgReader::open(path),
                EmbedSource::Bytes { name, data } => {
                    PhysPkgReader::from_bytes(name.clone(), data.to_vec())
                },
            }
        }

        pub(crate) fn to_xml(&self, xml: &mut String, session: &mut RenderSession<'_>) -> Result<()> {
            let mut package = self.open()?;
            let source = package.source_name().to_string();
            let document = package
                .text_for(part_name::MAIN_DOCUMENT)?
                .ok_or_else(|| {
                    malformed(&source, format!("missing {}", part_name::MAIN_DOCUMENT))
                })?;
            let body = Body::parse(&document, &source)?;

            let rels = package.relationships_for(part_name::MAIN_DOCUMENT_RELS)?;
            let foreign = embeddable_relationships(rels, &source)?;

            // Every reference must be renumberable and every relationship
            // referenced before anything reaches the host registry
            let references = body.relationship_references()?;
            if let Some((unused, _)) = foreign
                .iter()
                .find(|(srel, _)| !references.contains(&srel.r_id))
            {
                return Err(unresolvable(&source, &unused.r_id));
            }
            if let Some(unknown) = references
                .iter()
                .find(|r_id| !foreign.iter().any(|(srel, _)| &srel.r_id == *r_id))
            {
                return Err(unresolvable(&source, unknown));
            }

            let mut renumbered = HashMap::with_capacity(foreign.len());
            for (srel, kind) in foreign {
                let rel = match kind {
                    RelationshipKind::Image => {
                        let part =
                            resolve_part_name(part_name::MAIN_DOCUMENT_BASE, &srel.target_ref);
                        let data = package
                            .blob_for(&part)?
                            .ok_or_else(|| malformed(&source, format!("missing media part {}", part)))?;
                        // Qualified so equal media paths of two packages never share an id
                        let target = format!("{}#{}", source, part);
                        session.relationship(kind, &target, Some(Bytes::from(data)))
                    },
                    _ => session.relationship(kind, &srel.target_ref, None),
                };
                log::debug!("{}: {} renumbered to {}", source, srel.r_id, rel.formatted_id());
                renumbered.insert(srel.r_id, rel);
            }

            // Foreign bookmark ids move above everything the host has used
            let bookmarks: HashMap<String, u32> = body
                .bookmark_ids()?
                .into_iter()
                .map(|old| (old, session.next_bookmark_id()))
                .collect();

            let fragment = body.write(&renumbered, &bookmarks, session.ctx())?;
            log::debug!(
                "embedded {}: {} blocks, {} relationships, {} bookmarks, {} bytes",
                source,
                body.block_count(),
                renumbered.len(),
                bookmarks.len(),
                fragment.len()
            );
            xml.push_str(&fragment);
            Ok(())
        }
    }

    /// Image and hyperlink relationships of the foreign main part.
    fn embeddable_relationships(
        rels: Vec<SerializedRelationship>,
        source: &str,
    ) -> Result<Vec<(SerializedRelationship, RelationshipKind)>> {
        let mut embeddable = Vec::new();
        for srel in rels {
            let kind = match srel.reltype.as_str() {
                relationship_type::IMAGE => RelationshipKind::Image,
                relationship_type::HYPERLINK => RelationshipKind::Link,
                _ => continue,
            };
            if kind == RelationshipKind::Image && srel.is_external {
                return Err(malformed(
                    source,
                    format!("image {} is linked rather than embedded", srel.r_id),
                ));
            }
            embeddable.push((srel, kind));
        }
        Ok(embeddable)
    }

    /// Prefix part of a qualified name.
    fn prefix_of(name: &[u8]) -> Option<&[u8]> {
        name.iter().position(|&b| b == b':').map(|pos| &name[..pos])
    }

    fn local_name_of<'e>(event: &'e Event<'_>) -> Option<&'e [u8]> {
        match event {
            Event::Start(e) | Event::Empty(e) => Some(e.local_name().into_inner()),
            _ => None,
        }
    }

    /// The body children of a foreign main document part.
    struct Body<'x> {
        source: &'x str,
        events: Vec<Event<'x>>,
        /// Prefix -> URI declared on the foreign root element
        namespaces: HashMap<String, String>,
        /// Prefix of the office relationships namespace
        r_prefix: Vec<u8>,
    }

    impl<'x> Body<'x> {
        fn parse(document: &'x str, source: &'x str) -> Result<Self> {
            let mut reader = Reader::from_str(document);
            let mut namespaces = HashMap::new();
            let mut events = Vec::new();
            let mut found = false;
            let mut in_body = false;
            let mut depth = 0usize;

            loop {
                let event = reader.read_event().map_err(|e| {
                    let reason = format!("{} is not well-formed: {}", part_name::MAIN_DOCUMENT, e);
                    malformed(source, reason)
                })?;

                if in_body {
                    match &event {
                        Event::Start(_) => depth += 1,
                        Event::End(_) if depth == 0 => break,
                        Event::End(_) => depth -= 1,
                        Event::Eof => return Err(malformed(source, "unterminated w:body")),
                        _ => {},
                    }
                    events.push(event);
                    continue;
                }

                match &event {
                    Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                        b"document" => namespaces = namespace_declarations(e)?,
                        b"body" => {
                            found = true;
                            in_body = matches!(event, Event::Start(_));
                            if !in_body {
                                break;
                            }
                        },
                        _ => {},
                    },
                    Event::Eof => break,
                    _ => {},
                }
            }

            if !found {
                return Err(malformed(source, format!("{} has no w:body", part_name::MAIN_DOCUMENT)));
            }

            let r_prefix = namespaces
                .iter()
                .find(|(_, uri)| uri.as_str() == namespace::OFC_RELATIONSHIPS)
                .map(|(prefix, _)| prefix.as_bytes().to_vec())
                .unwrap_or_else(|| b"r".to_vec());

            let mut body = Self {
                source,
                events,
                namespaces,
                r_prefix,
            };
            body.drop_trailing_section();
            body.strip_part_references();
            Ok(body)
        }

        /// `(first, last)` event index of every top-level element.
        fn blocks(&self) -> Vec<(usize, usize)> {
            let mut blocks = Vec::new();
            let mut depth = 0usize;
            let mut start = 0;
            for (index, event) in self.events.iter().enumerate() {
                match event {
                    Event::Start(_) => {
                        if depth == 0 {
                            start = index;
                        }
                        depth += 1;
                    },
                    Event::End(_) => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            blocks.push((start, index));
                        }
                    },
                    Event::Empty(_) if depth == 0 => blocks.push((index, index)),
                    _ => {},
                }
            }
            blocks
        }

        fn block_count(&self) -> usize {
            self.blocks().len()
        }

        /// The body's own section properties belong to the foreign document.
        fn drop_trailing_section(&mut self) {
            if let Some(&(first, last)) = self.blocks().last()
                && local_name_of(&self.events[first]) == Some(b"sectPr".as_slice())
            {
                self.events.drain(first..=last);
            }
        }

        /// Header and footer parts are not carried over, so section breaks
        /// inside the fragment lose their references to them.
        fn strip_part_references(&mut self) {
            self.events.retain(|event| {
                !matches!(event, Event::Empty(_))
                    || !matches!(
                        local_name_of(event),
                        Some(b"headerReference" | b"footerReference")
                    )
            });
        }

        fn is_relationship_attribute(&self, key: &[u8]) -> bool {
            prefix_of(key) == Some(self.r_prefix.as_slice())
        }

        /// Every relationship id referenced by the fragment.
        fn relationship_references(&self) -> Result<BTreeSet<String>> {
            let mut references = BTreeSet::new();
            for event in &self.events {
                if let Event::Start(e) | Event::Empty(e) = event {
                    for attr in e.attributes() {
                        let attr = attr?;
                        if self.is_relationship_attribute(attr.key.as_ref()) {
                            references.insert(attr.unescape_value()?.into_owned());
                        }
                    }
                }
            }
            Ok(references)
        }

        /// Distinct `w:id` values of the fragment's bookmark markers.
        fn bookmark_ids(&self) -> Result<BTreeSet<String>> {
            let mut ids = BTreeSet::new();
            for event in &self.events {
                if let Event::Start(e) | Event::Empty(e) = event
                    && is_bookmark(e)
                {
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.local_name().as_ref() == b"id" {
                            ids.insert(attr.unescape_value()?.into_owned());
                        }
                    }
                }
            }
            Ok(ids)
        }

        /// Prefixes the fragment relies on: element and attribute prefixes,
        /// plus the tokens of `Requires` and `Ignorable` attributes.
        fn used_prefixes(&self) -> Result<BTreeSet<String>> {
            let mut prefixes = BTreeSet::new();
            for event in &self.events {
                let (Event::Start(e) | Event::Empty(e)) = event else {
                    continue;
                };
                if let Some(prefix) = prefix_of(e.name().as_ref()) {
                    prefixes.insert(String::from_utf8_lossy(prefix).into_owned());
                }
                for attr in e.attributes() {
                    let attr = attr?;
                    let key = attr.key.as_ref();
                    match prefix_of(key) {
                        Some(b"xmlns" | b"xml") => continue,
                        Some(prefix) => {
                            prefixes.insert(String::from_utf8_lossy(prefix).into_owned());
                        },
                        None => {},
                    }
                    if matches!(attr.key.local_name().as_ref(), b"Requires" | b"Ignorable") {
                        let value = attr.unescape_value()?;
                        prefixes.extend(value.split_whitespace().map(str::to_string));
                    }
                }
            }
            Ok(prefixes)
        }

        /// Declarations each top-level element needs because the host lacks
        /// the prefix or binds it to another URI.
        fn missing_declarations(&self, ctx: &SectionContext) -> Result<Vec<(String, String)>> {
            Ok(self
                .used_prefixes()?
                .into_iter()
                .filter_map(|prefix| {
                    let uri = self.namespaces.get(&prefix)?;
                    (ctx.namespace_uri(&prefix) != Some(uri.as_str()))
                        .then(|| (format!("xmlns:{}", prefix), uri.clone()))
                })
                .collect())
        }

        /// Event ranges of drawings with the host id of their picture.
        fn drawing_ids(
            &self,
            renumbered: &HashMap<String, Relationship>,
        ) -> Result<Vec<(usize, usize, u32)>> {
            let mut open = Vec::new();
            let mut drawings = Vec::new();
            for (index, event) in self.events.iter().enumerate() {
                match event {
                    Event::Start(e) if e.local_name().as_ref() == b"drawing" => open.push(index),
                    Event::End(e) if e.local_name().as_ref() == b"drawing" => {
                        if let Some(start) = open.pop()
                            && let Some(id) = self.first_embed(&self.events[start..=index], renumbered)?
                        {
                            drawings.push((start, index, id));
                        }
                    },
                    _ => {},
                }
            }
            Ok(drawings)
        }

        fn first_embed(
            &self,
            events: &[Event<'_>],
            renumbered: &HashMap<String, Relationship>,
        ) -> Result<Option<u32>> {
            for event in events {
                let (Event::Start(e) | Event::Empty(e)) = event else {
                    continue;
                };
                for attr in e.attributes() {
                    let attr = attr?;
                    if self.is_relationship_attribute(attr.key.as_ref())
                        && attr.key.local_name().as_ref() == b"embed"
                    {
                        let old = attr.unescape_value()?;
                        return Ok(renumbered.get(old.as_ref()).map(Relationship::id));
                    }
                }
            }
            Ok(None)
        }

        fn write(
            &self,
            renumbered: &HashMap<String, Relationship>,
            bookmarks: &HashMap<String, u32>,
            ctx: &SectionContext,
        ) -> Result<String> {
            let declarations = self.missing_declarations(ctx)?;
            let drawings = self.drawing_ids(renumbered)?;
            let mut writer = Writer::new(Vec::with_capacity(4096));
            let mut depth = 0usize;

            for (index, event) in self.events.iter().enumerate() {
                let written = match event {
                    Event::Start(e) | Event::Empty(e) => {
                        let object_id = drawings
                            .iter()
                            .find(|(first, last, _)| (*first..=*last).contains(&index))
                            .map(|(_, _, id)| *id);
                        let top_level = (depth == 0).then_some(declarations.as_slice());
                        let start =
                            self.rewrite_start(e, renumbered, bookmarks, object_id, top_level)?;
                        if matches!(event, Event::Start(_)) {
                            depth += 1;
                            writer.write_event(Event::Start(start))
                        } else {
                            writer.write_event(Event::Empty(start))
                        }
                    },
                    Event::End(_) => {
                        depth = depth.saturating_sub(1);
                        writer.write_event(event.clone())
                    },
                    other => writer.write_event(other.clone()),
                };
                written.map_err(|e| {
                    OoxmlError::Xml(format!("cannot write fragment of {}: {}", self.source, e))
                })?;
            }

            String::from_utf8(writer.into_inner())
                .map_err(|e| OoxmlError::Xml(format!("fragment of {} is not UTF-8: {}", self.source, e)))
        }

        /// Copy a start tag, renumbering relationship references, bookmark
        /// ids and drawing object ids and adding namespace declarations to
        /// top-level elements.
        fn rewrite_start(
            &self,
            e: &BytesStart<'_>,
            renumbered: &HashMap<String, Relationship>,
            bookmarks: &HashMap<String, u32>,
            object_id: Option<u32>,
            declarations: Option<&[(String, String)]>,
        ) -> Result<BytesStart<'static>> {
            let mut start = BytesStart::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            let object_id =
                object_id.filter(|_| matches!(e.local_name().as_ref(), b"docPr" | b"cNvPr"));
            let bookmark = is_bookmark(e);

            for attr in e.attributes() {
                let attr = attr?;
                let key = attr.key.as_ref();
                let bookmark_id = if bookmark && attr.key.local_name().as_ref() == b"id" {
                    bookmarks.get(attr.unescape_value()?.as_ref()).copied()
                } else {
                    None
                };
                if self.is_relationship_attribute(key) {
                    let old = attr.unescape_value()?;
                    let rel = renumbered
                        .get(old.as_ref())
                        .ok_or_else(|| unresolvable(self.source, &old))?;
                    start.push_attribute(Attribute {
                        key: QName(key),
                        value: Cow::Borrowed(rel.formatted_id().as_bytes()),
                    });
                } else if let Some(id) = object_id
                    && key == b"id"
                {
                    start.push_attribute(Attribute {
                        key: QName(key),
                        value: Cow::Owned(id.to_string().into_bytes()),
                    });
                } else if let Some(id) = bookmark_id {
                    start.push_attribute(Attribute {
                        key: QName(key),
                        value: Cow::Owned(id.to_string().into_bytes()),
                    });
                } else {
                    start.push_attribute(attr);
                }
            }

            for (key, uri) in declarations.unwrap_or_default() {
                if e.try_get_attribute(key.as_str())?.is_none() {
                    start.push_attribute((key.as_str(), uri.as_str()));
                }
            }
            Ok(start)
        }
    }

    fn is_bookmark(e: &BytesStart<'_>) -> bool {
        matches!(e.local_name().as_ref(), b"bookmarkStart" | b"bookmarkEnd")
    }

    /// `xmlns:*` declarations of an element.
    fn namespace_declarations(e: &BytesStart<'_>) -> Result<HashMap<String, String>> {
        let mut namespaces = HashMap::new();
        for attr in e.attributes() {
            let attr = attr?;
            if let Some(prefix) = attr.key.as_ref().strip_prefix(b"xmlns:") {
                namespaces.insert(
                    String::from_utf8_lossy(prefix).into_owned(),
                    attr.unescape_value()?.into_owned(),
                );
            }
        }
        Ok(namespaces)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::ooxml::docx::writer::node::Node;
        use crate::ooxml::docx::writer::hyperlink::Link;
        use crate::ooxml::docx::writer::paragraph::Paragraph;
        use crate::ooxml::docx::writer::render::DocumentRenderer;
        use crate::ooxml::docx::writer::run::Text;
        use crate::ooxml::docx::writer::toc::TableOfContents;
        use crate::ooxml::opc::rel::{RelationshipRegistry, Relationships};
        use std::io::{Cursor, Write};
        use zip::write::{SimpleFileOptions, ZipWriter};

        const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

        const ROOT: &str = concat!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
            r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
            r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
            r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture" "#,
            r#"xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml">"#
        );

        const DRAWING: &str = concat!(
            r#"<w:p><w:r><w:drawing><wp:inline><wp:extent cx="1" cy="1"/>"#,
            r#"<wp:docPr id="5" name="Picture 5"/><a:graphic><a:graphicData uri="pic">"#,
            r#"<pic:pic><pic:nvPicPr><pic:cNvPr id="5" name="logo.png"/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="rId4"/></pic:blipFill></pic:pic>"#,
            r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#
        );

        const RELS: &str = concat!(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>"#,
            r#"<Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>"#,
            r#"<Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/a?b=1&amp;c=2" TargetMode="External"/>"#,
            r#"</Relationships>"#
        );

        fn package(members: &[(&str, &[u8])]) -> Vec<u8> {
            let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
            for (name, data) in members {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(data).unwrap();
            }
            zip.finish().unwrap().into_inner()
        }

        fn document(body: &str) -> String {
            format!("{}<w:body>{}</w:body></w:document>", ROOT, body)
        }

        fn full_body() -> String {
            format!(
                concat!(
                    r#"<w:p><w:r><w:t>Embedded &amp; kept</w:t></w:r></w:p>"#,
                    "{}",
                    r#"<w:p><w:hyperlink r:id="rId9"><w:r><w:t>site</w:t></w:r></w:hyperlink></w:p>"#,
                    r#"<w:p><w:pPr><w:sectPr><w:headerReference w:type="default" r:id="rId2"/></w:sectPr></w:pPr></w:p>"#,
                    r#"<w:p><w14:marker/></w:p>"#,
                    r#"<w:sectPr><w:headerReference w:type="default" r:id="rId2"/><w:pgSz w:w="1"/></w:sectPr>"#
                ),
                DRAWING
            )
        }

        fn full_package() -> Vec<u8> {
            let doc = document(&full_body());
            package(&[
                ("word/document.xml", doc.as_bytes()),
                ("word/_rels/document.xml.rels", RELS.as_bytes()),
                ("word/media/image1.png", PNG),
            ])
        }

        fn render(embedded: EmbeddedDocument, rels: &mut Relationships) -> Result<String> {
            let ctx = SectionContext::default();
            let mut nodes: Vec<Node> = vec![
                Paragraph::new().child(Link::external("host", "https://host.example")).into(),
                embedded.into(),
            ];
            DocumentRenderer::new(&ctx).render(&mut nodes, rels)
        }

        #[test]
        fn test_body_is_spliced_and_renumbered() {
            let mut rels = Relationships::new();
            let xml = render(EmbeddedDocument::from_bytes("other.docx", full_package()), &mut rels).unwrap();

            assert!(xml.contains("Embedded &amp; kept"));
            // Host link is rId1, then the foreign image and hyperlink in rels order
            assert!(xml.contains(r#"<a:blip r:embed="rId2"/>"#));
            assert!(xml.contains(r#"<wp:docPr id="2" name="Picture 5"/>"#));
            assert!(xml.contains(r#"<pic:cNvPr id="2" name="logo.png"/>"#));
            assert!(xml.contains(r#"<w:hyperlink r:id="rId3">"#));
            assert!(!xml.contains("rId4") && !xml.contains("rId9"));

            let image = rels
                .find_relationship(RelationshipKind::Image, "other.docx#word/media/image1.png")
                .unwrap();
            assert_eq!(image.data().map(|d| d.as_ref()), Some(PNG));
            assert_eq!(image.formatted_target(), "media/image2.png");
            assert!(rels
                .find_relationship(RelationshipKind::Link, "https://example.com/a?b=1&c=2")
                .is_some());
        }

        #[test]
        fn test_foreign_sections_and_part_references_are_dropped() {
            let mut rels = Relationships::new();
            let xml = render(EmbeddedDocument::from_bytes("other.docx", full_package()), &mut rels).unwrap();

            // Only the host's own section properties remain at the end of the body
            assert_eq!(xml.matches("<w:pgSz").count(), 1);
            assert!(!xml.contains(r#"w:w="1""#));
            // The nested section break survives without its header reference
            assert!(xml.contains("<w:pPr><w:sectPr></w:sectPr></w:pPr>"));
            assert!(!xml.contains("headerReference"));
        }

        #[test]
        fn test_unknown_prefixes_declared_on_top_level_elements() {
            let mut rels = Relationships::new();
            let xml = render(EmbeddedDocument::from_bytes("other.docx", full_package()), &mut rels).unwrap();

            let declaration = r#"xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml""#;
            assert!(xml.contains(&format!("<w:p {}><w14:marker/></w:p>", declaration)));
            // Prefixes the host binds to the same URI are not redeclared
            assert!(!xml.contains("<w:p xmlns:w="));
            assert!(!xml.contains(" xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" xmlns:w14"));
        }

        #[test]
        fn test_embed_from_path() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(&full_package()).unwrap();

            let mut rels = Relationships::new();
            let xml = render(EmbeddedDocument::from_path(file.path()), &mut rels).unwrap();
            assert!(xml.contains("Embedded &amp; kept"));

            let target = format!("{}#word/media/image1.png", file.path().display());
            assert!(rels.find_relationship(RelationshipKind::Image, &target).is_some());
        }

        #[test]
        fn test_two_packages_never_share_media() {
            let ctx = SectionContext::default();
            let mut nodes: Vec<Node> = vec![
                EmbeddedDocument::from_bytes("a.docx", full_package()).into(),
                EmbeddedDocument::from_bytes("b.docx", full_package()).into(),
            ];
            let mut rels = Relationships::new();
            DocumentRenderer::new(&ctx).render(&mut nodes, &mut rels).unwrap();

            assert_eq!(rels.relationships_by_kind(RelationshipKind::Image).len(), 2);
            // The shared external link is deduplicated
            assert_eq!(rels.relationships_by_kind(RelationshipKind::Link).len(), 1);
        }

        #[test]
        fn test_foreign_bookmarks_move_above_host_ids() {
            let doc = document(concat!(
                r#"<w:p><w:bookmarkStart w:id="1" w:name="_GoBack"/>"#,
                r#"<w:r><w:t>foreign</w:t></w:r><w:bookmarkEnd w:id="1"/></w:p>"#
            ));
            let data = package(&[("word/document.xml", doc.as_bytes())]);

            let ctx = SectionContext::default();
            let mut nodes: Vec<Node> = vec![
                TableOfContents::new().into(),
                Paragraph::new().style_id("Heading1").child(Text::new("Intro")).into(),
                EmbeddedDocument::from_bytes("other.docx", data).into(),
            ];
            let mut rels = Relationships::new();
            let xml = DocumentRenderer::new(&ctx).render(&mut nodes, &mut rels).unwrap();

            // The synthesized heading bookmark keeps id 1
            assert!(xml.contains(r#"<w:bookmarkStart w:id="2" w:name="_GoBack"/>"#));
            assert!(xml.contains(r#"<w:bookmarkEnd w:id="2"/>"#));
            for id in ["1", "2"] {
                let start = format!(r#"<w:bookmarkStart w:id="{}""#, id);
                let end = format!(r#"<w:bookmarkEnd w:id="{}"/>"#, id);
                assert_eq!(xml.matches(&start).count(), 1, "{}", xml);
                assert_eq!(xml.matches(&end).count(), 1, "{}", xml);
            }
        }

        fn expect_malformed(data: Vec<u8>) {
            let mut rels = Relationships::new();
            let err = render(EmbeddedDocument::from_bytes("bad.docx", data), &mut rels).unwrap_err();
            assert!(matches!(err, OoxmlError::MalformedEmbeddedPackage { .. }), "{:?}", err);
        }

        #[test]
        fn test_malformed_packages() {
            expect_malformed(b"not a zip archive".to_vec());
            expect_malformed(package(&[("word/styles.xml", b"<w:styles/>")]));
            expect_malformed(package(&[(
                "word/document.xml",
                format!("{}</w:document>", ROOT).as_bytes(),
            )]));
        }

        #[test]
        fn test_missing_media_is_malformed() {
            let doc = document(DRAWING);
            let rels = concat!(
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
                r#"<Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>"#,
                r#"</Relationships>"#
            );
            expect_malformed(package(&[
                ("word/document.xml", doc.as_bytes()),
                ("word/_rels/document.xml.rels", rels.as_bytes()),
            ]));
        }

        #[test]
        fn test_unreferenced_relationship_is_unresolvable() {
            let doc = document(r#"<w:p><w:r><w:t>no picture</w:t></w:r></w:p>"#);
            let data = package(&[
                ("word/document.xml", doc.as_bytes()),
                ("word/_rels/document.xml.rels", RELS.as_bytes()),
                ("word/media/image1.png", PNG),
            ]);

            let mut rels = Relationships::new();
            let err = render(EmbeddedDocument::from_bytes("other.docx", data), &mut rels).unwrap_err();
            assert!(matches!(
                err,
                OoxmlError::UnresolvableRelationshipReference { ref r_id, .. } if r_id == "rId4"
            ));
            // Nothing from the package was minted
            assert_eq!(rels.len(), 1);
        }

        #[test]
        fn test_unknown_reference_is_unresolvable() {
            let doc = document(r#"<w:altChunk r:id="rId7"/>"#);
            let data = package(&[("word/document.xml", doc.as_bytes())]);

            let mut rels = Relationships::new();
            let err = render(EmbeddedDocument::from_bytes("other.docx", data), &mut rels).unwrap_err();
            assert!(matches!(
                err,
                OoxmlError::UnresolvableRelationshipReference { ref r_id, .. } if r_id == "rId7"
            ));
        }

        #[test]
        fn test_used_prefixes_count_requires_tokens() {
            let doc = document(concat!(
                r#"<mc:AlternateContent xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006">"#,
                r#"<mc:Choice Requires="wps"/></mc:AlternateContent>"#
            ));
            let body = Body::parse(&doc, "mem").unwrap();
            let prefixes = body.used_prefixes().unwrap();
            assert!(prefixes.contains("mc"));
            assert!(prefixes.contains("wps"));
            assert!(!prefixes.contains("xmlns"));
        }
    }
}
