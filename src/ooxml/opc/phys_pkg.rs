//! Read access to a physical OPC package (ZIP file).
//!
//! Used to open foreign WordprocessingML packages whose body is spliced into
//! the part being rendered. Only the handful of operations the embedder needs
//! are provided: fetch a member, and parse the relationships of a part.

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::target_mode;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

/// A relationship as serialized in a foreign package's `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedRelationship {
    /// Relationship ID (e.g., "rId4")
    pub r_id: String,
    /// Relationship type URI
    pub reltype: String,
    /// Target reference, relative to the source part's directory unless external
    pub target_ref: String,
    /// Whether TargetMode="External"
    pub is_external: bool,
}

/// Owned reader over an in-memory ZIP package.
pub struct PhysPkgReader {
    /// Human-readable name used in error messages (path or caller-supplied label)
    source_name: String,
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl PhysPkgReader {
    /// Open a package from a file path.
    ///
    /// # Errors
    /// `MalformedEmbeddedPackage` if the file cannot be read or is not a ZIP archive.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let data = std::fs::read(path).map_err(|e| OoxmlError::MalformedEmbeddedPackage {
            source_name: source_name.clone(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(source_name, data)
    }

    /// Create a reader from owned bytes.
    pub fn from_bytes(source_name: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let source_name = source_name.into();
        let archive = ZipArchive::new(Cursor::new(data)).map_err(|e| {
            OoxmlError::MalformedEmbeddedPackage {
                source_name: source_name.clone(),
                reason: format!("not a ZIP archive: {}", e),
            }
        })?;
        Ok(Self {
            source_name,
            archive,
        })
    }

    #[inline]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Read a member by name. Returns `Ok(None)` when the member does not exist.
    pub fn blob_for(&mut self, member_name: &str) -> Result<Option<Vec<u8>>> {
        let member_name = member_name.trim_start_matches('/');
        let mut file = match self.archive.by_name(member_name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(OoxmlError::MalformedEmbeddedPackage {
                    source_name: self.source_name.clone(),
                    reason: format!("cannot read {}: {}", member_name, e),
                });
            },
        };
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(Some(data))
    }

    /// Read a member as UTF-8 text.
    pub fn text_for(&mut self, member_name: &str) -> Result<Option<String>> {
        match self.blob_for(member_name)? {
            Some(data) => String::from_utf8(data).map(Some).map_err(|e| {
                OoxmlError::MalformedEmbeddedPackage {
                    source_name: self.source_name.clone(),
                    reason: format!("{} is not UTF-8: {}", member_name, e),
                }
            }),
            None => Ok(None),
        }
    }

    /// Read and parse a `.rels` member. A missing member yields no relationships.
    pub fn relationships_for(&mut self, rels_name: &str) -> Result<Vec<SerializedRelationship>> {
        match self.blob_for(rels_name)? {
            Some(xml) => parse_rels_xml(&xml),
            None => Ok(Vec::new()),
        }
    }
}

/// Parse relationships XML into SerializedRelationship structs.
pub fn parse_rels_xml(rels_xml: &[u8]) -> Result<Vec<SerializedRelationship>> {
    let mut srels = Vec::new();
    let mut reader = Reader::from_reader(rels_xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut r_id = None;
                    let mut reltype = None;
                    let mut target_ref = None;
                    let mut mode = target_mode::INTERNAL.to_string();

                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"Id" => r_id = Some(attr.unescape_value()?.to_string()),
                            b"Type" => reltype = Some(attr.unescape_value()?.to_string()),
                            b"Target" => target_ref = Some(attr.unescape_value()?.to_string()),
                            b"TargetMode" => mode = attr.unescape_value()?.to_string(),
                            _ => {},
                        }
                    }

                    if let (Some(r_id), Some(reltype), Some(target_ref)) = (r_id, reltype, target_ref)
                    {
                        srels.push(SerializedRelationship {
                            r_id,
                            reltype,
                            target_ref,
                            is_external: mode == target_mode::EXTERNAL,
                        });
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("Rels parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }

    Ok(srels)
}

/// Resolve a relative relationship target against the source part's directory.
///
/// `("word", "media/image1.png")` → `word/media/image1.png`,
/// `("word", "../customXml/item1.xml")` → `customXml/item1.xml`,
/// absolute targets (`/word/media/a.png`) are taken from the package root.
pub fn resolve_part_name(base_dir: &str, target_ref: &str) -> String {
    let mut segments: Vec<&str> = if target_ref.starts_with('/') {
        Vec::new()
    } else {
        base_dir.split('/').filter(|s| !s.is_empty()).collect()
    };

    for segment in target_ref.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other),
        }
    }

    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::{SimpleFileOptions, ZipWriter};

    fn package(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in members {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_resolve_part_name() {
        assert_eq!(resolve_part_name("word", "media/image1.png"), "word/media/image1.png");
        assert_eq!(resolve_part_name("word", "../customXml/item1.xml"), "customXml/item1.xml");
        assert_eq!(resolve_part_name("word", "/word/media/a.png"), "word/media/a.png");
        assert_eq!(resolve_part_name("word", "./styles.xml"), "word/styles.xml");
    }

    #[test]
    fn test_parse_rels_xml() {
        let xml = br#"<?xml version="1.0"?>
            <Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
              <Relationship Id="rId1" Type="http://x/image" Target="media/image1.png"/>
              <Relationship Id="rId2" Type="http://x/hyperlink" Target="https://a.b/?q=1&amp;r=2" TargetMode="External"/>
            </Relationships>"#;
        let rels = parse_rels_xml(xml).unwrap();
        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].r_id, "rId1");
        assert!(!rels[0].is_external);
        assert_eq!(rels[1].target_ref, "https://a.b/?q=1&r=2");
        assert!(rels[1].is_external);
    }

    #[test]
    fn test_blob_for_missing_member() {
        let data = package(&[("word/document.xml", b"<w:document/>")]);
        let mut pkg = PhysPkgReader::from_bytes("mem", data).unwrap();
        assert!(pkg.blob_for("word/styles.xml").unwrap().is_none());
        assert_eq!(
            pkg.text_for("/word/document.xml").unwrap().as_deref(),
            Some("<w:document/>")
        );
        assert!(pkg.relationships_for("word/_rels/document.xml.rels").unwrap().is_empty());
    }

    #[test]
    fn test_not_a_zip() {
        let err = PhysPkgReader::from_bytes("junk", b"definitely not a zip".to_vec())
            .err()
            .unwrap();
        assert!(matches!(err, OoxmlError::MalformedEmbeddedPackage { .. }));
    }
}
