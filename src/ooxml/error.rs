/// Error types for document-part rendering.
use thiserror::Error;

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, OoxmlError>;

/// Error types for rendering operations.
///
/// Every variant is fatal to the render call that produced it: the caller
/// never observes partially rendered XML.
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// A content node has no rendering rule in its current position
    #[error("Unsupported node type: {0}")]
    UnsupportedNodeType(String),

    /// An image was rendered without a default paragraph style
    #[error("Document must declare a default paragraph style")]
    MissingDefaultStyle,

    /// A list item references a list style that is not configured
    #[error("No list style for {list_type} list at level {level}")]
    MissingListStyle { list_type: String, level: u8 },

    /// An embedded package could not be opened or lacks a body
    #[error("Malformed embedded package {source_name}: {reason}")]
    MalformedEmbeddedPackage { source_name: String, reason: String },

    /// A relationship reference in an embedded fragment could not be renumbered
    #[error("Unresolvable relationship reference {r_id} in {source_name}")]
    UnresolvableRelationshipReference { source_name: String, r_id: String },

    /// XML parsing or serialization error
    #[error("XML error: {0}")]
    Xml(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Formatting into the output buffer failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

#[cfg(feature = "embed")]
impl From<quick_xml::Error> for OoxmlError {
    fn from(err: quick_xml::Error) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

#[cfg(feature = "embed")]
impl From<quick_xml::events::attributes::AttrError> for OoxmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}
