//! Constant values related to the Open Packaging Convention.
//!
//! Only the subset needed to render a WordprocessingML main document part and
//! its relationships is kept here.

/// XML namespace URIs
pub mod namespace {
    /// Markup compatibility namespace (carries `mc:Ignorable`)
    pub const MC: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";

    /// DrawingML main namespace
    pub const DML_MAIN: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    /// DrawingML picture namespace
    pub const DML_PICTURE: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

    /// DrawingML chart, locked canvas and diagram namespaces
    pub const DML_CHART: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
    pub const DML_LOCKED_CANVAS: &str =
        "http://schemas.openxmlformats.org/drawingml/2006/lockedCanvas";
    pub const DML_DIAGRAM: &str = "http://schemas.openxmlformats.org/drawingml/2006/diagram";

    /// DrawingML wordprocessing drawing namespace
    pub const DML_WORDPROCESSING_DRAWING: &str =
        "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";

    /// Office relationships namespace
    pub const OFC_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// Office math namespace
    pub const OFC_MATH: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";

    /// OPC relationships namespace
    pub const OPC_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";

    /// WordprocessingML main namespace
    pub const WML_MAIN: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    /// Schema library namespace
    pub const SCHEMA_LIBRARY: &str = "http://schemas.openxmlformats.org/schemaLibrary/2006/main";

    /// Word 2006 extensions namespace
    pub const WML_WNE: &str = "http://schemas.microsoft.com/office/word/2006/wordml";

    /// Legacy VML namespaces
    pub const VML: &str = "urn:schemas-microsoft-com:vml";
    pub const VML_OFFICE: &str = "urn:schemas-microsoft-com:office:office";
    pub const VML_WORD: &str = "urn:schemas-microsoft-com:office:word";
}

/// Open XML relationship target modes
pub mod target_mode {
    /// Internal relationship target mode (default)
    pub const INTERNAL: &str = "Internal";

    /// External relationship target mode (e.g., hyperlinks to external URLs)
    pub const EXTERNAL: &str = "External";
}

/// Relationship type URIs
pub mod relationship_type {
    pub const FONT_TABLE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/fontTable";
    pub const FOOTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
    pub const HEADER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
    pub const NUMBERING: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
    pub const SETTINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
}

/// Well-known part names inside a WordprocessingML package
pub mod part_name {
    pub const MAIN_DOCUMENT: &str = "word/document.xml";
    pub const MAIN_DOCUMENT_RELS: &str = "word/_rels/document.xml.rels";
    /// Directory that relative targets of the main document resolve against
    pub const MAIN_DOCUMENT_BASE: &str = "word";
}
