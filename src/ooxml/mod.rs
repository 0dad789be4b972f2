//! Office Open XML (OOXML) support.
//!
//! The crate renders WordprocessingML parts:
//!
//! 1. **OPC Layer** (`opc`): relationships and foreign package access
//! 2. **Errors** (`error`): the error type shared by every renderer
//! 3. **Word** (`docx`): formatting enumerations and the part writer
pub mod docx;
pub mod error;
pub mod opc;

// Re-export error types
pub use error::{OoxmlError, Result};
