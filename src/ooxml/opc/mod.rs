//! Open Packaging Conventions (OPC) support.
//!
//! - `rel`: the relationship registry the renderer draws ids from, and the
//!   `.rels` XML written from it
//! - `phys_pkg`: read access to foreign ZIP packages (embedding only)
//! - `constants`: namespace and relationship type URIs

pub mod constants;
#[cfg(feature = "embed")]
pub mod phys_pkg;
pub mod rel;

// Re-export commonly used types
pub use rel::{Relationship, RelationshipKind, RelationshipRegistry, Relationships, SharedRelationships};
