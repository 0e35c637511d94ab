/// Open Packaging Conventions (OPC) implementation.
///
/// This module provides the subset of the OPC specification a PresentationML
/// composer needs:
///
/// - Package structure (parts, relationships)
/// - Content type management
/// - ZIP-based physical packaging, read and write
///
/// # Performance Features
///
/// - Uses `atoi_simd` for fast integer parsing of relationship IDs
/// - Uses `quick-xml` for efficient streaming XML parsing
/// - Uses hash maps for O(1) part and relationship lookups

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

// Re-export commonly used types
pub use error::OpcError;
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::{BlobPart, Part, XmlPart};
pub use rel::{Relationship, Relationships};
