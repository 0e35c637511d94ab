/// Error types for the composition layer.
use std::path::PathBuf;
use thiserror::Error;

/// Result type for composition operations.
pub type Result<T> = std::result::Result<T, ComposeError>;

/// Which deployment asset could not be located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// The presentation template
    Template,
    /// The rating icon image
    Icon,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template => write!(f, "template"),
            Self::Icon => write!(f, "icon"),
        }
    }
}

/// Error types for composition.
///
/// A generation either completes and produces a serialized document, or fails
/// with one of these; no partial output is ever produced because
/// serialization happens after every mutation has succeeded.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// A deployment asset (template or icon) cannot be located.
    #[error("{kind} asset not found: {path}")]
    AssetMissing { kind: AssetKind, path: PathBuf },

    /// A document-library failure while parsing, mutating, or serializing.
    #[error("document error: {0}")]
    Document(#[from] crate::pptx::error::PptxError),

    /// IO failure reading an asset.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<crate::opc::error::OpcError> for ComposeError {
    fn from(err: crate::opc::error::OpcError) -> Self {
        ComposeError::Document(crate::pptx::error::PptxError::Opc(err))
    }
}
