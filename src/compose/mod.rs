//! Template composition: the placeholder resolver, the rating layout engine,
//! and the generation pipeline.
//!
//! Composition is synchronous and per-request: each generation loads its own
//! document from the template asset, mutates it in place, and serializes it
//! once. Nothing is shared or cached across generations except the read-only
//! template and icon assets.

pub mod config;
pub mod error;
pub mod fields;
pub mod generator;
pub mod rating;
pub mod resolver;

// Re-export the composition API surface
pub use config::{ComposeConfig, IconMetrics, RatingSpec};
pub use error::{AssetKind, ComposeError};
pub use fields::{FieldSpec, FieldStyle, FieldValues};
pub use generator::{Diploma, DiplomaGenerator};
pub use rating::{RatingComposer, icon_row};
pub use resolver::PlaceholderResolver;
