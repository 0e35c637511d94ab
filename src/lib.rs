//! Laurea - composition of personalized award decks from a fixed PPTX template.
//!
//! Laurea loads a PresentationML (.pptx) template, substitutes bracket-delimited
//! placeholder tokens (e.g. `[Nombre]`) with caller-supplied values, renders a
//! caller-sized row of rating icons centered inside the rating placeholder's
//! original bounds, and serializes the result back to a downloadable deck.
//!
//! # Architecture
//!
//! The crate is organized into three layers:
//!
//! 1. **OPC Layer** (`opc`): Open Packaging Convention plumbing (ZIP-backed
//!    packages, parts, relationships, and content types).
//! 2. **PresentationML Layer** (`pptx`): slide enumeration, shape geometry,
//!    and an editable paragraph/run text-body model with exact byte-span
//!    preservation of everything it does not touch.
//! 3. **Composition Layer** (`compose`): the placeholder resolver, the rating
//!    layout engine, and the generation pipeline that ties them together.
//!
//! # Example
//!
//! ```rust,no_run
//! use laurea::compose::{ComposeConfig, DiplomaGenerator, FieldValues};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ComposeConfig::diploma("template.pptx".into(), "star.png".into());
//! let generator = DiplomaGenerator::new(config);
//!
//! let mut values = FieldValues::new();
//! values.insert("name", "Ana Pérez");
//! values.insert("rating_count", "3");
//!
//! let diploma = generator.generate(&values)?;
//! std::fs::write(&diploma.filename, &diploma.bytes)?;
//! # Ok(())
//! # }
//! ```

/// Shared utilities: XML escaping and distance-unit conversions.
pub mod common;

/// Composition core: placeholder resolution, rating layout, generation pipeline.
pub mod compose;

/// Open Packaging Convention (OPC) package handling.
pub mod opc;

/// PresentationML (.pptx) document access and editing.
pub mod pptx;

// Re-export the high-level entry points for convenience
pub use compose::{ComposeConfig, ComposeError, Diploma, DiplomaGenerator, FieldValues};
