//! Utilities shared across the OPC, PresentationML, and composition layers.

pub mod unit;
pub mod xml;

pub use unit::{EMUS_PER_INCH, EMUS_PER_PT, inches_to_emu, pt_to_emu};
pub use xml::escape_xml;
