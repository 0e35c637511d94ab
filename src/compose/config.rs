/// Immutable composition configuration.
///
/// One `ComposeConfig` is constructed at process start and passed explicitly
/// into the components that need it. Nothing here is mutated after
/// construction, so a config can be shared freely across concurrent
/// generations, and tests can run several configurations side by side.
use crate::common::unit::{cm_to_emu, inches_to_emu, pt_to_emu};
use crate::compose::fields::FieldSpec;
use crate::pptx::format::TextAlign;
use std::path::PathBuf;

/// Fixed icon geometry for the rating row, in EMUs.
///
/// All three lengths live in the same unit as slide geometry; constructors
/// take the physical unit a deployment specifies sizes in and convert once,
/// so no computation ever mixes units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconMetrics {
    /// Icon width
    pub width: i64,
    /// Icon height
    pub height: i64,
    /// Horizontal gap between consecutive icons
    pub gap: i64,
}

impl IconMetrics {
    /// Icon metrics from lengths in inches.
    pub fn from_inches(width: f64, height: f64, gap: f64) -> Self {
        Self {
            width: inches_to_emu(width),
            height: inches_to_emu(height),
            gap: inches_to_emu(gap),
        }
    }

    /// Icon metrics from lengths in points (1/72 inch).
    pub fn from_points(width: f64, height: f64, gap: f64) -> Self {
        Self {
            width: pt_to_emu(width),
            height: pt_to_emu(height),
            gap: pt_to_emu(gap),
        }
    }

    /// Icon metrics from lengths in centimeters.
    pub fn from_centimeters(width: f64, height: f64, gap: f64) -> Self {
        Self {
            width: cm_to_emu(width),
            height: cm_to_emu(height),
            gap: cm_to_emu(gap),
        }
    }
}

/// Configuration of the rating placeholder.
#[derive(Debug, Clone)]
pub struct RatingSpec {
    /// Name of the caller field holding the icon count
    pub field: String,
    /// Token whose shape is replaced by the icon row (e.g. "[ESTRELLAS]")
    pub token: String,
    /// Icon geometry
    pub metrics: IconMetrics,
}

/// Process-wide composition configuration.
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    /// Path of the presentation template asset
    pub template_path: PathBuf,
    /// Path of the rating icon asset
    pub icon_path: PathBuf,
    /// Placeholder fields, matched in order
    pub fields: Vec<FieldSpec>,
    /// Rating placeholder configuration
    pub rating: RatingSpec,
}

impl ComposeConfig {
    /// The diploma field table.
    ///
    /// Tokens, defaults, and the name style mirror the deployed diploma
    /// template, whose icon sizes are specified in inches.
    pub fn diploma(template_path: PathBuf, icon_path: PathBuf) -> Self {
        Self {
            template_path,
            icon_path,
            fields: vec![
                FieldSpec::new("name", "[Nombre]", "Nombre")
                    .font("TeXGyreChorus")
                    .size(40.0)
                    .align(TextAlign::Center),
                FieldSpec::new("month", "[Mes]", "Mes")
                    .size(24.0)
                    .align(TextAlign::Center),
                FieldSpec::new("date", "[Fecha]", "Fecha")
                    .size(18.0)
                    .align(TextAlign::Center),
            ],
            rating: RatingSpec {
                field: "rating_count".to_string(),
                token: "[ESTRELLAS]".to_string(),
                metrics: IconMetrics::from_inches(0.3, 0.3, 0.2),
            },
        }
    }
}
