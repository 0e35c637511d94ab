/// Field specifications and caller-supplied field values.
use crate::pptx::format::TextAlign;
use std::collections::HashMap;

/// Static binding of a placeholder token to a default value and a text style.
///
/// Field specs are process-wide, read-only configuration constructed once at
/// startup; caller state never mutates them.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field name as supplied by callers (e.g. "name")
    pub name: String,
    /// Placeholder token embedded in the template text (e.g. "[Nombre]")
    pub token: String,
    /// Value substituted when the caller omits the field
    pub default: String,
    /// Style applied to the substituted run(s)
    pub style: FieldStyle,
}

impl FieldSpec {
    /// Create a field spec with the given token and default, unstyled.
    pub fn new(name: &str, token: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            token: token.to_string(),
            default: default.to_string(),
            style: FieldStyle::default(),
        }
    }

    /// Builder method: set the font family.
    pub fn font(mut self, font: &str) -> Self {
        self.style.font = Some(font.to_string());
        self
    }

    /// Builder method: set the font size in points.
    pub fn size(mut self, size: f64) -> Self {
        self.style.size = Some(size);
        self
    }

    /// Builder method: set bold.
    pub fn bold(mut self, bold: bool) -> Self {
        self.style.bold = Some(bold);
        self
    }

    /// Builder method: set paragraph alignment.
    pub fn align(mut self, align: TextAlign) -> Self {
        self.style.align = Some(align);
        self
    }
}

/// Text style applied to substituted runs.
///
/// `None` leaves the corresponding property as the template defines it.
#[derive(Debug, Clone, Default)]
pub struct FieldStyle {
    /// Font family
    pub font: Option<String>,
    /// Font size in points
    pub size: Option<f64>,
    /// Bold text
    pub bold: Option<bool>,
    /// Paragraph alignment
    pub align: Option<TextAlign>,
}

/// Caller-supplied field values for one generation.
#[derive(Debug, Clone, Default)]
pub struct FieldValues {
    values: HashMap<String, String>,
}

impl FieldValues {
    /// Create an empty value set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|s| s.as_str())
    }

    /// Get the value for a field spec, falling back to the spec's default
    /// when the caller omitted the field.
    pub fn get_or_default<'a>(&'a self, spec: &'a FieldSpec) -> &'a str {
        self.get(&spec.name).unwrap_or(&spec.default)
    }

    /// Coerce the named field to a non-negative icon count.
    ///
    /// Missing, empty, negative, or unparsable input yields 0. This leniency
    /// is deliberate: a bad count degrades to "no icons" instead of failing
    /// the whole generation.
    pub fn rating_count(&self, name: &str) -> u32 {
        let raw = self.get(name).map(str::trim).unwrap_or("");
        if raw.is_empty() {
            return 0;
        }

        match raw.parse::<i64>() {
            Ok(n) if n >= 0 => n.min(u32::MAX as i64) as u32,
            Ok(n) => {
                tracing::warn!(value = n, field = name, "negative rating count, using 0");
                0
            },
            Err(_) => {
                tracing::warn!(value = raw, field = name, "unparsable rating count, using 0");
                0
            },
        }
    }
}

impl<S: Into<String>> FromIterator<(S, S)> for FieldValues {
    fn from_iter<T: IntoIterator<Item = (S, S)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
