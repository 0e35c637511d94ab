/// The generation pipeline.
///
/// Composes one document per call: load the template, resolve placeholders
/// on every slide, lay out the rating icons, serialize. Each generation owns
/// its document; the template and icon assets are only ever read.
use crate::compose::config::ComposeConfig;
use crate::compose::error::{AssetKind, ComposeError, Result};
use crate::compose::fields::FieldValues;
use crate::compose::rating::RatingComposer;
use crate::compose::resolver::PlaceholderResolver;
use crate::opc::constants::relationship_type;
use crate::opc::part::Part;
use crate::pptx::package::Package;
use crate::pptx::slide::SlideXml;
use std::io::Cursor;
use std::path::Path;

/// A generated award document.
#[derive(Debug, Clone)]
pub struct Diploma {
    /// Download filename, derived from the substituted name field
    pub filename: String,
    /// Serialized .pptx bytes
    pub bytes: Vec<u8>,
}

/// Generates award documents from the configured template.
pub struct DiplomaGenerator {
    config: ComposeConfig,
}

impl DiplomaGenerator {
    /// Create a generator over an immutable configuration.
    pub fn new(config: ComposeConfig) -> Self {
        Self { config }
    }

    /// Get the generator's configuration.
    #[inline]
    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Generate a document from the configured template and icon assets.
    ///
    /// Fails with [`ComposeError::AssetMissing`] when either asset cannot be
    /// located; no partial output is produced on any failure.
    pub fn generate(&self, values: &FieldValues) -> Result<Diploma> {
        let template = Self::read_asset(&self.config.template_path, AssetKind::Template)?;
        let icon = Self::read_asset(&self.config.icon_path, AssetKind::Icon)?;
        self.compose(&template, &icon, values)
    }

    /// Generate a document from in-memory template and icon bytes.
    pub fn compose(&self, template: &[u8], icon: &[u8], values: &FieldValues) -> Result<Diploma> {
        let mut package = Package::from_reader(Cursor::new(template))?;

        let slide_partnames = package.presentation()?.slide_partnames()?;
        let resolver = PlaceholderResolver::new(&self.config);
        let rating = RatingComposer::new(&self.config.rating);
        let count = values.rating_count(&self.config.rating.field);

        // The icon media part is added once, on the first slide that needs it
        let mut media_partname = None;
        let mut replaced = 0;
        let mut inserted = 0;

        for partname in &slide_partnames {
            let blob = package.opc_package().get_part(partname)?.blob().to_vec();
            let mut slide = SlideXml::parse(blob)?;

            replaced += resolver.resolve_slide(&mut slide, values)?;

            let targets = rating.find_targets(&slide)?;
            let rel_id = if !targets.is_empty() && count > 0 {
                if media_partname.is_none() {
                    media_partname = Some(package.add_media_part(icon)?);
                }
                // media_partname was just filled in
                let media = media_partname.as_ref().unwrap();
                let target_ref = media.relative_ref(partname.base_uri());
                let part = package.opc_package_mut().get_part_mut(partname)?;
                Some(part.relate_to(&target_ref, relationship_type::IMAGE))
            } else {
                None
            };
            inserted += rating.apply(&mut slide, &targets, count, rel_id.as_deref())?;

            if slide.is_modified() {
                let part = package.opc_package_mut().get_part_mut(partname)?;
                part.set_blob(slide.to_bytes());
            }
        }

        // Serialization is the last step: mutations either all succeeded or
        // the generation already failed without output
        let bytes = package.to_bytes()?;

        tracing::info!(
            slides = slide_partnames.len(),
            replaced,
            inserted,
            "composed document"
        );

        Ok(Diploma {
            filename: self.filename(values),
            bytes,
        })
    }

    /// Derive the deterministic download filename from the name field.
    fn filename(&self, values: &FieldValues) -> String {
        let name = self
            .config
            .fields
            .iter()
            .find(|spec| spec.name == "name")
            .map(|spec| values.get_or_default(spec))
            .unwrap_or("diploma");

        let safe: String = name
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
            .collect();

        format!("diploma_{}.pptx", safe)
    }

    fn read_asset(path: &Path, kind: AssetKind) -> Result<Vec<u8>> {
        if !path.exists() {
            return Err(ComposeError::AssetMissing {
                kind,
                path: path.to_path_buf(),
            });
        }
        Ok(std::fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::config::ComposeConfig;

    #[test]
    fn test_missing_template_asset() {
        let config = ComposeConfig::diploma("/no/such/template.pptx".into(), "/no/icon.png".into());
        let generator = DiplomaGenerator::new(config);

        let err = generator.generate(&FieldValues::new()).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::AssetMissing {
                kind: AssetKind::Template,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_icon_asset() {
        let template = tempfile::NamedTempFile::new().unwrap();
        let config = ComposeConfig::diploma(
            template.path().to_path_buf(),
            "/no/such/icon.png".into(),
        );
        let generator = DiplomaGenerator::new(config);

        let err = generator.generate(&FieldValues::new()).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::AssetMissing {
                kind: AssetKind::Icon,
                ..
            }
        ));
    }

    #[test]
    fn test_filename_from_name_field() {
        let config = ComposeConfig::diploma("t.pptx".into(), "i.png".into());
        let generator = DiplomaGenerator::new(config);

        let mut values = FieldValues::new();
        values.insert("name", "Ana Pérez");
        assert_eq!(generator.filename(&values), "diploma_Ana Pérez.pptx");

        // Default when the caller omits the field
        assert_eq!(generator.filename(&FieldValues::new()), "diploma_Nombre.pptx");

        // Path separators are neutralized
        values.insert("name", "a/b\\c");
        assert_eq!(generator.filename(&values), "diploma_a_b_c.pptx");
    }
}
