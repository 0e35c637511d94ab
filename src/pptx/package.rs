/// Package implementation for PowerPoint presentations.
use crate::opc::OpcPackage;
use crate::opc::constants::content_type as ct;
use crate::opc::packuri::PackURI;
use crate::opc::part::{BlobPart, Part};
use crate::opc::pkgwriter::PackageWriter;
use crate::pptx::error::{PptxError, Result};
use crate::pptx::format::ImageFormat;
use crate::pptx::presentation::Presentation;
use std::io::{Read, Seek};
use std::path::Path;

/// A PowerPoint (.pptx) package.
///
/// This is the main entry point for working with PowerPoint presentations.
/// It wraps an OPC package and provides PowerPoint-specific functionality.
///
/// # Examples
///
/// ```rust,no_run
/// use laurea::pptx::Package;
///
/// // Open an existing presentation
/// let pkg = Package::open("presentation.pptx")?;
///
/// // Access slides
/// let pres = pkg.presentation()?;
/// println!("Presentation has {} slides", pres.slide_count()?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Package {
    /// The underlying OPC package
    opc: OpcPackage,
}

impl Package {
    /// Open a .pptx package from a file path.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the .pptx file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let opc = OpcPackage::open(path)?;
        Self::from_opc(opc)
    }

    /// Create a .pptx package from a reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - A reader containing the .pptx file data (must implement Read + Seek)
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use laurea::pptx::Package;
    /// use std::io::Cursor;
    ///
    /// let data = std::fs::read("presentation.pptx")?;
    /// let pkg = Package::from_reader(Cursor::new(data))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let opc = OpcPackage::from_reader(reader)?;
        Self::from_opc(opc)
    }

    /// Wrap an OPC package, verifying it holds a PowerPoint presentation.
    fn from_opc(opc: OpcPackage) -> Result<Self> {
        let main_part = opc
            .main_document_part()
            .map_err(|e| PptxError::PartNotFound(format!("main presentation part: {}", e)))?;

        let content_type = main_part.content_type();
        // Support both regular and macro-enabled presentations
        if content_type != ct::PML_PRESENTATION_MAIN && content_type != ct::PML_PRES_MACRO_MAIN {
            return Err(PptxError::InvalidContentType {
                expected: format!("{} or {}", ct::PML_PRESENTATION_MAIN, ct::PML_PRES_MACRO_MAIN),
                got: content_type.to_string(),
            });
        }

        Ok(Self { opc })
    }

    /// Get the main presentation.
    ///
    /// Returns the `Presentation` object which provides access to the slide
    /// list and presentation-level properties.
    pub fn presentation(&self) -> Result<Presentation<'_>> {
        let main_part = self
            .opc
            .main_document_part()
            .map_err(|e| PptxError::PartNotFound(format!("main presentation part: {}", e)))?;

        Ok(Presentation::from_part(main_part))
    }

    /// Add an image to the package's media directory.
    ///
    /// The image format is detected from the data's magic number and the part
    /// is registered under the next free `/ppt/media/image%d.<ext>` name.
    ///
    /// # Returns
    /// The partname of the new media part.
    pub fn add_media_part(&mut self, data: &[u8]) -> Result<PackURI> {
        let format = ImageFormat::detect_from_bytes(data)
            .ok_or_else(|| PptxError::InvalidFormat("Unknown image format".to_string()))?;

        let template = format!("/ppt/media/image%d.{}", format.extension());
        let partname = self.opc.next_partname(&template)?;

        let part = BlobPart::new(
            partname.clone(),
            format.mime_type().to_string(),
            data.to_vec(),
        );
        self.opc.add_part(Box::new(part));

        Ok(partname)
    }

    /// Serialize the package to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(PackageWriter::to_bytes(&self.opc)?)
    }

    /// Get the underlying OPC package.
    ///
    /// This provides access to lower-level package operations.
    #[inline]
    pub fn opc_package(&self) -> &OpcPackage {
        &self.opc
    }

    /// Get mutable access to the underlying OPC package.
    #[inline]
    pub fn opc_package_mut(&mut self) -> &mut OpcPackage {
        &mut self.opc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn minimal_pptx() -> Vec<u8> {
        let mut zip_data = Vec::new();
        {
            let cursor = Cursor::new(&mut zip_data);
            let mut writer = ZipWriter::new(cursor);
            let options = SimpleFileOptions::default();

            writer.start_file("[Content_Types].xml", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
</Types>"#).unwrap();

            writer.start_file("_rels/.rels", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#).unwrap();

            writer.start_file("ppt/presentation.xml", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldIdLst/></p:presentation>"#).unwrap();

            writer.finish().unwrap();
        }
        zip_data
    }

    #[test]
    fn test_from_reader_validates_content_type() {
        let pkg = Package::from_reader(Cursor::new(minimal_pptx())).unwrap();
        assert!(pkg.presentation().is_ok());
    }

    #[test]
    fn test_rejects_non_presentation() {
        let mut zip_data = Vec::new();
        {
            let cursor = Cursor::new(&mut zip_data);
            let mut writer = ZipWriter::new(cursor);
            let options = SimpleFileOptions::default();

            writer.start_file("[Content_Types].xml", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#).unwrap();

            writer.start_file("_rels/.rels", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#).unwrap();

            writer.start_file("word/document.xml", options).unwrap();
            writer.write_all(b"<document/>").unwrap();

            writer.finish().unwrap();
        }

        let result = Package::from_reader(Cursor::new(zip_data));
        assert!(matches!(result, Err(PptxError::InvalidContentType { .. })));
    }

    #[test]
    fn test_add_media_part() {
        let mut pkg = Package::from_reader(Cursor::new(minimal_pptx())).unwrap();

        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let partname = pkg.add_media_part(&png).unwrap();
        assert_eq!(partname.as_str(), "/ppt/media/image1.png");

        let second = pkg.add_media_part(&png).unwrap();
        assert_eq!(second.as_str(), "/ppt/media/image2.png");

        let part = pkg.opc_package().get_part(&partname).unwrap();
        assert_eq!(part.content_type(), "image/png");
    }

    #[test]
    fn test_add_media_part_rejects_unknown_format() {
        let mut pkg = Package::from_reader(Cursor::new(minimal_pptx())).unwrap();
        assert!(matches!(
            pkg.add_media_part(b"not an image"),
            Err(PptxError::InvalidFormat(_))
        ));
    }
}
