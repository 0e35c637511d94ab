/// Presentation part access.
///
/// The presentation part (`/ppt/presentation.xml`) lists slides in
/// presentation order through `<p:sldIdLst>`; each `<p:sldId>` references a
/// slide part via an `r:id` resolved against the part's relationships.
use crate::opc::constants::relationship_type;
use crate::opc::packuri::PackURI;
use crate::opc::part::Part;
use crate::pptx::error::{PptxError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// The main presentation part.
pub struct Presentation<'a> {
    /// The underlying OPC part
    part: &'a dyn Part,
}

impl<'a> Presentation<'a> {
    /// Create a Presentation from an OPC Part.
    #[inline]
    pub(crate) fn from_part(part: &'a dyn Part) -> Self {
        Self { part }
    }

    /// Get the partnames of all slides, in presentation order.
    ///
    /// Slide IDs whose relationship is missing or is not a slide
    /// relationship are skipped.
    pub fn slide_partnames(&self) -> Result<Vec<PackURI>> {
        let rel_ids = self.slide_rel_ids()?;

        let mut partnames = Vec::with_capacity(rel_ids.len());
        for rel_id in rel_ids {
            let Some(rel) = self.part.rels().get(&rel_id) else {
                continue;
            };
            if rel.reltype() != relationship_type::SLIDE {
                continue;
            }
            let partname = rel
                .target_partname()
                .map_err(|e| PptxError::Xml(e.to_string()))?;
            partnames.push(partname);
        }

        Ok(partnames)
    }

    /// Get the number of slides in the presentation.
    pub fn slide_count(&self) -> Result<usize> {
        Ok(self.slide_rel_ids()?.len())
    }

    /// Collect the `r:id` of every `<p:sldId>`, in document order.
    fn slide_rel_ids(&self) -> Result<Vec<String>> {
        let mut reader = Reader::from_reader(self.part.blob());
        reader.config_mut().trim_text(true);

        let mut rel_ids = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    if e.local_name().as_ref() == b"sldId" {
                        for attr in e.attributes().flatten() {
                            if attr.key.local_name().as_ref() == b"id"
                                && attr.key.as_ref() != b"id"
                            {
                                // r:id, as opposed to the numeric slide id
                                let rel_id = std::str::from_utf8(&attr.value)
                                    .map_err(|e| PptxError::Xml(e.to_string()))?;
                                rel_ids.push(rel_id.to_string());
                            }
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(PptxError::Xml(e.to_string())),
                _ => {},
            }
            buf.clear();
        }

        Ok(rel_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::part::XmlPart;

    fn presentation_part() -> XmlPart {
        let xml = br#"<?xml version="1.0"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
  <p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst>
  <p:sldSz cx="9144000" cy="6858000"/>
</p:presentation>"#;
        let partname = PackURI::new("/ppt/presentation.xml").unwrap();
        let mut part = XmlPart::new(partname, "application/xml".to_string(), xml.to_vec());
        part.rels_mut().add_relationship(
            relationship_type::SLIDE_MASTER.to_string(),
            "slideMasters/slideMaster1.xml".to_string(),
            "rId1".to_string(),
            false,
        );
        part.rels_mut().add_relationship(
            relationship_type::SLIDE.to_string(),
            "slides/slide1.xml".to_string(),
            "rId2".to_string(),
            false,
        );
        part.rels_mut().add_relationship(
            relationship_type::SLIDE.to_string(),
            "slides/slide2.xml".to_string(),
            "rId3".to_string(),
            false,
        );
        part
    }

    #[test]
    fn test_slide_partnames_in_order() {
        let part = presentation_part();
        let pres = Presentation::from_part(&part);

        let partnames = pres.slide_partnames().unwrap();
        assert_eq!(partnames.len(), 2);
        assert_eq!(partnames[0].as_str(), "/ppt/slides/slide1.xml");
        assert_eq!(partnames[1].as_str(), "/ppt/slides/slide2.xml");
    }

    #[test]
    fn test_slide_count() {
        let part = presentation_part();
        let pres = Presentation::from_part(&part);
        assert_eq!(pres.slide_count().unwrap(), 2);
    }
}
