/// Editable slide XML.
///
/// A slide part is parsed into the exact byte spans of its top-level text
/// shapes (`p:sp` children of `p:spTree`). Edits replace individual shape
/// spans and append new shapes before the shape-tree close tag; everything
/// else (slide properties, group shapes, existing pictures, whitespace) is
/// re-emitted byte-identical from the original part.
use crate::pptx::error::{PptxError, Result};
use crate::pptx::shape::Shape;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::ops::Range;

/// A shape together with its location in the slide XML.
#[derive(Debug)]
struct SlideShape {
    /// Byte range of the shape element in the original slide XML
    range: Range<usize>,
    /// The parsed shape (replaced on edit)
    shape: Shape,
    /// Whether the shape has been replaced
    modified: bool,
}

/// An editable slide document.
#[derive(Debug)]
pub struct SlideXml {
    /// Original slide part XML
    xml: Vec<u8>,
    /// Top-level text shapes, in document order
    shapes: Vec<SlideShape>,
    /// Offset of the `</p:spTree>` close tag, where new shapes are inserted
    sptree_end: usize,
    /// Serialized shapes appended to the shape tree
    appended: Vec<String>,
    /// Next unused shape ID (one past the highest `cNvPr` id seen)
    next_id: u32,
}

impl SlideXml {
    /// Parse a slide part.
    ///
    /// # Arguments
    /// * `xml` - The raw bytes of the slide part
    pub fn parse(xml: Vec<u8>) -> Result<Self> {
        let mut reader = Reader::from_reader(xml.as_slice());

        let mut depth = 0usize;
        let mut sptree_depth: Option<usize> = None;
        let mut sptree_end: Option<usize> = None;
        let mut pending_sp: Option<(usize, usize)> = None; // (start offset, depth)
        let mut shapes: Vec<(Range<usize>, Shape)> = Vec::new();
        let mut max_id = 0u32;

        loop {
            let start = reader.buffer_position() as usize;
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    let local = e.local_name();
                    if local.as_ref() == b"spTree" && sptree_depth.is_none() {
                        sptree_depth = Some(depth);
                    } else if local.as_ref() == b"sp"
                        && sptree_depth.is_some_and(|d| depth == d + 1)
                    {
                        pending_sp = Some((start, depth));
                    } else if local.as_ref() == b"cNvPr" {
                        max_id = max_id.max(Self::id_attr(e));
                    }
                },
                Ok(Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == b"cNvPr" {
                        max_id = max_id.max(Self::id_attr(e));
                    }
                },
                Ok(Event::End(ref e)) => {
                    if let Some((sp_start, sp_depth)) = pending_sp
                        && depth == sp_depth
                        && e.local_name().as_ref() == b"sp"
                    {
                        let range = sp_start..reader.buffer_position() as usize;
                        let shape = Shape::parse(xml[range.clone()].to_vec())?;
                        shapes.push((range, shape));
                        pending_sp = None;
                    } else if sptree_depth.is_some_and(|d| depth == d)
                        && e.local_name().as_ref() == b"spTree"
                        && sptree_end.is_none()
                    {
                        sptree_end = Some(start);
                    }
                    depth = depth.saturating_sub(1);
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(PptxError::Xml(e.to_string())),
                _ => {},
            }
        }

        let sptree_end = sptree_end
            .ok_or_else(|| PptxError::InvalidFormat("Slide has no shape tree".to_string()))?;

        Ok(Self {
            xml,
            shapes: shapes
                .into_iter()
                .map(|(range, shape)| SlideShape {
                    range,
                    shape,
                    modified: false,
                })
                .collect(),
            sptree_end,
            appended: Vec::new(),
            next_id: max_id + 1,
        })
    }

    /// Parse the `id` attribute of a `cNvPr` element, 0 if absent or invalid.
    fn id_attr(e: &quick_xml::events::BytesStart<'_>) -> u32 {
        for attr in e.attributes().flatten() {
            if attr.key.as_ref() == b"id" {
                return std::str::from_utf8(&attr.value)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0);
            }
        }
        0
    }

    /// Get the number of top-level text shapes on this slide.
    #[inline]
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Get a shape by index.
    #[inline]
    pub fn shape(&self, index: usize) -> &Shape {
        &self.shapes[index].shape
    }

    /// Replace a shape's XML.
    ///
    /// The replacement is reparsed so later passes observe the edited state.
    pub fn set_shape_xml(&mut self, index: usize, xml: String) -> Result<()> {
        let shape = Shape::parse(xml.into_bytes())?;
        self.shapes[index].shape = shape;
        self.shapes[index].modified = true;
        Ok(())
    }

    /// Append a serialized shape to the end of the shape tree.
    pub fn append_shape_xml(&mut self, xml: String) {
        self.appended.push(xml);
    }

    /// Allocate the next unused shape ID.
    pub fn next_shape_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Check whether any shape was replaced or appended.
    pub fn is_modified(&self) -> bool {
        !self.appended.is_empty() || self.shapes.iter().any(|s| s.modified)
    }

    /// Serialize the slide.
    ///
    /// Unmodified content is spliced byte-identical from the original part;
    /// replaced shapes and appended shapes are emitted in their place.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.xml.len() + 512 * self.appended.len());
        let mut cursor = 0usize;

        for slide_shape in &self.shapes {
            out.extend_from_slice(&self.xml[cursor..slide_shape.range.start]);
            out.extend_from_slice(slide_shape.shape.xml());
            cursor = slide_shape.range.end;
        }

        out.extend_from_slice(&self.xml[cursor..self.sptree_end]);
        for appended in &self.appended {
            out.extend_from_slice(appended.as_bytes());
        }
        out.extend_from_slice(&self.xml[self.sptree_end..]);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide_xml() -> Vec<u8> {
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="A"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="10" y="20"/><a:ext cx="30" cy="40"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:t>[X]</a:t></a:r></a:p></p:txBody></p:sp><p:sp><p:nvSpPr><p:cNvPr id="5" name="B"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>static</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#
            .to_vec()
    }

    #[test]
    fn test_parse_shapes() {
        let slide = SlideXml::parse(slide_xml()).unwrap();
        assert_eq!(slide.shape_count(), 2);
        assert_eq!(slide.shape(0).text().unwrap(), "[X]");
        assert_eq!(slide.shape(1).text().unwrap(), "static");
    }

    #[test]
    fn test_unmodified_roundtrip_is_identical() {
        let xml = slide_xml();
        let slide = SlideXml::parse(xml.clone()).unwrap();
        assert!(!slide.is_modified());
        assert_eq!(slide.to_bytes(), xml);
    }

    #[test]
    fn test_replace_shape_leaves_others_identical() {
        let xml = slide_xml();
        let mut slide = SlideXml::parse(xml).unwrap();

        let new_xml = {
            let shape = slide.shape(0);
            let mut body = shape.text_body().unwrap().unwrap();
            body.substitute("[X]", "done");
            shape.with_text_body(&body)
        };
        slide.set_shape_xml(0, new_xml).unwrap();
        assert!(slide.is_modified());

        let out = slide.to_bytes();
        let out_str = String::from_utf8(out.clone()).unwrap();
        assert!(out_str.contains("<a:t>done</a:t>"));
        // The untouched shape keeps its original serialization
        assert!(out_str.contains(r#"<p:cNvPr id="5" name="B"/>"#));
        assert!(out_str.contains("<a:t>static</a:t>"));

        // The edit is observable on the parsed state too
        let reparsed = SlideXml::parse(out).unwrap();
        assert_eq!(reparsed.shape(0).text().unwrap(), "done");
    }

    #[test]
    fn test_append_shape_before_sptree_close() {
        let mut slide = SlideXml::parse(slide_xml()).unwrap();
        slide.append_shape_xml("<p:pic>fake</p:pic>".to_string());

        let out = String::from_utf8(slide.to_bytes()).unwrap();
        let pic_at = out.find("<p:pic>").unwrap();
        let close_at = out.find("</p:spTree>").unwrap();
        assert!(pic_at < close_at);
    }

    #[test]
    fn test_next_shape_id_after_max() {
        let mut slide = SlideXml::parse(slide_xml()).unwrap();
        assert_eq!(slide.next_shape_id(), 6);
        assert_eq!(slide.next_shape_id(), 7);
    }

    #[test]
    fn test_slide_without_sptree_is_rejected() {
        let result = SlideXml::parse(b"<p:sld><p:cSld/></p:sld>".to_vec());
        assert!(matches!(result, Err(PptxError::InvalidFormat(_))));
    }
}
