/// Shape access for PPTX slides.
use crate::common::xml::escape_xml;
use crate::pptx::error::{PptxError, Result};
use crate::pptx::textbody::{TextBody, scan_element};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt::Write as FmtWrite;
use std::ops::Range;

/// A shape's bounding rectangle, in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// X position of the left edge
    pub left: i64,
    /// Y position of the top edge
    pub top: i64,
    /// Width
    pub width: i64,
    /// Height
    pub height: i64,
}

/// A text shape (`p:sp`) parsed from slide XML.
///
/// The shape owns its raw XML. Geometry and the text-body span are located at
/// parse time; everything else is opaque and preserved verbatim when the
/// shape is re-serialized with a replacement text body.
#[derive(Debug, Clone)]
pub struct Shape {
    /// Raw XML bytes for this shape
    xml: Vec<u8>,
    /// Position and size from `<a:xfrm>`
    frame: Frame,
    /// Byte range of the `<p:txBody>` element, if the shape has one
    txbody_span: Option<Range<usize>>,
}

impl Shape {
    /// Parse a shape from its XML fragment.
    pub fn parse(xml: Vec<u8>) -> Result<Self> {
        let frame = Self::parse_frame(&xml)?;

        let scanned = scan_element(&xml)?;
        let txbody_span = scanned
            .children
            .iter()
            .find(|child| child.local.as_slice() == b"txBody")
            .map(|child| child.range.clone());

        Ok(Self {
            xml,
            frame,
            txbody_span,
        })
    }

    /// Get the shape's bounding rectangle.
    ///
    /// Offsets missing from the XML (shapes inheriting layout geometry)
    /// read as zero.
    #[inline]
    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Check if this shape has a text body.
    #[inline]
    pub fn has_text_body(&self) -> bool {
        self.txbody_span.is_some()
    }

    /// Parse the shape's text body, if it has one.
    pub fn text_body(&self) -> Result<Option<TextBody>> {
        match &self.txbody_span {
            Some(span) => Ok(Some(TextBody::parse(&self.xml[span.clone()])?)),
            None => Ok(None),
        }
    }

    /// The shape's displayed text: all run texts concatenated, paragraphs
    /// joined with newlines. Empty for shapes without a text body.
    pub fn text(&self) -> Result<String> {
        Ok(self.text_body()?.map(|body| body.text()).unwrap_or_default())
    }

    /// Serialize this shape with its text body replaced by `body`.
    ///
    /// Everything outside the text body is emitted from the original bytes.
    pub fn with_text_body(&self, body: &TextBody) -> String {
        match &self.txbody_span {
            Some(span) => {
                let mut out = String::with_capacity(self.xml.len() + 64);
                out.push_str(&String::from_utf8_lossy(&self.xml[..span.start]));
                out.push_str(&body.to_xml());
                out.push_str(&String::from_utf8_lossy(&self.xml[span.end..]));
                out
            },
            None => String::from_utf8_lossy(&self.xml).into_owned(),
        }
    }

    /// Get raw XML bytes.
    #[inline]
    pub fn xml(&self) -> &[u8] {
        &self.xml
    }

    /// Extract the first `<a:off>`/`<a:ext>` pair from the shape XML.
    fn parse_frame(xml: &[u8]) -> Result<Frame> {
        let mut reader = Reader::from_reader(xml);

        let mut left = 0;
        let mut top = 0;
        let mut width = 0;
        let mut height = 0;
        let mut seen_off = false;
        let mut seen_ext = false;

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let tag_name = e.local_name();

                    if tag_name.as_ref() == b"off" && !seen_off {
                        seen_off = true;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"x" => {
                                    left = std::str::from_utf8(&attr.value)
                                        .ok()
                                        .and_then(|s| s.parse().ok())
                                        .unwrap_or(0);
                                },
                                b"y" => {
                                    top = std::str::from_utf8(&attr.value)
                                        .ok()
                                        .and_then(|s| s.parse().ok())
                                        .unwrap_or(0);
                                },
                                _ => {},
                            }
                        }
                    } else if tag_name.as_ref() == b"ext" && !seen_ext {
                        seen_ext = true;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"cx" => {
                                    width = std::str::from_utf8(&attr.value)
                                        .ok()
                                        .and_then(|s| s.parse().ok())
                                        .unwrap_or(0);
                                },
                                b"cy" => {
                                    height = std::str::from_utf8(&attr.value)
                                        .ok()
                                        .and_then(|s| s.parse().ok())
                                        .unwrap_or(0);
                                },
                                _ => {},
                            }
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(PptxError::Xml(e.to_string())),
                _ => {},
            }
        }

        Ok(Frame {
            left,
            top,
            width,
            height,
        })
    }
}

/// Generate the XML for a picture shape (`p:pic`) referencing an image
/// relationship.
///
/// # Arguments
/// * `shape_id` - Unique shape ID within the slide
/// * `rel_id` - Relationship ID of the embedded image (e.g. "rId3")
/// * `frame` - Position and size of the picture, in EMUs
/// * `description` - Alt-text description
pub fn picture_xml(shape_id: u32, rel_id: &str, frame: &Frame, description: &str) -> String {
    let mut xml = String::with_capacity(512);

    xml.push_str("<p:pic>");
    xml.push_str("<p:nvPicPr>");
    let _ = write!(
        xml,
        r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
        shape_id,
        shape_id,
        escape_xml(description)
    );
    xml.push_str("<p:cNvPicPr/>");
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvPicPr>");

    xml.push_str("<p:blipFill>");
    let _ = write!(xml, r#"<a:blip r:embed="{}"/>"#, escape_xml(rel_id));
    xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
    xml.push_str("</p:blipFill>");

    xml.push_str("<p:spPr>");
    xml.push_str("<a:xfrm>");
    let _ = write!(xml, r#"<a:off x="{}" y="{}"/>"#, frame.left, frame.top);
    let _ = write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, frame.width, frame.height);
    xml.push_str("</a:xfrm>");
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("</p:spPr>");
    xml.push_str("</p:pic>");

    xml
}
