/// Editable text-body model for DrawingML shapes.
///
/// A `<p:txBody>` is parsed into paragraphs and runs. Run text is unescaped
/// into plain strings; everything the composer does not understand (body
/// properties, list styles, line breaks, end-paragraph run properties, run
/// property children like fills) is captured as raw byte spans and re-emitted
/// verbatim on serialization.
use crate::common::xml::escape_xml;
use crate::pptx::error::{PptxError, Result};
use crate::pptx::format::TextAlign;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fmt::Write as FmtWrite;
use std::ops::Range;

/// A scanned element: its start tag and the byte spans of its direct children.
pub(crate) struct ScannedElement {
    /// Byte range of the root element's start tag
    pub open: Range<usize>,
    /// Qualified name of the root element (e.g. "p:txBody")
    pub name: Vec<u8>,
    /// Whether the root element is self-closing
    pub self_closing: bool,
    /// Direct children, in document order
    pub children: Vec<ChildSpan>,
}

/// A direct child of a scanned element.
pub(crate) struct ChildSpan {
    /// Local (unprefixed) element name
    pub local: Vec<u8>,
    /// Byte range of the whole child element within the parent's XML
    pub range: Range<usize>,
}

/// Scan an XML fragment whose first element is the root, returning the root's
/// start tag span and the spans of its direct children.
///
/// Positions are exact byte offsets into `xml`, which is what makes
/// splice-based rewriting possible.
pub(crate) fn scan_element(xml: &[u8]) -> Result<ScannedElement> {
    let mut reader = Reader::from_reader(xml);

    let mut depth = 0usize;
    let mut open = 0..0;
    let mut name = Vec::new();
    let mut self_closing = false;
    let mut children = Vec::new();
    let mut pending: Option<(Vec<u8>, usize)> = None;

    loop {
        let start = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                if depth == 1 {
                    open = start..reader.buffer_position() as usize;
                    name = e.name().as_ref().to_vec();
                } else if depth == 2 {
                    pending = Some((e.local_name().as_ref().to_vec(), start));
                }
            },
            Ok(Event::Empty(e)) => {
                if depth == 0 {
                    // The root element itself is empty (<p:txBody/>)
                    open = start..reader.buffer_position() as usize;
                    name = e.name().as_ref().to_vec();
                    self_closing = true;
                    break;
                } else if depth == 1 {
                    children.push(ChildSpan {
                        local: e.local_name().as_ref().to_vec(),
                        range: start..reader.buffer_position() as usize,
                    });
                }
            },
            Ok(Event::End(_)) => {
                if depth == 2
                    && let Some((local, child_start)) = pending.take()
                {
                    children.push(ChildSpan {
                        local,
                        range: child_start..reader.buffer_position() as usize,
                    });
                }
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            },
            Ok(Event::Eof) => break,
            Ok(_) => {},
            Err(e) => return Err(PptxError::Xml(e.to_string())),
        }
    }

    if name.is_empty() {
        return Err(PptxError::Xml("No root element in fragment".to_string()));
    }

    Ok(ScannedElement {
        open,
        name,
        self_closing,
        children,
    })
}

/// Extract the concatenated, unescaped text content of an element fragment.
pub(crate) fn element_text(xml: &[u8]) -> Result<String> {
    let mut reader = Reader::from_reader(xml);
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                let raw = std::str::from_utf8(e.as_ref())
                    .map_err(|e| PptxError::Xml(e.to_string()))?;
                let unescaped = quick_xml::escape::unescape(raw)
                    .map_err(|e| PptxError::Xml(e.to_string()))?;
                text.push_str(&unescaped);
            },
            Ok(Event::CData(e)) => {
                let raw = std::str::from_utf8(e.as_ref())
                    .map_err(|e| PptxError::Xml(e.to_string()))?;
                text.push_str(raw);
            },
            Ok(Event::GeneralRef(e)) => {
                // quick-xml emits entity references (`&amp;`, `&#38;`) as
                // standalone events; reconstruct and unescape them so the
                // decoded text matches the inline-entity behavior.
                let raw = std::str::from_utf8(e.as_ref())
                    .map_err(|e| PptxError::Xml(e.to_string()))?;
                let entity = format!("&{};", raw);
                let unescaped = quick_xml::escape::unescape(&entity)
                    .map_err(|e| PptxError::Xml(e.to_string()))?;
                text.push_str(&unescaped);
            },
            Ok(Event::Eof) => break,
            Ok(_) => {},
            Err(e) => return Err(PptxError::Xml(e.to_string())),
        }
    }

    Ok(text)
}

/// Properties element (`a:pPr` or `a:rPr`): parsed attributes plus raw inner XML.
///
/// Attributes can be set individually; the inner XML is preserved verbatim
/// except where a caller explicitly rewrites part of it.
#[derive(Debug, Clone)]
pub struct ElemProps {
    /// Qualified element name (e.g. "a:rPr")
    tag: String,
    /// Attributes in document order, values unescaped
    attrs: Vec<(String, String)>,
    /// Raw inner XML, emitted verbatim
    inner: Vec<u8>,
}

impl ElemProps {
    /// Create a new, empty properties element with the given tag.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            inner: Vec::new(),
        }
    }

    /// Parse a properties element from its XML fragment.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let attrs = Self::collect_attrs(&e)?;
                    let span = reader
                        .read_to_end(e.name())
                        .map_err(|e| PptxError::Xml(e.to_string()))?;
                    let inner = xml[span.start as usize..span.end as usize].to_vec();
                    return Ok(Self { tag, attrs, inner });
                },
                Ok(Event::Empty(e)) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let attrs = Self::collect_attrs(&e)?;
                    return Ok(Self {
                        tag,
                        attrs,
                        inner: Vec::new(),
                    });
                },
                Ok(Event::Eof) => {
                    return Err(PptxError::Xml("Empty properties fragment".to_string()));
                },
                Ok(_) => {},
                Err(e) => return Err(PptxError::Xml(e.to_string())),
            }
        }
    }

    fn collect_attrs(e: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
        let mut attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|e| PptxError::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| PptxError::Xml(e.to_string()))?
                .into_owned();
            attrs.push((key, value));
        }
        Ok(attrs)
    }

    /// Get an attribute value by name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, key: &str, value: &str) {
        if let Some(entry) = self.attrs.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value.to_string();
        } else {
            self.attrs.push((key.to_string(), value.to_string()));
        }
    }

    /// Replace any `<a:latin>` child with one naming the given typeface.
    ///
    /// Other children (fills, outlines) are preserved.
    pub fn set_latin_typeface(&mut self, typeface: &str) {
        let mut inner =
            strip_elements(&self.inner, b"latin").unwrap_or_else(|_| self.inner.clone());
        let mut latin = String::new();
        let _ = write!(latin, r#"<a:latin typeface="{}"/>"#, escape_xml(typeface));
        inner.extend_from_slice(latin.as_bytes());
        self.inner = inner;
    }

    /// Serialize this element into `out`.
    pub fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_xml(value));
            out.push('"');
        }
        if self.inner.is_empty() {
            out.push_str("/>");
        } else {
            out.push('>');
            out.push_str(&String::from_utf8_lossy(&self.inner));
            out.push_str("</");
            out.push_str(&self.tag);
            out.push('>');
        }
    }
}

/// Remove all elements with the given local name from an XML fragment,
/// keeping everything else verbatim.
fn strip_elements(xml: &[u8], local: &[u8]) -> Result<Vec<u8>> {
    if xml.is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = Reader::from_reader(xml);
    let mut out = Vec::with_capacity(xml.len());
    let mut keep_from = 0usize;

    loop {
        let start = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Empty(e)) if e.local_name().as_ref() == local => {
                out.extend_from_slice(&xml[keep_from..start]);
                keep_from = reader.buffer_position() as usize;
            },
            Ok(Event::Start(e)) if e.local_name().as_ref() == local => {
                out.extend_from_slice(&xml[keep_from..start]);
                reader
                    .read_to_end(e.name())
                    .map_err(|e| PptxError::Xml(e.to_string()))?;
                keep_from = reader.buffer_position() as usize;
            },
            Ok(Event::Eof) => break,
            Ok(_) => {},
            Err(e) => return Err(PptxError::Xml(e.to_string())),
        }
    }

    out.extend_from_slice(&xml[keep_from..]);
    Ok(out)
}

/// A run of text with uniform properties (`a:r`).
#[derive(Debug, Clone)]
pub struct Run {
    /// Run properties (`a:rPr`), if present
    pub props: Option<ElemProps>,
    /// Unescaped run text
    pub text: String,
}

impl Run {
    /// Parse a run from its XML fragment.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let scanned = scan_element(xml)?;

        let mut props = None;
        let mut text = String::new();
        for child in &scanned.children {
            match child.local.as_slice() {
                b"rPr" => props = Some(ElemProps::parse(&xml[child.range.clone()])?),
                b"t" => text.push_str(&element_text(&xml[child.range.clone()])?),
                _ => {},
            }
        }

        Ok(Self { props, text })
    }

    /// Serialize this run into `out`.
    pub fn write_xml(&self, out: &mut String) {
        out.push_str("<a:r>");
        if let Some(props) = &self.props {
            props.write_xml(out);
        }
        out.push_str("<a:t>");
        out.push_str(&escape_xml(&self.text));
        out.push_str("</a:t></a:r>");
    }
}

/// A direct child of a paragraph: either a text run or raw XML the composer
/// leaves untouched (`a:br`, `a:fld`, `a:endParaRPr`).
#[derive(Debug, Clone)]
pub enum ParaItem {
    Run(Run),
    Raw(Vec<u8>),
}

/// A paragraph (`a:p`) in a text body.
#[derive(Debug, Clone)]
pub struct Paragraph {
    /// Paragraph properties (`a:pPr`), if present
    pub props: Option<ElemProps>,
    /// Paragraph children in document order
    pub items: Vec<ParaItem>,
}

impl Paragraph {
    /// Parse a paragraph from its XML fragment.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let scanned = scan_element(xml)?;

        let mut props = None;
        let mut items = Vec::new();
        for child in &scanned.children {
            match child.local.as_slice() {
                b"pPr" => props = Some(ElemProps::parse(&xml[child.range.clone()])?),
                b"r" => items.push(ParaItem::Run(Run::parse(&xml[child.range.clone()])?)),
                _ => items.push(ParaItem::Raw(xml[child.range.clone()].to_vec())),
            }
        }

        Ok(Self { props, items })
    }

    /// Concatenated text of all runs in this paragraph.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for item in &self.items {
            if let ParaItem::Run(run) = item {
                text.push_str(&run.text);
            }
        }
        text
    }

    /// Set the paragraph alignment, creating `a:pPr` if necessary.
    pub fn set_alignment(&mut self, align: TextAlign) {
        self.props
            .get_or_insert_with(|| ElemProps::new("a:pPr"))
            .set_attr("algn", align.as_attr());
    }

    /// Serialize this paragraph into `out`.
    pub fn write_xml(&self, out: &mut String) {
        out.push_str("<a:p>");
        if let Some(props) = &self.props {
            props.write_xml(out);
        }
        for item in &self.items {
            match item {
                ParaItem::Run(run) => run.write_xml(out),
                ParaItem::Raw(raw) => out.push_str(&String::from_utf8_lossy(raw)),
            }
        }
        out.push_str("</a:p>");
    }
}

/// An editable text body (`p:txBody`).
#[derive(Debug, Clone)]
pub struct TextBody {
    /// Raw start tag of the body element
    open_tag: Vec<u8>,
    /// Qualified name of the body element
    name: Vec<u8>,
    /// Raw non-paragraph children (`a:bodyPr`, `a:lstStyle`), emitted verbatim
    prelude: Vec<u8>,
    /// Paragraphs in document order
    pub paragraphs: Vec<Paragraph>,
}

impl TextBody {
    /// Parse a text body from its XML fragment.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let scanned = scan_element(xml)?;

        let open_tag = if scanned.self_closing {
            let mut tag = Vec::with_capacity(scanned.name.len() + 2);
            tag.push(b'<');
            tag.extend_from_slice(&scanned.name);
            tag.push(b'>');
            tag
        } else {
            xml[scanned.open.clone()].to_vec()
        };

        let mut prelude = Vec::new();
        let mut paragraphs = Vec::new();
        for child in &scanned.children {
            if child.local.as_slice() == b"p" {
                paragraphs.push(Paragraph::parse(&xml[child.range.clone()])?);
            } else {
                prelude.extend_from_slice(&xml[child.range.clone()]);
            }
        }

        Ok(Self {
            open_tag,
            name: scanned.name,
            prelude,
            paragraphs,
        })
    }

    /// The displayed text of this body: run texts concatenated, paragraphs
    /// joined with newlines.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for (i, para) in self.paragraphs.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(&para.text());
        }
        text
    }

    /// Replace every occurrence of `token` with `value`, in place.
    ///
    /// The match may span run boundaries; surrounding text and sibling tokens
    /// are preserved. Each substituted value becomes its own run, cloned from
    /// the properties of the run the match started in.
    ///
    /// Returns the `(paragraph, item)` index of every run created for a
    /// substituted value. Tracking the created runs by index is what lets
    /// callers style exactly the substituted text even when the value also
    /// occurs elsewhere in the body.
    pub fn substitute(&mut self, token: &str, value: &str) -> Vec<(usize, usize)> {
        let mut hits = Vec::new();
        if token.is_empty() {
            return hits;
        }

        for (pi, para) in self.paragraphs.iter_mut().enumerate() {
            let mut search_from = 0usize;
            loop {
                // Map each run onto its byte range in the concatenated text
                let mut full = String::new();
                let mut spans: Vec<(usize, usize, usize)> = Vec::new();
                for (ii, item) in para.items.iter().enumerate() {
                    if let ParaItem::Run(run) = item {
                        let start = full.len();
                        full.push_str(&run.text);
                        spans.push((ii, start, full.len()));
                    }
                }

                if search_from >= full.len() {
                    break;
                }
                let Some(found) = full[search_from..].find(token) else {
                    break;
                };
                let pos = search_from + found;
                let end = pos + token.len();

                // pos < full.len() and end <= full.len(), so both lookups succeed
                let (si, s_start, _) = spans
                    .iter()
                    .copied()
                    .find(|&(_, s, e)| pos >= s && pos < e)
                    .unwrap();
                let (ei, e_start, _) = spans
                    .iter()
                    .copied()
                    .find(|&(_, s, e)| end > s && end <= e)
                    .unwrap();

                let (prefix, start_props) = match &para.items[si] {
                    ParaItem::Run(run) => (
                        run.text[..pos - s_start].to_string(),
                        run.props.clone(),
                    ),
                    _ => unreachable!(),
                };
                let (suffix, end_props) = match &para.items[ei] {
                    ParaItem::Run(run) => (
                        run.text[end - e_start..].to_string(),
                        run.props.clone(),
                    ),
                    _ => unreachable!(),
                };

                // Rebuild the item list: prefix run, value run, suffix run;
                // items strictly between the match boundaries are consumed.
                let mut rebuilt = Vec::with_capacity(para.items.len() + 2);
                let mut inserted_at = 0;
                for (ii, item) in para.items.drain(..).enumerate() {
                    if ii < si || ii > ei {
                        rebuilt.push(item);
                    } else if ii == si {
                        if !prefix.is_empty() {
                            rebuilt.push(ParaItem::Run(Run {
                                props: start_props.clone(),
                                text: prefix.clone(),
                            }));
                        }
                        inserted_at = rebuilt.len();
                        rebuilt.push(ParaItem::Run(Run {
                            props: start_props.clone(),
                            text: value.to_string(),
                        }));
                        if si == ei && !suffix.is_empty() {
                            rebuilt.push(ParaItem::Run(Run {
                                props: end_props.clone(),
                                text: suffix.clone(),
                            }));
                        }
                    } else if ii == ei && !suffix.is_empty() {
                        rebuilt.push(ParaItem::Run(Run {
                            props: end_props.clone(),
                            text: suffix.clone(),
                        }));
                    }
                }
                para.items = rebuilt;

                hits.push((pi, inserted_at));

                // Resume after the substituted value so a value containing
                // the token cannot recurse
                search_from = pos + value.len();
            }
        }

        hits
    }

    /// Clear all text, leaving a single empty paragraph.
    pub fn clear(&mut self) {
        self.paragraphs.truncate(1);
        if let Some(para) = self.paragraphs.first_mut() {
            para.items.clear();
        }
    }

    /// Serialize this text body back to XML.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(256);
        out.push_str(&String::from_utf8_lossy(&self.open_tag));
        out.push_str(&String::from_utf8_lossy(&self.prelude));
        for para in &self.paragraphs {
            para.write_xml(&mut out);
        }
        out.push_str("</");
        out.push_str(&String::from_utf8_lossy(&self.name));
        out.push('>');
        out
    }
}
