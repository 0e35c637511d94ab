/// Placeholder Resolver.
///
/// Walks every text shape on a slide, replaces known placeholder tokens with
/// caller-supplied values (or configured defaults), and applies each field's
/// style to exactly the runs created by the substitution.
use crate::compose::config::ComposeConfig;
use crate::compose::error::Result;
use crate::compose::fields::{FieldSpec, FieldStyle, FieldValues};
use crate::pptx::slide::SlideXml;
use crate::pptx::textbody::{ElemProps, ParaItem, TextBody};

/// Resolves placeholder tokens against a slide.
pub struct PlaceholderResolver<'a> {
    /// Field specs, matched in configuration order
    fields: &'a [FieldSpec],
}

impl<'a> PlaceholderResolver<'a> {
    /// Create a resolver over the configured field table.
    pub fn new(config: &'a ComposeConfig) -> Self {
        Self {
            fields: &config.fields,
        }
    }

    /// Resolve all placeholder fields on one slide.
    ///
    /// A shape may match zero, one, or several distinct tokens; every match
    /// is substituted independently. Shapes matching no token are left
    /// byte-identical. Returns the number of substitutions performed.
    pub fn resolve_slide(&self, slide: &mut SlideXml, values: &FieldValues) -> Result<usize> {
        let mut replaced = 0;

        for index in 0..slide.shape_count() {
            let rewritten = {
                let shape = slide.shape(index);
                let Some(mut body) = shape.text_body()? else {
                    continue;
                };

                let full_text = body.text();
                let mut touched = false;

                for spec in self.fields {
                    if !full_text.contains(&spec.token) {
                        // Absence is the normal "not this field" case
                        continue;
                    }

                    let value = values.get_or_default(spec);
                    let hits = body.substitute(&spec.token, value);
                    apply_style(&mut body, &hits, &spec.style);

                    tracing::debug!(
                        token = %spec.token,
                        shape = index,
                        runs = hits.len(),
                        "substituted placeholder"
                    );
                    replaced += hits.len();
                    touched = true;
                }

                if !touched {
                    continue;
                }
                shape.with_text_body(&body)
            };

            slide.set_shape_xml(index, rewritten)?;
        }

        Ok(replaced)
    }
}

/// Apply a field style to the substituted runs and their paragraphs.
///
/// `hits` are the `(paragraph, item)` indices returned by the substitution,
/// so styling lands on exactly the created runs even when the value also
/// occurs in unrelated text.
fn apply_style(body: &mut TextBody, hits: &[(usize, usize)], style: &FieldStyle) {
    for &(pi, ii) in hits {
        let para = &mut body.paragraphs[pi];

        if let Some(align) = style.align {
            para.set_alignment(align);
        }

        if let ParaItem::Run(run) = &mut para.items[ii] {
            let props = run.props.get_or_insert_with(|| ElemProps::new("a:rPr"));
            if let Some(size) = style.size {
                // Font size is stored in hundredths of a point
                props.set_attr("sz", &((size * 100.0).round() as u32).to_string());
            }
            if let Some(bold) = style.bold {
                props.set_attr("b", if bold { "1" } else { "0" });
            }
            if let Some(font) = &style.font {
                props.set_latin_typeface(font);
            }
        }
    }
}
