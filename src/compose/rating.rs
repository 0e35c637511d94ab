/// Rating Layout Engine.
///
/// Locates the shape whose text equals the rating token, clears its text, and
/// lays out a caller-sized row of fixed-size icons horizontally centered
/// within the shape's original bounds.
use crate::compose::config::{IconMetrics, RatingSpec};
use crate::compose::error::Result;
use crate::pptx::shape::{Frame, picture_xml};
use crate::pptx::slide::SlideXml;

/// Compute the frames of `count` icons centered within `frame`.
///
/// The row occupies `count * width + (count - 1) * gap` EMUs, starts at
/// `frame.left + (frame.width - total) / 2`, and advances by `width + gap`
/// per icon. Icons sit at the frame's top edge. A count of zero yields an
/// empty row.
pub fn icon_row(frame: &Frame, count: u32, metrics: &IconMetrics) -> Vec<Frame> {
    let n = count as i64;
    let total_span = n * metrics.width + (n - 1).max(0) * metrics.gap;
    let start_left = frame.left + (frame.width - total_span) / 2;

    (0..n)
        .map(|i| Frame {
            left: start_left + i * (metrics.width + metrics.gap),
            top: frame.top,
            width: metrics.width,
            height: metrics.height,
        })
        .collect()
}

/// Applies the rating layout to slides.
pub struct RatingComposer<'a> {
    spec: &'a RatingSpec,
}

impl<'a> RatingComposer<'a> {
    /// Create a composer over the configured rating spec.
    pub fn new(spec: &'a RatingSpec) -> Self {
        Self { spec }
    }

    /// Find the shapes whose displayed text equals the rating token.
    pub fn find_targets(&self, slide: &SlideXml) -> Result<Vec<usize>> {
        let mut targets = Vec::new();
        for index in 0..slide.shape_count() {
            let shape = slide.shape(index);
            if !shape.has_text_body() {
                continue;
            }
            if shape.text()?.trim() == self.spec.token {
                targets.push(index);
            }
        }
        Ok(targets)
    }

    /// Clear each target shape's text and append `count` icon pictures.
    ///
    /// The text is cleared regardless of `count`; with a count of zero the
    /// region is simply left blank. `rel_id` is the slide's relationship to
    /// the icon media part and is only required when icons are inserted.
    pub fn apply(
        &self,
        slide: &mut SlideXml,
        targets: &[usize],
        count: u32,
        rel_id: Option<&str>,
    ) -> Result<usize> {
        let mut inserted = 0;

        for &index in targets {
            let (frame, cleared) = {
                let shape = slide.shape(index);
                // find_targets only returns shapes with a text body
                let mut body = shape.text_body()?.unwrap();
                body.clear();
                (shape.frame(), shape.with_text_body(&body))
            };
            slide.set_shape_xml(index, cleared)?;

            if count == 0 {
                continue;
            }
            let Some(rel_id) = rel_id else {
                continue;
            };

            for icon_frame in icon_row(&frame, count, &self.spec.metrics) {
                let shape_id = slide.next_shape_id();
                slide.append_shape_xml(picture_xml(shape_id, rel_id, &icon_frame, "Rating icon"));
                inserted += 1;
            }

            tracing::debug!(count, shape = index, "laid out rating icons");
        }

        Ok(inserted)
    }
}
