use geo::{BoundingRect, Line, MultiPolygon};
use tracing::instrument;

use crate::{NormalizedBox, OcrWord};

/// Below this average tilt the box is reported without an angle.
pub const MIN_REPORTED_ANGLE_DEGREES: f32 = 0.5;

/// Axis-aligned box around `words`, normalized to the image dimensions.
///
/// Returns `None` for an empty word list, unknown (zero) image dimensions or a
/// degenerate box.
#[instrument(level = "trace", skip(words))]
pub fn normalized_box(words: &[&OcrWord], image_width: u32, image_height: u32) -> Option<NormalizedBox> {
    if words.is_empty() || image_width == 0 || image_height == 0 {
        return None;
    }
    let polygons = words.iter().map(|it| it.polygon()).collect::<MultiPolygon<f32>>();
    let rect = polygons.bounding_rect()?;

    let width = image_width as f32;
    let height = image_height as f32;
    let min_x = (rect.min().x / width).clamp(0.0, 1.0);
    let min_y = (rect.min().y / height).clamp(0.0, 1.0);
    let max_x = (rect.max().x / width).clamp(0.0, 1.0);
    let max_y = (rect.max().y / height).clamp(0.0, 1.0);
    if max_x <= min_x || max_y <= min_y {
        log::trace!("Discarding degenerate box {rect:?}");
        return None;
    }

    Some(NormalizedBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
        angle: text_angle(words),
    })
}

/// Mean orientation of the words' top edges, in degrees.
fn text_angle(words: &[&OcrWord]) -> Option<f32> {
    let angles = words
        .iter()
        .map(|word| Line::new(word.bounding_polygon[0], word.bounding_polygon[1]))
        .filter(|line| line.dx() != 0.0 || line.dy() != 0.0)
        .map(|line| line.dy().atan2(line.dx()).to_degrees())
        .collect::<Vec<_>>();
    if angles.is_empty() {
        return None;
    }
    let mean = angles.iter().sum::<f32>() / angles.len() as f32;
    (mean.abs() >= MIN_REPORTED_ANGLE_DEGREES).then_some(mean)
}
