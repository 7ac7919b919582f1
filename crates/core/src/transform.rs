//! Rescales annotation boxes from source-frame pixels to the displayed
//! video element's pixels.
//!
//! Scaling is uniform (source and display aspect ratios are assumed equal)
//! and applies no offset. An older layout centred letterboxed content
//! vertically for one fixed resolution; per-frame dimensions made that
//! obsolete and it is intentionally not reproduced.

use crate::error::CoreError;
use crate::types::{AnnotationBox, DisplayedSize};

/// Source frame width assumed when a frame's own metadata is unknown.
pub const DEFAULT_SOURCE_WIDTH: u32 = 1920;

/// Compute the uniform scale factor from source to displayed pixels.
///
/// A missing or zero `source_width` falls back to [`DEFAULT_SOURCE_WIDTH`].
pub fn scale_factor(source_width: Option<u32>, displayed: DisplayedSize) -> Result<f64, CoreError> {
    if !displayed.width.is_finite() || displayed.width <= 0.0 {
        return Err(CoreError::Validation(format!(
            "displayed width must be positive, got {}",
            displayed.width
        )));
    }
    let source = match source_width {
        Some(w) if w > 0 => w,
        _ => DEFAULT_SOURCE_WIDTH,
    };
    Ok(displayed.width / f64::from(source))
}

/// Scale every box by `factor`, preserving ids and labels.
pub fn scale_boxes(boxes: &[AnnotationBox], factor: f64) -> Vec<AnnotationBox> {
    boxes
        .iter()
        .map(|b| AnnotationBox {
            box_id: b.box_id,
            label: b.label.clone(),
            coordinate: b.coordinate.scaled(factor),
        })
        .collect()
}

/// Transform source-frame boxes into displayed pixel space.
pub fn to_display_space(
    boxes: &[AnnotationBox],
    source_width: Option<u32>,
    displayed: DisplayedSize,
) -> Result<Vec<AnnotationBox>, CoreError> {
    let factor = scale_factor(source_width, displayed)?;
    Ok(scale_boxes(boxes, factor))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
