//! Shared data model for lectures, frames, annotation boxes and context
//! associations.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Backend identifier of a lecture video.
pub type VideoId = i64;

/// Zero-based index of a frame within a video.
pub type FrameIndex = i64;

/// Identifier of an annotation box within one annotated frame.
pub type BoxId = i64;

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// Dimensions of one annotated frame of a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameMeta {
    pub frame_index: FrameIndex,
    pub width: u32,
    pub height: u32,
}

/// Rendered pixel footprint of the video element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayedSize {
    pub width: f64,
    pub height: f64,
}

impl DisplayedSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

// ---------------------------------------------------------------------------
// Annotation boxes
// ---------------------------------------------------------------------------

/// Axis-aligned box `[x1, y1, x2, y2]` in some pixel space.
///
/// Equality is exact component equality; the explanation cache relies on
/// it as an identity key for an annotated region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxCoordinate(pub [f64; 4]);

impl BoxCoordinate {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self([x1, y1, x2, y2])
    }

    pub fn x1(&self) -> f64 {
        self.0[0]
    }

    pub fn y1(&self) -> f64 {
        self.0[1]
    }

    pub fn x2(&self) -> f64 {
        self.0[2]
    }

    pub fn y2(&self) -> f64 {
        self.0[3]
    }

    pub fn width(&self) -> f64 {
        self.x2() - self.x1()
    }

    pub fn height(&self) -> f64 {
        self.y2() - self.y1()
    }

    /// Multiply every component by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self(self.0.map(|c| c * factor))
    }

    /// Check that the box is finite and non-degenerate (`x1 < x2`, `y1 < y2`).
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.0.iter().any(|c| !c.is_finite()) {
            return Err(CoreError::Validation(format!(
                "box coordinate must be finite, got {:?}",
                self.0
            )));
        }
        if self.x1() >= self.x2() || self.y1() >= self.y2() {
            return Err(CoreError::Validation(format!(
                "box coordinate must satisfy x1 < x2 and y1 < y2, got {:?}",
                self.0
            )));
        }
        Ok(())
    }
}

/// One labelled layout region of an annotated frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationBox {
    pub box_id: BoxId,
    pub label: String,
    pub coordinate: BoxCoordinate,
}

// ---------------------------------------------------------------------------
// Lecture services payloads
// ---------------------------------------------------------------------------

/// Sidebar entry for one video of a lecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoEntry {
    pub video_id: VideoId,
    pub video_name: String,
}

/// Generated explanation of an annotated region plus its text embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Earlier lecture moment semantically related to an explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub video_id: VideoId,
    pub start_time: f64,
    pub similarity: f64,
    pub label: String,
}

/// Embedded slice of a video transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptChunk {
    pub video_id: VideoId,
    pub chunk_index: i64,
    pub start_time: f64,
    pub embedding: Vec<f32>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_serialises_as_array() {
        let coord = BoxCoordinate::new(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_value(coord).unwrap();
        assert_eq!(json, serde_json::json!([1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn coordinate_accessors_and_extent() {
        let coord = BoxCoordinate::new(10.0, 20.0, 40.0, 60.0);
        assert_eq!(coord.width(), 30.0);
        assert_eq!(coord.height(), 40.0);
    }

    #[test]
    fn validate_rejects_flipped_box() {
        let coord = BoxCoordinate::new(50.0, 0.0, 10.0, 20.0);
        assert!(coord.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_height() {
        let coord = BoxCoordinate::new(0.0, 5.0, 10.0, 5.0);
        assert!(coord.validate().is_err());
    }

    #[test]
    fn validate_rejects_nan() {
        let coord = BoxCoordinate::new(0.0, f64::NAN, 10.0, 5.0);
        assert!(coord.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_box() {
        assert!(BoxCoordinate::new(0.0, 0.0, 1.0, 1.0).validate().is_ok());
    }
}
