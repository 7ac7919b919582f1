//! The external lecture services the viewer consumes.

use std::future::Future;

use mentor_core::types::{
    AnnotationBox, Association, BoxId, Explanation, FrameIndex, FrameMeta, VideoEntry, VideoId,
};

use crate::error::ServiceError;

/// Source of lecture data: video lists, frame metadata, layouts,
/// explanations and context associations.
///
/// Implementations never retry; a failed call is reported once and the
/// caller decides how to degrade.
pub trait LectureService: Send + Sync {
    /// All videos of a lecture, in backend order.
    fn get_video_list(
        &self,
        lecture: &str,
    ) -> impl Future<Output = Result<Vec<VideoEntry>, ServiceError>> + Send;

    /// Frame rate of a video. `None` when the backend has no usable rate.
    fn get_frame_rate(
        &self,
        lecture: &str,
        video_id: VideoId,
    ) -> impl Future<Output = Result<Option<f64>, ServiceError>> + Send;

    /// Metadata of every annotated frame of a video.
    fn get_frame_metadata(
        &self,
        lecture: &str,
        video_id: VideoId,
    ) -> impl Future<Output = Result<Vec<FrameMeta>, ServiceError>> + Send;

    /// Layout boxes of one annotated frame, in source-frame pixels.
    fn get_annotations(
        &self,
        lecture: &str,
        video_id: VideoId,
        frame_index: FrameIndex,
    ) -> impl Future<Output = Result<Vec<AnnotationBox>, ServiceError>> + Send;

    /// Explanation text and embedding for one box of one frame.
    fn get_explanation(
        &self,
        lecture: &str,
        video_id: VideoId,
        frame_index: FrameIndex,
        box_id: BoxId,
    ) -> impl Future<Output = Result<Explanation, ServiceError>> + Send;

    /// Earlier lecture moment best matching `embedding`, searched before
    /// `timestamp` of `video_id`.
    fn associate_context(
        &self,
        lecture: &str,
        video_id: VideoId,
        timestamp: f64,
        embedding: &[f32],
    ) -> impl Future<Output = Result<Association, ServiceError>> + Send;

    /// Media source the host player should load for a video, if known.
    fn video_url(&self, lecture: &str, video_id: VideoId) -> Option<String>;
}
