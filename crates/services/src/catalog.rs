//! Offline lecture catalog.
//!
//! [`CatalogService`] answers every [`LectureService`] call from a JSON
//! document instead of the network, which lets the viewer run without a
//! backend. Context association uses the same prior-chunk matching the
//! backend performs, via [`mentor_core::similarity::best_prior_match`].
//!
//! ```json
//! {
//!   "lectures": [{
//!     "name": "Intro to AI",
//!     "videos": [{
//!       "video_id": 0, "video_name": "Search", "fps": 25, "source": "media/0.mp4",
//!       "frames": [{"frame_index": 30, "width": 1920, "height": 1080}],
//!       "layouts": [{"frame_index": 30, "boxes": [
//!         {"box_id": 1, "label": "title", "coordinate": [0, 0, 100, 50]}]}],
//!       "explanations": [{"frame_index": 30, "box_id": 1, "text": "...", "embedding": [0.1]}],
//!       "chunks": [{"chunk_index": 0, "start_time": 0.0, "embedding": [0.1]}]
//!     }]
//!   }]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use mentor_core::similarity::best_prior_match;
use mentor_core::types::{
    AnnotationBox, Association, BoxId, Explanation, FrameIndex, FrameMeta, TranscriptChunk,
    VideoEntry, VideoId,
};

use crate::error::ServiceError;
use crate::service::LectureService;

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CatalogFile {
    lectures: Vec<LectureFile>,
}

#[derive(Debug, Deserialize)]
struct LectureFile {
    name: String,
    #[serde(default)]
    videos: Vec<VideoFile>,
}

#[derive(Debug, Deserialize)]
struct VideoFile {
    video_id: VideoId,
    video_name: String,
    #[serde(default)]
    fps: Option<f64>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    frames: Vec<FrameMeta>,
    #[serde(default)]
    layouts: Vec<LayoutFile>,
    #[serde(default)]
    explanations: Vec<ExplanationFile>,
    #[serde(default)]
    chunks: Vec<ChunkFile>,
}

#[derive(Debug, Deserialize)]
struct LayoutFile {
    frame_index: FrameIndex,
    boxes: Vec<AnnotationBox>,
}

#[derive(Debug, Deserialize)]
struct ExplanationFile {
    frame_index: FrameIndex,
    box_id: BoxId,
    text: String,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ChunkFile {
    chunk_index: i64,
    start_time: f64,
    embedding: Vec<f32>,
}

// ---------------------------------------------------------------------------
// CatalogService
// ---------------------------------------------------------------------------

/// In-memory lecture data loaded from a catalog document.
#[derive(Debug)]
pub struct CatalogService {
    lectures: Vec<Lecture>,
}

#[derive(Debug)]
struct Lecture {
    name: String,
    videos: Vec<VideoFile>,
    chunks: Vec<TranscriptChunk>,
}

impl Lecture {
    fn video(&self, video_id: VideoId) -> Result<&VideoFile, ServiceError> {
        self.videos
            .iter()
            .find(|v| v.video_id == video_id)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("video {video_id} of lecture '{}'", self.name))
            })
    }
}

impl CatalogService {
    /// Read and parse a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServiceError::Catalog(format!("{}: {e}", path.display())))?;
        let catalog = Self::from_json(&text)?;
        tracing::info!(
            path = %path.display(),
            lectures = catalog.lectures.len(),
            "Loaded lecture catalog",
        );
        Ok(catalog)
    }

    /// Parse a catalog document.
    pub fn from_json(text: &str) -> Result<Self, ServiceError> {
        let file: CatalogFile =
            serde_json::from_str(text).map_err(|e| ServiceError::Catalog(e.to_string()))?;

        let lectures = file
            .lectures
            .into_iter()
            .map(|lecture| {
                let chunks: Vec<TranscriptChunk> = lecture
                    .videos
                    .iter()
                    .flat_map(|v| {
                        v.chunks.iter().map(move |c| TranscriptChunk {
                            video_id: v.video_id,
                            chunk_index: c.chunk_index,
                            start_time: c.start_time,
                            embedding: c.embedding.clone(),
                        })
                    })
                    .collect();
                Lecture {
                    name: lecture.name,
                    videos: lecture.videos,
                    chunks,
                }
            })
            .collect();

        Ok(Self { lectures })
    }

    fn lecture(&self, name: &str) -> Result<&Lecture, ServiceError> {
        self.lectures
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| ServiceError::NotFound(format!("lecture '{name}'")))
    }
}

impl LectureService for CatalogService {
    async fn get_video_list(&self, lecture: &str) -> Result<Vec<VideoEntry>, ServiceError> {
        Ok(self
            .lecture(lecture)?
            .videos
            .iter()
            .map(|v| VideoEntry {
                video_id: v.video_id,
                video_name: v.video_name.clone(),
            })
            .collect())
    }

    async fn get_frame_rate(
        &self,
        lecture: &str,
        video_id: VideoId,
    ) -> Result<Option<f64>, ServiceError> {
        Ok(self.lecture(lecture)?.video(video_id)?.fps)
    }

    async fn get_frame_metadata(
        &self,
        lecture: &str,
        video_id: VideoId,
    ) -> Result<Vec<FrameMeta>, ServiceError> {
        Ok(self.lecture(lecture)?.video(video_id)?.frames.clone())
    }

    async fn get_annotations(
        &self,
        lecture: &str,
        video_id: VideoId,
        frame_index: FrameIndex,
    ) -> Result<Vec<AnnotationBox>, ServiceError> {
        self.lecture(lecture)?
            .video(video_id)?
            .layouts
            .iter()
            .find(|l| l.frame_index == frame_index)
            .map(|l| l.boxes.clone())
            .ok_or_else(|| {
                ServiceError::NotFound(format!("layout of video {video_id} frame {frame_index}"))
            })
    }

    async fn get_explanation(
        &self,
        lecture: &str,
        video_id: VideoId,
        frame_index: FrameIndex,
        box_id: BoxId,
    ) -> Result<Explanation, ServiceError> {
        self.lecture(lecture)?
            .video(video_id)?
            .explanations
            .iter()
            .find(|e| e.frame_index == frame_index && e.box_id == box_id)
            .map(|e| Explanation {
                text: e.text.clone(),
                embedding: e.embedding.clone(),
            })
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "explanation of video {video_id} frame {frame_index} box {box_id}"
                ))
            })
    }

    async fn associate_context(
        &self,
        lecture: &str,
        video_id: VideoId,
        timestamp: f64,
        embedding: &[f32],
    ) -> Result<Association, ServiceError> {
        let lecture = self.lecture(lecture)?;
        let found = best_prior_match(&lecture.chunks, video_id, timestamp, embedding)
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "no prior context for video {video_id} before {timestamp}s"
                ))
            })?;
        let label = lecture
            .video(found.chunk.video_id)
            .map(|v| v.video_name.clone())
            .unwrap_or_default();

        Ok(Association {
            video_id: found.chunk.video_id,
            start_time: found.chunk.start_time,
            similarity: found.similarity,
            label,
        })
    }

    fn video_url(&self, lecture: &str, video_id: VideoId) -> Option<String> {
        self.lecture(lecture)
            .and_then(|l| l.video(video_id))
            .ok()
            .and_then(|v| v.source.clone())
    }
}
