//! REST client for the lecture backend.
//!
//! Wraps the backend's HTTP endpoints (video list, frame rate, frame
//! metadata, layouts, explanations and context association) using
//! [`reqwest`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use mentor_core::types::{
    AnnotationBox, Association, BoxCoordinate, BoxId, Explanation, FrameIndex, FrameMeta,
    VideoEntry, VideoId,
};

use crate::error::ServiceError;
use crate::lenient;
use crate::service::LectureService;

/// HTTP client for one lecture backend.
#[derive(Debug)]
pub struct LectureApi {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct VideoRow {
    #[serde(deserialize_with = "lenient::int")]
    video_id: i64,
    video_name: String,
}

#[derive(Debug, Deserialize)]
struct FpsResponse {
    #[serde(default, deserialize_with = "lenient::opt_float")]
    fps: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FrameRow {
    #[serde(deserialize_with = "lenient::int")]
    frame_index: i64,
    #[serde(deserialize_with = "lenient::uint")]
    width: u32,
    #[serde(deserialize_with = "lenient::uint")]
    height: u32,
}

#[derive(Debug, Deserialize)]
struct BoxRow {
    #[serde(deserialize_with = "lenient::int")]
    box_id: i64,
    label: String,
    coordinate: [f64; 4],
}

#[derive(Debug, Serialize)]
struct ExplainRequest<'a> {
    lecture_name: &'a str,
    video_id: VideoId,
    frame_index: FrameIndex,
    box_id: BoxId,
}

#[derive(Debug, Deserialize)]
struct ExplainResponse {
    explanation: String,
    #[serde(deserialize_with = "lenient::embedding")]
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct AssociateRequest<'a> {
    lecture_name: &'a str,
    video_id: VideoId,
    timestamp: f64,
    embedding: &'a [f32],
}

#[derive(Debug, Deserialize)]
struct AssociateResponse {
    #[serde(default, deserialize_with = "lenient::opt_int")]
    video_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_float")]
    start_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_float")]
    similarity: Option<f64>,
    #[serde(default)]
    label: Option<String>,
}

// ---------------------------------------------------------------------------
// LectureApi
// ---------------------------------------------------------------------------

impl LectureApi {
    /// Create a client for a backend at `api_url`, e.g. `http://host:8000`.
    pub fn new(api_url: &str) -> Result<Self, ServiceError> {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create a client whose requests time out after `timeout`.
    pub fn with_timeout(api_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, api_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: &str) -> Result<Self, ServiceError> {
        let base_url = reqwest::Url::parse(api_url)
            .map_err(|e| ServiceError::InvalidUrl(format!("{api_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::InvalidUrl(format!(
                "{api_url}: cannot be used as a base URL"
            )));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    // ---- private helpers ----

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<T, ServiceError> {
        let url = self.endpoint(segments);
        tracing::debug!(url = %url, "GET lecture API");
        let response = self.client.get(url).send().await?;
        Self::parse_response(response).await
    }

    async fn post_json<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ServiceError> {
        let url = self.endpoint(segments);
        tracing::debug!(url = %url, "POST lecture API");
        let response = self.client.post(url).json(body).send().await?;
        Self::parse_response(response).await
    }

    /// Ensure the response has a success status code, turning failures
    /// into [`ServiceError::Status`] carrying the body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

impl LectureService for LectureApi {
    async fn get_video_list(&self, lecture: &str) -> Result<Vec<VideoEntry>, ServiceError> {
        let rows: Vec<VideoRow> = self.get_json(&["videos", lecture]).await?;
        Ok(rows
            .into_iter()
            .map(|r| VideoEntry {
                video_id: r.video_id,
                video_name: r.video_name,
            })
            .collect())
    }

    async fn get_frame_rate(
        &self,
        lecture: &str,
        video_id: VideoId,
    ) -> Result<Option<f64>, ServiceError> {
        let id = video_id.to_string();
        let response: FpsResponse = self.get_json(&["fps", lecture, id.as_str()]).await?;
        Ok(response.fps)
    }

    async fn get_frame_metadata(
        &self,
        lecture: &str,
        video_id: VideoId,
    ) -> Result<Vec<FrameMeta>, ServiceError> {
        let id = video_id.to_string();
        let rows: Vec<FrameRow> = self.get_json(&["frames", "metadata", lecture, id.as_str()]).await?;
        Ok(rows
            .into_iter()
            .map(|r| FrameMeta {
                frame_index: r.frame_index,
                width: r.width,
                height: r.height,
            })
            .collect())
    }

    async fn get_annotations(
        &self,
        lecture: &str,
        video_id: VideoId,
        frame_index: FrameIndex,
    ) -> Result<Vec<AnnotationBox>, ServiceError> {
        let id = video_id.to_string();
        let frame = frame_index.to_string();
        let rows: Vec<BoxRow> = self.get_json(&["layout", lecture, id.as_str(), frame.as_str()]).await?;
        Ok(rows
            .into_iter()
            .map(|r| AnnotationBox {
                box_id: r.box_id,
                label: r.label,
                coordinate: BoxCoordinate(r.coordinate),
            })
            .collect())
    }

    async fn get_explanation(
        &self,
        lecture: &str,
        video_id: VideoId,
        frame_index: FrameIndex,
        box_id: BoxId,
    ) -> Result<Explanation, ServiceError> {
        let request = ExplainRequest {
            lecture_name: lecture,
            video_id,
            frame_index,
            box_id,
        };
        let response: ExplainResponse = self.post_json(&["explain"], &request).await?;
        Ok(Explanation {
            text: response.explanation,
            embedding: response.embedding,
        })
    }

    async fn associate_context(
        &self,
        lecture: &str,
        video_id: VideoId,
        timestamp: f64,
        embedding: &[f32],
    ) -> Result<Association, ServiceError> {
        let request = AssociateRequest {
            lecture_name: lecture,
            video_id,
            timestamp,
            embedding,
        };
        let response: AssociateResponse = self.post_json(&["associate"], &request).await?;
        let target = response.video_id.ok_or_else(|| {
            ServiceError::NotFound(format!(
                "no prior context for video {video_id} before {timestamp}s"
            ))
        })?;
        Ok(Association {
            video_id: target,
            start_time: response.start_time.unwrap_or_default(),
            similarity: response.similarity.unwrap_or_default(),
            label: response.label.unwrap_or_default(),
        })
    }

    fn video_url(&self, lecture: &str, video_id: VideoId) -> Option<String> {
        let id = video_id.to_string();
        Some(self.endpoint(&["video", lecture, id.as_str()]).to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn endpoint_percent_encodes_lecture_names() {
        let api = LectureApi::new("http://localhost:8000").unwrap();
        let url = api.endpoint(&["videos", "Intro to AI 2021"]);
        assert_eq!(url.as_str(), "http://localhost:8000/videos/Intro%20to%20AI%202021");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let api = LectureApi::new("http://localhost:8000/api/").unwrap();
        let url = api.endpoint(&["fps", "L", "3"]);
        assert_eq!(url.as_str(), "http://localhost:8000/api/fps/L/3");
    }

    #[test]
    fn video_url_points_at_media_endpoint() {
        let api = LectureApi::new("http://host:8000").unwrap();
        assert_eq!(
            api.video_url("L", 2).as_deref(),
            Some("http://host:8000/video/L/2")
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert_matches!(LectureApi::new("not a url"), Err(ServiceError::InvalidUrl(_)));
        assert_matches!(LectureApi::new("mailto:me@example.com"), Err(ServiceError::InvalidUrl(_)));
    }

    #[test]
    fn status_error_display() {
        let err = ServiceError::Status {
            status: 404,
            body: "Layout data not found".into(),
        };
        assert_eq!(err.to_string(), "Lecture API error (404): Layout data not found");
    }

    #[test]
    fn associate_response_without_video_decodes() {
        let response: AssociateResponse =
            serde_json::from_str(r#"{"start_time": null, "video_id": null}"#).unwrap();
        assert!(response.video_id.is_none());
        assert_eq!(response.start_time, None);
    }
}
