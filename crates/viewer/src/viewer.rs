//! The playback event dispatcher.
//!
//! [`Viewer`] owns every piece of per-session state (frame table, overlay,
//! hovered box, explanation slot, navigator) and is driven by the host
//! through a handful of entry points: [`on_pause`](Viewer::on_pause),
//! [`on_play`](Viewer::on_play), [`on_metadata_ready`](Viewer::on_metadata_ready),
//! [`select_video`](Viewer::select_video),
//! [`request_explanation`](Viewer::request_explanation),
//! [`handle_show_context`](Viewer::handle_show_context) and
//! [`on_return_requested`](Viewer::on_return_requested).
//!
//! Remote calls are split into prepare / fetch / apply phases. A prepared
//! request remembers the active video, the load epoch and (for layouts) the
//! playback token it was issued under; applying it after any of those moved
//! on yields [`ViewerError::Superseded`] and leaves state untouched.

use serde::Serialize;
use tokio::sync::broadcast;

use mentor_core::explanation::{ExplanationCache, ExplanationRecord};
use mentor_core::frames::{sanitize_fps, FrameTable, DEFAULT_FPS};
use mentor_core::navigation::{NavState, NavigationContext, Navigator, PendingSeek, PlayerCommand};
use mentor_core::transform::to_display_space;
use mentor_core::types::{
    AnnotationBox, BoxCoordinate, BoxId, FrameIndex, FrameMeta, VideoEntry, VideoId,
};
use mentor_services::{LectureService, ServiceError};

use crate::error::ViewerError;
use crate::events::{EventBus, ViewerEvent};
use crate::media::MediaPlayer;

/// Boxes currently drawn over the paused video, in displayed pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub video_id: VideoId,
    pub frame_index: FrameIndex,
    pub boxes: Vec<AnnotationBox>,
}

impl Overlay {
    pub fn get(&self, box_id: BoxId) -> Option<&AnnotationBox> {
        self.boxes.iter().find(|b| b.box_id == box_id)
    }
}

/// A metadata load issued for the active video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetadataRequest {
    pub video_id: VideoId,
    epoch: u64,
}

/// A layout fetch issued for the frame resolved at pause time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRequest {
    pub video_id: VideoId,
    pub frame_index: FrameIndex,
    source_width: u32,
    epoch: u64,
    playback_token: u64,
}

/// Raw results of a metadata load, before they are applied.
#[derive(Debug)]
pub struct MetadataResponse {
    pub fps: Result<Option<f64>, ServiceError>,
    pub frames: Result<Vec<FrameMeta>, ServiceError>,
}

/// Point-in-time view of the viewer, for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerSnapshot {
    pub lecture: String,
    pub active_video: VideoId,
    pub nav_state: NavState,
    pub fps: f64,
    pub annotated_frames: usize,
    pub overlay: Option<Overlay>,
    pub hovered_box: Option<BoxId>,
    pub explanation: Option<String>,
    pub panel_visible: bool,
    pub return_visible: bool,
    pub pending_seek: Option<PendingSeek>,
    pub context: Option<NavigationContext>,
}

/// Session state of one lecture viewer bound to a service and a player.
pub struct Viewer<S, P> {
    service: S,
    player: P,
    lecture: String,
    default_fps: f64,
    videos: Vec<VideoEntry>,
    navigator: Navigator,
    explanations: ExplanationCache,
    fps: f64,
    frames: FrameTable,
    overlay: Option<Overlay>,
    hovered: Option<BoxId>,
    /// Bumped on every active-video change.
    epoch: u64,
    /// Bumped on every pause and play.
    playback_token: u64,
    events: EventBus,
}

impl<S: LectureService, P: MediaPlayer> Viewer<S, P> {
    /// Create a viewer with `initial_video` active. Nothing is loaded until
    /// [`start`](Self::start) is called.
    pub fn new(
        service: S,
        player: P,
        lecture: impl Into<String>,
        initial_video: VideoId,
        default_fps: f64,
    ) -> Self {
        let default_fps = sanitize_fps(Some(default_fps), DEFAULT_FPS);
        Self {
            service,
            player,
            lecture: lecture.into(),
            default_fps,
            videos: Vec::new(),
            navigator: Navigator::new(initial_video),
            explanations: ExplanationCache::new(),
            fps: default_fps,
            frames: FrameTable::default(),
            overlay: None,
            hovered: None,
            epoch: 0,
            playback_token: 0,
            events: EventBus::default(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewerEvent> {
        self.events.subscribe()
    }

    /// Load the video list and the initially active video.
    ///
    /// Failures are logged; the viewer stays usable with whatever loaded.
    pub async fn start(&mut self) {
        let _ = self.load_video_list().await;
        let video_id = self.navigator.active_video();
        let _ = self.switch_source(video_id).await;
    }

    // -- accessors ----------------------------------------------------------

    pub fn lecture(&self) -> &str {
        &self.lecture
    }

    pub fn active_video(&self) -> VideoId {
        self.navigator.active_video()
    }

    pub fn nav_state(&self) -> NavState {
        self.navigator.state()
    }

    pub fn videos(&self) -> &[VideoEntry] {
        &self.videos
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn hovered_box(&self) -> Option<BoxId> {
        self.hovered
    }

    pub fn explanation_text(&self) -> Option<&str> {
        self.explanations.text()
    }

    pub fn panel_visible(&self) -> bool {
        self.explanations.panel_visible()
    }

    pub fn return_visible(&self) -> bool {
        self.navigator.return_armed()
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Mutable access to the player, for hosts that drive it directly.
    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        ViewerSnapshot {
            lecture: self.lecture.clone(),
            active_video: self.active_video(),
            nav_state: self.nav_state(),
            fps: self.fps,
            annotated_frames: self.frames.len(),
            overlay: self.overlay.clone(),
            hovered_box: self.hovered,
            explanation: self.explanations.text().map(str::to_owned),
            panel_visible: self.panel_visible(),
            return_visible: self.return_visible(),
            pending_seek: self.navigator.pending_seek().copied(),
            context: self.navigator.context().copied(),
        }
    }

    // -- video list ---------------------------------------------------------

    /// Fetch the sidebar list of the lecture's videos.
    pub async fn load_video_list(&mut self) -> Result<(), ViewerError> {
        match self.service.get_video_list(&self.lecture).await {
            Ok(videos) => {
                tracing::info!(lecture = %self.lecture, count = videos.len(), "Video list loaded");
                self.videos = videos;
                self.events.publish(ViewerEvent::VideoListLoaded {
                    videos: self.videos.clone(),
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(lecture = %self.lecture, error = %e, "Failed to load video list");
                Err(ViewerError::MetadataFetch(e))
            }
        }
    }

    // -- metadata -----------------------------------------------------------

    /// Forget the previous video's metadata and issue a load for the active
    /// one. Pauses resolve to `NoFramesAvailable` until it is applied.
    pub fn prepare_metadata_load(&mut self) -> MetadataRequest {
        self.epoch += 1;
        self.fps = self.default_fps;
        self.frames = FrameTable::default();
        self.clear_overlay();
        MetadataRequest {
            video_id: self.navigator.active_video(),
            epoch: self.epoch,
        }
    }

    /// Fetch frame rate and frame metadata for a prepared load.
    pub async fn fetch_metadata(&self, request: &MetadataRequest) -> MetadataResponse {
        let (fps, frames) = tokio::join!(
            self.service.get_frame_rate(&self.lecture, request.video_id),
            self.service.get_frame_metadata(&self.lecture, request.video_id),
        );
        MetadataResponse { fps, frames }
    }

    /// Install fetched metadata if the request still targets the active load.
    ///
    /// A failed or unusable frame rate falls back to the default. A failed
    /// frame-metadata call leaves the table empty and is reported.
    pub fn apply_metadata(
        &mut self,
        request: MetadataRequest,
        response: MetadataResponse,
    ) -> Result<(), ViewerError> {
        if request.epoch != self.epoch || request.video_id != self.navigator.active_video() {
            tracing::debug!(video_id = request.video_id, "Discarding superseded metadata");
            return Err(ViewerError::Superseded);
        }

        self.fps = match response.fps {
            Ok(fps) => sanitize_fps(fps, self.default_fps),
            Err(e) => {
                tracing::warn!(
                    video_id = request.video_id,
                    error = %e,
                    "Failed to fetch frame rate, using default",
                );
                self.default_fps
            }
        };

        let outcome = match response.frames {
            Ok(frames) => {
                self.frames = FrameTable::new(frames);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    video_id = request.video_id,
                    error = %e,
                    "Failed to fetch frame metadata",
                );
                Err(ViewerError::MetadataFetch(e))
            }
        };

        tracing::info!(
            video_id = request.video_id,
            fps = self.fps,
            annotated_frames = self.frames.len(),
            "Video metadata loaded",
        );
        self.events.publish(ViewerEvent::MetadataLoaded {
            video_id: request.video_id,
            fps: self.fps,
            annotated_frames: self.frames.len(),
        });
        outcome
    }

    /// Prepare, fetch and apply a metadata load for the active video.
    pub async fn load_metadata(&mut self) -> Result<(), ViewerError> {
        let request = self.prepare_metadata_load();
        let response = self.fetch_metadata(&request).await;
        self.apply_metadata(request, response)
    }

    /// The host reports that the loaded video can be seeked.
    pub fn on_metadata_ready(&mut self) {
        let video_id = self.navigator.active_video();
        if let Some(command) = self.navigator.metadata_ready(video_id) {
            self.seek_and_play(command);
        }
    }

    // -- playback -----------------------------------------------------------

    /// Resolve the paused frame and issue a layout fetch for it.
    ///
    /// Fails with `NoFramesAvailable`, without any network call, when the
    /// active video has no annotated frames.
    pub fn prepare_layout(&mut self) -> Result<LayoutRequest, ViewerError> {
        self.playback_token += 1;
        let time = self.player.current_time();
        let frame = match self.frames.resolve(time, self.fps) {
            Ok(frame) => *frame,
            Err(_) => {
                tracing::debug!(
                    video_id = self.navigator.active_video(),
                    time,
                    "No annotated frames to resolve pause against",
                );
                return Err(ViewerError::NoFramesAvailable);
            }
        };
        Ok(LayoutRequest {
            video_id: self.navigator.active_video(),
            frame_index: frame.frame_index,
            source_width: frame.width,
            epoch: self.epoch,
            playback_token: self.playback_token,
        })
    }

    pub async fn fetch_layout(
        &self,
        request: &LayoutRequest,
    ) -> Result<Vec<AnnotationBox>, ServiceError> {
        self.service
            .get_annotations(&self.lecture, request.video_id, request.frame_index)
            .await
    }

    /// Transform fetched boxes to the currently displayed size and publish
    /// them, unless playback or the active video moved on meanwhile.
    pub fn apply_layout(
        &mut self,
        request: LayoutRequest,
        result: Result<Vec<AnnotationBox>, ServiceError>,
    ) -> Result<(), ViewerError> {
        if request.epoch != self.epoch
            || request.playback_token != self.playback_token
            || request.video_id != self.navigator.active_video()
        {
            tracing::debug!(
                video_id = request.video_id,
                frame_index = request.frame_index,
                "Discarding superseded layout",
            );
            return Err(ViewerError::Superseded);
        }

        let boxes = result.map_err(|e| {
            tracing::warn!(
                video_id = request.video_id,
                frame_index = request.frame_index,
                error = %e,
                "Failed to fetch annotations",
            );
            ViewerError::AnnotationFetch(e)
        })?;

        let boxes: Vec<AnnotationBox> = boxes
            .into_iter()
            .filter(|b| match b.coordinate.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(box_id = b.box_id, error = %e, "Dropping malformed box");
                    false
                }
            })
            .collect();

        let displayed = self.player.displayed_size();
        let boxes = to_display_space(&boxes, Some(request.source_width), displayed)
            .map_err(|e| {
                tracing::warn!(error = %e, "Cannot scale layout to displayed size");
                ViewerError::InvalidLayout(e)
            })?;

        let overlay = Overlay {
            video_id: request.video_id,
            frame_index: request.frame_index,
            boxes,
        };
        self.events.publish(ViewerEvent::OverlayPublished {
            video_id: overlay.video_id,
            frame_index: overlay.frame_index,
            boxes: overlay.boxes.clone(),
        });
        if let Some(hovered) = self.hovered {
            if overlay.get(hovered).is_none() {
                self.hovered = None;
                self.events
                    .publish(ViewerEvent::HoverChanged { box_id: None });
            }
        }
        self.overlay = Some(overlay);
        Ok(())
    }

    /// Playback paused: publish the overlay of the resolved frame.
    pub async fn on_pause(&mut self) -> Result<(), ViewerError> {
        let request = self.prepare_layout()?;
        let result = self.fetch_layout(&request).await;
        self.apply_layout(request, result)
    }

    /// Playback started: the overlay and hover must disappear.
    pub fn on_play(&mut self) {
        self.playback_token += 1;
        self.clear_overlay();
        self.navigator.playback_started();
    }

    /// Set or clear the hovered box. Only boxes of the published overlay
    /// can be hovered; returns whether the selection changed.
    pub fn hover_box(&mut self, box_id: Option<BoxId>) -> bool {
        let next = match (box_id, &self.overlay) {
            (Some(id), Some(overlay)) if overlay.get(id).is_some() => Some(id),
            (Some(id), _) => {
                tracing::debug!(box_id = id, "Ignoring hover outside the published overlay");
                return false;
            }
            (None, _) => None,
        };
        if next == self.hovered {
            return false;
        }
        self.hovered = next;
        self.events
            .publish(ViewerEvent::HoverChanged { box_id: next });
        true
    }

    // -- explanations -------------------------------------------------------

    /// Explanation text for a box, fetched at most once per coordinate.
    ///
    /// `want_panel` opens a hidden mentor panel; an open panel stays open
    /// either way. On failure nothing changes.
    pub async fn request_explanation(
        &mut self,
        box_id: BoxId,
        coordinate: BoxCoordinate,
        want_panel: bool,
    ) -> Result<String, ViewerError> {
        let record = self.ensure_explanation(box_id, coordinate).await?;
        self.explanations.request_panel(want_panel);
        self.events.publish(ViewerEvent::ExplanationUpdated {
            box_id,
            text: record.text.clone(),
            panel_visible: self.explanations.panel_visible(),
        });
        Ok(record.text)
    }

    /// Close the mentor panel and forget its explanation.
    pub fn dismiss_explanation(&mut self) {
        self.explanations.dismiss();
        self.events.publish(ViewerEvent::ExplanationDismissed);
    }

    async fn ensure_explanation(
        &mut self,
        box_id: BoxId,
        coordinate: BoxCoordinate,
    ) -> Result<ExplanationRecord, ViewerError> {
        if let Some(record) = self.explanations.lookup(&coordinate) {
            tracing::debug!(box_id, "Explanation served from cache");
            return Ok(record.clone());
        }

        let video_id = self.navigator.active_video();
        let frame_index = self.explanation_frame(video_id)?;
        let epoch = self.epoch;

        let explanation = self
            .service
            .get_explanation(&self.lecture, video_id, frame_index, box_id)
            .await
            .map_err(|e| {
                tracing::warn!(video_id, frame_index, box_id, error = %e, "Failed to fetch explanation");
                ViewerError::ExplanationFetch(e)
            })?;

        if epoch != self.epoch {
            tracing::debug!(box_id, "Discarding superseded explanation");
            return Err(ViewerError::Superseded);
        }
        Ok(self.explanations.store(coordinate, explanation).clone())
    }

    /// Frame a box belongs to: the published overlay's frame, else the
    /// frame resolved at the current playback position.
    fn explanation_frame(&self, video_id: VideoId) -> Result<FrameIndex, ViewerError> {
        if let Some(overlay) = self.overlay.as_ref().filter(|o| o.video_id == video_id) {
            return Ok(overlay.frame_index);
        }
        let frame = self.frames.resolve(self.player.current_time(), self.fps)?;
        Ok(frame.frame_index)
    }

    // -- navigation ---------------------------------------------------------

    /// Jump to the earlier lecture moment that best explains a box, and arm
    /// the return affordance.
    ///
    /// The explanation is fetched if not cached but the panel is never
    /// opened by this call. An error means no jump and no new context;
    /// once the jump is committed a failed metadata load of the target
    /// is only logged and the call succeeds.
    pub async fn handle_show_context(
        &mut self,
        box_id: BoxId,
        coordinate: BoxCoordinate,
        timestamp: f64,
    ) -> Result<(), ViewerError> {
        let record = self.ensure_explanation(box_id, coordinate).await?;
        self.explanations.request_panel(false);
        if self.explanations.panel_visible() {
            self.events.publish(ViewerEvent::ExplanationUpdated {
                box_id,
                text: record.text.clone(),
                panel_visible: self.explanations.panel_visible(),
            });
        }

        let origin = self.navigator.active_video();
        let epoch = self.epoch;
        let association = self
            .service
            .associate_context(&self.lecture, origin, timestamp, &record.embedding)
            .await
            .map_err(|e| {
                tracing::warn!(video_id = origin, timestamp, error = %e, "Failed to associate context");
                ViewerError::AssociationFetch(e)
            })?;

        if epoch != self.epoch {
            tracing::debug!(box_id, "Discarding superseded association");
            return Err(ViewerError::Superseded);
        }

        tracing::info!(
            from_video = origin,
            from_time = timestamp,
            to_video = association.video_id,
            to_time = association.start_time,
            label = %association.label,
            "Jumping to related context",
        );
        self.navigator.record_origin(origin, timestamp);
        let command = self.navigator.jump_to(
            association.video_id,
            association.start_time,
            self.player.has_metadata(),
        );
        if let Err(e) = self.run_command(command).await {
            tracing::warn!(
                video_id = association.video_id,
                error = %e,
                "Jumped to related context with degraded metadata",
            );
        }
        self.events
            .publish(ViewerEvent::ReturnAffordance { visible: true });
        Ok(())
    }

    /// Go back to a little before where the last context jump began.
    pub async fn on_return_requested(&mut self) -> Result<(), ViewerError> {
        let command = self.navigator.request_return(self.player.has_metadata());
        self.events
            .publish(ViewerEvent::ReturnAffordance { visible: false });
        self.run_command(command).await
    }

    /// Direct selection from the video list. Cancels any pending seek and
    /// drops the return context. Selecting the active video does nothing.
    pub async fn select_video(&mut self, video_id: VideoId) -> Result<(), ViewerError> {
        let was_armed = self.navigator.return_armed();
        let command = self.navigator.select_video(video_id);
        if command.is_none() {
            return Ok(());
        }
        if was_armed {
            tracing::debug!(video_id, "Return context dropped by video selection");
            self.events
                .publish(ViewerEvent::ReturnAffordance { visible: false });
        }
        self.run_command(command).await
    }

    async fn run_command(&mut self, command: Option<PlayerCommand>) -> Result<(), ViewerError> {
        match command {
            None => Ok(()),
            Some(PlayerCommand::Load { video_id }) => {
                let outcome = self.switch_source(video_id).await;
                if self.player.has_metadata() {
                    self.on_metadata_ready();
                }
                outcome
            }
            Some(seek) => {
                self.seek_and_play(seek);
                Ok(())
            }
        }
    }

    /// Point the player at `video_id` and reload its metadata.
    async fn switch_source(&mut self, video_id: VideoId) -> Result<(), ViewerError> {
        let source = self.service.video_url(&self.lecture, video_id);
        self.player.load(video_id, source.as_deref());
        tracing::info!(video_id, "Video selected");
        self.events.publish(ViewerEvent::VideoSelected { video_id, source });
        self.load_metadata().await
    }

    fn seek_and_play(&mut self, command: PlayerCommand) {
        if let PlayerCommand::SeekAndPlay {
            video_id,
            timestamp,
        } = command
        {
            self.player.seek(timestamp);
            self.player.play();
            self.events
                .publish(ViewerEvent::SeekApplied { video_id, timestamp });
            self.on_play();
        }
    }

    fn clear_overlay(&mut self) {
        if self.overlay.take().is_some() {
            self.events.publish(ViewerEvent::OverlayCleared);
        }
        if self.hovered.take().is_some() {
            self.events
                .publish(ViewerEvent::HoverChanged { box_id: None });
        }
    }
}
