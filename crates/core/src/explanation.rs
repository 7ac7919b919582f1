//! Single-slot explanation cache and mentor-panel visibility rule.
//!
//! At most one [`ExplanationRecord`] is live. It is keyed by the exact box
//! coordinate because coordinates are stable per annotated region while
//! the frame index and playback time are not.

use serde::Serialize;

use crate::types::{BoxCoordinate, Explanation};

/// The most recently fetched explanation and the region it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplanationRecord {
    pub box_coordinate: BoxCoordinate,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Owner of the live explanation record and the panel visibility flag.
#[derive(Debug, Default)]
pub struct ExplanationCache {
    record: Option<ExplanationRecord>,
    panel_visible: bool,
}

impl ExplanationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached record, if it belongs to exactly this coordinate.
    pub fn lookup(&self, coordinate: &BoxCoordinate) -> Option<&ExplanationRecord> {
        self.record
            .as_ref()
            .filter(|r| r.box_coordinate == *coordinate)
    }

    /// Replace the live record (last write wins).
    pub fn store(&mut self, coordinate: BoxCoordinate, explanation: Explanation) -> &ExplanationRecord {
        self.record.insert(ExplanationRecord {
            box_coordinate: coordinate,
            text: explanation.text,
            embedding: explanation.embedding,
        })
    }

    /// Apply a caller's wish to see the panel.
    ///
    /// A visible panel stays visible regardless of `want_panel`; a hidden
    /// panel takes exactly the requested value. Returns whether the flag
    /// changed.
    pub fn request_panel(&mut self, want_panel: bool) -> bool {
        if self.panel_visible {
            return false;
        }
        self.panel_visible = want_panel;
        want_panel
    }

    /// Close the panel and forget the record.
    pub fn dismiss(&mut self) {
        self.record = None;
        self.panel_visible = false;
    }

    pub fn record(&self) -> Option<&ExplanationRecord> {
        self.record.as_ref()
    }

    pub fn text(&self) -> Option<&str> {
        self.record.as_ref().map(|r| r.text.as_str())
    }

    /// Whether the panel is shown; it never shows without a record.
    pub fn panel_visible(&self) -> bool {
        self.panel_visible && self.record.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn explanation(text: &str) -> Explanation {
        Explanation {
            text: text.into(),
            embedding: vec![0.1, 0.2],
        }
    }

    #[test]
    fn lookup_hits_only_on_exact_coordinate() {
        let mut cache = ExplanationCache::new();
        let coord = BoxCoordinate::new(1.0, 2.0, 3.0, 4.0);
        cache.store(coord, explanation("a"));

        assert_eq!(cache.lookup(&coord).map(|r| r.text.as_str()), Some("a"));
        assert!(cache.lookup(&BoxCoordinate::new(1.0, 2.0, 3.0, 4.000001)).is_none());
    }

    #[test]
    fn store_replaces_previous_record() {
        let mut cache = ExplanationCache::new();
        let first = BoxCoordinate::new(0.0, 0.0, 1.0, 1.0);
        let second = BoxCoordinate::new(5.0, 5.0, 9.0, 9.0);
        cache.store(first, explanation("first"));
        cache.store(second, explanation("second"));

        assert!(cache.lookup(&first).is_none());
        assert_eq!(cache.text(), Some("second"));
    }

    #[test]
    fn hidden_panel_takes_requested_value() {
        let mut cache = ExplanationCache::new();
        cache.store(BoxCoordinate::new(0.0, 0.0, 1.0, 1.0), explanation("x"));

        assert!(!cache.request_panel(false));
        assert!(!cache.panel_visible());
        assert!(cache.request_panel(true));
        assert!(cache.panel_visible());
    }

    #[test]
    fn visible_panel_is_left_open() {
        let mut cache = ExplanationCache::new();
        cache.store(BoxCoordinate::new(0.0, 0.0, 1.0, 1.0), explanation("x"));
        cache.request_panel(true);

        assert!(!cache.request_panel(false));
        assert!(cache.panel_visible());
    }

    #[test]
    fn dismiss_clears_record_and_panel() {
        let mut cache = ExplanationCache::new();
        let coord = BoxCoordinate::new(0.0, 0.0, 1.0, 1.0);
        cache.store(coord, explanation("x"));
        cache.request_panel(true);
        cache.dismiss();

        assert!(cache.lookup(&coord).is_none());
        assert!(!cache.panel_visible());
        assert!(cache.text().is_none());
    }

    #[test]
    fn panel_never_visible_without_record() {
        let mut cache = ExplanationCache::new();
        cache.request_panel(true);
        assert!(!cache.panel_visible());
    }
}
