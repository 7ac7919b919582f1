use std::path::PathBuf;

use mentor_core::frames::DEFAULT_FPS;
use mentor_core::types::VideoId;

/// Lecture shown when `LECTURE_NAME` is not set.
pub const DEFAULT_LECTURE: &str = "Introduction to Artificial Intelligence 2021";

/// A configuration variable holds a value that cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("{var} must be {expected}, got {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub expected: &'static str,
    pub value: String,
}

/// Viewer configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local lecture backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Base URL of the lecture backend (default: `http://localhost:8000`).
    pub api_url: String,
    /// Offline catalog; when set, no HTTP calls are made.
    pub catalog_path: Option<PathBuf>,
    pub lecture: String,
    pub initial_video: VideoId,
    /// Frame rate used when the backend reports none (default: `25`).
    pub default_fps: f64,
    /// HTTP request timeout in seconds (default: `10`).
    pub request_timeout_secs: u64,
    pub display_width: f64,
    pub display_height: f64,
    /// Wait for an explicit `ready` command after each load.
    pub manual_ready: bool,
}

impl ViewerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                       |
    /// |------------------------|-----------------------------------------------|
    /// | `MENTOR_API_URL`       | `http://localhost:8000`                       |
    /// | `MENTOR_CATALOG_PATH`  | unset                                         |
    /// | `LECTURE_NAME`         | `Introduction to Artificial Intelligence 2021`|
    /// | `INITIAL_VIDEO_ID`     | `0`                                           |
    /// | `DEFAULT_FPS`          | `25`                                          |
    /// | `REQUEST_TIMEOUT_SECS` | `10`                                          |
    /// | `DISPLAY_WIDTH`        | `640`                                         |
    /// | `DISPLAY_HEIGHT`       | `360`                                         |
    /// | `MENTOR_MANUAL_READY`  | `0`                                           |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("MENTOR_API_URL").unwrap_or_else(|| "http://localhost:8000".into());

        let catalog_path = lookup("MENTOR_CATALOG_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let lecture = lookup("LECTURE_NAME").unwrap_or_else(|| DEFAULT_LECTURE.into());

        let initial_video: VideoId =
            parse_var(&lookup, "INITIAL_VIDEO_ID", "an integer video id", 0)?;

        let default_fps: f64 =
            parse_var(&lookup, "DEFAULT_FPS", "a positive number", DEFAULT_FPS)?;
        if !(default_fps.is_finite() && default_fps > 0.0) {
            return Err(invalid("DEFAULT_FPS", "a positive number", default_fps));
        }

        let request_timeout_secs: u64 =
            parse_var(&lookup, "REQUEST_TIMEOUT_SECS", "a valid u64", 10)?;

        let display_width: f64 = parse_var(&lookup, "DISPLAY_WIDTH", "a positive number", 640.0)?;
        if !(display_width.is_finite() && display_width > 0.0) {
            return Err(invalid("DISPLAY_WIDTH", "a positive number", display_width));
        }
        let display_height: f64 =
            parse_var(&lookup, "DISPLAY_HEIGHT", "a positive number", 360.0)?;

        let manual_ready = match lookup("MENTOR_MANUAL_READY").as_deref().map(str::trim) {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => return Err(invalid("MENTOR_MANUAL_READY", "0 or 1", other)),
        };

        Ok(Self {
            api_url,
            catalog_path,
            lecture,
            initial_video,
            default_fps,
            request_timeout_secs,
            display_width,
            display_height,
            manual_ready,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError {
            var,
            expected,
            value: raw,
        }),
    }
}

fn invalid(var: &'static str, expected: &'static str, value: impl ToString) -> ConfigError {
    ConfigError {
        var,
        expected,
        value: value.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<ViewerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ViewerConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.catalog_path, None);
        assert_eq!(config.lecture, DEFAULT_LECTURE);
        assert_eq!(config.initial_video, 0);
        assert_eq!(config.default_fps, 25.0);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.display_width, 640.0);
        assert_eq!(config.display_height, 360.0);
        assert!(!config.manual_ready);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("MENTOR_CATALOG_PATH", "/data/catalog.json"),
            ("INITIAL_VIDEO_ID", " 3 "),
            ("DEFAULT_FPS", "30"),
            ("MENTOR_MANUAL_READY", "1"),
        ])
        .unwrap();
        assert_eq!(config.catalog_path, Some(PathBuf::from("/data/catalog.json")));
        assert_eq!(config.initial_video, 3);
        assert_eq!(config.default_fps, 30.0);
        assert!(config.manual_ready);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config_from(&[("INITIAL_VIDEO_ID", "first")]).unwrap_err();
        assert_eq!(err.var, "INITIAL_VIDEO_ID");
        assert_eq!(err.value, "first");

        let err = config_from(&[("DEFAULT_FPS", "0")]).unwrap_err();
        assert_eq!(err.var, "DEFAULT_FPS");

        let err = config_from(&[("MENTOR_MANUAL_READY", "maybe")]).unwrap_err();
        assert_eq!(err.var, "MENTOR_MANUAL_READY");
    }
}
