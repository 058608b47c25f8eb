//! Background audio settings.
//!
//! Every field has a default so a partial JSON document is enough to override
//! a single value.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::components::{GestureKind, PlaybackError};

/// Settings for the page-wide background track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_source_uri")]
    pub source_uri: String,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default = "default_autoplay_delay_ms")]
    pub autoplay_delay_ms: u64,
    #[serde(default = "default_gesture_events")]
    pub gesture_events: Vec<String>,
}

fn default_source_uri() -> String {
    "/music/background-music.mp3".to_string()
}

fn default_mime_type() -> String {
    "audio/mpeg".to_string()
}

fn default_volume() -> f64 {
    0.1
}

fn default_autoplay_delay_ms() -> u64 {
    300
}

fn default_gesture_events() -> Vec<String> {
    GestureKind::ALL
        .iter()
        .map(|kind| kind.event_name().to_string())
        .collect()
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            source_uri: default_source_uri(),
            mime_type: default_mime_type(),
            volume: default_volume(),
            autoplay_delay_ms: default_autoplay_delay_ms(),
            gesture_events: default_gesture_events(),
        }
    }
}

fn normalize_volume(value: f64) -> f64 {
    if !value.is_finite() {
        return default_volume();
    }
    value.clamp(0.0, 1.0)
}

impl PlayerConfig {
    /// Parse overrides from JSON, normalizing the volume and checking that
    /// every gesture event is one the controller understands.
    pub fn from_json(raw: &str) -> Result<Self, PlaybackError> {
        let mut config: PlayerConfig =
            serde_json::from_str(raw).map_err(|e| PlaybackError::Config(e.to_string()))?;
        config.volume = normalize_volume(config.volume);
        config.gesture_kinds()?;
        Ok(config)
    }

    pub fn autoplay_delay(&self) -> Duration {
        Duration::from_millis(self.autoplay_delay_ms)
    }

    pub fn clamped_volume(&self) -> f64 {
        normalize_volume(self.volume)
    }

    /// Gesture kinds to subscribe to, deduplicated in configuration order.
    pub fn gesture_kinds(&self) -> Result<Vec<GestureKind>, PlaybackError> {
        let mut kinds = Vec::with_capacity(self.gesture_events.len());
        for name in &self.gesture_events {
            let kind = GestureKind::from_event_name(name).ok_or_else(|| {
                PlaybackError::Config(format!("unknown gesture event \"{name}\""))
            })?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Ok(kinds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_background_track() {
        let config = PlayerConfig::default();
        assert_eq!(config.source_uri, "/music/background-music.mp3");
        assert_eq!(config.mime_type, "audio/mpeg");
        assert_eq!(config.volume, 0.1);
        assert_eq!(config.autoplay_delay(), Duration::from_millis(300));
        assert_eq!(config.gesture_kinds().unwrap(), GestureKind::ALL.to_vec());
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config = PlayerConfig::from_json(r#"{ "autoplay_delay_ms": 50 }"#).unwrap();
        assert_eq!(config.autoplay_delay_ms, 50);
        assert_eq!(config.source_uri, "/music/background-music.mp3");
        assert_eq!(config.gesture_events.len(), 4);
    }

    #[test]
    fn volume_is_clamped_on_load() {
        let loud = PlayerConfig::from_json(r#"{ "volume": 4.0 }"#).unwrap();
        assert_eq!(loud.volume, 1.0);
        let negative = PlayerConfig::from_json(r#"{ "volume": -0.5 }"#).unwrap();
        assert_eq!(negative.volume, 0.0);
    }

    #[test]
    fn unknown_gesture_event_is_rejected() {
        let err = PlayerConfig::from_json(r#"{ "gesture_events": ["click", "hover"] }"#)
            .unwrap_err();
        assert!(matches!(err, PlaybackError::Config(msg) if msg.contains("hover")));
    }

    #[test]
    fn duplicate_gesture_events_collapse() {
        let config =
            PlayerConfig::from_json(r#"{ "gesture_events": ["click", "CLICK", "scroll"] }"#)
                .unwrap();
        assert_eq!(
            config.gesture_kinds().unwrap(),
            vec![GestureKind::Click, GestureKind::Scroll]
        );
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = PlayerConfig::from_json("{ volume: }").unwrap_err();
        assert!(matches!(err, PlaybackError::Config(_)));
    }
}
