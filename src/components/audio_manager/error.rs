use thiserror::Error;

/// Failures raised while driving the background track.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The host refused to start playback without a user gesture.
    #[error("autoplay blocked by host policy: {0}")]
    PolicyRejected(String),

    #[error("playback failed: {0}")]
    PlayFailed(String),

    #[error("audio resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("failed to register gesture listener: {0}")]
    ListenerRegistration(String),

    #[error("invalid player configuration: {0}")]
    Config(String),
}

impl PlaybackError {
    pub fn is_policy_rejection(&self) -> bool {
        matches!(self, PlaybackError::PolicyRejected(_))
    }

    /// Classify a rejected `play()` promise by its DOMException name.
    pub fn from_play_rejection(name: &str, message: &str) -> Self {
        let detail = if message.trim().is_empty() {
            name.to_string()
        } else {
            format!("{name}: {message}")
        };
        match name {
            "NotAllowedError" => PlaybackError::PolicyRejected(detail),
            "NotSupportedError" => PlaybackError::ResourceUnavailable(detail),
            _ => PlaybackError::PlayFailed(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_allowed_is_a_policy_rejection() {
        let err = PlaybackError::from_play_rejection("NotAllowedError", "user didn't interact");
        assert!(err.is_policy_rejection());
        assert_eq!(
            err.to_string(),
            "autoplay blocked by host policy: NotAllowedError: user didn't interact"
        );
    }

    #[test]
    fn other_rejections_are_not_policy() {
        let missing = PlaybackError::from_play_rejection("NotSupportedError", "");
        assert_eq!(
            missing,
            PlaybackError::ResourceUnavailable("NotSupportedError".to_string())
        );
        let aborted = PlaybackError::from_play_rejection("AbortError", "interrupted");
        assert!(!aborted.is_policy_rejection());
        assert!(matches!(aborted, PlaybackError::PlayFailed(_)));
    }
}
