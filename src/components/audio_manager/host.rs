// Seams between the autoplay controller and whatever runtime hosts it.
use std::fmt;
use std::time::Duration;

use futures_util::future::LocalBoxFuture;

use super::PlaybackError;

/// Global interaction events that count as a user gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Click,
    Scroll,
    TouchStart,
    KeyDown,
}

impl GestureKind {
    pub const ALL: [GestureKind; 4] = [
        GestureKind::Click,
        GestureKind::Scroll,
        GestureKind::TouchStart,
        GestureKind::KeyDown,
    ];

    /// DOM event name used when registering the listener.
    pub fn event_name(self) -> &'static str {
        match self {
            GestureKind::Click => "click",
            GestureKind::Scroll => "scroll",
            GestureKind::TouchStart => "touchstart",
            GestureKind::KeyDown => "keydown",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.event_name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// The single audio resource the controller drives.
///
/// `request_play` is the only suspending call; the returned future resolves
/// once the host policy has accepted or rejected playback.
pub trait MediaElement {
    fn set_source(&self, uri: &str, mime_type: &str);
    fn set_volume(&self, volume: f64);
    fn set_muted(&self, muted: bool);
    fn set_looping(&self, looping: bool);
    fn request_play(&self) -> LocalBoxFuture<'static, Result<(), PlaybackError>>;
    fn request_pause(&self);
}

/// A scheduled one-shot task. Dropping the handle cancels it.
pub trait TimerHandle {}

/// A registered event listener. Dropping the handle deregisters it.
pub trait ListenerHandle {}

/// Timer, event subscription, and task spawning capabilities of the host.
pub trait AudioHost {
    fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Box<dyn TimerHandle>;

    fn listen(
        &self,
        kind: GestureKind,
        handler: Box<dyn Fn()>,
    ) -> Result<Box<dyn ListenerHandle>, PlaybackError>;

    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_round_trip_for_every_kind() {
        for kind in GestureKind::ALL {
            assert_eq!(GestureKind::from_event_name(kind.event_name()), Some(kind));
        }
    }

    #[test]
    fn event_name_lookup_is_lenient_about_case_and_whitespace() {
        assert_eq!(
            GestureKind::from_event_name(" KeyDown "),
            Some(GestureKind::KeyDown)
        );
        assert_eq!(GestureKind::from_event_name("pointermove"), None);
    }
}
