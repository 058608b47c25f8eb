// Autoplay controller: starts the background track despite autoplay policy,
// falling back from a deferred attempt to the first user gesture to the
// manual controls, and releases every timer and listener once resolved.
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::host::{AudioHost, GestureKind, ListenerHandle, MediaElement, TimerHandle};
use dioxus::logger::tracing;

use super::PlaybackError;
use crate::config::PlayerConfig;

/// What the presentation layer renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioStatus {
    pub playing: bool,
    pub muted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayPhase {
    Idle,
    AttemptingAutoplay,
    AwaitingGesture,
    /// Resolved: no automatic or gesture machinery remains active.
    Armed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayTrigger {
    Timer,
    Gesture(GestureKind),
    Manual,
}

impl PlayTrigger {
    fn is_automatic(self) -> bool {
        !matches!(self, PlayTrigger::Manual)
    }
}

#[derive(Debug, Clone, Copy)]
struct PlayRequest {
    id: u64,
    trigger: PlayTrigger,
    /// Status to restore if a manual request fails.
    restore: AudioStatus,
    play_generation: u64,
    mute_generation: u64,
    /// A pause was issued against this request; the host will abort it.
    aborted: bool,
}

/// Side effects to apply once the state borrow is released.
#[derive(Debug, Default)]
struct Completion {
    release_triggers: bool,
    notify: bool,
    sync_muted: Option<bool>,
    pause_again: bool,
}

#[derive(Debug)]
struct ControllerState {
    status: AudioStatus,
    autoplay_resolved: bool,
    phase: AutoplayPhase,
    in_flight: Option<PlayRequest>,
    // Bumped on every manual play/pause or mute change so a late failure of a
    // superseded request never overrides a newer choice.
    play_generation: u64,
    mute_generation: u64,
    next_request_id: u64,
    mounted: bool,
    torn_down: bool,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            status: AudioStatus::default(),
            autoplay_resolved: false,
            phase: AutoplayPhase::Idle,
            in_flight: None,
            play_generation: 0,
            mute_generation: 0,
            next_request_id: 1,
            mounted: false,
            torn_down: false,
        }
    }
}

type StatusObserver = Box<dyn Fn(AudioStatus)>;

pub struct AutoplayController {
    config: PlayerConfig,
    gesture_kinds: Vec<GestureKind>,
    media: Box<dyn MediaElement>,
    host: Box<dyn AudioHost>,
    state: RefCell<ControllerState>,
    timer: RefCell<Option<Box<dyn TimerHandle>>>,
    timer_pending: Cell<bool>,
    listeners: RefCell<Vec<(GestureKind, Box<dyn ListenerHandle>)>>,
    observers: RefCell<Vec<StatusObserver>>,
    self_ref: Weak<AutoplayController>,
}

impl AutoplayController {
    /// Take ownership of the audio resource and prime it: source, loop,
    /// low volume, unmuted. Nothing is scheduled until [`mount`](Self::mount).
    pub fn new(
        config: PlayerConfig,
        media: Box<dyn MediaElement>,
        host: Box<dyn AudioHost>,
    ) -> Rc<Self> {
        let gesture_kinds = config.gesture_kinds().unwrap_or_else(|err| {
            tracing::warn!("{err}; listening for every gesture kind instead");
            GestureKind::ALL.to_vec()
        });

        media.set_source(&config.source_uri, &config.mime_type);
        media.set_looping(true);
        media.set_volume(config.clamped_volume());
        media.set_muted(false);

        Rc::new_cyclic(|self_ref| Self {
            config,
            gesture_kinds,
            media,
            host,
            state: RefCell::new(ControllerState::default()),
            timer: RefCell::new(None),
            timer_pending: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
            self_ref: self_ref.clone(),
        })
    }

    /// Schedule the deferred autoplay attempt and subscribe to the gesture
    /// events in parallel. Mounting twice is a no-op.
    pub fn mount(&self) -> Result<(), PlaybackError> {
        {
            let mut state = self.state.borrow_mut();
            if state.torn_down {
                return Err(PlaybackError::ResourceUnavailable(
                    "controller already torn down".to_string(),
                ));
            }
            if state.mounted {
                return Ok(());
            }
            state.mounted = true;
        }

        let weak = self.self_ref.clone();
        let timer = self.host.schedule_once(
            self.config.autoplay_delay(),
            Box::new(move || {
                if let Some(controller) = weak.upgrade() {
                    controller.on_autoplay_timer();
                }
            }),
        );
        *self.timer.borrow_mut() = Some(timer);
        self.timer_pending.set(true);

        let mut registered = Vec::with_capacity(self.gesture_kinds.len());
        for &kind in &self.gesture_kinds {
            let weak = self.self_ref.clone();
            let handler = Box::new(move || {
                if let Some(controller) = weak.upgrade() {
                    controller.on_gesture(kind);
                }
            });
            match self.host.listen(kind, handler) {
                Ok(handle) => registered.push((kind, handle)),
                Err(err) => tracing::warn!("skipping {kind} gesture fallback: {err}"),
            }
        }
        tracing::debug!(
            "autoplay scheduled in {}ms, {} gesture listeners registered",
            self.config.autoplay_delay_ms,
            registered.len()
        );
        *self.listeners.borrow_mut() = registered;
        Ok(())
    }

    /// Deferred attempt fired by the mount timer.
    pub fn on_autoplay_timer(&self) {
        // The handle stays in its slot: it may be the closure running right now.
        self.timer_pending.set(false);
        if !self.automatic_attempt_allowed() {
            return;
        }
        self.start_request(PlayTrigger::Timer);
    }

    /// First action of every gesture handler is the latch check.
    pub fn on_gesture(&self, kind: GestureKind) {
        if !self.automatic_attempt_allowed() {
            return;
        }
        tracing::debug!("{kind} gesture observed, retrying playback");
        self.start_request(PlayTrigger::Gesture(kind));
    }

    /// Play/pause control. Always honored, and a play counts as resolution.
    pub fn toggle_play(&self) {
        let status = {
            let state = self.state.borrow();
            if state.torn_down {
                return;
            }
            state.status
        };

        if status.playing {
            {
                let mut state = self.state.borrow_mut();
                state.play_generation += 1;
                state.status.playing = false;
                if let Some(request) = state.in_flight.as_mut() {
                    request.aborted = true;
                }
            }
            self.media.request_pause();
            self.notify();
        } else {
            self.begin_manual_play(status);
        }
    }

    /// Mute control. Unmuting while stopped is treated as a request to play.
    pub fn toggle_mute(&self) {
        let (before, after) = {
            let mut state = self.state.borrow_mut();
            if state.torn_down {
                return;
            }
            let before = state.status;
            state.mute_generation += 1;
            state.status.muted = !state.status.muted;
            (before, state.status)
        };

        self.media.set_muted(after.muted);
        if !after.muted && !after.playing {
            self.begin_manual_play(before);
        } else {
            self.notify();
        }
    }

    /// Cancel the timer, drop every listener and stop the track. Safe to call
    /// from any phase, and more than once.
    pub fn teardown(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.torn_down {
                return;
            }
            state.torn_down = true;
            state.in_flight = None;
            state.status.playing = false;
        }
        self.release_automatic_triggers();
        self.media.request_pause();
        self.observers.borrow_mut().clear();
    }

    /// Register a callback run after every observable status change.
    pub fn subscribe(&self, observer: impl Fn(AudioStatus) + 'static) {
        self.observers.borrow_mut().push(Box::new(observer));
    }

    pub fn status(&self) -> AudioStatus {
        self.state.borrow().status
    }

    #[allow(dead_code)]
    pub fn phase(&self) -> AutoplayPhase {
        self.state.borrow().phase
    }

    #[allow(dead_code)]
    pub fn autoplay_resolved(&self) -> bool {
        self.state.borrow().autoplay_resolved
    }

    #[allow(dead_code)]
    pub fn is_request_in_flight(&self) -> bool {
        self.state.borrow().in_flight.is_some()
    }

    #[allow(dead_code)]
    pub fn active_listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    #[allow(dead_code)]
    pub fn has_pending_timer(&self) -> bool {
        self.timer_pending.get() && self.timer.borrow().is_some()
    }

    fn automatic_attempt_allowed(&self) -> bool {
        let state = self.state.borrow();
        if state.torn_down || state.autoplay_resolved {
            return false;
        }
        if state.in_flight.is_some() {
            tracing::debug!("play request already outstanding, ignoring trigger");
            return false;
        }
        true
    }

    fn begin_manual_play(&self, restore: AudioStatus) {
        let adopted = {
            let mut state = self.state.borrow_mut();
            state.play_generation += 1;
            state.mute_generation += 1;
            state.status.playing = true;
            state.status.muted = false;
            state.autoplay_resolved = true;
            state.phase = AutoplayPhase::Armed;

            let (play_generation, mute_generation) =
                (state.play_generation, state.mute_generation);
            match state.in_flight.as_mut().filter(|request| !request.aborted) {
                Some(request) => {
                    // Reuse the outstanding request rather than issuing a second one.
                    request.trigger = PlayTrigger::Manual;
                    request.restore = restore;
                    request.play_generation = play_generation;
                    request.mute_generation = mute_generation;
                    true
                }
                None => false,
            }
        };

        self.release_automatic_triggers();
        self.media.set_muted(false);
        if adopted {
            tracing::debug!("manual play adopted the outstanding request");
        } else {
            self.start_request_with_restore(PlayTrigger::Manual, restore);
        }
        self.notify();
    }

    fn start_request(&self, trigger: PlayTrigger) {
        let restore = self.status();
        self.start_request_with_restore(trigger, restore);
    }

    fn start_request_with_restore(&self, trigger: PlayTrigger, restore: AudioStatus) {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_request_id;
            state.next_request_id += 1;
            state.in_flight = Some(PlayRequest {
                id,
                trigger,
                restore,
                play_generation: state.play_generation,
                mute_generation: state.mute_generation,
                aborted: false,
            });
            if trigger.is_automatic() {
                state.phase = AutoplayPhase::AttemptingAutoplay;
            }
            id
        };

        self.media.set_volume(self.config.clamped_volume());
        if trigger.is_automatic() {
            self.media.set_muted(false);
        }

        let play = self.media.request_play();
        let weak = self.self_ref.clone();
        self.host.spawn_local(Box::pin(async move {
            let result = play.await;
            if let Some(controller) = weak.upgrade() {
                controller.finish_request(id, result);
            }
        }));
    }

    fn finish_request(&self, id: u64, result: Result<(), PlaybackError>) {
        let Some(completion) = self.settle_request(id, result) else {
            return;
        };

        if completion.release_triggers {
            self.release_automatic_triggers();
        }
        if let Some(muted) = completion.sync_muted {
            self.media.set_muted(muted);
        }
        if completion.pause_again {
            self.media.request_pause();
        }
        if completion.notify {
            self.notify();
        }
    }

    fn settle_request(&self, id: u64, result: Result<(), PlaybackError>) -> Option<Completion> {
        let mut state = self.state.borrow_mut();
        let request = match state.in_flight {
            Some(request) if request.id == id => request,
            _ => return None,
        };
        state.in_flight = None;
        if state.torn_down {
            return None;
        }

        let mut completion = Completion::default();
        match (request.trigger, result) {
            (trigger, Ok(())) if trigger.is_automatic() => {
                // A mute toggled while the request was outstanding is kept.
                let muted =
                    request.mute_generation != state.mute_generation && state.status.muted;
                state.status = AudioStatus {
                    playing: true,
                    muted,
                };
                state.autoplay_resolved = true;
                state.phase = AutoplayPhase::Armed;
                completion.release_triggers = true;
                completion.notify = true;
                completion.sync_muted = Some(muted);
                if let PlayTrigger::Gesture(kind) = trigger {
                    tracing::info!("background music started after {kind} gesture");
                } else {
                    tracing::info!("background music started automatically");
                }
            }
            (PlayTrigger::Timer, Err(err)) => {
                state.phase = AutoplayPhase::AwaitingGesture;
                tracing::info!("autoplay blocked, waiting for user interaction ({err})");
            }
            (PlayTrigger::Gesture(kind), Err(err)) => {
                state.phase = AutoplayPhase::AwaitingGesture;
                tracing::warn!("playback after {kind} gesture failed: {err}");
            }
            (_, Ok(())) => {
                // A pause issued while the request was outstanding wins.
                completion.pause_again = !state.status.playing;
                tracing::debug!("manual play request accepted");
            }
            (_, Err(err)) if request.aborted => {
                tracing::debug!("play request aborted by pause ({err})");
            }
            (_, Err(err)) => {
                tracing::error!("manual play request failed: {err}");
                if request.play_generation == state.play_generation {
                    state.status.playing = request.restore.playing;
                    completion.notify = true;
                }
                if request.mute_generation == state.mute_generation
                    && state.status.muted != request.restore.muted
                {
                    state.status.muted = request.restore.muted;
                    completion.sync_muted = Some(request.restore.muted);
                    completion.notify = true;
                }
            }
        }
        Some(completion)
    }

    fn release_automatic_triggers(&self) {
        let timer = self.timer.borrow_mut().take();
        self.timer_pending.set(false);
        let listeners: Vec<_> = self.listeners.borrow_mut().drain(..).collect();
        if timer.is_some() || !listeners.is_empty() {
            tracing::debug!(
                "released autoplay timer and {} gesture listeners",
                listeners.len()
            );
        }
        drop(timer);
        drop(listeners);
    }

    fn notify(&self) {
        let status = self.status();
        for observer in self.observers.borrow().iter() {
            observer(status);
        }
    }
}

impl Drop for AutoplayController {
    fn drop(&mut self) {
        self.teardown();
    }
}
