// Browser host: the page's <audio> element, window gesture listeners, and
// gloo timers.
use std::time::Duration;

use futures_util::future::LocalBoxFuture;
use dioxus::logger::tracing;
use gloo_timers::callback::Timeout;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, EventTarget, HtmlAudioElement, HtmlSourceElement, Window};

use super::host::{AudioHost, GestureKind, ListenerHandle, MediaElement, TimerHandle};
use super::PlaybackError;

const AUDIO_ELEMENT_ID: &str = "portfolio-background-audio";

/// Initialize the page's audio element once; later mounts reuse it.
pub fn get_or_create_audio_element() -> Option<HtmlAudioElement> {
    let document = window()?.document()?;

    if let Some(existing) = document.get_element_by_id(AUDIO_ELEMENT_ID) {
        return existing.dyn_into::<HtmlAudioElement>().ok();
    }

    let audio: HtmlAudioElement = document.create_element("audio").ok()?.dyn_into().ok()?;
    audio.set_id(AUDIO_ELEMENT_ID);
    audio.set_preload("auto");
    document.body()?.append_child(&audio).ok()?;

    Some(audio)
}

fn js_string_field(value: &JsValue, field: &str) -> String {
    js_sys::Reflect::get(value, &field.into())
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}

fn play_rejection(err: JsValue) -> PlaybackError {
    let name = js_string_field(&err, "name");
    let message = js_string_field(&err, "message");
    if name.is_empty() && message.is_empty() {
        return PlaybackError::PlayFailed(format!("{err:?}"));
    }
    PlaybackError::from_play_rejection(&name, &message)
}

pub struct BrowserMedia {
    audio: HtmlAudioElement,
}

impl BrowserMedia {
    pub fn new(audio: HtmlAudioElement) -> Self {
        Self { audio }
    }

    fn source_element(&self) -> Option<HtmlSourceElement> {
        if let Some(existing) = self.audio.query_selector("source").ok().flatten() {
            return existing.dyn_into::<HtmlSourceElement>().ok();
        }
        let document = window()?.document()?;
        let source: HtmlSourceElement = document.create_element("source").ok()?.dyn_into().ok()?;
        self.audio.append_child(&source).ok()?;
        Some(source)
    }
}

impl MediaElement for BrowserMedia {
    fn set_source(&self, uri: &str, mime_type: &str) {
        let Some(source) = self.source_element() else {
            tracing::warn!("unable to attach <source> to the background audio element");
            return;
        };
        if source.get_attribute("src").as_deref() == Some(uri) {
            return;
        }
        source.set_src(uri);
        source.set_type(mime_type);
        self.audio.load();
    }

    fn set_volume(&self, volume: f64) {
        self.audio.set_volume(volume.clamp(0.0, 1.0));
    }

    fn set_muted(&self, muted: bool) {
        self.audio.set_muted(muted);
    }

    fn set_looping(&self, looping: bool) {
        self.audio.set_loop(looping);
    }

    fn request_play(&self) -> LocalBoxFuture<'static, Result<(), PlaybackError>> {
        match self.audio.play() {
            Ok(promise) => Box::pin(async move {
                JsFuture::from(promise)
                    .await
                    .map(|_| ())
                    .map_err(play_rejection)
            }),
            Err(err) => {
                let err = play_rejection(err);
                Box::pin(async move { Err(err) })
            }
        }
    }

    fn request_pause(&self) {
        if let Err(err) = self.audio.pause() {
            tracing::warn!("pause failed: {}", play_rejection(err));
        }
    }
}

struct BrowserTimer {
    _timeout: Timeout,
}

impl TimerHandle for BrowserTimer {}

/// Capture-phase listener on the window, removed when dropped.
struct WindowListener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn Fn()>,
}

impl ListenerHandle for WindowListener {}

impl Drop for WindowListener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.event,
            self.callback.as_ref().unchecked_ref(),
            true,
        );
    }
}

pub struct BrowserHost {
    window: Window,
}

impl BrowserHost {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl AudioHost for BrowserHost {
    fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Box<dyn TimerHandle> {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Box::new(BrowserTimer {
            _timeout: Timeout::new(millis, move || task()),
        })
    }

    fn listen(
        &self,
        kind: GestureKind,
        handler: Box<dyn Fn()>,
    ) -> Result<Box<dyn ListenerHandle>, PlaybackError> {
        let target: EventTarget = self.window.clone().into();
        let callback = Closure::wrap(handler);
        target
            .add_event_listener_with_callback_and_bool(
                kind.event_name(),
                callback.as_ref().unchecked_ref(),
                true,
            )
            .map_err(|err| PlaybackError::ListenerRegistration(format!("{kind}: {err:?}")))?;
        Ok(Box::new(WindowListener {
            target,
            event: kind.event_name(),
            callback,
        }))
    }

    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(future);
    }
}
