//! Audio Manager - owns the page's background track outside the render cycle.
//! The controller is plain Rust behind the `MediaElement`/`AudioHost` seams;
//! the browser host and Dioxus glue live alongside it.
use std::rc::Rc;

use dioxus::core::{Runtime, RuntimeGuard};
use dioxus::logger::tracing;
use dioxus::prelude::*;

use crate::config::PlayerConfig;

mod controller;
mod error;
mod host;
#[cfg(target_arch = "wasm32")]
mod web_host;

pub use controller::{AudioStatus, AutoplayController};
pub use error::PlaybackError;
pub use host::GestureKind;

/// Build the controller around the page's `<audio>` element.
#[cfg(target_arch = "wasm32")]
pub fn create_browser_controller(
    config: PlayerConfig,
) -> Result<Rc<AutoplayController>, PlaybackError> {
    let window = web_sys::window()
        .ok_or_else(|| PlaybackError::ResourceUnavailable("no window".to_string()))?;
    let audio = web_host::get_or_create_audio_element().ok_or_else(|| {
        PlaybackError::ResourceUnavailable("unable to create <audio> element".to_string())
    })?;
    Ok(AutoplayController::new(
        config,
        Box::new(web_host::BrowserMedia::new(audio)),
        Box::new(web_host::BrowserHost::new(window)),
    ))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn create_browser_controller(
    _config: PlayerConfig,
) -> Result<Rc<AutoplayController>, PlaybackError> {
    Err(PlaybackError::ResourceUnavailable(
        "background audio needs a browser host".to_string(),
    ))
}

/// Current play/mute flags for rendering.
#[derive(Clone, Copy)]
pub struct AudioStatusSignal(pub Signal<AudioStatus>);

/// Shared handle to the page's single controller. Inert when no audio
/// resource could be created.
#[derive(Clone)]
pub struct AudioControllerHandle(Option<Rc<AutoplayController>>);

impl AudioControllerHandle {
    pub fn is_available(&self) -> bool {
        self.0.is_some()
    }

    pub fn toggle_play(&self) {
        if let Some(controller) = &self.0 {
            controller.toggle_play();
        }
    }

    pub fn toggle_mute(&self) {
        if let Some(controller) = &self.0 {
            controller.toggle_mute();
        }
    }

    fn mount(&self) {
        if let Some(controller) = &self.0 {
            if let Err(err) = controller.mount() {
                tracing::warn!("background music not mounted: {err}");
            }
        }
    }

    fn teardown(&self) {
        if let Some(controller) = &self.0 {
            controller.teardown();
        }
    }
}

/// Observer that copies controller updates into `status`. Controller updates
/// arrive from timers, promises and window listeners, outside any render.
fn status_writer(status: Signal<AudioStatus>) -> impl Fn(AudioStatus) + 'static {
    let runtime = Runtime::current();
    move |next| {
        let _guard = RuntimeGuard::new(runtime.clone());
        let mut status = status;
        status.set(next);
    }
}

/// Create the page's controller once, expose it and its status through
/// context, and tear it down with the hosting view.
pub fn use_background_audio(config: PlayerConfig) -> AudioControllerHandle {
    let status = use_signal(AudioStatus::default);

    let handle = use_hook(move || match create_browser_controller(config) {
        Ok(controller) => {
            controller.subscribe(status_writer(status));
            AudioControllerHandle(Some(controller))
        }
        Err(err) => {
            tracing::warn!("background music disabled: {err}");
            AudioControllerHandle(None)
        }
    });

    {
        let handle = handle.clone();
        use_effect(move || handle.mount());
    }
    {
        let handle = handle.clone();
        use_drop(move || handle.teardown());
    }

    use_context_provider(|| AudioStatusSignal(status));
    use_context_provider(|| handle.clone());
    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use dioxus::core::VirtualDom;
    use std::cell::{Cell, RefCell};

    type Writer = Box<dyn Fn(AudioStatus)>;

    thread_local! {
        static STATUS: Cell<Option<Signal<AudioStatus>>> = const { Cell::new(None) };
        static WRITER: RefCell<Option<Writer>> = const { RefCell::new(None) };
    }

    #[component]
    fn StatusView() -> Element {
        let status = use_signal(AudioStatus::default);
        use_hook(|| {
            STATUS.with(|slot| slot.set(Some(status)));
            WRITER.with(|slot| *slot.borrow_mut() = Some(Box::new(status_writer(status))));
        });
        rsx! {}
    }

    #[test]
    fn status_updates_land_outside_a_render() {
        let mut dom = VirtualDom::new(StatusView);
        dom.rebuild_in_place();

        let next = AudioStatus {
            playing: true,
            muted: true,
        };
        WRITER.with(|slot| {
            let writer = slot.borrow();
            let writer = writer.as_ref().expect("writer installed on first render");
            writer(next);
        });

        let status = STATUS.with(Cell::get).expect("signal installed on first render");
        assert_eq!(dom.in_runtime(|| *status.peek()), next);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn native_builds_render_inert_controls() {
        let controller = create_browser_controller(PlayerConfig::default());
        assert!(controller.is_err());
        let handle = AudioControllerHandle(controller.ok());
        assert!(!handle.is_available());
        handle.toggle_play();
        handle.toggle_mute();
    }
}
