use crate::components::{AudioControllerHandle, AudioStatus, AudioStatusSignal, Icon};
use dioxus::prelude::*;

const BUTTON_BASE: &str = "p-2 glass-card rounded-lg transition-all hover:scale-110 group disabled:opacity-40 disabled:hover:scale-100";

fn play_button_label(status: AudioStatus) -> &'static str {
    if status.playing {
        "Pause music"
    } else {
        "Play music"
    }
}

fn mute_button_label(status: AudioStatus) -> &'static str {
    if status.muted {
        "Unmute music"
    } else {
        "Mute music"
    }
}

fn mute_button_class(status: AudioStatus) -> String {
    if status.muted {
        format!("{BUTTON_BASE} text-slate-300 hover:text-cyan-400")
    } else {
        format!("{BUTTON_BASE} text-cyan-400 hover:text-cyan-300")
    }
}

/// Floating play/pause and mute controls for the background track.
#[component]
pub fn MusicPlayer() -> Element {
    let controller = use_context::<AudioControllerHandle>();
    let status = use_context::<AudioStatusSignal>().0;
    let current = status();
    let available = controller.is_available();

    let on_toggle_play = {
        let controller = controller.clone();
        move |evt: MouseEvent| {
            evt.prevent_default();
            evt.stop_propagation();
            controller.toggle_play();
        }
    };

    let on_toggle_mute = {
        let controller = controller.clone();
        move |evt: MouseEvent| {
            evt.prevent_default();
            evt.stop_propagation();
            controller.toggle_mute();
        }
    };

    rsx! {
        div { class: "fixed top-6 right-6 z-50 flex items-center gap-1.5",
            button {
                id: "music-play-pause-btn",
                r#type: "button",
                class: "{BUTTON_BASE} hover:text-cyan-400 text-slate-300",
                disabled: !available,
                aria_label: play_button_label(current),
                onclick: on_toggle_play,
                if current.playing {
                    Icon {
                        name: "pause".to_string(),
                        class: "w-4 h-4 fill-current".to_string(),
                    }
                } else {
                    Icon {
                        name: "play".to_string(),
                        class: "w-4 h-4 fill-current".to_string(),
                    }
                }
            }
            button {
                id: "music-mute-btn",
                r#type: "button",
                class: mute_button_class(current),
                disabled: !available,
                aria_label: mute_button_label(current),
                onclick: on_toggle_mute,
                Icon { name: "volume-x".to_string(), class: "w-4 h-4".to_string() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_status() {
        let playing = AudioStatus {
            playing: true,
            muted: false,
        };
        assert_eq!(play_button_label(playing), "Pause music");
        assert_eq!(mute_button_label(playing), "Mute music");

        let muted_idle = AudioStatus {
            playing: false,
            muted: true,
        };
        assert_eq!(play_button_label(muted_idle), "Play music");
        assert_eq!(mute_button_label(muted_idle), "Unmute music");
    }

    #[test]
    fn mute_button_is_highlighted_only_when_audible() {
        let audible = mute_button_class(AudioStatus::default());
        assert!(audible.contains("text-cyan-400 hover:text-cyan-300"));
        let muted = AudioStatus {
            playing: true,
            muted: true,
        };
        assert!(mute_button_class(muted).contains("text-slate-300"));
    }
}
