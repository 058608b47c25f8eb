use crate::components::{use_background_audio, MusicPlayer};
use crate::config::PlayerConfig;
use dioxus::logger::tracing;
use dioxus::prelude::*;

const PLAYER_CONFIG: &str = include_str!("../../assets/player.json");

fn load_player_config() -> PlayerConfig {
    match PlayerConfig::from_json(PLAYER_CONFIG) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("{err}; using default background audio settings");
            PlayerConfig::default()
        }
    }
}

/// Page shell. Owns the single background audio controller for the session;
/// the portfolio sections render inside `main`.
#[component]
pub fn AppShell() -> Element {
    let config = use_hook(load_player_config);
    use_background_audio(config);

    rsx! {
        div { class: "min-h-screen bg-slate-950 text-slate-100",
            MusicPlayer {}
            main { id: "portfolio" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_parses_to_defaults() {
        assert_eq!(load_player_config(), PlayerConfig::default());
    }
}
