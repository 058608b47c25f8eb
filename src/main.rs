use dioxus::prelude::*;

mod components;
mod config;

use components::AppShell;
use dioxus::logger::tracing::Level;

fn main() {
    let level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    // A second init (hot reload) fails harmlessly.
    let _ = dioxus::logger::init(level);
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Title { "Portfolio" }
        document::Meta { name: "viewport", content: "width=device-width, initial-scale=1" }
        document::Meta { name: "theme-color", content: "#020617" }

        AppShell {}
    }
}
