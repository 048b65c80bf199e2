use log::info;
use yew::prelude::*;

mod config;
mod countdown;
mod gate;
mod player;
mod session;
mod components {
    pub mod player_frame;
    pub mod status_panel;
    pub mod welcome_modal;
}
mod pages {
    pub mod briefing;
}

use pages::briefing::Briefing;

#[function_component]
fn App() -> Html {
    html! {
        <Briefing />
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting briefing gate");
    yew::Renderer::<App>::new().render();
}
