use yew::prelude::*;

use crate::session::format_clock;

#[derive(Properties, PartialEq)]
pub struct StatusPanelProps {
    pub is_playing: bool,
    pub seconds_remaining: u32,
    pub progress: f64,
    pub unlocked: bool,
    pub on_download: Callback<MouseEvent>,
}

#[function_component(StatusPanel)]
pub fn status_panel(props: &StatusPanelProps) -> Html {
    let status_class = if props.is_playing { "status live" } else { "status" };
    let status_text = if props.is_playing { "Receiving..." } else { "Awaiting Input" };

    let download_class = if props.unlocked {
        "download-button unlocked"
    } else {
        "download-button locked"
    };

    html! {
        <div class="status-panel">
            <div class="status-column">
                <div class="label mono">{"Protocol Status"}</div>
                <div class={status_class}>{status_text}</div>
                <div class="label mono">{"Decryption"}</div>
                <div class="metric mono">{format!("{}%", props.progress.round())}</div>
            </div>

            {
                if props.unlocked {
                    html! {
                        <div class="countdown done">
                            <div class="badge">{"Briefing Authenticated"}</div>
                        </div>
                    }
                } else {
                    html! {
                        <div class="countdown">
                            <div class="clock mono">{format_clock(props.seconds_remaining)}</div>
                            <div class="badge mono">{"Visual Lock Active"}</div>
                        </div>
                    }
                }
            }

            <button
                class={download_class}
                disabled={!props.unlocked}
                onclick={props.on_download.clone()}
            >
                {"Access Files"}
            </button>
        </div>
    }
}
