use yew::prelude::*;

use crate::config::PLAYER_ELEMENT_ID;
use crate::player::PlayerError;

#[derive(Properties, PartialEq)]
pub struct PlayerFrameProps {
    pub error: Option<PlayerError>,
    pub show_reminder: bool,
    pub progress: f64,
    pub on_restart: Callback<()>,
}

/// Hosts the embed plus everything layered over it.
#[function_component(PlayerFrame)]
pub fn player_frame(props: &PlayerFrameProps) -> Html {
    let restart = {
        let on_restart = props.on_restart.clone();
        Callback::from(move |_: MouseEvent| on_restart.emit(()))
    };

    html! {
        <div class="player-frame">
            {
                if let Some(error) = &props.error {
                    html! {
                        <div class="player-error">
                            <h2 class="mono">{"Protocol Failure"}</h2>
                            <p class="mono">{error.to_string()}</p>
                            <button class="ghost-button mono" onclick={restart}>
                                {"Restart Transmission"}
                            </button>
                        </div>
                    }
                } else {
                    html! {}
                }
            }
            // The embed swaps the inner div for its iframe, so yew must
            // never touch it after the first render.
            <div class="player-host">
                <div id={PLAYER_ELEMENT_ID}></div>
            </div>
            {
                if props.show_reminder {
                    html! {
                        <div class="reminder mono">
                            {"Link Account to avoid future delays"}
                        </div>
                    }
                } else {
                    html! {}
                }
            }
            <div class="progress-track">
                <div class="progress-fill" style={format!("width: {}%;", props.progress)}></div>
            </div>
        </div>
    }
}
