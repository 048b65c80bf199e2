use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct WelcomeModalProps {
    pub on_dismiss: Callback<()>,
}

#[function_component(WelcomeModal)]
pub fn welcome_modal(props: &WelcomeModalProps) -> Html {
    let dismiss = {
        let on_dismiss = props.on_dismiss.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            on_dismiss.emit(());
        })
    };

    html! {
        <div class="welcome-overlay">
            <div class="welcome-backdrop" onclick={dismiss.clone()}></div>
            <div class="welcome-panel">
                <h2>{"Security "}<span class="dim">{"Protocol"}</span></h2>
                <div class="rule"></div>
                <p class="mono">
                    {"Authorized access only. You are required to complete the visual briefing transmission before the classified assets can be decrypted for download. "}
                    <span class="accent">{"Exercise patience."}</span>
                </p>
                <button class="primary-button" onclick={dismiss}>
                    {"Acknowledge Protocol"}
                </button>
                <p class="fine-print mono">{"Node ID: AF-1092-X // Status: Awaiting Verification"}</p>
            </div>
        </div>
    }
}
