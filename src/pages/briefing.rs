use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use log::debug;
use yew::prelude::*;

use crate::components::player_frame::PlayerFrame;
use crate::components::status_panel::StatusPanel;
use crate::components::welcome_modal::WelcomeModal;
use crate::config::{self, AFTER_DOWNLOAD, CHANNEL_NAME, PDF_URL, PLAYER_ELEMENT_ID, REMINDER_MILLIS};
use crate::countdown::{start_ticking, TickSlot};
use crate::gate::{reload_page, trigger_download, DownloadOutcome, WindowNavigator};
use crate::player::{Embed, EmbedLoader, PlayerError, PlayerState};
use crate::session::{LocalProgressStore, SessionAction, WatchSession};

#[function_component(Briefing)]
pub fn briefing() -> Html {
    let session = use_reducer(|| WatchSession::restore(&LocalProgressStore));
    let show_welcome = use_state(|| true);
    let show_reminder = use_state(|| false);
    let tick_slot = use_mut_ref(TickSlot::<Interval>::new);
    let reminder_timeout = use_mut_ref(|| None::<Timeout>);

    // Write progress back whenever it moves
    {
        let remaining = session.seconds_remaining();
        let session = session.clone();
        use_effect_with_deps(
            move |_| {
                session.persist(&mut LocalProgressStore);
                || ()
            },
            remaining,
        );
    }

    // Countdown driver: one interval while active, none otherwise
    {
        let dispatcher = session.dispatcher();
        let tick_slot = tick_slot.clone();
        use_effect_with_deps(
            move |countdown| {
                let on_tick = Callback::from(move |_: ()| dispatcher.dispatch(SessionAction::Tick));
                let mut slot = tick_slot.borrow_mut();
                slot.sync(*countdown, || start_ticking(on_tick));
                debug!("Countdown {:?}, ticking: {}", countdown, slot.is_running());
                drop(slot);

                move || {
                    tick_slot.borrow_mut().cancel();
                }
            },
            session.countdown(),
        );
    }

    // Embed lifecycle: mounted once, released on unmount
    {
        let dispatcher = session.dispatcher();
        let reminder_setter = show_reminder.setter();
        let reminder_timeout = reminder_timeout.clone();
        use_effect_with_deps(
            move |_| {
                let embed = Rc::new(RefCell::new(None::<Embed>));

                let on_state = {
                    let dispatcher = dispatcher.clone();
                    let reminder_timeout = reminder_timeout.clone();
                    Callback::from(move |state: PlayerState| {
                        if state.is_playing() {
                            reminder_setter.set(true);
                            let hide = reminder_setter.clone();
                            // Replacing the handle cancels any reminder still pending.
                            *reminder_timeout.borrow_mut() =
                                Some(Timeout::new(REMINDER_MILLIS, move || hide.set(false)));
                        }
                        dispatcher.dispatch(SessionAction::Playback(state));
                    })
                };
                let on_error = {
                    let dispatcher = dispatcher.clone();
                    Callback::from(move |error| dispatcher.dispatch(SessionAction::Failed(error)))
                };

                let loader = {
                    let embed = embed.clone();
                    let unavailable = dispatcher.clone();
                    EmbedLoader::when_ready(
                        move || {
                            if embed.borrow().is_some() {
                                return;
                            }
                            match Embed::mount(PLAYER_ELEMENT_ID, on_state, on_error) {
                                Ok(player) => *embed.borrow_mut() = Some(player),
                                Err(error) => dispatcher.dispatch(SessionAction::Failed(error)),
                            }
                        },
                        move || {
                            unavailable.dispatch(SessionAction::Failed(PlayerError::InitializationFailed))
                        },
                    )
                };

                move || {
                    drop(loader);
                    reminder_timeout.borrow_mut().take();
                    if let Some(player) = embed.borrow_mut().take() {
                        player.release();
                    }
                }
            },
            (),
        );
    }

    let dismiss_welcome = {
        let show_welcome = show_welcome.clone();
        Callback::from(move |_: ()| show_welcome.set(false))
    };

    let on_restart = Callback::from(|_: ()| reload_page());

    let on_download = {
        let unlocked = session.is_unlocked();
        Callback::from(move |_: MouseEvent| {
            let outcome = trigger_download(unlocked, PDF_URL, AFTER_DOWNLOAD, &mut WindowNavigator);
            if outcome == DownloadOutcome::Locked {
                debug!("Download pressed while locked");
            }
        })
    };

    let progress = session.progress_percent();
    let reminder_visible = *show_reminder && session.is_playing() && !session.is_unlocked();
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();

    html! {
        <div class="briefing-page">
            <style>
                {r#"
                    .briefing-page {
                        min-height: 100vh;
                        display: flex;
                        flex-direction: column;
                        align-items: center;
                        justify-content: center;
                        padding: 24px;
                        background: #050505;
                        color: #d4d4d8;
                        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
                    }
                    .mono { font-family: ui-monospace, SFMono-Regular, Menlo, monospace; text-transform: uppercase; }
                    .dim { color: #3f3f46; }
                    .accent { color: #7f1d1d; font-weight: bold; }
                    .rule { height: 2px; width: 48px; background: #7f1d1d; margin: 16px auto; }
                    .briefing-header { max-width: 768px; text-align: center; margin-bottom: 32px; }
                    .briefing-header h1 { color: #fff; font-style: italic; font-weight: 900; text-transform: uppercase; }
                    .briefing-card {
                        width: 100%;
                        max-width: 768px;
                        background: #0d0d0d;
                        border: 1px solid #27272a;
                        border-radius: 8px;
                        overflow: hidden;
                    }
                    .channel-bar {
                        display: flex;
                        justify-content: space-between;
                        align-items: center;
                        padding: 12px 24px;
                        border-bottom: 1px solid #27272a;
                    }
                    .channel-bar a { color: #ef4444; font-size: 10px; border: 1px solid #7f1d1d; padding: 6px 16px; text-decoration: none; }
                    .player-frame { position: relative; aspect-ratio: 16 / 9; background: #000; }
                    .player-host, .player-host > * { width: 100%; height: 100%; }
                    .player-error {
                        position: absolute;
                        inset: 0;
                        z-index: 20;
                        display: flex;
                        flex-direction: column;
                        align-items: center;
                        justify-content: center;
                        background: #09090b;
                        text-align: center;
                    }
                    .reminder {
                        position: absolute;
                        left: 50%;
                        bottom: 48px;
                        transform: translateX(-50%);
                        background: rgba(69, 10, 10, 0.9);
                        border: 1px solid #991b1b;
                        padding: 8px 16px;
                        font-size: 10px;
                        color: #fff;
                        pointer-events: none;
                    }
                    .progress-track { position: absolute; left: 0; right: 0; bottom: 0; height: 4px; background: #18181b; }
                    .progress-fill { height: 100%; background: #7f1d1d; transition: width 1s linear; }
                    .status-panel {
                        display: flex;
                        flex-wrap: wrap;
                        gap: 32px;
                        align-items: center;
                        justify-content: space-between;
                        padding: 32px;
                    }
                    .label { font-size: 10px; color: #52525b; }
                    .status { font-size: 20px; font-weight: 900; font-style: italic; text-transform: uppercase; color: #52525b; }
                    .status.live { color: #22c55e; }
                    .clock { font-size: 64px; font-weight: 900; color: #fff; }
                    .countdown.done .badge { font-size: 24px; color: #22c55e; font-style: italic; text-transform: uppercase; }
                    .download-button { min-width: 200px; padding: 16px 32px; font-weight: 900; text-transform: uppercase; letter-spacing: 0.2em; }
                    .download-button.unlocked { background: #f4f4f5; color: #000; cursor: pointer; }
                    .download-button.locked { background: #18181b; color: #3f3f46; border: 1px solid #27272a; cursor: not-allowed; }
                    .ghost-button, .primary-button { padding: 12px 24px; cursor: pointer; }
                    .welcome-overlay { position: fixed; inset: 0; z-index: 100; display: flex; align-items: center; justify-content: center; }
                    .welcome-backdrop { position: absolute; inset: 0; background: rgba(0, 0, 0, 0.8); }
                    .welcome-panel { position: relative; max-width: 384px; background: #0d0d0d; border: 1px solid #27272a; padding: 32px; text-align: center; }
                    .fine-print { font-size: 8px; color: #3f3f46; margin-top: 24px; }
                    .briefing-footer { display: flex; justify-content: space-between; padding: 8px 24px; font-size: 8px; opacity: 0.3; }
                "#}
            </style>

            {
                if *show_welcome {
                    html! { <WelcomeModal on_dismiss={dismiss_welcome} /> }
                } else {
                    html! {}
                }
            }

            <div class="briefing-header">
                <div class="label mono">{"Transmission: Secure Node 092"}</div>
                <h1>{"Mission "}<span class="dim">{"Briefing"}</span></h1>
                <div class="rule"></div>
                <p class="mono">
                    {"Authorized personnel only. Complete the visual briefing to initiate decryption sequence of Level 4 assets."}
                </p>
            </div>

            <div class="briefing-card">
                <div class="channel-bar">
                    <div>
                        <p class="mono">{"Central Intelligence Feed"}</p>
                        <p class="label mono">{format!("Channel: {}", CHANNEL_NAME)}</p>
                    </div>
                    <a class="mono" href={config::subscribe_url()} target="_blank" rel="noopener noreferrer">
                        {"Establish Sub-Link"}
                    </a>
                </div>

                <PlayerFrame
                    error={session.last_error().cloned()}
                    show_reminder={reminder_visible}
                    progress={progress}
                    on_restart={on_restart}
                />

                <StatusPanel
                    is_playing={session.is_playing()}
                    seconds_remaining={session.seconds_remaining()}
                    progress={progress}
                    unlocked={session.is_unlocked()}
                    on_download={on_download}
                />

                <div class="briefing-footer mono">
                    <div>{"Node ID: AF-1092-X"}</div>
                    <div>{format!("System Timestamp: {}", today)}</div>
                </div>
            </div>
        </div>
    }
}
