use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::js_sys::{self, Object, Reflect};
use yew::Callback;

use crate::config::{EMBED_POLL_LIMIT, EMBED_POLL_MILLIS, VIDEO_ID};

/// Playback states reported by the embed's `onStateChange` event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
    Unknown(i32),
}

impl PlayerState {
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => PlayerState::Unstarted,
            0 => PlayerState::Ended,
            1 => PlayerState::Playing,
            2 => PlayerState::Paused,
            3 => PlayerState::Buffering,
            5 => PlayerState::Cued,
            other => PlayerState::Unknown(other),
        }
    }

    pub fn is_playing(self) -> bool {
        matches!(self, PlayerState::Playing)
    }
}

/// Everything that can stop the briefing. The display text is what the
/// visitor sees on the failure overlay.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("Playback restricted on this domain")]
    DomainRestricted(i32),
    #[error("Configuration or origin error")]
    Configuration,
    #[error("Error Code: {0}")]
    Unknown(i32),
    #[error("Initialization Failed")]
    InitializationFailed,
}

impl PlayerError {
    pub fn from_code(code: i32) -> Self {
        match code {
            101 | 150 => PlayerError::DomainRestricted(code),
            153 => PlayerError::Configuration,
            other => PlayerError::Unknown(other),
        }
    }
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = YT, js_name = Player)]
    type YtPlayer;

    #[wasm_bindgen(constructor, js_namespace = YT, js_class = "Player", catch)]
    fn new(element_id: &str, options: &JsValue) -> Result<YtPlayer, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn destroy(this: &YtPlayer) -> Result<(), JsValue>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerOptions<'a> {
    height: &'a str,
    width: &'a str,
    video_id: &'a str,
    player_vars: PlayerVars,
}

// Names are the embed's own query parameters.
#[derive(Serialize)]
struct PlayerVars {
    autoplay: u8,
    mute: u8,
    modestbranding: u8,
    rel: u8,
    controls: u8,
    showinfo: u8,
    cc_load_policy: u8,
    enablejsapi: u8,
}

impl<'a> PlayerOptions<'a> {
    fn briefing(video_id: &'a str) -> Self {
        Self {
            height: "100%",
            width: "100%",
            video_id,
            // No `origin` here: setting it triggers error 153 on some hosts.
            player_vars: PlayerVars {
                autoplay: 1,
                mute: 1,
                modestbranding: 1,
                rel: 0,
                controls: 1,
                showinfo: 0,
                cc_load_policy: 1,
                enablejsapi: 1,
            },
        }
    }
}

fn event_code(event: &JsValue) -> Option<i32> {
    Reflect::get(event, &JsValue::from_str("data"))
        .ok()
        .and_then(|data| data.as_f64())
        .map(|code| code as i32)
}

/// True once the embed's loader script has defined `YT.Player`.
fn api_ready() -> bool {
    Reflect::get(&js_sys::global(), &JsValue::from_str("YT"))
        .ok()
        .filter(|yt| yt.is_object())
        .and_then(|yt| Reflect::get(&yt, &JsValue::from_str("Player")).ok())
        .map(|player| player.is_function())
        .unwrap_or(false)
}

/// The two event callbacks handed to the embed.
struct EmbedCallbacks<C> {
    _on_state_change: C,
    _on_error: C,
}

impl<C> EmbedCallbacks<C> {
    /// The embed can still fire an event after `destroy()` returns, so the
    /// callbacks stay valid for the rest of the page instead of being freed.
    fn outlive_page(self) {
        std::mem::forget(self);
    }
}

/// A live player instance plus the JS callbacks it holds on to.
pub struct Embed {
    player: YtPlayer,
    callbacks: EmbedCallbacks<Closure<dyn FnMut(JsValue)>>,
}

impl Embed {
    pub fn mount(
        element_id: &str,
        on_state: Callback<PlayerState>,
        on_error: Callback<PlayerError>,
    ) -> Result<Self, PlayerError> {
        let on_state_change = Closure::wrap(Box::new(move |event: JsValue| {
            match event_code(&event) {
                Some(code) => on_state.emit(PlayerState::from_code(code)),
                None => warn!("Ignoring state change without a state code"),
            }
        }) as Box<dyn FnMut(JsValue)>);

        let on_error_event = Closure::wrap(Box::new(move |event: JsValue| {
            let code = event_code(&event).unwrap_or(-1);
            gloo_console::error!(format!("YouTube Player Error: {}", code));
            on_error.emit(PlayerError::from_code(code));
        }) as Box<dyn FnMut(JsValue)>);

        let init_failed = |e: JsValue| {
            gloo_console::error!("Failed to initialize YT Player:", e);
            PlayerError::InitializationFailed
        };

        let options = serde_wasm_bindgen::to_value(&PlayerOptions::briefing(VIDEO_ID))
            .map_err(|e| init_failed(e.into()))?;
        let events = Object::new();
        Reflect::set(&events, &JsValue::from_str("onStateChange"), on_state_change.as_ref())
            .map_err(init_failed)?;
        Reflect::set(&events, &JsValue::from_str("onError"), on_error_event.as_ref())
            .map_err(init_failed)?;
        Reflect::set(&options, &JsValue::from_str("events"), &events).map_err(init_failed)?;

        let player = YtPlayer::new(element_id, &options).map_err(init_failed)?;
        debug!("Embed mounted on #{}", element_id);

        Ok(Self {
            player,
            callbacks: EmbedCallbacks {
                _on_state_change: on_state_change,
                _on_error: on_error_event,
            },
        })
    }

    /// Destroys the player. The page is going away at this point, so a
    /// failure is only logged.
    pub fn release(self) {
        if let Err(e) = self.player.destroy() {
            warn!("Failed to destroy embed: {:?}", e);
        }
        self.callbacks.outlive_page();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PollStep {
    Ready,
    Wait,
    GiveUp,
}

/// Counts readiness checks against a fixed budget.
struct ReadinessPoll {
    attempts_left: u32,
}

impl ReadinessPoll {
    fn new(limit: u32) -> Self {
        Self { attempts_left: limit }
    }

    fn check(&mut self, ready: bool) -> PollStep {
        if ready {
            return PollStep::Ready;
        }
        if self.attempts_left == 0 {
            return PollStep::GiveUp;
        }
        self.attempts_left -= 1;
        PollStep::Wait
    }
}

/// Runs `on_ready` once the embed API is available, polling for it when
/// the loader script has not finished yet. If the API never shows up within
/// [`EMBED_POLL_LIMIT`] polls, `on_unavailable` runs instead. Dropping the
/// loader cancels a pending poll.
pub struct EmbedLoader {
    cancelled: Rc<Cell<bool>>,
}

impl EmbedLoader {
    pub fn when_ready<F, G>(on_ready: F, on_unavailable: G) -> Self
    where
        F: FnOnce() + 'static,
        G: FnOnce() + 'static,
    {
        let cancelled = Rc::new(Cell::new(false));
        let mut poll = ReadinessPoll::new(EMBED_POLL_LIMIT);
        match poll.check(api_ready()) {
            PollStep::Ready => {
                on_ready();
                return Self { cancelled };
            }
            PollStep::GiveUp => {
                on_unavailable();
                return Self { cancelled };
            }
            PollStep::Wait => {}
        }

        let flag = cancelled.clone();
        spawn_local(async move {
            loop {
                TimeoutFuture::new(EMBED_POLL_MILLIS).await;
                if flag.get() {
                    return;
                }
                match poll.check(api_ready()) {
                    PollStep::Ready => {
                        on_ready();
                        return;
                    }
                    PollStep::GiveUp => {
                        warn!("Embed API did not load, giving up");
                        on_unavailable();
                        return;
                    }
                    PollStep::Wait => {}
                }
            }
        });
        Self { cancelled }
    }
}

impl Drop for EmbedLoader {
    fn drop(&mut self) {
        self.cancelled.set(true);
    }
}
