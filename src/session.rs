use std::rc::Rc;

use log::{debug, info, warn};
use yew::prelude::*;

use crate::config::{REQUIRED_WATCH_TIME, STORAGE_KEY};
use crate::countdown::Countdown;
use crate::player::{PlayerError, PlayerState};

/// Durable home of the remaining-seconds counter.
pub trait ProgressStore {
    fn load(&self) -> Option<String>;
    fn save(&mut self, value: &str);
}

/// `localStorage` under [`STORAGE_KEY`].
pub struct LocalProgressStore;

impl LocalProgressStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

impl ProgressStore for LocalProgressStore {
    fn load(&self) -> Option<String> {
        Self::storage().and_then(|storage| storage.get_item(STORAGE_KEY).ok().flatten())
    }

    fn save(&mut self, value: &str) {
        match Self::storage() {
            Some(storage) => {
                if let Err(e) = storage.set_item(STORAGE_KEY, value) {
                    warn!("Failed to persist watch progress: {:?}", e);
                }
            }
            None => warn!("Local storage unavailable, watch progress not persisted"),
        }
    }
}

pub enum SessionAction {
    Playback(PlayerState),
    Tick,
    Failed(PlayerError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct WatchSession {
    seconds_remaining: u32,
    is_playing: bool,
    last_error: Option<PlayerError>,
}

impl WatchSession {
    pub fn fresh() -> Self {
        Self::starting_at(REQUIRED_WATCH_TIME)
    }

    fn starting_at(seconds_remaining: u32) -> Self {
        Self {
            seconds_remaining,
            is_playing: false,
            last_error: None,
        }
    }

    /// Picks up where a previous page load left off. The stored value can
    /// only shorten the countdown, never extend it.
    pub fn resume_from(stored: Option<&str>) -> Self {
        let Some(raw) = stored else {
            return Self::fresh();
        };
        match leading_integer(raw) {
            Some(value) if value <= 0 => Self::starting_at(0),
            Some(value) => Self::starting_at(value.min(REQUIRED_WATCH_TIME as i64) as u32),
            None => {
                warn!("Ignoring unreadable stored watch time {:?}", raw);
                Self::fresh()
            }
        }
    }

    pub fn restore(store: &impl ProgressStore) -> Self {
        let session = Self::resume_from(store.load().as_deref());
        info!(
            "Watch session restored: {}s remaining, unlocked: {}",
            session.seconds_remaining,
            session.is_unlocked()
        );
        session
    }

    pub fn persist(&self, store: &mut impl ProgressStore) {
        store.save(&self.seconds_remaining.to_string());
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_unlocked(&self) -> bool {
        self.seconds_remaining == 0
    }

    pub fn last_error(&self) -> Option<&PlayerError> {
        self.last_error.as_ref()
    }

    pub fn countdown(&self) -> Countdown {
        Countdown::evaluate(self.is_playing, self.seconds_remaining)
    }

    /// Share of the required watch time already served, 0.0 to 100.0.
    pub fn progress_percent(&self) -> f64 {
        let watched = REQUIRED_WATCH_TIME - self.seconds_remaining;
        watched as f64 / REQUIRED_WATCH_TIME as f64 * 100.0
    }

    /// Applies one event. Returns false when the event left the session
    /// untouched.
    pub fn apply(&mut self, action: SessionAction) -> bool {
        match action {
            SessionAction::Playback(state) => {
                let playing = state.is_playing();
                debug!("Playback state {:?}", state);
                let changed = playing != self.is_playing || (playing && self.last_error.is_some());
                self.is_playing = playing;
                if playing {
                    self.last_error = None;
                }
                changed
            }
            SessionAction::Tick => {
                if self.countdown() == Countdown::Idle {
                    debug!("Dropping tick while idle");
                    return false;
                }
                self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
                if self.is_unlocked() {
                    info!("Required watch time reached, download unlocked");
                }
                true
            }
            SessionAction::Failed(error) => {
                warn!("Playback failed: {}", error);
                self.is_playing = false;
                self.last_error = Some(error);
                true
            }
        }
    }
}

impl Reducible for WatchSession {
    type Action = SessionAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        if next.apply(action) {
            Rc::new(next)
        } else {
            self
        }
    }
}

/// Reads the integer at the start of `raw`: leading whitespace, an optional
/// sign, then decimal digits. Anything after the digits is ignored, so
/// `"42abc"` is 42 and `"30.7"` is 30. None when no digit follows.
fn leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: &str = &digits[..digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len())];
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.bytes().fold(0i64, |acc, d| {
        acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// `m:ss`, as shown on the countdown.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        value: Option<String>,
        writes: Vec<String>,
    }

    impl MemoryStore {
        fn holding(value: &str) -> Self {
            Self {
                value: Some(value.to_string()),
                writes: Vec::new(),
            }
        }
    }

    impl ProgressStore for MemoryStore {
        fn load(&self) -> Option<String> {
            self.value.clone()
        }

        fn save(&mut self, value: &str) {
            self.value = Some(value.to_string());
            self.writes.push(value.to_string());
        }
    }

    fn playing() -> SessionAction {
        SessionAction::Playback(PlayerState::Playing)
    }

    fn paused() -> SessionAction {
        SessionAction::Playback(PlayerState::Paused)
    }

    #[test]
    fn fresh_session_starts_at_full_duration() {
        let session = WatchSession::restore(&MemoryStore::default());
        assert_eq!(session.seconds_remaining(), 60);
        assert!(!session.is_unlocked());
        assert!(!session.is_playing());
        assert_eq!(session.last_error(), None);
    }

    #[test]
    fn stored_zero_or_less_starts_unlocked() {
        for stored in ["0", "-5"] {
            let mut session = WatchSession::restore(&MemoryStore::holding(stored));
            assert_eq!(session.seconds_remaining(), 0);
            assert!(session.is_unlocked());

            session.apply(playing());
            assert_eq!(session.countdown(), Countdown::Idle);
            assert!(!session.apply(SessionAction::Tick));
            assert_eq!(session.seconds_remaining(), 0);
        }
    }

    #[test]
    fn stored_positive_value_resumes() {
        let session = WatchSession::restore(&MemoryStore::holding("42"));
        assert_eq!(session.seconds_remaining(), 42);
        assert!(!session.is_unlocked());

        let session = WatchSession::restore(&MemoryStore::holding("60"));
        assert_eq!(session.seconds_remaining(), 60);
    }

    #[test]
    fn stored_value_never_extends_the_countdown() {
        let session = WatchSession::restore(&MemoryStore::holding("600"));
        assert_eq!(session.seconds_remaining(), 60);
    }

    #[test]
    fn unreadable_stored_value_starts_fresh() {
        for stored in ["", "   ", "soon", "-", "+x", ".5"] {
            let session = WatchSession::resume_from(Some(stored));
            assert_eq!(session.seconds_remaining(), 60, "stored {:?}", stored);
        }
    }

    #[test]
    fn stored_value_keeps_its_leading_integer() {
        let cases = [
            ("42abc", 42),
            ("30.7", 30),
            ("1.5e3", 1),
            (" 17 ", 17),
            ("+25", 25),
            ("-3s", 0),
            ("-0", 0),
            ("99999999999999999999999", 60),
        ];
        for (stored, expected) in cases {
            let session = WatchSession::resume_from(Some(stored));
            assert_eq!(session.seconds_remaining(), expected, "stored {:?}", stored);
        }
    }

    #[test]
    fn restore_then_persist_round_trips_through_the_store() {
        let mut store = MemoryStore::holding("42abc");
        let mut session = WatchSession::restore(&store);
        session.persist(&mut store);
        assert_eq!(store.writes, vec!["42"]);

        session.apply(playing());
        session.apply(SessionAction::Tick);
        session.persist(&mut store);
        assert_eq!(WatchSession::restore(&store).seconds_remaining(), 41);
    }

    #[test]
    fn sixty_ticks_of_playback_unlock() {
        let mut session = WatchSession::fresh();
        session.apply(playing());

        for _ in 0..60 {
            assert!(!session.is_unlocked());
            assert!(session.apply(SessionAction::Tick));
        }

        assert_eq!(session.seconds_remaining(), 0);
        assert!(session.is_unlocked());
        assert_eq!(session.countdown(), Countdown::Idle);
    }

    #[test]
    fn ticks_while_paused_are_ignored() {
        let mut session = WatchSession::fresh();
        session.apply(playing());
        session.apply(SessionAction::Tick);
        session.apply(paused());

        assert!(!session.apply(SessionAction::Tick));
        assert_eq!(session.seconds_remaining(), 59);

        for state in [PlayerState::Buffering, PlayerState::Ended, PlayerState::Cued] {
            session.apply(SessionAction::Playback(state));
            assert!(!session.apply(SessionAction::Tick));
        }
        assert_eq!(session.seconds_remaining(), 59);
    }

    #[test]
    fn configuration_error_halts_countdown() {
        let mut session = WatchSession::fresh();
        session.apply(playing());
        session.apply(SessionAction::Tick);

        session.apply(SessionAction::Failed(PlayerError::from_code(153)));

        assert_eq!(session.last_error(), Some(&PlayerError::Configuration));
        assert_eq!(
            session.last_error().map(|e| e.to_string()).as_deref(),
            Some("Configuration or origin error")
        );
        assert!(!session.is_playing());
        assert_eq!(session.countdown(), Countdown::Idle);
        assert!(!session.apply(SessionAction::Tick));
        assert_eq!(session.seconds_remaining(), 59);
    }

    #[test]
    fn resumed_playback_clears_error() {
        let mut session = WatchSession::fresh();
        session.apply(SessionAction::Failed(PlayerError::Unknown(5)));
        assert!(session.last_error().is_some());

        session.apply(paused());
        assert!(session.last_error().is_some());

        assert!(session.apply(playing()));
        assert_eq!(session.last_error(), None);
        assert_eq!(session.countdown(), Countdown::Active);
    }

    #[test]
    fn repeated_playing_reports_no_change() {
        let mut session = WatchSession::fresh();
        assert!(session.apply(playing()));
        assert!(!session.apply(playing()));
        assert!(session.apply(paused()));
        assert!(!session.apply(paused()));
    }

    #[test]
    fn persist_writes_remaining_seconds() {
        let mut store = MemoryStore::default();
        let mut session = WatchSession::restore(&store);
        session.apply(playing());

        for _ in 0..3 {
            session.apply(SessionAction::Tick);
            session.persist(&mut store);
        }

        assert_eq!(store.writes, vec!["59", "58", "57"]);
        let reloaded = WatchSession::restore(&store);
        assert_eq!(reloaded.seconds_remaining(), 57);
    }

    #[test]
    fn reducer_keeps_identity_for_ignored_events() {
        let session = Rc::new(WatchSession::fresh());
        let same = session.clone().reduce(SessionAction::Tick);
        assert!(Rc::ptr_eq(&session, &same));

        let next = session.clone().reduce(playing());
        assert!(!Rc::ptr_eq(&session, &next));
        assert!(next.is_playing());
    }

    #[test]
    fn progress_tracks_watched_share() {
        assert_eq!(WatchSession::fresh().progress_percent(), 0.0);
        assert_eq!(WatchSession::resume_from(Some("30")).progress_percent(), 50.0);
        assert_eq!(WatchSession::resume_from(Some("0")).progress_percent(), 100.0);
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(60), "1:00");
        assert_eq!(format_clock(59), "0:59");
        assert_eq!(format_clock(5), "0:05");
        assert_eq!(format_clock(0), "0:00");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn action(step: u8) -> SessionAction {
            match step % 5 {
                0 => playing(),
                1 => paused(),
                2 => SessionAction::Playback(PlayerState::Buffering),
                3 => SessionAction::Failed(PlayerError::from_code(150)),
                _ => SessionAction::Tick,
            }
        }

        proptest! {
            /// Remaining time never grows, never underflows, and the gate
            /// never closes again once open.
            #[test]
            fn prop_countdown_is_monotonic(
                start in prop::option::of(-10i64..100),
                steps in prop::collection::vec(0u8..10, 0..200)
            ) {
                let stored = start.map(|v| v.to_string());
                let mut session = WatchSession::resume_from(stored.as_deref());
                prop_assert!(session.seconds_remaining() <= REQUIRED_WATCH_TIME);

                let mut was_unlocked = session.is_unlocked();
                for step in steps {
                    let before = session.seconds_remaining();
                    session.apply(action(step));
                    let after = session.seconds_remaining();

                    prop_assert!(after <= before);
                    prop_assert!(before - after <= 1);
                    prop_assert_eq!(session.is_unlocked(), after == 0);
                    if was_unlocked {
                        prop_assert!(session.is_unlocked());
                    }
                    was_unlocked = session.is_unlocked();
                }
            }
        }
    }
}
