use log::Level;

use crate::gate::AfterDownload;

pub const VIDEO_ID: &str = "vm_spvQSRYE";
pub const CHANNEL_NAME: &str = "junglebootz";
pub const PDF_URL: &str = "https://drive.google.com/uc?export=download&id=1WNhdoPmArlx5qwNHXAkYFfnUlF0kLsUq";

/// Seconds of playback required before the download unlocks.
pub const REQUIRED_WATCH_TIME: u32 = 60;
pub const STORAGE_KEY: &str = "intel_portal_watch_time";

/// Id of the element the embed replaces with its iframe.
pub const PLAYER_ELEMENT_ID: &str = "youtube-player";

pub const TICK_MILLIS: u32 = 1_000;
pub const REMINDER_MILLIS: u32 = 5_000;
pub const EMBED_POLL_MILLIS: u32 = 100;
/// Polls before a missing embed API counts as an initialization failure.
pub const EMBED_POLL_LIMIT: u32 = 150;

pub const AFTER_DOWNLOAD: AfterDownload = AfterDownload::Stay;

pub fn subscribe_url() -> String {
    format!("https://www.youtube.com/@{}?sub_confirmation=1", CHANNEL_NAME)
}

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose driver transitions while developing
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}
