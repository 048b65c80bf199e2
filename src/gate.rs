use gloo_timers::callback::Timeout;
use log::{info, warn};

/// What happens to the page once the download has been opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AfterDownload {
    Stay,
    Reload,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownloadOutcome {
    Locked,
    Opened,
}

pub trait Navigator {
    fn open_in_new_context(&mut self, url: &str);
    fn reload(&mut self);
}

pub struct WindowNavigator;

impl Navigator for WindowNavigator {
    fn open_in_new_context(&mut self, url: &str) {
        let Some(window) = web_sys::window() else {
            warn!("No window to open {} from", url);
            return;
        };
        if let Err(e) = window.open_with_url_and_target(url, "_blank") {
            warn!("Failed to open download: {:?}", e);
        }
    }

    fn reload(&mut self) {
        // Give the new tab a moment to open before the page goes away.
        let timeout = Timeout::new(100, reload_page);
        timeout.forget();
    }
}

pub fn reload_page() {
    if let Some(window) = web_sys::window() {
        let _ = window.location().reload();
    }
}

pub fn trigger_download(
    unlocked: bool,
    url: &str,
    after: AfterDownload,
    navigator: &mut impl Navigator,
) -> DownloadOutcome {
    if !unlocked {
        return DownloadOutcome::Locked;
    }
    info!("Opening download");
    navigator.open_in_new_context(url);
    if after == AfterDownload::Reload {
        navigator.reload();
    }
    DownloadOutcome::Opened
}
