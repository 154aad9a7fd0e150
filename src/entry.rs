//! A single tab's auto-reload schedule.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::format::seconds_to_badge_text;
use crate::host::{Badge, BadgeColor, BrowserHost, TabId};
use crate::registry::{Wakeup, WakeupSender};

/// Longest supported interval: 730 days. Longer requests are clamped to it.
pub const MAX_INTERVAL_SECONDS: u64 = 730 * 24 * 60 * 60;

/// What badges show while a reload is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// The configured interval, e.g. `30"`.
    #[default]
    Interval,
    /// Time left until the next reload, refreshed every second.
    Countdown,
}

impl DisplayMode {
    pub fn from_countdown(countdown: bool) -> Self {
        if countdown {
            DisplayMode::Countdown
        } else {
            DisplayMode::Interval
        }
    }

    pub fn is_countdown(&self) -> bool {
        *self == DisplayMode::Countdown
    }

    pub fn toggled(&self) -> Self {
        match self {
            DisplayMode::Interval => DisplayMode::Countdown,
            DisplayMode::Countdown => DisplayMode::Interval,
        }
    }
}

/// Badge background per display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgePalette {
    pub interval: BadgeColor,
    pub countdown: BadgeColor,
}

impl BadgePalette {
    fn color(&self, mode: DisplayMode) -> BadgeColor {
        match mode {
            DisplayMode::Interval => self.interval,
            DisplayMode::Countdown => self.countdown,
        }
    }
}

/// One tab's recurring reload.
///
/// The timer runs as its own task and only sends [`Wakeup::ReloadDue`]
/// tagged with this entry's generation; the registry applies it.
#[derive(Debug)]
pub struct ReloadEntry {
    /// `None` once the tab has been closed.
    tab_id: Option<TabId>,
    interval_seconds: u64,
    next_reload_deadline: Option<Instant>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl ReloadEntry {
    /// Start a recurring reload for `tab_id`. `interval_seconds` must be in
    /// `1..=MAX_INTERVAL_SECONDS`.
    pub(crate) fn create(
        tab_id: TabId,
        interval_seconds: u64,
        generation: u64,
        wakeups: &WakeupSender,
    ) -> Self {
        debug_assert!((1..=MAX_INTERVAL_SECONDS).contains(&interval_seconds));

        let period = Duration::from_secs(interval_seconds);
        let deadline = Instant::now() + period;
        let timer = spawn_reload_timer(tab_id, generation, deadline, period, wakeups.clone());

        Self {
            tab_id: Some(tab_id),
            interval_seconds,
            next_reload_deadline: Some(deadline),
            generation,
            timer: Some(timer),
        }
    }

    pub fn interval_seconds(&self) -> u64 {
        self.interval_seconds
    }

    pub fn next_reload_deadline(&self) -> Option<Instant> {
        self.next_reload_deadline
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// The interval elapsed: push the deadline out and reload the tab.
    ///
    /// The next deadline follows the timer's own schedule, so a wake-up
    /// handled late does not shift the countdown.
    pub(crate) fn on_reload_fired(&mut self, host: &dyn BrowserHost) {
        if !self.is_active() {
            return;
        }
        let now = Instant::now();
        let period = Duration::from_secs(self.interval_seconds);
        let next = self
            .next_reload_deadline
            .map(|deadline| deadline + period)
            .filter(|&next| next > now)
            .unwrap_or(now + period);
        self.next_reload_deadline = Some(next);
        if let Some(tab_id) = self.tab_id {
            tracing::debug!(tab_id, seconds = self.interval_seconds, "Reload fired");
            host.reload_tab(tab_id);
        }
    }

    /// Badge for this entry as of `now`.
    pub fn badge(&self, mode: DisplayMode, palette: &BadgePalette, now: Instant) -> Badge {
        let text = match (self.is_active(), mode) {
            (false, _) => String::new(),
            (true, DisplayMode::Countdown) => {
                let remaining = self
                    .next_reload_deadline
                    .map(|deadline| deadline.saturating_duration_since(now))
                    .unwrap_or_default();
                let seconds = (remaining.as_millis() + 500) / 1000;
                if seconds == 0 {
                    "now".to_string()
                } else {
                    seconds_to_badge_text(seconds as u64)
                }
            }
            (true, DisplayMode::Interval) => seconds_to_badge_text(self.interval_seconds),
        };

        Badge {
            text,
            color: palette.color(mode),
        }
    }

    /// Redraw the badge. Skipped once the tab is gone.
    pub(crate) fn refresh_badge(
        &self,
        host: &dyn BrowserHost,
        mode: DisplayMode,
        palette: &BadgePalette,
    ) {
        if let Some(tab_id) = self.tab_id {
            host.set_badge(tab_id, &self.badge(mode, palette, Instant::now()));
        }
    }

    /// Mark the owning tab as closed so nothing is drawn on it any more.
    pub(crate) fn invalidate_tab(&mut self) {
        self.tab_id = None;
    }

    /// Cancel the timer and clear the badge.
    pub(crate) fn deactivate(
        &mut self,
        host: &dyn BrowserHost,
        mode: DisplayMode,
        palette: &BadgePalette,
    ) {
        self.cancel_timer();
        self.next_reload_deadline = None;
        self.refresh_badge(host, mode, palette);
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for ReloadEntry {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

fn spawn_reload_timer(
    tab_id: TabId,
    generation: u64,
    first: Instant,
    period: Duration,
    wakeups: WakeupSender,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval_at(first, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if wakeups.send(Wakeup::ReloadDue { tab_id, generation }).is_err() {
                break;
            }
        }
    })
}
