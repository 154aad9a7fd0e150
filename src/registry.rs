//! The set of active per-tab reloads.
//!
//! `ReloadRegistry` is a plain owned state object. It is driven from a single
//! task (see [`crate::scheduler`]), so none of its methods lock anything and
//! each one leaves the registry consistent before returning:
//!
//! - `active_count == entries.len()`
//! - tab listeners are attached iff `active_count > 0`
//! - the countdown ticker runs iff `active_count > 0` and countdown mode is on

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::entry::{BadgePalette, DisplayMode, ReloadEntry, MAX_INTERVAL_SECONDS};
use crate::host::{BrowserHost, TabEvent, TabId};
use crate::listeners::ListenerManager;

/// Timer notifications fed back into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// A tab's reload interval elapsed. `generation` identifies the entry
    /// whose timer fired, so wake-ups from replaced entries are dropped.
    ReloadDue { tab_id: TabId, generation: u64 },
    /// The countdown ticker fired.
    CountdownTick,
}

pub type WakeupSender = mpsc::UnboundedSender<Wakeup>;
pub type WakeupReceiver = mpsc::UnboundedReceiver<Wakeup>;

/// All active reloads, keyed by tab.
pub struct ReloadRegistry {
    host: Arc<dyn BrowserHost>,
    entries: HashMap<TabId, ReloadEntry>,
    active_count: usize,
    listeners: ListenerManager,
    display_mode: DisplayMode,
    palette: BadgePalette,
    wakeups: WakeupSender,
    next_generation: u64,
}

impl ReloadRegistry {
    /// Create an empty (idle) registry.
    ///
    /// Timers created by the registry report through `wakeups`; whoever owns
    /// the receiving end must hand them back via [`Self::handle_wakeup`].
    pub fn new(
        host: Arc<dyn BrowserHost>,
        display_mode: DisplayMode,
        palette: BadgePalette,
        wakeups: WakeupSender,
    ) -> Self {
        Self {
            host,
            entries: HashMap::new(),
            active_count: 0,
            listeners: ListenerManager::new(),
            display_mode,
            palette,
            wakeups,
            next_generation: 0,
        }
    }

    /// Set (or replace) the reload for a tab. Zero seconds clears it;
    /// anything above [`MAX_INTERVAL_SECONDS`] is clamped to it.
    pub fn set_reload(&mut self, tab_id: TabId, seconds: u64) {
        self.clear_reload(tab_id, false);
        if seconds == 0 {
            return;
        }
        let seconds = if seconds > MAX_INTERVAL_SECONDS {
            tracing::warn!(tab_id, seconds, max = MAX_INTERVAL_SECONDS, "Interval too long, clamping");
            MAX_INTERVAL_SECONDS
        } else {
            seconds
        };

        let generation = self.next_generation;
        self.next_generation += 1;

        let entry = ReloadEntry::create(tab_id, seconds, generation, &self.wakeups);
        entry.refresh_badge(self.host.as_ref(), self.display_mode, &self.palette);
        self.entries.insert(tab_id, entry);
        self.active_count += 1;
        tracing::debug!(tab_id, seconds, count = self.active_count, "Reload set");

        self.sync_listeners();
    }

    /// Remove the reload for a tab, if any.
    ///
    /// With `tab_was_removed` the badge is left alone, since the tab no
    /// longer exists to draw on.
    pub fn clear_reload(&mut self, tab_id: TabId, tab_was_removed: bool) {
        let Some(mut entry) = self.entries.remove(&tab_id) else {
            return;
        };

        if tab_was_removed {
            entry.invalidate_tab();
        }
        entry.deactivate(self.host.as_ref(), self.display_mode, &self.palette);
        self.active_count -= 1;
        tracing::debug!(tab_id, tab_was_removed, count = self.active_count, "Reload cleared");

        self.sync_listeners();
    }

    /// Remove every reload.
    pub fn clear_all_reloads(&mut self) {
        let tab_ids: Vec<TabId> = self.entries.keys().copied().collect();
        for tab_id in tab_ids {
            self.clear_reload(tab_id, false);
        }
        assert_eq!(self.active_count, 0);
    }

    /// Interval of the reload for a tab, or 0 if it has none.
    pub fn get_reload(&self, tab_id: TabId) -> u64 {
        self.entries
            .get(&tab_id)
            .map(ReloadEntry::interval_seconds)
            .unwrap_or(0)
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn entry(&self, tab_id: TabId) -> Option<&ReloadEntry> {
        self.entries.get(&tab_id)
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn is_listening(&self) -> bool {
        self.listeners.is_attached()
    }

    pub fn is_ticking(&self) -> bool {
        self.listeners.is_ticking()
    }

    /// Switch between interval and countdown badges.
    ///
    /// Starts or stops the ticker and redraws every badge right away.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        if mode == self.display_mode {
            return;
        }
        self.display_mode = mode;
        tracing::info!(?mode, count = self.active_count, "Display mode changed");

        self.sync_listeners();
        self.refresh_all_badges();
    }

    /// Apply a tab lifecycle notification. Ignored while idle.
    pub fn handle_tab_event(&mut self, event: &TabEvent) {
        if !self.listeners.is_attached() {
            return;
        }

        tracing::trace!(tab_id = event.tab_id(), ?event, "Tab event");
        match event {
            TabEvent::Updated { tab_id, status } => {
                if status != "loading" {
                    return;
                }
                // Browsers drop custom badges on navigation; draw it again.
                if let Some(entry) = self.entries.get(tab_id) {
                    entry.refresh_badge(self.host.as_ref(), self.display_mode, &self.palette);
                }
            }
            TabEvent::Removed { tab_id } => self.clear_reload(*tab_id, true),
        }
    }

    /// Apply a timer notification.
    pub fn handle_wakeup(&mut self, wakeup: Wakeup) {
        match wakeup {
            Wakeup::ReloadDue { tab_id, generation } => match self.entries.get_mut(&tab_id) {
                Some(entry) if entry.generation() == generation => {
                    entry.on_reload_fired(self.host.as_ref());
                }
                _ => tracing::trace!(tab_id, generation, "Dropping stale reload wakeup"),
            },
            Wakeup::CountdownTick => {
                // A tick may already be queued when the ticker is stopped.
                if self.listeners.is_ticking() {
                    self.refresh_all_badges();
                }
            }
        }
    }

    /// Redraw every active badge.
    pub fn refresh_all_badges(&self) {
        for entry in self.entries.values() {
            entry.refresh_badge(self.host.as_ref(), self.display_mode, &self.palette);
        }
    }

    fn sync_listeners(&mut self) {
        assert_eq!(
            self.active_count,
            self.entries.len(),
            "active reload count out of sync with registry"
        );
        self.listeners.sync(
            self.active_count,
            self.display_mode,
            self.host.as_ref(),
            &self.wakeups,
        );
    }
}
