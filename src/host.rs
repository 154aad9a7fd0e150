//! Host browser abstraction.
//!
//! The reload engine never talks to a browser directly. Everything it needs
//! from the outside world (reloading a tab, drawing a badge, hearing about
//! navigation and closed tabs) goes through [`BrowserHost`].

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Identifier of a browser tab.
pub type TabId = u32;

/// RGBA color of a badge background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeColor(pub [u8; 4]);

impl BadgeColor {
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.0;
        format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}

/// Text and background color of a tab's toolbar badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub color: BadgeColor,
}

/// Lifecycle notifications delivered by the host for any tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEvent {
    /// The tab's navigation state changed. Browsers clear custom badges when
    /// `status` becomes `"loading"`.
    Updated { tab_id: TabId, status: String },
    /// The tab was closed.
    Removed { tab_id: TabId },
}

impl TabEvent {
    /// Navigation-started notification for a tab.
    pub fn loading(tab_id: TabId) -> Self {
        TabEvent::Updated {
            tab_id,
            status: "loading".to_string(),
        }
    }

    pub fn tab_id(&self) -> TabId {
        match self {
            TabEvent::Updated { tab_id, .. } | TabEvent::Removed { tab_id } => *tab_id,
        }
    }
}

/// Browser operations consumed by the reload engine.
///
/// Every call is fire-and-forget: a reload or badge update aimed at a tab
/// that no longer exists is simply lost.
pub trait BrowserHost: Send + Sync {
    /// Reload a tab.
    fn reload_tab(&self, tab_id: TabId);

    /// Draw a badge on the toolbar icon for one tab.
    fn set_badge(&self, tab_id: TabId, badge: &Badge);

    /// The active tab of the current window, if any.
    fn active_tab(&self) -> Option<TabId>;

    /// Start delivering [`TabEvent`]s to the engine.
    fn subscribe_tab_events(&self);

    /// Stop delivering [`TabEvent`]s to the engine.
    fn unsubscribe_tab_events(&self);

    /// Install (or update) the "show countdown" context-menu checkbox.
    fn set_countdown_menu(&self, checked: bool);
}

/// A host that only logs what it is asked to do.
///
/// Used by the command-line driver, where there is no real browser.
#[derive(Debug, Default)]
pub struct TracingHost {
    active_tab: Mutex<Option<TabId>>,
}

impl TracingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the user switched to another tab.
    pub fn focus(&self, tab_id: TabId) {
        if let Ok(mut active) = self.active_tab.lock() {
            *active = Some(tab_id);
        }
    }
}

impl BrowserHost for TracingHost {
    fn reload_tab(&self, tab_id: TabId) {
        tracing::info!(tab_id, "Reloading tab");
    }

    fn set_badge(&self, tab_id: TabId, badge: &Badge) {
        tracing::debug!(
            tab_id,
            text = %badge.text,
            color = %badge.color.to_hex(),
            "Badge updated"
        );
    }

    fn active_tab(&self) -> Option<TabId> {
        self.active_tab.lock().ok().and_then(|active| *active)
    }

    fn subscribe_tab_events(&self) {
        tracing::debug!("Subscribed to tab events");
    }

    fn unsubscribe_tab_events(&self) {
        tracing::debug!("Unsubscribed from tab events");
    }

    fn set_countdown_menu(&self, checked: bool) {
        tracing::debug!(checked, "Countdown menu item updated");
    }
}

/// One call received by a [`MemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Reload(TabId),
    Badge(TabId, Badge),
    Subscribe,
    Unsubscribe,
    CountdownMenu(bool),
}

/// A host that records every call, for tests and benchmarks.
#[derive(Debug, Default)]
pub struct MemoryHost {
    calls: Mutex<Vec<HostCall>>,
    active_tab: Mutex<Option<TabId>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active_tab(tab_id: TabId) -> Self {
        let host = Self::default();
        host.focus(tab_id);
        host
    }

    pub fn focus(&self, tab_id: TabId) {
        if let Ok(mut active) = self.active_tab.lock() {
            *active = Some(tab_id);
        }
    }

    /// Snapshot of every call so far.
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Drain the recorded calls.
    pub fn take_calls(&self) -> Vec<HostCall> {
        self.calls
            .lock()
            .map(|mut c| std::mem::take(&mut *c))
            .unwrap_or_default()
    }

    /// Number of reloads issued for a tab.
    pub fn reloads(&self, tab_id: TabId) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == HostCall::Reload(tab_id))
            .count()
    }

    /// Text of the most recent badge drawn for a tab.
    pub fn last_badge(&self, tab_id: TabId) -> Option<Badge> {
        self.calls().into_iter().rev().find_map(|c| match c {
            HostCall::Badge(id, badge) if id == tab_id => Some(badge),
            _ => None,
        })
    }

    fn record(&self, call: HostCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl BrowserHost for MemoryHost {
    fn reload_tab(&self, tab_id: TabId) {
        self.record(HostCall::Reload(tab_id));
    }

    fn set_badge(&self, tab_id: TabId, badge: &Badge) {
        self.record(HostCall::Badge(tab_id, badge.clone()));
    }

    fn active_tab(&self) -> Option<TabId> {
        self.active_tab.lock().ok().and_then(|active| *active)
    }

    fn subscribe_tab_events(&self) {
        self.record(HostCall::Subscribe);
    }

    fn unsubscribe_tab_events(&self) {
        self.record(HostCall::Unsubscribe);
    }

    fn set_countdown_menu(&self, checked: bool) {
        self.record(HostCall::CountdownMenu(checked));
    }
}
