//! Tab lifecycle subscription, kept in step with the number of active reloads.
//!
//! ```text
//! idle   (0 reloads)  : not subscribed, ticker stopped
//! active (1+ reloads) : subscribed, ticker running iff countdown mode
//! ```

use crate::entry::DisplayMode;
use crate::host::BrowserHost;
use crate::registry::WakeupSender;
use crate::ticker::CountdownTicker;

/// Owns the tab-event subscription and the countdown ticker.
#[derive(Debug, Default)]
pub struct ListenerManager {
    attached: bool,
    ticker: CountdownTicker,
}

impl ListenerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether tab events are currently subscribed.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    /// Reconcile subscription and ticker with the current state.
    ///
    /// Must be called after every change to the active count or display mode.
    pub fn sync(
        &mut self,
        active_count: usize,
        mode: DisplayMode,
        host: &dyn BrowserHost,
        wakeups: &WakeupSender,
    ) {
        if active_count == 0 {
            self.detach(host);
            return;
        }

        self.attach(host);
        if mode.is_countdown() {
            self.ticker.start(wakeups);
        } else {
            self.ticker.stop();
        }
    }

    fn attach(&mut self, host: &dyn BrowserHost) {
        if self.attached {
            return;
        }
        host.subscribe_tab_events();
        self.attached = true;
        tracing::info!("Tab listeners attached");
    }

    fn detach(&mut self, host: &dyn BrowserHost) {
        self.ticker.stop();
        if !self.attached {
            return;
        }
        host.unsubscribe_tab_events();
        self.attached = false;
        tracing::info!("Tab listeners detached");
    }
}
