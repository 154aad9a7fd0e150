//! The reload engine's event loop.
//!
//! All engine state lives in one tokio task. Callers (the popup, the host's
//! event dispatcher) talk to it through [`ReloadScheduler`]; timers talk to it
//! through the wake-up channel. Messages are handled strictly one at a time,
//! so a reload firing and a countdown tick for the same tab never overlap.
//!
//! ```text
//! ReloadScheduler ──SchedulerMessage──┐
//!                                     ├──> scheduler_loop ──> ReloadRegistry ──> BrowserHost
//! entry timers / ticker ──Wakeup──────┘
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::entry::{BadgePalette, DisplayMode};
use crate::error::{AutoreloadError, AutoreloadResult};
use crate::host::{BrowserHost, TabEvent, TabId};
use crate::registry::{ReloadRegistry, WakeupReceiver};
use crate::settings::SettingsStore;

/// Message types for communicating with the scheduler.
#[derive(Debug)]
pub enum SchedulerMessage {
    /// Set or replace a tab's reload; zero seconds clears it.
    SetReload { tab_id: TabId, seconds: u64 },

    /// Clear a tab's reload.
    ClearReload { tab_id: TabId },

    /// Clear every reload.
    ClearAll,

    /// Query a tab's interval (0 if none).
    GetReload {
        tab_id: TabId,
        reply: oneshot::Sender<u64>,
    },

    /// Query the number of active reloads.
    ActiveCount { reply: oneshot::Sender<usize> },

    /// Query the display mode.
    GetDisplayMode { reply: oneshot::Sender<DisplayMode> },

    /// Flip between interval and countdown badges, replying with the new mode.
    ToggleCountdown { reply: oneshot::Sender<DisplayMode> },

    /// A tab lifecycle notification from the host.
    TabEvent(TabEvent),

    /// Shutdown the scheduler.
    Shutdown,
}

/// Handle to the running reload engine.
pub struct ReloadScheduler {
    /// Channel for sending messages to the scheduler task.
    tx: mpsc::Sender<SchedulerMessage>,

    /// Handle to the scheduler task.
    task_handle: Option<JoinHandle<()>>,
}

impl ReloadScheduler {
    /// Start the engine. Must be called from within a tokio runtime.
    ///
    /// The countdown flag is read from `settings` once, here, and the host's
    /// context-menu checkbox is installed to match.
    pub fn new(host: Arc<dyn BrowserHost>, settings: SettingsStore, config: &Config) -> Self {
        let (tx, rx) = mpsc::channel(64);
        let (wakeup_tx, wakeup_rx) = mpsc::unbounded_channel();

        let mode = DisplayMode::from_countdown(settings.countdown_enabled());
        host.set_countdown_menu(mode.is_countdown());

        let palette = BadgePalette {
            interval: config.badge.interval(),
            countdown: config.badge.countdown(),
        };
        let registry = ReloadRegistry::new(Arc::clone(&host), mode, palette, wakeup_tx);
        tracing::info!(?mode, "Reload scheduler started");

        let task_handle = tokio::spawn(async move {
            scheduler_loop(rx, wakeup_rx, registry, settings, host).await;
        });

        Self {
            tx,
            task_handle: Some(task_handle),
        }
    }

    /// Set (or replace) the reload for a tab. Zero seconds clears it.
    pub async fn set_reload(&self, tab_id: TabId, seconds: u64) -> AutoreloadResult<()> {
        self.send(SchedulerMessage::SetReload { tab_id, seconds }).await
    }

    /// Clear the reload for a tab. Does nothing if it has none.
    pub async fn clear_reload(&self, tab_id: TabId) -> AutoreloadResult<()> {
        self.send(SchedulerMessage::ClearReload { tab_id }).await
    }

    /// Clear every reload.
    pub async fn clear_all_reloads(&self) -> AutoreloadResult<()> {
        self.send(SchedulerMessage::ClearAll).await
    }

    /// Interval of a tab's reload in seconds, or 0.
    pub async fn get_reload(&self, tab_id: TabId) -> AutoreloadResult<u64> {
        self.request(|reply| SchedulerMessage::GetReload { tab_id, reply })
            .await
    }

    /// Number of tabs with an active reload.
    pub async fn get_how_many_reloads_are_active(&self) -> AutoreloadResult<usize> {
        self.request(|reply| SchedulerMessage::ActiveCount { reply })
            .await
    }

    pub async fn display_mode(&self) -> AutoreloadResult<DisplayMode> {
        self.request(|reply| SchedulerMessage::GetDisplayMode { reply })
            .await
    }

    /// Flip the countdown display and persist it. Returns the new mode.
    pub async fn toggle_countdown(&self) -> AutoreloadResult<DisplayMode> {
        self.request(|reply| SchedulerMessage::ToggleCountdown { reply })
            .await
    }

    /// Forward a tab lifecycle notification from the host.
    pub async fn tab_event(&self, event: TabEvent) -> AutoreloadResult<()> {
        self.send(SchedulerMessage::TabEvent(event)).await
    }

    /// Clear every reload and stop the scheduler task.
    pub async fn shutdown(&mut self) -> AutoreloadResult<()> {
        let _ = self.tx.send(SchedulerMessage::Shutdown).await;

        if let Some(handle) = self.task_handle.take() {
            handle
                .await
                .map_err(|e| AutoreloadError::SchedulerFailed(e.to_string()))?;
        }

        Ok(())
    }

    async fn send(&self, msg: SchedulerMessage) -> AutoreloadResult<()> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| AutoreloadError::SchedulerClosed)
    }

    async fn request<T>(
        &self,
        msg: impl FnOnce(oneshot::Sender<T>) -> SchedulerMessage,
    ) -> AutoreloadResult<T> {
        let (reply, rx) = oneshot::channel();
        self.send(msg(reply)).await?;
        rx.await.map_err(|_| AutoreloadError::SchedulerClosed)
    }
}

/// Main scheduler loop that runs in a tokio task.
async fn scheduler_loop(
    mut rx: mpsc::Receiver<SchedulerMessage>,
    mut wakeups: WakeupReceiver,
    mut registry: ReloadRegistry,
    mut settings: SettingsStore,
    host: Arc<dyn BrowserHost>,
) {
    loop {
        tokio::select! {
            biased;

            msg = rx.recv() => match msg {
                Some(SchedulerMessage::Shutdown) | None => break,
                Some(msg) => handle_message(msg, &mut registry, &mut settings, host.as_ref()),
            },

            Some(wakeup) = wakeups.recv() => registry.handle_wakeup(wakeup),
        }
    }

    registry.clear_all_reloads();
    tracing::info!("Reload scheduler stopped");
}

/// Handle a scheduler message.
fn handle_message(
    msg: SchedulerMessage,
    registry: &mut ReloadRegistry,
    settings: &mut SettingsStore,
    host: &dyn BrowserHost,
) {
    match msg {
        SchedulerMessage::SetReload { tab_id, seconds } => registry.set_reload(tab_id, seconds),

        SchedulerMessage::ClearReload { tab_id } => registry.clear_reload(tab_id, false),

        SchedulerMessage::ClearAll => registry.clear_all_reloads(),

        SchedulerMessage::GetReload { tab_id, reply } => {
            let _ = reply.send(registry.get_reload(tab_id));
        }

        SchedulerMessage::ActiveCount { reply } => {
            let _ = reply.send(registry.active_count());
        }

        SchedulerMessage::GetDisplayMode { reply } => {
            let _ = reply.send(registry.display_mode());
        }

        SchedulerMessage::ToggleCountdown { reply } => {
            let mode = registry.display_mode().toggled();
            if let Err(e) = settings.set_countdown_enabled(mode.is_countdown()) {
                tracing::warn!(error = %e, "Failed to persist countdown setting");
            }
            registry.set_display_mode(mode);
            host.set_countdown_menu(mode.is_countdown());
            let _ = reply.send(mode);
        }

        SchedulerMessage::TabEvent(event) => registry.handle_tab_event(&event),

        SchedulerMessage::Shutdown => {
            // Handled by the loop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostCall, MemoryHost};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time;

    fn start(host: &Arc<MemoryHost>, settings: SettingsStore) -> ReloadScheduler {
        let host: Arc<dyn BrowserHost> = host.clone();
        ReloadScheduler::new(host, settings, &Config::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_installs_menu() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut settings = SettingsStore::open(temp_dir.path());
            settings.set_countdown_enabled(true).unwrap();
        }

        let host = Arc::new(MemoryHost::new());
        let mut scheduler = start(&host, SettingsStore::open(temp_dir.path()));

        assert_eq!(scheduler.display_mode().await.unwrap(), DisplayMode::Countdown);
        assert_eq!(host.calls().first(), Some(&HostCall::CountdownMenu(true)));
        scheduler.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_are_ordered() {
        let host = Arc::new(MemoryHost::new());
        let mut scheduler = start(&host, SettingsStore::in_memory());

        scheduler.set_reload(1, 30).await.unwrap();
        scheduler.set_reload(2, 60).await.unwrap();
        scheduler.clear_reload(1).await.unwrap();

        assert_eq!(scheduler.get_reload(1).await.unwrap(), 0);
        assert_eq!(scheduler.get_reload(2).await.unwrap(), 60);
        assert_eq!(scheduler.get_how_many_reloads_are_active().await.unwrap(), 1);

        scheduler.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reloads_fire() {
        let host = Arc::new(MemoryHost::new());
        let mut scheduler = start(&host, SettingsStore::in_memory());

        scheduler.set_reload(1, 2).await.unwrap();
        time::sleep(Duration::from_millis(6_500)).await;
        // Round-trip so every queued wake-up has been applied.
        scheduler.get_reload(1).await.unwrap();

        assert_eq!(host.reloads(1), 3);
        scheduler.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_persists() {
        let temp_dir = TempDir::new().unwrap();
        let host = Arc::new(MemoryHost::new());
        let mut scheduler = start(&host, SettingsStore::open(temp_dir.path()));

        assert_eq!(scheduler.toggle_countdown().await.unwrap(), DisplayMode::Countdown);
        scheduler.shutdown().await.unwrap();

        assert!(SettingsStore::open(temp_dir.path()).countdown_enabled());
        assert_eq!(host.calls().last(), Some(&HostCall::CountdownMenu(true)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_clears_and_closes() {
        let host = Arc::new(MemoryHost::new());
        let mut scheduler = start(&host, SettingsStore::in_memory());

        scheduler.set_reload(1, 5).await.unwrap();
        scheduler.shutdown().await.unwrap();

        assert_eq!(host.last_badge(1).map(|b| b.text), Some(String::new()));
        assert_eq!(host.calls().last(), Some(&HostCall::Unsubscribe));
        assert!(matches!(
            scheduler.get_reload(1).await,
            Err(AutoreloadError::SchedulerClosed)
        ));
    }
}
