//! tab-autoreload - per-tab auto-reload scheduling with badge countdowns.
//!
//! Designated browser tabs are reloaded on their own interval, and each one
//! carries a small toolbar badge showing either the interval (`30"`, `5'`,
//! `1h30`) or a live countdown to the next reload.
//!
//! # Architecture
//!
//! - [`format`] - Compact duration rendering for badges
//! - [`entry`] - One tab's reload timer and badge
//! - [`registry`] - All active reloads, kept in step with listeners and ticker
//! - [`listeners`] - Tab lifecycle subscription (attached only while busy)
//! - [`ticker`] - One-second countdown ticker
//! - [`scheduler`] - The single task that owns the registry
//! - [`host`] - The browser, as seen by the engine
//! - [`popup`] - Popup presentation model
//! - [`config`] / [`settings`] - Static configuration and persisted settings
//! - [`cli`] - Command-line driver
//!
//! ```text
//! ReloadScheduler (task)
//! └── ReloadRegistry
//!     ├── entries: HashMap<TabId, ReloadEntry>   (one timer task each)
//!     └── ListenerManager
//!         └── CountdownTicker                    (countdown mode only)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tab_autoreload::{Config, ReloadScheduler, SettingsStore, TracingHost};
//!
//! let config = Config::load();
//! let settings = SettingsStore::open(&config.storage.settings_dir);
//! let scheduler = ReloadScheduler::new(Arc::new(TracingHost::new()), settings, &config);
//!
//! scheduler.set_reload(42, 30).await?;
//! ```

pub mod cli;
pub mod config;
pub mod entry;
pub mod format;
pub mod host;
pub mod listeners;
pub mod popup;
pub mod registry;
pub mod scheduler;
pub mod settings;
pub mod ticker;

mod error;

pub use config::Config;
pub use entry::{BadgePalette, DisplayMode, ReloadEntry, MAX_INTERVAL_SECONDS};
pub use error::{AutoreloadError, AutoreloadResult};
pub use format::{seconds_to_badge_text, split_seconds, SplitDuration};
pub use host::{Badge, BadgeColor, BrowserHost, MemoryHost, TabEvent, TabId, TracingHost};
pub use popup::{DurationFields, PopupAction, PopupView};
pub use registry::{ReloadRegistry, Wakeup};
pub use scheduler::ReloadScheduler;
pub use settings::SettingsStore;
