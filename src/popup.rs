//! Presentation model for the toolbar popup.
//!
//! The popup itself is host UI; this module decides what it shows and turns
//! button presses into scheduler requests for the active tab.

use serde::{Deserialize, Serialize};

use crate::error::AutoreloadResult;
use crate::format::{seconds_to_badge_text, split_seconds, SplitDuration};
use crate::host::BrowserHost;
use crate::scheduler::ReloadScheduler;

/// "No tabs", "1 tab", "3 tabs".
pub fn tabs_label(count: usize) -> String {
    match count {
        0 => "No tabs".to_string(),
        1 => "1 tab".to_string(),
        n => format!("{} tabs", n),
    }
}

/// The custom-duration form's spinbox values.
///
/// Values may step one past their range (a seconds spinbox at 0 stepped down
/// reads -1); [`DurationFields::normalize`] rolls them over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DurationFields {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl From<SplitDuration> for DurationFields {
    fn from(split: SplitDuration) -> Self {
        Self {
            days: split.days as i64,
            hours: split.hours as i64,
            minutes: split.minutes as i64,
            seconds: split.seconds as i64,
        }
    }
}

impl DurationFields {
    /// Carry overflow into the next larger unit and borrow on underflow.
    ///
    /// Borrowing only happens while some larger unit is positive; otherwise
    /// the field clamps at zero. Days never go below zero.
    pub fn normalize(&mut self) {
        if self.seconds < 0 {
            if self.minutes > 0 || self.hours > 0 || self.days > 0 {
                self.minutes = self.minutes.saturating_sub(1);
                self.seconds = 59;
            } else {
                self.seconds = 0;
            }
        } else if self.seconds >= 60 {
            self.minutes = self.minutes.saturating_add(self.seconds / 60);
            self.seconds %= 60;
        }

        if self.minutes < 0 {
            if self.hours > 0 || self.days > 0 {
                self.hours = self.hours.saturating_sub(1);
                self.minutes = 59;
            } else {
                self.minutes = 0;
            }
        } else if self.minutes >= 60 {
            self.hours = self.hours.saturating_add(self.minutes / 60);
            self.minutes %= 60;
        }

        if self.hours < 0 {
            if self.days > 0 {
                self.days = self.days.saturating_sub(1);
                self.hours = 23;
            } else {
                self.hours = 0;
            }
        } else if self.hours >= 24 {
            self.days = self.days.saturating_add(self.hours / 24);
            self.hours %= 24;
        }

        if self.days < 0 {
            self.days = 0;
        }
    }

    /// Total seconds; negative totals count as zero and huge ones saturate.
    pub fn total_seconds(&self) -> u64 {
        let total = self
            .days
            .saturating_mul(24)
            .saturating_add(self.hours)
            .saturating_mul(60)
            .saturating_add(self.minutes)
            .saturating_mul(60)
            .saturating_add(self.seconds);
        total.max(0) as u64
    }
}

/// One preset button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetButton {
    pub seconds: u64,
    pub label: String,
    /// The current tab already reloads at this interval; shown highlighted
    /// and disabled.
    pub active: bool,
}

/// Everything the popup renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupView {
    pub tabs_label: String,
    /// The "this tab" section (with its stop button).
    pub show_this_tab: bool,
    /// The "other tabs" section (with the stop-all button).
    pub show_other_tabs: bool,
    pub presets: Vec<PresetButton>,
    /// Pre-filled custom form.
    pub custom: DurationFields,
}

impl PopupView {
    pub fn build(current_interval: u64, active_count: usize, presets: &[u64]) -> Self {
        let has_reload = current_interval > 0;

        Self {
            tabs_label: tabs_label(active_count),
            show_this_tab: has_reload,
            show_other_tabs: active_count > 1 || (active_count == 1 && !has_reload),
            presets: presets
                .iter()
                .map(|&seconds| PresetButton {
                    seconds,
                    label: seconds_to_badge_text(seconds),
                    active: seconds == current_interval,
                })
                .collect(),
            custom: split_seconds(current_interval).into(),
        }
    }

    /// Query the scheduler for the host's active tab and build the view.
    ///
    /// Returns `None` when the host has no active tab.
    pub async fn load(
        scheduler: &ReloadScheduler,
        host: &dyn BrowserHost,
        presets: &[u64],
    ) -> AutoreloadResult<Option<Self>> {
        let Some(tab_id) = host.active_tab() else {
            return Ok(None);
        };

        let current_interval = scheduler.get_reload(tab_id).await?;
        let active_count = scheduler.get_how_many_reloads_are_active().await?;
        Ok(Some(Self::build(current_interval, active_count, presets)))
    }
}

/// Something the user did in the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupAction {
    Preset(u64),
    Custom(DurationFields),
    StopThisTab,
    StopAllTabs,
}

impl PopupAction {
    /// Apply the action to the host's active tab.
    pub async fn apply(
        &self,
        scheduler: &ReloadScheduler,
        host: &dyn BrowserHost,
    ) -> AutoreloadResult<()> {
        if let PopupAction::StopAllTabs = self {
            return scheduler.clear_all_reloads().await;
        }

        let Some(tab_id) = host.active_tab() else {
            tracing::warn!(action = ?self, "No active tab");
            return Ok(());
        };

        match self {
            PopupAction::Preset(seconds) => scheduler.set_reload(tab_id, *seconds).await,
            PopupAction::Custom(fields) => {
                let mut fields = *fields;
                fields.normalize();
                scheduler.set_reload(tab_id, fields.total_seconds()).await
            }
            PopupAction::StopThisTab => scheduler.clear_reload(tab_id).await,
            PopupAction::StopAllTabs => scheduler.clear_all_reloads().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::host::MemoryHost;
    use crate::settings::SettingsStore;
    use std::sync::Arc;

    fn fields(days: i64, hours: i64, minutes: i64, seconds: i64) -> DurationFields {
        DurationFields {
            days,
            hours,
            minutes,
            seconds,
        }
    }

    fn normalized(mut f: DurationFields) -> DurationFields {
        f.normalize();
        f
    }

    #[test]
    fn test_tabs_label() {
        assert_eq!(tabs_label(0), "No tabs");
        assert_eq!(tabs_label(1), "1 tab");
        assert_eq!(tabs_label(12), "12 tabs");
    }

    #[test]
    fn test_normalize_borrows() {
        assert_eq!(normalized(fields(0, 0, 1, -1)), fields(0, 0, 0, 59));
        assert_eq!(normalized(fields(0, 1, 0, -1)), fields(0, 0, 59, 59));
        assert_eq!(normalized(fields(1, 0, 0, -1)), fields(0, 23, 59, 59));
        assert_eq!(normalized(fields(2, -1, 0, 0)), fields(1, 23, 0, 0));
    }

    #[test]
    fn test_normalize_carries() {
        assert_eq!(normalized(fields(0, 0, 59, 60)), fields(0, 1, 0, 0));
        assert_eq!(normalized(fields(0, 23, 60, 0)), fields(1, 0, 0, 0));
        assert_eq!(normalized(fields(0, 24, 0, 0)), fields(1, 0, 0, 0));
    }

    #[test]
    fn test_normalize_clamps_at_zero() {
        assert_eq!(normalized(fields(0, 0, 0, -1)), fields(0, 0, 0, 0));
        assert_eq!(normalized(fields(0, 0, -1, 5)), fields(0, 0, 0, 5));
        assert_eq!(normalized(fields(-1, 3, 0, 0)), fields(0, 3, 0, 0));
    }

    #[test]
    fn test_total_seconds() {
        assert_eq!(fields(1, 2, 3, 4).total_seconds(), 93_784);
        assert_eq!(fields(0, 0, 0, -5).total_seconds(), 0);
        let split = split_seconds(93_784);
        assert_eq!(DurationFields::from(split).total_seconds(), 93_784);
    }

    #[test]
    fn test_huge_fields_saturate() {
        assert_eq!(fields(200_000_000_000_000, 0, 0, 0).total_seconds(), i64::MAX as u64);
        assert_eq!(fields(i64::MIN, 0, 0, 0).total_seconds(), 0);

        let f = normalized(fields(0, i64::MAX, i64::MAX, i64::MAX));
        assert_eq!(f.days, i64::MAX / 24);
        assert!((0..24).contains(&f.hours));

        let f = normalized(fields(1, 0, i64::MIN, -1));
        assert!(f.seconds >= 0 && f.minutes >= 0 && f.hours >= 0 && f.days >= 0);
    }

    #[test]
    fn test_view_for_untracked_tab() {
        let view = PopupView::build(0, 0, &[5, 30]);
        assert_eq!(view.tabs_label, "No tabs");
        assert!(!view.show_this_tab);
        assert!(!view.show_other_tabs);
        assert!(view.presets.iter().all(|p| !p.active));
        assert_eq!(view.custom, DurationFields::default());

        // Some other tab reloads
        let view = PopupView::build(0, 1, &[5, 30]);
        assert!(view.show_other_tabs);
    }

    #[test]
    fn test_view_for_tracked_tab() {
        let view = PopupView::build(30, 1, &[5, 30, 3600]);
        assert_eq!(view.tabs_label, "1 tab");
        assert!(view.show_this_tab);
        assert!(!view.show_other_tabs);

        let active: Vec<u64> = view
            .presets
            .iter()
            .filter(|p| p.active)
            .map(|p| p.seconds)
            .collect();
        assert_eq!(active, vec![30]);
        assert_eq!(view.presets[2].label, "1h");
        assert_eq!(view.custom, fields(0, 0, 0, 30));

        let view = PopupView::build(30, 3, &[]);
        assert!(view.show_this_tab);
        assert!(view.show_other_tabs);
    }

    #[tokio::test(start_paused = true)]
    async fn test_actions_target_active_tab() {
        let host = Arc::new(MemoryHost::with_active_tab(8));
        let dyn_host: Arc<dyn crate::host::BrowserHost> = host.clone();
        let mut scheduler =
            ReloadScheduler::new(dyn_host, SettingsStore::in_memory(), &Config::default());

        PopupAction::Preset(60)
            .apply(&scheduler, host.as_ref())
            .await
            .unwrap();
        let view = PopupView::load(&scheduler, host.as_ref(), &[60])
            .await
            .unwrap()
            .unwrap();
        assert!(view.presets[0].active);
        assert!(view.show_this_tab);

        PopupAction::Custom(fields(0, 1, 0, -1))
            .apply(&scheduler, host.as_ref())
            .await
            .unwrap();
        assert_eq!(scheduler.get_reload(8).await.unwrap(), 59 * 60 + 59);

        PopupAction::Custom(fields(200_000_000_000_000, 0, 0, 0))
            .apply(&scheduler, host.as_ref())
            .await
            .unwrap();
        assert_eq!(
            scheduler.get_reload(8).await.unwrap(),
            crate::entry::MAX_INTERVAL_SECONDS
        );

        host.focus(9);
        PopupAction::Preset(10)
            .apply(&scheduler, host.as_ref())
            .await
            .unwrap();
        PopupAction::StopThisTab
            .apply(&scheduler, host.as_ref())
            .await
            .unwrap();
        assert_eq!(scheduler.get_reload(9).await.unwrap(), 0);
        assert_eq!(scheduler.get_how_many_reloads_are_active().await.unwrap(), 1);

        PopupAction::StopAllTabs
            .apply(&scheduler, host.as_ref())
            .await
            .unwrap();
        assert_eq!(scheduler.get_how_many_reloads_are_active().await.unwrap(), 0);

        scheduler.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_active_tab() {
        let host = Arc::new(MemoryHost::new());
        let dyn_host: Arc<dyn crate::host::BrowserHost> = host.clone();
        let mut scheduler =
            ReloadScheduler::new(dyn_host, SettingsStore::in_memory(), &Config::default());

        assert!(PopupView::load(&scheduler, host.as_ref(), &[])
            .await
            .unwrap()
            .is_none());
        PopupAction::Preset(5)
            .apply(&scheduler, host.as_ref())
            .await
            .unwrap();
        assert_eq!(scheduler.get_how_many_reloads_are_active().await.unwrap(), 0);

        scheduler.shutdown().await.unwrap();
    }
}
