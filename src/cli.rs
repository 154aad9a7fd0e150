//! Command-line driver.
//!
//! Without a browser, the engine is driven by line commands on stdin. Each
//! line maps onto one engine request, a simulated tab event, or a popup
//! action against the focused tab.

use std::path::PathBuf;

use clap::Parser;

use crate::host::TabId;
use crate::popup::{DurationFields, PopupAction};

#[derive(Debug, Parser)]
#[command(name = "tab-autoreload")]
#[command(about = "Per-tab auto-reload scheduler with badge countdowns", long_about = None)]
pub struct Cli {
    /// Config file (default: <config dir>/tab-autoreload/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Switch to countdown badges and save the setting
    #[arg(long, conflicts_with = "no_countdown")]
    pub countdown: bool,

    /// Switch to interval badges and save the setting
    #[arg(long)]
    pub no_countdown: bool,

    /// Write the effective config (defaults filled in) and exit
    #[arg(long)]
    pub write_config: bool,
}

impl Cli {
    /// The countdown override requested on the command line, if any.
    pub fn countdown_override(&self) -> Option<bool> {
        match (self.countdown, self.no_countdown) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// One stdin command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Set { tab_id: TabId, seconds: u64 },
    Clear { tab_id: TabId },
    ClearAll,
    Get { tab_id: TabId },
    Count,
    Toggle,
    /// Simulate a navigation starting in a tab.
    Navigate { tab_id: TabId },
    /// Simulate a tab being closed.
    Close { tab_id: TabId },
    /// Make a tab the active one for popup commands.
    Focus { tab_id: TabId },
    /// Show the popup for the active tab.
    Popup,
    /// Press a popup button for the active tab.
    Action(PopupAction),
    Help,
    Quit,
}

pub const HELP: &str = "\
set <tab> <secs>        set or replace a tab's reload (0 clears)
clear <tab>             clear a tab's reload
clear-all               clear every reload
get <tab>               show a tab's interval
count                   show how many tabs reload
toggle                  switch interval/countdown badges
navigate <tab>          simulate a page load in a tab
close <tab>             simulate closing a tab
focus <tab>             make a tab the active one
popup                   show the popup for the active tab
preset <secs>           popup: preset button
custom <d> <h> <m> <s>  popup: custom form
stop                    popup: stop this tab
stop-all                popup: stop all tabs
quit                    exit";

impl ShellCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match (name, args) {
            ("set", [tab, secs]) => ShellCommand::Set {
                tab_id: parse_tab(tab)?,
                seconds: parse_number(secs)?,
            },
            ("clear", [tab]) => ShellCommand::Clear {
                tab_id: parse_tab(tab)?,
            },
            ("clear-all", []) => ShellCommand::ClearAll,
            ("get", [tab]) => ShellCommand::Get {
                tab_id: parse_tab(tab)?,
            },
            ("count", []) => ShellCommand::Count,
            ("toggle", []) => ShellCommand::Toggle,
            ("navigate", [tab]) => ShellCommand::Navigate {
                tab_id: parse_tab(tab)?,
            },
            ("close", [tab]) => ShellCommand::Close {
                tab_id: parse_tab(tab)?,
            },
            ("focus", [tab]) => ShellCommand::Focus {
                tab_id: parse_tab(tab)?,
            },
            ("popup", []) => ShellCommand::Popup,
            ("preset", [secs]) => ShellCommand::Action(PopupAction::Preset(parse_number(secs)?)),
            ("custom", [d, h, m, s]) => ShellCommand::Action(PopupAction::Custom(DurationFields {
                days: parse_signed(d)?,
                hours: parse_signed(h)?,
                minutes: parse_signed(m)?,
                seconds: parse_signed(s)?,
            })),
            ("stop", []) => ShellCommand::Action(PopupAction::StopThisTab),
            ("stop-all", []) => ShellCommand::Action(PopupAction::StopAllTabs),
            ("help", []) => ShellCommand::Help,
            ("quit" | "exit", []) => ShellCommand::Quit,
            _ => return Err(format!("Unknown command: {}", line.trim())),
        };

        Ok(Some(command))
    }
}

fn parse_tab(word: &str) -> Result<TabId, String> {
    word.parse()
        .map_err(|_| format!("Invalid tab id: {}", word))
}

fn parse_number(word: &str) -> Result<u64, String> {
    word.parse()
        .map_err(|_| format!("Invalid number of seconds: {}", word))
}

fn parse_signed(word: &str) -> Result<i64, String> {
    word.parse().map_err(|_| format!("Invalid number: {}", word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ShellCommand::parse("set 3 30").unwrap(),
            Some(ShellCommand::Set {
                tab_id: 3,
                seconds: 30
            })
        );
        assert_eq!(
            ShellCommand::parse("  close 7 ").unwrap(),
            Some(ShellCommand::Close { tab_id: 7 })
        );
        assert_eq!(
            ShellCommand::parse("custom 0 1 0 -1").unwrap(),
            Some(ShellCommand::Action(PopupAction::Custom(DurationFields {
                days: 0,
                hours: 1,
                minutes: 0,
                seconds: -1
            })))
        );
        assert_eq!(ShellCommand::parse("exit").unwrap(), Some(ShellCommand::Quit));
        assert_eq!(ShellCommand::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(ShellCommand::parse("set 3").is_err());
        assert!(ShellCommand::parse("set x 30").is_err());
        assert!(ShellCommand::parse("set 3 -5").is_err());
        assert!(ShellCommand::parse("reboot").is_err());
    }

    #[test]
    fn test_write_config_flag() {
        let cli = Cli::parse_from(["tab-autoreload", "--write-config", "--config", "/tmp/c.toml"]);
        assert!(cli.write_config);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_countdown_override() {
        let cli = Cli::parse_from(["tab-autoreload", "--countdown"]);
        assert_eq!(cli.countdown_override(), Some(true));

        let cli = Cli::parse_from(["tab-autoreload", "--no-countdown"]);
        assert_eq!(cli.countdown_override(), Some(false));

        let cli = Cli::parse_from(["tab-autoreload"]);
        assert_eq!(cli.countdown_override(), None);
        assert!(!cli.write_config);
        assert!(Cli::try_parse_from(["tab-autoreload", "--countdown", "--no-countdown"]).is_err());
    }
}
