//! Static configuration loaded from `config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AutoreloadError, AutoreloadResult};
use crate::host::BadgeColor;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub badge: BadgeConfig,
    pub popup: PopupConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeConfig {
    /// Background while the badge shows the configured interval.
    pub interval_color: String,
    /// Background while the badge shows a live countdown.
    pub countdown_color: String,
}

impl BadgeConfig {
    pub fn interval(&self) -> BadgeColor {
        parse_hex_color(&self.interval_color).unwrap_or(DEFAULT_INTERVAL_COLOR)
    }

    pub fn countdown(&self) -> BadgeColor {
        parse_hex_color(&self.countdown_color).unwrap_or(DEFAULT_COUNTDOWN_COLOR)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    /// Preset buttons, in seconds.
    pub presets: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub settings_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

const DEFAULT_INTERVAL_COLOR: BadgeColor = BadgeColor([92, 107, 192, 255]);
const DEFAULT_COUNTDOWN_COLOR: BadgeColor = BadgeColor([230, 81, 0, 255]);

#[allow(clippy::derivable_impls)]
impl Default for Config {
    fn default() -> Self {
        Self {
            badge: BadgeConfig::default(),
            popup: PopupConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            interval_color: DEFAULT_INTERVAL_COLOR.to_hex(),
            countdown_color: DEFAULT_COUNTDOWN_COLOR.to_hex(),
        }
    }
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            presets: vec![5, 10, 15, 30, 60, 120, 300, 600, 900, 1800, 3600],
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_dir: dirs::data_dir()
                .map(|d| d.join("tab-autoreload"))
                .unwrap_or_else(|| PathBuf::from("/tmp/tab-autoreload")),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
            })
            .join("tab-autoreload")
            .join("config.toml")
    }

    /// Load config from the default path, or return defaults if not found
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`. Unreadable or malformed files fall back to
    /// defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        let mut config = if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config");
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read config");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.validate();
        config
    }

    /// Validate and normalize config values
    fn validate(&mut self) {
        // Presets must be positive, ascending and unique
        self.popup.presets.retain(|&s| s > 0);
        self.popup.presets.sort_unstable();
        self.popup.presets.dedup();

        if parse_hex_color(&self.badge.interval_color).is_none() {
            tracing::warn!(color = %self.badge.interval_color, "Invalid interval badge color");
            self.badge.interval_color = DEFAULT_INTERVAL_COLOR.to_hex();
        }
        if parse_hex_color(&self.badge.countdown_color).is_none() {
            tracing::warn!(color = %self.badge.countdown_color, "Invalid countdown badge color");
            self.badge.countdown_color = DEFAULT_COUNTDOWN_COLOR.to_hex();
        }
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> AutoreloadResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AutoreloadError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)?;
        Ok(())
    }
}

/// Parse a hex color like "#5c6bc0" or "#5c6bc0ff".
pub fn parse_hex_color(hex: &str) -> Option<BadgeColor> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Some(BadgeColor([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#5c6bc0"), Some(BadgeColor([92, 107, 192, 255])));
        assert_eq!(parse_hex_color("e6510080"), Some(BadgeColor([230, 81, 0, 128])));
        assert_eq!(parse_hex_color("#abc"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("nope.toml"));
        assert_eq!(config.popup.presets, PopupConfig::default().presets);
        assert_eq!(config.badge.interval(), DEFAULT_INTERVAL_COLOR);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_is_validated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[popup]\npresets = [30, 0, 5, 30]\n\n[badge]\ncountdown_color = \"bogus\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.popup.presets, vec![5, 30]);
        assert_eq!(config.badge.countdown(), DEFAULT_COUNTDOWN_COLOR);
        assert_eq!(config.badge.interval(), DEFAULT_INTERVAL_COLOR);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[popup\npresets = ").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.popup.presets, PopupConfig::default().presets);
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.popup.presets = vec![42];
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).popup.presets, vec![42]);
    }
}
