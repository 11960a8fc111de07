//! Config model and persistence helpers.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Top-level configuration stored in `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Loop timing and behavior toggles.
    pub general: GeneralCfg,
    /// Capture geometry for the observed screen.
    pub screenshot: ScreenshotCfg,
    /// Response cache behavior.
    pub cache: CacheCfg,
    /// File locations used by the app.
    pub paths: PathsCfg,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralCfg {
    /// Seconds between observation rounds.
    pub interval_seconds: i64,
    /// Suppress spoken/printed commentary.
    pub silent_mode: bool,
    /// Keep the interval fixed even when a round runs long.
    pub strict_interval: bool,
}

/// Screenshot capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotCfg {
    /// Capture width in pixels.
    pub width: i64,
    /// Capture height in pixels.
    pub height: i64,
    /// 1-based monitor index to capture.
    pub monitor_index: i64,
}

/// Cache settings for repeated observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheCfg {
    /// Bypass the response cache entirely.
    pub disable_cache: bool,
    /// Seconds a cached response stays valid.
    pub ttl_seconds: i64,
}

/// Paths to data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsCfg {
    /// Style store location.
    pub styles_file: String,
    /// Log file location.
    pub log_file: String,
}

impl Config {
    /// Load from disk or create defaults when missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let s = fs::read_to_string(path)?;
            Ok(toml::from_str(&s)?)
        } else {
            let cfg = Self::default();
            cfg.save(path)?;
            Ok(cfg)
        }
    }

    /// Persist the config as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let s = toml::to_string_pretty(self)?;
        fs::write(path, s)?;
        Ok(())
    }

    /// Read a boolean setting by attribute name. The settings screen is
    /// table-driven, so lookups go through these accessors instead of
    /// field access.
    pub fn bool_value(&self, attr: &str) -> Option<bool> {
        match attr {
            "silent_mode" => Some(self.general.silent_mode),
            "strict_interval" => Some(self.general.strict_interval),
            "disable_cache" => Some(self.cache.disable_cache),
            _ => None,
        }
    }

    /// Write a boolean setting by attribute name. Returns false for
    /// unknown attributes.
    pub fn set_bool(&mut self, attr: &str, value: bool) -> bool {
        match attr {
            "silent_mode" => self.general.silent_mode = value,
            "strict_interval" => self.general.strict_interval = value,
            "disable_cache" => self.cache.disable_cache = value,
            _ => return false,
        }
        true
    }

    /// Read an integer setting by attribute name.
    pub fn int_value(&self, attr: &str) -> Option<i64> {
        match attr {
            "interval_seconds" => Some(self.general.interval_seconds),
            "screenshot_width" => Some(self.screenshot.width),
            "screenshot_height" => Some(self.screenshot.height),
            "screenshot_monitor_index" => Some(self.screenshot.monitor_index),
            "cache_ttl_seconds" => Some(self.cache.ttl_seconds),
            _ => None,
        }
    }

    /// Write an integer setting by attribute name. Returns false for
    /// unknown attributes.
    pub fn set_int(&mut self, attr: &str, value: i64) -> bool {
        match attr {
            "interval_seconds" => self.general.interval_seconds = value,
            "screenshot_width" => self.screenshot.width = value,
            "screenshot_height" => self.screenshot.height = value,
            "screenshot_monitor_index" => self.screenshot.monitor_index = value,
            "cache_ttl_seconds" => self.cache.ttl_seconds = value,
            _ => return false,
        }
        true
    }
}

impl Default for Config {
    /// Defaults match the observer's original capture setup.
    fn default() -> Self {
        Self {
            general: GeneralCfg {
                interval_seconds: 15,
                silent_mode: false,
                strict_interval: false,
            },
            screenshot: ScreenshotCfg {
                width: 1000,
                height: 1080,
                monitor_index: 1,
            },
            cache: CacheCfg {
                disable_cache: false,
                ttl_seconds: 45,
            },
            paths: PathsCfg {
                styles_file: "styles.json".into(),
                log_file: "commentator_tui.log".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_accessors() {
        let mut cfg = Config::default();
        assert_eq!(cfg.bool_value("silent_mode"), Some(false));
        assert!(cfg.set_bool("silent_mode", true));
        assert_eq!(cfg.bool_value("silent_mode"), Some(true));

        assert_eq!(cfg.int_value("screenshot_width"), Some(1000));
        assert!(cfg.set_int("screenshot_width", 1920));
        assert_eq!(cfg.int_value("screenshot_width"), Some(1920));

        // Unknown attributes are reported, not silently dropped.
        assert_eq!(cfg.bool_value("no_such_attr"), None);
        assert!(!cfg.set_bool("no_such_attr", true));
        assert_eq!(cfg.int_value("no_such_attr"), None);
        assert!(!cfg.set_int("no_such_attr", 1));
    }

    #[test]
    fn test_load_or_default_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        // First load creates the file with defaults.
        let mut cfg = Config::load_or_default(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.general.interval_seconds, 15);

        // Edits survive a save/load cycle.
        cfg.general.interval_seconds = 30;
        cfg.save(&path).unwrap();
        let reloaded = Config::load_or_default(&path).unwrap();
        assert_eq!(reloaded.general.interval_seconds, 30);
    }
}
