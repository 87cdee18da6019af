use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tolka_types::{Region, TextAlign, languages};

const APP_DIR_NAME: &str = "tolka";
const CONFIG_FILE_NAME: &str = "global_config.json";

fn default_monitor() -> u32 {
    0
}

fn default_text_color() -> String {
    "#FFFFFF".to_string()
}

fn default_text_size() -> u16 {
    16
}

fn default_background_color() -> String {
    "#00000066".to_string()
}

fn default_blur_background() -> bool {
    true
}

fn default_interval() -> u8 {
    1
}

fn default_lang() -> String {
    "en".to_string()
}

/// User-editable settings, persisted as JSON in the app config dir and
/// consumed by the overlay renderer and the capture runtime.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Capture rectangle; the overlay stays down until one is chosen.
    pub region: Option<Region>,
    /// Numeric monitor id as reported by the capture backend.
    #[serde(default = "default_monitor")]
    pub monitor: u32,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default = "default_text_size")]
    pub text_size: u16,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default = "default_blur_background")]
    pub blur_background: bool,
    /// Seconds between capture passes.
    #[serde(default = "default_interval")]
    pub interval: u8,
    /// Translation target, one of the supported language codes.
    #[serde(default = "default_lang")]
    pub lang: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: None,
            monitor: default_monitor(),
            text_color: default_text_color(),
            text_align: TextAlign::default(),
            text_size: default_text_size(),
            background_color: default_background_color(),
            blur_background: default_blur_background(),
            interval: default_interval(),
            lang: default_lang(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no config directory available on this platform")]
    NoConfigDir,

    #[error("capture region is degenerate (w and h must be > 0)")]
    InvalidRegion,

    #[error("unsupported language code: {0}")]
    UnknownLanguage(String),
}

impl Config {
    /// `<config_dir>/tolka/global_config.json`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push(APP_DIR_NAME);
        path.push(CONFIG_FILE_NAME);
        Ok(path)
    }

    /// Read the config file, creating it with defaults when missing.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save(path)?;
            tracing::info!(path = %path.display(), "wrote default config");
            return Ok(config);
        }

        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Check cross-field invariants a hand-edited file may violate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(region) = &self.region
            && !region.is_valid()
        {
            return Err(ConfigError::InvalidRegion);
        }

        if !languages::is_supported(&self.lang) {
            return Err(ConfigError::UnknownLanguage(self.lang.clone()));
        }

        Ok(())
    }

    /// Capture period with the zero floor applied.
    pub fn interval_secs(&self) -> u64 {
        self.interval.max(1) as u64
    }
}
