use crate::Result;
use crate::error::MarktestError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::Level;

/// Engine configuration, read from `marktest.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub report: ReportConfig,
    pub capture: CaptureConfig,
    pub traceback: TracebackConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Colour the status header of each report
    pub color: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    /// Least severe tracing level recorded as a diagnostic
    pub level: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl CaptureConfig {
    pub fn level(&self) -> Result<Level> {
        self.level
            .parse::<Level>()
            .map_err(|_| MarktestError::Config(format!("Unknown capture level: {}", self.level)))
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TracebackConfig {
    /// Extra path prefixes whose frames are hidden from tracebacks
    pub internal_paths: Vec<String>,
}

impl Config {
    /// Config file name
    const CONFIG_FILE: &'static str = "marktest.toml";

    /// Load the config file at `path`
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&content)?;
        config.capture.level()?;
        Ok(config)
    }

    /// Find and load the config file.
    /// Lookup order:
    /// 1. current directory and its ancestors
    /// 2. ~/.config/marktest/
    pub fn find_and_load() -> Option<Config> {
        if let Some(config) = Self::try_load_from_current_dir() {
            return Some(config);
        }

        Self::try_load_from_user_dir()
    }

    fn try_load_from_current_dir() -> Option<Config> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                tracing::debug!(path = %config_path.display(), "Loading config");
                return Self::load_logged(&config_path);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    fn try_load_from_user_dir() -> Option<Config> {
        let home = dirs::home_dir()?;
        let config_path = home.join(".config").join("marktest").join(Self::CONFIG_FILE);

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "Loading config");
            Self::load_logged(&config_path)
        } else {
            None
        }
    }

    fn load_logged(path: &Path) -> Option<Config> {
        match Self::load_from_path(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Ignoring config file: {}", e);
                None
            }
        }
    }
}
