/*
 * Application settings: where the calendar keeps its data, how the view opens,
 * the notification window and the log level. Settings are stored as pretty
 * JSON (`settings.json`) in the platform's local configuration directory. A
 * missing file yields `AppSettings::default()`; fields absent from an older
 * file take their default values.
 *
 * `ConfigManagerOperations` is the seam; `CoreConfigManager` resolves the
 * directory through `path_utils`.
 */
use crate::core::path_utils;
use crate::core::view_state::{TimeScale, ViewMode};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

pub const SETTINGS_FILENAME: &str = "settings.json";
pub const DEFAULT_BACKUP_FILE_NAME: &str = "calendar_backup.calbak";
pub const DEFAULT_UPCOMING_WINDOW_HOURS: i64 = 24;

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoProjectDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::Serde(e) => write!(f, "Settings file is not valid JSON: {e}"),
            ConfigError::NoProjectDirectory => {
                write!(f, "Could not determine project directory for configuration")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Serde(e) => Some(e),
            ConfigError::NoProjectDirectory => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Overrides the platform data directory when set.
    pub data_dir: Option<PathBuf>,
    pub default_mode: ViewMode,
    pub default_scale: TimeScale,
    pub upcoming_window_hours: i64,
    pub backup_file_name: String,
    pub log_level: LogLevel,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            data_dir: None,
            default_mode: ViewMode::default(),
            default_scale: TimeScale::default(),
            upcoming_window_hours: DEFAULT_UPCOMING_WINDOW_HOURS,
            backup_file_name: DEFAULT_BACKUP_FILE_NAME.to_string(),
            log_level: LogLevel::default(),
        }
    }
}

impl AppSettings {
    /*
     * The directory holding the events file: the configured override, or the
     * platform's local data directory for `app_name`.
     */
    pub fn resolve_data_dir(&self, app_name: &str) -> Option<PathBuf> {
        match &self.data_dir {
            Some(dir) => Some(dir.clone()),
            None => path_utils::get_app_data_local_dir(app_name),
        }
    }
}

pub trait ConfigManagerOperations: Send + Sync {
    fn load_settings(&self, app_name: &str) -> Result<AppSettings>;
    fn save_settings(&self, app_name: &str, settings: &AppSettings) -> Result<()>;
}

pub struct CoreConfigManager {}

impl CoreConfigManager {
    pub fn new() -> Self {
        CoreConfigManager {}
    }

    fn settings_file_path(app_name: &str) -> Result<PathBuf> {
        let config_dir = path_utils::get_base_app_config_local_dir(app_name)
            .ok_or(ConfigError::NoProjectDirectory)?;
        Ok(config_dir.join(SETTINGS_FILENAME))
    }
}

impl Default for CoreConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    fn load_settings(&self, app_name: &str) -> Result<AppSettings> {
        log::trace!("CoreConfigManager: Loading settings for app '{app_name}'");
        let file_path = Self::settings_file_path(app_name)?;

        if !file_path.exists() {
            log::debug!("CoreConfigManager: Settings file {file_path:?} does not exist; using defaults.");
            return Ok(AppSettings::default());
        }

        let file = File::open(&file_path)?;
        let settings: AppSettings = serde_json::from_reader(BufReader::new(file))?;
        log::debug!("CoreConfigManager: Loaded settings from {file_path:?}.");
        Ok(settings)
    }

    fn save_settings(&self, app_name: &str, settings: &AppSettings) -> Result<()> {
        log::trace!("CoreConfigManager: Saving settings for app '{app_name}'");
        let file_path = Self::settings_file_path(app_name)?;
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(&file_path)?);
        serde_json::to_writer_pretty(&mut writer, settings)?;
        writer.flush()?;
        log::debug!("CoreConfigManager: Saved settings to {file_path:?}.");
        Ok(())
    }
}
