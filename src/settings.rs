use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use once_cell::sync::Lazy;

use crate::version::DEFAULT_VERSION;

pub const CURRENT_VERSION: u32 = 2;
const SETTINGS_FILENAME: &str = ".parabible_settings.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_settings_version")]
    pub version: u32,

    #[serde(default = "default_bible_dir")]
    pub bible_dir: PathBuf,

    #[serde(default = "default_version_code")]
    pub default_version: String,

    /// Narrowest a split panel may get, in terminal columns.
    #[serde(default = "default_min_panel_width")]
    pub min_panel_width: u16,

    #[serde(default = "default_dark_theme")]
    pub dark_theme: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_settings_version() -> u32 {
    CURRENT_VERSION
}

fn default_bible_dir() -> PathBuf {
    PathBuf::from("txt_bibles")
}

fn default_version_code() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_min_panel_width() -> u16 {
    30
}

fn default_dark_theme() -> bool {
    true
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            bible_dir: default_bible_dir(),
            default_version: default_version_code(),
            min_panel_width: default_min_panel_width(),
            dark_theme: default_dark_theme(),
            log_level: default_log_level(),
        }
    }
}

static SETTINGS: Lazy<RwLock<Settings>> = Lazy::new(|| RwLock::new(Settings::default()));

fn settings_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(SETTINGS_FILENAME))
}

pub fn load_settings() {
    let Some(path) = settings_path() else {
        warn!("Could not determine home directory, using default settings");
        return;
    };

    if !path.exists() {
        info!(
            "Settings file not found at {:?}, creating with defaults",
            path
        );
        if let Ok(settings) = SETTINGS.read() {
            save_settings_to_file(&settings, &path);
        }
        return;
    }

    match fs::read_to_string(&path) {
        Ok(content) => match parse_settings(&content) {
            Ok((settings, migrated)) => {
                debug!("Loaded settings from {:?}", path);
                if migrated {
                    save_settings_to_file(&settings, &path);
                }
                if let Ok(mut global) = SETTINGS.write() {
                    *global = settings;
                }
            }
            Err(e) => {
                error!("Failed to parse settings file {:?}: {}", path, e);
            }
        },
        Err(e) => {
            error!("Failed to read settings file {:?}: {}", path, e);
        }
    }
}

/// Parses a settings file and brings it up to the current version. The flag
/// tells whether a migration ran and the file should be rewritten.
pub fn parse_settings(content: &str) -> Result<(Settings, bool), serde_yaml::Error> {
    let mut settings: Settings = serde_yaml::from_str(content)?;
    let migrated = settings.version < CURRENT_VERSION;
    if migrated {
        migrate_settings(&mut settings);
    }
    Ok((settings, migrated))
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    // v1 stored the panel floor in pixels.
    if settings.version < 2 && settings.min_panel_width > 200 {
        settings.min_panel_width = default_min_panel_width();
    }

    settings.version = CURRENT_VERSION;
}

pub fn save_settings() {
    let Some(path) = settings_path() else {
        warn!("Could not determine home directory, cannot save settings");
        return;
    };

    if let Ok(settings) = SETTINGS.read() {
        save_settings_to_file(&settings, &path);
    }
}

fn save_settings_to_file(settings: &Settings, path: &Path) {
    let content = generate_settings_yaml(settings);

    match fs::write(path, content) {
        Ok(()) => debug!("Saved settings to {:?}", path),
        Err(e) => error!("Failed to save settings to {:?}: {}", path, e),
    }
}

fn generate_settings_yaml(settings: &Settings) -> String {
    let mut content = String::from(SETTINGS_HEADER);

    content.push_str(&format!("version: {}\n", settings.version));
    content.push_str(&format!(
        "bible_dir: \"{}\"\n",
        settings.bible_dir.display()
    ));
    content.push_str(&format!(
        "default_version: \"{}\"\n",
        settings.default_version
    ));
    content.push_str(&format!("min_panel_width: {}\n", settings.min_panel_width));
    content.push_str(&format!("dark_theme: {}\n", settings.dark_theme));
    content.push_str(&format!("log_level: \"{}\"\n", settings.log_level));

    content
}

const SETTINGS_HEADER: &str = r#"# ============================================================================
# Parabible settings
# ============================================================================
# bible_dir        root of the text files (<language>/<version>/NN-book-version.txt)
# default_version  version used until one is picked in the reader
# min_panel_width  narrowest a split panel may get, in columns
# log_level        off, error, warn, info, debug or trace

"#;

// Public API for accessing/modifying settings

pub fn get_bible_dir() -> PathBuf {
    SETTINGS
        .read()
        .map(|s| s.bible_dir.clone())
        .unwrap_or_else(|_| default_bible_dir())
}

pub fn get_default_version() -> String {
    SETTINGS
        .read()
        .map(|s| s.default_version.clone())
        .unwrap_or_else(|_| default_version_code())
}

pub fn get_min_panel_width() -> u16 {
    SETTINGS
        .read()
        .map(|s| s.min_panel_width)
        .unwrap_or_else(|_| default_min_panel_width())
}

pub fn is_dark_theme() -> bool {
    SETTINGS
        .read()
        .map(|s| s.dark_theme)
        .unwrap_or_else(|_| default_dark_theme())
}

pub fn set_dark_theme(dark: bool) {
    if let Ok(mut settings) = SETTINGS.write() {
        settings.dark_theme = dark;
    }
    save_settings();
}

pub fn get_log_level() -> log::LevelFilter {
    let level = SETTINGS
        .read()
        .map(|s| s.log_level.clone())
        .unwrap_or_else(|_| default_log_level());
    level.parse().unwrap_or(log::LevelFilter::Debug)
}
