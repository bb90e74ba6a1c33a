//! # Configuration
//!
//! Two TOML files under the mod directory, both optional:
//!
//! ```text
//! <mod>/Config/config.toml        notification + reward settings
//! <mod>/Config/jar_contents.toml  manual content -> container overrides
//! <mod>/Sounds/<name>.ogg|.wav     custom notification sounds
//! ```
//!
//! Loading never fails. A missing or malformed file is logged at warning
//! level and the defaults apply: the registry then runs in dynamic-detection
//! only mode and the notification uses the built-in sound.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use jarkeeper_shared::DEFAULT_JAR_ITEM;

use crate::error::{EconomyError, EconomyResult};

/// Custom sound played when no sound is configured.
pub const DEFAULT_CUSTOM_SOUND: &str = "glass-shatter";

/// Game sound used when the default custom sound file is missing.
pub const FALLBACK_GAME_SOUND: &str = "glassdestroy";

/// Replacement item granted when a jar breaks.
pub const DEFAULT_REWARD_ITEM: &str = "resourceBrokenGlass";

/// Extensions probed for custom sound files, in order.
pub const SOUND_EXTENSIONS: [&str; 2] = ["ogg", "wav"];

/// One manual override entry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct JarContentEntry {
    /// Content item name.
    pub name: String,
    /// Container item name.
    #[serde(default = "default_jar")]
    pub jar: String,
}

fn default_jar() -> String {
    DEFAULT_JAR_ITEM.to_string()
}

#[derive(Debug, Default, Deserialize)]
struct JarContentsFile {
    #[serde(default, rename = "item")]
    items: Vec<JarContentEntry>,
}

/// Manual content -> container overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JarContentsConfig {
    /// Entries in file order. Names are non-empty.
    pub entries: Vec<JarContentEntry>,
}

impl JarContentsConfig {
    /// Parses the override table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the text is not valid TOML for the table.
    pub fn from_toml_str(text: &str) -> EconomyResult<Self> {
        let file: JarContentsFile =
            toml::from_str(text).map_err(|e| EconomyError::InvalidConfig(e.to_string()))?;
        let entries = file
            .items
            .into_iter()
            .filter(|entry| !entry.name.trim().is_empty())
            .map(|entry| JarContentEntry {
                name: entry.name.trim().to_string(),
                jar: if entry.jar.trim().is_empty() {
                    default_jar()
                } else {
                    entry.jar.trim().to_string()
                },
            })
            .collect();
        Ok(Self { entries })
    }

    /// Loads the override table from `path`, falling back to an empty table.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    "No {} found - using dynamic jar detection only",
                    path.display()
                );
                return Self::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}", path.display());
                return Self::default();
            }
        };

        match Self::from_toml_str(&text) {
            Ok(config) => {
                for entry in &config.entries {
                    tracing::debug!("Jar override: {} -> {}", entry.name, entry.jar);
                }
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {e}", path.display());
                Self::default()
            }
        }
    }
}

/// Validates a configured sound name.
///
/// Only bare names are accepted; anything that could address a path is
/// rejected.
///
/// # Errors
///
/// Returns `InvalidConfig` for empty names and names containing `/`, `\` or
/// `..`.
pub fn validate_sound_name(name: &str) -> EconomyResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EconomyError::InvalidConfig("sound name is empty".to_string()));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(EconomyError::InvalidConfig(format!(
            "sound name '{name}' contains a path"
        )));
    }
    Ok(name)
}

/// What the notification plays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SoundCue {
    /// A sound file shipped in the mod's `Sounds` folder.
    Custom {
        /// Sound name (file stem).
        name: String,
        /// Resolved file path.
        path: PathBuf,
    },
    /// A sound the host already knows by name.
    Game(String),
}

impl SoundCue {
    /// Name to play through the host's own sound table.
    ///
    /// For a custom cue this is the fallback used when the file cannot be
    /// played.
    #[must_use]
    pub fn game_name(&self) -> &str {
        match self {
            Self::Custom { .. } => FALLBACK_GAME_SOUND,
            Self::Game(name) => name,
        }
    }
}

/// Picks the cue for a (possibly absent) configured sound name.
///
/// A configured name with a matching file in `sounds_dir` is a custom cue;
/// without a file it is a game sound of that name. With no usable name the
/// default custom sound is used if present, else the fallback game sound.
#[must_use]
pub fn resolve_sound_cue(sounds_dir: &Path, configured: Option<&str>) -> SoundCue {
    let (name, configured) = match configured {
        Some(name) => (name, true),
        None => (DEFAULT_CUSTOM_SOUND, false),
    };

    for ext in SOUND_EXTENSIONS {
        let path = sounds_dir.join(format!("{name}.{ext}"));
        if path.is_file() {
            tracing::info!("Found custom sound file: {name}.{ext}");
            return SoundCue::Custom {
                name: name.to_string(),
                path,
            };
        }
    }

    if configured {
        SoundCue::Game(name.to_string())
    } else {
        tracing::warn!("Custom sound file not found: {name}. Falling back to game sound.");
        SoundCue::Game(FALLBACK_GAME_SOUND.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    sound_name: Option<String>,
    debug_mode: Option<bool>,
    notify_enabled: Option<bool>,
    reward_enabled: Option<bool>,
    reward_item: Option<String>,
    reward_count: Option<u32>,
}

/// Notification and reward settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Sound played when a jar breaks.
    pub sound: SoundCue,
    /// Verbose tracing of every tracked consumption.
    pub debug_mode: bool,
    /// Whether the break notification reaction is installed.
    pub notify_enabled: bool,
    /// Whether the replacement-grant reaction is installed.
    pub reward_enabled: bool,
    /// Item granted when a jar breaks.
    pub reward_item: String,
    /// Units granted per break.
    pub reward_count: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound: SoundCue::Game(FALLBACK_GAME_SOUND.to_string()),
            debug_mode: false,
            notify_enabled: true,
            reward_enabled: true,
            reward_item: DEFAULT_REWARD_ITEM.to_string(),
            reward_count: 1,
        }
    }
}

impl Settings {
    /// Parses settings text, resolving the sound against `sounds_dir`.
    ///
    /// Invalid individual values are logged and replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the text is not valid TOML.
    pub fn from_toml_str(text: &str, sounds_dir: &Path) -> EconomyResult<Self> {
        let file: SettingsFile =
            toml::from_str(text).map_err(|e| EconomyError::InvalidConfig(e.to_string()))?;
        Ok(Self::from_file(file, sounds_dir))
    }

    fn from_file(file: SettingsFile, sounds_dir: &Path) -> Self {
        let defaults = Self::default();

        let configured_sound = file
            .sound_name
            .as_deref()
            .and_then(|name| match validate_sound_name(name) {
                Ok(name) => Some(name),
                Err(e) => {
                    tracing::warn!("Invalid sound name: {e}. Using default.");
                    None
                }
            });

        let reward_item = file
            .reward_item
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .unwrap_or(defaults.reward_item);

        let reward_count = match file.reward_count {
            Some(0) => {
                tracing::warn!("reward_count must be at least 1. Using default.");
                defaults.reward_count
            }
            Some(count) => count,
            None => defaults.reward_count,
        };

        Self {
            sound: resolve_sound_cue(sounds_dir, configured_sound),
            debug_mode: file.debug_mode.unwrap_or(defaults.debug_mode),
            notify_enabled: file.notify_enabled.unwrap_or(defaults.notify_enabled),
            reward_enabled: file.reward_enabled.unwrap_or(defaults.reward_enabled),
            reward_item,
            reward_count,
        }
    }

    /// Loads settings from `config_path`, falling back to defaults.
    #[must_use]
    pub fn load(config_path: &Path, sounds_dir: &Path) -> Self {
        let file = match fs::read_to_string(config_path) {
            Ok(text) => match toml::from_str::<SettingsFile>(&text) {
                Ok(file) => file,
                Err(e) => {
                    tracing::warn!(
                        "Failed to load {}: {e}. Using defaults.",
                        config_path.display()
                    );
                    SettingsFile::default()
                }
            },
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        "Failed to read {}: {e}. Using defaults.",
                        config_path.display()
                    );
                }
                SettingsFile::default()
            }
        };
        if file.debug_mode == Some(true) {
            tracing::info!("Debug mode ENABLED");
        }
        Self::from_file(file, sounds_dir)
    }
}

/// Everything read from the mod directory at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModConfig {
    /// Notification and reward settings.
    pub settings: Settings,
    /// Manual jar overrides.
    pub jar_contents: JarContentsConfig,
}

impl ModConfig {
    /// Loads both files from `<mod_dir>/Config`.
    #[must_use]
    pub fn load(mod_dir: &Path) -> Self {
        let config_dir = mod_dir.join("Config");
        let sounds_dir = mod_dir.join("Sounds");
        Self {
            settings: Settings::load(&config_dir.join("config.toml"), &sounds_dir),
            jar_contents: JarContentsConfig::load(&config_dir.join("jar_contents.toml")),
        }
    }
}
