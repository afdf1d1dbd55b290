//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/faller/settings.toml (or platform equivalent)

use crate::gravity::DEFAULT_GRAVITY;
use crate::randomizer::RandomizerKind;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("could not serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("could not determine a configuration directory")]
    NoConfigDir,
}

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Keybindings
    pub keys: KeyBindings,
    /// Visual settings
    pub visual: VisualSettings,
    /// Gameplay settings
    pub gameplay: GameplaySettings,
    /// Where the highscore segments live
    pub storage: StorageSettings,
}

/// Key names per action. A field holds one name or a list of names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(with = "key_list")]
    pub move_left: Vec<String>,
    #[serde(with = "key_list")]
    pub move_right: Vec<String>,
    #[serde(with = "key_list")]
    pub rotate: Vec<String>,
    #[serde(with = "key_list")]
    pub soft_drop: Vec<String>,
    #[serde(with = "key_list")]
    pub hard_drop: Vec<String>,
    #[serde(with = "key_list")]
    pub quit: Vec<String>,
}

/// `"Left"` and `["Space", "Enter"]` forms of a key list
mod key_list {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Owned {
        One(String),
        Many(Vec<String>),
    }

    #[derive(Serialize)]
    #[serde(untagged)]
    enum Borrowed<'a> {
        One(&'a str),
        Many(&'a [String]),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Owned::deserialize(deserializer)? {
            Owned::One(key) => vec![key],
            Owned::Many(keys) => keys,
        })
    }

    pub fn serialize<S: Serializer>(keys: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        match keys {
            [key] => Borrowed::One(key),
            _ => Borrowed::Many(keys),
        }
        .serialize(serializer)
    }
}

fn names(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|key| key.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: names(&["Left"]),
            move_right: names(&["Right"]),
            rotate: names(&["Up"]),
            soft_drop: names(&["Down"]),
            hard_drop: names(&["Space", "Enter"]),
            quit: names(&["q"]),
        }
    }
}

/// How a filled cell is drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockStyle {
    #[default]
    Solid,
    Bracket,
    Round,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    pub block_style: BlockStyle,
}

impl VisualSettings {
    /// (filled, empty) strings for one two-column cell
    pub fn block_chars(&self) -> (&'static str, &'static str) {
        match self.block_style {
            BlockStyle::Solid => ("██", "  "),
            BlockStyle::Bracket => ("[]", " ."),
            BlockStyle::Round => ("()", " ."),
        }
    }
}

/// Gameplay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Initial gravity interval in milliseconds
    pub gravity_ms: u64,
    /// Next-piece selection
    pub randomizer: RandomizerKind,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            gravity_ms: DEFAULT_GRAVITY.as_millis() as u64,
            randomizer: RandomizerKind::default(),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding the two segment files
    pub data_dir: Option<PathBuf>,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "faller")
}

impl Settings {
    /// Get the default settings file path
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load settings from `path` or the default location, falling back to
    /// defaults on any error
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Self::default(),
            },
        };

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!("using default settings: {err}");
                Self::default()
            }
        }
    }

    /// Save settings to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Directory for the highscore segments
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(ConfigError::NoConfigDir)
    }
}
