//! Configuration management for convo-edit.
//!
//! Handles:
//! - Editor behaviour (parser strictness, size limit, output naming)
//! - Mirroring of the export after every change
//! - Display and theme settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};
use crate::session::ImportOptions;
use crate::util::atomic_write;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Editor settings.
    #[serde(default)]
    pub editor: EditorConfig,
    /// Mirror settings.
    #[serde(default)]
    pub mirror: MirrorConfig,
    /// Display options.
    #[serde(default)]
    pub display: DisplayConfig,
    /// TUI theme.
    #[serde(default)]
    pub theme: ThemeConfig,
}

/// Project-specific configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = ".convo-edit.toml";

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        let config_path = default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration with project-specific overrides.
    ///
    /// Searches for `.convo-edit.toml` in `project_dir` and merges it over the
    /// global configuration.
    pub fn load_for_project(project_dir: &Path) -> Result<Self> {
        let mut config = Self::load().unwrap_or_default();

        let project_config_path = project_dir.join(PROJECT_CONFIG_FILENAME);
        if project_config_path.exists() {
            let project_config = Self::load_from(&project_config_path)?;
            config.merge_from(&project_config);
        }

        Ok(config)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EditorError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        toml::from_str(&content).map_err(|e| EditorError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Values equal to the built-in default in `other` are treated as unset.
    pub fn merge_from(&mut self, other: &Self) {
        let defaults = Self::default();

        if other.editor.output_suffix != defaults.editor.output_suffix {
            self.editor.output_suffix.clone_from(&other.editor.output_suffix);
        }
        if other.editor.max_file_size != defaults.editor.max_file_size {
            self.editor.max_file_size = other.editor.max_file_size;
        }
        self.editor.strict |= other.editor.strict;

        self.mirror.enabled |= other.mirror.enabled;
        if other.mirror.path.is_some() {
            self.mirror.path.clone_from(&other.mirror.path);
        }

        if other.display.preview_width != defaults.display.preview_width {
            self.display.preview_width = other.display.preview_width;
        }
        self.display.show_errors = other.display.show_errors;

        if other.theme.name != defaults.theme.name {
            self.theme.name.clone_from(&other.theme.name);
        }
        self.theme.color = other.theme.color;
        self.theme.unicode = other.theme.unicode;
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = default_config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific path, atomically.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| EditorError::InvalidConfig {
            message: format!("Failed to serialize config: {e}"),
        })?;

        atomic_write(path, content.as_bytes())
    }

    /// Parser options derived from the editor section.
    #[must_use]
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            lenient: !self.editor.strict,
            max_bytes: self.editor.max_file_size,
        }
    }

    /// Mirror target, if mirroring is enabled and a path is configured.
    #[must_use]
    pub fn mirror_path(&self) -> Option<&Path> {
        if self.mirror.enabled {
            self.mirror.path.as_deref()
        } else {
            None
        }
    }
}

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Suffix inserted before `.jsonl` for derived output files.
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
    /// Maximum input file size in bytes (0 = unlimited).
    #[serde(default)]
    pub max_file_size: u64,
    /// Reject the whole input on the first bad line.
    #[serde(default)]
    pub strict: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            output_suffix: default_output_suffix(),
            max_file_size: 0,
            strict: false,
        }
    }
}

/// Mirror configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Mirror the export after imports and edits.
    #[serde(default)]
    pub enabled: bool,
    /// File the export is mirrored to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Characters of the first message shown in list previews.
    #[serde(default = "default_preview_width")]
    pub preview_width: usize,
    /// Show parse errors alongside listings.
    #[serde(default = "default_true")]
    pub show_errors: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            preview_width: default_preview_width(),
            show_errors: true,
        }
    }
}

/// Theme configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Theme name.
    #[serde(default = "default_theme")]
    pub name: String,
    /// Use color output.
    #[serde(default = "default_true")]
    pub color: bool,
    /// Use Unicode characters.
    #[serde(default = "default_true")]
    pub unicode: bool,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: default_theme(),
            color: true,
            unicode: true,
        }
    }
}

// Default value functions for serde
const fn default_true() -> bool {
    true
}

fn default_output_suffix() -> String {
    "edited".to_string()
}

const fn default_preview_width() -> usize {
    80
}

fn default_theme() -> String {
    "dark".to_string()
}

/// Get the default configuration path.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| EditorError::unsupported("config directory discovery"))?;

    Ok(config_dir.join("convo-edit").join("config.toml"))
}
