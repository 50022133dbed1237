//! textflow configuration
//!
//! Loads itemization and layout parameters from `textflow.toml`, with
//! environment variables overriding file values.

use std::path::Path;

use serde::de::IntoDeserializer;
use serde::{Deserialize, Serialize};
use textflow::ItemizeOptions;
use textflow::layout::LayoutOptions;
use textflow::unicode::Language;
use thiserror::Error;

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "textflow.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TextflowConfig {
    /// Paragraph itemization settings
    pub itemize: ItemizeOptions,
    /// Line layout settings
    pub layout: LayoutOptions,
}

impl TextflowConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load `textflow.toml` from the current directory, or the defaults
    /// if it is missing or malformed.
    pub fn load_or_default() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_FILE).unwrap_or_default()
    }

    /// Apply `TEXTFLOW_*` environment variables over the current values.
    ///
    /// Values that do not parse are ignored.
    pub fn merge_with_env(&mut self) {
        self.merge_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides looked up through `var`, keyed by environment
    /// variable name.
    pub fn merge_with(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Layout settings
        if let Some(wrap) = var("TEXTFLOW_WRAP").and_then(|v| parse_enum(&v)) {
            self.layout.wrap = wrap;
        }
        if let Some(ellipsize) = var("TEXTFLOW_ELLIPSIZE").and_then(|v| parse_enum(&v)) {
            self.layout.ellipsize = ellipsize;
        }
        if let Some(align) = var("TEXTFLOW_ALIGN").and_then(|v| parse_enum(&v)) {
            self.layout.align = align;
        }
        if let Some(spacing) = var("TEXTFLOW_LETTER_SPACING").and_then(|v| v.trim().parse().ok()) {
            self.layout.letter_spacing = spacing;
        }
        if let Some(spacing) = var("TEXTFLOW_WORD_SPACING").and_then(|v| v.trim().parse().ok()) {
            self.layout.word_spacing = spacing;
        }
        if let Some(size) = var("TEXTFLOW_TAB_SIZE").and_then(|v| v.trim().parse().ok()) {
            self.layout.tab_size = size;
        }

        // Itemize settings
        if let Some(lang) = var("TEXTFLOW_LANGUAGE") {
            self.itemize.language = Language::new(&lang);
        }
        if let Some(dir) = var("TEXTFLOW_BASE_DIRECTION").and_then(|v| parse_enum(&v)) {
            self.itemize.base_direction = dir;
        }
    }

    /// Load the configuration file, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

/// Parse a kebab-case unit variant such as `break-word`.
fn parse_enum<T: for<'de> Deserialize<'de>>(value: &str) -> Option<T> {
    let de: serde::de::value::StrDeserializer<'_, serde::de::value::Error> =
        value.trim().into_deserializer();
    T::deserialize(de).ok()
}
