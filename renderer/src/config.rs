//! The text renderer's configuration

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextRendererConfig {
    /// Width and height of the glyph atlas in texels.
    pub atlas_size: u32,
    /// The number of quads a new text buffer's index storage is sized for.
    ///
    /// This only preallocates GPU memory, indices are generated when they are needed.
    pub initial_quad_capacity: usize,
}

impl Default for TextRendererConfig {
    fn default() -> Self {
        Self {
            atlas_size: 2048,
            initial_quad_capacity: 64,
        }
    }
}

impl TextRendererConfig {
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        toml::from_str(toml).context("Parsing text renderer configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let toml = fs::read_to_string(path)
            .with_context(|| format!("Reading configuration file {}", path.display()))?;
        Self::from_toml_str(&toml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_configuration_uses_defaults() {
        let config = TextRendererConfig::from_toml_str("").unwrap();
        assert_eq!(config, TextRendererConfig::default());
    }

    #[test]
    fn fields_can_be_overridden_individually() {
        let config = TextRendererConfig::from_toml_str("atlas_size = 512").unwrap();
        assert_eq!(config.atlas_size, 512);
        assert_eq!(config.initial_quad_capacity, 64);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(TextRendererConfig::from_toml_str("atlas_pages = 2").is_err());
    }

    #[test]
    fn missing_files_report_the_path() {
        let error = TextRendererConfig::load("/nonexistent/quill.toml").unwrap_err();
        assert!(format!("{error:#}").contains("/nonexistent/quill.toml"));
    }
}
