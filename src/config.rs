use std::fs;
use std::path::{Path, PathBuf};

use egui::Color32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::element::{DEFAULT_BLOCK_SIZE, DEFAULT_EMOJI_PALETTE};

/// Errors that can occur while loading or saving an editor configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Cosmetic styling of the selection chrome. These never affect exports;
/// chrome is drawn only on the interactive surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeStyle {
    pub selection_color: Color32,
    pub selection_width: f32,
    pub handle_radius: f32,
    pub handle_fill: Color32,
    pub handle_outline: Color32,
}

impl Default for ChromeStyle {
    fn default() -> Self {
        Self {
            selection_color: Color32::from_rgba_unmultiplied(0, 123, 255, 230),
            selection_width: 2.0,
            handle_radius: 5.0,
            handle_fill: Color32::WHITE,
            handle_outline: Color32::BLACK,
        }
    }
}

/// Host-visible editor settings. Every field has a sensible default, so
/// partial config files work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Largest surface the editor will create; bigger photos are scaled
    /// down to fit (aspect preserved), smaller ones keep their size
    pub max_display: [u32; 2],
    /// Block size fresh pixelation elements start with
    pub default_block_size: u32,
    /// Sticker glyphs offered by the toolbar
    pub emoji_palette: Vec<String>,
    /// TTF/OTF file used to rasterize sticker glyphs. Without one, emoji
    /// elements occupy their box but draw nothing.
    pub glyph_font: Option<PathBuf>,
    pub style: ChromeStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_display: [800, 600],
            default_block_size: DEFAULT_BLOCK_SIZE,
            emoji_palette: DEFAULT_EMOJI_PALETTE.iter().map(|s| s.to_string()).collect(),
            glyph_font: None,
            style: ChromeStyle::default(),
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Maximum surface size as floats, for scale math
    pub fn max_display_f32(&self) -> (f32, f32) {
        (self.max_display[0] as f32, self.max_display[1] as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_editor() {
        let config = EditorConfig::default();
        assert_eq!(config.max_display, [800, 600]);
        assert_eq!(config.default_block_size, 15);
        assert_eq!(config.emoji_palette.len(), 10);
        assert_eq!(config.emoji_palette[0], "😊");
        assert_eq!(config.style.handle_radius, 5.0);
        assert_eq!(
            config.style.selection_color,
            Color32::from_rgba_unmultiplied(0, 123, 255, 230)
        );
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{ "default_block_size": 30 }"#).unwrap();
        assert_eq!(config.default_block_size, 30);
        assert_eq!(config.max_display, [800, 600]);
        assert_eq!(config.style, ChromeStyle::default());
    }

    #[test]
    fn json_roundtrip_preserves_settings() {
        let mut config = EditorConfig::default();
        config.max_display = [1024, 768];
        config.emoji_palette = vec!["🌟".to_string()];
        let json = serde_json::to_string(&config).unwrap();
        let back: EditorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
