use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::encoder::RenderOptions;
use crate::export::ExportLayout;

pub const DEFAULT_CHUNK_SIZE: usize = 100;
pub const DEFAULT_MAX_QUANTITY: u32 = 1000;
pub const DEFAULT_SERIAL_WIDTH: usize = 5;
pub const DEFAULT_RANDOM_LEN: usize = 5;

// Config
//------------------------------------------------------------------------------

/// Session wide settings. Every field has a default, so a partial JSON
/// document only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Items produced between two cooperative yields.
    pub chunk_size: usize,
    /// Upper bound on a request's quantity.
    pub max_quantity: u32,
    /// Minimum digit count of serial counters.
    pub serial_width: usize,
    /// Length of random suffixes.
    pub random_len: usize,
    pub render: RenderOptions,
    pub export: ExportLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_quantity: DEFAULT_MAX_QUANTITY,
            serial_width: DEFAULT_SERIAL_WIDTH,
            random_len: DEFAULT_RANDOM_LEN,
            render: RenderOptions::default(),
            export: ExportLayout::default(),
        }
    }
}

impl Config {
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be at least 1"));
        }
        if u32::try_from(self.chunk_size).is_err() {
            return Err(ConfigError::Invalid("chunk_size must fit in 32 bits"));
        }
        if self.max_quantity == 0 {
            return Err(ConfigError::Invalid("max_quantity must be at least 1"));
        }
        if self.random_len == 0 {
            return Err(ConfigError::Invalid("random_len must be at least 1"));
        }
        if self.render.module_px == 0 || self.render.bar_px == 0 || self.render.bar_height == 0 {
            return Err(ConfigError::Invalid("render dimensions must be at least 1"));
        }
        if self.export.image_width_px <= 0.0 || self.export.image_height_px <= 0.0 {
            return Err(ConfigError::Invalid("export image size must be positive"));
        }
        Ok(())
    }
}
