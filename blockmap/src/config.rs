//! Tunables for building a blockmap over a map.

use log::info;
use serde::{Deserialize, Serialize};

use crate::BlockmapError;

const LOG_TAG: &str = "BlockmapConfig";

/// Doom's `MAPBLOCKUNITS`
pub const MAPBLOCKUNITS: f32 = 128.0;
/// Space added around the map bounds so a map smaller than a cell still gets
/// a usable grid
pub const BLOCKMAP_MARGIN: f32 = 8.0;
/// Largest radius of any thing. Doom's `MAXRADIUS`
pub const MAXRADIUS: f32 = 32.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlockmapConfig {
    /// Width and height of one cell in map units
    pub cell_size: f32,
    /// Added to each side of the map bounds
    pub margin: f32,
    /// Largest radius of anything linked as a point object. Thing box queries
    /// and path traversal widen their cell search by this much. A thing with
    /// a larger radius can be missed by either.
    pub max_radius: f32,
    /// Starting capacity of the intercept buffers used by path traversal
    pub intercept_capacity: usize,
}

impl Default for BlockmapConfig {
    fn default() -> Self {
        Self {
            cell_size: MAPBLOCKUNITS,
            margin: BLOCKMAP_MARGIN,
            max_radius: MAXRADIUS,
            intercept_capacity: 128,
        }
    }
}

impl BlockmapConfig {
    /// Read a config from TOML text. Missing keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self, BlockmapError> {
        let config: Self = toml::from_str(text)?;
        if !(config.cell_size > 0.0 && config.cell_size.is_finite()) {
            return Err(BlockmapError::InvalidCellSize {
                width: config.cell_size,
                height: config.cell_size,
            });
        }
        info!(target: LOG_TAG, "Loaded blockmap config, cell size {}", config.cell_size);
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, BlockmapError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
