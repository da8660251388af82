use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockmapError {
    #[error("invalid blockmap cell size {width}x{height}, both must be positive and finite")]
    InvalidCellSize { width: f32, height: f32 },
    #[error("invalid blockmap bounds: {0}")]
    InvalidBounds(String),
    #[error("could not parse blockmap config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("could not write blockmap config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}
