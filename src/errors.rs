use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TacmapError {
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid height field: {reason}")]
    InvalidHeightField { reason: String },

    #[error("Resolution divisor {resolution} leaves no usable grid for a {width}x{height} height field")]
    BadResolution {
        resolution: u32,
        width: u32,
        height: u32,
    },
}

/// Result type alias for all operations
pub type TacmapResult<T> = Result<T, TacmapError>;
