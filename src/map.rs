use crate::errors::{TacmapError, TacmapResult};
use derive_more::{Add, Mul, Sub};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// World-space position. `x`/`z` span the map horizontally, `y` is elevation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Add, Sub, Mul)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Horizontal distance, ignoring elevation
    pub fn distance_2d(&self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Full-resolution elevation samples for a map, row-major
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HeightField {
    #[validate(range(min = 2, max = 8192))]
    pub width: u32,
    #[validate(range(min = 2, max = 8192))]
    pub height: u32,
    pub heights: Vec<f32>,
    /// World units between adjacent samples
    #[validate(range(min = 0.1, max = 100.0))]
    pub square_size: f32,
}

impl HeightField {
    pub fn new(width: u32, height: u32, heights: Vec<f32>, square_size: f32) -> TacmapResult<Self> {
        let field = Self {
            width,
            height,
            heights,
            square_size,
        };
        field.validate().map_err(|e| TacmapError::InvalidHeightField {
            reason: e.to_string(),
        })?;
        if field.heights.len() != (width * height) as usize {
            return Err(TacmapError::InvalidHeightField {
                reason: format!(
                    "expected {} samples for a {width}x{height} field, got {}",
                    width * height,
                    field.heights.len()
                ),
            });
        }
        Ok(field)
    }

    /// Create a height field with a uniform elevation everywhere
    pub fn flat(width: u32, height: u32, square_size: f32, level: f32) -> TacmapResult<Self> {
        Self::new(
            width,
            height,
            vec![level; (width * height) as usize],
            square_size,
        )
    }

    pub fn load(path: &Path) -> TacmapResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| TacmapError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let field: HeightField = toml::from_str(&contents)?;
        HeightField::new(field.width, field.height, field.heights, field.square_size)
    }

    pub fn sample(&self, x: u32, z: u32) -> Option<f32> {
        if x >= self.width || z >= self.height {
            return None;
        }
        self.heights.get((z * self.width + x) as usize).copied()
    }

    /// Map extent along the x axis, in world units
    pub fn world_width(&self) -> f32 {
        self.width as f32 * self.square_size
    }

    /// Map extent along the z axis, in world units
    pub fn world_depth(&self) -> f32 {
        self.height as f32 * self.square_size
    }
}

/// Precise elevation lookup for reconstructed path points. The host engine
/// normally provides this; `HeightField` implements it with nearest-sample
/// lookup so the subsystem is usable standalone.
pub trait ElevationSource {
    fn elevation_at(&self, world_x: f32, world_z: f32) -> f32;
}

impl ElevationSource for HeightField {
    fn elevation_at(&self, world_x: f32, world_z: f32) -> f32 {
        let x = (world_x / self.square_size).floor().max(0.0) as u32;
        let z = (world_z / self.square_size).floor().max(0.0) as u32;
        let x = x.min(self.width - 1);
        let z = z.min(self.height - 1);
        self.sample(x, z).unwrap_or(0.0)
    }
}
