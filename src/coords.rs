use crate::map::Vec3;

/// Coarse grid coordinates (one cell per search node)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub x: u32,
    pub z: u32,
}

impl GridCoord {
    pub fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }

    /// Flat node index for a grid of the given width
    pub fn index(&self, width: u32) -> usize {
        (self.z * width + self.x) as usize
    }

    pub fn from_index(index: usize, width: u32) -> Self {
        let z = index as u32 / width;
        let x = index as u32 - z * width;
        Self { x, z }
    }
}

/// Bijection between world positions and grid cells.
///
/// World `x`/`z` map to a cell by flooring against the cell size; elevation is
/// ignored for indexing. Out-of-bounds positions are clamped onto the map edge
/// before conversion, so every world position maps to a valid cell.
#[derive(Debug, Clone, Copy)]
pub struct GridMapper {
    pub width: u32,
    pub height: u32,
    /// World units per grid cell (sample spacing times the resolution divisor)
    pub cell_size: f32,
}

impl GridMapper {
    pub fn new(width: u32, height: u32, cell_size: f32) -> Self {
        debug_assert!(width > 0 && height > 0 && cell_size > 0.0);
        Self {
            width,
            height,
            cell_size,
        }
    }

    pub fn total_cells(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn contains(&self, x: i64, z: i64) -> bool {
        x >= 0 && z >= 0 && x < self.width as i64 && z < self.height as i64
    }

    /// Convert a world position to grid coordinates, clamping into map bounds
    pub fn world_to_coord(&self, pos: Vec3) -> GridCoord {
        let x = (pos.x / self.cell_size).floor() as i64;
        let z = (pos.z / self.cell_size).floor() as i64;
        GridCoord::new(
            x.clamp(0, self.width as i64 - 1) as u32,
            z.clamp(0, self.height as i64 - 1) as u32,
        )
    }

    pub fn world_to_node(&self, pos: Vec3) -> usize {
        self.world_to_coord(pos).index(self.width)
    }

    /// World position of a cell's center, elevation left at zero
    pub fn coord_to_world(&self, coord: GridCoord) -> Vec3 {
        Vec3::new(
            (coord.x as f32 + 0.5) * self.cell_size,
            0.0,
            (coord.z as f32 + 0.5) * self.cell_size,
        )
    }

    pub fn node_to_world(&self, node: usize) -> Vec3 {
        self.coord_to_world(GridCoord::from_index(node, self.width))
    }

    /// Convert a world-unit radius to grid cells
    pub fn radius_to_cells(&self, world_radius: f32) -> u32 {
        (world_radius / self.cell_size).max(0.0) as u32
    }
}
