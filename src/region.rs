use crate::coords::{GridCoord, GridMapper};
use crate::map::Vec3;
use std::collections::HashSet;

/// Offset table for a circle of the given radius in grid cells, built by row
/// decomposition: each row offset `dz` extends `floor(sqrt(r^2 - dz^2))`
/// cells horizontally. The northern half including the center row is emitted
/// explicitly, then mirrored across the horizontal axis and across the
/// vertical axis, giving a fully symmetric set with exactly one `(0, 0)`
/// entry. Purely a function of the radius; clamping happens when the table is
/// applied to a target, never when it is built.
#[derive(Debug, Clone)]
pub struct RadiusOffsets {
    radius: u32,
    offsets: Vec<(i32, i32)>,
}

impl RadiusOffsets {
    pub fn new(radius: u32) -> Self {
        let r = radius as i32;
        let square_radius = r * r;
        let mut offsets = Vec::new();
        for dz in 0..=r {
            let half_width = ((square_radius - dz * dz) as f32).sqrt() as i32;
            for dx in 0..=half_width {
                offsets.push((dx, dz));
            }
        }
        let north = offsets.len();
        for i in 0..north {
            let (dx, dz) = offsets[i];
            if dz > 0 {
                offsets.push((dx, -dz));
            }
        }
        let east = offsets.len();
        for i in 0..east {
            let (dx, dz) = offsets[i];
            if dx > 0 {
                offsets.push((-dx, dz));
            }
        }
        Self { radius, offsets }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.offsets.iter().copied()
    }
}

/// The set of grid cells accepted as destinations for one "reach near X"
/// query. Transient: built per query and handed to the solver, never kept.
#[derive(Debug, Clone)]
pub struct GoalRegion {
    pub cells: Vec<GridCoord>,
}

impl GoalRegion {
    /// Region of all cells within `radius_cells` of a single target
    pub fn around(target: Vec3, radius_cells: u32, mapper: &GridMapper) -> GoalRegion {
        Self::around_all(std::slice::from_ref(&target), radius_cells, mapper)
    }

    /// Region merging the circles around several targets. Targets are clamped
    /// into map bounds before the table is applied; overlapping circles may
    /// contribute duplicate cells, which the solver tolerates.
    pub fn around_all(targets: &[Vec3], radius_cells: u32, mapper: &GridMapper) -> GoalRegion {
        let offsets = RadiusOffsets::new(radius_cells);
        let mut cells = Vec::with_capacity(targets.len() * offsets.len());
        for target in targets {
            let center = mapper.world_to_coord(*target);
            for (dx, dz) in offsets.iter() {
                let x = center.x as i64 + dx as i64;
                let z = center.z as i64 + dz as i64;
                if mapper.contains(x, z) {
                    cells.push(GridCoord::new(x as u32, z as u32));
                }
            }
        }
        GoalRegion { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell_set(&self) -> HashSet<GridCoord> {
        self.cells.iter().copied().collect()
    }
}
