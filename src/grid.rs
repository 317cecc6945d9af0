use crate::coords::{GridCoord, GridMapper};
use crate::errors::{TacmapError, TacmapResult};
use crate::map::HeightField;
use crate::movement::MovementClass;
use tracing::{debug, info};

/// Height-difference to slope-cost scaling between adjacent coarse cells
const SLOPE_SCALE: f32 = 6.0;

/// Minimum per-cell traversal cost; keeps search costs strictly positive on
/// flat ground
pub const MIN_CELL_COST: f32 = 1.0;

/// Identifies one movement class within a built [`PassabilitySet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveClassId(pub usize);

/// Coarse cost model of the map: downsampled heights plus a slope-derived
/// traversal cost per cell. Built once per map load; immutable afterwards.
#[derive(Debug, Clone)]
pub struct CostGrid {
    pub width: u32,
    pub height: u32,
    /// Downsampling stride against the full-resolution height field
    pub resolution: u32,
    /// World units per grid cell
    pub cell_size: f32,
    pub heights: Vec<f32>,
    pub slopes: Vec<f32>,
    pub average_height: f32,
}

impl CostGrid {
    /// Downsample the height field by striding at `resolution` in both axes
    /// and derive per-cell slopes from the largest height difference to any
    /// 4-connected neighbor that exists.
    pub fn build(field: &HeightField, resolution: u32) -> TacmapResult<CostGrid> {
        let width = field.width / resolution.max(1);
        let height = field.height / resolution.max(1);
        if resolution == 0 || width < 2 || height < 2 {
            return Err(TacmapError::BadResolution {
                resolution,
                width: field.width,
                height: field.height,
            });
        }
        let total_cells = (width * height) as usize;

        let mut heights = Vec::with_capacity(total_cells);
        let mut average_height = 0.0;
        for z in 0..height {
            for x in 0..width {
                let sample = field
                    .sample(x * resolution, z * resolution)
                    .unwrap_or_default();
                heights.push(sample);
                if sample > 0.0 {
                    average_height += sample;
                }
            }
        }
        average_height /= total_cells as f32;

        let mut slopes = Vec::with_capacity(total_cells);
        for z in 0..height as i64 {
            for x in 0..width as i64 {
                let here = heights[(z * width as i64 + x) as usize];
                let mut max_delta: f32 = 0.0;
                for (nx, nz) in [(x - 1, z), (x + 1, z), (x, z - 1), (x, z + 1)] {
                    if nx < 0 || nz < 0 || nx >= width as i64 || nz >= height as i64 {
                        continue;
                    }
                    let neighbor = heights[(nz * width as i64 + nx) as usize];
                    max_delta = max_delta.max((here - neighbor).abs());
                }
                let slope = max_delta * SLOPE_SCALE / resolution as f32;
                slopes.push(slope.max(MIN_CELL_COST));
            }
        }

        info!(
            width,
            height, resolution, average_height, "Built terrain cost grid"
        );

        Ok(CostGrid {
            width,
            height,
            resolution,
            cell_size: field.square_size * resolution as f32,
            heights,
            slopes,
            average_height,
        })
    }

    pub fn total_cells(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn mapper(&self) -> GridMapper {
        GridMapper::new(self.width, self.height, self.cell_size)
    }

    pub fn slope_at(&self, coord: GridCoord) -> f32 {
        self.slopes[coord.index(self.width)]
    }

    pub fn height_at(&self, coord: GridCoord) -> f32 {
        self.heights[coord.index(self.width)]
    }

    /// Cumulative slope distribution: entry `s` counts the cells whose slope
    /// rounds down to `s` or steeper. Consumed by terrain statistics, not by
    /// the solvers.
    pub fn slope_histogram(&self) -> Vec<u32> {
        let steepest = self
            .slopes
            .iter()
            .fold(0usize, |acc, s| acc.max(*s as usize));
        let mut histogram = vec![0u32; steepest + 1];
        for slope in &self.slopes {
            histogram[*slope as usize] += 1;
        }
        for s in (0..steepest).rev() {
            histogram[s] += histogram[s + 1];
        }
        histogram
    }
}

/// One boolean passability mask per movement class. A pure function of the
/// cost grid and the class list; rebuilt whole whenever either changes.
#[derive(Debug, Clone)]
pub struct PassabilitySet {
    pub width: u32,
    pub height: u32,
    pub classes: Vec<MovementClass>,
    pub masks: Vec<Vec<bool>>,
}

impl PassabilitySet {
    pub fn build(grid: &CostGrid, classes: &[MovementClass]) -> PassabilitySet {
        let classes: Vec<MovementClass> = if classes.is_empty() {
            // Degraded config: keep the solver usable with the probe class
            vec![MovementClass::probe()]
        } else {
            classes.to_vec()
        };

        let mut masks = Vec::with_capacity(classes.len());
        for class in &classes {
            let mut mask = Vec::with_capacity(grid.total_cells());
            for i in 0..grid.total_cells() {
                mask.push(
                    grid.slopes[i] <= class.max_slope
                        && grid.heights[i] > -class.max_water_depth
                        && grid.heights[i] < -class.min_water_depth,
                );
            }
            // Edge cells are always no-go so the search never walks off the map
            for x in 0..grid.width {
                mask[x as usize] = false;
                mask[(grid.width * (grid.height - 1) + x) as usize] = false;
            }
            for z in 0..grid.height {
                mask[(z * grid.width) as usize] = false;
                mask[(z * grid.width + grid.width - 1) as usize] = false;
            }

            let blocked = mask.iter().filter(|&&p| !p).count();
            debug!(
                class = %class.name,
                blocked,
                total = mask.len(),
                percentage = (blocked as f32 / mask.len() as f32) * 100.0,
                "Built passability mask"
            );
            masks.push(mask);
        }

        PassabilitySet {
            width: grid.width,
            height: grid.height,
            classes,
            masks,
        }
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Panics on an unknown class id: that is a caller-side ordering bug, not
    /// a runtime data condition
    pub fn mask(&self, class: MoveClassId) -> &[bool] {
        assert!(
            class.0 < self.masks.len(),
            "movement class {} out of range ({} classes built)",
            class.0,
            self.masks.len()
        );
        &self.masks[class.0]
    }

    pub fn is_passable(&self, class: MoveClassId, coord: GridCoord) -> bool {
        if coord.x >= self.width || coord.z >= self.height {
            return false;
        }
        self.mask(class)[coord.index(self.width)]
    }
}
