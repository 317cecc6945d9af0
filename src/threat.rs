use crate::coords::{GridCoord, GridMapper};
use crate::grid::{CostGrid, MoveClassId, PassabilitySet};
use crate::map::Vec3;
use crate::search::{GridGraph, GridSearch, PathSearch};
use tracing::{debug, info};

/// Uniform value every threat cell starts each recompute cycle at
pub const THREAT_BASELINE: f32 = 1.0;

/// Float overlay approximating traffic density along likely paths for one
/// movement class. Read continuously between recomputes.
#[derive(Debug, Clone)]
pub struct ThreatMap {
    pub width: u32,
    pub height: u32,
    values: Vec<f32>,
}

impl ThreatMap {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            values: vec![THREAT_BASELINE; (width * height) as usize],
        }
    }

    pub fn value_at(&self, coord: GridCoord) -> f32 {
        self.values[coord.index(self.width)]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    fn reset(&mut self) {
        self.values.fill(THREAT_BASELINE);
    }
}

/// Radial cost kernel splatted onto the threat map at sampled path points.
/// Weight falls off quadratically with squared distance from the center and
/// reaches zero at the kernel radius. The exact polynomial is a tuning knob,
/// not a contract; only the falloff shape matters to consumers.
#[derive(Debug, Clone)]
struct CostKernel {
    radius: i32,
    width: i32,
    weights: Vec<f32>,
}

impl CostKernel {
    fn new(radius: u32) -> Self {
        let radius = radius.max(1) as i32;
        let width = 2 * radius + 1;
        let square_radius = (radius * radius) as f32;
        let mut weights = Vec::with_capacity((width * width) as usize);
        for z in 0..width {
            for x in 0..width {
                let dx = (x - radius) as f32;
                let dz = (z - radius) as f32;
                let square_distance = dx * dx + dz * dz;
                if square_distance <= square_radius {
                    let excess = square_distance - square_radius;
                    weights.push(excess * excess / square_radius * 2.0);
                } else {
                    weights.push(0.0);
                }
            }
        }
        Self {
            radius,
            width,
            weights,
        }
    }

    fn weight(&self, dx: i32, dz: i32) -> f32 {
        self.weights[((dz + self.radius) * self.width + (dx + self.radius)) as usize]
    }
}

/// Tuning for one analysis cycle. Defaults match the reference cadence: 35
/// reruns per cycle, the 12 points nearest each path end skipped so start and
/// destination regions are not over-weighted.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub reruns: usize,
    pub edge_skip: usize,
    /// Kernel radius in grid cells; derived from the map dimensions when unset
    pub kernel_radius: Option<u32>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            reruns: 35,
            edge_skip: 12,
            kernel_radius: None,
        }
    }
}

/// Derives per-movement-class chokepoint overlays by repeatedly solving paths
/// from sampled source positions to one reference position and accumulating
/// a radial kernel along each path.
///
/// The evolving threat map itself is the cost surface for the sampling
/// searches, so corridors found by early reruns grow expensive and later
/// reruns spread across the alternatives. Recomputing is the most expensive
/// operation in the subsystem; callers own the cadence and should trigger it
/// on a multi-second rhythm, not every tick.
pub struct ChokepointAnalyzer {
    mapper: GridMapper,
    config: AnalyzerConfig,
    kernel: CostKernel,
    search: GridSearch,
    maps: Vec<ThreatMap>,
}

impl ChokepointAnalyzer {
    pub fn new(grid: &CostGrid, class_count: usize) -> Self {
        Self::with_config(grid, class_count, AnalyzerConfig::default())
    }

    pub fn with_config(grid: &CostGrid, class_count: usize, config: AnalyzerConfig) -> Self {
        let kernel_radius = config.kernel_radius.unwrap_or_else(|| {
            let cells = (grid.width * grid.height) as f32;
            (cells.sqrt() / grid.resolution as f32 / 3.0) as u32
        });
        Self {
            mapper: grid.mapper(),
            config,
            kernel: CostKernel::new(kernel_radius),
            search: GridSearch,
            maps: (0..class_count.max(1))
                .map(|_| ThreatMap::new(grid.width, grid.height))
                .collect(),
        }
    }

    /// Latest overlay for a class. Panics on an unknown class id, matching
    /// the passability set's contract.
    pub fn threat_map(&self, class: MoveClassId) -> &ThreatMap {
        assert!(
            class.0 < self.maps.len(),
            "movement class {} out of range ({} threat maps)",
            class.0,
            self.maps.len()
        );
        &self.maps[class.0]
    }

    /// Run one full analysis cycle for a class: reset the overlay to
    /// baseline, then for each rerun solve one path per source toward the
    /// reference and splat the kernel along every other interior path point.
    ///
    /// Zero sources is the defined "nothing detected yet" case: the cycle
    /// still runs and leaves an all-baseline overlay.
    pub fn recompute(
        &mut self,
        class: MoveClassId,
        sources: &[Vec3],
        reference: Vec3,
        passability: &PassabilitySet,
    ) {
        assert!(class.0 < self.maps.len());
        let Self {
            mapper,
            config,
            kernel,
            search,
            maps,
        } = self;
        let map = &mut maps[class.0];
        map.reset();
        if sources.is_empty() {
            debug!(class = class.0, "No chokepoint sources, overlay stays at baseline");
            return;
        }

        let goal = mapper.world_to_coord(reference);
        let mut solved = 0usize;
        for _ in 0..config.reruns {
            for source in sources {
                let start = mapper.world_to_coord(*source);
                let found = {
                    let graph = GridGraph {
                        width: map.width,
                        height: map.height,
                        passable: passability.mask(class),
                        cell_costs: &map.values,
                    };
                    search.to_goal(&graph, start, goal)
                };
                let Some((cells, _cost)) = found else {
                    continue;
                };
                solved += 1;
                if cells.len() <= config.edge_skip * 2 {
                    continue;
                }
                for (i, cell) in cells.iter().enumerate() {
                    if i < config.edge_skip || i >= cells.len() - config.edge_skip || i % 2 == 0 {
                        continue;
                    }
                    splat(map, kernel, *cell);
                }
            }
        }
        info!(
            class = class.0,
            sources = sources.len(),
            reruns = config.reruns,
            solved,
            "Recomputed chokepoint overlay"
        );
    }
}

/// Add the kernel onto the map around `center`, clipped to grid bounds
fn splat(map: &mut ThreatMap, kernel: &CostKernel, center: GridCoord) {
    for dz in -kernel.radius..=kernel.radius {
        let z = center.z as i64 + dz as i64;
        if z < 0 || z >= map.height as i64 {
            continue;
        }
        for dx in -kernel.radius..=kernel.radius {
            let x = center.x as i64 + dx as i64;
            if x < 0 || x >= map.width as i64 {
                continue;
            }
            map.values[(z * map.width as i64 + x) as usize] += kernel.weight(dx, dz);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::HeightField;
    use crate::movement::MovementClass;

    const CELL: f32 = 64.0;

    fn cell_center(x: u32, z: u32) -> Vec3 {
        Vec3::new((x as f32 + 0.5) * CELL, 0.0, (z as f32 + 0.5) * CELL)
    }

    /// 16x16 grid with a single passable corridor along z=4 (plus the
    /// corridor's endpoints), so every sampled path is forced onto one route
    fn corridor_setup() -> (CostGrid, PassabilitySet) {
        let field = HeightField::flat(128, 128, 8.0, 0.0).unwrap();
        let grid = CostGrid::build(&field, 8).unwrap();
        let class = MovementClass {
            name: "land".to_string(),
            max_slope: 25.0,
            min_water_depth: -10000.0,
            max_water_depth: 20.0,
        };
        let mut set = PassabilitySet::build(&grid, &[class]);
        for z in 0..16u32 {
            for x in 0..16u32 {
                if z != 4 {
                    set.masks[0][GridCoord::new(x, z).index(16)] = false;
                }
            }
        }
        // Corridor still respects the map border
        set.masks[0][GridCoord::new(0, 4).index(16)] = false;
        set.masks[0][GridCoord::new(15, 4).index(16)] = false;
        (grid, set)
    }

    fn test_config() -> AnalyzerConfig {
        AnalyzerConfig {
            reruns: 1,
            edge_skip: 2,
            kernel_radius: Some(2),
        }
    }

    #[test]
    fn test_kernel_zero_at_boundary_and_peaked_at_center() {
        let kernel = CostKernel::new(3);
        assert_eq!(kernel.weight(3, 0), 0.0);
        assert_eq!(kernel.weight(0, -3), 0.0);
        let center = kernel.weight(0, 0);
        assert!(center > 0.0);
        assert!(kernel.weight(1, 0) < center);
        assert!(kernel.weight(2, 0) < kernel.weight(1, 0));
    }

    #[test]
    fn test_zero_sources_leaves_baseline() {
        let (grid, set) = corridor_setup();
        let mut analyzer = ChokepointAnalyzer::with_config(&grid, set.class_count(), test_config());
        analyzer.recompute(MoveClassId(0), &[], cell_center(8, 4), &set);
        let map = analyzer.threat_map(MoveClassId(0));
        assert!(map.values().iter().all(|&v| v == THREAT_BASELINE));
    }

    #[test]
    fn test_sampled_corridor_rises_above_baseline() {
        let (grid, set) = corridor_setup();
        let mut analyzer = ChokepointAnalyzer::with_config(&grid, set.class_count(), test_config());
        analyzer.recompute(
            MoveClassId(0),
            &[cell_center(1, 4)],
            cell_center(14, 4),
            &set,
        );
        let map = analyzer.threat_map(MoveClassId(0));
        // Mid-corridor cells accumulated weight; cells beyond the kernel did not
        assert!(map.value_at(GridCoord::new(7, 4)) > THREAT_BASELINE);
        assert_eq!(map.value_at(GridCoord::new(7, 12)), THREAT_BASELINE);
    }

    #[test]
    fn test_two_identical_samples_double_the_contribution() {
        let (grid, set) = corridor_setup();
        let source = cell_center(1, 4);
        let reference = cell_center(14, 4);

        let mut single = ChokepointAnalyzer::with_config(&grid, 1, test_config());
        single.recompute(MoveClassId(0), &[source], reference, &set);

        let mut double = ChokepointAnalyzer::with_config(&grid, 1, test_config());
        double.recompute(MoveClassId(0), &[source, source], reference, &set);

        let probe = GridCoord::new(7, 4);
        let single_extra = single.threat_map(MoveClassId(0)).value_at(probe) - THREAT_BASELINE;
        let double_extra = double.threat_map(MoveClassId(0)).value_at(probe) - THREAT_BASELINE;
        assert!(single_extra > 0.0);
        assert!((double_extra - 2.0 * single_extra).abs() < 1e-3);
    }

    #[test]
    fn test_recompute_resets_previous_cycle() {
        let (grid, set) = corridor_setup();
        let mut analyzer = ChokepointAnalyzer::with_config(&grid, 1, test_config());
        analyzer.recompute(
            MoveClassId(0),
            &[cell_center(1, 4)],
            cell_center(14, 4),
            &set,
        );
        assert!(analyzer.threat_map(MoveClassId(0)).value_at(GridCoord::new(7, 4)) > THREAT_BASELINE);

        // Next cycle with no sources must fall back to flat baseline
        analyzer.recompute(MoveClassId(0), &[], cell_center(14, 4), &set);
        let map = analyzer.threat_map(MoveClassId(0));
        assert!(map.values().iter().all(|&v| v == THREAT_BASELINE));
    }

    #[test]
    fn test_short_paths_are_skipped_entirely() {
        let (grid, set) = corridor_setup();
        let config = AnalyzerConfig {
            reruns: 1,
            edge_skip: 12,
            kernel_radius: Some(2),
        };
        let mut analyzer = ChokepointAnalyzer::with_config(&grid, 1, config);
        // Corridor path is 14 cells, not enough to clear 12 at each end
        analyzer.recompute(
            MoveClassId(0),
            &[cell_center(1, 4)],
            cell_center(14, 4),
            &set,
        );
        let map = analyzer.threat_map(MoveClassId(0));
        assert!(map.values().iter().all(|&v| v == THREAT_BASELINE));
    }
}
