use crate::coords::{GridCoord, GridMapper};
use crate::grid::{CostGrid, MoveClassId, PassabilitySet};
use crate::map::{ElevationSource, Vec3};
use crate::region::GoalRegion;
use crate::search::{COST_SCALE, GridGraph, GridSearch, PathSearch};
use tracing::debug;

/// A solved route: ordered world positions, elevated via the elevation
/// source, plus the accumulated traversal cost. Owned by the caller; re-query
/// for a fresh one rather than mutating it.
#[derive(Debug, Clone)]
pub struct Path {
    pub points: Vec<Vec3>,
    pub total_cost: f32,
}

/// Outcome of a path query. Unreachable is an expected result, not an error:
/// callers branch on it instead of unwrapping an empty path.
#[derive(Debug, Clone)]
pub enum PathOutcome {
    Found(Path),
    Unreachable,
}

impl PathOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            PathOutcome::Found(path) => Some(path),
            PathOutcome::Unreachable => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, PathOutcome::Unreachable)
    }
}

/// Least-cost path queries over a built grid. Immutable borrows only: the
/// solver never mutates the grid or masks, so independent queries against a
/// stable grid can run side by side.
pub struct PathSolver<'a, S: PathSearch = GridSearch> {
    grid: &'a CostGrid,
    passability: &'a PassabilitySet,
    elevation: &'a dyn ElevationSource,
    mapper: GridMapper,
    search: S,
}

impl<'a> PathSolver<'a, GridSearch> {
    pub fn new(
        grid: &'a CostGrid,
        passability: &'a PassabilitySet,
        elevation: &'a dyn ElevationSource,
    ) -> Self {
        Self::with_search(grid, passability, elevation, GridSearch)
    }
}

impl<'a, S: PathSearch> PathSolver<'a, S> {
    /// Swap in a different search algorithm behind the same queries
    pub fn with_search(
        grid: &'a CostGrid,
        passability: &'a PassabilitySet,
        elevation: &'a dyn ElevationSource,
        search: S,
    ) -> Self {
        assert!(
            grid.width == passability.width && grid.height == passability.height,
            "passability masks were built for a {}x{} grid, got {}x{}",
            passability.width,
            passability.height,
            grid.width,
            grid.height
        );
        Self {
            grid,
            passability,
            elevation,
            mapper: grid.mapper(),
            search,
        }
    }

    pub fn mapper(&self) -> &GridMapper {
        &self.mapper
    }

    /// Point-to-point query. Start and goal are clamped into map bounds
    /// before conversion to grid cells.
    pub fn solve_path(&self, start: Vec3, goal: Vec3, class: MoveClassId) -> PathOutcome {
        let graph = self.graph(class, &self.grid.slopes);
        let start_cell = self.mapper.world_to_coord(start);
        let goal_cell = self.mapper.world_to_coord(goal);
        match self.search.to_goal(&graph, start_cell, goal_cell) {
            Some((cells, cost)) => PathOutcome::Found(self.lift(cells, cost)),
            None => {
                debug!(
                    ?start_cell,
                    ?goal_cell,
                    class = class.0,
                    "No path between cells"
                );
                PathOutcome::Unreachable
            }
        }
    }

    /// Reach any cell within `world_radius` of `center`: expands the center
    /// into a goal region and runs a single multi-goal search, which is
    /// strictly cheaper than one query per candidate cell.
    pub fn solve_path_to_radius(
        &self,
        start: Vec3,
        center: Vec3,
        world_radius: f32,
        class: MoveClassId,
    ) -> PathOutcome {
        let radius_cells = self.mapper.radius_to_cells(world_radius);
        let region = GoalRegion::around(center, radius_cells, &self.mapper);
        self.solve_path_to_region(start, &region, class)
    }

    pub fn solve_path_to_region(
        &self,
        start: Vec3,
        region: &GoalRegion,
        class: MoveClassId,
    ) -> PathOutcome {
        self.solve_path_to_region_with_costs(start, region, class, &self.grid.slopes)
    }

    /// Region query over an explicit per-cell cost slice instead of the
    /// slope costs. Used for threat-weighted routing, where the cost of a
    /// cell is how contested it is rather than how steep.
    pub fn solve_path_to_region_with_costs(
        &self,
        start: Vec3,
        region: &GoalRegion,
        class: MoveClassId,
        cell_costs: &[f32],
    ) -> PathOutcome {
        if region.is_empty() {
            return PathOutcome::Unreachable;
        }
        let graph = self.graph(class, cell_costs);
        let start_cell = self.mapper.world_to_coord(start);
        match self.search.to_any(&graph, start_cell, &region.cell_set()) {
            Some((cells, cost)) => PathOutcome::Found(self.lift(cells, cost)),
            None => {
                debug!(
                    ?start_cell,
                    goals = region.len(),
                    class = class.0,
                    "No path into goal region"
                );
                PathOutcome::Unreachable
            }
        }
    }

    fn graph<'g>(&'g self, class: MoveClassId, cell_costs: &'g [f32]) -> GridGraph<'g> {
        debug_assert_eq!(cell_costs.len(), self.grid.total_cells());
        GridGraph {
            width: self.grid.width,
            height: self.grid.height,
            passable: self.passability.mask(class),
            cell_costs,
        }
    }

    /// Reconstruct world positions for a node path and elevate each point
    fn lift(&self, cells: Vec<GridCoord>, cost: u32) -> Path {
        let points = cells
            .into_iter()
            .map(|cell| {
                let mut pos = self.mapper.coord_to_world(cell);
                pos.y = self.elevation.elevation_at(pos.x, pos.z);
                pos
            })
            .collect();
        Path {
            points,
            total_cost: cost as f32 / COST_SCALE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::HeightField;
    use crate::movement::MovementClass;

    const CELL: f32 = 64.0; // square_size 8 at resolution 8

    fn land_class() -> MovementClass {
        MovementClass {
            name: "land".to_string(),
            max_slope: 25.0,
            min_water_depth: -10000.0,
            max_water_depth: 20.0,
        }
    }

    /// Flat 8x8 grid; the 6x6 interior is open for the land class
    fn flat_setup() -> (HeightField, CostGrid, PassabilitySet) {
        let field = HeightField::flat(64, 64, 8.0, 0.0).unwrap();
        let grid = CostGrid::build(&field, 8).unwrap();
        let set = PassabilitySet::build(&grid, &[land_class()]);
        (field, grid, set)
    }

    fn cell_center(x: u32, z: u32) -> Vec3 {
        Vec3::new((x as f32 + 0.5) * CELL, 0.0, (z as f32 + 0.5) * CELL)
    }

    #[test]
    fn test_flat_diagonal_path_cost() {
        let (field, grid, set) = flat_setup();
        let solver = PathSolver::new(&grid, &set, &field);
        // Interior corners of the open area, three diagonal steps apart
        let outcome = solver.solve_path(cell_center(1, 1), cell_center(4, 4), MoveClassId(0));
        let path = outcome.path().expect("flat interior must connect");
        assert_eq!(path.points.len(), 4);
        assert!(path.total_cost >= 0.0);
        assert!((path.total_cost - 3.0 * 1.41).abs() < 0.02);
        // Cost to any intermediate point on the same route never exceeds the total
        let partial = solver.solve_path(cell_center(1, 1), cell_center(2, 2), MoveClassId(0));
        assert!(partial.path().unwrap().total_cost <= path.total_cost);
    }

    #[test]
    fn test_path_routes_around_blocked_cell() {
        let (field, grid, mut set) = flat_setup();
        let flat_cost = {
            let solver = PathSolver::new(&grid, &set, &field);
            let outcome = solver.solve_path(cell_center(1, 1), cell_center(4, 4), MoveClassId(0));
            outcome.path().unwrap().total_cost
        };

        // Wall across the diagonal corridor, one gap at (3, 2)
        for z in 1..7u32 {
            set.masks[0][GridCoord::new(3, z).index(8)] = false;
        }
        set.masks[0][GridCoord::new(3, 2).index(8)] = true;
        let blocked = GridCoord::new(3, 3);
        set.masks[0][blocked.index(8)] = false;

        let solver = PathSolver::new(&grid, &set, &field);
        let outcome = solver.solve_path(cell_center(1, 1), cell_center(4, 4), MoveClassId(0));
        let path = outcome.path().expect("gap at (3,2) keeps the goal reachable");
        assert!(path.total_cost > flat_cost);
        let mapper = grid.mapper();
        assert!(
            path.points
                .iter()
                .all(|p| mapper.world_to_coord(*p) != blocked)
        );
    }

    #[test]
    fn test_far_out_of_bounds_goal_clamps() {
        let (field, grid, set) = flat_setup();
        let solver = PathSolver::new(&grid, &set, &field);
        let goal = Vec3::new(50_000.0, 0.0, 50_000.0);
        // Clamped goal lands on the impassable border, so the query must
        // come back Unreachable rather than crash or index out of range
        let outcome = solver.solve_path(cell_center(1, 1), goal, MoveClassId(0));
        assert!(outcome.is_unreachable());

        // A radius query from the same far goal reaches interior cells
        let outcome =
            solver.solve_path_to_radius(cell_center(1, 1), goal, 2.0 * CELL, MoveClassId(0));
        let path = outcome.path().expect("radius reaches interior cells");
        let mapper = grid.mapper();
        for point in &path.points {
            let cell = mapper.world_to_coord(*point);
            assert!(cell.x < grid.width && cell.z < grid.height);
        }
    }

    #[test]
    fn test_region_query_matches_nearest_goal() {
        let (field, grid, set) = flat_setup();
        let solver = PathSolver::new(&grid, &set, &field);
        let targets = [cell_center(5, 5), cell_center(2, 1)];
        let region = GoalRegion::around_all(&targets, 0, solver.mapper());
        let outcome = solver.solve_path_to_region(cell_center(1, 1), &region, MoveClassId(0));
        let path = outcome.path().unwrap();
        let last = *path.points.last().unwrap();
        assert_eq!(grid.mapper().world_to_coord(last), GridCoord::new(2, 1));
    }

    #[test]
    fn test_disconnected_region_is_unreachable() {
        let (field, grid, mut set) = flat_setup();
        // Seal column x=4 completely
        for z in 0..8u32 {
            set.masks[0][GridCoord::new(4, z).index(8)] = false;
        }
        let solver = PathSolver::new(&grid, &set, &field);
        let outcome = solver.solve_path(cell_center(1, 1), cell_center(6, 6), MoveClassId(0));
        assert!(outcome.is_unreachable());
    }

    #[test]
    fn test_path_points_carry_elevation() {
        let field = HeightField::flat(64, 64, 8.0, 7.5).unwrap();
        let grid = CostGrid::build(&field, 8).unwrap();
        let set = PassabilitySet::build(&grid, &[land_class()]);
        let solver = PathSolver::new(&grid, &set, &field);
        let outcome = solver.solve_path(cell_center(1, 1), cell_center(5, 5), MoveClassId(0));
        let path = outcome.path().unwrap();
        assert!(path.points.iter().all(|p| p.y == 7.5));
    }

    #[test]
    fn test_empty_region_is_unreachable() {
        let (field, grid, set) = flat_setup();
        let solver = PathSolver::new(&grid, &set, &field);
        let region = GoalRegion { cells: Vec::new() };
        let outcome = solver.solve_path_to_region(cell_center(1, 1), &region, MoveClassId(0));
        assert!(outcome.is_unreachable());
    }
}
