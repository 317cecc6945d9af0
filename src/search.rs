use crate::coords::GridCoord;
use pathfinding::prelude::{astar, dijkstra};
use std::collections::HashSet;

/// Scale applied to float cell costs so the search runs on integer costs
/// (the search crate needs `Ord`)
pub const COST_SCALE: f32 = 100.0;

const DIAGONAL_FACTOR: f32 = 1.41;

/// Transient view of the grid for one search: which cells may be entered and
/// what entering each one costs. Entirely query-local; the solver and the
/// chokepoint sampler hand in different cost slices over the same masks.
pub struct GridGraph<'a> {
    pub width: u32,
    pub height: u32,
    pub passable: &'a [bool],
    /// Per-cell entry cost, expected to be >= 1.0
    pub cell_costs: &'a [f32],
}

impl GridGraph<'_> {
    fn is_passable(&self, x: i64, z: i64) -> bool {
        x >= 0
            && z >= 0
            && x < self.width as i64
            && z < self.height as i64
            && self.passable[(z * self.width as i64 + x) as usize]
    }

    /// 8-connected neighbors with the cost of stepping into each. The edge
    /// cost is the destination cell's cost, diagonal steps weighted up;
    /// impassable cells are excluded from the graph entirely.
    fn successors(&self, node: GridCoord) -> Vec<(GridCoord, u32)> {
        let mut neighbors = Vec::with_capacity(8);
        for dz in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                let x = node.x as i64 + dx;
                let z = node.z as i64 + dz;
                if !self.is_passable(x, z) {
                    continue;
                }
                let cost = self.cell_costs[(z * self.width as i64 + x) as usize];
                let cost = if dx != 0 && dz != 0 {
                    cost * DIAGONAL_FACTOR
                } else {
                    cost
                };
                neighbors.push((
                    GridCoord::new(x as u32, z as u32),
                    (cost * COST_SCALE) as u32,
                ));
            }
        }
        neighbors
    }
}

/// Narrow seam over the graph-search algorithm: adjacency and costs go in,
/// a minimum-cost node path comes out. Lets the algorithm be swapped without
/// touching grid construction, goal regions, or the chokepoint analyzer.
pub trait PathSearch {
    /// Least-cost path between two cells, or `None` when no connecting
    /// passable path exists
    fn to_goal(
        &self,
        graph: &GridGraph,
        start: GridCoord,
        goal: GridCoord,
    ) -> Option<(Vec<GridCoord>, u32)>;

    /// Least-cost path from `start` to whichever goal cell is reached first
    /// at minimum accumulated cost
    fn to_any(
        &self,
        graph: &GridGraph,
        start: GridCoord,
        goals: &HashSet<GridCoord>,
    ) -> Option<(Vec<GridCoord>, u32)>;
}

/// Default search backed by the `pathfinding` crate: A* for point-to-point,
/// Dijkstra for multi-goal queries (no single admissible heuristic covers an
/// arbitrary goal set cheaply).
#[derive(Debug, Clone, Copy, Default)]
pub struct GridSearch;

// Admissible per-cell-distance heuristic weight: straight steps cost at least
// COST_SCALE per unit, diagonal steps 141 per ~1.414 units.
const HEURISTIC_SCALE: f32 = 99.0;

impl PathSearch for GridSearch {
    fn to_goal(
        &self,
        graph: &GridGraph,
        start: GridCoord,
        goal: GridCoord,
    ) -> Option<(Vec<GridCoord>, u32)> {
        if !graph.is_passable(start.x as i64, start.z as i64)
            || !graph.is_passable(goal.x as i64, goal.z as i64)
        {
            return None;
        }
        astar(
            &start,
            |node| graph.successors(*node),
            |node| {
                let dx = node.x as f32 - goal.x as f32;
                let dz = node.z as f32 - goal.z as f32;
                ((dx * dx + dz * dz).sqrt() * HEURISTIC_SCALE) as u32
            },
            |node| *node == goal,
        )
    }

    fn to_any(
        &self,
        graph: &GridGraph,
        start: GridCoord,
        goals: &HashSet<GridCoord>,
    ) -> Option<(Vec<GridCoord>, u32)> {
        if goals.is_empty() || !graph.is_passable(start.x as i64, start.z as i64) {
            return None;
        }
        dijkstra(&start, |node| graph.successors(*node), |node| {
            goals.contains(node)
        })
    }
}
