pub mod coords;
pub mod errors;
pub mod grid;
pub mod map;
pub mod movement;
pub mod region;
pub mod search;
pub mod solver;
pub mod threat;

// Selective re-exports for external consumers

pub use errors::{TacmapError, TacmapResult};

pub use coords::{GridCoord, GridMapper};
pub use grid::{CostGrid, MoveClassId, PassabilitySet};
pub use map::{ElevationSource, HeightField, Vec3};
pub use movement::{MovementClass, load_movement_classes, parse_movement_classes};
pub use region::GoalRegion;
pub use solver::{Path, PathOutcome, PathSolver};
pub use threat::{ChokepointAnalyzer, ThreatMap};
