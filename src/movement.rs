use crate::errors::{TacmapError, TacmapResult};
use std::path::Path;
use toml::Value;
use tracing::{debug, warn};

/// Traversal limits for one category of unit mobility.
///
/// Water depth uses the engine convention of negative elevation for underwater
/// terrain: a cell is rejected when its height is at or beyond either depth
/// threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementClass {
    pub name: String,
    pub max_slope: f32,
    pub min_water_depth: f32,
    pub max_water_depth: f32,
}

const DEFAULT_MAX_SLOPE: f32 = 10000.0;
const DEFAULT_MIN_WATER_DEPTH: f32 = -10000.0;
const DEFAULT_MAX_WATER_DEPTH: f32 = 10000.0;

impl MovementClass {
    /// Synthetic tester class appended after the configured classes, with
    /// bounds permissive enough to probe most land terrain
    pub fn probe() -> Self {
        Self {
            name: "probe".to_string(),
            max_slope: 25.0,
            min_water_depth: -10000.0,
            max_water_depth: 20.0,
        }
    }
}

/// Lazy sequence of movement-class records from a `CLASS0`, `CLASS1`, ...
/// sectioned table. Finite: stops at the first index whose section is absent
/// or has no `Name` key, which is the defined terminator rather than an error.
pub struct ClassSections<'a> {
    table: &'a toml::Table,
    next: usize,
}

impl<'a> ClassSections<'a> {
    pub fn new(table: &'a toml::Table) -> Self {
        Self { table, next: 0 }
    }
}

impl Iterator for ClassSections<'_> {
    type Item = MovementClass;

    fn next(&mut self) -> Option<MovementClass> {
        let section = self.table.get(&format!("CLASS{}", self.next))?.as_table()?;
        let name = section.get("Name")?.as_str()?.to_string();
        let class = MovementClass {
            name,
            max_slope: number_or(section, "MaxSlope", DEFAULT_MAX_SLOPE),
            min_water_depth: number_or(section, "MinWaterDepth", DEFAULT_MIN_WATER_DEPTH),
            max_water_depth: number_or(section, "MaxWaterDepth", DEFAULT_MAX_WATER_DEPTH),
        };
        self.next += 1;
        Some(class)
    }
}

fn number_or(section: &toml::Table, key: &str, default: f32) -> f32 {
    match section.get(key) {
        Some(Value::Integer(i)) => *i as f32,
        Some(Value::Float(f)) => *f as f32,
        _ => default,
    }
}

/// Parse movement classes from a sectioned config table and append the probe
/// class. Always yields at least one class: a config with no usable sections
/// degrades to the probe class alone instead of failing.
pub fn parse_movement_classes(table: &toml::Table) -> Vec<MovementClass> {
    let mut classes: Vec<MovementClass> = ClassSections::new(table).collect();
    if classes.is_empty() {
        warn!("No movement classes configured, falling back to the probe class only");
    }
    for class in &classes {
        debug!(
            name = %class.name,
            max_slope = class.max_slope,
            "Parsed movement class"
        );
    }
    classes.push(MovementClass::probe());
    classes
}

pub fn load_movement_classes(path: &Path) -> TacmapResult<Vec<MovementClass>> {
    let contents = std::fs::read_to_string(path).map_err(|source| TacmapError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let table: toml::Table = toml::from_str(&contents)?;
    Ok(parse_movement_classes(&table))
}
