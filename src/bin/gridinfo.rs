use clap::Parser;
use std::path::PathBuf;
use tacmap::errors::TacmapResult;
use tacmap::grid::{CostGrid, MoveClassId, PassabilitySet};
use tacmap::map::HeightField;
use tacmap::movement::{MovementClass, load_movement_classes};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridinfo")]
#[command(about = "Inspect the terrain cost grid built from a height field")]
struct Args {
    /// Height field file (TOML)
    map: PathBuf,

    /// Movement class file (TOML with CLASS0, CLASS1, ... sections)
    #[arg(long)]
    classes: Option<PathBuf>,

    /// Downsampling stride against the full-resolution height field
    #[arg(long, default_value_t = 8)]
    resolution: u32,
}

fn main() -> TacmapResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let field = HeightField::load(&args.map)?;
    let classes = match &args.classes {
        Some(path) => load_movement_classes(path)?,
        None => vec![MovementClass::probe()],
    };

    let grid = CostGrid::build(&field, args.resolution)?;
    let set = PassabilitySet::build(&grid, &classes);

    println!(
        "grid {}x{} (resolution {}, cell size {:.1}), average height {:.1}",
        grid.width, grid.height, grid.resolution, grid.cell_size, grid.average_height
    );

    let histogram = grid.slope_histogram();
    println!("slope distribution (cells at or above each slope):");
    for (slope, count) in histogram.iter().enumerate().take(16) {
        println!("  >= {slope:>3}: {count}");
    }

    for (index, class) in set.classes.iter().enumerate() {
        let mask = set.mask(MoveClassId(index));
        let blocked = mask.iter().filter(|&&p| !p).count();
        println!(
            "class {index} ({}): {blocked}/{} cells blocked ({:.1}%)",
            class.name,
            mask.len(),
            (blocked as f32 / mask.len() as f32) * 100.0
        );
    }

    Ok(())
}
