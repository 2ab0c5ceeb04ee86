//! Chitra CLI: render a recorded scene into ROS map files.
//!
//! Usage:
//!   chitra --scene scene.yaml
//!   chitra --scene scene.yaml --config chitra.toml --output output/office
//!
//! Enable per-tile logging:
//!   RUST_LOG=chitra=debug chitra --scene scene.yaml

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chitra::io::map_file_paths;
use chitra::{ChitraConfig, CycleOutcome, MapFilePublisher, OccupancyGridNode, Result, SceneFile};

/// Render submap textures into an occupancy grid
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scene file with submap metadata and textures
    #[arg(short, long)]
    scene: PathBuf,

    /// Configuration file path (defaults to ./chitra.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output path without extension; overrides output.map_path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chitra=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            ChitraConfig::load(path)?
        }
        None => ChitraConfig::load_default()?,
    };

    let mut scene = SceneFile::load(&args.scene)?;
    info!(
        "Loaded scene {:?} with {} submaps",
        args.scene,
        scene.submaps.len()
    );
    scene
        .frame_id
        .get_or_insert_with(|| config.output.frame_id.clone());

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.map_path));
    let node = OccupancyGridNode::new(
        (&config).into(),
        scene.fetcher(),
        MapFilePublisher::new(&output),
    );

    match node.handle_submap_list(&scene.to_submap_list())? {
        CycleOutcome::Published { width, height, .. } => {
            info!(
                "Wrote {}x{} map to {}",
                width,
                height,
                map_file_paths(&output).pgm.display()
            );
        }
        CycleOutcome::NothingToRender(stats) => {
            warn!(
                "No submap could be rendered ({} unavailable), nothing written",
                stats.unavailable
            );
        }
        CycleOutcome::NoConsumer => warn!("Publisher declined the grid"),
    }

    Ok(())
}
