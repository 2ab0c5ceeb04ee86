//! File-backed collaborators: scene replay in, ROS map files out.

mod map_export;
mod scene;

pub use map_export::{
    ExportedMap, MapFilePublisher, MapInfo, PGM_FREE, PGM_OCCUPIED, PGM_UNKNOWN, export_ros_map,
    map_file_paths, map_info, pgm_pixels,
};
pub use scene::{DEFAULT_FRAME_ID, SceneFetcher, SceneFile, SceneSubmap};
