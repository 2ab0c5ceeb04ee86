//! Configuration loading for Chitra.
//!
//! Loads all configuration from a single TOML file with defaults for every
//! field.
//!
//! ## Example TOML
//!
//! ```toml
//! [grid]
//! resolution = 0.05         # 5cm cells in the published grid
//!
//! [filter]
//! policy = "none"           # none | local_sum | local_sum_snapshot | majority_vote
//! threshold = 50
//!
//! [output]
//! map_path = "output/map"   # writes map.pgm + map.yaml
//! frame_id = "map"
//! ```

mod chitra;
mod defaults;
mod sections;

pub use chitra::ChitraConfig;
pub use sections::{FilterSection, GridSection, OutputSection};
