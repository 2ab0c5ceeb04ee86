//! Default value functions for serde deserialization.

pub fn resolution() -> f64 {
    0.05
}

pub fn threshold() -> f32 {
    50.0
}

pub fn map_path() -> String {
    "output/map".to_string()
}

pub fn frame_id() -> String {
    "map".to_string()
}
