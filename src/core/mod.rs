//! Scene selection and compositing algorithms

pub mod scene_id;
pub mod grid_latest;
pub mod containment;
pub mod tile_overlap;
pub mod temporal;
pub mod aggregate;
pub mod curation;

// Re-export main types and functions
pub use scene_id::SceneId;
pub use grid_latest::latest_per_grid;
pub use containment::fully_containing;
pub use tile_overlap::{resolve_tile_overlap, majority_zone};
pub use temporal::{downsample, sampling_step};
pub use aggregate::{aggregate_time_series, aggregate_by_name, Operation};
pub use curation::{curate, CurationPlan, SelectionStage};
