//! vcube: scene curation and time-series compositing for optical imagery catalogs
//!
//! Catalog search results are narrowed to a clean, de-duplicated and temporally
//! thinned set of scenes, and the arrays loaded for those scenes are reduced
//! into a single masked composite.

pub mod types;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    BoundingBox, CubeError, CubeResult, Feature, Footprint, MaskedArray
};

pub use crate::core::{
    aggregate_time_series, curate, downsample, fully_containing, latest_per_grid,
    resolve_tile_overlap, CurationPlan, Operation, SceneId, SelectionStage,
};

pub use crate::io::{bundle_files, SearchArea, SearchParams, StacClient};
