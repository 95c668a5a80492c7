use crate::core::containment::fully_containing;
use crate::core::grid_latest::latest_per_grid;
use crate::core::temporal::downsample;
use crate::core::tile_overlap::resolve_tile_overlap;
use crate::types::{BoundingBox, CubeResult, Feature};
use chrono::NaiveDate;

/// One selection step applied to a scene collection
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionStage {
    /// Most recent scene per grid cell
    LatestPerGrid,
    /// Scenes whose footprint fully contains the box
    FullyContains(BoundingBox),
    /// Majority coordinate zone, one scene per date
    ResolveTileOverlap,
}

impl SelectionStage {
    pub fn apply(&self, features: &[Feature]) -> CubeResult<Vec<Feature>> {
        match self {
            SelectionStage::LatestPerGrid => latest_per_grid(features),
            SelectionStage::FullyContains(bbox) => fully_containing(features, bbox),
            SelectionStage::ResolveTileOverlap => resolve_tile_overlap(features),
        }
    }
}

/// Curation parameters: ordered selection stages, then temporal thinning
#[derive(Debug, Clone)]
pub struct CurationPlan {
    /// Applied in order; results depend on it
    pub stages: Vec<SelectionStage>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Thin the selection to the adaptive sampling step
    pub downsample: bool,
}

impl CurationPlan {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            stages: Vec::new(),
            start_date,
            end_date,
            downsample: true,
        }
    }

    pub fn with_stage(mut self, stage: SelectionStage) -> Self {
        self.stages.push(stage);
        self
    }
}

/// Run a catalog result through the plan
pub fn curate(features: &[Feature], plan: &CurationPlan) -> CubeResult<Vec<Feature>> {
    log::info!(
        "Curating {} features through {} selection stage(s)",
        features.len(),
        plan.stages.len()
    );

    let mut current = features.to_vec();
    for stage in &plan.stages {
        let before = current.len();
        current = stage.apply(&current)?;
        log::debug!("{:?}: {} -> {} features", stage, before, current.len());
    }

    if plan.downsample {
        current = downsample(&current, plan.start_date, plan.end_date)?;
    }

    log::info!("Curation kept {} of {} features", current.len(), features.len());
    Ok(current)
}
