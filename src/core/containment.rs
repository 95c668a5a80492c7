use crate::types::{BoundingBox, CubeResult, Feature};
use geo::Relate;

/// Keep the scenes whose footprint fully contains `bbox`
///
/// Uses the DE-9IM "contains" predicate: no part of the box may fall outside
/// the footprint and the box interior must overlap the footprint interior.
/// A box edge running along the footprint edge is still contained; a
/// zero-area box lying only on the footprint boundary is not.
pub fn fully_containing(features: &[Feature], bbox: &BoundingBox) -> CubeResult<Vec<Feature>> {
    let bbox_polygon = bbox.to_polygon();
    let mut kept = Vec::new();

    for feature in features {
        if feature.footprint()?.relate(&bbox_polygon).is_contains() {
            kept.push(feature.clone());
        }
    }

    log::debug!(
        "Containment filter {:?}: {} of {} features cover the box",
        bbox.to_array(),
        kept.len(),
        features.len()
    );
    Ok(kept)
}
