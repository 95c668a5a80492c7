use crate::core::scene_id::SceneId;
use crate::types::{CubeResult, Feature};
use std::collections::HashSet;

/// Resolve overlapping tiles from adjacent coordinate zones
///
/// Keeps only scenes of the most frequent zone, then the first scene seen for
/// each date token. When zones tie on count, the zone encountered first wins.
pub fn resolve_tile_overlap(features: &[Feature]) -> CubeResult<Vec<Feature>> {
    if features.is_empty() {
        return Ok(Vec::new());
    }

    let scenes = features
        .iter()
        .map(|feature| SceneId::parse_dated(&feature.id).map(|scene| (scene, feature)))
        .collect::<CubeResult<Vec<_>>>()?;

    let zone = match majority_zone(scenes.iter().map(|(scene, _)| scene.zone.as_str())) {
        Some(zone) => zone.to_string(),
        None => return Ok(Vec::new()),
    };

    let mut seen_dates = HashSet::new();
    let mut kept = Vec::new();
    for (scene, feature) in &scenes {
        if scene.zone != zone {
            continue;
        }
        if seen_dates.insert(scene.require_date_token(&feature.id)?) {
            kept.push((*feature).clone());
        }
    }

    log::debug!(
        "Tile overlap: majority zone {} keeps {} of {} features",
        zone,
        kept.len(),
        features.len()
    );
    Ok(kept)
}

/// Most frequent zone; ties go to the zone encountered first
pub fn majority_zone<'a>(zones: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for zone in zones {
        match counts.iter_mut().find(|(seen, _)| *seen == zone) {
            Some((_, count)) => *count += 1,
            None => counts.push((zone, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (zone, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((zone, count));
        }
    }
    best.map(|(zone, _)| zone)
}
