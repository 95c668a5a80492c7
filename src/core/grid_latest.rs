use crate::core::scene_id::SceneId;
use crate::types::{CubeResult, Feature};
use std::collections::HashMap;

/// Keep the most recent scene for every grid cell
///
/// Timestamps are compared as raw ISO-8601 strings; a later record replaces the
/// stored one only when strictly greater, so the first of equal timestamps wins.
/// Output follows the order in which grid codes were first seen.
pub fn latest_per_grid(features: &[Feature]) -> CubeResult<Vec<Feature>> {
    let mut slot_by_grid: HashMap<String, usize> = HashMap::new();
    let mut latest: Vec<&Feature> = Vec::new();

    for feature in features {
        let grid = SceneId::parse(&feature.id)?.grid;
        let datetime = feature.datetime()?;

        match slot_by_grid.get(&grid) {
            Some(&slot) => {
                if datetime > latest[slot].datetime()? {
                    latest[slot] = feature;
                }
            }
            None => {
                slot_by_grid.insert(grid, latest.len());
                latest.push(feature);
            }
        }
    }

    log::debug!(
        "Latest per grid: {} features -> {} grid cells",
        features.len(),
        latest.len()
    );
    Ok(latest.into_iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CubeError;

    fn ids(features: &[Feature]) -> Vec<&str> {
        features.iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_keeps_latest_record() {
        let features = vec![
            Feature::new("S2_31TCJ_20230101", "2023-01-01T10:00:00Z"),
            Feature::new("S2_31TCJ_20230115", "2023-01-15T10:00:00Z"),
        ];
        let result = latest_per_grid(&features).unwrap();
        assert_eq!(ids(&result), vec!["S2_31TCJ_20230115"]);
    }

    #[test]
    fn test_first_seen_grid_order() {
        let features = vec![
            Feature::new("S2_32ULA_20230103", "2023-01-03T10:00:00Z"),
            Feature::new("S2_31TCJ_20230110", "2023-01-10T10:00:00Z"),
            Feature::new("S2_32ULA_20230101", "2023-01-01T10:00:00Z"),
            Feature::new("S2_31TCJ_20230102", "2023-01-02T10:00:00Z"),
        ];
        let result = latest_per_grid(&features).unwrap();
        assert_eq!(ids(&result), vec!["S2_32ULA_20230103", "S2_31TCJ_20230110"]);
    }

    #[test]
    fn test_equal_timestamps_keep_first() {
        let features = vec![
            Feature::new("S2A_31TCJ_20230101", "2023-01-01T10:00:00Z"),
            Feature::new("S2B_31TCJ_20230101", "2023-01-01T10:00:00Z"),
        ];
        let result = latest_per_grid(&features).unwrap();
        assert_eq!(ids(&result), vec!["S2A_31TCJ_20230101"]);
    }

    #[test]
    fn test_idempotent() {
        let features = vec![
            Feature::new("S2_31TCJ_20230101", "2023-01-01T10:00:00Z"),
            Feature::new("S2_32ULA_20230105", "2023-01-05T10:00:00Z"),
            Feature::new("S2_31TCJ_20230120", "2023-01-20T10:00:00Z"),
        ];
        let once = latest_per_grid(&features).unwrap();
        let twice = latest_per_grid(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_errors_propagate() {
        let malformed = vec![Feature::new("S2A31TCJ", "2023-01-01T10:00:00Z")];
        assert!(matches!(
            latest_per_grid(&malformed),
            Err(CubeError::MalformedId { .. })
        ));

        let mut undated = Feature::new("S2_31TCJ_20230101", "2023-01-01T10:00:00Z");
        undated.properties.clear();
        assert!(matches!(
            latest_per_grid(&[undated]),
            Err(CubeError::MissingField { .. })
        ));
    }
}
