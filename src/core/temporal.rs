use crate::types::{CubeError, CubeResult, Feature};
use chrono::{Duration, NaiveDate};

/// Minimum spacing between selected scenes for a query window
///
/// | window (days) | step     |
/// |---------------|----------|
/// | <= 60         | 7 days   |
/// | <= 365        | 30 days  |
/// | <= 1095       | 90 days  |
/// | > 1095        | 180 days |
pub fn sampling_step(start_date: NaiveDate, end_date: NaiveDate) -> CubeResult<Duration> {
    if end_date < start_date {
        return Err(CubeError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }

    let total_days = (end_date - start_date).num_days();
    let step_days = match total_days {
        0..=60 => 7,
        61..=365 => 30,
        366..=1095 => 90,
        _ => 180,
    };
    Ok(Duration::days(step_days))
}

/// Greedily pick scenes at least one sampling step apart
///
/// Scenes are ordered by their raw timestamp (stable for equal timestamps)
/// and compared on the calendar date. The earliest scene is always selected.
pub fn downsample(
    features: &[Feature],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> CubeResult<Vec<Feature>> {
    let step = sampling_step(start_date, end_date)?;

    let mut dated = features
        .iter()
        .map(|feature| -> CubeResult<_> {
            Ok((feature.datetime()?, feature.acquisition_date()?, feature))
        })
        .collect::<CubeResult<Vec<_>>>()?;
    dated.sort_by(|a, b| a.0.cmp(b.0));

    let mut selected = Vec::new();
    let mut last_selected: Option<NaiveDate> = None;
    for (_, date, feature) in dated {
        if last_selected.map_or(true, |last| date >= last + step) {
            selected.push(feature.clone());
            last_selected = Some(date);
        }
    }

    log::info!(
        "Temporal downsampling ({} day step over {} to {}): {} -> {} features",
        step.num_days(),
        start_date,
        end_date,
        features.len(),
        selected.len()
    );
    Ok(selected)
}
