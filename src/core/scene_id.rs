use crate::types::{CubeError, CubeResult};

/// Segments needed to read the grid code
const GRID_SEGMENTS: usize = 2;
/// Segments needed to read the date token
const DATE_SEGMENTS: usize = 3;

/// Typed view of a scene identifier such as `S2A_31TCJ_20230101_0_L2A`
///
/// Segment 1 is the grid cell code, whose first two characters are the
/// coordinate zone. Segment 2, when present, is the acquisition date token.
/// All other modules read these fields from here instead of slicing ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SceneId {
    pub grid: String,
    pub zone: String,
    pub date_token: Option<String>,
}

impl SceneId {
    pub fn parse(id: &str) -> CubeResult<Self> {
        let mut segments = id.split('_').skip(1);

        let grid = segments.next().ok_or_else(|| malformed(id, GRID_SEGMENTS))?;
        if grid.chars().count() < 2 {
            return Err(malformed(id, GRID_SEGMENTS));
        }
        let zone: String = grid.chars().take(2).collect();
        let date_token = segments.next().map(str::to_string);

        Ok(Self {
            grid: grid.to_string(),
            zone,
            date_token,
        })
    }

    /// Parse and insist on a date token
    pub fn parse_dated(id: &str) -> CubeResult<Self> {
        let scene_id = Self::parse(id)?;
        scene_id.require_date_token(id)?;
        Ok(scene_id)
    }

    pub fn require_date_token(&self, id: &str) -> CubeResult<&str> {
        self.date_token
            .as_deref()
            .ok_or_else(|| malformed(id, DATE_SEGMENTS))
    }
}

fn malformed(id: &str, required: usize) -> CubeError {
    CubeError::MalformedId {
        id: id.to_string(),
        required,
    }
}
