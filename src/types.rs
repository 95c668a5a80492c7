use chrono::NaiveDate;
use geo::{coord, LineString, MultiPolygon, Polygon, Rect};
use ndarray::ArrayD;
use num_traits::Float;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property key carrying the acquisition timestamp of a scene
pub const DATETIME_PROPERTY: &str = "datetime";

/// Scene footprint as delivered by the catalog (GeoJSON polygonal geometry)
///
/// Positions may carry a third (altitude) ordinate; only the first two are used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Footprint {
    Polygon(Vec<Vec<Vec<f64>>>),
    MultiPolygon(Vec<Vec<Vec<Vec<f64>>>>),
}

impl Footprint {
    /// Convert the footprint into a planar multipolygon
    pub fn to_multi_polygon(&self) -> CubeResult<MultiPolygon<f64>> {
        match self {
            Footprint::Polygon(rings) => Ok(MultiPolygon::new(vec![rings_to_polygon(rings)?])),
            Footprint::MultiPolygon(polygons) => {
                let polygons = polygons
                    .iter()
                    .map(|rings| rings_to_polygon(rings))
                    .collect::<CubeResult<Vec<_>>>()?;
                Ok(MultiPolygon::new(polygons))
            }
        }
    }
}

fn rings_to_polygon(rings: &[Vec<Vec<f64>>]) -> CubeResult<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| ring_to_line_string(ring));
    let exterior = match rings.next() {
        Some(ring) => ring?,
        None => {
            return Err(CubeError::InvalidFormat(
                "polygon has no exterior ring".to_string(),
            ))
        }
    };
    let interiors = rings.collect::<CubeResult<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn ring_to_line_string(ring: &[Vec<f64>]) -> CubeResult<LineString<f64>> {
    ring.iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(coord! { x: *x, y: *y }),
            _ => Err(CubeError::InvalidFormat(format!(
                "position needs at least two ordinates, got {}",
                position.len()
            ))),
        })
        .collect::<CubeResult<Vec<_>>>()
        .map(LineString::new)
}

/// A scene record from the catalog (a STAC item)
///
/// Members other than `id`, `geometry` and `properties` are kept untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    #[serde(default)]
    pub geometry: Option<Footprint>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Feature {
    /// Create a feature with an id and acquisition timestamp only
    pub fn new(id: impl Into<String>, datetime: impl Into<String>) -> Self {
        let mut properties = Map::new();
        properties.insert(
            DATETIME_PROPERTY.to_string(),
            Value::String(datetime.into()),
        );
        Self {
            id: id.into(),
            geometry: None,
            properties,
            extra: Map::new(),
        }
    }

    pub fn with_geometry(mut self, geometry: Footprint) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Raw ISO-8601 acquisition timestamp
    pub fn datetime(&self) -> CubeResult<&str> {
        self.properties
            .get(DATETIME_PROPERTY)
            .and_then(Value::as_str)
            .ok_or_else(|| CubeError::MissingField {
                id: self.id.clone(),
                field: DATETIME_PROPERTY.to_string(),
            })
    }

    /// Calendar date of acquisition (date portion of the timestamp)
    pub fn acquisition_date(&self) -> CubeResult<NaiveDate> {
        let datetime = self.datetime()?;
        let date_part = datetime.split('T').next().unwrap_or(datetime);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map_err(|_| CubeError::InvalidTimestamp(datetime.to_string()))
    }

    /// Footprint as a planar multipolygon
    pub fn footprint(&self) -> CubeResult<MultiPolygon<f64>> {
        self.geometry
            .as_ref()
            .ok_or_else(|| CubeError::MissingField {
                id: self.id.clone(),
                field: "geometry".to_string(),
            })?
            .to_multi_polygon()
    }
}

/// Axis-aligned query box in the same reference as scene footprints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// `[minX, minY, maxX, maxY]`, the ordering used by search APIs
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Rect::new(
            coord! { x: self.min_x, y: self.min_y },
            coord! { x: self.max_x, y: self.max_y },
        )
        .to_polygon()
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(values: [f64; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }
}

/// N-dimensional array with a per-element missing mask (`true` = missing)
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray<T> {
    pub data: ArrayD<T>,
    pub mask: ArrayD<bool>,
}

impl<T: Float> MaskedArray<T> {
    /// Pair data with a mask of the same shape
    pub fn new(data: ArrayD<T>, mask: ArrayD<bool>) -> CubeResult<Self> {
        if data.shape() != mask.shape() {
            return Err(CubeError::ShapeMismatch {
                expected: data.shape().to_vec(),
                found: mask.shape().to_vec(),
            });
        }
        Ok(Self { data, mask })
    }

    /// Wrap data with nothing missing
    pub fn from_data(data: ArrayD<T>) -> Self {
        let mask = ArrayD::from_elem(data.raw_dim(), false);
        Self { data, mask }
    }

    /// Mark every NaN element as missing
    pub fn masked_where_nan(data: ArrayD<T>) -> Self {
        let mask = data.mapv(|value| value.is_nan());
        Self { data, mask }
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Value at `index`, or `None` when missing or out of bounds
    pub fn get(&self, index: &[usize]) -> Option<T> {
        match self.mask.get(index) {
            Some(false) => self.data.get(index).copied(),
            _ => None,
        }
    }

    pub fn count_valid(&self) -> usize {
        self.mask.iter().filter(|missing| !**missing).count()
    }
}

/// Error types for scene curation and compositing
#[derive(Debug, thiserror::Error)]
pub enum CubeError {
    #[error("Malformed scene id '{id}': expected at least {required} '_'-separated segments")]
    MalformedId { id: String, required: usize },

    #[error("Feature '{id}' is missing required field '{field}'")]
    MissingField { id: String, field: String },

    #[error("Invalid date range: end {end} precedes start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Unsupported aggregation operation: {0}")]
    UnsupportedOperation(String),

    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch { expected: Vec<usize>, found: Vec<usize> },

    #[error("Aggregation requires at least one array")]
    EmptyInput,

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Result type for curation and compositing operations
pub type CubeResult<T> = Result<T, CubeError>;
