use crate::types::{BoundingBox, CubeResult, Feature};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};

/// Default collection for optical composites
pub const SENTINEL2_L2A: &str = "sentinel-2-l2a";

/// Spatial constraint of a catalog search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchArea {
    /// `bbox` query with `[minX, minY, maxX, maxY]`
    Bbox(BoundingBox),
    /// `intersects` query with a GeoJSON geometry
    Intersects(Value),
}

/// Catalog search parameters
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub area: SearchArea,
    /// First acquisition day (inclusive)
    pub start_date: NaiveDate,
    /// Last acquisition day (inclusive)
    pub end_date: NaiveDate,
    /// Exclusive upper bound on `eo:cloud_cover`
    pub max_cloud_cover: f64,
    pub collections: Vec<String>,
    /// Page size requested from the server
    pub limit: u32,
}

impl SearchParams {
    pub fn new(area: SearchArea, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            area,
            start_date,
            end_date,
            ..Self::default()
        }
    }

    /// JSON body of the first search request
    pub fn request_body(&self) -> Value {
        let mut body = json!({
            "collections": self.collections,
            "datetime": format!("{}T00:00:00Z/{}T23:59:59Z", self.start_date, self.end_date),
            "query": {"eo:cloud_cover": {"lt": self.max_cloud_cover}},
            "limit": self.limit,
        });
        match &self.area {
            SearchArea::Bbox(bbox) => body["bbox"] = json!(bbox.to_array()),
            SearchArea::Intersects(geometry) => body["intersects"] = geometry.clone(),
        }
        body
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        let today = chrono::Utc::now().date_naive();
        Self {
            area: SearchArea::Bbox(BoundingBox::new(-180.0, -90.0, 180.0, 90.0)),
            start_date: today,
            end_date: today,
            max_cloud_cover: 30.0,
            collections: vec![SENTINEL2_L2A.to_string()],
            limit: 100,
        }
    }
}

/// Link object of a search response page
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub rel: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub body: Option<Value>,
}

/// One page of an item search response
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    pub features: Vec<Feature>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl SearchPage {
    pub fn next_link(&self) -> Option<&Link> {
        self.links.iter().find(|link| link.rel == "next")
    }
}

/// Where to fetch the next page from
#[derive(Debug, Clone, PartialEq)]
enum NextRequest {
    Post(Value),
    Get(String),
}

fn next_request(page: &SearchPage) -> Option<NextRequest> {
    let link = page.next_link()?;
    match (&link.body, &link.href) {
        (Some(body), _) => Some(NextRequest::Post(body.clone())),
        (None, Some(href)) => Some(NextRequest::Get(href.clone())),
        (None, None) => {
            log::warn!("Ignoring 'next' link without body or href");
            None
        }
    }
}

/// Blocking client for a STAC item search endpoint
pub struct StacClient {
    endpoint: String,
    http: Client,
}

impl StacClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, Client::new())
    }

    pub fn with_client(endpoint: impl Into<String>, http: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run a search and follow `next` links until exhausted
    ///
    /// Pages are concatenated in the order received. Any non-success status
    /// aborts the whole search without retrying.
    pub fn search(&self, params: &SearchParams) -> CubeResult<Vec<Feature>> {
        log::info!(
            "Searching {} for {:?} between {} and {} (cloud cover < {})",
            self.endpoint,
            params.collections,
            params.start_date,
            params.end_date,
            params.max_cloud_cover
        );

        let mut features = Vec::new();
        let mut request = NextRequest::Post(params.request_body());
        let mut page_number = 1;

        loop {
            let page = self.fetch_page(&request)?;
            log::debug!("Page {}: {} features", page_number, page.features.len());

            let next = next_request(&page);
            features.extend(page.features);
            match next {
                Some(next) => request = next,
                None => break,
            }
            page_number += 1;
        }

        log::info!("Search returned {} features in {} page(s)", features.len(), page_number);
        Ok(features)
    }

    fn fetch_page(&self, request: &NextRequest) -> CubeResult<SearchPage> {
        let response = match request {
            NextRequest::Post(body) => self.http.post(&self.endpoint).json(body).send()?,
            NextRequest::Get(href) => self.http.get(href).send()?,
        };
        Ok(response.error_for_status()?.json::<SearchPage>()?)
    }
}
