//! External collaborators: catalog search and file bundling

pub mod stac_search;
pub mod archive;

pub use stac_search::{StacClient, SearchParams, SearchArea, SearchPage};
pub use archive::bundle_files;
