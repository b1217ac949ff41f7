mod http;
mod marker;
mod types;

pub use http::HttpSource;
pub use marker::FreshnessMarker;
pub use types::{FetchedContent, RemoteSource};
