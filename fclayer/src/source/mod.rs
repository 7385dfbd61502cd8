//! Feature data sources.
//!
//! Region layers are served by ArcGIS-style REST endpoints. Requests are
//! plain GETs with URL-encoded parameters and JSON responses; a non-success
//! status and a payload carrying an `error` object are both failures.

mod arcgis;
pub mod http;
mod query;
mod types;

pub use arcgis::{ArcGisFeatureSource, FeatureSource};
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
pub use query::{FeatureQuery, IdRangeClause, IdsQuery, WKID};
pub use types::{IdList, RawFeature, SourceError};
