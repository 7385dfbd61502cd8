//! Data source payloads and errors.

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::catalog::value_as_int;

/// Errors from a feature data source.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid response payload: {0}")]
    Json(String),

    /// The service answered 200 with an embedded error object.
    #[error("API error{}: {message}", .code.map(|c| format!(" {}", c)).unwrap_or_default())]
    Service { code: Option<i64>, message: String },

    #[error("Invalid query URL: {0}")]
    InvalidUrl(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Json(e.to_string())
    }
}

impl From<url::ParseError> for SourceError {
    fn from(e: url::ParseError) -> Self {
        SourceError::InvalidUrl(e.to_string())
    }
}

/// Result of an identifier-only query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdList {
    /// Identifier field reported by the service, if any.
    pub field_name: Option<String>,
    /// Identifiers in service order.
    pub ids: Vec<i64>,
}

/// One feature as returned by a data source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeature {
    pub id: Option<i64>,
    pub attributes: Map<String, Value>,
    /// Polyline paths of `[lon, lat]` pairs.
    pub paths: Vec<Vec<[f64; 2]>>,
}

impl RawFeature {
    /// Feature with attributes only. Non-object values give an empty bag.
    pub fn from_attributes(attributes: Value) -> Self {
        let attributes = match attributes {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: None,
            attributes,
            paths: Vec::new(),
        }
    }

    pub fn with_paths(mut self, paths: Vec<Vec<[f64; 2]>>) -> Self {
        self.paths = paths;
        self
    }
}

/// The error a service embedded in an otherwise successful response.
///
/// Any non-null `error` member counts. `code` may be a number or numeric
/// text, and `details` entries may be strings or arbitrary JSON.
pub(crate) fn embedded_error(payload: &Value) -> Option<SourceError> {
    let error = payload.get("error").filter(|e| !e.is_null())?;
    let code = error.get("code").and_then(value_as_int);
    let message = match error.get("message") {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Null) | None if !error.is_object() => detail_text(error),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let details: Vec<String> = match error.get("details") {
        Some(Value::Array(items)) => items.iter().map(detail_text).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![detail_text(other)],
    };

    let message = match (message.is_empty(), details.is_empty()) {
        (_, true) => message,
        (true, false) => details.join("; "),
        (false, false) => format!("{} ({})", message, details.join("; ")),
    };
    Some(SourceError::Service { code, message })
}

fn detail_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IdsResponse {
    pub object_id_field_name: Option<String>,
    pub object_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeaturesResponse {
    #[serde(default)]
    pub features: Option<Vec<FeatureJson>>,
    /// Set when the service returned fewer features than matched.
    #[serde(default, rename = "exceededTransferLimit")]
    pub exceeded_transfer_limit: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeatureJson {
    #[serde(default)]
    pub attributes: Map<String, Value>,
    pub geometry: Option<GeometryJson>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeometryJson {
    #[serde(default)]
    pub paths: Vec<Vec<Vec<f64>>>,
}

impl FeatureJson {
    /// Converts to a [`RawFeature`], keeping only x/y of each vertex.
    pub fn into_raw(self, id_field: &str) -> RawFeature {
        let id = self.attributes.get(id_field).and_then(value_as_int);
        let paths = self
            .geometry
            .map(|g| {
                g.paths
                    .into_iter()
                    .map(|path| {
                        path.into_iter()
                            .filter(|point| point.len() >= 2)
                            .map(|point| [point[0], point[1]])
                            .collect::<Vec<_>>()
                    })
                    .filter(|path| !path.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        RawFeature {
            id,
            attributes: self.attributes,
            paths,
        }
    }
}
