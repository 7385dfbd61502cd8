//! ArcGIS REST query URL construction.
//!
//! Both query kinds share the envelope geometry, spatial relation and
//! spatial references; they differ in what they ask the service to return.

use serde_json::json;
use url::Url;

use super::types::SourceError;
use crate::geo::Extent;

/// Spatial reference of every query (WGS84).
pub const WKID: u32 = 4326;

fn envelope_json(extent: &Extent) -> String {
    json!({
        "xmin": extent.xmin,
        "ymin": extent.ymin,
        "xmax": extent.xmax,
        "ymax": extent.ymax,
        "spatialReference": { "wkid": WKID },
    })
    .to_string()
}

fn build_url(
    endpoint: &str,
    extent: &Extent,
    params: &[(&str, String)],
    where_parts: &[String],
) -> Result<Url, SourceError> {
    let mut url = Url::parse(endpoint)?;
    {
        let wkid = WKID.to_string();
        let mut query = url.query_pairs_mut();
        query.append_pair("geometry", &envelope_json(extent));
        for (key, value) in params {
            query.append_pair(key, value);
        }
        if !where_parts.is_empty() {
            query.append_pair("where", &where_parts.join(" AND "));
        }
        query
            .append_pair("spatialRel", "esriSpatialRelIntersects")
            .append_pair("geometryType", "esriGeometryEnvelope")
            .append_pair("inSR", &wkid)
            .append_pair("outSR", &wkid)
            .append_pair("f", "json");
    }
    Ok(url)
}

/// Asks a layer for the identifiers of features intersecting an extent.
#[derive(Debug, Clone, PartialEq)]
pub struct IdsQuery {
    /// Layer query endpoint, `.../<layer>/query`.
    pub endpoint: String,
    pub extent: Extent,
    pub where_clause: Option<String>,
}

impl IdsQuery {
    pub fn to_url(&self) -> Result<Url, SourceError> {
        build_url(
            &self.endpoint,
            &self.extent,
            &[("returnIdsOnly", "true".to_string())],
            &self.where_clause.iter().cloned().collect::<Vec<_>>(),
        )
    }
}

/// Inclusive identifier range predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdRangeClause {
    pub field: String,
    pub low: i64,
    pub high: i64,
}

impl IdRangeClause {
    pub fn to_sql(&self) -> String {
        format!(
            "({field}>={low} AND {field}<={high})",
            field = self.field,
            low = self.low,
            high = self.high
        )
    }
}

/// Asks a layer for full geometry and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureQuery {
    pub endpoint: String,
    pub extent: Extent,
    pub where_clause: Option<String>,
    pub out_fields: Vec<String>,
    /// Simplification tolerance in degrees.
    pub max_allowable_offset: f64,
    pub id_range: Option<IdRangeClause>,
    /// Identifier attribute used to populate [`RawFeature::id`](super::RawFeature::id).
    pub id_field: String,
}

impl FeatureQuery {
    pub fn to_url(&self) -> Result<Url, SourceError> {
        let mut where_parts = Vec::new();
        if let Some(range) = &self.id_range {
            where_parts.push(range.to_sql());
        }
        if let Some(clause) = &self.where_clause {
            where_parts.push(clause.clone());
        }
        build_url(
            &self.endpoint,
            &self.extent,
            &[
                ("returnGeometry", "true".to_string()),
                ("maxAllowableOffset", self.max_allowable_offset.to_string()),
                ("outFields", self.out_fields.join(",")),
            ],
            &where_parts,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn params(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    fn extent() -> Extent {
        Extent::new(-77.05, 38.88, -77.0, 38.92)
    }

    #[test]
    fn test_ids_query_url() {
        let query = IdsQuery {
            endpoint: "https://example.test/MapServer/48/query".to_string(),
            extent: extent(),
            where_clause: Some("FC<7".to_string()),
        };
        let url = query.to_url().unwrap();
        assert_eq!(url.path(), "/MapServer/48/query");

        let p = params(&url);
        assert_eq!(p["returnIdsOnly"], "true");
        assert_eq!(p["where"], "FC<7");
        assert_eq!(p["spatialRel"], "esriSpatialRelIntersects");
        assert_eq!(p["geometryType"], "esriGeometryEnvelope");
        assert_eq!(p["inSR"], "4326");
        assert_eq!(p["outSR"], "4326");
        assert_eq!(p["f"], "json");
        assert!(!p.contains_key("outFields"));

        let geometry: serde_json::Value = serde_json::from_str(&p["geometry"]).unwrap();
        assert_eq!(geometry["xmin"], -77.05);
        assert_eq!(geometry["spatialReference"]["wkid"], 4326);
    }

    #[test]
    fn test_ids_query_without_where() {
        let query = IdsQuery {
            endpoint: "https://example.test/0/query".to_string(),
            extent: extent(),
            where_clause: None,
        };
        assert!(!params(&query.to_url().unwrap()).contains_key("where"));
    }

    #[test]
    fn test_feature_query_url() {
        let query = FeatureQuery {
            endpoint: "https://example.test/0/query".to_string(),
            extent: extent(),
            where_clause: Some("FC<7".to_string()),
            out_fields: vec!["OBJECTID".to_string(), "FC".to_string()],
            max_allowable_offset: 0.0001,
            id_range: Some(IdRangeClause {
                field: "OBJECTID".to_string(),
                low: 10,
                high: 20,
            }),
            id_field: "OBJECTID".to_string(),
        };
        let p = params(&query.to_url().unwrap());
        assert_eq!(p["returnGeometry"], "true");
        assert_eq!(p["maxAllowableOffset"], "0.0001");
        assert_eq!(p["outFields"], "OBJECTID,FC");
        assert_eq!(p["where"], "(OBJECTID>=10 AND OBJECTID<=20) AND FC<7");
    }

    #[test]
    fn test_invalid_endpoint() {
        let query = IdsQuery {
            endpoint: "not a url".to_string(),
            extent: extent(),
            where_clause: None,
        };
        assert!(matches!(query.to_url(), Err(SourceError::InvalidUrl(_))));
    }
}
