//! Integration tests for the fetch pipeline.
//!
//! These tests drive the real ArcGIS source and the built-in catalog against
//! a canned HTTP client:
//! - Two visible regions, one failing (partial success)
//! - Identifier paging across several feature requests
//! - Service errors embedded in 200 responses
//! - Region permissions
//!
//! Run with: `cargo test --test fetch_integration`

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use regex::Regex;
use serde_json::{json, Value};
use url::Url;

use fclayer::access::Caller;
use fclayer::catalog::RegionCatalog;
use fclayer::fetch::{ControllerSettings, FetchController, FetchError, FetchStatus, GenerationOutcome, MemorySink};
use fclayer::geo::{max_allowable_offset, Extent, Viewport};
use fclayer::road_class::RoadClass;
use fclayer::source::{ArcGisFeatureSource, AsyncHttpClient, SourceError};

// ============================================================================
// Canned HTTP client
// ============================================================================

/// One region's canned service.
#[derive(Clone)]
enum Service {
    /// Identifier list plus the features it refers to, keyed by id.
    Features { ids: Vec<i64>, features: HashMap<i64, Value> },
    /// Every request fails with this status.
    Status(u16),
    /// Every request returns an embedded error object.
    ApiError(i64, &'static str),
}

#[derive(Default)]
struct CannedHttp {
    services: Vec<(&'static str, Service)>,
    requests: Mutex<Vec<String>>,
}

impl CannedHttp {
    fn service(mut self, host_fragment: &'static str, service: Service) -> Self {
        self.services.push((host_fragment, service));
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\((\w+)>=(-?\d+) AND \w+<=(-?\d+)\)").unwrap())
}

fn param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

impl AsyncHttpClient for CannedHttp {
    async fn get(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        self.requests.lock().unwrap().push(url.to_string());
        let parsed = Url::parse(url).map_err(|e| SourceError::InvalidUrl(e.to_string()))?;

        let Some((_, service)) = self.services.iter().find(|(host, _)| url.contains(host)) else {
            return Err(SourceError::Status {
                status: 404,
                url: url.to_string(),
            });
        };

        let body = match service {
            Service::Status(status) => {
                return Err(SourceError::Status {
                    status: *status,
                    url: url.to_string(),
                })
            }
            Service::ApiError(code, message) => {
                json!({"error": {"code": code, "message": message, "details": []}})
            }
            Service::Features { ids, features } => {
                if param(&parsed, "returnIdsOnly").as_deref() == Some("true") {
                    json!({"objectIdFieldName": "OBJECTID", "objectIds": ids})
                } else {
                    let clause = param(&parsed, "where").unwrap_or_default();
                    let captures = range_pattern().captures(&clause).expect("id range in where");
                    let low: i64 = captures[2].parse().unwrap();
                    let high: i64 = captures[3].parse().unwrap();
                    let selected: Vec<Value> = ids
                        .iter()
                        .filter(|id| (low..=high).contains(*id))
                        .filter_map(|id| features.get(id).cloned())
                        .collect();
                    json!({"features": selected})
                }
            }
        };
        Ok(serde_json::to_vec(&body).unwrap())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

const MD_HOST: &str = "services.arcgis.com/njFNhDsUCentVYJW";
const DC_HOST: &str = "maps2.dcgis.dc.gov";

fn md_feature(id: i64, fc: i64, prefix: &str) -> Value {
    json!({
        "attributes": {"OBJECTID": id, "FUNCTIONAL_CLASS": fc, "ID_PREFIX": prefix, "MP_SUFFIX": ""},
        "geometry": {"paths": [[[-77.0, 38.95], [-76.99, 38.96, 0.0]]]}
    })
}

fn md_service(features: Vec<(i64, Value)>) -> Service {
    let ids = features.iter().map(|(id, _)| *id).rev().collect();
    Service::Features {
        ids,
        features: features.into_iter().collect(),
    }
}

fn viewport(zoom: u8) -> Viewport {
    Viewport::new(zoom, Extent::around(-77.0, 38.95, 0.05, 0.05)).with_regions(["MD", "DC"])
}

fn controller(
    http: CannedHttp,
    caller: Caller,
) -> FetchController<ArcGisFeatureSource<Arc<CannedHttp>>, MemorySink> {
    let settings = ControllerSettings {
        caller,
        ..ControllerSettings::default()
    };
    FetchController::new(
        Arc::new(RegionCatalog::builtin().unwrap()),
        Arc::new(ArcGisFeatureSource::new(Arc::new(http))),
        Arc::new(MemorySink::new()),
        settings,
    )
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_partial_success_across_two_regions() {
    let http = CannedHttp::default()
        .service(
            MD_HOST,
            md_service(vec![
                (1, md_feature(1, 1, "IS")),
                (2, md_feature(2, 7, "MD")),
                (3, md_feature(3, 7, "CO")),
            ]),
        )
        .service(DC_HOST, Service::Status(500));
    let ctl = controller(http, Caller::new(4));

    let outcome = ctl.on_viewport_changed(viewport(14)).await;
    let GenerationOutcome::Rendered(report) = outcome else {
        panic!("expected a render, got {outcome:?}");
    };
    assert_eq!(report.regions, vec!["DC", "MD"]);
    assert_eq!(report.failed_layers(), 1);
    assert!(matches!(&report.failures[0], FetchError::Enumerate { region, .. } if region == "DC"));

    let records = ctl.sink().records();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.region == "MD"));

    let by_id = |id| records.iter().find(|r| r.feature_id == Some(id)).unwrap();
    assert_eq!(by_id(1).class, RoadClass::Freeway);
    // State routes are at least minor highways.
    assert_eq!(by_id(2).class, RoadClass::MinorHighway);
    assert_eq!(by_id(3).class, RoadClass::Street);
    assert_eq!(by_id(1).paths, vec![vec![[-77.0, 38.95], [-76.99, 38.96]]]);

    match ctl.sink().status() {
        FetchStatus::Error(message) => {
            assert!(message.contains("region DC"));
            assert!(message.contains("HTTP 500"));
        }
        other => panic!("expected error status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_large_layer_is_paged_by_id_range() {
    let features = (1..=2300).map(|id| (id, md_feature(id, 3, "US"))).collect();
    let http = Arc::new(CannedHttp::default().service(MD_HOST, md_service(features)));
    let ctl = FetchController::new(
        Arc::new(RegionCatalog::builtin().unwrap()),
        Arc::new(ArcGisFeatureSource::new(Arc::clone(&http))),
        Arc::new(MemorySink::new()),
        ControllerSettings {
            caller: Caller::new(4),
            ..ControllerSettings::default()
        },
    );

    let viewport = Viewport::new(14, Extent::around(-77.0, 38.95, 0.05, 0.05)).with_regions(["MD"]);
    let outcome = ctl.on_viewport_changed(viewport).await;
    assert_eq!(outcome.report().unwrap().rendered, 2300);
    assert_eq!(ctl.sink().status(), FetchStatus::Idle);

    let feature_requests: Vec<Url> = http
        .requests()
        .iter()
        .filter(|url| url.contains("returnGeometry=true"))
        .map(|url| Url::parse(url).unwrap())
        .collect();
    assert_eq!(feature_requests.len(), 3);

    let mut clauses: Vec<String> = feature_requests
        .iter()
        .map(|url| param(url, "where").unwrap())
        .collect();
    clauses.sort();
    assert_eq!(
        clauses,
        vec![
            "(OBJECTID>=1 AND OBJECTID<=1000) AND (FUNCTIONAL_CLASS < 7 OR ID_PREFIX IN('MD'))",
            "(OBJECTID>=1001 AND OBJECTID<=2000) AND (FUNCTIONAL_CLASS < 7 OR ID_PREFIX IN('MD'))",
            "(OBJECTID>=2001 AND OBJECTID<=2300) AND (FUNCTIONAL_CLASS < 7 OR ID_PREFIX IN('MD'))",
        ]
    );

    let md = RegionCatalog::builtin().unwrap();
    let expected_offset = max_allowable_offset(&md.region("MD").unwrap().max_offset, 14);
    let offset: f64 = param(&feature_requests[0], "maxAllowableOffset")
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(offset, expected_offset);
}

#[tokio::test]
async fn test_embedded_service_error_fails_generation() {
    let http = CannedHttp::default()
        .service(MD_HOST, Service::ApiError(400, "Invalid or missing input parameters."))
        .service(DC_HOST, Service::Status(503));
    let ctl = controller(http, Caller::new(4));

    let outcome = ctl.on_viewport_changed(viewport(14)).await;
    let GenerationOutcome::Failed(report) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(report.failed_layers(), 2);
    assert_eq!(ctl.sink().render_count(), 0);

    let summary = report.failure_summary();
    assert!(summary.contains("API error 400: Invalid or missing input parameters."));
    assert!(summary.contains("HTTP 503"));
    assert!(ctl.sink().status().is_error());
}

#[tokio::test]
async fn test_low_rank_caller_sees_no_default_regions() {
    let http = CannedHttp::default().service(MD_HOST, md_service(vec![(1, md_feature(1, 1, "IS"))]));
    let ctl = controller(http, Caller::new(1));

    let outcome = ctl.on_viewport_changed(viewport(14)).await;
    assert!(outcome.report().unwrap().regions.is_empty());
    assert!(ctl.sink().records().is_empty());
}

#[tokio::test]
async fn test_zooming_out_clears_display() {
    let http = CannedHttp::default()
        .service(MD_HOST, md_service(vec![(1, md_feature(1, 1, "IS"))]))
        .service(DC_HOST, Service::Status(500));
    let ctl = controller(http, Caller::new(4));

    ctl.on_viewport_changed(viewport(15)).await;
    assert_eq!(ctl.sink().records().len(), 1);

    let outcome = ctl.on_viewport_changed(viewport(10)).await;
    assert!(matches!(outcome, GenerationOutcome::Cleared));
    assert!(ctl.sink().records().is_empty());
}
