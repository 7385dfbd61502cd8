//! Feature retrieval for one identifier range.

use serde::Serialize;
use tracing::{debug, instrument, trace};

use super::enumerate::IdRange;
use super::error::FetchError;
use super::generation::GenerationToken;
use super::request::LayerRequest;
use crate::classify::classify;
use crate::road_class::RoadClass;
use crate::source::{FeatureQuery, FeatureSource, IdRangeClause};

/// A drawable, classified road line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedLineRecord {
    pub region: String,
    pub layer: String,
    pub feature_id: Option<i64>,
    pub class: RoadClass,
    pub color: String,
    pub paths: Vec<Vec<[f64; 2]>>,
}

impl ClassifiedLineRecord {
    /// Stacking order; higher classes draw on top.
    pub fn z_index(&self) -> u32 {
        self.class.z_index()
    }
}

/// Classified output of one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutput {
    pub records: Vec<ClassifiedLineRecord>,
    /// Features no rule could classify.
    pub unclassified: usize,
    /// Lowest-class features suppressed by the hide-streets setting.
    pub hidden: usize,
    /// The generation was superseded; the output is empty and must be
    /// discarded.
    pub cancelled: bool,
}

impl BatchOutput {
    fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }
}

/// Fetches and classifies the features of `request` whose identifiers lie
/// in `range`.
#[instrument(
    skip_all,
    fields(region = %request.key.region, layer = %request.key.layer, low = range.low, high = range.high)
)]
pub async fn retrieve_batch<S: FeatureSource>(
    source: &S,
    request: &LayerRequest,
    id_field: &str,
    range: IdRange,
    hide_streets: bool,
    token: &GenerationToken,
) -> Result<BatchOutput, FetchError> {
    if token.is_cancelled() {
        return Ok(BatchOutput::cancelled());
    }
    let _guard = token.track();

    let query = FeatureQuery {
        endpoint: request.endpoint.clone(),
        extent: request.extent,
        where_clause: request.where_clause.clone(),
        out_fields: request.layer.out_fields.clone(),
        max_allowable_offset: request.max_allowable_offset,
        id_range: Some(IdRangeClause {
            field: id_field.to_string(),
            low: range.low,
            high: range.high,
        }),
        id_field: id_field.to_string(),
    };
    let features = source
        .query_features(&query)
        .await
        .map_err(|source| FetchError::Batch {
            region: request.key.region.clone(),
            layer: request.key.layer.clone(),
            endpoint: request.endpoint.clone(),
            low: range.low,
            high: range.high,
            source,
        })?;

    if token.is_cancelled() {
        return Ok(BatchOutput::cancelled());
    }

    let mut output = BatchOutput::default();
    for feature in features {
        let Some(class) = classify(&feature, &request.layer) else {
            debug!(feature_id = ?feature.id, "Dropping unclassifiable feature");
            output.unclassified += 1;
            continue;
        };
        if hide_streets && class == RoadClass::lowest() {
            output.hidden += 1;
            continue;
        }
        if feature.paths.is_empty() {
            trace!(feature_id = ?feature.id, "Skipping feature without geometry");
            continue;
        }
        output.records.push(ClassifiedLineRecord {
            region: request.key.region.clone(),
            layer: request.key.layer.clone(),
            feature_id: feature.id,
            class,
            color: request.colors.color_for(class).to_string(),
            paths: feature.paths,
        });
    }

    trace!(
        records = output.records.len(),
        unclassified = output.unclassified,
        hidden = output.hidden,
        "Batch classified"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LayerDescriptor, RegionDescriptor, RoadTypeMap};
    use crate::fetch::generation::GenerationId;
    use crate::geo::{Extent, Viewport};
    use crate::source::{IdList, IdsQuery, RawFeature, SourceError};
    use serde_json::json;
    use std::sync::Mutex;

    struct Features {
        result: Result<Vec<RawFeature>, SourceError>,
        seen: Mutex<Vec<FeatureQuery>>,
    }

    impl FeatureSource for Features {
        async fn query_ids(&self, _query: &IdsQuery) -> Result<IdList, SourceError> {
            Ok(IdList::default())
        }

        async fn query_features(&self, query: &FeatureQuery) -> Result<Vec<RawFeature>, SourceError> {
            self.seen.lock().unwrap().push(query.clone());
            self.result.clone()
        }
    }

    fn features(result: Result<Vec<RawFeature>, SourceError>) -> Features {
        Features {
            result,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn line() -> Vec<Vec<[f64; 2]>> {
        vec![vec![[0.25, 0.25], [0.3, 0.3]]]
    }

    fn feature(id: i64, fc: i64) -> RawFeature {
        let mut feature = RawFeature::from_attributes(json!({"OBJECTID": id, "FC": fc})).with_paths(line());
        feature.id = Some(id);
        feature
    }

    fn request() -> LayerRequest {
        let region = RegionDescriptor::new("ZZ", "Test", "https://example.test/", Extent::new(0.0, 0.0, 1.0, 1.0))
            .layer(
                LayerDescriptor::new("0", "OBJECTID")
                    .fc_field("FC")
                    .table(RoadTypeMap::standard()),
            );
        LayerRequest::for_region(&region, &Viewport::new(14, Extent::new(0.2, 0.2, 0.4, 0.4))).remove(0)
    }

    fn range() -> IdRange {
        IdRange {
            low: 1,
            high: 3,
            count: 3,
        }
    }

    #[tokio::test]
    async fn test_batch_classifies_features() {
        let src = features(Ok(vec![feature(1, 1), feature(2, 3), feature(3, 7)]));
        let token = GenerationToken::new(GenerationId(1));
        let output = retrieve_batch(&src, &request(), "OBJECTID", range(), false, &token)
            .await
            .unwrap();

        let classes: Vec<RoadClass> = output.records.iter().map(|r| r.class).collect();
        assert_eq!(classes, vec![RoadClass::Freeway, RoadClass::MajorHighway, RoadClass::Street]);
        assert_eq!(output.records[0].color, RoadClass::Freeway.default_color());
        assert_eq!(output.records[1].feature_id, Some(2));

        let seen = src.seen.lock().unwrap();
        let clause = seen[0].id_range.as_ref().unwrap();
        assert_eq!((clause.low, clause.high), (1, 3));
        assert_eq!(clause.field, "OBJECTID");
    }

    #[tokio::test]
    async fn test_hide_streets_drops_lowest_class() {
        let src = features(Ok(vec![feature(1, 1), feature(2, 7), feature(3, 7)]));
        let token = GenerationToken::new(GenerationId(1));
        let output = retrieve_batch(&src, &request(), "OBJECTID", range(), true, &token)
            .await
            .unwrap();
        assert_eq!(output.records.len(), 1);
        assert_eq!(output.hidden, 2);
        assert!(output.records.iter().all(|r| r.class != RoadClass::Street));
    }

    #[tokio::test]
    async fn test_unclassified_features_are_counted() {
        let src = features(Ok(vec![feature(1, 42), feature(2, 2)]));
        let token = GenerationToken::new(GenerationId(1));
        let output = retrieve_batch(&src, &request(), "OBJECTID", range(), false, &token)
            .await
            .unwrap();
        assert_eq!(output.records.len(), 1);
        assert_eq!(output.unclassified, 1);
    }

    #[tokio::test]
    async fn test_batch_error_carries_range() {
        let src = features(Err(SourceError::Service {
            code: Some(400),
            message: "bad".to_string(),
        }));
        let token = GenerationToken::new(GenerationId(1));
        let err = retrieve_batch(&src, &request(), "OBJECTID", range(), false, &token)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Batch { low: 1, high: 3, .. }));
    }

    #[tokio::test]
    async fn test_cancelled_batch_is_empty() {
        let src = features(Ok(vec![feature(1, 1)]));
        let token = GenerationToken::new(GenerationId(1));
        token.cancel();
        let output = retrieve_batch(&src, &request(), "OBJECTID", range(), false, &token)
            .await
            .unwrap();
        assert!(output.cancelled);
        assert!(output.records.is_empty());
        assert!(src.seen.lock().unwrap().is_empty());
    }
}
