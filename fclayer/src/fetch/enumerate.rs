//! Identifier enumeration and batch partitioning.
//!
//! A layer is fetched in two steps: one query for the identifiers of every
//! feature in view, then one feature query per contiguous identifier range.
//! Ranges are sized so no feature query can exceed the service's record cap.

use tracing::{debug, instrument};

use super::error::FetchError;
use super::generation::GenerationToken;
use super::request::LayerRequest;
use crate::source::{FeatureSource, IdsQuery};

/// An inclusive identifier range covering `count` enumerated identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRange {
    pub low: i64,
    pub high: i64,
    pub count: usize,
}

/// Identifiers of one layer in view, ready to fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enumeration {
    /// Field the ranges apply to.
    pub id_field: String,
    pub ids: Vec<i64>,
    pub ranges: Vec<IdRange>,
}

/// Batch size for a layer: its own limit, capped by the provider's.
pub fn effective_batch_size(layer_limit: usize, provider_cap: usize) -> usize {
    layer_limit.min(provider_cap).max(1)
}

/// Sorts and deduplicates `ids`, then splits them into ranges of at most
/// `batch_size` identifiers.
pub fn partition_ids(mut ids: Vec<i64>, batch_size: usize) -> (Vec<i64>, Vec<IdRange>) {
    ids.sort_unstable();
    ids.dedup();
    let ranges = ids
        .chunks(batch_size.max(1))
        .filter_map(|chunk| {
            Some(IdRange {
                low: *chunk.first()?,
                high: *chunk.last()?,
                count: chunk.len(),
            })
        })
        .collect();
    (ids, ranges)
}

/// Enumerates the identifiers of `request`'s layer within its extent.
///
/// A superseded generation skips the query and yields an empty enumeration.
#[instrument(skip_all, fields(region = %request.key.region, layer = %request.key.layer, generation = %token.id()))]
pub async fn enumerate_ids<S: FeatureSource>(
    source: &S,
    request: &LayerRequest,
    provider_cap: usize,
    token: &GenerationToken,
) -> Result<Enumeration, FetchError> {
    if token.is_cancelled() {
        return Ok(Enumeration::default());
    }
    let _guard = token.track();

    let query = IdsQuery {
        endpoint: request.endpoint.clone(),
        extent: request.extent,
        where_clause: request.where_clause.clone(),
    };
    let list = source
        .query_ids(&query)
        .await
        .map_err(|source| FetchError::Enumerate {
            region: request.key.region.clone(),
            layer: request.key.layer.clone(),
            endpoint: request.endpoint.clone(),
            source,
        })?;

    let id_field = list
        .field_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| request.layer.id_field.clone());
    let batch_size = effective_batch_size(request.layer.batch_limit, provider_cap);
    let (ids, ranges) = partition_ids(list.ids, batch_size);

    debug!(
        ids = ids.len(),
        batches = ranges.len(),
        batch_size,
        id_field = %id_field,
        "Enumerated layer identifiers"
    );

    Ok(Enumeration {
        id_field,
        ids,
        ranges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LayerDescriptor, RegionDescriptor};
    use crate::fetch::generation::GenerationId;
    use crate::geo::{Extent, Viewport};
    use crate::source::{FeatureQuery, IdList, RawFeature, SourceError};
    use proptest::prelude::*;
    use std::sync::Mutex;

    struct IdsOnly {
        result: Result<IdList, SourceError>,
        calls: Mutex<usize>,
    }

    impl FeatureSource for IdsOnly {
        async fn query_ids(&self, _query: &IdsQuery) -> Result<IdList, SourceError> {
            *self.calls.lock().unwrap() += 1;
            self.result.clone()
        }

        async fn query_features(&self, _query: &FeatureQuery) -> Result<Vec<RawFeature>, SourceError> {
            Ok(Vec::new())
        }
    }

    fn source(result: Result<IdList, SourceError>) -> IdsOnly {
        IdsOnly {
            result,
            calls: Mutex::new(0),
        }
    }

    fn request(batch_limit: usize) -> LayerRequest {
        let region = RegionDescriptor::new("ZZ", "Test", "https://example.test/", Extent::new(0.0, 0.0, 1.0, 1.0))
            .layer(LayerDescriptor::new("0", "OBJECTID").batch_limit(batch_limit));
        let viewport = Viewport::new(14, Extent::new(0.2, 0.2, 0.4, 0.4));
        LayerRequest::for_region(&region, &viewport).remove(0)
    }

    #[test]
    fn test_partition_exact_batches() {
        let (ids, ranges) = partition_ids((1..=2500).collect(), 1000);
        assert_eq!(ids.len(), 2500);
        assert_eq!(
            ranges,
            vec![
                IdRange { low: 1, high: 1000, count: 1000 },
                IdRange { low: 1001, high: 2000, count: 1000 },
                IdRange { low: 2001, high: 2500, count: 500 },
            ]
        );
    }

    #[test]
    fn test_partition_sorts_and_dedups() {
        let (ids, ranges) = partition_ids(vec![9, 3, 3, 7, 1], 2);
        assert_eq!(ids, vec![1, 3, 7, 9]);
        assert_eq!(ranges[0], IdRange { low: 1, high: 3, count: 2 });
        assert_eq!(ranges[1], IdRange { low: 7, high: 9, count: 2 });
    }

    #[test]
    fn test_partition_empty() {
        let (ids, ranges) = partition_ids(Vec::new(), 1000);
        assert!(ids.is_empty());
        assert!(ranges.is_empty());
    }

    #[test]
    fn test_effective_batch_size() {
        assert_eq!(effective_batch_size(100_000, 1000), 1000);
        assert_eq!(effective_batch_size(500, 1000), 500);
        assert_eq!(effective_batch_size(0, 1000), 1);
    }

    proptest! {
        #[test]
        fn prop_partition_covers_every_id(
            ids in proptest::collection::vec(-5000i64..5000, 0..600),
            batch in 1usize..200,
        ) {
            let (sorted, ranges) = partition_ids(ids.clone(), batch);
            let mut expected = ids;
            expected.sort_unstable();
            expected.dedup();
            prop_assert_eq!(&sorted, &expected);
            prop_assert_eq!(ranges.len(), expected.len().div_ceil(batch));
            prop_assert_eq!(ranges.iter().map(|r| r.count).sum::<usize>(), expected.len());
            for range in &ranges {
                prop_assert!(range.count <= batch);
                prop_assert!(range.low <= range.high);
            }
            for pair in ranges.windows(2) {
                prop_assert!(pair[0].high < pair[1].low);
            }
        }
    }

    #[tokio::test]
    async fn test_enumerate_uses_response_field_name() {
        let src = source(Ok(IdList {
            field_name: Some("FID".to_string()),
            ids: (1..=2500).rev().collect(),
        }));
        let token = GenerationToken::new(GenerationId(1));
        let enumeration = enumerate_ids(&src, &request(1000), 1000, &token).await.unwrap();
        assert_eq!(enumeration.id_field, "FID");
        assert_eq!(enumeration.ranges.len(), 3);
        assert_eq!(enumeration.ids.first(), Some(&1));
        assert_eq!(token.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_enumerate_falls_back_to_layer_id_field() {
        let src = source(Ok(IdList {
            field_name: None,
            ids: vec![4, 2],
        }));
        let token = GenerationToken::new(GenerationId(1));
        let enumeration = enumerate_ids(&src, &request(1000), 1000, &token).await.unwrap();
        assert_eq!(enumeration.id_field, "OBJECTID");
        assert_eq!(enumeration.ranges, vec![IdRange { low: 2, high: 4, count: 2 }]);
    }

    #[tokio::test]
    async fn test_enumerate_respects_provider_cap() {
        let src = source(Ok(IdList {
            field_name: None,
            ids: (0..5000).collect(),
        }));
        let token = GenerationToken::new(GenerationId(1));
        let enumeration = enumerate_ids(&src, &request(100_000), 1000, &token).await.unwrap();
        assert_eq!(enumeration.ranges.len(), 5);
    }

    #[tokio::test]
    async fn test_enumerate_error_carries_context() {
        let src = source(Err(SourceError::Status {
            status: 503,
            url: "https://example.test/0/query".to_string(),
        }));
        let token = GenerationToken::new(GenerationId(1));
        let err = enumerate_ids(&src, &request(1000), 1000, &token).await.unwrap_err();
        match err {
            FetchError::Enumerate { region, layer, endpoint, .. } => {
                assert_eq!(region, "ZZ");
                assert_eq!(layer, "0");
                assert_eq!(endpoint, "https://example.test/0/query");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_generation_skips_query() {
        let src = source(Ok(IdList::default()));
        let token = GenerationToken::new(GenerationId(1));
        token.cancel();
        let enumeration = enumerate_ids(&src, &request(1000), 1000, &token).await.unwrap();
        assert!(enumeration.ranges.is_empty());
        assert_eq!(*src.calls.lock().unwrap(), 0);
    }
}
