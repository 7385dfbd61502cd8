//! ArcGIS REST feature source.

use std::future::Future;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::http::AsyncHttpClient;
use super::query::{FeatureQuery, IdsQuery};
use super::types::{embedded_error, FeaturesResponse, IdList, IdsResponse, RawFeature, SourceError};

/// A queryable source of road features.
pub trait FeatureSource: Send + Sync {
    /// Identifiers of the features matching `query`. A response without an
    /// identifier list is an empty list.
    fn query_ids(&self, query: &IdsQuery)
        -> impl Future<Output = Result<IdList, SourceError>> + Send;

    /// Full features matching `query`.
    fn query_features(
        &self,
        query: &FeatureQuery,
    ) -> impl Future<Output = Result<Vec<RawFeature>, SourceError>> + Send;
}

/// [`FeatureSource`] speaking the ArcGIS MapServer/FeatureServer query API.
#[derive(Clone)]
pub struct ArcGisFeatureSource<C> {
    client: C,
}

impl<C: AsyncHttpClient> ArcGisFeatureSource<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// GETs `url` and decodes the JSON payload.
    async fn fetch(&self, url: &str) -> Result<Value, SourceError> {
        let body = self.client.get(url).await?;
        let payload: Value = serde_json::from_slice(&body)?;
        // Services report query errors with HTTP 200 and an error object.
        match embedded_error(&payload) {
            Some(error) => Err(error),
            None => Ok(payload),
        }
    }
}

impl<C: AsyncHttpClient> FeatureSource for ArcGisFeatureSource<C> {
    #[instrument(skip_all, fields(endpoint = %query.endpoint))]
    async fn query_ids(&self, query: &IdsQuery) -> Result<IdList, SourceError> {
        let url = query.to_url()?;
        let payload = self.fetch(url.as_str()).await?;
        let response: IdsResponse = serde_json::from_value(payload)?;
        let ids = response.object_ids.unwrap_or_default();
        debug!(count = ids.len(), "Identifier query complete");
        Ok(IdList {
            field_name: response.object_id_field_name,
            ids,
        })
    }

    #[instrument(skip_all, fields(endpoint = %query.endpoint))]
    async fn query_features(&self, query: &FeatureQuery) -> Result<Vec<RawFeature>, SourceError> {
        let url = query.to_url()?;
        let payload = self.fetch(url.as_str()).await?;
        let response: FeaturesResponse = serde_json::from_value(payload)?;
        if response.exceeded_transfer_limit {
            warn!(
                id_range = ?query.id_range,
                "Service truncated the response; its record limit is below the layer batch limit"
            );
        }
        let features: Vec<RawFeature> = response
            .features
            .unwrap_or_default()
            .into_iter()
            .map(|feature| feature.into_raw(&query.id_field))
            .collect();
        debug!(count = features.len(), "Feature query complete");
        Ok(features)
    }
}
