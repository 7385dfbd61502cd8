//! Region rule catalog.
//!
//! An immutable registry of every supported region: where its data lives,
//! which layers to query, how each layer's attributes map onto
//! [`RoadClass`](crate::road_class::RoadClass), and who may see it.
//!
//! Classification strategies are selected by [`LayerKey`] lookup rather than
//! by branching on region codes.

mod regions;
mod types;

pub use types::{
    value_as_int, value_as_text, ClassificationStrategy, ColorMap, FcValue, FilterFn,
    LayerDescriptor, LayerKey, OverrideRule, RegionDescriptor, RoadTypeMap, DEFAULT_BATCH_LIMIT,
    DEFAULT_MAX_OFFSET,
};

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

/// Catalog construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Region '{0}' is defined more than once")]
    DuplicateRegion(String),

    #[error("Region '{0}' has no layers")]
    NoLayers(String),

    #[error("Region '{region}' defines layer '{layer}' more than once")]
    DuplicateLayer { region: String, layer: String },

    #[error("Layer {region}/{layer} has a zero batch limit")]
    ZeroBatchLimit { region: String, layer: String },

    #[error("Region '{region}' has an invalid base URL '{url}'")]
    InvalidBaseUrl { region: String, url: String },
}

/// Immutable registry of region descriptors keyed by region code.
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: BTreeMap<String, RegionDescriptor>,
}

impl RegionCatalog {
    /// Builds a catalog, validating every descriptor.
    pub fn from_regions(regions: Vec<RegionDescriptor>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for region in regions {
            validate(&region)?;
            if map.contains_key(&region.code) {
                return Err(CatalogError::DuplicateRegion(region.code));
            }
            map.insert(region.code.clone(), region);
        }
        Ok(Self { regions: map })
    }

    /// The bundled set of regions.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_regions(regions::builtin_regions())
    }

    pub fn region(&self, code: &str) -> Option<&RegionDescriptor> {
        self.regions.get(code)
    }

    pub fn layer(&self, key: &LayerKey) -> Option<&LayerDescriptor> {
        self.region(&key.region)
            .and_then(|region| region.find_layer(&key.layer))
    }

    pub fn strategy(&self, key: &LayerKey) -> Option<&ClassificationStrategy> {
        self.layer(key).map(|layer| &layer.strategy)
    }

    /// Regions in code order.
    pub fn regions(&self) -> impl Iterator<Item = &RegionDescriptor> {
        self.regions.values()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

fn validate(region: &RegionDescriptor) -> Result<(), CatalogError> {
    if region.layers.is_empty() {
        return Err(CatalogError::NoLayers(region.code.clone()));
    }
    if url::Url::parse(&region.base_url).is_err() {
        return Err(CatalogError::InvalidBaseUrl {
            region: region.code.clone(),
            url: region.base_url.clone(),
        });
    }
    let mut seen = HashSet::new();
    for layer in &region.layers {
        if !seen.insert(layer.id.as_str()) {
            return Err(CatalogError::DuplicateLayer {
                region: region.code.clone(),
                layer: layer.id.clone(),
            });
        }
        if layer.batch_limit == 0 {
            return Err(CatalogError::ZeroBatchLimit {
                region: region.code.clone(),
                layer: layer.id.clone(),
            });
        }
    }
    Ok(())
}
