//! Per-layer fetch parameters resolved for one viewport.

use crate::catalog::{ColorMap, LayerDescriptor, LayerKey, RegionDescriptor};
use crate::geo::{max_allowable_offset, Extent, Viewport};

/// Everything a generation needs to fetch one layer, owned so it can move
/// into spawned tasks.
#[derive(Debug, Clone)]
pub struct LayerRequest {
    pub key: LayerKey,
    pub layer: LayerDescriptor,
    pub colors: ColorMap,
    pub endpoint: String,
    pub where_clause: Option<String>,
    pub extent: Extent,
    /// Simplification tolerance in degrees.
    pub max_allowable_offset: f64,
}

impl LayerRequest {
    pub fn new(region: &RegionDescriptor, layer: &LayerDescriptor, viewport: &Viewport) -> Self {
        Self {
            key: LayerKey::new(region.code.clone(), layer.id.clone()),
            layer: layer.clone(),
            colors: region.colors.clone(),
            endpoint: region.query_url(layer),
            where_clause: region.where_clause(layer, viewport.zoom),
            extent: viewport.extent,
            max_allowable_offset: max_allowable_offset(&region.max_offset, viewport.zoom),
        }
    }

    /// All layer requests of `region` for `viewport`, in catalog order.
    pub fn for_region(region: &RegionDescriptor, viewport: &Viewport) -> Vec<Self> {
        region
            .layers
            .iter()
            .map(|layer| Self::new(region, layer, viewport))
            .collect()
    }
}
