//! Bundled region descriptors.
//!
//! Endpoints, field names and tables describe each agency's published
//! ArcGIS service. Bounds are approximate state extents. Regions are grouped
//! by census region, one module each.

mod midwest;
mod northeast;
mod south;
mod west;

use super::types::{ColorMap, LayerDescriptor, RegionDescriptor, RoadTypeMap};
use crate::road_class::RoadClass;

/// Below this zoom level filters suppress local streets.
pub const LOCAL_STREET_MIN_ZOOM: u8 = 16;

fn low_zoom(zoom: u8) -> bool {
    zoom < LOCAL_STREET_MIN_ZOOM
}

fn fc_below_local(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    low_zoom(zoom).then(|| format!("{}<7", layer.fc_field_name()))
}

fn fc_not_local(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    low_zoom(zoom).then(|| format!("{}<>7", layer.fc_field_name()))
}

/// For services that store the numeric code as text.
fn fc_text_not_local(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    low_zoom(zoom).then(|| format!("{}<>'7'", layer.fc_field_name()))
}

fn fc_name_not_local(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    low_zoom(zoom).then(|| format!("{} <> 'Local'", layer.fc_field_name()))
}

/// Zero marks unclassified segments.
fn fc_classified_below_local(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    let fc = layer.fc_field_name();
    low_zoom(zoom).then(|| format!("{fc}>0 AND {fc}<7"))
}

/// Two-digit urban/rural codes: 9 and 19 are rural and urban locals.
fn urban_rural_not_local(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    low_zoom(zoom).then(|| format!("{} NOT IN (9,19)", layer.fc_field_name()))
}

fn palette_ew_as_mh() -> ColorMap {
    ColorMap::new().with(RoadClass::Expressway, "#149ece")
}

fn palette_ew_as_fw() -> ColorMap {
    ColorMap::new().with(RoadClass::Expressway, "#ff00c5")
}

fn palette_ew_violet() -> ColorMap {
    ColorMap::new().with(RoadClass::Expressway, "#5f33df")
}

fn standard_layer(id: &str, id_field: &str, fc_field: &str) -> LayerDescriptor {
    LayerDescriptor::new(id, id_field)
        .fc_field(fc_field)
        .out_fields([id_field, fc_field])
        .table(RoadTypeMap::standard())
}

pub(super) fn builtin_regions() -> Vec<RegionDescriptor> {
    [
        northeast::regions(),
        midwest::regions(),
        south::regions(),
        west::regions(),
    ]
    .into_iter()
    .flatten()
    .collect()
}
