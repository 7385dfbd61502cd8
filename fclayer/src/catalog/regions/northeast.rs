//! New England and the Mid-Atlantic.

use super::{
    fc_classified_below_local, fc_name_not_local, fc_not_local, low_zoom, palette_ew_violet,
    standard_layer,
};
use crate::access::Permission;
use crate::catalog::{LayerDescriptor, RegionDescriptor, RoadTypeMap};
use crate::classify::rules;
use crate::geo::Extent;
use crate::road_class::RoadClass;

pub(super) fn regions() -> Vec<RegionDescriptor> {
    vec![
        connecticut(),
        maine(),
        massachusetts(),
        new_hampshire(),
        new_york(),
        pennsylvania(),
        rhode_island(),
        vermont(),
    ]
}

fn connecticut_routes_filter(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    low_zoom(zoom).then(|| format!("{} IN ('I','CT','SR','US')", layer.fc_field_name()))
}

fn new_york_shield_filter(_layer: &LayerDescriptor, _zoom: u8) -> Option<String> {
    Some("SHIELD IN ('C','CT')".to_string())
}

fn pennsylvania_filter(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    low_zoom(zoom).then(|| format!("{} NOT IN ('09','19')", layer.fc_field_name()))
}

fn rhode_island_filter(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    low_zoom(zoom).then(|| format!("{} NOT IN (7,0)", layer.fc_field_name()))
}

fn vermont_filter(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    let fc = layer.fc_field_name();
    low_zoom(zoom).then(|| format!("{fc}<>7 AND {fc}<>0"))
}

fn connecticut() -> RegionDescriptor {
    RegionDescriptor::new(
        "CT",
        "Connecticut",
        "https://services1.arcgis.com/FCaUeJ5SOVtImake/ArcGIS/rest/services/",
        Extent::new(-73.73, 40.98, -71.79, 42.05),
    )
    .source("CTDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .permission(Permission::MinRank(3))
    .layer(
        standard_layer("3", "OBJECTID", "FC_FC_CODE")
            .path("CTDOT_Roadway_Classification_and_Characteristic_Data/FeatureServer/"),
    )
    .layer(
        standard_layer("0", "OBJECTID", "ROUTE_PREFIX")
            .path("CTDOT_State_Routes_and_Local_Roads/FeatureServer/")
            .with_override(rules::connecticut_routes)
            .filter(connecticut_routes_filter),
    )
    .filter(fc_not_local)
}

fn maine() -> RegionDescriptor {
    RegionDescriptor::new(
        "ME",
        "Maine",
        "https://arcgisserver.maine.gov/arcgis/rest/services/mdot/MaineDOT_Dynamic/MapServer/",
        Extent::new(-71.08, 42.98, -66.95, 47.46),
    )
    .source("MaineDOT")
    .description("Raw unmodified FC data.")
    .layer(standard_layer("6", "objectid", "fedfunccls").with_override(rules::maine))
    .filter(fc_name_not_local)
}

fn massachusetts() -> RegionDescriptor {
    RegionDescriptor::new(
        "MA",
        "Massachusetts",
        "https://gis.massdot.state.ma.us/arcgis/rest/services/Roads/RoadInventory/MapServer/",
        Extent::new(-73.51, 41.24, -69.93, 42.89),
    )
    .source("MassDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .permission(Permission::MinRank(2))
    .layer(
        standard_layer("0", "OBJECTID", "F_F_Class")
            .out_fields(["OBJECTID", "F_F_Class", "route_id"])
            .with_override(rules::massachusetts),
    )
    .filter(fc_not_local)
}

fn new_hampshire() -> RegionDescriptor {
    let table = RoadTypeMap::new()
        .with(RoadClass::Freeway, [1])
        .with(RoadClass::Expressway, [2])
        .with(RoadClass::MajorHighway, [2, 3])
        .with(RoadClass::MinorHighway, [4])
        .with(RoadClass::PrimaryStreet, [5, 6])
        .with(RoadClass::Street, [7, 0]);
    RegionDescriptor::new(
        "NH",
        "New Hampshire",
        "https://maps.dot.nh.gov/arcgis_server/rest/services/Highways/NHDOT_HIGHWAYS_Functional_System/FeatureServer/",
        Extent::new(-72.56, 42.70, -70.61, 45.31),
    )
    .source("NH GRANIT")
    .description("Federal and State highways set to a minimum of mH.")
    .permission(Permission::MinRank(2))
    .layer(
        LayerDescriptor::new("19", "OBJECTID")
            .fc_field("FUNCT_SYSTEM")
            .out_fields(["OBJECTID", "FUNCT_SYSTEM", "STREET_ALIASES", "TIER"])
            .table(table)
            .with_override(rules::new_hampshire),
    )
    .filter(fc_classified_below_local)
}

fn new_york() -> RegionDescriptor {
    let table = RoadTypeMap::new()
        .with(RoadClass::Freeway, [1, 11])
        .with(RoadClass::Expressway, [2, 12])
        .with(RoadClass::MajorHighway, [4, 14])
        .with(RoadClass::MinorHighway, [6, 16])
        .with(RoadClass::PrimaryStreet, [7, 8, 17, 18])
        .with(RoadClass::Street, [9, 19]);
    RegionDescriptor::new(
        "NY",
        "New York",
        "https://gis.dot.ny.gov/hostingny/rest/services/",
        Extent::new(-79.76, 40.50, -71.86, 45.02),
    )
    .source("NYSDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .colors(palette_ew_violet())
    .layer(
        LayerDescriptor::new("1", "OBJECTID")
            .path("Geocortex/FC/MapServer/")
            .fc_field("FUNC_CLASS")
            .out_fields(["OBJECTID", "FUNC_CLASS", "SEGMENT_NAME", "ROUTE_NO"])
            .table(table)
            .with_override(rules::new_york),
    )
    .layer(
        LayerDescriptor::new("21", "OBJECTID")
            .path("Basemap/MapServer/")
            .out_fields(["OBJECTID", "SHIELD"])
            .with_override(rules::new_york_county_shield)
            .filter(new_york_shield_filter),
    )
}

fn pennsylvania() -> RegionDescriptor {
    let table = RoadTypeMap::new()
        .with(RoadClass::Freeway, ["01", "11"])
        .with(RoadClass::Expressway, ["12"])
        .with(RoadClass::MajorHighway, ["02", "14"])
        .with(RoadClass::MinorHighway, ["06", "16"])
        .with(RoadClass::PrimaryStreet, ["07", "08", "17"])
        .with(RoadClass::Street, ["09", "19"]);
    RegionDescriptor::new(
        "PA",
        "Pennsylvania",
        "https://gis.penndot.gov/arcgis/rest/services/opendata/roadwayadmin/MapServer/",
        Extent::new(-80.52, 39.72, -74.69, 42.27),
    )
    .source("PennDOT")
    .description("Raw unmodified FC data.")
    .permission(Permission::MinRank(4))
    .layer(
        LayerDescriptor::new("0", "MSLINK")
            .fc_field("FUNC_CLS")
            .out_fields(["MSLINK", "FUNC_CLS"])
            .table(table),
    )
    .filter(pennsylvania_filter)
}

fn rhode_island() -> RegionDescriptor {
    let table = RoadTypeMap::standard().with(RoadClass::Street, [0]);
    RegionDescriptor::new(
        "RI",
        "Rhode Island",
        "https://services2.arcgis.com/S8zZg9pg23JUEexQ/arcgis/rest/services/RIDOT_Roads_2016/FeatureServer/",
        Extent::new(-71.91, 41.15, -71.12, 42.02),
    )
    .source("RIDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .permission(Permission::MinRank(2))
    .layer(
        LayerDescriptor::new("0", "OBJECTID")
            .fc_field("F_SYSTEM")
            .out_fields(["OBJECTID", "F_SYSTEM", "ROADTYPE", "RTNO"])
            .table(table)
            .with_override(rules::rhode_island),
    )
    .filter(rhode_island_filter)
}

fn vermont() -> RegionDescriptor {
    RegionDescriptor::new(
        "VT",
        "Vermont",
        "https://maps.vtrans.vermont.gov/arcgis/rest/services/Master/General/FeatureServer/",
        Extent::new(-73.44, 42.73, -71.46, 45.02),
    )
    .source("VTrans")
    .permission(Permission::MinRank(2))
    .layer(
        standard_layer("39", "OBJECTID", "FUNCL")
            .out_fields(["OBJECTID", "FUNCL", "HWYSIGN"])
            .with_override(rules::vermont),
    )
    .filter(vermont_filter)
}
