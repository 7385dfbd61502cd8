//! Great Lakes and the Plains.

use super::{
    fc_below_local, fc_not_local, fc_text_not_local, low_zoom, palette_ew_as_fw,
    palette_ew_as_mh, standard_layer, urban_rural_not_local,
};
use crate::access::Permission;
use crate::catalog::{LayerDescriptor, RegionDescriptor, RoadTypeMap};
use crate::classify::rules;
use crate::geo::Extent;
use crate::road_class::RoadClass;

pub(super) fn regions() -> Vec<RegionDescriptor> {
    vec![
        illinois(),
        indiana(),
        iowa(),
        kansas(),
        michigan(),
        minnesota(),
        missouri(),
        north_dakota(),
        ohio(),
        south_dakota(),
    ]
}

fn indiana_filter(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    let mut clause = "TO_DATE IS NULL".to_string();
    if low_zoom(zoom) {
        clause.push_str(&format!(" AND {} <> 7", layer.fc_field_name()));
    }
    Some(clause)
}

fn iowa_filter(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    // Facility type 7 is proposed roads.
    let mut clause = "FACILITY_TYPE<>7".to_string();
    if low_zoom(zoom) {
        clause.push_str(&format!(" AND {}<7", layer.fc_field_name()));
    }
    Some(clause)
}

fn north_dakota_routes_filter(_layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    low_zoom(zoom).then(|| "RTE_SIN IN ('I','U','S')".to_string())
}

fn ohio_filter(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    let fc = layer.fc_field_name();
    if low_zoom(zoom) {
        Some(format!(
            "({fc} < 7 OR ROUTE_TYPE IN ('CR','SR','US')) AND {fc} IS NOT NULL"
        ))
    } else {
        Some(format!("{fc} IS NOT NULL"))
    }
}

/// Below zoom 13 nothing is drawn.
fn missouri_filter(_layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    if zoom < 13 {
        return Some("1=0".to_string());
    }
    Some(
        "FUNC_CLASS_NAME <> ' ' AND (TRAVELWAY_ID = CNTL_TW_ID OR \
         (TRAVELWAY_ID <> CNTL_TW_ID AND TRAVELWAY_DESG = 'LP'))"
            .to_string(),
    )
}

fn illinois() -> RegionDescriptor {
    let table = RoadTypeMap::new()
        .with(RoadClass::Freeway, ["1"])
        .with(RoadClass::Expressway, ["2"])
        .with(RoadClass::MajorHighway, ["3"])
        .with(RoadClass::MinorHighway, ["4"])
        .with(RoadClass::PrimaryStreet, ["5", "6"])
        .with(RoadClass::Street, ["7"]);
    RegionDescriptor::new(
        "IL",
        "Illinois",
        "https://gis1.dot.illinois.gov/arcgis/rest/services/AdministrativeData/FunctionalClass/MapServer/",
        Extent::new(-91.51, 36.97, -87.49, 42.51),
    )
    .source("IDOT")
    .description("Raw unmodified FC data.")
    .permission(Permission::MinRank(4))
    .colors(palette_ew_as_fw())
    .layer(
        LayerDescriptor::new("0", "OBJECTID")
            .fc_field("FC")
            .out_fields(["FC"])
            .table(table),
    )
    .filter(fc_not_local)
}

fn indiana() -> RegionDescriptor {
    RegionDescriptor::new(
        "IN",
        "Indiana",
        "https://gis.indot.in.gov/ro/rest/services/DOT/INDOT_LTAP/MapServer/",
        Extent::new(-88.10, 37.77, -84.78, 41.76),
    )
    .source("INDOT")
    .description("Raw unmodified FC data.")
    .permission(Permission::Everyone)
    .colors(palette_ew_as_mh())
    .layer(
        standard_layer("10", "OBJECTID", "FUNCTIONAL_CLASS")
            .out_fields(["FUNCTIONAL_CLASS", "OBJECTID", "TO_DATE"])
            .batch_limit(100_000),
    )
    .filter(indiana_filter)
}

fn iowa() -> RegionDescriptor {
    let table = RoadTypeMap::new()
        .with(RoadClass::Freeway, [1])
        .with(RoadClass::MajorHighway, [2, 3])
        .with(RoadClass::MinorHighway, [4])
        .with(RoadClass::PrimaryStreet, [5, 6])
        .with(RoadClass::Street, [7]);
    RegionDescriptor::new(
        "IA",
        "Iowa",
        "https://gis.iowadot.gov/agshost/rest/services/RAMS/Road_Network/FeatureServer/",
        Extent::new(-96.64, 40.38, -90.14, 43.50),
    )
    .source("Iowa DOT")
    .description("Federal and State highways set to a minimum of mH.")
    .colors(palette_ew_as_mh())
    .layer(
        LayerDescriptor::new("0", "OBJECTID")
            .fc_field("FED_FUNCTIONAL_CLASS")
            .out_fields([
                "OBJECTID",
                "FED_FUNCTIONAL_CLASS",
                "STATE_ROUTE_NAME_1",
                "ACCESS_CONTROL",
                "SURFACE_TYPE",
            ])
            .table(table)
            .with_override(rules::iowa),
    )
    .filter(iowa_filter)
}

fn kansas() -> RegionDescriptor {
    let table = RoadTypeMap::new()
        .with(RoadClass::Freeway, [1])
        .with(RoadClass::MajorHighway, [2, 3])
        .with(RoadClass::MinorHighway, [4])
        .with(RoadClass::PrimaryStreet, [5, 6])
        .with(RoadClass::Street, [7]);
    RegionDescriptor::new(
        "KS",
        "Kansas",
        "http://wfs.ksdot.org/arcgis_web_adaptor/rest/services/Transportation/",
        Extent::new(-102.05, 36.99, -94.59, 40.00),
    )
    .source("KDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .permission(Permission::AreaManagersOrRank(3))
    .layer(
        LayerDescriptor::new("3", "Id")
            .path("Functional_Classification/MapServer/")
            .fc_field("FunctionalClassification")
            .out_fields(["FunctionalClassification", "Id"])
            .table(table)
            .with_override(rules::kansas),
    )
    .layer(
        standard_layer("0", "OBJECTID", "FUN_CLASS_CD")
            .path("State_System/MapServer/")
            .out_fields(["FUN_CLASS_CD", "OBJECTID", "NHS"])
            .with_override(rules::kansas),
    )
    .filter(fc_text_not_local)
}

fn michigan() -> RegionDescriptor {
    RegionDescriptor::new(
        "MI",
        "Michigan",
        "https://mdotgis.state.mi.us/arcgis/rest/services/DataAccess/NfcNhsPub/MapServer/",
        Extent::new(-90.42, 41.70, -82.41, 48.31),
    )
    .source("MDOT")
    .description("Raw unmodified FC data.")
    .permission(Permission::Everyone)
    .colors(palette_ew_as_mh())
    .layer(standard_layer("353", "OBJECTID", "FunctionalSystem"))
    .filter(fc_below_local)
}

fn minnesota() -> RegionDescriptor {
    RegionDescriptor::new(
        "MN",
        "Minnesota",
        "https://dotapp9.dot.state.mn.us/lrs/rest/services/emma/emma_op/MapServer/",
        Extent::new(-97.24, 43.50, -89.49, 49.38),
    )
    .source("MnDOT")
    .description("Raw unmodified FC data.")
    .permission(Permission::Everyone)
    .colors(palette_ew_as_mh())
    .layer(
        standard_layer("13", "OBJECTID", "FUNCTIONAL_CLASS")
            .out_fields(["OBJECTID", "FUNCTIONAL_CLASS", "ROUTE_ID"]),
    )
    .filter(fc_not_local)
}

fn missouri() -> RegionDescriptor {
    RegionDescriptor::new(
        "MO",
        "Missouri",
        "https://mapping.modot.org/arcgis/rest/services/BaseMap/TmsUtility/MapServer/",
        Extent::new(-95.77, 35.99, -89.10, 40.61),
    )
    .source("MoDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .permission(Permission::MinRankOrAreaManager {
        rank: 3,
        area_manager_rank: 2,
    })
    .layer(
        LayerDescriptor::new("5", "SS_PAVEMENT_ID")
            .fc_field("FUNC_CLASS_NAME")
            .out_fields([
                "SS_PAVEMENT_ID",
                "FUNC_CLASS_NAME",
                "TRAVELWAY_DESG",
                "TRAVELWAY_NAME",
                "ACCESS_CAT_NAME",
            ])
            .with_override(rules::missouri),
    )
    .filter(missouri_filter)
}

fn north_dakota() -> RegionDescriptor {
    let fc_table = RoadTypeMap::new()
        .with(RoadClass::MajorHighway, [3])
        .with(RoadClass::MinorHighway, [4])
        .with(RoadClass::PrimaryStreet, [5, 6])
        .with(RoadClass::Street, [7]);
    let route_table = RoadTypeMap::new()
        .with(RoadClass::Freeway, ["I"])
        .with(RoadClass::MajorHighway, ["U"])
        .with(RoadClass::MinorHighway, ["S"]);
    RegionDescriptor::new(
        "ND",
        "North Dakota",
        "https://ndgishub.nd.gov/arcgis/rest/services/Basemap_General/MapServer/",
        Extent::new(-104.05, 45.94, -96.55, 49.00),
    )
    .source("NDDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .colors(palette_ew_as_mh())
    .layer(
        LayerDescriptor::new("193", "OBJECTID")
            .fc_field("FUNCTIONAL_CLASS")
            .out_fields(["OBJECTID", "FUNCTIONAL_CLASS"])
            .table(fc_table),
    )
    .layer(
        LayerDescriptor::new("192", "OBJECTID")
            .fc_field("RTE_SIN")
            .out_fields(["OBJECTID", "RTE_SIN"])
            .table(route_table)
            .filter(north_dakota_routes_filter),
    )
    .filter(fc_below_local)
}

fn ohio() -> RegionDescriptor {
    RegionDescriptor::new(
        "OH",
        "Ohio",
        "https://gis.dot.state.oh.us/arcgis/rest/services/TIMS/Roadway_Information/MapServer/",
        Extent::new(-84.82, 38.40, -80.52, 41.98),
    )
    .source("ODOT")
    .description("Federal and State highways set to a minimum of mH.")
    .permission(Permission::Everyone)
    .layer(
        standard_layer("8", "ObjectID", "FUNCTION_CLASS_CD")
            .out_fields(["FUNCTION_CLASS_CD", "ROUTE_TYPE", "ROUTE_NBR", "ObjectID"])
            .with_override(rules::ohio),
    )
    .filter(ohio_filter)
}

fn south_dakota() -> RegionDescriptor {
    let highways = RoadTypeMap::new()
        .with(RoadClass::Freeway, ["IN"])
        .with(RoadClass::MajorHighway, ["US"])
        .with(RoadClass::MinorHighway, ["SD"]);
    let roads = RoadTypeMap::new()
        .with(RoadClass::Freeway, [1, 11])
        .with(RoadClass::Expressway, [2, 12])
        .with(RoadClass::MajorHighway, [4, 14])
        .with(RoadClass::MinorHighway, [6, 16])
        .with(RoadClass::PrimaryStreet, [7, 8, 17])
        .with(RoadClass::Street, [9, 19]);
    RegionDescriptor::new(
        "SD",
        "South Dakota",
        "https://arcgis.sd.gov/arcgis/rest/services/SD_All/Transportation_Roads/MapServer/",
        Extent::new(-104.06, 42.48, -96.44, 45.95),
    )
    .source("SDDOT")
    .description("Federal and State highways set to a minimum of mH. Unpaved roads capped at PS.")
    .colors(palette_ew_as_mh())
    .layer(
        LayerDescriptor::new("1", "GisHighwayCategoryID")
            .fc_field("HighwayClass")
            .out_fields(["GisHighwayCategoryID", "HighwayClass"])
            .table(highways),
    )
    .layer(
        LayerDescriptor::new("2", "OBJECTID")
            .fc_field("FUNC_CLASS")
            .out_fields(["OBJECTID", "FUNC_CLASS", "SURFACE_TYPE", "ROADNAME"])
            .table(roads)
            .with_override(rules::south_dakota)
            .filter(urban_rural_not_local),
    )
}
