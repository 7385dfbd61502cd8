//! The Mountain and Pacific states.

use super::{
    fc_below_local, fc_classified_below_local, fc_name_not_local, fc_not_local,
    fc_text_not_local, low_zoom, palette_ew_as_fw, palette_ew_as_mh, standard_layer,
};
use crate::access::Permission;
use crate::catalog::{LayerDescriptor, RegionDescriptor, RoadTypeMap};
use crate::classify::rules;
use crate::geo::Extent;
use crate::road_class::RoadClass;

pub(super) fn regions() -> Vec<RegionDescriptor> {
    vec![
        alaska(),
        arizona(),
        california(),
        colorado(),
        hawaii(),
        idaho(),
        montana(),
        nevada(),
        new_mexico(),
        oregon(),
        utah(),
        washington(),
        wyoming(),
    ]
}

fn montana_filter(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    low_zoom(zoom).then(|| format!("{}<>'LOCAL'", layer.fc_field_name()))
}

/// Applies at every zoom.
fn utah_filter(layer: &LayerDescriptor, _zoom: u8) -> Option<String> {
    Some(format!("{} NOT LIKE 'Proposed%'", layer.fc_field_name()))
}

fn alaska() -> RegionDescriptor {
    let table = RoadTypeMap::new()
        .with(RoadClass::Expressway, [1, 2])
        .with(RoadClass::MajorHighway, [3])
        .with(RoadClass::MinorHighway, [4])
        .with(RoadClass::PrimaryStreet, [5, 6])
        .with(RoadClass::Street, [7]);
    RegionDescriptor::new(
        "AK",
        "Alaska",
        "https://services.arcgis.com/r4A0V7UzH9fcLVvv/ArcGIS/rest/services/AKDOTPF_Route_Data/FeatureServer/",
        Extent::new(-179.15, 51.21, -129.98, 71.39),
    )
    .source("Alaska DOT&PF")
    .description("Raw unmodified FC data.")
    .layer(
        LayerDescriptor::new("13", "OBJECTID")
            .fc_field("Functional_Class")
            .out_fields(["OBJECTID", "Functional_Class"])
            .table(table),
    )
    .filter(fc_not_local)
}

fn arizona() -> RegionDescriptor {
    RegionDescriptor::new(
        "AZ",
        "Arizona",
        "https://services1.arcgis.com/XAiBIVuto7zeZj1B/arcgis/rest/services/ATIS_prod_gdb_1/FeatureServer/",
        Extent::new(-114.82, 31.33, -109.05, 37.00),
    )
    .source("ADOT")
    .description("Federal and State highways set to a minimum of mH.")
    .colors(palette_ew_as_fw())
    .layer(
        standard_layer("38", "OBJECTID", "FunctionalClass")
            .out_fields(["OBJECTID", "FunctionalClass", "RouteId"])
            .with_override(rules::arizona),
    )
}

fn california() -> RegionDescriptor {
    RegionDescriptor::new(
        "CA",
        "California",
        "https://caltrans-gis.dot.ca.gov/arcgis/rest/services/CHhighway/CRS_Functional_Classification/FeatureServer/",
        Extent::new(-124.41, 32.53, -114.13, 42.01),
    )
    .source("Caltrans")
    .description("Raw unmodified FC data.")
    .permission(Permission::users([
        "mapomatic",
        "turbomkt",
        "tonestertm",
        "ottonomy",
        "jemay",
        "ojlaw",
        "js55ct",
    ]))
    .layer(standard_layer("0", "OBJECTID", "F_System"))
    .filter(fc_not_local)
}

/// Layer 11 is state highways, 14 and 17 county and city roads.
fn colorado() -> RegionDescriptor {
    RegionDescriptor::new(
        "CO",
        "Colorado",
        "https://dtdapps.coloradodot.info/arcgis/rest/services/CPLAN/open_data_sde/FeatureServer/",
        Extent::new(-109.06, 36.99, -102.04, 41.00),
    )
    .source("CDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .permission(Permission::MinRank(3))
    .layer(
        standard_layer("11", "OBJECTID", "FUNCCLASS")
            .out_fields(["OBJECTID", "FUNCCLASS", "ROUTE", "REFPT"])
            .with_override(rules::colorado_highways),
    )
    .layer(
        standard_layer("14", "OBJECTID", "FUNCCLASSID")
            .out_fields(["OBJECTID", "FUNCCLASSID", "ROUTE", "FIPSCOUNTY"])
            .with_override(rules::colorado_local),
    )
    .layer(
        standard_layer("17", "OBJECTID", "FUNCCLASSID")
            .out_fields(["OBJECTID", "FUNCCLASSID", "ROUTE", "FIPSCOUNTY"])
            .with_override(rules::colorado_local),
    )
    .filter(fc_text_not_local)
}

fn hawaii() -> RegionDescriptor {
    RegionDescriptor::new(
        "HI",
        "Hawaii",
        "https://geodata.hawaii.gov/arcgis/rest/services/Transportation/MapServer/",
        Extent::new(-160.25, 18.91, -154.81, 22.24),
    )
    .source("HDOT")
    .description("Raw unmodified FC data.")
    .layer(standard_layer("12", "objectid", "f_system"))
    .filter(fc_below_local)
}

fn idaho() -> RegionDescriptor {
    let table = RoadTypeMap::new()
        .with(RoadClass::Freeway, [1])
        .with(RoadClass::Expressway, [2])
        .with(RoadClass::MajorHighway, [3])
        .with(RoadClass::MinorHighway, [4])
        .with(RoadClass::PrimaryStreet, [5, 6]);
    RegionDescriptor::new(
        "ID",
        "Idaho",
        "https://gisportalp.itd.idaho.gov/xserver/rest/services/RH_GeneralService/MapServer/",
        Extent::new(-117.24, 41.99, -111.04, 49.00),
    )
    .source("ITD")
    .description("Raw unmodified FC data.")
    .colors(palette_ew_as_mh())
    .layer(
        LayerDescriptor::new("67", "ObjectId")
            .fc_field("FunctionalClass")
            .out_fields(["ObjectId", "FunctionalClass"])
            .table(table),
    )
}

/// One layer per class, each keyed by its published class name.
fn montana_layer(id: &str, class: RoadClass, name: &str) -> LayerDescriptor {
    LayerDescriptor::new(id, "OBJECTID")
        .fc_field("FUNC_CLASS")
        .out_fields(["OBJECTID", "FUNC_CLASS", "SIGN_ROUTE", "ROUTE_NAME"])
        .table(RoadTypeMap::new().with(class, [name]))
        .with_override(rules::montana)
}

fn montana() -> RegionDescriptor {
    RegionDescriptor::new(
        "MT",
        "Montana",
        "https://app.mdt.mt.gov/arcgis/rest/services/Standard/FUNCTIONAL_CLASS/MapServer/",
        Extent::new(-116.05, 44.36, -104.04, 49.00),
    )
    .source("MDT")
    .description("Federal and State highways set to a minimum of mH.")
    .permission(Permission::users(["mapomatic", "bobc455", "js55ct"]))
    .layer(montana_layer("0", RoadClass::Freeway, "1-Interstate"))
    .layer(montana_layer(
        "1",
        RoadClass::MajorHighway,
        "3-Principal Arterial - Other",
    ))
    .layer(montana_layer("2", RoadClass::MinorHighway, "4-Minor Arterial"))
    .layer(montana_layer("3", RoadClass::PrimaryStreet, "5-Major Collector"))
    .layer(montana_layer("4", RoadClass::PrimaryStreet, "6-Minor Collector"))
    .layer(montana_layer("5", RoadClass::Street, "7-Local"))
    .filter(montana_filter)
}

fn nevada() -> RegionDescriptor {
    RegionDescriptor::new(
        "NV",
        "Nevada",
        "https://gis.dot.nv.gov/rhgis/rest/services/GeoHub/FSystem/MapServer/",
        Extent::new(-120.01, 35.00, -114.04, 42.00),
    )
    .source("NDOT")
    .description("Raw unmodified FC data.")
    .permission(Permission::users([
        "mapomatic",
        "turbomkt",
        "tonestertm",
        "geopgeop",
        "ojlaw",
        "js55ct",
    ]))
    .layer(standard_layer("0", "OBJECTID", "FSystem"))
    .filter(fc_below_local)
}

fn new_mexico() -> RegionDescriptor {
    RegionDescriptor::new(
        "NM",
        "New Mexico",
        "https://services.arcgis.com/hOpd7wfnKm16p9D9/ArcGIS/rest/services/NMDOT_Functional_Class/FeatureServer/",
        Extent::new(-109.05, 31.33, -103.00, 37.00),
    )
    .source("NMDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .permission(Permission::Everyone)
    .colors(palette_ew_as_fw())
    .layer(
        LayerDescriptor::new("0", "OBJECTID")
            .fc_field("FSystem")
            .out_fields(["OBJECTID", "FSystem", "RouteID"])
            .table(RoadTypeMap::standard().with(RoadClass::Street, [0]))
            .with_override(rules::new_mexico),
    )
    .filter(fc_classified_below_local)
}

fn oregon() -> RegionDescriptor {
    RegionDescriptor::new(
        "OR",
        "Oregon",
        "https://gis.odot.state.or.us/arcgis1006/rest/services/transgis/catalog/MapServer/",
        Extent::new(-124.57, 41.99, -116.46, 46.29),
    )
    .source("ODOT")
    .description("Raw unmodified FC data.")
    .layer(standard_layer("171", "OBJECTID", "NEW_FC_CD"))
    .layer(standard_layer("173", "OBJECTID", "NEW_FC_CD"))
    .filter(fc_below_local)
}

fn utah() -> RegionDescriptor {
    RegionDescriptor::new(
        "UT",
        "Utah",
        "https://roads.udot.utah.gov/server/rest/services/Public/Functional_Class/MapServer/",
        Extent::new(-114.05, 37.00, -109.04, 42.00),
    )
    .source("UDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .layer(
        standard_layer("0", "OBJECTID", "FUNCTIONAL_CLASS")
            .out_fields(["OBJECTID", "FUNCTIONAL_CLASS", "route_id"])
            .with_override(rules::utah),
    )
    .filter(utah_filter)
}

fn washington() -> RegionDescriptor {
    RegionDescriptor::new(
        "WA",
        "Washington",
        "https://data.wsdot.wa.gov/arcgis/rest/services/FunctionalClass/WSDOTFunctionalClassMap/MapServer/",
        Extent::new(-124.85, 45.54, -116.92, 49.00),
    )
    .source("WSDOT")
    .description("Raw unmodified FC data.")
    .layer(standard_layer("2", "OBJECTID", "FederalFunctionalClassCode"))
    .layer(standard_layer("1", "OBJECTID", "FederalFunctionalClassCode"))
    .layer(standard_layer("4", "OBJECTID", "FederalFunctionalClassCode"))
    .filter(fc_not_local)
}

fn wyoming() -> RegionDescriptor {
    let mut region = RegionDescriptor::new(
        "WY",
        "Wyoming",
        "https://gisservices.wyoroad.info/arcgis/rest/services/ITSM/ITSM_Data_Layers/MapServer/",
        Extent::new(-111.06, 40.99, -104.05, 45.01),
    )
    .source("WYDOT")
    .description("Minimum suggested FC.");
    for id in 20..=26 {
        region = region.layer(
            standard_layer(&id.to_string(), "objectid", "classification")
                .out_fields(["objectid", "classification", "common_route_name"])
                .with_override(rules::wyoming),
        );
    }
    region.filter(fc_name_not_local)
}
