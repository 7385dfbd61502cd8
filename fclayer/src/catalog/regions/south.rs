//! The South Atlantic and Gulf states.

use super::{
    fc_below_local, fc_name_not_local, fc_not_local, low_zoom, palette_ew_as_fw,
    palette_ew_as_mh, palette_ew_violet, standard_layer, urban_rural_not_local,
};
use crate::access::Permission;
use crate::catalog::{ColorMap, LayerDescriptor, RegionDescriptor, RoadTypeMap};
use crate::classify::rules;
use crate::geo::Extent;
use crate::road_class::RoadClass;

pub(super) fn regions() -> Vec<RegionDescriptor> {
    vec![
        alabama(),
        arkansas(),
        delaware(),
        district_of_columbia(),
        florida(),
        georgia(),
        kentucky(),
        louisiana(),
        maryland(),
        north_carolina(),
        oklahoma(),
        south_carolina(),
        tennessee(),
        texas(),
        virginia(),
        west_virginia(),
    ]
}

fn maryland_filter(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    low_zoom(zoom).then(|| format!("({} < 7 OR ID_PREFIX IN('MD'))", layer.fc_field_name()))
}

fn north_carolina_filter(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    low_zoom(zoom).then(|| {
        format!(
            "({} < 7 OR RouteClass IN ('I','FED','NC','RMP','US'))",
            layer.fc_field_name()
        )
    })
}

fn oklahoma_filter(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    // Parenthesised so the id range predicate still binds the whole clause.
    low_zoom(zoom).then(|| {
        format!(
            "({} < 7 OR ODOTROUTECLASS IN ('U','S','I'))",
            layer.fc_field_name()
        )
    })
}

fn texas_filter(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    let mut clause = "F_SYSTEM IS NOT NULL AND RTE_PRFX IS NOT NULL".to_string();
    if low_zoom(zoom) {
        clause.push_str(&format!(" AND {} <> 7", layer.fc_field_name()));
    }
    Some(clause)
}

fn tennessee_filter(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
    low_zoom(zoom).then(|| format!("{} NOT LIKE '%Local'", layer.fc_field_name()))
}

fn alabama() -> RegionDescriptor {
    RegionDescriptor::new(
        "AL",
        "Alabama",
        "https://services.arcgis.com/LZzQi3xDiclG6XvQ/arcgis/rest/services/HPMS_Year2017_F_System_Data/FeatureServer/",
        Extent::new(-88.47, 30.22, -84.89, 35.01),
    )
    .source("ALDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .permission(Permission::MinRank(3))
    .layer(
        standard_layer("0", "OBJECTID", "F_SYSTEM_V")
            .out_fields(["OBJECTID", "F_SYSTEM_V", "State_Sys"])
            .with_override(rules::alabama),
    )
    .filter(fc_not_local)
}

fn arkansas() -> RegionDescriptor {
    let table = RoadTypeMap::new()
        .with(RoadClass::Freeway, [1, 2])
        .with(RoadClass::MajorHighway, [3])
        .with(RoadClass::MinorHighway, [4])
        .with(RoadClass::PrimaryStreet, [5, 6])
        .with(RoadClass::Street, [7]);
    RegionDescriptor::new(
        "AR",
        "Arkansas",
        "https://gis.ardot.gov/hosting/rest/services/SIR_TIS/RoadInvDissolves/FeatureServer/",
        Extent::new(-94.62, 33.00, -89.64, 36.50),
    )
    .source("ARDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .layer(
        LayerDescriptor::new("0", "OBJECTID")
            .fc_field("FunctionalClass")
            .out_fields(["OBJECTID", "FunctionalClass", "AH_Route", "AH_Section"])
            .table(table)
            .with_override(rules::arkansas),
    )
}

fn delaware() -> RegionDescriptor {
    let table = RoadTypeMap::new()
        .with(RoadClass::Freeway, ["Interstate"])
        .with(RoadClass::Expressway, ["Other Expressways & Freeway"])
        .with(RoadClass::MajorHighway, ["Other Principal Arterials"])
        .with(RoadClass::MinorHighway, ["Minor Arterial"])
        .with(RoadClass::PrimaryStreet, ["Major Collector", "Minor Collector"])
        .with(RoadClass::Street, ["Local"]);
    RegionDescriptor::new(
        "DE",
        "Delaware",
        "https://enterprise.firstmap.delaware.gov/arcgis/rest/services/Transportation/DE_Roadways_Main/FeatureServer/",
        Extent::new(-75.79, 38.45, -75.05, 39.84),
    )
    .source("Delaware FirstMap")
    .description("Raw unmodified FC data.")
    .layer(
        LayerDescriptor::new("16", "OBJECTID")
            .fc_field("VALUE_TEXT")
            .out_fields(["OBJECTID", "VALUE_TEXT"])
            .table(table),
    )
    .filter(fc_name_not_local)
}

fn district_of_columbia() -> RegionDescriptor {
    RegionDescriptor::new(
        "DC",
        "District of Columbia",
        "https://maps2.dcgis.dc.gov/dcgis/rest/services/DCGIS_DATA/Transportation_WebMercator/MapServer/",
        Extent::new(-77.12, 38.79, -76.91, 38.996),
    )
    .source("DDOT")
    .description("Raw unmodified FC data.")
    .colors(palette_ew_as_mh())
    .layer(standard_layer("48", "OBJECTID", "FHWAFUNCTIONALCLASS"))
    .filter(fc_below_local)
}

fn florida() -> RegionDescriptor {
    let table = RoadTypeMap::new()
        .with(RoadClass::Freeway, ["01", "11"])
        .with(RoadClass::Expressway, ["02", "12"])
        .with(RoadClass::MajorHighway, ["04", "14"])
        .with(RoadClass::MinorHighway, ["06", "16"])
        .with(RoadClass::PrimaryStreet, ["07", "08", "17", "18"]);
    RegionDescriptor::new(
        "FL",
        "Florida",
        "https://services1.arcgis.com/O1JpcwDW8sjYuddV/ArcGIS/rest/services/Functional_Classification_TDA/FeatureServer/",
        Extent::new(-87.63, 24.40, -79.97, 31.00),
    )
    .source("FDOT")
    .description("Raw unmodified FC data.")
    .colors(palette_ew_as_mh())
    .layer(
        LayerDescriptor::new("0", "FID")
            .fc_field("FUNCLASS")
            .out_fields(["FID", "FUNCLASS"])
            .table(table),
    )
}

fn georgia() -> RegionDescriptor {
    let table = RoadTypeMap::new()
        .with(RoadClass::Freeway, [1])
        .with(RoadClass::Expressway, [2])
        .with(RoadClass::MajorHighway, [3])
        .with(RoadClass::MinorHighway, [4])
        .with(RoadClass::PrimaryStreet, [5, 6]);
    (0..=6).fold(
        RegionDescriptor::new(
            "GA",
            "Georgia",
            "https://maps.itos.uga.edu/arcgis/rest/services/GDOT/GDOT_FunctionalClass/mapserver/",
            Extent::new(-85.61, 30.36, -80.84, 35.00),
        )
        .source("GDOT")
        .description("Federal and State highways set to a minimum of mH.")
        .colors(palette_ew_as_mh()),
        |region, id| {
            region.layer(
                LayerDescriptor::new(id.to_string(), "OBJECTID")
                    .fc_field("FUNCTIONAL_CLASS")
                    .out_fields(["OBJECTID", "FUNCTIONAL_CLASS", "SYSTEM_CODE"])
                    .table(table.clone())
                    .with_override(rules::georgia),
            )
        },
    )
}

fn kentucky() -> RegionDescriptor {
    RegionDescriptor::new(
        "KY",
        "Kentucky",
        "https://maps.kytc.ky.gov/arcgis/rest/services/BaseMap/System/MapServer/",
        Extent::new(-89.57, 36.50, -81.96, 39.15),
    )
    .source("KYTC")
    .description("Federal and State highways set to a minimum of mH.")
    .permission(Permission::Everyone)
    .colors(
        ColorMap::new()
            .with(RoadClass::Freeway, "#ffaac5")
            .with(RoadClass::Expressway, "#ff00c5"),
    )
    .layer(
        standard_layer("0", "OBJECTID", "FC")
            .out_fields(["FC", "OBJECTID", "RT_PREFIX", "RT_SUFFIX"])
            .with_override(rules::kentucky),
    )
    .filter(fc_below_local)
}

fn louisiana() -> RegionDescriptor {
    RegionDescriptor::new(
        "LA",
        "Louisiana",
        "https://maps.dotd.la.gov/road/rest/services/Roads_and_Highways_OpenData/FeatureServer/",
        Extent::new(-94.04, 28.93, -88.82, 33.02),
    )
    .source("LaDOTD")
    .description("Federal and State highways set to a minimum of mH.")
    .layer(
        standard_layer("84", "OBJECTID", "FunctionalSystem")
            .out_fields(["OBJECTID", "FunctionalSystem", "RouteID"])
            .with_override(rules::louisiana),
    )
    .filter(fc_below_local)
}

fn maryland() -> RegionDescriptor {
    RegionDescriptor::new(
        "MD",
        "Maryland",
        "https://services.arcgis.com/njFNhDsUCentVYJW/arcgis/rest/services/MDOT_SHA_Roadway_Functional_Classification/FeatureServer/",
        Extent::new(-79.49, 37.91, -75.05, 39.72),
    )
    .source("MDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .colors(ColorMap::new().with(RoadClass::PrimaryStreet, "#ffff00"))
    .layer(
        standard_layer("0", "OBJECTID", "FUNCTIONAL_CLASS")
            .out_fields(["OBJECTID", "FUNCTIONAL_CLASS", "ID_PREFIX", "MP_SUFFIX"])
            .with_override(rules::maryland),
    )
    .filter(maryland_filter)
}

fn north_carolina() -> RegionDescriptor {
    RegionDescriptor::new(
        "NC",
        "North Carolina",
        "https://gis11.services.ncdot.gov/arcgis/rest/services/NCDOT_FunctionalClassQtr/MapServer/",
        Extent::new(-84.32, 33.84, -75.46, 36.59),
    )
    .source("NCDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .permission(Permission::MinRank(3))
    .colors(palette_ew_violet())
    .layer(
        standard_layer("0", "OBJECTID", "FuncClass")
            .out_fields(["OBJECTID", "FuncClass", "RouteClass", "RouteQualifier"])
            .with_override(rules::north_carolina),
    )
    .filter(north_carolina_filter)
}

fn oklahoma() -> RegionDescriptor {
    RegionDescriptor::new(
        "OK",
        "Oklahoma",
        "https://services6.arcgis.com/RBtoEUQ2lmN0K3GY/arcgis/rest/services/Roadways/FeatureServer/",
        Extent::new(-103.00, 33.62, -94.43, 37.00),
    )
    .source("ODOT")
    .description("Federal and State highways set to a minimum of mH.")
    .layer(
        standard_layer("0", "OBJECTID", "FUNCTIONALCLASS")
            .out_fields([
                "OBJECTID",
                "FUNCTIONALCLASS",
                "FHWAPRIMARYROUTE",
                "ODOTROUTECLASS",
                "ACCESSCONTROL",
            ])
            .with_override(rules::oklahoma),
    )
    .filter(oklahoma_filter)
}

fn south_carolina() -> RegionDescriptor {
    let table = RoadTypeMap::new()
        .with(RoadClass::Freeway, [1, 11])
        .with(RoadClass::Expressway, [6, 12])
        .with(RoadClass::MajorHighway, [2, 13])
        .with(RoadClass::MinorHighway, [3, 14])
        .with(RoadClass::PrimaryStreet, [4, 5, 15, 16]);
    RegionDescriptor::new(
        "SC",
        "South Carolina",
        "https://services1.arcgis.com/VaY7cY9pvUYUP1Lf/ArcGIS/rest/services/FunctionalClass/FeatureServer/",
        Extent::new(-83.35, 32.03, -78.54, 35.22),
    )
    .source("SCDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .permission(Permission::MinRank(4))
    .layer(
        LayerDescriptor::new("0", "FID")
            .fc_field("Functional")
            .out_fields(["FID", "Functional", "RouteType"])
            .table(table)
            .with_override(rules::south_carolina),
    )
}

fn tennessee() -> RegionDescriptor {
    let table = RoadTypeMap::new()
        .with(RoadClass::Freeway, ["Urban Interstate", "Rural Interstate"])
        .with(
            RoadClass::Expressway,
            ["Urban Freeway or Expressway", "Rural Freeway or Expressway"],
        )
        .with(
            RoadClass::MajorHighway,
            ["Urban Other Principal Arterial", "Rural Other Principal Arterial"],
        )
        .with(RoadClass::MinorHighway, ["Urban Minor Arterial", "Rural Minor Arterial"])
        .with(RoadClass::PrimaryStreet, ["Urban Major Collector", "Rural Major Collector"])
        .with(RoadClass::PrimaryStreet2, ["Urban Minor Collector", "Rural Minor Collector"])
        .with(RoadClass::Street, ["Urban Local", "Rural Local"]);
    RegionDescriptor::new(
        "TN",
        "Tennessee",
        "https://services2.arcgis.com/nf3p7v7Zy4fTOh6M/ArcGIS/rest/services/Road_Segment/FeatureServer/",
        Extent::new(-90.31, 34.98, -81.65, 36.68),
    )
    .source("Memphis, Nashville Area MPO")
    .description("Raw unmodified FC data for the Memphis and Nashville regions only.")
    .colors(ColorMap::new().with(RoadClass::PrimaryStreet2, "#cfae0e"))
    .layer(
        LayerDescriptor::new("0", "OBJECTID")
            .fc_field("FUNC_CLASS")
            .out_fields(["OBJECTID", "FUNC_CLASS", "NBR_RTE", "NBR_US_RTE"])
            .table(table)
            .with_override(rules::tennessee)
            .filter(tennessee_filter),
    )
}

fn texas() -> RegionDescriptor {
    RegionDescriptor::new(
        "TX",
        "Texas",
        "https://services.arcgis.com/KTcxiTD9dsQw4r7Z/ArcGIS/rest/services/TxDOT_Functional_Classification/FeatureServer/",
        Extent::new(-106.65, 25.84, -93.51, 36.50),
    )
    .source("TxDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .permission(Permission::MinRank(2))
    .layer(
        standard_layer("0", "OBJECTID", "F_SYSTEM")
            .out_fields(["OBJECTID", "F_SYSTEM", "RTE_PRFX"])
            .with_override(rules::texas),
    )
    .filter(texas_filter)
}

fn virginia() -> RegionDescriptor {
    RegionDescriptor::new(
        "VA",
        "Virginia",
        "https://services.arcgis.com/p5v98VHDX9Atv3l7/arcgis/rest/services/FC_2014_FHWA_Submittal1/FeatureServer/",
        Extent::new(-83.68, 36.54, -75.24, 39.47),
    )
    .source("VDOT")
    .description("Federal and State highways set to a minimum of mH.")
    .colors(palette_ew_as_fw())
    .layer(
        standard_layer("0", "OBJECTID", "STATE_FUNCT_CLASS_ID")
            .out_fields(["OBJECTID", "STATE_FUNCT_CLASS_ID", "RTE_NM"])
            .batch_limit(2000)
            .with_override(rules::virginia),
    )
    .layer(
        standard_layer("1", "OBJECTID", "STATE_FUNCT_CLASS_ID")
            .out_fields(["OBJECTID", "STATE_FUNCT_CLASS_ID", "Opp_RTE_NM", "ROUTE_NO"])
            .batch_limit(2000)
            .with_override(rules::virginia),
    )
    .layer(
        standard_layer("3", "OBJECTID", "TMPD_FC")
            .out_fields(["OBJECTID", "TMPD_FC", "RTE_NM"])
            .batch_limit(2000)
            .with_override(rules::virginia),
    )
    .filter(fc_below_local)
}

fn west_virginia() -> RegionDescriptor {
    RegionDescriptor::new(
        "WV",
        "West Virginia",
        "https://gis.transportation.wv.gov/arcgis/rest/services/Routes/MapServer/",
        Extent::new(-82.64, 37.20, -77.72, 40.64),
    )
    .source("WV DOT")
    .permission(Permission::Everyone)
    .colors(palette_ew_as_fw())
    .layer(
        standard_layer("2", "OBJECTID", "NAT_FUNCTIONAL_CLASS")
            .out_fields(["OBJECTID", "NAT_FUNCTIONAL_CLASS", "ROUTE_ID"])
            .with_override(rules::west_virginia),
    )
    .filter(urban_rural_not_local)
}
