//! Per-region override rules for the built-in catalog.
//!
//! Most rules work on numeric functional-class codes: recover the code,
//! lower it (raise the priority) for national or state system routes, then
//! look the result up in the layer's table.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::{apply_clamps, clamp_code, code_to_class, Clamp, RuleContext};
use crate::road_class::RoadClass;

/// State route numbers that keep their functional class in Virginia.
pub(crate) const VA_SR_EXCEPTIONS: &[i64] = &[
    217, 302, 303, 305, 308, 310, 313, 314, 315, 317, 318, 319, 320, 321, 322, 323, 324, 325,
    326, 327, 328, 329, 330, 331, 332, 333, 334, 335, 336, 339, 341, 342, 343, 344, 345, 346,
    347, 348, 350, 353, 355, 357, 358, 361, 362, 363, 364, 365, 366, 367, 368, 369, 370, 371,
    372, 373, 374, 375, 376, 377, 378, 379, 382, 383, 384, 385, 386, 387, 388, 389, 390, 391,
    392, 393, 394, 396, 397, 398, 399, 785, 895,
];

/// Virginia state routes at or above this number are secondary routes.
const VA_SECONDARY_ROUTE_START: i64 = 600;

fn text_is(ctx: &RuleContext<'_>, field: &str, expected: &str) -> bool {
    ctx.text(field).is_some_and(|v| v.trim() == expected)
}

/// Leading integer of `text`, ignoring leading whitespace and any trailing
/// non-digits: `"0089P"` is 89, `"US 6"` has none.
fn leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(rest.len(), |(i, _)| i);
    let value: i64 = rest[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// `prefix` immediately followed by a digit.
fn numbered(text: &str, prefix: &str) -> bool {
    text.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
}

/// Attribute with runs of whitespace collapsed to single spaces.
fn collapsed(ctx: &RuleContext<'_>, field: &str) -> String {
    ctx.text(field)
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn decimal(ctx: &RuleContext<'_>, field: &str) -> Option<f64> {
    match ctx.attr(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Text class names shared by several HPMS exports. Unknown names are local.
fn hpms_name_code(name: &str) -> i64 {
    match name.trim() {
        "Interstate" => 1,
        "Other Freeway or Expressway" | "Other Freeways and Expressways" => 2,
        "Other Principal Arterial" => 3,
        "Minor Arterial" => 4,
        "Major Collector" => 5,
        "Minor Collector" => 6,
        _ => 7,
    }
}

/// Alabama: state system roads are at least minor highways.
pub(crate) fn alabama(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    ctx.lookup(clamp_code(fc, 4, text_is(ctx, "State_Sys", "YES")).unwrap_or(fc))
}

/// Interstate numbers whose state business loops rank as minor highways.
const AZ_INTERSTATES: &[i64] = &[8, 10, 11, 17, 19, 40];

fn az_route_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(U|S)(\D)\d{3}\b").expect("valid route pattern"))
}

/// Arizona: class names carry an urban/rural prefix, `RouteId` encodes the
/// system and business routes.
pub(crate) fn arizona(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let name = ctx.text(ctx.layer().fc_field_name()).unwrap_or_default();
    let kind = ["Rural ", "Urban "]
        .iter()
        .find_map(|area| name.trim().strip_prefix(area));
    let fc = match kind {
        Some("Principal Arterial - Interstate") => 1,
        Some("Principal Arterial - Other Fwys & Expwys") => 2,
        Some("Principal Arterial - Other") => 3,
        Some("Minor Arterial") => 4,
        Some("Major Collector") => 5,
        Some("Minor Collector") => 6,
        _ => 7,
    };

    let route = collapsed(ctx, "RouteId");
    let caps = az_route_pattern().captures(&route);
    let system = caps.as_ref().and_then(|c| c.get(1)).map(|m| m.as_str());
    let is_us = system == Some("U");
    let is_state = system == Some("S");
    let is_biz = is_state && caps.as_ref().and_then(|c| c.get(2)).map(|m| m.as_str()) == Some("B");
    let number = leading_int(&route.chars().skip(2).take(3).collect::<String>());
    let interstate_biz = is_biz && number.is_some_and(|n| AZ_INTERSTATES.contains(&n));

    let fc = clamp_code(fc, 4, interstate_biz)
        .or_else(|| clamp_code(fc, 4, is_us))
        .or_else(|| clamp_code(fc, if is_biz { 7 } else { 6 }, is_state))
        .unwrap_or(fc);
    ctx.lookup(fc)
}

/// Arkansas highway numbers that are US routes.
const AR_US_ROUTES: &[i64] = &[
    49, 59, 61, 62, 63, 64, 65, 67, 70, 71, 79, 82, 165, 167, 270, 271, 278, 371, 412, 425,
];

/// Highway numbers from here on are not state routes.
const AR_STATE_ROUTE_END: i64 = 613;

/// Arkansas: route number decides the system, a `B` section suffix marks
/// business routes one tier lower.
pub(crate) fn arkansas(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let route = ctx.text("AH_Route").and_then(|r| leading_int(&r));
    let is_us = route.is_some_and(|r| AR_US_ROUTES.contains(&r));
    let is_state = route.is_some_and(|r| r < AR_STATE_ROUTE_END);
    let is_biz = ctx.text("AH_Section").is_some_and(|s| s.ends_with('B'));

    let fc = clamp_code(fc, if is_biz { 4 } else { 3 }, is_us)
        .or_else(|| clamp_code(fc, if is_biz { 5 } else { 4 }, is_state))
        .unwrap_or(fc);
    ctx.lookup(fc)
}

/// Colorado highway numbers that are US routes.
const CO_US_ROUTES: &[i64] = &[
    6, 24, 25, 34, 36, 40, 50, 70, 84, 85, 87, 138, 160, 285, 287, 350, 385, 400, 491, 550,
];
/// Highway sections left at their published class.
const CO_KEEP_SECTIONS: &[&str] = &["024D", "040G"];
/// I-70 sections that are not freeway mainline.
const CO_I70_SECTIONS: &[&str] = &["070K", "070L", "070O", "070Q", "070R"];
/// Highway sections set to minor highway.
const CO_MINOR_SECTIONS: &[&str] = &["024E", "050D", "070O", "085F", "160D"];

/// Colorado state highways: `ROUTE` is a three-digit highway number plus a
/// section letter; `REFPT` is the mile reference.
pub(crate) fn colorado_highways(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let route = collapsed(ctx, "ROUTE");
    let number = leading_int(&route.chars().take(3).collect::<String>());
    let refpt = decimal(ctx, "REFPT").unwrap_or(0.0);

    let i70_mainline = number == Some(70) && !CO_I70_SECTIONS.contains(&route.as_str());
    let minor = CO_MINOR_SECTIONS.contains(&route.as_str())
        || (number == Some(40) && refpt > 320.0 && refpt < 385.0)
        || (number == Some(36) && refpt > 79.0 && refpt < 100.99)
        || (route == "034D" && refpt > 11.0);

    let fc = if CO_KEEP_SECTIONS.contains(&route.as_str()) || i70_mainline {
        fc
    } else if minor {
        4
    } else if number.is_some_and(|n| CO_US_ROUTES.contains(&n)) {
        fc.min(3)
    } else {
        fc.min(4)
    };
    ctx.lookup(fc)
}

/// Colorado county and city roads: a few named roads per county carry
/// highway traffic.
pub(crate) fn colorado_local(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let route = collapsed(ctx, "ROUTE");
    let county = ctx.int("FIPSCOUNTY");

    let fc = match (county, route.as_str()) {
        (Some(19), "COLORADO BD") | (Some(37), "GRAND AV" | "S H6") => 3,
        (Some(67), "BAYFIELDPAY") => 4,
        _ => fc,
    };
    ctx.lookup(fc)
}

/// Connecticut route layer: the route prefix is the only class signal.
pub(crate) fn connecticut_routes(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let prefix = ctx.text(ctx.layer().fc_field_name())?;
    let fc = match prefix.trim() {
        "I" => 1,
        "US" => 3,
        "CT" | "SR" => 4,
        _ => return None,
    };
    ctx.lookup(fc)
}

/// Georgia: state system roads are at least minor highways.
pub(crate) fn georgia(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    match ctx.fc() {
        Some(fc) if fc > 4 && text_is(ctx, "SYSTEM_CODE", "1") => ctx.lookup(4),
        _ => ctx.baseline(),
    }
}

/// Iowa: access-controlled roads are freeways, then US and state clamps.
pub(crate) fn iowa(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let route = ctx.text("STATE_ROUTE_NAME_1").unwrap_or_default();
    let is_fw = ctx.int("ACCESS_CONTROL") == Some(1);
    let is_us = route.starts_with("STATE OF IOWA, US");
    let is_state = route.starts_with("STATE OF IOWA, IA");

    let fc = clamp_code(fc, 1, is_fw)
        .or_else(|| clamp_code(fc, 3, is_us))
        .or_else(|| clamp_code(fc, 4, is_state))
        .unwrap_or(fc);
    ctx.lookup(fc)
}

/// Kansas: the NHS flag separates national from state system routes.
pub(crate) fn kansas(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let is_us = text_is(ctx, "NHS", "YES");
    let is_state = text_is(ctx, "NHS", "NO");

    let fc = clamp_code(fc, 3, is_us)
        .or_else(|| clamp_code(fc, 4, is_state))
        .unwrap_or(fc);
    ctx.lookup(fc)
}

/// Kentucky: US routes are major highways, or minor when the suffix marks
/// a business/alternate route.
pub(crate) fn kentucky(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let is_us = text_is(ctx, "RT_PREFIX", "US");
    let suffix_x = ctx.text("RT_SUFFIX").is_some_and(|s| s.contains('X'));
    let max = if suffix_x { 4 } else { 3 };

    ctx.lookup(clamp_code(fc, max, is_us).unwrap_or(fc))
}

fn la_route_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(US|LA) \d").expect("valid route pattern"))
}

/// Louisiana: `2a`/`2b` codes are expressways; the route name inside
/// `RouteID` carries the system and business suffix.
pub(crate) fn louisiana(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = match ctx.text(ctx.layer().fc_field_name()) {
        Some(raw) if matches!(raw.trim(), "2a" | "2b") => 2,
        _ => ctx.fc()?,
    };
    let route_id = ctx.text("RouteID").unwrap_or_default();
    let route = route_id.split('_').nth(1).map(str::trim).unwrap_or("");
    let system = la_route_pattern()
        .captures(route)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());
    let is_biz = route.ends_with(" BUS");

    let fc = clamp_code(fc, if is_biz { 4 } else { 3 }, system == Some("US"))
        .or_else(|| clamp_code(fc, if is_biz { 5 } else { 4 }, system == Some("LA")))
        .unwrap_or(fc);
    ctx.lookup(fc)
}

/// Maryland: `ID_PREFIX` gives the system, `MP_SUFFIX == "BU"` marks
/// business routes which sit one tier lower.
pub(crate) fn maryland(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let is_us = text_is(ctx, "ID_PREFIX", "US");
    let is_state = text_is(ctx, "ID_PREFIX", "MD");
    let is_biz = text_is(ctx, "MP_SUFFIX", "BU");

    let fc = clamp_code(fc, if is_biz { 4 } else { 3 }, is_us)
        .or_else(|| clamp_code(fc, if is_biz { 5 } else { 4 }, is_state))
        .unwrap_or(fc);
    ctx.lookup(fc)
}

/// Maine publishes class names; the route name field is gone, so nothing
/// is raised.
pub(crate) fn maine(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let name = ctx.text(ctx.layer().fc_field_name()).unwrap_or_default();
    ctx.lookup(hpms_name_code(&name))
}

/// Massachusetts: `route_id` starts with `US` or `SR` plus the number.
pub(crate) fn massachusetts(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let route = ctx.text("route_id").unwrap_or_default();

    let fc = clamp_code(fc, 3, numbered(&route, "US"))
        .or_else(|| clamp_code(fc, 4, numbered(&route, "SR")))
        .unwrap_or(fc);
    ctx.lookup(fc)
}

/// Missouri US highways, as they appear in business route names.
const MO_US_ROUTES: &[&str] = &[
    "24", "36", "40", "50", "54", "56", "59", "60", "61", "62", "63", "65", "67", "69", "71",
    "136", "159", "160", "166", "169", "275", "400", "412",
];

/// Code for class names Missouri publishes that no table entry accepts.
const MO_UNCLASSIFIED: i64 = 8;

fn mo_business_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"BUSINESS .+ \d").expect("valid business pattern"))
}

/// Missouri: upper-case class names; the travelway designation gives the
/// system. Freeways without full access control are major highways.
pub(crate) fn missouri(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let name = ctx.text(ctx.layer().fc_field_name()).unwrap_or_default();
    let fc = match name.trim() {
        "INTERSTATE" => 1,
        "FREEWAY" => 2,
        "PRINCIPAL ARTERIAL" => 3,
        "MINOR ARTERIAL" => 4,
        "MAJOR COLLECTOR" => 5,
        "MINOR COLLECTOR" => 6,
        _ => MO_UNCLASSIFIED,
    };
    let designation = ctx.text("TRAVELWAY_DESG").unwrap_or_default();
    let designation = designation.trim();
    let route = ctx.text("TRAVELWAY_NAME").unwrap_or_default();

    // LP is an interstate business loop.
    let is_us = matches!(designation, "US" | "LP");
    let is_state = matches!(designation, "MO" | "AL");
    let is_supplemental = designation == "RT";
    let is_biz = matches!(designation, "BU" | "SP") || mo_business_pattern().is_match(&route);
    let is_us_biz = is_biz && MO_US_ROUTES.contains(&route.trim());
    let limited_access = fc == 2 && !text_is(ctx, "ACCESS_CAT_NAME", "FULL");

    let fc = if limited_access {
        3
    } else {
        clamp_code(fc, 3, is_us)
            .or_else(|| clamp_code(fc, 4, is_state || is_us_biz))
            .or_else(|| clamp_code(fc, 6, is_supplemental || is_biz))
            .unwrap_or(fc)
    };
    ctx.lookup(fc)
}

fn mt_us_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^US[ -]?\d+").expect("valid route pattern"))
}

fn mt_state_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^MONTANA \d+|ROUTE \d+|S-\d{3}\b").expect("valid route pattern")
    })
}

/// Montana: each class is its own layer; signed US and state routes are
/// raised after the table lookup.
pub(crate) fn montana(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let class = ctx.baseline()?;
    let route = ctx
        .text("SIGN_ROUTE")
        .filter(|r| !r.is_empty())
        .or_else(|| ctx.text("ROUTE_NAME"))
        .unwrap_or_default();

    Some(apply_clamps(
        class,
        &[
            Clamp::new(RoadClass::MajorHighway, mt_us_pattern().is_match(&route)),
            Clamp::new(RoadClass::MinorHighway, mt_state_pattern().is_match(&route)),
        ],
    ))
}

/// North Carolina: classification depends on the route class first.
pub(crate) fn north_carolina(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc();
    let high_fc = fc.is_some_and(|fc| fc <= 2);
    let is_biz = text_is(ctx, "RouteQualifier", "9");
    let route_class = ctx.text("RouteClass");

    let class = match route_class.as_deref().map(str::trim) {
        Some("1") => {
            if high_fc || !is_biz {
                RoadClass::Freeway
            } else {
                RoadClass::MajorHighway
            }
        }
        Some("2") => {
            if high_fc {
                RoadClass::Expressway
            } else if fc == Some(3) || !is_biz {
                RoadClass::MajorHighway
            } else {
                RoadClass::MinorHighway
            }
        }
        Some("3") => {
            if high_fc {
                RoadClass::Expressway
            } else if fc == Some(3) {
                RoadClass::MajorHighway
            } else if fc == Some(4) || !is_biz {
                RoadClass::MinorHighway
            } else {
                RoadClass::PrimaryStreet
            }
        }
        Some("80") => RoadClass::Ramp,
        _ => match fc? {
            fc if fc > 6 => RoadClass::Street,
            fc if fc <= 1 => RoadClass::PrimaryStreet,
            fc => code_to_class(fc)?,
        },
    };
    Some(class)
}

/// New Hampshire: code 2 splits on the tier, aliases name US and NH routes.
/// Missing or zero codes are local roads.
pub(crate) fn new_hampshire(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc().filter(|fc| *fc > 0).unwrap_or(7);
    let aliases = ctx.text("STREET_ALIASES").unwrap_or_default();
    let is_us = aliases.contains("US ");
    let is_state = aliases.contains("NH ");

    let fc = if fc == 2 {
        if ctx.int("TIER") == Some(1) {
            1
        } else {
            3
        }
    } else {
        clamp_code(fc, if aliases.contains("US 3B") { 4 } else { 3 }, is_us)
            .or_else(|| clamp_code(fc, 4, is_state))
            .unwrap_or(fc)
    };
    ctx.lookup(fc)
}

/// New Mexico: the first two characters of `RouteID` give the system.
/// Interchange segments (`IX`) are not classified roads.
pub(crate) fn new_mexico(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let route = ctx.text("RouteID").unwrap_or_default();
    let system: String = route.chars().take(2).collect();

    let fc = match system.as_str() {
        "IX" => 0,
        // BL is an interstate business loop.
        "BL" | "US" => clamp_code(fc, 3, true).unwrap_or(fc),
        "NM" => clamp_code(fc, 4, true).unwrap_or(fc),
        _ => fc,
    };
    ctx.lookup(fc)
}

/// New York functional class layer: NY and US route numbers raise low
/// classes.
pub(crate) fn new_york(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let class = ctx.baseline()?;
    let route = ctx.text("ROUTE_NO").unwrap_or_default();
    let is_state = route.starts_with("NY");
    let is_us = route.starts_with("US");

    Some(apply_clamps(
        class,
        &[
            Clamp::new(
                RoadClass::MinorHighway,
                is_state && class == RoadClass::PrimaryStreet,
            ),
            Clamp::new(
                RoadClass::MajorHighway,
                is_us && matches!(class, RoadClass::PrimaryStreet | RoadClass::MinorHighway),
            ),
        ],
    ))
}

/// New York county shields: every returned segment is a primary street.
pub(crate) fn new_york_county_shield(_ctx: &RuleContext<'_>) -> Option<RoadClass> {
    Some(RoadClass::PrimaryStreet)
}

/// Ohio: US, state and county routes have minimum codes.
pub(crate) fn ohio(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let route_type = ctx.text("ROUTE_TYPE").unwrap_or_default();
    let route_type = route_type.trim();

    let fc = clamp_code(fc, 3, route_type == "US")
        .or_else(|| clamp_code(fc, 4, route_type == "SR"))
        .or_else(|| clamp_code(fc, 6, route_type == "CR"))
        .unwrap_or(fc);
    ctx.lookup(fc)
}

fn ok_business_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)(BUS|SPR)$").expect("valid business pattern"))
}

/// Oklahoma: access control, route class and business/spur routes.
pub(crate) fn oklahoma(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let route = ctx.text("FHWAPRIMARYROUTE").unwrap_or_default();
    let route = route.trim();
    let biz = ok_business_pattern().is_match(route);
    let prefix = if biz {
        route.chars().next().map(String::from).unwrap_or_default()
    } else {
        ctx.text("ODOTROUTECLASS")
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };
    let is_fw = ctx.int("ACCESSCONTROL") == Some(1);
    let is_interstate = prefix == "I";
    let is_us = prefix == "U";
    let is_state = prefix == "S";

    let fc = clamp_code(fc, 1, is_fw)
        .or_else(|| clamp_code(fc, 3, (is_us && !biz) || (is_interstate && biz)))
        .or_else(|| clamp_code(fc, 4, (is_us && biz) || (is_state && !biz)))
        .or_else(|| clamp_code(fc, 5, is_state && biz))
        .unwrap_or(fc);
    ctx.lookup(fc)
}

/// Rhode Island routes built to freeway standard.
const RI_FREEWAY_ROUTES: &[&str] = &["10", "24", "37", "78", "99", "138", "403"];

/// Rhode Island: any numbered route is a state route; route 1 is US 1.
pub(crate) fn rhode_island(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let route = ctx.text("RTNO").unwrap_or_default();
    let route = route.trim();

    let fc = if fc == 2 && RI_FREEWAY_ROUTES.contains(&route) {
        1
    } else if (fc > 3 && text_is(ctx, "ROADTYPE", "US")) || route == "1" {
        3
    } else {
        clamp_code(fc, 4, !route.is_empty()).unwrap_or(fc)
    };
    ctx.lookup(fc)
}

/// South Carolina: `RouteType` 1, 2 and 4 are interstate, US and state
/// routes. Expressway codes render as freeways.
pub(crate) fn south_carolina(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let class = ctx.baseline();
    let route_type = ctx.int("RouteType");

    match class {
        Some(RoadClass::Freeway | RoadClass::Expressway) => Some(RoadClass::Freeway),
        _ if route_type == Some(1) => Some(RoadClass::Freeway),
        Some(RoadClass::MinorHighway | RoadClass::PrimaryStreet) if route_type == Some(2) => {
            Some(RoadClass::MajorHighway)
        }
        Some(RoadClass::PrimaryStreet) if route_type == Some(4) => Some(RoadClass::MinorHighway),
        other => other,
    }
}

fn sd_route_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(US|SD) HWY (.* (E|W)?(B|L)$)?").expect("valid route pattern")
    })
}

/// Surface type codes above this are paved.
const SD_PAVED_ABOVE: i64 = 5;

/// South Dakota: two-digit urban/rural codes where the last digit is the
/// class. Highway names raise collectors and locals; unpaved collectors and
/// locals are never raised above primary street.
pub(crate) fn south_dakota(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let tier = fc % 10;
    let name = ctx.text("ROADNAME").unwrap_or_default();
    let caps = sd_route_pattern().captures(&name);
    let system = caps
        .as_ref()
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_uppercase());
    let is_biz = caps.as_ref().and_then(|c| c.get(2)).is_some();
    let paved = ctx.int("SURFACE_TYPE").is_some_and(|s| s > SD_PAVED_ABOVE);

    let fc = match system.as_deref() {
        Some("US") if tier > 4 => {
            if is_biz {
                6
            } else {
                4
            }
        }
        Some("SD") if tier > 6 => {
            if is_biz {
                7
            } else {
                6
            }
        }
        _ => fc,
    };
    if tier > 6 && !paved {
        return Some(if fc < 9 {
            RoadClass::PrimaryStreet
        } else {
            RoadClass::Street
        });
    }
    ctx.lookup(fc)
}

/// Tennessee MPO segments: collectors on US routes become major highways,
/// bridges on US routes and collectors on state routes minor highways.
pub(crate) fn tennessee(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let class = ctx.baseline();
    let us_route = ctx.text("NBR_US_RTE");
    let state_route = ctx
        .text("NBR_RTE")
        .is_some_and(|r| r.starts_with("SR") || r.starts_with("TN"));

    match (class, us_route) {
        (Some(RoadClass::PrimaryStreet | RoadClass::MinorHighway), Some(us)) => {
            if us.ends_with("BR") {
                Some(RoadClass::MinorHighway)
            } else {
                Some(RoadClass::MajorHighway)
            }
        }
        (Some(RoadClass::PrimaryStreet), None) if state_route => Some(RoadClass::MinorHighway),
        (class, _) => class,
    }
}

/// Texas: the two-letter route prefix decides the minimum code.
pub(crate) fn texas(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let prefix: String = ctx
        .text("RTE_PRFX")
        .unwrap_or_default()
        .chars()
        .take(2)
        .collect::<String>()
        .to_ascii_uppercase();

    let max = match prefix.as_str() {
        "IH" => Some(1),
        "US" | "BI" | "UA" => Some(3),
        "UP" | "BU" | "SH" | "SA" => Some(4),
        "SL" | "SS" | "BS" => Some(6),
        _ => None,
    };
    let fc = max
        .and_then(|max| clamp_code(fc, max, true))
        .unwrap_or(fc);
    ctx.lookup(fc)
}

/// Utah highway numbers that are US routes.
const UT_US_ROUTES: &[i64] = &[6, 40, 50, 89, 91, 163, 189, 191, 491];
/// Highest state route number.
const UT_STATE_ROUTE_END: i64 = 491;

/// Utah: class names, with the highway number in the first four
/// characters of `route_id`.
pub(crate) fn utah(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let name = ctx.text(ctx.layer().fc_field_name()).unwrap_or_default();
    let fc = hpms_name_code(&name);
    let route = ctx.text("route_id").unwrap_or_default();
    let number = leading_int(&route.chars().take(4).collect::<String>());

    let fc = clamp_code(fc, 3, number.is_some_and(|n| UT_US_ROUTES.contains(&n)))
        .or_else(|| clamp_code(fc, 4, number.is_some_and(|n| n <= UT_STATE_ROUTE_END)))
        .unwrap_or(fc);
    ctx.lookup(fc)
}

/// Vermont: the highway sign prefix gives the system (`U` US, `B` US
/// business, `V` state). Missing or zero codes are local roads.
pub(crate) fn vermont(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc().filter(|fc| *fc > 0).unwrap_or(7);
    let sign = ctx.text("HWYSIGN").unwrap_or_default();

    let fc = clamp_code(fc, 3, sign.starts_with('U'))
        .or_else(|| clamp_code(fc, 4, sign.starts_with('B') || sign.starts_with('V')))
        .unwrap_or(fc);
    ctx.lookup(fc)
}

fn va_route_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^R-VA\s*(US|VA|SR)(\d{5})..(BUS)?").expect("valid route pattern")
    })
}

/// Virginia: route names encode system, number and business routes.
/// Secondary state routes and the exception list keep their class.
pub(crate) fn virginia(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let name = ctx
        .text("RTE_NM")
        .or_else(|| ctx.text("Opp_RTE_NM"))
        .unwrap_or_default();
    let caps = va_route_pattern().captures(&name);
    let system = caps
        .as_ref()
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());
    let is_biz = caps.as_ref().and_then(|c| c.get(3)).is_some();
    let is_us = system == Some("US");
    let is_state = matches!(system, Some("VA" | "SR"));

    let route_number: Option<i64> = if ctx.layer_id() == "1" {
        ctx.int("ROUTE_NO")
    } else {
        caps.as_ref()
            .and_then(|c| c.get(2))
            .and_then(|m| m.as_str().parse().ok())
    };
    let route_number = route_number.unwrap_or(99_999);
    let primary_state = is_state
        && route_number < VA_SECONDARY_ROUTE_START
        && !VA_SR_EXCEPTIONS.contains(&route_number);

    let fc = clamp_code(fc, if is_biz { 4 } else { 3 }, is_us)
        .or_else(|| clamp_code(fc, if is_biz { 5 } else { 4 }, primary_state))
        .unwrap_or(fc);
    ctx.lookup(fc)
}

/// West Virginia publishes two-digit urban/rural codes and encodes the
/// route system in the third character of `ROUTE_ID`.
pub(crate) fn west_virginia(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = match ctx.fc()? {
        1 | 11 => 1,
        4 | 12 => 2,
        2 | 14 => 3,
        6 | 16 => 4,
        7 | 17 | 8 | 18 => 5,
        _ => 7,
    };
    let system = ctx
        .text("ROUTE_ID")
        .and_then(|id| id.chars().nth(2));

    let fc = clamp_code(fc, 1, system == Some('1'))
        .or_else(|| clamp_code(fc, 3, system == Some('2')))
        .or_else(|| clamp_code(fc, 4, system == Some('3')))
        .unwrap_or(fc);
    ctx.lookup(fc)
}

fn wy_route_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(I|US|WY) (\d+)( BUS)?").expect("valid route pattern"))
}

/// Wyoming: `common_route_name` lists the signed routes. Interstate
/// business routes count as US routes.
pub(crate) fn wyoming(ctx: &RuleContext<'_>) -> Option<RoadClass> {
    let fc = ctx.fc()?;
    let route = ctx.text("common_route_name").unwrap_or_default();

    let (mut is_us, mut is_us_biz, mut is_state, mut is_state_biz) = (false, false, false, false);
    for caps in wy_route_pattern().captures_iter(&route) {
        let is_biz = caps.get(3).is_some();
        match &caps[1] {
            "I" => is_us |= is_biz && matches!(&caps[2], "25" | "80"),
            "US" => {
                is_us = true;
                is_us_biz |= is_biz;
            }
            _ => {
                is_state = true;
                is_state_biz |= is_biz;
            }
        }
    }

    let fc = clamp_code(fc, if is_us_biz { 4 } else { 3 }, is_us)
        .or_else(|| clamp_code(fc, if is_state_biz { 5 } else { 4 }, is_state))
        .unwrap_or(fc);
    ctx.lookup(fc)
}
