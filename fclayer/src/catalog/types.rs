//! Descriptor types for the region rule catalog.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::access::Permission;
use crate::classify::RuleContext;
use crate::geo::Extent;
use crate::road_class::RoadClass;

/// Maximum features a layer returns per request unless it declares otherwise.
pub const DEFAULT_BATCH_LIMIT: usize = 1000;

/// Simplification tolerances in metres, indexed from zoom 12.
pub const DEFAULT_MAX_OFFSET: [f64; 10] = [30.0, 15.0, 8.0, 4.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0];

/// Layer-specific classification override.
///
/// Runs instead of the table lookup. Returning `None` marks the feature as
/// unclassified.
pub type OverrideRule = fn(&RuleContext<'_>) -> Option<RoadClass>;

/// Produces the textual filter clause for a layer at a zoom level.
pub type FilterFn = fn(&LayerDescriptor, u8) -> Option<String>;

/// One raw classification value as it appears in a road type table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FcValue {
    Int(i64),
    Text(String),
}

impl FcValue {
    /// Tests this table value against a raw attribute.
    ///
    /// Values that both coerce to integers compare numerically, so `4`
    /// matches `"4"` and `"04"`. Anything else compares as trimmed text.
    pub fn matches(&self, raw: &Value) -> bool {
        if let (Some(expected), Some(actual)) = (self.as_int(), value_as_int(raw)) {
            return expected == actual;
        }
        match value_as_text(raw) {
            Some(text) => text.trim() == self.as_text().trim(),
            None => false,
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            FcValue::Int(v) => Some(*v),
            FcValue::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_text(&self) -> String {
        match self {
            FcValue::Int(v) => v.to_string(),
            FcValue::Text(s) => s.clone(),
        }
    }
}

impl From<i64> for FcValue {
    fn from(value: i64) -> Self {
        FcValue::Int(value)
    }
}

impl From<i32> for FcValue {
    fn from(value: i32) -> Self {
        FcValue::Int(value.into())
    }
}

impl From<&str> for FcValue {
    fn from(value: &str) -> Self {
        FcValue::Text(value.to_string())
    }
}

impl fmt::Display for FcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FcValue::Int(v) => write!(f, "{}", v),
            FcValue::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// Integer view of a JSON attribute: integral numbers and integer strings.
pub fn value_as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Text view of a JSON attribute. Null, arrays and objects have none.
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Ordered value-to-class table. The first entry containing a value wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadTypeMap {
    entries: Vec<(RoadClass, Vec<FcValue>)>,
}

impl RoadTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry mapping `values` to `class`.
    pub fn with<I, V>(mut self, class: RoadClass, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FcValue>,
    {
        self.entries
            .push((class, values.into_iter().map(Into::into).collect()));
        self
    }

    /// The FHWA 1..7 table shared by most data sources.
    pub fn standard() -> Self {
        Self::new()
            .with(RoadClass::Freeway, [1])
            .with(RoadClass::Expressway, [2])
            .with(RoadClass::MajorHighway, [3])
            .with(RoadClass::MinorHighway, [4])
            .with(RoadClass::PrimaryStreet, [5, 6])
            .with(RoadClass::Street, [7])
    }

    pub fn lookup(&self, raw: &Value) -> Option<RoadClass> {
        self.entries
            .iter()
            .find(|(_, values)| values.iter().any(|v| v.matches(raw)))
            .map(|(class, _)| *class)
    }

    pub fn lookup_code(&self, code: i64) -> Option<RoadClass> {
        self.lookup(&Value::from(code))
    }

    pub fn entries(&self) -> &[(RoadClass, Vec<FcValue>)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Baseline table plus an optional override rule.
#[derive(Clone, Default)]
pub struct ClassificationStrategy {
    pub table: RoadTypeMap,
    pub override_rule: Option<OverrideRule>,
}

impl ClassificationStrategy {
    pub fn table(table: RoadTypeMap) -> Self {
        Self {
            table,
            override_rule: None,
        }
    }

    pub fn with_override(mut self, rule: OverrideRule) -> Self {
        self.override_rule = Some(rule);
        self
    }
}

impl fmt::Debug for ClassificationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationStrategy")
            .field("table", &self.table)
            .field("override_rule", &self.override_rule.is_some())
            .finish()
    }
}

/// One queryable data layer of a region.
#[derive(Debug, Clone)]
pub struct LayerDescriptor {
    /// Layer identifier appended to the base URL, e.g. `0` or `21`.
    pub id: String,
    /// Service path between the base URL and the layer id, e.g. `Basemap/MapServer/`.
    pub path: Option<String>,
    pub id_field: String,
    pub fc_field: Option<String>,
    pub out_fields: Vec<String>,
    pub batch_limit: usize,
    pub strategy: ClassificationStrategy,
    /// Replaces the region's filter for this layer when set.
    pub filter: Option<FilterFn>,
}

impl LayerDescriptor {
    pub fn new(id: impl Into<String>, id_field: impl Into<String>) -> Self {
        let id_field = id_field.into();
        Self {
            id: id.into(),
            path: None,
            out_fields: vec![id_field.clone()],
            id_field,
            fc_field: None,
            batch_limit: DEFAULT_BATCH_LIMIT,
            strategy: ClassificationStrategy::default(),
            filter: None,
        }
    }

    pub fn fc_field(mut self, field: impl Into<String>) -> Self {
        self.fc_field = Some(field.into());
        self
    }

    /// Sets the requested attributes. The id field is always included.
    pub fn out_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.out_fields = fields.into_iter().map(Into::into).collect();
        if !self.out_fields.contains(&self.id_field) {
            self.out_fields.insert(0, self.id_field.clone());
        }
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit;
        self
    }

    pub fn table(mut self, table: RoadTypeMap) -> Self {
        self.strategy.table = table;
        self
    }

    pub fn with_override(mut self, rule: OverrideRule) -> Self {
        self.strategy.override_rule = Some(rule);
        self
    }

    pub fn filter(mut self, filter: FilterFn) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Classification field name, or an empty string when the layer has none.
    pub fn fc_field_name(&self) -> &str {
        self.fc_field.as_deref().unwrap_or("")
    }

    /// `path + id + "/query"` relative to the region's base URL.
    pub fn query_path(&self) -> String {
        format!("{}{}/query", self.path.as_deref().unwrap_or(""), self.id)
    }
}

/// Region + layer identifier used to look strategies up.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerKey {
    pub region: String,
    pub layer: String,
}

impl LayerKey {
    pub fn new(region: impl Into<String>, layer: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            layer: layer.into(),
        }
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region, self.layer)
    }
}

/// Per-class colours for a region, falling back to the global palette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorMap {
    colors: BTreeMap<RoadClass, String>,
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, class: RoadClass, color: impl Into<String>) -> Self {
        self.colors.insert(class, color.into());
        self
    }

    pub fn color_for(&self, class: RoadClass) -> &str {
        self.colors
            .get(&class)
            .map(String::as_str)
            .unwrap_or_else(|| class.default_color())
    }
}

/// Everything known about one region's data source.
#[derive(Debug, Clone)]
pub struct RegionDescriptor {
    pub code: String,
    pub name: String,
    /// Agency publishing the data.
    pub source: String,
    pub description: Option<String>,
    pub base_url: String,
    pub layers: Vec<LayerDescriptor>,
    pub permission: Permission,
    pub colors: ColorMap,
    /// Metres, indexed from zoom 12.
    pub max_offset: Vec<f64>,
    /// Approximate coverage, used when the host does not report regions.
    pub bounds: Extent,
    pub filter: Option<FilterFn>,
}

impl RegionDescriptor {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        base_url: impl Into<String>,
        bounds: Extent,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            source: String::new(),
            description: None,
            base_url: base_url.into(),
            layers: Vec::new(),
            permission: Permission::Default,
            colors: ColorMap::default(),
            max_offset: DEFAULT_MAX_OFFSET.to_vec(),
            bounds,
            filter: None,
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn layer(mut self, layer: LayerDescriptor) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    pub fn colors(mut self, colors: ColorMap) -> Self {
        self.colors = colors;
        self
    }

    pub fn max_offset(mut self, table: impl Into<Vec<f64>>) -> Self {
        self.max_offset = table.into();
        self
    }

    pub fn filter(mut self, filter: FilterFn) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn find_layer(&self, id: &str) -> Option<&LayerDescriptor> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Filter clause for `layer` at `zoom`: the layer's own filter when it
    /// has one, the region's otherwise.
    pub fn where_clause(&self, layer: &LayerDescriptor, zoom: u8) -> Option<String> {
        layer
            .filter
            .or(self.filter)
            .and_then(|filter| filter(layer, zoom))
            .filter(|clause| !clause.trim().is_empty())
    }

    /// Full query endpoint for a layer.
    pub fn query_url(&self, layer: &LayerDescriptor) -> String {
        format!("{}{}", self.base_url, layer.query_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fc_value_numeric_coercion() {
        assert!(FcValue::Int(4).matches(&json!(4)));
        assert!(FcValue::Int(4).matches(&json!("4")));
        assert!(FcValue::Int(4).matches(&json!(4.0)));
        assert!(FcValue::from("01").matches(&json!("01")));
        assert!(FcValue::from("7").matches(&json!(7)));
        assert!(!FcValue::Int(4).matches(&json!(5)));
        assert!(!FcValue::Int(4).matches(&Value::Null));
    }

    #[test]
    fn test_fc_value_text_comparison() {
        assert!(FcValue::from("2a").matches(&json!("2a")));
        assert!(FcValue::from("Interstate").matches(&json!(" Interstate ")));
        assert!(!FcValue::from("I").matches(&json!("U")));
    }

    #[test]
    fn test_value_as_int() {
        assert_eq!(value_as_int(&json!(3)), Some(3));
        assert_eq!(value_as_int(&json!(" 12 ")), Some(12));
        assert_eq!(value_as_int(&json!(3.5)), None);
        assert_eq!(value_as_int(&json!("2b")), None);
        assert_eq!(value_as_int(&json!(null)), None);
    }

    #[test]
    fn test_road_type_map_first_entry_wins() {
        let table = RoadTypeMap::new()
            .with(RoadClass::MinorHighway, [4])
            .with(RoadClass::MajorHighway, [3, 4]);
        assert_eq!(table.lookup_code(4), Some(RoadClass::MinorHighway));
        assert_eq!(table.lookup_code(3), Some(RoadClass::MajorHighway));
        assert_eq!(table.lookup_code(9), None);
    }

    #[test]
    fn test_standard_table() {
        let table = RoadTypeMap::standard();
        assert_eq!(table.lookup_code(1), Some(RoadClass::Freeway));
        assert_eq!(table.lookup_code(6), Some(RoadClass::PrimaryStreet));
        assert_eq!(table.lookup(&json!("7")), Some(RoadClass::Street));
    }

    #[test]
    fn test_layer_out_fields_include_id() {
        let layer = LayerDescriptor::new("0", "OBJECTID").out_fields(["FC"]);
        assert_eq!(layer.out_fields, vec!["OBJECTID", "FC"]);
    }

    #[test]
    fn test_query_url() {
        let region = RegionDescriptor::new(
            "NY",
            "New York",
            "https://example.test/rest/services/",
            Extent::new(0.0, 0.0, 1.0, 1.0),
        );
        let layer = LayerDescriptor::new("21", "OBJECTID").path("Basemap/MapServer/");
        assert_eq!(
            region.query_url(&layer),
            "https://example.test/rest/services/Basemap/MapServer/21/query"
        );
    }

    fn region_filter(layer: &LayerDescriptor, zoom: u8) -> Option<String> {
        (zoom < 16).then(|| format!("{}<7", layer.fc_field_name()))
    }

    fn layer_filter(_: &LayerDescriptor, _: u8) -> Option<String> {
        Some("SHIELD IN ('C','CT')".to_string())
    }

    #[test]
    fn test_where_clause_resolution() {
        let region = RegionDescriptor::new("XX", "Test", "u/", Extent::new(0.0, 0.0, 1.0, 1.0))
            .filter(region_filter);
        let plain = LayerDescriptor::new("0", "OBJECTID").fc_field("FC");
        let custom = LayerDescriptor::new("1", "OBJECTID").filter(layer_filter);

        assert_eq!(region.where_clause(&plain, 14), Some("FC<7".to_string()));
        assert_eq!(region.where_clause(&plain, 16), None);
        assert_eq!(
            region.where_clause(&custom, 14),
            Some("SHIELD IN ('C','CT')".to_string())
        );
    }

    #[test]
    fn test_color_map_fallback() {
        let colors = ColorMap::new().with(RoadClass::PrimaryStreet, "#ffff00");
        assert_eq!(colors.color_for(RoadClass::PrimaryStreet), "#ffff00");
        assert_eq!(
            colors.color_for(RoadClass::Freeway),
            RoadClass::Freeway.default_color()
        );
    }
}
