//! Feature classification.
//!
//! [`classify`] turns one raw feature into a [`RoadClass`] using the layer's
//! [`ClassificationStrategy`](crate::catalog::ClassificationStrategy): the
//! override rule when the layer has one, the value table otherwise.
//! Classification is pure and total. A feature no rule recognises yields
//! `None` and is dropped by the caller.

pub(crate) mod rules;

use std::borrow::Cow;

use serde_json::Value;

use crate::catalog::{value_as_int, LayerDescriptor};
use crate::road_class::RoadClass;
use crate::source::RawFeature;

/// Classifies one feature against its layer.
pub fn classify(feature: &RawFeature, layer: &LayerDescriptor) -> Option<RoadClass> {
    let ctx = RuleContext::new(feature, layer);
    match layer.strategy.override_rule {
        Some(rule) => rule(&ctx),
        None => ctx.baseline(),
    }
}

/// Typed view of a feature handed to override rules.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    feature: &'a RawFeature,
    layer: &'a LayerDescriptor,
}

impl<'a> RuleContext<'a> {
    pub fn new(feature: &'a RawFeature, layer: &'a LayerDescriptor) -> Self {
        Self { feature, layer }
    }

    pub fn feature(&self) -> &'a RawFeature {
        self.feature
    }

    pub fn layer(&self) -> &'a LayerDescriptor {
        self.layer
    }

    pub fn layer_id(&self) -> &'a str {
        &self.layer.id
    }

    /// Raw attribute. JSON null counts as absent.
    pub fn attr(&self, field: &str) -> Option<&'a Value> {
        self.feature.attributes.get(field).filter(|v| !v.is_null())
    }

    /// Raw value of the layer's classification field.
    pub fn raw(&self) -> Option<&'a Value> {
        self.layer.fc_field.as_deref().and_then(|field| self.attr(field))
    }

    /// Classification field as an integer code.
    pub fn fc(&self) -> Option<i64> {
        self.raw().and_then(value_as_int)
    }

    pub fn int(&self, field: &str) -> Option<i64> {
        self.attr(field).and_then(value_as_int)
    }

    /// Attribute as text. Numbers are rendered, other JSON types are absent.
    pub fn text(&self, field: &str) -> Option<Cow<'a, str>> {
        match self.attr(field)? {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            _ => None,
        }
    }

    /// Looks a computed code up in the layer table.
    pub fn lookup(&self, code: i64) -> Option<RoadClass> {
        self.layer.strategy.table.lookup_code(code)
    }

    /// Table lookup of the raw classification value.
    pub fn baseline(&self) -> Option<RoadClass> {
        self.raw()
            .and_then(|raw| self.layer.strategy.table.lookup(raw))
    }
}

/// "Raise to at least `floor` when `when` holds."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clamp {
    pub floor: RoadClass,
    pub when: bool,
}

impl Clamp {
    pub fn new(floor: RoadClass, when: bool) -> Self {
        Self { floor, when }
    }
}

/// Applies the first clamp that holds and would raise `class`.
///
/// Later clamps are not consulted once one has applied, so declaration
/// order resolves conflicts.
pub fn apply_clamps(class: RoadClass, clamps: &[Clamp]) -> RoadClass {
    clamps
        .iter()
        .find(|clamp| clamp.when && class < clamp.floor)
        .map(|clamp| clamp.floor)
        .unwrap_or(class)
}

/// Numeric-code clamp: `Some(max)` when `when` holds and `fc` is a lower
/// priority (numerically greater) code than `max`.
///
/// Chain with `or_else` to get first-match semantics.
pub fn clamp_code(fc: i64, max: i64, when: bool) -> Option<i64> {
    (when && fc > max).then_some(max)
}

/// Standard FHWA functional class codes.
pub fn code_to_class(fc: i64) -> Option<RoadClass> {
    match fc {
        1 => Some(RoadClass::Freeway),
        2 => Some(RoadClass::Expressway),
        3 => Some(RoadClass::MajorHighway),
        4 => Some(RoadClass::MinorHighway),
        5 | 6 => Some(RoadClass::PrimaryStreet),
        7 => Some(RoadClass::Street),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RoadTypeMap;
    use proptest::prelude::*;
    use serde_json::json;

    fn feature(attrs: Value) -> RawFeature {
        RawFeature::from_attributes(attrs)
    }

    fn layer_ab() -> LayerDescriptor {
        // A = MajorHighway, B = MinorHighway
        LayerDescriptor::new("0", "OBJECTID").fc_field("FC").table(
            RoadTypeMap::new()
                .with(RoadClass::MajorHighway, [1])
                .with(RoadClass::MinorHighway, [2, 3]),
        )
    }

    #[test]
    fn test_table_lookup() {
        let layer = layer_ab();
        assert_eq!(classify(&feature(json!({"FC": 2})), &layer), Some(RoadClass::MinorHighway));
        assert_eq!(classify(&feature(json!({"FC": 1})), &layer), Some(RoadClass::MajorHighway));
    }

    #[test]
    fn test_unknown_value_is_unclassified() {
        let layer = layer_ab();
        assert_eq!(classify(&feature(json!({"FC": 99})), &layer), None);
        assert_eq!(classify(&feature(json!({"FC": null})), &layer), None);
        assert_eq!(classify(&feature(json!({})), &layer), None);
    }

    fn national_system_clamp(ctx: &RuleContext<'_>) -> Option<RoadClass> {
        let base = ctx.baseline()?;
        let nhs = ctx.text("NHS").is_some_and(|v| v == "YES");
        Some(apply_clamps(base, &[Clamp::new(RoadClass::MinorHighway, nhs)]))
    }

    #[test]
    fn test_override_clamp() {
        let layer = LayerDescriptor::new("0", "OBJECTID")
            .fc_field("FC")
            .table(RoadTypeMap::standard())
            .with_override(national_system_clamp);

        let on_system = feature(json!({"FC": 7, "NHS": "YES"}));
        let off_system = feature(json!({"FC": 7, "NHS": "NO"}));
        let already_higher = feature(json!({"FC": 1, "NHS": "YES"}));

        assert_eq!(classify(&on_system, &layer), Some(RoadClass::MinorHighway));
        assert_eq!(classify(&off_system, &layer), Some(RoadClass::Street));
        assert_eq!(classify(&already_higher, &layer), Some(RoadClass::Freeway));
    }

    #[test]
    fn test_apply_clamps_first_match_wins() {
        let clamps = [
            Clamp::new(RoadClass::MinorHighway, true),
            Clamp::new(RoadClass::Freeway, true),
        ];
        assert_eq!(apply_clamps(RoadClass::Street, &clamps), RoadClass::MinorHighway);

        let skipped = [
            Clamp::new(RoadClass::Freeway, false),
            Clamp::new(RoadClass::MajorHighway, true),
        ];
        assert_eq!(apply_clamps(RoadClass::Street, &skipped), RoadClass::MajorHighway);
    }

    #[test]
    fn test_clamp_code_chain() {
        let chain = |fc: i64, us: bool, state: bool| {
            clamp_code(fc, 3, us)
                .or_else(|| clamp_code(fc, 4, state))
                .unwrap_or(fc)
        };
        assert_eq!(chain(7, true, false), 3);
        assert_eq!(chain(7, false, true), 4);
        assert_eq!(chain(2, true, false), 2);
        assert_eq!(chain(5, false, false), 5);
    }

    #[test]
    fn test_code_to_class() {
        assert_eq!(code_to_class(1), Some(RoadClass::Freeway));
        assert_eq!(code_to_class(6), Some(RoadClass::PrimaryStreet));
        assert_eq!(code_to_class(0), None);
        assert_eq!(code_to_class(8), None);
    }

    #[test]
    fn test_rule_context_accessors() {
        let f = feature(json!({"FC": "4", "ROUTE": "US 1", "N": 12, "X": null}));
        let layer = layer_ab();
        let ctx = RuleContext::new(&f, &layer);
        assert_eq!(ctx.fc(), Some(4));
        assert_eq!(ctx.text("ROUTE").as_deref(), Some("US 1"));
        assert_eq!(ctx.text("N").as_deref(), Some("12"));
        assert_eq!(ctx.int("N"), Some(12));
        assert!(ctx.attr("X").is_none());
        assert_eq!(ctx.lookup(3), Some(RoadClass::MinorHighway));
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<i64>().prop_map(Value::from),
            any::<f64>().prop_map(|f| json!(f)),
            ".{0,8}".prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
        ]
    }

    proptest! {
        #[test]
        fn prop_builtin_rules_are_total(
            fc in arb_value(),
            route in arb_value(),
            prefix in arb_value(),
            code in arb_value(),
        ) {
            let catalog = crate::catalog::RegionCatalog::builtin().unwrap();
            for region in catalog.regions() {
                for layer in &region.layers {
                    let mut attrs = serde_json::Map::new();
                    if let Some(field) = &layer.fc_field {
                        attrs.insert(field.clone(), fc.clone());
                    }
                    for field in &layer.out_fields {
                        if Some(field) != layer.fc_field.as_ref() {
                            let value = match field.len() % 3 {
                                0 => route.clone(),
                                1 => prefix.clone(),
                                _ => code.clone(),
                            };
                            attrs.insert(field.clone(), value);
                        }
                    }
                    let f = RawFeature::from_attributes(Value::Object(attrs));
                    // Must return without panicking.
                    let _ = classify(&f, layer);
                }
            }
        }
    }
}
