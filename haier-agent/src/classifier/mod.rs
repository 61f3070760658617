//! Maps a device specification onto entity lists.
//!
//! Each non-disabled property lands in exactly one list, chosen by its
//! `writable` flag and `type`:
//!
//! | list           | writable | type             |
//! |----------------|----------|------------------|
//! | sensors        | false    | anything but bool|
//! | binary sensors | false    | bool             |
//! | numbers        | true     | int, double      |
//! | selects        | true     | enum             |
//! | switches       | true     | bool             |
//!
//! The lists keep the order of the `Property` sequence.

use crate::spec::{DeviceSpec, EnumVariant, PropertySpec, RangeVariants, Variants};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};

mod descriptors;

pub use descriptors::*;

#[derive(thiserror::Error, Debug)]
pub enum ClassifyError {
    #[error("malformed spec document: {0}")]
    MalformedDocument(#[from] serde_json::Error),
    #[error("malformed spec: property '{property}' {reason}")]
    MalformedSpec { property: String, reason: String },
    #[error("unknown type '{kind}' on property '{property}'")]
    UnknownType { property: String, kind: String },
}

pub type ClassifyResult<T> = std::result::Result<T, ClassifyError>;

type Result<T> = ClassifyResult<T>;

/// What to do with properties whose `type` is absent or unrecognized.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTypePolicy {
    /// Read-only ones become sensors, writable ones are left out.
    Lenient,
    /// Fail the whole classification.
    Strict,
}

impl Default for UnknownTypePolicy {
    fn default() -> Self {
        UnknownTypePolicy::Lenient
    }
}

#[derive(Clone, Debug)]
pub struct SpecClassifier {
    spec:   Arc<DeviceSpec>,
    policy: UnknownTypePolicy,
}

impl SpecClassifier {
    pub fn new(spec: Arc<DeviceSpec>) -> Self {
        Self {
            spec,
            policy: UnknownTypePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnknownTypePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn spec(&self) -> &DeviceSpec {
        &self.spec
    }

    pub fn sensors(&self) -> Result<Vec<SensorDescriptor>> {
        let mut sensors = vec![];
        for property in self.properties()? {
            // writable properties are controls, not observations
            if property.writable || property.is_bool() {
                continue;
            }

            let value_formatter = if property.is_enum() {
                options(property)?
                    .iter()
                    .map(|v| (v.key(), v.description.clone()))
                    .collect()
            } else {
                HashMap::new()
            };

            sensors.push(SensorDescriptor {
                key:          property.name.clone(),
                display_name: property.description.clone(),
                unit:         unit(property),
                value_formatter,
            });
        }
        Ok(sensors)
    }

    pub fn binary_sensors(&self) -> Result<Vec<BinarySensorDescriptor>> {
        Ok(self
            .properties()?
            .filter(|p| !p.writable && p.is_bool())
            .map(|p| BinarySensorDescriptor {
                key:          p.name.clone(),
                display_name: p.description.clone(),
            })
            .collect())
    }

    pub fn numbers(&self) -> Result<Vec<NumberDescriptor>> {
        let mut numbers = vec![];
        for property in self.properties()? {
            if !(property.writable && property.is_numeric()) {
                continue;
            }

            let range = range(property)?;
            numbers.push(NumberDescriptor {
                key:          property.name.clone(),
                display_name: property.description.clone(),
                min_value:    bound(property, range.min_value, "minValue")?,
                max_value:    bound(property, range.max_value, "maxValue")?,
                step:         bound(property, range.step, "step")?,
                unit:         range.unit.clone(),
            });
        }
        Ok(numbers)
    }

    pub fn selects(&self) -> Result<Vec<SelectDescriptor>> {
        let mut selects = vec![];
        for property in self.properties()? {
            if !(property.writable && property.is_enum()) {
                continue;
            }

            selects.push(SelectDescriptor {
                key:          property.name.clone(),
                display_name: property.description.clone(),
                options:      options(property)?
                    .iter()
                    .map(|v| SelectOption {
                        value: v.std_value.clone(),
                        label: v.description.clone(),
                    })
                    .collect(),
            });
        }
        Ok(selects)
    }

    pub fn switches(&self) -> Result<Vec<SwitchDescriptor>> {
        Ok(self
            .properties()?
            .filter(|p| p.writable && p.is_bool())
            .map(|p| SwitchDescriptor {
                key:          p.name.clone(),
                display_name: p.description.clone(),
            })
            .collect())
    }

    /// Runs all five classifications, failing on the first malformed property.
    pub fn classify(&self) -> Result<Classification> {
        Ok(Classification {
            sensors:        self.sensors()?,
            binary_sensors: self.binary_sensors()?,
            numbers:        self.numbers()?,
            selects:        self.selects()?,
            switches:       self.switches()?,
        })
    }

    /// Non-disabled properties, after the unknown-type policy has been applied.
    fn properties(&self) -> Result<impl Iterator<Item = &PropertySpec>> {
        if self.policy == UnknownTypePolicy::Strict {
            if let Some(p) = self.enabled().find(|p| !p.has_known_type()) {
                return Err(ClassifyError::UnknownType {
                    property: p.name.clone(),
                    kind:     p.type_label(),
                });
            }
        }
        Ok(self.enabled())
    }

    fn enabled(&self) -> impl Iterator<Item = &PropertySpec> {
        self.spec.properties.iter().filter(|p| !p.disable)
    }
}

fn malformed(property: &PropertySpec, reason: &str) -> ClassifyError {
    ClassifyError::MalformedSpec {
        property: property.name.clone(),
        reason:   reason.into(),
    }
}

fn options(property: &PropertySpec) -> Result<&[EnumVariant]> {
    property
        .variants
        .as_ref()
        .and_then(Variants::options)
        .ok_or_else(|| malformed(property, "needs a list of enum variants"))
}

fn range(property: &PropertySpec) -> Result<&RangeVariants> {
    property
        .variants
        .as_ref()
        .and_then(Variants::range)
        .ok_or_else(|| malformed(property, "needs a range mapping in variants"))
}

fn bound(
    property: &PropertySpec,
    value: Option<crate::spec::Numeric>,
    field: &str,
) -> Result<f64> {
    value
        .map(|n| n.0)
        .ok_or_else(|| malformed(property, &format!("is missing {} in variants", field)))
}

fn unit(property: &PropertySpec) -> Option<String> {
    property
        .variants
        .as_ref()
        .and_then(Variants::range)
        .and_then(|r| r.unit.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn classifier(properties: Value) -> SpecClassifier {
        let spec: DeviceSpec = serde_json::from_value(json!({ "Property": properties })).unwrap();
        SpecClassifier::new(Arc::new(spec))
    }

    fn mixed() -> SpecClassifier {
        classifier(json!([
            {"name": "indoorTemperature", "description": "Indoor", "type": "double",
             "writable": false, "variants": {"unit": "°C", "minValue": "-20", "maxValue": "50", "step": "0.5"}},
            {"name": "onOffStatus", "description": "Power", "type": "bool", "writable": true},
            {"name": "filterAlarm", "description": "Filter", "type": "bool", "writable": false},
            {"name": "targetTemperature", "description": "Target", "type": "int", "writable": true,
             "variants": {"unit": "°C", "minValue": 16, "maxValue": 30, "step": 1}},
            {"name": "operationMode", "description": "Mode", "type": "enum", "writable": true,
             "variants": [{"stdValue": "0", "description": "Auto"}, {"stdValue": "1", "description": "Cool"}]},
            {"name": "runningState", "description": "State", "type": "enum", "writable": false,
             "variants": [{"stdValue": 0, "description": "Idle"}, {"stdValue": 1, "description": "Running"}]},
            {"name": "humidity", "description": "Humidity", "type": "int", "writable": false},
            {"name": "windSpeed", "description": "Wind", "type": "enum", "writable": true, "disable": true,
             "variants": [{"stdValue": "1", "description": "Low"}]},
            {"name": "childLock", "description": "Lock", "type": "bool", "writable": true},
            {"name": "firmware", "description": "Firmware", "type": "string", "writable": false}
        ]))
    }

    #[test]
    fn read_only_double_becomes_sensor() {
        let c = classifier(json!([
            {"name": "t1", "description": "Temp", "type": "double", "writable": false,
             "variants": {"unit": "°C"}}
        ]));
        let all = c.classify().unwrap();
        assert_eq!(all.sensors, vec![SensorDescriptor {
            key:             "t1".into(),
            display_name:    "Temp".into(),
            unit:            Some("°C".into()),
            value_formatter: HashMap::new(),
        }]);
        assert!(all.binary_sensors.is_empty());
        assert!(all.numbers.is_empty());
        assert!(all.selects.is_empty());
        assert!(all.switches.is_empty());
    }

    #[test]
    fn writable_bool_becomes_switch() {
        let c = classifier(json!([
            {"name": "power", "description": "Power", "type": "bool", "writable": true}
        ]));
        let all = c.classify().unwrap();
        assert_eq!(all.switches, vec![SwitchDescriptor {
            key:          "power".into(),
            display_name: "Power".into(),
        }]);
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn disabled_enum_is_skipped_without_error() {
        let c = classifier(json!([
            {"name": "mode", "description": "Mode", "type": "enum", "writable": true, "disable": true,
             "variants": [{"stdValue": "0", "description": "Auto"}]}
        ]));
        assert!(c.selects().unwrap().is_empty());
        assert!(c.classify().unwrap().is_empty());
    }

    #[test]
    fn disabled_property_is_never_inspected() {
        let c = classifier(json!([
            {"name": "broken", "description": "Broken", "type": "int", "writable": true, "disable": true}
        ]));
        assert!(c.numbers().unwrap().is_empty());
    }

    #[test]
    fn numeric_without_step_fails_wholesale() {
        let c = classifier(json!([
            {"name": "ok", "description": "Ok", "type": "int", "writable": true,
             "variants": {"minValue": 0, "maxValue": 10, "step": 1}},
            {"name": "target", "description": "Target", "type": "int", "writable": true,
             "variants": {"minValue": 16, "maxValue": 30}}
        ]));
        match c.numbers() {
            Err(ClassifyError::MalformedSpec { property, reason }) => {
                assert_eq!(property, "target");
                assert!(reason.contains("step"));
            }
            other => panic!("expected malformed spec, got {:?}", other),
        }
        assert!(c.classify().is_err());
    }

    #[test]
    fn non_numeric_bound_keeps_sensor_unit_but_fails_number() {
        let c = classifier(json!([
            {"name": "outdoor", "description": "Outdoor", "type": "double", "writable": false,
             "variants": {"unit": "°C", "minValue": "-20", "maxValue": "50", "step": ""}}
        ]));
        assert_eq!(c.sensors().unwrap()[0].unit.as_deref(), Some("°C"));

        let c = classifier(json!([
            {"name": "target", "description": "Target", "type": "double", "writable": true,
             "variants": {"unit": "°C", "minValue": "-20", "maxValue": "50", "step": ""}}
        ]));
        match c.numbers() {
            Err(ClassifyError::MalformedSpec { property, reason }) => {
                assert_eq!(property, "target");
                assert!(reason.contains("step"));
            }
            other => panic!("expected malformed spec, got {:?}", other),
        }
    }

    #[test]
    fn numeric_without_variants_is_malformed() {
        let c = classifier(json!([
            {"name": "target", "description": "Target", "type": "double", "writable": true}
        ]));
        assert!(matches!(c.numbers(), Err(ClassifyError::MalformedSpec { .. })));
    }

    #[test]
    fn enum_without_variant_list_is_malformed() {
        let c = classifier(json!([
            {"name": "mode", "description": "Mode", "type": "enum", "writable": false,
             "variants": {"unit": "x"}}
        ]));
        assert!(matches!(c.sensors(), Err(ClassifyError::MalformedSpec { .. })));

        let c = classifier(json!([
            {"name": "mode", "description": "Mode", "type": "enum", "writable": true}
        ]));
        assert!(matches!(c.selects(), Err(ClassifyError::MalformedSpec { .. })));
    }

    #[test]
    fn every_enabled_property_lands_in_exactly_one_list() {
        let c = mixed();
        let all = c.classify().unwrap();
        let entities = all.entities();

        for p in c.spec().properties.iter() {
            let hits = entities.iter().filter(|(_, k)| *k == p.name).count();
            let expected = match (p.disable, p.writable, p.kind.as_ref().map(|k| k.to_string())) {
                (true, ..) => 0,
                (false, true, Some(ref t)) if t == "string" => 0,
                _ => 1,
            };
            assert_eq!(hits, expected, "property {}", p.name);
        }

        let kind_of = |key: &str| entities.iter().find(|(_, k)| *k == key).map(|(kind, _)| *kind);
        assert_eq!(kind_of("indoorTemperature"), Some(EntityKind::Sensor));
        assert_eq!(kind_of("onOffStatus"), Some(EntityKind::Switch));
        assert_eq!(kind_of("filterAlarm"), Some(EntityKind::BinarySensor));
        assert_eq!(kind_of("targetTemperature"), Some(EntityKind::Number));
        assert_eq!(kind_of("operationMode"), Some(EntityKind::Select));
        assert_eq!(kind_of("runningState"), Some(EntityKind::Sensor));
        assert_eq!(kind_of("firmware"), Some(EntityKind::Sensor));
        assert_eq!(kind_of("windSpeed"), None);
    }

    #[test]
    fn lists_keep_spec_order() {
        let all = mixed().classify().unwrap();
        let sensors: Vec<_> = all.sensors.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(sensors, vec!["indoorTemperature", "runningState", "humidity", "firmware"]);
        let switches: Vec<_> = all.switches.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(switches, vec!["onOffStatus", "childLock"]);
    }

    #[test]
    fn repeated_classification_is_identical() {
        let c = mixed();
        let first = c.classify().unwrap();
        for _ in 0..3 {
            assert_eq!(c.classify().unwrap(), first);
        }
    }

    #[test]
    fn enum_sensor_formats_by_std_value() {
        let all = mixed().classify().unwrap();
        let state = all.sensors.iter().find(|s| s.key == "runningState").unwrap();
        assert_eq!(state.value_formatter.get("0").map(String::as_str), Some("Idle"));
        assert_eq!(state.value_formatter.get("1").map(String::as_str), Some("Running"));
        assert_eq!(state.unit, None);
        assert_eq!(state.format_value(&json!(1)), "Running");
        assert_eq!(state.format_value(&json!("1")), "Running");
        assert_eq!(state.format_value(&json!(7)), "7");
    }

    #[test]
    fn numbers_and_selects_carry_ranges_and_options() {
        let all = mixed().classify().unwrap();
        assert_eq!(all.numbers, vec![NumberDescriptor {
            key:          "targetTemperature".into(),
            display_name: "Target".into(),
            min_value:    16.0,
            max_value:    30.0,
            step:         1.0,
            unit:         Some("°C".into()),
        }]);

        let mode = &all.selects[0];
        assert_eq!(mode.key, "operationMode");
        let labels: Vec<_> = mode.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Auto", "Cool"]);
        assert_eq!(mode.options[1].value, json!("1"));
        assert_eq!(mode.label_for(&json!(1)), Some("Cool"));
        assert_eq!(mode.label_for(&json!("9")), None);
    }

    #[test]
    fn unknown_read_only_type_is_a_sensor_by_default() {
        let c = classifier(json!([
            {"name": "stamp", "description": "Stamp", "type": "date", "writable": false},
            {"name": "untyped", "description": "Untyped", "writable": false},
            {"name": "blob", "description": "Blob", "type": "raw", "writable": true}
        ]));
        let all = c.classify().unwrap();
        let sensors: Vec<_> = all.sensors.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(sensors, vec!["stamp", "untyped"]);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn strict_policy_rejects_unknown_types() {
        let c = classifier(json!([
            {"name": "power", "description": "Power", "type": "bool", "writable": true},
            {"name": "stamp", "description": "Stamp", "type": "date", "writable": false}
        ]))
        .with_policy(UnknownTypePolicy::Strict);

        match c.switches() {
            Err(ClassifyError::UnknownType { property, kind }) => {
                assert_eq!(property, "stamp");
                assert_eq!(kind, "date");
            }
            other => panic!("expected unknown type, got {:?}", other),
        }
    }

    #[test]
    fn strict_policy_ignores_disabled_unknown_types() {
        let c = classifier(json!([
            {"name": "stamp", "description": "Stamp", "type": "date", "writable": false, "disable": true}
        ]))
        .with_policy(UnknownTypePolicy::Strict);
        assert!(c.classify().unwrap().is_empty());
    }
}
