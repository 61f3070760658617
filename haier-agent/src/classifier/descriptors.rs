use crate::spec::value_key;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Serialize, Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[display(fmt = "sensor")]
    Sensor,
    #[display(fmt = "binary_sensor")]
    BinarySensor,
    #[display(fmt = "number")]
    Number,
    #[display(fmt = "select")]
    Select,
    #[display(fmt = "switch")]
    Switch,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SensorDescriptor {
    pub key:             String,
    pub display_name:    String,
    pub unit:            Option<String>,
    pub value_formatter: HashMap<String, String>,
}

impl SensorDescriptor {
    /// Renders a reported value, translating enum values to their label.
    pub fn format_value(&self, raw: &Value) -> String {
        let key = value_key(raw);
        match self.value_formatter.get(&key) {
            Some(label) => label.clone(),
            None => key,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct BinarySensorDescriptor {
    pub key:          String,
    pub display_name: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct NumberDescriptor {
    pub key:          String,
    pub display_name: String,
    #[serde(rename = "minValue")]
    pub min_value:    f64,
    #[serde(rename = "maxValue")]
    pub max_value:    f64,
    pub step:         f64,
    pub unit:         Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SelectDescriptor {
    pub key:          String,
    pub display_name: String,
    pub options:      Vec<SelectOption>,
}

impl SelectDescriptor {
    pub fn label_for(&self, raw: &Value) -> Option<&str> {
        let key = value_key(raw);
        self.options
            .iter()
            .find(|o| value_key(&o.value) == key)
            .map(|o| o.label.as_str())
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SelectOption {
    pub value: Value,
    pub label: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SwitchDescriptor {
    pub key:          String,
    pub display_name: String,
}

/// All five entity lists of one specification.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct Classification {
    pub sensors:        Vec<SensorDescriptor>,
    pub binary_sensors: Vec<BinarySensorDescriptor>,
    pub numbers:        Vec<NumberDescriptor>,
    pub selects:        Vec<SelectDescriptor>,
    pub switches:       Vec<SwitchDescriptor>,
}

impl Classification {
    /// Every classified key with the kind it landed in, sensors first.
    pub fn entities(&self) -> Vec<(EntityKind, &str)> {
        let sensors = self.sensors.iter().map(|d| (EntityKind::Sensor, d.key.as_str()));
        let binary = self
            .binary_sensors
            .iter()
            .map(|d| (EntityKind::BinarySensor, d.key.as_str()));
        let numbers = self.numbers.iter().map(|d| (EntityKind::Number, d.key.as_str()));
        let selects = self.selects.iter().map(|d| (EntityKind::Select, d.key.as_str()));
        let switches = self.switches.iter().map(|d| (EntityKind::Switch, d.key.as_str()));
        sensors
            .chain(binary)
            .chain(numbers)
            .chain(selects)
            .chain(switches)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
            + self.binary_sensors.len()
            + self.numbers.len()
            + self.selects.len()
            + self.switches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
