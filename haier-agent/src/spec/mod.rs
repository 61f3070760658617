//! Device specification documents.
//!
//! A specification describes every property a device model exposes. It is
//! shared by all devices of the same model/firmware and never changes once
//! loaded.

use crate::{classifier::ClassifyError, prelude::*};
use serde::{Deserialize, Serialize};
use serde::Deserializer;
use serde_json::Value;
use std::{path::Path, str::FromStr};

mod variants;

pub use variants::*;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DeviceSpec {
    #[serde(rename = "Property")]
    pub properties: Vec<PropertySpec>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PropertySpec {
    pub name:        String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind:        Option<PropertyType>,
    pub writable:    bool,
    #[serde(default, alias = "disabled", deserialize_with = "truthy")]
    pub disable:     bool,
    #[serde(default)]
    pub variants:    Option<Variants>,
}

/// Flags are set by any truthy value; `null`, `0` and `""` leave them off.
fn truthy<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    })
}

impl PropertySpec {
    pub fn is_bool(&self) -> bool {
        self.kind == Some(PropertyType::Bool)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, Some(PropertyType::Int) | Some(PropertyType::Double))
    }

    pub fn is_enum(&self) -> bool {
        self.kind == Some(PropertyType::Enum)
    }

    /// False when `type` is absent or not one of the known kinds.
    pub fn has_known_type(&self) -> bool {
        matches!(&self.kind, Some(k) if k.is_known())
    }

    /// Raw type label for diagnostics, empty when absent.
    pub fn type_label(&self) -> String {
        self.kind.as_ref().map(|k| k.to_string()).unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Display, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    #[display(fmt = "bool")]
    Bool,
    #[display(fmt = "int")]
    Int,
    #[display(fmt = "double")]
    Double,
    #[display(fmt = "enum")]
    Enum,
    #[display(fmt = "string")]
    String,
    #[display(fmt = "{}", _0)]
    Other(String),
}

impl PropertyType {
    pub fn is_known(&self) -> bool {
        !matches!(self, PropertyType::Other(_))
    }
}

impl From<String> for PropertyType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "bool" => PropertyType::Bool,
            "int" => PropertyType::Int,
            "double" => PropertyType::Double,
            "enum" => PropertyType::Enum,
            "string" => PropertyType::String,
            _ => PropertyType::Other(s),
        }
    }
}

impl From<PropertyType> for String {
    fn from(t: PropertyType) -> Self {
        t.to_string()
    }
}

impl FromStr for DeviceSpec {
    type Err = ClassifyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl DeviceSpec {
    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self> {
        let path = file.as_ref().to_string_lossy().to_string();
        let contents = std::fs::read_to_string(file.as_ref())
            .with_context(|| format!("Could not load device spec from file {}!", path))?;
        let spec = contents
            .parse::<DeviceSpec>()
            .with_context(|| format!("Failed to parse contents of {}!", path))?;
        Ok(spec)
    }
}
