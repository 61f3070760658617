use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Allowed values of a property.
///
/// Numeric and plain properties carry a range mapping, enumerations carry an
/// ordered list of variants. Anything else is kept as-is so that a property
/// only fails when a classification actually needs its variants.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Variants {
    Options(Vec<EnumVariant>),
    Range(RangeVariants),
    Other(Value),
}

impl Variants {
    pub fn range(&self) -> Option<&RangeVariants> {
        match self {
            Variants::Range(r) => Some(r),
            _ => None,
        }
    }

    pub fn options(&self) -> Option<&[EnumVariant]> {
        match self {
            Variants::Options(o) => Some(o.as_slice()),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RangeVariants {
    #[serde(default)]
    pub unit:      Option<String>,
    #[serde(default, deserialize_with = "lenient_bound")]
    pub min_value: Option<Numeric>,
    #[serde(default, deserialize_with = "lenient_bound")]
    pub max_value: Option<Numeric>,
    #[serde(default, deserialize_with = "lenient_bound")]
    pub step:      Option<Numeric>,
}

/// A bound that is not a number is treated as absent, so the rest of the
/// mapping (notably `unit`) survives and only a number entity needing the
/// bound fails.
fn lenient_bound<'de, D>(deserializer: D) -> Result<Option<Numeric>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().map(Numeric),
        Value::String(s) => s.trim().parse().ok().map(Numeric),
        _ => None,
    })
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnumVariant {
    pub std_value:   Value,
    pub description: String,
}

impl EnumVariant {
    /// `stdValue` as text, the way it is used as a lookup key.
    pub fn key(&self) -> String {
        value_key(&self.std_value)
    }
}

pub fn value_key(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A bound that appliance specs encode either as a number or a numeric string.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(transparent)]
pub struct Numeric(pub f64);
