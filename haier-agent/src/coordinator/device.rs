use crate::prelude::*;
use serde::Serialize;

pub const DOMAIN: &str = "haier";
pub const MANUFACTURER: &str = "海尔";

#[derive(Debug, Clone, Deref)]
pub struct Device(Arc<DeviceData>);

#[derive(Debug)]
pub struct DeviceData {
    id:           String,
    name:         String,
    product_name: String,
    is_virtual:   bool,
}

impl DeviceData {
    pub fn new(id: String, name: String, product_name: String) -> Self {
        Self {
            id,
            name,
            product_name,
            is_virtual: false,
        }
    }

    pub fn into_virtual(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    pub fn build(self) -> Device {
        Device(Arc::new(self))
    }
}

impl Device {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    pub fn to_device_info(&self, sw_version: Option<String>) -> DeviceInfo {
        DeviceInfo {
            identifiers: vec![(DOMAIN.into(), self.id.to_lowercase())],
            name: self.name.clone(),
            manufacturer: MANUFACTURER.into(),
            model: self.product_name.clone(),
            sw_version,
        }
    }
}

/// Registry entry describing the physical appliance.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub identifiers:  Vec<(String, String)>,
    pub name:         String,
    pub manufacturer: String,
    pub model:        String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sw_version:   Option<String>,
}
