use crate::{
    classifier::*,
    prelude::*,
    spec::DeviceSpec,
    status::{FetchError, StatusMap, StatusSource},
};
use async_trait::async_trait;
use std::time::Duration;

mod device;

pub use device::*;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15);

/// Something a scheduler can refresh on a timer.
#[async_trait]
pub trait Refreshable {
    async fn poll(&self) -> std::result::Result<StatusMap, FetchError>;
}

/// Ties one device to its spec and the source of its live status.
#[derive(Clone)]
pub struct DeviceCoordinator {
    name:        String,
    device:      Device,
    device_info: DeviceInfo,
    classifier:  SpecClassifier,
    source:      Arc<dyn StatusSource>,
}

impl std::fmt::Debug for DeviceCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceCoordinator")
            .field("name", &self.name)
            .field("device", &self.device)
            .finish()
    }
}

impl DeviceCoordinator {
    pub fn new(
        source: Arc<dyn StatusSource>,
        device: Device,
        sw_version: Option<String>,
        spec: Arc<DeviceSpec>,
    ) -> Self {
        Self {
            name: format!("Haier Device [{}]", device.id()),
            device_info: device.to_device_info(sw_version),
            classifier: SpecClassifier::new(spec),
            device,
            source,
        }
    }

    pub fn with_policy(mut self, policy: UnknownTypePolicy) -> Self {
        self.classifier = self.classifier.with_policy(policy);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    pub fn classifier(&self) -> &SpecClassifier {
        &self.classifier
    }

    pub fn sensors(&self) -> ClassifyResult<Vec<SensorDescriptor>> {
        self.classifier.sensors()
    }

    pub fn binary_sensors(&self) -> ClassifyResult<Vec<BinarySensorDescriptor>> {
        self.classifier.binary_sensors()
    }

    pub fn numbers(&self) -> ClassifyResult<Vec<NumberDescriptor>> {
        self.classifier.numbers()
    }

    pub fn selects(&self) -> ClassifyResult<Vec<SelectDescriptor>> {
        self.classifier.selects()
    }

    pub fn switches(&self) -> ClassifyResult<Vec<SwitchDescriptor>> {
        self.classifier.switches()
    }
}

#[async_trait]
impl Refreshable for DeviceCoordinator {
    async fn poll(&self) -> std::result::Result<StatusMap, FetchError> {
        let data = self.source.fetch(self.device.id()).await?;
        debug!(
            "Device [{}] fetched latest status: {}",
            self.device.id(),
            serde_json::to_string(&data).unwrap_or_default()
        );
        Ok(data)
    }
}
