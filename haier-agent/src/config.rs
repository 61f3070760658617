use crate::{classifier::UnknownTypePolicy, *};
use serde::{Deserialize, Serialize};
use std::{io::Write, path::PathBuf, time::Duration};

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
pub struct Configuration {
    #[serde(default)]
    pub api:     Arc<ApiConfiguration>,
    #[serde(default)]
    pub agent:   Arc<AgentConfiguration>,
    #[serde(rename = "device", default)]
    pub devices: Vec<Arc<DeviceConfiguration>>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields, rename_all = "snake_case", default)]
pub struct ApiConfiguration {
    /// `{device_id}` is replaced with the id of the polled device.
    pub status_url: String,
    pub token:      Option<String>,
    pub timeout:    u64,
}

impl Default for ApiConfiguration {
    fn default() -> Self {
        ApiConfiguration {
            status_url: "https://uws.haier.net/uds/v1/protected/{device_id}/status".into(),
            token:      None,
            timeout:    10,
        }
    }
}

impl ApiConfiguration {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields, rename_all = "snake_case", default)]
pub struct AgentConfiguration {
    pub poll_interval: u64,
    pub fixture_dir:   PathBuf,
    pub unknown_types: UnknownTypePolicy,
}

impl Default for AgentConfiguration {
    fn default() -> Self {
        AgentConfiguration {
            poll_interval: DEFAULT_REFRESH_INTERVAL.as_secs(),
            fixture_dir:   "virtual_devices".into(),
            unknown_types: UnknownTypePolicy::default(),
        }
    }
}

impl AgentConfiguration {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval.max(1))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
pub struct DeviceConfiguration {
    pub id:           String,
    pub name:         String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub sw_version:   Option<String>,
    /// Path of the model's specification document.
    pub spec:         PathBuf,
    #[serde(rename = "virtual", default)]
    pub is_virtual:   bool,
}

impl Default for DeviceConfiguration {
    fn default() -> Self {
        DeviceConfiguration {
            id:           "virtual-ac".into(),
            name:         "Virtual air conditioner".into(),
            product_name: "KFR-35GW".into(),
            sw_version:   None,
            spec:         "specs/virtual-ac.json".into(),
            is_virtual:   true,
        }
    }
}

impl DeviceConfiguration {
    pub fn to_device(&self) -> Device {
        let data = DeviceData::new(self.id.clone(), self.name.clone(), self.product_name.clone());
        if self.is_virtual {
            data.into_virtual().build()
        } else {
            data.build()
        }
    }
}

impl Configuration {
    pub fn load(file: PathBuf) -> Result<Arc<Self>> {
        let path = file.to_string_lossy().to_string();
        let contents = std::fs::read_to_string(&file)
            .with_context(|| format!("Could not load configuration from file {}!", path))?;
        let c = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse contents of {}!", path))?;
        Ok(Arc::new(c))
    }

    pub fn with_fixture_dir(mut self: Arc<Self>, dir: PathBuf) -> Arc<Self> {
        let config = Arc::make_mut(&mut self);
        Arc::make_mut(&mut config.agent).fixture_dir = dir;
        self
    }

    pub fn generate_default(file: PathBuf) -> Result<()> {
        let path = file.to_string_lossy().to_string();
        let config = Configuration {
            devices: vec![Default::default()],
            ..Default::default()
        };
        let content = toml::to_string(&config)?;
        let mut f = std::fs::File::create(file)
            .with_context(|| format!("Could not create file {}!", path))?;
        f.write_all(content.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_default_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("haier-agent.toml");
        Configuration::generate_default(path.clone()).unwrap();

        let config = Configuration::load(path).unwrap();
        assert_eq!(config.agent.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.agent.unknown_types, UnknownTypePolicy::Lenient);
        assert_eq!(config.devices.len(), 1);
        assert!(config.devices[0].is_virtual);
        assert!(config.api.status_url.contains("{device_id}"));
    }

    #[test]
    fn parses_devices_and_policy() {
        let config: Configuration = toml::from_str(
            r#"
            [api]
            status_url = "http://localhost/{device_id}"
            token = "secret"

            [agent]
            poll_interval = 30
            unknown_types = "strict"

            [[device]]
            id = "DC330D"
            name = "Kitchen fridge"
            spec = "specs/fridge.json"

            [[device]]
            id = "sim-1"
            name = "Simulated"
            spec = "specs/ac.json"
            virtual = true
            "#,
        )
        .unwrap();

        assert_eq!(config.api.token.as_deref(), Some("secret"));
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.agent.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.agent.fixture_dir, PathBuf::from("virtual_devices"));
        assert_eq!(config.agent.unknown_types, UnknownTypePolicy::Strict);

        let fridge = config.devices[0].to_device();
        assert_eq!(fridge.id(), "DC330D");
        assert!(!fridge.is_virtual());
        assert!(config.devices[1].to_device().is_virtual());
    }

    #[test]
    fn fixture_dir_override() {
        let config = Arc::new(Configuration::default()).with_fixture_dir("snapshots".into());
        assert_eq!(config.agent.fixture_dir, PathBuf::from("snapshots"));
        assert_eq!(config.agent.poll_interval(), Duration::from_secs(15));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: std::result::Result<Configuration, _> = toml::from_str("[agent]\nfoo = 1\n");
        assert!(res.is_err());
    }
}
