pub use crate::prelude::*;
use crate::{
    classifier::Classification,
    spec::DeviceSpec,
    status::{FixtureSource, HttpStatusClient, StatusMap, StatusSource},
};
use futures::future::join_all;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

mod args;

#[derive(Clone, Deref, Debug)]
pub struct App(Arc<AppServices>);

#[derive(Debug)]
pub struct AppServices {
    pub config:  Arc<Configuration>,
    pub devices: Vec<ManagedDevice>,
    pub states:  DeviceStates,
}

/// A coordinator together with the entities its spec produced.
#[derive(Debug, Clone)]
pub struct ManagedDevice {
    pub coordinator: DeviceCoordinator,
    pub entities:    Arc<Classification>,
}

fn init_logging(verbosity: u64) -> Result<()> {
    let mut builder = ConfigBuilder::new();
    builder
        .add_filter_allow_str("haier_agent")
        .set_location_level(LevelFilter::Debug)
        .set_target_level(LevelFilter::Error)
        .set_time_format_rfc3339();
    if builder.set_time_offset_to_local().is_err() {
        eprintln!("Could not determine local time offset, logging in UTC");
    }
    TermLogger::init(
        match verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        },
        builder.build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;
    Ok(())
}

impl App {
    pub async fn new() -> Result<Self> {
        let opts = args::parse()?;
        init_logging(opts.verbosity)?;
        if opts.generate {
            info!(
                "Generating new configuration file at {}",
                opts.config.to_string_lossy()
            );
            Configuration::generate_default(opts.config)?;
            std::process::exit(0);
        }

        info!("Starting Haier agent");
        let mut config = Configuration::load(opts.config)?;
        if let Some(dir) = opts.fixture_dir {
            config = config.with_fixture_dir(dir);
        }
        let devices = Self::build_devices(&config)?;
        if opts.check {
            let skipped = config.devices.len() - devices.len();
            info!("{} devices ready, {} skipped", devices.len(), skipped);
            std::process::exit(if skipped == 0 { 0 } else { 1 });
        }
        Ok(App(Arc::new(AppServices {
            config,
            devices,
            states: DeviceStates::default(),
        })))
    }

    /// Devices whose spec cannot be loaded or classified are logged and left out.
    fn build_devices(config: &Configuration) -> Result<Vec<ManagedDevice>> {
        let client: Arc<dyn StatusSource> = Arc::new(HttpStatusClient::new(
            config.api.status_url.clone(),
            config.api.token.clone(),
            config.api.timeout(),
        )?);
        let fixtures: Arc<dyn StatusSource> =
            Arc::new(FixtureSource::new(config.agent.fixture_dir.clone()));

        let mut devices = vec![];
        for dev in config.devices.iter() {
            let source = if dev.is_virtual {
                fixtures.clone()
            } else {
                client.clone()
            };
            match Self::build_device(config, dev, source) {
                Ok(device) => devices.push(device),
                Err(e) => error!("Skipping device {}: {:?}", dev.id, e),
            }
        }
        Ok(devices)
    }

    fn build_device(
        config: &Configuration,
        dev: &DeviceConfiguration,
        source: Arc<dyn StatusSource>,
    ) -> Result<ManagedDevice> {
        let spec = Arc::new(DeviceSpec::load(&dev.spec)?);
        let coordinator =
            DeviceCoordinator::new(source, dev.to_device(), dev.sw_version.clone(), spec)
                .with_policy(config.agent.unknown_types);
        let entities = coordinator
            .classifier()
            .classify()
            .with_context(|| format!("{} has an unusable spec", coordinator.name()))?;
        describe(&coordinator, &entities);
        Ok(ManagedDevice {
            coordinator,
            entities: Arc::new(entities),
        })
    }

    async fn refresh(&self, device: &ManagedDevice) -> Result<()> {
        let id = device.coordinator.device().id();
        match device.coordinator.poll().await {
            Ok(status) => {
                render(device, &status);
                self.states.update_status(id, status).await;
                Ok(())
            }
            Err(e) => {
                self.states.mark_unavailable(id, e.to_string()).await;
                Err(Error::new(e).context(format!("{} is unavailable", device.coordinator.name())))
            }
        }
    }

    pub async fn start(&self) -> Result<()> {
        if self.devices.is_empty() {
            warn!("No devices configured, nothing to poll");
        }

        let first = join_all(self.devices.iter().map(|d| self.refresh(d))).await;
        for err in first.into_iter().filter_map(|r| r.err()) {
            warn!("Initial refresh failed: {:?}", err);
        }

        let interval = self.config.agent.poll_interval();
        let mut handles = vec![];
        for device in self.devices.iter() {
            let zelf = self.clone();
            let device = device.clone();
            handles.push(start_service(
                interval,
                device.coordinator.name().into(),
                false,
                move || {
                    let zelf = zelf.clone();
                    let device = device.clone();
                    async move { zelf.refresh(&device).await }
                },
            ));
        }

        tokio::signal::ctrl_c().await?;
        warn!("Signal received, shutting down");
        for handle in handles {
            handle.abort();
        }
        for id in self.states.get_devices().await {
            if let Some(state) = self.states.get(&id).await {
                debug!("Device [{}] last seen available: {}", id, state.available);
            }
        }
        Ok(())
    }
}

fn describe(coordinator: &DeviceCoordinator, entities: &Classification) {
    let device = coordinator.device();
    info!(
        "{} ({} {}): {} sensors, {} binary sensors, {} numbers, {} selects, {} switches",
        coordinator.name(),
        device.name(),
        device.product_name(),
        entities.sensors.len(),
        entities.binary_sensors.len(),
        entities.numbers.len(),
        entities.selects.len(),
        entities.switches.len(),
    );
    for (kind, key) in entities.entities() {
        debug!("  {}.{}", kind, key);
    }
}

/// Logs the reported values through the entities' formatting.
fn render(device: &ManagedDevice, status: &StatusMap) {
    let id = device.coordinator.device().id();
    for sensor in device.entities.sensors.iter() {
        if let Some(raw) = status.get(&sensor.key) {
            trace!(
                "[{}] {} = {}{}",
                id,
                sensor.display_name,
                sensor.format_value(raw),
                sensor.unit.as_deref().unwrap_or_default()
            );
        }
    }
    for select in device.entities.selects.iter() {
        if let Some(raw) = status.get(&select.key) {
            trace!(
                "[{}] {} = {}",
                id,
                select.display_name,
                select.label_for(raw).unwrap_or("unknown option")
            );
        }
    }
}
