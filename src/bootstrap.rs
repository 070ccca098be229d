//! Device bootstrap sequence.
//!
//! Runs once on the main thread during startup:
//! platform layer, instance, device selection, device creation and, on debug
//! configurations, the debug channel. Before the instance is created the
//! sequence waits for all outstanding asynchronous resource work to quiesce
//! so no load observes a half constructed context.
//!
//! "No physical device" is not an error value. The sequence finishes with a
//! valid instance and an absent device, logs a critical entry and leaves the
//! check to the caller.

use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;

use crate::config::GraphicsConfig;
use crate::device::device::DeviceContext;
use crate::device::init::{create_device, DeviceCreateError};
use crate::instance::debug_messenger::DebugChannel;
use crate::instance::init::{create_instance, InstanceCreateError};
use crate::instance::instance::InstanceContext;
use crate::platform;
use crate::platform::{PlatformError, PlatformProvider};
use crate::resources::registry::ResourceRegistry;
use crate::targets;

#[derive(Debug)]
pub enum BootstrapError {
    /// The platform capability layer failed to initialize. Fatal.
    Platform(PlatformError),
    /// The instance creation call rejected the negotiated capability set. Fatal.
    Instance(InstanceCreateError),
    /// The device creation call rejected the negotiated capability set. Fatal.
    Device(DeviceCreateError),
    /// Debug channel attachment failed. Fatal on debug configurations.
    DebugChannel(ash::vk::Result),
}

impl From<PlatformError> for BootstrapError {
    fn from(err: PlatformError) -> Self {
        BootstrapError::Platform(err)
    }
}

impl From<InstanceCreateError> for BootstrapError {
    fn from(err: InstanceCreateError) -> Self {
        BootstrapError::Instance(err)
    }
}

impl From<DeviceCreateError> for BootstrapError {
    fn from(err: DeviceCreateError) -> Self {
        BootstrapError::Device(err)
    }
}

/// The process wide graphics context.
///
/// Created once by the bootstrap, immutable afterwards, torn down at process
/// exit. Owned handles are released in reverse acquisition order: the debug
/// channel first, then the device, then the instance.
pub struct GraphicsContext {
    debug_channel: Option<DebugChannel>,
    device: Option<Arc<DeviceContext>>,
    instance: Arc<InstanceContext>,
}

impl GraphicsContext {
    pub fn instance(&self) -> &Arc<InstanceContext> {
        &self.instance
    }

    /// The created device, absent when no physical device was enumerated.
    /// Consumers relying on the device must treat its absence as fatal at
    /// their own layer.
    pub fn device(&self) -> Option<&Arc<DeviceContext>> {
        self.device.as_ref()
    }

    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }

    pub fn debug_channel_attached(&self) -> bool {
        self.debug_channel.is_some()
    }
}

/// Drives the bootstrap state machine.
pub struct DeviceBootstrap {
    config: GraphicsConfig,
    platform: Box<dyn PlatformProvider>,
}

impl DeviceBootstrap {
    pub fn new(config: GraphicsConfig, platform: Box<dyn PlatformProvider>) -> Self {
        Self { config, platform }
    }

    /// Runs the full sequence against `registry`.
    ///
    /// The registry is quiesced before instance creation and receives the
    /// created device so shader lookups can produce modules.
    pub fn run(self, registry: &ResourceRegistry) -> Result<GraphicsContext, BootstrapError> {
        let debug = self.config.validation_enabled();

        log::info!(
            target: targets::INSTANCE,
            "Bootstrapping graphics device for {:?} (validation: {})",
            self.config.application_name(),
            debug
        );

        registry.wait_idle();

        let entry = platform::load_entry()?;
        let platform_extensions = self.platform.required_instance_extensions()?;
        log::debug!(
            target: targets::INSTANCE,
            "Platform layer ready, {} mandated extensions",
            platform_extensions.len()
        );

        let instance = create_instance(entry, &self.config, &platform_extensions, debug)?;

        let device = create_device(&self.config, &instance, debug)?;

        let debug_channel = match (&device, debug) {
            (Some(_), true) => Some(
                DebugChannel::attach(instance.get_entry(), instance.vk())
                    .map_err(BootstrapError::DebugChannel)?,
            ),
            _ => None,
        };

        if let Some(device) = &device {
            registry.attach_device(device.clone());
            log::info!(target: targets::INSTANCE, "Graphics device ready");
        }

        Ok(GraphicsContext {
            debug_channel,
            device,
            instance,
        })
    }
}

lazy_static! {
    static ref GLOBAL_CONTEXT: Mutex<Option<Arc<GraphicsContext>>> = Mutex::new(None);
}

/// Creates the process wide context on first call. Later calls return the
/// already created context, the supplied bootstrap is dropped unused.
pub fn initialize_global(bootstrap: DeviceBootstrap) -> Result<Arc<GraphicsContext>, BootstrapError> {
    let mut guard = GLOBAL_CONTEXT.lock().unwrap();
    if let Some(context) = guard.as_ref() {
        return Ok(context.clone());
    }

    let context = Arc::new(bootstrap.run(crate::resources::registry::global())?);
    *guard = Some(context.clone());
    Ok(context)
}

/// The process wide context, if [`initialize_global`] has run.
pub fn global() -> Option<Arc<GraphicsContext>> {
    GLOBAL_CONTEXT.lock().unwrap().clone()
}
