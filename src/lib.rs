pub mod bootstrap;
pub mod capability;
pub mod config;
pub mod device;
pub mod enumerate;
pub mod instance;
pub mod platform;
pub mod resources;

pub use bootstrap::{DeviceBootstrap, GraphicsContext};
pub use capability::CapabilitySet;
pub use config::GraphicsConfig;
pub use device::device::DeviceContext;
pub use instance::instance::{InstanceContext, VulkanVersion};
pub use resources::registry::ResourceRegistry;
pub use resources::shader::{LoadedShader, ShaderStage};

pub const EMBER_CORE_VERSION_MAJOR: u32 = 0;
pub const EMBER_CORE_VERSION_MINOR: u32 = 1;
pub const EMBER_CORE_VERSION_PATCH: u32 = 0;

/// Log targets forming the tag path of every diagnostic entry emitted by this
/// layer. Consumers filter on these when routing engine diagnostics.
pub(crate) mod targets {
    pub const INSTANCE: &str = "ember::graphics_device::instance";
    pub const VALIDATION: &str = "ember::graphics_device::validation_layer";
    pub const RESOURCES: &str = "ember::resources";
}
