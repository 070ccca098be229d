pub mod debug_messenger;
pub mod init;
pub mod instance;

pub use init::{create_instance, InstanceCreateError};
pub use instance::{InstanceContext, VulkanVersion};
