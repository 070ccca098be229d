pub mod device;
pub mod init;

pub use device::DeviceContext;
pub use init::{create_device, DeviceCreateError};
