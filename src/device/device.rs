use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use ash::vk;
use static_assertions::assert_impl_all;

use crate::instance::instance::InstanceContext;

/// The created logical device together with the physical device it was
/// created on.
///
/// The contained [`ash::Device`] doubles as the dynamically loaded device
/// function table. All fields are immutable after construction. The device
/// holds a reference to its instance so the instance always outlives it; the
/// logical device is destroyed when the last reference is released.
pub struct DeviceContext {
    instance: Arc<InstanceContext>,
    device: ash::Device,
    physical_device: vk::PhysicalDevice,
}

impl DeviceContext {
    pub(crate) fn new(
        instance: Arc<InstanceContext>,
        device: ash::Device,
        physical_device: vk::PhysicalDevice,
    ) -> Arc<Self> {
        Arc::new(Self {
            instance,
            device,
            physical_device,
        })
    }

    pub fn get_instance(&self) -> &Arc<InstanceContext> {
        &self.instance
    }

    pub fn get_entry(&self) -> &ash::Entry {
        self.instance.get_entry()
    }

    pub fn vk(&self) -> &ash::Device {
        &self.device
    }

    pub fn get_physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }
}

impl Drop for DeviceContext {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_device(None);
        }
    }
}

impl Debug for DeviceContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("DeviceContext")
    }
}

assert_impl_all!(DeviceContext: Send, Sync);
