use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use ash::vk;
use static_assertions::assert_impl_all;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct VulkanVersion(u32);

impl VulkanVersion {
    pub const VK_1_0: VulkanVersion = VulkanVersion(vk::API_VERSION_1_0);
    pub const VK_1_1: VulkanVersion = VulkanVersion(vk::API_VERSION_1_1);
    pub const VK_1_2: VulkanVersion = VulkanVersion(vk::API_VERSION_1_2);
    pub const VK_1_3: VulkanVersion = VulkanVersion(vk::API_VERSION_1_3);

    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    pub fn new(variant: u32, major: u32, minor: u32, patch: u32) -> Self {
        Self(vk::make_api_version(variant, major, minor, patch))
    }

    pub const fn get_major(&self) -> u32 {
        vk::api_version_major(self.0)
    }

    pub const fn get_minor(&self) -> u32 {
        vk::api_version_minor(self.0)
    }

    pub const fn get_patch(&self) -> u32 {
        vk::api_version_patch(self.0)
    }

    pub const fn get_raw(&self) -> u32 {
        self.0
    }
}

impl From<VulkanVersion> for u32 {
    fn from(version: VulkanVersion) -> Self {
        version.0
    }
}

impl Debug for VulkanVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format!(
            "VulkanVersion([{}] {}.{}.{})",
            vk::api_version_variant(self.0),
            vk::api_version_major(self.0),
            vk::api_version_minor(self.0),
            vk::api_version_patch(self.0)
        ))
    }
}

/// The created vulkan instance together with the entry points it was created
/// from. Immutable after construction, destroyed at process exit when the
/// last reference is released.
pub struct InstanceContext {
    version: VulkanVersion,
    entry: ash::Entry,
    instance: ash::Instance,
}

impl InstanceContext {
    pub fn new(version: VulkanVersion, entry: ash::Entry, instance: ash::Instance) -> Arc<Self> {
        Arc::new(Self {
            version,
            entry,
            instance,
        })
    }

    pub fn get_entry(&self) -> &ash::Entry {
        &self.entry
    }

    pub fn vk(&self) -> &ash::Instance {
        &self.instance
    }

    pub fn get_version(&self) -> VulkanVersion {
        self.version
    }
}

impl Drop for InstanceContext {
    fn drop(&mut self) {
        unsafe {
            self.instance.destroy_instance(None);
        }
    }
}

impl Debug for InstanceContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("InstanceContext")
    }
}

assert_impl_all!(InstanceContext: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_components() {
        let version = VulkanVersion::new(0, 1, 2, 189);

        assert_eq!(version.get_major(), 1);
        assert_eq!(version.get_minor(), 2);
        assert_eq!(version.get_patch(), 189);
    }

    #[test]
    fn version_ordering() {
        assert!(VulkanVersion::VK_1_0 < VulkanVersion::VK_1_1);
        assert!(VulkanVersion::VK_1_2 < VulkanVersion::VK_1_3);
    }
}
