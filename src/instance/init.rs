//! Instance creation.
//!
//! The negotiated capability sets are requested exactly as built. There is no
//! retry with a reduced set, an unsupported extension or layer surfaces as
//! the create call failing and is propagated to the caller.

use std::ffi::{CStr, CString};
use std::sync::Arc;

use ash::vk;

use crate::capability::CapabilitySet;
use crate::config::GraphicsConfig;
use crate::enumerate;
use crate::enumerate::EnumerateError;
use crate::instance::instance::{InstanceContext, VulkanVersion};
use crate::targets;
use crate::{EMBER_CORE_VERSION_MAJOR, EMBER_CORE_VERSION_MINOR, EMBER_CORE_VERSION_PATCH};

pub const VALIDATION_LAYER_NAME: &[u8] = b"VK_LAYER_KHRONOS_validation\0";

#[derive(Debug)]
pub enum InstanceCreateError {
    Vulkan(vk::Result),
    Utf8(std::str::Utf8Error),
    Nul(std::ffi::NulError),
}

impl From<vk::Result> for InstanceCreateError {
    fn from(result: vk::Result) -> Self {
        InstanceCreateError::Vulkan(result)
    }
}

impl From<std::str::Utf8Error> for InstanceCreateError {
    fn from(err: std::str::Utf8Error) -> Self {
        InstanceCreateError::Utf8(err)
    }
}

impl From<std::ffi::NulError> for InstanceCreateError {
    fn from(err: std::ffi::NulError) -> Self {
        InstanceCreateError::Nul(err)
    }
}

impl From<EnumerateError> for InstanceCreateError {
    fn from(err: EnumerateError) -> Self {
        match err {
            EnumerateError::Vulkan(result) => InstanceCreateError::Vulkan(result),
            EnumerateError::Utf8(err) => InstanceCreateError::Utf8(err),
        }
    }
}

/// Creates the vulkan instance.
///
/// The instance extension set is built from the platform mandated extensions,
/// the debug diagnostics extension in debug mode and the configured extras.
/// The layer set is built from the validation layer in debug mode and the
/// configured extras.
pub fn create_instance(
    entry: ash::Entry,
    config: &GraphicsConfig,
    platform_extensions: &[CString],
    debug: bool,
) -> Result<Arc<InstanceContext>, InstanceCreateError> {
    let version = match entry.try_enumerate_instance_version()? {
        Some(version) => VulkanVersion::from_raw(version),
        None => VulkanVersion::VK_1_0,
    };
    log::info!(target: targets::INSTANCE, "Vulkan instance version: {:?}", version);

    let available_extensions = enumerate::instance_extensions(&entry)?;
    for extension in &available_extensions {
        log::debug!(
            target: targets::INSTANCE,
            "Available instance extension \"{}\" (version {})",
            extension.get_name(),
            extension.get_version()
        );
    }
    let available_layers = enumerate::instance_layers(&entry)?;
    for layer in &available_layers {
        log::debug!(
            target: targets::INSTANCE,
            "Available instance layer \"{}\" ({:?}, implementation {})",
            layer.get_name(),
            layer.get_spec_version(),
            layer.get_implementation_version()
        );
    }

    let debug_extensions = [CString::from(ash::extensions::ext::DebugUtils::name())];
    let extensions = CapabilitySet::build(
        platform_extensions,
        &debug_extensions,
        config.instance_extensions(),
        debug,
    );

    let debug_layers = [CString::from(CStr::from_bytes_with_nul(VALIDATION_LAYER_NAME).unwrap())];
    let layers = CapabilitySet::build(&[], &debug_layers, config.instance_layers(), debug);

    for extension in extensions.iter() {
        log::debug!(target: targets::INSTANCE, "Requesting instance extension {:?}", extension);
    }
    for layer in layers.iter() {
        log::debug!(target: targets::INSTANCE, "Requesting instance layer {:?}", layer);
    }

    let application_info = vk::ApplicationInfo::builder()
        .application_name(config.application_name())
        .application_version(config.application_version())
        .engine_name(CStr::from_bytes_with_nul(b"Ember-Core\0").unwrap())
        .engine_version(vk::make_api_version(
            0,
            EMBER_CORE_VERSION_MAJOR,
            EMBER_CORE_VERSION_MINOR,
            EMBER_CORE_VERSION_PATCH,
        ))
        .api_version(vk::API_VERSION_1_2);

    let extension_ptrs = extensions.as_ptr_vec();
    let layer_ptrs = layers.as_ptr_vec();
    let create_info = vk::InstanceCreateInfo::builder()
        .application_info(&application_info)
        .enabled_layer_names(layer_ptrs.as_slice())
        .enabled_extension_names(extension_ptrs.as_slice());

    let instance = unsafe { entry.create_instance(&create_info, None) }?;

    log::debug!(target: targets::INSTANCE, "Instance creation successful");

    Ok(InstanceContext::new(version, entry, instance))
}
