//! Read-only queries against the vulkan environment.
//!
//! Everything in this module only inspects state, nothing mutates the
//! instance or any device. Passing an invalid handle into one of these
//! functions is a programming error and not recoverable.

use std::ffi::{CStr, CString};

use ash::vk;

use crate::instance::instance::{InstanceContext, VulkanVersion};

#[derive(Debug)]
pub enum EnumerateError {
    Vulkan(vk::Result),
    Utf8(std::str::Utf8Error),
}

impl From<vk::Result> for EnumerateError {
    fn from(result: vk::Result) -> Self {
        EnumerateError::Vulkan(result)
    }
}

impl From<std::str::Utf8Error> for EnumerateError {
    fn from(err: std::str::Utf8Error) -> Self {
        EnumerateError::Utf8(err)
    }
}

#[derive(Clone, Debug)]
pub struct ExtensionProperties {
    c_name: CString,
    name: String,
    version: u32,
}

impl ExtensionProperties {
    pub fn new(src: &vk::ExtensionProperties) -> Result<Self, std::str::Utf8Error> {
        let c_name = CString::from(unsafe { CStr::from_ptr(src.extension_name.as_ptr()) });
        let name = String::from(c_name.to_str()?);

        Ok(Self {
            c_name,
            name,
            version: src.spec_version,
        })
    }

    pub fn get_c_name(&self) -> &CString {
        &self.c_name
    }

    pub fn get_name(&self) -> &String {
        &self.name
    }

    pub fn get_version(&self) -> u32 {
        self.version
    }
}

#[derive(Clone, Debug)]
pub struct LayerProperties {
    c_name: CString,
    name: String,
    description: String,
    spec_version: VulkanVersion,
    implementation_version: u32,
}

impl LayerProperties {
    pub fn new(src: &vk::LayerProperties) -> Result<Self, std::str::Utf8Error> {
        let c_name = CString::from(unsafe { CStr::from_ptr(src.layer_name.as_ptr()) });
        let name = String::from(c_name.to_str()?);

        let description = String::from(unsafe { CStr::from_ptr(src.description.as_ptr()) }.to_str()?);

        Ok(Self {
            c_name,
            name,
            description,
            spec_version: VulkanVersion::from_raw(src.spec_version),
            implementation_version: src.implementation_version,
        })
    }

    pub fn get_c_name(&self) -> &CString {
        &self.c_name
    }

    pub fn get_name(&self) -> &String {
        &self.name
    }

    pub fn get_description(&self) -> &String {
        &self.description
    }

    pub fn get_spec_version(&self) -> VulkanVersion {
        self.spec_version
    }

    pub fn get_implementation_version(&self) -> u32 {
        self.implementation_version
    }
}

pub fn instance_extensions(entry: &ash::Entry) -> Result<Vec<ExtensionProperties>, EnumerateError> {
    let raw = entry.enumerate_instance_extension_properties(None)?;
    let mut extensions = Vec::with_capacity(raw.len());
    for extension in &raw {
        extensions.push(ExtensionProperties::new(extension)?);
    }
    Ok(extensions)
}

pub fn instance_layers(entry: &ash::Entry) -> Result<Vec<LayerProperties>, EnumerateError> {
    let raw = entry.enumerate_instance_layer_properties()?;
    let mut layers = Vec::with_capacity(raw.len());
    for layer in &raw {
        layers.push(LayerProperties::new(layer)?);
    }
    Ok(layers)
}

pub fn physical_devices(instance: &InstanceContext) -> Result<Vec<vk::PhysicalDevice>, EnumerateError> {
    Ok(unsafe { instance.vk().enumerate_physical_devices() }?)
}

pub fn device_extensions(
    instance: &InstanceContext,
    physical_device: vk::PhysicalDevice,
) -> Result<Vec<ExtensionProperties>, EnumerateError> {
    let raw = unsafe { instance.vk().enumerate_device_extension_properties(physical_device) }?;
    let mut extensions = Vec::with_capacity(raw.len());
    for extension in &raw {
        extensions.push(ExtensionProperties::new(extension)?);
    }
    Ok(extensions)
}

pub fn device_layers(
    instance: &InstanceContext,
    physical_device: vk::PhysicalDevice,
) -> Result<Vec<LayerProperties>, EnumerateError> {
    let raw = unsafe { instance.vk().enumerate_device_layer_properties(physical_device) }?;
    let mut layers = Vec::with_capacity(raw.len());
    for layer in &raw {
        layers.push(LayerProperties::new(layer)?);
    }
    Ok(layers)
}
