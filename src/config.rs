//! Configuration inputs consumed by the bootstrap sequence.
//!
//! All values are sourced from the external configuration collaborator before
//! the bootstrap runs and are read-only afterwards.

use std::ffi::{CStr, CString};

use ash::vk;

#[derive(Debug)]
pub struct GraphicsConfig {
    application_name: CString,
    version_major: u32,
    version_minor: u32,
    version_patch: u32,
    instance_extensions: Vec<CString>,
    instance_layers: Vec<CString>,
    device_extensions: Vec<CString>,
    device_layers: Vec<CString>,
    enable_validation: bool,
}

impl GraphicsConfig {
    pub fn new(application_name: CString, major: u32, minor: u32, patch: u32) -> Self {
        Self {
            application_name,
            version_major: major,
            version_minor: minor,
            version_patch: patch,
            instance_extensions: Vec::new(),
            instance_layers: Vec::new(),
            device_extensions: Vec::new(),
            device_layers: Vec::new(),
            enable_validation: cfg!(debug_assertions),
        }
    }

    pub fn add_instance_extension(&mut self, extension: &CStr) {
        self.instance_extensions.push(CString::from(extension));
    }

    pub fn add_instance_layer(&mut self, layer: &CStr) {
        self.instance_layers.push(CString::from(layer));
    }

    pub fn add_device_extension(&mut self, extension: &CStr) {
        self.device_extensions.push(CString::from(extension));
    }

    pub fn add_device_layer(&mut self, layer: &CStr) {
        self.device_layers.push(CString::from(layer));
    }

    pub fn enable_validation(&mut self) {
        self.enable_validation = true;
    }

    pub fn disable_validation(&mut self) {
        self.enable_validation = false;
    }

    pub fn application_name(&self) -> &CStr {
        self.application_name.as_c_str()
    }

    pub fn application_version(&self) -> u32 {
        vk::make_api_version(0, self.version_major, self.version_minor, self.version_patch)
    }

    pub fn instance_extensions(&self) -> &[CString] {
        self.instance_extensions.as_slice()
    }

    pub fn instance_layers(&self) -> &[CString] {
        self.instance_layers.as_slice()
    }

    pub fn device_extensions(&self) -> &[CString] {
        self.device_extensions.as_slice()
    }

    pub fn device_layers(&self) -> &[CString] {
        self.device_layers.as_slice()
    }

    pub fn validation_enabled(&self) -> bool {
        self.enable_validation
    }
}
