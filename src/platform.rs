//! Windowing platform capability layer.
//!
//! The bootstrap does not talk to any concrete windowing system. A
//! [`PlatformProvider`] reports the instance extensions the platform mandates
//! so that a surface can later be created against the instance. Tests and
//! offscreen tooling use [`HeadlessPlatform`] which mandates nothing.

use std::ffi::CString;

use ash::vk;
use raw_window_handle::HasRawWindowHandle;

#[derive(Debug)]
pub enum PlatformError {
    /// The vulkan library could not be loaded
    Library(ash::LoadingError),
    /// A vulkan error while querying platform requirements
    Vulkan(vk::Result),
    /// A generic error with attached message
    Message(String),
}

impl From<vk::Result> for PlatformError {
    fn from(result: vk::Result) -> Self {
        PlatformError::Vulkan(result)
    }
}

pub trait PlatformProvider {
    /// Returns the instance extensions the windowing platform requires.
    fn required_instance_extensions(&self) -> Result<Vec<CString>, PlatformError>;
}

/// Platform layer backed by a window of the surrounding application.
pub struct WindowPlatform<'a> {
    window: &'a dyn HasRawWindowHandle,
}

impl<'a> WindowPlatform<'a> {
    pub fn new(window: &'a dyn HasRawWindowHandle) -> Self {
        Self { window }
    }
}

impl<'a> PlatformProvider for WindowPlatform<'a> {
    fn required_instance_extensions(&self) -> Result<Vec<CString>, PlatformError> {
        let extensions = ash_window::enumerate_required_extensions(self.window)?;
        Ok(extensions.into_iter().map(CString::from).collect())
    }
}

/// Platform layer for instances that never present to a surface.
pub struct HeadlessPlatform;

impl PlatformProvider for HeadlessPlatform {
    fn required_instance_extensions(&self) -> Result<Vec<CString>, PlatformError> {
        Ok(Vec::new())
    }
}

/// Loads the vulkan entry points. Failure here means the process has no
/// usable vulkan runtime and the bootstrap cannot proceed.
pub(crate) fn load_entry() -> Result<ash::Entry, PlatformError> {
    unsafe { ash::Entry::load() }.map_err(PlatformError::Library)
}
