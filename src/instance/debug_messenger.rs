//! Debug channel wiring.
//!
//! Only attached on debug configurations. Runtime validation messages are
//! forwarded to the logging collaborator under the `validation_layer` target
//! and the callback never requests abortion of the triggering call.

use std::ffi::CStr;
use std::os::raw::c_void;

use ash::extensions::ext::DebugUtils;
use ash::prelude::VkResult;
use ash::vk;

use crate::targets;

/// Owns the debug utils messenger attached to the instance.
///
/// Dropped before the instance it was created against.
pub struct DebugChannel {
    debug_utils: DebugUtils,
    messenger: vk::DebugUtilsMessengerEXT,
}

impl DebugChannel {
    /// Attaches the diagnostic callback to the instance.
    ///
    /// The callback is filtered to all four severities and all three message
    /// categories.
    pub fn attach(entry: &ash::Entry, instance: &ash::Instance) -> VkResult<Self> {
        let debug_utils = DebugUtils::new(entry, instance);

        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                    | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
            )
            .pfn_user_callback(Some(validation_layer_callback));

        let messenger = unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }?;

        log::debug!(target: targets::VALIDATION, "Debug channel attached");

        Ok(Self {
            debug_utils,
            messenger,
        })
    }
}

impl Drop for DebugChannel {
    fn drop(&mut self) {
        unsafe {
            self.debug_utils.destroy_debug_utils_messenger(self.messenger, None);
        }
    }
}

extern "system" fn validation_layer_callback(
    _message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_types: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut c_void,
) -> vk::Bool32 {
    // This is called by c code so we must catch any panics
    std::panic::catch_unwind(|| {
        if let Some(data) = unsafe { p_callback_data.as_ref() } {
            let message = unsafe { CStr::from_ptr(data.p_message) };
            log::warn!(target: targets::VALIDATION, "{:?}", message);
        } else {
            log::warn!(target: targets::VALIDATION, "Validation callback invoked with null data");
        }
    })
    .unwrap_or_else(|_| {
        log::error!(target: targets::VALIDATION, "Validation callback panicked! Aborting...");
        std::process::exit(1);
    });

    vk::FALSE
}
