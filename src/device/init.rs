//! Physical device selection and logical device creation.
//!
//! Selection takes the first enumerated device, unconditionally. There is no
//! scoring by device type, memory size or feature completeness. This is a
//! deliberate simplicity choice and a known limitation of this layer.
//!
//! Every feature the selected device advertises is requested back verbatim as
//! the enabled feature set. No queues are created here, queue setup belongs
//! to the render scheduler outside this layer.

use std::ffi::CStr;
use std::sync::Arc;

use ash::vk;

use crate::capability::CapabilitySet;
use crate::config::GraphicsConfig;
use crate::device::device::DeviceContext;
use crate::enumerate;
use crate::enumerate::EnumerateError;
use crate::instance::instance::InstanceContext;
use crate::targets;

#[derive(Debug)]
pub enum DeviceCreateError {
    Vulkan(vk::Result),
    Utf8(std::str::Utf8Error),
}

impl From<vk::Result> for DeviceCreateError {
    fn from(result: vk::Result) -> Self {
        DeviceCreateError::Vulkan(result)
    }
}

impl From<std::str::Utf8Error> for DeviceCreateError {
    fn from(err: std::str::Utf8Error) -> Self {
        DeviceCreateError::Utf8(err)
    }
}

impl From<EnumerateError> for DeviceCreateError {
    fn from(err: EnumerateError) -> Self {
        match err {
            EnumerateError::Vulkan(result) => DeviceCreateError::Vulkan(result),
            EnumerateError::Utf8(err) => DeviceCreateError::Utf8(err),
        }
    }
}

/// Selects the physical device to create the logical device on.
///
/// Always the first enumerated device.
pub(crate) fn select_physical_device(devices: &[vk::PhysicalDevice]) -> Option<vk::PhysicalDevice> {
    devices.first().copied()
}

/// Creates the logical device.
///
/// Returns `Ok(None)` if no physical device is present. The caller keeps a
/// valid instance in that case and must treat the missing device as fatal at
/// its own layer.
pub fn create_device(
    config: &GraphicsConfig,
    instance: &Arc<InstanceContext>,
    debug: bool,
) -> Result<Option<Arc<DeviceContext>>, DeviceCreateError> {
    let devices = enumerate::physical_devices(instance)?;

    if devices.is_empty() {
        log::error!(
            target: targets::INSTANCE,
            "No physical graphics device present, the graphics context is left without a device"
        );
        return Ok(None);
    }

    for (index, device) in devices.iter().enumerate() {
        let properties = unsafe { instance.vk().get_physical_device_properties(*device) };
        let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) };
        log::info!(
            target: targets::INSTANCE,
            "Physical device {}: {:?} ({:?})",
            index,
            name,
            properties.device_type
        );
    }

    let physical_device = select_physical_device(devices.as_slice()).unwrap();

    let available_extensions = enumerate::device_extensions(instance, physical_device)?;
    for extension in &available_extensions {
        log::debug!(
            target: targets::INSTANCE,
            "Available device extension \"{}\" (version {})",
            extension.get_name(),
            extension.get_version()
        );
    }
    let available_layers = enumerate::device_layers(instance, physical_device)?;
    for layer in &available_layers {
        log::debug!(
            target: targets::INSTANCE,
            "Available device layer \"{}\" ({:?})",
            layer.get_name(),
            layer.get_spec_version()
        );
    }

    let extensions = CapabilitySet::build(&[], &[], config.device_extensions(), debug);
    let layers = CapabilitySet::build(&[], &[], config.device_layers(), debug);
    for extension in extensions.iter() {
        log::debug!(target: targets::INSTANCE, "Requesting device extension {:?}", extension);
    }
    for layer in layers.iter() {
        log::debug!(target: targets::INSTANCE, "Requesting device layer {:?}", layer);
    }

    let features = unsafe { instance.vk().get_physical_device_features(physical_device) };
    log_device_features(&features);

    let extension_ptrs = extensions.as_ptr_vec();
    let layer_ptrs = layers.as_ptr_vec();

    // The queried feature struct is passed back verbatim so everything the
    // device supports is enabled. Queue count is zero by design.
    #[allow(deprecated)]
    let create_info = vk::DeviceCreateInfo::builder()
        .enabled_extension_names(extension_ptrs.as_slice())
        .enabled_layer_names(layer_ptrs.as_slice())
        .enabled_features(&features);

    let device = unsafe { instance.vk().create_device(physical_device, &create_info, None) }?;

    log::debug!(target: targets::INSTANCE, "Device creation successful");

    Ok(Some(DeviceContext::new(instance.clone(), device, physical_device)))
}

/// Logs every advertised device feature, one flag per entry.
fn log_device_features(features: &vk::PhysicalDeviceFeatures) {
    macro_rules! log_features {
        ($($name:ident),+ $(,)?) => {
            $(
                log::debug!(
                    target: targets::INSTANCE,
                    "Device feature {}: {}",
                    stringify!($name),
                    features.$name != vk::FALSE
                );
            )+
        };
    }

    log_features!(
        robust_buffer_access,
        full_draw_index_uint32,
        image_cube_array,
        independent_blend,
        geometry_shader,
        tessellation_shader,
        sample_rate_shading,
        dual_src_blend,
        logic_op,
        multi_draw_indirect,
        draw_indirect_first_instance,
        depth_clamp,
        depth_bias_clamp,
        fill_mode_non_solid,
        depth_bounds,
        wide_lines,
        large_points,
        alpha_to_one,
        multi_viewport,
        sampler_anisotropy,
        texture_compression_etc2,
        texture_compression_astc_ldr,
        texture_compression_bc,
        occlusion_query_precise,
        pipeline_statistics_query,
        vertex_pipeline_stores_and_atomics,
        fragment_stores_and_atomics,
        shader_tessellation_and_geometry_point_size,
        shader_image_gather_extended,
        shader_storage_image_extended_formats,
        shader_storage_image_multisample,
        shader_storage_image_read_without_format,
        shader_storage_image_write_without_format,
        shader_uniform_buffer_array_dynamic_indexing,
        shader_sampled_image_array_dynamic_indexing,
        shader_storage_buffer_array_dynamic_indexing,
        shader_storage_image_array_dynamic_indexing,
        shader_clip_distance,
        shader_cull_distance,
        shader_float64,
        shader_int64,
        shader_int16,
        shader_resource_residency,
        shader_resource_min_lod,
        sparse_binding,
        sparse_residency_buffer,
        sparse_residency_image2_d,
        sparse_residency_image3_d,
        sparse_residency2_samples,
        sparse_residency4_samples,
        sparse_residency8_samples,
        sparse_residency16_samples,
        sparse_residency_aliased,
        variable_multisample_rate,
        inherited_queries,
    );
}
