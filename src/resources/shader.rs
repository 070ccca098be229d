//! Stage typed shader loading.
//!
//! Every pipeline stage has its own loader over its own cache, so a lookup
//! always yields a module intended for exactly that stage. The stage is fixed
//! when the loader is constructed and never inferred from the source.

use std::path::Path;
use std::sync::{Arc, Mutex};

use ash::vk;

use crate::device::device::DeviceContext;
use crate::resources::cache::{ResourceCache, ResourceError, ResourceLoader};

/// Discriminator selecting which pipeline stage a loader targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    TesselationControl,
    TesselationEvaluation,
    Geometry,
    Compute,
}

impl ShaderStage {
    pub const ALL: [ShaderStage; 6] = [
        ShaderStage::Vertex,
        ShaderStage::Fragment,
        ShaderStage::TesselationControl,
        ShaderStage::TesselationEvaluation,
        ShaderStage::Geometry,
        ShaderStage::Compute,
    ];

    pub fn to_vk(self) -> vk::ShaderStageFlags {
        match self {
            ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
            ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
            ShaderStage::TesselationControl => vk::ShaderStageFlags::TESSELLATION_CONTROL,
            ShaderStage::TesselationEvaluation => vk::ShaderStageFlags::TESSELLATION_EVALUATION,
            ShaderStage::Geometry => vk::ShaderStageFlags::GEOMETRY,
            ShaderStage::Compute => vk::ShaderStageFlags::COMPUTE,
        }
    }
}

/// Slot for the device shader modules are created against.
///
/// Filled by the bootstrap once the device exists. Shader lookups before that
/// point soft-fail.
pub(crate) type DeviceSlot = Mutex<Option<Arc<DeviceContext>>>;

/// A shader module owned by the cache and its consumers.
///
/// The module is destroyed when the last shared reference is released.
pub struct ShaderResource {
    device: Arc<DeviceContext>,
    module: vk::ShaderModule,
    stage: ShaderStage,
}

impl ShaderResource {
    pub fn module(&self) -> vk::ShaderModule {
        self.module
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl Drop for ShaderResource {
    fn drop(&mut self) {
        unsafe {
            self.device.vk().destroy_shader_module(self.module, None);
        }
    }
}

/// A stage tagged lookup result.
///
/// An empty value (null module) is the sentinel for a source that does not
/// exist or could not be turned into a module.
#[derive(Clone)]
pub struct LoadedShader {
    resource: Option<Arc<ShaderResource>>,
    stage: ShaderStage,
}

impl LoadedShader {
    pub fn empty(stage: ShaderStage) -> Self {
        Self {
            resource: None,
            stage,
        }
    }

    fn from_resource(resource: Arc<ShaderResource>) -> Self {
        let stage = resource.stage();
        Self {
            resource: Some(resource),
            stage,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.resource.is_some()
    }

    pub fn module(&self) -> vk::ShaderModule {
        match &self.resource {
            Some(resource) => resource.module(),
            None => vk::ShaderModule::null(),
        }
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

/// Load procedure for one stage: read SPIR-V words from the source and create
/// a module against the attached device.
pub(crate) struct ShaderModuleLoader {
    stage: ShaderStage,
    device: Arc<DeviceSlot>,
}

impl ResourceLoader for ShaderModuleLoader {
    type Resource = ShaderResource;

    fn load(&self, _identifier: &str, path: &Path) -> Result<ShaderResource, ResourceError> {
        let device = self
            .device
            .lock()
            .unwrap()
            .clone()
            .ok_or(ResourceError::NoDevice)?;

        let mut file = std::fs::File::open(path)?;
        let words = ash::util::read_spv(&mut file)?;

        let create_info = vk::ShaderModuleCreateInfo::builder().code(words.as_slice());
        let module = unsafe { device.vk().create_shader_module(&create_info, None) }?;

        Ok(ShaderResource {
            device,
            module,
            stage: self.stage,
        })
    }
}

/// Lookup facade for one of the six pipeline stages.
pub struct TypedShaderLoader {
    stage: ShaderStage,
    cache: ResourceCache<ShaderModuleLoader>,
}

impl TypedShaderLoader {
    pub(crate) fn new(
        stage: ShaderStage,
        index: Arc<crate::resources::cache::SourceIndex>,
        device: Arc<DeviceSlot>,
    ) -> Self {
        Self {
            stage,
            cache: ResourceCache::new(ShaderModuleLoader { stage, device }, index),
        }
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn get(&self, identifier: &str) -> Result<LoadedShader, ResourceError> {
        self.cache.get(identifier).map(LoadedShader::from_resource)
    }

    /// Returns the empty sentinel when the source is missing or fails to
    /// produce a module.
    pub fn try_get(&self, identifier: &str) -> LoadedShader {
        match self.cache.try_get(identifier) {
            Some(resource) => LoadedShader::from_resource(resource),
            None => LoadedShader::empty(self.stage),
        }
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}
