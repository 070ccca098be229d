pub mod cache;
pub mod registry;
pub mod shader;

pub use cache::{ResourceCache, ResourceError, ResourceLoader};
pub use registry::ResourceRegistry;
pub use shader::{LoadedShader, ShaderStage, TypedShaderLoader};
