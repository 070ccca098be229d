use std::ffi::CString;
use std::path::PathBuf;

use ember_core::bootstrap::{BootstrapError, DeviceBootstrap};
use ember_core::config::GraphicsConfig;
use ember_core::platform::HeadlessPlatform;
use ember_core::resources::registry::ResourceRegistry;
use ember_core::resources::shader::ShaderStage;

fn test_config() -> GraphicsConfig {
    let mut config = GraphicsConfig::new(CString::new("Ember Tests").unwrap(), 0, 1, 0);
    // Headless CI machines usually do not ship the validation layer.
    config.disable_validation();
    config
}

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ember-headless-{}", rand::random::<u64>()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// A hand assembled vertex shader with an empty `main`:
/// header, `OpCapability Shader`, `OpMemoryModel Logical GLSL450`,
/// `OpEntryPoint Vertex %4 "main"` and the `void()` function body.
fn minimal_vertex_spv() -> Vec<u8> {
    let words: [u32; 29] = [
        0x0723_0203, // magic
        0x0001_0000, // SPIR-V 1.0
        0x0000_0000, // generator
        0x0000_0006, // id bound
        0x0000_0000, // schema
        0x0002_0011, 0x0000_0001, // OpCapability Shader
        0x0003_000E, 0x0000_0000, 0x0000_0001, // OpMemoryModel Logical GLSL450
        0x0005_000F, 0x0000_0000, 0x0000_0004, 0x6E69_616D, 0x0000_0000, // OpEntryPoint Vertex %4 "main"
        0x0002_0013, 0x0000_0002, // %2 = OpTypeVoid
        0x0003_0021, 0x0000_0003, 0x0000_0002, // %3 = OpTypeFunction %2
        0x0005_0036, 0x0000_0002, 0x0000_0004, 0x0000_0000, 0x0000_0003, // %4 = OpFunction %2 None %3
        0x0002_00F8, 0x0000_0005, // %5 = OpLabel
        0x0001_00FD, // OpReturn
        0x0001_0038, // OpFunctionEnd
    ];
    words.iter().flat_map(|word| word.to_le_bytes()).collect()
}

#[test]
fn headless_bootstrap() {
    let _ = env_logger::builder().is_test(true).try_init();

    let registry = ResourceRegistry::new();
    let bootstrap = DeviceBootstrap::new(test_config(), Box::new(HeadlessPlatform));

    let context = match bootstrap.run(&registry) {
        Ok(context) => context,
        Err(BootstrapError::Platform(err)) => {
            eprintln!("No vulkan runtime available, skipping: {:?}", err);
            return;
        }
        Err(BootstrapError::Instance(err)) => {
            eprintln!("No usable vulkan driver available, skipping: {:?}", err);
            return;
        }
        Err(err) => panic!("Failed to bootstrap graphics device: {:?}", err),
    };

    // The instance is valid either way. A missing device is the documented
    // NoDevice outcome on machines without a graphics device.
    let _ = context.instance();
    if !context.has_device() {
        assert!(context.device().is_none());
        return;
    }

    // With a device attached, shader lookups for missing sources still
    // soft-fail with the stage tagged sentinel.
    let missing = registry.compute_shaders().try_get("missing.comp");
    assert!(!missing.is_valid());

    // An indexed SPIR-V source loads into a live, stage tagged module and the
    // second lookup hits the cached entry instead of recreating it.
    let root = scratch_dir();
    std::fs::write(root.join("triangle.vert"), minimal_vertex_spv()).unwrap();
    registry.identify(&root).unwrap();

    let shader = registry.vertex_shaders().get("triangle.vert").unwrap();
    assert!(shader.is_valid());
    assert_eq!(shader.stage(), ShaderStage::Vertex);
    assert_ne!(shader.module(), ash::vk::ShaderModule::null());

    let again = registry.vertex_shaders().get("triangle.vert").unwrap();
    assert_eq!(again.module(), shader.module());

    let _ = std::fs::remove_dir_all(&root);
}
