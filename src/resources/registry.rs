//! Process wide resource registry.
//!
//! Owns one cache per asset category behind fixed, typed accessors. The
//! shared generic cache keeps the lookup semantics identical across
//! categories while a texture lookup can never return a font.

use std::path::Path;
use std::sync::{Arc, Condvar, Mutex};

use lazy_static::lazy_static;

use crate::device::device::DeviceContext;
use crate::resources::cache::{ResourceCache, ResourceError, ResourceLoader, SourceIndex};
use crate::resources::shader::{DeviceSlot, ShaderStage, TypedShaderLoader};
use crate::targets;

/// A decoded texture, CPU side. Image upload belongs to the renderer.
#[derive(Debug)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub color_type: png::ColorType,
    pub bit_depth: png::BitDepth,
    pub pixels: Vec<u8>,
}

/// An undecoded font blob. Rasterization belongs to the text subsystem.
#[derive(Debug)]
pub struct FontData {
    pub bytes: Vec<u8>,
}

/// An arbitrary file backed resource.
#[derive(Debug)]
pub struct FileData {
    pub bytes: Vec<u8>,
}

pub struct TextureLoader;

impl ResourceLoader for TextureLoader {
    type Resource = TextureData;

    fn load(&self, _identifier: &str, path: &Path) -> Result<TextureData, ResourceError> {
        let decoder = png::Decoder::new(std::fs::File::open(path)?);
        let mut reader = decoder
            .read_info()
            .map_err(|err| ResourceError::Decode(err.to_string()))?;

        let mut pixels = vec![0u8; reader.output_buffer_size()];
        let info = reader
            .next_frame(&mut pixels)
            .map_err(|err| ResourceError::Decode(err.to_string()))?;
        pixels.truncate(info.buffer_size());

        Ok(TextureData {
            width: info.width,
            height: info.height,
            color_type: info.color_type,
            bit_depth: info.bit_depth,
            pixels,
        })
    }
}

pub struct FontLoader;

impl ResourceLoader for FontLoader {
    type Resource = FontData;

    fn load(&self, _identifier: &str, path: &Path) -> Result<FontData, ResourceError> {
        Ok(FontData {
            bytes: std::fs::read(path)?,
        })
    }
}

pub struct FileLoader;

impl ResourceLoader for FileLoader {
    type Resource = FileData;

    fn load(&self, _identifier: &str, path: &Path) -> Result<FileData, ResourceError> {
        Ok(FileData {
            bytes: std::fs::read(path)?,
        })
    }
}

/// Tracks in flight asynchronous loads so the bootstrap can quiesce them.
struct AsyncLoadTracker {
    active: Mutex<usize>,
    idle: Condvar,
}

impl AsyncLoadTracker {
    fn new() -> Self {
        Self {
            active: Mutex::new(0),
            idle: Condvar::new(),
        }
    }

    fn begin(&self) {
        *self.active.lock().unwrap() += 1;
    }

    fn end(&self) {
        let mut active = self.active.lock().unwrap();
        *active -= 1;
        if *active == 0 {
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self) {
        let mut active = self.active.lock().unwrap();
        while *active != 0 {
            active = self.idle.wait(active).unwrap();
        }
    }
}

/// Marks one asynchronous load as in flight for the duration of its scope.
pub struct AsyncLoadGuard<'a> {
    tracker: &'a AsyncLoadTracker,
}

impl<'a> Drop for AsyncLoadGuard<'a> {
    fn drop(&mut self) {
        self.tracker.end();
    }
}

pub struct ResourceRegistry {
    index: Arc<SourceIndex>,
    device: Arc<DeviceSlot>,
    tracker: AsyncLoadTracker,
    textures: ResourceCache<TextureLoader>,
    fonts: ResourceCache<FontLoader>,
    files: ResourceCache<FileLoader>,
    vertex_shaders: TypedShaderLoader,
    fragment_shaders: TypedShaderLoader,
    tesselation_control_shaders: TypedShaderLoader,
    tesselation_evaluation_shaders: TypedShaderLoader,
    geometry_shaders: TypedShaderLoader,
    compute_shaders: TypedShaderLoader,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        let index = SourceIndex::new();
        let device: Arc<DeviceSlot> = Arc::new(Mutex::new(None));

        let shader_loader =
            |stage| TypedShaderLoader::new(stage, index.clone(), device.clone());
        let vertex_shaders = shader_loader(ShaderStage::Vertex);
        let fragment_shaders = shader_loader(ShaderStage::Fragment);
        let tesselation_control_shaders = shader_loader(ShaderStage::TesselationControl);
        let tesselation_evaluation_shaders = shader_loader(ShaderStage::TesselationEvaluation);
        let geometry_shaders = shader_loader(ShaderStage::Geometry);
        let compute_shaders = shader_loader(ShaderStage::Compute);

        Self {
            textures: ResourceCache::new(TextureLoader, index.clone()),
            fonts: ResourceCache::new(FontLoader, index.clone()),
            files: ResourceCache::new(FileLoader, index.clone()),
            vertex_shaders,
            fragment_shaders,
            tesselation_control_shaders,
            tesselation_evaluation_shaders,
            geometry_shaders,
            compute_shaders,
            index,
            device,
            tracker: AsyncLoadTracker::new(),
        }
    }

    /// (Re)indexes the asset directory. Identifiers are paths relative to
    /// `root` with `/` separators. Safe to call repeatedly, e.g. on asset hot
    /// reload.
    pub fn identify(&self, root: &Path) -> std::io::Result<usize> {
        self.index.rebuild(root)
    }

    /// Drops every cache's own reference to every entry. Handles held by
    /// consumers stay valid until released.
    pub fn clear(&self) {
        self.textures.clear();
        self.fonts.clear();
        self.files.clear();
        self.vertex_shaders.clear();
        self.fragment_shaders.clear();
        self.tesselation_control_shaders.clear();
        self.tesselation_evaluation_shaders.clear();
        self.geometry_shaders.clear();
        self.compute_shaders.clear();

        log::debug!(target: targets::RESOURCES, "Resource registry cleared");
    }

    /// Hands the shader caches the device they create modules against.
    pub fn attach_device(&self, device: Arc<DeviceContext>) {
        *self.device.lock().unwrap() = Some(device);
    }

    pub fn textures(&self) -> &ResourceCache<TextureLoader> {
        &self.textures
    }

    pub fn fonts(&self) -> &ResourceCache<FontLoader> {
        &self.fonts
    }

    pub fn files(&self) -> &ResourceCache<FileLoader> {
        &self.files
    }

    pub fn vertex_shaders(&self) -> &TypedShaderLoader {
        &self.vertex_shaders
    }

    pub fn fragment_shaders(&self) -> &TypedShaderLoader {
        &self.fragment_shaders
    }

    pub fn tesselation_control_shaders(&self) -> &TypedShaderLoader {
        &self.tesselation_control_shaders
    }

    pub fn tesselation_evaluation_shaders(&self) -> &TypedShaderLoader {
        &self.tesselation_evaluation_shaders
    }

    pub fn geometry_shaders(&self) -> &TypedShaderLoader {
        &self.geometry_shaders
    }

    pub fn compute_shaders(&self) -> &TypedShaderLoader {
        &self.compute_shaders
    }

    /// Marks an asynchronous load as in flight. Background loading subsystems
    /// hold the guard for the duration of their work.
    pub fn begin_async_load(&self) -> AsyncLoadGuard<'_> {
        self.tracker.begin();
        AsyncLoadGuard {
            tracker: &self.tracker,
        }
    }

    /// Blocks until no asynchronous load is in flight.
    pub fn wait_idle(&self) {
        self.tracker.wait_idle();
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    static ref GLOBAL_REGISTRY: ResourceRegistry = ResourceRegistry::new();
}

/// The process wide registry. Tests construct their own
/// [`ResourceRegistry`] instead of sharing this one.
pub fn global() -> &'static ResourceRegistry {
    &GLOBAL_REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ember-registry-test-{:016x}", rand::random::<u64>()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_test_png(path: &Path) {
        let file = std::fs::File::create(path).unwrap();
        let mut encoder = png::Encoder::new(file, 2, 2);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[0u8; 16]).unwrap();
    }

    #[test]
    fn categories_are_distinct() {
        let root = scratch_dir();
        write_test_png(&root.join("white.png"));
        std::fs::write(root.join("mono.ttf"), b"not a real font").unwrap();

        let registry = ResourceRegistry::new();
        registry.identify(&root).unwrap();

        let texture = registry.textures().get("white.png").unwrap();
        assert_eq!((texture.width, texture.height), (2, 2));
        assert_eq!(texture.pixels.len(), 16);

        let font = registry.fonts().get("mono.ttf").unwrap();
        assert_eq!(font.bytes, b"not a real font");

        // The same identifier resolves independently per category.
        let file = registry.files().get("mono.ttf").unwrap();
        assert_eq!(file.bytes, b"not a real font");

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn unresolvable_identifier_misses_every_category() {
        let registry = ResourceRegistry::new();

        assert!(registry.textures().try_get("nope.png").is_none());
        assert!(registry.fonts().try_get("nope.ttf").is_none());
        assert!(registry.files().try_get("nope.bin").is_none());
        assert!(!registry.compute_shaders().try_get("missing.comp").is_valid());
    }

    #[test]
    fn clear_drops_cache_references() {
        let root = scratch_dir();
        std::fs::write(root.join("data.bin"), b"payload").unwrap();

        let registry = ResourceRegistry::new();
        registry.identify(&root).unwrap();

        let held = registry.files().get("data.bin").unwrap();
        registry.clear();

        assert!(!registry.files().is_cached("data.bin"));
        assert_eq!(held.bytes, b"payload");

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn six_stage_loaders_carry_their_stage() {
        let registry = ResourceRegistry::new();

        assert_eq!(registry.vertex_shaders().stage(), ShaderStage::Vertex);
        assert_eq!(registry.fragment_shaders().stage(), ShaderStage::Fragment);
        assert_eq!(
            registry.tesselation_control_shaders().stage(),
            ShaderStage::TesselationControl
        );
        assert_eq!(
            registry.tesselation_evaluation_shaders().stage(),
            ShaderStage::TesselationEvaluation
        );
        assert_eq!(registry.geometry_shaders().stage(), ShaderStage::Geometry);
        assert_eq!(registry.compute_shaders().stage(), ShaderStage::Compute);
    }

    #[test]
    fn wait_idle_blocks_until_async_loads_finish() {
        let registry = ResourceRegistry::new();

        std::thread::scope(|scope| {
            let guard = registry.begin_async_load();
            scope.spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(20));
                drop(guard);
            });

            registry.wait_idle();
        });

        // Counter back to zero, a second wait returns immediately.
        registry.wait_idle();
    }
}
