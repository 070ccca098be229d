//! Generic identifier keyed resource cache.
//!
//! One cache exists per asset category. The cache deduplicates loads: an
//! identifier maps to at most one entry and ownership of the loaded value is
//! shared between the cache and every consumer holding a handle from a
//! lookup. `clear` only drops the cache's own reference, a consumer that
//! still holds a handle keeps the value alive.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ash::vk;

use crate::targets;

#[derive(Debug)]
pub enum ResourceError {
    /// The identifier does not resolve to a source in the index
    NotIndexed(String),
    /// The source could not be read
    Io(std::io::Error),
    /// The source was read but could not be parsed
    Decode(String),
    /// A vulkan error while creating the resource
    Vulkan(vk::Result),
    /// The resource requires a device and none is attached
    NoDevice,
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err)
    }
}

impl From<vk::Result> for ResourceError {
    fn from(result: vk::Result) -> Self {
        ResourceError::Vulkan(result)
    }
}

/// Category specific load procedure.
pub trait ResourceLoader {
    type Resource;

    fn load(&self, identifier: &str, path: &Path) -> Result<Self::Resource, ResourceError>;
}

/// Identifier to source mapping built by `identify`.
///
/// Identifiers are the paths of the asset files relative to the indexed root,
/// with `/` separators. Rebuilding replaces the previous mapping wholesale so
/// repeated calls are idempotent and safe for hot reload.
pub(crate) struct SourceIndex {
    paths: Mutex<HashMap<String, PathBuf>>,
}

impl SourceIndex {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            paths: Mutex::new(HashMap::new()),
        })
    }

    pub fn rebuild(&self, root: &Path) -> std::io::Result<usize> {
        let mut paths = HashMap::new();
        collect_sources(root, root, &mut paths)?;
        let count = paths.len();

        *self.paths.lock().unwrap() = paths;

        log::debug!(target: targets::RESOURCES, "Indexed {} asset sources under {:?}", count, root);
        Ok(count)
    }

    pub fn resolve(&self, identifier: &str) -> Option<PathBuf> {
        self.paths.lock().unwrap().get(identifier).cloned()
    }

    pub fn len(&self) -> usize {
        self.paths.lock().unwrap().len()
    }
}

fn collect_sources(
    root: &Path,
    dir: &Path,
    paths: &mut HashMap<String, PathBuf>,
) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_sources(root, &path, paths)?;
        } else {
            let relative = path.strip_prefix(root).unwrap_or(&path);
            let identifier = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            paths.insert(identifier, path);
        }
    }
    Ok(())
}

pub struct ResourceCache<L: ResourceLoader> {
    loader: L,
    index: Arc<SourceIndex>,
    // At most one entry exists per identifier, the map key is the identifier
    // the value was loaded under.
    entries: Mutex<HashMap<String, Arc<L::Resource>>>,
}

impl<L: ResourceLoader> ResourceCache<L> {
    pub(crate) fn new(loader: L, index: Arc<SourceIndex>) -> Self {
        Self {
            loader,
            index,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached handle for `identifier`, loading it on a miss.
    ///
    /// The entry lock is held across the load so that concurrent misses on
    /// the same identifier resolve to a single completed load.
    pub fn get(&self, identifier: &str) -> Result<Arc<L::Resource>, ResourceError> {
        let mut entries = self.entries.lock().unwrap();

        if let Some(entry) = entries.get(identifier) {
            return Ok(entry.clone());
        }

        let path = self
            .index
            .resolve(identifier)
            .ok_or_else(|| ResourceError::NotIndexed(identifier.to_string()))?;

        let resource = Arc::new(self.loader.load(identifier, &path)?);
        entries.insert(identifier.to_string(), resource.clone());

        log::debug!(target: targets::RESOURCES, "Loaded resource {:?}", identifier);

        Ok(resource)
    }

    /// Soft variant of [`get`](Self::get): a missing or unparsable source
    /// yields `None` instead of an error. Nothing is inserted on failure.
    pub fn try_get(&self, identifier: &str) -> Option<Arc<L::Resource>> {
        match self.get(identifier) {
            Ok(resource) => Some(resource),
            Err(err) => {
                log::debug!(
                    target: targets::RESOURCES,
                    "Resource {:?} unavailable: {:?}",
                    identifier,
                    err
                );
                None
            }
        }
    }

    /// Drops the cache's own reference to every entry. Entries still
    /// referenced by consumers stay alive until their last holder releases
    /// them.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn is_cached(&self, identifier: &str) -> bool {
        self.entries.lock().unwrap().contains_key(identifier)
    }

    pub fn cached_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TextLoader {
        loads: AtomicUsize,
    }

    impl TextLoader {
        fn new() -> Self {
            Self {
                loads: AtomicUsize::new(0),
            }
        }
    }

    impl ResourceLoader for TextLoader {
        type Resource = String;

        fn load(&self, _identifier: &str, path: &Path) -> Result<String, ResourceError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(std::fs::read_to_string(path)?)
        }
    }

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ember-cache-test-{:016x}", rand::random::<u64>()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn make_cache(root: &Path) -> ResourceCache<TextLoader> {
        let index = SourceIndex::new();
        index.rebuild(root).unwrap();
        ResourceCache::new(TextLoader::new(), index)
    }

    #[test]
    fn repeated_get_returns_same_object() {
        let root = scratch_dir();
        std::fs::write(root.join("hello.txt"), "hello").unwrap();
        let cache = make_cache(&root);

        let a = cache.get("hello.txt").unwrap();
        let b = cache.get("hello.txt").unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.loader.loads.load(Ordering::SeqCst), 1);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn missing_identifier_does_not_insert_phantom_entry() {
        let root = scratch_dir();
        let cache = make_cache(&root);

        assert!(cache.try_get("missing.txt").is_none());
        assert!(!cache.is_cached("missing.txt"));
        assert_eq!(cache.cached_count(), 0);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn clear_reloads_but_keeps_live_handles_valid() {
        let root = scratch_dir();
        std::fs::write(root.join("hello.txt"), "hello").unwrap();
        let cache = make_cache(&root);

        let before = cache.get("hello.txt").unwrap();
        cache.clear();
        assert!(!cache.is_cached("hello.txt"));

        // Handle obtained before the clear stays usable.
        assert_eq!(before.as_str(), "hello");

        let after = cache.get("hello.txt").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(cache.loader.loads.load(Ordering::SeqCst), 2);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn index_uses_relative_paths_with_forward_slashes() {
        let root = scratch_dir();
        std::fs::create_dir_all(root.join("shaders")).unwrap();
        std::fs::write(root.join("shaders").join("triangle.vert"), "v").unwrap();
        let cache = make_cache(&root);

        assert!(cache.get("shaders/triangle.vert").is_ok());

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn rebuild_is_idempotent() {
        let root = scratch_dir();
        std::fs::write(root.join("hello.txt"), "hello").unwrap();

        let index = SourceIndex::new();
        index.rebuild(&root).unwrap();
        let first = index.len();
        index.rebuild(&root).unwrap();

        assert_eq!(index.len(), first);
        assert!(index.resolve("hello.txt").is_some());

        std::fs::remove_dir_all(&root).unwrap();
    }
}
