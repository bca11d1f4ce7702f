use std::{collections::HashMap, sync::Arc};

mod asset_paths;
pub use asset_paths::{asset_directory, resolve_asset_path};

/// Memoizes assets under a logical name.
///
/// An entry is created at most once per name and then lives as long as the
/// cache. There is no eviction and no reload when the source changes on disk.
pub struct AssetCache<A> {
    assets: HashMap<String, Arc<A>>,
}

impl<A> Default for AssetCache<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> AssetCache<A> {
    pub fn new() -> Self {
        Self {
            assets: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<A>> {
        self.assets.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }

    /// Returns the entry stored under `name`, creating it with `create` only if
    /// the name has never been seen before.
    pub fn get_or_insert_with<F>(&mut self, name: &str, create: F) -> Arc<A>
    where
        F: FnOnce() -> A,
    {
        palmx_profiling::profile_function!();

        if let Some(asset) = self.assets.get(name) {
            return asset.clone();
        }

        let asset = Arc::new(create());
        self.assets.insert(name.to_owned(), asset.clone());
        log::trace!("Cached asset \"{}\" ({} entries)", name, self.assets.len());
        asset
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }
}
