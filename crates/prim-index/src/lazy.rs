//! Build-once storage for spatial indices.

use std::sync::OnceLock;

use tracing::debug_span;

/// A spatial index that is built on first use and never rebuilt.
///
/// Concurrent first callers block until the single build finishes; every
/// later access is a lock-free read of the finished index.
#[derive(Debug, Clone)]
pub struct LazyIndex<T> {
    cell: OnceLock<T>,
}

impl<T> LazyIndex<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Return the index, running `build` first if no index exists yet.
    ///
    /// `build` runs at most once over the lifetime of this value.
    pub fn get_or_build<F>(&self, build: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.cell.get_or_init(|| {
            let _span = debug_span!("lazy_index_build").entered();
            build()
        })
    }

    pub fn is_built(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> Default for LazyIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}
