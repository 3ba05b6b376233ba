pub mod disk;
pub mod memory;

use crate::core::cache::Cache;
use crate::core::rate::RateResult;
use disk::DiskCache;
use memory::MemoryCache;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const RATE_PARTITION: &str = "rates";

/// Opens the persisted rate cache under `data_path/cache`.
///
/// Falls back to a process-local cache when the store can't be opened, for
/// example when another process holds it.
pub fn open_rate_cache(data_path: Option<&Path>) -> Arc<dyn Cache<String, RateResult>> {
    let Some(path) = data_path else {
        debug!("No data path available, using in-memory rate cache");
        return Arc::new(MemoryCache::<String, RateResult>::new());
    };

    match DiskCache::<String, RateResult>::open(&path.join("cache"), RATE_PARTITION) {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            debug!("Failed to open rate cache at {}: {}", path.display(), e);
            Arc::new(MemoryCache::<String, RateResult>::new())
        }
    }
}
