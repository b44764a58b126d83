use std::num::NonZeroUsize;

use lru::LruCache;

use crate::driver::Driver;
use crate::error::DriverError;

/// Default bound on distinct prepared statements per connection.
pub const DEFAULT_MAX_SIZE: usize = 500;

/// A server-allocated prepared statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedStatementHandle {
    name: String,
}

impl PreparedStatementHandle {
    /// The server-side statement name (`s1`, `s2`, ...).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Bounded LRU of server-side prepared statements.
///
/// Keys pair the physical connection's identity with the finalized
/// bind-style SQL text; statement handles are connection-scoped, so the
/// connection-id component prevents a handle allocated on one connection
/// from being reused on another. Evicting an entry deallocates the
/// server-side resource; deallocation failures on a dead connection are
/// ignored.
pub struct PreparedCache {
    cache: LruCache<(u64, String), PreparedStatementHandle>,
    counter: u64,
}

impl PreparedCache {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        let cap = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(cap),
            counter: 0,
        }
    }

    /// Look up or allocate the server-side statement for `sql`, returning its
    /// name. Hits promote the entry; misses prepare server-side and may evict
    /// (and deallocate) the least-recently-used statement.
    ///
    /// # Errors
    /// Propagates the driver's failure to prepare. Deallocation failures
    /// during eviction are swallowed: the evicted statement's connection may
    /// already be unusable.
    pub fn prepare_statement<D: Driver>(
        &mut self,
        driver: &mut D,
        sql: &str,
    ) -> Result<String, DriverError> {
        let key = (driver.connection_id(), sql.to_string());
        if let Some(handle) = self.cache.get(&key) {
            return Ok(handle.name.clone());
        }

        self.counter += 1;
        let name = format!("s{}", self.counter);
        driver.prepare(&name, sql)?;

        if let Some((_, evicted)) = self.cache.push(key, PreparedStatementHandle { name: name.clone() })
            && let Err(err) = driver.deallocate(&evicted.name)
        {
            tracing::debug!(
                statement = %evicted.name,
                error = %err,
                "ignoring deallocate failure for evicted prepared statement"
            );
        }
        Ok(name)
    }

    /// Drop the cached entry for `sql` and best-effort deallocate it
    /// server-side. Used when the server reports a stale statement plan.
    pub fn invalidate<D: Driver>(&mut self, driver: &mut D, sql: &str) {
        let key = (driver.connection_id(), sql.to_string());
        if let Some(handle) = self.cache.pop(&key)
            && let Err(err) = driver.deallocate(&handle.name)
        {
            tracing::debug!(
                statement = %handle.name,
                error = %err,
                "ignoring deallocate failure for invalidated prepared statement"
            );
        }
    }

    /// Number of cached statements across all connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for PreparedCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}
