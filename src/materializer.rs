use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use crate::decorator::Decorator;
use crate::driver::RawRows;
use crate::results::{Row, RowShape, normalize_columns};

/// Default bound on distinct cached shapes.
pub const DEFAULT_MAX_SIZE: usize = 500;

/// Bounded LRU mapping from column shape to compiled row accessor.
///
/// At most one accessor exists per distinct ordered column-name sequence;
/// shape equality is sequence equality, so `["id","name"]` and
/// `["name","id"]` compile separately. Decorated variants live in a second
/// LRU keyed by (shape, decorator name) so different decorators on the same
/// shape never collide, and never touch the base accessor.
pub struct MaterializerCache {
    shapes: LruCache<Vec<String>, Arc<RowShape>>,
    decorated: LruCache<(Vec<String>, String), Arc<RowShape>>,
}

impl MaterializerCache {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        let cap = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            shapes: LruCache::new(cap),
            decorated: LruCache::new(cap),
        }
    }

    /// Look up or compile the accessor for a result's column shape.
    ///
    /// A hit promotes the entry to most-recently-used; a miss compiles a new
    /// accessor and evicts the least-recently-used one past capacity.
    pub fn shape_for(&mut self, raw_columns: &[Option<String>]) -> Arc<RowShape> {
        let key = normalize_columns(raw_columns);
        if let Some(shape) = self.shapes.get(&key) {
            return Arc::clone(shape);
        }
        let shape = RowShape::new(key.clone());
        self.shapes.push(key, Arc::clone(&shape));
        shape
    }

    /// Look up or derive the decorated variant of a base accessor.
    pub fn decorated_shape(
        &mut self,
        base: &Arc<RowShape>,
        decorator: &Arc<Decorator>,
    ) -> Arc<RowShape> {
        let key = (base.columns().to_vec(), decorator.name().to_string());
        if let Some(shape) = self.decorated.get(&key) {
            return Arc::clone(shape);
        }
        let shape = RowShape::decorated(base, Arc::clone(decorator));
        self.decorated.push(key, Arc::clone(&shape));
        shape
    }

    /// Convert a raw result into an ordered collection of rows, reusing the
    /// compiled accessor for the result's shape.
    pub fn materialize<R: RawRows>(
        &mut self,
        rows: &R,
        decorator: Option<&Arc<Decorator>>,
    ) -> Vec<Row> {
        let base = self.shape_for(rows.column_names());
        let count = rows.row_count();
        if count == 0 {
            return Vec::new();
        }
        let shape = match decorator {
            Some(decorator) => self.decorated_shape(&base, decorator),
            None => base,
        };
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            out.push(shape.materialize(rows, i));
        }
        out
    }

    /// Number of cached base shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Whether a base shape is currently cached, without promoting it.
    #[must_use]
    pub fn contains(&self, columns: &[String]) -> bool {
        self.shapes.contains(&columns.to_vec())
    }
}

impl Default for MaterializerCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}
