//! Rating stores the reseeder reads from and writes to.
//!
//! The reseeder is handed a `RatingStore` for the duration of one sweep:
//!
//! - `find` returns an `EntityCursor` that owns its data, so the caller can
//!   keep issuing `update`s while it iterates
//! - `update` persists one entity's new rating
//! - `flush` makes buffered updates durable (no-op for stores that write through)
//!
//! Implementations:
//!
//! - `MemoryStore`: in-process collection, with update failure injection
//! - `FileStore`: JSON/CSV puzzle files, rewritten on `flush`

use std::fmt;

use crate::domain::{PuzzleId, RatedEntity, RatingFilter, RatingUpdate};
use crate::error::AppError;

pub mod collection;
pub mod file;
pub mod memory;

pub use collection::Collection;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Lazy sequence of matched entities.
pub struct EntityCursor {
    inner: Box<dyn Iterator<Item = Result<RatedEntity, AppError>>>,
}

impl EntityCursor {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<RatedEntity, AppError>> + 'static,
    {
        Self { inner: Box::new(iter) }
    }

    pub fn from_entities(entities: Vec<RatedEntity>) -> Self {
        Self::new(entities.into_iter().map(Ok))
    }
}

impl Iterator for EntityCursor {
    type Item = Result<RatedEntity, AppError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl fmt::Debug for EntityCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCursor").finish_non_exhaustive()
    }
}

pub trait RatingStore {
    /// All entities matching `filter`, in unspecified order.
    fn find(&self, filter: &RatingFilter) -> Result<EntityCursor, AppError>;

    /// Write `update` to the entity `id`, leaving its other fields alone.
    fn update(&mut self, id: &PuzzleId, update: &RatingUpdate) -> Result<(), AppError>;

    fn flush(&mut self) -> Result<(), AppError> {
        Ok(())
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current rating of every entity.
    fn ratings(&self) -> Vec<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_yields_in_order() {
        let cursor = EntityCursor::from_entities(vec![
            RatedEntity::new("a", 1500.0),
            RatedEntity::new("b", 1500.0),
        ]);
        let ids: Vec<String> = cursor.map(|e| e.unwrap().id.to_string()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn cursor_passes_errors_through() {
        let mut cursor = EntityCursor::new(
            vec![
                Ok(RatedEntity::new("a", 1500.0)),
                Err(AppError::persistence("cursor lost")),
            ]
            .into_iter(),
        );
        assert!(cursor.next().unwrap().is_ok());
        assert!(cursor.next().unwrap().is_err());
        assert!(cursor.next().is_none());
    }
}
