//! In-memory store.

use std::collections::HashSet;

use crate::domain::{PuzzleId, RatedEntity, RatingFilter, RatingUpdate};
use crate::error::AppError;
use crate::store::{Collection, EntityCursor, RatingStore};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collection: Collection,
    failing: HashSet<PuzzleId>,
    updates: usize,
    flushes: usize,
}

impl MemoryStore {
    pub fn new(entities: Vec<RatedEntity>) -> Result<Self, AppError> {
        Ok(Self {
            collection: Collection::from_entities(entities)?,
            failing: HashSet::new(),
            updates: 0,
            flushes: 0,
        })
    }

    /// Make every later `update` of `id` fail with a persistence error.
    pub fn fail_updates_for(&mut self, id: impl Into<String>) {
        self.failing.insert(PuzzleId::new(id));
    }

    pub fn get(&self, id: &str) -> Option<&RatedEntity> {
        self.collection.get(&PuzzleId::new(id))
    }

    pub fn entities(&self) -> &[RatedEntity] {
        self.collection.entities()
    }

    /// Successful updates so far.
    pub fn update_count(&self) -> usize {
        self.updates
    }

    /// Calls to `flush` so far.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl RatingStore for MemoryStore {
    fn find(&self, filter: &RatingFilter) -> Result<EntityCursor, AppError> {
        Ok(self.collection.find(filter))
    }

    fn update(&mut self, id: &PuzzleId, update: &RatingUpdate) -> Result<(), AppError> {
        if self.failing.contains(id) {
            return Err(AppError::persistence(format!("Write rejected for puzzle {id}.")));
        }
        self.collection.update(id, update)?;
        self.updates += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), AppError> {
        self.flushes += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.collection.len()
    }

    fn ratings(&self) -> Vec<f64> {
        self.collection.ratings()
    }
}
