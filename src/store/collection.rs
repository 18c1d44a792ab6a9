//! Indexed in-memory puzzle collection shared by the concrete stores.

use std::collections::HashMap;

use crate::domain::{PuzzleId, RatedEntity, RatingFilter, RatingUpdate};
use crate::error::AppError;
use crate::store::EntityCursor;

#[derive(Debug, Clone, Default)]
pub struct Collection {
    entities: Vec<RatedEntity>,
    index: HashMap<PuzzleId, usize>,
}

impl Collection {
    /// Build a collection, rejecting duplicate ids and non-finite ratings.
    pub fn from_entities(entities: Vec<RatedEntity>) -> Result<Self, AppError> {
        let mut index = HashMap::with_capacity(entities.len());
        for (pos, entity) in entities.iter().enumerate() {
            if !entity.glicko.r.is_finite() {
                return Err(AppError::usage(format!(
                    "Puzzle {} has a non-finite rating.",
                    entity.id
                )));
            }
            if index.insert(entity.id.clone(), pos).is_some() {
                return Err(AppError::usage(format!("Duplicate puzzle id {}.", entity.id)));
            }
        }
        Ok(Self { entities, index })
    }

    /// Matches are snapshotted when the cursor is created.
    pub fn find(&self, filter: &RatingFilter) -> EntityCursor {
        let matched: Vec<RatedEntity> = self
            .entities
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        EntityCursor::from_entities(matched)
    }

    pub fn update(&mut self, id: &PuzzleId, update: &RatingUpdate) -> Result<(), AppError> {
        let pos = *self
            .index
            .get(id)
            .ok_or_else(|| AppError::persistence(format!("No puzzle with id {id}.")))?;
        update.apply(&mut self.entities[pos].glicko);
        Ok(())
    }

    pub fn get(&self, id: &PuzzleId) -> Option<&RatedEntity> {
        self.index.get(id).map(|&pos| &self.entities[pos])
    }

    pub fn entities(&self) -> &[RatedEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn ratings(&self) -> Vec<f64> {
        self.entities.iter().map(RatedEntity::rating).collect()
    }
}
