use std::collections::HashSet;

use crate::state::EntityId;

/// Single-retry queue scoped to one phase execution.
///
/// An entity can be queued at most once per phase. Draining hands back the
/// pending entities in the order they were queued but remembers them, so a
/// failure during the drain cannot queue them again.
#[derive(Clone, Debug, Default)]
pub struct RetryQueue {
    pending: Vec<EntityId>,
    retried: HashSet<EntityId>,
}

impl RetryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an entity for retry. Returns false if it was already queued
    /// during this phase.
    pub fn push(&mut self, entity: EntityId) -> bool {
        if !self.retried.insert(entity) {
            return false;
        }
        self.pending.push(entity);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn was_retried(&self, entity: EntityId) -> bool {
        self.retried.contains(&entity)
    }

    pub fn drain(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_is_queued_at_most_once() {
        let mut queue = RetryQueue::new();
        assert!(queue.push(EntityId(4)));
        assert!(queue.push(EntityId(2)));
        assert!(!queue.push(EntityId(4)));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.drain(), [EntityId(4), EntityId(2)]);
        assert!(queue.is_empty());

        // Draining does not forget who was retried.
        assert!(queue.was_retried(EntityId(2)));
        assert!(!queue.push(EntityId(2)));
        assert!(queue.is_empty());
    }
}
