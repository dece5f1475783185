//! Cycle detection over directed task edges.
//!
//! # Invariants
//! - Each task is expanded at most once per search (visited set).
//! - Only paths that come back to the start task count; a self-edge does.

use crate::error::ModelResult;
use crate::graph::store::EntityStore;
use crate::model::ids::{EntityKey, EntityKind};
use crate::relation::association::RelationSlot;
use std::collections::HashSet;

/// Directed edge family followed by the cycle search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectedEdges {
    /// Task -> tasks it depends on (`task.dependees`).
    Dependency,
    /// Task -> tasks it is prioritized over (`task.prioritized_over`).
    Priority,
}

impl DirectedEdges {
    /// Container holding the outgoing edges.
    pub const fn outgoing(self) -> RelationSlot {
        match self {
            Self::Dependency => RelationSlot::TaskDependees,
            Self::Priority => RelationSlot::TaskPrioritizedOver,
        }
    }
}

impl EntityStore {
    /// Returns whether following `edges` from `start` can lead back to it.
    ///
    /// # Errors
    /// - `EntityNotFound` for `start` or for a key listed by a container
    ///   that is not in the store.
    /// - `MissingCounterpart` when `start` is not a task.
    pub fn contains_cycle(&mut self, start: EntityKey, edges: DirectedEdges) -> ModelResult<bool> {
        let slot = edges.outgoing();
        self.ensure_kind(start, EntityKind::Task, slot.name())?;

        let mut visited = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            for next in self.members(current, slot)? {
                if next == start {
                    return Ok(true);
                }
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }
        Ok(false)
    }

    pub fn contains_dependency_cycle(&mut self, task: EntityKey) -> ModelResult<bool> {
        self.contains_cycle(task, DirectedEdges::Dependency)
    }

    pub fn contains_priority_cycle(&mut self, task: EntityKey) -> ModelResult<bool> {
        self.contains_cycle(task, DirectedEdges::Priority)
    }
}
