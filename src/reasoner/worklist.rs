//! Level-synchronous worklist.
//!
//! The `current` frame is drained completely before the `next` frame, filled
//! while draining, takes its place. Both frames are ordered sets, so a node
//! scheduled twice in one level is visited once and the visiting order does
//! not depend on hashing.

use std::collections::BTreeSet;

use crate::concept::ConceptId;

#[derive(Debug, Default)]
pub(crate) struct Worklist {
    current: BTreeSet<ConceptId>,
    next: BTreeSet<ConceptId>,
    levels: usize,
    visits: usize,
}

impl Worklist {
    /// Schedule into the frame being drained.
    pub(crate) fn seed<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = ConceptId>,
    {
        self.current.extend(ids);
    }

    /// Schedule into the following frame.
    pub(crate) fn defer<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = ConceptId>,
    {
        self.next.extend(ids);
    }

    /// Take the next node, crossing a level boundary if the current frame is spent.
    pub(crate) fn pop(&mut self) -> Option<ConceptId> {
        if self.is_empty() {
            return None;
        }
        if self.current.is_empty() {
            std::mem::swap(&mut self.current, &mut self.next);
            self.levels += 1;
            tracing::trace!(level = self.levels, width = self.pending(), "worklist level");
        } else if self.visits == 0 {
            self.levels = 1;
        }
        let id = self.current.pop_first()?;
        self.visits += 1;
        Some(id)
    }

    /// Nodes waiting in the current frame.
    pub(crate) fn pending(&self) -> usize {
        self.current.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.current.is_empty() && self.next.is_empty()
    }

    pub(crate) fn visits(&self) -> usize {
        self.visits
    }

    /// Number of frames drained so far.
    pub(crate) fn levels(&self) -> usize {
        self.levels
    }
}
