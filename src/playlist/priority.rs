//! Ordering policies for priority-aware queue insertion.

use super::entry::{PlaylistEntry, Role};

pub trait PriorityStrategy: Send + Sync {
    /// Whether `candidate` belongs ahead of the already queued entry.
    fn is_higher_priority(&self, candidate: &PlaylistEntry, queued: &PlaylistEntry) -> bool;
}

/// Plain insertion order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fifo;

impl PriorityStrategy for Fifo {
    fn is_higher_priority(&self, _: &PlaylistEntry, _: &PlaylistEntry) -> bool {
        false
    }
}

/// Entries added by users go ahead of anything the bot queued itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserFirst;

impl PriorityStrategy for UserFirst {
    fn is_higher_priority(&self, candidate: &PlaylistEntry, queued: &PlaylistEntry) -> bool {
        candidate.added_by.role == Role::User && queued.added_by.role == Role::System
    }
}

impl<F> PriorityStrategy for F
where
    F: Fn(&PlaylistEntry, &PlaylistEntry) -> bool + Send + Sync,
{
    fn is_higher_priority(&self, candidate: &PlaylistEntry, queued: &PlaylistEntry) -> bool {
        self(candidate, queued)
    }
}
