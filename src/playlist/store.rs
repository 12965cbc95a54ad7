use std::collections::VecDeque;

use parking_lot::Mutex;
use time::OffsetDateTime;

use super::{
    entry::PlaylistEntry,
    priority::{Fifo, PriorityStrategy},
    template::{Template, TemplateContext, TemplateError},
};
use crate::common::time::format_relative_duration;

/// Ordered, lock-guarded list of entries.
///
/// Every operation takes the lock for its whole duration and never across
/// an await point, so a playlist can be shared freely between tasks.
pub struct Playlist {
    entries: Mutex<VecDeque<PlaylistEntry>>,
    priority: Box<dyn PriorityStrategy>,
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new()
    }
}

impl Playlist {
    pub fn new() -> Self {
        Self::with_priority(Fifo)
    }

    pub fn with_priority(priority: impl PriorityStrategy + 'static) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            priority: Box::new(priority),
        }
    }

    pub fn with_boxed_priority(priority: Box<dyn PriorityStrategy>) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            priority,
        }
    }

    /// Inserts `entry` ahead of the first queued entry it outranks, or at the
    /// back. Entries of equal rank keep their insertion order.
    pub fn add_entry(&self, entry: PlaylistEntry) {
        let mut entries = self.entries.lock();
        let at = entries
            .iter()
            .position(|queued| self.priority.is_higher_priority(&entry, queued));
        match at {
            Some(index) => entries.insert(index, entry),
            None => entries.push_back(entry),
        }
    }

    /// Same as [`add_entry`](Self::add_entry).
    pub fn push(&self, entry: PlaylistEntry) {
        self.add_entry(entry);
    }

    /// Inserts at the very front, ignoring priority.
    pub fn push_front(&self, entry: PlaylistEntry) {
        self.entries.lock().push_front(entry);
    }

    pub fn pop(&self) -> Option<PlaylistEntry> {
        self.entries.lock().pop_front()
    }

    /// Removes and returns up to `n` entries from the front.
    pub fn pop_n(&self, n: usize) -> Vec<PlaylistEntry> {
        let mut entries = self.entries.lock();
        let n = n.min(entries.len());
        entries.drain(..n).collect()
    }

    /// Up to `n` entries from the front, without removing them.
    pub fn peek_n(&self, n: usize) -> Vec<PlaylistEntry> {
        self.entries.lock().iter().take(n).cloned().collect()
    }

    /// Up to `n` entries from the back, newest first.
    pub fn peek_back_n(&self, n: usize) -> Vec<PlaylistEntry> {
        self.entries.lock().iter().rev().take(n).cloned().collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copy of every entry, front to back.
    pub fn entries(&self) -> Vec<PlaylistEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Renders up to `limit` entries through `template`, one rendering per
    /// entry. `reversed` walks from the back, which is how history is shown.
    pub fn format(&self, template: &str, limit: usize, reversed: bool) -> Result<String, TemplateError> {
        let template = Template::parse(template)?;
        let now = OffsetDateTime::now_utc();

        let entries = self.entries.lock();
        let picked: Vec<&PlaylistEntry> = if reversed {
            entries.iter().rev().take(limit).collect()
        } else {
            entries.iter().take(limit).collect()
        };

        let mut out = String::new();
        for (i, entry) in picked.into_iter().enumerate() {
            let relative_time = format_relative_duration(entry.added_at - now);
            template.render_into(
                &mut out,
                &TemplateContext {
                    index: i + 1,
                    entity: entry.added_by.display_name(),
                    title: &entry.title,
                    relative_time: &relative_time,
                },
            );
        }
        Ok(out)
    }
}
