//! Live-task registry with insert-if-absent semantics.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use vanguard_types::Slug;

#[derive(Default)]
struct Entries {
    live: Mutex<HashMap<Slug, u64>>,
    next_id: AtomicU64,
}

/// Slugs with a live vote task.
///
/// Registration hands out a [`TaskGuard`]; dropping the guard frees the
/// slug. [`TaskRegistry::clear`] forgets everything at once, and guards
/// issued before a clear never remove a newer registration.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    entries: Arc<Entries>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `slug` unless a task already holds it.
    pub fn try_register(&self, slug: &Slug) -> Option<TaskGuard> {
        let mut live = self.entries.live.lock().unwrap_or_else(PoisonError::into_inner);
        if live.contains_key(slug) {
            return None;
        }
        let id = self.entries.next_id.fetch_add(1, Ordering::Relaxed);
        live.insert(slug.clone(), id);
        Some(TaskGuard {
            entries: Arc::clone(&self.entries),
            slug: slug.clone(),
            id,
        })
    }

    pub fn contains(&self, slug: &Slug) -> bool {
        self.entries
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(slug)
    }

    pub fn len(&self) -> usize {
        self.entries.live.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.live.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Holds a slug in the registry until dropped.
pub struct TaskGuard {
    entries: Arc<Entries>,
    slug: Slug,
    id: u64,
}

impl TaskGuard {
    pub fn slug(&self) -> &Slug {
        &self.slug
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        let mut live = self.entries.live.lock().unwrap_or_else(PoisonError::into_inner);
        if live.get(&self.slug) == Some(&self.id) {
            live.remove(&self.slug);
        }
    }
}
