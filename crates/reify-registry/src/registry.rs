//! Priority-ordered matcher registry.

use std::sync::Arc;

use parking_lot::RwLock;
use reify_types::{TypeDescriptor, TypeEnv};

use crate::matcher::Matcher;

#[derive(Clone, Debug)]
struct Entry<T> {
    matcher: Matcher,
    value: T,
}

/// Ordered `(matcher, value)` pairs with first-match-wins lookup.
///
/// Registrations either prepend (highest priority) or append (lowest).
/// Lookups clone an `Arc` snapshot of the entry list and run without holding
/// the lock, so a slow matcher never blocks writers and readers never observe
/// a half-applied registration.
#[derive(Debug)]
pub struct Registry<T> {
    entries: RwLock<Arc<Vec<Entry<T>>>>,
}

impl<T: Clone> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Register with highest priority: consulted before everything already
    /// registered.
    pub fn register_first(&self, matcher: Matcher, value: T) {
        tracing::debug!(matcher = ?matcher, "registering matcher (first)");
        let mut guard = self.entries.write();
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.push(Entry { matcher, value });
        next.extend(guard.iter().cloned());
        *guard = Arc::new(next);
    }

    /// Register with lowest priority: consulted after everything already
    /// registered.
    pub fn register_last(&self, matcher: Matcher, value: T) {
        tracing::debug!(matcher = ?matcher, "registering matcher (last)");
        let mut guard = self.entries.write();
        let mut next = guard.as_ref().clone();
        next.push(Entry { matcher, value });
        *guard = Arc::new(next);
    }

    /// The value of the first entry whose matcher accepts `descriptor`.
    pub fn find_first(&self, env: &dyn TypeEnv, descriptor: &TypeDescriptor) -> Option<T> {
        self.find_first_where(env, descriptor, |_| true)
    }

    /// The value of the first entry whose matcher accepts `descriptor` and
    /// whose value satisfies `accept`. Entries with matching matchers but
    /// rejected values are skipped, not terminal.
    pub fn find_first_where(
        &self,
        env: &dyn TypeEnv,
        descriptor: &TypeDescriptor,
        accept: impl Fn(&T) -> bool,
    ) -> Option<T> {
        let snapshot = Arc::clone(&self.entries.read());
        snapshot
            .iter()
            .find(|entry| entry.matcher.matches(env, descriptor) && accept(&entry.value))
            .map(|entry| entry.value.clone())
    }

    /// All matching values, in priority order.
    pub fn find(&self, env: &dyn TypeEnv, descriptor: &TypeDescriptor) -> Vec<T> {
        self.find_where(env, descriptor, |_| true)
    }

    pub fn find_where(
        &self,
        env: &dyn TypeEnv,
        descriptor: &TypeDescriptor,
        accept: impl Fn(&T) -> bool,
    ) -> Vec<T> {
        let snapshot = Arc::clone(&self.entries.read());
        snapshot
            .iter()
            .filter(|entry| entry.matcher.matches(env, descriptor) && accept(&entry.value))
            .map(|entry| entry.value.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
