//! Mutex-guarded queue safe for many producers and one drainer

use super::TokenQueue;
use crate::config::compile_time::queue::INITIAL_CAPACITY;
use crate::logging::codes;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
pub struct ConcurrentQueue<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConcurrentQueue<T> {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// A panic while holding the lock cannot leave the deque inconsistent
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(|poisoned| {
            crate::log_error!(codes::queue::LOCK_POISONED, "Recovered poisoned queue lock");
            poisoned.into_inner()
        })
    }

    /// Take every queued item
    pub fn drain(&self) -> Vec<T> {
        self.lock().drain(..).collect()
    }

    /// Lock two distinct queues in address order
    fn lock_pair<'a>(
        &'a self,
        other: &'a Self,
    ) -> (MutexGuard<'a, VecDeque<T>>, MutexGuard<'a, VecDeque<T>>) {
        if (self as *const Self) < (other as *const Self) {
            let source = self.lock();
            let destination = other.lock();
            (source, destination)
        } else {
            let destination = other.lock();
            let source = self.lock();
            (source, destination)
        }
    }
}

impl<T> TokenQueue<T> for ConcurrentQueue<T> {
    fn add(&self, item: T) {
        self.lock().push_back(item);
    }

    fn add_all(&self, items: Vec<T>) {
        self.lock().extend(items);
    }

    fn drain_to(&self, destination: &dyn TokenQueue<T>) -> usize {
        let moved = match destination.as_concurrent() {
            Some(other) if std::ptr::eq(self, other) => 0,
            Some(other) => {
                let (mut source, mut target) = self.lock_pair(other);
                let moved = source.len();
                target.append(&mut source);
                moved
            }
            None => {
                let items = self.drain();
                let moved = items.len();
                destination.add_all(items);
                moved
            }
        };

        if moved > 0 {
            crate::log_debug!("Queue drained", "tokens" => moved);
        }
        moved
    }

    fn iterate(&self) -> std::vec::IntoIter<T>
    where
        T: Clone,
    {
        let snapshot: Vec<T> = self.lock().iter().cloned().collect();
        snapshot.into_iter()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn as_concurrent(&self) -> Option<&ConcurrentQueue<T>> {
        Some(self)
    }
}
