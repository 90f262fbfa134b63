//! Keyed task scheduling
//!
//! Each key owns at most one spawned task. Starting a key again aborts the
//! previous task. A task that runs to completion removes its own entry, but
//! only if the entry still belongs to it (checked by generation), so a late
//! finisher never evicts its replacement.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

struct Entry {
    generation: u64,
    handle: JoinHandle<()>,
}

struct Slots<K> {
    tasks: HashMap<K, Entry>,
    next_generation: u64,
}

/// Delayed tasks keyed by `K`, aborted on cancel or drop
pub struct TaskScheduler<K> {
    slots: Arc<Mutex<Slots<K>>>,
}

impl<K> TaskScheduler<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots {
                tasks: HashMap::new(),
                next_generation: 0,
            })),
        }
    }

    /// Run `task` after `delay`, replacing whatever `key` had scheduled
    pub fn start<F>(&self, key: K, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let weak: Weak<Mutex<Slots<K>>> = Arc::downgrade(&self.slots);

        // Held across the spawn so the task cannot finish before its entry exists.
        let mut slots = self.slots.lock();
        let generation = slots.next_generation;
        slots.next_generation += 1;

        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            task.await;

            if let Some(slots) = weak.upgrade() {
                let mut slots = slots.lock();
                if slots
                    .tasks
                    .get(&task_key)
                    .map_or(false, |entry| entry.generation == generation)
                {
                    slots.tasks.remove(&task_key);
                }
            }
        });

        if let Some(previous) = slots.tasks.insert(key, Entry { generation, handle }) {
            previous.handle.abort();
        }
    }

    /// Abort the task for `key`; returns whether one was scheduled
    pub fn cancel(&self, key: &K) -> bool {
        let entry = self.slots.lock().tasks.remove(key);
        match entry {
            Some(entry) => {
                entry.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Abort every scheduled task
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<Entry> = self.slots.lock().tasks.drain().map(|(_, e)| e).collect();
        for entry in &drained {
            entry.handle.abort();
        }
        drained.len()
    }

    pub fn is_scheduled(&self, key: &K) -> bool {
        self.slots.lock().tasks.contains_key(key)
    }

    pub fn keys(&self) -> Vec<K> {
        self.slots.lock().tasks.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().tasks.is_empty()
    }
}

impl<K> Default for TaskScheduler<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for TaskScheduler<K> {
    fn drop(&mut self) {
        for (_, entry) in self.slots.lock().tasks.drain() {
            entry.handle.abort();
        }
    }
}
