//! Execution contexts for deferred notification delivery.
//!
//! A [`DispatchContext`] is the caller-supplied "run this callback over
//! there" capability. Reflux never creates threads; it only posts work to a
//! context the caller owns, fire-and-forget.
//!
//! Any `Fn(Task) + Send + Sync` closure is a context, which makes bridging to
//! an existing executor or channel a one-liner. [`TaskQueue`] is a simple
//! context that buffers posted work until its owner drains it, typically once
//! per UI frame or event-loop turn.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::logging::targets;

/// A boxed unit of posted work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A context that posted callbacks run in.
pub trait DispatchContext: Send + Sync {
    /// Schedule `task` to run in this context.
    fn post(&self, task: Task);
}

impl<F> DispatchContext for F
where
    F: Fn(Task) + Send + Sync,
{
    fn post(&self, task: Task) {
        self(task)
    }
}

/// A FIFO of posted tasks, drained explicitly by its owner.
///
/// Tasks run on whichever thread calls [`process_all`](Self::process_all), in
/// the order they were posted.
#[derive(Default)]
pub struct TaskQueue {
    tasks: Mutex<VecDeque<Task>>,
}

impl TaskQueue {
    /// Create a new task queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of pending tasks.
    pub fn pending_count(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Run every pending task, including tasks posted while draining.
    ///
    /// Returns the number of tasks processed.
    pub fn process_all(&self) -> usize {
        let mut processed = 0;
        loop {
            // Pop under the lock, run outside it: tasks may post more tasks.
            let Some(task) = self.tasks.lock().pop_front() else {
                break;
            };
            task();
            processed += 1;
        }
        if processed > 0 {
            tracing::trace!(target: targets::CONTEXT, processed, "drained task queue");
        }
        processed
    }
}

impl DispatchContext for TaskQueue {
    fn post(&self, task: Task) {
        self.tasks.lock().push_back(task);
    }
}

static_assertions::assert_impl_all!(TaskQueue: Send, Sync);
