//! Frame Scheduler
//!
//! Runs work on the frame thread, either after a delay or on the next tick.
//! Background threads never touch game state directly: they hand tasks to
//! the frame thread through a [`SchedulerHandle`].
//!
//! Each tick runs, in order:
//! 1. delayed tasks that are due
//! 2. the `frame` event
//! 3. a drain of the hand-off queue, turning each entry into a zero-delay
//!    task for the next tick
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//!
//! core.scheduler().schedule_delayed(Duration::from_secs(5), |core| {
//!     core.engine().console_command("say hello");
//! });
//!
//! let handle = core.scheduler().handle();
//! core.scheduler().spawn_background("version-probe", move || {
//!     let version = probe_version();
//!     let _ = handle.schedule_next_frame(move |core| {
//!         core.engine().console_print(&format!("{}\n", version));
//!     });
//! })?;
//! ```

mod queue;
mod timer;

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::context::Core;
use crate::error::SchedulerError;
use crate::unwind::contain;

pub use queue::SchedulerHandle;
pub use timer::DEFAULT_TASK_PRIORITY;

use queue::HandoffQueue;
use timer::{DelayedQueue, DelayedTask};

/// A task to execute on the frame thread
pub type Task = Box<dyn FnOnce(&Core) + Send + 'static>;

/// Delayed tasks plus the cross-thread hand-off queue
pub struct FrameScheduler {
    delayed: DelayedQueue,
    handoff: HandoffQueue,
    seq: AtomicU64,
}

impl FrameScheduler {
    /// Create a scheduler whose hand-off queue holds `handoff_capacity` tasks
    pub fn new(handoff_capacity: usize) -> Self {
        Self {
            delayed: DelayedQueue::default(),
            handoff: HandoffQueue::new(handoff_capacity),
            seq: AtomicU64::new(0),
        }
    }

    /// Run `task` on the frame thread once `delay` has passed
    pub fn schedule_delayed<F>(&self, delay: Duration, task: F)
    where
        F: FnOnce(&Core) + Send + 'static,
    {
        self.schedule_delayed_with_priority(delay, DEFAULT_TASK_PRIORITY, task);
    }

    /// Like [`schedule_delayed`](Self::schedule_delayed); among tasks due
    /// at the same instant, lower `priority` values run first.
    #[tracing::instrument(skip(self, task))]
    pub fn schedule_delayed_with_priority<F>(&self, delay: Duration, priority: u32, task: F)
    where
        F: FnOnce(&Core) + Send + 'static,
    {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.delayed
            .push(DelayedTask::new(Instant::now() + delay, priority, seq, Box::new(task)));
    }

    /// Queue `task` through the hand-off queue
    ///
    /// The task runs on a later tick, after that tick's `frame` event,
    /// even when called from the frame thread.
    pub fn schedule_next_frame<F>(&self, task: F) -> Result<(), SchedulerError>
    where
        F: FnOnce(&Core) + Send + 'static,
    {
        self.handoff.handle().schedule_next_frame(task)
    }

    /// Queue `task`, blocking while the hand-off queue is full
    pub fn schedule_next_frame_blocking<F>(&self, task: F) -> Result<(), SchedulerError>
    where
        F: FnOnce(&Core) + Send + 'static,
    {
        self.handoff.handle().schedule_next_frame_blocking(task)
    }

    /// A producer handle that can be moved to other threads
    pub fn handle(&self) -> SchedulerHandle {
        self.handoff.handle()
    }

    /// Start a named OS thread for blocking work
    ///
    /// Panics inside `f` are logged. Results go back to the frame thread
    /// through a [`SchedulerHandle`].
    pub fn spawn_background<F>(&self, name: &str, f: F) -> Result<JoinHandle<()>, SchedulerError>
    where
        F: FnOnce() + Send + 'static,
    {
        spawn_background(name, f)
    }

    /// Run every delayed task that is due
    ///
    /// Each task is isolated: a panic is logged and the next task still runs.
    /// Returns the number of tasks run.
    #[tracing::instrument(skip_all)]
    pub(crate) fn run_due(&self, core: &Core) -> usize {
        let due = self.delayed.take_due(Instant::now());
        let count = due.len();

        for task in due {
            let DelayedTask { priority, task, .. } = task;
            if let Err(panic) = contain(|| task(core)) {
                tracing::error!(priority, "Scheduled task panicked: {}", panic);
            }
        }

        count
    }

    /// Move hand-off entries into the delayed queue for the next tick
    ///
    /// Returns the number of tasks moved.
    #[tracing::instrument(skip_all)]
    pub(crate) fn drain_handoff(&self) -> usize {
        let tasks = self.handoff.drain();
        let count = tasks.len();
        let now = Instant::now();

        for task in tasks {
            let seq = self.seq.fetch_add(1, Ordering::Relaxed);
            self.delayed
                .push(DelayedTask::new(now, DEFAULT_TASK_PRIORITY, seq, task));
        }

        count
    }

    /// Number of delayed tasks waiting
    pub fn pending_delayed(&self) -> usize {
        self.delayed.len()
    }

    /// Number of tasks waiting in the hand-off queue
    pub fn pending_handoff(&self) -> usize {
        self.handoff.len()
    }

    /// Drop every waiting task
    pub(crate) fn clear(&self) {
        let dropped = self.delayed.clear() + self.handoff.drain().len();
        if dropped > 0 {
            tracing::debug!("Dropped {} scheduled tasks", dropped);
        }
    }
}

/// Start a named OS thread whose panics are logged
pub fn spawn_background<F>(name: &str, f: F) -> Result<JoinHandle<()>, SchedulerError>
where
    F: FnOnce() + Send + 'static,
{
    let thread_name = name.to_string();
    let handle = std::thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            if let Err(panic) = contain(f) {
                tracing::error!(thread = %thread_name, "Background thread panicked: {}", panic);
            }
        })?;
    Ok(handle)
}
