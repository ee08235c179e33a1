//! Cross-thread hand-off queue
//!
//! Background threads push work here; the frame thread drains it once per
//! tick and turns each entry into a zero-delay task for the next tick.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender, TrySendError};

use super::Task;
use crate::error::SchedulerError;

/// Both ends of the bounded hand-off channel
pub(crate) struct HandoffQueue {
    sender: Sender<Task>,
    receiver: Receiver<Task>,
    capacity: usize,
}

impl HandoffQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    pub(crate) fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            sender: self.sender.clone(),
        }
    }

    /// Take up to one queue's worth of tasks
    pub(crate) fn drain(&self) -> Vec<Task> {
        self.receiver.try_iter().take(self.capacity).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.receiver.len()
    }
}

/// Producer side of the hand-off queue
///
/// Cheap to clone and safe to move to any thread.
#[derive(Clone)]
pub struct SchedulerHandle {
    sender: Sender<Task>,
}

impl SchedulerHandle {
    /// Queue a task to run on the frame thread after the next frame event
    ///
    /// # Returns
    /// - `Ok(())` if the task was queued
    /// - `Err(QueueFull)` if the queue is full (task is dropped)
    #[tracing::instrument(skip(self, task))]
    pub fn schedule_next_frame<F>(&self, task: F) -> Result<(), SchedulerError>
    where
        F: FnOnce(&crate::Core) + Send + 'static,
    {
        match self.sender.try_send(Box::new(task)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Next-frame queue full, dropping task");
                Err(SchedulerError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("Next-frame queue disconnected");
                Err(SchedulerError::Disconnected)
            }
        }
    }

    /// Queue a task, blocking while the queue is full
    ///
    /// # Warning
    /// Only call from background threads. On the frame thread this would
    /// deadlock once the queue fills up.
    #[tracing::instrument(skip(self, task))]
    pub fn schedule_next_frame_blocking<F>(&self, task: F) -> Result<(), SchedulerError>
    where
        F: FnOnce(&crate::Core) + Send + 'static,
    {
        if qlrust_engine::is_main_thread() && qlrust_engine::main_thread_id().is_some() {
            tracing::warn!("Blocking next-frame schedule called on the frame thread");
        }
        self.sender.send(Box::new(task)).map_err(|e| {
            tracing::error!("Failed to queue task (blocking): {}", e);
            SchedulerError::Disconnected
        })
    }

    /// Queue a task, waiting while the queue is full for as long as
    /// `keep_waiting` holds. It is checked every `step`.
    ///
    /// Background threads that must not lose work but still have to
    /// honour a stop request use this instead of the blocking variant.
    pub fn schedule_next_frame_while<F>(
        &self,
        task: F,
        step: Duration,
        keep_waiting: impl Fn() -> bool,
    ) -> Result<(), SchedulerError>
    where
        F: FnOnce(&crate::Core) + Send + 'static,
    {
        let step = step.max(Duration::from_millis(1));
        let mut task: Task = Box::new(task);
        loop {
            match self.sender.send_timeout(task, step) {
                Ok(()) => return Ok(()),
                Err(SendTimeoutError::Timeout(returned)) => {
                    if !keep_waiting() {
                        tracing::debug!("Gave up queueing task on a full next-frame queue");
                        return Err(SchedulerError::QueueFull);
                    }
                    task = returned;
                }
                Err(SendTimeoutError::Disconnected(_)) => {
                    tracing::error!("Next-frame queue disconnected");
                    return Err(SchedulerError::Disconnected);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_queue_rejects() {
        let queue = HandoffQueue::new(2);
        let handle = queue.handle();

        handle.schedule_next_frame(|_| {}).unwrap();
        handle.schedule_next_frame(|_| {}).unwrap();
        assert!(matches!(
            handle.schedule_next_frame(|_| {}),
            Err(SchedulerError::QueueFull)
        ));

        assert_eq!(queue.drain().len(), 2);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_blocking_producer_waits_for_drain() {
        let queue = HandoffQueue::new(1);
        let handle = queue.handle();
        handle.schedule_next_frame(|_| {}).unwrap();

        let producer = std::thread::spawn(move || handle.schedule_next_frame_blocking(|_| {}));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(queue.len(), 1);

        let mut drained = queue.drain().len();
        assert!(producer.join().unwrap().is_ok());
        drained += queue.drain().len();
        assert_eq!(drained, 2);
    }

    #[test]
    fn test_waiting_producer_gives_up_when_told() {
        let queue = HandoffQueue::new(1);
        let handle = queue.handle();
        handle.schedule_next_frame(|_| {}).unwrap();

        let result = handle.schedule_next_frame_while(|_| {}, Duration::from_millis(1), || false);
        assert!(matches!(result, Err(SchedulerError::QueueFull)));
        assert_eq!(queue.len(), 1);
    }
}
