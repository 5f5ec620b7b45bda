//! Single-context delivery of request completions.
//!
//! Requests started with [`HttpClient::dispatch`](super::client::HttpClient::dispatch)
//! run concurrently on the Tokio runtime, but their callbacks are queued
//! here and run one at a time by whichever task drains the [`CompletionQueue`].
//! UI-adjacent callers therefore never race their own callbacks.

use tokio::sync::mpsc;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Sending half, cloned into every dispatched request.
#[derive(Clone)]
pub struct CompletionHandle {
    tx: mpsc::UnboundedSender<Job>,
}

/// Receiving half, owned by the designated completion context.
pub struct CompletionQueue {
    rx: mpsc::UnboundedReceiver<Job>,
}

/// Create a connected handle/queue pair.
pub fn completion_queue() -> (CompletionHandle, CompletionQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CompletionHandle { tx }, CompletionQueue { rx })
}

impl CompletionHandle {
    /// Queue `job`. Returns `false` if the queue has been dropped.
    pub fn deliver<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx.send(Box::new(job)).is_ok()
    }
}

impl CompletionQueue {
    /// Wait for the next completion and run it. Returns `false` once every handle is gone.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Run completions until every handle has been dropped.
    pub async fn run(mut self) {
        while self.run_next().await {}
    }

    /// Run whatever is already queued without waiting. Returns how many ran.
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn jobs_run_in_queue_order_on_the_draining_task() {
        let (handle, mut queue) = completion_queue();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let seen = Arc::clone(&seen);
            assert!(handle.deliver(move || seen.lock().unwrap().push(i)));
        }

        assert_eq!(queue.drain(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn run_stops_when_handles_are_dropped() {
        let (handle, queue) = completion_queue();
        let hits = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&hits);
        handle.deliver(move || *counter.lock().unwrap() += 1);
        drop(handle);

        queue.run().await;
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn deliver_reports_closed_queue() {
        let (handle, queue) = completion_queue();
        drop(queue);
        assert!(!handle.deliver(|| {}));
    }
}
