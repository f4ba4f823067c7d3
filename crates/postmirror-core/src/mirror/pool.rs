//! Fixed-size OS-thread pool over a pre-filled work queue.
//!
//! All items are enqueued and the expected outcome count is fixed before the
//! first worker starts. Outcomes flow over one mpsc channel to the calling
//! thread, which is their only consumer. Every handle is joined before
//! returning.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

/// Some workers died before reporting every outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{panicked} worker(s) panicked; received {received} of {expected} outcome(s)")]
pub struct PoolError {
    pub expected: usize,
    pub received: usize,
    pub panicked: usize,
}

impl PoolError {
    pub fn lost(&self) -> usize {
        self.expected.saturating_sub(self.received)
    }
}

/// Run `task` over `items` on at most `workers` threads, handing each outcome
/// to `consume` on the calling thread as it arrives.
pub(crate) fn run_bounded<T, R, F, C>(
    items: Vec<T>,
    workers: usize,
    task: F,
    mut consume: C,
) -> Result<(), PoolError>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
    C: FnMut(R),
{
    let expected = items.len();
    if expected == 0 {
        return Ok(());
    }
    let work: Arc<Mutex<VecDeque<T>>> = Arc::new(Mutex::new(items.into_iter().collect()));
    let task = Arc::new(task);
    let (tx, rx) = mpsc::channel::<R>();
    let num_workers = workers.max(1).min(expected);
    let mut handles = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        let work = Arc::clone(&work);
        let task = Arc::clone(&task);
        let tx = tx.clone();
        handles.push(thread::spawn(move || loop {
            // A panicking sibling poisons the lock; the queue itself is still consistent.
            let next = work
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            let Some(item) = next else { break };
            if tx.send(task(item)).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    let mut received = 0usize;
    while received < expected {
        match rx.recv() {
            Ok(outcome) => {
                received += 1;
                consume(outcome);
            }
            // All senders gone before every outcome arrived.
            Err(_) => break,
        }
    }

    let mut panicked = 0usize;
    for h in handles {
        if h.join().is_err() {
            panicked += 1;
        }
    }
    if received < expected || panicked > 0 {
        return Err(PoolError {
            expected,
            received,
            panicked,
        });
    }
    Ok(())
}
