//! Bounded worker pool for running tasks side by side

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed number of threads pulling jobs from a shared queue.
///
/// Constructed explicitly and passed to whoever needs it. Dropping the pool waits for
/// queued jobs to finish.
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// A pool of `concurrency` threads (at least one).
    pub fn new(concurrency: usize) -> Self {
        let size = concurrency.max(1);
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|index| {
                let receiver = Arc::clone(&receiver);
                thread::spawn(move || run_worker(index, receiver))
            })
            .collect();

        Self {
            sender: Some(sender),
            workers,
        }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue `job`; the handle yields its return value.
    pub fn submit<T, F>(&self, job: F) -> JobHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (result_tx, result_rx) = mpsc::channel();
        let wrapped: Job = Box::new(move || {
            let _ = result_tx.send(job());
        });

        if let Some(sender) = &self.sender {
            if sender.send(wrapped).is_err() {
                warn!("worker pool is shut down, job dropped");
            }
        }
        JobHandle { receiver: result_rx }
    }

    /// Run every job and collect results in submission order.
    ///
    /// A job that panicked yields `None` in its slot.
    pub fn run_all<T, F>(&self, jobs: Vec<F>) -> Vec<Option<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let handles: Vec<JobHandle<T>> = jobs.into_iter().map(|job| self.submit(job)).collect();
        handles.into_iter().map(JobHandle::wait).collect()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel lets idle workers exit their loop
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn run_worker(index: usize, receiver: Arc<Mutex<Receiver<Job>>>) {
    loop {
        let job = match receiver.lock() {
            Ok(guard) => guard.recv(),
            Err(_) => break,
        };
        let Ok(job) = job else {
            break;
        };

        debug!(worker = index, "running job");
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            warn!(worker = index, "job panicked");
        }
    }
}

/// Pending result of a submitted job.
pub struct JobHandle<T> {
    receiver: Receiver<T>,
}

impl<T> JobHandle<T> {
    /// Block until the job finishes. `None` if it panicked or never ran.
    pub fn wait(self) -> Option<T> {
        self.receiver.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_results_keep_submission_order() {
        let pool = WorkerPool::new(3);
        let jobs: Vec<_> = (0..8u64)
            .map(|i| {
                move || {
                    thread::sleep(Duration::from_millis(8 - i));
                    i * 10
                }
            })
            .collect();

        let results = pool.run_all(jobs);
        let values: Vec<u64> = results.into_iter().map(Option::unwrap).collect();
        assert_eq!(values, vec![0, 10, 20, 30, 40, 50, 60, 70]);
    }

    #[test]
    fn test_concurrency_is_bounded() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let jobs: Vec<_> = (0..6)
            .map(|_| {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                move || {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(20));
                    running.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .collect();
        pool.run_all(jobs);

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_panicking_job_does_not_kill_pool() {
        let pool = WorkerPool::new(1);
        let bad = pool.submit(|| -> u32 { panic!("boom") });
        let good = pool.submit(|| 5u32);

        assert_eq!(bad.wait(), None);
        assert_eq!(good.wait(), Some(5));
    }

    #[test]
    fn test_zero_concurrency_still_has_a_worker() {
        assert_eq!(WorkerPool::new(0).size(), 1);
    }
}
