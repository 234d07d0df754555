use std::panic::{self, AssertUnwindSafe};
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size pool of CPU worker threads for content preparation.
///
/// Workers never touch GPU APIs. Dropping the pool closes the job channel and
/// joins every worker after the queued jobs have run.
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(threads: usize) -> Result<Self> {
        anyhow::ensure!(threads > 0, "worker pool needs at least one thread");

        let (sender, receiver) = unbounded::<Job>();
        let mut workers = Vec::with_capacity(threads);
        for index in 0..threads {
            let receiver = receiver.clone();
            let worker = std::thread::Builder::new()
                .name(format!("lumen-worker-{index}"))
                .spawn(move || worker_loop(receiver))
                .with_context(|| format!("failed to spawn worker thread {index}"))?;
            workers.push(worker);
        }

        log::debug!("worker pool started with {threads} threads");
        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    #[inline]
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Queues `job` and returns a handle to its result.
    ///
    /// A panicking job produces `None` instead of tearing down the worker.
    pub fn spawn<T, F>(&self, job: F) -> JobHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (result_sender, result_receiver) = bounded(1);
        let job: Job = Box::new(move || {
            let result = match panic::catch_unwind(AssertUnwindSafe(job)) {
                Ok(value) => Some(value),
                Err(_) => {
                    log::warn!("worker job panicked; its result is dropped");
                    None
                }
            };
            // The handle may already be gone; nobody is waiting then.
            let _ = result_sender.send(result);
        });

        match &self.sender {
            Some(sender) => {
                if let Err(err) = sender.send(job) {
                    // Channel closed: run inline rather than losing the work.
                    (err.into_inner())();
                }
            }
            None => job(),
        }

        JobHandle {
            receiver: result_receiver,
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::warn!("worker thread exited with a panic");
            }
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool").field("threads", &self.workers.len()).finish()
    }
}

fn worker_loop(receiver: Receiver<Job>) {
    while let Ok(job) = receiver.recv() {
        job();
    }
}

/// Result slot of a job queued on a [`WorkerPool`].
#[derive(Debug)]
pub struct JobHandle<T> {
    receiver: Receiver<Option<T>>,
}

impl<T> JobHandle<T> {
    /// Blocks until the job finishes. `None` if it panicked.
    pub fn wait(self) -> Option<T> {
        self.receiver.recv().ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn jobs_run_on_named_worker_threads() {
        let pool = WorkerPool::new(2).unwrap();
        let name = pool
            .spawn(|| std::thread::current().name().map(str::to_owned))
            .wait()
            .flatten()
            .unwrap();
        assert!(name.starts_with("lumen-worker-"));
    }

    #[test]
    fn panicking_job_yields_none_and_pool_survives() {
        let pool = WorkerPool::new(1).unwrap();
        let failed = pool.spawn(|| -> u32 { panic!("decode failed") });
        assert_eq!(failed.wait(), None);
        assert_eq!(pool.spawn(|| 7).wait(), Some(7));
    }

    #[test]
    fn drop_finishes_queued_jobs() {
        let counter = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new(2).unwrap();
        for _ in 0..32 {
            let counter = Arc::clone(&counter);
            drop(pool.spawn(move || counter.fetch_add(1, Ordering::SeqCst)));
        }
        drop(pool);
        assert_eq!(counter.load(Ordering::SeqCst), 32);
    }

    #[test]
    fn zero_threads_is_an_error() {
        assert!(WorkerPool::new(0).is_err());
    }
}
