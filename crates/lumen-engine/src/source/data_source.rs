use std::sync::Arc;

use super::{JobHandle, WorkerPool};

/// Pull-based producer of CPU-side content, consumed exactly once.
pub trait DataSource<T>: Send {
    /// Produces the content, or `None` on failure.
    fn get_data(self: Box<Self>) -> Option<Arc<T>>;
}

/// Content that already exists.
#[derive(Debug)]
pub struct ValueSource<T> {
    value: Arc<T>,
}

impl<T> ValueSource<T> {
    pub fn new(value: Arc<T>) -> Self {
        Self { value }
    }
}

impl<T: Send + Sync> DataSource<T> for ValueSource<T> {
    fn get_data(self: Box<Self>) -> Option<Arc<T>> {
        Some(self.value)
    }
}

/// Content produced by a closure.
pub struct FnSource<F> {
    produce: F,
}

impl<F> FnSource<F> {
    pub fn new(produce: F) -> Self {
        Self { produce }
    }
}

impl<T, F> DataSource<T> for FnSource<F>
where
    F: FnOnce() -> Option<Arc<T>> + Send,
{
    fn get_data(self: Box<Self>) -> Option<Arc<T>> {
        (self.produce)()
    }
}

/// A source whose production was started on a worker thread.
///
/// `get_data` waits for the worker to finish.
#[derive(Debug)]
pub struct AsyncSource<T> {
    handle: JobHandle<Option<Arc<T>>>,
}

impl<T: Send + Sync> DataSource<T> for AsyncSource<T> {
    fn get_data(self: Box<Self>) -> Option<Arc<T>> {
        self.handle.wait().flatten()
    }
}

/// Starts `source` on `pool` right away when a pool is available; otherwise
/// returns it unchanged so it runs lazily on the calling thread.
pub fn async_source<T>(source: Box<dyn DataSource<T>>, pool: Option<&WorkerPool>) -> Box<dyn DataSource<T>>
where
    T: Send + Sync + 'static,
{
    match pool {
        Some(pool) => Box::new(AsyncSource {
            handle: pool.spawn(move || source.get_data()),
        }),
        None => source,
    }
}
