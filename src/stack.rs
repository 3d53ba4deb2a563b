//! Dedicated threads with a large stack for work that walks recorded DOM
//! trees recursively (JSON decoding, serde tree conversion).

use std::io;
use std::thread;

/// Recorded trees nest thousands of levels deep on real pages.
pub const DEEP_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Runs `work` on a named thread with [`DEEP_STACK_SIZE`] of stack and waits
/// for it. A panic in `work` comes back as an error.
pub fn run_on_deep_stack<F, T>(name: &str, work: F) -> io::Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let handle = thread::Builder::new()
        .name(name.to_string())
        .stack_size(DEEP_STACK_SIZE)
        .spawn(work)?;
    handle
        .join()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, format!("{name} thread panicked")))
}

/// Async form of [`run_on_deep_stack`]; the waiting happens on the blocking
/// pool so runtime workers stay free.
pub async fn spawn_deep<F, T>(name: &'static str, work: F) -> io::Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || run_on_deep_stack(name, work))
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?
}
