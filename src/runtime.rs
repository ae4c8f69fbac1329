//! Tokio runtime construction.
//!
//! `fib` recurses once per index step before it starts branching, so the
//! deepest index a handler can reach is set by the stack of the thread
//! running it. Worker threads and the blocking pool both get
//! `config.stack_size`; an index past that limit still overflows.

use crate::config::Config;
use std::io;
use tokio::runtime::{Builder, Runtime};

/// 512 MiB: several million frames of `fib` even in debug builds.
pub const DEFAULT_STACK_SIZE: usize = 512 * 1024 * 1024;

/// Build the multi-threaded runtime the server runs on.
pub fn build(config: &Config) -> io::Result<Runtime> {
    let mut builder = Builder::new_multi_thread();
    builder.enable_all().thread_stack_size(config.stack_size);
    if let Some(workers) = config.workers.filter(|&w| w > 0) {
        builder.worker_threads(workers);
    }
    builder.build()
}
