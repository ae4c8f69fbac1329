//! fib-server: a line-oriented Fibonacci server
//!
//! Clients send one decimal index per line and get `fib(n)` back on its
//! own line, for as long as the connection stays open.
//!
//! Features:
//! - One spawned task per connection, no shared state between connections
//! - Malformed requests dropped without closing the connection
//! - Optional offload of computation to the blocking thread pool
//! - Configuration via CLI arguments or TOML file

pub mod bench;
pub mod compute;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod protocol;
pub mod runtime;
pub mod server;

#[cfg(test)]
mod test_support;
