//! Fibonacci compute engine.
//!
//! The engine is the plain doubly-recursive definition with no memoization,
//! so runtime grows exponentially with `n` and stack depth grows linearly
//! with it. Callers that need to keep a runtime worker free can offload a
//! computation with [`ComputeMode::Blocking`].

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Return the `n`th Fibonacci number.
///
/// `fib(n) == 1` for every `n <= 2`, negative indices included. Sums wrap
/// on 64-bit overflow.
pub fn fib(n: i64) -> i64 {
    if n <= 2 {
        1
    } else {
        fib(n - 1).wrapping_add(fib(n - 2))
    }
}

/// Where a connection handler runs the computation for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeMode {
    /// On the handler's own task.
    #[default]
    Inline,
    /// On tokio's blocking thread pool.
    Blocking,
}

impl ComputeMode {
    /// Compute `fib(n)` according to this mode.
    pub async fn run(self, n: i64) -> Result<i64, tokio::task::JoinError> {
        match self {
            ComputeMode::Inline => Ok(fib(n)),
            ComputeMode::Blocking => tokio::task::spawn_blocking(move || fib(n)).await,
        }
    }
}

impl FromStr for ComputeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inline" => Ok(ComputeMode::Inline),
            "blocking" => Ok(ComputeMode::Blocking),
            other => Err(format!("unknown compute mode '{other}' (expected inline or blocking)")),
        }
    }
}

impl fmt::Display for ComputeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeMode::Inline => f.write_str("inline"),
            ComputeMode::Blocking => f.write_str("blocking"),
        }
    }
}
