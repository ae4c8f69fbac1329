//! Load generator for a running fib-server.
//!
//! Each client connection sends one request, waits for the reply, and
//! repeats. Throughput across all connections is logged once per second.

use clap::Parser;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tracing::{debug, info, info_span, warn, Instrument};

/// Command-line arguments for the benchmark client
#[derive(Parser, Debug, Clone)]
#[command(name = "fib-bench")]
#[command(version = "0.1.0")]
#[command(about = "Measures request throughput against a fib-server", long_about = None)]
pub struct BenchArgs {
    /// Server address (e.g., 127.0.0.1:25000)
    pub addr: String,

    /// Index to request
    #[arg(short, long, default_value_t = 1)]
    pub n: i64,

    /// Number of parallel client connections
    #[arg(short, long, default_value_t = 1)]
    pub connections: usize,

    /// Stop after this many seconds (runs until interrupted if unset)
    #[arg(short, long)]
    pub duration: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Run the benchmark and return the number of completed round trips.
///
/// Stops when the duration elapses or every connection has been closed by
/// the server. Failing to connect is returned as an error.
pub async fn run(args: &BenchArgs) -> io::Result<u64> {
    let completed = Arc::new(AtomicU64::new(0));
    let mut clients = JoinSet::new();

    for id in 0..args.connections {
        let stream = TcpStream::connect(args.addr.as_str()).await?;
        stream.set_nodelay(true)?;
        clients.spawn(
            client_loop(stream, args.n, Arc::clone(&completed))
                .instrument(info_span!("client", id)),
        );
    }

    info!(addr = %args.addr, connections = args.connections, n = args.n, "Benchmark started");

    let all_closed = async {
        while let Some(result) = clients.join_next().await {
            match result {
                Ok(Ok(())) => debug!("Server closed a client connection"),
                Ok(Err(e)) => warn!(error = %e, "Client connection failed"),
                Err(e) => warn!(error = %e, "Client task failed"),
            }
        }
    };

    let deadline = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };

    let monitor = async {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.tick().await;
        let mut last = 0;
        loop {
            interval.tick().await;
            let now = completed.load(Ordering::Relaxed);
            info!(reqs_per_sec = now - last, "Throughput");
            last = now;
        }
    };

    tokio::select! {
        _ = all_closed => {}
        _ = deadline => {}
        _ = monitor => {}
    }

    let total = completed.load(Ordering::Relaxed);
    info!(total, "Benchmark finished");
    Ok(total)
}

async fn client_loop(mut stream: TcpStream, n: i64, completed: Arc<AtomicU64>) -> io::Result<()> {
    let request = format!("{n}\n");
    let mut buf = [0u8; 100];

    loop {
        stream.write_all(request.as_bytes()).await?;
        if stream.read(&mut buf).await? == 0 {
            return Ok(());
        }
        completed.fetch_add(1, Ordering::Relaxed);
    }
}
