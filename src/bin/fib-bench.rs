use clap::Parser;
use fib_server::bench::{self, BenchArgs};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = BenchArgs::parse();
    fib_server::logging::init(&args.log_level);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(bench::run(&args))?;
    Ok(())
}
