use clap::{CommandFactory, Parser};
use fib_server::config::{CliArgs, Config, ConfigError};
use fib_server::server::Server;
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    run(CliArgs::parse())
}

/// Start the server described by `cli`.
///
/// Returns `Ok(())` after printing usage when no listen address was given,
/// and an error when startup fails. Otherwise serves forever.
fn run(cli: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = match Config::from_args(cli) {
        Ok(config) => config,
        Err(ConfigError::MissingListen) => {
            println!("{}", ConfigError::MissingListen);
            CliArgs::command().print_help()?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    fib_server::logging::init(&config.log_level);

    info!(
        listen = %config.listen,
        buffer_size = config.buffer_size,
        compute = %config.compute,
        max_index = ?config.max_index,
        workers = ?config.workers,
        stack_size = config.stack_size,
        "Starting fib-server"
    );

    let runtime = fib_server::runtime::build(&config)?;
    runtime.block_on(serve(config))
}

/// Bind and serve until the process is killed
async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let server = Server::bind(&config).await.map_err(|e| {
        error!(error = %e, "Failed to start listener");
        e
    })?;
    server.run().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fib_server::error::ServerError;

    fn cli(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("fib-server").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_no_address_prints_usage_and_succeeds() {
        assert!(run(cli(&[])).is_ok());
    }

    #[test]
    fn test_address_in_use_is_fatal() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap().to_string();

        let err = run(cli(&[&addr])).unwrap_err();
        match err.downcast_ref::<ServerError>() {
            Some(ServerError::Bind(listen, _)) => assert_eq!(listen, &addr),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bad_config_is_fatal() {
        let err = run(cli(&["-b", "0", "127.0.0.1:0"])).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }
}
