//! TCP listener and connection dispatcher.
//!
//! Binds the listen address, then accepts forever. Every accepted connection
//! is handed to its own spawned [`Handler`] task and never tracked again.
//! There is no cap on concurrent connections.

use crate::config::Config;
use crate::error::ServerError;
use crate::handler::Handler;
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::instrument::WithSubscriber;
use tracing::{debug, debug_span, error, info, Dispatch, Instrument};

/// Server instance
pub struct Server {
    listener: TcpListener,
    handler: Handler,
    dispatch: Dispatch,
}

impl Server {
    /// Resolve and bind the configured address.
    ///
    /// Logging goes to whichever dispatcher is current when this is called;
    /// see [`Server::with_dispatch`] to route it elsewhere.
    pub async fn bind(config: &Config) -> Result<Self, ServerError> {
        let addr = tokio::net::lookup_host(config.listen.as_str())
            .await
            .map_err(|e| ServerError::Resolve(config.listen.clone(), e))?
            .next()
            .ok_or_else(|| {
                ServerError::Resolve(
                    config.listen.clone(),
                    io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
                )
            })?;

        let listener = create_listener(addr, config.backlog)
            .and_then(TcpListener::from_std)
            .map_err(|e| ServerError::Bind(config.listen.clone(), e))?;

        let dispatch = tracing::dispatcher::get_default(|current| current.clone());

        Ok(Server {
            listener,
            handler: Handler::from_config(config),
            dispatch,
        })
    }

    /// Send this server's logs, and those of every handler it spawns, to `dispatch`.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever.
    pub async fn run(self) {
        let dispatch = self.dispatch.clone();
        self.accept_loop().with_subscriber(dispatch).await
    }

    async fn accept_loop(self) {
        if let Ok(addr) = self.listener.local_addr() {
            info!(address = %addr, "Server listening");
        }

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(peer = %peer, "New connection");

                    let span = debug_span!("connection", peer = %peer);
                    tokio::spawn(
                        self.handler
                            .serve(stream)
                            .instrument(span)
                            .with_subscriber(self.dispatch.clone()),
                    );
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}

fn create_listener(addr: SocketAddr, backlog: i32) -> io::Result<std::net::TcpListener> {
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    // SO_REUSEADDR only: a port held by a live listener must still fail to bind.
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;

    Ok(socket.into())
}
