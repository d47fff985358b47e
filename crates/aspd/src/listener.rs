//! TCP listener — one task per connection, one exchange per task.
//!
//! Each worker reads a single bounded chunk, runs it through
//! [`asp_services::exchange`], writes the reply and closes. Workers share
//! nothing but the read-only dispatcher, so a stalled client only blocks
//! its own task.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::broadcast;

use asp_core::wire::MAX_PACKET_LEN;
use asp_services::{exchange, MethodDispatcher, Reply};

/// One byte past the largest legal packet, so framing can see oversize input.
const READ_LIMIT: usize = MAX_PACKET_LEN + 1;

pub struct AspListener {
    listener: TcpListener,
    dispatcher: Arc<MethodDispatcher>,
    shutdown: broadcast::Receiver<()>,
}

impl AspListener {
    pub fn new(
        listener: TcpListener,
        dispatcher: Arc<MethodDispatcher>,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            listener,
            dispatcher,
            shutdown,
        }
    }

    pub async fn bind(
        addr: impl ToSocketAddrs,
        dispatcher: Arc<MethodDispatcher>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .context("failed to bind ASP listener")?;
        Ok(Self::new(listener, dispatcher, shutdown))
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("failed to read listener address")
    }

    /// Accept until shutdown fires. In-flight workers are left to finish.
    pub async fn run(mut self) -> Result<()> {
        tracing::info!(addr = %self.local_addr()?, "ASP listener accepting");

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("ASP listener shutting down");
                    return Ok(());
                }

                result = self.listener.accept() => {
                    let (stream, peer) = match result {
                        Ok(r) => r,
                        Err(e) => {
                            tracing::warn!(error = %e, "accept failed");
                            continue;
                        }
                    };

                    let dispatcher = self.dispatcher.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer, &dispatcher).await {
                            tracing::warn!(%peer, error = %e, "connection failed");
                        }
                    });
                }
            }
        }
    }
}

/// Serve exactly one request on `stream`, then shut it down.
pub async fn handle_connection<S>(
    mut stream: S,
    peer: SocketAddr,
    dispatcher: &MethodDispatcher,
) -> Result<Reply>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = [0u8; READ_LIMIT];
    let len = stream
        .read(&mut buf)
        .await
        .context("failed to read request")?;
    let packet = &buf[..len];
    tracing::debug!(%peer, len, packet = hex::encode(packet), "received packet");

    let reply = exchange(packet, dispatcher, &mut rand::thread_rng());

    match &reply {
        Reply::Rejected(err) => tracing::warn!(%peer, error = %err, "rejected packet"),
        Reply::Answered { method, .. } => tracing::debug!(%peer, %method, "answered request"),
    }

    stream
        .write_all(&reply.to_wire())
        .await
        .context("failed to send reply")?;
    stream
        .shutdown()
        .await
        .context("failed to close connection")?;

    Ok(reply)
}
