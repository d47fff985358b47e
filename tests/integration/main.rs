//! ASP integration test harness.
//!
//! Every test starts its own listener on 127.0.0.1:0 with a catalog loaded
//! from a CSV fixture, then talks to it over real TCP connections exactly
//! as a client would: one request per connection, reply read to EOF.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use asp_core::cipher::{self, Key};
use asp_core::wire::{encode_request, latin1_decode};
use asp_core::Method;
use asp_services::{Catalog, MethodDispatcher};
use aspd::AspListener;

mod concurrency;
mod rejections;

// ── Harness ───────────────────────────────────────────────────────────────────

pub const FIXTURE_CSV: &str = "\
Dog,Woof
Donkey,Hee-haw
Duck,Quack
Frog,Ribbit
Cat,Meow
Cow,Moo
";

static FIXTURE_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Write the fixture catalog to a unique temp file.
pub fn write_fixture() -> Result<PathBuf> {
    let seq = FIXTURE_SEQ.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "asp-integration-{}-{seq}.csv",
        std::process::id()
    ));
    std::fs::write(&path, FIXTURE_CSV)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// A listener running in the background for the duration of one test.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: broadcast::Sender<()>,
    task: JoinHandle<Result<()>>,
    fixture: PathBuf,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let fixture = write_fixture()?;
        let catalog = Catalog::load(&fixture).context("fixture catalog should load")?;
        let dispatcher = Arc::new(MethodDispatcher::new(Arc::new(catalog)));

        let (shutdown, _) = broadcast::channel::<()>(1);
        let listener = AspListener::bind("127.0.0.1:0", dispatcher, shutdown.subscribe()).await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(listener.run());

        Ok(Self {
            addr,
            shutdown,
            task,
            fixture,
        })
    }

    /// Stop accepting and wait for the accept loop to exit cleanly.
    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown.send(());
        let result = self.task.await.context("listener task panicked")?;
        let _ = std::fs::remove_file(&self.fixture);
        result
    }

    /// Send raw bytes on a fresh connection and return the raw reply.
    pub async fn send_raw(&self, packet: &[u8]) -> Result<Vec<u8>> {
        let mut stream = TcpStream::connect(self.addr)
            .await
            .context("failed to connect to test server")?;
        stream.write_all(packet).await.context("send failed")?;
        // Half-close so an empty send still reaches the server as EOF.
        stream.shutdown().await.context("shutdown failed")?;
        let mut reply = Vec::new();
        stream
            .read_to_end(&mut reply)
            .await
            .context("read failed")?;
        Ok(reply)
    }

    /// Send a well-formed request and decode the reply with its key.
    pub async fn request(&self, version: u8, key: u8, method: Method, body: &str) -> Result<String> {
        let key = Key::new(key).context("test key out of range")?;
        let packet = encode_request(version, key, method, body)?;
        let raw = self.send_raw(&packet).await?;
        Ok(cipher::decode(&latin1_decode(&raw), key))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_server_starts_and_stops() {
    let server = TestServer::start().await.expect("server should start");
    assert_ne!(server.addr.port(), 0, "OS should assign a real port");
    server.stop().await.expect("server should stop cleanly");
}

#[tokio::test]
async fn test_vers_over_tcp() {
    let server = TestServer::start().await.unwrap();

    let raw = server
        .send_raw(&encode_request(2, Key::new(3).unwrap(), Method::Vers, "").unwrap())
        .await
        .unwrap();
    // Encoded with key 3 on the wire.
    assert_eq!(latin1_decode(&raw), "Vhuyhu vxssruwv DVS yhuvlrqv 2, 3.");

    let text = server.request(2, 3, Method::Vers, "").await.unwrap();
    assert_eq!(text, "Server supports ASP versions 2, 3.");

    server.stop().await.unwrap();
}
