//! asp-ctl — command-line client for an ASP server.

use anyhow::{bail, Context, Result};
use rand::Rng;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use asp_core::cipher::{self, Key};
use asp_core::config::DEFAULT_PORT;
use asp_core::wire::{encode_request, latin1_decode};
use asp_core::Method;

/// Replies starting with this were never encoded.
const PLAINTEXT_ERROR_PREFIX: &str = "ASPERR:";

struct Options {
    addr: String,
    version: u8,
    key: Key,
}

// ── Exchange ──────────────────────────────────────────────────────────────────

async fn request(opts: &Options, method: Method, body: &str) -> Result<String> {
    let packet = encode_request(opts.version, opts.key, method, body)
        .with_context(|| format!("body too long for one packet: {body:?}"))?;

    let mut stream = TcpStream::connect(&opts.addr)
        .await
        .with_context(|| format!("failed to connect to aspd at {} — is it running?", opts.addr))?;
    stream
        .write_all(&packet)
        .await
        .context("failed to send request")?;

    let mut raw = Vec::new();
    stream
        .read_to_end(&mut raw)
        .await
        .context("failed to read reply")?;

    let text = latin1_decode(&raw);
    if text.starts_with(PLAINTEXT_ERROR_PREFIX) {
        Ok(text)
    } else {
        Ok(cipher::decode(&text, opts.key))
    }
}

fn print_usage() {
    println!("Usage: asp-ctl [options] <command> [arg]");
    println!();
    println!("Commands:");
    println!("  vers            List protocol versions the server supports");
    println!("  caps            List methods the server supports");
    println!("  anim <prefix>   List animals starting with <prefix>");
    println!("  soun <prefix>   List sounds starting with <prefix>");
    println!("  atos <animal>   Look up the sound an animal makes");
    println!();
    println!("Options:");
    println!(
        "  --addr <host:port>  Server address (default: 127.0.0.1:{})",
        DEFAULT_PORT
    );
    println!("  --version <n>       Protocol version (default: 2)");
    println!(
        "  --key <k>           Cipher key {}-{} (default: random)",
        Key::MIN,
        Key::MAX
    );
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut opts = Options {
        addr: format!("127.0.0.1:{}", DEFAULT_PORT),
        version: 2,
        key: random_key()?,
    };
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--addr" => {
                i += 1;
                opts.addr = args.get(i).context("--addr requires a value")?.clone();
            }
            "--version" => {
                i += 1;
                opts.version = args
                    .get(i)
                    .context("--version requires a value")?
                    .parse()
                    .context("--version must be a number")?;
            }
            "--key" => {
                i += 1;
                let raw: u8 = args
                    .get(i)
                    .context("--key requires a value")?
                    .parse()
                    .context("--key must be a number")?;
                opts.key = match Key::new(raw) {
                    Some(k) => k,
                    None => bail!("--key must be between {} and {}", Key::MIN, Key::MAX),
                };
            }
            other => remaining.push(other),
        }
        i += 1;
    }

    let (method, body) = match remaining.as_slice() {
        ["vers"]                       => (Method::Vers, ""),
        ["caps"]                       => (Method::Caps, ""),
        ["anim", prefix]               => (Method::Anim, *prefix),
        ["soun", prefix]               => (Method::Soun, *prefix),
        ["atos", animal]               => (Method::Atos, *animal),
        ["help"] | ["--help"] | ["-h"] => {
            print_usage();
            return Ok(());
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    let reply = request(&opts, method, body).await?;
    println!("{reply}");
    Ok(())
}

fn random_key() -> Result<Key> {
    let raw = rand::thread_rng().gen_range(Key::MIN..=Key::MAX);
    Key::new(raw).context("generated key out of range")
}
