//! packdump
//!
//! Decodes a hex dump of Bolt traffic: de-chunks it and prints every
//! message it contains.
//!
//! ```text
//! $ packdump --side server "00 03 B1 70 A0 00 00"
//! #1 SUCCESS (3 bytes): Success({})
//! ```

use std::io::Read;

use boltwire::chunk::Dechunker;
use boltwire::protocol::{decode_request, decode_response, MessageFormat, ProtocolVersion};
use boltwire::{BoltError, Result};
use bytes::Bytes;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

/// Which peer produced the traffic
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Side {
    /// Requests sent by a client
    Client,
    /// Responses sent by a server
    Server,
}

/// Bolt traffic decoder
#[derive(Parser, Debug)]
#[command(name = "packdump")]
#[command(about = "Decode hex dumps of chunked Bolt messages")]
#[command(version)]
struct Args {
    /// Hex bytes (whitespace and ':' ignored); read from stdin when omitted
    hex: Option<String>,

    /// Peer that sent the bytes
    #[arg(short, long, value_enum, default_value = "server")]
    side: Side,

    /// Negotiated protocol version (major.minor)
    #[arg(short, long, default_value = "5.0")]
    protocol: String,

    /// Input is a single message payload without chunk framing
    #[arg(short, long)]
    unchunked: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,boltwire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = dump(&args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn dump(args: &Args) -> Result<()> {
    let version = parse_version(&args.protocol)?;
    let format = MessageFormat::new(version)?;

    let text = match &args.hex {
        Some(text) => text.clone(),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    let bytes = parse_hex(&text)?;
    tracing::debug!(
        "Decoding {} bytes as {:?} traffic on protocol {}",
        bytes.len(),
        args.side,
        version
    );

    let messages = if args.unchunked {
        vec![Bytes::from(bytes)]
    } else {
        let mut dechunker = Dechunker::new();
        let messages = dechunker.push(&bytes);
        if dechunker.is_mid_message() {
            tracing::warn!("Input ends in the middle of a message; trailing bytes ignored");
        }
        messages
    };

    for (i, message) in messages.into_iter().enumerate() {
        let len = message.len();
        match args.side {
            Side::Client => {
                let request = decode_request(&format, message)?;
                println!("#{} {} ({} bytes): {:?}", i + 1, request.name(), len, request);
            }
            Side::Server => {
                let response = decode_response(&format, message)?;
                println!("#{} {} ({} bytes): {:?}", i + 1, response.name(), len, response);
            }
        }
    }
    Ok(())
}

fn parse_version(text: &str) -> Result<ProtocolVersion> {
    let invalid = || BoltError::Config(format!("invalid protocol version {:?}", text));
    let (major, minor) = text.split_once('.').ok_or_else(invalid)?;
    let major = major.trim().parse().map_err(|_| invalid())?;
    let minor = minor.trim().parse().map_err(|_| invalid())?;
    Ok(ProtocolVersion::new(major, minor))
}

fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits).map_err(|e| BoltError::Config(format!("invalid hex input: {}", e)))
}
