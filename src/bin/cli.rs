//! bufsync CLI Client
//!
//! Command-line interface for reading and writing device buffers over the
//! streaming TCP transport.

use std::io::BufReader;
use std::net::TcpStream;

use bufsync::checksum::fletcher16;
use bufsync::network::{read_reply, write_fragment};
use bufsync::stream::{encode_message_with_token, parse_message, split_fragments};
use bufsync::Result;
use clap::{Parser, Subcommand};

/// Largest reply the CLI will accept
const MAX_REPLY_LEN: usize = 16 * 1024 * 1024;

/// bufsync CLI
#[derive(Parser, Debug)]
#[command(name = "bufsync-cli")]
#[command(about = "CLI for bufsync devices")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Split outgoing messages into fragments of this many bytes (0 = whole)
    #[arg(short, long, default_value = "0")]
    fragment: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read a buffer (sends an empty body)
    Get {
        /// Command name
        command: String,

        /// Type name or id
        #[arg(default_value = "0")]
        type_token: String,
    },

    /// Write a buffer
    Set {
        /// Command name
        command: String,

        /// Type name or id
        type_token: String,

        /// Body as hex
        #[arg(long, conflicts_with = "text")]
        hex: Option<String>,

        /// Body as UTF-8 text
        #[arg(long)]
        text: Option<String>,
    },

    /// Print pushed messages
    Watch {
        /// Stop after this many messages (0 = forever)
        #[arg(short, long, default_value = "0")]
        count: usize,
    },
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let stream = TcpStream::connect(&args.server)?;
    let mut writer = stream.try_clone()?;
    let mut reader = BufReader::new(stream);

    let message = match args.command {
        Commands::Get { command, type_token } => encode_message_with_token(&command, &type_token, &[]),
        Commands::Set {
            command,
            type_token,
            hex: hex_body,
            text,
        } => {
            let body = match (hex_body, text) {
                (Some(h), _) => hex::decode(h.trim())
                    .map_err(|e| bufsync::BufSyncError::Config(format!("invalid hex body: {}", e)))?,
                (None, Some(t)) => t.into_bytes(),
                (None, None) => Vec::new(),
            };
            encode_message_with_token(&command, &type_token, &body)
        }
        Commands::Watch { count } => {
            let mut seen = 0;
            while count == 0 || seen < count {
                print_reply(&read_reply(&mut reader, MAX_REPLY_LEN)?);
                seen += 1;
            }
            return Ok(());
        }
    };

    for fragment in split_fragments(&message, args.fragment) {
        write_fragment(&mut writer, &fragment)?;
    }

    print_reply(&read_reply(&mut reader, MAX_REPLY_LEN)?);
    Ok(())
}

fn print_reply(reply: &[u8]) {
    let (header, body) = parse_message(reply);
    println!(
        "command={} type={} len={} checksum={}",
        header.command,
        header.type_token,
        body.len(),
        fletcher16(body)
    );
    println!("{}", hex::encode(body));
}
