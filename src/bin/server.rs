//! bufsync Server Binary
//!
//! Demo device: exposes a `Settings` record and a live `StreamData` record
//! over the streaming TCP transport.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bufsync::network::Server;
use bufsync::stream::{encode_message, CommandStatus};
use bufsync::{BufferHandle, CommandBinding, CommandRegistry, Config, Dispatcher, Reply, TypeRegistry};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// Packed size of `Settings`: ssid[16], password[16], mode, version, sub,
/// subSettings[5], colors[3]
const SETTINGS_LEN: usize = 16 + 16 + 1 + 4 + 6 + 5 * 6 + 3 * 3;

/// Packed size of `StreamData`: id, clients, frame, fps, time
const STREAM_DATA_LEN: usize = 5 * 4;

/// bufsync Server
#[derive(Parser, Debug)]
#[command(name = "bufsync-server")]
#[command(about = "Serve device buffers to remote clients")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "8")]
    max_connections: usize,

    /// Disable checksum verification
    #[arg(long)]
    no_checksum: bool,

    /// Push `stream` data to every client at this interval (0 = off)
    #[arg(short, long, default_value = "0")]
    push_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bufsync=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("bufsync server v{}", bufsync::VERSION);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .use_checksum(!args.no_checksum)
        .build();

    let types = Arc::new(
        TypeRegistry::builder()
            .register_all(["SubSetting", "Color", "Settings", "AllTypes", "StreamData"])
            .build(),
    );
    let settings_type = types.id_of("Settings");
    let stream_type = types.id_of("StreamData");

    let settings = BufferHandle::zeroed(SETTINGS_LEN);
    let stream_data = BufferHandle::zeroed(STREAM_DATA_LEN);

    let commands = CommandRegistry::new()
        .with(
            CommandBinding::new("settings")
                .type_id(settings_type)
                .buffer(settings.clone())
                .callback(|event| {
                    if event.status == CommandStatus::Set {
                        tracing::info!("Settings updated ({} bytes)", event.fragment_len);
                    }
                    Reply::AutoReply
                }),
        )
        .with(
            CommandBinding::new("stream")
                .type_id(stream_type)
                .buffer(stream_data.clone()),
        )
        .with(CommandBinding::new("ping"));

    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&types), commands));

    let server = match Server::bind(config, dispatcher) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if args.push_ms > 0 {
        let hub = server.hub();
        let shutdown = server.shutdown_handle();
        let interval = Duration::from_millis(args.push_ms);
        thread::spawn(move || {
            let started = Instant::now();
            let mut frame: i32 = 0;
            while !shutdown.is_shutdown() {
                thread::sleep(interval);
                frame = frame.wrapping_add(1);

                // Fields are little-endian, matching the device's packed layout
                let clients = hub.len() as u32;
                let elapsed = started.elapsed();
                let fps = frame as f32 / elapsed.as_secs_f32().max(f32::EPSILON);
                {
                    let mut bytes = stream_data.lock();
                    bytes[4..8].copy_from_slice(&clients.to_le_bytes());
                    bytes[8..12].copy_from_slice(&frame.to_le_bytes());
                    bytes[12..16].copy_from_slice(&fps.to_le_bytes());
                    bytes[16..20].copy_from_slice(&(elapsed.as_millis() as u32).to_le_bytes());
                }

                let message = encode_message("stream", stream_type, &stream_data.snapshot());
                hub.send_all(&message);
            }
        });
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
