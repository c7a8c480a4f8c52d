//! meshtap: decode, record and craft LoRa mesh traffic.
//!
//! Subcommands:
//!
//! - `decode`  replay a capture file through the codec and store the records
//! - `record`  frame a sniffer's serial stream into a capture file
//! - `bridge`  decode bridge messages saved one per file
//! - `encode`  build a radio frame or bridge message from an application body
//! - `nodes`   list node identities held by the record store

use anyhow::{anyhow, bail, Context, Result};
use bytes::BytesMut;
use clap::{Args as ClapArgs, Parser, Subcommand};
use meshtap_capture::{CaptureReader, CaptureWriter, SerialFramer, LINKTYPE_LORATAP};
use meshtap_proto::PortNum;
use meshtap_storage::open_sink;
use meshtap_wire::{
    decode_capture_frame, ApplicationRecord, CaptureFrame, CaptureHeader, ChannelKey,
    DecryptedPayload, FrameBuilder, MeshHeader, PacketFlags,
};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing_subscriber::EnvFilter;

#[macro_use]
mod logging;
mod config;
mod ingest;

use config::{ConfigSource, MeshtapConfig};
use ingest::{describe, Ingest, IngestStats};
use logging::MeshtapLogFormatter;

/// Read from stdin or write to stdout instead of a file
const STDIO: &str = "-";

/// Sniffer serial line speed
const DEFAULT_BAUD_RATE: u32 = 9600;

/// LoRa mesh packet decoder and capture tool
#[derive(Parser, Debug)]
#[command(name = "meshtap", version, about = "LoRa mesh packet decoder and capture tool")]
struct Args {
    /// Path to a YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Channel key as base64 text; empty for an unencrypted channel
    #[arg(long, global = true)]
    channel_key: Option<String>,

    /// Record storage mode (memory, file)
    #[arg(long, global = true)]
    storage_mode: Option<String>,

    /// Data directory for file storage
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a capture file and store the records
    Decode {
        /// Capture file, or `-` for stdin
        input: String,

        /// Print stored records as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Record frames from a serial sniffer into a capture file
    Record {
        /// Serial port; the first available port when omitted
        #[arg(long, short)]
        port: Option<String>,

        /// Serial line speed (8N1)
        #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
        baud: u32,

        /// Read raw sniffer bytes from a file, or `-` for stdin, instead of a port
        #[arg(long, short, conflicts_with = "port")]
        input: Option<String>,

        /// Capture file, or `-` for stdout; defaults to a timestamped name
        #[arg(long, short)]
        out: Option<String>,

        /// Log a summary of each recorded frame
        #[arg(long)]
        show: bool,
    },

    /// Decode bridge messages, one message per file
    Bridge {
        /// Files holding one raw bridge message each
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print stored records as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Encode an application body into a frame
    Encode(EncodeArgs),

    /// List stored node identities
    Nodes,
}

#[derive(ClapArgs, Debug)]
struct EncodeArgs {
    /// Source node (`!hex`, `0x` hex or decimal)
    #[arg(long, value_parser = parse_node_id)]
    src: u32,

    /// Destination node; broadcast when omitted
    #[arg(long, value_parser = parse_node_id, default_value = "!ffffffff")]
    dst: u32,

    /// Packet id
    #[arg(long, default_value_t = 1)]
    id: u32,

    /// Text message body
    #[arg(long, conflicts_with_all = ["app", "fields"])]
    text: Option<String>,

    /// Application name or number for a structured body
    #[arg(long, value_parser = parse_message_type, requires = "fields")]
    app: Option<u32>,

    /// Structured body as JSON
    #[arg(long, requires = "app")]
    fields: Option<String>,

    /// Ask the destination to reply
    #[arg(long)]
    want_response: bool,

    /// Hop limit (0..7)
    #[arg(long, default_value_t = 3)]
    hop_limit: u8,

    /// Channel frequency in Hz
    #[arg(long, default_value_t = 906_875_000)]
    frequency: u32,

    /// Channel bandwidth code (125 kHz steps)
    #[arg(long, default_value_t = 2)]
    bandwidth_code: u8,

    /// Spreading factor
    #[arg(long, default_value_t = 11)]
    sf: u8,

    /// Emit a bridge message instead of a capture file
    #[arg(long)]
    bridge: bool,

    /// Channel name carried in the bridge message
    #[arg(long, default_value = "LongFast")]
    channel_id: String,

    /// Gateway id carried in the bridge message
    #[arg(long, default_value = "!00000000")]
    gateway_id: String,

    /// Output file, or `-` for stdout
    #[arg(long, short, default_value = STDIO)]
    out: String,
}

/// Parse a node id written as `!hex`, `0x` hex or decimal
fn parse_node_id(value: &str) -> Result<u32, String> {
    let parsed = if let Some(hex) = value.strip_prefix('!') {
        u32::from_str_radix(hex, 16)
    } else if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        value.parse::<u32>()
    };
    parsed.map_err(|e| format!("invalid node id {:?}: {}", value, e))
}

/// Parse a message type given by canonical name or number
fn parse_message_type(value: &str) -> Result<u32, String> {
    if let Ok(number) = value.parse::<u32>() {
        return Ok(number);
    }
    PortNum::from_str_name(value)
        .map(|port| port as u32)
        .ok_or_else(|| format!("unknown application {:?}", value))
}

/// Default name for a new capture file
fn default_capture_name() -> String {
    chrono::Local::now()
        .format("output-%Y%m%d-%H%M%S.pcap")
        .to_string()
}

fn open_input(path: &str) -> Result<Box<dyn Read>> {
    if path == STDIO {
        return Ok(Box::new(std::io::stdin().lock()));
    }
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path))?;
    Ok(Box::new(std::io::BufReader::new(file)))
}

fn open_output(path: &str) -> Result<Box<dyn Write>> {
    if path == STDIO {
        return Ok(Box::new(std::io::stdout().lock()));
    }
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path))?;
    Ok(Box::new(std::io::BufWriter::new(file)))
}

fn report(component: &'static str, stats: &IngestStats) {
    component_info!(
        component,
        frames = stats.frames,
        mesh = stats.mesh,
        foreign = stats.foreign,
        failed = stats.failed,
        decoded = stats.apps_decoded,
        stored = stats.stored,
        duplicates = stats.duplicates,
        nodes = stats.nodes,
        "Run finished"
    );
}

async fn run_decode(config: &MeshtapConfig, key: &ChannelKey, input: &str, json: bool) -> Result<()> {
    let mut reader = CaptureReader::new(open_input(input)?)?;
    if reader.link_type() != LINKTYPE_LORATAP {
        component_warn!(
            "decode",
            "Capture link type is {}, expected {}; decoding anyway",
            reader.link_type(),
            LINKTYPE_LORATAP
        );
    }

    let sink = open_sink(config.storage_mode()?).await?;
    let mut ingest = Ingest::new(sink.as_ref(), key);
    let mut index = 0u64;

    loop {
        let captured = match reader.next_record() {
            Ok(Some(captured)) => captured,
            Ok(None) => break,
            Err(e) => {
                component_warn!("decode", "Stopped reading at frame {}: {}", index + 1, e);
                break;
            }
        };
        index += 1;
        if captured.is_truncated() {
            component_warn!(
                "decode",
                "Frame {} truncated to {} of {} bytes",
                index,
                captured.data.len(),
                captured.original_len
            );
        }

        match ingest.capture(captured.timestamp, &captured.data).await {
            Ok((frame, record)) => {
                if json {
                    println!("{}", serde_json::to_string(&record)?);
                } else {
                    match &frame {
                        CaptureFrame::Mesh { capture, packet } => {
                            println!("#{} [{}] {}", index, capture, describe(packet))
                        }
                        CaptureFrame::Foreign { capture, body } => println!(
                            "#{} [{}] foreign LoRa frame, {} bytes",
                            index,
                            capture,
                            body.len()
                        ),
                    }
                }
            }
            Err(e) => component_warn!("decode", "Frame {} skipped: {}", index, e),
        }
    }

    sink.flush().await?;
    report("decode", &ingest.stats);
    Ok(())
}

/// Comma-separated port names for error messages
fn port_list(ports: &[String]) -> String {
    if ports.is_empty() {
        "none".to_string()
    } else {
        ports.join(", ")
    }
}

/// Open a sniffer port at `baud` 8N1, or the first available port
fn open_serial(port: Option<&str>, baud: u32) -> Result<(String, SerialStream)> {
    let available: Vec<String> = tokio_serial::available_ports()
        .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
        .unwrap_or_default();

    let name = match port {
        Some(name) => name.to_string(),
        None => match available.first() {
            Some(name) => name.clone(),
            None => bail!("No serial devices connected"),
        },
    };

    let stream = tokio_serial::new(name.as_str(), baud)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .open_native_async()
        .map_err(|e| {
            anyhow!(
                "Could not open serial port {}: {}. Available ports: {}. Specify the desired port with --port",
                name,
                e,
                port_list(&available)
            )
        })?;
    Ok((name, stream))
}

/// Frame `source` into `writer` until end of input or Ctrl-C.
///
/// Oversized or unterminated input is logged and dropped; recording goes on.
async fn record_stream<R, W>(
    mut source: R,
    writer: &mut CaptureWriter<W>,
    key: &ChannelKey,
    show: bool,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: Write,
{
    let mut framer = SerialFramer::new();
    let mut buf = BytesMut::with_capacity(8192);
    loop {
        tokio::select! {
            read = source.read_buf(&mut buf) => {
                if read? == 0 {
                    component_info!("record", "Input closed");
                    break;
                }
                loop {
                    let frame = match framer.decode(&mut buf) {
                        Ok(Some(frame)) => frame,
                        Ok(None) => break,
                        Err(e) => {
                            component_warn!("record", "Dropped serial input: {}", e);
                            continue;
                        }
                    };
                    writer.write_frame_now(&frame)?;
                    writer.flush()?;
                    if show {
                        match decode_capture_frame(frame, key) {
                            Ok(CaptureFrame::Mesh { packet, .. }) => {
                                component_info!("record", "{}", describe(&packet))
                            }
                            Ok(CaptureFrame::Foreign { capture, .. }) => {
                                component_info!("record", "Foreign frame [{}]", capture)
                            }
                            Err(e) => component_warn!("record", "Undecodable frame: {}", e),
                        }
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                component_info!("record", "Interrupted");
                break;
            }
        }
    }
    Ok(())
}

async fn run_record(
    config: &MeshtapConfig,
    key: &ChannelKey,
    source: RecordSource,
    out: Option<String>,
    show: bool,
) -> Result<()> {
    let out = out.unwrap_or_else(default_capture_name);
    let (name, source): (String, Box<dyn AsyncRead + Unpin>) = match source {
        RecordSource::Port { port, baud } => {
            let (name, stream) = open_serial(port.as_deref(), baud)?;
            let stream: Box<dyn AsyncRead + Unpin> = Box::new(stream);
            (format!("{} at {} baud", name, baud), stream)
        }
        RecordSource::Stream(path) if path == STDIO => {
            let stdin: Box<dyn AsyncRead + Unpin> = Box::new(tokio::io::stdin());
            ("stdin".to_string(), stdin)
        }
        RecordSource::Stream(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("opening {}", path))?;
            let file: Box<dyn AsyncRead + Unpin> = Box::new(file);
            (path, file)
        }
    };

    let mut writer = CaptureWriter::with_options(
        open_output(&out)?,
        config.capture.snap_len,
        config.capture.link_type,
    )?;
    component_info!("record", "Recording {} into {}", name, out);

    record_stream(source, &mut writer, key, show).await?;

    writer.flush()?;
    component_info!("record", frames = writer.frames_written(), "Recording stopped");
    Ok(())
}

/// Where `record` reads sniffer bytes from
#[derive(Debug, PartialEq)]
enum RecordSource {
    /// Serial port, auto-selected when `port` is None
    Port {
        /// Port name
        port: Option<String>,
        /// Line speed
        baud: u32,
    },
    /// File or stdin
    Stream(String),
}

impl RecordSource {
    fn from_args(port: Option<String>, baud: u32, input: Option<String>) -> Self {
        match input {
            Some(path) => RecordSource::Stream(path),
            None => RecordSource::Port { port, baud },
        }
    }
}

async fn run_bridge(
    config: &MeshtapConfig,
    key: &ChannelKey,
    files: &[PathBuf],
    json: bool,
) -> Result<()> {
    let sink = open_sink(config.storage_mode()?).await?;
    let mut ingest = Ingest::new(sink.as_ref(), key);

    for path in files {
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) => {
                component_warn!("bridge", "Cannot read {}: {}", path.display(), e);
                continue;
            }
        };

        match ingest.bridge(chrono::Utc::now(), &data).await {
            Ok((frame, record)) => {
                if json {
                    println!("{}", serde_json::to_string(&record)?);
                } else {
                    println!("{}: {}", path.display(), describe(&frame));
                }
            }
            Err(e) => component_warn!("bridge", "{} skipped: {}", path.display(), e),
        }
    }

    sink.flush().await?;
    report("bridge", &ingest.stats);
    Ok(())
}

fn application_record(args: &EncodeArgs) -> Result<ApplicationRecord> {
    match (&args.text, args.app, &args.fields) {
        (Some(text), _, _) => Ok(ApplicationRecord::text(text.as_str())),
        (None, Some(message_type), Some(fields)) => {
            let fields = serde_json::from_str(fields).context("parsing --fields")?;
            Ok(ApplicationRecord::structured(message_type, fields))
        }
        _ => bail!("give either --text or --app with --fields"),
    }
}

fn run_encode(config: &MeshtapConfig, key: &ChannelKey, args: &EncodeArgs) -> Result<()> {
    if args.hop_limit > 7 {
        bail!("hop limit {} out of range 0..7", args.hop_limit);
    }
    let record = application_record(args)?;

    let mut header = MeshHeader::new(args.src, args.dst, args.id);
    header.flags = PacketFlags::new(args.hop_limit, false, false, args.hop_limit);

    let mut payload = DecryptedPayload::new(record.message_type, bytes::Bytes::new());
    payload.want_response = args.want_response;
    let builder = FrameBuilder::new(header).payload_fields(payload);

    let mut out = open_output(&args.out)?;
    if args.bridge {
        let message = builder.build_bridge(&record, key, &args.channel_id, &args.gateway_id)?;
        out.write_all(&message)?;
        out.flush()?;
        component_info!("encode", bytes = message.len(), "Bridge message written to {}", args.out);
        return Ok(());
    }

    let frame = builder
        .with_capture(CaptureHeader::new(args.frequency, args.bandwidth_code, args.sf))
        .build(&record, key)?;
    let mut writer =
        CaptureWriter::with_options(out, config.capture.snap_len, config.capture.link_type)?;
    writer.write_frame_now(&frame)?;
    writer.flush()?;
    component_info!("encode", bytes = frame.len(), "Capture frame written to {}", args.out);
    Ok(())
}

async fn run_nodes(config: &MeshtapConfig) -> Result<()> {
    let sink = open_sink(config.storage_mode()?).await?;
    for node in sink.nodes().await? {
        println!("{}", serde_json::to_string(&node)?);
    }
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let env_filter = EnvFilter::new("warn")
        .add_directive(format!("meshtap={}", level).parse()?)
        .add_directive(format!("meshtap_wire={}", level).parse()?)
        .add_directive(format!("meshtap_capture={}", level).parse()?)
        .add_directive(format!("meshtap_storage={}", level).parse()?);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .event_format(MeshtapLogFormatter::new("meshtap"))
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {}", e))
}

fn apply_cli_overrides(config: &mut MeshtapConfig, args: &Args) {
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    if let Some(key) = &args.channel_key {
        config.channel_key = key.clone();
    }
    if let Some(mode) = &args.storage_mode {
        config.storage.mode = mode.clone();
    }
    if let Some(dir) = &args.data_dir {
        config.storage.data_dir = dir.clone();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = MeshtapConfig::load(args.config.as_deref().map(Path::new));
    apply_cli_overrides(&mut config, &args);
    init_logging(&config.log_level)?;

    component_debug!("config", "Configuration from {}", config.source);
    if matches!(config.source, ConfigSource::Fallback { .. }) {
        component_warn!("config", "Using {}", config.source);
    }

    let key = config.channel_key().context("invalid channel key")?;
    component_debug!("config", "Channel key: {} bits", key.bits());

    match &args.command {
        Command::Decode { input, json } => run_decode(&config, &key, input, *json).await,
        Command::Record {
            port,
            baud,
            input,
            out,
            show,
        } => {
            let source = RecordSource::from_args(port.clone(), *baud, input.clone());
            run_record(&config, &key, source, out.clone(), *show).await
        }
        Command::Bridge { files, json } => run_bridge(&config, &key, files, *json).await,
        Command::Encode(encode) => run_encode(&config, &key, encode),
        Command::Nodes => run_nodes(&config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_node_id() {
        assert_eq!(parse_node_id("!12345678"), Ok(0x1234_5678));
        assert_eq!(parse_node_id("0xffffffff"), Ok(0xFFFF_FFFF));
        assert_eq!(parse_node_id("42"), Ok(42));
        assert!(parse_node_id("!xyz").is_err());
        assert!(parse_node_id("").is_err());
    }

    #[test]
    fn test_parse_message_type() {
        assert_eq!(parse_message_type("TEXT_MESSAGE_APP"), Ok(1));
        assert_eq!(parse_message_type("NODEINFO_APP"), Ok(4));
        assert_eq!(parse_message_type("255"), Ok(255));
        assert!(parse_message_type("NOT_AN_APP").is_err());
    }

    #[test]
    fn test_default_capture_name() {
        let name = default_capture_name();
        assert!(name.starts_with("output-"));
        assert!(name.ends_with(".pcap"));
        assert_eq!(name.len(), "output-20240101-000000.pcap".len());
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "meshtap",
            "--channel-key",
            "",
            "--storage-mode",
            "file",
            "--data-dir",
            "/tmp/meshtap",
            "nodes",
        ]);
        let mut config = MeshtapConfig::default();
        apply_cli_overrides(&mut config, &args);

        assert_eq!(config.channel_key().unwrap(), ChannelKey::Unencrypted);
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/meshtap"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_encode_body_selection() {
        let args = Args::parse_from(["meshtap", "encode", "--src", "!12345678", "--text", "hi"]);
        let Command::Encode(encode) = args.command else {
            panic!("expected encode");
        };
        assert_eq!(encode.dst, 0xFFFF_FFFF);
        assert_eq!(application_record(&encode).unwrap(), ApplicationRecord::text("hi"));

        let args = Args::parse_from([
            "meshtap",
            "encode",
            "--src",
            "1",
            "--app",
            "POSITION_APP",
            "--fields",
            r#"{"latitudeI": 10}"#,
        ]);
        let Command::Encode(encode) = args.command else {
            panic!("expected encode");
        };
        let record = application_record(&encode).unwrap();
        assert_eq!(record.message_type, 3);
    }

    #[test]
    fn test_encode_writes_capture_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pcap");
        let args = Args::parse_from([
            "meshtap",
            "encode",
            "--src",
            "!12345678",
            "--text",
            "hello",
            "--out",
            path.to_str().unwrap(),
        ]);
        let Command::Encode(encode) = args.command else {
            panic!("expected encode");
        };
        let key = ChannelKey::default();
        run_encode(&MeshtapConfig::default(), &key, &encode).unwrap();

        let mut reader = CaptureReader::new(std::fs::File::open(&path).unwrap()).unwrap();
        let captured = reader.next_record().unwrap().unwrap();
        let frame = decode_capture_frame(bytes::Bytes::from(captured.data), &key).unwrap();
        let CaptureFrame::Mesh { packet, .. } = frame else {
            panic!("expected a mesh frame");
        };
        assert_eq!(packet.link.source().to_string(), "!12345678");
        assert_eq!(packet.app.unwrap(), ApplicationRecord::text("hello"));
    }

    /// Yields one queued chunk per read
    struct ChunkedReader(std::collections::VecDeque<Vec<u8>>);

    impl AsyncRead for ChunkedReader {
        fn poll_read(
            mut self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            if let Some(mut chunk) = self.0.pop_front() {
                let n = chunk.len().min(buf.remaining());
                buf.put_slice(&chunk[..n]);
                if n < chunk.len() {
                    self.0.push_front(chunk.split_off(n));
                }
            }
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_recording_continues_after_noise() {
        let chunks = vec![vec![0x11u8; 5000], b"good-frame\xCF\xCF".to_vec()];
        let mut writer = CaptureWriter::new(Vec::new()).unwrap();

        record_stream(
            ChunkedReader(chunks.into()),
            &mut writer,
            &ChannelKey::default(),
            false,
        )
        .await
        .unwrap();
        assert_eq!(writer.frames_written(), 1);

        let bytes = writer.into_inner();
        let mut reader = CaptureReader::new(&bytes[..]).unwrap();
        assert_eq!(reader.next_record().unwrap().unwrap().data, b"good-frame");
        assert!(reader.next_record().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_truncated_capture_keeps_decoded_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cut.pcap");
        let key = ChannelKey::default();

        let mut writer = CaptureWriter::new(Vec::new()).unwrap();
        for (packet_id, text) in [(10u32, "first"), (20, "second")] {
            let frame = FrameBuilder::new(MeshHeader::new(0x12345678, 0xFFFF_FFFF, packet_id))
                .with_capture(CaptureHeader::new(906_875_000, 2, 11))
                .build(&ApplicationRecord::text(text), &key)
                .unwrap();
            writer
                .write_frame(std::time::Duration::from_secs(u64::from(packet_id)), &frame)
                .unwrap();
        }
        let mut bytes = writer.into_inner();
        bytes.truncate(bytes.len() - 5);
        std::fs::write(&path, &bytes).unwrap();

        let mut config = MeshtapConfig::default();
        config.storage.mode = "file".to_string();
        config.storage.data_dir = dir.path().join("data");
        run_decode(&config, &key, path.to_str().unwrap(), false)
            .await
            .unwrap();

        let sink = open_sink(config.storage_mode().unwrap()).await.unwrap();
        let packets = sink.packets().await.unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].packet_id, Some(10));
    }

    #[test]
    fn test_record_source_selection() {
        let args = Args::parse_from(["meshtap", "record", "--port", "/dev/ttyUSB0", "--baud", "115200"]);
        let Command::Record { port, baud, input, .. } = args.command else {
            panic!("expected record");
        };
        assert_eq!(
            RecordSource::from_args(port, baud, input),
            RecordSource::Port {
                port: Some("/dev/ttyUSB0".to_string()),
                baud: 115_200
            }
        );

        let args = Args::parse_from(["meshtap", "record"]);
        let Command::Record { port, baud, input, .. } = args.command else {
            panic!("expected record");
        };
        assert_eq!(
            RecordSource::from_args(port, baud, input),
            RecordSource::Port {
                port: None,
                baud: DEFAULT_BAUD_RATE
            }
        );

        let args = Args::parse_from(["meshtap", "record", "-i", "-"]);
        let Command::Record { port, baud, input, .. } = args.command else {
            panic!("expected record");
        };
        assert_eq!(
            RecordSource::from_args(port, baud, input),
            RecordSource::Stream("-".to_string())
        );

        assert!(Args::try_parse_from(["meshtap", "record", "-p", "/dev/ttyUSB0", "-i", "-"]).is_err());
    }

    #[test]
    fn test_port_list() {
        assert_eq!(port_list(&[]), "none");
        assert_eq!(
            port_list(&["/dev/ttyUSB0".to_string(), "/dev/ttyACM0".to_string()]),
            "/dev/ttyUSB0, /dev/ttyACM0"
        );
    }
}
