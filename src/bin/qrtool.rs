use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::OnceLock;

use clap::{Parser, Subcommand};
use log::{LevelFilter, Log, Metadata, Record};

use qrcodec::{Bitmap, Charset, DecodedSymbol, ECLevel, ImageDecoder, QrEncoder};

#[derive(Parser)]
#[command(name = "qrtool", version, about = "QR code encode/decode/fix tools")]
struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode text into a QR symbol PNG
    Encode {
        /// Text payload
        #[arg(long)]
        text: String,
        /// Output PNG path
        #[arg(long)]
        out: PathBuf,
        /// Symbol version 1-40 (default: smallest that fits)
        #[arg(long)]
        symbol_version: Option<u8>,
        /// Error correction level: L, M, Q or H
        #[arg(long, default_value = "M")]
        ec: String,
        /// Mask pattern 0-7 (default: lowest penalty)
        #[arg(long)]
        mask: Option<u8>,
        /// Encode text as ISO-8859-1 instead of UTF-8
        #[arg(long)]
        latin1: bool,
    },
    /// Decode QR symbols from an image file
    Decode {
        /// Input image (PNG or JPEG)
        #[arg(long)]
        image: PathBuf,
    },
    /// Decode a possibly damaged image and re-encode a clean symbol
    Fix {
        /// Input image (PNG or JPEG)
        #[arg(long)]
        image: PathBuf,
        /// Output PNG path
        #[arg(long)]
        out: PathBuf,
    },
}

struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "[{:>5}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let logger = LOGGER.get_or_init(|| StderrLogger { level });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

fn parse_ec(name: &str) -> Result<ECLevel, String> {
    match name.to_ascii_uppercase().as_str() {
        "L" => Ok(ECLevel::L),
        "M" => Ok(ECLevel::M),
        "Q" => Ok(ECLevel::Q),
        "H" => Ok(ECLevel::H),
        other => Err(format!("unknown EC level '{other}', expected L/M/Q/H")),
    }
}

fn load_bgr(path: &PathBuf) -> Result<(Vec<u8>, usize, usize), String> {
    let img = image::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let rgb = img.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let mut bgr = Vec::with_capacity(width * height * 3);
    for pixel in rgb.pixels() {
        bgr.extend_from_slice(&[pixel[2], pixel[1], pixel[0]]);
    }
    Ok((bgr, width, height))
}

fn decode_file(path: &PathBuf) -> Result<Vec<DecodedSymbol>, String> {
    let (bgr, width, height) = load_bgr(path)?;
    let bitmap =
        Bitmap::from_bgr24(width, height, &bgr).map_err(|e| format!("{}: {e}", path.display()))?;
    Ok(ImageDecoder::new().decode(&bitmap))
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Encode {
            text,
            out,
            symbol_version,
            ec,
            mask,
            latin1,
        } => {
            let charset = if latin1 {
                Charset::Iso8859_1
            } else {
                Charset::Utf8
            };
            let mut encoder = QrEncoder::new(parse_ec(&ec)?);
            encoder
                .encode_text(&text, charset, mask, symbol_version)
                .map_err(|e| e.to_string())?;
            encoder.save_png(&out).map_err(|e| e.to_string())?;
            println!(
                "wrote {} (version {}, mask {})",
                out.display(),
                encoder.version().map(|v| v.number()).unwrap_or_default(),
                encoder.mask().map(|m| m.code()).unwrap_or_default(),
            );
            Ok(())
        }
        Command::Decode { image } => {
            let symbols = decode_file(&image)?;
            if symbols.is_empty() {
                return Err("no QR symbol found".into());
            }
            for (i, s) in symbols.iter().enumerate() {
                println!(
                    "symbol {}: version {}, {}x{}, EC {:?}, mask {}{}",
                    i + 1,
                    s.version.number(),
                    s.dimension,
                    s.dimension,
                    s.ec_level,
                    s.mask.code(),
                    s.eci.map(|e| format!(", ECI {e}")).unwrap_or_default(),
                );
                println!("{}", s.text);
            }
            Ok(())
        }
        Command::Fix { image, out } => {
            let symbols = decode_file(&image)?;
            let symbol = symbols.first().ok_or("no QR symbol found")?;
            let mut encoder = QrEncoder::new(symbol.ec_level);
            encoder
                .encode(
                    &symbol.bytes,
                    Some(symbol.mask.code()),
                    symbol.version.number(),
                )
                .map_err(|e| e.to_string())?;
            encoder.save_png(&out).map_err(|e| e.to_string())?;
            println!("re-encoded {} -> {}", image.display(), out.display());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
