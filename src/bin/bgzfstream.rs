use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::info;

use bgzfstream::bgzf::BGZF_EOF;
use bgzfstream::device::is_stdio_path;
use bgzfstream::{
    is_bgzf, open_device, validate_bgzf, verify_bgzf, BgzfStream, Device, OpenMode,
    StreamConfig, VirtualOffset,
};

#[derive(Parser, Debug)]
#[command(name = "bgzfstream")]
#[command(about = "Compress, decompress and randomly access BGZF files")]
#[command(version)]
struct Args {
    /// Input file (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (use - for stdout)
    #[arg(short, long, required_unless_present = "check")]
    output: Option<PathBuf>,

    /// Decompress BGZF input instead of compressing
    #[arg(short, long)]
    decompress: bool,

    /// Virtual offset to start decompressing from (raw value or address:offset)
    #[arg(long, requires = "decompress")]
    offset: Option<VirtualOffset>,

    /// Maximum number of decompressed bytes to emit
    #[arg(long, requires = "decompress")]
    length: Option<u64>,

    /// Write stored (level 0) blocks instead of compressing
    #[arg(long)]
    uncompressed: bool,

    /// Uncompressed BGZF block size (default: 65536)
    #[arg(long, default_value = "65536")]
    block_size: usize,

    /// Write a GZI block index to this path while compressing
    #[arg(long, conflicts_with = "decompress")]
    index: Option<PathBuf>,

    /// Check if input is BGZF and exit (0=BGZF, 1=not BGZF, 2=error)
    #[arg(long)]
    check: bool,

    /// With --check, inflate every block and verify its CRC32
    #[arg(long, requires = "check")]
    strict: bool,

    /// Show verbose statistics
    #[arg(short, long)]
    verbose: bool,
}

/// Exit codes for --check mode
const EXIT_IS_BGZF: u8 = 0;
const EXIT_NOT_BGZF: u8 = 1;
const EXIT_ERROR: u8 = 2;

/// Copy buffer size for streaming between input and output
const COPY_BUFFER_SIZE: usize = 128 * 1024;

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(args: &Args) -> Result<u8, Box<dyn std::error::Error>> {
    if args.check {
        return run_check_mode(args);
    }

    let Some(output) = args.output.as_deref() else {
        return Err("--output is required unless --check is given".into());
    };

    if args.decompress {
        run_decompress(args, output)?;
    } else {
        run_compress(args, output)?;
    }
    Ok(EXIT_IS_BGZF)
}

fn run_check_mode(args: &Args) -> Result<u8, Box<dyn std::error::Error>> {
    let mut device = open_device(&args.input);
    device.open(OpenMode::ReadOnly)?;

    let is_valid = if args.strict {
        let validation = verify_bgzf(&mut device)?;
        if validation.is_valid_bgzf {
            info!(
                "{} blocks, {} uncompressed bytes, EOF marker {}",
                validation.block_count,
                validation.total_uncompressed_size,
                if validation.has_eof_marker { "present" } else { "missing" }
            );
        }
        validation.is_valid_bgzf
    } else {
        let quick = is_bgzf(&mut device)?;
        if quick && device.is_random_access() {
            device.seek(0)?;
            validate_bgzf(&mut device)?.is_valid_bgzf
        } else {
            quick
        }
    };
    device.close()?;

    if is_valid {
        info!("{} is BGZF", args.input.display());
        Ok(EXIT_IS_BGZF)
    } else {
        info!("{} is not BGZF", args.input.display());
        Ok(EXIT_NOT_BGZF)
    }
}

fn run_compress(args: &Args, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = StreamConfig {
        block_size: args.block_size,
        write_compressed: !args.uncompressed,
        build_index: args.index.is_some(),
    };

    let mut input = open_device(&args.input);
    input.open(OpenMode::ReadOnly)?;
    let mut stream = BgzfStream::writer(open_device(output), config)?;

    let start = std::time::Instant::now();
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut total: u64 = 0;
    loop {
        let n = input.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        stream.write(&buffer[..n])?;
        total += n as u64;
    }
    input.close()?;

    stream.flush()?;
    let compressed = stream.tell().block_address() + BGZF_EOF.len() as u64;
    stream.close()?;

    if let (Some(path), Some(index)) = (&args.index, stream.take_index()) {
        let mut writer = BufWriter::new(File::create(path)?);
        index.write(&mut writer)?;
        writer.flush()?;
        info!("Wrote {} index entries to {}", index.len(), path.display());
    }

    let elapsed = start.elapsed();
    info!("Compression complete:");
    info!("  Input bytes:      {}", total);
    info!("  Output bytes:     {}", compressed);
    info!("  Time:             {:.2?}", elapsed);
    Ok(())
}

fn run_decompress(args: &Args, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut stream = BgzfStream::reader(open_device(&args.input))?;
    if let Some(offset) = args.offset {
        stream.seek(offset)?;
    }

    let mut out: Box<dyn Write> = if is_stdio_path(output) {
        Box::new(io::stdout().lock())
    } else {
        Box::new(BufWriter::new(File::create(output)?))
    };

    let start = std::time::Instant::now();
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut remaining = args.length.unwrap_or(u64::MAX);
    let mut total: u64 = 0;
    while remaining > 0 {
        let want = remaining.min(buffer.len() as u64) as usize;
        let n = stream.read(&mut buffer[..want])?;
        if n == 0 {
            break;
        }
        out.write_all(&buffer[..n])?;
        remaining -= n as u64;
        total += n as u64;
    }
    out.flush()?;
    stream.close()?;

    info!("Decompression complete:");
    info!("  Output bytes:     {}", total);
    info!("  Time:             {:.2?}", start.elapsed());
    Ok(())
}
