//! Redfmt CLI - Command-line tool for RED engine resource files.
//!
//! This is the main entry point for the redfmt command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use redfmt::prelude::*;

/// Redfmt - RED engine resource tool
#[derive(Parser)]
#[command(name = "redfmt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a raw LZF block
    LzfCompress {
        /// Input file
        #[arg(short, long, env = "INPUT_FILE")]
        input: PathBuf,

        /// Output file
        #[arg(short, long, env = "OUTPUT_FILE")]
        output: PathBuf,
    },

    /// Decompress a raw LZF block
    LzfDecompress {
        /// Input LZF block
        #[arg(short, long, env = "INPUT_FILE")]
        input: PathBuf,

        /// Output file
        #[arg(short, long, env = "OUTPUT_FILE")]
        output: PathBuf,

        /// Decompressed size in bytes
        #[arg(short, long)]
        size: usize,
    },

    /// Compress every file under a directory
    LzfBatch {
        /// Input directory
        #[arg(short, long, env = "INPUT_FOLDER")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// List the property chunks of a property stream
    Chunks {
        /// Input file
        #[arg(short, long, env = "INPUT_FILE")]
        input: PathBuf,

        /// Byte offset of the stream within the file
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::LzfCompress { input, output } => {
            cmd_lzf_compress(&input, &output)?;
        }
        Commands::LzfDecompress { input, output, size } => {
            cmd_lzf_decompress(&input, &output, size)?;
        }
        Commands::LzfBatch { input, output, filter } => {
            cmd_lzf_batch(&input, &output, filter.as_deref())?;
        }
        Commands::Chunks { input, offset, json } => {
            cmd_chunks(&input, offset, json)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` when set, otherwise `info`.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Outcome of packing one buffer.
enum Packed {
    Compressed(Vec<u8>),
    Stored,
}

/// Compress within a budget of the input length, falling back to storing
/// the data as-is when it does not shrink.
fn pack(compressor: &mut Compressor, data: &[u8]) -> Result<Packed> {
    match compressor.compress_to_vec(data, data.len()) {
        Ok(block) => Ok(Packed::Compressed(block)),
        Err(e) if e.is_insufficient_capacity() => Ok(Packed::Stored),
        Err(e) => Err(e.into()),
    }
}

fn cmd_lzf_compress(input: &PathBuf, output: &PathBuf) -> Result<()> {
    println!("Compressing: {} -> {}", input.display(), output.display());

    let data = fs::read(input).context("Failed to read input file")?;
    let mut compressor = Compressor::new();

    let start = Instant::now();
    match pack(&mut compressor, &data)? {
        Packed::Compressed(block) => {
            fs::write(output, &block).context("Failed to write output file")?;
            println!(
                "Compressed {} -> {} bytes ({:.1}%) in {:?}",
                data.len(),
                block.len(),
                ratio(block.len(), data.len()),
                start.elapsed()
            );
        }
        Packed::Stored => {
            warn!(
                path = %input.display(),
                size = data.len(),
                "data does not compress, storing uncompressed"
            );
            fs::write(output, &data).context("Failed to write output file")?;
        }
    }

    Ok(())
}

fn cmd_lzf_decompress(input: &PathBuf, output: &PathBuf, size: usize) -> Result<()> {
    println!("Decompressing: {} -> {}", input.display(), output.display());

    let block = fs::read(input).context("Failed to read input file")?;
    let data = decompress(&block, size).context("Failed to decompress LZF block")?;
    fs::write(output, &data).context("Failed to write output file")?;

    println!("Decompressed {} -> {} bytes", block.len(), data.len());

    Ok(())
}

fn cmd_lzf_batch(input: &PathBuf, output: &PathBuf, filter: Option<&str>) -> Result<()> {
    println!("Scanning: {}", input.display());

    let pattern = filter
        .map(|f| Pattern::new(f).with_context(|| format!("Invalid glob pattern: {}", f)))
        .transpose()?;

    let files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| match &pattern {
            Some(pattern) => relative(input, path)
                .map(|name| matches_filter(pattern, &name))
                .unwrap_or(false),
            None => true,
        })
        .collect();

    println!("Compressing {} files...", files.len());

    fs::create_dir_all(output)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let stored = AtomicUsize::new(0);
    let errors = AtomicUsize::new(0);
    let bytes_in = AtomicUsize::new(0);
    let bytes_out = AtomicUsize::new(0);

    // Compressor state cannot be shared, so each worker gets its own.
    files.par_iter().for_each_init(Compressor::new, |compressor, path| {
        match pack_file(compressor, input, output, path) {
            Ok((original, written, raw)) => {
                bytes_in.fetch_add(original, Ordering::Relaxed);
                bytes_out.fetch_add(written, Ordering::Relaxed);
                if raw {
                    stored.fetch_add(1, Ordering::Relaxed);
                }
            }
            Err(e) => {
                pb.suspend(|| eprintln!("Error compressing {}: {:#}", path.display(), e));
                errors.fetch_add(1, Ordering::Relaxed);
            }
        }
        pb.inc(1);
    });

    pb.finish_with_message("Done");

    let bytes_in = bytes_in.into_inner();
    let bytes_out = bytes_out.into_inner();
    println!(
        "Packed {} files in {:?}: {} -> {} bytes ({:.1}%), {} stored uncompressed, {} errors",
        files.len(),
        start.elapsed(),
        bytes_in,
        bytes_out,
        ratio(bytes_out, bytes_in),
        stored.into_inner(),
        errors.into_inner()
    );

    Ok(())
}

/// Pack one file into the mirrored output tree. Compressed files get an
/// `.lzf` suffix; stored files keep their name.
fn pack_file(
    compressor: &mut Compressor,
    input: &Path,
    output: &Path,
    path: &Path,
) -> Result<(usize, usize, bool)> {
    let name = relative(input, path).context("File is outside the input directory")?;
    let data = fs::read(path).context("Failed to read file")?;

    let (target, bytes, raw) = match pack(compressor, &data)? {
        Packed::Compressed(block) => (output.join(format!("{}.lzf", name)), block, false),
        Packed::Stored => {
            debug!(path = %path.display(), "storing uncompressed");
            (output.join(&name), data.clone(), true)
        }
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, &bytes).context("Failed to write output file")?;

    Ok((data.len(), bytes.len(), raw))
}

#[derive(Serialize)]
struct ChunkRow {
    offset: usize,
    name_id: i16,
    type_id: i16,
    size: u32,
    payload_len: usize,
}

fn cmd_chunks(input: &PathBuf, offset: usize, json: bool) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    if offset > data.len() {
        anyhow::bail!("Offset {} is past the end of the file ({} bytes)", offset, data.len());
    }

    let mut reader = BinaryReader::new_at(&data, offset);
    let mut rows = Vec::new();

    loop {
        let position = reader.position();
        match PropertyChunk::read(&mut reader) {
            Ok(Some(chunk)) => rows.push(ChunkRow {
                offset: position,
                name_id: chunk.header.name_id,
                type_id: chunk.header.type_id,
                size: chunk.header.size,
                payload_len: chunk.payload.len(),
            }),
            Ok(None) => break,
            Err(e) => {
                print_chunks(&rows, json)?;
                return Err(e).with_context(|| format!("Malformed chunk at offset {}", position));
            }
        }
    }

    print_chunks(&rows, json)?;
    if !json {
        println!("\nTotal: {} chunks, stream ends at offset {}", rows.len(), reader.position());
    }

    Ok(())
}

fn print_chunks(rows: &[ChunkRow], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    println!("{:>10} {:>8} {:>8} {:>10}", "offset", "name", "type", "payload");
    for row in rows {
        println!(
            "{:>10} {:>8} {:>8} {:>10}",
            row.offset, row.name_id, row.type_id, row.payload_len
        );
    }

    Ok(())
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        100.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Path of `path` below `root`, with forward slashes.
fn relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

/// Match a path below the input directory against the filter, ignoring case.
fn matches_filter(pattern: &Pattern, name: &str) -> bool {
    let options = MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };
    pattern.matches_with(name, options)
}
