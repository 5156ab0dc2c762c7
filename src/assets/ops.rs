#![forbid(unsafe_code)]

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::assets::collect::{collect_from_directory, CollectOptions};
use crate::assets::decode::Container;
use crate::assets::encode::{encode, EncodeOptions, Encoded};
use crate::assets::error::{AssetError, AssetResult};
use crate::assets::format::{has_extension, Category};
use crate::assets::io::blake3_hex;
use crate::assets::merge::merge as merge_entries;
use crate::assets::path::output_path;
use crate::assets::summary::{Summary, SUMMARY_FILE};
use crate::assets::verify::{verify as verify_bytes, Report, VerifyOptions};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub collect: CollectOptions,
    pub encode: EncodeOptions,
    /// Write a container even when no payloads were found.
    pub allow_empty: bool,
    /// Summary JSON destination; `None` skips it.
    pub summary: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub build: BuildOptions,
    /// Existing container whose other categories are kept.
    pub base: PathBuf,
    /// Start from nothing when the base container cannot be decoded.
    pub force: bool,
}

/// Default summary location: next to the container.
pub fn default_summary_path(output: &Path) -> PathBuf {
    match output.parent() {
        Some(dir) => dir.join(SUMMARY_FILE),
        None => PathBuf::from(SUMMARY_FILE),
    }
}

pub fn read_container(path: &Path) -> AssetResult<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AssetError::NotFound(path.to_path_buf()),
        _ => AssetError::Io(e),
    })
}

pub fn build(opts: &BuildOptions) -> AssetResult<Summary> {
    info!("collecting *.{} from {}", opts.collect.extension, opts.input.display());
    let entries = collect_from_directory(&opts.input, &opts.collect)?;
    if entries.is_empty() && !opts.allow_empty {
        return Err(AssetError::NoEntries(opts.input.clone()));
    }

    let encoded = encode(entries.iter(), opts.encode)?;
    finish(opts, &encoded)
}

pub fn merge(opts: &MergeOptions) -> AssetResult<Summary> {
    let b = &opts.build;
    info!("collecting *.{} from {}", b.collect.extension, b.input.display());
    let fresh = collect_from_directory(&b.input, &b.collect)?;
    if fresh.is_empty() && !b.allow_empty {
        return Err(AssetError::NoEntries(b.input.clone()));
    }

    let old = match read_container(&opts.base) {
        Ok(bytes) => Some(bytes),
        Err(AssetError::NotFound(p)) => {
            info!("no existing container at {}, starting empty", p.display());
            None
        }
        Err(e) => return Err(e),
    };

    let old = match old {
        Some(bytes) if opts.force => match readable(&bytes) {
            Ok(()) => Some(bytes),
            Err(e) => {
                warn!("discarding unreadable {}: {e}", opts.base.display());
                None
            }
        },
        other => other,
    };

    let ext = b.collect.extension.as_str();
    let merged = merge_entries(old.as_deref(), fresh, |n| has_extension(n, ext), b.encode)?;
    info!(
        "kept {}, replaced {}, added {}",
        merged.kept.len(),
        merged.replaced.len(),
        merged.added.len()
    );
    finish(b, &merged.encoded)
}

fn readable(bytes: &[u8]) -> AssetResult<()> {
    let c = Container::parse(bytes)?;
    for e in c.entries() {
        c.payload(e)?;
    }
    Ok(())
}

fn finish(opts: &BuildOptions, encoded: &Encoded) -> AssetResult<Summary> {
    if let Some(dir) = opts.output.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    fs::write(&opts.output, &encoded.bytes)?;

    let summary = Summary::from_encoded(encoded);
    if let Some(path) = &opts.summary {
        summary.write(path)?;
    }

    info!(
        "wrote {}: {} entries, checksum {}, {:.1} KB",
        opts.output.display(),
        summary.total_files,
        summary.checksum,
        summary.size_bytes as f64 / 1024.0
    );
    Ok(summary)
}

pub fn inspect(path: &Path, opts: VerifyOptions) -> AssetResult<Report> {
    let bytes = read_container(path)?;
    Ok(verify_bytes(&bytes, opts))
}

/// Prints the report and returns whether the container passed.
pub fn verify(path: &Path, opts: VerifyOptions, json: bool, verbose: bool) -> AssetResult<bool> {
    let report = inspect(path, opts)?;
    let mut out = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        writeln!(out, "container: {}", path.display())?;
        report.write_text(&mut out, verbose)?;
    }
    Ok(report.ok)
}

pub fn list(path: &Path, verbose: bool) -> AssetResult<()> {
    let bytes = read_container(path)?;
    let c = Container::parse(&bytes)?;

    for e in c.entries() {
        if verbose {
            let hash = match c.payload(e) {
                Ok(p) => blake3_hex(p),
                Err(_) => "<truncated>".to_string(),
            };
            println!(
                "{}  off={} size={} kind={} dims={}x{} hash={}",
                e.name,
                e.offset,
                e.size,
                Category::classify(&e.name).as_str(),
                e.width,
                e.height,
                hash
            );
        } else {
            println!("{}", e.name);
        }
    }
    Ok(())
}

/// Writes payloads (optionally only names containing one of `filter`) under `output`.
pub fn extract(path: &Path, output: &Path, filter: &[String]) -> AssetResult<usize> {
    let bytes = read_container(path)?;
    let c = Container::parse(&bytes)?;
    fs::create_dir_all(output)?;

    let mut written = 0;
    for e in c.entries() {
        if !filter.is_empty() && !filter.iter().any(|s| e.name.contains(s)) {
            continue;
        }

        let payload = c.payload(e)?;
        let out_path = output_path(output, &e.name)?;
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&out_path, payload)?;
        written += 1;
    }

    info!("extracted {written} entries to {}", output.display());
    Ok(written)
}
