#![forbid(unsafe_code)]

use assetbin::assets::{
    self, default_summary_path, AssetError, AssetResult, BuildOptions, CollectOptions,
    EncodeOptions, FailureReason, MergeOptions, DEFAULT_EXTENSION,
};
use inquire::{Confirm, Select, Text};
use std::path::PathBuf;

const MODE_BUILD: &str = "Build a new container";
const MODE_MERGE: &str = "Replace audio in an existing container";

fn prompt_err(e: inquire::InquireError) -> AssetError {
    AssetError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
}

fn normalize_ext(s: &str) -> String {
    s.trim().trim_start_matches('.').to_string()
}

fn split_excludes(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(|x| x.to_string())
        .collect()
}

pub fn run() -> AssetResult<bool> {
    println!("assets.bin wizard\n");

    let mode = Select::new("Mode", vec![MODE_BUILD, MODE_MERGE])
        .prompt()
        .map_err(prompt_err)?;

    let input = Text::new("Payload directory")
        .with_default("./audio_opus")
        .prompt()
        .map(PathBuf::from)
        .map_err(prompt_err)?;

    let ext = Text::new("Payload extension")
        .with_default(DEFAULT_EXTENSION)
        .prompt()
        .map(|s| normalize_ext(&s))
        .map_err(prompt_err)?;

    let base = if mode == MODE_MERGE {
        let raw = Text::new("Existing container")
            .with_default("../../build/assets.bin")
            .prompt()
            .map_err(prompt_err)?;
        Some(PathBuf::from(raw))
    } else {
        None
    };

    let output = Text::new("Output container")
        .with_default("./build/assets.bin")
        .prompt()
        .map(PathBuf::from)
        .map_err(prompt_err)?;

    let excludes_raw = Text::new("Excludes (comma-separated substrings, optional)")
        .with_default("")
        .prompt()
        .map_err(prompt_err)?;
    let excludes = split_excludes(&excludes_raw);

    println!("\nSummary:");
    println!("  input    : {}", input.display());
    println!("  extension: .{ext}");
    if let Some(b) = &base {
        println!("  base     : {}", b.display());
    }
    println!("  output   : {}", output.display());
    println!("  excludes : {}", if excludes.is_empty() { "<none>" } else { "(set)" });

    let proceed = Confirm::new("Proceed?")
        .with_default(true)
        .prompt()
        .map_err(prompt_err)?;
    if !proceed {
        return Ok(true);
    }

    let build = BuildOptions {
        input,
        summary: Some(default_summary_path(&output)),
        output,
        collect: CollectOptions {
            extension: ext,
            excludes,
        },
        encode: EncodeOptions::default(),
        allow_empty: false,
    };

    let summary = match base {
        Some(base) => {
            let force = match assets::inspect(&base, Default::default()) {
                Ok(report)
                    if matches!(
                        report.reason,
                        Some(FailureReason::Structural | FailureReason::Bounds)
                    ) =>
                {
                    Confirm::new("Existing container is unreadable. Start from scratch?")
                        .with_default(false)
                        .prompt()
                        .map_err(prompt_err)?
                }
                _ => false,
            };
            assets::merge_files(&MergeOptions { build, base, force })?
        }
        None => assets::build(&build)?,
    };

    println!(
        "\nDone: {} entries, checksum {}, {:.1} KB",
        summary.total_files,
        summary.checksum,
        summary.size_bytes as f64 / 1024.0
    );
    Ok(true)
}
