#![forbid(unsafe_code)]

mod ui;

use assetbin::assets::{
    self, default_summary_path, BuildOptions, CollectOptions, EncodeOptions, MergeOptions,
    VerifyOptions, DEFAULT_EXTENSION,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "assetbin", version, about = "Asset container builder (assets.bin)")]
struct Cli {
    /// Debug logging.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    /// Only warnings and errors.
    #[arg(short, long, global = true, default_value_t = false, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Directory with payload files.
    #[arg(long)]
    input: PathBuf,
    /// Output container file.
    #[arg(long, default_value = "build/assets.bin")]
    output: PathBuf,
    /// Managed payload extension (without the dot).
    #[arg(long, env = "ASSETBIN_EXT", default_value = DEFAULT_EXTENSION)]
    ext: String,
    /// Skip names containing this substring (repeatable).
    #[arg(long)]
    exclude: Vec<String>,
    /// Summary JSON path (defaults to assets_summary.json beside the output).
    #[arg(long)]
    summary: Option<PathBuf>,
    /// Do not write the summary JSON.
    #[arg(long, default_value_t = false, conflicts_with = "summary")]
    no_summary: bool,
    /// Fail on names longer than 47 bytes instead of truncating them.
    #[arg(long, default_value_t = false)]
    strict_names: bool,
    /// Write a container even if no payloads were found.
    #[arg(long, default_value_t = false)]
    allow_empty: bool,
}

impl SourceArgs {
    fn into_options(self) -> BuildOptions {
        let summary = if self.no_summary {
            None
        } else {
            Some(
                self.summary
                    .unwrap_or_else(|| default_summary_path(&self.output)),
            )
        };
        BuildOptions {
            input: self.input,
            output: self.output,
            collect: CollectOptions {
                extension: self.ext,
                excludes: self.exclude,
            },
            encode: EncodeOptions {
                strict_names: self.strict_names,
            },
            allow_empty: self.allow_empty,
            summary,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive wizard for build/merge (terminal).
    Ui,

    /// Build a container from a payload directory.
    Build {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Replace one category of an existing container with fresh payloads.
    Merge {
        #[command(flatten)]
        source: SourceArgs,
        /// Existing container (fonts, models, images are kept).
        #[arg(long)]
        base: PathBuf,
        /// Start from scratch if the base container is unreadable.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Check a container's structure, checksum and bounds.
    Verify {
        container: PathBuf,
        /// Emit the report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
        /// List every entry instead of the first 30. Takes over the old
        /// tool's `--verbose/-v` listing; `-v` now only raises the log level.
        #[arg(long, default_value_t = false)]
        all: bool,
        /// Also require the 0x5A5A marker before every payload.
        #[arg(long, default_value_t = false)]
        check_marker: bool,
    },

    /// List entries in a container.
    List {
        container: PathBuf,
        /// Print offsets, sizes and payload hashes too.
        #[arg(long, default_value_t = false)]
        long: bool,
    },

    /// Extract payloads to a directory.
    Extract {
        container: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Only extract entries that contain this substring (repeatable).
        #[arg(long)]
        filter: Vec<String>,
    },
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let res = match cli.cmd {
        Command::Ui => ui::run(),
        Command::Build { source } => assets::build(&source.into_options()).map(|_| true),
        Command::Merge {
            source,
            base,
            force,
        } => assets::merge_files(&MergeOptions {
            build: source.into_options(),
            base,
            force,
        })
        .map(|_| true),
        Command::Verify {
            container,
            json,
            all,
            check_marker,
        } => assets::verify_file(&container, VerifyOptions { check_marker }, json, all),
        Command::List { container, long } => assets::list(&container, long).map(|_| true),
        Command::Extract {
            container,
            output,
            filter,
        } => assets::extract(&container, &output, &filter).map(|_| true),
    };

    match res {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
