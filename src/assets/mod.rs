#![forbid(unsafe_code)]

mod collect;
mod decode;
mod encode;
mod error;
mod format;
mod io;
mod merge;
mod ops;
mod path;
mod summary;
mod verify;

pub use collect::{collect_from_container, collect_from_directory, CollectOptions};
pub use decode::{decode_header, decode_table, extract_payload, Container, DecodeOptions};
pub use encode::{encode, EncodeOptions, Encoded, NameTruncation};
pub use error::{AssetError, AssetResult};
pub use format::{
    checksum, has_extension, Category, Entry, EntrySet, Header, TableEntry, DEFAULT_EXTENSION,
    FRAME_MARKER, HEADER_LEN, LAYOUT_V1, MAX_NAME_LEN, TABLE_ENTRY_LEN,
};
pub use merge::{merge, Merged};
pub use ops::{
    build, default_summary_path, extract, inspect, list, merge as merge_files, read_container,
    verify as verify_file, BuildOptions, MergeOptions,
};
pub use summary::{FileSummary, Summary, SUMMARY_FILE};
pub use verify::{verify, FailureReason, Problem, Report, VerifyOptions, Warning};
