#![forbid(unsafe_code)]

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;
use walkdir::WalkDir;

use crate::assets::decode::Container;
use crate::assets::error::{AssetError, AssetResult};
use crate::assets::format::{has_extension, Entry, EntrySet};
use crate::assets::path::{normalize_rel_path, should_exclude};

/// What to pick up from a payload directory.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Managed extension without the dot, e.g. "opus".
    pub extension: String,
    /// Substrings of normalized names to skip.
    pub excludes: Vec<String>,
}

impl CollectOptions {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            excludes: Vec::new(),
        }
    }
}

pub fn collect_from_directory(root: &Path, opts: &CollectOptions) -> AssetResult<EntrySet> {
    if !root.is_dir() {
        return Err(AssetError::NotFound(root.to_path_buf()));
    }

    let mut set = EntrySet::new();
    for ent in WalkDir::new(root).follow_links(false).into_iter() {
        let ent = ent.map_err(|e| {
            let msg = e.to_string();
            let io = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, msg));
            AssetError::Io(io)
        })?;

        if !ent.file_type().is_file() {
            continue;
        }

        let name = normalize_rel_path(root, ent.path())?;
        if !has_extension(&name, &opts.extension) || should_exclude(&name, &opts.excludes) {
            continue;
        }

        let mut f = File::open(ent.path())?;
        let mut payload = Vec::new();
        f.read_to_end(&mut payload)?;

        debug!("+ {name}: {} bytes", payload.len());
        set.insert(Entry::new(name, payload));
    }

    Ok(set)
}

/// Re-materializes every entry of `container` whose name satisfies `keep`.
/// Table dimensions are carried through unchanged.
pub fn collect_from_container<F>(container: &Container<'_>, keep: F) -> AssetResult<EntrySet>
where
    F: Fn(&str) -> bool,
{
    let mut set = EntrySet::new();
    for e in container.entries() {
        if !keep(&e.name) {
            continue;
        }
        let payload = container.payload(e)?;
        set.insert(Entry {
            name: e.name.clone(),
            payload: payload.to_vec(),
            width: e.width,
            height: e.height,
        });
    }
    Ok(set)
}
