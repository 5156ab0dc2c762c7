#![forbid(unsafe_code)]

use std::path::{Component, Path, PathBuf};

use crate::assets::error::{AssetError, AssetResult};

/// Container name for `file_path` relative to `input_root`, always `/`-separated.
pub fn normalize_rel_path(input_root: &Path, file_path: &Path) -> AssetResult<String> {
    let rel = file_path
        .strip_prefix(input_root)
        .map_err(|_| AssetError::Outside(file_path.to_string_lossy().into_owned()))?;

    let mut out = String::new();
    for (i, comp) in rel.components().enumerate() {
        if i != 0 {
            out.push('/');
        }
        out.push_str(&comp.as_os_str().to_string_lossy());
    }

    while out.starts_with('/') {
        out.remove(0);
    }
    out = out.replace('\\', "/");

    if out.is_empty() {
        return Err(AssetError::Invalid("empty relative path".into()));
    }

    Ok(out)
}

pub fn should_exclude(norm_path: &str, excludes: &[String]) -> bool {
    excludes.iter().any(|e| !e.is_empty() && norm_path.contains(e))
}

/// Where an entry named `name` lands under `root` on extraction.
/// Names that would escape `root` are rejected.
pub fn output_path(root: &Path, name: &str) -> AssetResult<PathBuf> {
    let mut out = root.to_path_buf();
    let mut pushed = false;
    for part in name.split('/').filter(|p| !p.is_empty()) {
        match Path::new(part).components().next() {
            Some(Component::Normal(_)) if Path::new(part).components().count() == 1 => {
                out.push(part);
                pushed = true;
            }
            Some(Component::CurDir) => {}
            _ => return Err(AssetError::Outside(name.to_string())),
        }
    }
    if !pushed {
        return Err(AssetError::Invalid(format!("unusable entry name: {name:?}")));
    }
    Ok(out)
}
