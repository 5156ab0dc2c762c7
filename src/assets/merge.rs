#![forbid(unsafe_code)]

use log::{debug, warn};

use crate::assets::collect::collect_from_container;
use crate::assets::decode::Container;
use crate::assets::encode::{encode, EncodeOptions, Encoded};
use crate::assets::error::{AssetError, AssetResult};
use crate::assets::format::{truncate_name, EntrySet};

#[derive(Debug, Clone)]
pub struct Merged {
    pub encoded: Encoded,
    /// Old entries outside the replaced category.
    pub kept: Vec<String>,
    /// Old entries dropped because they matched the replaced category.
    pub replaced: Vec<String>,
    /// Names taken from the new entries.
    pub added: Vec<String>,
    /// Kept names that equal the truncated table name of a new entry. Both end
    /// up in the table under the same name, and the replace rule never sees the
    /// long name's extension again.
    pub shadowed: Vec<String>,
}

/// Rebuilds a container: old entries matching `replace` are dropped, the rest
/// are kept, and `new_entries` are laid over them (new wins on equal names).
/// `old == None` means there was no prior container.
pub fn merge<F>(
    old: Option<&[u8]>,
    new_entries: EntrySet,
    replace: F,
    opts: EncodeOptions,
) -> AssetResult<Merged>
where
    F: Fn(&str) -> bool,
{
    let (mut union, replaced) = match old {
        None => (EntrySet::new(), Vec::new()),
        Some(bytes) => {
            let container = Container::parse(bytes)
                .map_err(|e| AssetError::Corrupt(format!("existing container: {e}")))?;
            let replaced: Vec<String> = container
                .entries()
                .iter()
                .filter(|e| replace(&e.name))
                .map(|e| e.name.clone())
                .collect();
            let kept = collect_from_container(&container, |n| !replace(n))
                .map_err(|e| AssetError::Corrupt(format!("existing container: {e}")))?;
            (kept, replaced)
        }
    };

    for name in &replaced {
        debug!("- replace {name}");
    }

    let kept: Vec<String> = union
        .names()
        .filter(|n| !new_entries.contains(n))
        .map(str::to_string)
        .collect();
    for name in &kept {
        debug!("= keep {name}");
    }

    let mut shadowed = Vec::new();
    for name in new_entries.names() {
        if let Some(stored) = truncate_name(name) {
            if union.contains(stored) && !new_entries.contains(stored) {
                warn!("kept entry {stored:?} has the same table name as new entry {name}");
                shadowed.push(stored.to_string());
            }
        }
    }

    let added: Vec<String> = new_entries.names().map(str::to_string).collect();
    union.extend(new_entries);

    let encoded = encode(union.iter(), opts)?;
    Ok(Merged {
        encoded,
        kept,
        replaced,
        added,
        shadowed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::format::{has_extension, Entry};

    fn is_opus(name: &str) -> bool {
        has_extension(name, "opus")
    }

    fn old_container() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let set: EntrySet = [
            Entry::new("a.opus", b"old-a".to_vec()),
            Entry::new("b.font", b"font".to_vec()),
            Entry::new("c.opus", b"old-c".to_vec()),
        ]
        .into_iter()
        .collect();
        Ok(encode(set.iter(), EncodeOptions::default())?.bytes)
    }

    #[test]
    fn replaces_only_the_managed_category() -> Result<(), Box<dyn std::error::Error>> {
        let old = old_container()?;
        let new: EntrySet = [
            Entry::new("a.opus", b"new-a".to_vec()),
            Entry::new("d.opus", b"new-d".to_vec()),
        ]
        .into_iter()
        .collect();

        let merged = merge(Some(old.as_slice()), new, is_opus, EncodeOptions::default())?;
        let c = Container::parse(&merged.encoded.bytes)?;

        let mut names: Vec<&str> = c.entries().iter().map(|e| e.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["a.opus", "b.font", "d.opus"]);
        assert_eq!(c.payload_by_name("a.opus")?, Some(&b"new-a"[..]));
        assert_eq!(c.payload_by_name("d.opus")?, Some(&b"new-d"[..]));
        assert_eq!(c.payload_by_name("b.font")?, Some(&b"font"[..]));
        assert_eq!(c.payload_by_name("c.opus")?, None);

        assert_eq!(merged.kept, vec!["b.font"]);
        assert_eq!(merged.replaced, vec!["a.opus", "c.opus"]);
        assert_eq!(merged.added, vec!["a.opus", "d.opus"]);
        Ok(())
    }

    #[test]
    fn new_entries_win_over_kept_ones() -> Result<(), Box<dyn std::error::Error>> {
        let old = old_container()?;
        let new: EntrySet = [Entry::new("b.font", b"newer".to_vec())].into_iter().collect();
        let merged = merge(Some(old.as_slice()), new, is_opus, EncodeOptions::default())?;
        let c = Container::parse(&merged.encoded.bytes)?;
        assert_eq!(c.entries().len(), 1);
        assert_eq!(c.payload_by_name("b.font")?, Some(&b"newer"[..]));
        assert!(merged.kept.is_empty());
        Ok(())
    }

    #[test]
    fn absent_old_container_starts_empty() -> Result<(), Box<dyn std::error::Error>> {
        let new: EntrySet = [Entry::new("x.opus", vec![1, 2])].into_iter().collect();
        let merged = merge(None, new, is_opus, EncodeOptions::default())?;
        assert_eq!(merged.encoded.header.entry_count, 1);
        assert!(merged.replaced.is_empty());
        Ok(())
    }

    #[test]
    fn corrupt_old_container_is_reported() {
        let short = [1u8, 0, 0, 0, 0, 0];
        let res = merge(Some(&short[..]), EntrySet::new(), is_opus, EncodeOptions::default());
        assert!(matches!(res, Err(AssetError::Corrupt(_))));

        // Header claims one entry but no table follows.
        let mut bytes = vec![0u8; 12];
        bytes[0] = 1;
        let res = merge(
            Some(bytes.as_slice()),
            EntrySet::new(),
            is_opus,
            EncodeOptions::default(),
        );
        assert!(matches!(res, Err(AssetError::Corrupt(_))));
    }

    #[test]
    fn replace_rule_matches_extension_case_exactly() -> Result<(), Box<dyn std::error::Error>> {
        let set: EntrySet = [
            Entry::new("legacy/BEEP.OPUS", b"beep".to_vec()),
            Entry::new("f.bin", b"font".to_vec()),
            Entry::new("old.opus", b"old".to_vec()),
        ]
        .into_iter()
        .collect();
        let old = encode(set.iter(), EncodeOptions::default())?.bytes;

        let new: EntrySet = [Entry::new("a.opus", b"a".to_vec())].into_iter().collect();
        let merged = merge(Some(old.as_slice()), new, is_opus, EncodeOptions::default())?;
        let c = Container::parse(&merged.encoded.bytes)?;

        assert_eq!(c.payload_by_name("legacy/BEEP.OPUS")?, Some(&b"beep"[..]));
        assert_eq!(c.payload_by_name("old.opus")?, None);
        assert_eq!(merged.kept, vec!["f.bin", "legacy/BEEP.OPUS"]);
        assert_eq!(merged.replaced, vec!["old.opus"]);
        Ok(())
    }

    #[test]
    fn long_names_colliding_with_kept_entries_are_reported(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let long = format!("{}.opus", "v".repeat(50));
        // Stored as 47 'v's: no extension left, so the replace rule keeps it.
        let old = encode(
            [&Entry::new(long.clone(), b"first".to_vec())],
            EncodeOptions::default(),
        )?
        .bytes;
        let stored = "v".repeat(47);

        let new: EntrySet = [Entry::new(long.clone(), b"second".to_vec())]
            .into_iter()
            .collect();
        let merged = merge(Some(old.as_slice()), new, is_opus, EncodeOptions::default())?;

        assert_eq!(merged.kept, vec![stored.clone()]);
        assert_eq!(merged.shadowed, vec![stored.clone()]);
        let c = Container::parse(&merged.encoded.bytes)?;
        assert_eq!(c.entries().len(), 2);
        assert!(c.entries().iter().all(|e| e.name == stored));
        Ok(())
    }

    #[test]
    fn short_names_are_never_shadowed() -> Result<(), Box<dyn std::error::Error>> {
        let old = old_container()?;
        let new: EntrySet = [Entry::new("a.opus", b"new-a".to_vec())].into_iter().collect();
        let merged = merge(Some(old.as_slice()), new, is_opus, EncodeOptions::default())?;
        assert!(merged.shadowed.is_empty());
        Ok(())
    }

    #[test]
    fn merge_preserves_image_dimensions() -> Result<(), Box<dyn std::error::Error>> {
        let mut img = Entry::new("emoji/smile.png", vec![0xAA; 8]);
        img.width = 32;
        img.height = 32;
        let old = encode([&img], EncodeOptions::default())?.bytes;

        let new: EntrySet = [Entry::new("v.opus", vec![1])].into_iter().collect();
        let merged = merge(Some(old.as_slice()), new, is_opus, EncodeOptions::default())?;
        let c = Container::parse(&merged.encoded.bytes)?;
        let e = c.find("emoji/smile.png").ok_or("image dropped")?;
        assert_eq!((e.width, e.height), (32, 32));
        Ok(())
    }
}
