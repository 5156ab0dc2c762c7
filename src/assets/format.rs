#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::Serialize;

/// Canonical on-disk layout (v1):
/// - header (12 bytes):
///   - [u32 entry_count]
///   - [u32 checksum]      sum of body bytes mod 65536, high half always zero
///   - [u32 body_length]   len(table ++ payload region)
/// - table: entry_count records of 60 bytes
///   - [u8 name[48]]       UTF-8, at most 47 bytes, NUL padded
///   - [u32 size]          payload length, marker excluded
///   - [u32 offset]        from payload region start, points at the marker
///   - [u16 width]
///   - [u16 height]
/// - payload region: per entry [0x5A 0x5A][payload bytes]
///
/// All integers are little-endian. There is no magic or version field: the
/// first 12 bytes are read as-is by the on-device loader.
pub const LAYOUT_V1: &str = "assets-v1 (48-byte names, 16-bit sum, 0x5A5A framing)";

pub const HEADER_LEN: usize = 12;
pub const NAME_FIELD_LEN: usize = 48;
/// One byte of the name field is always kept for the terminator.
pub const MAX_NAME_LEN: usize = NAME_FIELD_LEN - 1;
pub const TABLE_ENTRY_LEN: usize = NAME_FIELD_LEN + 4 + 4 + 2 + 2;
pub const FRAME_MARKER: [u8; 2] = [0x5A, 0x5A];

/// Extension of the payloads the voice-prompt pipeline manages.
pub const DEFAULT_EXTENSION: &str = "opus";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    pub entry_count: u32,
    pub checksum: u32,
    pub body_length: u32,
}

impl Header {
    /// Start of the payload region measured from the start of the file.
    pub fn payload_start(&self) -> u64 {
        HEADER_LEN as u64 + TABLE_ENTRY_LEN as u64 * u64::from(self.entry_count)
    }
}

/// One decoded table record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEntry {
    pub name: String,
    pub size: u32,
    pub offset: u32,
    pub width: u16,
    pub height: u16,
}

/// A named payload on its way into (or out of) a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub payload: Vec<u8>,
    pub width: u16,
    pub height: u16,
}

impl Entry {
    pub fn new(name: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            payload,
            width: 0,
            height: 0,
        }
    }
}

/// Entries keyed by name. A second insert under the same name replaces the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrySet {
    entries: BTreeMap<String, Entry>,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry that was replaced, if any.
    pub fn insert(&mut self, entry: Entry) -> Option<Entry> {
        self.entries.insert(entry.name.clone(), entry)
    }

    pub fn extend(&mut self, other: EntrySet) {
        for (_, e) in other.entries {
            self.insert(e);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }
}

impl FromIterator<Entry> for EntrySet {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut set = EntrySet::new();
        for e in iter {
            set.insert(e);
        }
        set
    }
}

impl IntoIterator for EntrySet {
    type Item = Entry;
    type IntoIter = std::collections::btree_map::IntoValues<String, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

/// Additive 16-bit checksum over `data`. Not collision resistant.
pub fn checksum(data: &[u8]) -> u32 {
    let sum = data
        .iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)));
    u32::from(sum)
}

/// Cuts `name` to at most `MAX_NAME_LEN` bytes on a char boundary.
/// Returns `None` when the name already fits.
pub fn truncate_name(name: &str) -> Option<&str> {
    if name.len() <= MAX_NAME_LEN {
        return None;
    }
    let mut end = MAX_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    Some(&name[..end])
}

/// Splits `name` into `(stem, extension)` where the extension includes its dot.
/// Leading dots of the final component never start an extension, so
/// `".hidden"` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    let file_start = name.rfind('/').map(|i| i + 1).unwrap_or(0);
    let file = &name[file_start..];
    let leading = file.len() - file.trim_start_matches('.').len();

    match file[leading..].rfind('.') {
        Some(dot) => name.split_at(file_start + leading + dot),
        None => (name, ""),
    }
}

/// Ordering key that groups payloads of the same kind together.
pub fn sort_key(name: &str) -> (&[u8], &[u8]) {
    let (stem, ext) = split_extension(name);
    (ext.as_bytes(), stem.as_bytes())
}

/// True if `name` ends in exactly `.<ext>`. Case matters: `B.OPUS` is not an
/// `opus` payload to the collector or the merge replace rule.
pub fn has_extension(name: &str, ext: &str) -> bool {
    let ext = ext.trim_start_matches('.');
    let (_, got) = split_extension(name);
    !ext.is_empty() && got.len() > 1 && got[1..] == *ext
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Audio,
    Font,
    Model,
    Image,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Audio,
        Category::Font,
        Category::Model,
        Category::Image,
        Category::Other,
    ];

    pub fn classify(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        let ext = match lower.rsplit_once('.') {
            Some((_, ext)) => ext,
            None => "",
        };
        match ext {
            "opus" | "ogg" | "mp3" | "wav" => Category::Audio,
            "bin" if lower.contains("font") => Category::Font,
            "bin" if lower.contains("model") => Category::Model,
            "png" | "jpg" | "gif" | "spng" | "sjpg" => Category::Image,
            _ => Category::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Audio => "audio",
            Category::Font => "font",
            Category::Model => "model",
            Category::Image => "image",
            Category::Other => "other",
        }
    }
}
