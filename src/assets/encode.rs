#![forbid(unsafe_code)]

use log::warn;

use crate::assets::error::{AssetError, AssetResult};
use crate::assets::format::{
    checksum, sort_key, truncate_name, Entry, Header, FRAME_MARKER, HEADER_LEN, MAX_NAME_LEN,
    NAME_FIELD_LEN, TABLE_ENTRY_LEN,
};
use crate::assets::io::{put_u16, put_u32};

#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Refuse names longer than the table field instead of truncating them.
    pub strict_names: bool,
}

/// A name that did not fit the table field and was shortened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTruncation {
    pub original: String,
    pub stored: String,
}

#[derive(Debug, Clone)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub header: Header,
    /// Stored names in table order.
    pub names: Vec<String>,
    /// Payload sizes, parallel to `names`.
    pub sizes: Vec<u32>,
    pub warnings: Vec<NameTruncation>,
}

impl Encoded {
    pub fn payload_region_len(&self) -> usize {
        self.bytes.len() - HEADER_LEN - TABLE_ENTRY_LEN * self.names.len()
    }
}

struct Placed<'a> {
    stored: &'a str,
    entry: &'a Entry,
}

/// Determinism rules:
/// - entries are ordered by (extension, stem) of the stored name, then by the
///   full original name
/// - identical input always yields identical bytes
pub fn encode<'a, I>(entries: I, opts: EncodeOptions) -> AssetResult<Encoded>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut warnings = Vec::new();
    let mut placed: Vec<Placed<'a>> = Vec::new();

    for entry in entries {
        let stored = match truncate_name(&entry.name) {
            None => entry.name.as_str(),
            Some(_) if opts.strict_names => {
                return Err(AssetError::NameTooLong {
                    name: entry.name.clone(),
                    limit: MAX_NAME_LEN,
                });
            }
            Some(short) => {
                warn!("name too long, stored as {short:?}: {}", entry.name);
                warnings.push(NameTruncation {
                    original: entry.name.clone(),
                    stored: short.to_string(),
                });
                short
            }
        };
        placed.push(Placed { stored, entry });
    }

    placed.sort_by(|a, b| {
        sort_key(a.stored)
            .cmp(&sort_key(b.stored))
            .then_with(|| a.entry.name.as_bytes().cmp(b.entry.name.as_bytes()))
    });

    let entry_count = u32::try_from(placed.len())
        .map_err(|_| AssetError::TooLarge("entry count".into()))?;

    let payload_total: usize = placed
        .iter()
        .map(|p| FRAME_MARKER.len() + p.entry.payload.len())
        .sum();
    let mut payload_buf: Vec<u8> = Vec::with_capacity(payload_total);
    let mut table: Vec<u8> = Vec::with_capacity(TABLE_ENTRY_LEN * placed.len());
    let mut sizes: Vec<u32> = Vec::with_capacity(placed.len());

    for p in &placed {
        let offset = u32::try_from(payload_buf.len())
            .map_err(|_| AssetError::TooLarge(format!("offset of {}", p.entry.name)))?;
        let size = u32::try_from(p.entry.payload.len())
            .map_err(|_| AssetError::TooLarge(format!("size of {}", p.entry.name)))?;
        sizes.push(size);

        payload_buf.extend_from_slice(&FRAME_MARKER);
        payload_buf.extend_from_slice(&p.entry.payload);

        let mut name_field = [0u8; NAME_FIELD_LEN];
        name_field[..p.stored.len()].copy_from_slice(p.stored.as_bytes());
        table.extend_from_slice(&name_field);
        put_u32(&mut table, size);
        put_u32(&mut table, offset);
        put_u16(&mut table, p.entry.width);
        put_u16(&mut table, p.entry.height);
    }

    let body_len = table.len() + payload_buf.len();
    let body_length =
        u32::try_from(body_len).map_err(|_| AssetError::TooLarge("body length".into()))?;
    let sum = (checksum(&table) + checksum(&payload_buf)) & 0xFFFF;

    let header = Header {
        entry_count,
        checksum: sum,
        body_length,
    };

    let mut bytes = Vec::with_capacity(HEADER_LEN + body_len);
    put_u32(&mut bytes, header.entry_count);
    put_u32(&mut bytes, header.checksum);
    put_u32(&mut bytes, header.body_length);
    bytes.extend_from_slice(&table);
    bytes.extend_from_slice(&payload_buf);

    let names = placed.iter().map(|p| p.stored.to_string()).collect();

    Ok(Encoded {
        bytes,
        header,
        names,
        sizes,
        warnings,
    })
}
