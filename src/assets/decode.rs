#![forbid(unsafe_code)]

use std::collections::HashMap;

use crate::assets::error::{AssetError, AssetResult};
use crate::assets::format::{
    Header, TableEntry, FRAME_MARKER, HEADER_LEN, NAME_FIELD_LEN, TABLE_ENTRY_LEN,
};
use crate::assets::io::Reader;

#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Require the 0x5A5A marker in front of every extracted payload.
    pub check_marker: bool,
}

pub fn decode_header(bytes: &[u8]) -> AssetResult<Header> {
    let mut r = Reader::new(bytes);
    let entry_count = r.read_u32("header")?;
    let checksum = r.read_u32("header")?;
    let body_length = r.read_u32("header")?;
    Ok(Header {
        entry_count,
        checksum,
        body_length,
    })
}

pub fn decode_table(bytes: &[u8], header: &Header) -> AssetResult<Vec<TableEntry>> {
    let mut r = Reader::at(bytes, HEADER_LEN);

    let count = header.entry_count as usize;
    let needed = TABLE_ENTRY_LEN as u64 * u64::from(header.entry_count);
    if (r.remaining() as u64) < needed {
        return Err(AssetError::Truncated {
            what: "table",
            needed,
            available: r.remaining() as u64,
        });
    }

    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let raw = r.take(NAME_FIELD_LEN, "table entry name")?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let name = String::from_utf8_lossy(&raw[..end]).into_owned();
        let size = r.read_u32("table entry size")?;
        let offset = r.read_u32("table entry offset")?;
        let width = r.read_u16("table entry width")?;
        let height = r.read_u16("table entry height")?;
        out.push(TableEntry {
            name,
            size,
            offset,
            width,
            height,
        });
    }
    Ok(out)
}

/// Payload bytes of `entry`, skipping its framing marker.
pub fn extract_payload<'a>(
    bytes: &'a [u8],
    header: &Header,
    entry: &TableEntry,
    opts: DecodeOptions,
) -> AssetResult<&'a [u8]> {
    let marker_at = header.payload_start() + u64::from(entry.offset);
    let start = marker_at + FRAME_MARKER.len() as u64;
    let available = (bytes.len() as u64).saturating_sub(start);

    if available < u64::from(entry.size) || start > bytes.len() as u64 {
        return Err(AssetError::Truncated {
            what: "payload",
            needed: u64::from(entry.size),
            available,
        });
    }

    let start = start as usize;
    if opts.check_marker && bytes[start - FRAME_MARKER.len()..start] != FRAME_MARKER {
        return Err(AssetError::BadMarker(entry.name.clone()));
    }

    Ok(&bytes[start..start + entry.size as usize])
}

/// A parsed container borrowing its backing bytes.
#[derive(Debug)]
pub struct Container<'a> {
    bytes: &'a [u8],
    header: Header,
    table: Vec<TableEntry>,
    opts: DecodeOptions,
}

impl<'a> Container<'a> {
    pub fn parse(bytes: &'a [u8]) -> AssetResult<Self> {
        Self::parse_with(bytes, DecodeOptions::default())
    }

    pub fn parse_with(bytes: &'a [u8], opts: DecodeOptions) -> AssetResult<Self> {
        let header = decode_header(bytes)?;
        let table = decode_table(bytes, &header)?;
        Ok(Self {
            bytes,
            header,
            table,
            opts,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn entries(&self) -> &[TableEntry] {
        &self.table
    }

    /// Last entry stored under `name`; earlier duplicates are unreachable.
    pub fn find(&self, name: &str) -> Option<&TableEntry> {
        self.table.iter().rev().find(|e| e.name == name)
    }

    pub fn payload(&self, entry: &TableEntry) -> AssetResult<&'a [u8]> {
        extract_payload(self.bytes, &self.header, entry, self.opts)
    }

    pub fn payload_by_name(&self, name: &str) -> AssetResult<Option<&'a [u8]>> {
        match self.find(name) {
            Some(e) => self.payload(e).map(Some),
            None => Ok(None),
        }
    }

    /// Name to table position, for repeated lookups in large tables.
    /// Later duplicates overwrite earlier ones, matching `find`.
    pub fn index(&self) -> HashMap<&str, usize> {
        self.table
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.as_str(), i))
            .collect()
    }
}
