#![forbid(unsafe_code)]

use std::collections::HashSet;
use std::io::Write;

use serde::Serialize;

use crate::assets::decode::{decode_header, decode_table};
use crate::assets::error::AssetResult;
use crate::assets::format::{
    checksum, Category, Header, TableEntry, FRAME_MARKER, HEADER_LEN, TABLE_ENTRY_LEN,
};

/// Entries listed by the text report unless verbose output is requested.
const SHORT_LISTING: usize = 30;

#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyOptions {
    /// Treat a missing 0x5A5A marker as a failure.
    pub check_marker: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Structural,
    Checksum,
    Bounds,
    Marker,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::Structural => "structural",
            FailureReason::Checksum => "checksum",
            FailureReason::Bounds => "bounds",
            FailureReason::Marker => "marker",
        }
    }
}

/// Findings that make a container unusable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Problem {
    Structural { detail: String },
    ChecksumMismatch { expected: u32, actual: u32 },
    OutOfBounds { name: String, offset: u32, size: u32 },
    BadMarker { name: String },
}

impl Problem {
    fn reason(&self) -> FailureReason {
        match self {
            Problem::Structural { .. } => FailureReason::Structural,
            Problem::ChecksumMismatch { .. } => FailureReason::Checksum,
            Problem::OutOfBounds { .. } => FailureReason::Bounds,
            Problem::BadMarker { .. } => FailureReason::Marker,
        }
    }
}

/// Findings worth reporting that do not fail verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    BodyLengthMismatch { declared: u32, available: u64 },
    DuplicateName { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    pub name: String,
    pub size: u32,
    pub offset: u32,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u16>,
    pub in_bounds: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub audio: usize,
    pub font: usize,
    pub model: usize,
    pub image: usize,
    pub other: usize,
}

impl CategoryCounts {
    fn bump(&mut self, c: Category) {
        match c {
            Category::Audio => self.audio += 1,
            Category::Font => self.font += 1,
            Category::Model => self.model += 1,
            Category::Image => self.image += 1,
            Category::Other => self.other += 1,
        }
    }

    pub fn get(&self, c: Category) -> usize {
        match c {
            Category::Audio => self.audio,
            Category::Font => self.font,
            Category::Model => self.model,
            Category::Image => self.image,
            Category::Other => self.other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    pub file_len: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<Header>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_checksum: Option<u32>,
    pub entries: Vec<EntryReport>,
    pub categories: CategoryCounts,
    pub problems: Vec<Problem>,
    pub warnings: Vec<Warning>,
}

/// Checks an untrusted container. Never fails and never reads payload bytes
/// beyond what bounds and marker checks need.
pub fn verify(bytes: &[u8], opts: VerifyOptions) -> Report {
    let mut report = Report {
        ok: false,
        reason: None,
        file_len: bytes.len() as u64,
        header: None,
        computed_checksum: None,
        entries: Vec::new(),
        categories: CategoryCounts::default(),
        problems: Vec::new(),
        warnings: Vec::new(),
    };

    let header = match decode_header(bytes) {
        Ok(h) => h,
        Err(e) => {
            report.problems.push(Problem::Structural {
                detail: e.to_string(),
            });
            return finish(report);
        }
    };
    report.header = Some(header);

    // Body window: declared length, or whatever is left if the file is short.
    let available = bytes.len().saturating_sub(HEADER_LEN);
    let window_len = available.min(header.body_length as usize);
    let body = &bytes[HEADER_LEN..HEADER_LEN + window_len];
    if available as u64 != u64::from(header.body_length) {
        report.warnings.push(Warning::BodyLengthMismatch {
            declared: header.body_length,
            available: available as u64,
        });
    }

    let actual = checksum(body);
    report.computed_checksum = Some(actual);
    if actual != header.checksum {
        report.problems.push(Problem::ChecksumMismatch {
            expected: header.checksum,
            actual,
        });
    }

    let table = match decode_table(bytes, &header) {
        Ok(t) => t,
        Err(e) => {
            report.problems.push(Problem::Structural {
                detail: e.to_string(),
            });
            return finish(report);
        }
    };

    let table_len = TABLE_ENTRY_LEN * table.len();
    let region = body.get(table_len..).unwrap_or(&[]);

    let mut seen: HashSet<&str> = HashSet::new();
    for e in &table {
        if !seen.insert(e.name.as_str()) {
            report.warnings.push(Warning::DuplicateName {
                name: e.name.clone(),
            });
        }

        let in_bounds = check_entry(e, region, opts, &mut report.problems);
        let category = Category::classify(&e.name);
        report.categories.bump(category);

        let dims = (category == Category::Image).then_some((e.width, e.height));
        report.entries.push(EntryReport {
            name: e.name.clone(),
            size: e.size,
            offset: e.offset,
            category,
            width: dims.map(|d| d.0),
            height: dims.map(|d| d.1),
            in_bounds,
        });
    }

    finish(report)
}

fn check_entry(
    e: &TableEntry,
    region: &[u8],
    opts: VerifyOptions,
    problems: &mut Vec<Problem>,
) -> bool {
    let start = u64::from(e.offset);
    let end = start + FRAME_MARKER.len() as u64 + u64::from(e.size);
    if end > region.len() as u64 {
        problems.push(Problem::OutOfBounds {
            name: e.name.clone(),
            offset: e.offset,
            size: e.size,
        });
        return false;
    }

    let start = start as usize;
    if opts.check_marker && region[start..start + FRAME_MARKER.len()] != FRAME_MARKER {
        problems.push(Problem::BadMarker {
            name: e.name.clone(),
        });
    }
    true
}

fn finish(mut report: Report) -> Report {
    report.reason = report.problems.iter().map(Problem::reason).min_by_key(|r| *r as u8);
    report.ok = report.problems.is_empty();
    report
}

impl Report {
    pub fn write_text(&self, w: &mut dyn Write, verbose: bool) -> AssetResult<()> {
        writeln!(w, "size: {} bytes", self.file_len)?;

        if let Some(h) = &self.header {
            writeln!(w, "header:")?;
            writeln!(w, "  entries    : {}", h.entry_count)?;
            writeln!(w, "  checksum   : 0x{:04X}", h.checksum)?;
            writeln!(w, "  body length: {}", h.body_length)?;
        }

        if !self.entries.is_empty() {
            writeln!(w, "entries ({}):", self.entries.len())?;
        }
        let shown = if verbose {
            self.entries.len()
        } else {
            self.entries.len().min(SHORT_LISTING)
        };
        for e in &self.entries[..shown] {
            let flag = if e.in_bounds { ' ' } else { '!' };
            match (e.width, e.height) {
                (Some(wd), Some(ht)) if wd > 0 && ht > 0 => writeln!(
                    w,
                    " {flag}{:<6} {:<40} {:>8} bytes  ({wd}x{ht})",
                    e.category.as_str(),
                    e.name,
                    e.size
                )?,
                _ => writeln!(
                    w,
                    " {flag}{:<6} {:<40} {:>8} bytes",
                    e.category.as_str(),
                    e.name,
                    e.size
                )?,
            }
        }
        if shown < self.entries.len() {
            writeln!(
                w,
                "  ... and {} more (use --verbose to list all)",
                self.entries.len() - shown
            )?;
        }

        writeln!(w, "categories:")?;
        for c in Category::ALL {
            writeln!(w, "  {:<6}: {}", c.as_str(), self.categories.get(c))?;
        }

        for warn in &self.warnings {
            match warn {
                Warning::BodyLengthMismatch {
                    declared,
                    available,
                } => writeln!(
                    w,
                    "warning: body length declares {declared} bytes, {available} present"
                )?,
                Warning::DuplicateName { name } => {
                    writeln!(w, "warning: duplicate name shadows earlier entry: {name}")?
                }
            }
        }

        for p in &self.problems {
            match p {
                Problem::Structural { detail } => writeln!(w, "problem: structural: {detail}")?,
                Problem::ChecksumMismatch { expected, actual } => writeln!(
                    w,
                    "problem: checksum mismatch: expected 0x{expected:04X}, actual 0x{actual:04X}"
                )?,
                Problem::OutOfBounds { name, offset, size } => writeln!(
                    w,
                    "problem: {name} (offset {offset}, size {size}) exceeds payload region"
                )?,
                Problem::BadMarker { name } => {
                    writeln!(w, "problem: framing marker missing for {name}")?
                }
            }
        }

        match self.reason {
            None => writeln!(w, "ok: {} entries", self.entries.len())?,
            Some(r) => writeln!(w, "FAILED ({})", r.as_str())?,
        }
        Ok(())
    }
}
