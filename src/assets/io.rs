#![forbid(unsafe_code)]

use crate::assets::error::{AssetError, AssetResult};

pub fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Forward-only little-endian reader over a borrowed buffer.
/// Running out of bytes is a `Truncated` error naming what was being read.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn take(&mut self, n: usize, what: &'static str) -> AssetResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(AssetError::Truncated {
                what,
                needed: n as u64,
                available: self.remaining() as u64,
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_exact<const N: usize>(&mut self, what: &'static str) -> AssetResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    pub fn read_u16(&mut self, what: &'static str) -> AssetResult<u16> {
        Ok(u16::from_le_bytes(self.read_exact::<2>(what)?))
    }

    pub fn read_u32(&mut self, what: &'static str) -> AssetResult<u32> {
        Ok(u32::from_le_bytes(self.read_exact::<4>(what)?))
    }
}

/// Lowercase hex of the blake3 digest of `data`.
pub fn blake3_hex(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}
