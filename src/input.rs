//! Host payload adaptation.
//!
//! [`Payload`] is a bounded, read-only view of the instruction data. It is
//! built either from the slice the runtime entrypoint already deserialized
//! or, via [`InputEnvelope::parse`], straight from the serialized input
//! region the loader hands to a program.

use crate::consts::MAX_PAYLOAD_LEN;
use crate::error::FilterError;

/// Marker byte that precedes a full (non-duplicate) account record.
const NON_DUP_MARKER: u8 = u8::MAX;

/// Bytes the loader reserves after each account's data for reallocation.
const MAX_PERMITTED_DATA_INCREASE: usize = 10 * 1024;

/// Alignment the loader restores after the realloc padding.
const ACCOUNT_DATA_ALIGN: usize = 8;

const PUBKEY_LEN: usize = 32;

/// The instruction data of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload<'a> {
    bytes: &'a [u8],
}

impl<'a> Payload<'a> {
    /// Wrap host instruction data, bounded by [`MAX_PAYLOAD_LEN`].
    pub fn new(bytes: &'a [u8]) -> Result<Self, FilterError> {
        Self::with_limit(bytes, MAX_PAYLOAD_LEN)
    }

    /// Wrap host instruction data with an explicit length ceiling.
    pub fn with_limit(bytes: &'a [u8], limit: usize) -> Result<Self, FilterError> {
        if bytes.len() > limit {
            return Err(FilterError::malformed(
                "instruction data exceeds the payload ceiling",
            ));
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A decoded program input region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEnvelope<'a> {
    pub account_count: usize,
    pub payload: Payload<'a>,
    pub program_id: &'a [u8; PUBKEY_LEN],
}

impl<'a> InputEnvelope<'a> {
    /// Decode a serialized input region.
    ///
    /// Layout: `u64` account count, one record per account, `u64` data
    /// length, the instruction data, then the 32-byte program id. Account
    /// records are skipped; the filter does not need them.
    pub fn parse(region: &'a [u8]) -> Result<Self, FilterError> {
        Self::parse_with_limit(region, MAX_PAYLOAD_LEN)
    }

    pub fn parse_with_limit(region: &'a [u8], limit: usize) -> Result<Self, FilterError> {
        let mut cursor = Cursor::new(region);

        let account_count = cursor.read_len("account count")?;
        for index in 0..account_count {
            skip_account(&mut cursor, index)?;
        }

        let data_len = cursor.read_len("instruction data length")?;
        let data = cursor.take(data_len, "instruction data")?;
        let payload = Payload::with_limit(data, limit)?;

        let program_id = cursor
            .take(PUBKEY_LEN, "program id")?
            .try_into()
            .map_err(|_| FilterError::malformed("truncated program id"))?;

        Ok(Self {
            account_count,
            payload,
            program_id,
        })
    }
}

fn skip_account(cursor: &mut Cursor<'_>, index: usize) -> Result<(), FilterError> {
    let marker = cursor.take(1, "account marker")?[0];
    if marker != NON_DUP_MARKER {
        if usize::from(marker) >= index {
            return Err(FilterError::malformed(
                "duplicate account refers forward",
            ));
        }
        cursor.skip(7, "duplicate account padding")?;
        return Ok(());
    }

    // signer, writable, executable flags + original data length
    cursor.skip(3 + 4, "account header")?;
    cursor.skip(PUBKEY_LEN, "account key")?;
    cursor.skip(PUBKEY_LEN, "account owner")?;
    cursor.skip(8, "account lamports")?;
    let data_len = cursor.read_len("account data length")?;
    cursor.skip(data_len, "account data")?;
    cursor.skip(MAX_PERMITTED_DATA_INCREASE, "account realloc padding")?;
    cursor.align(ACCOUNT_DATA_ALIGN, "account alignment")?;
    cursor.skip(8, "account rent epoch")?;
    Ok(())
}

/// Bounds-checked reader over the input region.
struct Cursor<'a> {
    region: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(region: &'a [u8]) -> Self {
        Self { region, pos: 0 }
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], FilterError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.region.len())
            .ok_or(FilterError::malformed(what))?;
        let bytes = &self.region[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn skip(&mut self, n: usize, what: &'static str) -> Result<(), FilterError> {
        self.take(n, what).map(|_| ())
    }

    fn read_len(&mut self, what: &'static str) -> Result<usize, FilterError> {
        let bytes: [u8; 8] = self
            .take(8, what)?
            .try_into()
            .map_err(|_| FilterError::malformed(what))?;
        usize::try_from(u64::from_le_bytes(bytes)).map_err(|_| FilterError::malformed(what))
    }

    fn align(&mut self, to: usize, what: &'static str) -> Result<(), FilterError> {
        let pad = (to - self.pos % to) % to;
        self.skip(pad, what)
    }
}
