//! Core types for the RESmart log decoder library
//!
//! This module defines the fixed record geometry, the raw timestamp carried by
//! every record, and the error type shared by all decoding and export operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of one binary record in bytes
pub const RECORD_SIZE: usize = 256;

/// Number of 16-bit data words at the start of each record
pub const DATA_WORDS: usize = 106;

/// Size of the trailing timestamp block in bytes
pub const TIMESTAMP_SIZE: usize = 8;

/// Byte offset of the timestamp block inside a record
pub const TIMESTAMP_OFFSET: usize = RECORD_SIZE - TIMESTAMP_SIZE;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Raw timestamp fields as stored in the last 8 bytes of a record
///
/// No range checking happens here; calendar validation is done when the
/// packet derives its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawTimestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Trailing pad byte, passed through verbatim
    pub reserved: u8,
}

impl RawTimestamp {
    /// Labels for the seven raw fields, in wire order
    pub const FIELD_LABELS: [&'static str; 7] =
        ["year", "month", "day", "hour", "minute", "second", "?"];

    /// The seven raw fields widened to `u32`, in wire order
    pub fn fields(&self) -> [u32; 7] {
        [
            u32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
            u32::from(self.reserved),
        ]
    }
}

impl fmt::Display for RawTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Errors that can occur during decoding and export
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Record buffer too short: {len} bytes (need at least {})", RECORD_SIZE)]
    BufferTooShort { len: usize },

    #[error("Invalid calendar date in timestamp: {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: u16, month: u8, day: u8 },

    #[error("Failed to decode record {record} of {source_name}: {error}")]
    Record {
        source_name: String,
        record: usize,
        #[source]
        error: Box<DecoderError>,
    },

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecoderError {
    /// True for errors raised while turning bytes into packets
    pub fn is_decode_error(&self) -> bool {
        match self {
            DecoderError::BufferTooShort { .. }
            | DecoderError::InvalidDate { .. } => true,
            DecoderError::Record { error, .. } => error.is_decode_error(),
            _ => false,
        }
    }

    /// True for malformed user input (date range arguments)
    pub fn is_input_error(&self) -> bool {
        matches!(self, DecoderError::InvalidDateRange(_))
    }
}
