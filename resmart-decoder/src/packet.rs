//! Packet decoding
//!
//! Turns one fixed-size 256-byte record into a [`Packet`]: 106 little-endian
//! data words, the raw timestamp from the final 8 bytes, and the calendar
//! values derived from it.

use crate::registry::FieldRegistry;
use crate::types::{
    DecoderError, RawTimestamp, Result, DATA_WORDS, RECORD_SIZE, TIMESTAMP_OFFSET,
};
use byteorder::{LittleEndian, ReadBytesExt};
use chrono::{Datelike, NaiveDate};
use std::io::Cursor;

// Data words must end before the timestamp block, so a full-length buffer
// always holds the whole data region
const _: () = assert!(2 * DATA_WORDS <= TIMESTAMP_OFFSET);

/// Number of data words per row in [`Packet::describe`]
const DESCRIBE_ROW: usize = 25;

/// One decoded record
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    /// The 106 data words, index 0..105
    pub data: [u16; DATA_WORDS],
    /// Raw timestamp fields
    pub timestamp: RawTimestamp,
    /// Calendar date of the timestamp
    pub date: NaiveDate,
    /// Day number (proleptic Gregorian, 0001-01-01 is day 1)
    pub ordinal: i64,
    /// True if the SpO2 channel carries a reading
    pub has_pulse: bool,
}

impl Packet {
    /// Decode a packet from a record buffer
    ///
    /// Only the first [`RECORD_SIZE`] bytes are used. Values are passed through
    /// verbatim; the only validation is buffer length and calendar date.
    /// Year 0 is rejected so the ordinal stays at 1 or above.
    pub fn decode(buf: &[u8], registry: &FieldRegistry) -> Result<Self> {
        if buf.len() < RECORD_SIZE {
            return Err(DecoderError::BufferTooShort { len: buf.len() });
        }
        let record = &buf[..RECORD_SIZE];

        let timestamp = Self::parse_timestamp(&record[TIMESTAMP_OFFSET..])?;
        let data = Self::parse_data(record)?;

        let date = NaiveDate::from_ymd_opt(
            i32::from(timestamp.year),
            u32::from(timestamp.month),
            u32::from(timestamp.day),
        )
        .filter(|_| timestamp.year > 0)
        .ok_or(DecoderError::InvalidDate {
            year: timestamp.year,
            month: timestamp.month,
            day: timestamp.day,
        })?;

        let has_pulse = registry
            .index_for("spO2_pct")
            .map(|index| data[index] > 0)
            .unwrap_or(false);

        Ok(Self {
            data,
            timestamp,
            date,
            ordinal: i64::from(date.num_days_from_ce()),
            has_pulse,
        })
    }

    fn parse_timestamp(block: &[u8]) -> Result<RawTimestamp> {
        let mut cursor = Cursor::new(block);
        Ok(RawTimestamp {
            year: cursor.read_u16::<LittleEndian>()?,
            month: cursor.read_u8()?,
            day: cursor.read_u8()?,
            hour: cursor.read_u8()?,
            minute: cursor.read_u8()?,
            second: cursor.read_u8()?,
            reserved: cursor.read_u8()?,
        })
    }

    fn parse_data(record: &[u8]) -> Result<[u16; DATA_WORDS]> {
        let mut data = [0u16; DATA_WORDS];
        let mut cursor = Cursor::new(record);
        cursor.read_u16_into::<LittleEndian>(&mut data)?;
        Ok(data)
    }

    /// ISO `YYYY-MM-DD` rendering of the date
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Seconds since the start of the proleptic calendar at this packet's time
    pub fn time_seconds(&self) -> i64 {
        let ts = &self.timestamp;
        i64::from(ts.second)
            + 60 * i64::from(ts.minute)
            + 3600 * (i64::from(ts.hour) + 24 * self.ordinal)
    }

    /// Hour of day from the raw timestamp
    pub fn hour(&self) -> u8 {
        self.timestamp.hour
    }

    /// Multi-line hex dump of the data words and timestamp
    pub fn describe(&self) -> String {
        let mut out = format!("packet dlen {}\ndata:\n", DATA_WORDS);
        for row in self.data.chunks(DESCRIBE_ROW) {
            let words: Vec<String> = row.iter().map(|w| format!("{:4x}", w)).collect();
            out.push_str(&words.join(" "));
            out.push('\n');
        }
        out.push_str(&format!("timestamp: {}", self.timestamp));
        out
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::record;
    use super::*;

    #[test]
    fn test_decode_with_pulse() {
        let buf = record((2023, 5, 10, 13, 0, 0), &[(102, 98), (103, 61)]);
        let packet = Packet::decode(&buf, FieldRegistry::global()).unwrap();

        assert!(packet.has_pulse);
        assert_eq!(packet.date_string(), "2023-05-10");
        assert_eq!(packet.hour(), 13);
        assert_eq!(packet.data[102], 98);
        assert_eq!(packet.data[103], 61);
        assert_eq!(packet.data.len(), DATA_WORDS);
    }

    #[test]
    fn test_decode_little_endian_words() {
        let mut buf = record((2023, 5, 10, 0, 0, 0), &[]);
        buf[0] = 0x34;
        buf[1] = 0x12;
        buf[210] = 0xCD;
        buf[211] = 0xAB;
        let packet = Packet::decode(&buf, FieldRegistry::global()).unwrap();

        assert_eq!(packet.data[0], 0x1234);
        assert_eq!(packet.data[105], 0xABCD);
        assert!(!packet.has_pulse);
    }

    #[test]
    fn test_timestamp_layout() {
        let mut buf = record((0, 0, 0, 0, 0, 0), &[]);
        buf[248..256].copy_from_slice(&[0xE7, 0x07, 12, 31, 23, 59, 58, 7]);
        let packet = Packet::decode(&buf, FieldRegistry::global()).unwrap();

        assert_eq!(
            packet.timestamp,
            RawTimestamp {
                year: 2023,
                month: 12,
                day: 31,
                hour: 23,
                minute: 59,
                second: 58,
                reserved: 7,
            }
        );
    }

    #[test]
    fn test_short_buffer_rejected() {
        let buf = vec![0u8; 200];
        let result = Packet::decode(&buf, FieldRegistry::global());
        assert!(matches!(result, Err(DecoderError::BufferTooShort { len: 200 })));
    }

    #[test]
    fn test_invalid_date_rejected() {
        let buf = record((2023, 2, 30, 0, 0, 0), &[]);
        let result = Packet::decode(&buf, FieldRegistry::global());
        assert!(matches!(
            result,
            Err(DecoderError::InvalidDate { year: 2023, month: 2, day: 30 })
        ));

        let buf = record((2023, 0, 1, 0, 0, 0), &[]);
        assert!(Packet::decode(&buf, FieldRegistry::global()).is_err());
    }

    #[test]
    fn test_year_zero_rejected() {
        let buf = record((0, 1, 1, 0, 0, 5), &[]);
        let result = Packet::decode(&buf, FieldRegistry::global());
        assert!(matches!(
            result,
            Err(DecoderError::InvalidDate { year: 0, month: 1, day: 1 })
        ));
    }

    #[test]
    fn test_earliest_date_has_positive_time() {
        let packet = Packet::decode(&record((1, 1, 1, 0, 0, 0), &[]), FieldRegistry::global())
            .unwrap();
        assert_eq!(packet.ordinal, 1);
        assert_eq!(packet.time_seconds(), 86_400);
    }

    #[test]
    fn test_longer_buffer_uses_first_record() {
        let mut buf = record((2023, 5, 10, 1, 2, 3), &[]);
        buf.extend(std::iter::repeat(0xFF).take(100));
        let packet = Packet::decode(&buf, FieldRegistry::global()).unwrap();
        assert_eq!(packet.timestamp.second, 3);
    }

    #[test]
    fn test_time_seconds_and_ordinal() {
        let a = Packet::decode(&record((2023, 5, 10, 0, 0, 0), &[]), FieldRegistry::global())
            .unwrap();
        let b = Packet::decode(&record((2023, 5, 11, 1, 2, 3), &[]), FieldRegistry::global())
            .unwrap();

        assert_eq!(b.ordinal - a.ordinal, 1);
        assert_eq!(a.time_seconds(), 86_400 * a.ordinal);
        assert_eq!(b.time_seconds() - a.time_seconds(), 86_400 + 3600 + 120 + 3);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let buf = record((2024, 2, 29, 6, 30, 0), &[(4, 500), (79, 12), (102, 97)]);
        let a = Packet::decode(&buf, FieldRegistry::global()).unwrap();
        let b = Packet::decode(&buf, &FieldRegistry::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_describe() {
        let buf = record((2023, 5, 10, 13, 0, 0), &[(0, 0xBEEF)]);
        let packet = Packet::decode(&buf, FieldRegistry::global()).unwrap();
        let text = packet.describe();

        assert!(text.starts_with("packet dlen 106"));
        assert!(text.contains("beef"));
        assert!(text.ends_with("timestamp: 2023-05-10 13:00:00"));
        assert_eq!(text.lines().count(), 2 + 5 + 1);
    }
}
