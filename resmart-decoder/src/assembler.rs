//! Time-series assembly
//!
//! Splits source buffers into fixed-size records, decodes each record and
//! appends it to one ordered packet sequence. Sources are taken in the order
//! the caller provides and records in byte order. No reordering, deduplication
//! or cross-packet consistency checks are performed.

use crate::packet::Packet;
use crate::registry::FieldRegistry;
use crate::types::{DecoderError, Result, RECORD_SIZE};
use chrono::NaiveDate;

/// Split a buffer into whole records; a trailing partial record is ignored
pub fn records(bytes: &[u8]) -> std::slice::ChunksExact<'_, u8> {
    bytes.chunks_exact(RECORD_SIZE)
}

/// Builds the ordered packet sequence from one or more sources
pub struct SeriesAssembler<'r> {
    registry: &'r FieldRegistry,
    packets: Vec<Packet>,
    source_count: usize,
    /// Date of the most recently appended packet, for progress narration
    last_date: Option<NaiveDate>,
}

impl<'r> SeriesAssembler<'r> {
    /// Create an empty assembler sharing the given registry
    pub fn new(registry: &'r FieldRegistry) -> Self {
        Self {
            registry,
            packets: Vec::new(),
            source_count: 0,
            last_date: None,
        }
    }

    /// Decode every whole record in `bytes` and append it to the sequence
    ///
    /// Returns the number of packets appended. The first record that fails to
    /// decode aborts the source; packets from earlier records stay appended.
    pub fn add_source(&mut self, name: &str, bytes: &[u8]) -> Result<usize> {
        let chunks = records(bytes);
        let trailing = chunks.remainder().len();
        if trailing > 0 {
            log::warn!("{}: ignoring {} trailing bytes", name, trailing);
        }

        let before = self.packets.len();
        for (record, buf) in chunks.enumerate() {
            let packet = Packet::decode(buf, self.registry).map_err(|e| DecoderError::Record {
                source_name: name.to_string(),
                record,
                error: Box::new(e),
            })?;

            if log::log_enabled!(log::Level::Trace) {
                log::trace!("{} record {}:\n{}", name, record, packet.describe());
            }

            if self.last_date != Some(packet.date) {
                self.last_date = Some(packet.date);
                log::info!("processed {}", packet.date_string());
            }

            self.packets.push(packet);
        }

        self.source_count += 1;
        let added = self.packets.len() - before;
        log::debug!("{}: {} packets", name, added);
        Ok(added)
    }

    /// Packets assembled so far
    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    /// Number of sources successfully added
    pub fn source_count(&self) -> usize {
        self.source_count
    }

    /// Finish assembly and take the packet sequence
    pub fn into_packets(self) -> Vec<Packet> {
        log::info!(
            "{} packets found in {} files",
            self.packets.len(),
            self.source_count
        );
        self.packets
    }
}

/// Assemble a packet sequence from named sources in the given order
pub fn assemble<'a, I>(registry: &FieldRegistry, sources: I) -> Result<Vec<Packet>>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut assembler = SeriesAssembler::new(registry);
    for (name, bytes) in sources {
        assembler.add_source(name, bytes)?;
    }
    Ok(assembler.into_packets())
}
