//! Field semantics registry
//!
//! Static mapping between data word indices and channel names. The registry is
//! built once per process and shared read-only by every decode and export
//! operation; its known-channel table is the single source of truth for the
//! export column order.

use crate::types::DATA_WORDS;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Label used for data words with no known meaning
pub const UNKNOWN_LABEL: &str = "?";

/// Known single-value channels, in export column order
pub const KNOWN_CHANNELS: [(&str, usize); 7] = [
    ("Reslex", 1),
    ("IPAP", 2),
    ("EPAP", 3),
    ("tidal_vol", 99),
    ("spO2_pct", 102),
    ("HR_BPM", 103),
    ("rep_rate", 104),
];

/// A block of consecutive data words holding sub-second samples of one signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelFamily {
    /// Base label; each member is labelled `name[i]`
    pub name: &'static str,
    /// Index of the first sample
    pub start: usize,
    /// Number of samples per record
    pub len: usize,
}

impl ChannelFamily {
    /// Data index of sample `i`
    pub fn index(&self, i: usize) -> usize {
        self.start + i
    }

    /// Range of data indices covered by this family
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }
}

/// Flow/pressure waveforms sampled at 25 Hz
pub const WAVEFORM_25HZ: [ChannelFamily; 3] = [
    ChannelFamily { name: "resA", start: 4, len: 25 },
    ChannelFamily { name: "resB", start: 29, len: 25 },
    ChannelFamily { name: "resC", start: 54, len: 25 },
];

/// Pulse waveform sampled at 10 Hz
pub const PULSE_10HZ: ChannelFamily = ChannelFamily { name: "pulse", start: 79, len: 10 };

/// One row of the index-to-label table, used for field map dumps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldEntry {
    pub index: usize,
    pub label: String,
    pub known: bool,
}

/// The field semantics registry
#[derive(Debug)]
pub struct FieldRegistry {
    /// One label per data index
    labels: Vec<String>,

    /// Reverse lookup for every labelled index
    by_name: HashMap<String, usize>,
}

impl FieldRegistry {
    /// Build the registry from the static channel tables
    pub fn new() -> Self {
        let mut labels = vec![UNKNOWN_LABEL.to_string(); DATA_WORDS];

        for family in WAVEFORM_25HZ.iter().chain(std::iter::once(&PULSE_10HZ)) {
            for (i, index) in family.indices().enumerate() {
                labels[index] = format!("{}[{}]", family.name, i);
            }
        }

        for (name, index) in KNOWN_CHANNELS {
            labels[index] = name.to_string();
        }

        let by_name = labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.as_str() != UNKNOWN_LABEL)
            .map(|(index, label)| (label.clone(), index))
            .collect();

        Self { labels, by_name }
    }

    /// Process-wide shared instance
    pub fn global() -> &'static FieldRegistry {
        static REGISTRY: OnceLock<FieldRegistry> = OnceLock::new();
        REGISTRY.get_or_init(FieldRegistry::new)
    }

    /// Label for a data index, `"?"` if unknown or out of range
    pub fn label_for(&self, index: usize) -> &str {
        self.labels
            .get(index)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_LABEL)
    }

    /// Data index for a channel name
    pub fn index_for(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// All labels, one per data index
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Indices of the known single-value channels, in export order
    pub fn known_indices(&self) -> impl Iterator<Item = usize> {
        KNOWN_CHANNELS.iter().map(|(_, index)| *index)
    }

    /// Indices exported in "all data" mode: 1..=2 and 89..=105
    pub fn interesting_indices(&self) -> impl Iterator<Item = usize> {
        (1..3).chain(89..DATA_WORDS)
    }

    /// Full index-to-label table
    pub fn entries(&self) -> Vec<FieldEntry> {
        self.labels
            .iter()
            .enumerate()
            .map(|(index, label)| FieldEntry {
                index,
                label: label.clone(),
                known: label != UNKNOWN_LABEL,
            })
            .collect()
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}
