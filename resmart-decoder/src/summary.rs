//! Per-day coverage summaries
//!
//! One line per calendar date: the ISO date, a 24-glyph hour map and the
//! packet count rendered as `HH:MM`.
//!
//! The duration treats every packet as a one-second tick. It is an
//! approximation of recording time, not wall-clock time.

use crate::packet::Packet;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

const HOURS: usize = 24;

/// Coverage of a single hour of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HourCoverage {
    /// No packet observed
    Empty,
    /// Packets observed, none with a pulse reading
    NoPulse,
    /// At least one packet with a pulse reading
    Pulse,
}

impl HourCoverage {
    /// Display glyph
    pub fn glyph(self) -> char {
        match self {
            HourCoverage::Empty => '.',
            HourCoverage::NoPulse => '+',
            HourCoverage::Pulse => 'O',
        }
    }
}

/// Summary of all packets recorded on one date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub hours: [HourCoverage; HOURS],
    /// Number of packets, one per second of recording
    pub packet_count: u64,
}

impl DaySummary {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            hours: [HourCoverage::Empty; HOURS],
            packet_count: 0,
        }
    }

    fn record(&mut self, packet: &Packet) {
        self.packet_count += 1;
        // Hours past 23 only count towards the total
        if let Some(slot) = self.hours.get_mut(usize::from(packet.hour())) {
            let seen = if packet.has_pulse {
                HourCoverage::Pulse
            } else {
                HourCoverage::NoPulse
            };
            *slot = (*slot).max(seen);
        }
    }

    /// The 24-character hour map
    pub fn hour_map(&self) -> String {
        self.hours.iter().map(|h| h.glyph()).collect()
    }

    /// Packet count as `HH:MM`
    pub fn duration_hm(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.packet_count / 3600,
            (self.packet_count % 3600) / 60
        )
    }
}

impl fmt::Display for DaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.hour_map(),
            self.duration_hm()
        )
    }
}

/// Summarise a packet sequence, one entry per date in order of first appearance
pub fn summarize_days(packets: &[Packet]) -> Vec<DaySummary> {
    let mut days: Vec<DaySummary> = Vec::new();
    let mut slots: HashMap<NaiveDate, usize> = HashMap::new();
    let mut current: Option<usize> = None;

    for packet in packets {
        // Consecutive packets on the same date skip the lookup
        let slot = match current {
            Some(i) if days[i].date == packet.date => i,
            _ => *slots.entry(packet.date).or_insert_with(|| {
                days.push(DaySummary::new(packet.date));
                days.len() - 1
            }),
        };
        current = Some(slot);
        days[slot].record(packet);
    }

    days
}
