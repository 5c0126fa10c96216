//! Multi-rate CSV export
//!
//! Emits one comma-space separated line per sample for every packet inside
//! the configured date range. At 1 Hz each packet yields one line; the 10 Hz
//! and 25 Hz modes expand each packet into one line per waveform sample with
//! a fractional timestamp.
//!
//! Rows are built as ordered field lists and serialized once per line.

use crate::config::{DateFilter, ExportConfig, SampleRate, ValueColumns};
use crate::packet::Packet;
use crate::registry::{ChannelFamily, FieldRegistry, PULSE_10HZ, WAVEFORM_25HZ};
use crate::types::{RawTimestamp, Result};
use std::io::Write;

/// Field separator
pub const SEPARATOR: &str = ", ";

/// Header label for time columns
const TIME_LABEL: &str = "Time (s)";

/// One output line as an ordered list of fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    fields: Vec<String>,
}

impl CsvRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl ToString) {
        self.fields.push(field.to_string());
    }

    pub fn extend<I, T>(&mut self, fields: I)
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.fields.extend(fields.into_iter().map(|f| f.to_string()));
    }

    /// Serialize the row, without line break
    pub fn to_line(&self) -> String {
        finish_line(&self.fields.join(SEPARATOR))
    }
}

/// Strip trailing whitespace and a single trailing separator
pub fn finish_line(line: &str) -> String {
    let line = line.trim_end();
    line.strip_suffix(',').unwrap_or(line).to_string()
}

/// Fractional timestamp `base + i / rate`, rendered with two decimals
fn fractional_time(base: i64, i: usize, rate: usize) -> String {
    let hundredths = i * 100 / rate;
    format!("{}.{:02}", base, hundredths)
}

/// Counters from one export run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Packets inside the date range
    pub packets_exported: usize,
    /// Packets outside the date range
    pub packets_skipped: usize,
    /// Data lines written, header excluded
    pub lines_written: usize,
}

/// CSV exporter for an assembled packet sequence
///
/// Holds no state between runs; exporting the same packets twice produces
/// the same output.
pub struct CsvExporter<'r> {
    registry: &'r FieldRegistry,
    config: ExportConfig,
    filter: DateFilter,
}

impl<'r> CsvExporter<'r> {
    /// Create an exporter, validating the configured date filter
    pub fn new(registry: &'r FieldRegistry, config: ExportConfig) -> Result<Self> {
        let filter = config.date_filter()?;
        Ok(Self {
            registry,
            config,
            filter,
        })
    }

    /// Value channel indices for the configured selection
    fn value_indices(&self) -> Vec<usize> {
        match self.config.values {
            ValueColumns::Known => self.registry.known_indices().collect(),
            ValueColumns::All => self.registry.interesting_indices().collect(),
        }
    }

    /// Header row matching the configured columns
    pub fn header(&self) -> CsvRow {
        let mut row = CsvRow::new();
        if self.config.time_seconds {
            row.push(TIME_LABEL);
        }
        if self.config.time_ymd {
            row.extend(RawTimestamp::FIELD_LABELS);
        }
        row.extend(
            self.value_indices()
                .into_iter()
                .map(|i| self.registry.label_for(i)),
        );
        match self.config.rate {
            SampleRate::OneHz => {}
            SampleRate::TenHz => {
                row.push(TIME_LABEL);
                row.push(PULSE_10HZ.name);
            }
            SampleRate::TwentyFiveHz => {
                row.push(TIME_LABEL);
                row.extend(WAVEFORM_25HZ.iter().map(|f| f.name));
            }
        }
        row
    }

    /// Columns shared by every line of one packet
    fn base_row(&self, packet: &Packet, value_indices: &[usize]) -> CsvRow {
        let mut row = CsvRow::new();
        if self.config.time_seconds {
            row.push(packet.time_seconds());
        }
        if self.config.time_ymd {
            row.extend(packet.timestamp.fields());
        }
        row.extend(value_indices.iter().map(|&i| packet.data[i]));
        row
    }

    fn expand(
        &self,
        packet: &Packet,
        base: &CsvRow,
        families: &[ChannelFamily],
    ) -> Vec<CsvRow> {
        let rate = self.config.rate.lines_per_packet();
        let seconds = packet.time_seconds();
        (0..rate)
            .map(|i| {
                let mut row = base.clone();
                row.push(fractional_time(seconds, i, rate));
                row.extend(families.iter().map(|f| packet.data[f.index(i)]));
                row
            })
            .collect()
    }

    /// Rows emitted for one packet, ignoring the date filter
    fn rows_for(&self, packet: &Packet, value_indices: &[usize]) -> Vec<CsvRow> {
        let base = self.base_row(packet, value_indices);
        match self.config.rate {
            SampleRate::OneHz => vec![base],
            SampleRate::TenHz => self.expand(packet, &base, &[PULSE_10HZ]),
            SampleRate::TwentyFiveHz => self.expand(packet, &base, &WAVEFORM_25HZ),
        }
    }

    /// Write all in-range packets to `out`
    pub fn export<W: Write>(&self, packets: &[Packet], out: &mut W) -> Result<ExportStats> {
        let mut stats = ExportStats::default();

        if self.config.header {
            writeln!(out, "{}", self.header().to_line())?;
        }

        let Some(range) = self.filter.resolve(packets) else {
            log::warn!("No packets to export");
            return Ok(stats);
        };
        log::info!("Exporting {} to {}", range.start, range.end);

        let value_indices = self.value_indices();
        for packet in packets {
            if !range.contains(packet.date) {
                stats.packets_skipped += 1;
                continue;
            }
            for row in self.rows_for(packet, &value_indices) {
                writeln!(out, "{}", row.to_line())?;
                stats.lines_written += 1;
            }
            stats.packets_exported += 1;
        }

        log::info!(
            "Exported {} packets ({} lines), skipped {}",
            stats.packets_exported,
            stats.lines_written,
            stats.packets_skipped
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::testutil::record;

    fn packet(ts: (u16, u8, u8, u8, u8, u8), words: &[(usize, u16)]) -> Packet {
        Packet::decode(&record(ts, words), FieldRegistry::global()).unwrap()
    }

    fn export_lines(config: ExportConfig, packets: &[Packet]) -> (Vec<String>, ExportStats) {
        let exporter = CsvExporter::new(FieldRegistry::global(), config).unwrap();
        let mut out = Vec::new();
        let stats = exporter.export(packets, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        (text.lines().map(str::to_string).collect(), stats)
    }

    #[test]
    fn test_finish_line() {
        assert_eq!(finish_line("1, 2, 3, "), "1, 2, 3");
        assert_eq!(finish_line("1, 2, 3"), "1, 2, 3");
        assert_eq!(finish_line("1, 2,,  "), "1, 2,");
    }

    #[test]
    fn test_fractional_time() {
        assert_eq!(fractional_time(100, 0, 10), "100.00");
        assert_eq!(fractional_time(100, 9, 10), "100.90");
        assert_eq!(fractional_time(7, 1, 25), "7.04");
        assert_eq!(fractional_time(7, 24, 25), "7.96");
    }

    #[test]
    fn test_known_values_row() {
        let p = packet(
            (2023, 5, 10, 13, 0, 0),
            &[(1, 11), (2, 12), (3, 13), (99, 500), (102, 97), (103, 64), (104, 15)],
        );
        let (lines, stats) = export_lines(ExportConfig::new(), &[p]);
        assert_eq!(lines, vec!["11, 12, 13, 500, 97, 64, 15"]);
        assert_eq!(stats.lines_written, 1);
    }

    #[test]
    fn test_all_values_row() {
        let words: Vec<(usize, u16)> = (0..106).map(|i| (i, i as u16)).collect();
        let p = packet((2023, 5, 10, 13, 0, 0), &words);
        let (lines, _) = export_lines(ExportConfig::new().with_values(ValueColumns::All), &[p]);

        let fields: Vec<&str> = lines[0].split(SEPARATOR).collect();
        assert_eq!(fields.len(), 19);
        assert_eq!(fields[..3], ["1", "2", "89"]);
        assert_eq!(fields[18], "105");
    }

    #[test]
    fn test_time_columns() {
        let p = packet((2023, 5, 10, 1, 2, 3), &[]);
        let seconds = p.time_seconds();
        let config = ExportConfig::new().with_time_seconds(true).with_time_ymd(true);
        let (lines, _) = export_lines(config, &[p]);

        assert_eq!(
            lines[0],
            format!("{}, 2023, 5, 10, 1, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0", seconds)
        );
    }

    #[test]
    fn test_ten_hz_expansion() {
        let words: Vec<(usize, u16)> = (0..10).map(|i| (79 + i, 100 + i as u16)).collect();
        let p = packet((2023, 5, 10, 0, 1, 40), &words);
        let base = p.time_seconds();
        let (lines, stats) = export_lines(ExportConfig::new().with_rate(SampleRate::TenHz), &[p]);

        assert_eq!(lines.len(), 10);
        assert_eq!(stats.lines_written, 10);
        assert_eq!(stats.packets_exported, 1);
        for (i, line) in lines.iter().enumerate() {
            let expected = format!("0, 0, 0, 0, 0, 0, 0, {}.{}0, {}", base, i, 100 + i);
            assert_eq!(line, &expected);
        }
    }

    #[test]
    fn test_twenty_five_hz_expansion() {
        let p = packet((2023, 5, 10, 0, 0, 0), &[(4, 1), (29, 2), (54, 3), (28, 7), (53, 8), (78, 9)]);
        let base = p.time_seconds();
        let (lines, _) = export_lines(
            ExportConfig::new().with_rate(SampleRate::TwentyFiveHz),
            &[p.clone(), p],
        );

        assert_eq!(lines.len(), 50);
        assert!(lines[0].ends_with(&format!("{}.00, 1, 2, 3", base)));
        assert!(lines[24].ends_with(&format!("{}.96, 7, 8, 9", base)));
    }

    #[test]
    fn test_single_date_filter() {
        let packets = vec![
            packet((2023, 5, 9, 23, 59, 59), &[(2, 9)]),
            packet((2023, 5, 10, 0, 0, 0), &[(2, 10)]),
            packet((2023, 5, 10, 23, 59, 59), &[(2, 10)]),
            packet((2023, 5, 11, 0, 0, 0), &[(2, 11)]),
        ];
        let (lines, stats) = export_lines(ExportConfig::new().with_dates(["2023-05-10"]), &packets);

        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.starts_with("0, 10,")));
        assert_eq!(stats.packets_skipped, 2);
    }

    #[test]
    fn test_default_range_spans_first_to_last() {
        let packets = vec![
            packet((2023, 5, 9, 0, 0, 0), &[]),
            packet((2023, 5, 11, 0, 0, 0), &[]),
        ];
        let (lines, _) = export_lines(ExportConfig::new(), &packets);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_header_row() {
        let exporter = CsvExporter::new(
            FieldRegistry::global(),
            ExportConfig::new()
                .with_time_seconds(true)
                .with_rate(SampleRate::TwentyFiveHz),
        )
        .unwrap();
        assert_eq!(
            exporter.header().to_line(),
            "Time (s), Reslex, IPAP, EPAP, tidal_vol, spO2_pct, HR_BPM, rep_rate, Time (s), resA, resB, resC"
        );

        let (lines, stats) = export_lines(ExportConfig::new().with_header(true), &[]);
        assert_eq!(lines.len(), 1);
        assert_eq!(stats.lines_written, 0);
    }

    #[test]
    fn test_invalid_dates_rejected_up_front() {
        let result = CsvExporter::new(FieldRegistry::global(), ExportConfig::new().with_dates(["nope"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_rerun_is_identical() {
        let packets = vec![packet((2023, 5, 10, 0, 0, 0), &[(79, 3)])];
        let exporter = CsvExporter::new(
            FieldRegistry::global(),
            ExportConfig::new().with_rate(SampleRate::TenHz),
        )
        .unwrap();

        let mut first = Vec::new();
        let mut second = Vec::new();
        exporter.export(&packets, &mut first).unwrap();
        exporter.export(&packets, &mut second).unwrap();
        assert_eq!(first, second);
        assert_eq!(exporter.rows_for(&packets[0], &exporter.value_indices()).len(), 10);
    }
}
