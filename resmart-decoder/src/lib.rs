//! RESmart Log Decoder Library
//!
//! A stateless library for decoding the fixed-size binary log records written
//! by BMC RESmart therapy devices into time-ordered measurement series, and
//! re-emitting them as CSV at 1 Hz, 10 Hz or 25 Hz.
//!
//! # Architecture
//!
//! Data flows one way:
//! - raw byte buffers are split into 256-byte records and decoded into
//!   [`Packet`]s, labelled through the shared [`FieldRegistry`]
//! - [`SeriesAssembler`] appends packets from every source into one sequence,
//!   in caller order
//! - the sequence feeds [`summarize_days`] and [`CsvExporter`]
//!
//! The library does NOT:
//! - Discover, sort or read input files
//! - Validate firmware versions or physiological ranges
//! - Filter or otherwise process the waveform channels
//!
//! File handling lives in the application layer (resmart-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use resmart_decoder::{assemble, CsvExporter, ExportConfig, FieldRegistry, SampleRate};
//!
//! let registry = FieldRegistry::global();
//! let bytes = std::fs::read("RESmart.001").unwrap();
//! let packets = assemble(registry, [("RESmart.001", bytes.as_slice())]).unwrap();
//!
//! let config = ExportConfig::new()
//!     .with_time_seconds(true)
//!     .with_rate(SampleRate::TenHz)
//!     .with_dates(["2023-05-10"]);
//! let exporter = CsvExporter::new(registry, config).unwrap();
//! exporter.export(&packets, &mut std::io::stdout()).unwrap();
//! ```

// Public modules
pub mod assembler;
pub mod config;
pub mod export;
pub mod packet;
pub mod registry;
pub mod summary;
pub mod types;

// Re-export main types for convenience
pub use assembler::{assemble, records, SeriesAssembler};
pub use config::{DateFilter, DateRange, ExportConfig, SampleRate, ValueColumns};
pub use export::{CsvExporter, CsvRow, ExportStats};
pub use packet::Packet;
pub use registry::{FieldEntry, FieldRegistry};
pub use summary::{summarize_days, DaySummary, HourCoverage};
pub use types::{DecoderError, RawTimestamp, Result, DATA_WORDS, RECORD_SIZE};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
