//! # EDF Header Codec for Rust
//!
//! A pure Rust library for reading and writing the header record of EDF
//! (European Data Format) files, the format used for EEG, polysomnography
//! and other multichannel biosignal recordings.
//!
//! The header is plain ASCII in fixed-width, space-padded fields:
//!
//! - a 256-byte main header (version, patient and recording identification,
//!   start date and time, header size, record count and duration, signal count)
//! - one 256-byte description per signal, stored **column by column**: all
//!   labels first, then all transducer types, and so on
//!
//! The total header size is always `256 + 256 × number_of_signals`. This
//! crate decodes and encodes that region byte for byte; the data records
//! that follow it are left to the caller.
//!
//! ## Quick Start
//!
//! ### Building and encoding a header
//!
//! ```rust
//! use chrono::{NaiveDate, NaiveTime};
//! use edfheader::{
//!     encode_document_header, DataRecordCount, EdfDocumentHeader, MainHeader, SignalSubHeader,
//! };
//!
//! fn main() -> Result<(), edfheader::EncodeError> {
//!     let main = MainHeader::builder()
//!         .local_patient_id("P001 M 01-JAN-1990 Patient_Name")
//!         .local_recording_id("Startdate 02-MAR-2002 EEG-001 Tech Device")
//!         .start_date(NaiveDate::from_ymd_opt(2002, 3, 2).unwrap())
//!         .start_time(NaiveTime::from_hms_opt(14, 27, 0).unwrap())
//!         .number_of_data_records(DataRecordCount::Unknown)
//!         .duration_of_data_record(1.0)
//!         .build()?;
//!
//!     let signal = SignalSubHeader::builder("EEG Fp1")
//!         .transducer_type("AgAgCl cup electrodes")
//!         .physical_dimension("uV")
//!         .physical_range(-200.0, 200.0)
//!         .digital_range(-32768, 32767)
//!         .prefiltering("HP:0.1Hz LP:70Hz")
//!         .samples_per_record(256)
//!         .build()?;
//!
//!     let header = EdfDocumentHeader::new(main, vec![signal]);
//!     let bytes = encode_document_header(&header)?;
//!
//!     assert_eq!(bytes.len(), header.header_record_size());
//!     assert_eq!(&bytes[184..192], b"512     ");
//!     assert_eq!(&bytes[236..244], b"-1      ");
//!     Ok(())
//! }
//! ```
//!
//! ### Decoding a header
//!
//! ```rust
//! use std::io::Cursor;
//! use edfheader::{decode_document_header, DataRecordCount, Result};
//!
//! fn main() -> Result<()> {
//!     # let bytes = edfheader::doctest_utils::sample_header_bytes()?;
//!     // Any seekable byte source works; here an in-memory file.
//!     let mut source = Cursor::new(bytes);
//!     let header = decode_document_header(&mut source)?;
//!
//!     println!("Patient: {}", header.main_header().local_patient_id());
//!     println!("Start: {}", header.main_header().start_datetime());
//!
//!     for (i, signal) in header.signals().iter().enumerate() {
//!         println!("Signal {}: {} ({}), {} samples/record",
//!             i, signal.label(), signal.physical_dimension(), signal.samples_per_record());
//!     }
//!
//!     if let DataRecordCount::Known(records) = header.main_header().number_of_data_records() {
//!         println!("{} records of {} s", records, header.main_header().duration_of_data_record());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Physical vs Digital Values
//!
//! Each signal maps its stored integer codes linearly onto physical units.
//! The mapping is only defined when digital min < digital max and physical
//! min != physical max, which both decode and the builders enforce.
//!
//! ```rust
//! use edfheader::SignalSubHeader;
//!
//! let signal = SignalSubHeader::builder("Test Signal")
//!     .physical_range(-100.0, 100.0)
//!     .digital_range(-32768, 32767)
//!     .build()
//!     .unwrap();
//!
//! let physical_value = signal.to_physical(16384);
//! assert!((physical_value - 50.0).abs() < 0.1);
//!
//! let digital_output = signal.to_digital(25.0);
//! assert!((digital_output - 8192).abs() <= 1);
//! ```
//!
//! ## EDF+
//!
//! EDF+ files use the same header layout. They mark themselves with `EDF+C`
//! or `EDF+D` at the start of the reserved field (see
//! [`MainHeader::variant`]) and carry annotations in signals labelled
//! `EDF Annotations`. Those signals are decoded like any other; their
//! contents are not interpreted.

pub mod error;
pub mod types;
pub mod utils;
pub mod main_header;
pub mod signal_header;
pub mod reader;
pub mod writer;

#[doc(hidden)]
pub mod doctest_utils; // For internal doctest support

// Re-export main types for convenience
pub use error::{DecodeError, EdfError, EncodeError, Result};
pub use types::{
    DataRecordCount, EdfDocumentHeader, EdfVariant, MainHeader, MainHeaderBuilder,
    SignalSubHeader, SignalSubHeaderBuilder,
};
pub use main_header::{decode_main_header, encode_main_header};
pub use signal_header::{decode_signal_subheaders, encode_signal_subheaders};
pub use reader::{decode_document_header, decode_document_header_bytes, read_header_file};
pub use writer::{encode_document_header, update_data_record_count, write_document_header};

// Important constants
pub const MAIN_HEADER_SIZE: usize = 256;
pub const SIGNAL_HEADER_SIZE: usize = 256; // per signal
pub const EDF_VERSION: &str = "0";
pub const ANNOTATION_LABEL: &str = "EDF Annotations";
pub const DIGITAL_SAMPLE_BYTES: usize = 2;

/// Library version
///
/// Returns the current version of the edfheader library.
///
/// # Examples
///
/// ```rust
/// let version = edfheader::version();
/// assert!(!version.is_empty());
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
