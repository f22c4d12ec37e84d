// Internal utilities for documentation tests
// Builds sample headers used by doctests and unit tests

use chrono::{NaiveDate, NaiveTime};

use crate::error::EncodeError;
use crate::types::{DataRecordCount, EdfDocumentHeader, MainHeader, SignalSubHeader};

/// A two-channel EEG recording plus an annotation channel, 30-second records.
pub fn sample_document_header() -> Result<EdfDocumentHeader, EncodeError> {
    let main = MainHeader::builder()
        .local_patient_id("DOC001 M 01-JAN-1990 Test_Patient")
        .local_recording_id("Startdate 02-MAR-2002 PSG-1234/2002 Tech Device")
        .start_date(NaiveDate::from_ymd_opt(2002, 3, 2).unwrap_or_default())
        .start_time(NaiveTime::from_hms_opt(14, 27, 0).unwrap_or_default())
        .reserved(b"EDF+C")
        .number_of_data_records(DataRecordCount::Known(2880))
        .duration_of_data_record(30.0)
        .build()?;

    let mut signals = Vec::new();
    for label in ["EEG Fpz-Cz", "EEG Pz-Oz"] {
        signals.push(
            SignalSubHeader::builder(label)
                .transducer_type("AgAgCl cup electrodes")
                .physical_dimension("uV")
                .physical_range(-440.0, 510.0)
                .digital_range(-2048, 2047)
                .prefiltering("HP:0.1Hz LP:75Hz")
                .samples_per_record(3000)
                .build()?,
        );
    }
    signals.push(SignalSubHeader::annotation(60)?);

    Ok(EdfDocumentHeader::new(main, signals))
}

/// Encoded bytes of [`sample_document_header`].
pub fn sample_header_bytes() -> Result<Vec<u8>, EncodeError> {
    crate::writer::encode_document_header(&sample_document_header()?)
}
