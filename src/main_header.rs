//! Header Record Codec: the fixed 256-byte record at offset 0.

use crate::error::{DecodeError, EncodeError};
use crate::types::{DataRecordCount, MainHeader};
use crate::utils::{
    decode_date, decode_decimal, decode_number, decode_text, decode_time, encode_text,
    format_date, format_decimal, format_time, FieldSpec,
};
use crate::{EDF_VERSION, MAIN_HEADER_SIZE, SIGNAL_HEADER_SIZE};

pub const VERSION: FieldSpec = FieldSpec::new("version", 0, 8);
pub const LOCAL_PATIENT_ID: FieldSpec = FieldSpec::new("local_patient_id", 8, 80);
pub const LOCAL_RECORDING_ID: FieldSpec = FieldSpec::new("local_recording_id", 88, 80);
pub const START_DATE: FieldSpec = FieldSpec::new("start_date_of_recording", 168, 8);
pub const START_TIME: FieldSpec = FieldSpec::new("start_time_of_recording", 176, 8);
pub const HEADER_RECORD_SIZE: FieldSpec = FieldSpec::new("header_record_size", 184, 8);
pub const RESERVED: FieldSpec = FieldSpec::new("reserved", 192, 44);
pub const NUMBER_OF_DATA_RECORDS: FieldSpec = FieldSpec::new("number_of_data_records", 236, 8);
pub const DURATION_OF_DATA_RECORD: FieldSpec = FieldSpec::new("duration_of_data_record", 244, 8);
pub const NUMBER_OF_SIGNALS: FieldSpec = FieldSpec::new("number_of_signals", 252, 4);

/// Decodes the 256-byte main header.
///
/// Only the first 256 bytes are looked at. Numeric fields are checked
/// first, then the header size invariant, the version, the text fields and
/// finally the start date and time.
///
/// # Errors
///
/// * `DecodeError::TruncatedInput` - fewer than 256 bytes
/// * `DecodeError::MalformedNumericField` - a numeric field does not parse
/// * `DecodeError::InconsistentHeaderSize` - header size is not 256 + 256 × signals
/// * `DecodeError::UnsupportedVersion` - version is not `0`
/// * `DecodeError::NonAsciiField` - a text field holds non-printable bytes
/// * `DecodeError::MalformedDateTime` - start date or time is not a valid `dd.mm.yy` / `hh.mm.ss`
pub fn decode_main_header(bytes: &[u8]) -> Result<MainHeader, DecodeError> {
    if bytes.len() < MAIN_HEADER_SIZE {
        return Err(DecodeError::TruncatedInput {
            expected: MAIN_HEADER_SIZE,
            actual: bytes.len(),
        });
    }
    let field = |spec: &FieldSpec| &bytes[spec.range()];

    let declared_size: usize = decode_number(field(&HEADER_RECORD_SIZE), HEADER_RECORD_SIZE.name)?;
    let raw_records: i64 = decode_number(field(&NUMBER_OF_DATA_RECORDS), NUMBER_OF_DATA_RECORDS.name)?;
    let number_of_data_records = DataRecordCount::from_raw(raw_records)
        .ok_or(DecodeError::MalformedNumericField(NUMBER_OF_DATA_RECORDS.name))?;
    let duration_of_data_record =
        decode_decimal(field(&DURATION_OF_DATA_RECORD), DURATION_OF_DATA_RECORD.name)?;
    if duration_of_data_record < 0.0 {
        return Err(DecodeError::MalformedNumericField(DURATION_OF_DATA_RECORD.name));
    }
    let number_of_signals: usize = decode_number(field(&NUMBER_OF_SIGNALS), NUMBER_OF_SIGNALS.name)?;

    let expected_size = MAIN_HEADER_SIZE + SIGNAL_HEADER_SIZE * number_of_signals;
    if declared_size != expected_size {
        return Err(DecodeError::InconsistentHeaderSize {
            declared: declared_size,
            expected: expected_size,
        });
    }

    let version = decode_text(field(&VERSION), VERSION.name)?;
    if version.trim() != EDF_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }
    let local_patient_id = decode_text(field(&LOCAL_PATIENT_ID), LOCAL_PATIENT_ID.name)?;
    let local_recording_id = decode_text(field(&LOCAL_RECORDING_ID), LOCAL_RECORDING_ID.name)?;
    let start_date = decode_date(field(&START_DATE), START_DATE.name)?;
    let start_time = decode_time(field(&START_TIME), START_TIME.name)?;

    let mut reserved = [b' '; 44];
    reserved.copy_from_slice(field(&RESERVED));

    if number_of_data_records.is_unknown() {
        log::debug!("number_of_data_records is -1, count must come from the file size");
    }
    log::trace!(
        "main header decoded: signals={}, header_record_size={}, records={}, duration={}",
        number_of_signals,
        declared_size,
        number_of_data_records,
        duration_of_data_record
    );

    Ok(MainHeader {
        version: EDF_VERSION.to_string(),
        local_patient_id,
        local_recording_id,
        start_date,
        start_time,
        reserved,
        number_of_data_records,
        duration_of_data_record,
        number_of_signals,
    })
}

/// Encodes the main header into exactly 256 bytes.
///
/// The header size field is always recomputed from the signal count. Nothing
/// is returned unless every field fits; values are never truncated.
///
/// # Errors
///
/// * `EncodeError::FieldTooLong` - a value does not fit its fixed width
/// * `EncodeError::NonAsciiField` - a text value holds non-printable characters
/// * `EncodeError::DateOutOfRange` - start year outside 1985..=2084
pub fn encode_main_header(header: &MainHeader) -> Result<Vec<u8>, EncodeError> {
    let mut buf = vec![b' '; MAIN_HEADER_SIZE];
    let mut put = |spec: &FieldSpec, value: &str| encode_text(&mut buf[spec.range()], value, spec.name);

    put(&VERSION, EDF_VERSION)?;
    put(&LOCAL_PATIENT_ID, &header.local_patient_id)?;
    put(&LOCAL_RECORDING_ID, &header.local_recording_id)?;
    put(&START_DATE, &format_date(header.start_date)?)?;
    put(&START_TIME, &format_time(header.start_time))?;
    put(&HEADER_RECORD_SIZE, &header.header_record_size().to_string())?;
    put(&NUMBER_OF_DATA_RECORDS, &header.number_of_data_records.to_string())?;
    put(
        &DURATION_OF_DATA_RECORD,
        &format_decimal(header.duration_of_data_record, DURATION_OF_DATA_RECORD.width),
    )?;
    put(&NUMBER_OF_SIGNALS, &header.number_of_signals.to_string())?;

    // 保留字段按原样写回
    buf[RESERVED.range()].copy_from_slice(&header.reserved);

    log::trace!("main header encoded: header_record_size={}", header.header_record_size());
    Ok(buf)
}
