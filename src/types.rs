use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::EncodeError;
use crate::main_header::{
    DURATION_OF_DATA_RECORD, LOCAL_PATIENT_ID, LOCAL_RECORDING_ID, NUMBER_OF_DATA_RECORDS, RESERVED,
};
use crate::signal_header::{
    DIGITAL_MAXIMUM, DIGITAL_MINIMUM, LABEL, PHYSICAL_DIMENSION, PHYSICAL_MAXIMUM,
    PHYSICAL_MINIMUM, PREFILTERING, SAMPLES_PER_RECORD, SIGNAL_RESERVED, TRANSDUCER_TYPE,
};
use crate::utils::{check_date, check_text, format_decimal, padded_bytes};
use crate::{ANNOTATION_LABEL, DIGITAL_SAMPLE_BYTES, EDF_VERSION, MAIN_HEADER_SIZE, SIGNAL_HEADER_SIZE};

/// Number of data records stored after the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRecordCount {
    Known(u64),
    /// Stored as `-1`: the count has to be derived from the file size.
    Unknown,
}

impl DataRecordCount {
    /// Interprets the signed value read from the header; `-1` is the sentinel,
    /// every other negative value is invalid.
    pub fn from_raw(value: i64) -> Option<Self> {
        match value {
            -1 => Some(DataRecordCount::Unknown),
            v if v >= 0 => Some(DataRecordCount::Known(v as u64)),
            _ => None,
        }
    }

    pub fn known(self) -> Option<u64> {
        match self {
            DataRecordCount::Known(n) => Some(n),
            DataRecordCount::Unknown => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        self == DataRecordCount::Unknown
    }
}

impl fmt::Display for DataRecordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataRecordCount::Known(n) => write!(f, "{}", n),
            DataRecordCount::Unknown => f.write_str("-1"),
        }
    }
}

/// Flavour of the file, as announced by the first bytes of the reserved field.
///
/// EDF+ writers put `EDF+C` (continuous) or `EDF+D` (discontinuous) there.
/// The codec reports the marker but decodes every file by the plain EDF
/// layout; EDF+ annotation semantics are left to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdfVariant {
    Edf,
    EdfPlusContinuous,
    EdfPlusDiscontinuous,
}

/// The fixed 256-byte record at the start of every EDF file.
#[derive(Debug, Clone, PartialEq)]
pub struct MainHeader {
    pub(crate) version: String,
    pub(crate) local_patient_id: String,
    pub(crate) local_recording_id: String,
    pub(crate) start_date: NaiveDate,
    pub(crate) start_time: NaiveTime,
    pub(crate) reserved: [u8; 44],
    pub(crate) number_of_data_records: DataRecordCount,
    pub(crate) duration_of_data_record: f64,
    pub(crate) number_of_signals: usize,
}

impl Default for MainHeader {
    /// An anonymised header: `X` placeholders, 01.01.85 00.00.00, one-second
    /// records, record count not yet known.
    fn default() -> Self {
        MainHeader {
            version: EDF_VERSION.to_string(),
            local_patient_id: "X X X X".to_string(),
            local_recording_id: "Startdate X X X X".to_string(),
            start_date: NaiveDate::from_ymd_opt(1985, 1, 1).unwrap_or_default(),
            start_time: NaiveTime::default(),
            reserved: [b' '; 44],
            number_of_data_records: DataRecordCount::Unknown,
            duration_of_data_record: 1.0,
            number_of_signals: 0,
        }
    }
}

impl MainHeader {
    pub fn builder() -> MainHeaderBuilder {
        MainHeaderBuilder::default()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn local_patient_id(&self) -> &str {
        &self.local_patient_id
    }

    pub fn local_recording_id(&self) -> &str {
        &self.local_recording_id
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn start_datetime(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.start_date, self.start_time)
    }

    /// Raw reserved bytes, exactly as read or as they will be written.
    pub fn reserved(&self) -> &[u8; 44] {
        &self.reserved
    }

    pub fn number_of_data_records(&self) -> DataRecordCount {
        self.number_of_data_records
    }

    /// Seconds covered by one data record.
    pub fn duration_of_data_record(&self) -> f64 {
        self.duration_of_data_record
    }

    pub fn number_of_signals(&self) -> usize {
        self.number_of_signals
    }

    /// Total size of the header region: 256 + 256 × number of signals.
    /// Saturates instead of overflowing; such a size never fits its field.
    pub fn header_record_size(&self) -> usize {
        self.number_of_signals
            .saturating_mul(SIGNAL_HEADER_SIZE)
            .saturating_add(MAIN_HEADER_SIZE)
    }

    pub fn variant(&self) -> EdfVariant {
        if self.reserved.starts_with(b"EDF+C") {
            EdfVariant::EdfPlusContinuous
        } else if self.reserved.starts_with(b"EDF+D") {
            EdfVariant::EdfPlusDiscontinuous
        } else {
            EdfVariant::Edf
        }
    }

    pub fn set_local_patient_id(&mut self, id: &str) -> Result<(), EncodeError> {
        check_text(id, LOCAL_PATIENT_ID.width, LOCAL_PATIENT_ID.name)?;
        self.local_patient_id = id.to_string();
        Ok(())
    }

    pub fn set_local_recording_id(&mut self, id: &str) -> Result<(), EncodeError> {
        check_text(id, LOCAL_RECORDING_ID.width, LOCAL_RECORDING_ID.name)?;
        self.local_recording_id = id.to_string();
        Ok(())
    }

    /// Only years 1985 through 2084 fit the two-digit date field.
    pub fn set_start_date(&mut self, date: NaiveDate) -> Result<(), EncodeError> {
        check_date(date)?;
        self.start_date = date;
        Ok(())
    }

    /// Sub-second precision is dropped.
    pub fn set_start_time(&mut self, time: NaiveTime) {
        self.start_time =
            NaiveTime::from_hms_opt(time.hour(), time.minute(), time.second()).unwrap_or(time);
    }

    /// Up to 44 bytes; shorter input is padded with spaces.
    pub fn set_reserved(&mut self, reserved: &[u8]) -> Result<(), EncodeError> {
        self.reserved = padded_bytes(reserved, RESERVED.name)?;
        Ok(())
    }

    pub fn set_number_of_data_records(&mut self, count: DataRecordCount) -> Result<(), EncodeError> {
        check_text(&count.to_string(), NUMBER_OF_DATA_RECORDS.width, NUMBER_OF_DATA_RECORDS.name)?;
        self.number_of_data_records = count;
        Ok(())
    }

    pub fn set_duration_of_data_record(&mut self, seconds: f64) -> Result<(), EncodeError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(EncodeError::InvalidDuration(seconds));
        }
        check_text(
            &format_decimal(seconds, DURATION_OF_DATA_RECORD.width),
            DURATION_OF_DATA_RECORD.width,
            DURATION_OF_DATA_RECORD.name,
        )?;
        self.duration_of_data_record = seconds;
        Ok(())
    }

    pub(crate) fn set_number_of_signals(&mut self, count: usize) {
        self.number_of_signals = count;
    }
}

/// Builds a [`MainHeader`], validating every field on [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct MainHeaderBuilder {
    local_patient_id: String,
    local_recording_id: String,
    start_date: NaiveDate,
    start_time: NaiveTime,
    reserved: Vec<u8>,
    number_of_data_records: DataRecordCount,
    duration_of_data_record: f64,
    number_of_signals: usize,
}

impl Default for MainHeaderBuilder {
    fn default() -> Self {
        let defaults = MainHeader::default();
        MainHeaderBuilder {
            local_patient_id: defaults.local_patient_id,
            local_recording_id: defaults.local_recording_id,
            start_date: defaults.start_date,
            start_time: defaults.start_time,
            reserved: defaults.reserved.to_vec(),
            number_of_data_records: defaults.number_of_data_records,
            duration_of_data_record: defaults.duration_of_data_record,
            number_of_signals: defaults.number_of_signals,
        }
    }
}

impl MainHeaderBuilder {
    pub fn local_patient_id(mut self, id: &str) -> Self {
        self.local_patient_id = id.to_string();
        self
    }

    pub fn local_recording_id(mut self, id: &str) -> Self {
        self.local_recording_id = id.to_string();
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    pub fn start_time(mut self, time: NaiveTime) -> Self {
        self.start_time = time;
        self
    }

    pub fn reserved(mut self, reserved: &[u8]) -> Self {
        self.reserved = reserved.to_vec();
        self
    }

    pub fn number_of_data_records(mut self, count: DataRecordCount) -> Self {
        self.number_of_data_records = count;
        self
    }

    pub fn duration_of_data_record(mut self, seconds: f64) -> Self {
        self.duration_of_data_record = seconds;
        self
    }

    /// Only meaningful when the main header is encoded on its own;
    /// [`EdfDocumentHeader::new`] overrides it with the real signal count.
    pub fn number_of_signals(mut self, count: usize) -> Self {
        self.number_of_signals = count;
        self
    }

    pub fn build(self) -> Result<MainHeader, EncodeError> {
        let mut header = MainHeader::default();
        header.set_local_patient_id(&self.local_patient_id)?;
        header.set_local_recording_id(&self.local_recording_id)?;
        header.set_start_date(self.start_date)?;
        header.set_start_time(self.start_time);
        header.set_reserved(&self.reserved)?;
        header.set_number_of_data_records(self.number_of_data_records)?;
        header.set_duration_of_data_record(self.duration_of_data_record)?;
        header.set_number_of_signals(self.number_of_signals);
        Ok(header)
    }
}

/// Description of one recorded channel.
///
/// On disk these fields are spread column-wise across the signal block;
/// here each channel gets its own record.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSubHeader {
    pub(crate) label: String,
    pub(crate) transducer_type: String,
    pub(crate) physical_dimension: String,
    pub(crate) physical_minimum: f64,
    pub(crate) physical_maximum: f64,
    pub(crate) digital_minimum: i32,
    pub(crate) digital_maximum: i32,
    pub(crate) prefiltering: String,
    pub(crate) samples_per_record: u32,
    pub(crate) reserved: [u8; 32],
}

impl Default for SignalSubHeader {
    fn default() -> Self {
        SignalSubHeader {
            label: String::new(),
            transducer_type: String::new(),
            physical_dimension: String::new(),
            physical_minimum: -1.0,
            physical_maximum: 1.0,
            digital_minimum: -32768,
            digital_maximum: 32767,
            prefiltering: String::new(),
            samples_per_record: 0,
            reserved: [b' '; 32],
        }
    }
}

impl SignalSubHeader {
    pub fn builder(label: &str) -> SignalSubHeaderBuilder {
        SignalSubHeaderBuilder::new(label)
    }

    /// An `EDF Annotations` channel carrying `samples_per_record` two-byte
    /// slots of annotation text per data record.
    pub fn annotation(samples_per_record: u32) -> Result<Self, EncodeError> {
        SignalSubHeader::builder(ANNOTATION_LABEL)
            .samples_per_record(samples_per_record)
            .build()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn transducer_type(&self) -> &str {
        &self.transducer_type
    }

    pub fn physical_dimension(&self) -> &str {
        &self.physical_dimension
    }

    pub fn physical_minimum(&self) -> f64 {
        self.physical_minimum
    }

    pub fn physical_maximum(&self) -> f64 {
        self.physical_maximum
    }

    pub fn digital_minimum(&self) -> i32 {
        self.digital_minimum
    }

    pub fn digital_maximum(&self) -> i32 {
        self.digital_maximum
    }

    pub fn prefiltering(&self) -> &str {
        &self.prefiltering
    }

    pub fn samples_per_record(&self) -> u32 {
        self.samples_per_record
    }

    pub fn reserved(&self) -> &[u8; 32] {
        &self.reserved
    }

    pub fn is_annotation(&self) -> bool {
        self.label == ANNOTATION_LABEL
    }

    /// Physical units per digital step.
    pub fn bit_value(&self) -> f64 {
        (self.physical_maximum - self.physical_minimum)
            / (self.digital_maximum as f64 - self.digital_minimum as f64)
    }

    pub fn offset(&self) -> f64 {
        self.physical_maximum / self.bit_value() - self.digital_maximum as f64
    }

    pub fn to_physical(&self, digital_value: i32) -> f64 {
        self.bit_value() * (self.offset() + digital_value as f64)
    }

    pub fn to_digital(&self, physical_value: f64) -> i32 {
        let digital = (physical_value / self.bit_value()) - self.offset();
        digital.round() as i32
    }

    /// Samples per second, given the main header's record duration.
    pub fn sample_rate(&self, duration_of_data_record: f64) -> Option<f64> {
        (duration_of_data_record > 0.0)
            .then(|| self.samples_per_record as f64 / duration_of_data_record)
    }

    pub fn set_label(&mut self, label: &str) -> Result<(), EncodeError> {
        check_text(label, LABEL.width, LABEL.name)?;
        self.label = label.to_string();
        Ok(())
    }

    pub fn set_transducer_type(&mut self, transducer: &str) -> Result<(), EncodeError> {
        check_text(transducer, TRANSDUCER_TYPE.width, TRANSDUCER_TYPE.name)?;
        self.transducer_type = transducer.to_string();
        Ok(())
    }

    pub fn set_physical_dimension(&mut self, dimension: &str) -> Result<(), EncodeError> {
        check_text(dimension, PHYSICAL_DIMENSION.width, PHYSICAL_DIMENSION.name)?;
        self.physical_dimension = dimension.to_string();
        Ok(())
    }

    pub fn set_prefiltering(&mut self, prefiltering: &str) -> Result<(), EncodeError> {
        check_text(prefiltering, PREFILTERING.width, PREFILTERING.name)?;
        self.prefiltering = prefiltering.to_string();
        Ok(())
    }

    /// The two values must differ; a reversed range (min above max) is legal
    /// and inverts the signal.
    pub fn set_physical_range(&mut self, min: f64, max: f64) -> Result<(), EncodeError> {
        if !min.is_finite() || !max.is_finite() || min == max {
            return Err(EncodeError::InvalidScaling);
        }
        check_text(&format_decimal(min, PHYSICAL_MINIMUM.width), PHYSICAL_MINIMUM.width, PHYSICAL_MINIMUM.name)?;
        check_text(&format_decimal(max, PHYSICAL_MAXIMUM.width), PHYSICAL_MAXIMUM.width, PHYSICAL_MAXIMUM.name)?;
        self.physical_minimum = min;
        self.physical_maximum = max;
        Ok(())
    }

    pub fn set_digital_range(&mut self, min: i32, max: i32) -> Result<(), EncodeError> {
        if min >= max {
            return Err(EncodeError::InvalidScaling);
        }
        check_text(&min.to_string(), DIGITAL_MINIMUM.width, DIGITAL_MINIMUM.name)?;
        check_text(&max.to_string(), DIGITAL_MAXIMUM.width, DIGITAL_MAXIMUM.name)?;
        self.digital_minimum = min;
        self.digital_maximum = max;
        Ok(())
    }

    pub fn set_samples_per_record(&mut self, samples: u32) -> Result<(), EncodeError> {
        check_text(&samples.to_string(), SAMPLES_PER_RECORD.width, SAMPLES_PER_RECORD.name)?;
        self.samples_per_record = samples;
        Ok(())
    }

    pub fn set_reserved(&mut self, reserved: &[u8]) -> Result<(), EncodeError> {
        self.reserved = padded_bytes(reserved, SIGNAL_RESERVED.name)?;
        Ok(())
    }
}

/// Builds a [`SignalSubHeader`]. Defaults: empty text fields, physical range
/// -1..1, 16-bit digital range, zero samples per record.
#[derive(Debug, Clone)]
pub struct SignalSubHeaderBuilder {
    label: String,
    transducer_type: String,
    physical_dimension: String,
    physical_range: (f64, f64),
    digital_range: (i32, i32),
    prefiltering: String,
    samples_per_record: u32,
    reserved: Vec<u8>,
}

impl SignalSubHeaderBuilder {
    pub fn new(label: &str) -> Self {
        let defaults = SignalSubHeader::default();
        SignalSubHeaderBuilder {
            label: label.to_string(),
            transducer_type: defaults.transducer_type,
            physical_dimension: defaults.physical_dimension,
            physical_range: (defaults.physical_minimum, defaults.physical_maximum),
            digital_range: (defaults.digital_minimum, defaults.digital_maximum),
            prefiltering: defaults.prefiltering,
            samples_per_record: defaults.samples_per_record,
            reserved: defaults.reserved.to_vec(),
        }
    }

    pub fn transducer_type(mut self, transducer: &str) -> Self {
        self.transducer_type = transducer.to_string();
        self
    }

    pub fn physical_dimension(mut self, dimension: &str) -> Self {
        self.physical_dimension = dimension.to_string();
        self
    }

    pub fn physical_range(mut self, min: f64, max: f64) -> Self {
        self.physical_range = (min, max);
        self
    }

    pub fn digital_range(mut self, min: i32, max: i32) -> Self {
        self.digital_range = (min, max);
        self
    }

    pub fn prefiltering(mut self, prefiltering: &str) -> Self {
        self.prefiltering = prefiltering.to_string();
        self
    }

    pub fn samples_per_record(mut self, samples: u32) -> Self {
        self.samples_per_record = samples;
        self
    }

    pub fn reserved(mut self, reserved: &[u8]) -> Self {
        self.reserved = reserved.to_vec();
        self
    }

    pub fn build(self) -> Result<SignalSubHeader, EncodeError> {
        let mut signal = SignalSubHeader::default();
        signal.set_label(&self.label)?;
        signal.set_transducer_type(&self.transducer_type)?;
        signal.set_physical_dimension(&self.physical_dimension)?;
        signal.set_physical_range(self.physical_range.0, self.physical_range.1)?;
        signal.set_digital_range(self.digital_range.0, self.digital_range.1)?;
        signal.set_prefiltering(&self.prefiltering)?;
        signal.set_samples_per_record(self.samples_per_record)?;
        signal.set_reserved(&self.reserved)?;
        Ok(signal)
    }
}

/// A complete header region: the main record plus one description per signal.
///
/// The signal count in the main header always equals `signals().len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct EdfDocumentHeader {
    main: MainHeader,
    signals: Vec<SignalSubHeader>,
}

impl EdfDocumentHeader {
    pub fn new(mut main: MainHeader, signals: Vec<SignalSubHeader>) -> Self {
        main.set_number_of_signals(signals.len());
        EdfDocumentHeader { main, signals }
    }

    pub fn main_header(&self) -> &MainHeader {
        &self.main
    }

    pub fn main_header_mut(&mut self) -> &mut MainHeader {
        &mut self.main
    }

    pub fn signals(&self) -> &[SignalSubHeader] {
        &self.signals
    }

    pub fn signal(&self, index: usize) -> Option<&SignalSubHeader> {
        self.signals.get(index)
    }

    pub fn signal_mut(&mut self, index: usize) -> Option<&mut SignalSubHeader> {
        self.signals.get_mut(index)
    }

    pub fn push_signal(&mut self, signal: SignalSubHeader) {
        self.signals.push(signal);
        self.main.set_number_of_signals(self.signals.len());
    }

    pub fn remove_signal(&mut self, index: usize) -> Option<SignalSubHeader> {
        if index >= self.signals.len() {
            return None;
        }
        let removed = self.signals.remove(index);
        self.main.set_number_of_signals(self.signals.len());
        Some(removed)
    }

    pub fn number_of_signals(&self) -> usize {
        self.signals.len()
    }

    pub fn header_record_size(&self) -> usize {
        self.main.header_record_size()
    }

    /// File offset of the first data record.
    pub fn data_offset(&self) -> u64 {
        self.header_record_size() as u64
    }

    /// Bytes in one data record: two bytes per sample across all signals.
    pub fn data_record_size(&self) -> usize {
        self.signals
            .iter()
            .map(|s| s.samples_per_record as usize * DIGITAL_SAMPLE_BYTES)
            .sum()
    }

    /// Byte offset of a signal's samples inside each data record.
    pub fn signal_offset_in_record(&self, index: usize) -> Option<usize> {
        if index >= self.signals.len() {
            return None;
        }
        Some(
            self.signals[..index]
                .iter()
                .map(|s| s.samples_per_record as usize * DIGITAL_SAMPLE_BYTES)
                .sum(),
        )
    }

    /// Index of the first `EDF Annotations` channel, if any.
    pub fn annotation_signal(&self) -> Option<usize> {
        self.signals.iter().position(SignalSubHeader::is_annotation)
    }

    /// Size the whole file should have, when the record count is known.
    pub fn expected_file_size(&self) -> Option<u64> {
        let records = self.main.number_of_data_records.known()?;
        Some(self.data_offset() + records * self.data_record_size() as u64)
    }

    /// Derives the record count from the file size, as required when the
    /// header stores `-1`. Returns `None` if the data region is not a whole
    /// number of records.
    pub fn infer_data_record_count(&self, file_len: u64) -> Option<u64> {
        let data_len = file_len.checked_sub(self.data_offset())?;
        let record_size = self.data_record_size() as u64;
        if record_size == 0 || data_len % record_size != 0 {
            return None;
        }
        Some(data_len / record_size)
    }

    pub fn into_parts(self) -> (MainHeader, Vec<SignalSubHeader>) {
        (self.main, self.signals)
    }
}
