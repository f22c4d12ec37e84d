//! Signal Sub-Header Codec.
//!
//! The block after the main header holds one 256-byte description per
//! signal, but stored column by column: all labels, then all transducer
//! types, and so on. With `n` signals, field `f` of signal `i` lives at
//! `f.offset * n + i * f.width`. Decoding turns the columns back into one
//! [`SignalSubHeader`] per signal; encoding does the reverse.

use crate::error::{DecodeError, EncodeError};
use crate::types::SignalSubHeader;
use crate::utils::{
    decode_decimal, decode_number, decode_text, encode_text, format_decimal, FieldSpec,
};
use crate::SIGNAL_HEADER_SIZE;

pub const LABEL: FieldSpec = FieldSpec::new("label", 0, 16);
pub const TRANSDUCER_TYPE: FieldSpec = FieldSpec::new("transducer_type", 16, 80);
pub const PHYSICAL_DIMENSION: FieldSpec = FieldSpec::new("physical_dimension", 96, 8);
pub const PHYSICAL_MINIMUM: FieldSpec = FieldSpec::new("physical_minimum", 104, 8);
pub const PHYSICAL_MAXIMUM: FieldSpec = FieldSpec::new("physical_maximum", 112, 8);
pub const DIGITAL_MINIMUM: FieldSpec = FieldSpec::new("digital_minimum", 120, 8);
pub const DIGITAL_MAXIMUM: FieldSpec = FieldSpec::new("digital_maximum", 128, 8);
pub const PREFILTERING: FieldSpec = FieldSpec::new("prefiltering", 136, 80);
pub const SAMPLES_PER_RECORD: FieldSpec = FieldSpec::new("samples_per_record", 216, 8);
pub const SIGNAL_RESERVED: FieldSpec = FieldSpec::new("reserved", 224, 32);

/// The ten per-signal fields, in the order their columns appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalField {
    Label,
    TransducerType,
    PhysicalDimension,
    PhysicalMinimum,
    PhysicalMaximum,
    DigitalMinimum,
    DigitalMaximum,
    Prefiltering,
    SamplesPerRecord,
    Reserved,
}

impl SignalField {
    pub const ALL: [SignalField; 10] = [
        SignalField::Label,
        SignalField::TransducerType,
        SignalField::PhysicalDimension,
        SignalField::PhysicalMinimum,
        SignalField::PhysicalMaximum,
        SignalField::DigitalMinimum,
        SignalField::DigitalMaximum,
        SignalField::Prefiltering,
        SignalField::SamplesPerRecord,
        SignalField::Reserved,
    ];

    pub const fn spec(self) -> FieldSpec {
        match self {
            SignalField::Label => LABEL,
            SignalField::TransducerType => TRANSDUCER_TYPE,
            SignalField::PhysicalDimension => PHYSICAL_DIMENSION,
            SignalField::PhysicalMinimum => PHYSICAL_MINIMUM,
            SignalField::PhysicalMaximum => PHYSICAL_MAXIMUM,
            SignalField::DigitalMinimum => DIGITAL_MINIMUM,
            SignalField::DigitalMaximum => DIGITAL_MAXIMUM,
            SignalField::Prefiltering => PREFILTERING,
            SignalField::SamplesPerRecord => SAMPLES_PER_RECORD,
            SignalField::Reserved => SIGNAL_RESERVED,
        }
    }
}

fn decode_sample_count(raw: &[u8], index: usize) -> Result<u32, DecodeError> {
    decode_number::<i64>(raw, SAMPLES_PER_RECORD.name)
        .ok()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(DecodeError::InvalidSampleCount(index))
}

/// Decodes the signal block that follows the main header.
///
/// `bytes` must hold at least `256 * count` bytes; anything after that is
/// ignored. The returned vector is in channel order. A `count` whose block
/// size overflows `usize` can never be satisfied and reports truncation.
///
/// # Errors
///
/// * `DecodeError::TruncatedInput` - block shorter than `256 * count`
/// * `DecodeError::NonAsciiField` - a text slot holds non-printable bytes
/// * `DecodeError::MalformedNumericField` - a min/max slot does not parse
/// * `DecodeError::InvalidSampleCount` - samples per record is negative or not an integer
/// * `DecodeError::InvalidScaling` - digital min not below max, or physical min equals max
pub fn decode_signal_subheaders(bytes: &[u8], count: usize) -> Result<Vec<SignalSubHeader>, DecodeError> {
    let expected = count.saturating_mul(SIGNAL_HEADER_SIZE);
    if bytes.len() < expected {
        return Err(DecodeError::TruncatedInput {
            expected,
            actual: bytes.len(),
        });
    }

    let mut signals = vec![SignalSubHeader::default(); count];

    // 按字段逐列读取，每列包含所有信号
    for field in SignalField::ALL {
        let spec = field.spec();
        for (index, signal) in signals.iter_mut().enumerate() {
            let raw = &bytes[spec.column_slot(count, index)];
            match field {
                SignalField::Label => signal.label = decode_text(raw, spec.name)?,
                SignalField::TransducerType => signal.transducer_type = decode_text(raw, spec.name)?,
                SignalField::PhysicalDimension => {
                    signal.physical_dimension = decode_text(raw, spec.name)?
                }
                SignalField::PhysicalMinimum => {
                    signal.physical_minimum = decode_decimal(raw, spec.name)?
                }
                SignalField::PhysicalMaximum => {
                    signal.physical_maximum = decode_decimal(raw, spec.name)?
                }
                SignalField::DigitalMinimum => signal.digital_minimum = decode_number(raw, spec.name)?,
                SignalField::DigitalMaximum => signal.digital_maximum = decode_number(raw, spec.name)?,
                SignalField::Prefiltering => signal.prefiltering = decode_text(raw, spec.name)?,
                SignalField::SamplesPerRecord => {
                    signal.samples_per_record = decode_sample_count(raw, index)?
                }
                SignalField::Reserved => signal.reserved.copy_from_slice(raw),
            }
        }
    }

    for (index, signal) in signals.iter().enumerate() {
        if signal.digital_minimum >= signal.digital_maximum
            || signal.physical_minimum == signal.physical_maximum
        {
            return Err(DecodeError::InvalidScaling(index));
        }
    }

    log::debug!("decoded {} signal sub-headers ({} bytes)", count, expected);
    Ok(signals)
}

/// Encodes signal descriptions into the column-major block of
/// `256 * signals.len()` bytes.
///
/// # Errors
///
/// * `EncodeError::FieldTooLong` - a rendered value does not fit its slot
/// * `EncodeError::NonAsciiField` - a text value holds non-printable characters
pub fn encode_signal_subheaders(signals: &[SignalSubHeader]) -> Result<Vec<u8>, EncodeError> {
    let count = signals.len();
    let mut buf = vec![b' '; SIGNAL_HEADER_SIZE * count];

    for field in SignalField::ALL {
        let spec = field.spec();
        for (index, signal) in signals.iter().enumerate() {
            let slot = &mut buf[spec.column_slot(count, index)];
            match field {
                SignalField::Label => encode_text(slot, &signal.label, spec.name)?,
                SignalField::TransducerType => encode_text(slot, &signal.transducer_type, spec.name)?,
                SignalField::PhysicalDimension => {
                    encode_text(slot, &signal.physical_dimension, spec.name)?
                }
                SignalField::PhysicalMinimum => {
                    encode_text(slot, &format_decimal(signal.physical_minimum, spec.width), spec.name)?
                }
                SignalField::PhysicalMaximum => {
                    encode_text(slot, &format_decimal(signal.physical_maximum, spec.width), spec.name)?
                }
                SignalField::DigitalMinimum => {
                    encode_text(slot, &signal.digital_minimum.to_string(), spec.name)?
                }
                SignalField::DigitalMaximum => {
                    encode_text(slot, &signal.digital_maximum.to_string(), spec.name)?
                }
                SignalField::Prefiltering => encode_text(slot, &signal.prefiltering, spec.name)?,
                SignalField::SamplesPerRecord => {
                    encode_text(slot, &signal.samples_per_record.to_string(), spec.name)?
                }
                SignalField::Reserved => slot.copy_from_slice(&signal.reserved),
            }
        }
    }

    log::trace!("encoded {} signal sub-headers", count);
    Ok(buf)
}
