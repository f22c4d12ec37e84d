//! Fixed-width ASCII field helpers shared by both header codecs.
//!
//! Every EDF header field is a run of printable ASCII padded on the right
//! with spaces. [`FieldSpec`] describes where a field lives; the functions
//! here turn a slot into a value and back.

use std::ops::Range;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use crate::error::{DecodeError, EncodeError};

/// Oldest year representable by the two-digit EDF date field.
pub const EDF_FIRST_YEAR: i32 = 1985;
/// Newest year representable by the two-digit EDF date field.
pub const EDF_LAST_YEAR: i32 = 2084;

/// Position and width of one header field.
///
/// For the main header `offset` is the absolute byte offset. For the signal
/// block `offset` is the field's offset inside a single 256-byte signal
/// description; multiplied by the signal count it gives the column start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
}

impl FieldSpec {
    pub const fn new(name: &'static str, offset: usize, width: usize) -> Self {
        FieldSpec { name, offset, width }
    }

    pub const fn end(&self) -> usize {
        self.offset + self.width
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// Byte range of signal `index`'s slot when `count` signals are stored
    /// column by column. `index` must be below `count`, and the block of
    /// `256 * count` bytes must exist.
    pub fn column_slot(&self, count: usize, index: usize) -> Range<usize> {
        let start = self.offset * count + index * self.width;
        start..start + self.width
    }
}

/// Printable ASCII is the only character set the EDF header allows.
pub fn is_printable_ascii(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| (0x20..=0x7e).contains(&b))
}

/// Reads a text slot, dropping trailing padding but keeping leading and
/// internal spaces.
pub fn decode_text(raw: &[u8], field: &'static str) -> Result<String, DecodeError> {
    if !is_printable_ascii(raw) {
        return Err(DecodeError::NonAsciiField(field));
    }
    let text = std::str::from_utf8(raw).map_err(|_| DecodeError::NonAsciiField(field))?;
    Ok(text.trim_end_matches(' ').to_string())
}

/// Plain EDF number: optional `-`, digits, at most one `.`, at least one
/// digit. No `+`, no exponent, no `inf`/`NaN`.
fn is_plain_number(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let mut parts = digits.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let fraction = parts.next().unwrap_or("");
    (!whole.is_empty() || !fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit())
}

/// Reads a numeric slot; padding on either side is ignored.
pub fn decode_number<T: FromStr>(raw: &[u8], field: &'static str) -> Result<T, DecodeError> {
    std::str::from_utf8(raw)
        .ok()
        .map(str::trim)
        .filter(|s| is_plain_number(s))
        .and_then(|s| s.parse::<T>().ok())
        .ok_or(DecodeError::MalformedNumericField(field))
}

/// [`decode_number`] for the decimal fields.
pub fn decode_decimal(raw: &[u8], field: &'static str) -> Result<f64, DecodeError> {
    decode_number(raw, field)
}

/// Splits `dd.mm.yy` / `hh.mm.ss` into its three two-digit groups.
fn two_digit_groups(raw: &[u8]) -> Option<[u32; 3]> {
    if raw.len() != 8 || raw[2] != b'.' || raw[5] != b'.' {
        return None;
    }
    let pair = |i: usize| -> Option<u32> {
        let (hi, lo) = (raw[i], raw[i + 1]);
        (hi.is_ascii_digit() && lo.is_ascii_digit())
            .then(|| u32::from(hi - b'0') * 10 + u32::from(lo - b'0'))
    };
    Some([pair(0)?, pair(3)?, pair(6)?])
}

/// Parses `dd.mm.yy` using the EDF clipping rule (85..=99 is 19xx).
pub fn decode_date(raw: &[u8], field: &'static str) -> Result<NaiveDate, DecodeError> {
    let [day, month, yy] = two_digit_groups(raw).ok_or(DecodeError::MalformedDateTime(field))?;
    let year = if yy >= 85 { 1900 + yy } else { 2000 + yy };
    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or(DecodeError::MalformedDateTime(field))
}

/// Parses `hh.mm.ss`.
pub fn decode_time(raw: &[u8], field: &'static str) -> Result<NaiveTime, DecodeError> {
    let [hour, minute, second] =
        two_digit_groups(raw).ok_or(DecodeError::MalformedDateTime(field))?;
    NaiveTime::from_hms_opt(hour, minute, second).ok_or(DecodeError::MalformedDateTime(field))
}

/// Checks that `value` can be stored in a text slot of `width` bytes.
pub fn check_text(value: &str, width: usize, field: &'static str) -> Result<(), EncodeError> {
    if !is_printable_ascii(value.as_bytes()) {
        return Err(EncodeError::NonAsciiField(field));
    }
    if value.len() > width {
        return Err(EncodeError::FieldTooLong(field));
    }
    Ok(())
}

/// Writes `value` left-aligned into `slot`, padding the rest with spaces.
pub fn encode_text(slot: &mut [u8], value: &str, field: &'static str) -> Result<(), EncodeError> {
    check_text(value, slot.len(), field)?;
    let bytes = value.as_bytes();
    slot[..bytes.len()].copy_from_slice(bytes);
    slot[bytes.len()..].fill(b' ');
    Ok(())
}

/// Copies `value` into a fixed array, space padded. Longer input is rejected.
pub fn padded_bytes<const N: usize>(value: &[u8], field: &'static str) -> Result<[u8; N], EncodeError> {
    if value.len() > N {
        return Err(EncodeError::FieldTooLong(field));
    }
    let mut out = [b' '; N];
    out[..value.len()].copy_from_slice(value);
    Ok(out)
}

/// Shortest decimal text that parses back to the same value. When that is
/// wider than `width`, a leading `0` before the point is dropped (`.5`).
pub fn format_decimal(value: f64, width: usize) -> String {
    let text = format!("{}", value);
    if text.len() <= width {
        return text;
    }
    if let Some(fraction) = text.strip_prefix("-0.") {
        format!("-.{}", fraction)
    } else if let Some(fraction) = text.strip_prefix("0.") {
        format!(".{}", fraction)
    } else {
        text
    }
}

pub fn check_date(date: NaiveDate) -> Result<(), EncodeError> {
    if (EDF_FIRST_YEAR..=EDF_LAST_YEAR).contains(&date.year()) {
        Ok(())
    } else {
        Err(EncodeError::DateOutOfRange(date.year()))
    }
}

/// Renders `dd.mm.yy`.
pub fn format_date(date: NaiveDate) -> Result<String, EncodeError> {
    check_date(date)?;
    Ok(format!("{:02}.{:02}.{:02}", date.day(), date.month(), date.year() % 100))
}

/// Renders `hh.mm.ss`; sub-second precision has no place in the field.
pub fn format_time(time: NaiveTime) -> String {
    format!("{:02}.{:02}.{:02}", time.hour(), time.minute(), time.second())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_keeps_leading_spaces() {
        assert_eq!(decode_text(b"  EEG Fp1       ", "label").unwrap(), "  EEG Fp1");
        assert_eq!(decode_text(b"        ", "label").unwrap(), "");
    }

    #[test]
    fn test_decode_text_rejects_control_bytes() {
        assert_eq!(
            decode_text(b"ab\0     ", "label"),
            Err(DecodeError::NonAsciiField("label"))
        );
        assert_eq!(
            decode_text(&[b'u', 0xb5, b'V', b' '], "physical_dimension"),
            Err(DecodeError::NonAsciiField("physical_dimension"))
        );
    }

    #[test]
    fn test_decode_number() {
        assert_eq!(decode_number::<i64>(b"-1      ", "n").unwrap(), -1);
        assert_eq!(decode_number::<usize>(b"  12", "n").unwrap(), 12);
        assert_eq!(decode_decimal(b"0.5     ", "d").unwrap(), 0.5);
        assert_eq!(decode_number::<i64>(b"        ", "n"), Err(DecodeError::MalformedNumericField("n")));
        assert_eq!(decode_number::<i64>(b"1 2     ", "n"), Err(DecodeError::MalformedNumericField("n")));
        assert_eq!(decode_decimal(b"NaN     ", "d"), Err(DecodeError::MalformedNumericField("d")));
        assert_eq!(decode_decimal(b"inf     ", "d"), Err(DecodeError::MalformedNumericField("d")));
    }

    #[test]
    fn test_decode_number_rejects_non_edf_forms() {
        for raw in [&b"1e-7    "[..], b"1E3     ", b"+5      ", b"-       ", b".       ", b"1.2.3   ", b"0x10    "] {
            assert_eq!(decode_decimal(raw, "d"), Err(DecodeError::MalformedNumericField("d")));
        }
        assert_eq!(decode_number::<i32>(b"+12     ", "n"), Err(DecodeError::MalformedNumericField("n")));
        assert_eq!(decode_decimal(b"-.5     ", "d").unwrap(), -0.5);
        assert_eq!(decode_decimal(b"5.      ", "d").unwrap(), 5.0);
        assert_eq!(decode_decimal(b"007     ", "d").unwrap(), 7.0);
    }

    #[test]
    fn test_decoded_decimals_fit_when_formatted() {
        for raw in [&b".0000001"[..], b"-.000001", b"-99999.9", b"00000001", b"1.000000", b"-0"] {
            let value = decode_decimal(raw, "d").unwrap();
            let text = format_decimal(value, 8);
            assert!(text.len() <= 8, "{:?} formatted as {:?}", raw, text);
            assert_eq!(decode_decimal(text.as_bytes(), "d").unwrap(), value);
        }
    }

    #[test]
    fn test_decode_date_clipping() {
        assert_eq!(decode_date(b"04.03.85", "d").unwrap(), NaiveDate::from_ymd_opt(1985, 3, 4).unwrap());
        assert_eq!(decode_date(b"31.12.84", "d").unwrap(), NaiveDate::from_ymd_opt(2084, 12, 31).unwrap());
        assert_eq!(decode_date(b"31.02.99", "d"), Err(DecodeError::MalformedDateTime("d")));
        assert_eq!(decode_date(b"1.2.2003", "d"), Err(DecodeError::MalformedDateTime("d")));
        assert_eq!(decode_date(b"01-02-03", "d"), Err(DecodeError::MalformedDateTime("d")));
    }

    #[test]
    fn test_decode_time() {
        assert_eq!(decode_time(b"23.59.07", "t").unwrap(), NaiveTime::from_hms_opt(23, 59, 7).unwrap());
        assert_eq!(decode_time(b"24.00.00", "t"), Err(DecodeError::MalformedDateTime("t")));
        assert_eq!(decode_time(b"        ", "t"), Err(DecodeError::MalformedDateTime("t")));
    }

    #[test]
    fn test_encode_text_pads_and_rejects() {
        let mut slot = [b'#'; 8];
        encode_text(&mut slot, "uV", "unit").unwrap();
        assert_eq!(&slot, b"uV      ");

        let mut slot = [b' '; 4];
        assert_eq!(encode_text(&mut slot, "12345", "n"), Err(EncodeError::FieldTooLong("n")));
        assert_eq!(&slot, b"    ");
        assert_eq!(encode_text(&mut slot, "µV", "unit"), Err(EncodeError::NonAsciiField("unit")));
    }

    #[test]
    fn test_format_values() {
        assert_eq!(format_decimal(1.0, 8), "1");
        assert_eq!(format_decimal(-200.0, 8), "-200");
        assert_eq!(format_decimal(0.5, 8), "0.5");
        assert_eq!(format_decimal(-0.000001, 8), "-.000001");
        assert_eq!(format_decimal(0.000_000_1, 8), ".0000001");
        assert_eq!(format_decimal(0.123456789, 8), ".123456789");
        let date = NaiveDate::from_ymd_opt(2002, 8, 9).unwrap();
        assert_eq!(format_date(date).unwrap(), "09.08.02");
        let old = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(format_date(old), Err(EncodeError::DateOutOfRange(1970)));
        assert_eq!(format_time(NaiveTime::from_hms_opt(7, 5, 0).unwrap()), "07.05.00");
    }

    #[test]
    fn test_column_slot() {
        let spec = FieldSpec::new("transducer_type", 16, 80);
        assert_eq!(spec.column_slot(3, 0), 48..128);
        assert_eq!(spec.column_slot(3, 2), 208..288);
    }
}
