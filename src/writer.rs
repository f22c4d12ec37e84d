use std::io::{Seek, SeekFrom, Write};

use crate::error::{EncodeError, Result};
use crate::main_header::{encode_main_header, NUMBER_OF_DATA_RECORDS};
use crate::signal_header::encode_signal_subheaders;
use crate::types::{DataRecordCount, EdfDocumentHeader};
use crate::utils::encode_text;

/// Encodes a complete header region: the main header followed directly by
/// the column-major signal block.
///
/// The result is exactly `header.header_record_size()` bytes. If any field
/// fails to encode, no bytes are produced.
///
/// # Errors
///
/// * `EncodeError::FieldTooLong` - a value does not fit its fixed width
/// * `EncodeError::NonAsciiField` - a text value holds non-printable characters
/// * `EncodeError::DateOutOfRange` - start year outside 1985..=2084
///
/// # Examples
///
/// ```rust
/// use edfheader::{encode_document_header, EdfDocumentHeader, MainHeader, SignalSubHeader};
///
/// let signal = SignalSubHeader::builder("EEG Fpz-Cz")
///     .physical_dimension("uV")
///     .physical_range(-500.0, 500.0)
///     .digital_range(-2048, 2047)
///     .samples_per_record(100)
///     .build()?;
/// let header = EdfDocumentHeader::new(MainHeader::builder().build()?, vec![signal]);
///
/// let bytes = encode_document_header(&header)?;
/// assert_eq!(bytes.len(), 512);
/// assert_eq!(&bytes[256..272], b"EEG Fpz-Cz      ");
/// # Ok::<(), edfheader::EncodeError>(())
/// ```
pub fn encode_document_header(header: &EdfDocumentHeader) -> std::result::Result<Vec<u8>, EncodeError> {
    let mut bytes = encode_main_header(header.main_header())?;
    bytes.extend(encode_signal_subheaders(header.signals())?);

    log::debug!(
        "encoded header region: {} bytes, {} signals",
        bytes.len(),
        header.number_of_signals()
    );
    Ok(bytes)
}

/// Encodes the header and writes it to `sink`.
///
/// Encoding finishes before the first byte is written, so an invalid header
/// leaves the sink untouched.
pub fn write_document_header<W: Write>(sink: &mut W, header: &EdfDocumentHeader) -> Result<()> {
    let bytes = encode_document_header(header)?;
    sink.write_all(&bytes)?;
    Ok(())
}

/// Rewrites the record count of a header already written at offset 0 of
/// `sink`, then returns to the previous position. The position is restored
/// even when the write fails; the write error is the one reported.
///
/// A streaming writer starts with [`DataRecordCount::Unknown`] and patches
/// the real count once the last data record is out.
pub fn update_data_record_count<W: Write + Seek>(sink: &mut W, count: DataRecordCount) -> Result<()> {
    let mut field = [b' '; 8];
    encode_text(&mut field, &count.to_string(), NUMBER_OF_DATA_RECORDS.name)?;

    let position = sink.stream_position()?;
    let patched = sink
        .seek(SeekFrom::Start(NUMBER_OF_DATA_RECORDS.offset as u64))
        .and_then(|_| sink.write_all(&field));
    let restored = sink.seek(SeekFrom::Start(position));
    patched?;
    restored?;

    log::debug!("patched number_of_data_records to {}", count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctest_utils::sample_document_header;
    use crate::error::EdfError;
    use crate::reader::decode_document_header;
    use crate::types::{MainHeader, SignalSubHeader};
    use std::io::{self, Cursor};

    /// Seekable sink whose writes always fail.
    struct ReadOnlySink(Cursor<Vec<u8>>);

    impl Write for ReadOnlySink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for ReadOnlySink {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.0.seek(pos)
        }
    }

    #[test]
    fn test_encoded_size_matches_header_record_size() {
        let header = sample_document_header().unwrap();
        let bytes = encode_document_header(&header).unwrap();
        assert_eq!(bytes.len(), header.header_record_size());
        assert_eq!(&bytes[184..192], format!("{:<8}", bytes.len()).as_bytes());
    }

    #[test]
    fn test_write_leaves_sink_untouched_on_error() {
        let mut signal = SignalSubHeader::default();
        signal.prefiltering = "x".repeat(81);
        let header = EdfDocumentHeader::new(MainHeader::default(), vec![signal]);

        let mut sink = Vec::new();
        match write_document_header(&mut sink, &header) {
            Err(EdfError::Encode(EncodeError::FieldTooLong(field))) => assert_eq!(field, "prefiltering"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn test_update_data_record_count() {
        let header = sample_document_header().unwrap();
        let mut sink = Cursor::new(Vec::new());
        write_document_header(&mut sink, &header).unwrap();
        sink.write_all(&[0u8; 16]).unwrap();
        let end = sink.position();

        update_data_record_count(&mut sink, DataRecordCount::Known(1234)).unwrap();
        assert_eq!(sink.position(), end);
        assert_eq!(&sink.get_ref()[236..244], b"1234    ");

        let decoded = decode_document_header(&mut sink).unwrap();
        assert_eq!(decoded.main_header().number_of_data_records(), DataRecordCount::Known(1234));
    }

    #[test]
    fn test_update_restores_position_when_write_fails() {
        let mut sink = ReadOnlySink(Cursor::new(vec![b' '; 512]));
        sink.seek(SeekFrom::Start(300)).unwrap();

        match update_data_record_count(&mut sink, DataRecordCount::Known(7)) {
            Err(EdfError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(sink.0.position(), 300);
        assert_eq!(&sink.0.get_ref()[236..244], b"        ");
    }

    #[test]
    fn test_update_rejects_oversized_count() {
        let mut sink = Cursor::new(vec![b' '; 256]);
        assert!(matches!(
            update_data_record_count(&mut sink, DataRecordCount::Known(1_000_000_000)),
            Err(EdfError::Encode(EncodeError::FieldTooLong("number_of_data_records")))
        ));
        assert_eq!(sink.get_ref(), &vec![b' '; 256]);
    }
}
