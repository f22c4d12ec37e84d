use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{DecodeError, EdfError, Result};
use crate::main_header::decode_main_header;
use crate::signal_header::decode_signal_subheaders;
use crate::types::EdfDocumentHeader;
use crate::{MAIN_HEADER_SIZE, SIGNAL_HEADER_SIZE};

/// Reads exactly `len` bytes, reporting a short source as truncated input.
fn read_block<R: Read>(source: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len);
    source.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() < len {
        return Err(DecodeError::TruncatedInput {
            expected: len,
            actual: buf.len(),
        }
        .into());
    }
    Ok(buf)
}

/// Decodes the header region of an EDF file from a seekable byte source.
///
/// The source is rewound to offset 0, the 256-byte main header is read and
/// decoded, and then exactly `256 × number_of_signals` more bytes are read
/// for the signal block. The source is left positioned at the first data
/// record.
///
/// # Errors
///
/// * `EdfError::Io` - the source failed to seek or read
/// * `EdfError::Decode` - the header is truncated or invalid (see [`DecodeError`])
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
/// use edfheader::{decode_document_header, encode_document_header};
///
/// # let header = edfheader::doctest_utils::sample_document_header()?;
/// let bytes = encode_document_header(&header)?;
/// let mut source = Cursor::new(bytes);
///
/// let decoded = decode_document_header(&mut source)?;
/// assert_eq!(decoded, header);
/// assert_eq!(source.position(), decoded.data_offset());
/// # Ok::<(), edfheader::EdfError>(())
/// ```
pub fn decode_document_header<R: Read + Seek>(source: &mut R) -> Result<EdfDocumentHeader> {
    source.seek(SeekFrom::Start(0))?;

    let main_bytes = read_block(source, MAIN_HEADER_SIZE)?;
    let main = decode_main_header(&main_bytes)?;

    let signal_bytes = read_block(source, SIGNAL_HEADER_SIZE * main.number_of_signals())?;
    let signals = decode_signal_subheaders(&signal_bytes, main.number_of_signals())?;

    Ok(EdfDocumentHeader::new(main, signals))
}

/// Same pipeline as [`decode_document_header`] over an in-memory buffer.
///
/// Bytes beyond the header region (the data records) are ignored.
pub fn decode_document_header_bytes(bytes: &[u8]) -> std::result::Result<EdfDocumentHeader, DecodeError> {
    let main = decode_main_header(bytes)?;
    let signals = decode_signal_subheaders(&bytes[MAIN_HEADER_SIZE..], main.number_of_signals())?;
    Ok(EdfDocumentHeader::new(main, signals))
}

/// Opens an EDF file and decodes its header region.
///
/// When the header stores `-1` records, the count that the file size
/// implies is logged; use [`EdfDocumentHeader::infer_data_record_count`]
/// to obtain it.
///
/// # Errors
///
/// * `EdfError::FileNotFound` - the file does not exist or cannot be opened
/// * `EdfError::Io` - reading failed
/// * `EdfError::Decode` - the header is truncated or invalid
pub fn read_header_file<P: AsRef<Path>>(path: P) -> Result<EdfDocumentHeader> {
    let file = File::open(&path)
        .map_err(|e| EdfError::FileNotFound(format!("{}: {}", path.as_ref().display(), e)))?;
    let file_len = file.metadata()?.len();

    let mut reader = BufReader::new(file);
    let header = decode_document_header(&mut reader)?;

    if header.main_header().number_of_data_records().is_unknown() {
        match header.infer_data_record_count(file_len) {
            Some(records) => log::debug!(
                "{}: record count unknown, file size implies {} records",
                path.as_ref().display(),
                records
            ),
            None => log::debug!(
                "{}: record count unknown and {} data bytes are not a whole number of records",
                path.as_ref().display(),
                file_len.saturating_sub(header.data_offset())
            ),
        }
    }
    Ok(header)
}
