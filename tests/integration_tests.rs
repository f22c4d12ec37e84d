use chrono::{NaiveDate, NaiveTime};
use edfheader::{
    decode_document_header, decode_document_header_bytes, decode_main_header,
    decode_signal_subheaders, encode_document_header, read_header_file, update_data_record_count,
    write_document_header, DataRecordCount, DecodeError, EdfDocumentHeader, EdfError, EdfVariant,
    EncodeError, MainHeader, SignalSubHeader,
};
use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::Path;

// 清理测试文件的辅助函数
fn cleanup_test_file(filename: &str) {
    if Path::new(filename).exists() {
        fs::remove_file(filename).ok();
    }
}

// 创建测试信号的辅助函数
fn create_test_eeg_signal(label: &str) -> SignalSubHeader {
    SignalSubHeader::builder(label)
        .transducer_type("AgAgCl electrodes")
        .physical_dimension("uV")
        .physical_range(-200.0, 200.0)
        .digital_range(-32768, 32767)
        .prefiltering("HP:0.1Hz LP:70Hz")
        .samples_per_record(256)
        .build()
        .unwrap()
}

fn create_test_ecg_signal() -> SignalSubHeader {
    SignalSubHeader::builder("ECG Lead II")
        .transducer_type("Chest electrodes")
        .physical_dimension("mV")
        .physical_range(-5.0, 5.0)
        .digital_range(-2048, 2047)
        .prefiltering("HP:0.1Hz LP:100Hz")
        .samples_per_record(128)
        .build()
        .unwrap()
}

fn create_test_main_header(records: DataRecordCount) -> MainHeader {
    MainHeader::builder()
        .local_patient_id("MC001 F 15-MAR-1985 Multi_Channel_Test")
        .local_recording_id("Startdate 07-JUN-2023 REC-42 Tech Amplifier")
        .start_date(NaiveDate::from_ymd_opt(2023, 6, 7).unwrap())
        .start_time(NaiveTime::from_hms_opt(22, 15, 30).unwrap())
        .number_of_data_records(records)
        .duration_of_data_record(1.0)
        .build()
        .unwrap()
}

/// Space-pads `value` to `width` bytes.
fn field(value: &str, width: usize) -> Vec<u8> {
    let mut bytes = value.as_bytes().to_vec();
    bytes.resize(width, b' ');
    bytes
}

fn raw_main_header(number_of_signals: usize, records: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend(field("0", 8));
    bytes.extend(field("X X X X", 80));
    bytes.extend(field("Startdate X X X X", 80));
    bytes.extend(field("01.02.03", 8));
    bytes.extend(field("04.05.06", 8));
    bytes.extend(field(&(256 + 256 * number_of_signals).to_string(), 8));
    bytes.extend(field("", 44));
    bytes.extend(field(records, 8));
    bytes.extend(field("1", 8));
    bytes.extend(field(&number_of_signals.to_string(), 4));
    assert_eq!(bytes.len(), 256);
    bytes
}

#[test]
fn test_file_write_read_cycle() {
    let filename = "test_header_cycle.edf";

    let mut header = EdfDocumentHeader::new(create_test_main_header(DataRecordCount::Unknown), Vec::new());
    for i in 0..4 {
        header.push_signal(create_test_eeg_signal(&format!("EEG C{}", i + 1)));
    }
    header.push_signal(create_test_ecg_signal());

    // 写入阶段：头部 + 10 个数据记录
    {
        let mut file = File::create(filename).unwrap();
        write_document_header(&mut file, &header).unwrap();
        let record = vec![0u8; header.data_record_size()];
        for _ in 0..10 {
            file.write_all(&record).unwrap();
        }
    }

    // 读取阶段
    {
        let decoded = read_header_file(filename).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.number_of_signals(), 5);
        assert_eq!(decoded.signals()[4].label(), "ECG Lead II");
        assert_eq!(decoded.signals()[4].physical_dimension(), "mV");
        assert_eq!(decoded.main_header().number_of_data_records(), DataRecordCount::Unknown);

        let file_len = fs::metadata(filename).unwrap().len();
        assert_eq!(decoded.infer_data_record_count(file_len), Some(10));
    }

    cleanup_test_file(filename);
}

#[test]
fn test_patch_record_count_in_file() {
    let filename = "test_header_patch.edf";
    let header = EdfDocumentHeader::new(
        create_test_main_header(DataRecordCount::Unknown),
        vec![create_test_eeg_signal("EEG Fp1")],
    );

    {
        let mut file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(filename)
            .unwrap();
        write_document_header(&mut file, &header).unwrap();
        file.write_all(&vec![0u8; header.data_record_size() * 3]).unwrap();
        update_data_record_count(&mut file, DataRecordCount::Known(3)).unwrap();
    }

    let decoded = read_header_file(filename).unwrap();
    assert_eq!(decoded.main_header().number_of_data_records(), DataRecordCount::Known(3));
    assert_eq!(
        decoded.expected_file_size(),
        Some(fs::metadata(filename).unwrap().len())
    );

    cleanup_test_file(filename);
}

#[test]
fn test_column_major_signal_block() {
    let mut block = Vec::new();
    block.extend(field("EEG Fp1", 16));
    block.extend(field("EEG Fp2", 16));
    block.extend(field("AgAgCl electrode", 80));
    block.extend(field("Ag electrode", 80));
    block.extend(field("uV", 8));
    block.extend(field("mV", 8));
    block.extend(field("-500", 8));
    block.extend(field("-2.5", 8));
    block.extend(field("500", 8));
    block.extend(field("2.5", 8));
    block.extend(field("-2048", 8));
    block.extend(field("0", 8));
    block.extend(field("2047", 8));
    block.extend(field("4095", 8));
    block.extend(field("HP:0.1Hz", 80));
    block.extend(field("LP:35Hz", 80));
    block.extend(field("100", 8));
    block.extend(field("50", 8));
    block.extend(field("", 32));
    block.extend(field("", 32));
    assert_eq!(block.len(), 512);

    let signals = decode_signal_subheaders(&block, 2).unwrap();
    assert_eq!(signals[0].label(), "EEG Fp1");
    assert_eq!(signals[1].label(), "EEG Fp2");
    assert_eq!(signals[0].transducer_type(), "AgAgCl electrode");
    assert_eq!(signals[1].transducer_type(), "Ag electrode");
    assert_eq!(signals[0].physical_dimension(), "uV");
    assert_eq!(signals[1].physical_dimension(), "mV");
    assert_eq!((signals[1].physical_minimum(), signals[1].physical_maximum()), (-2.5, 2.5));
    assert_eq!((signals[1].digital_minimum(), signals[1].digital_maximum()), (0, 4095));
    assert_eq!(signals[0].prefiltering(), "HP:0.1Hz");
    assert_eq!(signals[1].prefiltering(), "LP:35Hz");
    assert_eq!(signals[0].samples_per_record(), 100);
    assert_eq!(signals[1].samples_per_record(), 50);

    // 整个文件头：主头部之后紧跟信号块
    let mut bytes = raw_main_header(2, "10");
    bytes.extend(&block);
    let header = decode_document_header(&mut Cursor::new(bytes.clone())).unwrap();
    assert_eq!(header.signals(), &signals[..]);
    assert_eq!(encode_document_header(&header).unwrap(), bytes);
}

#[test]
fn test_unknown_record_count_sentinel() {
    let header = decode_main_header(&raw_main_header(0, "-1      ")).unwrap();
    assert_eq!(header.number_of_data_records(), DataRecordCount::Unknown);
    assert!(header.number_of_data_records().is_unknown());

    assert_eq!(
        decode_main_header(&raw_main_header(0, "minus1")),
        Err(DecodeError::MalformedNumericField("number_of_data_records"))
    );
}

#[test]
fn test_truncated_main_header() {
    let bytes = raw_main_header(0, "1");
    assert_eq!(
        decode_main_header(&bytes[..255]),
        Err(DecodeError::TruncatedInput { expected: 256, actual: 255 })
    );
    assert!(matches!(
        decode_document_header(&mut Cursor::new(bytes[..255].to_vec())),
        Err(EdfError::Decode(DecodeError::TruncatedInput { .. }))
    ));
}

#[test]
fn test_inconsistent_header_size() {
    let mut bytes = raw_main_header(2, "1");
    bytes[184..192].copy_from_slice(b"256     ");
    assert_eq!(
        decode_document_header_bytes(&bytes),
        Err(DecodeError::InconsistentHeaderSize { declared: 256, expected: 768 })
    );
}

#[test]
fn test_patient_id_too_long() {
    let long_id = "P".repeat(81);
    let result = MainHeader::builder().local_patient_id(&long_id).build();
    assert_eq!(result, Err(EncodeError::FieldTooLong("local_patient_id")));

    let mut header = create_test_main_header(DataRecordCount::Known(1));
    assert_eq!(
        header.set_local_patient_id(&long_id),
        Err(EncodeError::FieldTooLong("local_patient_id"))
    );
    assert_eq!(header.local_patient_id(), "MC001 F 15-MAR-1985 Multi_Channel_Test");
}

#[test]
fn test_non_ascii_rejected_both_ways() {
    assert_eq!(
        SignalSubHeader::builder("EEG").physical_dimension("µV").build(),
        Err(EncodeError::NonAsciiField("physical_dimension"))
    );

    let header = EdfDocumentHeader::new(
        create_test_main_header(DataRecordCount::Known(1)),
        vec![create_test_eeg_signal("EEG Fp1")],
    );
    let mut bytes = encode_document_header(&header).unwrap();
    // 第一个信号的物理单位字段
    bytes[256 + 96] = 0xb5;
    assert_eq!(
        decode_document_header_bytes(&bytes),
        Err(DecodeError::NonAsciiField("physical_dimension"))
    );
}

#[test]
fn test_edf_plus_marker_round_trip() {
    let main = MainHeader::builder()
        .reserved(b"EDF+D")
        .duration_of_data_record(0.5)
        .build()
        .unwrap();
    let header = EdfDocumentHeader::new(
        main,
        vec![
            create_test_eeg_signal("EEG Fp1"),
            SignalSubHeader::annotation(60).unwrap(),
        ],
    );

    let bytes = encode_document_header(&header).unwrap();
    assert_eq!(&bytes[192..197], b"EDF+D");

    let decoded = decode_document_header_bytes(&bytes).unwrap();
    assert_eq!(decoded.main_header().variant(), EdfVariant::EdfPlusDiscontinuous);
    assert_eq!(decoded.annotation_signal(), Some(1));
    assert_eq!(decoded.main_header().duration_of_data_record(), 0.5);
    assert_eq!(decoded.signals()[0].sample_rate(0.5), Some(512.0));
}

#[test]
fn test_signal_edit_keeps_layout_valid() {
    let mut header = EdfDocumentHeader::new(
        create_test_main_header(DataRecordCount::Known(5)),
        vec![create_test_eeg_signal("EEG Fp1"), create_test_ecg_signal()],
    );

    let signal = header.signal_mut(0).unwrap();
    signal.set_label("EEG Fp1-A1").unwrap();
    assert_eq!(signal.set_digital_range(5, 5), Err(EncodeError::InvalidScaling));
    assert_eq!(signal.digital_minimum(), -32768);

    header.remove_signal(1);
    let bytes = encode_document_header(&header).unwrap();
    assert_eq!(bytes.len(), 512);
    assert_eq!(&bytes[252..256], b"1   ");

    let decoded = decode_document_header_bytes(&bytes).unwrap();
    assert_eq!(decoded.signals()[0].label(), "EEG Fp1-A1");
}
