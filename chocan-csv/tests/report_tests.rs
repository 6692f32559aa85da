use std::fs;
use std::sync::Arc;

use arrow::array::{ArrayRef, BinaryArray, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use chocan_csv::{ReportTimezone, ReportWriter};
use chocan_parquet_store::{RecordStore, StoreConfig};
use chocan_result::Error;
use chocan_schema::{Row, SERVICE_LOG_INFO, Value};
use chocan_test_utils::{TestDirs, init_tracing_for_tests};
use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

fn config(dirs: &TestDirs) -> StoreConfig {
    StoreConfig::new(dirs.storage_dir(), dirs.report_dir())
}

fn utc_writer(dirs: &TestDirs) -> ReportWriter {
    let utc = FixedOffset::east_opt(0).unwrap();
    ReportWriter::new(config(dirs)).with_timezone(ReportTimezone::Fixed(utc))
}

#[test]
fn service_log_report_formats_dates_and_times() {
    init_tracing_for_tests();
    let dirs = TestDirs::new().unwrap();
    let store = RecordStore::new(config(&dirs));

    let entry = Row::new()
        .with(
            "entry_datetime_utc",
            Utc.with_ymd_and_hms(2024, 3, 9, 17, 45, 12).unwrap(),
        )
        .with("service_date_utc", NaiveDate::from_ymd_opt(2024, 3, 8).unwrap())
        .with("provider_id", 111111111u32)
        .with("member_id", 222222222u32)
        .with("service_id", 598470u32)
        .with("comments", Value::Null);
    store.append_rows(&SERVICE_LOG_INFO, &[entry]).unwrap();
    let batch = store.load_all(&SERVICE_LOG_INFO).unwrap();

    let path = utc_writer(&dirs).save(&batch, "services").unwrap();
    assert_eq!(path, dirs.report_dir().join("services.csv"));

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "entry_datetime_utc,service_date_utc,provider_id,member_id,service_id,comments",
            "03-09-2024 17:45,03-08-2024,111111111,222222222,598470,",
        ]
    );
}

#[test]
fn report_timezone_shifts_timestamps() {
    let dirs = TestDirs::new().unwrap();
    let batch = SERVICE_LOG_INFO
        .batch_from_rows(&[Row::new()
            .with(
                "entry_datetime_utc",
                Utc.with_ymd_and_hms(2024, 1, 1, 2, 30, 0).unwrap(),
            )
            .with("service_date_utc", NaiveDate::from_ymd_opt(2023, 12, 31).unwrap())
            .with("provider_id", 111111111u32)
            .with("member_id", 222222222u32)
            .with("service_id", 598470u32)
            .with("comments", "late night")])
        .unwrap();

    let pst = FixedOffset::west_opt(8 * 3600).unwrap();
    let path = ReportWriter::new(config(&dirs))
        .with_timezone(ReportTimezone::Fixed(pst))
        .save(&batch, "shifted")
        .unwrap();

    let text = fs::read_to_string(path).unwrap();
    assert!(
        text.contains("12-31-2023 18:30,12-31-2023,111111111,222222222,598470,late night"),
        "unexpected report: {text}"
    );
}

#[test]
fn binary_columns_are_written_as_hex() {
    let dirs = TestDirs::new().unwrap();
    let batch = RecordBatch::try_from_iter(vec![
        ("id", Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef),
        (
            "hash",
            Arc::new(BinaryArray::from(vec![&[0xde_u8, 0xad][..], &[0x00, 0x0f][..]])) as ArrayRef,
        ),
        ("name", Arc::new(StringArray::from(vec!["a", "b"])) as ArrayRef),
    ])
    .unwrap();

    let path = utc_writer(&dirs).save(&batch, "hashes").unwrap();
    let text = fs::read_to_string(path).unwrap();
    assert_eq!(text, "id,hash,name\n1,dead,a\n2,000f,b\n");
}

#[test]
fn saving_overwrites_previous_report() {
    let dirs = TestDirs::new().unwrap();
    let writer = utc_writer(&dirs);
    let first = RecordBatch::try_from_iter(vec![(
        "n",
        Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef,
    )])
    .unwrap();
    let second = RecordBatch::try_from_iter(vec![(
        "n",
        Arc::new(Int64Array::from(vec![9])) as ArrayRef,
    )])
    .unwrap();

    writer.save(&first, "counts").unwrap();
    let path = writer.save(&second, "counts").unwrap();
    assert_eq!(fs::read_to_string(path).unwrap(), "n\n9\n");
}

#[test]
fn missing_report_dir_is_a_storage_error() {
    let dirs = TestDirs::new().unwrap();
    let writer =
        ReportWriter::new(config(&dirs).with_report_dir(dirs.root().join("no/such/dir")));
    let batch = RecordBatch::try_from_iter(vec![(
        "n",
        Arc::new(Int64Array::from(vec![1])) as ArrayRef,
    )])
    .unwrap();

    let err = writer.save(&batch, "lost").unwrap_err();
    assert!(matches!(err, Error::StorageIo { .. }), "got {err:?}");
}
