//! Validation behavior of `TableInfo` and the ChocAn table constants.

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray, UInt32Array};
use arrow::record_batch::RecordBatch;
use chocan_result::Error;
use chocan_schema::tables::{all_tables, by_name};
use chocan_schema::{
    ColumnType, MEMBER_INFO, PROVIDER_DIRECTORY_INFO, Row, SERVICE_LOG_INFO, TableInfo, USER_INFO,
    UserRole, Value,
};
use chrono::NaiveDate;

fn number_text_table() -> TableInfo {
    TableInfo::builder("test")
        .column("number", ColumnType::UInt32)
        .column("text", ColumnType::Utf8)
        .character_limit("number", 3..=5)
        .character_limit("text", 3..=10)
        .numeric_limit("number", 200..=50000)
        .build()
        .expect("valid table")
}

#[test]
fn builder_records_name_and_columns() {
    let table = number_text_table();
    assert_eq!(table.name(), "test");
    assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["number", "text"]);
    assert_eq!(table.index_column(), "number");
    assert_eq!(table.arrow_schema().fields().len(), 2);
}

#[test]
fn limits_on_missing_columns_fail_at_construction() {
    let err = TableInfo::builder("test")
        .column("number", ColumnType::UInt32)
        .character_limit("missing column", 1..=1)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::UnknownColumn { ref column, .. } if column == "missing column"));

    let err = TableInfo::builder("test")
        .column("number", ColumnType::UInt32)
        .numeric_limit("missing column", 1..=1)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::UnknownColumn { .. }));
}

#[test]
fn degenerate_declarations_are_rejected() {
    assert!(matches!(
        TableInfo::builder("empty").build(),
        Err(Error::InvalidArgumentError(_))
    ));
    assert!(matches!(
        TableInfo::builder("twice")
            .column("a", ColumnType::Int64)
            .column("a", ColumnType::Utf8)
            .build(),
        Err(Error::InvalidArgumentError(_))
    ));
}

#[test]
fn includes_columns_is_a_subset_check() {
    let table = number_text_table();
    assert!(table.includes_columns(&["number", "text"]));
    assert!(table.includes_columns(&["number"]));
    assert!(table.includes_columns(&[]));
    assert!(!table.includes_columns(&["missing_column"]));
}

#[test]
fn check_columns_requires_exact_set() {
    let table = number_text_table();
    table.check_columns(["text", "number"]).expect("same set, other order");

    for columns in [
        vec!["number"],
        vec!["number", "text", "extra_column"],
        vec!["incorrect_column"],
        vec!["number", "number"],
    ] {
        let err = table.check_columns(columns.clone()).unwrap_err();
        assert!(
            matches!(err, Error::ColumnMismatch { .. }),
            "{columns:?} gave {err:?}"
        );
    }
}

#[test]
fn check_row_accepts_valid_row() {
    let table = number_text_table();
    table
        .check_row(&Row::new().with("number", 200).with("text", "abc"))
        .expect("valid row");
}

fn kind(err: &Error) -> &'static str {
    match err {
        Error::RangeError { .. } => "range",
        Error::ColumnMismatch { .. } => "columns",
        Error::TypeMismatch { .. } => "type",
        Error::UnknownColumn { .. } => "unknown",
        _ => "other",
    }
}

#[test]
fn check_row_failure_kinds() {
    let table = number_text_table();
    let cases = vec![
        // Out of numeric range
        (Row::new().with("number", 199).with("text", "abc"), "range"),
        // Out of character range
        (Row::new().with("number", 200).with("text", "12"), "range"),
        // Column mismatch
        (Row::new().with("digits", 200).with("text", "123"), "columns"),
        // Wrong type
        (
            Row::new().with("number", "two hundred").with("text", "123"),
            "type",
        ),
        // Missing column
        (Row::new().with("number", 200), "columns"),
    ];

    for (row, expected) in cases {
        let err = table.check_row(&row).unwrap_err();
        assert_eq!(kind(&err), expected, "{row:?} gave {err:?}");
    }
}

#[test]
fn character_limits_are_inclusive_on_both_ends() {
    let table = number_text_table();
    table.check_field(&Value::from("abc"), "text").unwrap();
    table.check_field(&Value::from("abcdefghij"), "text").unwrap();

    for rejected in ["ab", "abcdefghijk"] {
        let err = table.check_field(&Value::from(rejected), "text").unwrap_err();
        assert!(matches!(err, Error::RangeError { .. }), "{rejected}");
    }
}

#[test]
fn numeric_limits_are_inclusive_on_both_ends() {
    let table = number_text_table();
    table.check_field(&Value::from(200), "number").unwrap();
    table.check_field(&Value::from(50000), "number").unwrap();
    assert!(matches!(
        table.check_field(&Value::from(50001), "number"),
        Err(Error::RangeError { .. })
    ));
}

#[test]
fn character_and_numeric_limits_fire_independently() {
    let table = number_text_table();
    // Within the numeric range but six characters long.
    let err = table.check_field(&Value::from(100000), "number").unwrap_err();
    assert!(matches!(err, Error::RangeError { ref limit, .. } if limit.starts_with("character")));
    // Three characters long but below the numeric floor.
    let err = table.check_field(&Value::from(100), "number").unwrap_err();
    assert!(matches!(err, Error::RangeError { ref limit, .. } if limit.starts_with("numeric")));
}

#[test]
fn character_limits_on_float_columns_measure_decimal_form() {
    let table = TableInfo::builder("prices")
        .column("ID", ColumnType::Int64)
        .column("amount", ColumnType::Float64)
        .character_limit("amount", 3..=4)
        .build()
        .unwrap();

    // "2.0", "1.25" and "10.5" are within four characters.
    for accepted in [Value::from(2.0), Value::from(1.25), Value::from(10.5)] {
        table.check_field(&accepted, "amount").unwrap();
    }
    // "12.125" is too long, and small magnitudes are written out in full ("0.0000001").
    for rejected in [Value::from(12.125), Value::from(1e-7)] {
        let err = table.check_field(&rejected, "amount").unwrap_err();
        assert!(matches!(err, Error::RangeError { .. }), "{rejected}");
    }
}

#[test]
fn check_field_unknown_column() {
    let table = number_text_table();
    let err = table.check_field(&Value::from(1), "nope").unwrap_err();
    assert!(matches!(err, Error::UnknownColumn { ref table, .. } if table == "test"));
}

#[test]
fn nulls_only_fit_nullable_columns() {
    SERVICE_LOG_INFO
        .check_field(&Value::Null, "comments")
        .expect("comments are optional");
    let err = SERVICE_LOG_INFO
        .check_field(&Value::Null, "member_id")
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn check_table_validates_every_row() {
    let table = number_text_table();
    let good = RecordBatch::try_from_iter(vec![
        ("number", Arc::new(UInt32Array::from(vec![200, 300])) as ArrayRef),
        ("text", Arc::new(StringArray::from(vec!["abc", "defg"])) as ArrayRef),
    ])
    .unwrap();
    table.check_table(&good).unwrap();

    let bad = RecordBatch::try_from_iter(vec![
        ("number", Arc::new(UInt32Array::from(vec![200, 300])) as ArrayRef),
        ("text", Arc::new(StringArray::from(vec!["abc", "de"])) as ArrayRef),
    ])
    .unwrap();
    assert!(matches!(
        table.check_table(&bad),
        Err(Error::RangeError { .. })
    ));
}

#[test]
fn chocan_tables_are_registered_by_name() {
    for table in all_tables() {
        let found = by_name(table.name()).expect("registered");
        assert_eq!(found.name(), table.name());
    }
    assert!(by_name("nonexistent").is_none());
}

#[test]
fn member_rows_follow_directory_rules() {
    let member = Row::new()
        .with("member_id", 123456789u32)
        .with("name", "Ada Lovelace")
        .with("address", "12 Analytical Way")
        .with("city", "Portland")
        .with("state", "OR")
        .with("zipcode", 97201u32)
        .with("suspended", false);
    MEMBER_INFO.check_row(&member).unwrap();

    let short_id = member.clone().with("member_id", 12345u32);
    assert!(matches!(
        MEMBER_INFO.check_row(&short_id),
        Err(Error::RangeError { .. })
    ));

    let long_state = member.with("state", "ORE");
    assert!(matches!(
        MEMBER_INFO.check_row(&long_state),
        Err(Error::RangeError { .. })
    ));
}

#[test]
fn service_prices_cap_cents() {
    PROVIDER_DIRECTORY_INFO
        .check_field(&Value::from(99u32), "price_cents")
        .unwrap();
    PROVIDER_DIRECTORY_INFO
        .check_field(&Value::from(0u32), "price_cents")
        .unwrap();
    assert!(matches!(
        PROVIDER_DIRECTORY_INFO.check_field(&Value::from(100u32), "price_cents"),
        Err(Error::RangeError { .. })
    ));
}

#[test]
fn user_rows_carry_role_and_hash() {
    let user = Row::new()
        .with("id", 987654321u32)
        .with("user_type", UserRole::Manager)
        .with("name", "Grace Hopper")
        .with("address", "1 Compiler Ct")
        .with("city", "Arlington")
        .with("state", "VA")
        .with("zipcode", 22201u32)
        .with("password_hash", vec![0x24u8, 0x32, 0x62]);
    USER_INFO.check_row(&user).unwrap();
    assert_eq!(UserRole::from_code(1), Some(UserRole::Manager));
    assert_eq!(UserRole::from_code(7), None);

    let bad_role = user.with("user_type", 2u32);
    assert!(matches!(
        USER_INFO.check_row(&bad_role),
        Err(Error::RangeError { .. })
    ));
}

#[test]
fn service_log_types_reject_swapped_dates() {
    let day = NaiveDate::from_ymd_opt(2023, 11, 5).unwrap();
    let err = SERVICE_LOG_INFO
        .check_field(&Value::from(day), "entry_datetime_utc")
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
    SERVICE_LOG_INFO
        .check_field(&Value::from(day), "service_date_utc")
        .unwrap();
}
