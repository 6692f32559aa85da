//! The four ChocAn tables.
//!
//! Each descriptor is created once on first use and never mutated; only the
//! rows stored in its file change.

use std::ops::RangeInclusive;
use std::sync::LazyLock;

use crate::column_type::ColumnType;
use crate::table_info::TableInfo;
use crate::value::Value;

const USER_ID_CHARS: RangeInclusive<usize> = 9..=9;
const MEMBER_ID_CHARS: RangeInclusive<usize> = 9..=9;
const SERVICE_ID_CHARS: RangeInclusive<usize> = 6..=6;
const NAME_CHARS: RangeInclusive<usize> = 1..=25;
const ADDRESS_CHARS: RangeInclusive<usize> = 1..=25;
const CITY_CHARS: RangeInclusive<usize> = 1..=14;
const STATE_CHARS: RangeInclusive<usize> = 2..=2;
const ZIPCODE_CHARS: RangeInclusive<usize> = 5..=5;

/// Role discriminator stored in the user directory's `user_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    Provider,
    Manager,
}

impl UserRole {
    pub fn code(self) -> u32 {
        match self {
            UserRole::Provider => 0,
            UserRole::Manager => 1,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(UserRole::Provider),
            1 => Some(UserRole::Manager),
            _ => None,
        }
    }
}

impl From<UserRole> for Value {
    fn from(role: UserRole) -> Self {
        Value::Integer(role.code().into())
    }
}

/// Providers and managers.
pub static USER_INFO: LazyLock<TableInfo> = LazyLock::new(|| {
    TableInfo::builder("providers")
        .column("id", ColumnType::UInt32)
        .column("user_type", ColumnType::UInt32)
        .column("name", ColumnType::Utf8)
        .column("address", ColumnType::Utf8)
        .column("city", ColumnType::Utf8)
        .column("state", ColumnType::Utf8)
        .column("zipcode", ColumnType::UInt32)
        .column("password_hash", ColumnType::Binary)
        .character_limit("id", USER_ID_CHARS)
        .character_limit("name", NAME_CHARS)
        .character_limit("address", ADDRESS_CHARS)
        .character_limit("city", CITY_CHARS)
        .character_limit("state", STATE_CHARS)
        .character_limit("zipcode", ZIPCODE_CHARS)
        .numeric_limit("user_type", 0..=1)
        .build()
        .expect("user directory declaration is consistent")
});

/// ChocAn members.
pub static MEMBER_INFO: LazyLock<TableInfo> = LazyLock::new(|| {
    TableInfo::builder("members")
        .column("member_id", ColumnType::UInt32)
        .column("name", ColumnType::Utf8)
        .column("address", ColumnType::Utf8)
        .column("city", ColumnType::Utf8)
        .column("state", ColumnType::Utf8)
        .column("zipcode", ColumnType::UInt32)
        .column("suspended", ColumnType::Boolean)
        .character_limit("member_id", MEMBER_ID_CHARS)
        .character_limit("name", NAME_CHARS)
        .character_limit("address", ADDRESS_CHARS)
        .character_limit("city", CITY_CHARS)
        .character_limit("state", STATE_CHARS)
        .character_limit("zipcode", ZIPCODE_CHARS)
        .build()
        .expect("member directory declaration is consistent")
});

/// Services offered by ChocAn, with their codes and prices.
pub static PROVIDER_DIRECTORY_INFO: LazyLock<TableInfo> = LazyLock::new(|| {
    TableInfo::builder("provider_directory")
        .column("service_id", ColumnType::UInt32)
        .column("service_name", ColumnType::Utf8)
        .column("price_dollars", ColumnType::UInt32)
        .column("price_cents", ColumnType::UInt32)
        .character_limit("service_id", SERVICE_ID_CHARS)
        .character_limit("service_name", 1..=20)
        .numeric_limit("price_cents", 0..=99)
        .build()
        .expect("provider directory declaration is consistent")
});

/// Ledger of every billed service.
pub static SERVICE_LOG_INFO: LazyLock<TableInfo> = LazyLock::new(|| {
    TableInfo::builder("service_log")
        .column("entry_datetime_utc", ColumnType::TimestampUtc)
        .column("service_date_utc", ColumnType::Date32)
        .column("provider_id", ColumnType::UInt32)
        .column("member_id", ColumnType::UInt32)
        .column("service_id", ColumnType::UInt32)
        .nullable_column("comments", ColumnType::Utf8)
        .character_limit("provider_id", USER_ID_CHARS)
        .character_limit("member_id", MEMBER_ID_CHARS)
        .character_limit("service_id", SERVICE_ID_CHARS)
        .build()
        .expect("service log declaration is consistent")
});

pub fn all_tables() -> [&'static TableInfo; 4] {
    [
        &*USER_INFO,
        &*MEMBER_INFO,
        &*PROVIDER_DIRECTORY_INFO,
        &*SERVICE_LOG_INFO,
    ]
}

/// Look up a table descriptor by its file name.
pub fn by_name(name: &str) -> Option<&'static TableInfo> {
    all_tables().into_iter().find(|table| table.name() == name)
}
