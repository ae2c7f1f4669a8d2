//! 날짜 파싱 유틸리티.
//!
//! 백엔드는 같은 날짜를 여러 형식으로 내려줍니다 (`2024-01-31`,
//! `2024-01-31T00:00:00`, RFC 3339, `31/01/2024`). 모든 변환은 날짜 부분만
//! 사용합니다.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::error::{FundviewError, FundviewResult};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// 문자열을 날짜로 파싱합니다.
pub fn parse_date(raw: &str) -> FundviewResult<NaiveDate> {
    let trimmed = raw.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt.date());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }

    Err(FundviewError::InvalidInput(format!(
        "Unrecognized date: {:?}",
        raw
    )))
}

/// `#[serde(deserialize_with = "lenient_date::deserialize")]`용 역직렬화.
pub mod lenient_date {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map_err(serde::de::Error::custom)
    }
}
