//! 재무 지표 시계열 레코드.
//!
//! 백엔드는 지표별로 `{series_code, values: [{date_reference, value}]}` 형태의
//! 중첩 객체를 내려줍니다. 분석 크레이트가 이를 평탄화/재그룹합니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FundviewError;
use crate::types::{lenient_date, lenient_decimal, Price};

/// 평탄화된 레코드의 출처 구분.
///
/// 서로 다른 엔드포인트가 같은 series code를 사용할 수 있어 구분용으로 붙입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Financials,
    Growth,
    Metrics,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Financials => "financials",
            DataType::Growth => "growth",
            DataType::Metrics => "metrics",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DataType {
    type Err = FundviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "financials" => Ok(DataType::Financials),
            "growth" => Ok(DataType::Growth),
            "metrics" => Ok(DataType::Metrics),
            other => Err(FundviewError::InvalidInput(format!(
                "Unknown data type: {}. Use: financials, growth, metrics",
                other
            ))),
        }
    }
}

/// 시계열의 단일 값.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesValue {
    /// 기준일
    #[serde(alias = "date", deserialize_with = "lenient_date::deserialize")]
    pub date_reference: NaiveDate,

    /// 값
    #[serde(default, deserialize_with = "lenient_decimal::deserialize")]
    pub value: Option<Price>,
}

/// API가 내려주는 중첩 시계열 항목.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesItem {
    #[serde(default)]
    pub series_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub series_type: Option<String>,
    #[serde(default)]
    pub values: Vec<SeriesValue>,
}

/// 평탄화된 시계열 레코드 (항목 × 값 한 쌍당 하나).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    #[serde(default)]
    pub series_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub series_type: Option<String>,
    #[serde(deserialize_with = "lenient_date::deserialize")]
    pub date_reference: NaiveDate,
    #[serde(default, deserialize_with = "lenient_decimal::deserialize")]
    pub value: Option<Price>,
    /// 호출자가 붙인 출처 태그
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
}

impl FlatRecord {
    /// 유효한(비어 있지 않은) series code를 반환합니다.
    pub fn code(&self) -> Option<&str> {
        self.series_code.as_deref().filter(|c| !c.is_empty())
    }

    /// 설명 필드(설명, 단위, 종류, 출처)가 다른 레코드와 같은지 확인합니다.
    pub fn same_metadata(&self, other: &SeriesMetadata) -> bool {
        self.description == other.description
            && self.unit == other.unit
            && self.series_type == other.series_type
            && self.data_type == other.data_type
    }
}

/// 그룹의 설명 메타데이터.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    pub description: Option<String>,
    pub unit: Option<String>,
    pub series_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
}

impl From<&FlatRecord> for SeriesMetadata {
    fn from(record: &FlatRecord) -> Self {
        Self {
            description: record.description.clone(),
            unit: record.unit.clone(),
            series_type: record.series_type.clone(),
            data_type: record.data_type,
        }
    }
}

/// 그룹 내 (날짜, 값) 한 쌍.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<Price>,
}

/// series code별로 재그룹된 시계열.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedSeries {
    pub series_code: String,
    #[serde(flatten)]
    pub metadata: SeriesMetadata,
    pub values: Vec<SeriesPoint>,
}

impl GroupedSeries {
    /// 가장 최근 날짜의 값 (값이 없으면 `None`).
    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.values.iter().max_by_key(|p| p.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_data_type_parse_and_display() {
        assert_eq!("Growth".parse::<DataType>().unwrap(), DataType::Growth);
        assert_eq!(DataType::Metrics.to_string(), "metrics");
        assert!("balance".parse::<DataType>().is_err());
    }

    #[test]
    fn test_time_series_item_from_payload() {
        let item: TimeSeriesItem = serde_json::from_value(json!({
            "series_code": "IS_NET_REVENUES",
            "description": "Net revenues",
            "unit": "BRL mn",
            "values": [
                {"date_reference": "2023-12-31", "value": 1520.5},
                {"date": "2022-12-31", "value": null}
            ]
        }))
        .unwrap();

        assert_eq!(item.series_type, None);
        assert_eq!(item.values.len(), 2);
        assert_eq!(item.values[0].value, Some(dec!(1520.5)));
        assert_eq!(item.values[1].value, None);
    }

    #[test]
    fn test_empty_code_is_not_a_code() {
        let record = FlatRecord {
            series_code: Some(String::new()),
            description: None,
            unit: None,
            series_type: None,
            date_reference: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            value: None,
            data_type: None,
        };
        assert_eq!(record.code(), None);
    }
}
