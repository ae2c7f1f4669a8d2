//! 관측치 및 포지션 이벤트 레코드.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{lenient_date, lenient_decimal, lenient_decimal_or_zero, Price, Quantity};

/// 날짜/카테고리별 단일 숫자 관측치 (예: 특정일의 펀드 쿼터 가격).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// 관측일
    #[serde(deserialize_with = "lenient_date::deserialize")]
    pub date: NaiveDate,

    /// 카테고리 (자산, 펀드, 티커)
    #[serde(alias = "asset", alias = "fund", alias = "ticker")]
    pub category: String,

    /// 값 (null/비유한값이면 `None`)
    #[serde(
        default,
        alias = "price",
        alias = "quota",
        deserialize_with = "lenient_decimal::deserialize"
    )]
    pub value: Option<Price>,
}

impl Observation {
    pub fn new(date: NaiveDate, category: impl Into<String>, value: Option<Price>) -> Self {
        Self {
            date,
            category: category.into(),
            value,
        }
    }
}

/// 수량 변화 이벤트 (매수는 양수, 처분은 음수).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionEvent {
    /// 이벤트 일자
    #[serde(deserialize_with = "lenient_date::deserialize")]
    pub date: NaiveDate,

    /// 카테고리 (자산, 티커)
    #[serde(alias = "asset", alias = "ticker")]
    pub category: String,

    /// 수량 변화량 (잘못된 값은 0)
    #[serde(
        default,
        alias = "quantity",
        alias = "amount",
        deserialize_with = "lenient_decimal_or_zero::deserialize"
    )]
    pub delta: Quantity,
}

impl PositionEvent {
    pub fn new(date: NaiveDate, category: impl Into<String>, delta: Decimal) -> Self {
        Self {
            date,
            category: category.into(),
            delta,
        }
    }
}
