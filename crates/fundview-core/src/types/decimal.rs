//! 안전한 숫자 변환 유틸리티.
//!
//! API 페이로드의 숫자 필드는 느슨하게 타입이 지정되어 있습니다. 숫자, 숫자
//! 문자열, null, "NaN" 등이 섞여 들어오므로 예외를 던지는 대신 `None` 또는
//! 지정된 대체값으로 변환합니다.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 가격/호가(쿼터) 값 타입.
pub type Price = Decimal;

/// 수량 변화량 타입.
pub type Quantity = Decimal;

/// 퍼센트 타입 (100 = 100%).
pub type Percentage = Decimal;

/// 유한한 `f64`만 `Decimal`로 변환합니다.
///
/// `NaN`, `±Infinity`는 `None`입니다.
pub fn finite_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
}

/// JSON 값을 `Decimal`로 변환합니다.
///
/// - 숫자: 정수는 그대로, 실수는 유한할 때만
/// - 문자열: 앞뒤 공백 제거 후 파싱, 소수점 쉼표("1,5")도 허용
/// - 그 외(null, bool, 배열, 객체): `None`
pub fn safe_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(finite_decimal)
            }
        }
        Value::String(s) => parse_decimal_str(s),
        _ => None,
    }
}

/// 변환 실패 시 `fallback`을 반환합니다.
pub fn safe_decimal_or(value: &Value, fallback: Decimal) -> Decimal {
    safe_decimal(value).unwrap_or(fallback)
}

/// 숫자 문자열을 파싱합니다.
fn parse_decimal_str(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(d) = Decimal::from_str(trimmed) {
        return Some(d);
    }

    // "1,5" 형태 (쉼표가 하나이고 점이 없을 때만)
    if trimmed.matches(',').count() == 1 && !trimmed.contains('.') {
        if let Ok(d) = Decimal::from_str(&trimmed.replace(',', ".")) {
            return Some(d);
        }
    }

    // "1e-3" 같은 지수 표기
    if let Ok(d) = Decimal::from_scientific(trimmed) {
        return Some(d);
    }

    // "NaN", "Infinity"는 f64로는 파싱되지만 finite_decimal에서 걸러집니다.
    trimmed.parse::<f64>().ok().and_then(finite_decimal)
}

/// 관대한 `Option<Decimal>` 역직렬화.
///
/// `#[serde(default, deserialize_with = "lenient_decimal::deserialize")]`로 사용합니다.
pub mod lenient_decimal {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(safe_decimal(&value))
    }
}

/// 실패 시 0으로 대체하는 `Decimal` 역직렬화.
pub mod lenient_decimal_or_zero {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(safe_decimal_or(&value, Decimal::ZERO))
    }
}

/// Decimal 표시용 확장 트레이트.
pub trait DecimalExt {
    /// 퍼센트 문자열로 변환합니다 (값이 이미 퍼센트 단위, 예: 5.25 → "5.25%").
    fn to_percentage_string(&self) -> String;

    /// 표시용 반올림 (중간값은 0에서 먼 쪽으로).
    fn round_display(&self, dp: u32) -> Decimal;
}

impl DecimalExt for Decimal {
    fn to_percentage_string(&self) -> String {
        format!("{:.2}%", self.round_display(2))
    }

    fn round_display(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
    }
}
