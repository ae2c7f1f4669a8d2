//! API 페이로드 로딩.
//!
//! 응답은 최상위 배열이거나 `{"data": [...]}` 형태의 객체입니다. 잘못된
//! 레코드는 경고 로그를 남기고 건너뛰며, 로딩 전체를 실패시키지 않습니다.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{FundviewError, FundviewResult};

/// 레코드 배열을 감싸는 것으로 알려진 키.
const WRAPPER_KEYS: [&str; 3] = ["data", "results", "items"];

/// 파싱 결과와 건너뛴 레코드 수.
#[derive(Debug, Clone)]
pub struct ParsedRecords<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

/// JSON 파일을 읽습니다.
pub fn read_payload<P: AsRef<Path>>(path: P) -> FundviewResult<Value> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)?;
    debug!(path = %path.display(), bytes = raw.len(), "Payload loaded");
    Ok(value)
}

/// 페이로드에서 레코드 배열을 찾습니다.
///
/// 배열도 알려진 래퍼 객체도 아니면 빈 슬라이스를 반환합니다.
pub fn record_array(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(items) => items,
        Value::Object(map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// 레코드를 하나씩 역직렬화하고 실패한 레코드는 건너뜁니다.
pub fn parse_records<T: DeserializeOwned>(payload: &Value) -> ParsedRecords<T> {
    let items = record_array(payload);
    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for (index, item) in items.iter().enumerate() {
        match T::deserialize(item) {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped += 1;
                warn!(index, error = %err, "Skipping malformed record");
            }
        }
    }

    debug!(parsed = records.len(), skipped, "Records parsed");
    ParsedRecords { records, skipped }
}

/// 단일 객체 페이로드를 엄격하게 역직렬화합니다 (설정 성격의 페이로드용).
pub fn parse_object<T: DeserializeOwned>(payload: &Value) -> FundviewResult<T> {
    if !payload.is_object() {
        return Err(FundviewError::Data(
            "expected a JSON object payload".to_string(),
        ));
    }
    Ok(T::deserialize(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColmeiaSubmission, Observation};
    use serde_json::json;

    #[test]
    fn test_top_level_array() {
        let payload = json!([
            {"date": "2024-01-01", "category": "A", "value": 1},
            {"date": "2024-01-02", "category": "B", "value": 2}
        ]);
        let parsed = parse_records::<Observation>(&payload);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_wrapped_array_and_bad_records() {
        let payload = json!({
            "data": [
                {"date": "2024-01-01", "category": "A", "value": 1},
                {"date": "??", "category": "A", "value": 1},
                {"category": "A"},
                42
            ]
        });
        let parsed = parse_records::<Observation>(&payload);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.skipped, 3);
    }

    #[test]
    fn test_unknown_shape_is_empty() {
        assert!(record_array(&json!({"rows": []})).is_empty());
        assert!(record_array(&json!("text")).is_empty());
        assert!(parse_records::<Observation>(&Value::Null).records.is_empty());
    }

    #[test]
    fn test_parse_object() {
        let payload = json!({"company": "ACME", "version": 1, "categories": []});
        let sub: ColmeiaSubmission = parse_object(&payload).unwrap();
        assert_eq!(sub.company, "ACME");

        assert!(parse_object::<ColmeiaSubmission>(&json!([])).is_err());
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_payload("/nonexistent/fundview/quotas.json");
        assert!(matches!(result, Err(FundviewError::NotFound(_))));
    }
}
