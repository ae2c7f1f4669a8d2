//! 누적 보유 수량(Position-held) 계산
//!
//! 매수/처분 이벤트 `(날짜, 자산, 수량 변화)`를 날짜별 누적 보유 수량
//! 테이블로 변환합니다. 각 날짜 행의 값은 해당 날짜 이하의 모든 변화량의
//! 합입니다 (이전 잔고는 다음 날짜로 이월).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use fundview_core::PositionEvent;

/// 날짜 하나의 누적 보유 수량.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeRow {
    pub date: NaiveDate,

    /// 카테고리별 누적 수량 (모든 카테고리 포함, 첫 이벤트 이전은 0)
    pub positions: BTreeMap<String, Decimal>,
}

impl CumulativeRow {
    /// 카테고리의 누적 수량 (알 수 없는 카테고리는 0).
    pub fn position(&self, category: &str) -> Decimal {
        self.positions.get(category).copied().unwrap_or(Decimal::ZERO)
    }

    /// 모든 카테고리의 합계 (범위를 넘으면 포화).
    pub fn total(&self) -> Decimal {
        self.positions
            .values()
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
    }
}

/// 누적 보유 수량 테이블을 만듭니다.
///
/// 이벤트를 날짜 기준으로 안정 정렬한 뒤 카테고리별 누계를 유지하고, 날짜가
/// 바뀔 때마다 스냅샷을 남깁니다. 결과는 "각 날짜마다 그 날짜 이하의 모든
/// 이벤트를 합산"한 것과 같습니다. 누계가 `Decimal` 범위를 넘으면 경계값으로
/// 포화시키고 경고를 남깁니다.
pub fn build_cumulative(events: &[PositionEvent]) -> Vec<CumulativeRow> {
    if events.is_empty() {
        return Vec::new();
    }

    let categories: BTreeSet<&str> = events.iter().map(|e| e.category.as_str()).collect();

    let mut running: BTreeMap<String, Decimal> = categories
        .iter()
        .map(|c| (c.to_string(), Decimal::ZERO))
        .collect();

    let mut ordered: Vec<&PositionEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.date);

    let mut rows: Vec<CumulativeRow> = Vec::new();
    let mut index = 0;

    while index < ordered.len() {
        let date = ordered[index].date;

        while index < ordered.len() && ordered[index].date == date {
            let event = ordered[index];
            if let Some(total) = running.get_mut(event.category.as_str()) {
                let current = *total;
                *total = match current.checked_add(event.delta) {
                    Some(next) => next,
                    None => {
                        warn!(
                            category = %event.category,
                            date = %date,
                            "Cumulative position overflowed; saturating"
                        );
                        current.saturating_add(event.delta)
                    }
                };
            }
            index += 1;
        }

        rows.push(CumulativeRow {
            date,
            positions: running.clone(),
        });
    }

    debug!(
        events = events.len(),
        dates = rows.len(),
        categories = categories.len(),
        "Cumulative positions built"
    );

    rows
}

/// 마지막 날짜의 보유 수량 (행이 없으면 빈 맵).
pub fn latest_positions(rows: &[CumulativeRow]) -> BTreeMap<String, Decimal> {
    rows.iter()
        .max_by_key(|r| r.date)
        .map(|r| r.positions.clone())
        .unwrap_or_default()
}
