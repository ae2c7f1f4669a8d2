//! NAV 뷰 변환
//!
//! 날짜 × 자산 행렬을 비중(%)으로 환산하거나, 허용 목록에 있는 주식 티커를
//! 하나의 합산 컬럼으로 묶습니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use crate::pivot::PivotTable;

/// 날짜 하나의 자산별 값.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavRow {
    pub date: NaiveDate,
    pub values: BTreeMap<String, Decimal>,
}

impl NavRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    /// 자산 값을 설정합니다.
    pub fn with(mut self, asset: impl Into<String>, value: Decimal) -> Self {
        self.values.insert(asset.into(), value);
        self
    }

    /// 자산 값 (없으면 0).
    pub fn value(&self, asset: &str) -> Decimal {
        self.values.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// 모든 컬럼의 합계 (범위를 넘으면 포화).
    pub fn total(&self) -> Decimal {
        self.values
            .values()
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
    }
}

/// 각 행의 자산 값을 합계 100이 되도록 환산합니다.
///
/// - `assets`에 없는 컬럼은 그대로 통과합니다
/// - 행에 없는 자산은 0으로 취급됩니다
/// - 자산 합계가 0인 행은 모든 자산이 0이 됩니다
/// - 비중이 `Decimal` 범위를 넘는 자산은 0이 되고 경고를 남깁니다
pub fn to_percentage(rows: &[NavRow], assets: &[String]) -> Vec<NavRow> {
    rows.iter()
        .map(|row| {
            let sum = assets
                .iter()
                .fold(Decimal::ZERO, |acc, a| acc.saturating_add(row.value(a)));
            let mut values = row.values.clone();

            for asset in assets {
                let pct = if sum.is_zero() {
                    Decimal::ZERO
                } else {
                    share_of(row.value(asset), sum).unwrap_or_else(|| {
                        warn!(date = %row.date, asset = %asset, "Percentage overflowed; using 0");
                        Decimal::ZERO
                    })
                };
                values.insert(asset.clone(), pct);
            }

            NavRow {
                date: row.date,
                values,
            }
        })
        .collect()
}

/// `value / total * 100`. 범위를 넘거나 `total`이 0이면 `None`.
pub(crate) fn share_of(value: Decimal, total: Decimal) -> Option<Decimal> {
    value
        .checked_div(total)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
}

/// 허용 목록의 티커를 `label` 컬럼 하나로 합산합니다.
///
/// 어떤 행에도 목록의 티커가 없으면 합산 컬럼을 만들지 않고 행을 그대로
/// 반환합니다. 하나라도 있으면 모든 행에 합산 컬럼이 생깁니다 (해당 행에
/// 티커가 없으면 0).
pub fn consolidate_stocks(rows: &[NavRow], tickers: &[String], label: &str) -> Vec<NavRow> {
    let tickers: HashSet<&str> = tickers.iter().map(String::as_str).collect();

    let has_any = rows
        .iter()
        .any(|row| row.values.keys().any(|k| tickers.contains(k.as_str())));

    if !has_any {
        debug!(rows = rows.len(), "No listed tickers present; skipping consolidation");
        return rows.to_vec();
    }

    rows.iter()
        .map(|row| {
            let mut values = BTreeMap::new();
            let mut stocks = Decimal::ZERO;

            for (asset, value) in &row.values {
                if tickers.contains(asset.as_str()) || asset == label {
                    stocks = stocks.saturating_add(*value);
                } else {
                    values.insert(asset.clone(), *value);
                }
            }

            values.insert(label.to_string(), stocks);
            NavRow {
                date: row.date,
                values,
            }
        })
        .collect()
}

/// 자산 목록과 행을 함께 보관하는 조밀한 NAV 행렬.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavMatrix {
    pub assets: Vec<String>,
    pub rows: Vec<NavRow>,
}

impl NavMatrix {
    pub fn new(assets: Vec<String>, rows: Vec<NavRow>) -> Self {
        Self { assets, rows }
    }

    /// 피벗 테이블에서 만듭니다 (빈 셀은 0).
    pub fn from_pivot(table: &PivotTable) -> Self {
        let rows = table
            .rows
            .iter()
            .map(|row| NavRow {
                date: row.date,
                values: row
                    .cells
                    .iter()
                    .map(|c| (c.category.clone(), c.value.unwrap_or(Decimal::ZERO)))
                    .collect(),
            })
            .collect();

        Self {
            assets: table.categories().to_vec(),
            rows,
        }
    }

    /// 비중(%) 행렬.
    pub fn to_percentage(&self) -> Self {
        Self {
            assets: self.assets.clone(),
            rows: to_percentage(&self.rows, &self.assets),
        }
    }

    /// 주식 합산 행렬. 자산 목록에서 티커를 빼고 합산 컬럼을 끝에 추가합니다.
    pub fn consolidate_stocks(&self, tickers: &[String], label: &str) -> Self {
        let rows = consolidate_stocks(&self.rows, tickers, label);
        let consolidated = rows.iter().any(|r| r.values.contains_key(label));

        if !consolidated {
            return Self {
                assets: self.assets.clone(),
                rows,
            };
        }

        let mut assets: Vec<String> = self
            .assets
            .iter()
            .filter(|a| !tickers.contains(*a) && a.as_str() != label)
            .cloned()
            .collect();
        assets.push(label.to_string());

        Self { assets, rows }
    }

    /// 마지막 날짜의 행.
    pub fn latest(&self) -> Option<&NavRow> {
        self.rows.iter().max_by_key(|r| r.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::pivot;
    use fundview_core::Observation;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_to_percentage() {
        let rows = vec![NavRow::new(date("2024-01-31"))
            .with("A", dec!(30))
            .with("B", dec!(10))
            .with("note", dec!(7))];

        let pct = to_percentage(&rows, &names(&["A", "B"]));
        assert_eq!(pct[0].value("A"), dec!(75));
        assert_eq!(pct[0].value("B"), dec!(25));
        // 자산 목록에 없는 컬럼은 그대로
        assert_eq!(pct[0].value("note"), dec!(7));
    }

    #[test]
    fn test_to_percentage_zero_row() {
        let rows = vec![NavRow::new(date("2024-01-31"))
            .with("A", dec!(0))
            .with("B", dec!(0))];

        let pct = to_percentage(&rows, &names(&["A", "B", "C"]));
        assert_eq!(pct[0].value("A"), Decimal::ZERO);
        assert_eq!(pct[0].value("B"), Decimal::ZERO);
        // 없던 자산도 0으로 채워짐
        assert_eq!(pct[0].values.get("C"), Some(&Decimal::ZERO));
    }

    #[test]
    fn test_to_percentage_overflow_falls_back_to_zero() {
        let rows = vec![NavRow::new(date("2024-01-31"))
            .with("A", Decimal::MAX)
            .with("B", -Decimal::MAX + dec!(1))];

        let pct = to_percentage(&rows, &names(&["A", "B"]));
        assert_eq!(pct[0].value("A"), Decimal::ZERO);
        assert_eq!(pct[0].value("B"), Decimal::ZERO);

        // 합계 자체가 포화되는 경우
        let rows = vec![NavRow::new(date("2024-01-31"))
            .with("A", Decimal::MAX)
            .with("B", Decimal::MAX)];
        let pct = to_percentage(&rows, &names(&["A", "B"]));
        assert_eq!(pct[0].value("A"), dec!(100));
        assert_eq!(rows[0].total(), Decimal::MAX);
    }

    #[test]
    fn test_consolidate_stocks_saturates() {
        let rows = vec![NavRow::new(date("2024-01-31"))
            .with("PETR4", Decimal::MAX)
            .with("VALE3", Decimal::MAX)];

        let consolidated = consolidate_stocks(&rows, &names(&["PETR4", "VALE3"]), "Stocks");
        assert_eq!(consolidated[0].value("Stocks"), Decimal::MAX);
    }

    #[test]
    fn test_consolidate_stocks() {
        let rows = vec![
            NavRow::new(date("2024-01-31"))
                .with("PETR4", dec!(100))
                .with("VALE3", dec!(50))
                .with("Caixa", dec!(25)),
            NavRow::new(date("2024-02-29")).with("Caixa", dec!(40)),
        ];

        let consolidated = consolidate_stocks(&rows, &names(&["PETR4", "VALE3"]), "Stocks");
        assert_eq!(consolidated[0].value("Stocks"), dec!(150));
        assert!(!consolidated[0].values.contains_key("PETR4"));
        assert_eq!(consolidated[0].value("Caixa"), dec!(25));
        assert_eq!(consolidated[1].values.get("Stocks"), Some(&Decimal::ZERO));

        for (before, after) in rows.iter().zip(&consolidated) {
            assert_eq!(before.total(), after.total());
        }
    }

    #[test]
    fn test_consolidate_without_listed_tickers_omits_column() {
        let rows = vec![NavRow::new(date("2024-01-31")).with("Caixa", dec!(10))];
        let consolidated = consolidate_stocks(&rows, &names(&["PETR4"]), "Stocks");

        assert_eq!(consolidated, rows);
        assert!(!consolidated[0].values.contains_key("Stocks"));
    }

    #[test]
    fn test_matrix_from_pivot_and_consolidate() {
        let table = pivot(&[
            Observation::new(date("2024-01-31"), "PETR4", Some(dec!(60))),
            Observation::new(date("2024-01-31"), "Caixa", Some(dec!(40))),
            Observation::new(date("2024-02-29"), "Caixa", Some(dec!(10))),
        ]);
        let matrix = NavMatrix::from_pivot(&table);
        assert_eq!(matrix.assets, names(&["Caixa", "PETR4"]));
        assert_eq!(matrix.rows[1].value("PETR4"), Decimal::ZERO);

        let consolidated = matrix.consolidate_stocks(&names(&["PETR4"]), "Stocks");
        assert_eq!(consolidated.assets, names(&["Caixa", "Stocks"]));

        let pct = consolidated.to_percentage();
        assert_eq!(pct.rows[0].value("Stocks"), dec!(60));
        assert_eq!(pct.rows[1].value("Caixa"), dec!(100));
        assert_eq!(pct.latest().map(|r| r.date), Some(date("2024-02-29")));
    }
}
