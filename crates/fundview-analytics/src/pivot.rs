//! 쿼터/가격 피벗 테이블
//!
//! `(날짜, 자산, 가격)` 관측치 목록을 날짜별 행, 자산별 컬럼의 조밀한 테이블로
//! 변환합니다. 각 셀에는 누락 여부와 "처음 관측된 값" 여부가 함께 기록됩니다.
//!
//! # 규칙
//!
//! - 같은 (날짜, 카테고리)가 여러 번 나오면 마지막 값이 사용됩니다 (합산하지 않음)
//! - 컬럼은 `"date"` 다음에 카테고리를 로케일 기준 오름차순으로 배치
//! - 행은 날짜 오름차순
//! - 모든 행은 모든 카테고리 셀을 가집니다

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use fundview_core::Observation;

use crate::table::SortDirection;

/// 날짜 컬럼 이름.
pub const DATE_COLUMN: &str = "date";

/// 피벗 테이블의 단일 셀.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotCell {
    /// 컬럼 (카테고리) 이름
    pub category: String,

    /// 값 (관측치가 없으면 `None`)
    pub value: Option<Decimal>,

    /// 값이 비어 있는지 여부
    pub is_missing: bool,

    /// 날짜 순으로 이 카테고리의 첫 번째 non-null 값인지 여부
    pub is_first_non_null: bool,
}

/// 날짜 하나에 대한 행.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotRow {
    pub date: NaiveDate,

    /// 카테고리 컬럼 순서와 같은 순서의 셀
    pub cells: Vec<PivotCell>,
}

impl PivotRow {
    /// 카테고리 셀을 찾습니다.
    pub fn cell(&self, category: &str) -> Option<&PivotCell> {
        self.cells.iter().find(|c| c.category == category)
    }

    /// 카테고리 값을 반환합니다 (없으면 `None`).
    pub fn value(&self, category: &str) -> Option<Decimal> {
        self.cell(category).and_then(|c| c.value)
    }
}

/// 피벗 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotTable {
    /// `["date", 카테고리...]`
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    /// 날짜 컬럼을 제외한 카테고리 목록.
    pub fn categories(&self) -> &[String] {
        self.columns.get(1..).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 카테고리별 가장 최근의 non-null 값.
    ///
    /// 한 번도 값이 없었던 카테고리는 포함되지 않습니다.
    pub fn latest_values(&self) -> BTreeMap<String, Decimal> {
        let mut latest = BTreeMap::new();
        let mut rows: Vec<&PivotRow> = self.rows.iter().collect();
        rows.sort_by_key(|r| r.date);

        for row in rows {
            for cell in &row.cells {
                if let Some(value) = cell.value {
                    latest.insert(cell.category.clone(), value);
                }
            }
        }

        latest
    }

    /// 컬럼 기준으로 행을 정렬합니다.
    ///
    /// `"date"`는 날짜로, 그 외 컬럼은 값으로 정렬합니다. 빈 셀은 방향과
    /// 관계없이 항상 뒤로 갑니다. 같은 값은 날짜 오름차순을 유지합니다.
    pub fn sort_by_column(&mut self, column: &str, direction: SortDirection) {
        if column == DATE_COLUMN {
            self.rows
                .sort_by(|a, b| direction.apply(a.date.cmp(&b.date)));
            return;
        }

        self.rows.sort_by(|a, b| {
            let ordering = match (a.value(column), b.value(column)) {
                (Some(x), Some(y)) => direction.apply(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            ordering.then_with(|| a.date.cmp(&b.date))
        });
    }
}

/// 관측치 목록을 피벗합니다.
///
/// 빈 입력은 `{ columns: ["date"], rows: [] }`가 됩니다.
pub fn pivot(observations: &[Observation]) -> PivotTable {
    let mut by_date: BTreeMap<NaiveDate, HashMap<&str, Option<Decimal>>> = BTreeMap::new();
    let mut categories: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for obs in observations {
        // 마지막 값 우선
        by_date
            .entry(obs.date)
            .or_default()
            .insert(obs.category.as_str(), obs.value);

        if seen.insert(obs.category.as_str()) {
            categories.push(obs.category.as_str());
        }
    }

    categories.sort_by(|a, b| locale_cmp(a, b));

    let mut first_seen: HashSet<&str> = HashSet::new();
    let rows: Vec<PivotRow> = by_date
        .into_iter()
        .map(|(date, values)| {
            let cells = categories
                .iter()
                .map(|&category| {
                    let value = values.get(category).copied().flatten();
                    let is_first_non_null = value.is_some() && first_seen.insert(category);
                    PivotCell {
                        category: category.to_string(),
                        value,
                        is_missing: value.is_none(),
                        is_first_non_null,
                    }
                })
                .collect();
            PivotRow { date, cells }
        })
        .collect();

    let columns = std::iter::once(DATE_COLUMN.to_string())
        .chain(categories.iter().map(|c| c.to_string()))
        .collect();

    debug!(
        observations = observations.len(),
        dates = rows.len(),
        categories = categories.len(),
        "Pivot table built"
    );

    PivotTable { columns, rows }
}

/// 로케일 기준 문자열 비교.
///
/// 대소문자와 라틴 문자 악센트(포르투갈어 등)를 무시한 키로 먼저 비교합니다.
/// 같으면 악센트 없는 쪽, 그다음 소문자 쪽이 앞입니다 ("a" < "A" < "á").
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let lower_a = || a.chars().flat_map(char::to_lowercase);
    let lower_b = || b.chars().flat_map(char::to_lowercase);

    lower_a()
        .map(fold_accent)
        .cmp(lower_b().map(fold_accent))
        .then_with(|| lower_a().cmp(lower_b()))
        .then_with(|| a.chars().map(char::is_uppercase).cmp(b.chars().map(char::is_uppercase)))
        .then_with(|| a.cmp(b))
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn obs(d: &str, category: &str, value: Option<Decimal>) -> Observation {
        Observation::new(date(d), category, value)
    }

    #[test]
    fn test_two_dates_two_categories() {
        let table = pivot(&[
            obs("2024-01-01", "A", Some(dec!(1))),
            obs("2024-01-02", "B", Some(dec!(2))),
        ]);

        assert_eq!(table.columns, vec!["date", "A", "B"]);
        assert_eq!(table.rows.len(), 2);

        let first = &table.rows[0];
        assert_eq!(first.date, date("2024-01-01"));
        assert_eq!(first.value("A"), Some(dec!(1)));
        assert!(first.cell("A").unwrap().is_first_non_null);
        assert_eq!(first.value("B"), None);
        assert!(first.cell("B").unwrap().is_missing);

        let second = &table.rows[1];
        assert_eq!(second.value("A"), None);
        assert!(second.cell("A").unwrap().is_missing);
        assert!(!second.cell("A").unwrap().is_first_non_null);
        assert_eq!(second.value("B"), Some(dec!(2)));
        assert!(second.cell("B").unwrap().is_first_non_null);
    }

    #[test]
    fn test_empty_input() {
        let table = pivot(&[]);
        assert_eq!(table.columns, vec![DATE_COLUMN.to_string()]);
        assert!(table.rows.is_empty());
        assert!(table.categories().is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let table = pivot(&[
            obs("2024-01-01", "A", Some(dec!(1))),
            obs("2024-01-01", "A", Some(dec!(7))),
        ]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].value("A"), Some(dec!(7)));

        // null도 덮어씁니다
        let table = pivot(&[
            obs("2024-01-01", "A", Some(dec!(1))),
            obs("2024-01-01", "A", None),
        ]);
        assert!(table.rows[0].cell("A").unwrap().is_missing);
    }

    #[test]
    fn test_rows_sorted_regardless_of_input_order() {
        let table = pivot(&[
            obs("2024-03-01", "A", Some(dec!(3))),
            obs("2024-01-01", "A", None),
            obs("2024-02-01", "A", Some(dec!(2))),
        ]);

        let dates: Vec<NaiveDate> = table.rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date("2024-01-01"), date("2024-02-01"), date("2024-03-01")]);

        // 첫 날짜는 null이므로 두 번째 행이 첫 non-null
        let flags: Vec<bool> = table
            .rows
            .iter()
            .map(|r| r.cell("A").unwrap().is_first_non_null)
            .collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[test]
    fn test_locale_column_order() {
        let table = pivot(&[
            obs("2024-01-01", "banco", Some(dec!(1))),
            obs("2024-01-01", "Ação", Some(dec!(1))),
            obs("2024-01-01", "acao", Some(dec!(1))),
            obs("2024-01-01", "Zeta", Some(dec!(1))),
        ]);
        assert_eq!(table.columns, vec!["date", "acao", "Ação", "banco", "Zeta"]);
    }

    #[test]
    fn test_locale_cmp_lowercase_first() {
        let mut names = vec!["ação", "A", "acao", "a"];
        names.sort_by(|a, b| locale_cmp(a, b));
        assert_eq!(names, vec!["a", "A", "acao", "ação"]);

        assert_eq!(locale_cmp("Moat", "moat"), Ordering::Greater);
        assert_eq!(locale_cmp("moat", "moat"), Ordering::Equal);
    }

    #[test]
    fn test_sort_by_column_nulls_last() {
        let mut table = pivot(&[
            obs("2024-01-01", "A", Some(dec!(5))),
            obs("2024-01-02", "B", Some(dec!(1))),
            obs("2024-01-03", "A", Some(dec!(9))),
        ]);

        table.sort_by_column("A", SortDirection::Descending);
        let values: Vec<Option<Decimal>> = table.rows.iter().map(|r| r.value("A")).collect();
        assert_eq!(values, vec![Some(dec!(9)), Some(dec!(5)), None]);

        table.sort_by_column("A", SortDirection::Ascending);
        let values: Vec<Option<Decimal>> = table.rows.iter().map(|r| r.value("A")).collect();
        assert_eq!(values, vec![Some(dec!(5)), Some(dec!(9)), None]);

        table.sort_by_column(DATE_COLUMN, SortDirection::Descending);
        assert_eq!(table.rows[0].date, date("2024-01-03"));
    }

    #[test]
    fn test_latest_values() {
        let table = pivot(&[
            obs("2024-01-01", "A", Some(dec!(1))),
            obs("2024-01-02", "A", None),
            obs("2024-01-02", "B", Some(dec!(4))),
            obs("2024-01-03", "C", None),
        ]);
        let latest = table.latest_values();

        assert_eq!(latest.get("A"), Some(&dec!(1)));
        assert_eq!(latest.get("B"), Some(&dec!(4)));
        assert!(!latest.contains_key("C"));
    }
}
