//! 재무 지표 시계열 평탄화 및 재그룹
//!
//! 중첩된 `{series_code, values: [{date_reference, value}]}` 항목을 평탄한
//! 레코드 목록으로 풀고, 출처 태그를 붙인 뒤, 테이블 표시를 위해 series code
//! 기준으로 다시 묶습니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;
use tracing::{debug, warn};

use fundview_core::{
    DataType, FlatRecord, GroupedSeries, SeriesMetadata, SeriesPoint, TimeSeriesItem,
};

/// 같은 (series code, 날짜)가 다시 나왔을 때의 처리 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateDatePolicy {
    /// 뒤에 붙입니다 (중복 날짜가 그대로 남음)
    #[default]
    Append,
    /// 기존 날짜의 값을 제자리에서 덮어씁니다
    Overwrite,
}

/// 항목별 값마다 레코드 하나를 만듭니다.
///
/// 설명 필드(series_code, description, unit, series_type)는 모든 레코드에
/// 복사됩니다. 값이 없는 항목은 레코드를 만들지 않습니다.
pub fn flatten(items: &[TimeSeriesItem]) -> Vec<FlatRecord> {
    let records: Vec<FlatRecord> = items
        .iter()
        .flat_map(|item| {
            item.values.iter().map(move |v| FlatRecord {
                series_code: item.series_code.clone(),
                description: item.description.clone(),
                unit: item.unit.clone(),
                series_type: item.series_type.clone(),
                date_reference: v.date_reference,
                value: v.value,
                data_type: None,
            })
        })
        .collect();

    debug!(items = items.len(), records = records.len(), "Series flattened");
    records
}

/// 모든 레코드에 출처 태그를 붙인 사본을 반환합니다.
pub fn add_data_type(records: &[FlatRecord], data_type: DataType) -> Vec<FlatRecord> {
    records
        .iter()
        .map(|r| FlatRecord {
            data_type: Some(data_type),
            ..r.clone()
        })
        .collect()
}

/// series code 기준으로 묶습니다 (중복 날짜는 뒤에 붙임).
///
/// - 입력 순서대로 처리하며 그룹 순서는 code의 첫 등장 순서입니다
/// - 그룹의 설명 필드는 첫 레코드의 것을 사용하고, 이후 레코드의 설명
///   필드는 검증 없이 버려집니다 (불일치 시 경고 로그)
/// - series code가 없거나 빈 문자열인 레코드는 제외됩니다
pub fn group_by_series_code(records: &[FlatRecord]) -> Vec<GroupedSeries> {
    group_by_series_code_with(records, DuplicateDatePolicy::Append)
}

/// 중복 날짜 처리 방식을 지정해 series code 기준으로 묶습니다.
pub fn group_by_series_code_with(
    records: &[FlatRecord],
    policy: DuplicateDatePolicy,
) -> Vec<GroupedSeries> {
    group_records(records, policy, |_, code| code.to_string())
}

/// (출처 태그, series code) 기준으로 묶습니다.
///
/// 서로 다른 엔드포인트에서 온 같은 code를 분리해서 보여줄 때 사용합니다.
pub fn group_by_source(records: &[FlatRecord]) -> Vec<GroupedSeries> {
    group_records(records, DuplicateDatePolicy::Append, |record, code| {
        (record.data_type, code.to_string())
    })
}

fn group_records<K, F>(records: &[FlatRecord], policy: DuplicateDatePolicy, key: F) -> Vec<GroupedSeries>
where
    K: Eq + Hash,
    F: Fn(&FlatRecord, &str) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<GroupedSeries> = Vec::new();
    let mut dropped = 0usize;

    for record in records {
        let Some(code) = record.code() else {
            dropped += 1;
            continue;
        };

        let point = SeriesPoint {
            date: record.date_reference,
            value: record.value,
        };

        match index.get(&key(record, code)) {
            Some(&position) => {
                let group = &mut groups[position];
                if !record.same_metadata(&group.metadata) {
                    warn!(
                        series_code = code,
                        date = %record.date_reference,
                        "Series metadata differs from first record; keeping the first"
                    );
                }
                push_point(group, point, policy);
            }
            None => {
                index.insert(key(record, code), groups.len());
                groups.push(GroupedSeries {
                    series_code: code.to_string(),
                    metadata: SeriesMetadata::from(record),
                    values: vec![point],
                });
            }
        }
    }

    debug!(
        records = records.len(),
        groups = groups.len(),
        dropped,
        ?policy,
        "Series grouped"
    );

    groups
}

fn push_point(group: &mut GroupedSeries, point: SeriesPoint, policy: DuplicateDatePolicy) {
    if policy == DuplicateDatePolicy::Overwrite {
        if let Some(existing) = group.values.iter_mut().find(|p| p.date == point.date) {
            existing.value = point.value;
            return;
        }
    }
    group.values.push(point);
}

/// 표 형태의 시계열 한 행.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesTableRow {
    pub series_code: String,
    #[serde(flatten)]
    pub metadata: SeriesMetadata,
    /// `SeriesTable::dates`와 같은 순서의 값
    pub values: Vec<Option<Decimal>>,
}

/// 그룹을 날짜 컬럼으로 펼친 테이블.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesTable {
    /// 모든 그룹의 날짜 합집합 (오름차순)
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<SeriesTableRow>,
}

/// 그룹 목록을 조밀한 테이블로 펼칩니다.
///
/// 한 그룹에 같은 날짜가 여러 번 있으면 마지막 값이 표시됩니다.
pub fn series_table(groups: &[GroupedSeries]) -> SeriesTable {
    let dates: Vec<NaiveDate> = groups
        .iter()
        .flat_map(|g| g.values.iter().map(|p| p.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rows = groups
        .iter()
        .map(|group| {
            let by_date: HashMap<NaiveDate, Option<Decimal>> =
                group.values.iter().map(|p| (p.date, p.value)).collect();
            SeriesTableRow {
                series_code: group.series_code.clone(),
                metadata: group.metadata.clone(),
                values: dates
                    .iter()
                    .map(|d| by_date.get(d).copied().flatten())
                    .collect(),
            }
        })
        .collect();

    SeriesTable { dates, rows }
}
