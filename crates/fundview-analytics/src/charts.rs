//! 대시보드 차트 데이터 구조
//!
//! 렌더링 라이브러리와 무관한 차트 데이터셋을 생성합니다.
//!
//! # 제공 차트
//!
//! - 라인 차트 (쿼터 가격 추이, 카테고리별 시리즈)
//! - 파이 차트 (특정일 NAV 구성 비중)
//! - 트리맵 (현재 보유 수량)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use fundview_core::DisplayConfig;

use crate::nav::{share_of, NavRow};
use crate::pivot::PivotTable;

/// 라인 차트 데이터 포인트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// X축 값 (날짜)
    pub x: NaiveDate,

    /// Y축 값
    pub y: Decimal,
}

/// 라인 차트 시리즈 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSeries {
    /// 원본 카테고리 키
    pub key: String,

    /// 표시 이름
    pub label: String,

    /// 색상 (hex)
    pub color: String,

    /// 데이터 포인트 (빈 셀 제외, 날짜 오름차순)
    pub points: Vec<ChartPoint>,
}

/// 파이 차트 조각
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieSlice {
    pub key: String,
    pub label: String,
    pub color: String,
    pub value: Decimal,

    /// 전체 대비 비중 (%)
    pub share_pct: Decimal,
}

/// 트리맵 노드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreemapNode {
    pub key: String,
    pub label: String,
    pub color: String,

    /// 면적 (절대값)
    pub size: Decimal,

    /// 원래 부호가 음수인지 여부 (공매도/마이너스 잔고)
    pub negative: bool,
}

/// 피벗 테이블의 카테고리마다 라인 시리즈를 만듭니다.
///
/// 색상은 컬럼 순서대로 팔레트를 순환합니다. 값이 하나도 없는 카테고리도
/// 빈 시리즈로 포함되어 색상이 컬럼 순서와 일치합니다.
pub fn line_series(table: &PivotTable, display: &DisplayConfig) -> Vec<LineSeries> {
    let mut rows: Vec<_> = table.rows.iter().collect();
    rows.sort_by_key(|r| r.date);

    table
        .categories()
        .iter()
        .enumerate()
        .map(|(index, category)| LineSeries {
            key: category.clone(),
            label: display.label_for(category),
            color: display.color_for(index),
            points: rows
                .iter()
                .filter_map(|row| {
                    row.value(category).map(|y| ChartPoint { x: row.date, y })
                })
                .collect(),
        })
        .collect()
}

/// NAV 행 하나로 파이 차트를 만듭니다.
///
/// 양수 값만 포함하며 값 내림차순으로 정렬합니다. 색상은 자산 이름 순서를
/// 기준으로 고정되어 정렬과 무관하게 같은 자산은 같은 색을 가집니다.
pub fn pie_slices(row: &NavRow, display: &DisplayConfig) -> Vec<PieSlice> {
    let positive: Vec<(usize, &String, Decimal)> = row
        .values
        .iter()
        .enumerate()
        .filter(|(_, (_, value))| **value > Decimal::ZERO)
        .map(|(index, (key, value))| (index, key, *value))
        .collect();

    let total = positive
        .iter()
        .fold(Decimal::ZERO, |acc, (_, _, v)| acc.saturating_add(*v));

    let mut slices: Vec<PieSlice> = positive
        .into_iter()
        .map(|(index, key, value)| PieSlice {
            key: key.clone(),
            label: display.label_for(key),
            color: display.color_for(index),
            value,
            share_pct: share_of(value, total).unwrap_or(Decimal::ZERO),
        })
        .collect();

    slices.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.key.cmp(&b.key)));
    slices
}

/// 보유 수량으로 트리맵 노드를 만듭니다.
///
/// 0인 포지션은 제외하고 절대값 내림차순으로 정렬합니다.
pub fn treemap_nodes(
    positions: &BTreeMap<String, Decimal>,
    display: &DisplayConfig,
) -> Vec<TreemapNode> {
    let mut nodes: Vec<TreemapNode> = positions
        .iter()
        .enumerate()
        .filter(|(_, (_, quantity))| !quantity.is_zero())
        .map(|(index, (key, quantity))| TreemapNode {
            key: key.clone(),
            label: display.label_for(key),
            color: display.color_for(index),
            size: quantity.abs(),
            negative: quantity.is_sign_negative(),
        })
        .collect();

    nodes.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.key.cmp(&b.key)));
    nodes
}
