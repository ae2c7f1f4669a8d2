//! 재무 지표 시계열 명령.
//!
//! 여러 엔드포인트의 페이로드를 평탄화하고 출처 태그를 붙인 뒤 series code
//! 기준으로 묶어서 출력합니다.

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use fundview_analytics::{
    add_data_type, flatten, group_by_series_code_with, group_by_source, series_table,
    DuplicateDatePolicy, SeriesTable,
};
use fundview_core::{view_span, DataType, FlatRecord, GroupedSeries, TimeSeriesItem};

use super::output::{decimal_cell, render, write_output, Tabular};
use super::{load_records, page_footer, CommandContext};

/// 출처 태그가 붙을 수 있는 입력 파일.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSource {
    pub data_type: Option<DataType>,
    pub path: PathBuf,
}

impl SeriesSource {
    /// `[타입:]경로` 형식을 파싱합니다 (예: `growth:data/growth.json`).
    ///
    /// 접두사가 알려진 출처 태그가 아니면 전체를 경로로 취급합니다.
    pub fn parse(raw: &str) -> Self {
        if let Some((prefix, rest)) = raw.split_once(':') {
            if let Ok(data_type) = prefix.parse::<DataType>() {
                return Self {
                    data_type: Some(data_type),
                    path: PathBuf::from(rest),
                };
            }
        }

        Self {
            data_type: None,
            path: PathBuf::from(raw),
        }
    }
}

/// 시계열 명령 설정.
#[derive(Debug, Clone)]
pub struct SeriesConfig {
    pub sources: Vec<SeriesSource>,
    /// 태그가 없는 입력에 붙일 기본 출처 태그
    pub default_data_type: Option<DataType>,
    pub policy: DuplicateDatePolicy,
    /// (출처, code) 기준으로 분리
    pub by_source: bool,
    /// 날짜를 컬럼으로 펼친 조밀한 테이블 출력
    pub wide: bool,
}

/// 시계열 그룹을 출력합니다. 그룹 수를 반환합니다.
pub fn run_series(config: SeriesConfig, ctx: &CommandContext) -> Result<usize> {
    let mut records: Vec<FlatRecord> = Vec::new();

    for source in &config.sources {
        let items: Vec<TimeSeriesItem> = load_records(&source.path)?;
        let flat = flatten(&items);
        match source.data_type.or(config.default_data_type) {
            Some(data_type) => records.extend(add_data_type(&flat, data_type)),
            None => records.extend(flat),
        }
    }

    let _span = view_span!("series", "series", records.len()).entered();

    let groups = if config.by_source {
        group_by_source(&records)
    } else {
        group_by_series_code_with(&records, config.policy)
    };
    info!(records = records.len(), groups = groups.len(), "Series grouped");

    let content = if config.wide {
        render_wide(&series_table(&groups), ctx)?
    } else {
        render_groups(&groups, ctx)?
    };
    write_output(&content, ctx.output_path())?;

    Ok(groups.len())
}

/// 그룹 목록 (그룹당 한 줄, 최신 값 포함).
pub fn render_groups(groups: &[GroupedSeries], ctx: &CommandContext) -> Result<String> {
    let page = ctx.page_of(groups);
    let mut tabular = Tabular::new([
        "series_code",
        "label",
        "unit",
        "type",
        "source",
        "points",
        "latest_date",
        "latest_value",
    ])
    .with_footer(page_footer(&page, "series"));

    for group in &page.items {
        let latest = group.latest();
        tabular.push(vec![
            group.series_code.clone(),
            ctx.config.display.label_for(&group.series_code),
            group.metadata.unit.clone().unwrap_or_else(|| "-".to_string()),
            group.metadata.series_type.clone().unwrap_or_else(|| "-".to_string()),
            group
                .metadata
                .data_type
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            group.values.len().to_string(),
            latest.map(|p| p.date.to_string()).unwrap_or_else(|| "-".to_string()),
            decimal_cell(latest.and_then(|p| p.value)),
        ]);
    }

    render(ctx.format, &tabular, &page)
}

#[derive(Serialize)]
struct WidePage<'a> {
    dates: &'a [chrono::NaiveDate],
    rows: &'a [fundview_analytics::SeriesTableRow],
    page: usize,
    total_pages: usize,
}

/// 날짜를 컬럼으로 펼친 테이블.
pub fn render_wide(table: &SeriesTable, ctx: &CommandContext) -> Result<String> {
    let page = ctx.page_of(&table.rows);

    let headers = ["series_code".to_string(), "label".to_string()]
        .into_iter()
        .chain(table.dates.iter().map(|d| d.to_string()));
    let mut tabular = Tabular::new(headers).with_footer(page_footer(&page, "series"));

    for row in &page.items {
        let mut cells = vec![
            row.series_code.clone(),
            ctx.config.display.label_for(&row.series_code),
        ];
        cells.extend(row.values.iter().map(|v| decimal_cell(*v)));
        tabular.push(cells);
    }

    let json = WidePage {
        dates: &table.dates,
        rows: &page.items,
        page: page.page,
        total_pages: page.total_pages,
    };

    render(ctx.format, &tabular, &json)
}
