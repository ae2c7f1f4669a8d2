//! 쿼터/가격 피벗 테이블 명령.

use anyhow::{bail, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use fundview_analytics::{line_series, pivot, LineSeries, PivotRow, PivotTable, DATE_COLUMN};
use fundview_core::{view_span, Observation};

use super::output::{decimal_cell, render, write_output, Tabular};
use super::{load_records, page_footer, CommandContext};

/// 피벗 명령 설정.
#[derive(Debug, Clone)]
pub struct PivotConfig {
    /// 관측치 페이로드 경로
    pub input: PathBuf,
    /// 테이블 대신 라인 차트 데이터셋 출력
    pub chart: bool,
}

#[derive(Serialize)]
struct PivotPage<'a> {
    columns: &'a [String],
    rows: &'a [PivotRow],
    page: usize,
    total_pages: usize,
}

/// 피벗 테이블을 출력합니다. 출력한 행 수를 반환합니다.
pub fn run_pivot(config: PivotConfig, ctx: &CommandContext) -> Result<usize> {
    let observations: Vec<Observation> = load_records(&config.input)?;
    let _span = view_span!("pivot", "pivot", observations.len()).entered();

    let mut table = pivot(&observations);
    info!(
        dates = table.rows.len(),
        categories = table.categories().len(),
        "Pivot built"
    );

    if config.chart {
        let series = line_series(&table, &ctx.config.display);
        let content = render(ctx.format, &chart_table(&series), &series)?;
        write_output(&content, ctx.output_path())?;
        return Ok(series.len());
    }

    if let Some(column) = &ctx.sort {
        if column != DATE_COLUMN && !table.categories().contains(column) {
            bail!(
                "Unknown sort column: {}. Available: {}",
                column,
                table.columns.join(", ")
            );
        }
        table.sort_by_column(column, ctx.direction);
    }

    let content = render_pivot(&table, ctx)?;
    write_output(&content, ctx.output_path())?;

    Ok(table.rows.len())
}

/// 현재 페이지를 선택한 형식으로 렌더링합니다.
pub fn render_pivot(table: &PivotTable, ctx: &CommandContext) -> Result<String> {
    let page = ctx.page_of(&table.rows);

    let headers = std::iter::once(DATE_COLUMN.to_string()).chain(
        table
            .categories()
            .iter()
            .map(|c| ctx.config.display.label_for(c)),
    );
    let mut tabular = Tabular::new(headers).with_footer(page_footer(&page, "dates"));

    for row in &page.items {
        let mut cells = vec![row.date.to_string()];
        cells.extend(row.cells.iter().map(|c| decimal_cell(c.value)));
        tabular.push(cells);
    }

    let json = PivotPage {
        columns: &table.columns,
        rows: &page.items,
        page: page.page,
        total_pages: page.total_pages,
    };

    render(ctx.format, &tabular, &json)
}

fn chart_table(series: &[LineSeries]) -> Tabular {
    let mut tabular = Tabular::new(["key", "label", "color", "points", "first", "last"]);
    for s in series {
        tabular.push(vec![
            s.key.clone(),
            s.label.clone(),
            s.color.clone(),
            s.points.len().to_string(),
            s.points.first().map(|p| p.x.to_string()).unwrap_or_else(|| "-".to_string()),
            s.points.last().map(|p| p.x.to_string()).unwrap_or_else(|| "-".to_string()),
        ]);
    }
    tabular
}
