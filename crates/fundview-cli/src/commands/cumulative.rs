//! 누적 보유 수량 명령.

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use fundview_analytics::{
    build_cumulative, latest_positions, sort_by_key, treemap_nodes, CumulativeRow, TreemapNode,
};
use fundview_core::{view_span, PositionEvent};

use super::output::{decimal_cell, render, write_output, Tabular};
use super::{load_records, page_footer, CommandContext};

/// 누적 명령 설정.
#[derive(Debug, Clone)]
pub struct CumulativeConfig {
    /// 포지션 이벤트 페이로드 경로
    pub input: PathBuf,
    /// 마지막 날짜의 보유 수량만 트리맵 순서로 출력
    pub latest: bool,
}

/// 누적 보유 수량을 출력합니다. 출력한 행 수를 반환합니다.
pub fn run_cumulative(config: CumulativeConfig, ctx: &CommandContext) -> Result<usize> {
    let events: Vec<PositionEvent> = load_records(&config.input)?;
    let _span = view_span!("cumulative", "cumulative", events.len()).entered();

    let mut rows = build_cumulative(&events);
    info!(dates = rows.len(), "Cumulative positions built");

    if config.latest {
        let nodes = treemap_nodes(&latest_positions(&rows), &ctx.config.display);
        let content = render(ctx.format, &treemap_table(&nodes), &nodes)?;
        write_output(&content, ctx.output_path())?;
        return Ok(nodes.len());
    }

    if let Some(column) = &ctx.sort {
        if column == "date" {
            sort_by_key(&mut rows, |r| r.date, ctx.direction);
        } else {
            sort_by_key(&mut rows, |r| r.position(column), ctx.direction);
        }
    }

    let content = render_cumulative(&rows, ctx)?;
    write_output(&content, ctx.output_path())?;

    Ok(rows.len())
}

/// 현재 페이지를 선택한 형식으로 렌더링합니다.
pub fn render_cumulative(rows: &[CumulativeRow], ctx: &CommandContext) -> Result<String> {
    let categories: Vec<String> = rows
        .first()
        .map(|r| r.positions.keys().cloned().collect())
        .unwrap_or_default();

    let page = ctx.page_of(rows);

    let headers = std::iter::once("date".to_string())
        .chain(categories.iter().map(|c| ctx.config.display.label_for(c)))
        .chain(std::iter::once("total".to_string()));
    let mut tabular = Tabular::new(headers).with_footer(page_footer(&page, "dates"));

    for row in &page.items {
        let mut cells = vec![row.date.to_string()];
        cells.extend(categories.iter().map(|c| decimal_cell(Some(row.position(c)))));
        cells.push(decimal_cell(Some(row.total())));
        tabular.push(cells);
    }

    render(ctx.format, &tabular, &page)
}

fn treemap_table(nodes: &[TreemapNode]) -> Tabular {
    let mut tabular = Tabular::new(["key", "label", "quantity", "color"]);
    for node in nodes {
        let quantity = if node.negative { -node.size } else { node.size };
        tabular.push(vec![
            node.key.clone(),
            node.label.clone(),
            decimal_cell(Some(quantity)),
            node.color.clone(),
        ]);
    }
    tabular
}
