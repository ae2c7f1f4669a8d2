//! NAV 구성 명령.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use fundview_analytics::{pie_slices, pivot, NavMatrix, PieSlice};
use fundview_core::{view_span, DecimalExt, Observation};

use super::output::{decimal_cell, render, write_output, Tabular};
use super::{load_records, page_footer, CommandContext};

/// NAV 명령 설정.
#[derive(Debug, Clone)]
pub struct NavViewConfig {
    /// (날짜, 자산, 값) 페이로드 경로
    pub input: PathBuf,
    /// 비중(%)으로 환산
    pub percentage: bool,
    /// 주식 티커를 하나의 컬럼으로 합산
    pub consolidate: bool,
    /// 마지막 날짜의 파이 차트 데이터셋 출력
    pub pie: bool,
}

/// 설정에 따라 NAV 행렬을 변환합니다.
///
/// 합산을 먼저 적용한 뒤 비중을 계산합니다.
pub fn build_matrix(observations: &[Observation], config: &NavViewConfig, ctx: &CommandContext) -> NavMatrix {
    let mut matrix = NavMatrix::from_pivot(&pivot(observations));

    if config.consolidate {
        matrix = matrix.consolidate_stocks(
            &ctx.config.nav.stock_tickers,
            &ctx.config.nav.stocks_label,
        );
    }
    if config.percentage {
        matrix = matrix.to_percentage();
    }

    matrix
}

/// NAV 행렬을 출력합니다. 출력한 행 수를 반환합니다.
pub fn run_nav(config: NavViewConfig, ctx: &CommandContext) -> Result<usize> {
    let observations: Vec<Observation> = load_records(&config.input)?;
    let _span = view_span!("nav", "nav", observations.len()).entered();

    let matrix = build_matrix(&observations, &config, ctx);
    info!(
        dates = matrix.rows.len(),
        assets = matrix.assets.len(),
        consolidated = config.consolidate,
        "NAV matrix built"
    );

    let content = if config.pie {
        let latest = matrix
            .latest()
            .context("NAV payload has no rows to chart")?;
        let slices = pie_slices(latest, &ctx.config.display);
        render(ctx.format, &pie_table(&slices), &slices)?
    } else {
        render_matrix(&matrix, config.percentage, ctx)?
    };
    write_output(&content, ctx.output_path())?;

    Ok(matrix.rows.len())
}

/// 행렬의 현재 페이지를 렌더링합니다.
pub fn render_matrix(matrix: &NavMatrix, percentage: bool, ctx: &CommandContext) -> Result<String> {
    let page = ctx.page_of(&matrix.rows);

    let headers = std::iter::once("date".to_string())
        .chain(matrix.assets.iter().map(|a| ctx.config.display.label_for(a)));
    let mut tabular = Tabular::new(headers).with_footer(page_footer(&page, "dates"));

    for row in &page.items {
        let mut cells = vec![row.date.to_string()];
        cells.extend(matrix.assets.iter().map(|asset| {
            let value = row.value(asset);
            if percentage {
                value.to_percentage_string()
            } else {
                decimal_cell(Some(value))
            }
        }));
        tabular.push(cells);
    }

    render(ctx.format, &tabular, &page)
}

fn pie_table(slices: &[PieSlice]) -> Tabular {
    let mut tabular = Tabular::new(["key", "label", "value", "share", "color"]);
    for slice in slices {
        tabular.push(vec![
            slice.key.clone(),
            slice.label.clone(),
            decimal_cell(Some(slice.value)),
            slice.share_pct.to_percentage_string(),
            slice.color.clone(),
        ]);
    }
    tabular
}
