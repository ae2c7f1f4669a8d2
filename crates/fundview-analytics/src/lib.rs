//! 대시보드 데이터 변환.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 쿼터/가격 피벗 테이블
//! - 누적 보유 수량 테이블
//! - 재무 지표 시계열 평탄화 및 그룹화
//! - NAV 비중 환산 및 주식 합산
//! - 차트 데이터셋 (라인, 파이, 트리맵)
//! - Colmeia 점수 분석
//!
//! 모든 변환은 순수 함수이며 입력을 변경하지 않습니다.
//!
//! # Re-exports
//!
//! - [`pivot`]: PivotTable, pivot
//! - [`cumulative`]: CumulativeRow, build_cumulative
//! - [`nav`]: NavRow, NavMatrix, to_percentage, consolidate_stocks

pub mod charts;
pub mod colmeia;
pub mod cumulative;
pub mod nav;
pub mod pivot;
pub mod series;
pub mod table;

pub use charts::{line_series, pie_slices, treemap_nodes, ChartPoint, LineSeries, PieSlice, TreemapNode};
pub use colmeia::{
    companies, latest_submission, score_changes, score_matrix, summarize, ChangeKind, ColmeiaSummary,
    ScoreChange, ScoreMatrix, ScoreRow,
};
pub use cumulative::{build_cumulative, latest_positions, CumulativeRow};
pub use nav::{consolidate_stocks, to_percentage, NavMatrix, NavRow};
pub use pivot::{locale_cmp, pivot, PivotCell, PivotRow, PivotTable, DATE_COLUMN};
pub use series::{
    add_data_type, flatten, group_by_series_code, group_by_series_code_with, group_by_source,
    series_table, DuplicateDatePolicy, SeriesTable, SeriesTableRow,
};
pub use table::{paginate, sort_by_key, Page, SortDirection};
