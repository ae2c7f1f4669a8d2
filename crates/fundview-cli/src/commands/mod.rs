//! CLI 명령어 구현 모듈.

pub mod colmeia;
pub mod cumulative;
pub mod nav;
pub mod output;
pub mod pivot;
pub mod series;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use fundview_analytics::{paginate, Page, SortDirection};
use fundview_core::payload::{parse_records, read_payload};
use fundview_core::AppConfig;

use output::OutputFormat;

/// 모든 명령이 공유하는 실행 컨텍스트.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// 로드된 설정
    pub config: AppConfig,
    /// 출력 형식
    pub format: OutputFormat,
    /// 출력 파일 경로 (없으면 stdout)
    pub output: Option<PathBuf>,
    /// 페이지 번호 (1부터, 0이면 전체)
    pub page: usize,
    /// 정렬 컬럼
    pub sort: Option<String>,
    /// 정렬 방향
    pub direction: SortDirection,
}

impl CommandContext {
    /// 설정된 페이지만 잘라냅니다. `page`가 0이면 전체를 한 페이지로 반환합니다.
    pub fn page_of<T: Clone>(&self, items: &[T]) -> Page<T> {
        if self.page == 0 {
            paginate(items, 1, 0)
        } else {
            paginate(items, self.page, self.config.table.page_size)
        }
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// 페이로드 파일을 읽어 레코드 목록으로 파싱합니다.
///
/// 잘못된 레코드는 건너뛰고 개수만 경고로 남깁니다.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let payload = read_payload(path)
        .with_context(|| format!("Failed to load payload: {}", path.display()))?;
    let parsed = parse_records::<T>(&payload);

    if parsed.skipped > 0 {
        warn!(
            path = %path.display(),
            skipped = parsed.skipped,
            "Some records were skipped"
        );
    }
    info!(path = %path.display(), records = parsed.records.len(), "Payload parsed");

    Ok(parsed.records)
}

/// 페이지 요약 줄.
pub fn page_footer<T>(page: &Page<T>, noun: &str) -> String {
    if page.total_pages > 1 {
        format!(
            "Total: {} {} (page {}/{})",
            page.total_items, noun, page.page, page.total_pages
        )
    } else {
        format!("Total: {} {}", page.total_items, noun)
    }
}
