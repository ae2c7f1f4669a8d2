//! 대시보드 뷰 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - API 페이로드 파일 로딩
//! - 피벗/누적/시계열/NAV/Colmeia 뷰 렌더링
//! - table, csv, json 출력

pub mod commands;

pub use commands::*;
