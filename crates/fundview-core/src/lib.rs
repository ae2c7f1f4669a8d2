//! # Fundview Core
//!
//! 펀드 대시보드의 핵심 도메인 레코드 및 공통 인프라를 제공합니다.
//!
//! 이 크레이트는 대시보드 전반에서 사용되는 기본 타입을 제공합니다:
//! - 가격/수량 관측치 및 포지션 이벤트
//! - 시계열 지표(series code) 레코드
//! - Colmeia 점수 제출 기록
//! - API 페이로드 파싱 (관대한 숫자/날짜 처리)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod payload;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
