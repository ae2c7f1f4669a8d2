//! 대시보드 라이브러리의 에러 타입.
//!
//! 변환 함수들은 에러를 반환하지 않습니다. 이 타입은 페이로드 로딩,
//! 설정 로딩, 입력 검증 경로에서만 사용됩니다.

use thiserror::Error;

/// 핵심 대시보드 에러.
#[derive(Debug, Error)]
pub enum FundviewError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터 에러
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 파일 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),
}

/// 대시보드 작업을 위한 Result 타입.
pub type FundviewResult<T> = Result<T, FundviewError>;

impl FundviewError {
    /// 사용자가 입력을 고쳐서 해결할 수 있는 에러인지 확인합니다.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            FundviewError::InvalidInput(_)
                | FundviewError::Serialization(_)
                | FundviewError::Data(_)
        )
    }

    /// CLI 종료 코드로 변환합니다.
    pub fn exit_code(&self) -> u8 {
        match self {
            FundviewError::Config(_) => 3,
            FundviewError::Io(_) | FundviewError::NotFound(_) => 4,
            _ => 2,
        }
    }
}

impl From<serde_json::Error> for FundviewError {
    fn from(err: serde_json::Error) -> Self {
        FundviewError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for FundviewError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FundviewError::NotFound(err.to_string()),
            _ => FundviewError::Io(err.to_string()),
        }
    }
}

impl From<config::ConfigError> for FundviewError {
    fn from(err: config::ConfigError) -> Self {
        FundviewError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors() {
        let err = FundviewError::InvalidInput("score 7".to_string());
        assert!(err.is_input_error());

        let err = FundviewError::Config("missing file".to_string());
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_io_not_found_mapping() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "quotas.json");
        let err: FundviewError = io.into();
        assert!(matches!(err, FundviewError::NotFound(_)));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_serde_error_mapping() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: FundviewError = parse.into();
        assert!(matches!(err, FundviewError::Serialization(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
