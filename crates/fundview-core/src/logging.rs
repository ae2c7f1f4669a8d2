//! tracing을 사용한 로깅 인프라.
//!
//! 변환 결과(테이블, CSV, JSON)는 stdout으로 나가므로 로그는 항상 stderr에
//! 기록합니다. 지원 형식:
//! - **pretty**: 개발용 사람이 읽기 쉬운 형식
//! - **json**: 로그 수집용 JSON 형식
//! - **compact**: 간결한 한 줄 형식

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 색상이 포함된 사람이 읽기 쉬운 형식
    Pretty,
    /// JSON 형식
    Json,
    /// 간결한 한 줄 형식
    #[default]
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 로그 레벨 필터 (예: "info", "fundview_analytics=debug")
    pub level: String,
    pub format: LogFormat,
    /// span 진입/종료 이벤트 포함 여부
    pub with_span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
            with_span_events: false,
        }
    }
}

impl LogConfig {
    /// 설정 파일의 `[logging]` 섹션에서 생성합니다.
    ///
    /// 알 수 없는 형식 문자열은 기본 형식으로 대체됩니다.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self {
            level: settings.level.clone(),
            format: settings.format.parse().unwrap_or_default(),
            with_span_events: settings.span_events,
        }
    }

    /// 환경 변수(`RUST_LOG`, `LOG_FORMAT`)로 값을 덮어씁니다.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("RUST_LOG") {
            self.level = level;
        }
        if let Some(format) = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.format = format;
        }
        self
    }
}

/// 로깅 시스템을 초기화합니다. 출력은 항상 stderr입니다.
///
/// ```no_run
/// use fundview_core::logging::{init_logging, LogConfig, LogFormat};
///
/// let config = LogConfig {
///     level: "debug".to_string(),
///     format: LogFormat::Json,
///     ..Default::default()
/// };
/// init_logging(config).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_new(&config.level)?;

    let span_events = if config.with_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_span_events(span_events);
    let fmt_layer = match config.format {
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().boxed(),
        LogFormat::Compact => base.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()?;

    tracing::debug!(
        format = ?config.format,
        level = %config.level,
        "Logging initialized"
    );

    Ok(())
}

/// 뷰 변환 컨텍스트 필드가 포함된 span을 생성하는 매크로.
#[macro_export]
macro_rules! view_span {
    ($name:expr, $view:expr) => {
        tracing::debug_span!($name, view = %$view)
    };
    ($name:expr, $view:expr, $records:expr) => {
        tracing::debug_span!($name, view = %$view, records = $records)
    };
}
