//! 설정 관리.
//!
//! 색상 팔레트, 지표 표시 이름, 주식 티커 허용 목록 같은 정적 조회 테이블은
//! 읽기 전용 설정 데이터로 취급합니다. 로딩 순서는 내장 기본값 → TOML 파일 →
//! `FUNDVIEW__` 환경 변수입니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 팔레트가 비어 있을 때 사용하는 색상.
pub const FALLBACK_COLOR: &str = "#8c8c8c";

/// 기본 차트 팔레트.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#1f3b73", "#f2a900", "#2e8b57", "#c0392b", "#6c5ce7", "#00a8b5", "#e67e22", "#7f8c8d",
    "#8e44ad", "#16a085",
];

/// NAV 뷰에서 "Stocks" 컬럼으로 합산되는 기본 티커 목록.
pub const DEFAULT_STOCK_TICKERS: [&str; 10] = [
    "PETR4", "VALE3", "ITUB4", "BBDC4", "BBAS3", "ABEV3", "WEGE3", "B3SA3", "RENT3", "SUZB3",
];

/// 합산 컬럼의 기본 이름.
pub const DEFAULT_STOCKS_LABEL: &str = "Stocks";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// NAV 뷰 설정
    #[serde(default)]
    pub nav: NavConfig,
    /// 차트/표시 설정
    #[serde(default)]
    pub display: DisplayConfig,
    /// 테이블 설정
    #[serde(default)]
    pub table: TableConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// span 진입/종료 이벤트 기록 여부
    #[serde(default)]
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
            span_events: false,
        }
    }
}

/// NAV 뷰 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NavConfig {
    /// 하나의 컬럼으로 합산할 주식 티커 목록
    pub stock_tickers: Vec<String>,
    /// 합산 컬럼 이름
    pub stocks_label: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            stock_tickers: DEFAULT_STOCK_TICKERS.iter().map(|t| t.to_string()).collect(),
            stocks_label: DEFAULT_STOCKS_LABEL.to_string(),
        }
    }
}

/// 표시 이름 매핑 항목.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NameMapping {
    /// 원본 키 (series code, 티커 등)
    pub key: String,
    /// 화면에 표시할 이름
    pub label: String,
}

impl NameMapping {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// 차트/표시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// 차트 색상 팔레트 (순환 사용)
    pub palette: Vec<String>,
    /// 사람이 읽기 쉬운 이름 매핑
    #[serde(default)]
    pub names: Vec<NameMapping>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            names: vec![
                NameMapping::new("IS_NET_REVENUES", "Receita Líquida"),
                NameMapping::new("IS_EBITDA", "EBITDA"),
                NameMapping::new("IS_NET_INCOME", "Lucro Líquido"),
                NameMapping::new("BS_NET_DEBT", "Dívida Líquida"),
            ],
        }
    }
}

impl DisplayConfig {
    /// 키에 대응하는 표시 이름을 반환합니다 (대소문자 무시, 없으면 키 그대로).
    pub fn label_for(&self, key: &str) -> String {
        self.names
            .iter()
            .find(|m| m.key.eq_ignore_ascii_case(key))
            .map(|m| m.label.clone())
            .unwrap_or_else(|| key.to_string())
    }

    /// 인덱스에 해당하는 팔레트 색상 (팔레트 길이로 순환).
    pub fn color_for(&self, index: usize) -> String {
        if self.palette.is_empty() {
            return FALLBACK_COLOR.to_string();
        }
        self.palette[index % self.palette.len()].clone()
    }
}

/// 테이블 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableConfig {
    /// 페이지당 행 수 (0 = 페이지 나누지 않음)
    pub page_size: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { page_size: 25 }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        Self::build(Some(path.as_ref()))
    }

    /// 파일 없이 기본값과 환경 변수만으로 설정을 구성합니다.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::build(None)
    }

    fn build(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            // 내장 기본값으로 시작
            .add_source(config::Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        // 환경 변수로 오버라이드 (예: FUNDVIEW__TABLE__PAGE_SIZE=50)
        builder = builder.add_source(
            config::Environment::with_prefix("FUNDVIEW")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("nav.stock_tickers")
                .with_list_parse_key("display.palette")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_for_is_case_insensitive() {
        let display = DisplayConfig::default();
        assert_eq!(display.label_for("is_ebitda"), "EBITDA");
        assert_eq!(display.label_for("UNKNOWN_CODE"), "UNKNOWN_CODE");
    }

    #[test]
    fn test_color_cycles_through_palette() {
        let display = DisplayConfig {
            palette: vec!["#000".to_string(), "#fff".to_string()],
            names: Vec::new(),
        };
        assert_eq!(display.color_for(0), "#000");
        assert_eq!(display.color_for(3), "#fff");

        let empty = DisplayConfig {
            palette: Vec::new(),
            names: Vec::new(),
        };
        assert_eq!(empty.color_for(5), FALLBACK_COLOR);
    }

    #[test]
    fn test_default_nav_config() {
        let nav = NavConfig::default();
        assert_eq!(nav.stocks_label, "Stocks");
        assert!(nav.stock_tickers.iter().any(|t| t == "PETR4"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join("fundview_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dashboard.toml");
        std::fs::write(
            &path,
            "[table]\npage_size = 10\n\n[nav]\nstock_tickers = [\"AAA3\"]\nstocks_label = \"Ações\"\n",
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.table.page_size, 10);
        assert_eq!(config.nav.stock_tickers, vec!["AAA3".to_string()]);
        assert_eq!(config.nav.stocks_label, "Ações");
        // 파일에 없는 섹션은 기본값 유지
        assert_eq!(config.display.palette.len(), DEFAULT_PALETTE.len());
    }
}
