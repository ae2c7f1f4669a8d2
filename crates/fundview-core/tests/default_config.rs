//! 저장소에 포함된 기본 설정 파일 검증.

use std::path::PathBuf;

use fundview_core::{AppConfig, LogConfig, LogFormat, DEFAULT_PALETTE, DEFAULT_STOCK_TICKERS};

fn default_toml() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml")
}

#[test]
fn test_default_toml_matches_builtin_defaults() {
    let config = AppConfig::load(default_toml()).unwrap();
    let builtin = AppConfig::default();

    assert_eq!(config.nav.stock_tickers.len(), DEFAULT_STOCK_TICKERS.len());
    assert_eq!(config.nav.stocks_label, builtin.nav.stocks_label);
    assert_eq!(config.display.palette.len(), DEFAULT_PALETTE.len());
    assert_eq!(config.display.names, builtin.display.names);
    assert_eq!(config.table.page_size, builtin.table.page_size);
}

#[test]
fn test_logging_section_maps_to_log_config() {
    let config = AppConfig::load(default_toml()).unwrap();
    let log = LogConfig::from_settings(&config.logging);

    assert_eq!(log.level, "warn");
    assert_eq!(log.format, LogFormat::Compact);
    assert!(!log.with_span_events);
}
