//! 페이로드에서 대시보드 뷰까지의 전체 흐름 테스트.
//!
//! 1. API 형태의 JSON 페이로드를 레코드로 파싱 (잘못된 레코드는 건너뜀)
//! 2. 피벗/누적/시계열/NAV 변환 적용
//! 3. 차트 데이터셋 생성

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use fundview_analytics::{
    add_data_type, build_cumulative, flatten, group_by_series_code, latest_positions,
    line_series, pie_slices, pivot, treemap_nodes, NavMatrix,
};
use fundview_core::payload::parse_records;
use fundview_core::{
    AppConfig, DataType, Observation, PositionEvent, TimeSeriesItem, DEFAULT_STOCKS_LABEL,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_quota_payload_to_line_chart() {
    let payload = json!({
        "data": [
            {"date": "2024-01-02", "fund": "FIA", "quota": "1,05"},
            {"date": "2024-01-01", "fund": "FIA", "quota": 1.0},
            {"date": "2024-01-01", "fund": "Multimercado", "quota": "NaN"},
            {"date": "not a date", "fund": "FIA", "quota": 2},
            {"fund": "FIA"}
        ]
    });

    let parsed = parse_records::<Observation>(&payload);
    assert_eq!(parsed.records.len(), 3);
    assert_eq!(parsed.skipped, 2);

    let table = pivot(&parsed.records);
    assert_eq!(table.columns, vec!["date", "FIA", "Multimercado"]);
    assert_eq!(table.rows[1].value("FIA"), Some(dec!(1.05)));
    assert!(table.rows[0].cell("Multimercado").unwrap().is_missing);

    let config = AppConfig::default();
    let series = line_series(&table, &config.display);
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].points.len(), 2);
    assert!(series[1].points.is_empty());
}

#[test]
fn test_position_payload_to_treemap() {
    let payload = json!([
        {"date": "2024-01-01", "ticker": "PETR4", "quantity": 100},
        {"date": "2024-01-10", "ticker": "PETR4", "quantity": "-40"},
        {"date": "2024-01-05", "ticker": "VALE3", "quantity": 30},
        {"date": "2024-01-10", "ticker": "VALE3", "quantity": "-30"}
    ]);

    let events = parse_records::<PositionEvent>(&payload).records;
    let rows = build_cumulative(&events);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].position("VALE3"), dec!(30));

    let latest = latest_positions(&rows);
    assert_eq!(latest.get("PETR4"), Some(&dec!(60)));
    assert_eq!(latest.get("VALE3"), Some(&Decimal::ZERO));

    let nodes = treemap_nodes(&latest, &AppConfig::default().display);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].key, "PETR4");
}

#[test]
fn test_series_payloads_grouped_across_sources() {
    let financials = json!([
        {
            "series_code": "IS_NET_REVENUES",
            "description": "Net revenues",
            "unit": "BRL mn",
            "series_type": "annual",
            "values": [
                {"date_reference": "2022-12-31", "value": 100},
                {"date_reference": "2023-12-31", "value": "120"}
            ]
        }
    ]);
    let growth = json!({
        "data": [
            {
                "series_code": "IS_NET_REVENUES_YOY",
                "description": "Revenue growth",
                "values": [{"date": "2023-12-31", "value": 0.2}]
            }
        ]
    });

    let mut records = add_data_type(
        &flatten(&parse_records::<TimeSeriesItem>(&financials).records),
        DataType::Financials,
    );
    records.extend(add_data_type(
        &flatten(&parse_records::<TimeSeriesItem>(&growth).records),
        DataType::Growth,
    ));

    let groups = group_by_series_code(&records);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].series_code, "IS_NET_REVENUES");
    assert_eq!(groups[0].values.len(), 2);
    assert_eq!(groups[0].metadata.data_type, Some(DataType::Financials));
    assert_eq!(groups[1].metadata.data_type, Some(DataType::Growth));
    assert_eq!(
        groups[0].latest().map(|p| (p.date, p.value)),
        Some((date("2023-12-31"), Some(dec!(120))))
    );
}

#[test]
fn test_nav_payload_to_pie_chart() {
    let payload = json!([
        {"date": "2024-01-31", "asset": "PETR4", "value": 300},
        {"date": "2024-01-31", "asset": "VALE3", "value": 200},
        {"date": "2024-01-31", "asset": "Caixa", "value": 500},
        {"date": "2024-02-29", "asset": "Caixa", "value": 1000}
    ]);

    let config = AppConfig::default();
    let table = pivot(&parse_records::<Observation>(&payload).records);
    let matrix = NavMatrix::from_pivot(&table)
        .consolidate_stocks(&config.nav.stock_tickers, &config.nav.stocks_label);

    assert_eq!(matrix.assets, vec!["Caixa".to_string(), DEFAULT_STOCKS_LABEL.to_string()]);

    let pct = matrix.to_percentage();
    let first = &pct.rows[0];
    assert_eq!(first.value(DEFAULT_STOCKS_LABEL), dec!(50));

    let slices = pie_slices(first, &config.display);
    assert_eq!(slices.len(), 2);
    assert_eq!(slices[0].share_pct, dec!(50));

    let latest = pct.latest().unwrap();
    assert_eq!(latest.value("Caixa"), dec!(100));
    assert_eq!(latest.value(DEFAULT_STOCKS_LABEL), Decimal::ZERO);
}
