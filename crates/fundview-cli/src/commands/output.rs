//! 출력 형식 처리 (table, csv, json).

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// 셀 최대 표시 너비 (table 형식).
const MAX_CELL_WIDTH: usize = 32;

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!(
                "Invalid format: {}. Use: table, csv, json",
                s
            )),
        }
    }
}

/// 헤더와 문자열 셀로 이루어진 표.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tabular {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// table 형식 하단에 붙는 요약 줄
    pub footer: Option<String>,
}

impl Tabular {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            footer: None,
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// 표 또는 JSON 값을 선택한 형식으로 렌더링합니다.
///
/// JSON 형식은 `json` 값을 그대로 직렬화하고, 나머지는 `table`을 사용합니다.
pub fn render<T: Serialize + ?Sized>(format: OutputFormat, table: &Tabular, json: &T) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_table(table)),
        OutputFormat::Csv => Ok(format_csv(table)),
        OutputFormat::Json => format_json(json),
    }
}

/// 파일 또는 stdout에 출력합니다.
pub fn write_output(content: &str, output_path: Option<&Path>) -> Result<()> {
    if let Some(path) = output_path {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .context("Failed to write to file")?;
        info!("Output written to: {}", path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}

/// 테이블 형식 출력.
///
/// 컬럼 너비는 내용에 맞추되 `MAX_CELL_WIDTH`에서 잘립니다.
pub fn format_table(table: &Tabular) -> String {
    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect();

    let mut output = String::new();

    // 헤더
    output.push_str(&format_line(&table.headers, &widths));
    let rule_width = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
    output.push_str(&"-".repeat(rule_width));
    output.push('\n');

    // 데이터
    for row in &table.rows {
        output.push_str(&format_line(row, &widths));
    }

    // 요약
    if let Some(footer) = &table.footer {
        output.push('\n');
        output.push_str(footer);
    }

    output
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let line = widths
        .iter()
        .enumerate()
        .map(|(index, width)| {
            let cell = cells.get(index).map(String::as_str).unwrap_or("");
            pad(&truncate(cell, *width), *width)
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}\n", line.trim_end())
}

/// 문자 수 기준 왼쪽 정렬 (멀티바이트 문자 안전).
fn pad(s: &str, width: usize) -> String {
    let count = s.chars().count();
    format!("{}{}", s, " ".repeat(width.saturating_sub(count)))
}

/// CSV 형식 출력.
pub fn format_csv(table: &Tabular) -> String {
    let mut output = String::new();

    let header: Vec<String> = table.headers.iter().map(|h| escape_csv(h)).collect();
    output.push_str(&header.join(","));
    output.push('\n');

    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(|c| escape_csv(c)).collect();
        output.push_str(&cells.join(","));
        output.push('\n');
    }

    output
}

/// JSON 형식 출력.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize to JSON")
}

/// 문자열 자르기 (UTF-8 안전).
pub fn truncate(s: &str, max_len: usize) -> String {
    // 문자 수로 계산 (바이트가 아님)
    let char_count = s.chars().count();

    if char_count <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// CSV 이스케이프 (콤마나 따옴표 포함 시 따옴표로 감싸기).
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// 표 셀용 숫자 표기 (정규화, 빈 값은 `-`).
pub fn decimal_cell(value: Option<Decimal>) -> String {
    value
        .map(|v| v.normalize().to_string())
        .unwrap_or_else(|| "-".to_string())
}
