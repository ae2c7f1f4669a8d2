//! Colmeia 점수 명령.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use fundview_analytics::{
    companies, latest_submission, score_changes, score_matrix, summarize, ColmeiaSummary,
    ScoreChange, ScoreMatrix,
};
use fundview_core::payload::{parse_object, parse_records, read_payload, record_array};
use fundview_core::{view_span, ColmeiaSubmission, DecimalExt, FundviewError};

use super::output::{decimal_cell, render, write_output, Tabular};
use super::CommandContext;

/// Colmeia 명령 설정.
#[derive(Debug, Clone)]
pub struct ColmeiaConfig {
    /// 제출 기록 페이로드 경로
    pub input: PathBuf,
    /// 회사 필터
    pub company: Option<String>,
    /// 버전 × 카테고리 행렬 출력
    pub matrix: bool,
}

#[derive(Debug, Serialize)]
struct SubmissionReport {
    summary: ColmeiaSummary,
    previous_version: Option<u32>,
    changes: Vec<ScoreChange>,
}

/// 제출 기록을 분석해 출력합니다. 대상 제출 수를 반환합니다.
pub fn run_colmeia(config: ColmeiaConfig, ctx: &CommandContext) -> Result<usize> {
    let submissions = select_company(load_submissions(&config.input)?, config.company.as_deref());
    let _span = view_span!("colmeia", "colmeia", submissions.len()).entered();

    for submission in &submissions {
        submission.validate()?;
    }

    let content = if config.matrix {
        let matrix = score_matrix(&submissions);
        render(ctx.format, &matrix_table(&matrix), &matrix)?
    } else {
        let report = build_report(&submissions)?;
        info!(
            company = %report.summary.company,
            version = report.summary.version,
            "Colmeia report built"
        );
        render(ctx.format, &report_table(&report), &report)?
    };
    write_output(&content, ctx.output_path())?;

    Ok(submissions.len())
}

/// 제출 목록 또는 단일 제출 객체를 읽습니다.
fn load_submissions(path: &Path) -> Result<Vec<ColmeiaSubmission>> {
    let payload = read_payload(path)
        .with_context(|| format!("Failed to load payload: {}", path.display()))?;

    if record_array(&payload).is_empty() && payload.get("company").is_some() {
        return Ok(vec![parse_object(&payload)?]);
    }

    let parsed = parse_records::<ColmeiaSubmission>(&payload);
    if parsed.skipped > 0 {
        warn!(skipped = parsed.skipped, "Some submissions were skipped");
    }
    Ok(parsed.records)
}

fn select_company(
    submissions: Vec<ColmeiaSubmission>,
    company: Option<&str>,
) -> Vec<ColmeiaSubmission> {
    match company {
        Some(company) => submissions
            .into_iter()
            .filter(|s| s.company.eq_ignore_ascii_case(company))
            .collect(),
        None => submissions,
    }
}

/// 최신 제출의 요약과 직전 버전 대비 변화.
///
/// 버전은 회사별로 매겨지므로 여러 회사가 섞인 페이로드는 거부합니다.
fn build_report(submissions: &[ColmeiaSubmission]) -> Result<SubmissionReport> {
    let company = match companies(submissions).as_slice() {
        [] => anyhow::bail!("No Colmeia submissions found"),
        [company] => company.to_string(),
        many => {
            return Err(FundviewError::InvalidInput(format!(
                "Payload has submissions for {} companies ({}); select one with --company",
                many.len(),
                many.join(", ")
            ))
            .into())
        }
    };
    let latest = latest_submission(submissions, &company)
        .with_context(|| format!("No Colmeia submissions for {}", company))?;

    let previous = submissions
        .iter()
        .filter(|s| s.company == latest.company && s.version < latest.version)
        .max_by_key(|s| s.version);

    Ok(SubmissionReport {
        summary: summarize(latest),
        previous_version: previous.map(|p| p.version),
        changes: previous
            .map(|p| score_changes(p, latest))
            .unwrap_or_default(),
    })
}

fn report_table(report: &SubmissionReport) -> Tabular {
    let summary = &report.summary;
    let average = summary
        .average_score
        .map(|a| a.round_display(2).to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut footer = format!(
        "{} v{}: average {} ({} scored, {} unscored)",
        summary.company, summary.version, average, summary.scored, summary.unscored
    );
    if let Some(previous) = report.previous_version {
        footer.push_str(&format!(", compared with v{}", previous));
    }

    let mut tabular =
        Tabular::new(["category", "previous", "current", "delta", "change"]).with_footer(footer);
    for change in &report.changes {
        tabular.push(vec![
            change.category.clone(),
            decimal_cell(change.previous),
            decimal_cell(change.current),
            decimal_cell(change.delta),
            format!("{:?}", change.kind).to_lowercase(),
        ]);
    }
    tabular
}

fn matrix_table(matrix: &ScoreMatrix) -> Tabular {
    let headers = ["company".to_string(), "version".to_string()]
        .into_iter()
        .chain(matrix.categories.iter().cloned());
    let mut tabular = Tabular::new(headers);

    for row in &matrix.rows {
        let mut cells = vec![row.company.clone(), row.version.to_string()];
        cells.extend(row.scores.iter().map(|s| decimal_cell(*s)));
        tabular.push(cells);
    }
    tabular
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::output::{format_csv, OutputFormat};
    use crate::commands::test_support::write_temp;
    use fundview_core::ColmeiaCategory;
    use rust_decimal_macros::dec;

    fn submission(company: &str, version: u32, scores: &[(&str, f64)]) -> ColmeiaSubmission {
        ColmeiaSubmission {
            company: company.to_string(),
            version,
            submitted_at: None,
            categories: scores
                .iter()
                .map(|(name, score)| {
                    ColmeiaCategory::new(*name, rust_decimal::Decimal::try_from(*score).ok())
                })
                .collect(),
        }
    }

    #[test]
    fn test_report_compares_with_previous_version() {
        let subs = vec![
            submission("ACME", 1, &[("Moat", 2.0), ("Dívida", 3.0)]),
            submission("ACME", 2, &[("Moat", 4.0), ("Dívida", 3.0)]),
        ];
        let report = build_report(&subs).unwrap();

        assert_eq!(report.summary.version, 2);
        assert_eq!(report.summary.average_score, Some(dec!(3.5)));
        assert_eq!(report.previous_version, Some(1));
        assert_eq!(report.changes[0].delta, Some(dec!(2)));

        let csv = format_csv(&report_table(&report));
        assert_eq!(
            csv,
            "category,previous,current,delta,change\nMoat,2,4,2,changed\nDívida,3,3,0,unchanged\n"
        );
    }

    #[test]
    fn test_report_rejects_mixed_companies() {
        let subs = vec![
            submission("ACME", 1, &[("Moat", 2.0)]),
            submission("Other", 3, &[("Moat", 5.0)]),
        ];

        let err = build_report(&subs).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FundviewError>(),
            Some(FundviewError::InvalidInput(_))
        ));

        let acme = select_company(subs, Some("ACME"));
        let report = build_report(&acme).unwrap();
        assert_eq!(report.summary.company, "ACME");
        assert_eq!(report.summary.version, 1);
        assert_eq!(report.previous_version, None);
    }

    #[test]
    fn test_matrix_keeps_companies_apart() {
        let path = write_temp(
            "colmeia_two_companies.json",
            r#"[{"company": "ACME", "version": 1, "categories": [{"name": "Moat", "score": 2}]},
                {"company": "Other", "version": 1, "categories": [{"name": "Moat", "score": 5}]}]"#,
        );
        let subs = load_submissions(&path).unwrap();
        let csv = format_csv(&matrix_table(&score_matrix(&subs)));
        assert_eq!(csv, "company,version,Moat\nACME,1,2\nOther,1,5\n");
    }

    #[test]
    fn test_load_single_submission_object() {
        let path = write_temp(
            "colmeia_single.json",
            r#"{"company": "ACME", "version": 4, "categories": [{"name": "Moat", "score": 3}]}"#,
        );
        let subs = load_submissions(&path).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].version, 4);
    }

    #[test]
    fn test_select_company() {
        let subs = vec![submission("ACME", 1, &[]), submission("Other", 1, &[])];
        assert_eq!(select_company(subs.clone(), Some("acme")).len(), 1);
        assert_eq!(select_company(subs, None).len(), 2);
    }

    #[test]
    fn test_run_colmeia_rejects_out_of_range_score() {
        let path = write_temp(
            "colmeia_invalid.json",
            r#"[{"company": "ACME", "version": 1,
                 "categories": [{"name": "Moat", "score": 7}]}]"#,
        );
        let config = ColmeiaConfig {
            input: path,
            company: None,
            matrix: false,
        };

        let err = run_colmeia(config, &CommandContext::default()).unwrap_err();
        assert!(err.downcast_ref::<fundview_core::FundviewError>().is_some());
    }

    #[test]
    fn test_matrix_table() {
        let subs = vec![
            submission("ACME", 1, &[("Moat", 2.0)]),
            submission("ACME", 2, &[("Moat", 4.0), ("Dívida", 1.0)]),
        ];
        let csv = format_csv(&matrix_table(&score_matrix(&subs)));
        assert_eq!(csv, "company,version,Dívida,Moat\nACME,1,-,2\nACME,2,1,4\n");

        let ctx = CommandContext {
            format: OutputFormat::Json,
            ..Default::default()
        };
        let json = render(ctx.format, &matrix_table(&score_matrix(&subs)), &score_matrix(&subs)).unwrap();
        assert!(json.contains("\"categories\""));
    }
}
