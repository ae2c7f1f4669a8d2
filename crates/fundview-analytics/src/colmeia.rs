//! Colmeia 점수 분석
//!
//! 제출 기록 요약, 버전 간 점수 변화, (회사, 버전) × 카테고리 점수 행렬을
//! 제공합니다. 버전 번호는 회사마다 따로 매겨집니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use fundview_core::ColmeiaSubmission;

use crate::pivot::locale_cmp;

/// 제출 하나의 요약.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColmeiaSummary {
    pub company: String,
    pub version: u32,

    /// 채점된 카테고리의 평균 점수 (채점된 것이 없으면 `None`)
    pub average_score: Option<Decimal>,

    /// 채점된 카테고리 수
    pub scored: usize,

    /// 미채점 카테고리 수
    pub unscored: usize,
}

/// 제출을 요약합니다.
pub fn summarize(submission: &ColmeiaSubmission) -> ColmeiaSummary {
    let scores: Vec<Decimal> = submission
        .categories
        .iter()
        .filter_map(|c| c.score)
        .collect();

    let average_score = if scores.is_empty() {
        None
    } else {
        let sum = scores
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc.saturating_add(*s));
        Some(sum / Decimal::from(scores.len()))
    };

    ColmeiaSummary {
        company: submission.company.clone(),
        version: submission.version,
        average_score,
        scored: scores.len(),
        unscored: submission.categories.len() - scores.len(),
    }
}

/// 제출 목록에 나오는 회사 이름 (로케일 순서, 중복 제거).
pub fn companies(submissions: &[ColmeiaSubmission]) -> Vec<&str> {
    let mut names: Vec<&str> = submissions.iter().map(|s| s.company.as_str()).collect();
    names.sort_by(|a, b| locale_cmp(a, b));
    names.dedup();
    names
}

/// 회사의 가장 높은 버전 제출.
pub fn latest_submission<'a>(
    submissions: &'a [ColmeiaSubmission],
    company: &str,
) -> Option<&'a ColmeiaSubmission> {
    submissions
        .iter()
        .filter(|s| s.company == company)
        .max_by_key(|s| s.version)
}

/// 카테고리 하나의 점수 변화 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
    Unchanged,
}

/// 버전 간 카테고리 점수 변화.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChange {
    pub category: String,
    pub previous: Option<Decimal>,
    pub current: Option<Decimal>,

    /// 양쪽 모두 점수가 있을 때만 계산됩니다
    pub delta: Option<Decimal>,
    pub kind: ChangeKind,
}

/// 두 제출의 카테고리 점수를 이름 기준으로 비교합니다.
///
/// 현재 제출의 카테고리 순서를 따르고, 이전에만 있던 카테고리는 뒤에
/// `Removed`로 붙습니다.
pub fn score_changes(previous: &ColmeiaSubmission, current: &ColmeiaSubmission) -> Vec<ScoreChange> {
    let mut changes: Vec<ScoreChange> = current
        .categories
        .iter()
        .map(|category| match previous.category(&category.name) {
            Some(before) => {
                let kind = if before.score == category.score {
                    ChangeKind::Unchanged
                } else {
                    ChangeKind::Changed
                };
                ScoreChange {
                    category: category.name.clone(),
                    previous: before.score,
                    current: category.score,
                    delta: before
                        .score
                        .zip(category.score)
                        .and_then(|(b, c)| c.checked_sub(b)),
                    kind,
                }
            }
            None => ScoreChange {
                category: category.name.clone(),
                previous: None,
                current: category.score,
                delta: None,
                kind: ChangeKind::Added,
            },
        })
        .collect();

    changes.extend(
        previous
            .categories
            .iter()
            .filter(|c| current.category(&c.name).is_none())
            .map(|c| ScoreChange {
                category: c.name.clone(),
                previous: c.score,
                current: None,
                delta: None,
                kind: ChangeKind::Removed,
            }),
    );

    changes
}

/// (회사, 버전) 하나의 점수 행.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub company: String,
    pub version: u32,

    /// `ScoreMatrix::categories`와 같은 순서
    pub scores: Vec<Option<Decimal>>,
}

/// (회사, 버전) × 카테고리 점수 행렬.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreMatrix {
    pub categories: Vec<String>,
    pub rows: Vec<ScoreRow>,
}

/// 제출 목록을 (회사, 버전) × 카테고리 행렬로 펼칩니다.
///
/// 피벗과 같은 규칙을 따릅니다: 같은 회사의 같은 버전이 반복되면 나중 제출의
/// 값이 우선하고, 카테고리는 로케일 순서, 행은 회사(로케일 순서) 다음 버전
/// 오름차순이며 빈 칸은 `None`.
pub fn score_matrix(submissions: &[ColmeiaSubmission]) -> ScoreMatrix {
    let mut by_key: BTreeMap<(&str, u32), BTreeMap<&str, Option<Decimal>>> = BTreeMap::new();
    let mut categories: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for submission in submissions {
        let row = by_key
            .entry((submission.company.as_str(), submission.version))
            .or_default();
        for category in &submission.categories {
            row.insert(category.name.as_str(), category.score);
            if seen.insert(category.name.as_str()) {
                categories.push(category.name.as_str());
            }
        }
    }

    categories.sort_by(|a, b| locale_cmp(a, b));

    let mut rows: Vec<ScoreRow> = by_key
        .into_iter()
        .map(|((company, version), values)| ScoreRow {
            company: company.to_string(),
            version,
            scores: categories
                .iter()
                .map(|c| values.get(c).copied().flatten())
                .collect(),
        })
        .collect();
    rows.sort_by(|a, b| locale_cmp(&a.company, &b.company).then(a.version.cmp(&b.version)));

    debug!(
        submissions = submissions.len(),
        rows = rows.len(),
        categories = categories.len(),
        "Score matrix built"
    );

    ScoreMatrix {
        categories: categories.into_iter().map(str::to_string).collect(),
        rows,
    }
}
