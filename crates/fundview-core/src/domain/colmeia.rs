//! Colmeia 점수 제출 기록.
//!
//! 회사별로 카테고리마다 0~5 점수와 근거 목록을 기록하며, 제출할 때마다
//! 버전이 올라갑니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{FundviewError, FundviewResult};
use crate::types::lenient_decimal;

/// 허용되는 최소 점수.
pub const MIN_SCORE: Decimal = Decimal::ZERO;

/// 허용되는 최대 점수.
pub const MAX_SCORE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// 카테고리 하나의 점수와 근거.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColmeiaCategory {
    /// 카테고리 이름
    pub name: String,

    /// 점수 (미채점 또는 비유한값이면 `None`)
    #[serde(default, deserialize_with = "lenient_decimal::deserialize")]
    pub score: Option<Decimal>,

    /// 근거 bullet 목록
    #[serde(default, alias = "bullets")]
    pub justifications: Vec<String>,
}

impl ColmeiaCategory {
    pub fn new(name: impl Into<String>, score: Option<Decimal>) -> Self {
        Self {
            name: name.into(),
            score,
            justifications: Vec::new(),
        }
    }

    /// 근거를 추가합니다.
    pub fn with_justification(mut self, text: impl Into<String>) -> Self {
        self.justifications.push(text.into());
        self
    }
}

/// 한 번의 점수 제출.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColmeiaSubmission {
    /// 대상 회사
    pub company: String,
    /// 제출 버전 (1부터 증가)
    pub version: u32,
    /// 제출일
    #[serde(default)]
    pub submitted_at: Option<NaiveDate>,
    /// 카테고리별 점수
    #[serde(default)]
    pub categories: Vec<ColmeiaCategory>,
}

impl ColmeiaSubmission {
    /// 이름으로 카테고리를 찾습니다.
    pub fn category(&self, name: &str) -> Option<&ColmeiaCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// 점수 범위와 카테고리 중복을 검증합니다.
    pub fn validate(&self) -> FundviewResult<()> {
        let mut seen = HashSet::new();

        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(FundviewError::InvalidInput(format!(
                    "{} v{}: category name is empty",
                    self.company, self.version
                )));
            }

            if !seen.insert(category.name.as_str()) {
                return Err(FundviewError::InvalidInput(format!(
                    "{} v{}: duplicate category {}",
                    self.company, self.version, category.name
                )));
            }

            if let Some(score) = category.score {
                if score < MIN_SCORE || score > MAX_SCORE {
                    return Err(FundviewError::InvalidInput(format!(
                        "{} v{}: score {} for {} is outside {}..={}",
                        self.company, self.version, score, category.name, MIN_SCORE, MAX_SCORE
                    )));
                }
            }
        }

        Ok(())
    }
}
