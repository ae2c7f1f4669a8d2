//! 테이블 뷰 헬퍼 (정렬, 페이지네이션).

use serde::{Deserialize, Serialize};

/// 정렬 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            _ => Err(format!("Invalid sort direction: {}. Use: asc, desc", s)),
        }
    }
}

impl SortDirection {
    /// 오름차순 기준 비교 결과에 방향을 적용합니다.
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// 페이지 하나.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// 현재 페이지의 항목
    pub items: Vec<T>,
    /// 현재 페이지 (1부터 시작)
    pub page: usize,
    /// 페이지당 항목 수 (0 = 전체)
    pub page_size: usize,
    /// 전체 항목 수
    pub total_items: usize,
    /// 전체 페이지 수 (항목이 없어도 최소 1)
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// 항목을 잘라 페이지를 만듭니다.
///
/// `page`는 `[1, total_pages]`로 보정되고, `page_size == 0`이면 모든 항목이
/// 한 페이지에 들어갑니다.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let total_items = items.len();

    if page_size == 0 {
        return Page {
            items: items.to_vec(),
            page: 1,
            page_size,
            total_items,
            total_pages: 1,
        };
    }

    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);

    Page {
        items: items[start..end].to_vec(),
        page,
        page_size,
        total_items,
        total_pages,
    }
}

/// 키 기준 안정 정렬.
pub fn sort_by_key<T, K, F>(items: &mut [T], mut key: F, direction: SortDirection)
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    items.sort_by(|a, b| direction.apply(key(a).cmp(&key(b))));
}
