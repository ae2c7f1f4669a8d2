//! 페이로드 전반에서 사용되는 공통 타입.

mod date;
mod decimal;

pub use date::*;
pub use decimal::*;
