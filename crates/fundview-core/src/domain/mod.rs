//! 대시보드 API 응답의 도메인 레코드.

mod colmeia;
mod observation;
mod series;

pub use colmeia::*;
pub use observation::*;
pub use series::*;
