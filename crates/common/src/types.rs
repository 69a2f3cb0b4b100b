//! 通用类型定义

use errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// 第一页（页码从 0 开始）
pub const FIRST_PAGE: u32 = 0;

/// 默认最大页大小
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 500;

/// 分页参数
///
/// `offset = page * size`，`limit = size`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: FIRST_PAGE,
            size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// 从未校验的请求参数构造分页
    ///
    /// 缺省时使用第 0 页与 `max_size`；负数被拒绝；超过 `max_size` 的页大小被截断。
    pub fn from_params(page: Option<i64>, size: Option<i64>, max_size: u32) -> AppResult<Self> {
        let page = match page {
            None => FIRST_PAGE,
            Some(p) if p < 0 => {
                return Err(AppError::validation(format!(
                    "page must be non-negative, got {}",
                    p
                )));
            }
            Some(p) => u32::try_from(p)
                .map_err(|_| AppError::validation(format!("page {} is out of range", p)))?,
        };

        let size = match size {
            None => max_size,
            Some(s) if s < 0 => {
                return Err(AppError::validation(format!(
                    "size must be non-negative, got {}",
                    s
                )));
            }
            Some(s) => u32::try_from(s).unwrap_or(u32::MAX).min(max_size),
        };

        Ok(Self { page, size })
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Pagination::from_params(None, None, 100).unwrap();
        assert_eq!(p, Pagination::new(0, 100));
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 100);
    }

    #[test]
    fn test_offset() {
        let p = Pagination::new(3, 20);
        assert_eq!(p.offset(), 60);
        assert_eq!(p.next().offset(), 80);
    }

    #[test]
    fn test_negative_rejected() {
        assert!(matches!(
            Pagination::from_params(Some(-1), None, 10),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            Pagination::from_params(None, Some(-5), 10),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_size_clamped() {
        let p = Pagination::from_params(Some(1), Some(10_000), 50).unwrap();
        assert_eq!(p.size, 50);
        assert_eq!(p.page, 1);
    }

    #[test]
    fn test_zero_size_allowed() {
        let p = Pagination::from_params(Some(0), Some(0), 50).unwrap();
        assert_eq!(p.limit(), 0);
    }
}
