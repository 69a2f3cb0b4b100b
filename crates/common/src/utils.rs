//! 通用工具函数

use chrono::{DateTime, DurationRound, TimeDelta, Utc};

/// 当前时间，截断到微秒
///
/// PostgreSQL `TIMESTAMPTZ` 只保留微秒精度，写入前截断可以保证读回的值与写入值相等。
pub fn now() -> DateTime<Utc> {
    truncate_micros(Utc::now())
}

/// 截断到微秒精度
pub fn truncate_micros(t: DateTime<Utc>) -> DateTime<Utc> {
    t.duration_trunc(TimeDelta::microseconds(1)).unwrap_or(t)
}
