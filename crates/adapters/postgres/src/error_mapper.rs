//! 数据库错误映射工具
//!
//! 提供统一的 SQLx 错误到 AppError 的转换

use errors::AppError;

/// PostgreSQL unique_violation
pub const UNIQUE_VIOLATION: &str = "23505";

/// 是否为主键 / 唯一约束冲突
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

/// 将 SQLx 错误转换为 AppError
///
/// `entity` 是本次操作针对的实体 ID，列表与 outbox 操作传表名；用于 NotFound / AlreadyExist 的错误信息。
pub fn map_sqlx_error(e: sqlx::Error, entity: &str) -> AppError {
    if is_unique_violation(&e) {
        return AppError::already_exist(entity);
    }

    match e {
        sqlx::Error::RowNotFound => AppError::not_found(entity),
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => AppError::database(format!("Database error ({}): {}", code, db_err)),
            None => AppError::database(db_err.to_string()),
        },
        sqlx::Error::ColumnDecode { index, source } => {
            AppError::serialization(format!("Failed to decode column {}: {}", index, source))
        }
        sqlx::Error::Decode(source) => {
            AppError::serialization(format!("Failed to decode row: {}", source))
        }
        sqlx::Error::PoolTimedOut => AppError::database("Database connection pool timeout"),
        sqlx::Error::PoolClosed => AppError::database("Database connection pool is closed"),
        other => AppError::database(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound, "foo");
        assert!(matches!(err, AppError::NotFound(ref id) if id == "foo"));
    }

    #[test]
    fn test_pool_timeout() {
        let err = map_sqlx_error(sqlx::Error::PoolTimedOut, "foo");
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn test_decode_failures_are_serialization() {
        let err = map_sqlx_error(sqlx::Error::Decode("invalid jsonb".into()), "modelhub_training");
        assert!(matches!(err, AppError::Serialization(_)));

        let err = map_sqlx_error(
            sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: "unexpected null".into(),
            },
            "modelhub_outbox",
        );
        assert!(matches!(err, AppError::Serialization(ref msg) if msg.contains("status")));
    }

    #[test]
    fn test_non_database_error_is_not_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolClosed));
    }
}
