//! modelhub-errors - 统一错误处理
//!
//! 持久化核心对外暴露的错误分类。上层 API 负责把这些分类映射为传输层状态码，
//! 这里只保证每种情况都可以被区分。

use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 实体不存在（按 ID 查找或更新时零行命中）
    #[error("entity \"{0}\" is not found")]
    NotFound(String),

    /// 主键冲突
    #[error("entity \"{0}\" already exists")]
    AlreadyExist(String),

    /// 负载序列化 / 反序列化失败
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// 其余存储引擎错误（连接、超时、取消等）
    #[error("Database error: {0}")]
    Database(String),

    /// 下游 sink 拒绝或未确认
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound(entity.into())
    }

    pub fn already_exist(entity: impl Into<String>) -> Self {
        Self::AlreadyExist(entity.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn external_service(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 是否为调用方可恢复的业务冲突（而非基础设施故障）
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::AlreadyExist(_))
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::AlreadyExist(_) => 409,
            Self::Serialization(_) => 500,
            Self::Validation(_) => 400,
            Self::Database(_) => 500,
            Self::ExternalService(_) => 502,
            Self::Internal(_) => 500,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::not_found("foo").status_code(), 404);
        assert_eq!(AppError::already_exist("foo").status_code(), 409);
        assert_eq!(AppError::serialization("bad").status_code(), 500);
        assert_eq!(AppError::validation("page").status_code(), 400);
        assert_eq!(AppError::database("down").status_code(), 500);
        assert_eq!(AppError::external_service("bus").status_code(), 502);
    }

    #[test]
    fn test_messages_name_the_entity() {
        assert_eq!(
            AppError::not_found("train-1").to_string(),
            "entity \"train-1\" is not found"
        );
        assert_eq!(
            AppError::already_exist("train-1").to_string(),
            "entity \"train-1\" already exists"
        );
    }

    #[test]
    fn test_conflict_kinds() {
        assert!(AppError::not_found("x").is_conflict());
        assert!(AppError::already_exist("x").is_conflict());
        assert!(!AppError::database("x").is_conflict());
    }

    #[test]
    fn test_from_serde_json() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
