//! 事务管理
//!
//! 仓储与 outbox 的所有方法都接受一个 `PgExecutor`：传入 `&PgPool` 时语句单独提交，
//! 传入 `&mut *tx` 时语句加入调用方持有的事务。`commit` / `rollback` 消费句柄，
//! 未提交就被丢弃的事务会自动回滚。

use std::fmt;

use errors::{AppError, AppResult};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

/// 调用方持有的事务句柄
pub type PgTx = Transaction<'static, Postgres>;

/// 隔离级别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadCommitted,
    #[default]
    RepeatableRead,
    Serializable,
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        })
    }
}

/// 访问模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessMode {
    #[default]
    ReadWrite,
    ReadOnly,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ReadWrite => "READ WRITE",
            Self::ReadOnly => "READ ONLY",
        })
    }
}

/// 事务特性，默认 REPEATABLE READ, READ WRITE
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    pub isolation: IsolationLevel,
    pub access: AccessMode,
}

impl TransactionOptions {
    pub fn with_isolation(mut self, isolation: IsolationLevel) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn with_access(mut self, access: AccessMode) -> Self {
        self.access = access;
        self
    }

    /// 事务内第一条语句
    pub fn set_transaction_sql(&self) -> String {
        format!("SET TRANSACTION ISOLATION LEVEL {}, {}", self.isolation, self.access)
    }
}

/// 事务管理器
///
/// 只负责开启事务，不做隐式重试；出错时由调用方回滚。
#[derive(Clone)]
pub struct TransactionManager {
    pool: PgPool,
    options: TransactionOptions,
}

impl TransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            options: TransactionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn options(&self) -> TransactionOptions {
        self.options
    }

    /// 以管理器的默认特性开启事务
    pub async fn begin(&self) -> AppResult<PgTx> {
        self.begin_with(self.options).await
    }

    pub async fn begin_with(&self, options: TransactionOptions) -> AppResult<PgTx> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query(&options.set_transaction_sql())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to set transaction characteristics: {}", e))
            })?;

        debug!(isolation = %options.isolation, access = %options.access, "Transaction opened");
        Ok(tx)
    }

    pub async fn commit(tx: PgTx) -> AppResult<()> {
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {}", e)))
    }

    pub async fn rollback(tx: PgTx) -> AppResult<()> {
        tx.rollback()
            .await
            .map_err(|e| AppError::database(format!("Failed to rollback transaction: {}", e)))
    }
}
