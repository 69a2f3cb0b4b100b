//! Schema 迁移
//!
//! 内置迁移创建 outbox 表和每种实体的表

use std::collections::HashMap;

use domain_core::{Connection, Deployment, EntityKind, Packaging, Training};
use errors::{AppError, AppResult};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::outbox::OUTBOX_TABLE;

/// 默认迁移表名
pub const MIGRATION_TABLE: &str = "_modelhub_migrations";

/// 一个版本化的 DDL 脚本
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub name: String,
    /// 可包含多条语句
    pub sql: String,
    /// SQL 的 SHA-256 十六进制
    pub checksum: String,
}

impl Migration {
    pub fn new(version: i64, name: impl Into<String>, sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let checksum = hex::encode(Sha256::digest(sql.as_bytes()));
        Self {
            version,
            name: name.into(),
            sql,
            checksum,
        }
    }
}

/// 实体表 DDL
fn entity_table_sql<K: EntityKind>() -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id TEXT PRIMARY KEY,
            spec JSONB NOT NULL,
            status JSONB NOT NULL DEFAULT '{{}}'::jsonb,
            deletionmark BOOLEAN NOT NULL DEFAULT FALSE,
            created TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
        table = K::TABLE
    )
}

/// 内置迁移：outbox 表与四种实体表
pub fn core_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "create_outbox",
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id BIGSERIAL PRIMARY KEY,
                    entity_id TEXT NOT NULL,
                    event_type TEXT NOT NULL,
                    event_group TEXT NOT NULL,
                    datetime TIMESTAMPTZ NOT NULL,
                    payload JSONB NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_{table}_entity_group
                    ON {table} (entity_id, event_group);
                "#,
                table = OUTBOX_TABLE
            ),
        ),
        Migration::new(2, "create_training", entity_table_sql::<Training>()),
        Migration::new(3, "create_packaging", entity_table_sql::<Packaging>()),
        Migration::new(4, "create_deployment", entity_table_sql::<Deployment>()),
        Migration::new(5, "create_connection", entity_table_sql::<Connection>()),
    ]
}

/// 迁移执行器
///
/// 每个迁移在独立事务中执行，并把版本与校验和记录到迁移表。
pub struct MigrationManager {
    pool: PgPool,
    table: String,
}

impl MigrationManager {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            table: MIGRATION_TABLE.to_string(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    async fn ensure_table(&self) -> AppResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                version BIGINT PRIMARY KEY,
                name TEXT NOT NULL,
                checksum TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
            self.table
        );
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create {}: {}", self.table, e)))?;
        Ok(())
    }

    /// 已记录的版本 → 校验和
    pub async fn applied(&self) -> AppResult<HashMap<i64, String>> {
        self.ensure_table().await?;

        let sql = format!("SELECT version, checksum FROM {}", self.table);
        let rows: Vec<(i64, String)> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to read {}: {}", self.table, e)))?;

        Ok(rows.into_iter().collect())
    }

    async fn apply(&self, migration: &Migration) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        sqlx::raw_sql(&migration.sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let record = format!(
            "INSERT INTO {} (version, name, checksum) VALUES ($1, $2, $3)",
            self.table
        );
        sqlx::query(&record)
            .bind(migration.version)
            .bind(&migration.name)
            .bind(&migration.checksum)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        info!(version = migration.version, name = %migration.name, "Migration applied");
        Ok(())
    }

    /// 按版本顺序执行未记录的迁移
    ///
    /// 已记录但校验和不同的迁移记为错误并跳过；执行失败时停止，不再尝试更高版本。
    pub async fn migrate(&self, migrations: &[Migration]) -> AppResult<MigrationResult> {
        let applied = self.applied().await?;
        let mut result = MigrationResult::default();

        let mut pending: Vec<&Migration> = migrations.iter().collect();
        pending.sort_by_key(|m| m.version);

        for migration in pending {
            match applied.get(&migration.version) {
                Some(checksum) if *checksum == migration.checksum => {
                    result.skipped.push(migration.version);
                }
                Some(_) => {
                    warn!(
                        version = migration.version,
                        name = %migration.name,
                        "Migration checksum mismatch"
                    );
                    result.errors.push(MigrationError::new(
                        migration,
                        "checksum mismatch, migration was modified after being applied",
                    ));
                }
                None => match self.apply(migration).await {
                    Ok(()) => result.applied.push(migration.version),
                    Err(e) => {
                        result.errors.push(MigrationError::new(migration, e.to_string()));
                        break;
                    }
                },
            }
        }

        Ok(result)
    }
}

/// 一次 `migrate` 的结果
#[derive(Debug, Clone, Default)]
pub struct MigrationResult {
    pub applied: Vec<i64>,
    pub skipped: Vec<i64>,
    pub errors: Vec<MigrationError>,
}

impl MigrationResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// 转为错误，便于启动时直接 `?`
    pub fn into_result(self) -> AppResult<Self> {
        match self.errors.first() {
            None => Ok(self),
            Some(e) => Err(AppError::database(format!(
                "Migration {} ({}) failed: {}",
                e.version, e.name, e.error
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MigrationError {
    pub version: i64,
    pub name: String,
    pub error: String,
}

impl MigrationError {
    fn new(migration: &Migration, error: impl Into<String>) -> Self {
        Self {
            version: migration.version,
            name: migration.name.clone(),
            error: error.into(),
        }
    }
}
