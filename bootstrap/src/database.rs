//! 数据库初始化

use adapter_postgres::{
    MigrationManager, PostgresConfig, PostgresEntityStore, PostgresOutbox, core_migrations,
    create_pool,
};
use config::{DatabaseConfig, OutboxConfig, PaginationConfig};
use domain_core::EntityKind;
use errors::AppResult;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

/// 由配置构造连接池参数
pub fn postgres_config(config: &DatabaseConfig) -> PostgresConfig {
    PostgresConfig::new(config.url.expose_secret())
        .with_max_connections(config.max_connections)
        .with_min_connections(config.min_connections)
        .with_connect_timeout(config.connect_timeout())
}

/// 创建连接池并应用内置迁移
///
/// 连接失败立即返回错误，不做重试。
pub async fn init_database(config: &DatabaseConfig) -> AppResult<PgPool> {
    let pool = create_pool(&postgres_config(config)).await?;

    let result = MigrationManager::new(pool.clone())
        .migrate(&core_migrations())
        .await?
        .into_result()?;

    info!(
        applied = result.applied_count(),
        skipped = result.skipped.len(),
        "Database schema up to date"
    );

    Ok(pool)
}

/// 按分页配置构造实体仓储
pub fn entity_store<K: EntityKind>(config: &PaginationConfig) -> PostgresEntityStore<K> {
    PostgresEntityStore::new().with_max_page_size(config.max_page_size)
}

/// 按 outbox 配置构造事件存储，`compact_superseded` 决定是否压缩旧事件
pub fn outbox(pool: PgPool, config: &OutboxConfig) -> PostgresOutbox {
    PostgresOutbox::new(pool).with_compaction(config.compact_superseded)
}
