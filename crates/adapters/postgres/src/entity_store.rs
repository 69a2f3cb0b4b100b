//! PostgreSQL 实体仓储
//!
//! 每种实体一张表，`spec` / `status` 以 JSONB 存储。所有方法接受一个 `PgExecutor`：
//! `&PgPool` 让语句单独提交，`&mut *tx` 让语句加入调用方的事务。
//! 主键唯一性由数据库保证；更新类操作影响 0 行即为 NotFound，没有版本列。

use chrono::{DateTime, Utc};
use common::{DEFAULT_MAX_PAGE_SIZE, Pagination};
use domain_core::{Entity, EntityKind, ListFilter};
use errors::{AppError, AppResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use tracing::debug;

use crate::error_mapper::map_sqlx_error;
use crate::filter::FilterCompiler;

const COLUMNS: &str = "id, spec, status, deletionmark, created, updated";

/// 实体表行
#[derive(Debug, sqlx::FromRow)]
struct EntityRow {
    id: String,
    spec: serde_json::Value,
    status: Option<serde_json::Value>,
    deletionmark: bool,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl EntityRow {
    fn into_entity<K: EntityKind>(self) -> AppResult<Entity<K>> {
        let spec = decode(self.spec, &self.id, "spec")?;
        let status = match self.status {
            Some(serde_json::Value::Null) | None => K::Status::default(),
            Some(value) => decode(value, &self.id, "status")?,
        };
        Ok(Entity {
            id: self.id,
            deletion_mark: self.deletionmark,
            created_at: self.created,
            updated_at: self.updated,
            spec,
            status,
        })
    }
}

fn encode<T: Serialize>(value: &T, id: &str, field: &str) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| {
        AppError::serialization(format!("Failed to serialize {} of \"{}\": {}", field, id, e))
    })
}

fn decode<T: DeserializeOwned>(value: serde_json::Value, id: &str, field: &str) -> AppResult<T> {
    serde_json::from_value(value).map_err(|e| {
        AppError::serialization(format!("Failed to deserialize {} of \"{}\": {}", field, id, e))
    })
}

/// PostgreSQL 实体仓储
pub struct PostgresEntityStore<K: EntityKind> {
    filters: FilterCompiler<K>,
    max_page_size: u32,
}

impl<K: EntityKind> Default for PostgresEntityStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EntityKind> PostgresEntityStore<K> {
    pub fn new() -> Self {
        Self {
            filters: FilterCompiler::new(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    /// 设置最大页大小
    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    pub fn max_page_size(&self) -> u32 {
        self.max_page_size
    }

    /// 插入新实体，ID 已存在时返回 AlreadyExist
    pub async fn save<'e, E>(&self, executor: E, entity: &Entity<K>) -> AppResult<Entity<K>>
    where
        E: PgExecutor<'e>,
    {
        let spec = encode(&entity.spec, &entity.id, "spec")?;
        let status = encode(&entity.status, &entity.id, "status")?;
        let now = common::now();

        let sql = format!(
            "INSERT INTO {} (id, spec, status, deletionmark, created, updated) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {}",
            K::TABLE,
            COLUMNS
        );
        let row = sqlx::query_as::<_, EntityRow>(&sql)
            .bind(&entity.id)
            .bind(spec)
            .bind(status)
            .bind(entity.deletion_mark)
            .bind(now)
            .fetch_one(executor)
            .await
            .map_err(|e| map_sqlx_error(e, &entity.id))?;

        debug!(table = K::TABLE, entity_id = %entity.id, "Entity saved");
        row.into_entity()
    }

    /// 按 ID 读取实体
    pub async fn get<'e, E>(&self, executor: E, id: &str) -> AppResult<Entity<K>>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", COLUMNS, K::TABLE);
        let row = sqlx::query_as::<_, EntityRow>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(|e| map_sqlx_error(e, id))?
            .ok_or_else(|| AppError::not_found(id))?;

        row.into_entity()
    }

    /// 按过滤条件分页列出实体，按 ID 升序
    ///
    /// 页大小超过上限时按上限截断；没有匹配时返回空列表。
    pub async fn list<'e, E>(
        &self,
        executor: E,
        filter: &dyn ListFilter,
        pagination: Pagination,
    ) -> AppResult<Vec<Entity<K>>>
    where
        E: PgExecutor<'e>,
    {
        let pagination = Pagination::new(pagination.page, pagination.size.min(self.max_page_size));

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM {}", COLUMNS, K::TABLE));
        self.filters.push_where(&mut qb, filter);
        qb.push(" ORDER BY id ASC LIMIT ");
        qb.push_bind(pagination.limit());
        qb.push(" OFFSET ");
        qb.push_bind(pagination.offset());

        let rows = qb
            .build_query_as::<EntityRow>()
            .fetch_all(executor)
            .await
            .map_err(|e| map_sqlx_error(e, K::TABLE))?;

        debug!(
            table = K::TABLE,
            page = pagination.page,
            size = pagination.size,
            count = rows.len(),
            "Entities listed"
        );

        rows.into_iter().map(EntityRow::into_entity).collect()
    }

    /// 统计匹配过滤条件的实体数量
    pub async fn count<'e, E>(&self, executor: E, filter: &dyn ListFilter) -> AppResult<u64>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", K::TABLE));
        self.filters.push_where(&mut qb, filter);

        let (count,): (i64,) = qb
            .build_query_as()
            .fetch_one(executor)
            .await
            .map_err(|e| map_sqlx_error(e, K::TABLE))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// 覆盖 spec 与 status，ID 不存在时返回 NotFound
    pub async fn update<'e, E>(&self, executor: E, entity: &Entity<K>) -> AppResult<Entity<K>>
    where
        E: PgExecutor<'e>,
    {
        let spec = encode(&entity.spec, &entity.id, "spec")?;
        let status = encode(&entity.status, &entity.id, "status")?;

        let sql = format!(
            "UPDATE {} SET spec = $2, status = $3, updated = $4 WHERE id = $1 RETURNING {}",
            K::TABLE,
            COLUMNS
        );
        let row = sqlx::query_as::<_, EntityRow>(&sql)
            .bind(&entity.id)
            .bind(spec)
            .bind(status)
            .bind(common::now())
            .fetch_optional(executor)
            .await
            .map_err(|e| map_sqlx_error(e, &entity.id))?
            .ok_or_else(|| AppError::not_found(&entity.id))?;

        debug!(table = K::TABLE, entity_id = %entity.id, "Entity updated");
        row.into_entity()
    }

    /// 只覆盖 status，ID 不存在时返回 NotFound
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: &str,
        status: &K::Status,
    ) -> AppResult<Entity<K>>
    where
        E: PgExecutor<'e>,
    {
        let status = encode(status, id, "status")?;

        let sql = format!(
            "UPDATE {} SET status = $2, updated = $3 WHERE id = $1 RETURNING {}",
            K::TABLE,
            COLUMNS
        );
        let row = sqlx::query_as::<_, EntityRow>(&sql)
            .bind(id)
            .bind(status)
            .bind(common::now())
            .fetch_optional(executor)
            .await
            .map_err(|e| map_sqlx_error(e, id))?
            .ok_or_else(|| AppError::not_found(id))?;

        debug!(table = K::TABLE, entity_id = %id, "Entity status updated");
        row.into_entity()
    }

    /// 物理删除，ID 不存在时返回 NotFound
    pub async fn delete<'e, E>(&self, executor: E, id: &str) -> AppResult<()>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("DELETE FROM {} WHERE id = $1", K::TABLE);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| map_sqlx_error(e, id))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(id));
        }

        debug!(table = K::TABLE, entity_id = %id, "Entity deleted");
        Ok(())
    }

    /// 设置软删除标记，ID 不存在时返回 NotFound
    pub async fn set_deletion_mark<'e, E>(&self, executor: E, id: &str, value: bool) -> AppResult<()>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "UPDATE {} SET deletionmark = $2, updated = $3 WHERE id = $1",
            K::TABLE
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(value)
            .bind(common::now())
            .execute(executor)
            .await
            .map_err(|e| map_sqlx_error(e, id))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(id));
        }

        debug!(table = K::TABLE, entity_id = %id, deletion_mark = value, "Deletion mark set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_core::{Connection, ConnectionSpec, ConnectionStatus};

    fn row(spec: serde_json::Value, status: Option<serde_json::Value>) -> EntityRow {
        let now = common::now();
        EntityRow {
            id: "conn-1".to_string(),
            spec,
            status,
            deletionmark: true,
            created: now,
            updated: now,
        }
    }

    #[test]
    fn test_row_into_entity() {
        let spec = ConnectionSpec {
            connection_type: "git".to_string(),
            uri: "git@github.com:org/repo.git".to_string(),
            ..Default::default()
        };
        let entity: Entity<Connection> = row(serde_json::to_value(&spec).unwrap(), None)
            .into_entity()
            .unwrap();

        assert_eq!(entity.id, "conn-1");
        assert!(entity.deletion_mark);
        assert_eq!(entity.spec, spec);
        assert_eq!(entity.status, ConnectionStatus::default());
    }

    #[test]
    fn test_row_with_malformed_spec() {
        let result = row(serde_json::json!([1, 2, 3]), None).into_entity::<Connection>();
        assert!(matches!(result, Err(AppError::Serialization(_))));
    }

    #[test]
    fn test_default_max_page_size() {
        let store = PostgresEntityStore::<Connection>::new();
        assert_eq!(store.max_page_size(), DEFAULT_MAX_PAGE_SIZE);
        assert_eq!(store.with_max_page_size(10).max_page_size(), 10);
    }
}
