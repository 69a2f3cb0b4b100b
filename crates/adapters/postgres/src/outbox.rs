//! PostgreSQL Outbox 实现
//!
//! 写入端：`publish_event` 与实体变更共用同一个执行器，在调用方事务中原子写入。
//! 读取端：`OutboxPort` 按自增 ID 升序取出待投递事件，下游确认后删除。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use errors::{AppError, AppResult};
use event_core::{Event, EventType, OutboxEvent};
use ports::OutboxPort;
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};
use tracing::debug;

use crate::error_mapper::map_sqlx_error;

/// Outbox 表名
pub const OUTBOX_TABLE: &str = "modelhub_outbox";

/// PostgreSQL Outbox
#[derive(Clone)]
pub struct PostgresOutbox {
    pool: PgPool,
    compact_superseded: bool,
}

impl PostgresOutbox {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            compact_superseded: false,
        }
    }

    /// 写入事件前删除同一实体、同一分组中尚未投递的旧事件
    ///
    /// 下游只会看到每个实体的最新状态，不再保证同一实体的每个事件都被投递。
    pub fn with_compaction(mut self, enabled: bool) -> Self {
        self.compact_superseded = enabled;
        self
    }

    pub fn compacts_superseded(&self) -> bool {
        self.compact_superseded
    }

    /// 追加一条事件，返回分配的 ID
    ///
    /// 传入事务连接时与调用方之前的变更一起提交或回滚；传入连接池时立即提交。
    pub async fn publish_event<'e, E, P>(&self, executor: E, event: &Event<P>) -> AppResult<i64>
    where
        E: PgExecutor<'e>,
        P: Serialize,
    {
        let payload = event.encode_payload()?;

        let sql = if self.compact_superseded {
            format!(
                "WITH superseded AS (
                    DELETE FROM {table} WHERE entity_id = $1 AND event_group = $3
                )
                INSERT INTO {table} (entity_id, event_type, event_group, datetime, payload)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id",
                table = OUTBOX_TABLE
            )
        } else {
            format!(
                "INSERT INTO {} (entity_id, event_type, event_group, datetime, payload)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id",
                OUTBOX_TABLE
            )
        };

        let (id,): (i64,) = sqlx::query_as(&sql)
            .bind(&event.entity_id)
            .bind(event.event_type.as_str())
            .bind(&event.event_group)
            .bind(event.datetime)
            .bind(payload)
            .fetch_one(executor)
            .await
            .map_err(|e| map_sqlx_error(e, OUTBOX_TABLE))?;

        debug!(
            event_id = id,
            entity_id = %event.entity_id,
            event_type = %event.event_type,
            event_group = %event.event_group,
            "Event appended to outbox"
        );

        Ok(id)
    }
}

#[async_trait]
impl OutboxPort for PostgresOutbox {
    async fn fetch_pending(&self, limit: u32) -> AppResult<Vec<OutboxEvent>> {
        let sql = format!(
            "SELECT id, entity_id, event_type, event_group, datetime, payload
            FROM {}
            ORDER BY id ASC
            LIMIT $1",
            OUTBOX_TABLE
        );
        let rows = sqlx::query_as::<_, OutboxRow>(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, OUTBOX_TABLE))?;

        rows.into_iter().map(OutboxEvent::try_from).collect()
    }

    async fn acknowledge(&self, id: i64) -> AppResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", OUTBOX_TABLE);
        sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, OUTBOX_TABLE))?;

        Ok(())
    }

    async fn pending_count(&self) -> AppResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", OUTBOX_TABLE);
        let (count,): (i64,) = sqlx::query_as(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, OUTBOX_TABLE))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

#[derive(sqlx::FromRow)]
struct OutboxRow {
    id: i64,
    entity_id: String,
    event_type: String,
    event_group: String,
    datetime: DateTime<Utc>,
    payload: serde_json::Value,
}

impl TryFrom<OutboxRow> for OutboxEvent {
    type Error = AppError;

    fn try_from(row: OutboxRow) -> AppResult<Self> {
        Ok(Self {
            id: row.id,
            entity_id: row.entity_id,
            event_type: row.event_type.parse::<EventType>()?,
            event_group: row.event_group,
            datetime: row.datetime,
            payload: row.payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(event_type: &str) -> OutboxRow {
        OutboxRow {
            id: 42,
            entity_id: "wine-12".to_string(),
            event_type: event_type.to_string(),
            event_group: "ModelTraining".to_string(),
            datetime: common::now(),
            payload: serde_json::json!({"id": "wine-12"}),
        }
    }

    #[test]
    fn test_row_into_event() {
        let event = OutboxEvent::try_from(row("Delete")).unwrap();
        assert_eq!(event.id, 42);
        assert_eq!(event.event_type, EventType::Delete);
        assert_eq!(event.event_group, "ModelTraining");
    }

    #[test]
    fn test_row_with_unknown_event_type() {
        let result = OutboxEvent::try_from(row("Archive"));
        assert!(matches!(result, Err(AppError::Serialization(_))));
    }
}
