//! 日志 sink
//!
//! 未接入消息总线时使用，把事件信封写入日志后直接确认。

use async_trait::async_trait;
use errors::AppResult;
use event_core::OutboxEvent;
use ports::EventSink;
use tracing::info;

pub struct LogSink;

#[async_trait]
impl EventSink for LogSink {
    async fn deliver(&self, event: &OutboxEvent) -> AppResult<()> {
        info!(
            event_id = event.id,
            entity_id = %event.entity_id,
            event_type = %event.event_type,
            event_group = %event.event_group,
            datetime = %event.datetime,
            dedup_key = %event.dedup_key(),
            "Outbox event: {}",
            event.event_type
        );
        Ok(())
    }
}
