//! 下游事件 sink trait 定义

use async_trait::async_trait;
use errors::AppResult;
use event_core::OutboxEvent;

/// 外部消息总线客户端
///
/// 返回 `Ok` 即表示下游已确认收到；同一事件可能被重复投递，去重由实现方负责。
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, event: &OutboxEvent) -> AppResult<()>;
}
