//! Outbox trait 定义

use async_trait::async_trait;
use errors::AppResult;
use event_core::OutboxEvent;

/// 发布器侧的 outbox 存储
#[async_trait]
pub trait OutboxPort: Send + Sync {
    /// 按 ID 升序取出最早的未投递事件
    async fn fetch_pending(&self, limit: u32) -> AppResult<Vec<OutboxEvent>>;

    /// 确认投递，删除事件
    ///
    /// 事件已不存在时视为成功。
    async fn acknowledge(&self, id: i64) -> AppResult<()>;

    /// 未投递事件数量
    async fn pending_count(&self) -> AppResult<u64>;
}
