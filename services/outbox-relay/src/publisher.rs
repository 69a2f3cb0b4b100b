//! Outbox 发布器
//!
//! 按固定间隔轮询 outbox，按 ID 升序把事件交给下游 sink，确认后删除。
//! 未确认的事件在下一次轮询时重新投递（至少一次）。

use std::sync::Arc;
use std::time::Duration;

use config::OutboxConfig;
use errors::{AppError, AppResult};
use ports::{EventSink, OutboxPort};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// 投递成功计数
pub const DELIVERED_COUNTER: &str = "outbox_events_delivered_total";
/// 投递失败计数
pub const FAILURE_COUNTER: &str = "outbox_delivery_failures_total";

/// 发布器配置
#[derive(Debug, Clone)]
pub struct OutboxPublisherConfig {
    /// 轮询间隔
    pub poll_interval: Duration,
    /// 每批最多取出的事件数
    pub batch_size: u32,
}

impl Default for OutboxPublisherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            batch_size: 100,
        }
    }
}

impl TryFrom<&OutboxConfig> for OutboxPublisherConfig {
    type Error = AppError;

    /// 轮询间隔为 0 会让 `interval` panic，批大小为 0 则永远取不到事件
    fn try_from(config: &OutboxConfig) -> AppResult<Self> {
        if config.poll_interval_ms == 0 {
            return Err(AppError::validation("Outbox poll interval must be non-zero"));
        }
        if config.batch_size == 0 {
            return Err(AppError::validation("Outbox batch size must be non-zero"));
        }
        Ok(Self {
            poll_interval: config.poll_interval(),
            batch_size: config.batch_size,
        })
    }
}

/// Outbox 发布器
pub struct OutboxPublisher {
    outbox: Arc<dyn OutboxPort>,
    sink: Arc<dyn EventSink>,
    config: OutboxPublisherConfig,
}

impl OutboxPublisher {
    pub fn new(
        outbox: Arc<dyn OutboxPort>,
        sink: Arc<dyn EventSink>,
        config: OutboxPublisherConfig,
    ) -> Self {
        Self {
            outbox,
            sink,
            config,
        }
    }

    /// 启动后台轮询任务
    ///
    /// 收到取消信号后在两次投递之间停止。
    pub fn start(self: Arc<Self>, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            match self.outbox.pending_count().await {
                Ok(pending) => info!(pending, "Outbox publisher started"),
                Err(e) => warn!(error = %e, "Outbox publisher started, pending count unavailable"),
            }

            let mut ticker = interval(self.config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.process_pending(&shutdown).await {
                            error!(error = %e, "Failed to process outbox events");
                        }
                    }
                    _ = shutdown.cancelled() => {
                        info!("Outbox publisher received shutdown signal");
                        break;
                    }
                }
            }
            info!("Outbox publisher stopped");
        })
    }

    /// 处理一批待投递事件，返回已确认的数量
    ///
    /// 某个事件投递失败时停止本批次，之后的事件不会先于它送达。
    pub async fn process_pending(&self, shutdown: &CancellationToken) -> AppResult<usize> {
        let events = self.outbox.fetch_pending(self.config.batch_size).await?;

        if events.is_empty() {
            return Ok(0);
        }

        debug!(count = events.len(), "Processing pending outbox events");

        let mut delivered = 0;
        for event in &events {
            if shutdown.is_cancelled() {
                break;
            }

            if let Err(e) = self.sink.deliver(event).await {
                metrics::counter!(FAILURE_COUNTER, "event_group" => event.event_group.clone())
                    .increment(1);
                warn!(
                    event_id = event.id,
                    entity_id = %event.entity_id,
                    event_type = %event.event_type,
                    error = %e,
                    "Failed to deliver outbox event, will retry on next poll"
                );
                break;
            }

            self.outbox.acknowledge(event.id).await?;
            metrics::counter!(DELIVERED_COUNTER, "event_group" => event.event_group.clone())
                .increment(1);
            delivered += 1;
        }

        if delivered > 0 {
            info!(
                delivered,
                fetched = events.len(),
                "Outbox events delivered"
            );
        }

        Ok(delivered)
    }
}
