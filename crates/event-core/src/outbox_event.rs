//! Outbox 中存储的事件记录

use chrono::{DateTime, Utc};
use errors::{AppError, AppResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::EventType;

/// 已提交的 outbox 事件
///
/// `id` 由数据库在插入时分配，单调递增，是投递顺序与发布游标。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEvent {
    pub id: i64,
    pub entity_id: String,
    pub event_type: EventType,
    pub event_group: String,
    pub datetime: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl OutboxEvent {
    /// 反序列化负载
    pub fn payload_as<T: DeserializeOwned>(&self) -> AppResult<T> {
        serde_json::from_value(self.payload.clone()).map_err(|e| {
            AppError::serialization(format!(
                "Failed to deserialize payload of outbox event {}: {}",
                self.id, e
            ))
        })
    }

    /// 下游去重键
    pub fn dedup_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.event_group,
            self.entity_id,
            self.event_type,
            self.datetime.timestamp_micros()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct CustomPayload {
        name: String,
    }

    fn event() -> OutboxEvent {
        OutboxEvent {
            id: 7,
            entity_id: "CustomID".to_string(),
            event_type: EventType::Create,
            event_group: "CustomEventGroup".to_string(),
            datetime: common::now(),
            payload: serde_json::json!({"name": "test"}),
        }
    }

    #[test]
    fn test_payload_round_trip() {
        let payload: CustomPayload = event().payload_as().unwrap();
        assert_eq!(
            payload,
            CustomPayload {
                name: "test".to_string()
            }
        );
    }

    #[test]
    fn test_payload_type_mismatch() {
        let result: AppResult<Vec<u32>> = event().payload_as();
        assert!(matches!(result, Err(AppError::Serialization(_))));
    }

    #[test]
    fn test_dedup_key_stable_across_redelivery() {
        let e = event();
        let redelivered = e.clone();
        assert_eq!(e.dedup_key(), redelivered.dedup_key());
        assert!(e.dedup_key().starts_with("CustomEventGroup:CustomID:Create:"));
    }
}
