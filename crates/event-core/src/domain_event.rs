//! 实体变更事件定义

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use domain_core::{Entity, EntityKind};
use errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Create,
    Update,
    Delete,
}

impl EventType {
    /// 转换为存储字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Create => "Create",
            EventType::Update => "Update",
            EventType::Delete => "Delete",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Create" => Ok(EventType::Create),
            "Update" => Ok(EventType::Update),
            "Delete" => Ok(EventType::Delete),
            other => Err(AppError::serialization(format!(
                "unknown event type: {}",
                other
            ))),
        }
    }
}

/// 待写入 outbox 的事件
///
/// `entity_id + event_type + event_group + datetime` 足以让下游对重复投递去重。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event<P = serde_json::Value> {
    pub entity_id: String,
    pub event_type: EventType,
    pub event_group: String,
    pub datetime: DateTime<Utc>,
    pub payload: P,
}

impl<P> Event<P> {
    pub fn new(
        entity_id: impl Into<String>,
        event_type: EventType,
        event_group: impl Into<String>,
        payload: P,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            event_type,
            event_group: event_group.into(),
            datetime: common::now(),
            payload,
        }
    }

    pub fn with_datetime(mut self, datetime: DateTime<Utc>) -> Self {
        self.datetime = common::truncate_micros(datetime);
        self
    }
}

impl<P: Serialize> Event<P> {
    /// 序列化负载
    pub fn encode_payload(&self) -> AppResult<serde_json::Value> {
        serde_json::to_value(&self.payload)
            .map_err(|e| AppError::serialization(format!("Failed to serialize payload: {}", e)))
    }
}

impl<'a, K: EntityKind> Event<&'a Entity<K>> {
    /// 以实体快照为负载构造事件，分组取自实体种类
    pub fn for_entity(event_type: EventType, entity: &'a Entity<K>) -> Self {
        Event::new(entity.id.clone(), event_type, K::EVENT_GROUP, entity)
    }
}
