//! 实体基础类型

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::FilterField;

/// 实体种类
///
/// 每种实体对应一张表。表名、事件分组与过滤字段白名单在这里静态注册，
/// 仓储与过滤编译器只从这里读取列名。
pub trait EntityKind: Send + Sync + 'static {
    /// 表名
    const TABLE: &'static str;

    /// Outbox 事件分组
    const EVENT_GROUP: &'static str;

    /// 可过滤属性 → 存储列表达式
    const FILTER_FIELDS: &'static [FilterField];

    /// 期望配置
    type Spec: Serialize + DeserializeOwned + Debug + Clone + PartialEq + Send + Sync + Unpin;

    /// 观测状态
    type Status: Serialize
        + DeserializeOwned
        + Debug
        + Clone
        + PartialEq
        + Default
        + Send
        + Sync
        + Unpin;
}

/// 实体记录
///
/// `id` 在表内唯一且创建后不可变，唯一性由数据库主键保证。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct Entity<K: EntityKind> {
    pub id: String,
    #[serde(default)]
    pub deletion_mark: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub spec: K::Spec,
    #[serde(default)]
    pub status: K::Status,
}

impl<K: EntityKind> Entity<K> {
    /// 创建新实体，状态为默认值
    pub fn new(id: impl Into<String>, spec: K::Spec) -> Self {
        let now = common::now();
        Self {
            id: id.into(),
            deletion_mark: false,
            created_at: now,
            updated_at: now,
            spec,
            status: K::Status::default(),
        }
    }

    pub fn with_status(mut self, status: K::Status) -> Self {
        self.status = status;
        self
    }

    /// 刷新更新时间
    pub fn touch(&mut self) {
        self.updated_at = common::now();
    }

    /// 比较除时间戳外的字段
    pub fn same_content(&self, other: &Self) -> bool {
        self.id == other.id
            && self.deletion_mark == other.deletion_mark
            && self.spec == other.spec
            && self.status == other.status
    }
}
