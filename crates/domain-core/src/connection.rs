//! 外部连接（对象存储、镜像仓库、Git 等）

use serde::{Deserialize, Serialize};

use crate::{Entity, EntityKind, FilterField, ListFilter};

/// 连接实体种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Connection;

pub type ConnectionEntity = Entity<Connection>;

impl EntityKind for Connection {
    const TABLE: &'static str = "modelhub_connection";
    const EVENT_GROUP: &'static str = "Connection";
    const FILTER_FIELDS: &'static [FilterField] =
        &[FilterField::new("type", "spec->>'type'")];

    type Spec = ConnectionSpec;
    type Status = ConnectionStatus;
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSpec {
    /// s3, gcs, azureblob, git, docker, ecr ...
    #[serde(rename = "type")]
    pub connection_type: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// 由密钥管理服务解析的引用，不保存明文
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_ui_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionFilter {
    pub connection_type: Vec<String>,
}

impl ListFilter for ConnectionFilter {
    fn populated(&self) -> Vec<(&str, &[String])> {
        if self.connection_type.is_empty() {
            return Vec::new();
        }
        vec![("type", self.connection_type.as_slice())]
    }
}
