//! 模型打包

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Entity, EntityKind, FilterField, ListFilter, ResourceRequirements};

/// 模型打包实体种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Packaging;

pub type ModelPackaging = Entity<Packaging>;

impl EntityKind for Packaging {
    const TABLE: &'static str = "modelhub_packaging";
    const EVENT_GROUP: &'static str = "ModelPackaging";
    const FILTER_FIELDS: &'static [FilterField] = &[
        FilterField::new("integration_name", "spec->>'integrationName'"),
        FilterField::new("artifact_name", "spec->>'artifactName'"),
        FilterField::new("state", "status->>'state'"),
    ];

    type Spec = ModelPackagingSpec;
    type Status = ModelPackagingStatus;
}

/// 打包目标（例如推送镜像的 docker registry connection）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub name: String,
    pub connection_name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPackagingSpec {
    /// 训练产物名称
    pub artifact_name: String,
    /// 打包集成 ID
    pub integration_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// 由具体打包集成解释
    #[serde(default)]
    pub arguments: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_connection: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackagingState {
    #[default]
    Unknown,
    Scheduling,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingResult {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPackagingStatus {
    #[serde(default)]
    pub state: PackagingState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Vec<PackagingResult>,
}

#[derive(Debug, Clone, Default)]
pub struct PackagingFilter {
    pub integration_name: Vec<String>,
    pub artifact_name: Vec<String>,
    pub state: Vec<String>,
}

impl ListFilter for PackagingFilter {
    fn populated(&self) -> Vec<(&str, &[String])> {
        [
            ("integration_name", self.integration_name.as_slice()),
            ("artifact_name", self.artifact_name.as_slice()),
            ("state", self.state.as_slice()),
        ]
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .collect()
    }
}
