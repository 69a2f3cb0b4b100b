//! 模型部署

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Entity, EntityKind, FilterField, ListFilter, ResourceRequirements};

/// 模型部署实体种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deployment;

pub type ModelDeployment = Entity<Deployment>;

impl EntityKind for Deployment {
    const TABLE: &'static str = "modelhub_deployment";
    const EVENT_GROUP: &'static str = "ModelDeployment";
    const FILTER_FIELDS: &'static [FilterField] = &[
        FilterField::new("roles", "spec->>'roleName'"),
        FilterField::new("image", "spec->>'image'"),
        FilterField::new("state", "status->>'state'"),
    ];

    type Spec = ModelDeploymentSpec;
    type Status = ModelDeploymentStatus;
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDeploymentSpec {
    /// 模型服务镜像
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(default = "default_min_replicas")]
    pub min_replicas: u32,
    #[serde(default = "default_max_replicas")]
    pub max_replicas: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_conn_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,
}

fn default_min_replicas() -> u32 {
    0
}

fn default_max_replicas() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentState {
    #[default]
    Processing,
    Ready,
    Failed,
    Deleting,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDeploymentStatus {
    #[serde(default)]
    pub state: DeploymentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default)]
    pub available_replicas: u32,
    #[serde(default)]
    pub replicas: u32,
}

#[derive(Debug, Clone, Default)]
pub struct DeploymentFilter {
    pub roles: Vec<String>,
    pub image: Vec<String>,
    pub state: Vec<String>,
}

impl ListFilter for DeploymentFilter {
    fn populated(&self) -> Vec<(&str, &[String])> {
        [
            ("roles", self.roles.as_slice()),
            ("image", self.image.as_slice()),
            ("state", self.state.as_slice()),
        ]
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .collect()
    }
}
