//! 模型训练

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Entity, EntityKind, FilterField, ListFilter};

/// 模型训练实体种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Training;

pub type ModelTraining = Entity<Training>;

impl EntityKind for Training {
    const TABLE: &'static str = "modelhub_training";
    const EVENT_GROUP: &'static str = "ModelTraining";
    const FILTER_FIELDS: &'static [FilterField] = &[
        FilterField::new("toolchain", "spec->>'toolchain'"),
        FilterField::new("model_name", "spec->'model'->>'name'"),
        FilterField::new("model_version", "spec->'model'->>'version'"),
        FilterField::new("state", "status->>'state'"),
    ];

    type Spec = ModelTrainingSpec;
    type Status = ModelTrainingStatus;
}

/// 模型标识
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelIdentity {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_name_template: Option<String>,
}

/// 训练数据绑定
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBinding {
    /// connection ID
    pub conn_name: String,
    pub local_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
}

/// 资源需求（与 k8s 格式一致）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelTrainingSpec {
    pub model: ModelIdentity,
    /// 训练工具链集成 ID
    pub toolchain: String,
    pub entrypoint: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub hyper_parameters: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub data: Vec<DataBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_connection: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingState {
    #[default]
    Unknown,
    Scheduling,
    Running,
    Succeeded,
    Failed,
}

/// 训练产物
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResult {
    pub artifact_name: String,
    pub commit_id: String,
    pub run_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelTrainingStatus {
    #[serde(default)]
    pub state: TrainingState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub artifacts: Vec<TrainingResult>,
}

/// 训练列表过滤
#[derive(Debug, Clone, Default)]
pub struct TrainingFilter {
    pub toolchain: Vec<String>,
    pub model_name: Vec<String>,
    pub model_version: Vec<String>,
    pub state: Vec<String>,
}

impl ListFilter for TrainingFilter {
    fn populated(&self) -> Vec<(&str, &[String])> {
        [
            ("toolchain", self.toolchain.as_slice()),
            ("model_name", self.model_name.as_slice()),
            ("model_version", self.model_version.as_slice()),
            ("state", self.state.as_slice()),
        ]
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_registers_every_populated_attribute() {
        let filter = TrainingFilter {
            toolchain: vec!["mlflow".to_string()],
            model_name: vec!["wine".to_string()],
            model_version: vec!["1.0".to_string()],
            state: vec!["running".to_string()],
        };
        for (attribute, _) in filter.populated() {
            assert!(
                Training::FILTER_FIELDS.iter().any(|f| f.attribute == attribute),
                "attribute {} is not registered",
                attribute
            );
        }
    }

    #[test]
    fn test_status_state_serializes_lowercase() {
        let status = ModelTrainingStatus {
            state: TrainingState::Succeeded,
            ..Default::default()
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["state"], "succeeded");
    }
}
