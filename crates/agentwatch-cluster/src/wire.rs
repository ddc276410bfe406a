//! JSON bodies exchanged with the cluster gateway.

use serde::{Deserialize, Serialize};

use agentwatch_core::{InstanceDetail, InstanceRef, Tag};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContainerInstancesResponse {
    #[serde(default)]
    pub container_instance_arns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeContainerInstancesRequest {
    pub container_instances: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeContainerInstancesResponse {
    #[serde(default)]
    pub container_instances: Vec<ContainerInstance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInstance {
    pub container_instance_arn: String,
    pub ec2_instance_id: String,
    pub agent_connected: bool,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl From<ContainerInstance> for InstanceDetail {
    fn from(ci: ContainerInstance) -> Self {
        InstanceDetail {
            instance_ref: InstanceRef(ci.container_instance_arn),
            ec2_id: ci.ec2_instance_id,
            agent_connected: ci.agent_connected,
            tags: ci.tags,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachInstancesRequest {
    pub instance_ids: Vec<String>,
    pub auto_scaling_group_name: String,
    pub should_decrement_desired_capacity: bool,
}
