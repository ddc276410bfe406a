//! HTTP client for the cluster gateway.

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use agentwatch_core::{ClusterInventory, InstanceController, InstanceDetail, InstanceRef, Page};

use crate::error::GatewayError;
use crate::wire::*;

/// Cluster inventory and instance controller backed by the gateway API.
#[derive(Clone)]
pub struct HttpClusterClient {
    base: Url,
    client: reqwest::Client,
}

impl HttpClusterClient {
    pub fn new(endpoint: &str) -> Result<Self, GatewayError> {
        let base = Url::parse(endpoint).map_err(|_| GatewayError::InvalidEndpoint(endpoint.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::InvalidEndpoint(endpoint.to_string()));
        }
        Ok(Self {
            base,
            client: reqwest::Client::new(),
        })
    }

    /// Append percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn list_page(
        &self,
        cluster: &str,
        next_token: Option<&str>,
    ) -> Result<ListContainerInstancesResponse, GatewayError> {
        let mut url = self.url(&["clusters", cluster, "container-instances"]);
        if let Some(token) = next_token {
            url.query_pairs_mut().append_pair("nextToken", token);
        }
        let response = self.client.get(url).send().await?;
        Ok(check("ListContainerInstances", response).await?.json().await?)
    }

    async fn describe(
        &self,
        cluster: &str,
        refs: &[InstanceRef],
    ) -> Result<DescribeContainerInstancesResponse, GatewayError> {
        let url = self.url(&["clusters", cluster, "container-instances", "describe"]);
        let body = DescribeContainerInstancesRequest {
            container_instances: refs.iter().map(|r| r.as_str().to_string()).collect(),
        };
        let response = self.client.post(url).json(&body).send().await?;
        Ok(check("DescribeContainerInstances", response).await?.json().await?)
    }

    async fn detach_instance(&self, instance_id: &str, group_name: &str) -> Result<(), GatewayError> {
        let url = self.url(&["autoscaling", "detach-instances"]);
        let body = DetachInstancesRequest {
            instance_ids: vec![instance_id.to_string()],
            auto_scaling_group_name: group_name.to_string(),
            should_decrement_desired_capacity: false,
        };
        let response = self.client.post(url).json(&body).send().await?;
        check("DetachInstances", response).await?;
        Ok(())
    }

    async fn terminate_instance(&self, instance_id: &str) -> Result<(), GatewayError> {
        let url = self.url(&["instances", instance_id, "terminate"]);
        let response = self.client.post(url).send().await?;
        check("TerminateInstances", response).await?;
        Ok(())
    }
}

async fn check(operation: &'static str, response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Status {
        operation,
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ClusterInventory for HttpClusterClient {
    async fn list_instances(
        &self,
        cluster: &str,
        next_token: Option<&str>,
    ) -> anyhow::Result<Page<InstanceRef>> {
        let resp = self.list_page(cluster, next_token).await?;
        debug!(%cluster, count = resp.container_instance_arns.len(), more = resp.next_token.is_some(), "listed instances");
        Ok(Page {
            items: resp.container_instance_arns.into_iter().map(InstanceRef).collect(),
            next_token: resp.next_token.filter(|t| !t.is_empty()),
        })
    }

    async fn describe_instances(
        &self,
        cluster: &str,
        refs: &[InstanceRef],
    ) -> anyhow::Result<Vec<InstanceDetail>> {
        let resp = self.describe(cluster, refs).await?;
        Ok(resp.container_instances.into_iter().map(InstanceDetail::from).collect())
    }
}

#[async_trait]
impl InstanceController for HttpClusterClient {
    async fn detach(&self, instance_id: &str, group_name: &str) -> anyhow::Result<()> {
        self.detach_instance(instance_id, group_name).await?;
        Ok(())
    }

    async fn terminate(&self, instance_id: &str) -> anyhow::Result<()> {
        self.terminate_instance(instance_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    #[derive(Clone, Default)]
    struct Gateway {
        calls: Arc<Mutex<Vec<String>>>,
    }

    async fn list(
        State(gw): State<Gateway>,
        Path(cluster): Path<String>,
        Query(q): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        gw.calls.lock().unwrap().push(format!("list {cluster} {:?}", q.get("nextToken")));
        match q.get("nextToken").map(String::as_str) {
            None => Json(json!({"containerInstanceArns": ["arn:1", "arn:2"], "nextToken": "p2"})),
            Some("p2") => Json(json!({"containerInstanceArns": ["arn:3"]})),
            Some(_) => Json(json!({"containerInstanceArns": []})),
        }
    }

    async fn describe(
        State(gw): State<Gateway>,
        Path(cluster): Path<String>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        gw.calls.lock().unwrap().push(format!("describe {cluster}"));
        let instances: Vec<Value> = body["containerInstances"]
            .as_array()
            .unwrap()
            .iter()
            .map(|arn| {
                let arn = arn.as_str().unwrap();
                json!({
                    "containerInstanceArn": arn,
                    "ec2InstanceId": format!("i-{}", &arn[4..]),
                    "agentConnected": arn != "arn:2",
                    "tags": [{"key": "aws:autoscaling:groupName", "value": "workers"}]
                })
            })
            .collect();
        Json(json!({ "containerInstances": instances }))
    }

    async fn detach(State(gw): State<Gateway>, Json(body): Json<Value>) -> StatusCode {
        gw.calls.lock().unwrap().push(format!(
            "detach {} {} {}",
            body["instanceIds"][0].as_str().unwrap(),
            body["autoScalingGroupName"].as_str().unwrap(),
            body["shouldDecrementDesiredCapacity"]
        ));
        StatusCode::OK
    }

    async fn terminate(State(gw): State<Gateway>, Path(id): Path<String>) -> (StatusCode, &'static str) {
        gw.calls.lock().unwrap().push(format!("terminate {id}"));
        if id == "i-protected" {
            (StatusCode::CONFLICT, "termination protection enabled")
        } else {
            (StatusCode::OK, "")
        }
    }

    async fn serve() -> (HttpClusterClient, Gateway) {
        let gw = Gateway::default();
        let app = Router::new()
            .route("/clusters/{cluster}/container-instances", get(list))
            .route("/clusters/{cluster}/container-instances/describe", post(describe))
            .route("/autoscaling/detach-instances", post(detach))
            .route("/instances/{id}/terminate", post(terminate))
            .with_state(gw.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (HttpClusterClient::new(&format!("http://{addr}")).unwrap(), gw)
    }

    #[test]
    fn rejects_invalid_endpoint() {
        assert!(matches!(
            HttpClusterClient::new("not a url"),
            Err(GatewayError::InvalidEndpoint(_))
        ));
        assert!(HttpClusterClient::new("mailto:ops@example.com").is_err());
    }

    #[test]
    fn url_segments_are_encoded() {
        let client = HttpClusterClient::new("http://gw:8700/api/").unwrap();
        let url = client.url(&["clusters", "prod/blue", "container-instances"]);
        assert_eq!(url.as_str(), "http://gw:8700/api/clusters/prod%2Fblue/container-instances");
    }

    #[tokio::test]
    async fn lists_pages_with_token() {
        let (client, gw) = serve().await;

        let first = client.list_instances("staging1", None).await.unwrap();
        assert_eq!(first.items, vec![InstanceRef::new("arn:1"), InstanceRef::new("arn:2")]);
        assert_eq!(first.next_token.as_deref(), Some("p2"));

        let second = client.list_instances("staging1", first.next_token.as_deref()).await.unwrap();
        assert_eq!(second.items, vec![InstanceRef::new("arn:3")]);
        assert!(!second.has_next());

        let calls = gw.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["list staging1 None", "list staging1 Some(\"p2\")"]);
    }

    #[tokio::test]
    async fn describes_instances_in_order() {
        let (client, _) = serve().await;
        let refs = vec![InstanceRef::new("arn:1"), InstanceRef::new("arn:2")];

        let details = client.describe_instances("staging1", &refs).await.unwrap();

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].ec2_id, "i-1");
        assert!(details[0].agent_connected);
        assert!(!details[1].agent_connected);
        assert_eq!(details[1].autoscaling_group(), Some("workers"));
    }

    #[tokio::test]
    async fn detach_keeps_desired_capacity() {
        let (client, gw) = serve().await;
        client.detach("i-1", "workers").await.unwrap();
        assert_eq!(gw.calls.lock().unwrap()[0], "detach i-1 workers false");
    }

    #[tokio::test]
    async fn terminate_surfaces_gateway_status() {
        let (client, gw) = serve().await;
        client.terminate("i-1").await.unwrap();

        let err = client.terminate("i-protected").await.unwrap_err();
        let err = err.downcast::<GatewayError>().unwrap();
        assert!(matches!(
            err,
            GatewayError::Status { operation: "TerminateInstances", status: 409, ref body }
                if body == "termination protection enabled"
        ));
        assert_eq!(gw.calls.lock().unwrap().len(), 2);
    }
}
