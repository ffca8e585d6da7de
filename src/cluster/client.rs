//! Kubernetes API client

use super::kubeconfig::ClusterConfig;
use crate::error::{KomposeError, Result};
use crate::kubernetes::{ReplicationController, Scale, Service};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Core API operations used by `up`, `ps`, `delete` and `scale`
#[allow(async_fn_in_trait)]
pub trait ClusterApi {
    /// Namespace all requests go to
    fn namespace(&self) -> &str;

    async fn create_service(&self, service: &Service) -> Result<Service>;

    async fn get_service(&self, name: &str) -> Result<Service>;

    async fn delete_service(&self, name: &str) -> Result<()>;

    async fn create_replication_controller(
        &self,
        rc: &ReplicationController,
    ) -> Result<ReplicationController>;

    async fn get_replication_controller(&self, name: &str) -> Result<ReplicationController>;

    async fn delete_replication_controller(&self, name: &str) -> Result<()>;

    /// Read the scale subresource of a replication controller
    async fn get_scale(&self, name: &str) -> Result<Scale>;

    /// Replace the scale subresource of a replication controller
    async fn update_scale(&self, scale: &Scale) -> Result<Scale>;
}

/// Failure body returned by the API server
#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    message: String,
}

/// `ClusterApi` over the REST API
pub struct HttpClusterClient {
    config: ClusterConfig,
    client: reqwest::Client,
}

impl HttpClusterClient {
    /// Create a client for the resolved cluster settings
    pub fn new(config: ClusterConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(config.insecure);

        if let Some(pem) = &config.ca_pem {
            let certificate = reqwest::Certificate::from_pem(pem)
                .map_err(|e| KomposeError::Kubeconfig(format!("invalid CA certificate: {}", e)))?;
            builder = builder.add_root_certificate(certificate);
        }

        let client = builder
            .build()
            .map_err(|e| KomposeError::Cluster(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn url(&self, collection: &str, name: Option<&str>, subresource: Option<&str>) -> String {
        let mut url = format!(
            "{}/api/v1/namespaces/{}/{}",
            self.config.server, self.config.namespace, collection
        );
        if let Some(name) = name {
            url.push('/');
            url.push_str(name);
        }
        if let Some(subresource) = subresource {
            url.push('/');
            url.push_str(subresource);
        }
        url
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method, url);

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        } else if let Some((username, password)) = &self.config.basic_auth {
            request = request.basic_auth(username, Some(password));
        }

        request
    }

    async fn fetch<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = check(send(request).await?).await?;
        response
            .json()
            .await
            .map_err(|e| KomposeError::Cluster(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, collection: &str, name: &str) -> Result<T> {
        let url = self.url(collection, Some(name), None);
        tracing::debug!("GET {}", url);
        self.fetch(self.request(reqwest::Method::GET, &url)).await
    }

    async fn create<T>(&self, collection: &str, body: &T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let url = self.url(collection, None, None);
        tracing::debug!("POST {}", url);
        self.fetch(self.request(reqwest::Method::POST, &url).json(body))
            .await
    }

    async fn delete(&self, collection: &str, name: &str) -> Result<()> {
        let url = self.url(collection, Some(name), None);
        tracing::debug!("DELETE {}", url);
        check(send(self.request(reqwest::Method::DELETE, &url)).await?).await?;
        Ok(())
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
    request
        .send()
        .await
        .map_err(|e| KomposeError::Cluster(e.to_string()))
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<StatusResponse>(&body)
        .map(|s| s.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or(body);

    Err(KomposeError::Cluster(format!("{}: {}", status, message)))
}

impl ClusterApi for HttpClusterClient {
    fn namespace(&self) -> &str {
        &self.config.namespace
    }

    async fn create_service(&self, service: &Service) -> Result<Service> {
        self.create("services", service).await
    }

    async fn get_service(&self, name: &str) -> Result<Service> {
        self.get("services", name).await
    }

    async fn delete_service(&self, name: &str) -> Result<()> {
        self.delete("services", name).await
    }

    async fn create_replication_controller(
        &self,
        rc: &ReplicationController,
    ) -> Result<ReplicationController> {
        self.create("replicationcontrollers", rc).await
    }

    async fn get_replication_controller(&self, name: &str) -> Result<ReplicationController> {
        self.get("replicationcontrollers", name).await
    }

    async fn delete_replication_controller(&self, name: &str) -> Result<()> {
        self.delete("replicationcontrollers", name).await
    }

    async fn get_scale(&self, name: &str) -> Result<Scale> {
        let url = self.url("replicationcontrollers", Some(name), Some("scale"));
        tracing::debug!("GET {}", url);
        self.fetch(self.request(reqwest::Method::GET, &url)).await
    }

    async fn update_scale(&self, scale: &Scale) -> Result<Scale> {
        let url = self.url(
            "replicationcontrollers",
            Some(&scale.metadata.name),
            Some("scale"),
        );
        tracing::debug!("PUT {}", url);
        self.fetch(self.request(reqwest::Method::PUT, &url).json(scale))
            .await
    }
}
