//! Transport between in-memory tasks and the remote task store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::TransportError;
use crate::model::{NewTask, Task, TaskId, UserId};

/// Remote task store operations. Each call issues exactly one request and fails
/// on any non-success status; there are no retries.
#[async_trait]
pub trait TaskTransport: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>, TransportError>;
    async fn create(&self, draft: &NewTask) -> Result<Task, TransportError>;
    async fn update(&self, task: &Task) -> Result<Task, TransportError>;
    async fn delete(&self, id: TaskId) -> Result<(), TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    user_id: UserId,
}

impl HttpTransport {
    pub fn new(base_url: &str, user_id: UserId, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id,
        }
    }

    /// Build a transport for the configured session.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let user_id = config.require_user_id()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("todos/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed building HTTP client for the task store")?;
        Ok(Self::new(config.api_url(), user_id, client))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn item_url(&self, id: TaskId) -> String {
        format!("{}/todos/{}", self.base_url, id)
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, TransportError> {
        debug!(endpoint, "sending task store request");
        let response = request.send().await.map_err(|source| {
            warn!(endpoint, error = %source, "task store request failed");
            TransportError::Network {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "task store rejected request");
            return Err(TransportError::status(endpoint, status.as_u16()));
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        response: Response,
    ) -> Result<T, TransportError> {
        response.json::<T>().await.map_err(|source| {
            warn!(endpoint, error = %source, "task store response did not decode");
            TransportError::Decode {
                endpoint: endpoint.to_string(),
                source,
            }
        })
    }
}

#[async_trait]
impl TaskTransport for HttpTransport {
    async fn list(&self) -> Result<Vec<Task>, TransportError> {
        let endpoint = "GET /todos";
        let request = self
            .client
            .get(self.collection_url())
            .query(&[("userId", self.user_id)]);
        let response = self.send(endpoint, request).await?;
        let tasks: Vec<Task> = self.decode(endpoint, response).await?;
        debug!(count = tasks.len(), "listed tasks");
        Ok(tasks)
    }

    async fn create(&self, draft: &NewTask) -> Result<Task, TransportError> {
        let endpoint = "POST /todos";
        let request = self.client.post(self.collection_url()).json(draft);
        let response = self.send(endpoint, request).await?;
        self.decode(endpoint, response).await
    }

    async fn update(&self, task: &Task) -> Result<Task, TransportError> {
        let endpoint = format!("PATCH /todos/{}", task.id);
        let request = self
            .client
            .patch(self.item_url(task.id))
            .json(&NewTask::from(task));
        let response = self.send(&endpoint, request).await?;
        self.decode(&endpoint, response).await
    }

    async fn delete(&self, id: TaskId) -> Result<(), TransportError> {
        let endpoint = format!("DELETE /todos/{}", id);
        let request = self.client.delete(self.item_url(id));
        self.send(&endpoint, request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let transport = HttpTransport::new("http://localhost:3000/api/", 4, Client::new());
        assert_eq!(transport.base_url(), "http://localhost:3000/api");
        assert_eq!(transport.collection_url(), "http://localhost:3000/api/todos");
        assert_eq!(transport.item_url(12), "http://localhost:3000/api/todos/12");
    }

    #[test]
    fn from_config_requires_a_user_id() {
        let config = AppConfig::new("http://localhost:3000", None).unwrap();
        let err = HttpTransport::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("no user id configured"));
    }
}
