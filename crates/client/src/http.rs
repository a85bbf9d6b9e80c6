// Argo server HTTP transport
// Decision: Talk to the server's REST gateway with reqwest rather than pulling in a gRPC stack
// Decision: Only the two endpoints the client needs are implemented

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ServerConfig;
use crate::error::{ClientError, ServiceError};
use crate::service::WorkflowService;
use crate::types::{CreateRequest, GetRequest, Workflow};

/// Error body returned by the server's gateway
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct CreateBody<'a> {
    namespace: &'a str,
    workflow: &'a Workflow,
}

/// [`WorkflowService`] backed by an Argo server
pub struct ArgoServerService {
    base_url: Url,
    authorization: Option<String>,
    http: reqwest::Client,
}

impl ArgoServerService {
    pub fn new(config: ServerConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            if timeout.is_zero() {
                return Err(ClientError::config("request timeout must be positive"));
            }
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::config(format!("failed to build HTTP client: {e}")))?;

        let authorization = config.token.map(|token| {
            if token.starts_with("Bearer ") {
                token
            } else {
                format!("Bearer {token}")
            }
        });

        Ok(Self {
            base_url: config.url,
            authorization,
            http,
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // ServerConfig rejects cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["api", "v1", "workflows"])
                .extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.authorization {
            Some(value) => request.header(reqwest::header::AUTHORIZATION, value),
            None => request,
        }
    }

    /// Decode a success body or map the failure status.
    ///
    /// A 404 is only [`ServiceError::NotFound`] when `target` names the
    /// workflow being read; otherwise it is reported like any other status.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
        target: Option<&GetRequest>,
    ) -> Result<T, ServiceError> {
        let status = response.status();

        if let (StatusCode::NOT_FOUND, Some(target)) = (status, target) {
            return Err(ServiceError::not_found(target));
        }

        if !status.is_success() {
            let text = response.text().await?;
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json().await?;
        Ok(body)
    }
}

#[async_trait]
impl WorkflowService for ArgoServerService {
    async fn create_workflow(&self, req: &CreateRequest) -> Result<Workflow, ServiceError> {
        let url = self.url(&[&req.namespace]);
        debug!(%url, namespace = %req.namespace, "Creating workflow");

        let body = CreateBody {
            namespace: &req.namespace,
            workflow: &req.workflow,
        };
        let response = self.authorize(self.http.post(url)).json(&body).send().await?;
        // 404 here means a missing namespace or endpoint, not a missing workflow
        Self::handle_response(response, None).await
    }

    async fn get_workflow(&self, req: &GetRequest) -> Result<Workflow, ServiceError> {
        let url = self.url(&[&req.namespace, &req.name]);
        debug!(%url, "Fetching workflow");

        let response = self.authorize(self.http.get(url)).send().await?;
        Self::handle_response(response, Some(req)).await
    }
}
