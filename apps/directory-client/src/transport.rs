//! Request/response plumbing between the controller and the directory API.

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{Method, Request},
};
use http_body_util::BodyExt;
use platform_api::{DEFAULT_NAMESPACE, DeleteOutcome, EmployeeEnvelope};
use products_hr::{Employee, EmployeeId, EmployeePatch, NewEmployee};
use serde::{Serialize, de::DeserializeOwned};
use tower::ServiceExt;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Carries one request to the API and returns the raw response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse>;
}

/// In-process transport: requests go straight into the server's router.
#[derive(Clone)]
pub struct RouterTransport {
    router: Router,
}

impl RouterTransport {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

#[async_trait]
impl Transport for RouterTransport {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let body = request.body.map_or_else(Body::empty, Body::from);
        let http_request = Request::builder()
            .method(request.method)
            .uri(request.path)
            .body(body)
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        let response = match self.router.clone().oneshot(http_request).await {
            Ok(response) => response,
            Err(infallible) => match infallible {},
        };
        let status = response.status().as_u16();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?
            .to_bytes();
        Ok(ApiResponse { status, body })
    }
}

/// Transport over TCP to a running directory server.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method, url);
        if let Some(body) = request.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }
        let response = builder
            .send()
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}

/// The four directory verbs as seen by the controller.
#[async_trait]
pub trait EmployeeApi: Send + Sync {
    async fn list(&self) -> ClientResult<Vec<Employee>>;
    async fn create(&self, fields: &NewEmployee) -> ClientResult<Employee>;
    async fn update(&self, id: EmployeeId, patch: &EmployeePatch) -> ClientResult<Employee>;
    async fn delete(&self, id: EmployeeId) -> ClientResult<bool>;
}

/// Typed directory API over any [`Transport`].
#[derive(Clone, Debug)]
pub struct ApiClient<T> {
    transport: T,
    namespace: String,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_namespace(transport, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(transport: T, namespace: impl Into<String>) -> Self {
        Self {
            transport,
            namespace: namespace.into(),
        }
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        body: Option<String>,
    ) -> ClientResult<R> {
        debug!(%method, %path, "directory request");
        let response = self
            .transport
            .send(ApiRequest { method, path, body })
            .await?;
        if !(200..300).contains(&response.status) {
            return Err(ClientError::from_response(response.status, &response.body));
        }
        serde_json::from_slice(&response.body)
            .map_err(|err| ClientError::Transport(format!("undecodable response: {err}")))
    }
}

fn encode(value: &impl Serialize) -> ClientResult<Option<String>> {
    serde_json::to_string(value)
        .map(Some)
        .map_err(|err| ClientError::Validation(err.to_string()))
}

#[async_trait]
impl<T: Transport> EmployeeApi for ApiClient<T> {
    async fn list(&self) -> ClientResult<Vec<Employee>> {
        let path = platform_api::employees_path(&self.namespace);
        self.call(Method::GET, path, None).await
    }

    async fn create(&self, fields: &NewEmployee) -> ClientResult<Employee> {
        let path = platform_api::employees_path(&self.namespace);
        let envelope: EmployeeEnvelope = self.call(Method::POST, path, encode(fields)?).await?;
        Ok(envelope.employee)
    }

    async fn update(&self, id: EmployeeId, patch: &EmployeePatch) -> ClientResult<Employee> {
        let path = platform_api::employee_path(&self.namespace, id);
        let envelope: EmployeeEnvelope = self.call(Method::PUT, path, encode(patch)?).await?;
        Ok(envelope.employee)
    }

    async fn delete(&self, id: EmployeeId) -> ClientResult<bool> {
        let path = platform_api::employee_path(&self.namespace, id);
        let outcome: DeleteOutcome = self.call(Method::DELETE, path, None).await?;
        Ok(outcome.success)
    }
}
