//! Usage: HTTP client for the remote care API (Basic auth on every call).

use crate::auth::Credential;
use crate::emergency::Responsible;
use crate::settings::AppSettings;
use crate::shared::error::{AppError, AppResult};
use crate::tasks::ApiTask;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode, Url};
use std::time::Duration;


const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("zelo-companion/", env!("CARGO_PKG_VERSION"));

/// Remote operations the screens depend on.
#[async_trait::async_trait]
pub trait CompanionApi: Send + Sync {
    /// `GET /users`; only a 200 counts as a valid credential.
    async fn probe_login(&self, credential: &Credential) -> AppResult<()>;
    /// `GET /elderly/tasks/today`.
    async fn list_today_tasks(&self, credential: &Credential) -> AppResult<Vec<ApiTask>>;
    /// `PUT /elderly/tasks/{id}` without a body.
    async fn complete_task(&self, credential: &Credential, task_id: &str) -> AppResult<()>;
    /// `GET /responsibles`.
    async fn get_responsible(&self, credential: &Credential) -> AppResult<Responsible>;
}

pub struct HttpCompanionApi {
    client: reqwest::Client,
    base_url: Url,
    timeout: Option<Duration>,
}

pub(crate) fn build_http_client() -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| AppError::Network(format!("failed to build http client: {e}")))
}

impl HttpCompanionApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> AppResult<Self> {
        let base_url = base_url.trim();
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Validation(format!("invalid base_url={base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "invalid base_url={base_url}: cannot be a base"
            )));
        }
        Ok(Self {
            client: build_http_client()?,
            base_url,
            timeout,
        })
    }

    pub fn from_settings(settings: &AppSettings) -> AppResult<Self> {
        Self::new(&settings.base_url, settings.request_timeout())
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Validation(format!("invalid base_url={}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        credential: &Credential,
    ) -> AppResult<reqwest::Response> {
        let url = self.endpoint(segments)?;
        tracing::debug!(method = %method, path = %url.path(), "api request");

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, credential.header_value());
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(method = %method, path = %url.path(), "api transport error: {}", e);
            AppError::from_transport(&e)
        })?;

        tracing::debug!(
            method = %method,
            path = %url.path(),
            status = response.status().as_u16(),
            "api response"
        );
        Ok(response)
    }
}

fn ensure_success(status: StatusCode) -> AppResult<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(AppError::from_status(
        status,
        status.canonical_reason().unwrap_or_default(),
    ))
}

async fn decode_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> AppResult<T> {
    let status = response.status();
    response.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            AppError::Server {
                status: status.as_u16(),
                message: format!("invalid response body: {e}"),
            }
        } else {
            AppError::from_transport(&e)
        }
    })
}

#[async_trait::async_trait]
impl CompanionApi for HttpCompanionApi {
    async fn probe_login(&self, credential: &Credential) -> AppResult<()> {
        let response = self.send(Method::GET, &["users"], credential).await?;
        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }
        Err(AppError::Auth {
            status: Some(status.as_u16()),
            message: crate::auth::INVALID_CREDENTIALS_MESSAGE.to_string(),
        })
    }

    async fn list_today_tasks(&self, credential: &Credential) -> AppResult<Vec<ApiTask>> {
        let response = self
            .send(Method::GET, &["elderly", "tasks", "today"], credential)
            .await?;
        ensure_success(response.status())?;
        decode_json(response).await
    }

    async fn complete_task(&self, credential: &Credential, task_id: &str) -> AppResult<()> {
        let response = self
            .send(Method::PUT, &["elderly", "tasks", task_id], credential)
            .await?;
        ensure_success(response.status())
    }

    async fn get_responsible(&self, credential: &Credential) -> AppResult<Responsible> {
        let response = self
            .send(Method::GET, &["responsibles"], credential)
            .await?;
        ensure_success(response.status())?;
        decode_json(response).await
    }
}
