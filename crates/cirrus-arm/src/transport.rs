use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::credential::TokenCredential;
use crate::error::ArmError;

/// Authenticated HTTP plumbing shared by clients and their operations.
pub(crate) struct Transport {
    pub(crate) http: reqwest::Client,
    credential: Arc<dyn TokenCredential>,
    throttle_retry_after: Duration,
}

/// `{"error": {"code": ..., "message": ...}}` as returned by ARM.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub(crate) error: Option<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub(crate) code: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

impl Transport {
    pub(crate) fn new(
        http: reqwest::Client,
        credential: Arc<dyn TokenCredential>,
        throttle_retry_after: Duration,
    ) -> Self {
        Self {
            http,
            credential,
            throttle_retry_after,
        }
    }

    /// Authenticate and send. Non-2xx responses become errors.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, ArmError> {
        let token = self.credential.token().await?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = retry_after(response.headers()).unwrap_or(self.throttle_retry_after);
            tracing::warn!(retry_after_secs = retry_after.as_secs(), "request throttled");
            return Err(ArmError::Throttled { retry_after });
        }
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response)
    }

    pub(crate) async fn get(&self, url: &Url) -> Result<Response, ArmError> {
        self.send(self.http.get(url.clone())).await
    }
}

async fn error_from_response(response: Response) -> ArmError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    let detail = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|r| r.error)
        .unwrap_or_default();

    ArmError::Status {
        status,
        code: detail.code,
        message: detail.message.unwrap_or(body),
    }
}

/// `Retry-After` in delta-seconds. HTTP dates are ignored.
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

pub(crate) fn header_url(headers: &HeaderMap, name: &str) -> Option<Url> {
    let value = headers.get(name)?.to_str().ok()?;
    Url::parse(value).ok()
}
