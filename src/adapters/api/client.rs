use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::dto::ErrorBody;
use crate::ports::{RepositoryError, RepositoryResult};

/// Raw outcome of a request that reached the server.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    #[cfg(test)]
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decode a success body; any other status becomes `Fetch(context)`.
    pub fn into_json<T: DeserializeOwned>(self, context: &str) -> RepositoryResult<T> {
        if !self.status.is_success() {
            tracing::warn!("{} (HTTP {}): {}", context, self.status, self.body);
            return Err(RepositoryError::Fetch(context.to_string()));
        }
        decode(&self.body)
    }

    /// Decode a success body; a rejection surfaces the server's `message`,
    /// or `fallback` when the error body cannot be read.
    pub fn into_validated<T: DeserializeOwned>(self, fallback: &str) -> RepositoryResult<T> {
        if !self.status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&self.body)
                .ok()
                .and_then(|body| body.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| fallback.to_string());
            tracing::warn!("Request rejected (HTTP {}): {}", self.status, message);
            return Err(RepositoryError::Validation(message));
        }
        decode(&self.body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> RepositoryResult<T> {
    serde_json::from_str(body).map_err(|e| {
        RepositoryError::Decode(format!("{}. Response was: {}", e, body))
    })
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> RepositoryResult<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(RepositoryError::Config(format!(
                "API base URL must start with http:// or https://, got '{base_url}'"
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("taskboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RepositoryError::Config(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, context: &str) -> RepositoryResult<ApiResponse> {
        self.send(self.client.get(self.url(path)), context).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        context: &str,
    ) -> RepositoryResult<ApiResponse> {
        self.send(self.client.post(self.url(path)).json(body), context)
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        context: &str,
    ) -> RepositoryResult<ApiResponse> {
        self.send(self.client.put(self.url(path)).json(body), context)
            .await
    }

    pub async fn delete(&self, path: &str, context: &str) -> RepositoryResult<ApiResponse> {
        self.send(self.client.delete(self.url(path)), context).await
    }

    // Single attempt; the caller sees the first failure.
    async fn send(&self, request: RequestBuilder, context: &str) -> RepositoryResult<ApiResponse> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("{}: transport error: {}", context, e);
            RepositoryError::Fetch(format!("{context}: {e}"))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::warn!("{}: failed to read body: {}", context, e);
            RepositoryError::Fetch(format!("{context}: {e}"))
        })?;

        tracing::debug!("API Response ({}): {}", status, body);

        Ok(ApiResponse { status, body })
    }
}
