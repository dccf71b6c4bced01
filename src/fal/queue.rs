use std::time::Duration;

use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{
    error::{FluxError, Result},
    models::{QueueLog, QueueStatus, QueueSubmission},
};

/// Client for the hosted queue: submit, poll status, fetch result.
#[derive(Clone)]
pub struct QueueClient {
    http: Client,
    base_url: String,
    poll_interval: Duration,
}

impl QueueClient {
    pub fn new(api_key: &str, base_url: &str, poll_interval: Duration) -> Result<Self> {
        let http = Client::builder()
            .default_headers(build_headers(api_key)?)
            .build()
            .map_err(|e| FluxError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            poll_interval,
        })
    }

    /// Client for a loopback test server; bypasses any proxy from the
    /// environment.
    #[cfg(test)]
    pub(crate) fn local(base_url: &str) -> Self {
        let http = Client::builder()
            .default_headers(build_headers("id:secret").unwrap())
            .no_proxy()
            .build()
            .unwrap();
        Self {
            http,
            base_url: base_url.to_string(),
            poll_interval: Duration::from_millis(1),
        }
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub fn submit_url(&self, model: &str) -> String {
        format!("{}/{}", self.base_url, model.trim_matches('/'))
    }

    pub async fn submit<I: Serialize + ?Sized>(
        &self,
        model: &str,
        input: &I,
    ) -> Result<QueueSubmission> {
        let url = self.submit_url(model);
        log::debug!("Submitting request to {}", url);

        let response = self
            .http
            .post(&url)
            .json(input)
            .send()
            .await
            .map_err(|e| FluxError::RequestError(format!("Queue submit failed: {}", e)))?;

        let submission: QueueSubmission = read_json(response).await?;
        log::info!("Request {} accepted by queue", submission.request_id);
        Ok(submission)
    }

    pub async fn status(&self, submission: &QueueSubmission) -> Result<QueueStatus> {
        let response = self
            .http
            .get(&submission.status_url)
            .query(&[("logs", "1")])
            .send()
            .await
            .map_err(|e| FluxError::RequestError(format!("Status request failed: {}", e)))?;

        read_json(response).await
    }

    pub async fn result<T: DeserializeOwned>(&self, submission: &QueueSubmission) -> Result<T> {
        let response = self
            .http
            .get(&submission.response_url)
            .send()
            .await
            .map_err(|e| FluxError::RequestError(format!("Result request failed: {}", e)))?;

        read_json(response).await
    }

    /// Submits `input` and polls until the queue reports completion, then
    /// returns the decoded result. Every status is passed to `on_update`.
    pub async fn subscribe<I, T>(
        &self,
        model: &str,
        input: &I,
        on_update: &mut (dyn for<'q> FnMut(&'q QueueStatus) + Send),
    ) -> Result<T>
    where
        I: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let submission = self.submit(model, input).await?;
        let mut logs_seen = 0;

        loop {
            let status = self.status(&submission).await?;

            for entry in unseen_logs(status.logs(), &mut logs_seen) {
                log::info!("[{}] {}", submission.request_id, entry.message);
            }

            on_update(&status);
            if status.is_completed() {
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        self.result(&submission).await
    }
}

/// Status responses repeat the whole log so far; returns the tail not yet
/// seen. A shorter log than before starts over.
fn unseen_logs<'a>(logs: &'a [QueueLog], seen: &mut usize) -> &'a [QueueLog] {
    if logs.len() < *seen {
        *seen = 0;
    }
    let fresh = &logs[*seen..];
    *seen = logs.len();
    fresh
}

fn build_headers(api_key: &str) -> Result<header::HeaderMap> {
    let mut headers = header::HeaderMap::new();
    let auth = header::HeaderValue::from_str(&format!("Key {}", api_key))
        .map_err(|_| FluxError::ConfigError("API key contains invalid characters".into()))?;
    headers.insert(header::AUTHORIZATION, auth);
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    Ok(headers)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        log::error!("Queue returned {}: {}", status, body);
        return Err(FluxError::ApiError {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    Ok(serde_json::from_str(&body)?)
}

/// Pulls `detail` out of a JSON error body when present.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| match &value["detail"] {
            serde_json::Value::String(detail) => Some(detail.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| body.trim().to_string())
}
