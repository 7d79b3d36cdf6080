//! HTTP client for the support gateway
//!
//! Wraps reqwest::Client with the three resource URLs and the
//! read/write failure rules every resource shares.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::GatewayError;
use crate::config::{Config, Endpoints};

/// Client for the Auth, Users and Chats resources.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl GatewayClient {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, endpoints })
    }

    /// Build a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.endpoints.clone(), config.request_timeout())
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// GET for reads. An unparseable body becomes `Value::Null` so callers
    /// fall back to empty lists; only transport and status failures are errors.
    pub(crate) async fn read(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value, GatewayError> {
        tracing::debug!("GET {} {:?}", url, query);

        let resp = self.http.get(url).query(query).send().await?;
        let text = check_response(resp, url).await?;

        match serde_json::from_str(&text) {
            Ok(v) => Ok(v),
            Err(e) => {
                tracing::warn!("Malformed payload from {}: {}", url, e);
                Ok(Value::Null)
            }
        }
    }

    /// Send a JSON body with the given method and require `success: true`.
    pub(crate) async fn write<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: &B,
    ) -> Result<Value, GatewayError> {
        let (status, text) = self.send_json(method.clone(), url, body).await?;
        if !status.is_success() {
            return Err(status_error(status, url, text));
        }

        let payload: Value = serde_json::from_str(&text).map_err(|e| {
            GatewayError::business(format!("Malformed response from {} {}: {}", method, url, e))
        })?;
        expect_success(&payload)?;
        Ok(payload)
    }

    /// Send a JSON body and return the status and body text unchecked.
    pub(crate) async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: &B,
    ) -> Result<(reqwest::StatusCode, String), GatewayError> {
        tracing::debug!("{} {}", method, url);

        let resp = self.http.request(method, url).json(body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        Ok((status, text))
    }
}

/// Check HTTP status and return the body text.
async fn check_response(resp: reqwest::Response, url: &str) -> Result<String, GatewayError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(status_error(status, url, body));
    }
    Ok(body)
}

/// Non-2xx answer, keeping the gateway's `error` text when it sent one.
pub(crate) fn status_error(status: reqwest::StatusCode, url: &str, body: String) -> GatewayError {
    let detail = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
        .unwrap_or(body);
    GatewayError::business(format!("HTTP {} for {}: {}", status.as_u16(), url, detail))
}

/// Business flag check shared by every write.
pub(crate) fn expect_success(payload: &Value) -> Result<(), GatewayError> {
    match payload.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(()),
        Some(false) => {
            let reason = payload
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("request rejected");
            Err(GatewayError::business(reason))
        }
        None => Err(GatewayError::business("response has no success flag")),
    }
}

/// Extract `payload[field]` as a list of `T`.
///
/// Missing or non-array fields give an empty list; elements that do not
/// parse are dropped one by one.
pub(crate) fn typed_list<T: DeserializeOwned>(payload: &Value, field: &str) -> Vec<T> {
    let Some(items) = payload.get(field).and_then(Value::as_array) else {
        if !payload.is_null() {
            tracing::debug!("Payload has no `{}` list", field);
        }
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Skipping malformed `{}` entry: {}", field, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Message;

    #[test]
    fn test_expect_success_flags() {
        assert!(expect_success(&serde_json::json!({"success": true})).is_ok());

        let err = expect_success(&serde_json::json!({"success": false, "error": "Invalid"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid");

        let err = expect_success(&serde_json::json!({"chat_id": 3})).unwrap_err();
        assert_eq!(err.kind(), crate::api::FailureKind::Business);
    }

    #[test]
    fn test_typed_list_skips_bad_entries() {
        let payload = serde_json::json!({
            "messages": [
                {"id": 1, "sender_type": "client", "sender_id": null, "message": "hi", "created_at": null},
                {"id": "broken"},
                {"id": 2, "sender_type": "operator", "sender_id": 4, "message": "hello", "created_at": null}
            ]
        });
        let msgs: Vec<Message> = typed_list(&payload, "messages");
        assert_eq!(msgs.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_typed_list_missing_or_wrong_shape() {
        let msgs: Vec<Message> = typed_list(&serde_json::json!({}), "messages");
        assert!(msgs.is_empty());
        let msgs: Vec<Message> = typed_list(&serde_json::json!({"messages": "nope"}), "messages");
        assert!(msgs.is_empty());
        let msgs: Vec<Message> = typed_list(&Value::Null, "messages");
        assert!(msgs.is_empty());
    }
}
