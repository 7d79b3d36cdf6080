//! Auth resource: credential check

use serde::Serialize;
use serde_json::Value;

use super::client::{expect_success, status_error, GatewayClient};
use super::GatewayError;
use crate::models::Identity;

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Check credentials. Only an explicit `success: false` reads as bad
/// credentials; other failures keep their HTTP or payload detail.
pub async fn authenticate_with_client(
    client: &GatewayClient,
    username: &str,
    password: &str,
) -> Result<Identity, GatewayError> {
    let url = &client.endpoints().auth;
    let body = Credentials { username, password };
    let (status, text) = client
        .send_json(reqwest::Method::POST, url, &body)
        .await?;

    let payload = serde_json::from_str::<Value>(&text).ok();
    let rejected = payload
        .as_ref()
        .and_then(|p| p.get("success"))
        .and_then(Value::as_bool)
        == Some(false);
    if rejected {
        return Err(GatewayError::business("Invalid username or password"));
    }
    if !status.is_success() {
        return Err(status_error(status, url, text));
    }

    let payload = payload
        .ok_or_else(|| GatewayError::business("Malformed response from auth endpoint"))?;
    expect_success(&payload)?;

    let user = payload
        .get("user")
        .cloned()
        .ok_or_else(|| GatewayError::business("auth response has no user"))?;
    serde_json::from_value(user)
        .map_err(|e| GatewayError::business(format!("Malformed user in auth response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FailureKind;
    use crate::config::Endpoints;
    use crate::models::Role;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> GatewayClient {
        let base = server.uri();
        GatewayClient::new(
            Endpoints {
                auth: format!("{}/auth", base),
                users: format!("{}/users", base),
                chats: format!("{}/chats", base),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn authenticate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth"))
            .and(body_json(serde_json::json!({"username": "anna", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "user": {"id": 2, "username": "anna", "role": "operator", "status": "offline"}
            })))
            .mount(&server)
            .await;

        let me = authenticate_with_client(&test_client(&server), "anna", "pw")
            .await
            .unwrap();
        assert_eq!(me.id, 2);
        assert_eq!(me.role, Role::Operator);
    }

    #[tokio::test]
    async fn authenticate_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"success": false, "error": "Invalid credentials"})),
            )
            .mount(&server)
            .await;

        let err = authenticate_with_client(&test_client(&server), "anna", "bad")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Business);
        assert_eq!(err.to_string(), "Invalid username or password");
    }

    #[tokio::test]
    async fn authenticate_success_without_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
            .mount(&server)
            .await;

        let err = authenticate_with_client(&test_client(&server), "anna", "pw")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Business);
    }

    #[tokio::test]
    async fn authenticate_server_error_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"error": "database unavailable"})),
            )
            .mount(&server)
            .await;

        let err = authenticate_with_client(&test_client(&server), "anna", "pw")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Business);
        let text = err.to_string();
        assert!(text.contains("HTTP 500"), "{}", text);
        assert!(text.contains("database unavailable"), "{}", text);
        assert!(!text.contains("Invalid username"), "{}", text);
    }

    #[tokio::test]
    async fn authenticate_missing_flag_is_not_bad_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": 1})))
            .mount(&server)
            .await;

        let err = authenticate_with_client(&test_client(&server), "anna", "pw")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "response has no success flag");
    }
}
