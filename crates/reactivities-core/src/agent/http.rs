//! REST implementation of the API collaborators.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::{ActivityAgent, ApiError, ApiResult, UserAgent};
use crate::config::ClientConfig;
use crate::models::{Activity, ActivityId, ActivityPayload, UserIdentity};
use crate::session::{Session, SessionToken};
use crate::util::compact_text;

/// How a 400 response from an endpoint is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    General,
    Verification,
}

/// HTTP agent attaching the session's bearer token to every request.
#[derive(Clone)]
pub struct HttpAgent {
    base_url: String,
    client: Client,
    session: Session,
}

impl HttpAgent {
    pub fn new(config: &ClientConfig, session: Session) -> crate::Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|error| crate::Error::Config(format!("failed to build HTTP client: {error}")))?;
        Ok(Self {
            base_url: config.api_base_url.clone(),
            client,
            session,
        })
    }

    /// Exchange credentials for a user identity carrying a fresh token.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<UserIdentity> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(ApiError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        let payload = serde_json::json!({
            "email": email.trim(),
            "password": password,
        });
        let request = self.client.post(self.url("/user/login")).json(&payload);
        let response = send(request, Endpoint::General).await?;
        response.json::<UserIdentity>().await.map_err(transport)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }
}

#[async_trait]
impl UserAgent for HttpAgent {
    async fn current_user(&self, token: &SessionToken) -> ApiResult<UserIdentity> {
        let request = self
            .client
            .get(self.url("/user"))
            .bearer_auth(token.as_str());
        let response = send(request, Endpoint::General).await?;
        response.json::<UserIdentity>().await.map_err(transport)
    }

    async fn verify_email(&self, token: &str, email: &str) -> ApiResult<()> {
        let payload = serde_json::json!({
            "token": token,
            "email": email,
        });
        let request = self
            .client
            .post(self.url("/user/verifyEmail"))
            .json(&payload);
        send(request, Endpoint::Verification).await?;
        Ok(())
    }

    async fn resend_verification(&self, email: &str) -> ApiResult<()> {
        let request = self
            .client
            .get(self.url("/user/resendEmailVerification"))
            .query(&[("email", email)]);
        send(request, Endpoint::General).await?;
        Ok(())
    }
}

#[async_trait]
impl ActivityAgent for HttpAgent {
    async fn details(&self, id: &ActivityId) -> ApiResult<Activity> {
        let path = format!("/activities/{}", urlencoding::encode(id.as_str()));
        let request = self.authorized(self.client.get(self.url(&path)));
        let response = send(request, Endpoint::General).await?;
        response.json::<Activity>().await.map_err(transport)
    }

    async fn create(&self, payload: &ActivityPayload) -> ApiResult<()> {
        let request = self.authorized(self.client.post(self.url("/activities")).json(payload));
        send(request, Endpoint::General).await?;
        Ok(())
    }

    async fn update(&self, payload: &ActivityPayload) -> ApiResult<()> {
        let path = format!("/activities/{}", urlencoding::encode(payload.id.as_str()));
        let request = self.authorized(self.client.put(self.url(&path)).json(payload));
        send(request, Endpoint::General).await?;
        Ok(())
    }
}

async fn send(request: RequestBuilder, endpoint: Endpoint) -> ApiResult<Response> {
    let response = request.send().await.map_err(transport)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let error = classify_failure(status, &body, endpoint);
    tracing::debug!(status = status.as_u16(), %error, "API request failed");
    Err(error)
}

#[allow(clippy::needless_pass_by_value)]
fn transport(error: reqwest::Error) -> ApiError {
    ApiError::Transport(error.to_string())
}

fn classify_failure(status: StatusCode, body: &str, endpoint: Endpoint) -> ApiError {
    let message = parse_api_error(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::BAD_REQUEST if endpoint == Endpoint::Verification => {
            ApiError::Verification(message)
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation(message),
        _ => ApiError::Transport(message),
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    errors: Option<serde_json::Value>,
    message: Option<String>,
    title: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorResponse>(body) {
        if let Some(errors) = payload.errors.as_ref().and_then(flatten_errors) {
            return format!("{errors} ({})", status.as_u16());
        }
        if let Some(message) = payload.message.or(payload.title) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

/// Flatten `{"errors": {"Field": ["a", "b"], "other": "c"}}` into one line.
fn flatten_errors(errors: &serde_json::Value) -> Option<String> {
    let object = errors.as_object()?;
    let parts: Vec<String> = object
        .iter()
        .filter_map(|(field, value)| {
            let text = match value {
                serde_json::Value::String(text) => text.clone(),
                serde_json::Value::Array(items) => items
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => return None,
            };
            Some(format!("{field}: {text}"))
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;

    #[test]
    fn unauthorized_maps_to_auth() {
        let error = classify_failure(StatusCode::UNAUTHORIZED, "", Endpoint::General);
        assert_eq!(error, ApiError::Auth("HTTP 401".to_string()));
    }

    #[test]
    fn not_found_keeps_server_message() {
        let body = r#"{"errors":{"activity":"Not found"}}"#;
        let error = classify_failure(StatusCode::NOT_FOUND, body, Endpoint::General);
        assert_eq!(error, ApiError::NotFound("activity: Not found (404)".to_string()));
    }

    #[test]
    fn bad_request_depends_on_endpoint() {
        let body = r#"{"title":"Problem verifying email address"}"#;
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, body, Endpoint::Verification),
            ApiError::Verification(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, body, Endpoint::General),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn server_errors_are_transport() {
        let error = classify_failure(StatusCode::BAD_GATEWAY, "upstream down", Endpoint::General);
        assert_eq!(error, ApiError::Transport("upstream down (502)".to_string()));
    }

    #[test]
    fn validation_arrays_are_flattened() {
        let body = r#"{"errors":{"Title":["Title is required"],"Venue":["Too short","Bad"]}}"#;
        assert_eq!(
            parse_api_error(StatusCode::BAD_REQUEST, body),
            "Title: Title is required; Venue: Too short, Bad (400)"
        );
    }

    #[test]
    fn urls_join_base_and_path() {
        let session = Session::open(MemoryTokenStore::default()).unwrap();
        let config = ClientConfig::new("https://api.example.com/api/").unwrap();
        let agent = HttpAgent::new(&config, session).unwrap();
        assert_eq!(agent.url("/user"), "https://api.example.com/api/user");
    }
}
