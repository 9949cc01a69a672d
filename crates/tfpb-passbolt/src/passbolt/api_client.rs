//! HTTP transport for the Passbolt REST API.
//!
//! Every call goes through [`PassboltApiClient::send`], which attaches the
//! CSRF header once a session exists, unwraps the `{header, body}` envelope
//! and turns non-2xx statuses into [`PassboltError`]s. Session cookies live
//! in a shared [`Jar`] so the GPGAuth login and later calls see the same
//! cookies.

use crate::passbolt::types::*;
use log::debug;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Cookie Passbolt uses to hand out the CSRF token.
const CSRF_COOKIE: &str = "csrfToken";
const CSRF_HEADER: &str = "X-CSRF-Token";

/// Whether a request carries the session's CSRF token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Csrf {
    Attach,
    Omit,
}

#[derive(Debug, Clone)]
pub struct PassboltApiClient {
    client: Client,
    jar: Arc<Jar>,
    /// Origin plus any path prefix, never ending in `/`.
    base_url: String,
    session: SessionState,
}

impl PassboltApiClient {
    pub fn new(base_url: &str, verify_tls: bool, timeout_secs: u64) -> Result<Self, PassboltError> {
        let base = normalize_base_url(base_url)?;
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .danger_accept_invalid_certs(!verify_tls)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PassboltError::network(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            jar,
            base_url: base,
            session: SessionState::default(),
        })
    }

    pub fn from_config(config: &PassboltConfig) -> Result<Self, PassboltError> {
        Self::new(&config.server_url, config.verify_tls, config.request_timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn set_session(&mut self, session: SessionState) {
        self.session = session;
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.authenticated
    }

    /// CSRF token from the jar; present once the server has set the cookie.
    pub fn csrf_token_from_cookies(&self) -> Option<String> {
        let origin = Url::parse(&format!("{}/", self.base_url)).ok()?;
        let cookies = self.jar.cookies(&origin)?;
        cookie_value(cookies.to_str().ok()?, CSRF_COOKIE)
    }

    fn build(&self, method: Method, path: &str, csrf: Csrf) -> RequestBuilder {
        debug!("{} {}", method, path);
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match (csrf, self.session.csrf_token.as_deref()) {
            (Csrf::Attach, Some(token)) => builder.header(CSRF_HEADER, token),
            _ => builder,
        }
    }

    /// Send and decode the envelope of a 2xx response.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiResponse<T>, PassboltError> {
        let response = self.execute_raw(builder).await?;
        let status = response.status();
        let path = response.url().path().to_string();
        let text = response
            .text()
            .await
            .map_err(|e| PassboltError::network(format!("Cannot read response from {}: {}", path, e)))?;

        if !status.is_success() {
            return Err(status_error(status, &path, &text));
        }
        serde_json::from_str(&text)
            .map_err(|e| PassboltError::parse(format!("Unexpected response from {}: {}", path, e)))
    }

    /// Send without looking at the response; auth flows read headers.
    pub async fn execute_raw(&self, builder: RequestBuilder) -> Result<Response, PassboltError> {
        builder
            .send()
            .await
            .map_err(|e| PassboltError::network(format!("Request failed: {}", e)))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, PassboltError> {
        self.send(self.build(Method::GET, path, Csrf::Attach)).await
    }

    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<ApiResponse<T>, PassboltError> {
        self.send(self.build(Method::GET, path, Csrf::Attach).query(params))
            .await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, PassboltError> {
        self.send(self.build(Method::POST, path, Csrf::Attach).json(body))
            .await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, PassboltError> {
        self.send(self.build(Method::PUT, path, Csrf::Attach).json(body))
            .await
    }

    /// DELETE; a successful body is ignored.
    pub async fn delete_void(&self, path: &str) -> Result<(), PassboltError> {
        let response = self
            .execute_raw(self.build(Method::DELETE, path, Csrf::Attach))
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(status_error(status, path, &text))
    }

    /// GET before login; no CSRF token exists yet.
    pub async fn get_unauthenticated<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, PassboltError> {
        self.send(self.build(Method::GET, path, Csrf::Omit)).await
    }

    /// POST before login, returning the raw response for its headers.
    pub async fn post_unauthenticated_raw<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, PassboltError> {
        self.execute_raw(self.build(Method::POST, path, Csrf::Omit).json(body))
            .await
    }
}

fn normalize_base_url(raw: &str) -> Result<String, PassboltError> {
    let url = Url::parse(raw)
        .map_err(|e| PassboltError::invalid_config(format!("Invalid server URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_string()),
        other => Err(PassboltError::invalid_config(format!(
            "Unsupported URL scheme '{}'",
            other
        ))),
    }
}

/// Map a failed response to an error kind. The envelope message is preferred
/// over the raw body when the server sent one.
pub(crate) fn status_error(status: StatusCode, path: &str, body: &str) -> PassboltError {
    let message = envelope_message(body).unwrap_or_else(|| body.to_string());
    let code = status.as_u16();
    match code {
        400 => PassboltError::bad_request(format!("{} rejected the request: {}", path, message)),
        401 => PassboltError::session_expired(format!("Session expired or missing ({})", path)),
        403 if body.to_ascii_lowercase().contains("mfa") => {
            PassboltError::mfa_required(format!("{} requires MFA verification", path))
        }
        403 => PassboltError::forbidden(format!("Access to {} denied: {}", path, message)),
        404 => PassboltError::not_found(format!("{} does not exist: {}", path, message)),
        409 => PassboltError::conflict(format!("{} was changed concurrently: {}", path, message)),
        429 => PassboltError::rate_limited(format!("Rate limited on {}", path)),
        500..=599 => PassboltError::server(format!("HTTP {} from {}: {}", code, path, message)),
        _ => PassboltError::api(format!("HTTP {} from {}: {}", code, path, message)),
    }
}

fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split("; ")
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// `header.message` of an error envelope, when non-empty.
fn envelope_message(body: &str) -> Option<String> {
    let envelope: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = envelope.pointer("/header/message")?.as_str()?;
    (!message.is_empty()).then(|| message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_dropped() {
        let client = PassboltApiClient::new("https://pb.example.com/", true, 30).unwrap();
        assert_eq!(client.base_url(), "https://pb.example.com");
        assert!(!client.is_authenticated());
    }

    #[test]
    fn config_carries_prefix() {
        let config = PassboltConfig {
            server_url: "https://example.com/passbolt/".into(),
            ..Default::default()
        };
        let client = PassboltApiClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "https://example.com/passbolt");
    }

    #[test]
    fn non_http_urls_rejected() {
        for url in ["pb.example.com", "ftp://pb.example.com"] {
            let err = PassboltApiClient::new(url, true, 30).unwrap_err();
            assert_eq!(err.kind, PassboltErrorKind::InvalidConfig, "{url}");
        }
    }

    #[test]
    fn session_replaced_after_login() {
        let mut client = PassboltApiClient::new("https://pb.example.com", true, 30).unwrap();
        client.set_session(SessionState {
            authenticated: true,
            user_id: Some("u1".into()),
            ..Default::default()
        });
        assert!(client.is_authenticated());
        assert_eq!(client.session().user_id.as_deref(), Some("u1"));
        assert!(client.csrf_token_from_cookies().is_none());
    }

    #[test]
    fn cookie_lookup() {
        let header = "passbolt_session=abc; csrfToken=tok123";
        assert_eq!(cookie_value(header, "csrfToken").as_deref(), Some("tok123"));
        assert!(cookie_value(header, "csrf").is_none());
    }

    #[test]
    fn envelope_message_preferred() {
        let body = r#"{"header":{"message":"The folder does not exist."},"body":null}"#;
        let err = status_error(StatusCode::NOT_FOUND, "/folders/x.json", body);
        assert!(err.is_not_found());
        assert!(err.message.contains("The folder does not exist."));
        assert!(err.message.contains("/folders/x.json"));
        assert!(envelope_message("<html>").is_none());
    }

    #[test]
    fn status_table() {
        let cases = [
            (StatusCode::BAD_REQUEST, "", PassboltErrorKind::BadRequest),
            (StatusCode::UNAUTHORIZED, "", PassboltErrorKind::SessionExpired),
            (StatusCode::FORBIDDEN, "denied", PassboltErrorKind::Forbidden),
            (StatusCode::FORBIDDEN, "MFA required", PassboltErrorKind::MfaRequired),
            (StatusCode::CONFLICT, "", PassboltErrorKind::Conflict),
            (StatusCode::TOO_MANY_REQUESTS, "", PassboltErrorKind::RateLimited),
            (StatusCode::BAD_GATEWAY, "upstream", PassboltErrorKind::ServerError),
            (StatusCode::IM_A_TEAPOT, "", PassboltErrorKind::ApiError),
        ];
        for (status, body, kind) in cases {
            assert_eq!(status_error(status, "/", body).kind, kind, "{status}");
        }
    }
}
