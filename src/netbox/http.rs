//! HTTP transport for the backend REST API
//!
//! Thin wrapper over `reqwest`. Unlike a general-purpose client, a non-2xx
//! status is not an error here: the bulk engine classifies each response
//! against its operation-specific success predicate, so every completed
//! exchange comes back as a [`RawResponse`]. Only transport-level failures
//! (unreachable host, TLS, timeouts) surface as `Err`.

use crate::error::{NbxError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 400;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// One completed HTTP exchange: status code, raw body text, and the body
/// parsed as JSON when it is parseable.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub text: String,
    pub json: Option<Value>,
}

/// HTTP client for the backend API
///
/// Holds the one authenticated session shared by all calls: headers are set
/// once at construction, and the connection pool is released on drop.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport bound to a base URL with token authentication.
    ///
    /// TLS certificate verification is disabled: these backends typically
    /// run on internal networks with self-signed certificates.
    pub fn new(base_url: &str, apikey: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Token {apikey}")).map_err(|_| {
            NbxError::Config("apikey contains characters not valid in a header".to_string())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(concat!("nbx/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}/{path}`; an empty path probes the base URL itself
    pub async fn get(&self, path: &str) -> Result<RawResponse> {
        self.request(Method::GET, path, None).await
    }

    /// POST `{base_url}/{path}` with a JSON body
    pub async fn post(&self, path: &str, body: &Value) -> Result<RawResponse> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// PATCH `{base_url}/{path}` with a JSON body
    pub async fn patch(&self, path: &str, body: &Value) -> Result<RawResponse> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// DELETE `{base_url}/{path}` (no body)
    pub async fn delete(&self, path: &str) -> Result<RawResponse> {
        self.request(Method::DELETE, path, None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<RawResponse> {
        let url = if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path)
        };
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let json = serde_json::from_str(&text).ok();
        tracing::debug!("-> {} ({} bytes)", status, text.len());

        Ok(RawResponse { status, text, json })
    }
}
