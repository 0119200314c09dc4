//! The shared API client.
//!
//! # Design
//! `ApiClient` holds only the base URL resolved at start-up and a transport.
//! It carries no mutable state, so a single instance can serve any number of
//! concurrent requests. Each call is split into `build_request` (contract
//! validation and encoding, no I/O), `Transport::execute` (the round trip)
//! and `parse_response` (status and shape checks). `request` runs all three;
//! hosts that do their own I/O can call the two pure halves directly.

use tracing::{debug, field::Empty, instrument, warn, Span};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::contract::{expand_target, Operation};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};

/// Correlation header attached to every executed request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build a client for `base_url` with the default transport.
///
/// Never fails and performs no I/O. An empty `base_url` selects relative-path
/// mode; a malformed one surfaces as a transport error on first use.
pub fn create_api_client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url)
}

/// Typed client over any endpoint contract.
#[derive(Debug, Clone)]
pub struct ApiClient<T = ReqwestTransport> {
    base_url: String,
    transport: T,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, ReqwestTransport::new())
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.api_base_url)
    }
}

impl<T> ApiClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.strip_suffix('/').unwrap_or(base_url).to_string(),
            transport,
        }
    }

    /// Base URL with one trailing slash removed; empty in relative-path mode.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Validate `params`/`body` against `O` and encode the request.
    pub fn build_request<O: Operation>(
        &self,
        params: Option<&O::Params>,
        body: Option<&O::Body>,
    ) -> Result<HttpRequest, ApiError> {
        let target = expand_target::<O>(params)?;
        if O::BODY_REQUIRED && body.is_none() {
            return Err(ApiError::MissingBody { operation: O::ID });
        }

        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        let headers = if body.is_some() {
            vec![("content-type".to_string(), "application/json".to_string())]
        } else {
            Vec::new()
        };

        Ok(HttpRequest {
            method: O::METHOD,
            url: format!("{}{target}", self.base_url),
            headers,
            body,
        })
    }

    /// Check the status and decode the body as `O::Response`.
    ///
    /// An empty 2xx body decodes as JSON `null`, which suits `()` and
    /// `Option<_>` responses.
    pub fn parse_response<O: Operation>(&self, response: HttpResponse) -> Result<O::Response, ApiError> {
        check_status(&response)?;
        let text = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };
        serde_json::from_str(text).map_err(|e| ApiError::Decode {
            status: response.status,
            message: e.to_string(),
        })
    }
}

impl<T: Transport> ApiClient<T> {
    /// Issue `O` and decode its response.
    ///
    /// Contract violations are returned before any I/O. No retries and no
    /// implicit timeout; dropping the future abandons the request.
    #[instrument(
        name = "api_request",
        skip_all,
        fields(
            operation = Empty,
            http.method = Empty,
            http.url = Empty,
            http.status_code = Empty,
            request_id = Empty,
        )
    )]
    pub async fn request<O: Operation>(
        &self,
        params: Option<&O::Params>,
        body: Option<&O::Body>,
    ) -> Result<O::Response, ApiError> {
        let span = Span::current();
        span.record("operation", O::ID);
        span.record("http.method", O::METHOD.as_str());

        let mut request = self.build_request::<O>(params, body)?;
        let request_id = Uuid::new_v4().to_string();
        span.record("http.url", request.url.as_str());
        span.record("request_id", request_id.as_str());
        request.headers.push((REQUEST_ID_HEADER.to_string(), request_id));

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "request failed");
                return Err(e);
            }
        };
        span.record("http.status_code", response.status);
        debug!(status = response.status, "response received");

        self.parse_response::<O>(response)
    }
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let body = (!response.body.is_empty()).then(|| response.body.clone());
    Err(ApiError::Status {
        status: response.status,
        body,
    })
}
