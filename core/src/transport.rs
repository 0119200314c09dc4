//! Executes built requests over the network.
//!
//! `Transport` is the only seam that performs I/O. The default implementation
//! wraps a pooled `reqwest::Client`; tests and hosts with their own HTTP stack
//! can plug in anything that turns an `HttpRequest` into an `HttpResponse`.

use std::future::Future;

use tracing::trace;
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Performs one HTTP round trip.
///
/// Implementations must not retry and must return non-2xx responses as data;
/// status interpretation belongs to the client. A body that is not UTF-8 is
/// a `Decode` error, never lossily repaired. Dropping the returned future
/// should abandon the request.
pub trait Transport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

/// `reqwest`-backed transport.
///
/// Relative targets (an empty base URL on the client) are resolved against
/// `origin`. Without an origin they fail on first use, the same way an
/// unreachable host would.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    origin: Option<Url>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client, e.g. one configured with a timeout.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client, origin: None }
    }

    /// Origin that relative targets are resolved against.
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn origin(&self) -> Option<&Url> {
        self.origin.as_ref()
    }

    fn resolve(&self, target: &str) -> Result<Url, ApiError> {
        if target.starts_with('/') {
            let origin = self.origin.as_ref().ok_or_else(|| {
                ApiError::Transport(format!("relative target `{target}` has no origin to resolve against"))
            })?;
            return origin
                .join(target)
                .map_err(|e| ApiError::Transport(format!("invalid URL `{target}`: {e}")));
        }
        Url::parse(target).map_err(|e| ApiError::Transport(format!("invalid URL `{target}`: {e}")))
    }
}

impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = self.resolve(&request.url)?;
        trace!(%url, method = %request.method, "sending request");

        let mut builder = self.client.request(request.method.into(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let bytes = response.bytes().await?;
        let body = String::from_utf8(bytes.to_vec()).map_err(|e| ApiError::Decode {
            status,
            message: format!("response body is not valid UTF-8: {e}"),
        })?;

        Ok(HttpResponse { status, headers, body })
    }
}
