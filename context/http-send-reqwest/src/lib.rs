//! [`HttpSend`] implementation backed by [`reqwest`].

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use lambdasign_core::{Error, HttpSend, Result};
use log::debug;
use reqwest::{Client, Request};
use std::time::Duration;

/// Timeout applied to the whole exchange unless the caller picks another one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// ReqwestHttpSend sends requests with a [`reqwest::Client`].
///
/// Requests are sent exactly once, failures are reported as
/// [`lambdasign_core::ErrorKind::Transport`].
#[derive(Debug, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a new ReqwestHttpSend whose client gives up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            Error::unexpected("failed to build http client").with_source(e)
        })?;

        Ok(Self::new(client))
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req).map_err(|e| {
            Error::request_invalid("failed to convert http request").with_source(e)
        })?;
        debug!("sending {} request to {}", req.method(), req.url());

        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::transport("failed to send http request").with_source(e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::transport("failed to read http response body").with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }
}
