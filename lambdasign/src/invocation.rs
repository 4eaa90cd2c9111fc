use crate::aws::{resolve_region, Config, ConfigCredentialProvider, RequestSigner};
use bytes::Bytes;
use http::{Method, StatusCode};
use lambdasign_core::header::apply_header_lines;
use lambdasign_core::time::DateTime;
use lambdasign_core::{Context, Error, Payload, Result, Signer};
use log::{debug, info};
use std::sync::Arc;

/// Invocation of a Lambda function URL.
///
/// An invocation resolves the region, applies the user supplied headers,
/// signs the request over the payload and sends it exactly once.
#[derive(Debug, Clone)]
pub struct Invocation {
    url: String,
    method: Method,
    headers: String,
    payload: Payload,
    region: Option<String>,
    time: Option<DateTime>,
}

impl Invocation {
    /// Create a `GET` invocation of `url` with an empty body.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            method: Method::GET,
            headers: String::new(),
            payload: Payload::empty(),
            region: None,
            time: None,
        }
    }

    /// Set the http method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the newline separated `Key: Value` header lines.
    pub fn with_headers(mut self, headers: &str) -> Self {
        self.headers = headers.to_string();
        self
    }

    /// Set the request body.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Set the region explicitly, it takes precedence over [`Config::region`].
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    /// Sign with a fixed time instead of the current one.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign the request and send it through `ctx`.
    pub async fn send(self, ctx: &Context, config: &Config) -> Result<Response> {
        if self.url.trim().is_empty() {
            return Err(Error::config_invalid("lambda function URL is required"));
        }

        let region = resolve_region(
            self.region.as_deref().or(config.region.as_deref()),
            &self.url,
        )?;
        info!("invoking {} {} in region {region}", self.method, self.url);

        let mut builder = RequestSigner::lambda(&region);
        if let Some(time) = self.time {
            builder = builder.with_time(time);
        }
        let signer = Signer::new(
            ctx.clone(),
            ConfigCredentialProvider::new(Arc::new(config.clone())),
            builder,
        );

        let (mut parts, _) = http::Request::builder()
            .method(self.method)
            .uri(self.url.as_str())
            .body(())?
            .into_parts();
        let applied = apply_header_lines(&self.headers, &mut parts.headers);
        debug!("applied {applied} user headers");

        signer.sign(&mut parts, &self.payload).await?;

        // Send the very bytes that were hashed.
        let req = http::Request::from_parts(parts, self.payload.into_bytes());
        let resp = ctx.http_send(req).await?;

        let (parts, body) = resp.into_parts();
        Ok(Response {
            status: parts.status,
            body,
        })
    }
}

/// Response of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code returned by the function URL.
    pub status: StatusCode,
    /// Response body as received.
    pub body: Bytes,
}

impl Response {
    /// Status code with its canonical reason, like `200 OK`.
    pub fn status_text(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {reason}", self.status.as_u16()),
            None => self.status.as_u16().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        let resp = Response {
            status: StatusCode::OK,
            body: Bytes::new(),
        };
        assert_eq!(resp.status_text(), "200 OK");

        let resp = Response {
            status: StatusCode::FORBIDDEN,
            body: Bytes::new(),
        };
        assert_eq!(resp.status_text(), "403 Forbidden");

        let resp = Response {
            status: StatusCode::from_u16(599).expect("status must be valid"),
            body: Bytes::new(),
        };
        assert_eq!(resp.status_text(), "599");
    }

    #[tokio::test]
    async fn test_empty_url_is_config_error() {
        let err = Invocation::new("  ")
            .send(&Context::new(), &Config::default())
            .await
            .expect_err("empty url must fail");
        assert!(err.is_config_error());
    }
}
