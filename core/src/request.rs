use std::mem;
use std::str::FromStr;

use http::header::HeaderName;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::Uri;
use percent_encoding::percent_decode_str;

use crate::{Error, Result};

/// The parts of a request that take part in signing.
///
/// `SigningRequest` borrows the headers out of `http::request::Parts` while
/// the signature is computed and hands them back in [`SigningRequest::apply`],
/// so a request is only ever observed either unsigned or fully signed.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, as it appears on the wire.
    pub path: String,
    /// HTTP query, as it appears on the wire.
    pub query: Option<String>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing request from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTPS),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority is invalid for signing")
            })?,
            path: paq.path().to_string(),
            query: paq.query().map(|v| v.to_string()),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing request back to http::request::Parts.
    ///
    /// Path and query are written back exactly as they were taken.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let paq = match self.query {
                    Some(query) => format!("{}?{query}", self.path),
                    None => self.path,
                };

                Some(PathAndQuery::from_str(&paq)?)
            };
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// The value of the `host` header for this request: the authority
    /// without userinfo.
    pub fn host(&self) -> String {
        match self.authority.port() {
            Some(port) => format!("{}:{port}", self.authority.host()),
            None => self.authority.host().to_string(),
        }
    }

    /// Split the raw query into `(key, value)` pairs, percent decoded to bytes.
    ///
    /// `+` is kept as is and a key without `=` gets an empty value.
    pub fn query_pairs(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        let Some(query) = self.query.as_deref() else {
            return Vec::new();
        };

        query
            .split('&')
            .filter(|kv| !kv.is_empty())
            .map(|kv| {
                let (k, v) = kv.split_once('=').unwrap_or((kv, ""));
                (
                    percent_decode_str(k).collect::<Vec<u8>>(),
                    percent_decode_str(v).collect::<Vec<u8>>(),
                )
            })
            .collect()
    }

    /// Get header value by name.
    ///
    /// Returns `None` if header not found.
    #[inline]
    pub fn header_get(&self, key: &HeaderName) -> Result<Option<&str>> {
        match self.headers.get(key) {
            Some(v) => Ok(Some(v.to_str()?)),
            None => Ok(None),
        }
    }

    /// Normalize header value by trimming surrounding spaces and tabs.
    pub fn header_value_normalize(v: &mut HeaderValue) {
        let bs = v.as_bytes();
        let is_ws = |b: &u8| *b == b' ' || *b == b'\t';

        let starting_index = bs.iter().position(|b| !is_ws(b)).unwrap_or(bs.len());
        let ending_offset = bs.iter().rev().position(|b| !is_ws(b)).unwrap_or(0);
        let ending_index = (bs.len() - ending_offset).max(starting_index);

        if starting_index == 0 && ending_index == bs.len() {
            return;
        }

        let sensitive = v.is_sensitive();
        // Trimming spaces from a valid header value always yields a valid one.
        if let Ok(mut trimmed) = HeaderValue::from_bytes(&bs[starting_index..ending_index]) {
            trimmed.set_sensitive(sensitive);
            *v = trimmed;
        }
    }
}
