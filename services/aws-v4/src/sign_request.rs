use crate::constants::{
    AWS4_HMAC_SHA256, AWS4_REQUEST, AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET, LAMBDA_SERVICE,
    X_AMZ_DATE, X_AMZ_SECURITY_TOKEN,
};
use crate::Credential;
use async_trait::async_trait;
use http::request::Parts;
use http::{header, HeaderName, HeaderValue};
use lambdasign_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use lambdasign_core::time::{format_date, format_iso8601, now, DateTime};
use lambdasign_core::{Context, Error, Payload, Result, SignRequest, SigningRequest};
use log::debug;
use percent_encoding::{percent_decode_str, percent_encode, utf8_percent_encode};
use std::fmt::Write;

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// Only a fixed set of headers is signed: `host`, `x-amz-date`,
/// `content-length` and `content-type` when present, and
/// `x-amz-security-token` when the credential carries a session token.
/// Every other header is sent unsigned.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),

            time: None,
        }
    }

    /// Create a new signer for Lambda function URLs in `region`.
    pub fn lambda(region: &str) -> Self {
        Self::new(LAMBDA_SERVICE, region)
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// Requests should be signed with the current time, a fixed time makes
    /// signatures reproducible for tests and test vectors.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    fn compute(
        &self,
        req: &SigningRequest,
        payload: &Payload,
        cred: &Credential,
        now: DateTime,
    ) -> Result<Vec<(HeaderName, HeaderValue)>> {
        let signed = signed_headers(req, payload, cred, now)?;
        let creq = canonical_request_string(req, &signed, payload.hash(), &self.service)?;
        let encoded_req = hex_sha256(creq.as_bytes());

        // Scope: "20220313/<region>/<service>/aws4_request"
        let scope = credential_scope(now, &self.region, &self.service);
        debug!("calculated scope: {scope}");

        let string_to_sign = string_to_sign(now, &scope, &encoded_req)?;
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key =
            generate_signing_key(&cred.secret_access_key, now, &self.region, &self.service);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let signed_names = signed
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";");
        debug!("signed headers: {signed_names}");

        let mut authorization = HeaderValue::from_str(&format!(
            "{AWS4_HMAC_SHA256} Credential={}/{}, SignedHeaders={}, Signature={}",
            cred.access_key_id, scope, signed_names, signature
        ))?;
        authorization.set_sensitive(true);

        let mut headers = signed
            .into_iter()
            .map(|(k, v)| {
                Ok((
                    HeaderName::from_bytes(k.as_bytes())?,
                    HeaderValue::from_str(&v)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        for (name, value) in headers.iter_mut() {
            if name == X_AMZ_SECURITY_TOKEN {
                // Set token value sensitive to avoid leaking.
                value.set_sensitive(true);
            }
        }
        headers.push((header::AUTHORIZATION, authorization));

        Ok(headers)
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        payload: &Payload,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::credential_invalid(
                "aws v4 signing requires a credential",
            ));
        };

        // Taken once: the scope date, the signing key and x-amz-date must agree.
        let now = self.time.unwrap_or_else(now);
        let mut signed_req = SigningRequest::build(req)?;
        for (_, value) in signed_req.headers.iter_mut() {
            SigningRequest::header_value_normalize(value)
        }

        match self.compute(&signed_req, payload, cred, now) {
            Ok(headers) => {
                for (name, value) in headers {
                    signed_req.headers.insert(name, value);
                }
                signed_req.apply(req)
            }
            Err(err) => {
                // Hand the unsigned request back untouched by any signing header.
                signed_req.apply(req)?;
                Err(err)
            }
        }
    }
}

/// Select the headers that take part in the signature, as sorted
/// `(lower-case name, canonical value)` pairs.
fn signed_headers(
    req: &SigningRequest,
    payload: &Payload,
    cred: &Credential,
    now: DateTime,
) -> Result<Vec<(String, String)>> {
    let mut signed = Vec::with_capacity(5);

    let host = match req.header_get(&header::HOST)? {
        Some(v) => v.to_string(),
        None => req.host(),
    };
    signed.push((header::HOST.as_str().to_string(), host));

    // Always overwrite: the date must be the instant used for the scope.
    signed.push((X_AMZ_DATE.to_string(), format_iso8601(now)));

    match req.header_get(&header::CONTENT_LENGTH)? {
        Some(v) => {
            if v.trim().parse::<usize>().ok() != Some(payload.len()) {
                return Err(Error::request_invalid(format!(
                    "content-length {v} doesn't match payload length {}",
                    payload.len()
                )));
            }
            signed.push((header::CONTENT_LENGTH.as_str().to_string(), v.to_string()));
        }
        // Mirror what the transport sends for a non-empty body.
        None if !payload.is_empty() => signed.push((
            header::CONTENT_LENGTH.as_str().to_string(),
            payload.len().to_string(),
        )),
        None => {}
    }

    if req.headers.contains_key(header::CONTENT_TYPE) {
        let values = req
            .headers
            .get_all(header::CONTENT_TYPE)
            .iter()
            .map(|v| v.to_str())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        signed.push((header::CONTENT_TYPE.as_str().to_string(), values.join(",")));
    }

    if let Some(token) = &cred.session_token {
        signed.push((X_AMZ_SECURITY_TOKEN.to_string(), token.clone()));
    }

    for (_, v) in signed.iter_mut() {
        *v = canonical_header_value(v);
    }
    signed.sort();

    Ok(signed)
}

/// Trim the value and collapse sequential spaces into one.
fn canonical_header_value(v: &str) -> String {
    let mut s = String::with_capacity(v.len());
    for (idx, part) in v.split_whitespace().enumerate() {
        if idx > 0 {
            s.push(' ');
        }
        s.push_str(part);
    }
    s
}

/// Percent encode the raw query pairs and sort them by key then value.
fn canonical_query(req: &SigningRequest) -> String {
    let mut query = req
        .query_pairs()
        .iter()
        .map(|(k, v)| {
            (
                percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect::<Vec<_>>();
    query.sort();

    query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn canonical_uri(req: &SigningRequest, service: &str) -> Result<String> {
    let path = if service == "s3" {
        // S3 paths are encoded exactly once.
        let path = percent_decode_str(&req.path).decode_utf8().map_err(|e| {
            Error::request_invalid("failed to decode path").with_source(anyhow::Error::from(e))
        })?;
        utf8_percent_encode(&path, &AWS_URI_ENCODE_SET).to_string()
    } else {
        // Everyone else encodes the already encoded path once more.
        utf8_percent_encode(&req.path, &AWS_URI_ENCODE_SET).to_string()
    };

    if path.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(path)
    }
}

fn canonical_request_string(
    req: &SigningRequest,
    signed: &[(String, String)],
    payload_hash: &str,
    service: &str,
) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    // Insert method
    writeln!(f, "{}", req.method.as_str().to_uppercase())?;
    // Insert encoded path
    writeln!(f, "{}", canonical_uri(req, service)?)?;
    // Insert query
    writeln!(f, "{}", canonical_query(req))?;
    // Insert signed headers
    for (name, value) in signed {
        writeln!(f, "{name}:{value}")?;
    }
    writeln!(f)?;
    writeln!(
        f,
        "{}",
        signed
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";")
    )?;
    write!(f, "{payload_hash}")?;

    Ok(f)
}

/// Build the credential scope: `YYYYMMDD/<region>/<service>/aws4_request`.
pub fn credential_scope(time: DateTime, region: &str, service: &str) -> String {
    format!("{}/{region}/{service}/{AWS4_REQUEST}", format_date(time))
}

/// Build the string to sign.
///
/// ```text
/// AWS4-HMAC-SHA256
/// 20220313T072004Z
/// 20220313/<region>/<service>/aws4_request
/// <hashed_canonical_request>
/// ```
pub fn string_to_sign(time: DateTime, scope: &str, hashed_canonical_request: &str) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "{AWS4_HMAC_SHA256}")?;
    writeln!(f, "{}", format_iso8601(time))?;
    writeln!(f, "{scope}")?;
    write!(f, "{hashed_canonical_request}")?;
    Ok(f)
}

/// Derive the signing key for `time`'s UTC date, `region` and `service`.
pub fn generate_signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), AWS4_REQUEST.as_bytes())
}
