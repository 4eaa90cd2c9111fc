//! Resolve the signing region of a request.
//!
//! Lambda function URLs carry their region in the hostname:
//! `https://<id>.lambda-url.<region>.on.aws/`. When no region is configured
//! explicitly it is guessed from there. The guess is a pattern match over
//! the hostname, not a lookup in a list of known regions.

use crate::constants::AWS_REGION_PATTERN;
use http::Uri;
use lambdasign_core::{Error, Result};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

static AWS_REGION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(AWS_REGION_PATTERN).expect("region pattern must be valid"));

/// Guess the AWS region from the hostname of `url`.
///
/// Returns the first region token found in the hostname, fails with
/// [`lambdasign_core::ErrorKind::RegionUnresolved`] when there is none.
pub fn guess_region(url: &str) -> Result<String> {
    let uri: Uri = url.parse().map_err(|e| {
        Error::region_unresolved(format!(
            "url {url} is malformed, impossible to guess AWS region"
        ))
        .with_source(anyhow::Error::from(e))
    })?;
    let Some(host) = uri.host() else {
        return Err(Error::region_unresolved(format!(
            "url {url} has no host, impossible to guess AWS region"
        )));
    };

    match AWS_REGION_REGEX.find(host) {
        Some(m) => {
            debug!("guessed region {} from host {host}", m.as_str());
            Ok(m.as_str().to_string())
        }
        None => Err(Error::region_unresolved(format!(
            "lambda function URL is malformed, impossible to guess AWS region from host {host}"
        ))),
    }
}

/// Resolve the region: an explicit, non-empty region wins, otherwise it is
/// guessed from `url`.
pub fn resolve_region(explicit: Option<&str>, url: &str) -> Result<String> {
    match explicit.map(str::trim).filter(|v| !v.is_empty()) {
        Some(region) => Ok(region.to_string()),
        None => {
            info!("AWS region is not specified, try to guess from {url}");
            guess_region(url)
        }
    }
}
