mod live;
mod vectors;

use lambdasign_aws_v4::{Credential, RequestSigner};
use lambdasign_core::{Context, Payload, Result, SignRequest};
use std::env;

/// Initialize live test environment.
pub fn init_live_test() -> Option<(String, Credential)> {
    let _ = env_logger::builder().is_test(true).try_init();

    if env::var("LAMBDASIGN_AWS_V4_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let url = env::var("LAMBDASIGN_AWS_V4_URL").expect("LAMBDASIGN_AWS_V4_URL must be set");
    let access_key =
        env::var("LAMBDASIGN_AWS_V4_ACCESS_KEY").expect("LAMBDASIGN_AWS_V4_ACCESS_KEY must be set");
    let secret_key =
        env::var("LAMBDASIGN_AWS_V4_SECRET_KEY").expect("LAMBDASIGN_AWS_V4_SECRET_KEY must be set");
    let session_token = env::var("LAMBDASIGN_AWS_V4_SESSION_TOKEN").unwrap_or_default();

    let cred = Credential::new(&access_key, &secret_key).with_session_token(&session_token);
    Some((url, cred))
}

/// Sign `parts` and return the authorization header.
pub async fn sign(
    signer: &RequestSigner,
    parts: &mut http::request::Parts,
    payload: &Payload,
    cred: &Credential,
) -> Result<String> {
    signer
        .sign_request(&Context::new(), parts, payload, Some(cred))
        .await?;

    Ok(parts.headers[http::header::AUTHORIZATION]
        .to_str()?
        .to_string())
}
