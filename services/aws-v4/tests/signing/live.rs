use super::init_live_test;
use lambdasign_aws_v4::{resolve_region, RequestSigner, StaticCredentialProvider};
use lambdasign_core::{Context, Payload, Result, Signer};
use lambdasign_http_send_reqwest::{ReqwestHttpSend, DEFAULT_TIMEOUT};
use log::{debug, warn};

#[tokio::test]
async fn test_invoke_function_url() -> Result<()> {
    let Some((url, cred)) = init_live_test() else {
        warn!("LAMBDASIGN_AWS_V4_TEST is not set, skipped");
        return Ok(());
    };

    let region = resolve_region(None, &url)?;
    let ctx = Context::new().with_http_send(ReqwestHttpSend::with_timeout(DEFAULT_TIMEOUT)?);
    let signer = Signer::new(
        ctx.clone(),
        StaticCredentialProvider::from(cred),
        RequestSigner::lambda(&region),
    );

    let payload = Payload::from("{}");
    let (mut parts, _) = http::Request::post(&url)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(())?
        .into_parts();
    signer.sign(&mut parts, &payload).await?;

    let resp = ctx
        .http_send(http::Request::from_parts(parts, payload.into_bytes()))
        .await?;
    debug!("got response: {resp:?}");

    assert_ne!(resp.status(), http::StatusCode::FORBIDDEN);
    Ok(())
}
