use super::sign;
use lambdasign_aws_v4::{guess_region, Credential, RequestSigner};
use lambdasign_core::time::from_unix_seconds;
use lambdasign_core::{Payload, Result};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn parts(method: http::Method, url: &str) -> http::request::Parts {
    http::Request::builder()
        .method(method)
        .uri(url)
        .body(())
        .expect("request must be valid")
        .into_parts()
        .0
}

#[tokio::test]
async fn test_function_url_with_guessed_region() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let url = "https://some-id.lambda-url.eu-west-1.on.aws/";
    let region = guess_region(url)?;
    let signer = RequestSigner::lambda(&region)
        .with_time(from_unix_seconds(0).expect("epoch must be valid"));
    let cred = Credential::new("AKID", "SECRET").with_session_token("SESSION");

    let mut req = parts(http::Method::POST, url);
    let auth = sign(&signer, &mut req, &Payload::from("{}"), &cred).await?;

    assert_eq!(
        auth,
        "AWS4-HMAC-SHA256 Credential=AKID/19700101/eu-west-1/lambda/aws4_request, \
         SignedHeaders=content-length;host;x-amz-date;x-amz-security-token, \
         Signature=89d2a4858dac64a1699891c494929097f1c00e65e3bf8dbb99cc625bd7baad12"
    );
    assert_eq!(req.uri.to_string(), url);
    Ok(())
}

#[test_case(http::Method::GET; "get")]
#[test_case(http::Method::POST; "post")]
#[test_case(http::Method::PUT; "put")]
#[test_case(http::Method::DELETE; "delete")]
#[tokio::test]
async fn test_scope_follows_date_region_and_service(method: http::Method) -> Result<()> {
    // 2024-03-01T23:59:59Z
    let time = from_unix_seconds(1_709_337_599).expect("time must be valid");
    let signer = RequestSigner::new("lambda", "ap-southeast-2").with_time(time);
    let cred = Credential::new("AKID", "SECRET");

    let mut req = parts(method, "https://abc.lambda-url.ap-southeast-2.on.aws/path?b=2&a=1");
    let auth = sign(&signer, &mut req, &Payload::empty(), &cred).await?;

    assert!(auth.starts_with(
        "AWS4-HMAC-SHA256 Credential=AKID/20240301/ap-southeast-2/lambda/aws4_request, \
         SignedHeaders=host;x-amz-date, Signature="
    ));
    assert_eq!(req.headers["x-amz-date"], "20240301T235959Z");
    // Query is sent as given, only the signature sees it sorted.
    assert_eq!(
        req.uri.to_string(),
        "https://abc.lambda-url.ap-southeast-2.on.aws/path?b=2&a=1"
    );
    Ok(())
}

#[tokio::test]
async fn test_different_credentials_differ() -> Result<()> {
    let url = "https://some-id.lambda-url.eu-west-1.on.aws/";
    let signer = RequestSigner::lambda("eu-west-1")
        .with_time(from_unix_seconds(0).expect("epoch must be valid"));
    let payload = Payload::from("{}");

    let a = sign(
        &signer,
        &mut parts(http::Method::POST, url),
        &payload,
        &Credential::new("AKID", "SECRET"),
    )
    .await?;
    let b = sign(
        &signer,
        &mut parts(http::Method::POST, url),
        &payload,
        &Credential::new("AKID", "OTHER"),
    )
    .await?;

    assert_ne!(a, b);
    Ok(())
}
