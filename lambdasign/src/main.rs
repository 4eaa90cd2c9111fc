//! lambdasign invokes an IAM-authenticated Lambda function URL.

use anyhow::{Context as _, Result};
use clap::Parser;
use http::Method;
use lambdasign::aws::Config;
use lambdasign::{output, Context, Invocation, OsEnv, Payload, ReqwestHttpSend};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Invoke an AWS Lambda function URL with a SigV4 signed request.
///
/// Credentials are read from AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY and
/// AWS_SESSION_TOKEN.
#[derive(Parser, Debug)]
#[command(name = "lambdasign")]
#[command(version)]
#[command(about = "Invoke an AWS Lambda function URL with a SigV4 signed request", long_about = None)]
struct Cli {
    /// The lambda function URL, should be https://<id>.lambda-url.<region>.on.aws/something
    #[arg(long = "lambda-url")]
    lambda_url: String,

    /// HTTP method used to call the Lambda function
    #[arg(long, default_value = "GET")]
    method: String,

    /// The body associated with the request
    #[arg(long, default_value = "", conflicts_with = "body_file")]
    body: String,

    /// Read the body from a file, `-` reads stdin
    #[arg(long = "body-file")]
    body_file: Option<PathBuf>,

    /// Newline separated list of `Key: Value` headers
    #[arg(long, default_value = "")]
    headers: String,

    /// AWS region, guessed from the lambda URL when absent
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Transport timeout in seconds
    #[arg(long, default_value = "5")]
    timeout: u64,
}

impl Cli {
    fn payload(&self) -> Result<Payload> {
        let payload = match &self.body_file {
            Some(path) if path.as_os_str() == "-" => Payload::from_reader(io::stdin().lock())?,
            Some(path) => {
                let f = File::open(path)
                    .with_context(|| format!("failed to open body file {}", path.display()))?;
                Payload::from_reader(f)?
            }
            None => Payload::from(self.body.clone()),
        };
        Ok(payload)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let ctx = Context::new()
        .with_env(OsEnv)
        .with_http_send(ReqwestHttpSend::with_timeout(Duration::from_secs(cli.timeout))?);
    let config = Config {
        region: cli.region.clone(),
        ..Default::default()
    }
    .from_env(&ctx);

    let method = Method::from_bytes(cli.method.to_uppercase().as_bytes())
        .with_context(|| format!("invalid http method {}", cli.method))?;

    let resp = Invocation::new(&cli.lambda_url)
        .with_method(method)
        .with_headers(&cli.headers)
        .with_payload(cli.payload()?)
        .send(&ctx, &config)
        .await?;

    output::emit(&ctx, &resp, &mut io::stdout().lock())?;
    Ok(())
}
