//! AWS SigV4 signer for Lambda function URLs.
//!
//! ## Example
//!
//! ```no_run
//! use lambdasign_aws_v4::{resolve_region, Config, ConfigCredentialProvider, RequestSigner};
//! use lambdasign_core::{Context, OsEnv, Payload, Result, Signer};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<()> {
//! let url = "https://some-id.lambda-url.eu-west-1.on.aws/";
//! let ctx = Context::new().with_env(OsEnv);
//! let config = Config::default().from_env(&ctx);
//!
//! let region = resolve_region(config.region.as_deref(), url)?;
//! let signer = Signer::new(
//!     ctx,
//!     ConfigCredentialProvider::new(Arc::new(config)),
//!     RequestSigner::lambda(&region),
//! );
//!
//! let (mut parts, _) = http::Request::post(url).body(())?.into_parts();
//! signer.sign(&mut parts, &Payload::from("{}")).await?;
//! # Ok(())
//! # }
//! ```

mod constants;
pub use constants::LAMBDA_SERVICE;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod region;
pub use region::{guess_region, resolve_region};

mod sign_request;
pub use sign_request::{credential_scope, generate_signing_key, string_to_sign, RequestSigner};
