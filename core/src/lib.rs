//! Core components for signing Lambda function URL requests.
//!
//! This crate provides the foundational types and traits shared by the
//! lambdasign crates. It knows nothing about AWS itself: service specific
//! signing lives in `lambdasign-aws-v4`, transport lives in
//! `lambdasign-http-send-reqwest`.
//!
//! ## Overview
//!
//! The crate is built around several key concepts:
//!
//! - **Context**: A container that holds implementations for HTTP sending and environment access
//! - **Traits**: Abstract interfaces for credential loading (`ProvideCredential`) and request signing (`SignRequest`)
//! - **Payload**: The request body, read exactly once and hashed while it is buffered
//! - **Signer**: The orchestrator that loads a credential and signs a request with it
//!
//! ## Example
//!
//! ```no_run
//! use lambdasign_core::{Context, Payload, ProvideCredential, Result, SignRequest, Signer, SigningCredential};
//! use async_trait::async_trait;
//! use http::request::Parts;
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyLoader;
//!
//! #[async_trait]
//! impl ProvideCredential for MyLoader {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential { key: "my-key".to_string() }))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MySigner;
//!
//! #[async_trait]
//! impl SignRequest for MySigner {
//!     type Credential = MyCredential;
//!
//!     async fn sign_request(
//!         &self,
//!         _ctx: &Context,
//!         req: &mut Parts,
//!         payload: &Payload,
//!         cred: Option<&Self::Credential>,
//!     ) -> Result<()> {
//!         if let Some(cred) = cred {
//!             req.headers.insert("x-key", cred.key.parse()?);
//!         }
//!         req.headers.insert("x-payload-hash", payload.hash().parse()?);
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(Context::new(), MyLoader, MySigner);
//!
//! let (mut parts, _) = http::Request::post("https://example.com")
//!     .body(())?
//!     .into_parts();
//! let payload = Payload::from("{}");
//!
//! signer.sign(&mut parts, &payload).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`header`]: Parsing of user supplied `Key: Value` header text
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod header;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod payload;
pub use payload::Payload;
mod request;
pub use request::SigningRequest;
mod signer;
pub use signer::Signer;
