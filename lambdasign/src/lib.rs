#![doc = include_str!("../README.md")]

pub use lambdasign_core::*;

pub mod aws {
    //! AWS SigV4 signing for Lambda function URLs.
    pub use lambdasign_aws_v4::*;
}

pub use lambdasign_http_send_reqwest::{ReqwestHttpSend, DEFAULT_TIMEOUT};

mod invocation;
pub use invocation::{Invocation, Response};

pub mod output;
