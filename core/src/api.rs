use crate::{Context, Payload, Result};
use std::fmt::Debug;

/// SigningCredential is the trait used by signer as the signing credential.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the signing credential is valid.
    fn is_valid(&self) -> bool;
}

impl<T: SigningCredential> SigningCredential for Option<T> {
    fn is_valid(&self) -> bool {
        let Some(ctx) = self else {
            return false;
        };

        ctx.is_valid()
    }
}

/// ProvideCredential is the trait used by signer to load the credential.
///
/// Credentials are supplied per invocation: implementations must not persist
/// them anywhere.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this loader.
    type Credential: Send + Sync + Unpin + 'static;

    /// Load signing credential.
    ///
    /// Returns `Ok(None)` when this provider has nothing to offer.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}

/// SignRequest is the trait used by signer to sign the request.
#[async_trait::async_trait]
pub trait SignRequest: Debug + Send + Sync + Unpin + 'static {
    /// Credential used by this builder.
    type Credential: Send + Sync + Unpin + 'static;

    /// Sign the request in place.
    ///
    /// ## Payload
    ///
    /// The `payload` is the body that will be transmitted with `req`; its
    /// hash is what the signature commits to.
    ///
    /// ## Credential
    ///
    /// Implementations decide what to do without a credential. The AWS
    /// signer refuses to sign.
    async fn sign_request(
        &self,
        ctx: &Context,
        req: &mut http::request::Parts,
        payload: &Payload,
        credential: Option<&Self::Credential>,
    ) -> Result<()>;
}
