use crate::{Context, Error, Payload, ProvideCredential, Result, SignRequest, SigningCredential};
use log::debug;
use std::sync::Arc;

/// Signer is the main struct used to sign the request.
///
/// The credential is loaded for every call and dropped afterwards; nothing
/// is cached between two signings.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
        }
    }

    /// Signing request.
    pub async fn sign(&self, req: &mut http::request::Parts, payload: &Payload) -> Result<()> {
        let cred = self.loader.provide_credential(&self.ctx).await?;
        if !cred.is_valid() {
            return Err(Error::credential_invalid(
                "no valid credential available for signing",
            ));
        }
        debug!("credential loaded, signing request to {}", req.uri);

        self.builder
            .sign_request(&self.ctx, req, payload, cred.as_ref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use async_trait::async_trait;
    use http::request::Parts;

    #[derive(Clone, Debug)]
    struct TestCredential(String);

    impl SigningCredential for TestCredential {
        fn is_valid(&self) -> bool {
            !self.0.is_empty()
        }
    }

    #[derive(Debug)]
    struct TestLoader(Option<TestCredential>);

    #[async_trait]
    impl ProvideCredential for TestLoader {
        type Credential = TestCredential;

        async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug)]
    struct TestBuilder;

    #[async_trait]
    impl SignRequest for TestBuilder {
        type Credential = TestCredential;

        async fn sign_request(
            &self,
            _: &Context,
            req: &mut Parts,
            payload: &Payload,
            cred: Option<&Self::Credential>,
        ) -> Result<()> {
            let cred = cred.ok_or_else(|| Error::credential_invalid("missing"))?;
            req.headers
                .insert("x-test", format!("{}:{}", cred.0, payload.hash()).parse()?);
            Ok(())
        }
    }

    fn parts() -> Parts {
        http::Request::get("https://example.com")
            .body(())
            .expect("request must be valid")
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn test_sign_with_credential() -> Result<()> {
        let signer = Signer::new(
            Context::new(),
            TestLoader(Some(TestCredential("key".into()))),
            TestBuilder,
        );

        let mut p = parts();
        signer.sign(&mut p, &Payload::empty()).await?;

        assert_eq!(
            p.headers["x-test"],
            format!("key:{}", crate::hash::EMPTY_STRING_SHA256).as_str()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_without_credential() {
        let signer = Signer::new(Context::new(), TestLoader(None), TestBuilder);

        let mut p = parts();
        let err = signer
            .sign(&mut p, &Payload::empty())
            .await
            .expect_err("must fail without credential");
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
        assert!(p.headers.is_empty());
    }
}
