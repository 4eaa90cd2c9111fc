use crate::constants::*;
use crate::Credential;
use lambdasign_core::utils::Redact;
use lambdasign_core::{Context, Error, Result};
use std::fmt::{Debug, Formatter};

/// Config for invoking a Lambda function URL.
///
/// The config is built once by the caller, usually with [`Config::from_env`],
/// and handed to the signing pipeline as an explicit value.
#[derive(Clone, Default)]
pub struct Config {
    /// `region` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_REGION`]
    ///
    /// When still `None`, the region is guessed from the target url.
    pub region: Option<String>,
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_ACCESS_KEY_ID`]
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_SECRET_ACCESS_KEY`]
    pub secret_access_key: Option<String>,
    /// `session_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_SESSION_TOKEN`]
    pub session_token: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("region", &self.region)
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Values already set on the config are kept. Empty env values are
    /// treated as unset.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();
        let get = |key: &str| envs.get(key).filter(|v| !v.is_empty()).cloned();

        if self.region.is_none() {
            self.region = get(AWS_REGION);
        }
        if self.access_key_id.is_none() {
            self.access_key_id = get(AWS_ACCESS_KEY_ID);
        }
        if self.secret_access_key.is_none() {
            self.secret_access_key = get(AWS_SECRET_ACCESS_KEY);
        }
        if self.session_token.is_none() {
            self.session_token = get(AWS_SESSION_TOKEN);
        }

        self
    }

    /// Build the credential described by this config.
    ///
    /// Fails with [`lambdasign_core::ErrorKind::ConfigInvalid`] naming the
    /// missing variable, signing never starts without both keys.
    pub fn credential(&self) -> Result<Credential> {
        let access_key_id = self.access_key_id.as_deref().ok_or_else(|| {
            Error::config_invalid(format!("{AWS_ACCESS_KEY_ID} env variable is required"))
        })?;
        let secret_access_key = self.secret_access_key.as_deref().ok_or_else(|| {
            Error::config_invalid(format!("{AWS_SECRET_ACCESS_KEY} env variable is required"))
        })?;

        let cred = Credential::new(access_key_id, secret_access_key);
        Ok(match self.session_token.as_deref() {
            Some(token) => cred.with_session_token(token),
            None => cred,
        })
    }
}
