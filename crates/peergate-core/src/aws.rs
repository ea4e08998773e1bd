//! AWS Secrets Manager backend

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;
use tracing::instrument;

use crate::error::BackendError;
use crate::source::{SecretBackend, SecretPayload};

/// [`SecretBackend`] backed by AWS Secrets Manager.
///
/// Each coordinate is a secret id; the secret value is the JSON map of peers.
#[derive(Debug, Clone)]
pub struct SecretsManagerBackend {
    client: Client,
}

impl SecretsManagerBackend {
    /// Wrap an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default credential and region provider chains
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl SecretBackend for SecretsManagerBackend {
    #[instrument(skip(self))]
    async fn get_secret_value(&self, secret_id: &str) -> Result<SecretPayload, BackendError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|err| match err.as_service_error() {
                Some(e) if e.is_resource_not_found_exception() => BackendError::NotFound,
                _ => BackendError::Unavailable(DisplayErrorContext(&err).to_string()),
            })?;

        // Depending on how the secret was stored, one of these is populated
        if let Some(text) = output.secret_string() {
            return Ok(SecretPayload::Text(text.to_string()));
        }
        if let Some(binary) = output.secret_binary() {
            return Ok(SecretPayload::Binary(binary.as_ref().to_vec()));
        }
        Err(BackendError::Empty)
    }
}
