//! Bridges the AWS SDK credential chain into `object_store`.
//!
//! `AmazonS3Builder::from_env` only understands `AWS_*` variables and instance
//! metadata. Routing S3 through the SDK chain gives it the same profile, SSO
//! and `~/.aws/credentials` resolution that Rekognition uses.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use object_store::aws::{AwsCredential, AwsCredentialProvider};
use object_store::CredentialProvider;
use tracing::debug;

/// Refresh temporary credentials this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(5 * 60);

struct Cached {
    credential: Arc<AwsCredential>,
    expires_at: Option<SystemTime>,
}

impl Cached {
    fn is_fresh(&self, now: SystemTime) -> bool {
        match self.expires_at {
            None => true,
            Some(expiry) => now + EXPIRY_MARGIN < expiry,
        }
    }
}

/// `object_store` credential provider backed by an SDK credentials provider.
pub struct SdkCredentials {
    provider: SharedCredentialsProvider,
    cached: Mutex<Option<Cached>>,
}

impl SdkCredentials {
    pub fn new(provider: SharedCredentialsProvider) -> Self {
        Self {
            provider,
            cached: Mutex::new(None),
        }
    }

    fn cached(&self) -> Option<Arc<AwsCredential>> {
        let guard = self.cached.lock().ok()?;
        guard
            .as_ref()
            .filter(|c| c.is_fresh(SystemTime::now()))
            .map(|c| c.credential.clone())
    }
}

impl fmt::Debug for SdkCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkCredentials").finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialProvider for SdkCredentials {
    type Credential = AwsCredential;

    async fn get_credential(&self) -> object_store::Result<Arc<AwsCredential>> {
        if let Some(credential) = self.cached() {
            return Ok(credential);
        }

        let credentials = self
            .provider
            .provide_credentials()
            .await
            .map_err(|e| object_store::Error::Generic {
                store: "S3",
                source: Box::new(e),
            })?;
        debug!(expires = ?credentials.expiry(), "Resolved AWS credentials for S3");

        let credential = Arc::new(AwsCredential {
            key_id: credentials.access_key_id().to_string(),
            secret_key: credentials.secret_access_key().to_string(),
            token: credentials.session_token().map(str::to_string),
        });
        if let Ok(mut guard) = self.cached.lock() {
            *guard = Some(Cached {
                credential: credential.clone(),
                expires_at: credentials.expiry(),
            });
        }
        Ok(credential)
    }
}

/// Wrap an SDK provider for `AmazonS3Builder::with_credentials`.
pub fn sdk_credentials(provider: SharedCredentialsProvider) -> AwsCredentialProvider {
    Arc::new(SdkCredentials::new(provider))
}
