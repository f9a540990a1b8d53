//! Identity provider client.
//!
//! The identity store owns the authentication records. This core only ever
//! resolves records by email, deletes them by `uid`, and asks the provider to
//! verify bearer tokens (token verification mechanics stay on the provider's
//! side).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use smartmess_common::{AppError, AppResult};

/// An authentication record owned by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Unique identifier within the provider.
    pub uid: String,
    /// Email address the record is addressable by.
    pub email: String,
}

/// The verified identity of a request caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// The caller's `uid` in the identity store.
    pub uid: String,
    /// The caller's email address.
    pub email: String,
}

/// Identity store backend trait.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Verify a bearer token, returning the caller identity it proves.
    /// Invalid or expired tokens are `None`, not errors.
    async fn verify_token(&self, token: &str) -> AppResult<Option<CallerIdentity>>;

    /// Resolve an email to an identity record. Absent records are `None`.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<IdentityRecord>>;

    /// Delete an identity record by `uid`.
    async fn delete(&self, uid: &str) -> AppResult<()>;
}

/// HTTP backend speaking the identity provider's admin REST API.
pub struct HttpIdentityStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct LookupRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

impl HttpIdentityStore {
    /// Create a new HTTP identity store client.
    #[allow(clippy::expect_used)] // Client build only fails with incompatible TLS settings
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/accounts:{path}", self.base_url)
    }
}

#[async_trait]
impl IdentityStore for HttpIdentityStore {
    async fn verify_token(&self, token: &str) -> AppResult<Option<CallerIdentity>> {
        let response = self
            .client
            .post(self.url("verify"))
            .bearer_auth(&self.api_key)
            .json(&VerifyRequest { token })
            .send()
            .await
            .map_err(|e| AppError::IdentityStore(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(|e| AppError::IdentityStore(e.to_string()))?;

        response
            .json::<CallerIdentity>()
            .await
            .map(Some)
            .map_err(|e| AppError::IdentityStore(e.to_string()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<IdentityRecord>> {
        let response = self
            .client
            .post(self.url("lookup"))
            .bearer_auth(&self.api_key)
            .json(&LookupRequest { email })
            .send()
            .await
            .map_err(|e| AppError::IdentityStore(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(|e| AppError::IdentityStore(e.to_string()))?;

        response
            .json::<IdentityRecord>()
            .await
            .map(Some)
            .map_err(|e| AppError::IdentityStore(e.to_string()))
    }

    async fn delete(&self, uid: &str) -> AppResult<()> {
        self.client
            .delete(format!("{}/v1/accounts/{uid}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::IdentityStore(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::IdentityStore(e.to_string()))?;

        Ok(())
    }
}
