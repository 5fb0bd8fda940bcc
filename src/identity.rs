use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("User not authenticated.")]
    NotSignedIn,
    #[error("Identity provider error: {0}")]
    Provider(String),
}

impl Serialize for IdentityError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Source of the user identifier and bearer credential.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Result<Option<String>, IdentityError>;

    async fn sign_in_anonymously(&self) -> Result<String, IdentityError>;

    /// Bearer token for the signed-in user. Fails with `NotSignedIn` when nobody is.
    async fn id_token(&self) -> Result<String, IdentityError>;
}

#[derive(Debug, Clone)]
struct Credentials {
    uid: String,
    token: String,
}

/// In-process identity provider.
#[derive(Debug, Default)]
pub struct LocalIdentity {
    credentials: Mutex<Option<Credentials>>,
    allow_anonymous: bool,
}

impl LocalIdentity {
    pub fn signed_in(uid: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            credentials: Mutex::new(Some(Credentials {
                uid: uid.into(),
                token: token.into(),
            })),
            allow_anonymous: true,
        }
    }

    /// No session yet; anonymous sign-in mints a fresh identity.
    pub fn signed_out() -> Self {
        Self {
            credentials: Mutex::new(None),
            allow_anonymous: true,
        }
    }

    /// No session and anonymous sign-in disabled.
    pub fn unavailable() -> Self {
        Self {
            credentials: Mutex::new(None),
            allow_anonymous: false,
        }
    }

    pub fn sign_out(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Credentials>> {
        self.credentials.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn current_user(&self) -> Result<Option<String>, IdentityError> {
        Ok(self.lock().as_ref().map(|c| c.uid.clone()))
    }

    async fn sign_in_anonymously(&self) -> Result<String, IdentityError> {
        if !self.allow_anonymous {
            return Err(IdentityError::Provider(
                "anonymous sign-in is disabled".to_string(),
            ));
        }
        let uid = uuid::Uuid::new_v4().to_string();
        let token = format!("anon-{}", uuid::Uuid::new_v4());
        *self.lock() = Some(Credentials {
            uid: uid.clone(),
            token,
        });
        Ok(uid)
    }

    async fn id_token(&self) -> Result<String, IdentityError> {
        self.lock()
            .as_ref()
            .map(|c| c.token.clone())
            .ok_or(IdentityError::NotSignedIn)
    }
}

/// Resolved identity for one session. Shells show a loading state until
/// `resolve` returns; `user_id` is `None` when sign-in failed and
/// identity-bound features stay inert.
#[derive(Clone)]
pub struct Session {
    user_id: Option<String>,
    provider: Arc<dyn IdentityProvider>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub async fn resolve(provider: Arc<dyn IdentityProvider>) -> Self {
        let user_id = match provider.current_user().await {
            Ok(Some(uid)) => Some(uid),
            Ok(None) => match provider.sign_in_anonymously().await {
                Ok(uid) => {
                    info!(user_id = %uid, "signed in anonymously");
                    Some(uid)
                }
                Err(e) => {
                    error!(error = %e, "anonymous sign-in failed");
                    None
                }
            },
            Err(e) => {
                error!(error = %e, "could not read current user");
                None
            }
        };
        Self { user_id, provider }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn provider(&self) -> Arc<dyn IdentityProvider> {
        Arc::clone(&self.provider)
    }
}
