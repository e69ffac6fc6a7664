/// Signed-in user display
///
/// When mounted, [`SessionDisplay`] asks the identity provider for the
/// current session once, in the background, and shows the session's subject
/// identifier. A failed lookup is logged and leaves the display blank; there
/// is no retry and no periodic refresh.
///
/// The board API identifies users by a numeric ID carried in the token's
/// `sub` claim, so the identity provider must issue numeric subjects for a
/// displayed user to reach the board. [`Session::user_id`] exposes that ID.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_client::session::{HttpIdentityProvider, SessionDisplay};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = HttpIdentityProvider::new("https://id.example.com/oauth2/userInfo", "access-token");
/// let display = SessionDisplay::new(Arc::new(provider));
///
/// display.mount().await?;
/// println!("Signed in as {}", display.text());
///
/// display.sign_out().await?;
/// assert_eq!(display.text(), "");
/// # Ok(())
/// # }
/// ```
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ClientError;

/// Current session as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    /// Subject identifier of the signed-in user
    pub sub: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default, alias = "username")]
    pub preferred_username: Option<String>,
}

impl Session {
    /// Board user ID, when the subject is numeric
    pub fn user_id(&self) -> Option<i64> {
        self.sub.trim().parse().ok()
    }
}

/// Source of the current session
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetches the session of the signed-in user
    async fn current_session(&self) -> Result<Session, ClientError>;

    /// Forgets the stored credentials
    async fn sign_out(&self) -> Result<(), ClientError>;
}

/// Identity provider reached through an OpenID Connect userinfo endpoint
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    userinfo_url: String,
    token: RwLock<Option<String>>,
}

impl HttpIdentityProvider {
    pub fn new(userinfo_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), userinfo_url, access_token)
    }

    pub fn with_client(
        client: reqwest::Client,
        userinfo_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            userinfo_url: userinfo_url.into(),
            token: RwLock::new(Some(access_token.into())),
        }
    }

    /// The stored access token, if still signed in
    pub async fn access_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn current_session(&self) -> Result<Session, ClientError> {
        let token = self.access_token().await.ok_or(ClientError::SignedOut)?;

        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }

        Ok(response.json::<Session>().await?)
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        self.token.write().await.take();
        debug!("Access token cleared");
        Ok(())
    }
}

/// Display of the signed-in user's identifier with a sign-out control
pub struct SessionDisplay {
    provider: Arc<dyn IdentityProvider>,
    identity: Arc<watch::Sender<Option<String>>>,
    signed_out: Arc<AtomicBool>,
}

impl SessionDisplay {
    /// Creates a blank display
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (identity, _) = watch::channel(None);

        Self {
            provider,
            identity: Arc::new(identity),
            signed_out: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Starts the one-off session lookup in the background
    ///
    /// The returned handle completes once the lookup has finished, whatever
    /// its outcome.
    pub fn mount(&self) -> JoinHandle<()> {
        let provider = Arc::clone(&self.provider);
        let identity = Arc::clone(&self.identity);
        let signed_out = Arc::clone(&self.signed_out);

        tokio::spawn(async move {
            match provider.current_session().await {
                Ok(session) => {
                    // A sign-out that raced the lookup wins
                    identity.send_if_modified(|current| {
                        if signed_out.load(Ordering::SeqCst) {
                            return false;
                        }
                        *current = Some(session.sub.clone());
                        true
                    });
                    debug!(sub = %session.sub, "Session loaded");
                }
                Err(e) => {
                    warn!(error = %e, "Failed to fetch current session");
                }
            }
        })
    }

    /// The displayed identifier, empty when unknown
    pub fn text(&self) -> String {
        self.identity.borrow().clone().unwrap_or_default()
    }

    /// The displayed identifier, if any
    pub fn identity(&self) -> Option<String> {
        self.identity.borrow().clone()
    }

    /// Receiver notified whenever the displayed identity changes
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.identity.subscribe()
    }

    /// Clears the display and the provider's stored credentials
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        self.signed_out.store(true, Ordering::SeqCst);
        self.identity.send_replace(None);

        self.provider.sign_out().await?;
        info!("Signed out");
        Ok(())
    }
}
