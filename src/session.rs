//! Who is signed in. Token issuance lives elsewhere; engines only ask whether
//! an identity exists.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::domain::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub name: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Shared handle on the current identity. Clones observe the same value.
#[derive(Debug, Clone)]
pub struct Session {
    identity: Arc<watch::Sender<Option<Identity>>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            identity: Arc::new(identity),
        }
    }

    pub fn signed_in(identity: Identity) -> Self {
        let session = Self::new();
        session.sign_in(identity);
        session
    }

    pub fn sign_in(&self, identity: Identity) {
        info!(user_id = %identity.user_id, "Signed in");
        self.identity.send_replace(Some(identity));
    }

    pub fn sign_out(&self) {
        info!("Signed out");
        self.identity.send_replace(None);
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.identity.borrow().as_ref().map(|identity| identity.user_id.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }
}
