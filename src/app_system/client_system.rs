use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::cart_actor::CartService;
use crate::checkout::CheckoutGroup;
use crate::clients::{CartClient, CommentClient, EngagementClient};
use crate::comment_actor::CommentService;
use crate::domain::{Reel, SearchHistory};
use crate::engagement_actor::EngagementService;
use crate::error::CartError;
use crate::remote::RemoteStore;
use crate::session::Session;
use crate::storage::LocalStore;

/// Every engine of one client session, wired to the same remote, storage and identity.
///
/// Responsible for starting up services, seeding them, and handling shutdown.
pub struct ClientSystem {
    pub cart_client: CartClient,
    pub engagement_client: EngagementClient,
    pub comment_client: CommentClient,
    session: Session,
    remote: Arc<dyn RemoteStore>,
    storage: Arc<dyn LocalStore>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl ClientSystem {
    pub fn new(remote: Arc<dyn RemoteStore>, storage: Arc<dyn LocalStore>, session: Session, buffer_size: usize) -> Self {
        let (cart_service, cart_client) = CartService::new(buffer_size, remote.clone(), storage.clone());
        let cart_handle = tokio::spawn(cart_service.run());

        let (engagement_service, engagement_client) =
            EngagementService::new(buffer_size, remote.clone(), session.clone());
        let engagement_handle = tokio::spawn(engagement_service.run());

        let (comment_service, comment_client) = CommentService::new(buffer_size, remote.clone(), session.clone());
        let comment_handle = tokio::spawn(comment_service.run());

        Self {
            cart_client,
            engagement_client,
            comment_client,
            session,
            remote,
            storage,
            handles: vec![cart_handle, engagement_handle, comment_handle],
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Loads the feed and seeds engagement and comment state from it, then
    /// refreshes the cart. A cart refresh failure keeps the local snapshot.
    #[instrument(name = "bootstrap", skip(self))]
    pub async fn bootstrap(&self) -> Result<Vec<Reel>, String> {
        let reels = self.remote.fetch_reels().await.map_err(|e| e.to_string())?;
        info!(reels = reels.len(), "Feed loaded");

        self.engagement_client
            .seed_from_reels(reels.clone())
            .await
            .map_err(|e| e.to_string())?;
        self.comment_client
            .seed_from_reels(reels.clone())
            .await
            .map_err(|e| e.to_string())?;

        if let Err(e) = self.cart_client.refresh().await {
            warn!(error = %e, "Cart refresh failed, keeping local snapshot");
        }
        Ok(reels)
    }

    /// Persisted recent searches.
    pub fn search_history(&self) -> SearchHistory {
        SearchHistory::load(self.storage.clone())
    }

    /// The backend's own restaurant grouping, for when the server decides availability.
    pub async fn fetch_checkout_groups(&self) -> Result<Vec<CheckoutGroup>, CartError> {
        let groups = self
            .remote
            .fetch_checkout_groups()
            .await
            .map_err(CartError::Remote)?;
        Ok(groups.into_iter().map(CheckoutGroup::from).collect())
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down client system...");

        self.comment_client.shutdown().await?;
        self.engagement_client.shutdown().await?;
        self.cart_client.shutdown().await?;

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Service task failed: {:?}", e);
                return Err(format!("Service task failed: {:?}", e));
            }
        }

        info!("Client system shutdown complete.");
        Ok(())
    }
}
