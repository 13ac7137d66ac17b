use tokio::sync::{broadcast, mpsc};

use crate::domain::{Reel, ReelId, RestaurantId, ToggleEvent, ToggleKey, UserId};
use crate::error::EngagementError;
use crate::messages::{EngagementRequest, ToggleOutcome};

/// Client for the like/save/follow service.
#[derive(Clone, Debug)]
pub struct EngagementClient {
    sender: mpsc::Sender<EngagementRequest>,
    events: broadcast::Sender<ToggleEvent>,
}

impl EngagementClient {
    pub fn new(sender: mpsc::Sender<EngagementRequest>, events: broadcast::Sender<ToggleEvent>) -> Self {
        Self { sender, events }
    }

    /// Every optimistic apply and rollback, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<ToggleEvent> {
        self.events.subscribe()
    }

    pub async fn toggle_like(&self, reel: ReelId) -> Result<ToggleOutcome, EngagementError> {
        self.toggle(ToggleKey::like(reel), None).await
    }

    pub async fn toggle_save(&self, reel: ReelId) -> Result<ToggleOutcome, EngagementError> {
        self.toggle(ToggleKey::save(reel), None).await
    }

    /// Flips the follow. `current` is the backend-reported status, used when the
    /// session has not seen this restaurant yet (same value as [`Self::follow_status`]'s fallback).
    pub async fn toggle_follow(&self, restaurant: RestaurantId, current: bool) -> Result<ToggleOutcome, EngagementError> {
        self.toggle(ToggleKey::follow(restaurant), Some(current)).await
    }

    pub async fn is_liked(&self, reel: ReelId) -> Result<bool, EngagementError> {
        Ok(self.status(ToggleKey::like(reel)).await?.unwrap_or(false))
    }

    pub async fn is_saved(&self, reel: ReelId) -> Result<bool, EngagementError> {
        Ok(self.status(ToggleKey::save(reel)).await?.unwrap_or(false))
    }

    /// Local value when the session has one, else the backend-provided `fallback`.
    pub async fn follow_status(&self, restaurant: RestaurantId, fallback: bool) -> Result<bool, EngagementError> {
        Ok(self.status(ToggleKey::follow(restaurant)).await?.unwrap_or(fallback))
    }

    pub async fn seed_from_reels(&self, reels: Vec<Reel>) -> Result<(), EngagementError> {
        self.seed(reels).await
    }
}

client_shutdown!(EngagementClient, EngagementRequest);

client_method!(EngagementClient => fn toggle(key: ToggleKey, baseline: Option<bool>) -> ToggleOutcome as EngagementRequest::Toggle, Error = EngagementError);
client_method!(EngagementClient => fn status(key: ToggleKey) -> Option<bool> as EngagementRequest::Status, Error = EngagementError);
client_method!(EngagementClient => fn like_count(reel: ReelId) -> usize as EngagementRequest::LikeCount, Error = EngagementError);
client_method!(EngagementClient => fn liked_users(reel: ReelId) -> Vec<UserId> as EngagementRequest::LikedUsers, Error = EngagementError);
client_method!(EngagementClient => fn seed(reels: Vec<Reel>) -> () as EngagementRequest::Seed, Error = EngagementError);
client_method!(EngagementClient => fn idle() -> () as EngagementRequest::Idle, Error = EngagementError);
