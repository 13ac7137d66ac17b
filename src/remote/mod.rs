//! Remote source of truth for cart, engagement and comments.
//!
//! The engines only see the [`RemoteStore`] trait; [`HttpRemoteStore`] talks to the
//! REST backend, and tests use the channel-backed double in `mock`.

mod http;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{CartLineItem, Comment, CommentId, Platform, ProductRef, Reel, ReelId, RestaurantId, UserId};
use crate::error::RemoteError;

pub use http::HttpRemoteStore;

#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    async fn fetch_cart(&self) -> Result<Vec<CartLineItem>, RemoteError>;
    async fn add_item(&self, product: ProductRef, platform: Platform) -> Result<(), RemoteError>;
    async fn remove_item(&self, product: ProductRef, platform: Platform) -> Result<(), RemoteError>;
    async fn update_quantity(&self, product: ProductRef, platform: Platform, quantity: u32) -> Result<(), RemoteError>;
    async fn fetch_checkout_groups(&self) -> Result<Vec<RemoteCheckoutGroup>, RemoteError>;

    async fn fetch_reels(&self) -> Result<Vec<Reel>, RemoteError>;
    /// Flips the like server-side and returns the full updated liker list.
    async fn toggle_like(&self, reel: ReelId) -> Result<Vec<UserId>, RemoteError>;
    async fn set_saved(&self, reel: ReelId, saved: bool) -> Result<(), RemoteError>;
    async fn set_follow(&self, restaurant: RestaurantId, follow: bool) -> Result<(), RemoteError>;

    async fn add_comment(&self, reel: ReelId, text: String, username: Option<String>) -> Result<Vec<Comment>, RemoteError>;
    async fn delete_comment(&self, reel: ReelId, comment: CommentId) -> Result<(), RemoteError>;
    async fn add_reply(&self, reel: ReelId, comment: CommentId, text: String) -> Result<Vec<Comment>, RemoteError>;
    async fn delete_reply(&self, reel: ReelId, comment: CommentId, reply: CommentId) -> Result<(), RemoteError>;
}

/// Deep-links block of the backend's own checkout grouping.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCheckoutLinks {
    #[serde(default)]
    pub zomato: Option<String>,
    #[serde(default)]
    pub zomato_available: bool,
    #[serde(default)]
    pub swiggy: Option<String>,
    #[serde(default)]
    pub swiggy_available: bool,
}

/// One restaurant group as returned by `GET /cart/checkout`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCheckoutGroup {
    #[serde(alias = "restaurantId", default)]
    pub restaurant_reference: RestaurantId,
    #[serde(default)]
    pub restaurant_name: String,
    #[serde(default)]
    pub items: Vec<CartLineItem>,
    #[serde(default)]
    pub checkout_links: RemoteCheckoutLinks,
}
