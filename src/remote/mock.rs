//! # Mock remote
//!
//! Channel-backed [`RemoteStore`] for tests.
//!
//! Every call is forwarded as a [`RemoteRequest`] carrying a `oneshot` responder.
//! The test pulls requests off the receiver with the `expect_*` helpers, asserts
//! on the arguments and decides the outcome, including the order in which
//! overlapping calls resolve.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use super::{RemoteCheckoutGroup, RemoteStore};
use crate::domain::{CartLineItem, Comment, CommentId, Platform, ProductRef, Reel, ReelId, RestaurantId, UserId};
use crate::error::RemoteError;

pub type Reply<T> = oneshot::Sender<Result<T, RemoteError>>;

const EXPECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub enum RemoteRequest {
    FetchCart { respond_to: Reply<Vec<CartLineItem>> },
    AddItem { product: ProductRef, platform: Platform, respond_to: Reply<()> },
    RemoveItem { product: ProductRef, platform: Platform, respond_to: Reply<()> },
    UpdateQuantity { product: ProductRef, platform: Platform, quantity: u32, respond_to: Reply<()> },
    FetchCheckoutGroups { respond_to: Reply<Vec<RemoteCheckoutGroup>> },
    FetchReels { respond_to: Reply<Vec<Reel>> },
    ToggleLike { reel: ReelId, respond_to: Reply<Vec<UserId>> },
    SetSaved { reel: ReelId, saved: bool, respond_to: Reply<()> },
    SetFollow { restaurant: RestaurantId, follow: bool, respond_to: Reply<()> },
    AddComment { reel: ReelId, text: String, username: Option<String>, respond_to: Reply<Vec<Comment>> },
    DeleteComment { reel: ReelId, comment: CommentId, respond_to: Reply<()> },
    AddReply { reel: ReelId, comment: CommentId, text: String, respond_to: Reply<Vec<Comment>> },
    DeleteReply { reel: ReelId, comment: CommentId, reply: CommentId, respond_to: Reply<()> },
}

#[derive(Debug, Clone)]
pub struct MockRemote {
    sender: mpsc::UnboundedSender<RemoteRequest>,
}

/// Creates a mock remote and the receiver the test drives it from.
pub fn create_mock_remote() -> (Arc<MockRemote>, mpsc::UnboundedReceiver<RemoteRequest>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Arc::new(MockRemote { sender }), receiver)
}

impl MockRemote {
    async fn call<T>(&self, build: impl FnOnce(Reply<T>) -> RemoteRequest) -> Result<T, RemoteError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .map_err(|_| RemoteError::Network("mock remote closed".to_string()))?;
        response
            .await
            .map_err(|_| RemoteError::Network("mock responder dropped".to_string()))?
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn fetch_cart(&self) -> Result<Vec<CartLineItem>, RemoteError> {
        self.call(|respond_to| RemoteRequest::FetchCart { respond_to }).await
    }

    async fn add_item(&self, product: ProductRef, platform: Platform) -> Result<(), RemoteError> {
        self.call(|respond_to| RemoteRequest::AddItem { product, platform, respond_to }).await
    }

    async fn remove_item(&self, product: ProductRef, platform: Platform) -> Result<(), RemoteError> {
        self.call(|respond_to| RemoteRequest::RemoveItem { product, platform, respond_to }).await
    }

    async fn update_quantity(&self, product: ProductRef, platform: Platform, quantity: u32) -> Result<(), RemoteError> {
        self.call(|respond_to| RemoteRequest::UpdateQuantity { product, platform, quantity, respond_to }).await
    }

    async fn fetch_checkout_groups(&self) -> Result<Vec<RemoteCheckoutGroup>, RemoteError> {
        self.call(|respond_to| RemoteRequest::FetchCheckoutGroups { respond_to }).await
    }

    async fn fetch_reels(&self) -> Result<Vec<Reel>, RemoteError> {
        self.call(|respond_to| RemoteRequest::FetchReels { respond_to }).await
    }

    async fn toggle_like(&self, reel: ReelId) -> Result<Vec<UserId>, RemoteError> {
        self.call(|respond_to| RemoteRequest::ToggleLike { reel, respond_to }).await
    }

    async fn set_saved(&self, reel: ReelId, saved: bool) -> Result<(), RemoteError> {
        self.call(|respond_to| RemoteRequest::SetSaved { reel, saved, respond_to }).await
    }

    async fn set_follow(&self, restaurant: RestaurantId, follow: bool) -> Result<(), RemoteError> {
        self.call(|respond_to| RemoteRequest::SetFollow { restaurant, follow, respond_to }).await
    }

    async fn add_comment(&self, reel: ReelId, text: String, username: Option<String>) -> Result<Vec<Comment>, RemoteError> {
        self.call(|respond_to| RemoteRequest::AddComment { reel, text, username, respond_to }).await
    }

    async fn delete_comment(&self, reel: ReelId, comment: CommentId) -> Result<(), RemoteError> {
        self.call(|respond_to| RemoteRequest::DeleteComment { reel, comment, respond_to }).await
    }

    async fn add_reply(&self, reel: ReelId, comment: CommentId, text: String) -> Result<Vec<Comment>, RemoteError> {
        self.call(|respond_to| RemoteRequest::AddReply { reel, comment, text, respond_to }).await
    }

    async fn delete_reply(&self, reel: ReelId, comment: CommentId, reply: CommentId) -> Result<(), RemoteError> {
        self.call(|respond_to| RemoteRequest::DeleteReply { reel, comment, reply, respond_to }).await
    }
}

/// Next request, or panic if none arrives in time.
pub async fn next_request(receiver: &mut mpsc::UnboundedReceiver<RemoteRequest>) -> RemoteRequest {
    match tokio::time::timeout(EXPECT_TIMEOUT, receiver.recv()).await {
        Ok(Some(request)) => request,
        Ok(None) => panic!("mock remote closed"),
        Err(_) => panic!("no remote request within {:?}", EXPECT_TIMEOUT),
    }
}

/// Asserts that nothing is queued right now.
pub fn assert_no_request(receiver: &mut mpsc::UnboundedReceiver<RemoteRequest>) {
    if let Ok(request) = receiver.try_recv() {
        panic!("unexpected remote request: {:?}", request);
    }
}

pub async fn expect_fetch_cart(receiver: &mut mpsc::UnboundedReceiver<RemoteRequest>) -> Reply<Vec<CartLineItem>> {
    match next_request(receiver).await {
        RemoteRequest::FetchCart { respond_to } => respond_to,
        other => panic!("expected FetchCart, got {:?}", other),
    }
}

pub async fn expect_add_item(
    receiver: &mut mpsc::UnboundedReceiver<RemoteRequest>,
) -> (ProductRef, Platform, Reply<()>) {
    match next_request(receiver).await {
        RemoteRequest::AddItem { product, platform, respond_to } => (product, platform, respond_to),
        other => panic!("expected AddItem, got {:?}", other),
    }
}

pub async fn expect_remove_item(
    receiver: &mut mpsc::UnboundedReceiver<RemoteRequest>,
) -> (ProductRef, Platform, Reply<()>) {
    match next_request(receiver).await {
        RemoteRequest::RemoveItem { product, platform, respond_to } => (product, platform, respond_to),
        other => panic!("expected RemoveItem, got {:?}", other),
    }
}

pub async fn expect_update_quantity(
    receiver: &mut mpsc::UnboundedReceiver<RemoteRequest>,
) -> (ProductRef, Platform, u32, Reply<()>) {
    match next_request(receiver).await {
        RemoteRequest::UpdateQuantity { product, platform, quantity, respond_to } => {
            (product, platform, quantity, respond_to)
        }
        other => panic!("expected UpdateQuantity, got {:?}", other),
    }
}

pub async fn expect_fetch_reels(receiver: &mut mpsc::UnboundedReceiver<RemoteRequest>) -> Reply<Vec<Reel>> {
    match next_request(receiver).await {
        RemoteRequest::FetchReels { respond_to } => respond_to,
        other => panic!("expected FetchReels, got {:?}", other),
    }
}

pub async fn expect_toggle_like(
    receiver: &mut mpsc::UnboundedReceiver<RemoteRequest>,
) -> (ReelId, Reply<Vec<UserId>>) {
    match next_request(receiver).await {
        RemoteRequest::ToggleLike { reel, respond_to } => (reel, respond_to),
        other => panic!("expected ToggleLike, got {:?}", other),
    }
}

pub async fn expect_set_saved(
    receiver: &mut mpsc::UnboundedReceiver<RemoteRequest>,
) -> (ReelId, bool, Reply<()>) {
    match next_request(receiver).await {
        RemoteRequest::SetSaved { reel, saved, respond_to } => (reel, saved, respond_to),
        other => panic!("expected SetSaved, got {:?}", other),
    }
}

pub async fn expect_set_follow(
    receiver: &mut mpsc::UnboundedReceiver<RemoteRequest>,
) -> (RestaurantId, bool, Reply<()>) {
    match next_request(receiver).await {
        RemoteRequest::SetFollow { restaurant, follow, respond_to } => (restaurant, follow, respond_to),
        other => panic!("expected SetFollow, got {:?}", other),
    }
}

pub async fn expect_add_comment(
    receiver: &mut mpsc::UnboundedReceiver<RemoteRequest>,
) -> (ReelId, String, Reply<Vec<Comment>>) {
    match next_request(receiver).await {
        RemoteRequest::AddComment { reel, text, respond_to, .. } => (reel, text, respond_to),
        other => panic!("expected AddComment, got {:?}", other),
    }
}

pub async fn expect_delete_comment(
    receiver: &mut mpsc::UnboundedReceiver<RemoteRequest>,
) -> (ReelId, CommentId, Reply<()>) {
    match next_request(receiver).await {
        RemoteRequest::DeleteComment { reel, comment, respond_to } => (reel, comment, respond_to),
        other => panic!("expected DeleteComment, got {:?}", other),
    }
}

pub async fn expect_delete_reply(
    receiver: &mut mpsc::UnboundedReceiver<RemoteRequest>,
) -> (CommentId, CommentId, Reply<()>) {
    match next_request(receiver).await {
        RemoteRequest::DeleteReply { comment, reply, respond_to, .. } => (comment, reply, respond_to),
        other => panic!("expected DeleteReply, got {:?}", other),
    }
}
