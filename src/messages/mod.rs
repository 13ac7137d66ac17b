use tokio::sync::oneshot;

use crate::domain::{
    CartLineItem, CartView, Comment, CommentId, PendingToggle, Platform, ProductRef, Reel, ReelId, ToggleKey, UserId,
};
use crate::error::{CartError, CommentError, EngagementError, RemoteError};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed message enums for actor communication. Each variant includes parameters
/// and a oneshot channel for responses.

#[derive(Debug)]
pub enum CartRequest {
    View {
        respond_to: ServiceResponse<CartView, CartError>,
    },
    Refresh {
        respond_to: ServiceResponse<CartView, CartError>,
    },
    AddOrIncrement {
        product: ProductRef,
        platform: Platform,
        respond_to: ServiceResponse<CartView, CartError>,
    },
    AddLocal {
        item: CartLineItem,
        respond_to: ServiceResponse<CartView, CartError>,
    },
    Increase {
        product: ProductRef,
        platform: Platform,
        respond_to: ServiceResponse<CartView, CartError>,
    },
    Decrease {
        product: ProductRef,
        platform: Platform,
        respond_to: ServiceResponse<CartView, CartError>,
    },
    Remove {
        product: ProductRef,
        platform: Platform,
        respond_to: ServiceResponse<CartView, CartError>,
    },
    Clear {
        respond_to: ServiceResponse<CartView, CartError>,
    },
    SetPanel {
        open: bool,
        respond_to: ServiceResponse<CartView, CartError>,
    },
    /// Sent by a background task once the authoritative cart is back.
    Reconcile {
        items: Vec<CartLineItem>,
        open_panel: bool,
        respond_to: ServiceResponse<CartView, CartError>,
    },
    Shutdown,
}

/// What the server confirmed. Likes also carry the updated liker list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Confirmation {
    pub likers: Option<Vec<UserId>>,
}

/// Result of asking for a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The new value is already visible; the remote call is in flight.
    Applied { value: bool },
    /// No identity: nothing changed and no request was sent.
    Unauthenticated,
}

#[derive(Debug)]
pub enum EngagementRequest {
    Toggle {
        key: ToggleKey,
        /// Starting value when the key was never seeded or toggled.
        baseline: Option<bool>,
        respond_to: ServiceResponse<ToggleOutcome, EngagementError>,
    },
    /// Sent by the background task once the remote call resolved.
    Settle {
        pending: PendingToggle,
        outcome: Result<Confirmation, RemoteError>,
    },
    Status {
        key: ToggleKey,
        respond_to: ServiceResponse<Option<bool>, EngagementError>,
    },
    LikeCount {
        reel: ReelId,
        respond_to: ServiceResponse<usize, EngagementError>,
    },
    LikedUsers {
        reel: ReelId,
        respond_to: ServiceResponse<Vec<UserId>, EngagementError>,
    },
    Seed {
        reels: Vec<Reel>,
        respond_to: ServiceResponse<(), EngagementError>,
    },
    /// Resolves once no toggle is in flight.
    Idle {
        respond_to: ServiceResponse<(), EngagementError>,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum CommentRequest {
    Add {
        reel: ReelId,
        text: String,
        respond_to: ServiceResponse<Vec<Comment>, CommentError>,
    },
    Delete {
        reel: ReelId,
        comment: CommentId,
        respond_to: ServiceResponse<Vec<Comment>, CommentError>,
    },
    AddReply {
        reel: ReelId,
        comment: CommentId,
        text: String,
        respond_to: ServiceResponse<Vec<Comment>, CommentError>,
    },
    DeleteReply {
        reel: ReelId,
        comment: CommentId,
        reply: CommentId,
        respond_to: ServiceResponse<Vec<Comment>, CommentError>,
    },
    List {
        reel: ReelId,
        respond_to: ServiceResponse<Vec<Comment>, CommentError>,
    },
    Count {
        reel: ReelId,
        respond_to: ServiceResponse<usize, CommentError>,
    },
    Seed {
        reels: Vec<Reel>,
        respond_to: ServiceResponse<(), CommentError>,
    },
    Shutdown,
}
