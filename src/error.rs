use thiserror::Error;

use crate::domain::Platform;

/// Message used when the server rejects a request without explaining why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Action failed";

/// Outcome classes of a remote call that did not succeed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RemoteError {
    /// The request went out but no response came back.
    #[error("No response from server: {0}")]
    Network(String),
    /// The server answered with an error status, without `success: true` on a
    /// cart write, or with a body that could not be read.
    #[error("Server rejected request: {message}")]
    Rejected { status: Option<u16>, message: String },
    /// The request was never sent (bad configuration or an unbuildable request).
    #[error("Request setup error: {0}")]
    Setup(String),
}

impl RemoteError {
    pub fn rejected(status: Option<u16>, message: Option<String>) -> Self {
        let message = message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        RemoteError::Rejected { status, message }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Cart request failed: {0}")]
    Remote(RemoteError),
    #[error("Item not in cart: {product} on {platform}")]
    NotInCart { product: String, platform: Platform },
    #[error("Cart changed but could not be refreshed: {0}")]
    ReconcileFailed(RemoteError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl CartError {
    /// Blocking, user-visible text. Cart failures are never silent.
    pub fn user_message(&self) -> String {
        match self {
            CartError::Remote(RemoteError::Network(_)) => {
                "No response from server. Please check your connection and try again.".to_string()
            }
            CartError::Remote(RemoteError::Rejected { message, .. }) => {
                format!("Failed to update cart: {}", message)
            }
            CartError::Remote(RemoteError::Setup(detail)) => format!("Error: {}", detail),
            CartError::NotInCart { .. } => "This item is no longer in your cart.".to_string(),
            CartError::ReconcileFailed(_) => {
                "Your cart was updated but could not be refreshed. Pull to refresh.".to_string()
            }
            CartError::ActorCommunicationError(_) => "Cart is unavailable right now.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngagementError {
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CommentError {
    #[error("Comment request failed: {0}")]
    Remote(#[from] RemoteError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("This restaurant has not provided a {platform} link yet.")]
    LinkUnavailable { restaurant: String, platform: String },
    #[error("{platform} price not available for {product}")]
    PriceUnavailable { product: String, platform: String },
    #[error("Item not in comparison: {0}")]
    NotInComparison(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Stored data is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage lock poisoned")]
    Poisoned,
}
