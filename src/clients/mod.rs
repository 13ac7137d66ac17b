//! Cloneable handles on the services. Each public method is one request/response
//! round-trip over the service's channel.

#[macro_use]
mod macros;

mod cart_client;
mod comment_client;
mod engagement_client;

pub use cart_client::CartClient;
pub use comment_client::CommentClient;
pub use engagement_client::EngagementClient;
