//! Optimistic like/save/follow toggles.

mod service;

pub use service::{EngagementService, RemoteCall, RemoteFuture};
