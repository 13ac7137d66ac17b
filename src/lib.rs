//! # foodreel-sync
//!
//! Client-side state engine for a food-reel discovery app: optimistic
//! like/save/follow toggles, a server-reconciled cart, checkout grouping by
//! restaurant, and the feed's gesture and scroll coordinator.
//!
//! ## Layout
//!
//! Stateful engines follow the service/client split:
//!
//! - **Service** (e.g. [`cart_actor::CartService`]) owns its state and runs as a tokio task
//! - **Client** (e.g. [`clients::CartClient`]) is a cloneable handle that sends typed requests
//!
//! [`app_system::ClientSystem`] builds all services once per session, injects the
//! shared [`remote::RemoteStore`], [`storage::LocalStore`] and [`session::Session`],
//! and shuts everything down in order.
//!
//! Pure projections ([`checkout::group_for_checkout`], [`checkout::ComparisonSession`])
//! and the feed state machine ([`feed::FeedCoordinator`]) carry no actor.
//!
//! ## Example
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use foodreel_sync::app_system::ClientSystem;
//! use foodreel_sync::domain::Platform;
//! use foodreel_sync::remote::HttpRemoteStore;
//! use foodreel_sync::session::Session;
//! use foodreel_sync::storage::MemoryStore;
//!
//! let remote = Arc::new(HttpRemoteStore::new("http://localhost:5000/api", None)?);
//! let system = ClientSystem::new(remote, Arc::new(MemoryStore::default()), Session::new(), 32);
//!
//! let view = system.cart_client.add_or_increment("reel_1".into(), Platform::Zomato).await?;
//! println!("{} items, total {}", view.total_quantity, view.total_price);
//!
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod app_system;
pub mod cart_actor;
pub mod checkout;
pub mod clients;
pub mod comment_actor;
pub mod domain;
pub mod engagement_actor;
pub mod error;
pub mod feed;
pub mod messages;
pub mod remote;
pub mod session;
pub mod storage;

#[cfg(test)]
mod integration_tests;
