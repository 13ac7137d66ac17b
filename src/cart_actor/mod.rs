//! Cart service: canonical cart lines, fetch-after-write synchronisation with the
//! backend, snapshot persistence and cart panel visibility.

mod lines;
mod service;

pub use lines::CartLines;
pub use service::CartService;
