//! System orchestration, configuration, startup, and shutdown logic.

pub mod client_system;
pub mod config;
pub mod telemetry;

pub use client_system::*;
pub use config::*;
pub use telemetry::*;
