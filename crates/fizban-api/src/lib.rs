//! HTTP API for the Fizban world backend.
//!
//! This crate exposes the world over JSON/HTTP with Axum for the game-side
//! bridge (Skyrim Platform mods and dev tools):
//!
//! - **Health and addons** (`/health`, `/addons`)
//! - **Actor state** (`/npc/{name}`, `/realm/selection`, `/favor/apply`)
//! - **Travel** (`/travel/options`, `/travel/go`, `/travel/where`,
//!   `/travel/log`)
//! - **Addon routes** mounted only when the addon is enabled
//!
//! Handlers call straight into [`fizban_core::World`]; every engine call
//! is a short synchronous critical section, so nothing is offloaded to a
//! blocking pool.

pub mod addons;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use addons::AddonRegistry;
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server, wait_for_shutdown};
pub use state::AppState;
