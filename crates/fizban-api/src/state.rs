//! Shared application state for the HTTP API.

use std::sync::Arc;

use fizban_core::World;

use crate::addons::AddonRegistry;

/// Backend version reported by `/health` and `/addons`.
pub const BACKEND_VERSION: &str = env!("CARGO_PKG_VERSION");

/// State shared by every handler.
///
/// The world is behind its own [`Arc`] so the server binary can keep a
/// handle for snapshotting after the router has shut down.
#[derive(Debug)]
pub struct AppState {
    /// The live world.
    pub world: Arc<World>,
    /// Loaded addons.
    pub addons: AddonRegistry,
}

impl AppState {
    /// Bundle a world with its addon registry.
    pub const fn new(world: Arc<World>, addons: AddonRegistry) -> Self {
        Self { world, addons }
    }
}
