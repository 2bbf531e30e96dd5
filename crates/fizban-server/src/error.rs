//! Error types for the server binary.
//!
//! [`BackendError`] wraps every failure mode of startup, serving, and
//! shutdown so `main` can propagate with `?`.

use crate::persistence::SnapshotError;

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: fizban_core::ConfigError,
    },

    /// The configured travel graph is inconsistent.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: fizban_world::WorldError,
    },

    /// Restoring or snapshotting the world failed.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: fizban_core::EngineError,
    },

    /// Reading or writing the snapshot file failed.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying snapshot error.
        #[from]
        source: SnapshotError,
    },

    /// The HTTP server failed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: fizban_api::ServerError,
    },
}
