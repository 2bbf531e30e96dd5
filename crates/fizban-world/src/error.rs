//! Error types for the `fizban-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`].

use fizban_types::LocationId;

/// Errors that can occur during travel-graph operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// A location was not found in the travel graph.
    #[error("unknown location: {0}")]
    UnknownLocation(LocationId),

    /// No lane of the requested tier connects the two locations.
    #[error("no {lane} lane from {from} to {to}")]
    NoSuchLane {
        /// Origin location.
        from: LocationId,
        /// Destination location.
        to: LocationId,
        /// Requested lane tier.
        lane: String,
    },

    /// No lane of any tier connects the two locations.
    #[error("no lane from {from} to {to}")]
    NoRouteBetween {
        /// Origin location.
        from: LocationId,
        /// Destination location.
        to: LocationId,
    },

    /// A location was registered twice.
    #[error("duplicate location: {0}")]
    DuplicateLocation(LocationId),

    /// The same `(destination, tier)` lane was registered twice.
    #[error("duplicate {lane} lane from {from} to {to}")]
    DuplicateLane {
        /// Origin location.
        from: LocationId,
        /// Destination location.
        to: LocationId,
        /// Lane tier.
        lane: String,
    },

    /// A route names a lane tier missing from the tier catalogue.
    #[error("unknown lane tier: {0}")]
    UnknownTier(String),

    /// A location or tier name is empty.
    #[error("blank name in travel graph")]
    BlankName,
}
