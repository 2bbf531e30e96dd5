//! Error types for the `fizban-core` crate.
//!
//! Every world operation returns [`EngineError`]. Each variant maps to one
//! stable machine-readable code via [`EngineError::code`]; the HTTP layer
//! turns that code into a status.

use fizban_types::{ActorId, LocationId};
use fizban_world::WorldError;

use crate::channels::ChannelError;

/// Errors returned by world operations.
///
/// Every variant except [`EngineError::Internal`] is a local rejection that
/// leaves world state untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The request is structurally invalid (blank names, bad effects).
    #[error("validation error: {0}")]
    Validation(String),

    /// A single channel update was malformed.
    #[error("{0}")]
    MalformedEffect(ChannelError),

    /// A location is not registered in the travel graph.
    #[error("unknown location: {0}")]
    UnknownLocation(LocationId),

    /// The requested lane does not connect the two locations.
    #[error("no {lane} lane from {from} to {to}")]
    NoSuchLane {
        /// Origin location.
        from: LocationId,
        /// Destination location.
        to: LocationId,
        /// Requested lane tier (`*` when none was named).
        lane: String,
    },

    /// The request's origin differs from the actor's actual location.
    #[error("{actor} is not at {claimed} (actual: {})", describe(.actual.as_ref()))]
    LocationMismatch {
        /// The travelling actor.
        actor: ActorId,
        /// Origin named by the request.
        claimed: LocationId,
        /// Where the actor really is.
        actual: Option<LocationId>,
    },

    /// The eligibility hook refused the lane.
    #[error("{lane} lane to {to} denied: {reason}")]
    LaneDenied {
        /// Destination location.
        to: LocationId,
        /// Lane tier.
        lane: String,
        /// Reason reported by the hook.
        reason: String,
    },

    /// An internal invariant was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

fn describe(location: Option<&LocationId>) -> &str {
    location.map_or("unplaced", LocationId::as_str)
}

impl EngineError {
    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::MalformedEffect(_) => "malformed_effect",
            Self::UnknownLocation(_) => "unknown_location",
            Self::NoSuchLane { .. } => "no_such_lane",
            Self::LocationMismatch { .. } => "location_mismatch",
            Self::LaneDenied { .. } => "lane_denied",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<ChannelError> for EngineError {
    fn from(err: ChannelError) -> Self {
        if err.is_invariant_violation() {
            Self::Internal(err.to_string())
        } else {
            Self::MalformedEffect(err)
        }
    }
}

impl From<WorldError> for EngineError {
    fn from(err: WorldError) -> Self {
        match err {
            WorldError::UnknownLocation(id) => Self::UnknownLocation(id),
            WorldError::NoSuchLane { from, to, lane } => Self::NoSuchLane { from, to, lane },
            WorldError::NoRouteBetween { from, to } => Self::NoSuchLane {
                from,
                to,
                lane: String::from("*"),
            },
            other => Self::Internal(other.to_string()),
        }
    }
}
