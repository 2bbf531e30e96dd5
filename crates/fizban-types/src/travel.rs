//! Travel options, requests, receipts, and the travel log record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ActorId, LocationId, TravelId};

/// One way out of a location: a destination reached over a lane tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TravelOption {
    /// Destination location.
    pub to_location: LocationId,
    /// Lane tier (`gold`, `silver`, ...).
    pub lane: String,
    /// Display title (e.g. `Golden Arch → Whiterun`).
    pub title: String,
    /// Display description.
    pub desc: String,
    /// Flavour tags of the lane.
    pub tags: Vec<String>,
    /// Advertised cost. Reported only, never charged.
    pub cost: u32,
    /// Which content pack supplies the lane.
    pub provider: String,
}

/// A request to move an actor along one lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TravelRequest {
    /// The travelling actor.
    pub actor: ActorId,
    /// Where the caller believes the actor is.
    #[serde(alias = "src")]
    pub from_location: LocationId,
    /// Destination.
    #[serde(alias = "dst")]
    pub to_location: LocationId,
    /// Lane tier. When omitted the first lane to the destination is used.
    #[serde(default)]
    pub lane: Option<String>,
}

/// Result of a committed journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TravelReceipt {
    /// The travelling actor.
    pub actor: ActorId,
    /// Origin.
    pub from_location: LocationId,
    /// Destination, now the actor's location.
    pub to_location: LocationId,
    /// Lane tier actually used.
    pub lane: String,
    /// Provider of the lane.
    pub provider: String,
    /// Human-readable summary.
    pub message: String,
    /// World tick at which the journey committed.
    pub tick: u64,
}

/// Entry of the bounded travel log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TravelRecord {
    /// Record identifier.
    pub id: TravelId,
    /// World tick at commit.
    pub tick: u64,
    /// Wall-clock commit time.
    pub at: DateTime<Utc>,
    /// The travelling actor.
    pub actor: ActorId,
    /// Origin.
    pub from_location: LocationId,
    /// Destination.
    pub to_location: LocationId,
    /// Lane tier.
    pub lane: String,
    /// Provider of the lane.
    pub provider: String,
    /// Flavour tags of the lane.
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_request_accepts_legacy_aliases() {
        let req: Option<TravelRequest> = serde_json::from_str(
            r#"{"actor":"Player","src":"RainbowBridge","dst":"Whiterun"}"#,
        )
        .ok();
        let Some(req) = req else {
            panic!("legacy src/dst body should parse");
        };
        assert_eq!(req.from_location.as_str(), "RainbowBridge");
        assert_eq!(req.to_location.as_str(), "Whiterun");
        assert!(req.lane.is_none());
    }
}
