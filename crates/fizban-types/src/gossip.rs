//! Rumors spreading between actors.
//!
//! A rumor carries its own heat; propagating it raises the gossip heat of
//! every receiver by `strength * heat * GOSSIP_HEAT_SCALE`, accumulated on
//! the `gossip/heat` channel.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ActorId, LocationId};

/// Fraction of `strength * heat` a receiver absorbs per propagation.
pub const GOSSIP_HEAT_SCALE: f64 = 0.1;

/// Key under the `gossip` channel holding an actor's accumulated heat.
pub const GOSSIP_HEAT_KEY: &str = "heat";

/// A rumor as told by the game side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GossipItem {
    /// Rumor identifier.
    pub rumor_id: String,
    /// Who the rumor is about.
    pub about: String,
    /// What the rumor claims.
    pub claim: String,
    /// How true the rumor is, `0.0..=1.0`. Carried, not interpreted.
    #[serde(default = "half")]
    pub truthiness: f64,
    /// How juicy the rumor is, `0.0..=1.0`.
    #[serde(default = "half")]
    pub heat: f64,
    /// Who started it.
    pub origin: String,
    /// Where it started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationId>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request to pass a rumor from one actor to others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GossipRequest {
    /// The teller.
    pub source: ActorId,
    /// The listeners.
    pub receivers: Vec<ActorId>,
    /// How convincingly it is told, `0.0..=1.0`.
    #[serde(default = "half")]
    pub strength: f64,
    /// The rumor.
    pub item: GossipItem,
}

impl GossipRequest {
    /// Heat each receiver absorbs.
    pub const fn bump(&self) -> f64 {
        self.strength * self.item.heat * GOSSIP_HEAT_SCALE
    }
}

const fn half() -> f64 {
    0.5
}

/// Result of a propagation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GossipOutcome {
    /// Rumor identifier.
    pub rumor_id: String,
    /// The teller.
    pub source: ActorId,
    /// Distinct listeners, in request order.
    pub receivers: Vec<ActorId>,
    /// Heat each listener absorbed.
    pub bump: f64,
    /// World tick at which the propagation committed.
    pub tick: u64,
}
