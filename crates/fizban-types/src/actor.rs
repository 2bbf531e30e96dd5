//! Read-only views of an actor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ActorId, LocationId};

/// Public descriptor of an actor, served as the NPC view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActorDescriptor {
    /// Actor name.
    pub name: ActorId,
    /// Current location, `None` if never placed.
    pub location: Option<LocationId>,
    /// Tags in sorted order.
    pub tags: Vec<String>,
    /// Channel values grouped as `channel -> key -> value`.
    pub channels: BTreeMap<String, BTreeMap<String, f64>>,
    /// Number of distinct selections processed for the actor.
    pub selections: usize,
}

impl ActorDescriptor {
    /// Descriptor of an actor the world has never seen.
    pub const fn unknown(name: ActorId) -> Self {
        Self {
            name,
            location: None,
            tags: Vec::new(),
            channels: BTreeMap::new(),
            selections: 0,
        }
    }
}
