//! Serializable world snapshots.
//!
//! The engine itself never touches the filesystem; the server binary
//! writes and reads snapshots as JSON.

use std::collections::BTreeMap;

use fizban_types::{ActorId, TravelRecord};
use serde::{Deserialize, Serialize};

use crate::actor::ActorRecord;

/// Complete mutable state of a [`World`](crate::world::World).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Tick at the time of the snapshot.
    pub tick: u64,
    /// Every actor record.
    #[serde(default)]
    pub actors: BTreeMap<ActorId, ActorRecord>,
    /// Travel log, oldest first.
    #[serde(default)]
    pub travel_log: Vec<TravelRecord>,
}

impl WorldSnapshot {
    /// Number of actors in the snapshot.
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }
}
