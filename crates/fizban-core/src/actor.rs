//! Actor records and the concurrent actor registry.
//!
//! The registry owns every per-actor record: current location, channel
//! store, tag set, and the ledger of processed selections. Records live in
//! a [`DashMap`] of `Arc<Mutex<ActorRecord>>`, so lookups never take a
//! global lock and operations on different actors never contend. The map
//! guard is always released before a record's mutex is locked.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use fizban_types::{ActorDescriptor, ActorId, LocationId, SelectionOutcome};
use fizban_world::Standing;
use serde::{Deserialize, Serialize};

use crate::channels::ChannelStore;
use crate::error::EngineError;

/// Everything the world knows about one actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorRecord {
    /// Current location, `None` while unplaced.
    #[serde(default)]
    pub location: Option<LocationId>,
    /// Accumulated channel values.
    #[serde(default)]
    pub channels: ChannelStore,
    /// Narrative tags.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Outcomes of processed selections keyed by `selection_id`.
    #[serde(default)]
    pub selections: BTreeMap<String, SelectionOutcome>,
}

impl ActorRecord {
    /// Build the read-only descriptor served by `/npc/{name}`.
    pub fn describe(&self, name: &ActorId) -> ActorDescriptor {
        ActorDescriptor {
            name: name.clone(),
            location: self.location.clone(),
            tags: self.tags.iter().cloned().collect(),
            channels: self.channels.grouped(),
            selections: self.selections.len(),
        }
    }
}

impl Standing for ActorRecord {
    fn channel_value(&self, channel: &str, key: &str) -> f64 {
        self.channels.get(channel, key)
    }

    fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

type Slot = Arc<Mutex<ActorRecord>>;

/// Concurrent map of actor records with per-actor locking.
#[derive(Debug, Default)]
pub struct ActorRegistry {
    actors: DashMap<ActorId, Slot>,
}

impl ActorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, actor: &ActorId) -> Option<Slot> {
        self.actors.get(actor).map(|entry| Arc::clone(entry.value()))
    }

    fn slot_or_create(&self, actor: &ActorId) -> Slot {
        let entry = self.actors.entry(actor.clone()).or_default();
        Arc::clone(entry.value())
    }

    fn poisoned(actor: &ActorId, err: impl std::fmt::Display) -> EngineError {
        EngineError::Internal(format!("actor lock poisoned for {actor}: {err}"))
    }

    /// Run `f` under the actor's lock, creating the record if needed.
    ///
    /// # Errors
    ///
    /// Propagates the error of `f`, or [`EngineError::Internal`] if the
    /// actor's lock is poisoned.
    pub fn with_actor<T>(
        &self,
        actor: &ActorId,
        f: impl FnOnce(&mut ActorRecord) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let slot = self.slot_or_create(actor);
        let mut record = slot.lock().map_err(|e| Self::poisoned(actor, e))?;
        f(&mut record)
    }

    /// Run `f` under the actor's lock if the actor exists.
    ///
    /// `f` receives `None` for an unknown actor; no record is created.
    ///
    /// # Errors
    ///
    /// Propagates the error of `f`, or [`EngineError::Internal`] if the
    /// actor's lock is poisoned.
    pub fn with_existing<T>(
        &self,
        actor: &ActorId,
        f: impl FnOnce(Option<&mut ActorRecord>) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let Some(slot) = self.slot(actor) else {
            return f(None);
        };
        let mut record = slot.lock().map_err(|e| Self::poisoned(actor, e))?;
        f(Some(&mut *record))
    }

    /// Run `f` with several actors locked at once, creating missing records.
    ///
    /// Duplicates are collapsed and locks are taken in sorted name order,
    /// so concurrent multi-actor operations cannot deadlock. `f` sees the
    /// records in that sorted order.
    ///
    /// # Errors
    ///
    /// Propagates the error of `f`, or [`EngineError::Internal`] if any
    /// actor's lock is poisoned.
    pub fn with_actors<T>(
        &self,
        actors: &[ActorId],
        f: impl FnOnce(&mut [(&ActorId, &mut ActorRecord)]) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let names: BTreeSet<&ActorId> = actors.iter().collect();
        let slots: Vec<(&ActorId, Slot)> = names
            .into_iter()
            .map(|actor| (actor, self.slot_or_create(actor)))
            .collect();

        let mut guards = Vec::with_capacity(slots.len());
        for (actor, slot) in &slots {
            let guard = slot.lock().map_err(|e| Self::poisoned(actor, e))?;
            guards.push((*actor, guard));
        }
        let mut records: Vec<(&ActorId, &mut ActorRecord)> = guards
            .iter_mut()
            .map(|(actor, guard)| (*actor, &mut **guard))
            .collect();
        f(records.as_mut_slice())
    }

    /// Read the actor's record without creating it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Internal`] if the actor's lock is poisoned.
    pub fn inspect<T>(
        &self,
        actor: &ActorId,
        f: impl FnOnce(&ActorRecord) -> T,
    ) -> Result<Option<T>, EngineError> {
        let Some(slot) = self.slot(actor) else {
            return Ok(None);
        };
        let record = slot.lock().map_err(|e| Self::poisoned(actor, e))?;
        Ok(Some(f(&record)))
    }

    /// Current location of the actor, `None` if unknown or unplaced.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Internal`] if the actor's lock is poisoned.
    pub fn get(&self, actor: &ActorId) -> Result<Option<LocationId>, EngineError> {
        Ok(self
            .inspect(actor, |record| record.location.clone())?
            .flatten())
    }

    /// Place the actor at `location`, overwriting any previous placement.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Internal`] if the actor's lock is poisoned.
    pub fn set(&self, actor: &ActorId, location: LocationId) -> Result<(), EngineError> {
        self.with_actor(actor, |record| {
            record.location = Some(location);
            Ok(())
        })
    }

    /// Add `delta` to one of the actor's channels and return the new value.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedEffect`] for malformed names or
    /// deltas, [`EngineError::Internal`] on overflow or a poisoned lock.
    pub fn apply(
        &self,
        actor: &ActorId,
        channel: &str,
        key: &str,
        delta: f64,
    ) -> Result<f64, EngineError> {
        crate::channels::normalize(channel, key, delta)?;
        self.with_actor(actor, |record| Ok(record.channels.apply(channel, key, delta)?))
    }

    /// One channel value of the actor, `0.0` if never touched.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Internal`] if the actor's lock is poisoned.
    pub fn value(&self, actor: &ActorId, channel: &str, key: &str) -> Result<f64, EngineError> {
        Ok(self
            .inspect(actor, |record| record.channels.get(channel, key))?
            .unwrap_or(0.0))
    }

    /// Names of every known actor, sorted.
    pub fn actor_ids(&self) -> Vec<ActorId> {
        let mut ids: Vec<ActorId> = self.actors.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of known actors.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether no actor has been referenced yet.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Copy every record out of the registry.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Internal`] if any actor's lock is poisoned.
    pub fn export(&self) -> Result<BTreeMap<ActorId, ActorRecord>, EngineError> {
        let mut out = BTreeMap::new();
        for actor in self.actor_ids() {
            if let Some(record) = self.inspect(&actor, ActorRecord::clone)? {
                out.insert(actor, record);
            }
        }
        Ok(out)
    }

    /// Replace every record with `records`.
    pub fn replace_all(&self, records: BTreeMap<ActorId, ActorRecord>) {
        self.actors.clear();
        for (actor, record) in records {
            self.actors.insert(actor, Arc::new(Mutex::new(record)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> ActorId {
        ActorId::from("Player")
    }

    #[test]
    fn unknown_actor_has_no_location() {
        let registry = ActorRegistry::new();
        assert_eq!(registry.get(&player()).ok().flatten(), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn set_overwrites_location() {
        let registry = ActorRegistry::new();
        assert!(registry.set(&player(), LocationId::from("RainbowBridge")).is_ok());
        assert!(registry.set(&player(), LocationId::from("Whiterun")).is_ok());
        assert_eq!(
            registry.get(&player()).ok().flatten(),
            Some(LocationId::from("Whiterun"))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn apply_is_scoped_per_actor() {
        let registry = ActorRegistry::new();
        let lydia = ActorId::from("Lydia");
        assert!(registry.apply(&player(), "trust", "Lydia", 0.3).is_ok());
        assert!(registry.apply(&lydia, "trust", "Player", 0.5).is_ok());
        let mine = registry.value(&player(), "trust", "Lydia").unwrap_or(f64::NAN);
        let hers = registry.value(&lydia, "trust", "Lydia").unwrap_or(f64::NAN);
        assert!((mine - 0.3).abs() < 1e-9);
        assert!(hers.abs() < 1e-9);
    }

    #[test]
    fn malformed_apply_does_not_create_actor() {
        let registry = ActorRegistry::new();
        let err = registry.apply(&player(), "divine", "", 0.1).err();
        assert_eq!(err.map(|e| e.code()), Some("malformed_effect"));
        assert!(registry.is_empty());
    }

    #[test]
    fn with_actors_locks_each_name_once_in_order() {
        let registry = ActorRegistry::new();
        let names = [ActorId::from("Ysolda"), player(), ActorId::from("Ysolda")];
        let seen = registry
            .with_actors(&names, |records| {
                Ok(records.iter().map(|(a, _)| a.as_str().to_owned()).collect::<Vec<_>>())
            })
            .unwrap_or_default();
        assert_eq!(seen, vec!["Player", "Ysolda"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn inspect_never_creates() {
        let registry = ActorRegistry::new();
        let seen = registry.inspect(&player(), |_| ()).ok().flatten();
        assert!(seen.is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn actor_ids_are_sorted() {
        let registry = ActorRegistry::new();
        for name in ["Ysolda", "Aela", "Player"] {
            let _ = registry.set(&ActorId::from(name), LocationId::from("Whiterun"));
        }
        let names: Vec<String> = registry.actor_ids().into_iter().map(|a| a.0).collect();
        assert_eq!(names, vec!["Aela", "Player", "Ysolda"]);
    }

    #[test]
    fn export_and_replace_round_trip() {
        let registry = ActorRegistry::new();
        let _ = registry.set(&player(), LocationId::from("Solitude"));
        let _ = registry.apply(&player(), "divine", "Mara", 0.2);
        let exported = registry.export().unwrap_or_default();

        let other = ActorRegistry::new();
        other.replace_all(exported.clone());
        assert_eq!(other.export().unwrap_or_default(), exported);
    }

    #[test]
    fn record_describes_itself() {
        let mut record = ActorRecord::default();
        record.tags.insert("alternate_start".to_owned());
        let _ = record.channels.apply("divine", "Akatosh", 0.1);
        let descriptor = record.describe(&player());
        assert_eq!(descriptor.tags, vec!["alternate_start"]);
        assert_eq!(descriptor.channels.len(), 1);
        assert!(descriptor.location.is_none());
    }
}
