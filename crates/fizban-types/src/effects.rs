//! Effects, realm selections, and favor requests.
//!
//! An [`Effect`] is a signed delta against one `(channel, key)` pair of an
//! actor's affinity state. A [`Selection`] batches effects, tags, and a
//! placement into one idempotent transaction keyed by `selection_id`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ActorId, LocationId};

/// Well-known channel names.
///
/// The channel namespace is open: any non-empty name is accepted. These
/// constants only name the channels the game side sends today.
pub mod channels {
    /// Favor of the Nine Divines.
    pub const DIVINE: &str = "divine";
    /// Favor of the Daedric Princes.
    pub const DAEDRA: &str = "daedra";
    /// Faction standing.
    pub const FACTION: &str = "faction";
    /// Narrative tags. Effects on this channel also add the tag to the actor.
    pub const TAG: &str = "tag";
    /// Rumor heat, raised by gossip propagation.
    pub const GOSSIP: &str = "gossip";
}

/// A single signed change to one affinity channel.
///
/// For the [`channels::TAG`] channel the target is `tag` (falling back to
/// `key`); for every other channel it is `key`. A non-tag effect may also
/// carry a `tag`, which is added to the actor's tag set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Effect {
    /// Channel name (`divine`, `faction`, `tag`, ...).
    pub channel: String,
    /// Name within the channel (e.g. `Akatosh`, `Companions`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Tag to add to the actor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Signed change.
    #[serde(default)]
    pub delta: f64,
    /// Free-form diagnostic note. Never interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Effect {
    /// An effect on a keyed channel.
    pub fn keyed(channel: &str, key: &str, delta: f64) -> Self {
        Self {
            channel: channel.to_owned(),
            key: Some(key.to_owned()),
            tag: None,
            delta,
            note: None,
        }
    }

    /// An effect on the tag channel.
    pub fn tagged(tag: &str, delta: f64) -> Self {
        Self {
            channel: channels::TAG.to_owned(),
            key: None,
            tag: Some(tag.to_owned()),
            delta,
            note: None,
        }
    }

    /// Attach a diagnostic note.
    #[must_use]
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_owned());
        self
    }

    /// Channel name, trimmed and lower-cased.
    pub fn normalized_channel(&self) -> String {
        self.channel.trim().to_lowercase()
    }

    /// The key this effect accumulates into, if any.
    pub fn target(&self) -> Option<&str> {
        let raw = if self.normalized_channel() == channels::TAG {
            self.tag.as_deref().or(self.key.as_deref())
        } else {
            self.key.as_deref()
        };
        raw.map(str::trim)
    }
}

/// A realm selection: placement, effects, and tags applied as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Selection {
    /// The acting actor.
    #[serde(default = "default_actor")]
    pub actor: ActorId,
    /// Idempotency key (e.g. `realm_shrine_akatosh`).
    pub selection_id: String,
    /// Where the actor is placed.
    #[serde(default = "default_location")]
    pub location: LocationId,
    /// Ordered effects.
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// Tags added to the actor.
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_actor() -> ActorId {
    ActorId::from("Player")
}

fn default_location() -> LocationId {
    LocationId::from("RealmOfLorkhan")
}

/// Accumulated value of one `(channel, key)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChannelValue {
    /// Channel name.
    pub channel: String,
    /// Name within the channel.
    pub key: String,
    /// Sum of every delta applied so far.
    pub value: f64,
}

/// Result of applying (or replaying) a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SelectionOutcome {
    /// The acting actor.
    pub actor: ActorId,
    /// Idempotency key.
    pub selection_id: String,
    /// Location after the selection.
    pub location: LocationId,
    /// Location before the selection, `None` if the actor was unplaced.
    pub previous_location: Option<LocationId>,
    /// Whether an already placed actor was moved elsewhere.
    pub relocated: bool,
    /// Whether this is a stored result returned for a repeated `selection_id`.
    pub replayed: bool,
    /// Effects in application order.
    pub applied: Vec<Effect>,
    /// Post-update values of every channel the selection touched.
    pub channels: Vec<ChannelValue>,
    /// Full tag set of the actor after the selection.
    pub tags: Vec<String>,
    /// World tick at which the selection committed.
    pub tick: u64,
}

/// A single favor change outside of a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FavorRequest {
    /// Target actor.
    pub actor: ActorId,
    /// Channel name.
    pub channel: String,
    /// Name within the channel.
    pub key: String,
    /// Signed change.
    pub delta: f64,
    /// Why the change happened. Logged, not interpreted.
    #[serde(default = "default_reason")]
    pub reason: String,
}

fn default_reason() -> String {
    String::from("unknown")
}

/// Result of a favor change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FavorOutcome {
    /// Target actor.
    pub actor: ActorId,
    /// Normalized channel name.
    pub channel: String,
    /// Name within the channel.
    pub key: String,
    /// Accumulated value after the change.
    pub value: f64,
    /// World tick at which the change committed.
    pub tick: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_channel_targets_tag_then_key() {
        let e = Effect::tagged("alternate_start", 0.0);
        assert_eq!(e.target(), Some("alternate_start"));

        let mut legacy = Effect::keyed("TAG", "start_prayed", 0.0);
        legacy.tag = None;
        assert_eq!(legacy.target(), Some("start_prayed"));
    }

    #[test]
    fn keyed_channel_ignores_tag_for_target() {
        let mut e = Effect::keyed(channels::DIVINE, "Akatosh", 0.05);
        e.tag = Some(String::from("start_prayed"));
        assert_eq!(e.target(), Some("Akatosh"));

        let pact = Effect::keyed(channels::DAEDRA, " MolagBal ", -0.1).with_note("pact refused");
        assert_eq!(pact.target(), Some("MolagBal"));
        assert_eq!(pact.note.as_deref(), Some("pact refused"));
    }

    #[test]
    fn selection_defaults_match_game_side() {
        let sel: Option<Selection> =
            serde_json::from_str(r#"{"selection_id":"realm_guild_thieves"}"#).ok();
        let Some(sel) = sel else {
            panic!("selection with only an id should parse");
        };
        assert_eq!(sel.actor.as_str(), "Player");
        assert_eq!(sel.location.as_str(), "RealmOfLorkhan");
        assert!(sel.effects.is_empty());
    }

    #[test]
    fn effect_delta_defaults_to_zero() {
        let e: Option<Effect> =
            serde_json::from_str(r#"{"channel":"tag","tag":"alternate_start"}"#).ok();
        assert!(e.is_some_and(|e| e.delta.abs() < f64::EPSILON));
    }
}
