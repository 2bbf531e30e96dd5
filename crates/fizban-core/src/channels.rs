//! Channel store: accumulated affinity values of one actor.
//!
//! Values are keyed by the composite `(channel, key)` pair. The channel
//! namespace is open; any non-empty name is accepted. A value only ever
//! changes by adding a delta, so it always equals the sum of every delta
//! applied to its pair.
//!
//! Names are normalized on the way in: channels are trimmed and
//! lower-cased, keys are trimmed.

use std::collections::BTreeMap;

use fizban_types::ChannelValue;
use serde::{Deserialize, Serialize};

/// Errors raised by [`ChannelStore`] operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChannelError {
    /// The channel name is empty.
    #[error("malformed effect: empty channel name")]
    EmptyChannel,

    /// The key (or tag) is empty.
    #[error("malformed effect: empty key on channel {channel}")]
    EmptyKey {
        /// Channel the effect targeted.
        channel: String,
    },

    /// The delta is NaN or infinite.
    #[error("malformed effect: non-finite delta {delta} on {channel}/{key}")]
    NonFiniteDelta {
        /// Channel name.
        channel: String,
        /// Key within the channel.
        key: String,
        /// The rejected delta.
        delta: f64,
    },

    /// Accumulation left the finite range. The stored value is untouched.
    #[error("channel {channel}/{key} would leave the finite range")]
    NonFiniteValue {
        /// Channel name.
        channel: String,
        /// Key within the channel.
        key: String,
    },
}

impl ChannelError {
    /// Whether this error means stored state could not be kept consistent,
    /// as opposed to malformed input.
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::NonFiniteValue { .. })
    }
}

/// Normalize and validate a `(channel, key, delta)` triple.
///
/// # Errors
///
/// Returns [`ChannelError::EmptyChannel`], [`ChannelError::EmptyKey`] or
/// [`ChannelError::NonFiniteDelta`].
pub fn normalize(channel: &str, key: &str, delta: f64) -> Result<(String, String), ChannelError> {
    let channel = channel.trim().to_lowercase();
    if channel.is_empty() {
        return Err(ChannelError::EmptyChannel);
    }
    let key = key.trim();
    if key.is_empty() {
        return Err(ChannelError::EmptyKey { channel });
    }
    if !delta.is_finite() {
        return Err(ChannelError::NonFiniteDelta {
            channel,
            key: key.to_owned(),
            delta,
        });
    }
    Ok((channel, key.to_owned()))
}

/// Accumulated channel values of one actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<ChannelValue>", try_from = "Vec<ChannelValue>")]
pub struct ChannelStore {
    values: BTreeMap<(String, String), f64>,
}

impl ChannelStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Add `delta` to `(channel, key)` and return the new value.
    ///
    /// Absent pairs start at `0.0`. On error the store is unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`ChannelError`] for malformed input, or
    /// [`ChannelError::NonFiniteValue`] if the sum overflows.
    pub fn apply(&mut self, channel: &str, key: &str, delta: f64) -> Result<f64, ChannelError> {
        let pair = normalize(channel, key, delta)?;
        let current = self.values.get(&pair).copied().unwrap_or(0.0);
        let next = current + delta;
        if !next.is_finite() {
            return Err(ChannelError::NonFiniteValue {
                channel: pair.0,
                key: pair.1,
            });
        }
        self.values.insert(pair, next);
        Ok(next)
    }

    /// Current value of `(channel, key)`, `0.0` if never touched.
    pub fn get(&self, channel: &str, key: &str) -> f64 {
        let pair = (channel.trim().to_lowercase(), key.trim().to_owned());
        self.values.get(&pair).copied().unwrap_or(0.0)
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing has been applied yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values, sorted by channel then key.
    pub fn entries(&self) -> impl Iterator<Item = ChannelValue> + '_ {
        self.values.iter().map(|((channel, key), value)| ChannelValue {
            channel: channel.clone(),
            key: key.clone(),
            value: *value,
        })
    }

    /// Values grouped as `channel -> key -> value`.
    pub fn grouped(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        let mut out: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for ((channel, key), value) in &self.values {
            out.entry(channel.clone())
                .or_default()
                .insert(key.clone(), *value);
        }
        out
    }
}

impl From<ChannelStore> for Vec<ChannelValue> {
    fn from(store: ChannelStore) -> Self {
        store.entries().collect()
    }
}

impl TryFrom<Vec<ChannelValue>> for ChannelStore {
    type Error = ChannelError;

    fn try_from(entries: Vec<ChannelValue>) -> Result<Self, Self::Error> {
        let mut store = Self::new();
        for entry in entries {
            store.apply(&entry.channel, &entry.key, entry.value)?;
        }
        Ok(store)
    }
}
