//! Effect application engine.
//!
//! A selection is processed in two steps. [`validate_selection`] checks the
//! whole request without touching any state. [`apply_validated`] then runs
//! against a staged copy of the actor record; the caller commits the copy
//! only when every step succeeded, so a selection is either applied in
//! full or not at all.

use fizban_types::{ActorId, ChannelValue, Effect, LocationId, Selection, SelectionOutcome, channels};
use fizban_world::TravelGraph;
use tracing::debug;

use crate::actor::ActorRecord;
use crate::error::EngineError;

/// One effect after validation, with names normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEffect {
    /// Normalized channel name.
    pub channel: String,
    /// Trimmed key (the tag for the tag channel).
    pub key: String,
    /// Finite delta.
    pub delta: f64,
    /// Extra tag carried by a non-tag effect.
    pub extra_tag: Option<String>,
    /// The effect as reported back to the caller.
    pub applied: Effect,
}

/// A selection that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSelection {
    /// The acting actor.
    pub actor: ActorId,
    /// Idempotency key.
    pub selection_id: String,
    /// Placement target, registered in the graph.
    pub location: LocationId,
    /// Effects in request order.
    pub effects: Vec<ValidatedEffect>,
    /// Trimmed request-level tags.
    pub tags: Vec<String>,
}

fn valid_channel_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

fn validate_effect(index: usize, effect: &Effect) -> Result<ValidatedEffect, EngineError> {
    let channel = effect.normalized_channel();
    if channel.is_empty() {
        return Err(EngineError::Validation(format!("effect {index}: empty channel")));
    }
    if !valid_channel_name(&channel) {
        return Err(EngineError::Validation(format!(
            "effect {index}: malformed channel name {:?}",
            effect.channel
        )));
    }
    let key = match effect.target() {
        Some(key) if !key.is_empty() => key.to_owned(),
        _ => {
            return Err(EngineError::Validation(format!(
                "effect {index}: missing key on channel {channel}"
            )));
        }
    };
    if !effect.delta.is_finite() {
        return Err(EngineError::Validation(format!(
            "effect {index}: non-finite delta on {channel}/{key}"
        )));
    }

    let extra_tag = if channel == channels::TAG {
        None
    } else {
        effect
            .tag
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
    };

    let applied = Effect {
        channel: channel.clone(),
        ..effect.clone()
    };

    Ok(ValidatedEffect {
        channel,
        key,
        delta: effect.delta,
        extra_tag,
        applied,
    })
}

/// Validate a selection without touching any state.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] for blank names, blank tags, or any
/// malformed effect, and [`EngineError::UnknownLocation`] if the placement
/// target is not in the graph.
pub fn validate_selection(
    selection: &Selection,
    graph: &TravelGraph,
) -> Result<ValidatedSelection, EngineError> {
    if selection.actor.is_blank() {
        return Err(EngineError::Validation(String::from("actor must not be empty")));
    }
    let selection_id = selection.selection_id.trim();
    if selection_id.is_empty() {
        return Err(EngineError::Validation(String::from(
            "selection_id must not be empty",
        )));
    }
    if !graph.contains(&selection.location) {
        return Err(EngineError::UnknownLocation(selection.location.clone()));
    }

    let effects = selection
        .effects
        .iter()
        .enumerate()
        .map(|(i, e)| validate_effect(i, e))
        .collect::<Result<Vec<_>, _>>()?;

    let mut tags = Vec::with_capacity(selection.tags.len());
    for (i, tag) in selection.tags.iter().enumerate() {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(EngineError::Validation(format!("tag {i} is blank")));
        }
        tags.push(tag.to_owned());
    }

    Ok(ValidatedSelection {
        actor: selection.actor.clone(),
        selection_id: selection_id.to_owned(),
        location: selection.location.clone(),
        effects,
        tags,
    })
}

/// Apply a validated selection to `record`.
///
/// `record` should be a staged copy: on error it may be partially updated
/// and must be discarded. The returned outcome carries tick `0`; the caller
/// stamps the commit tick.
///
/// # Errors
///
/// Returns [`EngineError::Internal`] if a channel value would overflow.
pub fn apply_validated(
    record: &mut ActorRecord,
    selection: &ValidatedSelection,
) -> Result<SelectionOutcome, EngineError> {
    let previous_location = record.location.replace(selection.location.clone());
    let relocated = previous_location
        .as_ref()
        .is_some_and(|prev| *prev != selection.location);

    let mut touched: Vec<(String, String)> = Vec::new();
    for effect in &selection.effects {
        let value = record
            .channels
            .apply(&effect.channel, &effect.key, effect.delta)?;
        debug!(
            actor = %selection.actor,
            channel = %effect.channel,
            key = %effect.key,
            delta = effect.delta,
            value,
            "Effect applied"
        );

        let pair = (effect.channel.clone(), effect.key.clone());
        if !touched.contains(&pair) {
            touched.push(pair);
        }
        if effect.channel == channels::TAG {
            record.tags.insert(effect.key.clone());
        }
        if let Some(tag) = &effect.extra_tag {
            record.tags.insert(tag.clone());
        }
    }
    for tag in &selection.tags {
        record.tags.insert(tag.clone());
    }

    let channel_values = touched
        .into_iter()
        .map(|(channel, key)| {
            let value = record.channels.get(&channel, &key);
            ChannelValue {
                channel,
                key,
                value,
            }
        })
        .collect();

    Ok(SelectionOutcome {
        actor: selection.actor.clone(),
        selection_id: selection.selection_id.clone(),
        location: selection.location.clone(),
        previous_location,
        relocated,
        replayed: false,
        applied: selection.effects.iter().map(|e| e.applied.clone()).collect(),
        channels: channel_values,
        tags: record.tags.iter().cloned().collect(),
        tick: 0,
    })
}
