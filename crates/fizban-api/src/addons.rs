//! Built-in addons.
//!
//! Addons are optional content packs toggled by one setting
//! (`FIZBAN_ADDONS` / `addons.enabled`):
//!
//! - `""` -- none
//! - `all` -- every built-in addon
//! - `a,b` -- the named addons; unknown names are reported, not fatal
//!
//! An addon can contribute extra routes and a selection hook. Hooks only
//! annotate responses. They never change world state, so the engine
//! behaves the same whichever addons are enabled.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use fizban_core::World;
use fizban_types::{LocationId, SelectionOutcome};
use fizban_world::places;
use serde::Serialize;
use tracing::{info, warn};

/// Addon answering `GET /ping`.
pub const EXAMPLE_PING: &str = "example_ping";
/// Addon supplying the Rainbow Bridge lanes.
pub const RAINBOW_BRIDGE: &str = "rainbow_bridge";
/// Addon for the Realm of Lorkhan starting area.
pub const REALM_LORKHAN: &str = "realm_lorkhan";

/// Every built-in addon name, in listing order.
pub const BUILTIN_ADDONS: [&str; 3] = [EXAMPLE_PING, RAINBOW_BRIDGE, REALM_LORKHAN];

/// Listing entry for a loaded addon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddonInfo {
    /// Addon name.
    pub name: String,
    /// Addon version.
    pub version: String,
    /// One-line description.
    pub description: String,
    /// Routes the addon mounts.
    pub routes: Vec<String>,
}

/// Observer of committed selections.
///
/// Returns an optional note for the response, or an error message. A
/// hook gets read-only access to the world.
pub trait SelectionHook: Send + Sync + std::fmt::Debug {
    /// Name of the addon owning the hook.
    fn addon(&self) -> &'static str;

    /// Inspect a selection outcome.
    fn on_selection(&self, outcome: &SelectionOutcome, world: &World) -> Result<Option<String>, String>;
}

/// Notes the arrival in the Realm of Lorkhan.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealmArrivalHook;

impl SelectionHook for RealmArrivalHook {
    fn addon(&self) -> &'static str {
        REALM_LORKHAN
    }

    fn on_selection(&self, outcome: &SelectionOutcome, _world: &World) -> Result<Option<String>, String> {
        Ok((outcome.location.as_str() == places::REALM_OF_LORKHAN)
            .then(|| String::from("in_realm_of_lorkhan")))
    }
}

/// Reports how many bridge lanes are open when a selection lands on the
/// Rainbow Bridge.
#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeLanesHook;

impl SelectionHook for BridgeLanesHook {
    fn addon(&self) -> &'static str {
        RAINBOW_BRIDGE
    }

    fn on_selection(&self, outcome: &SelectionOutcome, world: &World) -> Result<Option<String>, String> {
        if outcome.location.as_str() != places::RAINBOW_BRIDGE {
            return Ok(None);
        }
        let options = world
            .travel_options(&outcome.location)
            .map_err(|e| e.to_string())?;
        let lanes = options
            .iter()
            .filter(|o| o.provider == RAINBOW_BRIDGE)
            .count();
        Ok(Some(format!("rainbow_bridge_lanes_open:{lanes}")))
    }
}

fn describe(name: &str) -> Option<AddonInfo> {
    let (description, routes): (&str, &[&str]) = match name {
        EXAMPLE_PING => ("Liveness ping for addon wiring.", &["/ping"]),
        RAINBOW_BRIDGE => ("Rainbow Bridge lanes to the five holds.", &[]),
        REALM_LORKHAN => (
            "Realm of Lorkhan starting area.",
            &["/addon/realm-lorkhan/ping"],
        ),
        _ => return None,
    };
    Some(AddonInfo {
        name: name.to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        description: description.to_owned(),
        routes: routes.iter().map(|r| (*r).to_owned()).collect(),
    })
}

/// Loaded addons, load errors, and registered selection hooks.
#[derive(Debug)]
pub struct AddonRegistry {
    enabled: String,
    addons: BTreeMap<String, AddonInfo>,
    errors: BTreeMap<String, String>,
    hooks: Vec<Box<dyn SelectionHook>>,
    loaded_at: DateTime<Utc>,
}

impl AddonRegistry {
    /// Load the addons named by `setting`.
    pub fn from_setting(setting: &str) -> Self {
        let setting = setting.trim();
        let requested: Vec<&str> = if setting.eq_ignore_ascii_case("all") {
            BUILTIN_ADDONS.to_vec()
        } else {
            setting
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect()
        };

        let mut addons = BTreeMap::new();
        let mut errors = BTreeMap::new();
        let mut hooks: Vec<Box<dyn SelectionHook>> = Vec::new();
        for name in requested {
            let Some(info) = describe(name) else {
                warn!(addon = name, "Unknown addon requested");
                errors.insert(name.to_owned(), String::from("unknown addon"));
                continue;
            };
            match name {
                RAINBOW_BRIDGE => hooks.push(Box::new(BridgeLanesHook)),
                REALM_LORKHAN => hooks.push(Box::new(RealmArrivalHook)),
                _ => {}
            }
            addons.insert(name.to_owned(), info);
        }

        info!(
            enabled = setting,
            loaded = addons.len(),
            errors = errors.len(),
            "Addons loaded"
        );
        Self {
            enabled: setting.to_owned(),
            addons,
            errors,
            hooks,
            loaded_at: Utc::now(),
        }
    }

    /// A registry with nothing enabled.
    pub fn none() -> Self {
        Self::from_setting("")
    }

    /// Whether `name` is loaded.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.addons.contains_key(name)
    }

    /// The raw setting the registry was built from.
    pub fn enabled_setting(&self) -> &str {
        &self.enabled
    }

    /// Loaded addons keyed by name.
    pub const fn addons(&self) -> &BTreeMap<String, AddonInfo> {
        &self.addons
    }

    /// Load errors keyed by requested name.
    pub const fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// When the registry was built.
    pub const fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Run every hook against a selection outcome.
    ///
    /// Returns `(notes, errors)`; errors are prefixed with the addon name.
    pub fn run_selection_hooks(&self, outcome: &SelectionOutcome, world: &World) -> (Vec<String>, Vec<String>) {
        let mut notes = Vec::new();
        let mut errors = Vec::new();
        for hook in &self.hooks {
            match hook.on_selection(outcome, world) {
                Ok(Some(note)) => notes.push(note),
                Ok(None) => {}
                Err(message) => {
                    warn!(addon = hook.addon(), error = %message, "Selection hook failed");
                    errors.push(format!("{}: {message}", hook.addon()));
                }
            }
        }
        (notes, errors)
    }
}

/// Location the realm addon's ping reports on.
pub fn realm_location() -> LocationId {
    LocationId::from(places::REALM_OF_LORKHAN)
}
