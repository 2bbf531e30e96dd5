//! Declarative description of a travel graph.
//!
//! A [`GraphSpec`] is what the `travel` section of the configuration file
//! deserializes into. [`TravelGraph::from_spec`] turns it into a validated
//! graph.
//!
//! ```yaml
//! tiers:
//!   gold: { title: Golden Arch, tag: boon }
//! locations: [RainbowBridge, Whiterun]
//! routes:
//!   - from: RainbowBridge
//!     to: [Whiterun]
//!     lanes: [gold]
//!     provider: rainbow_bridge
//! ```
//!
//! [`TravelGraph::from_spec`]: crate::graph::TravelGraph::from_spec

use std::collections::BTreeMap;

use fizban_types::LocationId;
use serde::{Deserialize, Serialize};

use crate::lane::LaneRequirement;

/// Full graph description: tier catalogue, locations, routes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSpec {
    /// Lane tiers keyed by tier name.
    #[serde(default)]
    pub tiers: BTreeMap<String, TierSpec>,
    /// Every location of the graph, in display order.
    #[serde(default)]
    pub locations: Vec<LocationId>,
    /// Routes expanding into lanes.
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

/// Display data shared by every lane of one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSpec {
    /// Display title (e.g. `Golden Arch`).
    pub title: String,
    /// Flavour tag added to every lane of the tier.
    #[serde(default)]
    pub tag: Option<String>,
}

/// A fan-out of lanes from one origin to several destinations.
///
/// Expands into one lane per `(destination, tier)` pair, in the order the
/// destinations and tiers are listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
    /// Origin location.
    pub from: LocationId,
    /// Destinations.
    pub to: Vec<LocationId>,
    /// Lane tiers offered to every destination.
    pub lanes: Vec<String>,
    /// Content pack supplying the lanes.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Advertised cost of every lane.
    #[serde(default)]
    pub cost: u32,
    /// Also create the reverse lanes.
    #[serde(default)]
    pub bidirectional: bool,
    /// Requirements attached to every lane.
    #[serde(default)]
    pub requires: Vec<LaneRequirement>,
}

fn default_provider() -> String {
    String::from("core")
}
