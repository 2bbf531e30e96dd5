//! Default starting map for the Fizban world backend.
//!
//! The Realm of Lorkhan is where new characters start. A silver stair
//! joins it to the Rainbow Bridge, which fans out to the five major holds
//! over four coloured lanes. Every hold has a silver lane back to the
//! bridge.

use fizban_types::LocationId;

use crate::error::WorldError;
use crate::graph::TravelGraph;
use crate::spec::{GraphSpec, RouteSpec, TierSpec};

/// Names of the starting locations.
pub mod places {
    /// Start realm for new characters.
    pub const REALM_OF_LORKHAN: &str = "RealmOfLorkhan";
    /// Travel hub.
    pub const RAINBOW_BRIDGE: &str = "RainbowBridge";
    /// Hold capital.
    pub const WHITERUN: &str = "Whiterun";
    /// Village south of Whiterun.
    pub const RIVERWOOD: &str = "Riverwood";
    /// Hold capital.
    pub const SOLITUDE: &str = "Solitude";
    /// Hold capital.
    pub const WINDHELM: &str = "Windhelm";
    /// Hold capital.
    pub const RIFTEN: &str = "Riften";

    /// The holds reachable from the bridge, in display order.
    pub const HOLDS: [&str; 5] = [WHITERUN, RIVERWOOD, SOLITUDE, WINDHELM, RIFTEN];
}

/// Provider name of the bridge lanes.
pub const RAINBOW_BRIDGE_PROVIDER: &str = "rainbow_bridge";

/// Provider name of the realm stair.
pub const REALM_LORKHAN_PROVIDER: &str = "realm_lorkhan";

/// Coloured bridge tiers: `(tier, title, tag)`.
const BRIDGE_TIERS: [(&str, &str, &str); 4] = [
    ("gold", "Golden Arch", "boon"),
    ("red", "Crimson Run", "speed"),
    ("blue", "Azure Slip", "ice"),
    ("green", "Emerald Veil", "fey"),
];

/// Tier joining the realm, the bridge, and the holds' return paths.
const SILVER: (&str, &str, &str) = ("silver", "Silver Stair", "return");

fn route(from: &str, to: &[&str], lanes: &[&str], provider: &str, bidirectional: bool) -> RouteSpec {
    RouteSpec {
        from: LocationId::from(from),
        to: to.iter().copied().map(LocationId::from).collect(),
        lanes: lanes.iter().map(|l| (*l).to_owned()).collect(),
        provider: provider.to_owned(),
        cost: 0,
        bidirectional,
        requires: Vec::new(),
    }
}

/// Declarative description of the starting map.
pub fn default_graph_spec() -> GraphSpec {
    let mut spec = GraphSpec::default();

    for (tier, title, tag) in BRIDGE_TIERS.iter().chain(std::iter::once(&SILVER)) {
        spec.tiers.insert(
            (*tier).to_owned(),
            TierSpec {
                title: (*title).to_owned(),
                tag: Some((*tag).to_owned()),
            },
        );
    }

    spec.locations = [places::REALM_OF_LORKHAN, places::RAINBOW_BRIDGE]
        .iter()
        .chain(places::HOLDS.iter())
        .copied()
        .map(LocationId::from)
        .collect();

    let bridge_tiers: Vec<&str> = BRIDGE_TIERS.iter().map(|(tier, _, _)| *tier).collect();
    spec.routes.push(route(
        places::RAINBOW_BRIDGE,
        &places::HOLDS,
        &bridge_tiers,
        RAINBOW_BRIDGE_PROVIDER,
        false,
    ));
    spec.routes.push(route(
        places::REALM_OF_LORKHAN,
        &[places::RAINBOW_BRIDGE],
        &[SILVER.0],
        REALM_LORKHAN_PROVIDER,
        true,
    ));
    for hold in places::HOLDS {
        spec.routes.push(route(
            hold,
            &[places::RAINBOW_BRIDGE],
            &[SILVER.0],
            RAINBOW_BRIDGE_PROVIDER,
            false,
        ));
    }

    spec
}

/// Build the starting travel graph.
///
/// # Errors
///
/// Returns a [`WorldError`] only if the built-in description is
/// inconsistent, which the tests below rule out.
pub fn create_starting_graph() -> Result<TravelGraph, WorldError> {
    TravelGraph::from_spec(&default_graph_spec())
}
