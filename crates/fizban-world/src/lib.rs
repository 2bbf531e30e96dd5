//! Travel graph and starting map for the Fizban world backend.
//!
//! This crate models the static geography: locations as nodes, tiered
//! lanes as directed edges, and the requirements an actor must meet to
//! take a lane. It holds no per-actor state.
//!
//! # Modules
//!
//! - [`error`] -- Error types for graph construction and lookups.
//! - [`graph`] -- [`TravelGraph`]: options and lane resolution.
//! - [`lane`] -- [`Lane`], [`LaneRequirement`], and the [`Standing`] view
//!   requirements are checked against.
//! - [`spec`] -- [`GraphSpec`], the YAML-loadable graph description.
//! - [`starting_world`] -- The default Realm of Lorkhan / Rainbow Bridge map.

pub mod error;
pub mod graph;
pub mod lane;
pub mod spec;
pub mod starting_world;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use graph::TravelGraph;
pub use lane::{Lane, LaneRequirement, Standing, check_requirements};
pub use spec::{GraphSpec, RouteSpec, TierSpec};
pub use starting_world::{create_starting_graph, default_graph_spec, places};
