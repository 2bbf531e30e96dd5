//! World state and rules for the Fizban world backend.
//!
//! This crate owns everything that changes while the backend runs: actor
//! records, accumulated channel values, the seen-selection ledger, actor
//! locations, the tick, and the travel log. It performs no I/O.
//!
//! # Modules
//!
//! - [`actor`] -- [`ActorRecord`] and the concurrent [`ActorRegistry`].
//! - [`channels`] -- [`ChannelStore`]: open-namespace affinity values.
//! - [`config`] -- [`FizbanConfig`] loaded from YAML with env overrides.
//! - [`eligibility`] -- Pluggable [`LaneEligibility`] hooks.
//! - [`error`] -- [`EngineError`] and its stable codes.
//! - [`selection`] -- Validation and staged application of selections.
//! - [`snapshot`] -- [`WorldSnapshot`] for persistence.
//! - [`travel`] -- Travel state machine and the bounded [`TravelLog`].
//! - [`world`] -- The [`World`] facade served over HTTP.

pub mod actor;
pub mod channels;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod selection;
pub mod snapshot;
pub mod travel;
pub mod world;

pub use actor::{ActorRecord, ActorRegistry};
pub use channels::{ChannelError, ChannelStore};
pub use config::{ConfigError, FizbanConfig, LogFormat};
pub use eligibility::{AllowAll, Eligibility, LaneEligibility, RequirementEligibility};
pub use error::EngineError;
pub use snapshot::WorldSnapshot;
pub use travel::{TravelLog, TravelPhase};
pub use world::{World, WorldHealth};
