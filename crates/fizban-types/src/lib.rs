//! Shared type definitions for the Fizban world backend.
//!
//! This crate is the single source of truth for the wire and domain types
//! used across the workspace. Types flow to `TypeScript` via `ts-rs` for
//! Skyrim Platform mods calling the backend.
//!
//! # Modules
//!
//! - [`ids`] -- Actor and location names, travel record ids
//! - [`effects`] -- Effects, realm selections, favor requests
//! - [`travel`] -- Travel options, requests, receipts, log records
//! - [`actor`] -- Actor descriptors
//! - [`gossip`] -- Rumor propagation

pub mod actor;
pub mod effects;
pub mod gossip;
pub mod ids;
pub mod travel;

// Re-export all public types at crate root for convenience.
pub use actor::ActorDescriptor;
pub use effects::{
    ChannelValue, Effect, FavorOutcome, FavorRequest, Selection, SelectionOutcome, channels,
};
pub use gossip::{GOSSIP_HEAT_KEY, GOSSIP_HEAT_SCALE, GossipItem, GossipOutcome, GossipRequest};
pub use ids::{ActorId, LocationId, TravelId};
pub use travel::{TravelOption, TravelReceipt, TravelRecord, TravelRequest};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // The files are written to the `bindings/` directory relative to
        // the crate root.
        use ts_rs::TS;

        let _ = crate::ids::ActorId::export_all();
        let _ = crate::ids::LocationId::export_all();
        let _ = crate::ids::TravelId::export_all();
        let _ = crate::effects::Effect::export_all();
        let _ = crate::effects::Selection::export_all();
        let _ = crate::effects::SelectionOutcome::export_all();
        let _ = crate::effects::FavorRequest::export_all();
        let _ = crate::effects::FavorOutcome::export_all();
        let _ = crate::travel::TravelOption::export_all();
        let _ = crate::travel::TravelRequest::export_all();
        let _ = crate::travel::TravelReceipt::export_all();
        let _ = crate::travel::TravelRecord::export_all();
        let _ = crate::actor::ActorDescriptor::export_all();
        let _ = crate::gossip::GossipItem::export_all();
        let _ = crate::gossip::GossipRequest::export_all();
        let _ = crate::gossip::GossipOutcome::export_all();
    }
}
