//! Test utilities for handler testing.
//!
//! Builds an [`AppState`] over an in-memory starmap:
//!
//! ```text
//! Haven(1) pos 0, catapult 5, faction 10
//! Lantern(2) pos 5, region Veil (decay)
//! Spindle(3) pos 12
//! Outpost(4) pos 40, faction 20, undiscovered by faction 10
//! wormhole Lantern <-> Spindle; factions 10 and 20 at war
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use starlane_lib::{
    CostConfig, FactionRelationship, MemoryStore, RelationshipStatus, SystemRecord, WormholePair,
};

use crate::state::AppState;

/// Known ids in the fixture starmap.
pub mod fixture_systems {
    pub const HAVEN: i64 = 1;
    pub const LANTERN: i64 = 2;
    pub const SPINDLE: i64 = 3;
    pub const OUTPOST: i64 = 4;

    /// Faction that discovered Haven, Lantern and Spindle.
    pub const EXPLORERS: i64 = 10;
    /// Faction at war with the explorers; owns Outpost.
    pub const RAIDERS: i64 = 20;
}

/// The fixture starmap as a store.
pub fn fixture_store() -> MemoryStore {
    use fixture_systems::*;

    MemoryStore::new()
        .with_system(SystemRecord::new(HAVEN, "Haven", "0").with_catapult("5").owned_by(EXPLORERS))
        .with_system(SystemRecord::new(LANTERN, "Lantern", "5").in_region("Veil"))
        .with_system(SystemRecord::new(SPINDLE, "Spindle", "12"))
        .discovered_by(EXPLORERS)
        .with_system(SystemRecord::new(OUTPOST, "Outpost", "40").owned_by(RAIDERS))
        .with_wormhole(WormholePair::new(LANTERN, SPINDLE).expect("distinct fixture systems"))
        .with_relationship(
            FactionRelationship::new(EXPLORERS, RAIDERS, RelationshipStatus::War)
                .expect("distinct fixture factions"),
        )
        .with_region_effect("Veil", "decay")
}

/// Application state over [`fixture_store`] with default costs.
pub fn test_state() -> AppState {
    AppState::from_source(fixture_store(), CostConfig::default())
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!("test-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}
