use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::db::{FactionId, FactionRelationship, RelationshipStatus, SystemId, SystemRecord, WormholePair};
use crate::error::Result;

/// Read-only view of the starmap used to assemble one route snapshot.
///
/// Implementations must return data consistent with a single point in time
/// for the lifetime of the value; [`crate::db::SqliteReader`] does so by
/// holding a read transaction.
pub trait StarmapStore {
    /// Systems visible to the traveler. `unrestricted` returns every system.
    fn fetch_visible_systems(
        &self,
        faction: Option<FactionId>,
        unrestricted: bool,
    ) -> Result<Vec<SystemRecord>>;

    fn fetch_wormholes(&self) -> Result<Vec<WormholePair>>;

    /// Relationship status of every faction that has one with `faction`.
    fn fetch_relationships(
        &self,
        faction: FactionId,
    ) -> Result<HashMap<FactionId, RelationshipStatus>>;

    /// Regions carrying the named effect.
    fn fetch_region_effects(&self, effect: &str) -> Result<HashSet<String>>;
}

impl<T: StarmapStore + ?Sized> StarmapStore for &T {
    fn fetch_visible_systems(
        &self,
        faction: Option<FactionId>,
        unrestricted: bool,
    ) -> Result<Vec<SystemRecord>> {
        (**self).fetch_visible_systems(faction, unrestricted)
    }

    fn fetch_wormholes(&self) -> Result<Vec<WormholePair>> {
        (**self).fetch_wormholes()
    }

    fn fetch_relationships(
        &self,
        faction: FactionId,
    ) -> Result<HashMap<FactionId, RelationshipStatus>> {
        (**self).fetch_relationships(faction)
    }

    fn fetch_region_effects(&self, effect: &str) -> Result<HashSet<String>> {
        (**self).fetch_region_effects(effect)
    }
}

/// Hands out a consistent reader per request. Shared across service workers.
pub trait SnapshotSource: Send + Sync {
    fn reader(&self) -> Result<Box<dyn StarmapStore + '_>>;
}

/// In-memory starmap for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    systems: BTreeMap<SystemId, SystemRecord>,
    discovered: HashMap<FactionId, BTreeSet<SystemId>>,
    wormholes: BTreeSet<WormholePair>,
    relationships: HashMap<(FactionId, FactionId), RelationshipStatus>,
    region_effects: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a system record.
    pub fn with_system(mut self, record: SystemRecord) -> Self {
        self.systems.insert(record.id, record);
        self
    }

    /// Mark `system` as discovered by `faction`.
    pub fn with_discovery(mut self, faction: FactionId, system: SystemId) -> Self {
        self.discovered.entry(faction).or_default().insert(system);
        self
    }

    /// Mark every system currently in the store as discovered by `faction`.
    pub fn discovered_by(mut self, faction: FactionId) -> Self {
        let ids: Vec<_> = self.systems.keys().copied().collect();
        self.discovered.entry(faction).or_default().extend(ids);
        self
    }

    pub fn with_wormhole(mut self, pair: WormholePair) -> Self {
        self.wormholes.insert(pair);
        self
    }

    pub fn with_relationship(mut self, relationship: FactionRelationship) -> Self {
        self.relationships.insert(
            (relationship.a(), relationship.b()),
            relationship.status(),
        );
        self
    }

    /// Attach an effect to a region, replacing any previous one.
    pub fn with_region_effect(mut self, region: impl Into<String>, effect: impl Into<String>) -> Self {
        self.region_effects.insert(region.into(), effect.into());
        self
    }
}

impl StarmapStore for MemoryStore {
    fn fetch_visible_systems(
        &self,
        faction: Option<FactionId>,
        unrestricted: bool,
    ) -> Result<Vec<SystemRecord>> {
        if unrestricted {
            return Ok(self.systems.values().cloned().collect());
        }

        let Some(discovered) = faction.and_then(|faction| self.discovered.get(&faction)) else {
            return Ok(Vec::new());
        };

        Ok(discovered
            .iter()
            .filter_map(|id| self.systems.get(id))
            .cloned()
            .collect())
    }

    fn fetch_wormholes(&self) -> Result<Vec<WormholePair>> {
        Ok(self.wormholes.iter().copied().collect())
    }

    fn fetch_relationships(
        &self,
        faction: FactionId,
    ) -> Result<HashMap<FactionId, RelationshipStatus>> {
        Ok(self
            .relationships
            .iter()
            .filter_map(|(&(a, b), &status)| {
                if a == faction {
                    Some((b, status))
                } else if b == faction {
                    Some((a, status))
                } else {
                    None
                }
            })
            .collect())
    }

    fn fetch_region_effects(&self, effect: &str) -> Result<HashSet<String>> {
        Ok(self
            .region_effects
            .iter()
            .filter(|(_, value)| value.as_str() == effect)
            .map(|(region, _)| region.clone())
            .collect())
    }
}

impl SnapshotSource for MemoryStore {
    fn reader(&self) -> Result<Box<dyn StarmapStore + '_>> {
        Ok(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_system(SystemRecord::new(1, "Alpha", "0"))
            .with_system(SystemRecord::new(2, "Beta", "10"))
            .with_system(SystemRecord::new(3, "Gamma", "20"))
            .with_discovery(7, 1)
            .with_discovery(7, 3)
    }

    #[test]
    fn unrestricted_sees_everything() {
        let ids: Vec<_> = store()
            .fetch_visible_systems(None, true)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn faction_sees_only_discovered_systems() {
        let ids: Vec<_> = store()
            .fetch_visible_systems(Some(7), false)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(store().fetch_visible_systems(Some(8), false).unwrap().is_empty());
    }

    #[test]
    fn relationships_are_reported_from_either_side() {
        let store = MemoryStore::new()
            .with_relationship(FactionRelationship::new(1, 2, RelationshipStatus::Allied).unwrap())
            .with_relationship(FactionRelationship::new(3, 1, RelationshipStatus::War).unwrap())
            .with_relationship(FactionRelationship::new(2, 3, RelationshipStatus::War).unwrap());

        let rels = store.fetch_relationships(1).unwrap();
        assert_eq!(rels.len(), 2);
        assert_eq!(rels.get(&2), Some(&RelationshipStatus::Allied));
        assert_eq!(rels.get(&3), Some(&RelationshipStatus::War));
    }

    #[test]
    fn region_effects_filter_by_name() {
        let store = MemoryStore::new()
            .with_region_effect("Veil", "decay")
            .with_region_effect("Rim", "storm")
            .with_region_effect("Rim", "decay");

        let mut regions: Vec<_> = store.fetch_region_effects("decay").unwrap().into_iter().collect();
        regions.sort();
        assert_eq!(regions, vec!["Rim".to_string(), "Veil".to_string()]);
    }
}
