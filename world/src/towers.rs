//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use tile_defence_core::{TileCoord, Tier, TowerId, TowerKind, TowerSnapshot, NEVER_FIRED};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Tile occupied by the tower.
    pub(crate) tile: TileCoord,
    /// Current upgrade level.
    pub(crate) tier: Tier,
    /// Simulation time of the last shot.
    pub(crate) last_fired_at: f64,
    /// Money spent on construction.
    pub(crate) cost: u32,
}

impl TowerState {
    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            tile: self.tile,
            tier: self.tier,
            stats: self.kind.stats(self.tier),
            last_fired_at: self.last_fired_at,
            cost: self.cost,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a tier one tower and returns the identifier allocated for it.
    pub(crate) fn insert(&mut self, kind: TowerKind, tile: TileCoord, cost: u32) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                tile,
                tier: Tier::One,
                last_fired_at: NEVER_FIRED,
                cost,
            },
        );
        id
    }

    pub(crate) fn get(&self, tower: TowerId) -> Option<&TowerState> {
        self.entries.get(&tower)
    }

    pub(crate) fn get_mut(&mut self, tower: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&tower)
    }

    /// Identifier of the tower standing on `tile`, if any.
    pub(crate) fn occupant(&self, tile: TileCoord) -> Option<TowerId> {
        self.entries
            .values()
            .find(|state| state.tile == tile)
            .map(|state| state.id)
    }

    /// Towers in ascending identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_allocates_monotonic_identifiers() {
        let mut registry = TowerRegistry::new();
        let first = registry.insert(TowerKind::Arrow, TileCoord::new(1, 1), 60);
        let second = registry.insert(TowerKind::Frost, TileCoord::new(2, 1), 70);

        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        assert_eq!(registry.occupant(TileCoord::new(2, 1)), Some(second));
        assert_eq!(registry.occupant(TileCoord::new(3, 1)), None);
    }

    #[test]
    fn fresh_tower_is_ready_to_fire() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(TowerKind::Cannon, TileCoord::new(0, 0), 80);
        let state = registry.get(id).expect("tower stored");

        assert_eq!(state.tier, Tier::One);
        assert_eq!(state.last_fired_at, NEVER_FIRED);
        assert!(state.snapshot().is_ready(0.0));
    }

    #[test]
    fn cooldown_counts_down_from_last_shot() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(TowerKind::Arrow, TileCoord::new(0, 0), 60);
        let state = registry.get_mut(id).expect("tower stored");
        state.last_fired_at = 1.0;

        let snapshot = state.snapshot();
        let cooldown = TowerKind::Arrow.stats(Tier::One).cooldown();
        assert!((snapshot.ready_in(1.0) - cooldown).abs() < 1e-12);
        assert!(!snapshot.is_ready(1.0 + cooldown / 2.0));
        assert_eq!(snapshot.ready_in(1.0 + cooldown + 1e-9), 0.0);
    }
}
