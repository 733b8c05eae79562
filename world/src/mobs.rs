//! Mobs walking the path.

use std::collections::BTreeMap;

use tile_defence_core::{MobId, MobKind, MobSnapshot, TilePoint};

#[derive(Clone, Debug)]
pub(crate) struct MobState {
    pub(crate) id: MobId,
    pub(crate) kind: MobKind,
    pub(crate) position: TilePoint,
    pub(crate) hp: i32,
    pub(crate) speed: f64,
    pub(crate) armor: u32,
    pub(crate) waypoint_index: usize,
    pub(crate) slow_until: Option<f64>,
}

impl MobState {
    /// Subtracts armor-adjusted damage and returns the amount applied.
    ///
    /// Every hit removes at least one point of health.
    pub(crate) fn take_hit(&mut self, raw_damage: u32) -> u32 {
        let applied = raw_damage.saturating_sub(self.armor).max(1);
        self.hp = self
            .hp
            .saturating_sub(i32::try_from(applied).unwrap_or(i32::MAX));
        applied
    }

    /// Sets or extends the slow expiry, keeping whichever expires last.
    pub(crate) fn extend_slow(&mut self, until: f64) -> f64 {
        let until = self.slow_until.map_or(until, |current| current.max(until));
        self.slow_until = Some(until);
        until
    }

    pub(crate) fn snapshot(&self) -> MobSnapshot {
        MobSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            hp: self.hp,
            speed: self.speed,
            armor: self.armor,
            waypoint_index: self.waypoint_index,
            slow_until: self.slow_until,
        }
    }
}

/// Living mobs keyed by identifier.
#[derive(Debug)]
pub(crate) struct MobRegistry {
    entries: BTreeMap<MobId, MobState>,
    next_mob_id: MobId,
}

impl MobRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_mob_id: MobId::new(0),
        }
    }

    /// Creates a mob with the kind's base stats heading for the second path point.
    pub(crate) fn spawn(&mut self, kind: MobKind, position: TilePoint) -> MobId {
        let id = self.next_mob_id;
        self.next_mob_id = MobId::new(id.get().saturating_add(1));
        let stats = kind.base_stats();
        let _ = self.entries.insert(
            id,
            MobState {
                id,
                kind,
                position,
                hp: stats.hp,
                speed: stats.speed,
                armor: stats.armor,
                waypoint_index: 1,
                slow_until: None,
            },
        );
        id
    }

    pub(crate) fn get(&self, mob: MobId) -> Option<&MobState> {
        self.entries.get(&mob)
    }

    pub(crate) fn get_mut(&mut self, mob: MobId) -> Option<&mut MobState> {
        self.entries.get_mut(&mob)
    }

    pub(crate) fn remove(&mut self, mob: MobId) -> Option<MobState> {
        self.entries.remove(&mob)
    }

    /// Identifiers of mobs within `radius` of `center`, in ascending order.
    pub(crate) fn within(&self, center: TilePoint, radius: f64) -> Vec<MobId> {
        self.entries
            .values()
            .filter(|state| state.position.distance(center) <= radius)
            .map(|state| state.id)
            .collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &MobState> {
        self.entries.values()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
