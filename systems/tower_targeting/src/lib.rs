#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.
//!
//! Every tower aims at the mob closest to the centre of its tile, considering
//! only mobs whose distance does not exceed the tower's range. Equal distances
//! resolve toward the smaller mob identifier.

use tile_defence_core::{MobId, MobView, TilePoint, TowerId, TowerTarget, TowerView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    mob_workspace: Vec<MobCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments, ordered by tower identifier.
    pub fn handle(&mut self, towers: &TowerView, mobs: &MobView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if towers.iter().next().is_none() || mobs.is_empty() {
            return;
        }

        self.prepare_tower_workspace(towers);
        self.prepare_mob_workspace(mobs);

        for tower in &self.tower_workspace {
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.mob_workspace {
                let distance = candidate.position.distance(tower.center);
                if distance > tower.range {
                    continue;
                }

                let current = BestCandidate {
                    distance,
                    mob: candidate.id,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    mob: best_candidate.mob,
                    distance: best_candidate.distance,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView) {
        self.tower_workspace.clear();
        let (lower, _) = towers.iter().size_hint();
        self.tower_workspace.reserve(lower);

        for snapshot in towers.iter() {
            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                center: snapshot.tile.center(),
                range: snapshot.stats.range,
            });
        }
    }

    fn prepare_mob_workspace(&mut self, mobs: &MobView) {
        self.mob_workspace.clear();
        self.mob_workspace.reserve(mobs.len());

        for snapshot in mobs.iter() {
            self.mob_workspace.push(MobCandidate {
                id: snapshot.id,
                position: snapshot.position,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    center: TilePoint,
    range: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct MobCandidate {
    id: MobId,
    position: TilePoint,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance: f64,
    mob: MobId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance != other.distance {
            return self.distance < other.distance;
        }

        self.mob < other.mob
    }
}

#[cfg(test)]
mod tests {
    use super::{TilePoint, TowerTargeting};
    use tile_defence_core::{
        MobId, MobKind, MobSnapshot, MobView, TileCoord, Tier, TowerId, TowerKind, TowerSnapshot,
        TowerView, NEVER_FIRED,
    };

    fn tower_snapshot(id: u32, kind: TowerKind, tile: (u32, u32)) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind,
            tile: TileCoord::new(tile.0, tile.1),
            tier: Tier::One,
            stats: kind.stats(Tier::One),
            last_fired_at: NEVER_FIRED,
            cost: kind.build_cost(),
        }
    }

    fn mob_snapshot(id: u32, position: (f64, f64)) -> MobSnapshot {
        let stats = MobKind::Normal.base_stats();
        MobSnapshot {
            id: MobId::new(id),
            kind: MobKind::Normal,
            position: TilePoint::new(position.0, position.1),
            hp: stats.hp,
            speed: stats.speed,
            armor: stats.armor,
            waypoint_index: 1,
            slow_until: None,
        }
    }

    #[test]
    fn targets_mob_within_range() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(1, TowerKind::Arrow, (4, 4))]);
        let mobs = MobView::from_snapshots(vec![mob_snapshot(2, (6.5, 4.5))]);

        let mut out = Vec::new();
        system.handle(&towers, &mobs, &mut out);

        assert_eq!(out.len(), 1);
        let target = out[0];
        assert_eq!(target.tower, TowerId::new(1));
        assert_eq!(target.mob, MobId::new(2));
        assert_eq!(target.distance, 2.0);
    }

    #[test]
    fn mob_outside_range_is_ignored() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(1, TowerKind::Frost, (0, 0))]);
        let mobs = MobView::from_snapshots(vec![mob_snapshot(2, (2.6, 0.5))]);

        let mut out = Vec::new();
        system.handle(&towers, &mobs, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(1, TowerKind::Frost, (0, 0))]);
        let mobs = MobView::from_snapshots(vec![mob_snapshot(2, (2.5, 0.5))]);

        let mut out = Vec::new();
        system.handle(&towers, &mobs, &mut out);

        assert_eq!(out.len(), 1);
    }

    #[test]
    fn nearest_mob_wins_over_older_mobs() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(1, TowerKind::Arrow, (3, 0))]);
        let mobs = MobView::from_snapshots(vec![
            mob_snapshot(1, (5.5, 1.5)),
            mob_snapshot(2, (3.5, 1.5)),
            mob_snapshot(3, (2.0, 1.5)),
        ]);

        let mut out = Vec::new();
        system.handle(&towers, &mobs, &mut out);

        assert_eq!(out[0].mob, MobId::new(2));
    }

    #[test]
    fn smaller_mob_id_is_preferred_when_distances_match() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(1, TowerKind::Arrow, (2, 2))]);
        let mobs = MobView::from_snapshots(vec![
            mob_snapshot(20, (3.5, 2.5)),
            mob_snapshot(10, (1.5, 2.5)),
        ]);

        let mut out = Vec::new();
        system.handle(&towers, &mobs, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].mob, MobId::new(10));
    }

    #[test]
    fn each_tower_picks_independently() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![
            tower_snapshot(2, TowerKind::Arrow, (8, 0)),
            tower_snapshot(1, TowerKind::Arrow, (0, 0)),
        ]);
        let mobs = MobView::from_snapshots(vec![
            mob_snapshot(5, (0.5, 1.5)),
            mob_snapshot(6, (8.5, 1.5)),
        ]);

        let mut out = Vec::new();
        system.handle(&towers, &mobs, &mut out);

        let pairs: Vec<(TowerId, MobId)> = out
            .iter()
            .map(|target| (target.tower, target.mob))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (TowerId::new(1), MobId::new(5)),
                (TowerId::new(2), MobId::new(6)),
            ]
        );
    }

    #[test]
    fn empty_inputs_clear_previous_targets() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(1, TowerKind::Arrow, (0, 0))]);
        let mobs = MobView::from_snapshots(vec![mob_snapshot(5, (0.5, 1.5))]);

        let mut out = Vec::new();
        system.handle(&towers, &mobs, &mut out);
        assert_eq!(out.len(), 1);

        system.handle(&towers, &MobView::default(), &mut out);
        assert!(out.is_empty());
    }
}
