//! Projectiles in flight.

use std::collections::BTreeMap;

use tile_defence_core::{MobId, ProjectileId, ProjectileSnapshot, Slow, Splash, TilePoint};

#[derive(Clone, Debug)]
pub(crate) struct ProjectileState {
    pub(crate) id: ProjectileId,
    pub(crate) position: TilePoint,
    pub(crate) target: MobId,
    pub(crate) speed: f64,
    pub(crate) damage: u32,
    pub(crate) splash: Option<Splash>,
    pub(crate) slow: Option<Slow>,
}

impl ProjectileState {
    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            position: self.position,
            target: self.target,
            speed: self.speed,
            damage: self.damage,
            splash: self.splash,
            slow: self.slow,
        }
    }
}

/// Payload copied from the firing tower when a projectile is launched.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Launch {
    pub(crate) origin: TilePoint,
    pub(crate) target: MobId,
    pub(crate) speed: f64,
    pub(crate) damage: u32,
    pub(crate) splash: Option<Splash>,
    pub(crate) slow: Option<Slow>,
}

#[derive(Debug)]
pub(crate) struct ProjectileRegistry {
    entries: BTreeMap<ProjectileId, ProjectileState>,
    next_projectile_id: ProjectileId,
}

impl ProjectileRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    pub(crate) fn launch(&mut self, launch: Launch) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            ProjectileState {
                id,
                position: launch.origin,
                target: launch.target,
                speed: launch.speed,
                damage: launch.damage,
                splash: launch.splash,
                slow: launch.slow,
            },
        );
        id
    }

    pub(crate) fn get_mut(&mut self, projectile: ProjectileId) -> Option<&mut ProjectileState> {
        self.entries.get_mut(&projectile)
    }

    pub(crate) fn remove(&mut self, projectile: ProjectileId) -> Option<ProjectileState> {
        self.entries.remove(&projectile)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ProjectileState> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launched_projectile_starts_at_origin() {
        let mut registry = ProjectileRegistry::new();
        let id = registry.launch(Launch {
            origin: TilePoint::new(3.5, 1.5),
            target: MobId::new(9),
            speed: 9.0,
            damage: 10,
            splash: None,
            slow: None,
        });

        let snapshot = registry.get_mut(id).expect("projectile stored").snapshot();
        assert_eq!(snapshot.id, ProjectileId::new(0));
        assert_eq!(snapshot.position, TilePoint::new(3.5, 1.5));
        assert_eq!(snapshot.target, MobId::new(9));

        assert!(registry.remove(id).is_some());
        assert!(registry.iter().next().is_none());
    }
}
