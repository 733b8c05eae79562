//! Static tuning tables: mob stats, tower stats, prices and the wave table.

use serde::{Deserialize, Serialize};

use crate::{MobKind, Tier, TowerKind};

/// Base attributes assigned to a freshly spawned mob.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MobStats {
    /// Starting health.
    pub hp: i32,
    /// Movement speed in tiles per second.
    pub speed: f64,
    /// Flat damage reduction.
    pub armor: u32,
}

impl MobKind {
    /// Base attributes of the mob kind.
    #[must_use]
    pub const fn base_stats(self) -> MobStats {
        match self {
            Self::Normal => MobStats {
                hp: 25,
                speed: 2.0,
                armor: 1,
            },
            Self::Fast => MobStats {
                hp: 18,
                speed: 3.0,
                armor: 0,
            },
            Self::Tank => MobStats {
                hp: 60,
                speed: 1.2,
                armor: 2,
            },
            Self::Flying => MobStats {
                hp: 22,
                speed: 2.4,
                armor: 0,
            },
        }
    }
}

/// Combat stats of a tower at a given tier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Targeting radius in tiles, measured from the tile centre.
    pub range: f64,
    /// Shots per second.
    pub rate: f64,
    /// Raw damage per projectile.
    pub damage: u32,
    /// Projectile flight speed in tiles per second.
    pub projectile_speed: f64,
}

impl TowerStats {
    /// Seconds between two shots.
    #[must_use]
    pub fn cooldown(&self) -> f64 {
        1.0 / self.rate
    }
}

/// Area damage carried by a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Splash {
    /// Radius around the impact point receiving damage.
    pub radius: f64,
}

/// Slow effect carried by a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Slow {
    /// Seconds the slow lasts after the hit.
    pub duration: f64,
}

impl TowerKind {
    /// Money required to build a tier one tower of this kind.
    #[must_use]
    pub const fn build_cost(self) -> u32 {
        match self {
            Self::Arrow => 60,
            Self::Cannon => 80,
            Self::Frost => 70,
        }
    }

    /// Money required to upgrade from `tier` to the next tier.
    ///
    /// Returns `None` at the final tier, where no upgrade exists.
    #[must_use]
    pub const fn upgrade_cost(self, tier: Tier) -> Option<u32> {
        match (self, tier) {
            (_, Tier::Three) => None,
            (Self::Arrow, Tier::One) => Some(50),
            (Self::Arrow, Tier::Two) => Some(90),
            (Self::Cannon, Tier::One) => Some(70),
            (Self::Cannon, Tier::Two) => Some(120),
            (Self::Frost, Tier::One) => Some(60),
            (Self::Frost, Tier::Two) => Some(100),
        }
    }

    /// Combat stats of the kind at the provided tier.
    #[must_use]
    pub const fn stats(self, tier: Tier) -> TowerStats {
        let (range, rate, damage, projectile_speed) = match (self, tier) {
            (Self::Arrow, Tier::One) => (2.4, 1.2, 10, 9.0),
            (Self::Arrow, Tier::Two) => (2.7, 1.4, 14, 10.0),
            (Self::Arrow, Tier::Three) => (3.0, 1.7, 20, 11.0),
            (Self::Cannon, Tier::One) => (2.2, 0.8, 16, 6.0),
            (Self::Cannon, Tier::Two) => (2.4, 0.9, 24, 6.5),
            (Self::Cannon, Tier::Three) => (2.7, 1.0, 34, 7.0),
            (Self::Frost, Tier::One) => (2.0, 0.7, 4, 7.0),
            (Self::Frost, Tier::Two) => (2.3, 0.85, 6, 7.5),
            (Self::Frost, Tier::Three) => (2.6, 1.0, 9, 8.0),
        };
        TowerStats {
            range,
            rate,
            damage,
            projectile_speed,
        }
    }

    /// Area damage carried by the kind's projectiles.
    #[must_use]
    pub fn splash(self, tier: Tier) -> Option<Splash> {
        match self {
            Self::Cannon => Some(Splash {
                radius: 1.5 + 0.4 * tier_steps(tier),
            }),
            Self::Arrow | Self::Frost => None,
        }
    }

    /// Slow effect carried by the kind's projectiles.
    #[must_use]
    pub fn slow(self, tier: Tier) -> Option<Slow> {
        match self {
            Self::Frost => Some(Slow {
                duration: 1.0 + 0.3 * tier_steps(tier),
            }),
            Self::Arrow | Self::Cannon => None,
        }
    }
}

fn tier_steps(tier: Tier) -> f64 {
    f64::from(tier.get() - 1)
}

/// Burst of identical mobs within a wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveEntry {
    /// Offset in seconds from the wave start to the first spawn.
    pub delay: f64,
    /// Kind of mob spawned by the burst.
    pub kind: MobKind,
    /// Number of mobs spawned by the burst.
    pub count: u32,
    /// Seconds between consecutive spawns of the burst.
    pub spacing: f64,
}

/// Authored wave composed of ordered bursts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// Bursts in authoring order.
    pub entries: Vec<WaveEntry>,
}

impl WaveDefinition {
    /// Total number of mobs spawned by the wave.
    #[must_use]
    pub fn spawn_count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| usize::try_from(entry.count).unwrap_or(usize::MAX))
            .fold(0, usize::saturating_add)
    }
}

/// Spawn event placed at an absolute simulation time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSpawn {
    /// Simulation time at which the mob appears.
    pub time: f64,
    /// Kind of mob to spawn.
    pub kind: MobKind,
}

/// Wave table used by a standard game.
#[must_use]
pub fn standard_waves() -> Vec<WaveDefinition> {
    let burst = |kind, count, spacing| WaveDefinition {
        entries: vec![WaveEntry {
            delay: 0.0,
            kind,
            count,
            spacing,
        }],
    };

    vec![
        burst(MobKind::Normal, 8, 0.7),
        burst(MobKind::Fast, 10, 0.6),
        burst(MobKind::Tank, 6, 0.9),
        burst(MobKind::Normal, 10, 0.5),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [TowerKind; 3] = [TowerKind::Arrow, TowerKind::Cannon, TowerKind::Frost];

    #[test]
    fn arrow_is_the_cheapest_tower() {
        assert!(TowerKind::Arrow.build_cost() < TowerKind::Cannon.build_cost());
        assert!(TowerKind::Arrow.build_cost() < TowerKind::Frost.build_cost());
    }

    #[test]
    fn stats_never_degrade_between_tiers() {
        for kind in KINDS {
            let tiers = [Tier::One, Tier::Two, Tier::Three];
            for pair in tiers.windows(2) {
                let lower = kind.stats(pair[0]);
                let upper = kind.stats(pair[1]);
                assert!(upper.range > lower.range, "{kind:?} range");
                assert!(upper.rate > lower.rate, "{kind:?} rate");
                assert!(upper.damage > lower.damage, "{kind:?} damage");
                assert!(
                    upper.projectile_speed > lower.projectile_speed,
                    "{kind:?} projectile speed"
                );
            }
        }
    }

    #[test]
    fn final_tier_has_no_upgrade_price() {
        for kind in KINDS {
            assert!(kind.upgrade_cost(Tier::One).is_some());
            assert!(kind.upgrade_cost(Tier::Two).is_some());
            assert_eq!(kind.upgrade_cost(Tier::Three), None);
        }
    }

    #[test]
    fn effects_scale_with_tier() {
        let splash = TowerKind::Cannon.splash(Tier::Three).expect("cannon splash");
        assert!((splash.radius - 2.3).abs() < 1e-9);
        let slow = TowerKind::Frost.slow(Tier::Two).expect("frost slow");
        assert!((slow.duration - 1.3).abs() < 1e-9);
        assert!(TowerKind::Arrow.splash(Tier::One).is_none());
        assert!(TowerKind::Arrow.slow(Tier::One).is_none());
        assert!(TowerKind::Frost.stats(Tier::One).damage > 0);
    }

    #[test]
    fn standard_waves_match_the_authored_table() {
        let waves = standard_waves();
        let counts: Vec<usize> = waves.iter().map(WaveDefinition::spawn_count).collect();
        assert_eq!(counts, vec![8, 10, 6, 10]);
        assert_eq!(waves[2].entries[0].kind, MobKind::Tank);
    }
}
