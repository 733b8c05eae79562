#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that flies homing projectiles toward their targets.
//!
//! Projectiles chase the current position of the mob they were fired at. A
//! projectile whose target vanished is discarded, and one that would reach or
//! overshoot its target during the tick resolves its impact instead of moving.

use tile_defence_core::{
    Command, Event, MobView, ProjectileSnapshot, ProjectileView, TilePoint, IMPACT_RADIUS,
};

/// Projectile flight system that reuses a scratch buffer between ticks.
#[derive(Debug, Default)]
pub struct Projectiles {
    scratch: Vec<Command>,
}

impl Projectiles {
    /// Creates a new projectile system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes clock events and emits one command per projectile in flight.
    ///
    /// Projectiles are processed in identifier order. Nothing is emitted when
    /// the events carry no clock advance.
    pub fn handle(
        &mut self,
        events: &[Event],
        projectiles: &ProjectileView,
        mobs: &MobView,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = 0.0;
        let mut ticked = false;
        for event in events {
            if let Event::TimeAdvanced { dt, .. } = event {
                elapsed += dt;
                ticked = true;
            }
        }
        if !ticked {
            return;
        }

        self.scratch.clear();
        for projectile in projectiles.iter() {
            let command = match mobs.get(projectile.target) {
                Some(mob) => steer(projectile, mob.position, elapsed),
                None => Command::DiscardProjectile {
                    projectile: projectile.id,
                },
            };
            self.scratch.push(command);
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn steer(projectile: &ProjectileSnapshot, target: TilePoint, elapsed: f64) -> Command {
    let gap = projectile.position.distance(target);
    let travel = elapsed * projectile.speed;

    if gap < IMPACT_RADIUS || travel >= gap {
        return Command::ResolveImpact {
            projectile: projectile.id,
        };
    }

    Command::AdvanceProjectile {
        projectile: projectile.id,
        position: projectile.position + (target - projectile.position) / gap * travel,
    }
}
