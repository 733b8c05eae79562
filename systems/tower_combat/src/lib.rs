#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns target assignments into shots.
//!
//! A tower fires once `1 / rate` seconds have passed since its last shot. The
//! world trusts this system for timing and only checks that the shot is
//! geometrically possible.

use tile_defence_core::{Command, TowerId, TowerTarget, TowerView, WaveProgress};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    ready: Vec<TowerId>,
}

impl TowerCombat {
    /// Creates a new tower combat system with an empty readiness buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one `Command::FireProjectile` per targeted tower whose cooldown
    /// has elapsed at `now`, in the order of `tower_targets`.
    pub fn handle(
        &mut self,
        now: f64,
        progress: WaveProgress,
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if progress == WaveProgress::GameOver || tower_targets.is_empty() {
            return;
        }

        self.ready.clear();
        self.ready.extend(
            towers
                .iter()
                .filter(|tower| tower.is_ready(now))
                .map(|tower| tower.id),
        );

        for target in tower_targets {
            if self.ready.binary_search(&target.tower).is_ok() {
                out.push(Command::FireProjectile {
                    tower: target.tower,
                    target: target.mob,
                });
            }
        }
    }
}
