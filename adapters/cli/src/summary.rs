//! Tallies of a headless run.

use serde::Serialize;
use tile_defence_core::Event;
use tile_defence_engine::{Game, Outcome};

use crate::scenario::BuildOutcome;

/// Counters accumulated from the event stream of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct Tally {
    pub(crate) spawned: u32,
    pub(crate) killed: u32,
    pub(crate) escaped: u32,
    pub(crate) shots: u32,
    pub(crate) waves_started: u32,
}

impl Tally {
    pub(crate) fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::MobSpawned { .. } => self.spawned += 1,
                Event::MobKilled { .. } => self.killed += 1,
                Event::MobEscaped { .. } => self.escaped += 1,
                Event::ProjectileFired { .. } => self.shots += 1,
                Event::WaveStarted { .. } => self.waves_started += 1,
                _ => {}
            }
        }
    }
}

/// Final report printed when the run ends.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct Summary {
    pub(crate) outcome: &'static str,
    pub(crate) simulated_seconds: f64,
    pub(crate) wave: u32,
    pub(crate) lives: u32,
    pub(crate) money: u32,
    pub(crate) towers: usize,
    pub(crate) build: BuildOutcome,
    pub(crate) tally: Tally,
}

impl Summary {
    pub(crate) fn new(game: &Game, build: BuildOutcome, tally: Tally) -> Self {
        let outcome = match game.outcome() {
            Outcome::InProgress => "in_progress",
            Outcome::Won => "won",
            Outcome::Lost => "lost",
        };
        Self {
            outcome,
            simulated_seconds: game.time(),
            wave: game.wave_index() + 1,
            lives: game.lives(),
            money: game.money(),
            towers: game.towers().iter().count(),
            build,
            tally,
        }
    }

    pub(crate) fn render(&self) -> String {
        format!(
            "outcome: {}\nsimulated: {:.2}s\nwave: {}\nlives: {}\nmoney: {}\ntowers: {} \
             (placed {}, upgraded {}, refused {})\nmobs: {} spawned, {} killed, {} escaped\nshots: {}",
            self.outcome,
            self.simulated_seconds,
            self.wave,
            self.lives,
            self.money,
            self.towers,
            self.build.placed,
            self.build.upgraded,
            self.build.rejected,
            self.tally.spawned,
            self.tally.killed,
            self.tally.escaped,
            self.tally.shots,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_defence_core::{MobId, MobKind, TilePoint};

    #[test]
    fn tally_counts_only_tracked_events() {
        let mut tally = Tally::default();
        tally.record(&[
            Event::MobSpawned {
                mob: MobId::new(0),
                kind: MobKind::Tank,
                position: TilePoint::ZERO,
            },
            Event::MobKilled {
                mob: MobId::new(0),
                bounty: 5,
            },
            Event::TimeAdvanced { dt: 0.1, now: 0.1 },
            Event::MobEscaped {
                mob: MobId::new(1),
                lives: 19,
            },
        ]);

        assert_eq!(
            tally,
            Tally {
                spawned: 1,
                killed: 1,
                escaped: 1,
                shots: 0,
                waves_started: 0,
            }
        );
    }
}
