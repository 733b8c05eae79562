#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Host-facing facade that drives the Tile Defence simulation.
//!
//! A [`Game`] owns the authoritative world together with the pure systems and
//! runs them in a fixed order on every tick. Hosts never mutate the world
//! directly: they call the build, upgrade and wave operations, which report
//! success as a flag, and read state through the accessors.

mod clock;
mod config;

use std::sync::Arc;

pub use clock::{FrameClock, FrameReport, MAX_FRAME_DELTA};
pub use config::GameConfig;
pub use tile_defence_world::{load_grid, Grid};

use tile_defence_core::{
    Command, Event, MobView, ProjectileView, TileCoord, Tier, TowerId, TowerKind, TowerSnapshot,
    TowerTarget, TowerView, WaveProgress,
};
use tile_defence_system_movement::Movement;
use tile_defence_system_projectiles::Projectiles;
use tile_defence_system_spawning::{schedule, Spawning};
use tile_defence_system_tower_combat::TowerCombat;
use tile_defence_system_tower_targeting::TowerTargeting;
use tile_defence_world::{self as world, query, World};
use tracing::{debug, trace};

/// Events produced by host operations and by a single tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Events in the order the world emitted them.
    pub events: Vec<Event>,
}

/// Final state of a session as seen by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Waves remain and lives are left.
    InProgress,
    /// The final wave was cleared with lives remaining.
    Won,
    /// The last life was lost.
    Lost,
}

/// Upgrade feasibility of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UpgradeQuote {
    /// Whether the upgrade can be bought right now.
    pub affordable: bool,
    /// Price of the next tier; `None` at the final tier.
    pub cost: Option<u32>,
}

/// Price of a tier one tower of `kind`.
#[must_use]
pub const fn tower_cost(kind: TowerKind) -> u32 {
    kind.build_cost()
}

/// Price of upgrading a `kind` tower from `tier`; `None` at the final tier.
#[must_use]
pub const fn tower_upgrade_cost(kind: TowerKind, tier: Tier) -> Option<u32> {
    kind.upgrade_cost(tier)
}

/// Creates a fresh game on `grid`.
#[must_use]
pub fn init_game(grid: Arc<Grid>, config: GameConfig) -> Game {
    Game::new(grid, config)
}

/// A running Tile Defence session.
#[derive(Debug)]
pub struct Game {
    grid: Arc<Grid>,
    config: GameConfig,
    world: World,
    systems: Systems,
    pending: Vec<Event>,
}

#[derive(Debug, Default)]
struct Systems {
    spawning: Spawning,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    projectiles: Projectiles,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
}

impl Game {
    /// Creates a fresh game on `grid` with no wave started.
    #[must_use]
    pub fn new(grid: Arc<Grid>, config: GameConfig) -> Self {
        let world = World::new(Arc::clone(&grid), config.world_setup());
        Self {
            grid,
            config,
            world,
            systems: Systems::default(),
            pending: Vec::new(),
        }
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// The returned report carries the events of host operations issued since
    /// the previous tick followed by the events of this tick. Non-finite or
    /// negative deltas leave the simulation untouched.
    pub fn advance_tick(&mut self, dt: f64) -> TickReport {
        let mut events = std::mem::take(&mut self.pending);

        let mut clock = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut clock);
        if clock.is_empty() {
            return TickReport { events };
        }
        events.extend(clock.iter().cloned());

        let systems = &mut self.systems;

        systems.spawning.handle(
            &clock,
            query::time(&self.world),
            query::spawn_schedule(&self.world),
            &mut systems.commands,
        );
        flush(&mut self.world, &mut systems.commands, &mut events);

        let mobs = query::mob_view(&self.world);
        systems.movement.handle(
            &clock,
            &mobs,
            query::grid(&self.world).path(),
            &mut systems.commands,
        );
        flush(&mut self.world, &mut systems.commands, &mut events);

        let towers = query::tower_view(&self.world);
        let mobs = query::mob_view(&self.world);
        systems.targeting.handle(&towers, &mobs, &mut systems.targets);
        systems.combat.handle(
            query::time(&self.world),
            query::wave_progress(&self.world),
            &towers,
            &systems.targets,
            &mut systems.commands,
        );
        flush(&mut self.world, &mut systems.commands, &mut events);

        let projectiles = query::projectile_view(&self.world);
        let mobs = query::mob_view(&self.world);
        systems
            .projectiles
            .handle(&clock, &projectiles, &mobs, &mut systems.commands);
        flush(&mut self.world, &mut systems.commands, &mut events);

        if query::lives(&self.world) == 0 {
            world::apply(&mut self.world, Command::EndGame, &mut events);
        } else if query::wave_cleared(&self.world) {
            self.progress_waves(&mut events);
        }

        trace!(
            now = query::time(&self.world),
            events = events.len(),
            "tick resolved"
        );
        TickReport { events }
    }

    fn progress_waves(&mut self, events: &mut Vec<Event>) {
        let next = query::wave_index(&self.world).saturating_add(1);
        let start = query::time(&self.world) + self.config.wave_grace_delay;
        let upcoming =
            query::wave_definition(&self.world, next).map(|wave| schedule(&wave.entries, start));

        let command = match upcoming {
            Some(schedule) => {
                debug!(wave = next, start, "advancing to next wave");
                Command::AdvanceWave { schedule }
            }
            None => Command::CompleteWaves,
        };
        world::apply(&mut self.world, command, events);
    }

    fn dispatch(&mut self, command: Command) -> &[Event] {
        let first = self.pending.len();
        world::apply(&mut self.world, command, &mut self.pending);
        &self.pending[first..]
    }

    /// Starts spawning the current wave, anchored at the current time.
    ///
    /// Returns `false` whenever [`Game::can_start_wave`] does.
    pub fn start_wave(&mut self) -> bool {
        let now = query::time(&self.world);
        let wave = query::wave_index(&self.world);
        let spawns = query::wave_definition(&self.world, wave)
            .map(|definition| schedule(&definition.entries, now))
            .unwrap_or_default();

        self.dispatch(Command::StartWave { schedule: spawns })
            .iter()
            .any(|event| matches!(event, Event::WaveStarted { .. }))
    }

    /// Builds a tier one `kind` tower on `tile`, charging its cost.
    pub fn add_tower(&mut self, tile: TileCoord, kind: TowerKind) -> bool {
        self.dispatch(Command::PlaceTower { kind, tile })
            .iter()
            .any(|event| matches!(event, Event::TowerPlaced { .. }))
    }

    /// Raises `tower` to its next tier, charging the upgrade price.
    pub fn upgrade_tower(&mut self, tower: TowerId) -> bool {
        self.dispatch(Command::UpgradeTower { tower })
            .iter()
            .any(|event| matches!(event, Event::TowerUpgraded { .. }))
    }

    /// Sets the time-scale multiplier hosts apply to each tick.
    ///
    /// Rejects non-finite and non-positive multipliers.
    pub fn set_speed_multiplier(&mut self, multiplier: f64) -> bool {
        self.dispatch(Command::SetSpeedMultiplier { multiplier })
            .iter()
            .any(|event| matches!(event, Event::SpeedMultiplierChanged { .. }))
    }

    /// Switches between normal and double speed, returning the new multiplier.
    pub fn toggle_speed(&mut self) -> f64 {
        let next = if (self.speed_multiplier() - 1.0).abs() < f64::EPSILON {
            2.0
        } else {
            1.0
        };
        let _ = self.set_speed_multiplier(next);
        self.speed_multiplier()
    }

    /// Replaces the session with a fresh one on the same grid and config.
    pub fn restart(&mut self) {
        debug!("game restarted");
        self.world = World::new(Arc::clone(&self.grid), self.config.world_setup());
        self.systems = Systems::default();
        self.pending.clear();
    }

    /// Reports whether `tile` is in bounds, buildable and free.
    #[must_use]
    pub fn can_build_at(&self, tile: TileCoord) -> bool {
        query::can_build_at(&self.world, tile)
    }

    /// Reports whether [`Game::start_wave`] would succeed.
    #[must_use]
    pub fn can_start_wave(&self) -> bool {
        query::wave_start_error(&self.world).is_none()
    }

    /// Reports whether a wave is spawning or mobs are alive.
    #[must_use]
    pub fn is_wave_active(&self) -> bool {
        query::is_wave_active(&self.world)
    }

    /// Tower standing on `tile`, if any.
    #[must_use]
    pub fn tower_at(&self, tile: TileCoord) -> Option<TowerSnapshot> {
        query::tower_at(&self.world, tile)
    }

    /// Upgrade feasibility of `tower`, or `None` when it does not exist.
    #[must_use]
    pub fn upgrade_quote(&self, tower: TowerId) -> Option<UpgradeQuote> {
        let snapshot = query::tower(&self.world, tower)?;
        Some(UpgradeQuote {
            affordable: query::upgrade_error(&self.world, tower).is_none(),
            cost: snapshot.kind.upgrade_cost(snapshot.tier),
        })
    }

    /// Current result of the session.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        match query::wave_progress(&self.world) {
            WaveProgress::GameOver => Outcome::Lost,
            WaveProgress::Finished => Outcome::Won,
            WaveProgress::NotStarted | WaveProgress::InProgress => Outcome::InProgress,
        }
    }

    /// Counter bumped by every state change; hosts compare it to detect updates.
    #[must_use]
    pub fn revision(&self) -> u64 {
        query::revision(&self.world)
    }

    /// Grid the session plays on.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read-only access to the underlying world for [`query`] functions.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Simulation time in seconds.
    #[must_use]
    pub fn time(&self) -> f64 {
        query::time(&self.world)
    }

    /// Money available for building and upgrading.
    #[must_use]
    pub fn money(&self) -> u32 {
        query::money(&self.world)
    }

    /// Lives left.
    #[must_use]
    pub fn lives(&self) -> u32 {
        query::lives(&self.world)
    }

    /// Zero-based index of the current wave.
    #[must_use]
    pub fn wave_index(&self) -> u32 {
        query::wave_index(&self.world)
    }

    /// Lifecycle stage of the wave table.
    #[must_use]
    pub fn wave_progress(&self) -> WaveProgress {
        query::wave_progress(&self.world)
    }

    /// Time-scale multiplier hosts apply to each tick.
    #[must_use]
    pub fn speed_multiplier(&self) -> f64 {
        query::speed_multiplier(&self.world)
    }

    /// Snapshot of the living mobs.
    #[must_use]
    pub fn mobs(&self) -> MobView {
        query::mob_view(&self.world)
    }

    /// Snapshot of the towers.
    #[must_use]
    pub fn towers(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Snapshot of the projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> ProjectileView {
        query::projectile_view(&self.world)
    }
}

fn flush(world: &mut World, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
    for command in commands.drain(..) {
        world::apply(world, command, events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_defence_core::{MobKind, WaveDefinition, WaveEntry, TICK_DT};

    fn straight_game(config: GameConfig) -> Game {
        let grid = Arc::new(Grid::from_rows(&[
            "..........",
            "PPPPPPPPPP",
            "..........",
        ]));
        init_game(grid, config)
    }

    fn one_mob_waves(count: usize) -> Vec<WaveDefinition> {
        vec![
            WaveDefinition {
                entries: vec![WaveEntry {
                    delay: 0.0,
                    kind: MobKind::Fast,
                    count: 1,
                    spacing: 0.0,
                }],
            };
            count
        ]
    }

    fn run_until_idle(game: &mut Game, limit: usize) -> Vec<Event> {
        let mut log = Vec::new();
        for _ in 0..limit {
            log.extend(game.advance_tick(TICK_DT).events);
            if !game.is_wave_active() {
                break;
            }
        }
        log
    }

    #[test]
    fn host_operation_events_lead_the_next_report() {
        let mut game = straight_game(GameConfig::default());
        assert!(game.add_tower(TileCoord::new(2, 0), TowerKind::Arrow));
        assert!(!game.add_tower(TileCoord::new(2, 1), TowerKind::Arrow));

        let report = game.advance_tick(TICK_DT);

        assert!(matches!(
            report.events.as_slice(),
            [
                Event::TowerPlaced { .. },
                Event::TowerPlacementRejected { .. },
                Event::TimeAdvanced { .. }
            ]
        ));
    }

    #[test]
    fn invalid_tick_delta_changes_nothing() {
        let mut game = straight_game(GameConfig::default());
        let before = game.revision();

        let report = game.advance_tick(f64::NAN);

        assert!(report.events.is_empty());
        assert_eq!(game.revision(), before);
        assert_eq!(game.time(), 0.0);
    }

    #[test]
    fn cleared_waves_advance_after_the_grace_delay() {
        let mut game = straight_game(GameConfig {
            waves: one_mob_waves(2),
            ..GameConfig::default()
        });
        assert!(game.start_wave());

        let mut advanced = None;
        for _ in 0..600 {
            let report = game.advance_tick(TICK_DT);
            advanced = report.events.iter().find_map(|event| match event {
                Event::WaveStarted {
                    wave: 1,
                    first_spawn_at,
                    ..
                } => Some(*first_spawn_at),
                _ => None,
            });
            if advanced.is_some() {
                break;
            }
        }

        let first_spawn_at = advanced.expect("second wave scheduled");
        assert!((first_spawn_at - (game.time() + 0.5)).abs() < 1e-9);
        assert_eq!(game.wave_index(), 1);
        assert!(game.is_wave_active());
        assert!(game.mobs().is_empty());
    }

    #[test]
    fn final_wave_cleared_wins_and_blocks_restarting_waves() {
        let mut game = straight_game(GameConfig {
            waves: one_mob_waves(1),
            ..GameConfig::default()
        });
        assert!(game.start_wave());

        let log = run_until_idle(&mut game, 600);

        assert!(log
            .iter()
            .any(|event| matches!(event, Event::WavesCompleted { lives: 19 })));
        assert_eq!(game.outcome(), Outcome::Won);
        assert!(!game.can_start_wave());
        assert!(!game.start_wave());
    }

    #[test]
    fn upgrade_quote_tracks_money_and_tiers() {
        let mut game = straight_game(GameConfig {
            starting_money: 60 + 50 + 90,
            ..GameConfig::default()
        });
        assert!(game.add_tower(TileCoord::new(0, 0), TowerKind::Arrow));
        let tower = game
            .tower_at(TileCoord::new(0, 0))
            .expect("tower placed")
            .id;

        assert_eq!(
            game.upgrade_quote(tower),
            Some(UpgradeQuote {
                affordable: true,
                cost: Some(50),
            })
        );
        assert!(game.upgrade_tower(tower));
        assert!(game.upgrade_tower(tower));
        assert_eq!(game.money(), 0);
        assert_eq!(
            game.upgrade_quote(tower),
            Some(UpgradeQuote {
                affordable: false,
                cost: None,
            })
        );
        assert_eq!(game.upgrade_quote(TowerId::new(9)), None);
    }

    #[test]
    fn toggle_speed_flips_between_one_and_two() {
        let mut game = straight_game(GameConfig::default());

        assert_eq!(game.toggle_speed(), 2.0);
        assert_eq!(game.toggle_speed(), 1.0);
        assert!(!game.set_speed_multiplier(0.0));
        assert_eq!(game.speed_multiplier(), 1.0);
    }

    #[test]
    fn restart_restores_a_fresh_session() {
        let mut game = straight_game(GameConfig::default());
        assert!(game.add_tower(TileCoord::new(4, 2), TowerKind::Frost));
        assert!(game.start_wave());
        let _ = game.advance_tick(TICK_DT);

        game.restart();

        assert_eq!(game.money(), 150);
        assert_eq!(game.time(), 0.0);
        assert!(game.tower_at(TileCoord::new(4, 2)).is_none());
        assert!(!game.is_wave_active());
        assert_eq!(game.advance_tick(TICK_DT).events.len(), 1);
    }
}
