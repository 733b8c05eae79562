#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tile Defence.

mod grid;
mod mobs;
mod pathfinding;
mod projectiles;
mod towers;

use std::sync::Arc;

pub use grid::{load_grid, Grid, DEFAULT_MAP};

use mobs::MobRegistry;
use projectiles::{Launch, ProjectileRegistry, ProjectileState};
use tile_defence_core::{
    standard_waves, Command, Event, MobId, MobKind, PlacementError, ProjectileId,
    ScheduledSpawn, TileClass, TileCoord, TilePoint, Tier, TowerId, TowerKind, UpgradeError,
    WaveDefinition, WaveProgress, WaveStartError, KILL_BOUNTY, STARTING_LIVES, STARTING_MONEY,
};
use towers::TowerRegistry;
use tracing::{debug, info, trace};

/// Parameters a fresh world starts from.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSetup {
    /// Money available before the first tower is built.
    pub starting_money: u32,
    /// Lives available before the first mob escapes.
    pub starting_lives: u32,
    /// Wave table consumed in order.
    pub waves: Vec<WaveDefinition>,
}

impl Default for WorldSetup {
    fn default() -> Self {
        Self {
            starting_money: STARTING_MONEY,
            starting_lives: STARTING_LIVES,
            waves: standard_waves(),
        }
    }
}

#[derive(Clone, Debug)]
struct SpawnState {
    cursor: usize,
    schedule: Vec<ScheduledSpawn>,
}

/// Represents the authoritative Tile Defence world state.
#[derive(Debug)]
pub struct World {
    grid: Arc<Grid>,
    waves: Vec<WaveDefinition>,
    time: f64,
    money: u32,
    lives: u32,
    wave_index: u32,
    progress: WaveProgress,
    spawning: Option<SpawnState>,
    mobs: MobRegistry,
    towers: TowerRegistry,
    projectiles: ProjectileRegistry,
    speed_multiplier: f64,
    revision: u64,
}

impl World {
    /// Creates a world on the shared grid with no wave started.
    #[must_use]
    pub fn new(grid: Arc<Grid>, setup: WorldSetup) -> Self {
        Self {
            grid,
            waves: setup.waves,
            time: 0.0,
            money: setup.starting_money,
            lives: setup.starting_lives,
            wave_index: 0,
            progress: WaveProgress::NotStarted,
            spawning: None,
            mobs: MobRegistry::new(),
            towers: TowerRegistry::new(),
            projectiles: ProjectileRegistry::new(),
            speed_multiplier: 1.0,
            revision: 0,
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn is_wave_active(&self) -> bool {
        self.spawning.is_some() || !self.mobs.is_empty()
    }

    fn is_wave_cleared(&self) -> bool {
        self.progress == WaveProgress::InProgress && !self.is_wave_active()
    }

    fn wave_start_error(&self) -> Option<WaveStartError> {
        if self.lives == 0 || self.progress == WaveProgress::GameOver {
            return Some(WaveStartError::GameOver);
        }
        if self.progress == WaveProgress::Finished {
            return Some(WaveStartError::NoWaveDefinition);
        }
        if self.is_wave_active() {
            return Some(WaveStartError::WaveActive);
        }
        if self.wave_definition(self.wave_index).is_none() {
            return Some(WaveStartError::NoWaveDefinition);
        }
        None
    }

    fn wave_definition(&self, index: u32) -> Option<&WaveDefinition> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.waves.get(index))
    }

    fn site_error(&self, tile: TileCoord) -> Option<PlacementError> {
        match self.grid.tile(tile) {
            None => Some(PlacementError::OutOfBounds),
            Some(TileClass::Blocked | TileClass::Path) => Some(PlacementError::NotBuildable),
            Some(TileClass::Buildable) if self.towers.occupant(tile).is_some() => {
                Some(PlacementError::Occupied)
            }
            Some(TileClass::Buildable) => None,
        }
    }

    fn placement_error(&self, kind: TowerKind, tile: TileCoord) -> Option<PlacementError> {
        self.site_error(tile).or_else(|| {
            (self.money < kind.build_cost()).then_some(PlacementError::InsufficientFunds)
        })
    }

    fn upgrade_terms(&self, tower: TowerId) -> Result<(Tier, u32), UpgradeError> {
        let state = self.towers.get(tower).ok_or(UpgradeError::MissingTower)?;
        let next = state.tier.next().ok_or(UpgradeError::MaxTier)?;
        let cost = state
            .kind
            .upgrade_cost(state.tier)
            .ok_or(UpgradeError::MaxTier)?;
        if self.money < cost {
            return Err(UpgradeError::InsufficientFunds);
        }
        Ok((next, cost))
    }

    fn advance_time(&mut self, dt: f64, out_events: &mut Vec<Event>) {
        if !dt.is_finite() || dt < 0.0 {
            debug!(dt, "ignored invalid tick delta");
            return;
        }
        self.time += dt;
        self.touch();
        trace!(
            now = self.time,
            mobs = self.mobs.iter().count(),
            projectiles = self.projectiles.iter().count(),
            "world ticked"
        );
        out_events.push(Event::TimeAdvanced { dt, now: self.time });
    }

    fn start_wave(&mut self, schedule: Vec<ScheduledSpawn>, out_events: &mut Vec<Event>) {
        if let Some(reason) = self.wave_start_error() {
            debug!(wave = self.wave_index, %reason, "wave start rejected");
            out_events.push(Event::WaveStartRejected { reason });
            return;
        }
        self.install_schedule(schedule, out_events);
    }

    fn advance_wave(&mut self, schedule: Vec<ScheduledSpawn>, out_events: &mut Vec<Event>) {
        let next = self.wave_index.saturating_add(1);
        if !self.is_wave_cleared() || self.wave_definition(next).is_none() {
            return;
        }
        self.wave_index = next;
        self.install_schedule(schedule, out_events);
    }

    fn complete_waves(&mut self, out_events: &mut Vec<Event>) {
        let next = self.wave_index.saturating_add(1);
        if !self.is_wave_cleared() || self.wave_definition(next).is_some() {
            return;
        }
        self.progress = WaveProgress::Finished;
        self.touch();
        info!(lives = self.lives, "final wave cleared");
        out_events.push(Event::WavesCompleted { lives: self.lives });
    }

    fn install_schedule(&mut self, schedule: Vec<ScheduledSpawn>, out_events: &mut Vec<Event>) {
        let wave = self.wave_index;
        let spawn_count = schedule.len();
        let first_spawn_at = schedule.first().map_or(self.time, |spawn| spawn.time);

        self.progress = WaveProgress::InProgress;
        self.touch();
        debug!(wave, spawn_count, first_spawn_at, "wave started");
        out_events.push(Event::WaveStarted {
            wave,
            spawn_count,
            first_spawn_at,
        });

        if schedule.is_empty() {
            self.spawning = None;
            out_events.push(Event::SpawnScheduleDrained { wave });
        } else {
            self.spawning = Some(SpawnState {
                cursor: 0,
                schedule,
            });
        }
    }

    fn spawn_mob(&mut self, kind: MobKind, out_events: &mut Vec<Event>) {
        let now = self.time;
        let Some(spawning) = self.spawning.as_mut() else {
            return;
        };
        let due = spawning
            .schedule
            .get(spawning.cursor)
            .is_some_and(|spawn| spawn.kind == kind && spawn.time <= now);
        if !due {
            return;
        }

        spawning.cursor += 1;
        let drained = spawning.cursor >= spawning.schedule.len();
        if drained {
            self.spawning = None;
        }

        let position = self.grid.start();
        let mob = self.mobs.spawn(kind, position);
        self.touch();
        out_events.push(Event::MobSpawned {
            mob,
            kind,
            position,
        });

        if drained {
            debug!(wave = self.wave_index, "spawn schedule drained");
            out_events.push(Event::SpawnScheduleDrained {
                wave: self.wave_index,
            });
        }
    }

    fn move_mob(
        &mut self,
        mob: MobId,
        position: TilePoint,
        waypoint_index: usize,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.mobs.get_mut(mob) else {
            return;
        };
        let from = state.position;
        state.position = position;
        state.waypoint_index = waypoint_index;
        self.touch();
        if from != position {
            out_events.push(Event::MobAdvanced {
                mob,
                from,
                to: position,
            });
        }
    }

    fn exit_mob(&mut self, mob: MobId, out_events: &mut Vec<Event>) {
        if self.mobs.remove(mob).is_none() {
            return;
        }
        self.lives = self.lives.saturating_sub(1);
        self.touch();
        debug!(mob = mob.get(), lives = self.lives, "mob escaped");
        out_events.push(Event::MobEscaped {
            mob,
            lives: self.lives,
        });
    }

    fn fire_projectile(&mut self, tower: TowerId, target: MobId, out_events: &mut Vec<Event>) {
        let Some(state) = self.towers.get(tower) else {
            return;
        };
        let Some(mob) = self.mobs.get(target) else {
            return;
        };

        let origin = state.tile.center();
        let stats = state.kind.stats(state.tier);
        if mob.position.distance(origin) > stats.range {
            return;
        }
        let launch = Launch {
            origin,
            target,
            speed: stats.projectile_speed,
            damage: stats.damage,
            splash: state.kind.splash(state.tier),
            slow: state.kind.slow(state.tier),
        };

        let projectile = self.projectiles.launch(launch);
        if let Some(state) = self.towers.get_mut(tower) {
            state.last_fired_at = self.time;
        }
        self.touch();
        out_events.push(Event::ProjectileFired {
            projectile,
            tower,
            target,
        });
    }

    fn advance_projectile(
        &mut self,
        projectile: ProjectileId,
        position: TilePoint,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.projectiles.get_mut(projectile) else {
            return;
        };
        if self.mobs.get(state.target).is_none() {
            self.discard_projectile(projectile, out_events);
            return;
        }
        state.position = position;
        self.touch();
    }

    fn discard_projectile(&mut self, projectile: ProjectileId, out_events: &mut Vec<Event>) {
        if self.projectiles.remove(projectile).is_some() {
            self.touch();
            out_events.push(Event::ProjectileExpired { projectile });
        }
    }

    fn resolve_impact(&mut self, projectile: ProjectileId, out_events: &mut Vec<Event>) {
        let Some(state) = self.projectiles.remove(projectile) else {
            return;
        };
        self.touch();
        let Some(impact) = self.mobs.get(state.target).map(|mob| mob.position) else {
            out_events.push(Event::ProjectileExpired { projectile });
            return;
        };

        out_events.push(Event::ProjectileImpacted {
            projectile,
            target: state.target,
            position: impact,
        });

        let victims = match state.splash {
            Some(splash) => self.mobs.within(impact, splash.radius),
            None => vec![state.target],
        };
        for mob in victims {
            self.hit_mob(mob, &state, out_events);
        }
    }

    fn hit_mob(&mut self, mob: MobId, projectile: &ProjectileState, out_events: &mut Vec<Event>) {
        let now = self.time;
        let Some(state) = self.mobs.get_mut(mob) else {
            return;
        };

        let damage = state.take_hit(projectile.damage);
        let remaining = state.hp;
        out_events.push(Event::MobDamaged {
            mob,
            damage,
            remaining,
        });

        if let Some(slow) = projectile.slow {
            let until = state.extend_slow(now + slow.duration);
            out_events.push(Event::MobSlowed { mob, until });
        }

        if remaining <= 0 {
            let _ = self.mobs.remove(mob);
            self.money = self.money.saturating_add(KILL_BOUNTY);
            out_events.push(Event::MobKilled {
                mob,
                bounty: KILL_BOUNTY,
            });
        }
    }

    fn end_game(&mut self, out_events: &mut Vec<Event>) {
        if self.lives > 0 || self.progress == WaveProgress::GameOver {
            return;
        }
        self.spawning = None;
        self.mobs.clear();
        self.progress = WaveProgress::GameOver;
        self.touch();
        info!(wave = self.wave_index, "game over");
        out_events.push(Event::GameOver {
            wave: self.wave_index,
        });
    }

    fn place_tower(&mut self, kind: TowerKind, tile: TileCoord, out_events: &mut Vec<Event>) {
        if let Some(reason) = self.placement_error(kind, tile) {
            debug!(?kind, ?tile, %reason, "tower placement rejected");
            out_events.push(Event::TowerPlacementRejected { kind, tile, reason });
            return;
        }

        let cost = kind.build_cost();
        self.money -= cost;
        let tower = self.towers.insert(kind, tile, cost);
        self.touch();
        debug!(tower = tower.get(), ?kind, ?tile, money = self.money, "tower placed");
        out_events.push(Event::TowerPlaced {
            tower,
            kind,
            tile,
            cost,
        });
    }

    fn upgrade_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let (tier, cost) = match self.upgrade_terms(tower) {
            Ok(terms) => terms,
            Err(reason) => {
                debug!(tower = tower.get(), %reason, "tower upgrade rejected");
                out_events.push(Event::TowerUpgradeRejected { tower, reason });
                return;
            }
        };

        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };
        state.tier = tier;
        self.money -= cost;
        self.touch();
        debug!(tower = tower.get(), tier = tier.get(), money = self.money, "tower upgraded");
        out_events.push(Event::TowerUpgraded { tower, tier, cost });
    }

    fn set_speed_multiplier(&mut self, multiplier: f64, out_events: &mut Vec<Event>) {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            debug!(multiplier, "ignored invalid speed multiplier");
            return;
        }
        self.speed_multiplier = multiplier;
        self.touch();
        out_events.push(Event::SpeedMultiplierChanged { multiplier });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.advance_time(dt, out_events),
        Command::StartWave { schedule } => world.start_wave(schedule, out_events),
        Command::AdvanceWave { schedule } => world.advance_wave(schedule, out_events),
        Command::CompleteWaves => world.complete_waves(out_events),
        Command::SpawnMob { kind } => world.spawn_mob(kind, out_events),
        Command::MoveMob {
            mob,
            position,
            waypoint_index,
        } => world.move_mob(mob, position, waypoint_index, out_events),
        Command::ExitMob { mob } => world.exit_mob(mob, out_events),
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::AdvanceProjectile {
            projectile,
            position,
        } => world.advance_projectile(projectile, position, out_events),
        Command::ResolveImpact { projectile } => world.resolve_impact(projectile, out_events),
        Command::DiscardProjectile { projectile } => {
            world.discard_projectile(projectile, out_events);
        }
        Command::EndGame => world.end_game(out_events),
        Command::PlaceTower { kind, tile } => world.place_tower(kind, tile, out_events),
        Command::UpgradeTower { tower } => world.upgrade_tower(tower, out_events),
        Command::SetSpeedMultiplier { multiplier } => {
            world.set_speed_multiplier(multiplier, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Grid, World};
    use tile_defence_core::{
        MobView, PlacementError, ProjectileView, SpawnScheduleView, TileCoord, TowerId, TowerKind,
        TowerSnapshot, TowerView, UpgradeError, WaveDefinition, WaveProgress, WaveStartError,
    };

    /// Provides read-only access to the grid mobs walk across.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Simulation clock in seconds.
    #[must_use]
    pub fn time(world: &World) -> f64 {
        world.time
    }

    /// Money available for construction and upgrades.
    #[must_use]
    pub fn money(world: &World) -> u32 {
        world.money
    }

    /// Lives left before the game ends.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Zero-based index of the current wave.
    #[must_use]
    pub fn wave_index(world: &World) -> u32 {
        world.wave_index
    }

    /// Progress through the wave table.
    #[must_use]
    pub fn wave_progress(world: &World) -> WaveProgress {
        world.progress
    }

    /// Time-scale multiplier requested by the host.
    #[must_use]
    pub fn speed_multiplier(world: &World) -> f64 {
        world.speed_multiplier
    }

    /// Counter bumped by every command that changed the world.
    #[must_use]
    pub fn revision(world: &World) -> u64 {
        world.revision
    }

    /// Captures a read-only view of the mobs on the path.
    #[must_use]
    pub fn mob_view(world: &World) -> MobView {
        MobView::from_snapshots(world.mobs.iter().map(|mob| mob.snapshot()).collect())
    }

    /// Captures a read-only view of the towers on the grid.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Spawn events of the active wave that have not fired yet.
    #[must_use]
    pub fn spawn_schedule(world: &World) -> Option<SpawnScheduleView<'_>> {
        world
            .spawning
            .as_ref()
            .map(|spawning| SpawnScheduleView::new(spawning.cursor, &spawning.schedule))
    }

    /// Reports whether a wave is spawning or any mob is still alive.
    #[must_use]
    pub fn is_wave_active(world: &World) -> bool {
        world.is_wave_active()
    }

    /// Reports whether a started wave was fully spawned and destroyed.
    #[must_use]
    pub fn wave_cleared(world: &World) -> bool {
        world.is_wave_cleared()
    }

    /// Definition of the wave at `index`, if the wave table has one.
    #[must_use]
    pub fn wave_definition(world: &World, index: u32) -> Option<&WaveDefinition> {
        world.wave_definition(index)
    }

    /// Number of waves in the wave table.
    #[must_use]
    pub fn wave_count(world: &World) -> usize {
        world.waves.len()
    }

    /// Snapshot of the tower standing on `tile`, if any.
    #[must_use]
    pub fn tower_at(world: &World, tile: TileCoord) -> Option<TowerSnapshot> {
        world
            .towers
            .occupant(tile)
            .and_then(|tower| self::tower(world, tower))
    }

    /// Snapshot of a single tower.
    #[must_use]
    pub fn tower(world: &World, tower: TowerId) -> Option<TowerSnapshot> {
        world.towers.get(tower).map(|state| state.snapshot())
    }

    /// Reports whether `tile` is in bounds, buildable and free, ignoring cost.
    #[must_use]
    pub fn can_build_at(world: &World, tile: TileCoord) -> bool {
        world.site_error(tile).is_none()
    }

    /// Reason a placement of `kind` on `tile` would be rejected, if any.
    #[must_use]
    pub fn placement_error(world: &World, kind: TowerKind, tile: TileCoord) -> Option<PlacementError> {
        world.placement_error(kind, tile)
    }

    /// Reason an upgrade of `tower` would be rejected, if any.
    #[must_use]
    pub fn upgrade_error(world: &World, tower: TowerId) -> Option<UpgradeError> {
        world.upgrade_terms(tower).err()
    }

    /// Reason a wave start would be rejected, if any.
    #[must_use]
    pub fn wave_start_error(world: &World) -> Option<WaveStartError> {
        world.wave_start_error()
    }
}
