#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tile Defence engine.
//!
//! This crate defines the message surface that connects the host facade, the
//! authoritative world, and pure systems. The host submits [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! changed. Systems consume event streams, query immutable views, and respond
//! exclusively with new command batches.

mod tuning;

pub use tuning::{
    standard_waves, MobStats, ScheduledSpawn, Slow, Splash, TowerStats, WaveDefinition, WaveEntry,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Continuous point expressed in tile space.
///
/// Integer coordinates lie on tile corners, so the centre of tile `(x, y)` is
/// `(x + 0.5, y + 0.5)`.
pub type TilePoint = glam::DVec2;

/// Duration of a single logical simulation step in seconds.
pub const TICK_DT: f64 = 1.0 / 60.0;

/// Money available when a new game begins.
pub const STARTING_MONEY: u32 = 150;

/// Lives available when a new game begins.
pub const STARTING_LIVES: u32 = 20;

/// Money awarded for every mob destroyed by tower fire.
pub const KILL_BOUNTY: u32 = 5;

/// Seconds between clearing a wave and the first spawn of the next one.
pub const WAVE_GRACE_DELAY: f64 = 0.5;

/// Distance to the path end below which a mob counts as escaped.
pub const EXIT_PROXIMITY: f64 = 0.3;

/// Distance below which a mob counts as standing on its next waypoint.
pub const WAYPOINT_EPSILON: f64 = 1e-4;

/// Distance below which a projectile counts as touching its target.
pub const IMPACT_RADIUS: f64 = 0.05;

/// Speed multiplier applied to a mob while a slow effect is active.
pub const SLOW_FACTOR: f64 = 0.5;

/// Value stored in `last_fired_at` for towers that never fired.
pub const NEVER_FIRED: f64 = -999.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Seconds of simulated time that elapsed since the previous tick.
        dt: f64,
    },
    /// Requests that the current wave begins spawning.
    StartWave {
        /// Absolute spawn events derived from the current wave definition.
        schedule: Vec<ScheduledSpawn>,
    },
    /// Moves on to the next wave after the current one was cleared.
    AdvanceWave {
        /// Absolute spawn events derived from the next wave definition.
        schedule: Vec<ScheduledSpawn>,
    },
    /// Marks the wave table as exhausted after the final wave was cleared.
    CompleteWaves,
    /// Spawns the next scheduled mob at the start of the path.
    SpawnMob {
        /// Kind of mob to create.
        kind: MobKind,
    },
    /// Relocates a mob along the path.
    MoveMob {
        /// Identifier of the mob being moved.
        mob: MobId,
        /// Position reached by the mob during the tick.
        position: TilePoint,
        /// Index of the path point the mob now heads toward.
        waypoint_index: usize,
    },
    /// Removes a mob that reached the end of the path, costing one life.
    ExitMob {
        /// Identifier of the escaping mob.
        mob: MobId,
    },
    /// Requests that a tower launches a projectile at a mob.
    ///
    /// The world checks that the target is alive and in range; cooldown
    /// timing is left to the issuer.
    FireProjectile {
        /// Identifier of the firing tower.
        tower: TowerId,
        /// Identifier of the mob being targeted.
        target: MobId,
    },
    /// Moves a projectile toward its target.
    AdvanceProjectile {
        /// Identifier of the projectile in flight.
        projectile: ProjectileId,
        /// Position reached by the projectile during the tick.
        position: TilePoint,
    },
    /// Resolves the impact of a projectile on its target.
    ResolveImpact {
        /// Identifier of the projectile that reached its target.
        projectile: ProjectileId,
    },
    /// Removes a projectile whose target no longer exists.
    DiscardProjectile {
        /// Identifier of the orphaned projectile.
        projectile: ProjectileId,
    },
    /// Ends the game after the last life was lost.
    EndGame,
    /// Requests construction of a tier one tower on a tile.
    PlaceTower {
        /// Kind of tower to construct.
        kind: TowerKind,
        /// Tile that will hold the tower.
        tile: TileCoord,
    },
    /// Requests that a tower advances to its next tier.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Updates the time-scale multiplier applied by the host.
    SetSpeedMultiplier {
        /// Number of simulated seconds per real second.
        multiplier: f64,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Seconds of simulated time that elapsed in the tick.
        dt: f64,
        /// Simulation time after the tick.
        now: f64,
    },
    /// Announces that a wave began spawning.
    WaveStarted {
        /// Zero-based index of the wave.
        wave: u32,
        /// Number of mobs the wave will spawn.
        spawn_count: usize,
        /// Simulation time of the first spawn.
        first_spawn_at: f64,
    },
    /// Reports that a wave start request was refused.
    WaveStartRejected {
        /// Specific reason the request failed.
        reason: WaveStartError,
    },
    /// Confirms that a mob entered the path.
    MobSpawned {
        /// Identifier assigned to the new mob.
        mob: MobId,
        /// Kind of the new mob.
        kind: MobKind,
        /// Position the mob occupies after spawning.
        position: TilePoint,
    },
    /// Announces that every spawn event of the active wave fired.
    SpawnScheduleDrained {
        /// Zero-based index of the wave.
        wave: u32,
    },
    /// Confirms that a mob moved along the path.
    MobAdvanced {
        /// Identifier of the mob that moved.
        mob: MobId,
        /// Position before the move.
        from: TilePoint,
        /// Position after the move.
        to: TilePoint,
    },
    /// Reports that a mob reached the end of the path.
    MobEscaped {
        /// Identifier of the escaped mob.
        mob: MobId,
        /// Lives left after the escape.
        lives: u32,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Identifier of the firing tower.
        tower: TowerId,
        /// Identifier of the targeted mob.
        target: MobId,
    },
    /// Reports that a projectile struck its target.
    ProjectileImpacted {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Identifier of the struck mob.
        target: MobId,
        /// Point of impact.
        position: TilePoint,
    },
    /// Reports that a projectile vanished because its target no longer exists.
    ProjectileExpired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
    },
    /// Reports damage applied to a mob.
    MobDamaged {
        /// Identifier of the damaged mob.
        mob: MobId,
        /// Damage applied after armor.
        damage: u32,
        /// Health left after the hit.
        remaining: i32,
    },
    /// Reports that a mob's slow effect was set or extended.
    MobSlowed {
        /// Identifier of the slowed mob.
        mob: MobId,
        /// Simulation time at which the slow expires.
        until: f64,
    },
    /// Reports that a mob was destroyed by tower fire.
    MobKilled {
        /// Identifier of the destroyed mob.
        mob: MobId,
        /// Money awarded for the kill.
        bounty: u32,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Kind of tower that was placed.
        kind: TowerKind,
        /// Tile the tower occupies.
        tile: TileCoord,
        /// Money spent on construction.
        cost: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Kind of tower requested.
        kind: TowerKind,
        /// Tile provided in the request.
        tile: TileCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower advanced a tier.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Tier reached by the tower.
        tier: Tier,
        /// Money spent on the upgrade.
        cost: u32,
    },
    /// Reports that an upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier of the tower targeted by the request.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that the host changed the time-scale multiplier.
    SpeedMultiplierChanged {
        /// Multiplier now in effect.
        multiplier: f64,
    },
    /// Announces that the final wave was cleared.
    WavesCompleted {
        /// Lives left at the end of the game.
        lives: u32,
    },
    /// Announces that the last life was lost.
    GameOver {
        /// Index of the wave in progress when the game ended.
        wave: u32,
    },
}

/// Unique identifier assigned to a mob.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MobId(u32);

impl MobId {
    /// Creates a new mob identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Centre of the tile in tile space.
    #[must_use]
    pub fn center(self) -> TilePoint {
        TilePoint::new(f64::from(self.column) + 0.5, f64::from(self.row) + 0.5)
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Classification assigned to every tile of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileClass {
    /// Neither walkable nor buildable.
    Blocked,
    /// Free ground that accepts towers.
    Buildable,
    /// Part of the route followed by mobs.
    Path,
}

/// Types of mobs that traverse the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobKind {
    /// Baseline mob with light armor.
    Normal,
    /// Quick, fragile mob.
    Fast,
    /// Slow, heavily armored mob.
    Tank,
    /// Airborne mob that still follows the path.
    Flying,
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Fast single-target tower.
    Arrow,
    /// Slow tower whose shells damage everything around the impact point.
    Cannon,
    /// Weak tower whose bolts slow their target.
    Frost,
}

/// Upgrade level of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// Level assigned on construction.
    One,
    /// Level reached by the first upgrade.
    Two,
    /// Maximum level.
    Three,
}

impl Tier {
    /// Numeric level of the tier, starting at one.
    #[must_use]
    pub const fn get(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Tier reached by the next upgrade, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::One => Some(Self::Two),
            Self::Two => Some(Self::Three),
            Self::Three => None,
        }
    }
}

/// Progress through the wave table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveProgress {
    /// No wave has been started yet.
    NotStarted,
    /// At least one wave was started and waves remain to be cleared.
    InProgress,
    /// The final wave was cleared.
    Finished,
    /// The last life was lost.
    GameOver,
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested tile lies outside the grid.
    #[error("tile lies outside the grid")]
    OutOfBounds,
    /// The requested tile is blocked or part of the path.
    #[error("tile does not accept towers")]
    NotBuildable,
    /// Another tower already stands on the tile.
    #[error("tile already holds a tower")]
    Occupied,
    /// The player cannot pay for the tower.
    #[error("not enough money")]
    InsufficientFunds,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
    /// The tower already reached the final tier.
    #[error("tower is already at the final tier")]
    MaxTier,
    /// The player cannot pay for the upgrade.
    #[error("not enough money")]
    InsufficientFunds,
}

/// Reasons a wave start request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum WaveStartError {
    /// Mobs are still spawning or alive.
    #[error("a wave is already active")]
    WaveActive,
    /// No lives remain.
    #[error("the game is over")]
    GameOver,
    /// The wave table has no entry for the requested wave.
    #[error("no wave left to start")]
    NoWaveDefinition,
}

/// Immutable representation of a single mob's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MobSnapshot {
    /// Unique identifier assigned to the mob.
    pub id: MobId,
    /// Kind of the mob.
    pub kind: MobKind,
    /// Current position in tile space.
    pub position: TilePoint,
    /// Remaining health.
    pub hp: i32,
    /// Base movement speed in tiles per second.
    pub speed: f64,
    /// Flat damage reduction.
    pub armor: u32,
    /// Index of the path point the mob heads toward.
    pub waypoint_index: usize,
    /// Simulation time at which an active slow expires.
    pub slow_until: Option<f64>,
}

impl MobSnapshot {
    /// Movement speed after status effects at simulation time `now`.
    #[must_use]
    pub fn effective_speed(&self, now: f64) -> f64 {
        match self.slow_until {
            Some(until) if now < until => self.speed * SLOW_FACTOR,
            _ => self.speed,
        }
    }
}

/// Read-only snapshot describing all mobs on the path.
#[derive(Clone, Debug, Default)]
pub struct MobView {
    snapshots: Vec<MobSnapshot>,
}

impl MobView {
    /// Creates a new mob view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MobSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured mob snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &MobSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single mob.
    #[must_use]
    pub fn get(&self, mob: MobId) -> Option<&MobSnapshot> {
        self.snapshots
            .binary_search_by_key(&mob, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of mobs captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no mobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MobSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Tile occupied by the tower.
    pub tile: TileCoord,
    /// Current upgrade level.
    pub tier: Tier,
    /// Combat stats derived from kind and tier.
    pub stats: TowerStats,
    /// Simulation time of the last shot.
    pub last_fired_at: f64,
    /// Money spent on construction.
    pub cost: u32,
}

impl TowerSnapshot {
    /// Seconds that must still elapse before the tower may fire at `now`.
    #[must_use]
    pub fn ready_in(&self, now: f64) -> f64 {
        (self.stats.cooldown() - (now - self.last_fired_at)).max(0.0)
    }

    /// Reports whether the tower's cooldown has elapsed at `now`.
    #[must_use]
    pub fn is_ready(&self, now: f64) -> bool {
        self.ready_in(now) <= 0.0
    }
}

/// Read-only snapshot describing all towers placed on the grid.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile by the world.
    pub id: ProjectileId,
    /// Current position in tile space.
    pub position: TilePoint,
    /// Mob the projectile homes toward.
    pub target: MobId,
    /// Flight speed in tiles per second.
    pub speed: f64,
    /// Raw damage before armor.
    pub damage: u32,
    /// Area damage carried by cannon shells.
    pub splash: Option<Splash>,
    /// Slow effect carried by frost bolts.
    pub slow: Option<Slow>,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Pending spawn events of the active wave.
#[derive(Clone, Copy, Debug)]
pub struct SpawnScheduleView<'a> {
    cursor: usize,
    schedule: &'a [ScheduledSpawn],
}

impl<'a> SpawnScheduleView<'a> {
    /// Captures a view over a schedule and the index of its next event.
    #[must_use]
    pub fn new(cursor: usize, schedule: &'a [ScheduledSpawn]) -> Self {
        Self { cursor, schedule }
    }

    /// Index of the next event that has not fired yet.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Events that have not fired yet, in firing order.
    #[must_use]
    pub fn pending(&self) -> &'a [ScheduledSpawn] {
        self.schedule.get(self.cursor..).unwrap_or(&[])
    }

    /// Total number of events in the schedule.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schedule.len()
    }

    /// Reports whether the schedule holds no events at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty()
    }
}

/// Target assignment computed for a tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower selecting the target.
    pub tower: TowerId,
    /// Mob selected by the tower.
    pub mob: MobId,
    /// Distance between tower centre and mob.
    pub distance: f64,
}
