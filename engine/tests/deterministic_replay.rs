use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::Arc,
};

use tile_defence_core::{Event, TileCoord, TowerKind};
use tile_defence_engine::{init_game, load_grid, FrameClock, Game, GameConfig};

#[test]
fn replaying_the_same_session_yields_identical_state() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second, "replay diverged between runs");
    assert!(first.kills > 0, "towers never scored a kill");
    assert!(first.waves_started > 1, "waves never auto-advanced");
}

#[derive(Debug, PartialEq, Eq)]
struct ReplayOutcome {
    kills: usize,
    waves_started: usize,
    money: u32,
    lives: u32,
    fingerprint: u64,
}

fn replay() -> ReplayOutcome {
    let mut game = init_game(Arc::new(load_grid()), GameConfig::default());
    let mut clock = FrameClock::new();
    assert!(game.add_tower(TileCoord::new(3, 3), TowerKind::Arrow));
    assert!(game.add_tower(TileCoord::new(5, 6), TowerKind::Frost));
    assert!(game.start_wave());

    let mut hasher = DefaultHasher::new();
    let mut kills = 0;
    let mut waves_started = 0;
    let frames = [0.016, 0.020, 0.033, 0.008, 0.3];

    for frame in 0..2_400 {
        if frame == 600 {
            let _ = game.toggle_speed();
        }
        if frame % 400 == 0 {
            let _ = game.add_tower(TileCoord::new(8, 4), TowerKind::Cannon);
        }

        let report = clock.advance(&mut game, frames[frame % frames.len()]);
        report.ticks.hash(&mut hasher);
        for event in &report.events {
            format!("{event:?}").hash(&mut hasher);
            match event {
                Event::MobKilled { .. } => kills += 1,
                Event::WaveStarted { .. } => waves_started += 1,
                _ => {}
            }
        }
    }

    fingerprint_state(&game, &mut hasher);
    ReplayOutcome {
        kills,
        waves_started,
        money: game.money(),
        lives: game.lives(),
        fingerprint: hasher.finish(),
    }
}

fn fingerprint_state(game: &Game, hasher: &mut DefaultHasher) {
    game.time().to_bits().hash(hasher);
    game.revision().hash(hasher);
    for mob in game.mobs().iter() {
        mob.id.hash(hasher);
        mob.hp.hash(hasher);
        mob.position.x.to_bits().hash(hasher);
        mob.position.y.to_bits().hash(hasher);
    }
    for tower in game.towers().iter() {
        tower.id.hash(hasher);
        tower.last_fired_at.to_bits().hash(hasher);
    }
    for projectile in game.projectiles().iter() {
        projectile.id.hash(hasher);
        projectile.position.x.to_bits().hash(hasher);
        projectile.position.y.to_bits().hash(hasher);
    }
}
