use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::Arc,
};

use tile_defence_core::{
    Command, MobId, MobKind, ScheduledSpawn, TileCoord, TilePoint, TowerId, TowerKind,
    TowerTarget,
};
use tile_defence_system_tower_targeting::TowerTargeting;
use tile_defence_world::{self as world, query, Grid, World, WorldSetup};

#[test]
fn deterministic_replay_handles_equidistant_mobs_and_departures() {
    let script = scripted_commands();
    let script_len = script.len();
    let first = replay(script.clone());
    let second = replay(script);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.assignments.len(), script_len);

    let targeted: Vec<Option<u32>> = first
        .assignments
        .iter()
        .map(|snapshot| snapshot.targets.first().map(|target| target.mob))
        .collect();
    assert_eq!(
        targeted,
        vec![None, None, None, None, Some(0), Some(0), Some(1), None],
    );
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let grid = Arc::new(Grid::from_rows(&[
        "..........",
        "PPPPPPPPPP",
        "..........",
    ]));
    let mut world = World::new(grid, WorldSetup::default());
    let mut targeting = TowerTargeting::new();
    let mut current_targets = Vec::new();
    let mut assignments = Vec::new();
    let mut events = Vec::new();

    for command in commands {
        let mut generated = Vec::new();
        world::apply(&mut world, command, &mut generated);
        events.extend(generated.iter().map(|event| format!("{event:?}")));

        let towers = query::tower_view(&world);
        let mobs = query::mob_view(&world);
        targeting.handle(&towers, &mobs, &mut current_targets);

        assignments.push(TargetSnapshot::from(&current_targets));
    }

    ReplayOutcome {
        events,
        assignments,
    }
}

fn scripted_commands() -> Vec<Command> {
    let spawn = ScheduledSpawn {
        time: 0.0,
        kind: MobKind::Normal,
    };

    vec![
        Command::PlaceTower {
            kind: TowerKind::Arrow,
            tile: TileCoord::new(4, 0),
        },
        Command::StartWave {
            schedule: vec![spawn, spawn],
        },
        Command::SpawnMob {
            kind: MobKind::Normal,
        },
        Command::SpawnMob {
            kind: MobKind::Normal,
        },
        Command::MoveMob {
            mob: MobId::new(0),
            position: TilePoint::new(3.5, 1.5),
            waypoint_index: 4,
        },
        Command::MoveMob {
            mob: MobId::new(1),
            position: TilePoint::new(5.5, 1.5),
            waypoint_index: 6,
        },
        Command::MoveMob {
            mob: MobId::new(0),
            position: TilePoint::new(2.0, 1.5),
            waypoint_index: 2,
        },
        Command::ExitMob { mob: MobId::new(1) },
    ]
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<String>,
    assignments: Vec<TargetSnapshot>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.events.hash(&mut hasher);
        self.assignments.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TargetSnapshot {
    targets: Vec<TargetRecord>,
}

impl From<&Vec<TowerTarget>> for TargetSnapshot {
    fn from(targets: &Vec<TowerTarget>) -> Self {
        let targets = targets
            .iter()
            .map(|target| TargetRecord {
                tower: target.tower,
                mob: target.mob.get(),
                distance_bits: target.distance.to_bits(),
            })
            .collect();
        Self { targets }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct TargetRecord {
    tower: TowerId,
    mob: u32,
    distance_bits: u64,
}
