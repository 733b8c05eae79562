#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that walks mobs along the path polyline.

use tile_defence_core::{
    Command, Event, MobSnapshot, MobView, TilePoint, EXIT_PROXIMITY, WAYPOINT_EPSILON,
};

/// Position and waypoint reached after walking part of the path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stride {
    /// Point reached by the walk.
    pub position: TilePoint,
    /// Index of the path point the walker heads toward next.
    pub waypoint_index: usize,
}

/// Walks `distance` tiles of arc length along `path`, starting at `position`
/// and heading toward `path[waypoint_index]`.
///
/// Waypoints closer than [`WAYPOINT_EPSILON`] count as reached, so a single
/// call may cross several of them. Once the index runs past the last point the
/// walker heads for the end of the path.
#[must_use]
pub fn walk(path: &[TilePoint], position: TilePoint, waypoint_index: usize, distance: f64) -> Stride {
    let Some(end) = path.last().copied() else {
        return Stride {
            position,
            waypoint_index,
        };
    };

    let mut position = position;
    let mut index = waypoint_index;
    let mut target = path.get(index).copied().unwrap_or(end);
    let mut remaining = distance;

    while remaining > 0.0 {
        let gap = position.distance(target);
        if gap < WAYPOINT_EPSILON {
            index = index.saturating_add(1);
            match path.get(index) {
                Some(next) => target = *next,
                None => break,
            }
            continue;
        }

        let step = remaining.min(gap);
        position += (target - position) / gap * step;
        remaining -= step;
    }

    Stride {
        position,
        waypoint_index: index,
    }
}

/// Pure system that reacts to clock events and emits mob movement commands.
#[derive(Debug, Default)]
pub struct Movement {
    moved: Vec<Command>,
}

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and the mob view to emit movement commands.
    ///
    /// Mobs are processed in identifier order. A mob that ends the tick within
    /// [`EXIT_PROXIMITY`] of the path end produces `Command::ExitMob`; any
    /// other mob that moved produces `Command::MoveMob`.
    pub fn handle(
        &mut self,
        events: &[Event],
        mobs: &MobView,
        path: &[TilePoint],
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = 0.0;
        let mut now = None;
        for event in events {
            if let Event::TimeAdvanced { dt, now: at } = event {
                elapsed += dt;
                now = Some(*at);
            }
        }

        let Some(now) = now else {
            return;
        };
        let Some(end) = path.last().copied() else {
            return;
        };

        self.moved.clear();
        for mob in mobs.iter() {
            if let Some(command) = advance(mob, path, end, elapsed, now) {
                self.moved.push(command);
            }
        }

        out.reserve(self.moved.len());
        out.append(&mut self.moved);
    }
}

fn advance(
    mob: &MobSnapshot,
    path: &[TilePoint],
    end: TilePoint,
    elapsed: f64,
    now: f64,
) -> Option<Command> {
    let stride = walk(
        path,
        mob.position,
        mob.waypoint_index,
        elapsed * mob.effective_speed(now),
    );

    if stride.position.distance(end) < EXIT_PROXIMITY {
        return Some(Command::ExitMob { mob: mob.id });
    }

    if stride.position == mob.position && stride.waypoint_index == mob.waypoint_index {
        return None;
    }

    Some(Command::MoveMob {
        mob: mob.id,
        position: stride.position,
        waypoint_index: stride.waypoint_index,
    })
}
