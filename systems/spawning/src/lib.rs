#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduling and the per-tick drain of due spawn events.

use tile_defence_core::{Command, Event, MobKind, ScheduledSpawn, SpawnScheduleView, WaveEntry};

/// Expands wave entries into absolute spawn events anchored at `t0`.
///
/// Each entry contributes `count` events starting at `t0 + delay`, spaced
/// `spacing` seconds apart. Events keep entry order, then spawn order within
/// an entry; no sorting by time is performed.
#[must_use]
pub fn schedule(entries: &[WaveEntry], t0: f64) -> Vec<ScheduledSpawn> {
    let capacity = entries
        .iter()
        .map(|entry| usize::try_from(entry.count).unwrap_or(0))
        .sum();
    let mut events = Vec::with_capacity(capacity);

    for entry in entries {
        let start = t0 + entry.delay;
        for index in 0..entry.count {
            events.push(ScheduledSpawn {
                time: start + f64::from(index) * entry.spacing,
                kind: entry.kind,
            });
        }
    }

    events
}

/// Pure system that emits spawn commands for scheduled events that fell due.
#[derive(Debug, Default)]
pub struct Spawning {
    due: Vec<MobKind>,
}

impl Spawning {
    /// Creates a new spawning system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one `Command::SpawnMob` per pending event whose time is at or
    /// before `now`, in schedule order.
    ///
    /// Draining only happens in response to the clock advancing, so a wave
    /// started between ticks spawns its first mob on the following tick.
    pub fn handle(
        &mut self,
        events: &[Event],
        now: f64,
        schedule: Option<SpawnScheduleView<'_>>,
        out: &mut Vec<Command>,
    ) {
        let ticked = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !ticked {
            return;
        }

        let Some(schedule) = schedule else {
            return;
        };

        self.due.clear();
        self.due.extend(
            schedule
                .pending()
                .iter()
                .take_while(|spawn| spawn.time <= now)
                .map(|spawn| spawn.kind),
        );

        out.reserve(self.due.len());
        out.extend(self.due.drain(..).map(|kind| Command::SpawnMob { kind }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(delay: f64, kind: MobKind, count: u32, spacing: f64) -> WaveEntry {
        WaveEntry {
            delay,
            kind,
            count,
            spacing,
        }
    }

    #[test]
    fn schedule_spaces_spawns_within_an_entry() {
        let events = schedule(&[entry(0.0, MobKind::Normal, 3, 0.7)], 2.0);

        let times: Vec<f64> = events.iter().map(|spawn| spawn.time).collect();
        assert_eq!(times.len(), 3);
        assert!((times[0] - 2.0).abs() < 1e-12);
        assert!((times[1] - 2.7).abs() < 1e-12);
        assert!((times[2] - 3.4).abs() < 1e-12);
    }

    #[test]
    fn schedule_keeps_entry_order_over_time_order() {
        let events = schedule(
            &[
                entry(5.0, MobKind::Tank, 1, 0.0),
                entry(0.0, MobKind::Fast, 2, 1.0),
            ],
            0.0,
        );

        let kinds: Vec<MobKind> = events.iter().map(|spawn| spawn.kind).collect();
        assert_eq!(kinds, vec![MobKind::Tank, MobKind::Fast, MobKind::Fast]);
        assert_eq!(events[0].time, 5.0);
        assert_eq!(events[1].time, 0.0);
    }

    #[test]
    fn empty_entries_produce_empty_schedule() {
        assert!(schedule(&[], 1.0).is_empty());
        assert!(schedule(&[entry(0.0, MobKind::Flying, 0, 1.0)], 1.0).is_empty());
    }

    #[test]
    fn handle_emits_only_due_spawns() {
        let events = schedule(&[entry(0.0, MobKind::Fast, 3, 0.5)], 0.0);
        let view = SpawnScheduleView::new(1, &events);
        let mut spawning = Spawning::new();
        let mut out = Vec::new();

        spawning.handle(
            &[Event::TimeAdvanced { dt: 0.5, now: 0.6 }],
            0.6,
            Some(view),
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::SpawnMob {
                kind: MobKind::Fast
            }]
        );
    }

    #[test]
    fn handle_waits_for_the_clock() {
        let events = schedule(&[entry(0.0, MobKind::Normal, 1, 0.0)], 0.0);
        let mut spawning = Spawning::new();
        let mut out = Vec::new();

        spawning.handle(&[], 1.0, Some(SpawnScheduleView::new(0, &events)), &mut out);
        assert!(out.is_empty());

        spawning.handle(
            &[Event::TimeAdvanced { dt: 0.1, now: 1.0 }],
            1.0,
            None,
            &mut out,
        );
        assert!(out.is_empty());
    }
}
