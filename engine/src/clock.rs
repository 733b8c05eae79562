//! Fixed-timestep driver that turns real frame time into simulation ticks.

use tile_defence_core::{Event, TICK_DT};

use crate::Game;

/// Longest real frame delta fed into the accumulator, in seconds.
pub const MAX_FRAME_DELTA: f64 = 0.25;

/// Events and tick count produced while catching up with one real frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Number of logical ticks the frame ran.
    pub ticks: u32,
    /// Events of every tick run during the frame, in order.
    pub events: Vec<Event>,
}

/// Accumulates real elapsed time and runs whole logical ticks from it.
///
/// Each logical tick covers [`TICK_DT`] of real time and advances the
/// simulation by `TICK_DT` scaled with the game's speed multiplier.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameClock {
    accumulator: f64,
}

impl FrameClock {
    /// Creates a clock with an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Real time carried over to the next frame, in seconds.
    #[must_use]
    pub fn carried(&self) -> f64 {
        self.accumulator
    }

    /// Feeds `real_dt` seconds of wall-clock time and runs every tick now due.
    ///
    /// Deltas are clamped to [`MAX_FRAME_DELTA`]; negative or non-finite
    /// deltas count as zero.
    pub fn advance(&mut self, game: &mut Game, real_dt: f64) -> FrameReport {
        let real_dt = if real_dt.is_finite() { real_dt } else { 0.0 };
        self.accumulator += real_dt.clamp(0.0, MAX_FRAME_DELTA);

        let mut report = FrameReport::default();
        while self.accumulator >= TICK_DT {
            let tick = game.advance_tick(TICK_DT * game.speed_multiplier());
            report.events.extend(tick.events);
            report.ticks += 1;
            self.accumulator -= TICK_DT;
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{init_game, GameConfig};
    use tile_defence_world::Grid;

    fn game() -> Game {
        let grid = Arc::new(Grid::from_rows(&["....", "PPPP", "...."]));
        init_game(grid, GameConfig::default())
    }

    #[test]
    fn whole_ticks_run_and_the_remainder_carries() {
        let mut game = game();
        let mut clock = FrameClock::new();

        let report = clock.advance(&mut game, 2.5 * TICK_DT);

        assert_eq!(report.ticks, 2);
        assert!((clock.carried() - 0.5 * TICK_DT).abs() < 1e-12);
        assert!((game.time() - 2.0 * TICK_DT).abs() < 1e-12);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut game = game();
        let mut clock = FrameClock::new();

        let report = clock.advance(&mut game, 3.0);

        assert!((14..=15).contains(&report.ticks));
        assert!(game.time() <= MAX_FRAME_DELTA + 1e-9);
    }

    #[test]
    fn speed_multiplier_scales_simulated_time() {
        let mut game = game();
        let mut clock = FrameClock::new();
        assert!(game.set_speed_multiplier(2.0));

        let report = clock.advance(&mut game, 0.105);

        assert_eq!(report.ticks, 6);
        assert!((game.time() - 12.0 * TICK_DT).abs() < 1e-9);
    }

    #[test]
    fn invalid_deltas_run_nothing() {
        let mut game = game();
        let mut clock = FrameClock::new();

        assert_eq!(clock.advance(&mut game, f64::NAN).ticks, 0);
        assert_eq!(clock.advance(&mut game, -1.0).ticks, 0);
        assert_eq!(clock.carried(), 0.0);
    }
}
