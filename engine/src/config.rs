//! Tunable parameters a game session starts from.

use serde::{Deserialize, Serialize};
use tile_defence_core::{
    standard_waves, WaveDefinition, STARTING_LIVES, STARTING_MONEY, WAVE_GRACE_DELAY,
};
use tile_defence_world::WorldSetup;

/// Parameters applied when a game is created or restarted.
///
/// Every field falls back to the shipped tuning when omitted from a
/// serialized configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Money available before the first tower is built.
    pub starting_money: u32,
    /// Lives available before the first mob escapes.
    pub starting_lives: u32,
    /// Seconds between clearing a wave and the first spawn of the next one.
    pub wave_grace_delay: f64,
    /// Wave table consumed in order.
    pub waves: Vec<WaveDefinition>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_money: STARTING_MONEY,
            starting_lives: STARTING_LIVES,
            wave_grace_delay: WAVE_GRACE_DELAY,
            waves: standard_waves(),
        }
    }
}

impl GameConfig {
    pub(crate) fn world_setup(&self) -> WorldSetup {
        WorldSetup {
            starting_money: self.starting_money,
            starting_lives: self.starting_lives,
            waves: self.waves.clone(),
        }
    }
}
