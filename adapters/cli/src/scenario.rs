//! Scripted session setup loaded from TOML.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tile_defence_core::{TileCoord, TowerKind};
use tile_defence_engine::{load_grid, Game, GameConfig, Grid};
use tracing::{debug, warn};

/// Session description: map, tuning overrides and an opening build order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Scenario {
    /// Authored map rows; the shipped map is used when absent.
    pub(crate) map: Option<Vec<String>>,
    /// Starting money, lives, grace delay and wave table.
    pub(crate) config: GameConfig,
    /// Whether the first wave starts before the first tick.
    pub(crate) auto_start: Option<bool>,
    /// Towers built before the first tick, in order.
    pub(crate) towers: Vec<TowerPlan>,
}

/// A tower to build and how many times to upgrade it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TowerPlan {
    pub(crate) kind: TowerKind,
    pub(crate) column: u32,
    pub(crate) row: u32,
    #[serde(default)]
    pub(crate) upgrades: u8,
}

/// Result of executing a build order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct BuildOutcome {
    pub(crate) placed: u32,
    pub(crate) upgraded: u32,
    pub(crate) rejected: u32,
}

impl Scenario {
    /// Reads and parses the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    pub(crate) fn parse(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub(crate) fn grid(&self) -> Grid {
        match &self.map {
            Some(rows) => {
                let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
                Grid::from_rows(&rows)
            }
            None => load_grid(),
        }
    }

    pub(crate) fn auto_start(&self) -> bool {
        self.auto_start.unwrap_or(true)
    }

    /// Builds and upgrades the planned towers, logging every refusal.
    pub(crate) fn build(&self, game: &mut Game) -> BuildOutcome {
        let mut outcome = BuildOutcome::default();

        for plan in &self.towers {
            let tile = TileCoord::new(plan.column, plan.row);
            if !game.add_tower(tile, plan.kind) {
                warn!(?tile, kind = ?plan.kind, money = game.money(), "tower placement refused");
                outcome.rejected += 1;
                continue;
            }
            outcome.placed += 1;

            let Some(tower) = game.tower_at(tile) else {
                continue;
            };
            for _ in 0..plan.upgrades {
                if !game.upgrade_tower(tower.id) {
                    warn!(?tile, money = game.money(), "tower upgrade refused");
                    outcome.rejected += 1;
                    break;
                }
                outcome.upgraded += 1;
            }
        }

        debug!(?outcome, money = game.money(), "build order executed");
        outcome
    }
}
