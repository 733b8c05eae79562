//! Static tile map parsing and mob route derivation.

use tile_defence_core::{TileClass, TileCoord, TilePoint};
use tracing::debug;

use crate::pathfinding::{a_star, breadth_first, index, neighbors, route_to};

/// Map shipped with the game.
///
/// `B` marks blocked tiles, `P` marks the mob route and every other character
/// marks buildable ground.
pub const DEFAULT_MAP: [&str; 10] = [
    "BBBBBBBBBBBBPBBB",
    "B........B..P..B",
    "PPPPP....B..P..B",
    "B...PBBBBB..P..B",
    "B...P......PP..B",
    "B...P..PPPPP...B",
    "B...P..P....BBBB",
    "B...PPPP....B..B",
    "B...........B..B",
    "BBBBBBBBBBBBBBBB",
];

/// Immutable tile grid together with the route mobs follow across it.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<TileClass>,
    path: Vec<TilePoint>,
}

/// Builds the grid for the shipped map.
#[must_use]
pub fn load_grid() -> Grid {
    Grid::from_rows(&DEFAULT_MAP)
}

impl Grid {
    /// Parses an authored map and derives the mob route through it.
    ///
    /// Ragged rows are padded with blocked tiles and an empty map is treated
    /// as a single blocked tile, so the returned grid always carries a
    /// non-empty route. Route derivation degrades in three steps: a
    /// breadth-first walk over authored path tiles, an A* search between the
    /// left and right edges over buildable tiles, and finally a straight line
    /// through the vertical middle of the grid.
    #[must_use]
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = u32::try_from(rows.len()).unwrap_or(u32::MAX).max(1);
        let width = rows
            .iter()
            .map(|row| u32::try_from(row.chars().count()).unwrap_or(u32::MAX))
            .max()
            .unwrap_or(0)
            .max(1);

        let mut tiles = Vec::new();
        let mut authored_path = Vec::new();
        for row in 0..height {
            let mut symbols = usize::try_from(row)
                .ok()
                .and_then(|row| rows.get(row))
                .map(|line| line.chars())
                .into_iter()
                .flatten();
            for column in 0..width {
                let class = match symbols.next() {
                    None | Some('B') => TileClass::Blocked,
                    Some('P') => TileClass::Path,
                    Some(_) => TileClass::Buildable,
                };
                if class == TileClass::Path {
                    authored_path.push(TileCoord::new(column, row));
                }
                tiles.push(class);
            }
        }

        let mut grid = Self {
            width,
            height,
            tiles,
            path: Vec::new(),
        };

        let route = grid
            .route_along_authored_path(&authored_path)
            .or_else(|| grid.route_across_buildable_ground())
            .filter(|route| !route.is_empty())
            .unwrap_or_else(|| grid.straight_route());

        grid.path = route.iter().map(|cell| cell.center()).collect();
        grid
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Tile classifications in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[TileClass] {
        &self.tiles
    }

    /// Classification of a single tile, if it lies inside the grid.
    #[must_use]
    pub fn tile(&self, tile: TileCoord) -> Option<TileClass> {
        if tile.row() >= self.height {
            return None;
        }
        index(self.width, tile).and_then(|offset| self.tiles.get(offset).copied())
    }

    /// Ordered tile-centre points mobs travel through.
    #[must_use]
    pub fn path(&self) -> &[TilePoint] {
        &self.path
    }

    /// First point of the route, where mobs spawn.
    #[must_use]
    pub fn start(&self) -> TilePoint {
        self.path.first().copied().unwrap_or_default()
    }

    /// Last point of the route, where mobs escape.
    #[must_use]
    pub fn end(&self) -> TilePoint {
        self.path.last().copied().unwrap_or_default()
    }

    fn is_class(&self, tile: TileCoord, class: TileClass) -> bool {
        self.tile(tile) == Some(class)
    }

    fn reclassify(&mut self, route: &[TileCoord]) {
        for cell in route {
            if let Some(offset) = index(self.width, *cell) {
                if let Some(slot) = self.tiles.get_mut(offset) {
                    *slot = TileClass::Path;
                }
            }
        }
    }

    fn route_along_authored_path(&self, cells: &[TileCoord]) -> Option<Vec<TileCoord>> {
        let first = *cells.first()?;
        let is_path = |cell: TileCoord| self.is_class(cell, TileClass::Path);

        let endpoints: Vec<TileCoord> = cells
            .iter()
            .copied()
            .filter(|cell| {
                neighbors(*cell, self.width, self.height)
                    .filter(|neighbor| is_path(*neighbor))
                    .count()
                    == 1
            })
            .collect();

        let start = endpoints
            .iter()
            .copied()
            .min_by_key(|cell| (cell.column(), cell.row()))
            .unwrap_or(first);

        let tree = breadth_first(self.width, self.height, start, is_path);
        let candidates = if endpoints.is_empty() {
            cells
        } else {
            endpoints.as_slice()
        };

        let mut end = start;
        let mut farthest = None;
        for candidate in candidates {
            let Some(distance) = tree.distance(*candidate) else {
                continue;
            };
            if farthest.map_or(true, |best| distance > best) {
                farthest = Some(distance);
                end = *candidate;
            }
        }

        let route = route_to(&tree, start, end);
        debug!(
            start = ?start,
            end = ?end,
            length = route.len(),
            "derived route from authored path tiles"
        );
        Some(route)
    }

    fn route_across_buildable_ground(&mut self) -> Option<Vec<TileCoord>> {
        let start = self.edge_cell(Side::Left);
        let goal = self.edge_cell(Side::Right);
        let route = a_star(self.width, self.height, start, goal, |cell| {
            self.is_class(cell, TileClass::Buildable)
        })?;

        debug!(length = route.len(), "carved route across buildable tiles");
        self.reclassify(&route);
        Some(route)
    }

    fn straight_route(&mut self) -> Vec<TileCoord> {
        let row = self.height / 2;
        let route: Vec<TileCoord> = if self.width > 2 {
            (1..self.width - 1)
                .map(|column| TileCoord::new(column, row))
                .collect()
        } else {
            (0..self.width)
                .map(|column| TileCoord::new(column, row))
                .collect()
        };

        debug!(row, length = route.len(), "fell back to a straight route");
        self.reclassify(&route);
        route
    }

    fn edge_cell(&self, side: Side) -> TileCoord {
        let column = match side {
            Side::Left => 1,
            Side::Right => self.width.saturating_sub(2),
        };

        for row in 1..self.height.saturating_sub(1) {
            let cell = TileCoord::new(column, row);
            if self.is_class(cell, TileClass::Buildable) {
                return cell;
            }
        }

        let last_column = self.width - 1;
        let last_row = self.height - 1;
        match side {
            Side::Left => TileCoord::new(1.min(last_column), 1.min(last_row)),
            Side::Right => TileCoord::new(
                self.width.saturating_sub(2).min(last_column),
                self.height.saturating_sub(2).min(last_row),
            ),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Side {
    Left,
    Right,
}
