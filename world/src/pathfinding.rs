//! Grid searches used to derive the mob route.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, VecDeque},
};

use tile_defence_core::TileCoord;

/// Neighbor offsets in fixed order: east, west, south, north.
const DIRECTIONS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Breadth-first search results rooted at a single tile.
#[derive(Clone, Debug)]
pub(crate) struct SearchTree {
    width: u32,
    distances: Vec<Option<u32>>,
    parents: Vec<Option<TileCoord>>,
}

impl SearchTree {
    /// Hop count from the root to `cell`, if it was reached.
    pub(crate) fn distance(&self, cell: TileCoord) -> Option<u32> {
        index(self.width, cell).and_then(|offset| self.distances.get(offset).copied().flatten())
    }

    fn parent(&self, cell: TileCoord) -> Option<TileCoord> {
        index(self.width, cell).and_then(|offset| self.parents.get(offset).copied().flatten())
    }
}

/// Unweighted breadth-first search over cells accepted by `passable`.
pub(crate) fn breadth_first<F>(width: u32, height: u32, root: TileCoord, passable: F) -> SearchTree
where
    F: Fn(TileCoord) -> bool,
{
    let cell_count = cell_count(width, height);
    let mut tree = SearchTree {
        width,
        distances: vec![None; cell_count],
        parents: vec![None; cell_count],
    };

    let Some(root_index) = index(width, root).filter(|offset| *offset < cell_count) else {
        return tree;
    };
    tree.distances[root_index] = Some(0);

    let mut queue = VecDeque::new();
    queue.push_back(root);

    while let Some(cell) = queue.pop_front() {
        let Some(current) = index(width, cell).and_then(|offset| tree.distances[offset]) else {
            continue;
        };

        for neighbor in neighbors(cell, width, height) {
            if !passable(neighbor) {
                continue;
            }
            let Some(offset) = index(width, neighbor) else {
                continue;
            };
            if tree.distances[offset].is_some() {
                continue;
            }

            tree.distances[offset] = Some(current + 1);
            tree.parents[offset] = Some(cell);
            queue.push_back(neighbor);
        }
    }

    tree
}

/// Follows parent links from `end` back to `start` and returns the route in
/// travel order.
///
/// Reconstruction stops at the first missing parent or revisited cell, so a
/// corrupted tree yields a truncated route instead of looping forever.
pub(crate) fn restore_route<F>(start: TileCoord, end: TileCoord, parent_of: F) -> Vec<TileCoord>
where
    F: Fn(TileCoord) -> Option<TileCoord>,
{
    let mut route = Vec::new();
    let mut seen = std::collections::BTreeSet::new();
    let mut cell = end;

    loop {
        if !seen.insert(cell) {
            break;
        }
        route.push(cell);
        if cell == start {
            break;
        }
        match parent_of(cell) {
            Some(parent) => cell = parent,
            None => break,
        }
    }

    route.reverse();
    route
}

/// Reconstructs the route from the tree root to `end`.
pub(crate) fn route_to(tree: &SearchTree, start: TileCoord, end: TileCoord) -> Vec<TileCoord> {
    restore_route(start, end, |cell| tree.parent(cell))
}

/// A* search with a Manhattan heuristic and unit edge cost.
///
/// The start cell is always expanded; only neighbors must satisfy `passable`.
pub(crate) fn a_star<F>(
    width: u32,
    height: u32,
    start: TileCoord,
    goal: TileCoord,
    passable: F,
) -> Option<Vec<TileCoord>>
where
    F: Fn(TileCoord) -> bool,
{
    let cell_count = cell_count(width, height);
    let start_index = index(width, start).filter(|offset| *offset < cell_count)?;

    let mut best_cost = vec![u32::MAX; cell_count];
    let mut came_from: Vec<Option<TileCoord>> = vec![None; cell_count];
    let mut open = BinaryHeap::new();

    best_cost[start_index] = 0;
    open.push(Reverse((start.manhattan_distance(goal), 0_u32, start_index)));

    while let Some(Reverse((_, cost, current_index))) = open.pop() {
        if cost > best_cost[current_index] {
            continue;
        }

        let current = coord(width, current_index);
        if current == goal {
            return Some(restore_route(start, goal, |cell| {
                index(width, cell).and_then(|offset| came_from[offset])
            }));
        }

        let tentative = cost + 1;
        for neighbor in neighbors(current, width, height) {
            if !passable(neighbor) {
                continue;
            }
            let Some(neighbor_index) = index(width, neighbor) else {
                continue;
            };
            if tentative >= best_cost[neighbor_index] {
                continue;
            }

            best_cost[neighbor_index] = tentative;
            came_from[neighbor_index] = Some(current);
            let estimate = tentative + neighbor.manhattan_distance(goal);
            open.push(Reverse((estimate, tentative, neighbor_index)));
        }
    }

    None
}

/// Cells sharing an edge with `cell` that lie inside the grid.
pub(crate) fn neighbors(cell: TileCoord, width: u32, height: u32) -> impl Iterator<Item = TileCoord> {
    DIRECTIONS.into_iter().filter_map(move |(dx, dy)| {
        let column = i64::from(cell.column()) + dx;
        let row = i64::from(cell.row()) + dy;
        if column < 0 || row < 0 || column >= i64::from(width) || row >= i64::from(height) {
            return None;
        }
        Some(TileCoord::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    })
}

/// Row-major offset of `cell` for a grid `width` tiles wide.
pub(crate) fn index(width: u32, cell: TileCoord) -> Option<usize> {
    if cell.column() >= width {
        return None;
    }
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    let width = usize::try_from(width).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

fn coord(width: u32, offset: usize) -> TileCoord {
    let width = usize::try_from(width).unwrap_or(1).max(1);
    let column = u32::try_from(offset % width).unwrap_or(u32::MAX);
    let row = u32::try_from(offset / width).unwrap_or(u32::MAX);
    TileCoord::new(column, row)
}

fn cell_count(width: u32, height: u32) -> usize {
    let count = u64::from(width) * u64::from(height);
    usize::try_from(count).unwrap_or(0)
}
