//! Per-level tables built once before the search: dead squares and lone-box
//! push distances. Both walk the level backwards by pulling a box away from
//! a goal; other boxes are ignored.

use std::collections::VecDeque;

use arrayvec::ArrayVec;
use log::{debug, log_enabled, Level};

use crate::map::{Cell, Direction, Dims, Map};

/// Cells a box at `cell` could have been pushed from: the box cell one step
/// away and the player cell behind it must both be free of walls.
#[inline(always)]
fn pull_sources(map: &Map, cell: Cell) -> ArrayVec<Cell, 4> {
    let mut sources = ArrayVec::new();
    for dir in Direction::ALL {
        let pull_origin = cell.step(dir);
        let player = pull_origin.step(dir);
        if map.is_floor(pull_origin) && map.is_floor(player) {
            sources.push(pull_origin);
        }
    }
    sources
}

/// Floor cells from which no box can ever reach any goal.
#[derive(Clone, Debug)]
pub struct DeadSquares {
    dims: Dims,
    dead: Vec<bool>,
    live_count: usize,
}

impl DeadSquares {
    pub fn compute(map: &Map) -> Self {
        let dims = map.dims();
        let mut live = vec![false; dims.len()];
        let mut queue = VecDeque::with_capacity(map.goals().len() * 4);

        for &goal in map.goals() {
            if let Some(idx) = dims.index(goal) {
                live[idx] = true;
                queue.push_back(goal);
            }
        }

        while let Some(pull_target) = queue.pop_front() {
            for origin in pull_sources(map, pull_target) {
                if let Some(idx) = dims.index(origin) {
                    if !live[idx] {
                        live[idx] = true;
                        queue.push_back(origin);
                    }
                }
            }
        }

        let mut dead = vec![false; dims.len()];
        let mut live_count = 0;
        for cell in map.floor_cells() {
            if let Some(idx) = dims.index(cell) {
                if live[idx] {
                    live_count += 1;
                } else {
                    dead[idx] = true;
                }
            }
        }

        debug!(
            "dead squares: {} live of {} floor cells",
            live_count,
            map.floor_cells().count()
        );

        DeadSquares {
            dims,
            dead,
            live_count,
        }
    }

    #[inline(always)]
    pub fn contains(&self, cell: Cell) -> bool {
        match self.dims.index(cell) {
            Some(idx) => self.dead[idx],
            None => false,
        }
    }

    pub fn live_count(&self) -> usize {
        self.live_count
    }
}

const UNREACHABLE: u16 = u16::MAX;

/// Minimum pushes for a lone box from each cell to each goal.
#[derive(Clone, Debug)]
pub struct DistanceTable {
    dims: Dims,
    // One row-major grid per goal, in `Map::goals` order.
    per_goal: Vec<Vec<u16>>,
}

impl DistanceTable {
    pub fn compute(map: &Map) -> Self {
        let per_goal: Vec<Vec<u16>> = map
            .goals()
            .iter()
            .map(|&goal| push_distances(map, goal))
            .collect();

        if log_enabled!(Level::Debug) {
            let unreachable_pairs: usize = per_goal
                .iter()
                .map(|grid| {
                    map.floor_cells()
                        .filter_map(|c| map.dims().index(c))
                        .filter(|&idx| grid[idx] == UNREACHABLE)
                        .count()
                })
                .sum();
            debug!(
                "distance table: {} goals, {} unreachable (cell, goal) pairs",
                per_goal.len(),
                unreachable_pairs
            );
        }

        DistanceTable {
            dims: map.dims(),
            per_goal,
        }
    }

    pub fn goal_count(&self) -> usize {
        self.per_goal.len()
    }

    /// Pushes from `cell` to goal number `goal`; `None` means unreachable.
    #[inline(always)]
    pub fn get(&self, cell: Cell, goal: usize) -> Option<u32> {
        let idx = self.dims.index(cell)?;
        match self.per_goal.get(goal)?[idx] {
            UNREACHABLE => None,
            dist => Some(dist as u32),
        }
    }
}

fn push_distances(map: &Map, goal: Cell) -> Vec<u16> {
    let dims = map.dims();
    let mut dist = vec![UNREACHABLE; dims.len()];
    let Some(goal_idx) = dims.index(goal) else {
        return dist;
    };
    dist[goal_idx] = 0;

    let mut queue = VecDeque::with_capacity(64);
    queue.push_back(goal);

    while let Some(current) = queue.pop_front() {
        let Some(current_idx) = dims.index(current) else {
            continue;
        };
        let next_dist = dist[current_idx].saturating_add(1).min(UNREACHABLE - 1);
        for origin in pull_sources(map, current) {
            if let Some(idx) = dims.index(origin) {
                if dist[idx] == UNREACHABLE {
                    dist[idx] = next_dist;
                    queue.push_back(origin);
                }
            }
        }
    }

    dist
}
