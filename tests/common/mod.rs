#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};

use sokoban_solver::{Cell, Direction, Map, PuzzleInstance};

pub type RawState = (Cell, Vec<Cell>);

pub const ORIGINAL_LEVELS: &str = include_str!("../../levels/original.xsb");

fn has_box(boxes: &[Cell], cell: Cell) -> bool {
    boxes.binary_search(&cell).is_ok()
}

fn free(map: &Map, boxes: &[Cell], cell: Cell) -> bool {
    map.is_floor(cell) && !has_box(boxes, cell)
}

fn moved(boxes: &[Cell], from: Cell, to: Cell) -> Vec<Cell> {
    let mut next: Vec<Cell> = boxes.iter().map(|&b| if b == from { to } else { b }).collect();
    next.sort_unstable();
    next
}

/// Every legal single move from a raw state, with its push cost.
pub fn forward_moves(map: &Map, player: Cell, boxes: &[Cell]) -> Vec<(RawState, u32)> {
    let mut out = Vec::new();
    for dir in Direction::ALL {
        let next = player.step(dir);
        if map.is_wall(next) {
            continue;
        }
        if has_box(boxes, next) {
            let dest = next.step(dir);
            if free(map, boxes, dest) {
                out.push(((next, moved(boxes, next, dest)), 1));
            }
        } else {
            out.push(((next, boxes.to_vec()), 0));
        }
    }
    out
}

fn start_state(instance: &PuzzleInstance) -> RawState {
    let mut boxes = instance.boxes().to_vec();
    boxes.sort_unstable();
    (instance.player(), boxes)
}

fn solved(map: &Map, boxes: &[Cell]) -> bool {
    boxes.iter().all(|&b| map.is_goal(b))
}

/// Fewest pushes to solve, by 0-1 BFS over raw (player, boxes) states.
pub fn min_pushes(instance: &PuzzleInstance) -> Option<u32> {
    let map = instance.map();
    let start = start_state(instance);
    let mut dist: HashMap<RawState, u32> = HashMap::new();
    let mut queue: VecDeque<(RawState, u32)> = VecDeque::new();
    dist.insert(start.clone(), 0);
    queue.push_back((start, 0));

    while let Some((state, d)) = queue.pop_front() {
        if dist.get(&state).is_some_and(|&best| best < d) {
            continue;
        }
        if solved(map, &state.1) {
            return Some(d);
        }
        for (next, cost) in forward_moves(map, state.0, &state.1) {
            let nd = d + cost;
            if dist.get(&next).map_or(true, |&best| nd < best) {
                dist.insert(next.clone(), nd);
                if cost == 0 {
                    queue.push_front((next, nd));
                } else {
                    queue.push_back((next, nd));
                }
            }
        }
    }
    None
}

/// All raw states reachable from the start.
pub fn forward_states(instance: &PuzzleInstance) -> HashSet<RawState> {
    let map = instance.map();
    let start = start_state(instance);
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(start.clone());
    queue.push_back(start);

    while let Some((player, boxes)) = queue.pop_front() {
        for (next, _) in forward_moves(map, player, &boxes) {
            if seen.insert(next.clone()) {
                queue.push_back(next);
            }
        }
    }
    seen
}

/// Exact remaining pushes for every raw state that can still be solved,
/// by 0-1 BFS backwards from all solved states.
pub fn remaining_pushes(map: &Map) -> HashMap<RawState, u32> {
    let mut goals = map.goals().to_vec();
    goals.sort_unstable();

    let mut dist: HashMap<RawState, u32> = HashMap::new();
    let mut queue: VecDeque<(RawState, u32)> = VecDeque::new();
    for player in map.floor_cells().filter(|&c| !has_box(&goals, c)) {
        let state = (player, goals.clone());
        dist.insert(state.clone(), 0);
        queue.push_back((state, 0));
    }

    while let Some(((player, boxes), d)) = queue.pop_front() {
        if dist.get(&(player, boxes.clone())).is_some_and(|&best| best < d) {
            continue;
        }
        for dir in Direction::ALL {
            // The last forward move went `dir` from `back` onto `player`.
            let back = player.step(dir.opposite());
            if !free(map, &boxes, back) {
                continue;
            }
            let mut predecessors = vec![((back, boxes.clone()), d)];
            let pushed = player.step(dir);
            if has_box(&boxes, pushed) {
                predecessors.push(((back, moved(&boxes, pushed, player)), d + 1));
            }
            for (prev, nd) in predecessors {
                if dist.get(&prev).map_or(true, |&best| nd < best) {
                    dist.insert(prev.clone(), nd);
                    if nd == d {
                        queue.push_front((prev, nd));
                    } else {
                        queue.push_back((prev, nd));
                    }
                }
            }
        }
    }
    dist
}
