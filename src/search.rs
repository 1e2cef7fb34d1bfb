//! Push-optimal A* over (normalized player, box set) states.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};
use rustc_hash::FxHashSet;

use crate::assignment::heuristic;
use crate::config::SolverConfig;
use crate::deadlock::is_freeze_deadlock;
use crate::error::{Result, SolverError};
use crate::map::{all_on_goals, has_box, BoxVec, Cell, Direction, PuzzleInstance};
use crate::moves::{reconstruct, Push};
use crate::precompute::{DeadSquares, DistanceTable};
use crate::reach::{normalize, Reach};

/// State identity. Walls and goals never change, so they are not part of it.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct SearchState {
    pub player: Cell,
    pub boxes: BoxVec,
}

#[derive(Clone, Debug)]
pub struct SearchNode {
    pub state: SearchState,
    pub g: u32,
    pub h: u32,
    /// Arena index of the parent node and the push that led here.
    pub parent: Option<(usize, Push)>,
}

impl SearchNode {
    pub fn f(&self) -> u32 {
        self.g + self.h
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub expanded: u64,
    pub generated: u64,
    pub duplicates: u64,
    pub pruned_dead_square: u64,
    pub pruned_deadlock: u64,
    pub pruned_infinite: u64,
    pub elapsed: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// Walks and pushes over `U`, `D`, `L`, `R`.
    pub moves: String,
    pub pushes: usize,
    pub stats: SearchStats,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveResult {
    Solved(Solution),
    /// The whole reachable space was searched without reaching the goal.
    Unsolvable(SearchStats),
    /// The budget ran out first; nothing is proven.
    TimedOut(SearchStats),
}

impl SolveResult {
    pub fn stats(&self) -> &SearchStats {
        match self {
            SolveResult::Solved(solution) => &solution.stats,
            SolveResult::Unsolvable(stats) | SolveResult::TimedOut(stats) => stats,
        }
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveResult::Solved(solution) => Some(solution),
            _ => None,
        }
    }
}

// OPEN entry: lowest f first, then deepest g, then oldest node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct OpenEntry {
    f: u32,
    g: u32,
    node: usize,
}

impl Ord for OpenEntry {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| self.g.cmp(&other.g))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for OpenEntry {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-level tables shared read-only by every node evaluation.
pub struct SokobanSolver<'a> {
    instance: &'a PuzzleInstance,
    dead_squares: DeadSquares,
    distances: DistanceTable,
}

impl<'a> SokobanSolver<'a> {
    pub fn new(instance: &'a PuzzleInstance) -> Result<Self> {
        let map = instance.map();
        if instance.boxes().len() != map.goals().len() {
            return Err(SolverError::BoxGoalMismatch {
                boxes: instance.boxes().len(),
                goals: map.goals().len(),
            });
        }

        Ok(SokobanSolver {
            instance,
            dead_squares: DeadSquares::compute(map),
            distances: DistanceTable::compute(map),
        })
    }

    pub fn dead_squares(&self) -> &DeadSquares {
        &self.dead_squares
    }

    pub fn distances(&self) -> &DistanceTable {
        &self.distances
    }

    pub fn solve(&self, config: &SolverConfig) -> Result<SolveResult> {
        config.validate()?;
        let started = Instant::now();
        let time_limit = config.time_limit();
        let mut stats = SearchStats::default();

        let map = self.instance.map();
        let start_boxes: BoxVec = self.instance.boxes().iter().copied().collect();
        let start_player = normalize(map, &start_boxes, self.instance.player());

        if is_freeze_deadlock(map, &start_boxes) {
            stats.pruned_deadlock += 1;
            stats.elapsed = started.elapsed();
            info!("start position has a frozen box off goal");
            return Ok(SolveResult::Unsolvable(stats));
        }
        let Some(start_h) = heuristic(map, &self.distances, &start_boxes) else {
            stats.pruned_infinite += 1;
            stats.elapsed = started.elapsed();
            info!("start position has a box that can reach no goal");
            return Ok(SolveResult::Unsolvable(stats));
        };
        debug!(
            "search start: {} boxes, player region at {}, h = {}",
            start_boxes.len(),
            start_player,
            start_h
        );

        let mut nodes: Vec<SearchNode> = Vec::with_capacity(4096);
        let mut open: BinaryHeap<OpenEntry> = BinaryHeap::with_capacity(4096);
        let mut closed: FxHashSet<SearchState> =
            FxHashSet::with_capacity_and_hasher(4096, Default::default());

        nodes.push(SearchNode {
            state: SearchState {
                player: start_player,
                boxes: start_boxes,
            },
            g: 0,
            h: start_h,
            parent: None,
        });
        open.push(OpenEntry {
            f: start_h,
            g: 0,
            node: 0,
        });

        while let Some(entry) = open.pop() {
            let (state, g) = {
                let node = &nodes[entry.node];
                (node.state.clone(), node.g)
            };

            if all_on_goals(map, &state.boxes) {
                stats.elapsed = started.elapsed();
                let pushes = push_chain(&nodes, entry.node);
                let moves = reconstruct(self.instance, &pushes)?;
                info!(
                    "solved with {} pushes, {} moves ({} expanded)",
                    pushes.len(),
                    moves.len(),
                    stats.expanded
                );
                return Ok(SolveResult::Solved(Solution {
                    moves,
                    pushes: pushes.len(),
                    stats,
                }));
            }

            // A popped goal is returned even when the budget is spent.
            if let Some(max_nodes) = config.max_nodes {
                if stats.expanded >= max_nodes {
                    stats.elapsed = started.elapsed();
                    warn!("node budget of {} exhausted", max_nodes);
                    return Ok(SolveResult::TimedOut(stats));
                }
            }
            if let Some(limit) = time_limit {
                if started.elapsed() >= limit {
                    stats.elapsed = started.elapsed();
                    warn!("time limit of {:?} exhausted", limit);
                    return Ok(SolveResult::TimedOut(stats));
                }
            }

            if closed.contains(&state) {
                stats.duplicates += 1;
                continue;
            }
            closed.insert(state.clone());
            stats.expanded += 1;
            trace!(
                "expand #{} g={} f={} player={}",
                entry.node,
                g,
                entry.f,
                state.player
            );

            let reach = Reach::compute(map, &state.boxes, state.player);
            for (i, &b) in state.boxes.iter().enumerate() {
                for dir in Direction::ALL {
                    let dest = b.step(dir);
                    if map.is_wall(dest) || has_box(&state.boxes, dest) {
                        continue;
                    }
                    if !reach.contains(b.step(dir.opposite())) {
                        continue;
                    }
                    if self.dead_squares.contains(dest) {
                        stats.pruned_dead_square += 1;
                        continue;
                    }

                    let mut boxes = state.boxes.clone();
                    boxes[i] = dest;
                    boxes.sort_unstable();
                    stats.generated += 1;

                    if is_freeze_deadlock(map, &boxes) {
                        stats.pruned_deadlock += 1;
                        continue;
                    }

                    let successor = SearchState {
                        player: normalize(map, &boxes, b),
                        boxes,
                    };
                    if closed.contains(&successor) {
                        stats.duplicates += 1;
                        continue;
                    }

                    let Some(h) = heuristic(map, &self.distances, &successor.boxes) else {
                        stats.pruned_infinite += 1;
                        continue;
                    };

                    let child = nodes.len();
                    nodes.push(SearchNode {
                        state: successor,
                        g: g + 1,
                        h,
                        parent: Some((
                            entry.node,
                            Push {
                                from: b,
                                direction: dir,
                            },
                        )),
                    });
                    open.push(OpenEntry {
                        f: g + 1 + h,
                        g: g + 1,
                        node: child,
                    });
                }
            }
        }

        stats.elapsed = started.elapsed();
        info!(
            "no solution: {} states expanded, {} deadlocks pruned",
            stats.expanded, stats.pruned_deadlock
        );
        Ok(SolveResult::Unsolvable(stats))
    }
}

fn push_chain(nodes: &[SearchNode], mut node: usize) -> Vec<Push> {
    let mut pushes = Vec::new();
    while let Some((parent, push)) = nodes[node].parent {
        pushes.push(push);
        node = parent;
    }
    pushes.reverse();
    pushes
}

/// Solves `instance` without a budget.
pub fn solve(instance: &PuzzleInstance) -> Result<SolveResult> {
    solve_with(instance, &SolverConfig::default())
}

pub fn solve_with(instance: &PuzzleInstance, config: &SolverConfig) -> Result<SolveResult> {
    SokobanSolver::new(instance)?.solve(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::parse_level;
    use crate::moves::replay;

    #[test]
    fn test_open_order_prefers_low_f_then_deep_g() {
        let mut open = BinaryHeap::new();
        open.push(OpenEntry { f: 5, g: 1, node: 0 });
        open.push(OpenEntry { f: 4, g: 0, node: 1 });
        open.push(OpenEntry { f: 4, g: 3, node: 2 });
        open.push(OpenEntry { f: 4, g: 3, node: 3 });
        let order: Vec<usize> = std::iter::from_fn(|| open.pop().map(|e| e.node)).collect();
        assert_eq!(order, vec![2, 3, 1, 0]);
    }

    #[test]
    fn test_single_push() {
        let instance = parse_level("#####\n#@$.#\n#####").unwrap();
        let result = solve(&instance).unwrap();
        let solution = result.solution().unwrap();
        assert_eq!(solution.moves, "R");
        assert_eq!(solution.pushes, 1);
    }

    #[test]
    fn test_already_solved() {
        let instance = parse_level("#####\n#@ *#\n#####").unwrap();
        let result = solve(&instance).unwrap();
        let solution = result.solution().unwrap();
        assert_eq!(solution.pushes, 0);
        assert!(solution.moves.is_empty());
        assert_eq!(solution.stats.expanded, 0);
    }

    #[test]
    fn test_walk_around_before_push() {
        let instance = parse_level(
            "######\n\
             #    #\n\
             # $@ #\n\
             # .  #\n\
             #    #\n\
             ######",
        )
        .unwrap();
        let result = solve(&instance).unwrap();
        let solution = result.solution().unwrap();
        assert_eq!(solution.pushes, 1);
        let outcome = replay(&instance, &solution.moves).unwrap();
        assert!(outcome.solved);
        assert_eq!(outcome.pushes, 1);
    }

    #[test]
    fn test_corner_box_is_unsolvable() {
        let instance = parse_level(
            "#####\n\
             #$  #\n\
             #  .#\n\
             # @ #\n\
             #####",
        )
        .unwrap();
        let result = solve(&instance).unwrap();
        assert!(matches!(result, SolveResult::Unsolvable(_)));
        assert_eq!(result.stats().expanded, 0);
        assert_eq!(result.stats().pruned_deadlock, 1);
        assert_eq!(result.stats().pruned_infinite, 0);
    }

    #[test]
    fn test_start_box_without_goal_path_counts_as_infinite() {
        // The box sits against the top wall, free sideways, but no goal is on that row.
        let instance = parse_level(
            "######\n\
             # $  #\n\
             #    #\n\
             #  .@#\n\
             ######",
        )
        .unwrap();
        let result = solve(&instance).unwrap();
        assert!(matches!(result, SolveResult::Unsolvable(_)));
        assert_eq!(result.stats().expanded, 0);
        assert_eq!(result.stats().pruned_deadlock, 0);
        assert_eq!(result.stats().pruned_infinite, 1);
    }

    #[test]
    fn test_goal_found_on_last_budgeted_pop_is_solved() {
        let instance = parse_level("#####\n#@$.#\n#####").unwrap();
        let config = SolverConfig::default().with_max_nodes(1);
        match solve_with(&instance, &config).unwrap() {
            SolveResult::Solved(solution) => {
                assert_eq!(solution.moves, "R");
                assert_eq!(solution.stats.expanded, 1);
            }
            other => panic!("expected a solution, got {:?}", other),
        }
    }

    #[test]
    fn test_player_on_wrong_side_is_unsolvable() {
        let instance = parse_level(
            "#######\n\
             # $@ .#\n\
             #######",
        )
        .unwrap();
        let result = solve(&instance).unwrap();
        match result {
            SolveResult::Unsolvable(stats) => {
                assert_eq!(stats.expanded, 1);
                assert_eq!(stats.pruned_dead_square, 1);
            }
            other => panic!("expected unsolvable, got {:?}", other),
        }
    }

    #[test]
    fn test_node_budget_times_out() {
        let instance = parse_level(
            "########\n\
             #  . . #\n\
             # $$$$ #\n\
             # .  . #\n\
             #  @   #\n\
             ########",
        )
        .unwrap();
        let config = SolverConfig::default().with_max_nodes(1);
        let result = solve_with(&instance, &config).unwrap();
        match result {
            SolveResult::TimedOut(stats) => assert_eq!(stats.expanded, 1),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let instance = parse_level("#####\n#@$.#\n#####").unwrap();
        let config = SolverConfig {
            max_nodes: Some(0),
            time_limit_ms: None,
        };
        assert!(matches!(
            solve_with(&instance, &config),
            Err(SolverError::Config(_))
        ));
    }
}
