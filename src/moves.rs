//! Turning push sequences into full move strings, and replaying move strings.

use crate::error::{Result, SolverError};
use crate::map::{all_on_goals, has_box, BoxVec, Cell, Direction, PuzzleInstance};
use crate::reach::Reach;

/// One box push: the box at `from` moves one cell in `direction`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Push {
    pub from: Cell,
    pub direction: Direction,
}

impl Push {
    /// Cell the player stands on to perform the push.
    #[inline(always)]
    pub fn player_cell(&self) -> Cell {
        self.from.step(self.direction.opposite())
    }

    #[inline(always)]
    pub fn destination(&self) -> Cell {
        self.from.step(self.direction)
    }
}

fn move_box(boxes: &mut BoxVec, from: Cell, to: Cell) -> bool {
    match boxes.binary_search(&from) {
        Ok(idx) => {
            boxes[idx] = to;
            boxes.sort_unstable();
            true
        }
        Err(_) => false,
    }
}

/// Expands `pushes` into walk and push letters, starting from the instance's
/// real player cell. Each walk is a shortest path around the current boxes.
pub fn reconstruct(instance: &PuzzleInstance, pushes: &[Push]) -> Result<String> {
    let map = instance.map();
    let mut player = instance.player();
    let mut boxes: BoxVec = instance.boxes().iter().copied().collect();
    let mut moves = String::new();

    for (step, push) in pushes.iter().enumerate() {
        let target = push.player_cell();
        let walk = Reach::compute(map, &boxes, player)
            .path_to(target)
            .ok_or_else(|| SolverError::InvalidMove {
                step,
                reason: format!("push position {} unreachable from {}", target, player),
            })?;
        moves.extend(walk.into_iter().map(Direction::letter));

        let dest = push.destination();
        if map.is_wall(dest) || has_box(&boxes, dest) || !move_box(&mut boxes, push.from, dest) {
            return Err(SolverError::InvalidMove {
                step,
                reason: format!("cannot push box at {} {:?}", push.from, push.direction),
            });
        }
        moves.push(push.direction.letter());
        player = push.from;
    }

    Ok(moves)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub player: Cell,
    pub boxes: BoxVec,
    pub moves: usize,
    pub pushes: usize,
    pub solved: bool,
}

/// Plays `moves` from the start of `instance`, rejecting any illegal step.
pub fn replay(instance: &PuzzleInstance, moves: &str) -> Result<ReplayOutcome> {
    let map = instance.map();
    let mut player = instance.player();
    let mut boxes: BoxVec = instance.boxes().iter().copied().collect();
    let mut pushes = 0;
    let mut count = 0;

    for (step, ch) in moves.chars().enumerate() {
        let dir = Direction::from_letter(ch).ok_or_else(|| SolverError::InvalidMove {
            step,
            reason: format!("unknown move {:?}", ch),
        })?;
        let next = player.step(dir);
        if map.is_wall(next) {
            return Err(SolverError::InvalidMove {
                step,
                reason: format!("walks into wall at {}", next),
            });
        }
        if has_box(&boxes, next) {
            let dest = next.step(dir);
            if map.is_wall(dest) || has_box(&boxes, dest) {
                return Err(SolverError::InvalidMove {
                    step,
                    reason: format!("box at {} is blocked", next),
                });
            }
            move_box(&mut boxes, next, dest);
            pushes += 1;
        }
        player = next;
        count += 1;
    }

    let solved = all_on_goals(map, &boxes);
    Ok(ReplayOutcome {
        player,
        boxes,
        moves: count,
        pushes,
        solved,
    })
}
