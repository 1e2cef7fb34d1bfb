//! Freeze deadlocks: boxes that can never be pushed again.
//!
//! Pushing a box along an axis needs both neighbours on that axis free, one for
//! the player and one for the box. A neighbour blocks the axis if it is a wall
//! or a box that is itself frozen on the other axis (it could only clear the
//! way by moving sideways). Labels start at "frozen" and are withdrawn from
//! boxes that lose support until nothing changes, so mutually supporting
//! groups such as 2x2 blocks stay frozen.

use smallvec::SmallVec;

use crate::map::{Cell, Direction, Map};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    const fn directions(self) -> [Direction; 2] {
        match self {
            Axis::Horizontal => [Direction::Left, Direction::Right],
            Axis::Vertical => [Direction::Up, Direction::Down],
        }
    }

    const fn index(self) -> usize {
        match self {
            Axis::Horizontal => 0,
            Axis::Vertical => 1,
        }
    }

    const fn other(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

type Flags = SmallVec<[bool; 16]>;

/// Whether each box of the sorted `boxes` is frozen on both axes.
pub fn frozen_boxes(map: &Map, boxes: &[Cell]) -> Flags {
    let n = boxes.len();
    let mut frozen: [Flags; 2] = [SmallVec::from_elem(true, n), SmallVec::from_elem(true, n)];

    loop {
        let mut changed = false;
        for (i, &b) in boxes.iter().enumerate() {
            for axis in [Axis::Horizontal, Axis::Vertical] {
                if !frozen[axis.index()][i] {
                    continue;
                }
                let blocked = axis.directions().iter().any(|&dir| {
                    let neighbour = b.step(dir);
                    if map.is_wall(neighbour) {
                        return true;
                    }
                    match boxes.binary_search(&neighbour) {
                        Ok(j) => frozen[axis.other().index()][j],
                        Err(_) => false,
                    }
                });
                if !blocked {
                    frozen[axis.index()][i] = false;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    let [horizontal, vertical] = frozen;
    horizontal
        .iter()
        .zip(vertical.iter())
        .map(|(&h, &v)| h && v)
        .collect()
}

/// True if some box that can never move again is off goal.
pub fn is_freeze_deadlock(map: &Map, boxes: &[Cell]) -> bool {
    frozen_boxes(map, boxes)
        .iter()
        .zip(boxes)
        .any(|(&frozen, &b)| frozen && !map.is_goal(b))
}
