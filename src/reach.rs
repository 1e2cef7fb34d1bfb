//! Player reachability with boxes as obstacles.

use std::collections::VecDeque;

use crate::map::{has_box, Cell, Direction, Map};

const UNSEEN: u8 = u8::MAX;
const ORIGIN: u8 = 4;

/// Breadth-first flood from one player cell. Records the direction used to
/// enter each reached cell so shortest walks can be read back.
pub struct Reach<'a> {
    map: &'a Map,
    start: Cell,
    came_from: Vec<u8>,
    normalized: Cell,
    count: usize,
}

impl<'a> Reach<'a> {
    pub fn compute(map: &'a Map, boxes: &[Cell], start: Cell) -> Self {
        let dims = map.dims();
        let mut came_from = vec![UNSEEN; dims.len()];
        let mut normalized = start;
        let mut count = 0;

        if let Some(idx) = dims.index(start) {
            came_from[idx] = ORIGIN;
            count = 1;

            let mut queue = VecDeque::with_capacity(64);
            queue.push_back(start);

            while let Some(current) = queue.pop_front() {
                if current < normalized {
                    normalized = current;
                }
                for dir in Direction::ALL {
                    let next = current.step(dir);
                    if map.is_wall(next) || has_box(boxes, next) {
                        continue;
                    }
                    let Some(next_idx) = dims.index(next) else {
                        continue;
                    };
                    if came_from[next_idx] == UNSEEN {
                        came_from[next_idx] = dir.index() as u8;
                        count += 1;
                        queue.push_back(next);
                    }
                }
            }
        }

        Reach {
            map,
            start,
            came_from,
            normalized,
            count,
        }
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    /// Lexicographically smallest reachable cell; identifies the region.
    pub fn normalized(&self) -> Cell {
        self.normalized
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline(always)]
    pub fn contains(&self, cell: Cell) -> bool {
        match self.map.dims().index(cell) {
            Some(idx) => self.came_from[idx] != UNSEEN,
            None => false,
        }
    }

    /// Shortest walk from the start to `target`, or `None` if unreachable.
    pub fn path_to(&self, target: Cell) -> Option<Vec<Direction>> {
        let dims = self.map.dims();
        let mut idx = dims.index(target)?;
        if self.came_from[idx] == UNSEEN {
            return None;
        }

        let mut path = Vec::new();
        let mut current = target;
        while self.came_from[idx] != ORIGIN {
            let dir = Direction::from_index(self.came_from[idx]);
            path.push(dir);
            current = current.step(dir.opposite());
            idx = dims.index(current)?;
        }
        path.reverse();
        Some(path)
    }
}

/// Canonical player cell for the region reachable from `player`.
pub fn normalize(map: &Map, boxes: &[Cell], player: Cell) -> Cell {
    Reach::compute(map, boxes, player).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::parse_level;

    #[test]
    fn test_boxes_split_regions() {
        let instance = parse_level(
            "#######\n\
             #  #  #\n\
             # @$. #\n\
             #  #  #\n\
             #######",
        )
        .unwrap();
        let reach = Reach::compute(instance.map(), instance.boxes(), instance.player());
        assert_eq!(reach.len(), 6);
        assert!(reach.contains(Cell::new(1, 1)));
        assert!(!reach.contains(Cell::new(2, 4)));
        assert!(!reach.contains(Cell::new(2, 3)));
        assert_eq!(reach.normalized(), Cell::new(1, 1));
    }

    #[test]
    fn test_path_is_shortest() {
        let instance = parse_level(
            "######\n\
             #@   #\n\
             # ## #\n\
             #   $#\n\
             #.   #\n\
             ######",
        )
        .unwrap();
        let reach = Reach::compute(instance.map(), instance.boxes(), instance.player());
        let path = reach.path_to(Cell::new(4, 4)).unwrap();
        assert_eq!(path.len(), 6);

        let mut cell = instance.player();
        for dir in path {
            cell = cell.step(dir);
            assert!(instance.map().is_floor(cell));
            assert!(!has_box(instance.boxes(), cell));
        }
        assert_eq!(cell, Cell::new(4, 4));
        assert_eq!(reach.path_to(instance.player()), Some(Vec::new()));
        assert_eq!(reach.path_to(Cell::new(3, 4)), None);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let instance = parse_level(
            "#######\n\
             #.    #\n\
             #  $  #\n\
             #    @#\n\
             #######",
        )
        .unwrap();
        let map = instance.map();
        let boxes = instance.boxes();
        let once = normalize(map, boxes, instance.player());
        assert_eq!(once, Cell::new(1, 1));
        assert_eq!(normalize(map, boxes, once), once);

        for cell in map.floor_cells().filter(|&c| !has_box(boxes, c)) {
            assert_eq!(normalize(map, boxes, cell), once);
        }
    }
}
