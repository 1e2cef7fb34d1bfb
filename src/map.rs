//! Static puzzle geometry and validated puzzle instances.

use std::fmt;

use smallvec::SmallVec;

use crate::error::{Result, SolverError};

/// Largest accepted grid side. Keeps every `step` of an in-grid cell inside `i16`.
pub const MAX_DIM: usize = 4096;

/// Sorted, duplicate-free box cells. Inline storage covers typical levels.
pub type BoxVec = SmallVec<[Cell; 16]>;

// Compact cell using i16 for better cache performance
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Cell {
    pub row: i16,
    pub col: i16,
}

impl Cell {
    #[inline(always)]
    pub const fn new(row: i16, col: i16) -> Self {
        Cell { row, col }
    }

    #[inline(always)]
    pub fn step(self, dir: Direction) -> Self {
        let (drow, dcol) = dir.offset();
        Cell::new(self.row + drow, self.col + dcol)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    #[inline(always)]
    pub const fn offset(self) -> (i16, i16) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    #[inline(always)]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub const fn from_index(idx: u8) -> Self {
        Direction::ALL[(idx & 3) as usize]
    }

    pub const fn letter(self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }

    /// Accepts both cases; lower case is the usual LURD spelling of a walk.
    pub fn from_letter(ch: char) -> Option<Self> {
        match ch.to_ascii_uppercase() {
            'U' => Some(Direction::Up),
            'D' => Some(Direction::Down),
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Grid dimensions and row-major indexing shared by every per-cell table.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Dims {
    pub rows: i16,
    pub cols: i16,
}

impl Dims {
    #[inline(always)]
    pub fn contains(self, cell: Cell) -> bool {
        cell.row >= 0 && cell.row < self.rows && cell.col >= 0 && cell.col < self.cols
    }

    #[inline(always)]
    pub fn index(self, cell: Cell) -> Option<usize> {
        if self.contains(cell) {
            Some(cell.row as usize * self.cols as usize + cell.col as usize)
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn cell(self, idx: usize) -> Cell {
        let cols = self.cols as usize;
        Cell::new((idx / cols) as i16, (idx % cols) as i16)
    }

    #[inline(always)]
    pub fn len(self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

const NO_GOAL: u16 = u16::MAX;

/// Immutable walls, goals and dimensions of a level. Cells outside the grid
/// behave like walls.
#[derive(Clone, Debug)]
pub struct Map {
    dims: Dims,
    walls: Vec<bool>,
    goal_ids: Vec<u16>,
    goals: Vec<Cell>,
}

impl Map {
    pub fn new(
        rows: usize,
        cols: usize,
        walls: impl IntoIterator<Item = Cell>,
        goals: impl IntoIterator<Item = Cell>,
    ) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(SolverError::EmptyMap);
        }
        if rows > MAX_DIM || cols > MAX_DIM {
            return Err(SolverError::TooLarge { rows, cols });
        }

        let dims = Dims {
            rows: rows as i16,
            cols: cols as i16,
        };
        let mut wall_grid = vec![false; dims.len()];
        for cell in walls {
            let idx = dims.index(cell).ok_or(SolverError::Blocked { cell })?;
            wall_grid[idx] = true;
        }

        let mut goal_ids = vec![NO_GOAL; dims.len()];
        let mut goal_list = Vec::new();
        for cell in goals {
            let idx = dims.index(cell).ok_or(SolverError::Blocked { cell })?;
            if wall_grid[idx] {
                return Err(SolverError::Blocked { cell });
            }
            if goal_ids[idx] != NO_GOAL {
                return Err(SolverError::Overlap { cell });
            }
            if goal_list.len() >= NO_GOAL as usize {
                return Err(SolverError::TooLarge { rows, cols });
            }
            goal_ids[idx] = goal_list.len() as u16;
            goal_list.push(cell);
        }

        Ok(Map {
            dims,
            walls: wall_grid,
            goal_ids,
            goals: goal_list,
        })
    }

    #[inline(always)]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn rows(&self) -> usize {
        self.dims.rows as usize
    }

    pub fn cols(&self) -> usize {
        self.dims.cols as usize
    }

    #[inline(always)]
    pub fn is_wall(&self, cell: Cell) -> bool {
        match self.dims.index(cell) {
            Some(idx) => self.walls[idx],
            None => true,
        }
    }

    #[inline(always)]
    pub fn is_floor(&self, cell: Cell) -> bool {
        !self.is_wall(cell)
    }

    #[inline(always)]
    pub fn is_goal(&self, cell: Cell) -> bool {
        self.goal_index(cell).is_some()
    }

    #[inline(always)]
    pub fn goal_index(&self, cell: Cell) -> Option<usize> {
        let idx = self.dims.index(cell)?;
        match self.goal_ids[idx] {
            NO_GOAL => None,
            id => Some(id as usize),
        }
    }

    pub fn goals(&self) -> &[Cell] {
        &self.goals
    }

    pub fn floor_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.walls
            .iter()
            .enumerate()
            .filter(|&(_, &wall)| !wall)
            .map(|(idx, _)| self.dims.cell(idx))
    }
}

#[inline(always)]
pub fn has_box(boxes: &[Cell], cell: Cell) -> bool {
    boxes.binary_search(&cell).is_ok()
}

#[inline(always)]
pub fn all_on_goals(map: &Map, boxes: &[Cell]) -> bool {
    boxes.iter().all(|&b| map.is_goal(b))
}

/// A map plus the starting player and boxes, validated on construction.
#[derive(Clone, Debug)]
pub struct PuzzleInstance {
    map: Map,
    player: Cell,
    boxes: BoxVec,
}

impl PuzzleInstance {
    pub fn new(map: Map, player: Cell, boxes: impl IntoIterator<Item = Cell>) -> Result<Self> {
        let mut boxes: BoxVec = boxes.into_iter().collect();
        boxes.sort_unstable();

        if boxes.is_empty() {
            return Err(SolverError::NoBoxes);
        }
        if boxes.len() != map.goals().len() {
            return Err(SolverError::BoxGoalMismatch {
                boxes: boxes.len(),
                goals: map.goals().len(),
            });
        }
        if map.is_wall(player) {
            return Err(SolverError::Blocked { cell: player });
        }
        if let Some(&cell) = boxes.iter().find(|&&b| map.is_wall(b)) {
            return Err(SolverError::Blocked { cell });
        }
        if let Some(pair) = boxes.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(SolverError::Overlap { cell: pair[0] });
        }
        if has_box(&boxes, player) {
            return Err(SolverError::Overlap { cell: player });
        }

        Ok(PuzzleInstance { map, player, boxes })
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn player(&self) -> Cell {
        self.player
    }

    pub fn boxes(&self) -> &[Cell] {
        &self.boxes
    }

    pub fn is_solved(&self) -> bool {
        all_on_goals(&self.map, &self.boxes)
    }
}
