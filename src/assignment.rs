//! Minimum-cost perfect matching of boxes to goals.
//!
//! Every solution sends each box to a distinct goal, and a lone box needs at
//! least its table distance to get there, so the cheapest matching never
//! exceeds the pushes still required. Pairs without a finite distance get a
//! cost larger than any finite matching; if the optimum has to use one, the
//! state cannot be solved and the heuristic is `None`.

use smallvec::SmallVec;

use crate::map::{all_on_goals, Cell, Map};
use crate::precompute::DistanceTable;

/// Cost standing in for an unreachable pair. Any finite assignment of up to
/// `u16::MAX` boxes with `u16` distances stays far below it.
const FORBIDDEN: i64 = 1 << 40;

/// Square cost matrix, row-major, `None` for forbidden pairs.
#[derive(Clone, Debug)]
pub struct CostMatrix {
    n: usize,
    costs: Vec<Option<u32>>,
}

impl CostMatrix {
    pub fn new(n: usize) -> Self {
        CostMatrix {
            n,
            costs: vec![None; n * n],
        }
    }

    /// Box-by-goal matrix for `boxes`, rows in box order, columns in goal order.
    pub fn from_distances(table: &DistanceTable, boxes: &[Cell]) -> Self {
        let n = boxes.len();
        let mut matrix = CostMatrix::new(n);
        for (i, &b) in boxes.iter().enumerate() {
            for goal in 0..table.goal_count().min(n) {
                matrix.set(i, goal, table.get(b, goal));
            }
        }
        matrix
    }

    pub fn size(&self) -> usize {
        self.n
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        self.costs[row * self.n + col]
    }

    #[inline(always)]
    pub fn set(&mut self, row: usize, col: usize, cost: Option<u32>) {
        self.costs[row * self.n + col] = cost;
    }

    #[inline(always)]
    fn weight(&self, row: usize, col: usize) -> i64 {
        self.get(row, col).map_or(FORBIDDEN, i64::from)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// Total cost, `None` if every perfect matching uses a forbidden pair.
    pub cost: Option<u32>,
    /// Column chosen for each row.
    pub columns: SmallVec<[usize; 16]>,
}

/// Hungarian method with row/column potentials, O(n³).
pub fn solve_assignment(matrix: &CostMatrix) -> Assignment {
    let n = matrix.size();
    if n == 0 {
        return Assignment {
            cost: Some(0),
            columns: SmallVec::new(),
        };
    }

    // 1-based potentials; column 0 is the virtual start of each augmenting path.
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; n + 1];
    let mut row_of_col = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];
    let mut min_slack = vec![i64::MAX; n + 1];
    let mut used = vec![false; n + 1];

    for row in 1..=n {
        row_of_col[0] = row;
        let mut col0 = 0usize;
        min_slack.fill(i64::MAX);
        used.fill(false);

        loop {
            used[col0] = true;
            let row0 = row_of_col[col0];
            let mut delta = i64::MAX;
            let mut col1 = 0usize;

            for col in 1..=n {
                if used[col] {
                    continue;
                }
                let reduced = matrix.weight(row0 - 1, col - 1) - u[row0] - v[col];
                if reduced < min_slack[col] {
                    min_slack[col] = reduced;
                    way[col] = col0;
                }
                if min_slack[col] < delta {
                    delta = min_slack[col];
                    col1 = col;
                }
            }

            for col in 0..=n {
                if used[col] {
                    u[row_of_col[col]] += delta;
                    v[col] -= delta;
                } else {
                    min_slack[col] -= delta;
                }
            }

            col0 = col1;
            if row_of_col[col0] == 0 {
                break;
            }
        }

        loop {
            let col1 = way[col0];
            row_of_col[col0] = row_of_col[col1];
            col0 = col1;
            if col0 == 0 {
                break;
            }
        }
    }

    let mut columns: SmallVec<[usize; 16]> = SmallVec::from_elem(0, n);
    for col in 1..=n {
        if row_of_col[col] != 0 {
            columns[row_of_col[col] - 1] = col - 1;
        }
    }

    let mut total: u64 = 0;
    let mut feasible = true;
    for (row, &col) in columns.iter().enumerate() {
        match matrix.get(row, col) {
            Some(cost) => total += u64::from(cost),
            None => feasible = false,
        }
    }

    Assignment {
        cost: if feasible {
            u32::try_from(total).ok()
        } else {
            None
        },
        columns,
    }
}

/// Lower bound on the remaining pushes for `boxes`; `None` if unsolvable.
pub fn heuristic(map: &Map, table: &DistanceTable, boxes: &[Cell]) -> Option<u32> {
    if all_on_goals(map, boxes) {
        return Some(0);
    }

    // A box with no reachable goal at all sinks the matching; skip the O(n³) pass.
    let goals = table.goal_count();
    if boxes
        .iter()
        .any(|&b| (0..goals).all(|g| table.get(b, g).is_none()))
    {
        return None;
    }

    solve_assignment(&CostMatrix::from_distances(table, boxes)).cost
}
