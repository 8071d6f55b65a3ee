//! N-Queens problem test fixtures.
//!
//! Provides a complete N-Queens model for testing score directors. The
//! N-Queens problem places N queens on an N×N chessboard such that no two
//! queens threaten each other. Each queen's row is a basic planning variable.
//!
//! # Example
//!
//! ```
//! use planwright_test::nqueens::{calculate_conflicts, NQueensSolution};
//! use planwright_core::score::SimpleScore;
//!
//! let solution = NQueensSolution::with_rows(&[0, 2, 1, 3]);
//! assert_eq!(calculate_conflicts(&solution), SimpleScore::of(-2));
//! ```

use planwright_core::domain::{
    EntityDescriptor, PlanningIdValue, PlanningSolution, SolutionDescriptor, VariableDescriptor,
    VariableId,
};
use planwright_core::score::SimpleScore;

/// The `row` variable of the `Queen` entity.
pub const ROW: VariableId = VariableId::new(0, 0);

/// A queen entity in the N-Queens problem.
///
/// Each queen has:
/// - `id`: Unique identifier (typically the column index)
/// - `column`: The column position on the board (fixed/problem fact)
/// - `row`: The row position (planning variable, None if unassigned)
#[derive(Clone, Debug, PartialEq)]
pub struct Queen {
    pub id: i64,
    pub column: i64,
    pub row: Option<i64>,
}

impl Queen {
    /// Creates a new queen at the given column with an optional row.
    pub fn new(id: i64, column: i64, row: Option<i64>) -> Self {
        Self { id, column, row }
    }

    /// Creates a queen with no row assigned.
    pub fn unassigned(id: i64, column: i64) -> Self {
        Self::new(id, column, None)
    }
}

/// N-Queens problem solution.
#[derive(Clone, Debug)]
pub struct NQueensSolution {
    pub queens: Vec<Queen>,
    pub score: Option<SimpleScore>,
}

impl NQueensSolution {
    /// Creates an N-Queens solution with n uninitialized queens.
    ///
    /// Queens are placed in columns 0..n with no row assigned.
    pub fn uninitialized(n: usize) -> Self {
        let queens = (0..n)
            .map(|i| Queen::unassigned(i as i64, i as i64))
            .collect();
        Self {
            queens,
            score: None,
        }
    }

    /// Creates an N-Queens solution with queens at the specified rows.
    pub fn with_rows(rows: &[i64]) -> Self {
        let optional: Vec<Option<i64>> = rows.iter().copied().map(Some).collect();
        Self::with_optional_rows(&optional)
    }

    /// Creates an N-Queens solution with optional rows.
    pub fn with_optional_rows(rows: &[Option<i64>]) -> Self {
        let queens = rows
            .iter()
            .enumerate()
            .map(|(i, &row)| Queen::new(i as i64, i as i64, row))
            .collect();
        Self {
            queens,
            score: None,
        }
    }
}

impl PlanningSolution for NQueensSolution {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

/// Gets the row value for a queen at the given index.
///
/// This is the typed getter for the planning variable.
pub fn get_queen_row(s: &NQueensSolution, idx: usize) -> Option<i64> {
    s.queens.get(idx).and_then(|q| q.row)
}

/// Sets the row value for a queen at the given index.
///
/// This is the typed setter for the planning variable.
pub fn set_queen_row(s: &mut NQueensSolution, idx: usize, v: Option<i64>) {
    if let Some(queen) = s.queens.get_mut(idx) {
        queen.row = v;
    }
}

/// Calculates the number of conflicts in an N-Queens solution.
///
/// Counts row conflicts and diagonal conflicts between all pairs of assigned
/// queens. Returns a negative score where 0 means no conflicts (optimal).
pub fn calculate_conflicts(solution: &NQueensSolution) -> SimpleScore {
    SimpleScore::of(-(conflicting_pairs(solution).len() as i64))
}

/// Index pairs of queens that attack each other, once per attack kind.
pub fn conflicting_pairs(solution: &NQueensSolution) -> Vec<(usize, usize)> {
    let queens = &solution.queens;
    let mut pairs = Vec::new();

    for i in 0..queens.len() {
        for j in (i + 1)..queens.len() {
            if let (Some(row_i), Some(row_j)) = (queens[i].row, queens[j].row) {
                // Row conflict: two queens on the same row
                if row_i == row_j {
                    pairs.push((i, j));
                }
                // Diagonal conflict: difference in rows equals difference in columns
                let col_diff = (queens[j].column - queens[i].column).abs();
                if (row_i - row_j).abs() == col_diff {
                    pairs.push((i, j));
                }
            }
        }
    }
    pairs
}

/// Describes `NQueensSolution`: one `Queen` entity type with a `row` variable.
pub fn nqueens_descriptor() -> SolutionDescriptor<NQueensSolution> {
    SolutionDescriptor::builder("NQueensSolution")
        .with_entity(
            EntityDescriptor::new("Queen", |s: &NQueensSolution| s.queens.len())
                .with_planning_id(|s: &NQueensSolution, i| {
                    Some(PlanningIdValue::Int(s.queens[i].id))
                })
                .with_identity(|s: &NQueensSolution, i| &s.queens[i] as *const Queen as usize)
                .with_variable(VariableDescriptor::basic("row", |s: &NQueensSolution, i| {
                    s.queens[i].row.is_some()
                })),
        )
        .build()
        .expect("the N-Queens descriptor is valid")
}
