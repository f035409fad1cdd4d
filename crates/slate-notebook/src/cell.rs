//! Notebook cells: one unit of source text plus its last run's result.

use crate::executor::{ExecutionResult, RunStatus};
use serde::Serialize;
use std::fmt;

/// Stable cell identity, assigned at creation and never reused within a
/// session. Actions address cells by id, not position, since positions
/// shift as cells are added and deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CellId(pub u64);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell {}", self.0)
    }
}

/// Per-cell run state.
///
/// `NeverRun -> Success | Error` on run, back to `NeverRun` on clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    NeverRun,
    Success,
    Error,
}

/// One notebook cell.
#[derive(Debug, Clone, Serialize)]
pub struct Cell {
    pub id: CellId,
    pub source: String,
    /// Captured output text, or the formatted fault trace when `status`
    /// is `Error`.
    pub output: String,
    pub duration_secs: f64,
    pub status: CellStatus,
}

impl Cell {
    /// A new empty cell in the `NeverRun` baseline.
    pub(crate) fn fresh(id: CellId) -> Self {
        Self {
            id,
            source: String::new(),
            output: String::new(),
            duration_secs: 0.0,
            status: CellStatus::NeverRun,
        }
    }

    /// Reset output, duration, and status; source is preserved.
    pub(crate) fn clear(&mut self) {
        self.output.clear();
        self.duration_secs = 0.0;
        self.status = CellStatus::NeverRun;
    }

    /// Record an execution result on this cell.
    pub(crate) fn apply(&mut self, result: ExecutionResult) {
        self.output = result.output;
        self.duration_secs = result.duration_secs;
        self.status = match result.status {
            RunStatus::Success => CellStatus::Success,
            RunStatus::Error => CellStatus::Error,
        };
    }
}
