//! A notebook session: one cell sequence plus one shared environment.

use crate::cell::{Cell, CellId};
use crate::executor;
use slate_eval::Environment;
use thiserror::Error;
use tracing::{debug, info};

/// Refused session operations. These are signalled no-ops: the session
/// state is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The addressed cell does not exist (it may have been deleted).
    #[error("unknown {0}")]
    UnknownCell(CellId),
    /// Deleting the sole remaining cell would empty the sequence.
    #[error("cannot delete the last remaining cell")]
    LastCell,
}

/// One user's notebook: an ordered cell sequence and the environment all
/// cell runs share. Mutations one cell applies are visible to every cell
/// run after it, until [`Session::reset`].
///
/// The sequence always holds at least one cell.
pub struct Session {
    env: Environment,
    cells: Vec<Cell>,
    next_id: u64,
}

impl Session {
    /// A fresh session: prelude environment, one empty cell.
    pub fn new() -> Self {
        let mut session = Self {
            env: Environment::with_prelude(),
            cells: Vec::new(),
            next_id: 0,
        };
        session.append_fresh_cell();
        session
    }

    /// The cells in display and execution order. Presentation layers
    /// re-read this after every operation.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The shared execution environment.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Append a fresh empty cell. Always succeeds; returns the new id.
    pub fn add_cell(&mut self) -> CellId {
        let id = self.append_fresh_cell();
        debug!(cell = %id, "cell added");
        id
    }

    /// Delete a cell by id. Refused if it is the last remaining cell.
    pub fn delete_cell(&mut self, id: CellId) -> Result<(), SessionError> {
        let index = self.cell_index(id)?;
        if self.cells.len() == 1 {
            return Err(SessionError::LastCell);
        }
        self.cells.remove(index);
        debug!(cell = %id, "cell deleted");
        Ok(())
    }

    /// Persist `source` on the cell and execute it against the shared
    /// environment. A whitespace-only source only persists; the cell's
    /// prior result is untouched.
    pub fn run_cell(&mut self, id: CellId, source: &str) -> Result<&Cell, SessionError> {
        let index = self.cell_index(id)?;
        self.cells[index].source = source.to_string();
        if !source.trim().is_empty() {
            let result = executor::run(source, &mut self.env);
            info!(
                cell = %id,
                status = ?result.status,
                duration_secs = result.duration_secs,
                "cell run"
            );
            self.cells[index].apply(result);
        }
        Ok(&self.cells[index])
    }

    /// Run every cell with a non-whitespace source, in order.
    ///
    /// One cell's fault does not halt later cells; later cells observe
    /// whatever bindings earlier cells applied, including partial
    /// bindings left by a cell that faulted midway.
    pub fn run_all(&mut self) {
        info!(cells = self.cells.len(), "run all");
        for index in 0..self.cells.len() {
            let source = self.cells[index].source.clone();
            if source.trim().is_empty() {
                continue;
            }
            let result = executor::run(&source, &mut self.env);
            info!(
                cell = %self.cells[index].id,
                status = ?result.status,
                duration_secs = result.duration_secs,
                "cell run"
            );
            self.cells[index].apply(result);
        }
    }

    /// Reset one cell's result to the never-run baseline. Source text and
    /// the environment are untouched. Idempotent.
    pub fn clear_cell(&mut self, id: CellId) -> Result<(), SessionError> {
        let index = self.cell_index(id)?;
        self.cells[index].clear();
        Ok(())
    }

    /// [`Session::clear_cell`] over every cell.
    pub fn clear_all(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Full reset: the sequence becomes one fresh cell and the
    /// environment is reinitialized to the prelude defaults. The two
    /// resets are coupled; a sequence-only reset is not offered.
    pub fn reset(&mut self) {
        info!("session reset");
        self.cells.clear();
        self.append_fresh_cell();
        self.env = Environment::with_prelude();
    }

    fn append_fresh_cell(&mut self) -> CellId {
        let id = CellId(self.next_id);
        self.next_id += 1;
        self.cells.push(Cell::fresh(id));
        id
    }

    fn cell_index(&self, id: CellId) -> Result<usize, SessionError> {
        self.cells
            .iter()
            .position(|cell| cell.id == id)
            .ok_or(SessionError::UnknownCell(id))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
