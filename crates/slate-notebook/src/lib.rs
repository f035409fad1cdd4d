//! Slate notebook engine.
//!
//! A notebook is an ordered sequence of cells sharing one persistent
//! [`Environment`](slate_eval::Environment): running a cell executes its
//! source as a slate program, captures its print output (or auto-prints
//! its final expression), and records the outcome on the cell. A faulting
//! cell keeps its partial environment mutations and never takes down the
//! session.
//!
//! ```
//! use slate_notebook::Session;
//!
//! let mut session = Session::new();
//! let a = session.cells()[0].id;
//! let b = session.add_cell();
//! session.run_cell(a, "x = 10").unwrap();
//! let cell = session.run_cell(b, "x + 5").unwrap();
//! assert_eq!(cell.output, "15");
//! ```

mod cell;
mod executor;
mod session;

pub use cell::{Cell, CellId, CellStatus};
pub use executor::{run, ExecutionResult, RunStatus};
pub use session::{Session, SessionError};
