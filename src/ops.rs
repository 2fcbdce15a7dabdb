//! Column operation library.
//!
//! Stateless, deterministic functions over [`Column`]s and [`Dataset`]s. Each
//! operation documents the column types it accepts and the type of the column
//! it produces; the dispatcher in [`crate::engine`] checks the preconditions
//! before calling in, so the functions here are total over their inputs.
//!
//! Per-cell failures (a value that does not parse, a row where an expression
//! cannot be evaluated) never abort an operation. The cell becomes null and
//! the number of such cells is reported back in a [`Transformed`].
//!
//! [`Dataset`]: crate::dataset::Dataset

pub mod coerce;
pub mod derive;
pub mod fill;
pub mod outliers;
pub mod replace;
pub mod rows;
pub mod stats;
pub mod text;

use crate::dataset::Column;

/// A column produced by an operation together with the number of non-null
/// input cells that degraded to null along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub column: Column,
    pub nulled: usize,
}

impl Transformed {
    pub fn clean(column: Column) -> Self {
        Self { column, nulled: 0 }
    }
}
