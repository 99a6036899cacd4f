pub use crate::config::*;

/// A builder for assembling tables row by row.
///
/// ```
/// pub use ics_gis::builder::Builder;
/// # use ics_gis::TransformError;
///
/// let table = Builder::new(&["Division", "Facility"])
///     .row(&["45 - Jefferson", "HQ"])?
///     .row(&["Not Set", "Depot"])?
///     .build();
///
/// assert_eq!(table.len(), 2);
/// # Ok::<(), TransformError>(())
/// ```
pub struct Builder {
    pub(crate) _table: Table,
}

impl Builder {
    pub fn new(columns: &[&str]) -> Builder {
        Builder {
            _table: Table::new(columns),
        }
    }

    /// Adds a row. The number of cells must match the number of columns.
    pub fn row(mut self, cells: &[&str]) -> Result<Builder, TransformError> {
        self.add_row(cells)?;
        Ok(self)
    }

    pub fn add_row(&mut self, cells: &[&str]) -> Result<(), TransformError> {
        if cells.len() != self._table.columns.len() {
            return Err(TransformError::RowWidth {
                row: self._table.rows.len() + 1,
                expected: self._table.columns.len(),
                found: cells.len(),
            });
        }
        self._table
            .rows
            .push(cells.iter().map(|s| s.to_string()).collect());
        Ok(())
    }

    pub fn build(self) -> Table {
        self._table
    }
}
