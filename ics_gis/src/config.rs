// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A table of text cells, as read from a spreadsheet.
///
/// Every row is expected to have exactly one cell per column. Rows that are
/// shorter are padded with empty cells by the readers.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Table {
        Table {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The index of a column that must be present for a stage to run.
    pub fn require_column(&self, table: &str, name: &str) -> Result<usize, TransformError> {
        self.column_index(name)
            .ok_or_else(|| TransformError::MissingColumn {
                table: table.to_string(),
                column: name.to_string(),
            })
    }

    /// Inserts a column at the given position, filling all the rows with `fill`.
    pub fn insert_column(&mut self, at: usize, name: &str, fill: &str) {
        self.columns.insert(at, name.to_string());
        for row in self.rows.iter_mut() {
            row.insert(at, fill.to_string());
        }
    }

    /// Removes a column and its cells from all the rows.
    pub fn remove_column(&mut self, at: usize) {
        self.columns.remove(at);
        for row in self.rows.iter_mut() {
            if at < row.len() {
                row.remove(at);
            }
        }
    }

    /// Returns the index of the column, appending an empty column at the end if needed.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        match self.column_index(name) {
            Some(idx) => idx,
            None => {
                let at = self.columns.len();
                self.insert_column(at, name, "");
                at
            }
        }
    }

    /// The cell content of a row for a given column, if it exists.
    pub fn cell<'a>(&'a self, row: &'a [String], name: &str) -> Option<&'a str> {
        self.column_index(name)
            .and_then(|idx| row.get(idx))
            .map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ******** Output data structures *********

/// Counters collected while running the pipeline.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TransformStats {
    pub input_rows: usize,
    /// Placeholder rows replaced by one row per governed county.
    pub expanded_rows: usize,
    /// Placeholder rows kept because of the mobile support exemption.
    pub exempted_rows: usize,
    /// Rows appended for facilities that no assignment refers to.
    pub appended_facility_rows: usize,
    /// Assignment rows without a match in the facility reference table.
    pub unmatched_facility_rows: usize,
    pub duplicates_removed: usize,
    /// Governed counties that have no entry in the county reference table.
    pub unknown_counties: Vec<String>,
    pub output_rows: usize,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TransformResult {
    pub table: Table,
    pub stats: TransformStats,
}

/// Errors that abort a transformation run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TransformError {
    /// A column required by one of the stages is absent.
    MissingColumn { table: String, column: String },
    /// A Division value that does not follow the `NN - Name` shape.
    /// The row number is 1-based and counts data rows only.
    MalformedDivision { row: usize, value: String },
    /// A governed county that is not a composite `NN - Name` division.
    MalformedGovernedCounty { value: String },
    /// A row that does not have one cell per column.
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl Error for TransformError {}

impl Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::MissingColumn { table, column } => {
                write!(f, "missing column {:?} in the {} table", column, table)
            }
            TransformError::MalformedDivision { row, value } => write!(
                f,
                "row {}: division {:?} does not follow the 'NN - Name' format",
                row, value
            ),
            TransformError::MalformedGovernedCounty { value } => write!(
                f,
                "governed county {:?} does not follow the 'NN - Name' format",
                value
            ),
            TransformError::RowWidth {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {}: expected {} cells, found {}",
                row, expected, found
            ),
        }
    }
}

// ********* Configuration **********

/// How the facility reference table is merged onto the assignments.
///
/// All policies keep exactly one output row per assignment row. They differ in
/// what happens to the facilities that no assignment refers to.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum FacilityMergePolicy {
    /// Unused facilities are dropped.
    Left,
    /// Unused facilities get a row with only the facility name and type filled.
    Outer,
    /// Unused facilities get a row marked as not assigned, with an address
    /// built from the reference table when available.
    SynthesizeUnmatched,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TransformOptions {
    pub expand_placeholders: bool,
    /// Rows of the mobile emergency response support branch are not expanded.
    pub exempt_mobile_support: bool,
    pub facility_merge_policy: FacilityMergePolicy,
    pub unmatched_facility_type_label: String,
    /// The composite division strings (`NN - Name`) a placeholder row expands to.
    /// When empty, all the counties of the reference table are used.
    pub governed_counties: Vec<String>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        TransformOptions {
            expand_placeholders: true,
            exempt_mobile_support: true,
            facility_merge_policy: FacilityMergePolicy::SynthesizeUnmatched,
            unmatched_facility_type_label: NO_WORK_ASSIGNMENT.to_string(),
            governed_counties: Vec::new(),
        }
    }
}

// ********* Column names and sentinels **********

pub const DIVISION: &str = "Division";
pub const COUNTY: &str = "County";
pub const BRANCH: &str = "Branch";
pub const FACILITY: &str = "Facility";
pub const FACILITY_TYPE: &str = "Facility Type";
pub const FACILITY_NAME: &str = "Facility Name";
pub const ADDRESS: &str = "Address";
pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";

pub const STREET: &str = "Street";
pub const CITY: &str = "City";
pub const STATE: &str = "State";
pub const ZIP: &str = "Zip";

pub const THROUGHOUT_COUNTIES: &str = "Throughout Designated Counties";
pub const NOT_SET: &str = "Not Set";
pub const BRANCH_OFFICE: &str = "Branch Office";
pub const NOT_ASSIGNED: &str = "Not Assigned";
pub const NOT_AVAILABLE: &str = "Not Available";
pub const MOBILE_SUPPORT: &str = "Mobile Emergency Response Support";
pub const CENTROID_ADDRESS: &str = "Centroid of County";
pub const NO_WORK_ASSIGNMENT: &str = "No Work Assignment";
