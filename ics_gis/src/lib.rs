mod config;
pub mod builder;
pub mod manual;
pub mod reference;

use log::{debug, info, warn};

use std::collections::{HashMap, HashSet};

pub use crate::config::*;
use crate::reference::{all_divisions, branch_for_division, lookup_county, CountyReference};

// **** Private structures ****

const ASSIGNMENTS: &str = "assignments";
const FACILITIES: &str = "facilities";

/// Division labels that carry no county. They are rewritten to `NA - <label>`
/// before splitting.
const DIVISION_PLACEHOLDERS: [&str; 4] = [NOT_SET, BRANCH_OFFICE, THROUGHOUT_COUNTIES, NOT_ASSIGNED];

const NA_CODE: &str = "NA";
const DIVISION_SEPARATOR: &str = " - ";

fn cell_at(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.as_str()).unwrap_or("")
}

fn optional_cell<'a>(table: &Table, row: &'a [String], name: &str) -> &'a str {
    table
        .column_index(name)
        .map(|idx| cell_at(row, idx).trim())
        .unwrap_or("")
}

/// Runs the full transformation on an assignment table.
///
/// Arguments:
/// * `assignments` the ICS-204 assignment table, as read from the export
/// * `facilities` the optional facility reference table (`Facility Name`, `Facility Type`)
/// * `options` the options that control the merge and the expansion
///
/// The stages run in order: header normalization, facility enrichment,
/// placeholder expansion, division splitting, branch assignment and
/// deduplication. The first error aborts the run.
pub fn transform(
    assignments: &Table,
    facilities: Option<&Table>,
    options: &TransformOptions,
) -> Result<TransformResult, TransformError> {
    info!(
        "transform: {} assignment rows, facility rows: {:?}, options: {:?}",
        assignments.len(),
        facilities.map(|t| t.len()),
        options
    );
    let mut stats = TransformStats {
        input_rows: assignments.len(),
        ..Default::default()
    };

    let mut table = normalize_headers(assignments);
    validate_divisions(&table)?;
    if options.expand_placeholders {
        validate_governed_counties(options)?;
    }

    if let Some(facility_table) = facilities {
        let facility_table = normalize_headers(facility_table);
        table = enrich_facilities(&table, &facility_table, options, &mut stats)?;
    }

    if options.expand_placeholders {
        table = expand_placeholders(&table, options, &mut stats)?;
    } else {
        debug!("transform: placeholder expansion disabled");
    }

    table = split_divisions(&table)?;
    table = assign_branches(&table);

    let before_dedup = table.len();
    table = dedup_rows(&table);
    stats.duplicates_removed = before_dedup - table.len();
    stats.output_rows = table.len();

    info!("transform: done: {:?}", stats);
    Ok(TransformResult { table, stats })
}

/// Removes the line breaks and the surrounding whitespace from a header.
pub fn normalize_header(name: &str) -> String {
    name.replace(|c: char| c == '\n' || c == '\r', "")
        .trim()
        .to_string()
}

/// Cleans all the headers of a table and pads the short rows with empty cells.
pub fn normalize_headers(table: &Table) -> Table {
    let columns: Vec<String> = table.columns.iter().map(|c| normalize_header(c)).collect();
    let width = columns.len();
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            if row.len() < width {
                row.resize(width, String::new());
            }
            row
        })
        .collect();
    debug!("normalize_headers: {:?} -> {:?}", table.columns, columns);
    Table { columns, rows }
}

/// Brings the facility type from the reference table onto the assignments.
///
/// The `Facility Type` column is placed right after `Facility`. When the
/// reference table lists a facility more than once, the first entry is used.
/// Depending on the merge policy, the facilities that no assignment refers to
/// are appended as new rows.
///
/// Both tables are expected to have gone through [`normalize_headers`].
pub fn enrich_facilities(
    assignments: &Table,
    facilities: &Table,
    options: &TransformOptions,
    stats: &mut TransformStats,
) -> Result<Table, TransformError> {
    assignments.require_column(ASSIGNMENTS, FACILITY)?;
    let name_idx = facilities.require_column(FACILITIES, FACILITY_NAME)?;
    let type_idx = facilities.require_column(FACILITIES, FACILITY_TYPE)?;

    let mut lookup: HashMap<&str, &[String]> = HashMap::new();
    // The facilities in the order of the reference table.
    let mut ordered_names: Vec<&str> = Vec::new();
    for (idx, row) in facilities.rows.iter().enumerate() {
        let name = cell_at(row, name_idx).trim();
        if name.is_empty() {
            debug!("enrich_facilities: reference row {}: no facility name", idx + 1);
            continue;
        }
        if lookup.contains_key(name) {
            warn!(
                "enrich_facilities: reference row {}: facility {:?} is listed more than once, keeping the first entry",
                idx + 1,
                name
            );
            continue;
        }
        lookup.insert(name, row.as_slice());
        ordered_names.push(name);
    }

    let mut res = assignments.clone();
    // An existing type column is replaced by the one placed after Facility.
    if let Some(idx) = res.column_index(FACILITY_TYPE) {
        debug!("enrich_facilities: replacing the existing column at {}", idx);
        res.remove_column(idx);
    }
    let facility_idx = res.require_column(ASSIGNMENTS, FACILITY)?;
    let type_col = facility_idx + 1;
    res.insert_column(type_col, FACILITY_TYPE, "");

    let mut used: HashSet<&str> = HashSet::new();
    for row in res.rows.iter_mut() {
        let name = cell_at(row, facility_idx).trim().to_string();
        match lookup.get_key_value(name.as_str()) {
            Some((key, ref_row)) => {
                row[type_col] = facility_type(ref_row, type_idx, options);
                used.insert(*key);
            }
            None => {
                debug!("enrich_facilities: no reference for facility {:?}", name);
                row[type_col] = options.unmatched_facility_type_label.clone();
                stats.unmatched_facility_rows += 1;
            }
        }
    }

    let unused: Vec<&str> = ordered_names
        .iter()
        .filter(|name| !used.contains(*name))
        .cloned()
        .collect();
    debug!("enrich_facilities: unused facilities: {:?}", unused);

    match options.facility_merge_policy {
        FacilityMergePolicy::Left => {}
        FacilityMergePolicy::Outer => {
            for name in unused {
                let mut row = vec![String::new(); res.columns.len()];
                row[facility_idx] = name.to_string();
                row[type_col] = facility_type(lookup[name], type_idx, options);
                res.rows.push(row);
                stats.appended_facility_rows += 1;
            }
        }
        FacilityMergePolicy::SynthesizeUnmatched => {
            let division_idx = res.require_column(ASSIGNMENTS, DIVISION)?;
            let branch_idx = res.ensure_column(BRANCH);
            let address_idx = res.ensure_column(ADDRESS);
            for name in unused {
                let ref_row = lookup[name];
                let mut row = vec![String::new(); res.columns.len()];
                row[facility_idx] = name.to_string();
                row[type_col] = facility_type(ref_row, type_idx, options);
                row[division_idx] = NOT_ASSIGNED.to_string();
                row[branch_idx] = NOT_ASSIGNED.to_string();
                row[address_idx] = reference_address(facilities, ref_row)
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
                res.rows.push(row);
                stats.appended_facility_rows += 1;
            }
        }
    }

    info!(
        "enrich_facilities: {} rows, {} without facility reference, {} appended",
        res.len(),
        stats.unmatched_facility_rows,
        stats.appended_facility_rows
    );
    Ok(res)
}

fn facility_type(ref_row: &[String], type_idx: usize, options: &TransformOptions) -> String {
    match cell_at(ref_row, type_idx).trim() {
        "" => options.unmatched_facility_type_label.clone(),
        s => s.to_string(),
    }
}

/// The address of a facility as `Street, City, State Zip`, skipping the missing parts.
fn reference_address(facilities: &Table, row: &[String]) -> Option<String> {
    let state_zip: Vec<&str> = [
        optional_cell(facilities, row, STATE),
        optional_cell(facilities, row, ZIP),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect();
    let state_zip = state_zip.join(" ");
    let parts: Vec<&str> = [
        optional_cell(facilities, row, STREET),
        optional_cell(facilities, row, CITY),
        state_zip.as_str(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Replaces every "Throughout Designated Counties" row with one row per governed county.
///
/// The new rows take the position of the row they replace. When the county is
/// in the reference table, the coordinates are set to its centroid. Rows of the
/// mobile support branch are kept as they are if the exemption is on.
pub fn expand_placeholders(
    table: &Table,
    options: &TransformOptions,
    stats: &mut TransformStats,
) -> Result<Table, TransformError> {
    let division_idx = table.require_column(ASSIGNMENTS, DIVISION)?;
    let branch_idx = table.column_index(BRANCH);

    let is_placeholder = |row: &[String]| cell_at(row, division_idx).trim() == THROUGHOUT_COUNTIES;
    let is_exempted = |row: &[String]| {
        options.exempt_mobile_support
            && branch_idx
                .map(|idx| cell_at(row, idx).trim() == MOBILE_SUPPORT)
                .unwrap_or(false)
    };

    if !table
        .rows
        .iter()
        .any(|row| is_placeholder(row.as_slice()) && !is_exempted(row.as_slice()))
    {
        stats.exempted_rows += table
            .rows
            .iter()
            .filter(|row| is_placeholder(row.as_slice()))
            .count();
        debug!("expand_placeholders: nothing to expand");
        let mut res = table.clone();
        for name in [LATITUDE, LONGITUDE, ADDRESS] {
            res.ensure_column(name);
        }
        return Ok(res);
    }

    let governed: Vec<String> = if options.governed_counties.is_empty() {
        all_divisions()
    } else {
        options.governed_counties.clone()
    };
    let counties: Vec<(String, Option<&CountyReference>)> = governed
        .iter()
        .map(|d| (d.clone(), lookup_county(d.trim())))
        .collect();
    for (division, reference) in counties.iter() {
        if reference.is_none() {
            warn!(
                "expand_placeholders: county {:?} is not in the reference table, its coordinates will not be set",
                division
            );
            stats.unknown_counties.push(division.clone());
        }
    }

    let mut res = Table {
        columns: table.columns.clone(),
        rows: Vec::new(),
    };
    let latitude_idx = res.ensure_column(LATITUDE);
    let longitude_idx = res.ensure_column(LONGITUDE);
    let address_idx = res.ensure_column(ADDRESS);
    let width = res.columns.len();

    for row in table.rows.iter() {
        let mut row = row.clone();
        row.resize(width.max(row.len()), String::new());
        if !is_placeholder(row.as_slice()) {
            res.rows.push(row);
            continue;
        }
        if is_exempted(row.as_slice()) {
            debug!("expand_placeholders: keeping mobile support row {:?}", row);
            stats.exempted_rows += 1;
            res.rows.push(row);
            continue;
        }
        stats.expanded_rows += 1;
        for (division, reference) in counties.iter() {
            let mut new_row = row.clone();
            new_row[division_idx] = division.clone();
            if let Some(c) = reference {
                new_row[latitude_idx] = c.latitude.to_string();
                new_row[longitude_idx] = c.longitude.to_string();
                new_row[address_idx] = CENTROID_ADDRESS.to_string();
            }
            res.rows.push(new_row);
        }
    }

    info!(
        "expand_placeholders: expanded {} rows into {} counties each, {} rows now",
        stats.expanded_rows,
        counties.len(),
        res.len()
    );
    Ok(res)
}

/// Rewrites the placeholder labels of a division to the `NA - <label>` form.
/// A blank division is treated as "Not Set".
pub fn normalize_division(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        format!("{}{}{}", NA_CODE, DIVISION_SEPARATOR, NOT_SET)
    } else if DIVISION_PLACEHOLDERS.contains(&value) {
        format!("{}{}{}", NA_CODE, DIVISION_SEPARATOR, value)
    } else {
        value.to_string()
    }
}

/// Splits a composite division `NN - Name` into its code and its name.
///
/// The code is either two digits or `NA`. Returns `None` for any other shape.
pub fn split_division(value: &str) -> Option<(&str, &str)> {
    let (code, name) = value.split_once(DIVISION_SEPARATOR)?;
    let valid_code =
        code == NA_CODE || (code.len() == 2 && code.chars().all(|c| c.is_ascii_digit()));
    if valid_code && !name.trim().is_empty() {
        Some((code, name))
    } else {
        None
    }
}

/// The code and the county of the Division of a row. `idx` is the 0-based row index.
fn split_row_division(
    row: &[String],
    division_idx: usize,
    idx: usize,
) -> Result<(String, String), TransformError> {
    let division = normalize_division(cell_at(row, division_idx));
    match split_division(&division) {
        Some((code, county)) => Ok((code.to_string(), county.to_string())),
        None => Err(TransformError::MalformedDivision {
            row: idx + 1,
            value: cell_at(row, division_idx).to_string(),
        }),
    }
}

/// Checks that every Division of the table can be split.
///
/// Run on the input table, before rows get expanded or appended, so that the
/// reported row number is the one of the input.
pub fn validate_divisions(table: &Table) -> Result<(), TransformError> {
    let division_idx = table.require_column(ASSIGNMENTS, DIVISION)?;
    for (idx, row) in table.rows.iter().enumerate() {
        split_row_division(row, division_idx, idx)?;
    }
    Ok(())
}

fn validate_governed_counties(options: &TransformOptions) -> Result<(), TransformError> {
    for value in options.governed_counties.iter() {
        if split_division(value.trim()).is_none() {
            return Err(TransformError::MalformedGovernedCounty {
                value: value.clone(),
            });
        }
    }
    Ok(())
}

/// Replaces the composite division by its two-character code and fills the `County` column.
pub fn split_divisions(table: &Table) -> Result<Table, TransformError> {
    let division_idx = table.require_column(ASSIGNMENTS, DIVISION)?;
    let mut res = table.clone();
    let county_idx = res.ensure_column(COUNTY);

    for (idx, row) in res.rows.iter_mut().enumerate() {
        let (code, county) = split_row_division(row, division_idx, idx)?;
        row[division_idx] = code;
        row[county_idx] = county;
    }
    debug!("split_divisions: split {} rows", res.len());
    Ok(res)
}

/// Overwrites the `Branch` column from the division codes.
pub fn assign_branches(table: &Table) -> Table {
    let mut res = table.clone();
    let branch_idx = res.ensure_column(BRANCH);
    let division_idx = res.column_index(DIVISION);
    for row in res.rows.iter_mut() {
        let branch = division_idx
            .and_then(|idx| branch_for_division(cell_at(row, idx)))
            .unwrap_or("");
        row[branch_idx] = branch.to_string();
    }
    res
}

/// Removes the rows that are identical to an earlier row.
pub fn dedup_rows(table: &Table) -> Table {
    let mut seen: HashSet<&Vec<String>> = HashSet::new();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .filter(|row| seen.insert(*row))
        .cloned()
        .collect();
    if rows.len() != table.len() {
        info!("dedup_rows: removed {} duplicate rows", table.len() - rows.len());
    }
    Table {
        columns: table.columns.clone(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::builder::Builder;
    use super::reference::COUNTIES;
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn column<'a>(table: &'a Table, name: &str) -> Vec<&'a str> {
        let idx = table.column_index(name).unwrap();
        table.rows.iter().map(|r| r[idx].as_str()).collect()
    }

    fn assignments() -> Table {
        Builder::new(&["Division", "Branch", "Facility", "Address", "Latitude", "Longitude"])
            .row(&["45 - Jefferson", "", "HQ", "1 Main St", "36.1", "-83.4"])
            .unwrap()
            .row(&["Throughout Designated Counties", "", "Depot", "", "", ""])
            .unwrap()
            .row(&["Not Set", "", "Camp", "", "", ""])
            .unwrap()
            .build()
    }

    fn facilities() -> Table {
        Builder::new(&["Facility Name", "Facility Type", "Street", "City", "State", "Zip"])
            .row(&["HQ", "Command Post", "", "", "", ""])
            .unwrap()
            .row(&["Shelter A", "Shelter", "12 Oak Rd", "Newport", "TN", "37821"])
            .unwrap()
            .row(&["HQ", "Warehouse", "", "", "", ""])
            .unwrap()
            .build()
    }

    #[test]
    fn headers_are_cleaned() {
        let t = Table {
            columns: vec![" Division\n".to_string(), "Facility\r\nName ".to_string()],
            rows: vec![vec!["10 - Carter".to_string()]],
        };
        let n = normalize_headers(&t);
        assert_eq!(n.columns, vec!["Division", "FacilityName"]);
        assert_eq!(n.rows[0], vec!["10 - Carter".to_string(), String::new()]);
    }

    #[test]
    fn split_composite_division() {
        assert_eq!(split_division("45 - Jefferson"), Some(("45", "Jefferson")));
        assert_eq!(split_division("NA - Not Set"), Some(("NA", "Not Set")));
        assert_eq!(split_division("Hancock"), None);
        assert_eq!(split_division("5 - Hancock"), None);
        assert_eq!(split_division("45 - "), None);
        assert_eq!(split_division("45-Jefferson"), None);
    }

    #[test]
    fn placeholders_are_normalized() {
        assert_eq!(normalize_division("Not Set"), "NA - Not Set");
        assert_eq!(normalize_division(" Branch Office "), "NA - Branch Office");
        assert_eq!(
            normalize_division("Throughout Designated Counties"),
            "NA - Throughout Designated Counties"
        );
        assert_eq!(normalize_division(""), "NA - Not Set");
        assert_eq!(normalize_division("10 - Carter"), "10 - Carter");
    }

    #[test]
    fn split_fills_county() {
        let t = split_divisions(&assignments()).unwrap();
        assert_eq!(column(&t, "Division"), vec!["45", "NA", "NA"]);
        assert_eq!(
            column(&t, "County"),
            vec!["Jefferson", "Throughout Designated Counties", "Not Set"]
        );
    }

    #[test]
    fn malformed_division_is_reported() {
        let t = Builder::new(&["Division"])
            .row(&["10 - Carter"])
            .unwrap()
            .row(&["Hancock"])
            .unwrap()
            .build();
        assert_eq!(
            split_divisions(&t),
            Err(TransformError::MalformedDivision {
                row: 2,
                value: "Hancock".to_string()
            })
        );
    }

    #[test]
    fn malformed_division_after_placeholder_keeps_input_row() {
        let t = Builder::new(&["Division", "Facility"])
            .row(&["Throughout Designated Counties", "HQ"])
            .unwrap()
            .row(&["Hancock", "Depot"])
            .unwrap()
            .build();
        assert_eq!(
            transform(&t, Some(&facilities()), &TransformOptions::default()),
            Err(TransformError::MalformedDivision {
                row: 2,
                value: "Hancock".to_string()
            })
        );
    }

    #[test]
    fn malformed_governed_county() {
        let options = TransformOptions {
            governed_counties: vec!["10 - Carter".to_string(), "Knox".to_string()],
            ..Default::default()
        };
        assert_eq!(
            transform(&assignments(), None, &options),
            Err(TransformError::MalformedGovernedCounty {
                value: "Knox".to_string()
            })
        );
        let options = TransformOptions {
            expand_placeholders: false,
            ..options
        };
        assert!(transform(&assignments(), None, &options).is_ok());
    }

    #[test]
    fn coordinate_columns_do_not_depend_on_data() {
        let with_placeholder = Builder::new(&["Division"])
            .row(&["Throughout Designated Counties"])
            .unwrap()
            .build();
        let without_placeholder = Builder::new(&["Division"])
            .row(&["10 - Carter"])
            .unwrap()
            .build();
        let options = TransformOptions::default();
        let a = transform(&with_placeholder, None, &options).unwrap().table;
        let b = transform(&without_placeholder, None, &options).unwrap().table;
        assert_eq!(a.columns, b.columns);
        assert_eq!(
            b.columns,
            vec!["Division", "Latitude", "Longitude", "Address", "County", "Branch"]
        );
    }

    #[test]
    fn existing_facility_type_is_moved() {
        let t = Builder::new(&["Facility Type", "Division", "Facility", "Address"])
            .row(&["old", "45 - Jefferson", "HQ", "1 Main St"])
            .unwrap()
            .build();
        let options = TransformOptions {
            facility_merge_policy: FacilityMergePolicy::Left,
            ..Default::default()
        };
        let res =
            enrich_facilities(&t, &facilities(), &options, &mut TransformStats::default()).unwrap();
        assert_eq!(
            res.columns,
            vec!["Division", "Facility", "Facility Type", "Address"]
        );
        assert_eq!(res.rows[0], vec!["45 - Jefferson", "HQ", "Command Post", "1 Main St"]);
    }

    #[test]
    fn expansion_one_row_per_county() {
        init();
        let t = Builder::new(&["Division", "Branch", "Facility"])
            .row(&["Throughout Designated Counties", "", "HQ"])
            .unwrap()
            .build();
        let mut stats = TransformStats::default();
        let res = expand_placeholders(&t, &TransformOptions::default(), &mut stats).unwrap();
        assert_eq!(res.len(), COUNTIES.len());
        assert_eq!(stats.expanded_rows, 1);
        for (row, c) in res.rows.iter().zip(COUNTIES.iter()) {
            assert_eq!(res.cell(row, "Division"), Some(c.division));
            assert_eq!(res.cell(row, "Facility"), Some("HQ"));
            assert_eq!(res.cell(row, "Latitude"), Some(c.latitude.to_string().as_str()));
            assert_eq!(res.cell(row, "Longitude"), Some(c.longitude.to_string().as_str()));
            assert_eq!(res.cell(row, "Address"), Some("Centroid of County"));
        }
    }

    #[test]
    fn expansion_keeps_other_rows_in_place() {
        let mut stats = TransformStats::default();
        let res = expand_placeholders(&assignments(), &TransformOptions::default(), &mut stats)
            .unwrap();
        assert_eq!(res.len(), 3 + COUNTIES.len() - 1);
        assert_eq!(res.rows[0], assignments().rows[0]);
        assert_eq!(res.rows[res.len() - 1], assignments().rows[2]);
        assert_eq!(res.cell(&res.rows[0], "Address"), Some("1 Main St"));
    }

    #[test]
    fn mobile_support_rows_are_not_expanded() {
        let t = Builder::new(&["Division", "Branch"])
            .row(&["Throughout Designated Counties", "Mobile Emergency Response Support"])
            .unwrap()
            .build();
        let mut stats = TransformStats::default();
        let res = expand_placeholders(&t, &TransformOptions::default(), &mut stats).unwrap();
        assert_eq!(res.rows.len(), 1);
        assert_eq!(res.rows[0][..2], t.rows[0][..]);
        assert_eq!(stats.exempted_rows, 1);

        let options = TransformOptions {
            exempt_mobile_support: false,
            ..Default::default()
        };
        let res = expand_placeholders(&t, &options, &mut TransformStats::default()).unwrap();
        assert_eq!(res.len(), COUNTIES.len());
    }

    #[test]
    fn unknown_county_keeps_row_without_coordinates() {
        let t = Builder::new(&["Division", "Latitude"])
            .row(&["Throughout Designated Counties", "35.0"])
            .unwrap()
            .build();
        let options = TransformOptions {
            governed_counties: vec!["10 - Carter".to_string(), "47 - Knox".to_string()],
            ..Default::default()
        };
        let mut stats = TransformStats::default();
        let res = expand_placeholders(&t, &options, &mut stats).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(stats.unknown_counties, vec!["47 - Knox".to_string()]);
        assert_eq!(res.cell(&res.rows[1], "Division"), Some("47 - Knox"));
        assert_eq!(res.cell(&res.rows[1], "Latitude"), Some("35.0"));
        assert_eq!(res.cell(&res.rows[1], "Address"), Some(""));
    }

    #[test]
    fn branches_from_division() {
        let t = Builder::new(&["Division", "Branch"])
            .row(&["45", "whatever"])
            .unwrap()
            .row(&["90", ""])
            .unwrap()
            .row(&["NA", "II"])
            .unwrap()
            .row(&["45", "other"])
            .unwrap()
            .build();
        let res = assign_branches(&t);
        assert_eq!(column(&res, "Branch"), vec!["I", "II", "", "I"]);
    }

    #[test]
    fn dedup_is_idempotent() {
        let t = Builder::new(&["Division", "Facility"])
            .row(&["10", "HQ"])
            .unwrap()
            .row(&["10", "HQ"])
            .unwrap()
            .row(&["13", "HQ"])
            .unwrap()
            .row(&["10", "HQ"])
            .unwrap()
            .build();
        let once = dedup_rows(&t);
        assert_eq!(once.len(), 2);
        assert_eq!(dedup_rows(&once), once);
        assert_eq!(column(&once, "Division"), vec!["10", "13"]);
    }

    #[test]
    fn facility_type_follows_facility() {
        init();
        let mut stats = TransformStats::default();
        let options = TransformOptions {
            facility_merge_policy: FacilityMergePolicy::Left,
            ..Default::default()
        };
        let res = enrich_facilities(&assignments(), &facilities(), &options, &mut stats).unwrap();
        assert_eq!(res.column_index("Facility Type"), Some(3));
        assert_eq!(
            column(&res, "Facility Type"),
            vec!["Command Post", "No Work Assignment", "No Work Assignment"]
        );
        assert_eq!(res.len(), 3);
        assert_eq!(stats.unmatched_facility_rows, 2);
        assert!(!column(&res, "Facility").contains(&"Shelter A"));
    }

    #[test]
    fn unused_facilities_are_synthesized() {
        let mut stats = TransformStats::default();
        let res = enrich_facilities(
            &assignments(),
            &facilities(),
            &TransformOptions::default(),
            &mut stats,
        )
        .unwrap();
        assert_eq!(res.len(), 4);
        assert_eq!(stats.appended_facility_rows, 1);
        let row = &res.rows[3];
        assert_eq!(res.cell(row, "Facility"), Some("Shelter A"));
        assert_eq!(res.cell(row, "Facility Type"), Some("Shelter"));
        assert_eq!(res.cell(row, "Division"), Some("Not Assigned"));
        assert_eq!(res.cell(row, "Branch"), Some("Not Assigned"));
        assert_eq!(res.cell(row, "Address"), Some("12 Oak Rd, Newport, TN 37821"));
    }

    #[test]
    fn outer_merge_leaves_cells_blank() {
        let options = TransformOptions {
            facility_merge_policy: FacilityMergePolicy::Outer,
            unmatched_facility_type_label: "Unknown".to_string(),
            ..Default::default()
        };
        let res = enrich_facilities(
            &assignments(),
            &facilities(),
            &options,
            &mut TransformStats::default(),
        )
        .unwrap();
        assert_eq!(res.len(), 4);
        let row = &res.rows[3];
        assert_eq!(res.cell(row, "Division"), Some(""));
        assert_eq!(res.cell(row, "Facility Type"), Some("Shelter"));
        assert_eq!(res.cell(&res.rows[1], "Facility Type"), Some("Unknown"));
    }

    #[test]
    fn missing_columns_are_reported() {
        let t = Builder::new(&["Facility"]).build();
        assert_eq!(
            transform(&t, None, &TransformOptions::default()),
            Err(TransformError::MissingColumn {
                table: "assignments".to_string(),
                column: "Division".to_string()
            })
        );
        let f = Builder::new(&["Facility Name"]).build();
        let err = transform(&assignments(), Some(&f), &TransformOptions::default()).unwrap_err();
        assert_eq!(
            err,
            TransformError::MissingColumn {
                table: "facilities".to_string(),
                column: "Facility Type".to_string()
            }
        );
    }

    #[test]
    fn end_to_end_placeholder() {
        init();
        let t = Builder::new(&["Division", "Branch", "Facility"])
            .row(&["Throughout Designated Counties", "", "HQ"])
            .unwrap()
            .build();
        let res = transform(&t, None, &TransformOptions::default()).unwrap();
        let table = res.table;
        assert_eq!(table.len(), 13);
        assert!(column(&table, "Facility").iter().all(|f| *f == "HQ"));
        let codes: Vec<&str> = COUNTIES.iter().map(|c| c.code).collect();
        assert_eq!(column(&table, "Division"), codes);
        let jefferson = table
            .rows
            .iter()
            .find(|r| table.cell(r, "County") == Some("Jefferson"))
            .unwrap();
        assert_eq!(table.cell(jefferson, "Division"), Some("45"));
        assert_eq!(table.cell(jefferson, "Branch"), Some("I"));
        let washington = table
            .rows
            .iter()
            .find(|r| table.cell(r, "County") == Some("Washington"))
            .unwrap();
        assert_eq!(table.cell(washington, "Branch"), Some("II"));
    }

    #[test]
    fn end_to_end_with_facilities() {
        let res = transform(&assignments(), Some(&facilities()), &TransformOptions::default())
            .unwrap();
        let table = res.table;
        // 3 rows, one expanded into 13, one synthesized.
        assert_eq!(table.len(), 3 + 12 + 1);
        assert_eq!(res.stats.output_rows, table.len());
        let shelter = table.rows.last().unwrap();
        assert_eq!(table.cell(shelter, "Division"), Some("NA"));
        assert_eq!(table.cell(shelter, "County"), Some("Not Assigned"));
        assert_eq!(table.cell(shelter, "Branch"), Some(""));
        assert_eq!(table.cell(shelter, "Facility Type"), Some("Shelter"));
        assert_eq!(
            table.columns,
            vec![
                "Division",
                "Branch",
                "Facility",
                "Facility Type",
                "Address",
                "Latitude",
                "Longitude",
                "County"
            ]
        );
    }

    #[test]
    fn expansion_disabled_keeps_placeholder() {
        let options = TransformOptions {
            expand_placeholders: false,
            ..Default::default()
        };
        let res = transform(&assignments(), None, &options).unwrap();
        assert_eq!(res.table.len(), 3);
        assert_eq!(
            column(&res.table, "County"),
            vec!["Jefferson", "Throughout Designated Counties", "Not Set"]
        );
        assert_eq!(res.stats.expanded_rows, 0);
    }

    #[test]
    fn duplicates_after_expansion_are_removed() {
        let t = Builder::new(&["Division", "Facility"])
            .row(&["Throughout Designated Counties", "HQ"])
            .unwrap()
            .row(&["10 - Carter", "HQ"])
            .unwrap()
            .build();
        let res = transform(&t, None, &TransformOptions::default()).unwrap();
        // The Carter row only differs by its coordinates and address.
        assert_eq!(res.stats.duplicates_removed, 0);
        let t2 = Builder::new(&["Division", "Facility"])
            .row(&["10 - Carter", "HQ"])
            .unwrap()
            .row(&["10 - Carter", "HQ"])
            .unwrap()
            .build();
        let res2 = transform(&t2, None, &TransformOptions::default()).unwrap();
        assert_eq!(res2.stats.duplicates_removed, 1);
        assert_eq!(res2.table.len(), 1);
        assert_eq!(res.table.len(), 14);
    }
}
