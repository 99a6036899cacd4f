/*!

This is the long-form manual for `ics_gis` and `icsgis`.

## Input tables

### Assignments

The ICS-204 export of the planning period, as an Excel workbook (`.xlsx`) or a CSV file.
The first row contains the headers. Line breaks inside the headers are removed, so
`"Facility\nName"` and `"FacilityName"` are the same column.

Required columns: `Division`. `Facility` is also required when a facility table is provided.

The `Division` column contains composite values such as `45 - Jefferson`, or one of the
labels `Throughout Designated Counties`, `Not Set`, `Branch Office`.

### Facilities (optional)

A table with the columns `Facility Name` and `Facility Type`. The optional columns
`Street`, `City`, `State` and `Zip` are used to build an address for the facilities
that no assignment refers to.

## Transformation

1. **Facility type.** A `Facility Type` column is added right after `Facility`. Assignments
   whose facility is not listed receive the label `No Work Assignment` (configurable).
   The merge policy decides what happens to the listed facilities without assignment:
   * `left` they are dropped
   * `outer` they get a row with only the facility name and type
   * `synthesizeUnmatched` (default) they get a row with `Division` and `Branch` set to
     `Not Assigned` and the address from the facility table, or `Not Available`.
2. **Expansion.** A row with the division `Throughout Designated Counties` is replaced by
   one row per designated county. Its coordinates are the centroid of the county and its
   address is `Centroid of County`. Rows of the `Mobile Emergency Response Support` branch
   are not expanded.
3. **Division and county.** `45 - Jefferson` becomes the division `45` and the county
   `Jefferson`. The labels without a county become the division `NA`. Any other shape
   stops the run with an error that names the row.
4. **Branch.** The branch is `I` or `II` depending on the division, and empty for the
   divisions that belong to neither branch.
5. **Duplicates.** Identical rows are removed, keeping the first one.

## Configuration file

```json
{
  "outputSettings": { "outputDirectory": "out", "filePrefix": "GIS_204_Export_" },
  "sources": {
    "assignments": { "provider": "xlsx", "filePath": "204.xlsx" },
    "facilities": { "provider": "csv", "filePath": "facilities.csv" }
  },
  "rules": {
    "expandPlaceholders": true,
    "exemptMobileSupport": true,
    "facilityMergePolicy": "synthesizeUnmatched",
    "unmatchedFacilityTypeLabel": "No Work Assignment"
  }
}
```

The paths are relative to the directory of the configuration file. The output file is
named after the prefix and the current date, for example `GIS_204_Export_06Nov24.csv`.

*/
