use log::{debug, info, warn};

use ics_gis::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use crate::args::Args;
use crate::export::config_reader::*;
use crate::export::io_common::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum GisError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The file {path} does not contain any row"))]
    EmptyInput { path: String },
    #[snafu(display("Worksheet {name:?} not found in {path}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display(
        "The file {path} has several worksheets ({names:?}), the worksheet name must be provided"
    ))]
    AmbiguousWorksheet { path: String, names: Vec<String> },
    #[snafu(display("{path}: row {lineno}: cannot read cell {content}"))]
    ExcelWrongCellType {
        path: String,
        lineno: u64,
        content: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the configuration file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("{path}: line {lineno}: cannot parse the CSV record"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error writing the CSV export"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Unknown input type {provider:?} for {path} (expected xlsx or csv)"))]
    UnknownProvider { provider: String, path: String },
    #[snafu(display(
        "Unknown facility merge policy {policy:?} (expected left, outer or synthesizeUnmatched)"
    ))]
    UnknownMergePolicy { policy: String },
    #[snafu(display("No assignment file provided: use --input or --config"))]
    MissingInput {},
    #[snafu(display("The transformation failed: {source}"))]
    Transform { source: TransformError },
    #[snafu(display("The export differs from the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type GisResult<T> = Result<T, GisError>;

/// An input file, with its path resolved and its type known.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct InputSource {
    pub path: String,
    pub provider: Provider,
    pub worksheet_name: Option<String>,
}

/// Everything needed for one run, after merging the configuration file and the command line.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ExportSettings {
    pub assignments: InputSource,
    pub facilities: Option<InputSource>,
    pub options: TransformOptions,
    pub output_directory: PathBuf,
    pub file_prefix: String,
}

fn resolve_source(root: &Path, source: &FileSource) -> GisResult<InputSource> {
    let p: PathBuf = root.join(&source.file_path);
    let path = p.as_path().display().to_string();
    let provider = infer_provider(&path, source.provider.as_deref())?;
    Ok(InputSource {
        path,
        provider,
        worksheet_name: source.excel_worksheet_name.clone(),
    })
}

fn validate_rules(rules: &ExportRules) -> GisResult<TransformOptions> {
    let defaults = TransformOptions::default();
    let res = TransformOptions {
        expand_placeholders: rules
            .expand_placeholders
            .unwrap_or(defaults.expand_placeholders),
        exempt_mobile_support: rules
            .exempt_mobile_support
            .unwrap_or(defaults.exempt_mobile_support),
        facility_merge_policy: match rules.facility_merge_policy.as_deref() {
            None => defaults.facility_merge_policy,
            Some(policy) => parse_merge_policy(policy)?,
        },
        unmatched_facility_type_label: match rules.unmatched_facility_type_label.clone() {
            Some(x) if !x.trim().is_empty() => x,
            _ => defaults.unmatched_facility_type_label,
        },
        governed_counties: rules.governed_counties.clone().unwrap_or_default(),
    };
    Ok(res)
}

fn parse_merge_policy(policy: &str) -> GisResult<FacilityMergePolicy> {
    match policy {
        "left" => Ok(FacilityMergePolicy::Left),
        "outer" => Ok(FacilityMergePolicy::Outer),
        "synthesizeUnmatched" => Ok(FacilityMergePolicy::SynthesizeUnmatched),
        x => UnknownMergePolicySnafu { policy: x }.fail(),
    }
}

/// Merges the configuration file (if any) with the command line arguments.
/// The command line takes precedence.
pub fn load_settings(args: &Args) -> GisResult<ExportSettings> {
    let (config, root): (Option<ExportConfig>, PathBuf) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            info!("config: {:?}", config);
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (Some(config), root)
        }
        None => (None, PathBuf::new()),
    };

    let mut assignments = match (&args.input, &config) {
        (Some(input), _) => InputSource {
            path: input.clone(),
            provider: infer_provider(input, args.input_type.as_deref())?,
            worksheet_name: None,
        },
        (None, Some(c)) => resolve_source(&root, &c.sources.assignments)?,
        (None, None) => return MissingInputSnafu {}.fail(),
    };
    if args.excel_worksheet_name.is_some() {
        assignments.worksheet_name = args.excel_worksheet_name.clone();
    }

    let facilities = match (&args.facilities, &config) {
        (Some(f), _) => Some(InputSource {
            path: f.clone(),
            provider: infer_provider(f, None)?,
            worksheet_name: None,
        }),
        (None, Some(c)) => match &c.sources.facilities {
            Some(source) => Some(resolve_source(&root, source)?),
            None => None,
        },
        (None, None) => None,
    };

    let rules = config.as_ref().map(|c| c.rules.clone()).unwrap_or_default();
    let mut options = validate_rules(&rules)?;
    if args.no_expand {
        options.expand_placeholders = false;
    }
    if let Some(policy) = &args.merge_policy {
        options.facility_merge_policy = parse_merge_policy(policy)?;
    }

    let output_settings = config
        .as_ref()
        .map(|c| c.output_settings.clone())
        .unwrap_or_default();
    let output_directory = match output_settings.output_directory {
        Some(dir) => root.join(dir),
        None => root,
    };
    let file_prefix = output_settings
        .file_prefix
        .unwrap_or_else(|| DEFAULT_FILE_PREFIX.to_string());

    Ok(ExportSettings {
        assignments,
        facilities,
        options,
        output_directory,
        file_prefix,
    })
}

fn read_table(source: &InputSource) -> GisResult<Table> {
    info!("Attempting to read file {:?}", source.path);
    let table = match source.provider {
        Provider::Xlsx => io_xlsx::read_xlsx_table(&source.path, source.worksheet_name.as_deref()),
        Provider::Csv => io_csv::read_csv_table(&source.path),
    }?;
    debug!(
        "read_table: {:?}: columns: {:?}, {} rows",
        source.path,
        table.columns,
        table.len()
    );
    Ok(table)
}

/// Reads the input tables and runs the transformation.
pub fn build_export(settings: &ExportSettings) -> GisResult<TransformResult> {
    let assignments = read_table(&settings.assignments)?;
    let facilities = match &settings.facilities {
        Some(source) => Some(read_table(source)?),
        None => None,
    };
    transform(&assignments, facilities.as_ref(), &settings.options).context(TransformSnafu {})
}

fn log_stats(stats: &TransformStats) {
    info!(
        "{} assignment rows -> {} export rows",
        stats.input_rows, stats.output_rows
    );
    info!(
        "expanded rows: {}, exempted rows: {}, facility rows added: {}, rows without facility reference: {}, duplicates removed: {}",
        stats.expanded_rows,
        stats.exempted_rows,
        stats.appended_facility_rows,
        stats.unmatched_facility_rows,
        stats.duplicates_removed
    );
    if !stats.unknown_counties.is_empty() {
        warn!(
            "Counties without reference coordinates: {:?}",
            stats.unknown_counties
        );
    }
}

pub fn run_export(args: &Args) -> GisResult<()> {
    let settings = load_settings(args)?;
    info!("settings: {:?}", settings);

    let result = build_export(&settings)?;
    log_stats(&result.stats);

    let export_csv = io_csv::write_csv_string(&result.table)?;

    match args.out.as_deref() {
        Some("stdout") => {
            print!("{}", export_csv);
        }
        out => {
            let out_path: PathBuf = match out {
                Some(p) if !p.is_empty() => PathBuf::from(p),
                _ => settings
                    .output_directory
                    .join(today_file_name(&settings.file_prefix)),
            };
            let out_p = out_path.as_path().display().to_string();
            if let Some(parent) = out_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).context(WritingFileSnafu { path: &out_p })?;
                }
            }
            fs::write(&out_path, export_csv.as_bytes())
                .context(WritingFileSnafu { path: &out_p })?;
            info!("Export written to {:?}", out_p);
        }
    }

    // The reference export, if provided for comparison
    if let Some(reference_p) = &args.reference {
        check_reference(&export_csv, reference_p)?;
    }

    Ok(())
}

fn check_reference(export_csv: &str, reference_p: &str) -> GisResult<()> {
    let reference =
        fs::read_to_string(reference_p).context(OpeningFileSnafu { path: reference_p })?;
    // Line endings are not significant.
    let normalize = |s: &str| s.replace("\r\n", "\n").trim_end().to_string();
    let (reference, export_csv) = (normalize(&reference), normalize(export_csv));
    if reference != export_csv {
        warn!("Found differences with the reference export");
        print_diff(reference.as_str(), export_csv.as_str(), "\n");
        return ReferenceMismatchSnafu { path: reference_p }.fail();
    }
    info!("The export matches the reference {:?}", reference_p);
    Ok(())
}
