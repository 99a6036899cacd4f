use clap::Parser;

/// This is a program to transform ICS-204 assignment exports into GIS-ready tables.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the input files, the rules and the output settings.
    /// The paths in this file are relative to the directory containing it.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The assignment table (ICS-204 export). Setting this option overrides the file
    /// that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (xlsx or csv, optional) The type of the assignment table. Inferred from the file extension
    /// if not specified.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, optional) The facility table with the columns 'Facility Name' and 'Facility Type'.
    #[clap(long, value_parser)]
    pub facilities: Option<String>,

    /// (optional) When using an Excel file, indicates the name of the worksheet to use.
    /// By default, the workbook must contain a single worksheet.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the export will be written in CSV format to the given
    /// location. By default, it is written to the output directory with a dated file name.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference CSV export. If provided, the produced export is compared with it and
    /// the program fails if they differ.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (left, outer or synthesizeUnmatched) How the facility table is merged onto the assignments.
    #[clap(long, value_parser)]
    pub merge_policy: Option<String>,

    /// If passed as an argument, the 'Throughout Designated Counties' rows are not expanded into
    /// one row per county.
    #[clap(long, takes_value = false)]
    pub no_expand: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
