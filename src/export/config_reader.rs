use log::debug;
use std::fs;
use snafu::prelude::*;

use crate::export::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "filePrefix")]
    pub file_prefix: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    /// `xlsx` or `csv`. Inferred from the extension of the file when missing.
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Sources {
    pub assignments: FileSource,
    pub facilities: Option<FileSource>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportRules {
    #[serde(rename = "expandPlaceholders")]
    pub expand_placeholders: Option<bool>,
    #[serde(rename = "exemptMobileSupport")]
    pub exempt_mobile_support: Option<bool>,
    #[serde(rename = "facilityMergePolicy")]
    pub facility_merge_policy: Option<String>,
    #[serde(rename = "unmatchedFacilityTypeLabel")]
    pub unmatched_facility_type_label: Option<String>,
    #[serde(rename = "governedCounties")]
    pub governed_counties: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    pub sources: Sources,
    #[serde(default)]
    pub rules: ExportRules,
}

pub fn read_config(path: &str) -> GisResult<ExportConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    debug!("read_config: read content: {:?}", contents);
    parse_config(&contents, path)
}

fn parse_config(contents: &str, path: &str) -> GisResult<ExportConfig> {
    serde_json::from_str(contents).context(ParsingJsonSnafu { path })
}
