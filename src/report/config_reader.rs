use crate::report::io_common::parse_date_str;
use crate::report::*;

use std::collections::BTreeMap;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "reportName")]
    pub report_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "author")]
    pub author: Option<String>,
    #[serde(rename = "eventsCsv")]
    pub events_csv: Option<String>,
}

impl OutputSettings {
    pub const DEFAULT_REPORT_NAME: &'static str = "Bajas y Cambios Organizativos";
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    /// xlsx or csv
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "currentSheet")]
    pub current_sheet: Option<String>,
    #[serde(rename = "priorSheet")]
    pub prior_sheet: Option<String>,
    #[serde(rename = "ledgerSheet")]
    pub ledger_sheet: Option<String>,
    /// Extra header names, by canonical field name (employee_id, org_line, ...).
    #[serde(rename = "columnAliases")]
    pub column_aliases: Option<BTreeMap<String, Vec<String>>>,
    #[serde(rename = "csvDelimiter")]
    pub csv_delimiter: Option<String>,
}

impl FileSource {
    pub fn from_input(path: &str, provider: Option<String>) -> FileSource {
        FileSource {
            provider: provider.unwrap_or_else(|| "xlsx".to_string()),
            file_path: path.to_string(),
            current_sheet: None,
            prior_sheet: None,
            ledger_sheet: None,
            column_aliases: None,
            csv_delimiter: None,
        }
    }

    /// The tab name to read for each of the tables.
    pub fn sheets(&self) -> Vec<(&'static str, String)> {
        let name = |o: &Option<String>, default: &str| o.clone().unwrap_or_else(|| default.to_string());
        vec![
            (CURRENT_TABLE, name(&self.current_sheet, CURRENT_TABLE)),
            (PRIOR_TABLE, name(&self.prior_sheet, PRIOR_TABLE)),
            (LEDGER_TABLE, name(&self.ledger_sheet, LEDGER_TABLE)),
        ]
    }

    pub fn csv_delimiter(&self) -> ReportResult<u8> {
        match self.csv_delimiter.as_deref() {
            None => Ok(b','),
            Some(s) if s.len() == 1 => Ok(s.as_bytes()[0]),
            Some(s) => InvalidOptionSnafu {
                name: "csvDelimiter",
                value: s,
            }
            .fail(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportRules {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "unmatchedPolicy")]
    pub unmatched_policy: Option<String>,
    #[serde(rename = "activeLabels")]
    pub active_labels: Option<Vec<String>>,
    #[serde(rename = "deactivatedLabels")]
    pub deactivated_labels: Option<Vec<String>>,
    #[serde(rename = "monthNames")]
    pub month_names: Option<String>,
    #[serde(rename = "lineOrder")]
    pub line_order: Option<Vec<String>>,
}

impl ReportRules {
    pub fn date_range(&self) -> ReportResult<DateRange> {
        let read = |o: &Option<String>| -> ReportResult<Option<NaiveDate>> {
            match o {
                None => Ok(None),
                Some(s) => parse_date_str(s)
                    .map(Some)
                    .context(InvalidDateSnafu { value: s.clone() }),
            }
        };
        let range = DateRange {
            start: read(&self.start_date)?,
            end: read(&self.end_date)?,
        };
        if let (Some(s), Some(e)) = (range.start, range.end) {
            if s > e {
                whatever!("the start date {} is after the end date {}", s, e)
            }
        }
        Ok(range)
    }

    pub fn unmatched_policy(&self) -> ReportResult<UnmatchedPolicy> {
        match self.unmatched_policy.as_deref() {
            None | Some("keep") | Some("keepWithPlaceholder") => {
                Ok(UnmatchedPolicy::KeepWithPlaceholder)
            }
            Some("drop") => Ok(UnmatchedPolicy::Drop),
            Some(x) => InvalidOptionSnafu {
                name: "unmatchedPolicy",
                value: x,
            }
            .fail(),
        }
    }

    /// The default labels, extended with the configured ones.
    pub fn status_labels(&self) -> StatusLabels {
        let mut labels = StatusLabels::default();
        if let Some(extra) = &self.active_labels {
            labels.active.extend(extra.iter().cloned());
        }
        if let Some(extra) = &self.deactivated_labels {
            labels.deactivated.extend(extra.iter().cloned());
        }
        labels
    }

    pub fn month_names(&self) -> ReportResult<MonthNames> {
        match self.month_names.as_deref() {
            None | Some("es") => Ok(MonthNames::Spanish),
            Some("en") => Ok(MonthNames::English),
            Some(x) => InvalidOptionSnafu {
                name: "monthNames",
                value: x,
            }
            .fail(),
        }
    }

    pub fn reconcile_rules(&self) -> ReportResult<ReconcileRules> {
        Ok(ReconcileRules {
            unmatched_policy: self.unmatched_policy()?,
            date_range: self.date_range()?,
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub sources: Vec<FileSource>,
    #[serde(default)]
    pub rules: ReportRules,
}

impl ReportConfig {
    /// The configuration used when only an input file is given.
    pub fn from_input(path: &str, provider: Option<String>) -> ReportConfig {
        ReportConfig {
            output_settings: OutputSettings {
                report_name: OutputSettings::DEFAULT_REPORT_NAME.to_string(),
                output_directory: None,
                author: None,
                events_csv: None,
            },
            sources: vec![FileSource::from_input(path, provider)],
            rules: ReportRules::default(),
        }
    }
}

pub fn read_config(path: &str) -> ReportResult<ReportConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> ReportResult<ReportConfig> {
    let config: ReportConfig = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    ensure_whatever!(
        !config.sources.is_empty(),
        "the configuration does not list any source"
    );
    Ok(config)
}

/// Reads a reference summary, as written by a previous run.
pub fn read_summary(path: &str) -> ReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
