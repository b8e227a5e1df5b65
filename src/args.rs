use clap::Parser;

/// This program finds the departures (bajas and organizational changes) between two roster snapshots.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the report: input files, rules and output settings.
    /// Without it, the --input option is required.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the summary of a report in JSON format. If provided, bajas will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the report will be written in JSON format to the given
    /// location. Setting this option overrides the output directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The workbook with the BaseQuery, Activos and CO tabs (or the directory with the
    /// corresponding CSV files). Setting this option overrides the sources of the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default xlsx) The type of the input: xlsx or csv.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (date, optional) Only keep the departures from this date (inclusive). Format yyyy-mm-dd or dd/mm/yyyy.
    #[clap(long, value_parser)]
    pub from: Option<String>,

    /// (date, optional) Only keep the departures up to this date (inclusive). Format yyyy-mm-dd or dd/mm/yyyy.
    #[clap(long, value_parser)]
    pub to: Option<String>,

    /// (keep or drop, default keep) What to do with the employees who left the roster without an entry in the CO tab.
    #[clap(long, value_parser)]
    pub unmatched_policy: Option<String>,

    /// (list of values, optional) The order of the lines in the summary tables. Lines not listed are left out
    /// of the per-line tables.
    #[clap(long, value_parser)]
    pub line_order: Option<Vec<String>>,

    /// (text, optional) Only list the departures for which one field contains this text (case insensitive).
    #[clap(short, long, value_parser)]
    pub search: Option<String>,

    /// (file path, optional) Writes the list of departures in CSV format to the given location.
    #[clap(long, value_parser)]
    pub events_out: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
