use log::{debug, info, warn};

use departures::*;
use snafu::{prelude::*, Snafu};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;

use chrono::NaiveDate;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;
use crate::report::io_common::ColumnAliases;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;
pub mod render;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Sheet {sheet} does not have a header line"))]
    EmptySheet { sheet: String },
    #[snafu(display("Sheet {sheet} does not have a column for {column}"))]
    MissingColumn { sheet: String, column: String },
    #[snafu(display("Sheet {sheet}, line {lineno}: cannot read the employee id from {content}"))]
    ExcelWrongCellType {
        sheet: String,
        lineno: u64,
        content: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV file {path}, line {lineno}"))]
    CsvLine {
        source: csv::Error,
        path: String,
        lineno: u64,
    },
    #[snafu(display("Error writing CSV"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Cannot read date {value:?}: expected yyyy-mm-dd or dd/mm/yyyy"))]
    InvalidDate { value: String },
    #[snafu(display("Invalid value {value:?} for option {name}"))]
    InvalidOption { name: String, value: String },
    #[snafu(display("Unknown table {name}"))]
    UnknownTable { name: String },
    #[snafu(display("Reconciliation failed"))]
    Reconcile { source: ReconcileError },
    #[snafu(display("The summary differs from the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

/// A pivot table with its title.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReportTable {
    pub title: String,
    pub table: PivotTable,
}

/// Everything that is printed or written by a run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Report {
    pub settings: OutputSettings,
    pub rules: ReconcileRules,
    pub reconciliation: Reconciliation,
    pub kpis: Kpis,
    pub tables: Vec<ReportTable>,
}

fn table_specs(rules: &ReportRules) -> Vec<(&'static str, PivotSpec)> {
    let by_line = |rows: Dimension| {
        let spec = PivotSpec::new(rows, Dimension::OrgLine);
        match &rules.line_order {
            Some(order) if !order.is_empty() => spec.with_column_order(order),
            _ => spec,
        }
    };
    vec![
        (
            "Salidas por mes",
            PivotSpec::new(Dimension::Exit, Dimension::Month),
        ),
        (
            "Motivos por mes",
            PivotSpec::new(Dimension::Reason, Dimension::Month),
        ),
        (
            "Motivos por año",
            PivotSpec::new(Dimension::Reason, Dimension::Year),
        ),
        ("Motivos por línea", by_line(Dimension::Reason)),
        (
            "Estacionalidad",
            PivotSpec::new(Dimension::Exit, Dimension::MonthOfYear),
        ),
        ("Categorías por línea", by_line(Dimension::Category)),
    ]
}

/// Reads all the tables of one source. Tables that are not found are left out.
fn read_source(
    root: &Path,
    cfs: &FileSource,
    labels: &StatusLabels,
) -> ReportResult<Vec<(&'static str, Vec<PersonnelRecord>)>> {
    let p: PathBuf = [root, Path::new(&cfs.file_path)].iter().collect();
    let p2 = p.as_path().display().to_string();
    let aliases = ColumnAliases::with_extra(&cfs.column_aliases)?;
    info!("Attempting to read roster file {:?}", p2);
    match cfs.provider.as_str() {
        "xlsx" | "excel" => io_excel::read_workbook(&p2, cfs, &aliases, labels),
        "csv" => io_csv::read_directory(&p2, cfs, &aliases, labels),
        x => InvalidOptionSnafu {
            name: "provider",
            value: x,
        }
        .fail(),
    }
}

/// Loads the snapshot tables of all the sources. The lines of a table found
/// in several sources are concatenated, in the order of the sources.
pub fn load_snapshots(
    root: &Path,
    sources: &[FileSource],
    labels: &StatusLabels,
) -> ReportResult<SnapshotSet> {
    let mut tables: BTreeMap<&'static str, Vec<PersonnelRecord>> = BTreeMap::new();
    for cfs in sources.iter() {
        for (name, mut records) in read_source(root, cfs, labels)? {
            tables.entry(name).or_default().append(&mut records);
        }
    }
    let mut builder = SnapshotSet::builder();
    for (name, records) in tables {
        debug!("load_snapshots: table {}: {} lines", name, records.len());
        builder = builder
            .table(name, records)
            .map_err(|name| UnknownTableSnafu { name }.build())?;
    }
    Ok(builder.build())
}

/// Runs the reconciliation and assembles the summary tables.
pub fn build_report(config: &ReportConfig, snapshots: &SnapshotSet) -> ReportResult<Report> {
    let rules = config.rules.reconcile_rules()?;
    let month_names = config.rules.month_names()?;
    let reconciliation = reconcile(snapshots, &rules).context(ReconcileSnafu {})?;
    for n in reconciliation.notices.iter() {
        debug!("build_report: notice: {}", n);
    }
    let kpis = Kpis::compute(&reconciliation.events, month_names);
    let tables = table_specs(&config.rules)
        .into_iter()
        .map(|(title, spec)| ReportTable {
            title: title.to_string(),
            table: PivotTable::build(&reconciliation.events, &spec, month_names),
        })
        .collect();
    Ok(Report {
        settings: config.output_settings.clone(),
        rules,
        reconciliation,
        kpis,
        tables,
    })
}

fn date_js(d: Option<NaiveDate>) -> JSValue {
    match d {
        Some(x) => json!(x.format("%Y-%m-%d").to_string()),
        None => JSValue::Null,
    }
}

fn top_js(top: &Option<(BucketKey, usize)>) -> JSValue {
    match top {
        Some((k, c)) => json!({"label": k.label, "count": c}),
        None => JSValue::Null,
    }
}

fn event_js(e: &DepartureEvent) -> JSValue {
    json!({
        "employeeId": e.employee_id,
        "lastName": e.last_name,
        "firstName": e.first_name,
        "line": e.org_line,
        "category": e.category,
        "date": date_js(e.effective_date),
        "reason": e.reason,
        "exit": e.exit.label(),
        "ledgerMatch": e.ledger_match,
    })
}

fn table_js(t: &ReportTable) -> JSValue {
    let counts: Vec<JSValue> = t
        .table
        .rows
        .iter()
        .chain(std::iter::once(&t.table.totals))
        .map(|r| json!({"row": r.key.label, "cells": r.cells, "total": r.total}))
        .collect();
    json!({
        "title": t.title,
        "rows": t.table.spec.rows.name(),
        "columns": t.table.spec.columns.name(),
        "header": t.table.header(),
        "grid": t.table.render(),
        "counts": counts,
        "skipped": t.table.skipped,
    })
}

/// The JSON summary of a report. It does not contain any timestamp, so that
/// it can be compared with a reference.
pub fn build_summary_js(report: &Report) -> JSValue {
    let rec = &report.reconciliation;
    let k = &report.kpis;
    let policy = match report.rules.unmatched_policy {
        UnmatchedPolicy::KeepWithPlaceholder => "keepWithPlaceholder",
        UnmatchedPolicy::Drop => "drop",
    };
    let config = json!({
        "reportName": report.settings.report_name,
        "author": report.settings.author,
        "from": date_js(report.rules.date_range.start),
        "to": date_js(report.rules.date_range.end),
        "unmatchedPolicy": policy,
    });
    let kpis = json!({
        "total": k.total,
        "systemDeactivations": k.system_deactivations,
        "organizationalChanges": k.organizational_changes,
        "unresolvedChanges": k.unresolved_changes,
        "departed": rec.departed_count,
        "topReason": top_js(&k.top_reason),
        "topLine": top_js(&k.top_line),
        "topCategory": top_js(&k.top_category),
        "topMonth": top_js(&k.top_month),
        "firstDate": date_js(k.first_date),
        "lastDate": date_js(k.last_date),
        "period": k.date_span(),
    });
    let unclassified: Vec<JSValue> = rec
        .unclassified
        .iter()
        .map(|u| json!({"employeeId": u.employee_id, "status": u.status}))
        .collect();
    json!({
        "config": config,
        "kpis": kpis,
        "notices": rec.notices.iter().map(|n| n.to_string()).collect::<Vec<String>>(),
        "events": rec.events.iter().map(event_js).collect::<Vec<JSValue>>(),
        "dropped": rec.dropped,
        "unclassified": unclassified,
        "tables": report.tables.iter().map(table_js).collect::<Vec<JSValue>>(),
    })
}

// The configuration and the directory that the relative paths refer to.
fn load_config(args: &Args) -> ReportResult<(ReportConfig, PathBuf)> {
    let (mut config, root) = match (&args.config, &args.input) {
        (Some(config_path), _) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        (None, Some(input)) => (
            ReportConfig::from_input(input, args.input_type.clone()),
            PathBuf::new(),
        ),
        (None, None) => {
            whatever!("No input: use the --config or the --input option")
        }
    };

    // The command line wins over the configuration file.
    if let (Some(_), Some(input)) = (&args.config, &args.input) {
        let cwd = std::env::current_dir().whatever_context("cannot read the current directory")?;
        let p: PathBuf = [cwd.as_path(), Path::new(input)].iter().collect();
        let mut source = FileSource::from_input(&p.display().to_string(), args.input_type.clone());
        // Keep the sheet names and aliases of the first configured source.
        if let Some(first) = config.sources.first() {
            source = FileSource {
                provider: args.input_type.clone().unwrap_or_else(|| first.provider.clone()),
                current_sheet: first.current_sheet.clone(),
                prior_sheet: first.prior_sheet.clone(),
                ledger_sheet: first.ledger_sheet.clone(),
                column_aliases: first.column_aliases.clone(),
                csv_delimiter: first.csv_delimiter.clone(),
                ..source
            };
        }
        config.sources = vec![source];
    }
    if let Some(x) = &args.from {
        config.rules.start_date = Some(x.clone());
    }
    if let Some(x) = &args.to {
        config.rules.end_date = Some(x.clone());
    }
    if let Some(x) = &args.unmatched_policy {
        config.rules.unmatched_policy = Some(x.clone());
    }
    if let Some(x) = &args.line_order {
        config.rules.line_order = Some(x.clone());
    }
    Ok((config, root))
}

fn write_file(path: &Path, contents: &str) -> ReportResult<()> {
    let path_s = path.display().to_string();
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).context(WritingFileSnafu {
                path: path_s.clone(),
            })?;
        }
    }
    fs::write(path, contents).context(WritingFileSnafu { path: path_s })
}

/// Compares the summary with a reference file, and prints the differences.
pub fn check_reference(pretty_js: &str, reference_path: &str) -> ReportResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_ref = serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_ref != pretty_js {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_ref.as_str(), pretty_js, "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    info!("The summary matches the reference {}", reference_path);
    Ok(())
}

pub fn run_report(args: &Args) -> ReportResult<()> {
    let (config, root) = load_config(args)?;
    info!("config: {:?}", config);

    let labels = config.rules.status_labels();
    let snapshots = load_snapshots(&root, &config.sources, &labels)?;
    let report = build_report(&config, &snapshots)?;
    info!(
        "run_report: {} departures, {} notices",
        report.reconciliation.events.len(),
        report.reconciliation.notices.len()
    );

    let result_js = build_summary_js(&report);
    let pretty_js = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    let to_stdout = args.out.as_deref() == Some("stdout");
    match (args.out.as_deref(), &config.output_settings.output_directory) {
        (Some("stdout"), _) => println!("{}", pretty_js),
        (Some(""), _) => {}
        (Some(out), _) => write_file(Path::new(out), &pretty_js)?,
        (None, Some(dir)) => {
            let p: PathBuf = [root.as_path(), Path::new(dir), Path::new("summary.json")]
                .iter()
                .collect();
            info!("Writing the summary to {}", p.display());
            write_file(&p, &pretty_js)?;
        }
        (None, None) => {}
    }

    if !to_stdout {
        let text = render::render_report(&report, args.search.as_deref());
        print!("{}", text);
    }

    let events_out = match (&args.events_out, &config.output_settings.events_csv) {
        (Some(p), _) => Some(PathBuf::from(p)),
        (None, Some(p)) => Some([root.as_path(), Path::new(p)].iter().collect()),
        (None, None) => None,
    };
    if let Some(p) = events_out {
        io_csv::write_events_csv(&p, &report.reconciliation.events)?;
    }

    if let Some(reference) = &args.reference {
        check_reference(&pretty_js, reference)?;
    }
    Ok(())
}

/// Prints an error and its chain of causes.
pub fn print_error(e: &ReportError) {
    eprintln!("Error: {}", e);
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn snapshots() -> SnapshotSet {
        SnapshotSet::builder()
            .prior(vec![
                PersonnelRecord::new("1").with_line("Roca").with_category("Guarda"),
                PersonnelRecord::new("2").with_line("Mitre"),
                PersonnelRecord::new("3").with_line("Roca"),
                PersonnelRecord::new("4"),
            ])
            .current(vec![
                PersonnelRecord::new("1")
                    .with_status(OccupationStatus::Deactivated)
                    .with_date(d(2025, 2, 1))
                    .with_reason("Renuncia"),
                PersonnelRecord::new("3").with_status(OccupationStatus::Active),
            ])
            .ledger(vec![PersonnelRecord::new("2")
                .with_date(d(2025, 3, 10))
                .with_line("Mitre")])
            .build()
    }

    fn config() -> ReportConfig {
        ReportConfig::from_input("roster.xlsx", None)
    }

    #[test]
    fn report_tables() {
        let report = build_report(&config(), &snapshots()).unwrap();
        let rec = &report.reconciliation;
        assert_eq!(rec.events.len(), 3);
        assert_eq!(report.kpis.system_deactivations, 1);
        assert_eq!(report.kpis.organizational_changes, 2);
        assert_eq!(report.kpis.unresolved_changes, 1);
        assert_eq!(report.tables.len(), 6);

        let by_month = &report.tables[0].table;
        assert_eq!(by_month.get("Baja", "Ene 2025"), Some(1));
        assert_eq!(by_month.get("Cambio Organizativo", "Mar 2025"), Some(1));
        // Employee 4 has no date.
        assert_eq!(by_month.skipped, 1);
        assert_eq!(by_month.grand_total(), 2);

        let by_line = &report.tables[3].table;
        assert_eq!(by_line.get("Renuncia", "ROCA"), Some(1));
        // Lines are upper-cased, including the placeholder.
        assert_eq!(by_line.get("Sin Datos", "SIN DATOS"), Some(1));
    }

    #[test]
    fn line_order_and_range() {
        let mut config = config();
        config.rules.line_order = Some(vec!["mitre".to_string(), "ROCA".to_string()]);
        config.rules.start_date = Some("2025-03-01".to_string());
        let report = build_report(&config, &snapshots()).unwrap();
        assert_eq!(report.reconciliation.events.len(), 1);
        let by_line = &report.tables[3].table;
        assert_eq!(
            by_line.header(),
            vec!["Motivo".to_string(), "MITRE".to_string(), "Total".to_string()]
        );
    }

    #[test]
    fn summary_js() {
        let report = build_report(&config(), &snapshots()).unwrap();
        let js = build_summary_js(&report);
        assert_eq!(js["kpis"]["total"], json!(3));
        assert_eq!(js["kpis"]["period"], json!("31/01/2025 al 10/03/2025"));
        assert_eq!(js["events"][0]["employeeId"], json!("2"));
        assert_eq!(js["events"][0]["reason"], json!("Reubicado"));
        assert_eq!(js["events"][1]["date"], json!("2025-01-31"));
        assert_eq!(js["events"][2]["date"], JSValue::Null);
        assert_eq!(js["config"]["unmatchedPolicy"], json!("keepWithPlaceholder"));
        assert_eq!(js["tables"].as_array().map(|a| a.len()), Some(6));
        // Same input, same summary.
        let again = build_summary_js(&build_report(&config(), &snapshots()).unwrap());
        assert_eq!(js, again);
    }

    #[test]
    fn missing_tables() {
        let snapshots = SnapshotSet::builder()
            .prior(vec![PersonnelRecord::new("1")])
            .build();
        let res = build_report(&config(), &snapshots);
        assert!(matches!(res, Err(ReportError::Reconcile { .. })));
    }

    fn write_csv(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(format!("{}.csv", name)), contents).unwrap();
    }

    #[test]
    fn csv_end_to_end() {
        let dir = std::env::temp_dir().join("bajas_csv_end_to_end");
        fs::create_dir_all(&dir).unwrap();
        write_csv(
            &dir,
            "BaseQuery",
            "Nº pers.;Apellido;Línea;Status ocupación;Desde;Motivo de la medida\n\
             0101;Perez;Roca;Dado de baja;15/03/2024;Renuncia\n\
             102;Gomez;Mitre;Activo;01/01/2020;\n",
        );
        write_csv(
            &dir,
            "Activos",
            "Nº pers.;Apellido;Línea\n101;Perez;Roca\n102;Gomez;Mitre\n103;Diaz;Sarmiento\n",
        );
        write_csv(
            &dir,
            "CO",
            "Legajo;Desde;Motivo\n103;2024-04-02;Traslado\n",
        );
        let source = FileSource {
            csv_delimiter: Some(";".to_string()),
            ..FileSource::from_input(&dir.display().to_string(), Some("csv".to_string()))
        };
        let snapshots =
            load_snapshots(Path::new(""), &[source], &StatusLabels::default()).unwrap();
        let report = build_report(&config(), &snapshots).unwrap();
        let events = &report.reconciliation.events;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].employee_id, "103");
        assert_eq!(events[0].reason, "Traslado");
        assert_eq!(events[0].org_line, "SARMIENTO");
        assert_eq!(events[1].employee_id, "101");
        assert_eq!(events[1].effective_date, Some(d(2024, 3, 14)));
        assert!(!report
            .reconciliation
            .notices
            .contains(&Notice::MissingLedger));

        let out = dir.join("out").join("events.csv");
        io_csv::write_events_csv(&out, events).unwrap();
        let written = fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("Nº pers.,Apellido"));
        assert!(written.contains("101,Perez,,ROCA,,14/03/2024,Renuncia,Baja"));
    }

    #[test]
    fn reference_check() {
        let dir = std::env::temp_dir().join("bajas_reference_check");
        fs::create_dir_all(&dir).unwrap();
        let report = build_report(&config(), &snapshots()).unwrap();
        let pretty = serde_json::to_string_pretty(&build_summary_js(&report)).unwrap();
        let p = dir.join("expected_summary.json");
        fs::write(&p, &pretty).unwrap();
        let p_s = p.display().to_string();
        assert!(check_reference(&pretty, &p_s).is_ok());
        assert!(matches!(
            check_reference("{}", &p_s),
            Err(ReportError::ReferenceMismatch { .. })
        ));
    }
}
