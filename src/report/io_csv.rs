// Primitives for reading and writing CSV files.

use std::fs::File;

use csv::{ReaderBuilder, Writer};

use crate::report::io_common::{build_records, Cell, ColumnAliases};
use crate::report::*;

/// Reads the tables from a directory holding one CSV file per tab, named
/// after the tab (`BaseQuery.csv`, `Activos.csv`, `CO.csv`).
pub fn read_directory(
    path: &str,
    cfs: &FileSource,
    aliases: &ColumnAliases,
    labels: &StatusLabels,
) -> ReportResult<Vec<(&'static str, Vec<PersonnelRecord>)>> {
    let delimiter = cfs.csv_delimiter()?;
    let mut res: Vec<(&'static str, Vec<PersonnelRecord>)> = Vec::new();
    for (table, sheet) in cfs.sheets() {
        let p: PathBuf = [Path::new(path), Path::new(&format!("{}.csv", sheet))]
            .iter()
            .collect();
        if !p.is_file() {
            info!("read_directory: no file {}", p.display());
            continue;
        }
        let (header, rows) = read_table(&p, delimiter)?;
        let records = build_records(&sheet, &header, &rows, aliases, labels, table == CURRENT_TABLE)?;
        res.push((table, records));
    }
    Ok(res)
}

fn read_table(p: &Path, delimiter: u8) -> ReportResult<(Vec<String>, Vec<Vec<Cell>>)> {
    let path = p.display().to_string();
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(p)
        .context(CsvOpenSnafu { path: path.clone() })?;
    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineSnafu {
            path: path.clone(),
            lineno: 1_u64,
        })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_table: {}: header: {:?}", path, header);

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is the first line.
        let lineno = (idx + 2) as u64;
        let line = line_r.context(CsvLineSnafu {
            path: path.clone(),
            lineno,
        })?;
        rows.push(
            line.iter()
                .map(|s| {
                    if s.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(s.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok((header, rows))
}

pub const EVENTS_HEADER: [&str; 8] = [
    "Nº pers.",
    "Apellido",
    "Nombre de pila",
    "Línea",
    "Categoría",
    "Desde",
    "Motivo de la medida",
    "Tipo",
];

/// Writes the detail of the departures, one line per event.
pub fn write_events_csv(p: &Path, events: &[DepartureEvent]) -> ReportResult<()> {
    let path = p.display().to_string();
    if let Some(dir) = p.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).context(WritingFileSnafu { path: path.clone() })?;
        }
    }
    let mut wtr: Writer<File> = Writer::from_path(p).context(CsvOpenSnafu { path: path.clone() })?;
    wtr.write_record(EVENTS_HEADER).context(CsvWriteSnafu {})?;
    for e in events.iter() {
        let date = e
            .effective_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default();
        wtr.write_record([
            e.employee_id.as_str(),
            e.last_name.as_str(),
            e.first_name.as_str(),
            e.org_line.as_str(),
            e.category.as_str(),
            date.as_str(),
            e.reason.as_str(),
            e.exit.label(),
        ])
        .context(CsvWriteSnafu {})?;
    }
    wtr.flush().context(WritingFileSnafu { path: path.clone() })?;
    info!("write_events_csv: {} events written to {}", events.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_without_ledger() {
        let dir = std::env::temp_dir().join("bajas_csv_without_ledger");
        fs::create_dir_all(&dir).unwrap();
        let _ = fs::remove_file(dir.join("CO.csv"));
        fs::write(
            dir.join("BaseQuery.csv"),
            "Legajo,Status\n7,Activo\n8,Suspendido\n",
        )
        .unwrap();
        fs::write(dir.join("Activos.csv"), "Legajo\n7\n8\n").unwrap();
        let cfs = FileSource::from_input(&dir.display().to_string(), Some("csv".to_string()));
        let tables = read_directory(
            &dir.display().to_string(),
            &cfs,
            &ColumnAliases::default(),
            &StatusLabels::default(),
        )
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec![CURRENT_TABLE, PRIOR_TABLE]);
        assert_eq!(
            tables[0].1[1].occupation_status,
            OccupationStatus::Other("Suspendido".to_string())
        );
    }

    #[test]
    fn missing_status_column() {
        let dir = std::env::temp_dir().join("bajas_csv_missing_status");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("BaseQuery.csv"), "Legajo,Apellido\n7,Roca\n").unwrap();
        let cfs = FileSource::from_input(&dir.display().to_string(), Some("csv".to_string()));
        let res = read_directory(
            &dir.display().to_string(),
            &cfs,
            &ColumnAliases::default(),
            &StatusLabels::default(),
        );
        match res {
            Err(ReportError::MissingColumn { sheet, column }) => {
                assert_eq!(sheet, "BaseQuery");
                assert_eq!(column, "occupation_status");
            }
            x => panic!("unexpected {:?}", x),
        }
    }
}
