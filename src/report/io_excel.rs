// Reading the roster tabs of an Excel workbook.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::report::io_common::{build_records, excel_serial_to_date, Cell, ColumnAliases};
use crate::report::*;

pub fn read_workbook(
    path: &str,
    cfs: &FileSource,
    aliases: &ColumnAliases,
    labels: &StatusLabels,
) -> ReportResult<Vec<(&'static str, Vec<PersonnelRecord>)>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    debug!("read_workbook: sheets: {:?}", workbook.sheet_names());

    let mut res: Vec<(&'static str, Vec<PersonnelRecord>)> = Vec::new();
    for (table, sheet) in cfs.sheets() {
        // Tab names are matched ignoring case and surrounding spaces.
        let found = workbook
            .sheet_names()
            .iter()
            .find(|s| s.trim().to_lowercase() == sheet.trim().to_lowercase())
            .cloned();
        let name = match found {
            Some(x) => x,
            None => {
                info!("read_workbook: {}: no sheet {:?}", path, sheet);
                continue;
            }
        };
        let wrange = match workbook.worksheet_range(&name) {
            Some(r) => r.context(OpeningExcelSnafu { path })?,
            None => continue,
        };

        let mut iter = wrange.rows();
        let header: Vec<String> = iter
            .next()
            .context(EmptySheetSnafu { sheet: name.clone() })?
            .iter()
            .map(|c| read_cell(c).text())
            .collect();
        debug!("read_workbook: {}: header: {:?}", name, header);
        let rows: Vec<Vec<Cell>> = iter.map(|row| row.iter().map(read_cell).collect()).collect();
        let records = build_records(
            &name,
            &header,
            &rows,
            aliases,
            labels,
            table == CURRENT_TABLE,
        )?;
        res.push((table, records));
    }
    Ok(res)
}

fn read_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Float(f) => Cell::Number(*f),
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Bool(b) => Cell::Text(b.to_string()),
        DataType::DateTime(f) => match excel_serial_to_date(*f) {
            Some(d) => Cell::Date(d),
            None => Cell::Number(*f),
        },
        DataType::Error(e) => Cell::Invalid(format!("{:?}", e)),
        DataType::Empty => Cell::Empty,
        #[allow(unreachable_patterns)]
        x => Cell::Text(format!("{:?}", x)),
    }
}
