// Primitives shared by the spreadsheet and CSV readers: header aliasing,
// cell conversion and record assembly.

use std::collections::{BTreeMap, HashMap};

use crate::report::*;

/// The canonical columns of a roster table.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Field {
    EmployeeId,
    LastName,
    FirstName,
    OrgLine,
    Category,
    OccupationStatus,
    EffectiveFrom,
    Reason,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::EmployeeId,
        Field::LastName,
        Field::FirstName,
        Field::OrgLine,
        Field::Category,
        Field::OccupationStatus,
        Field::EffectiveFrom,
        Field::Reason,
    ];

    pub fn canonical_name(&self) -> &'static str {
        match self {
            Field::EmployeeId => "employee_id",
            Field::LastName => "last_name",
            Field::FirstName => "first_name",
            Field::OrgLine => "org_line",
            Field::Category => "category",
            Field::OccupationStatus => "occupation_status",
            Field::EffectiveFrom => "effective_from",
            Field::Reason => "reason",
        }
    }

    /// The header names found in the roster exports.
    fn default_aliases(&self) -> &'static [&'static str] {
        match self {
            Field::EmployeeId => &["Nº pers.", "No pers.", "Legajo", "Employee ID"],
            Field::LastName => &["Apellido", "Last name"],
            Field::FirstName => &["Nombre de pila", "Nombre", "First name"],
            Field::OrgLine => &["Línea", "División de personal", "Line"],
            Field::Category => &["Categoría", "Category"],
            Field::OccupationStatus => &["Status ocupación", "Status"],
            Field::EffectiveFrom => &["Desde", "Fecha", "Effective from", "Date"],
            Field::Reason => &["Motivo de la medida", "Motivo", "Reason"],
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL
            .iter()
            .find(|f| f.canonical_name() == name.trim())
            .cloned()
    }
}

/// Header names accepted for each field, in folded form.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnAliases {
    aliases: BTreeMap<Field, Vec<String>>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        let aliases = Field::ALL
            .iter()
            .map(|f| {
                let mut names: Vec<String> = vec![fold_header(f.canonical_name())];
                names.extend(f.default_aliases().iter().map(|s| fold_header(s)));
                (*f, names)
            })
            .collect();
        ColumnAliases { aliases }
    }
}

impl ColumnAliases {
    /// The default aliases, with the extra names of the configuration.
    pub fn with_extra(extra: &Option<BTreeMap<String, Vec<String>>>) -> ReportResult<ColumnAliases> {
        let mut res = ColumnAliases::default();
        if let Some(m) = extra {
            for (name, headers) in m.iter() {
                let field = Field::from_name(name).context(InvalidOptionSnafu {
                    name: "columnAliases",
                    value: name.clone(),
                })?;
                if let Some(v) = res.aliases.get_mut(&field) {
                    v.extend(headers.iter().map(|h| fold_header(h)));
                }
            }
        }
        Ok(res)
    }

    /// Finds the column of each field. The first matching column wins.
    pub fn resolve(&self, header: &[String]) -> HashMap<Field, usize> {
        let folded: Vec<String> = header.iter().map(|h| fold_header(h)).collect();
        let mut res: HashMap<Field, usize> = HashMap::new();
        for (field, names) in self.aliases.iter() {
            if let Some(idx) = folded.iter().position(|h| names.contains(h)) {
                res.insert(*field, idx);
            }
        }
        res
    }
}

/// Lower case, without accents and with single spaces. The ordinal
/// indicator of `Nº` is read as a plain `o`.
pub fn fold_header(s: &str) -> String {
    let mapped: String = s
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'º' | '°' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            x => x,
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// A cell, independently of the file format.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
    /// A cell holding an error value, with its description.
    Invalid(String),
}

impl Cell {
    /// The content as trimmed text. Integral numbers are written without decimals.
    pub fn text(&self) -> String {
        match self {
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
            Cell::Number(f) => f.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Empty | Cell::Invalid(_) => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Empty => true,
            _ => false,
        }
    }

    pub fn date(&self) -> RecordDate {
        match self {
            Cell::Date(d) => RecordDate::Date(*d),
            Cell::Number(f) => match excel_serial_to_date(*f) {
                Some(d) => RecordDate::Date(d),
                None => RecordDate::Unparsed(f.to_string()),
            },
            Cell::Text(s) if s.trim().is_empty() => RecordDate::Missing,
            Cell::Text(s) => match parse_date_str(s) {
                Some(d) => RecordDate::Date(d),
                None => RecordDate::Unparsed(s.trim().to_string()),
            },
            Cell::Empty => RecordDate::Missing,
            Cell::Invalid(s) => RecordDate::Unparsed(s.clone()),
        }
    }
}

/// Converts a spreadsheet serial date (days since 1899-12-30) to a date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // 9999-12-31 is the last date a spreadsheet can hold.
    if !(1.0..2958466.0).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?
        .checked_add_signed(chrono::Duration::days(serial.floor() as i64))
}

/// Reads a date written as dd/mm/yyyy, dd.mm.yyyy, dd-mm-yyyy, yyyy-mm-dd or
/// yyyy/mm/dd. A time part after a space or a `T` is ignored.
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 5] = ["%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y", "%Y-%m-%d", "%Y/%m/%d"];
    let day = s.trim().split(|c: char| c == ' ' || c == 'T').next()?;
    FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(day, f).ok())
}

/// Builds the records of one table from its header and rows.
///
/// The employee id column is always required. The status column is required
/// for the current roster.
pub fn build_records(
    sheet: &str,
    header: &[String],
    rows: &[Vec<Cell>],
    aliases: &ColumnAliases,
    labels: &StatusLabels,
    require_status: bool,
) -> ReportResult<Vec<PersonnelRecord>> {
    let cols = aliases.resolve(header);
    debug!("build_records: {}: columns {:?}", sheet, cols);
    let mut required = vec![Field::EmployeeId];
    if require_status {
        required.push(Field::OccupationStatus);
    }
    for f in required.iter() {
        ensure!(
            cols.contains_key(f),
            MissingColumnSnafu {
                sheet,
                column: f.canonical_name(),
            }
        );
    }
    for f in Field::ALL.iter().filter(|f| !cols.contains_key(*f)) {
        debug!("build_records: {}: no column for {}", sheet, f.canonical_name());
    }

    let mut res: Vec<PersonnelRecord> = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        if row.iter().all(|c| c.is_empty()) {
            continue;
        }
        let cell = |f: Field| cols.get(&f).and_then(|i| row.get(*i));
        let text = |f: Field| cell(f).map(|c| c.text()).unwrap_or_default();

        if let Some(Cell::Invalid(content)) = cell(Field::EmployeeId) {
            return ExcelWrongCellTypeSnafu {
                sheet,
                // The header is the first line.
                lineno: (idx + 2) as u64,
                content: content.clone(),
            }
            .fail();
        }

        let occupation_status = if cols.contains_key(&Field::OccupationStatus) {
            labels.classify(&text(Field::OccupationStatus))
        } else {
            OccupationStatus::Other(String::new())
        };
        let reason = Some(text(Field::Reason)).filter(|s| !s.is_empty());
        res.push(PersonnelRecord {
            employee_id: text(Field::EmployeeId),
            last_name: text(Field::LastName),
            first_name: text(Field::FirstName),
            org_line: text(Field::OrgLine),
            category: text(Field::Category),
            occupation_status,
            effective_from: cell(Field::EffectiveFrom)
                .map(|c| c.date())
                .unwrap_or(RecordDate::Missing),
            reason,
        });
    }
    info!("build_records: {}: {} records", sheet, res.len());
    Ok(res)
}
