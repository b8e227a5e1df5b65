//! Cross-tabulation of departure events.
//!
//! A pivot counts the events for each pair of (row value, column value),
//! then appends a `Total` column and a `TOTAL` row. The rows are sorted by
//! decreasing total, and the `TOTAL` row always comes last.

use chrono::Datelike;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::*;
use crate::normalize_line;

pub const TOTAL_COLUMN: &str = "Total";
pub const TOTAL_ROW: &str = "TOTAL";
/// Rendering of the empty data cells.
pub const EMPTY_CELL: &str = "-";

/// The language of the month abbreviations in labels.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum MonthNames {
    Spanish,
    English,
}

impl MonthNames {
    /// The 3-letter abbreviation of a month (1 to 12).
    pub fn abbreviation(&self, month: u32) -> &'static str {
        const ES: [&str; 12] = [
            "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
        ];
        const EN: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            MonthNames::Spanish => ES[idx],
            MonthNames::English => EN[idx],
        }
    }
}

/// A value of a dimension.
///
/// The ordering only looks at `sort` (then `label` for equal sort keys),
/// so that time buckets stay chronological whatever their display label.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct BucketKey {
    pub sort: String,
    pub label: String,
}

impl BucketKey {
    pub fn plain(s: &str) -> BucketKey {
        BucketKey {
            sort: s.to_string(),
            label: s.to_string(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        let n = name.trim().to_lowercase();
        self.label.to_lowercase() == n || self.sort.to_lowercase() == n
    }
}

/// The fields an event can be grouped by.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Dimension {
    Reason,
    Exit,
    OrgLine,
    Category,
    /// Year and month, for instance `Ene 2025`.
    Month,
    Year,
    /// Calendar month regardless of the year.
    MonthOfYear,
}

impl Dimension {
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Reason => "Motivo",
            Dimension::Exit => "Tipo",
            Dimension::OrgLine => "Línea",
            Dimension::Category => "Categoría",
            Dimension::Month => "Mes-Año",
            Dimension::Year => "Año",
            Dimension::MonthOfYear => "Mes",
        }
    }

    pub fn is_time(&self) -> bool {
        matches!(
            self,
            Dimension::Month | Dimension::Year | Dimension::MonthOfYear
        )
    }

    /// The bucket of an event. None for the time dimensions when the event
    /// has no date.
    pub fn key(&self, event: &DepartureEvent, names: MonthNames) -> Option<BucketKey> {
        let categorical = |s: &str| {
            if s.trim().is_empty() {
                BucketKey::plain(NO_DATA)
            } else {
                BucketKey::plain(s.trim())
            }
        };
        match self {
            Dimension::Reason => Some(categorical(&event.reason)),
            Dimension::Exit => Some(BucketKey::plain(event.exit.label())),
            // Same casing as the lines filled by the reconciliation, placeholder included.
            Dimension::OrgLine => Some(BucketKey::plain(&normalize_line(
                &categorical(&event.org_line).label,
            ))),
            Dimension::Category => Some(categorical(&event.category)),
            Dimension::Month => event.effective_date.map(|d| BucketKey {
                sort: d.format("%Y-%m").to_string(),
                label: format!("{} {}", names.abbreviation(d.month()), d.year()),
            }),
            Dimension::Year => event
                .effective_date
                .map(|d| BucketKey::plain(&d.year().to_string())),
            Dimension::MonthOfYear => event.effective_date.map(|d| BucketKey {
                sort: format!("{:02}", d.month()),
                label: names.abbreviation(d.month()).to_string(),
            }),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PivotSpec {
    pub rows: Dimension,
    pub columns: Dimension,
    /// A fixed list of columns. Only the listed columns with data are kept,
    /// in this order. Entries are matched against the label or the sort key,
    /// ignoring case.
    pub column_order: Option<Vec<String>>,
}

impl PivotSpec {
    pub fn new(rows: Dimension, columns: Dimension) -> PivotSpec {
        PivotSpec {
            rows,
            columns,
            column_order: None,
        }
    }

    pub fn with_column_order(self, order: &[String]) -> PivotSpec {
        PivotSpec {
            column_order: Some(order.to_vec()),
            ..self
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PivotRow {
    pub key: BucketKey,
    pub cells: Vec<u64>,
    pub total: u64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PivotTable {
    pub spec: PivotSpec,
    pub columns: Vec<BucketKey>,
    /// The data rows, by decreasing total.
    pub rows: Vec<PivotRow>,
    /// The `TOTAL` row: the sums of each column.
    pub totals: PivotRow,
    /// Number of events without a value for one of the dimensions.
    pub skipped: usize,
}

impl PivotTable {
    pub fn build(events: &[DepartureEvent], spec: &PivotSpec, names: MonthNames) -> PivotTable {
        let mut counts: BTreeMap<BucketKey, BTreeMap<BucketKey, u64>> = BTreeMap::new();
        let mut present: BTreeSet<BucketKey> = BTreeSet::new();
        let mut skipped = 0;
        for e in events.iter() {
            match (spec.rows.key(e, names), spec.columns.key(e, names)) {
                (Some(rk), Some(ck)) => {
                    *counts.entry(rk).or_default().entry(ck.clone()).or_insert(0) += 1;
                    present.insert(ck);
                }
                _ => skipped += 1,
            }
        }

        let columns: Vec<BucketKey> = match &spec.column_order {
            Some(order) => {
                let mut cols: Vec<BucketKey> = Vec::new();
                for name in order.iter() {
                    for c in present.iter().filter(|c| c.matches(name)) {
                        if !cols.contains(c) {
                            cols.push(c.clone());
                        }
                    }
                }
                cols
            }
            None => present.into_iter().collect(),
        };
        debug!(
            "PivotTable::build: {:?} x {:?}: columns {:?}, skipped {}",
            spec.rows, spec.columns, columns, skipped
        );

        // The map iteration gives the rows in key order. The sort below is
        // stable: ties stay in key order.
        let mut rows: Vec<PivotRow> = counts
            .into_iter()
            .map(|(key, by_col)| {
                let cells: Vec<u64> = columns
                    .iter()
                    .map(|c| by_col.get(c).cloned().unwrap_or(0))
                    .collect();
                let total = cells.iter().sum();
                PivotRow { key, cells, total }
            })
            .collect();
        rows.sort_by(|a, b| b.total.cmp(&a.total));

        let col_totals: Vec<u64> = (0..columns.len())
            .map(|idx| rows.iter().map(|r| r.cells[idx]).sum())
            .collect();
        let totals = PivotRow {
            key: BucketKey::plain(TOTAL_ROW),
            total: col_totals.iter().sum(),
            cells: col_totals,
        };

        PivotTable {
            spec: spec.clone(),
            columns,
            rows,
            totals,
            skipped,
        }
    }

    pub fn grand_total(&self) -> u64 {
        self.totals.total
    }

    /// The count for a data row and a column, looked up by label. The
    /// `TOTAL` row is read with `column_total`.
    pub fn get(&self, row: &str, column: &str) -> Option<u64> {
        let cidx = self.column_index(column)?;
        self.rows
            .iter()
            .find(|r| r.key.label == row)
            .map(|r| r.cells[cidx])
    }

    /// The value of the `TOTAL` row for a column.
    pub fn column_total(&self, column: &str) -> Option<u64> {
        let cidx = self.column_index(column)?;
        Some(self.totals.cells[cidx])
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.label == column)
    }

    pub fn header(&self) -> Vec<String> {
        let mut h = vec![self.spec.rows.name().to_string()];
        h.extend(self.columns.iter().map(|c| c.label.clone()));
        h.push(TOTAL_COLUMN.to_string());
        h
    }

    /// The table as text cells, header first and the `TOTAL` row last.
    ///
    /// Empty data cells are rendered as a dash. The totals are always
    /// written as numbers.
    pub fn render(&self) -> Vec<Vec<String>> {
        let mut grid = vec![self.header()];
        for r in self.rows.iter() {
            let mut line = vec![r.key.label.clone()];
            line.extend(r.cells.iter().map(|c| match c {
                0 => EMPTY_CELL.to_string(),
                x => x.to_string(),
            }));
            line.push(r.total.to_string());
            grid.push(line);
        }
        let mut line = vec![self.totals.key.label.clone()];
        line.extend(self.totals.cells.iter().map(|c| c.to_string()));
        line.push(self.totals.total.to_string());
        grid.push(line);
        grid
    }
}
