// ********* Input data structures ***********

use chrono::NaiveDate;
use std::error::Error;
use std::fmt::Display;

/// Name of the tab holding the current state of the roster.
pub const CURRENT_TABLE: &str = "BaseQuery";
/// Name of the tab holding the active roster of the previous period.
pub const PRIOR_TABLE: &str = "Activos";
/// Name of the (optional) tab holding the manual reassignment ledger.
pub const LEDGER_TABLE: &str = "CO";

/// Reason used when no reason can be found for a departure.
pub const NO_DATA: &str = "Sin Datos";
/// Reason used for a ledger entry that does not carry any reason.
pub const REASSIGNED: &str = "Reubicado";

/// The occupation status of a roster line.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum OccupationStatus {
    Active,
    Deactivated,
    /// Any other label, kept verbatim. The empty string is used when the
    /// table does not have a status column.
    Other(String),
}

/// The content of the `effective_from` column.
///
/// The raw text is kept when it cannot be understood as a date, so that it
/// can be reported back to the user.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum RecordDate {
    Date(NaiveDate),
    Unparsed(String),
    Missing,
}

impl RecordDate {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            RecordDate::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// One line of a roster snapshot, with the canonical column names.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PersonnelRecord {
    pub employee_id: String,
    pub last_name: String,
    pub first_name: String,
    pub org_line: String,
    pub category: String,
    pub occupation_status: OccupationStatus,
    pub effective_from: RecordDate,
    pub reason: Option<String>,
}

impl PersonnelRecord {
    /// A record with only an id. All the other fields are empty.
    pub fn new(employee_id: &str) -> PersonnelRecord {
        PersonnelRecord {
            employee_id: employee_id.to_string(),
            last_name: String::new(),
            first_name: String::new(),
            org_line: String::new(),
            category: String::new(),
            occupation_status: OccupationStatus::Other(String::new()),
            effective_from: RecordDate::Missing,
            reason: None,
        }
    }
}

/// The labels of the status column that mean active or deactivated.
///
/// Comparisons ignore case and surrounding whitespace.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StatusLabels {
    pub active: Vec<String>,
    pub deactivated: Vec<String>,
}

impl Default for StatusLabels {
    fn default() -> Self {
        StatusLabels {
            active: vec!["Activo".to_string(), "Active".to_string()],
            deactivated: vec!["Dado de baja".to_string(), "Deactivated".to_string()],
        }
    }
}

impl StatusLabels {
    pub fn classify(&self, label: &str) -> OccupationStatus {
        let l = label.trim().to_lowercase();
        if self.active.iter().any(|a| a.trim().to_lowercase() == l) {
            OccupationStatus::Active
        } else if self.deactivated.iter().any(|d| d.trim().to_lowercase() == l) {
            OccupationStatus::Deactivated
        } else {
            OccupationStatus::Other(label.trim().to_string())
        }
    }
}

/// The three tables of a snapshot workbook.
///
/// The current and prior tables are mandatory for a reconciliation. The
/// ledger is optional and treated as empty when missing.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SnapshotSet {
    pub current_all: Option<Vec<PersonnelRecord>>,
    pub prior_active: Option<Vec<PersonnelRecord>>,
    pub reassignment_ledger: Option<Vec<PersonnelRecord>>,
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum ExitCategory {
    /// The roster shows the employee as deactivated (a "baja").
    SystemDeactivation,
    /// The employee vanished from the roster (a "cambio organizativo").
    OrganizationalChange,
}

impl ExitCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ExitCategory::SystemDeactivation => "Baja",
            ExitCategory::OrganizationalChange => "Cambio Organizativo",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DepartureEvent {
    pub employee_id: String,
    pub last_name: String,
    pub first_name: String,
    pub org_line: String,
    pub category: String,
    /// Resolved date. None when the source date is missing or unreadable.
    pub effective_date: Option<NaiveDate>,
    pub reason: String,
    pub exit: ExitCategory,
    /// For organizational changes, whether the ledger had an entry.
    /// Always true for system deactivations.
    pub ledger_match: bool,
}

/// A departed employee still present in the current roster, but neither
/// active nor deactivated.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct UnclassifiedDeparture {
    pub employee_id: String,
    pub status: String,
}

/// Non-fatal conditions found during a reconciliation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Notice {
    MissingLedger,
    /// No departure in the requested scope.
    EmptyResult,
    MalformedDate {
        employee_id: String,
        value: String,
    },
    /// Vanished from the roster without a ledger entry.
    UnmatchedReassignment {
        employee_id: String,
        dropped: bool,
    },
    UnclassifiedStatus {
        employee_id: String,
        status: String,
    },
    DuplicateRecord {
        table: String,
        employee_id: String,
    },
    EmptyEmployeeId {
        table: String,
        count: usize,
    },
}

impl Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::MissingLedger => write!(
                f,
                "no reassignment ledger ({}), organizational changes are unresolved",
                LEDGER_TABLE
            ),
            Notice::EmptyResult => write!(f, "no departure found for the selected period"),
            Notice::MalformedDate { employee_id, value } => write!(
                f,
                "employee {}: cannot read date {:?}, excluded from dated views",
                employee_id, value
            ),
            Notice::UnmatchedReassignment {
                employee_id,
                dropped: false,
            } => write!(
                f,
                "employee {}: left the roster without ledger entry, kept as {:?}",
                employee_id, NO_DATA
            ),
            Notice::UnmatchedReassignment {
                employee_id,
                dropped: true,
            } => write!(
                f,
                "employee {}: left the roster without ledger entry, dropped",
                employee_id
            ),
            Notice::UnclassifiedStatus {
                employee_id,
                status,
            } => write!(
                f,
                "employee {}: not active anymore but has status {:?}",
                employee_id, status
            ),
            Notice::DuplicateRecord { table, employee_id } => write!(
                f,
                "table {}: employee {} appears several times",
                table, employee_id
            ),
            Notice::EmptyEmployeeId { table, count } => {
                write!(f, "table {}: {} lines without employee id", table, count)
            }
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Reconciliation {
    /// Every classified departure, regardless of the date range.
    pub all_events: Vec<DepartureEvent>,
    /// The departures within the date range of the rules.
    pub events: Vec<DepartureEvent>,
    /// Employees that vanished without ledger entry, under the drop policy.
    pub dropped: Vec<String>,
    pub unclassified: Vec<UnclassifiedDeparture>,
    /// Number of employees active before and not active now.
    pub departed_count: usize,
    pub notices: Vec<Notice>,
}

impl Reconciliation {
    pub fn count(&self, exit: ExitCategory) -> usize {
        self.events.iter().filter(|e| e.exit == exit).count()
    }
}

/// Errors that prevent the reconciliation from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ReconcileError {
    MissingSnapshot { table: String },
}

impl Error for ReconcileError {}

impl Display for ReconcileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileError::MissingSnapshot { table } => write!(
                f,
                "missing snapshot table {:?}: the workbook must contain the tabs {}, {} and optionally {}",
                table, CURRENT_TABLE, PRIOR_TABLE, LEDGER_TABLE
            ),
        }
    }
}

// ********* Configuration **********

/// What to do with an employee who vanished from the roster and has no
/// entry in the reassignment ledger.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum UnmatchedPolicy {
    /// Keep it as an organizational change with the `Sin Datos` reason.
    KeepWithPlaceholder,
    /// Leave it out of the events. It is still listed in `Reconciliation::dropped`.
    Drop,
}

/// An inclusive range of dates. Missing bounds are open.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub const UNBOUNDED: DateRange = DateRange {
        start: None,
        end: None,
    };

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        self.start.map_or(true, |s| s <= d) && self.end.map_or(true, |e| d <= e)
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReconcileRules {
    pub unmatched_policy: UnmatchedPolicy,
    pub date_range: DateRange,
}

impl ReconcileRules {
    pub const DEFAULT_RULES: ReconcileRules = ReconcileRules {
        unmatched_policy: UnmatchedPolicy::KeepWithPlaceholder,
        date_range: DateRange::UNBOUNDED,
    };
}
