use chrono::NaiveDate;

pub use crate::config::*;

/// A builder for assembling the tables of a snapshot.
///
/// ```
/// use departures::{reconcile, OccupationStatus, PersonnelRecord, ReconcileRules, SnapshotSet};
/// # use departures::ReconcileError;
///
/// let snapshots = SnapshotSet::builder()
///     .prior(vec![PersonnelRecord::new("1"), PersonnelRecord::new("2")])
///     .current(vec![PersonnelRecord::new("1").with_status(OccupationStatus::Active)])
///     .build();
///
/// let res = reconcile(&snapshots, &ReconcileRules::DEFAULT_RULES)?;
/// assert_eq!(res.events.len(), 1);
///
/// # Ok::<(), ReconcileError>(())
/// ```
#[derive(Debug, Default)]
pub struct Builder {
    pub(crate) _current: Option<Vec<PersonnelRecord>>,
    pub(crate) _prior: Option<Vec<PersonnelRecord>>,
    pub(crate) _ledger: Option<Vec<PersonnelRecord>>,
}

impl SnapshotSet {
    pub fn builder() -> Builder {
        Builder::default()
    }
}

impl Builder {
    pub fn current(self, records: Vec<PersonnelRecord>) -> Builder {
        Builder {
            _current: Some(records),
            ..self
        }
    }

    pub fn prior(self, records: Vec<PersonnelRecord>) -> Builder {
        Builder {
            _prior: Some(records),
            ..self
        }
    }

    pub fn ledger(self, records: Vec<PersonnelRecord>) -> Builder {
        Builder {
            _ledger: Some(records),
            ..self
        }
    }

    /// Sets a table by its tab name. Unknown names are returned back as an error.
    pub fn table(self, name: &str, records: Vec<PersonnelRecord>) -> Result<Builder, String> {
        match name {
            CURRENT_TABLE => Ok(self.current(records)),
            PRIOR_TABLE => Ok(self.prior(records)),
            LEDGER_TABLE => Ok(self.ledger(records)),
            x => Err(x.to_string()),
        }
    }

    pub fn build(self) -> SnapshotSet {
        SnapshotSet {
            current_all: self._current,
            prior_active: self._prior,
            reassignment_ledger: self._ledger,
        }
    }
}

// Shorthands to fill a record field by field.
impl PersonnelRecord {
    pub fn with_status(self, occupation_status: OccupationStatus) -> PersonnelRecord {
        PersonnelRecord {
            occupation_status,
            ..self
        }
    }

    pub fn with_date(self, date: NaiveDate) -> PersonnelRecord {
        PersonnelRecord {
            effective_from: RecordDate::Date(date),
            ..self
        }
    }

    /// A date cell that could not be read.
    pub fn with_raw_date(self, raw: &str) -> PersonnelRecord {
        PersonnelRecord {
            effective_from: RecordDate::Unparsed(raw.to_string()),
            ..self
        }
    }

    pub fn with_reason(self, reason: &str) -> PersonnelRecord {
        PersonnelRecord {
            reason: Some(reason.to_string()),
            ..self
        }
    }

    pub fn with_line(self, org_line: &str) -> PersonnelRecord {
        PersonnelRecord {
            org_line: org_line.to_string(),
            ..self
        }
    }

    pub fn with_category(self, category: &str) -> PersonnelRecord {
        PersonnelRecord {
            category: category.to_string(),
            ..self
        }
    }

    pub fn with_name(self, last_name: &str, first_name: &str) -> PersonnelRecord {
        PersonnelRecord {
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            ..self
        }
    }
}
