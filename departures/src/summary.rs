use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::config::*;
use crate::pivot::{BucketKey, Dimension, MonthNames};

/// Headline figures of a set of departures.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Kpis {
    pub total: usize,
    pub system_deactivations: usize,
    pub organizational_changes: usize,
    /// Organizational changes without ledger entry.
    pub unresolved_changes: usize,
    pub top_reason: Option<(BucketKey, usize)>,
    pub top_line: Option<(BucketKey, usize)>,
    pub top_category: Option<(BucketKey, usize)>,
    pub top_month: Option<(BucketKey, usize)>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl Kpis {
    pub fn compute(events: &[DepartureEvent], names: MonthNames) -> Kpis {
        let count = |exit: ExitCategory| events.iter().filter(|e| e.exit == exit).count();
        let dates = events.iter().filter_map(|e| e.effective_date);
        Kpis {
            total: events.len(),
            system_deactivations: count(ExitCategory::SystemDeactivation),
            organizational_changes: count(ExitCategory::OrganizationalChange),
            unresolved_changes: events.iter().filter(|e| !e.ledger_match).count(),
            top_reason: top(events, Dimension::Reason, names),
            top_line: top(events, Dimension::OrgLine, names),
            top_category: top(events, Dimension::Category, names),
            top_month: top(events, Dimension::Month, names),
            first_date: dates.clone().min(),
            last_date: dates.max(),
        }
    }

    /// The period covered by the dated events, as `dd/mm/yyyy al dd/mm/yyyy`.
    pub fn date_span(&self) -> String {
        match (self.first_date, self.last_date) {
            (Some(a), Some(b)) => format!("{} al {}", a.format("%d/%m/%Y"), b.format("%d/%m/%Y")),
            _ => "No detectado".to_string(),
        }
    }
}

// The most frequent value. Ties go to the smallest key.
fn top(
    events: &[DepartureEvent],
    dim: Dimension,
    names: MonthNames,
) -> Option<(BucketKey, usize)> {
    let mut counts: BTreeMap<BucketKey, usize> = BTreeMap::new();
    for e in events.iter() {
        if let Some(k) = dim.key(e, names) {
            *counts.entry(k).or_insert(0) += 1;
        }
    }
    let mut best: Option<(BucketKey, usize)> = None;
    for (k, c) in counts.into_iter() {
        match &best {
            Some((_, bc)) if *bc >= c => {}
            _ => best = Some((k, c)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{reconcile, OccupationStatus, PersonnelRecord, ReconcileRules, SnapshotSet};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn kpis_of_a_reconciliation() {
        let active = |id: &str| PersonnelRecord::new(id).with_status(OccupationStatus::Active);
        let gone = |id: &str, line: &str, d: NaiveDate| {
            PersonnelRecord::new(id)
                .with_status(OccupationStatus::Deactivated)
                .with_line(line)
                .with_date(d)
                .with_reason("Renuncia")
        };
        let snapshots = SnapshotSet::builder()
            .prior(vec![active("1"), active("2"), active("3"), active("4")])
            .current(vec![
                gone("1", "roca", ymd(2025, 3, 2)),
                gone("2", "Mitre", ymd(2025, 5, 20)),
                gone("3", "ROCA ", ymd(2025, 3, 11)),
            ])
            .build();
        let res = reconcile(&snapshots, &ReconcileRules::DEFAULT_RULES).unwrap();
        let k = Kpis::compute(&res.events, MonthNames::Spanish);
        assert_eq!(k.total, 4);
        assert_eq!(k.system_deactivations, 3);
        assert_eq!(k.organizational_changes, 1);
        assert_eq!(k.unresolved_changes, 1);
        assert_eq!(k.top_line, Some((BucketKey::plain("ROCA"), 2)));
        assert_eq!(k.top_reason, Some((BucketKey::plain("Renuncia"), 3)));
        assert_eq!(
            k.top_month.as_ref().map(|(b, c)| (b.label.as_str(), *c)),
            Some(("Mar 2025", 2))
        );
        assert_eq!(k.date_span(), "01/03/2025 al 19/05/2025");
    }

    #[test]
    fn empty_kpis() {
        let k = Kpis::compute(&[], MonthNames::Spanish);
        assert_eq!(k.total, 0);
        assert_eq!(k.top_reason, None);
        assert_eq!(k.date_span(), "No detectado");
    }
}
