mod config;
pub mod builder;
pub mod manual;
pub mod pivot;
pub mod summary;

use log::{debug, info, warn};

use std::collections::{BTreeMap, BTreeSet};

pub use crate::config::*;
pub use crate::pivot::{BucketKey, Dimension, MonthNames, PivotRow, PivotSpec, PivotTable};
pub use crate::summary::Kpis;

// **** Private structures ****

// The lines of one table, indexed by canonical employee id. The lines of
// the same employee are kept in input order.
type IdIndex<'a> = BTreeMap<String, Vec<&'a PersonnelRecord>>;

/// Canonical form of an employee id.
///
/// Spreadsheets return the same personnel number as a string, an integer or
/// a float depending on how the cell was typed. All the integral forms map to
/// the plain decimal representation: `" 0123 "`, `"123"`, `"123.0"` all
/// become `"123"`. Anything else is only trimmed.
pub fn canonical_id(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return String::new();
    }
    if s.chars().all(|c| c.is_ascii_digit()) {
        let t = s.trim_start_matches('0');
        return if t.is_empty() {
            "0".to_string()
        } else {
            t.to_string()
        };
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => s.to_string(),
    }
}

/// Organizational lines are compared upper-cased and trimmed.
pub fn normalize_line(line: &str) -> String {
    line.trim().to_uppercase()
}

/// Runs the reconciliation between the prior active roster and the current
/// roster.
///
/// Every employee of the prior roster that is not active anymore is
/// classified as:
/// * a system deactivation, if the current roster shows the employee as
///   deactivated. The date is moved back by one day, since the roster records
///   the first day without activity.
/// * an organizational change, if the employee is not in the current roster
///   at all. The date and reason come from the reassignment ledger.
/// * unclassified otherwise (any other status in the current roster).
pub fn reconcile(
    snapshots: &SnapshotSet,
    rules: &ReconcileRules,
) -> Result<Reconciliation, ReconcileError> {
    let current = snapshots
        .current_all
        .as_deref()
        .ok_or_else(|| ReconcileError::MissingSnapshot {
            table: CURRENT_TABLE.to_string(),
        })?;
    let prior = snapshots
        .prior_active
        .as_deref()
        .ok_or_else(|| ReconcileError::MissingSnapshot {
            table: PRIOR_TABLE.to_string(),
        })?;

    let mut notices: Vec<Notice> = Vec::new();
    let ledger: &[PersonnelRecord] = match snapshots.reassignment_ledger.as_deref() {
        Some(l) => l,
        None => {
            warn!("reconcile: no {} table, treating it as empty", LEDGER_TABLE);
            notices.push(Notice::MissingLedger);
            &[]
        }
    };
    info!(
        "reconcile: {} current lines, {} prior lines, {} ledger lines, rules: {:?}",
        current.len(),
        prior.len(),
        ledger.len(),
        rules
    );

    let current_idx = index_table(CURRENT_TABLE, current, false, &mut notices);
    let prior_idx = index_table(PRIOR_TABLE, prior, true, &mut notices);
    let ledger_idx = index_table(LEDGER_TABLE, ledger, true, &mut notices);

    let ids_current_active: BTreeSet<&str> = current_idx
        .iter()
        .filter(|(_, lines)| {
            lines
                .iter()
                .any(|r| r.occupation_status == OccupationStatus::Active)
        })
        .map(|(id, _)| id.as_str())
        .collect();

    let ids_departed: Vec<&String> = prior_idx
        .keys()
        .filter(|id| !ids_current_active.contains(id.as_str()))
        .collect();
    debug!("reconcile: departed ids: {:?}", ids_departed);

    let mut all_events: Vec<DepartureEvent> = Vec::new();
    let mut dropped: Vec<String> = Vec::new();
    let mut unclassified: Vec<UnclassifiedDeparture> = Vec::new();

    for id in ids_departed.iter() {
        // Invariant: every id of the index has at least one line.
        let prior_line = prior_idx[*id][0];
        match current_idx.get(*id) {
            Some(lines) => {
                let deactivated: Vec<&PersonnelRecord> = lines
                    .iter()
                    .filter(|r| r.occupation_status == OccupationStatus::Deactivated)
                    .cloned()
                    .collect();
                if let Some(line) = latest(&deactivated) {
                    all_events.push(system_deactivation(id, line, prior_line, &mut notices));
                } else {
                    let status = match &lines[0].occupation_status {
                        OccupationStatus::Other(s) => s.clone(),
                        s => format!("{:?}", s),
                    };
                    warn!(
                        "reconcile: employee {} is not active anymore but has status {:?}",
                        id, status
                    );
                    notices.push(Notice::UnclassifiedStatus {
                        employee_id: id.to_string(),
                        status: status.clone(),
                    });
                    unclassified.push(UnclassifiedDeparture {
                        employee_id: id.to_string(),
                        status,
                    });
                }
            }
            None => match ledger_idx.get(*id).and_then(|entries| latest(entries)) {
                Some(entry) => {
                    all_events.push(organizational_change(id, entry, prior_line, &mut notices))
                }
                None => {
                    let drop = rules.unmatched_policy == UnmatchedPolicy::Drop;
                    warn!(
                        "reconcile: employee {} left the roster without ledger entry (dropped: {})",
                        id, drop
                    );
                    notices.push(Notice::UnmatchedReassignment {
                        employee_id: id.to_string(),
                        dropped: drop,
                    });
                    if drop {
                        dropped.push(id.to_string());
                    } else {
                        all_events.push(unresolved_change(id, prior_line));
                    }
                }
            },
        }
    }

    sort_events(&mut all_events);
    let events = filter_by_date(&all_events, &rules.date_range);
    info!(
        "reconcile: {} departed, {} events ({} in range), {} dropped, {} unclassified",
        ids_departed.len(),
        all_events.len(),
        events.len(),
        dropped.len(),
        unclassified.len()
    );
    if events.is_empty() {
        info!("reconcile: no departure in scope");
        notices.push(Notice::EmptyResult);
    }

    Ok(Reconciliation {
        all_events,
        events,
        dropped,
        unclassified,
        departed_count: ids_departed.len(),
        notices,
    })
}

/// Keeps the events with a date inside the range.
///
/// Events without a resolved date are only kept when the range is unbounded.
pub fn filter_by_date(events: &[DepartureEvent], range: &DateRange) -> Vec<DepartureEvent> {
    if range.is_unbounded() {
        return events.to_vec();
    }
    events
        .iter()
        .filter(|e| e.effective_date.map_or(false, |d| range.contains(d)))
        .cloned()
        .collect()
}

/// Keeps the events for which one of the fields contains the query, ignoring case.
pub fn filter_by_text(events: &[DepartureEvent], query: &str) -> Vec<DepartureEvent> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return events.to_vec();
    }
    events
        .iter()
        .filter(|e| {
            let date = e
                .effective_date
                .map(|d| format!("{} {}", d.format("%d/%m/%Y"), d.format("%Y-%m-%d")))
                .unwrap_or_default();
            [
                e.employee_id.as_str(),
                e.last_name.as_str(),
                e.first_name.as_str(),
                e.org_line.as_str(),
                e.category.as_str(),
                e.reason.as_str(),
                e.exit.label(),
                date.as_str(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&q))
        })
        .cloned()
        .collect()
}

fn index_table<'a>(
    table: &str,
    records: &'a [PersonnelRecord],
    report_duplicates: bool,
    notices: &mut Vec<Notice>,
) -> IdIndex<'a> {
    let mut idx: IdIndex<'a> = BTreeMap::new();
    let mut empty_ids = 0;
    for r in records.iter() {
        let id = canonical_id(&r.employee_id);
        if id.is_empty() {
            empty_ids += 1;
            continue;
        }
        let lines = idx.entry(id.clone()).or_insert_with(Vec::new);
        if report_duplicates && lines.len() == 1 {
            debug!("index_table: {}: duplicate employee {}", table, id);
            notices.push(Notice::DuplicateRecord {
                table: table.to_string(),
                employee_id: id,
            });
        }
        lines.push(r);
    }
    if empty_ids > 0 {
        warn!("index_table: {}: {} lines without employee id", table, empty_ids);
        notices.push(Notice::EmptyEmployeeId {
            table: table.to_string(),
            count: empty_ids,
        });
    }
    idx
}

// The line with the latest date. Undated lines come first, ties keep the
// first line in input order.
fn latest<'a>(lines: &[&'a PersonnelRecord]) -> Option<&'a PersonnelRecord> {
    let mut best: Option<&'a PersonnelRecord> = None;
    for r in lines.iter() {
        match best {
            Some(b) if b.effective_from.date() >= r.effective_from.date() => {}
            _ => best = Some(*r),
        }
    }
    best
}

fn resolve_date(
    id: &str,
    date: &RecordDate,
    notices: &mut Vec<Notice>,
) -> Option<chrono::NaiveDate> {
    match date {
        RecordDate::Date(d) => Some(*d),
        RecordDate::Unparsed(value) => {
            warn!("employee {}: cannot read date {:?}", id, value);
            notices.push(Notice::MalformedDate {
                employee_id: id.to_string(),
                value: value.clone(),
            });
            None
        }
        RecordDate::Missing => None,
    }
}

fn non_empty(s: &str, fallback: &str) -> String {
    if s.trim().is_empty() {
        fallback.trim().to_string()
    } else {
        s.trim().to_string()
    }
}

fn reason_or(reason: &Option<String>, placeholder: &str) -> String {
    match reason {
        Some(r) if !r.trim().is_empty() => r.trim().to_string(),
        _ => placeholder.to_string(),
    }
}

fn system_deactivation(
    id: &str,
    line: &PersonnelRecord,
    prior_line: &PersonnelRecord,
    notices: &mut Vec<Notice>,
) -> DepartureEvent {
    // The roster stores the first day of the deactivated status.
    let effective_date = resolve_date(id, &line.effective_from, notices).and_then(|d| d.pred_opt());
    DepartureEvent {
        employee_id: id.to_string(),
        last_name: non_empty(&line.last_name, &prior_line.last_name),
        first_name: non_empty(&line.first_name, &prior_line.first_name),
        org_line: normalize_line(&non_empty(&line.org_line, &prior_line.org_line)),
        category: non_empty(&line.category, &prior_line.category),
        effective_date,
        reason: reason_or(&line.reason, NO_DATA),
        exit: ExitCategory::SystemDeactivation,
        ledger_match: true,
    }
}

fn organizational_change(
    id: &str,
    entry: &PersonnelRecord,
    prior_line: &PersonnelRecord,
    notices: &mut Vec<Notice>,
) -> DepartureEvent {
    DepartureEvent {
        employee_id: id.to_string(),
        last_name: non_empty(&entry.last_name, &prior_line.last_name),
        first_name: non_empty(&entry.first_name, &prior_line.first_name),
        org_line: normalize_line(&non_empty(&entry.org_line, &prior_line.org_line)),
        category: non_empty(&entry.category, &prior_line.category),
        effective_date: resolve_date(id, &entry.effective_from, notices),
        reason: reason_or(&entry.reason, REASSIGNED),
        exit: ExitCategory::OrganizationalChange,
        ledger_match: true,
    }
}

fn unresolved_change(id: &str, prior_line: &PersonnelRecord) -> DepartureEvent {
    DepartureEvent {
        employee_id: id.to_string(),
        last_name: non_empty(&prior_line.last_name, NO_DATA),
        first_name: non_empty(&prior_line.first_name, NO_DATA),
        org_line: normalize_line(&non_empty(&prior_line.org_line, NO_DATA)),
        category: non_empty(&prior_line.category, NO_DATA),
        effective_date: None,
        reason: NO_DATA.to_string(),
        exit: ExitCategory::OrganizationalChange,
        ledger_match: false,
    }
}

// Most recent first, undated last. The sort is stable, so ties keep the
// ascending id order of the classification loop.
fn sort_events(events: &mut [DepartureEvent]) {
    events.sort_by(|a, b| b.effective_date.cmp(&a.effective_date));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn active(id: &str) -> PersonnelRecord {
        PersonnelRecord::new(id).with_status(OccupationStatus::Active)
    }

    fn deactivated(id: &str, date: NaiveDate) -> PersonnelRecord {
        PersonnelRecord::new(id)
            .with_status(OccupationStatus::Deactivated)
            .with_date(date)
    }

    fn scenario() -> SnapshotSet {
        SnapshotSet::builder()
            .prior(vec![active("A"), active("B"), active("C")])
            .current(vec![active("A"), deactivated("B", ymd(2025, 1, 10))])
            .ledger(vec![PersonnelRecord::new("C")
                .with_date(ymd(2025, 1, 5))
                .with_reason("Transferred")])
            .build()
    }

    #[test]
    fn canonical_ids() {
        assert_eq!(canonical_id(" 123 "), "123");
        assert_eq!(canonical_id("123.0"), "123");
        assert_eq!(canonical_id("000123"), "123");
        assert_eq!(canonical_id("0"), "0");
        assert_eq!(canonical_id("000"), "0");
        assert_eq!(canonical_id("AB-12"), "AB-12");
        assert_eq!(canonical_id("12.5"), "12.5");
        assert_eq!(canonical_id("   "), "");
    }

    #[test]
    fn deactivation_and_ledger_scenario() {
        init();
        let res = reconcile(&scenario(), &ReconcileRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.departed_count, 2);
        assert_eq!(res.events.len(), 2);

        let b = res.events.iter().find(|e| e.employee_id == "B").unwrap();
        assert_eq!(b.exit, ExitCategory::SystemDeactivation);
        assert_eq!(b.effective_date, Some(ymd(2025, 1, 9)));

        let c = res.events.iter().find(|e| e.employee_id == "C").unwrap();
        assert_eq!(c.exit, ExitCategory::OrganizationalChange);
        assert_eq!(c.effective_date, Some(ymd(2025, 1, 5)));
        assert_eq!(c.reason, "Transferred");
        assert!(c.ledger_match);

        assert!(!res.events.iter().any(|e| e.employee_id == "A"));
        // Most recent first.
        assert_eq!(res.events[0].employee_id, "B");
    }

    #[test]
    fn deactivation_date_moves_back_one_day() {
        let snapshots = SnapshotSet::builder()
            .prior(vec![active("7")])
            .current(vec![deactivated("7", ymd(2024, 3, 15))])
            .build();
        let res = reconcile(&snapshots, &ReconcileRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.events[0].effective_date, Some(ymd(2024, 3, 14)));
        // Across a month boundary too.
        let snapshots = SnapshotSet::builder()
            .prior(vec![active("7")])
            .current(vec![deactivated("7", ymd(2024, 3, 1))])
            .build();
        let res = reconcile(&snapshots, &ReconcileRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.events[0].effective_date, Some(ymd(2024, 2, 29)));
    }

    #[test]
    fn vanished_without_ledger_is_kept() {
        init();
        let snapshots = SnapshotSet::builder()
            .prior(vec![active("A"), active("C").with_line(" roca ")])
            .current(vec![active("A")])
            .ledger(vec![])
            .build();
        let res = reconcile(&snapshots, &ReconcileRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.events.len(), 1);
        let c = &res.events[0];
        assert_eq!(c.exit, ExitCategory::OrganizationalChange);
        assert_eq!(c.reason, NO_DATA);
        assert_eq!(c.org_line, "ROCA");
        assert_eq!(c.effective_date, None);
        assert!(!c.ledger_match);
        assert!(res.notices.contains(&Notice::UnmatchedReassignment {
            employee_id: "C".to_string(),
            dropped: false
        }));
    }

    #[test]
    fn vanished_without_ledger_dropped_by_policy() {
        let snapshots = SnapshotSet::builder()
            .prior(vec![active("A"), active("C")])
            .current(vec![active("A")])
            .build();
        let rules = ReconcileRules {
            unmatched_policy: UnmatchedPolicy::Drop,
            ..ReconcileRules::DEFAULT_RULES
        };
        let res = reconcile(&snapshots, &rules).unwrap();
        assert!(res.events.is_empty());
        assert_eq!(res.dropped, vec!["C".to_string()]);
        assert_eq!(res.departed_count, 1);
        assert!(res.notices.contains(&Notice::MissingLedger));
        assert!(res.notices.contains(&Notice::EmptyResult));
    }

    #[test]
    fn ledger_without_reason_uses_placeholder() {
        let snapshots = SnapshotSet::builder()
            .prior(vec![active("C").with_name("Perez", "Ana")])
            .current(vec![])
            .ledger(vec![PersonnelRecord::new("C").with_date(ymd(2025, 2, 1))])
            .build();
        let res = reconcile(&snapshots, &ReconcileRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.events[0].reason, REASSIGNED);
        // Identity taken from the prior roster when the ledger has none.
        assert_eq!(res.events[0].last_name, "Perez");
        assert_eq!(res.events[0].first_name, "Ana");
    }

    #[test]
    fn numeric_and_string_ids_match() {
        let snapshots = SnapshotSet::builder()
            .prior(vec![active("1001.0"), active(" 1002")])
            .current(vec![active("1001"), active("0001002")])
            .build();
        let res = reconcile(&snapshots, &ReconcileRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.departed_count, 0);
        assert!(res.events.is_empty());
    }

    #[test]
    fn active_in_one_line_is_not_departed() {
        // Two lines for the same employee: an old deactivated position and an active one.
        let snapshots = SnapshotSet::builder()
            .prior(vec![active("5")])
            .current(vec![deactivated("5", ymd(2024, 5, 2)), active("5")])
            .build();
        let res = reconcile(&snapshots, &ReconcileRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.departed_count, 0);
    }

    #[test]
    fn latest_deactivation_wins() {
        let snapshots = SnapshotSet::builder()
            .prior(vec![active("5")])
            .current(vec![
                deactivated("5", ymd(2024, 5, 2)).with_reason("old"),
                deactivated("5", ymd(2024, 8, 2)).with_reason("Renuncia"),
            ])
            .build();
        let res = reconcile(&snapshots, &ReconcileRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.events.len(), 1);
        assert_eq!(res.events[0].reason, "Renuncia");
        assert_eq!(res.events[0].effective_date, Some(ymd(2024, 8, 1)));
    }

    #[test]
    fn other_status_is_unclassified() {
        let snapshots = SnapshotSet::builder()
            .prior(vec![active("9")])
            .current(vec![
                PersonnelRecord::new("9").with_status(OccupationStatus::Other("Suspendido".into()))
            ])
            .build();
        let res = reconcile(&snapshots, &ReconcileRules::DEFAULT_RULES).unwrap();
        assert!(res.all_events.is_empty());
        assert_eq!(
            res.unclassified,
            vec![UnclassifiedDeparture {
                employee_id: "9".to_string(),
                status: "Suspendido".to_string()
            }]
        );
        assert_eq!(
            res.departed_count,
            res.all_events.len() + res.dropped.len() + res.unclassified.len()
        );
    }

    #[test]
    fn malformed_dates_are_retained() {
        let snapshots = SnapshotSet::builder()
            .prior(vec![active("1"), active("2")])
            .current(vec![
                PersonnelRecord::new("1")
                    .with_status(OccupationStatus::Deactivated)
                    .with_raw_date("31/02/yesterday"),
                deactivated("2", ymd(2025, 3, 11)),
            ])
            .build();
        let rules = ReconcileRules {
            date_range: DateRange {
                start: Some(ymd(2025, 1, 1)),
                end: Some(ymd(2025, 12, 31)),
            },
            ..ReconcileRules::DEFAULT_RULES
        };
        let res = reconcile(&snapshots, &rules).unwrap();
        assert_eq!(res.all_events.len(), 2);
        assert_eq!(res.events.len(), 1);
        assert_eq!(res.events[0].employee_id, "2");
        assert!(res.notices.contains(&Notice::MalformedDate {
            employee_id: "1".to_string(),
            value: "31/02/yesterday".to_string()
        }));
        // Undated events are listed last.
        assert_eq!(res.all_events[1].employee_id, "1");
    }

    #[test]
    fn date_range_is_inclusive() {
        let snapshots = SnapshotSet::builder()
            .prior(vec![active("1"), active("2"), active("3")])
            .current(vec![
                deactivated("1", ymd(2025, 1, 2)),
                deactivated("2", ymd(2025, 2, 1)),
                deactivated("3", ymd(2025, 2, 2)),
            ])
            .build();
        let rules = ReconcileRules {
            date_range: DateRange {
                start: Some(ymd(2025, 1, 1)),
                end: Some(ymd(2025, 1, 31)),
            },
            ..ReconcileRules::DEFAULT_RULES
        };
        let res = reconcile(&snapshots, &rules).unwrap();
        let ids: Vec<&str> = res.events.iter().map(|e| e.employee_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn missing_tables() {
        let snapshots = SnapshotSet::builder().prior(vec![active("1")]).build();
        assert_eq!(
            reconcile(&snapshots, &ReconcileRules::DEFAULT_RULES),
            Err(ReconcileError::MissingSnapshot {
                table: CURRENT_TABLE.to_string()
            })
        );
        let snapshots = SnapshotSet::builder().current(vec![active("1")]).build();
        assert_eq!(
            reconcile(&snapshots, &ReconcileRules::DEFAULT_RULES),
            Err(ReconcileError::MissingSnapshot {
                table: PRIOR_TABLE.to_string()
            })
        );
    }

    #[test]
    fn partition_is_complete_and_exclusive() {
        // A mix of every situation, with duplicated and numeric ids.
        let mut prior = Vec::new();
        let mut current = Vec::new();
        let mut ledger = Vec::new();
        for i in 0..60u32 {
            let id = format!("{}", 1000 + i);
            prior.push(active(&id));
            match i % 5 {
                0 => current.push(active(&format!("{}.0", 1000 + i))),
                1 | 2 => current.push(deactivated(&id, ymd(2024, 1 + i % 12, 1 + i % 28))),
                3 => ledger.push(PersonnelRecord::new(&id).with_date(ymd(2024, 6, 1))),
                _ => {}
            }
        }
        let snapshots = SnapshotSet::builder()
            .prior(prior)
            .current(current)
            .ledger(ledger)
            .build();
        let res = reconcile(&snapshots, &ReconcileRules::DEFAULT_RULES).unwrap();
        let sd: HashSet<&str> = res
            .events
            .iter()
            .filter(|e| e.exit == ExitCategory::SystemDeactivation)
            .map(|e| e.employee_id.as_str())
            .collect();
        let oc: HashSet<&str> = res
            .events
            .iter()
            .filter(|e| e.exit == ExitCategory::OrganizationalChange)
            .map(|e| e.employee_id.as_str())
            .collect();
        assert_eq!(res.departed_count, 48);
        assert_eq!(res.departed_count, sd.len() + oc.len());
        assert_eq!(sd.len(), 24);
        assert_eq!(oc.len(), 24);
        assert!(sd.is_disjoint(&oc));
        assert_eq!(res.count(ExitCategory::SystemDeactivation), 24);
    }

    #[test]
    fn reconciliation_is_idempotent() {
        let a = reconcile(&scenario(), &ReconcileRules::DEFAULT_RULES).unwrap();
        let b = reconcile(&scenario(), &ReconcileRules::DEFAULT_RULES).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn text_search() {
        let res = reconcile(&scenario(), &ReconcileRules::DEFAULT_RULES).unwrap();
        assert_eq!(filter_by_text(&res.events, "transf").len(), 1);
        assert_eq!(filter_by_text(&res.events, "BAJA").len(), 1);
        assert_eq!(filter_by_text(&res.events, "09/01/2025").len(), 1);
        assert_eq!(filter_by_text(&res.events, "").len(), 2);
        assert!(filter_by_text(&res.events, "nobody").is_empty());
    }
}
