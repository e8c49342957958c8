// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Compliance metrics derived from entities and decision records.
//!
//! Everything here is a pure function of its inputs. Timestamps are
//! normalized to UTC before windows are computed.

use crate::decision::DecisionRecord;
use inst_plan_domain::{Decision, EntityKind, Role, WorkflowEntity, WorkflowState, outgoing_rules};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

/// Restricts a computation to a subset of entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceScope {
    /// Only entities of this institution.
    pub institution: Option<String>,
    /// Only entities of this kind.
    pub kind: Option<EntityKind>,
}

impl ComplianceScope {
    /// A scope covering every entity.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            institution: None,
            kind: None,
        }
    }

    /// Returns true if `entity` falls inside the scope.
    #[must_use]
    pub fn matches(&self, entity: &WorkflowEntity) -> bool {
        self.kind.is_none_or(|kind| kind == entity.kind)
            && self
                .institution
                .as_deref()
                .is_none_or(|institution| institution == entity.institution)
    }
}

/// An inclusive UTC time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// First instant in the window.
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    /// Last instant in the window.
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

impl TimeWindow {
    /// Creates a window from two instants, both inclusive.
    #[must_use]
    pub const fn new(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self { start, end }
    }

    /// The UTC calendar day containing `instant`.
    #[must_use]
    pub fn day_of(instant: OffsetDateTime) -> Self {
        let date: Date = instant.to_offset(UtcOffset::UTC).date();
        Self::between_dates(date, date + Duration::days(1))
    }

    /// The UTC calendar month containing `instant`.
    #[must_use]
    pub fn month_of(instant: OffsetDateTime) -> Self {
        let date: Date = instant.to_offset(UtcOffset::UTC).date();
        let first: Date = first_of_month(date);
        let next: Date = first_of_month(first + Duration::days(32));
        Self::between_dates(first, next)
    }

    fn between_dates(first: Date, next: Date) -> Self {
        Self {
            start: first.midnight().assume_utc(),
            end: next.midnight().assume_utc() - Duration::nanoseconds(1),
        }
    }

    /// Returns true if `instant` lies inside the window.
    #[must_use]
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        instant >= self.start && instant <= self.end
    }
}

fn first_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

/// Share of submitted entities in scope that reached a favourable decision.
///
/// Submitted means any state other than `Draft`. Returns `0.0` when nothing
/// in scope has been submitted; the result is always within `[0, 1]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compliance_rate(entities: &[WorkflowEntity], scope: &ComplianceScope) -> f64 {
    let mut submitted: usize = 0;
    let mut accepted: usize = 0;

    for entity in entities.iter().filter(|e| scope.matches(e)) {
        if entity.state == WorkflowState::Draft {
            continue;
        }
        submitted += 1;
        if matches!(
            entity.state,
            WorkflowState::Validated | WorkflowState::Approved
        ) {
            accepted += 1;
        }
    }

    if submitted == 0 {
        return 0.0;
    }
    accepted as f64 / submitted as f64
}

/// Number of entities in scope awaiting an action `role` may take.
///
/// Only non-terminal states count. An entity is pending for a role when an
/// outgoing edge of the transition table lists that role.
#[must_use]
pub fn pending_count(entities: &[WorkflowEntity], scope: &ComplianceScope, role: Role) -> usize {
    entities
        .iter()
        .filter(|e| scope.matches(e) && !e.state.is_terminal())
        .filter(|e| outgoing_rules(e.kind, e.state).any(|rule| rule.permits(role)))
        .count()
}

/// Budget execution variance as a percentage of the assigned amount.
///
/// Returns `None` when the entity has no budget or nothing was assigned.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn budget_variance(entity: &WorkflowEntity) -> Option<f64> {
    let budget = entity.budget?;
    if budget.assigned == 0 {
        return None;
    }
    let assigned: f64 = budget.assigned as f64;
    let executed: f64 = budget.executed as f64;
    Some((executed - assigned) / assigned * 100.0)
}

/// Counts decision records inside `window`, optionally of one decision.
#[must_use]
pub fn count_decisions_in_window(
    records: &[DecisionRecord],
    window: &TimeWindow,
    decision: Option<Decision>,
) -> usize {
    records
        .iter()
        .filter(|r| window.contains(r.decided_at))
        .filter(|r| decision.is_none_or(|d| d == r.decision))
        .count()
}

/// Counts every decision record of one decision, whenever it was taken.
#[must_use]
pub fn count_decisions(records: &[DecisionRecord], decision: Decision) -> usize {
    records.iter().filter(|r| r.decision == decision).count()
}

/// Budget line for one project in a compliance report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRow {
    /// Project identifier.
    pub entity_id: Option<i64>,
    /// Project code.
    pub code: String,
    /// Owning institution.
    pub institution: String,
    /// Current state.
    pub state: WorkflowState,
    /// Assigned amount.
    pub assigned: i64,
    /// Executed amount.
    pub executed: i64,
    /// Execution variance in percent.
    pub variance_pct: Option<f64>,
}

/// A compliance summary for one scope at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// The scope the report covers.
    pub scope: ComplianceScope,
    /// When the report was computed.
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    /// Entities in scope.
    pub total_entities: usize,
    /// Entities in scope that have left `Draft`.
    pub submitted: usize,
    /// See [`compliance_rate`].
    pub compliance_rate: f64,
    /// Entities in scope per state.
    pub state_counts: BTreeMap<WorkflowState, usize>,
    /// Pending entities per role, for roles with any pending work.
    pub pending_by_role: BTreeMap<Role, usize>,
    /// Decisions on in-scope entities during the UTC day of `generated_at`.
    pub decisions_today: usize,
    /// Decisions on in-scope entities during the UTC month of `generated_at`.
    pub decisions_this_month: usize,
    /// All approvals on in-scope entities.
    pub approved_total: usize,
    /// All rejections on in-scope entities.
    pub rejected_total: usize,
    /// Per-project budget lines.
    pub budget_rows: Vec<BudgetRow>,
}

impl ComplianceReport {
    /// Computes a report over `entities` and their decision `records`.
    ///
    /// Records whose entity falls outside the scope are ignored.
    #[must_use]
    pub fn build(
        entities: &[WorkflowEntity],
        records: &[DecisionRecord],
        scope: &ComplianceScope,
        now: OffsetDateTime,
    ) -> Self {
        let in_scope: Vec<&WorkflowEntity> =
            entities.iter().filter(|e| scope.matches(e)).collect();

        let mut state_counts: BTreeMap<WorkflowState, usize> = BTreeMap::new();
        for entity in &in_scope {
            *state_counts.entry(entity.state).or_insert(0) += 1;
        }

        let pending_by_role: BTreeMap<Role, usize> = Role::ALL
            .into_iter()
            .map(|role| (role, pending_count(entities, scope, role)))
            .filter(|(_, count)| *count > 0)
            .collect();

        let scoped_records: Vec<DecisionRecord> = records
            .iter()
            .filter(|r| {
                in_scope
                    .iter()
                    .any(|e| e.entity_id == Some(r.entity_id) && e.kind == r.entity_kind)
            })
            .cloned()
            .collect();

        let budget_rows: Vec<BudgetRow> = in_scope
            .iter()
            .filter_map(|e| {
                e.budget.map(|budget| BudgetRow {
                    entity_id: e.entity_id,
                    code: e.code.clone(),
                    institution: e.institution.clone(),
                    state: e.state,
                    assigned: budget.assigned,
                    executed: budget.executed,
                    variance_pct: budget_variance(e),
                })
            })
            .collect();

        Self {
            scope: scope.clone(),
            generated_at: now,
            total_entities: in_scope.len(),
            submitted: in_scope
                .iter()
                .filter(|e| e.state != WorkflowState::Draft)
                .count(),
            compliance_rate: compliance_rate(entities, scope),
            state_counts,
            pending_by_role,
            decisions_today: count_decisions_in_window(
                &scoped_records,
                &TimeWindow::day_of(now),
                None,
            ),
            decisions_this_month: count_decisions_in_window(
                &scoped_records,
                &TimeWindow::month_of(now),
                None,
            ),
            approved_total: count_decisions(&scoped_records, Decision::Approved),
            rejected_total: count_decisions(&scoped_records, Decision::Rejected),
            budget_rows,
        }
    }

    /// Drops per-project budget detail, keeping only aggregates.
    #[must_use]
    pub fn without_budget_rows(mut self) -> Self {
        self.budget_rows.clear();
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use inst_plan_domain::Budget;
    use time::macros::datetime;

    fn entity(
        id: i64,
        kind: EntityKind,
        institution: &str,
        state: WorkflowState,
    ) -> WorkflowEntity {
        let mut e: WorkflowEntity = WorkflowEntity::new_draft(
            kind,
            format!("E-{id}"),
            String::from("Test"),
            String::from(institution),
            String::from("planner-1"),
            None,
            datetime!(2026-01-10 08:00 UTC),
        );
        e.entity_id = Some(id);
        e.state = state;
        e
    }

    fn record(entity_id: i64, decision: Decision, at: OffsetDateTime) -> DecisionRecord {
        DecisionRecord {
            record_id: None,
            entity_kind: EntityKind::Project,
            entity_id,
            entity_code: format!("E-{entity_id}"),
            decision,
            actor_id: String::from("reviewer-1"),
            actor_role: Role::Reviewer,
            justification: None,
            from_state: WorkflowState::SentForReview,
            to_state: match decision {
                Decision::Approved => WorkflowState::Approved,
                Decision::Rejected => WorkflowState::Rejected,
            },
            decided_at: at,
        }
    }

    #[test]
    fn test_compliance_rate_is_zero_without_submissions() {
        let entities: Vec<WorkflowEntity> = vec![
            entity(1, EntityKind::Objective, "A", WorkflowState::Draft),
            entity(2, EntityKind::Project, "A", WorkflowState::Draft),
        ];
        assert!(compliance_rate(&entities, &ComplianceScope::all()).abs() < f64::EPSILON);
        assert!(compliance_rate(&[], &ComplianceScope::all()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_compliance_rate_counts_accepted_over_submitted() {
        let entities: Vec<WorkflowEntity> = vec![
            entity(1, EntityKind::Objective, "A", WorkflowState::Validated),
            entity(2, EntityKind::Project, "A", WorkflowState::Approved),
            entity(3, EntityKind::Project, "A", WorkflowState::Rejected),
            entity(4, EntityKind::Project, "A", WorkflowState::SentForReview),
            entity(5, EntityKind::Project, "A", WorkflowState::Draft),
        ];
        let rate: f64 = compliance_rate(&entities, &ComplianceScope::all());
        assert!((rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_compliance_rate_stays_in_unit_interval() {
        let mut entities: Vec<WorkflowEntity> = Vec::new();
        for (i, state) in WorkflowState::ALL.into_iter().enumerate() {
            let id: i64 = i64::try_from(i).unwrap();
            let kind: EntityKind = if state.applies_to(EntityKind::Objective) {
                EntityKind::Objective
            } else {
                EntityKind::Project
            };
            entities.push(entity(id, kind, "A", state));
            let rate: f64 = compliance_rate(&entities, &ComplianceScope::all());
            assert!((0.0..=1.0).contains(&rate));
        }
    }

    #[test]
    fn test_scope_filters_by_institution_and_kind() {
        let entities: Vec<WorkflowEntity> = vec![
            entity(1, EntityKind::Project, "A", WorkflowState::Approved),
            entity(2, EntityKind::Project, "B", WorkflowState::Rejected),
            entity(3, EntityKind::Objective, "A", WorkflowState::Rejected),
        ];
        let scope: ComplianceScope = ComplianceScope {
            institution: Some(String::from("A")),
            kind: Some(EntityKind::Project),
        };
        let rate: f64 = compliance_rate(&entities, &scope);
        assert!((rate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pending_count_follows_transition_table() {
        let entities: Vec<WorkflowEntity> = vec![
            entity(1, EntityKind::Objective, "A", WorkflowState::SentForValidation),
            entity(2, EntityKind::Project, "A", WorkflowState::SentForReview),
            entity(3, EntityKind::Project, "A", WorkflowState::SentForReview),
            entity(4, EntityKind::Project, "A", WorkflowState::Draft),
            entity(5, EntityKind::Project, "A", WorkflowState::Rejected),
        ];
        let all: ComplianceScope = ComplianceScope::all();
        assert_eq!(pending_count(&entities, &all, Role::Validator), 1);
        assert_eq!(pending_count(&entities, &all, Role::Reviewer), 2);
        assert_eq!(pending_count(&entities, &all, Role::Planner), 1);
        assert_eq!(pending_count(&entities, &all, Role::Admin), 1);
        assert_eq!(pending_count(&entities, &all, Role::Auditor), 0);
    }

    #[test]
    fn test_budget_variance() {
        let mut project: WorkflowEntity =
            entity(1, EntityKind::Project, "A", WorkflowState::Approved);
        assert_eq!(budget_variance(&project), None);

        project.budget = Some(Budget::new(0, 10).unwrap());
        assert_eq!(budget_variance(&project), None);

        project.budget = Some(Budget::new(200, 150).unwrap());
        let variance: f64 = budget_variance(&project).unwrap();
        assert!((variance + 25.0).abs() < 1e-9);

        project.budget = Some(Budget::new(100, 130).unwrap());
        let variance: f64 = budget_variance(&project).unwrap();
        assert!((variance - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_day_window_is_inclusive_utc_day() {
        let window: TimeWindow = TimeWindow::day_of(datetime!(2026-03-15 22:30 -05:00));
        assert_eq!(window.start, datetime!(2026-03-16 00:00 UTC));
        assert_eq!(window.end, datetime!(2026-03-16 23:59:59.999999999 UTC));
        assert!(window.contains(datetime!(2026-03-16 00:00 UTC)));
        assert!(window.contains(window.end));
        assert!(!window.contains(datetime!(2026-03-17 00:00 UTC)));
    }

    #[test]
    fn test_month_window_handles_year_end_and_leap_february() {
        let december: TimeWindow = TimeWindow::month_of(datetime!(2026-12-31 10:00 UTC));
        assert_eq!(december.start, datetime!(2026-12-01 00:00 UTC));
        assert_eq!(december.end, datetime!(2026-12-31 23:59:59.999999999 UTC));

        let february: TimeWindow = TimeWindow::month_of(datetime!(2028-02-10 10:00 UTC));
        assert_eq!(february.end, datetime!(2028-02-29 23:59:59.999999999 UTC));
    }

    #[test]
    fn test_count_decisions_in_window() {
        let records: Vec<DecisionRecord> = vec![
            record(1, Decision::Approved, datetime!(2026-03-16 00:00 UTC)),
            record(2, Decision::Rejected, datetime!(2026-03-16 23:59:59 UTC)),
            record(3, Decision::Approved, datetime!(2026-03-17 00:00 UTC)),
        ];
        let window: TimeWindow = TimeWindow::day_of(datetime!(2026-03-16 12:00 UTC));
        assert_eq!(count_decisions_in_window(&records, &window, None), 2);
        assert_eq!(
            count_decisions_in_window(&records, &window, Some(Decision::Approved)),
            1
        );
        assert_eq!(count_decisions_in_window(&[], &window, None), 0);
    }

    #[test]
    fn test_report_build_and_limited_view() {
        let mut approved: WorkflowEntity =
            entity(1, EntityKind::Project, "A", WorkflowState::Approved);
        approved.budget = Some(Budget::new(100, 80).unwrap());
        let entities: Vec<WorkflowEntity> = vec![
            approved,
            entity(2, EntityKind::Project, "A", WorkflowState::Rejected),
            entity(3, EntityKind::Project, "B", WorkflowState::SentForReview),
        ];
        let records: Vec<DecisionRecord> = vec![
            record(1, Decision::Approved, datetime!(2026-03-16 09:00 UTC)),
            record(2, Decision::Rejected, datetime!(2026-03-02 09:00 UTC)),
            record(9, Decision::Approved, datetime!(2026-03-16 09:00 UTC)),
        ];
        let scope: ComplianceScope = ComplianceScope {
            institution: Some(String::from("A")),
            kind: None,
        };

        let report: ComplianceReport = ComplianceReport::build(
            &entities,
            &records,
            &scope,
            datetime!(2026-03-16 18:00 UTC),
        );

        assert_eq!(report.total_entities, 2);
        assert_eq!(report.submitted, 2);
        assert!((report.compliance_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(report.decisions_today, 1);
        assert_eq!(report.decisions_this_month, 2);
        assert_eq!(report.approved_total, 1);
        assert_eq!(report.rejected_total, 1);
        assert_eq!(report.state_counts.get(&WorkflowState::Approved), Some(&1));
        assert!(report.pending_by_role.is_empty());
        assert_eq!(report.budget_rows.len(), 1);
        assert!((report.budget_rows[0].variance_pct.unwrap() + 20.0).abs() < 1e-9);

        let limited: ComplianceReport = report.without_budget_rows();
        assert!(limited.budget_rows.is_empty());
        assert_eq!(limited.approved_total, 1);
    }

    #[test]
    fn test_totals_include_decisions_stamped_after_now() {
        let entities: Vec<WorkflowEntity> = vec![
            entity(1, EntityKind::Project, "A", WorkflowState::Approved),
            entity(2, EntityKind::Project, "A", WorkflowState::Rejected),
        ];
        let now: OffsetDateTime = datetime!(2026-03-16 18:00 UTC);
        let records: Vec<DecisionRecord> = vec![
            record(1, Decision::Approved, now + Duration::seconds(5)),
            record(2, Decision::Rejected, datetime!(2025-12-31 23:00 UTC)),
        ];

        let report: ComplianceReport =
            ComplianceReport::build(&entities, &records, &ComplianceScope::all(), now);

        assert_eq!(report.approved_total, 1);
        assert_eq!(report.rejected_total, 1);
        assert_eq!(count_decisions(&records, Decision::Approved), 1);
    }
}
