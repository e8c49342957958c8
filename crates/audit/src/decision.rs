// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use inst_plan_domain::{Decision, EntityKind, Role, WorkflowState};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An immutable record of one approve or reject decision.
///
/// Records are produced only by a legal decision-bearing transition. A
/// `Rejected` record always carries a non-blank justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Store-assigned identifier. `None` until persisted.
    pub record_id: Option<i64>,
    /// Kind of the decided entity.
    pub entity_kind: EntityKind,
    /// Identifier of the decided entity.
    pub entity_id: i64,
    /// Code of the decided entity at decision time.
    pub entity_code: String,
    /// The decision taken.
    pub decision: Decision,
    /// The deciding user.
    pub actor_id: String,
    /// The role that authorized the decision.
    pub actor_role: Role,
    /// Why the decision was taken.
    pub justification: Option<String>,
    /// State before the decision.
    pub from_state: WorkflowState,
    /// State after the decision.
    pub to_state: WorkflowState,
    /// When the decision was taken (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub decided_at: OffsetDateTime,
}

impl DecisionRecord {
    /// Returns true if the record is an approval.
    #[must_use]
    pub const fn is_approval(&self) -> bool {
        matches!(self.decision, Decision::Approved)
    }
}
