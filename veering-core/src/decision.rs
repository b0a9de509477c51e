//! Zone presence → guidance decision table
//!
//! A tag seen on only one side means the walker is drifting toward that side's edge, so the
//! guidance steers away from it. Anything in the center, or both sides at once, counts as on
//! course. Nothing at all is [`Action::Unknown`], which is deliberately distinct from
//! [`Action::KeepGoing`].

use crate::types::{Action, ZonePresenceSummary};

/// One row of the table: (left, center, right) → action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionRow {
    pub left: bool,
    pub center: bool,
    pub right: bool,
    pub action: Action,
}

const fn row(left: bool, center: bool, right: bool, action: Action) -> DecisionRow {
    DecisionRow {
        left,
        center,
        right,
        action,
    }
}

/// Every presence combination with its action
pub const DECISION_TABLE: [DecisionRow; 8] = [
    row(false, false, false, Action::Unknown),
    row(false, false, true, Action::VeerLeft),
    row(false, true, false, Action::KeepGoing),
    row(false, true, true, Action::KeepGoing),
    row(true, false, false, Action::VeerRight),
    row(true, false, true, Action::KeepGoing),
    row(true, true, false, Action::KeepGoing),
    row(true, true, true, Action::KeepGoing),
];

/// Immutable lookup over [`DECISION_TABLE`]
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    rows: &'static [DecisionRow],
}

impl DecisionEngine {
    pub fn new() -> Self {
        Self {
            rows: &DECISION_TABLE,
        }
    }

    /// Action for a cycle's zone presence
    pub fn decide(&self, summary: &ZonePresenceSummary) -> Action {
        let found = self.rows.iter().find(|r| {
            r.left == summary.left && r.center == summary.center && r.right == summary.right
        });

        match found {
            Some(r) => r.action,
            None => {
                log::error!("Decision table has no row for [{}]", summary);
                debug_assert!(false, "decision table is not exhaustive");
                Action::Unknown
            }
        }
    }

    pub fn rows(&self) -> &[DecisionRow] {
        self.rows
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}
