//! Dry-run preview support for `internsync diff`.

use similar::TextDiff;

use internsync_core::{Field, InsertPolicy, Posting, RowIndex};

use crate::plan::ChangePlan;

/// One row the plan would touch, addressed as it will be after applying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowChange {
    Added {
        row: RowIndex,
        posting: Posting,
    },
    Updated {
        row: RowIndex,
        /// Unified diff of `Field: value` lines, stored vs planned.
        unified_diff: String,
    },
}

impl RowChange {
    pub fn row(&self) -> RowIndex {
        match self {
            RowChange::Added { row, .. } | RowChange::Updated { row, .. } => *row,
        }
    }
}

/// Every row change in `plan`, inserts first.
pub fn preview(plan: &ChangePlan, policy: InsertPolicy) -> Vec<RowChange> {
    let added = plan
        .inserts
        .iter()
        .enumerate()
        .map(|(i, posting)| RowChange::Added {
            row: plan.insert_row(i, policy),
            posting: posting.clone(),
        });

    let updated = plan.updates.iter().map(|update| {
        let old = render(&update.previous);
        let new = render(&update.posting);
        let row = plan.update_row(update.row, policy);
        let unified_diff = TextDiff::from_lines(&old, &new)
            .unified_diff()
            .header(&format!("a/row {}", update.row), &format!("b/row {row}"))
            .context_radius(Field::ALL.len())
            .to_string();
        RowChange::Updated { row, unified_diff }
    });

    added.chain(updated).collect()
}

fn render(posting: &Posting) -> String {
    Field::ALL
        .iter()
        .map(|field| format!("{}: {}\n", field.label(), posting.get(*field)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{PlanMode, RowUpdate};

    #[test]
    fn update_diff_shows_only_changed_field_as_edit() {
        let previous = Posting::new("Acme", "Engineer Intern", "Remote", "http://x", "Jun 2026")
            .with_annotations("Jane", "");
        let mut posting = previous.clone();
        posting.date_posted = "Jul 2026".to_string();
        let plan = ChangePlan {
            mode: PlanMode::Incremental,
            inserts: vec![Posting::new("Globex", "Intern", "NYC", "http://g", "Jul 2026")],
            updates: vec![RowUpdate {
                row: RowIndex(2),
                previous,
                posting,
            }],
            unchanged: 0,
            duplicates: 0,
            last_row: RowIndex(2),
        };

        let changes = preview(&plan, InsertPolicy::Top);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].row(), RowIndex(2));
        assert_eq!(changes[1].row(), RowIndex(3));

        let RowChange::Updated { unified_diff, .. } = &changes[1] else {
            panic!("expected update");
        };
        assert!(unified_diff.contains("-Date Posted: Jun 2026"), "{unified_diff}");
        assert!(unified_diff.contains("+Date Posted: Jul 2026"), "{unified_diff}");
        assert!(unified_diff.contains(" Recruiters: Jane"), "{unified_diff}");
        assert!(unified_diff.contains("--- a/row 2"), "{unified_diff}");
        assert!(unified_diff.contains("+++ b/row 3"), "{unified_diff}");
    }

    #[test]
    fn append_policy_places_inserts_after_last_row() {
        let plan = ChangePlan {
            mode: PlanMode::Incremental,
            inserts: vec![Posting::new("A", "r", "l", "k", "d")],
            updates: vec![],
            unchanged: 4,
            duplicates: 0,
            last_row: RowIndex(5),
        };
        assert_eq!(preview(&plan, InsertPolicy::Append)[0].row(), RowIndex(6));
    }
}
