//! Positional reconciliation of ordered child lists (sport rules and safety
//! lines) against the list a client submits.
//!
//! The stored rows are compared with the submitted strings by index: a row
//! at the same position is rewritten in place, a missing position becomes
//! an insert with a 1-based display order. What happens to stored rows past
//! the end of the submitted list is decided by [`TrailingRows`].

/// Treatment of stored rows beyond the submitted list length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingRows {
    /// Leave them in place. This is what the admin panel has always relied on.
    #[default]
    Retain,
    /// Delete them so the stored list matches the submitted one exactly.
    Prune,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOp {
    Update { row_id: i64, text: String },
    Insert { display_order: i64, text: String },
    Delete { row_id: i64 },
}

/// `existing` holds the stored row ids ordered by display order.
pub fn reconcile(existing: &[i64], submitted: &[String], policy: TrailingRows) -> Vec<ListOp> {
    let mut ops: Vec<ListOp> = submitted
        .iter()
        .enumerate()
        .map(|(idx, text)| match existing.get(idx) {
            Some(&row_id) => ListOp::Update {
                row_id,
                text: text.clone(),
            },
            None => ListOp::Insert {
                display_order: idx as i64 + 1,
                text: text.clone(),
            },
        })
        .collect();

    if policy == TrailingRows::Prune {
        ops.extend(
            existing
                .iter()
                .skip(submitted.len())
                .map(|&row_id| ListOp::Delete { row_id }),
        );
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn shorter_submission_updates_prefix_and_keeps_rest() {
        let ops = reconcile(
            &[11, 12, 13],
            &lines(&["no shoes", "no food"]),
            TrailingRows::Retain,
        );

        assert_eq!(
            ops,
            vec![
                ListOp::Update {
                    row_id: 11,
                    text: "no shoes".to_string()
                },
                ListOp::Update {
                    row_id: 12,
                    text: "no food".to_string()
                },
            ]
        );
    }

    #[test]
    fn longer_submission_appends_contiguous_orders() {
        let ops = reconcile(&[7], &lines(&["a", "b", "c"]), TrailingRows::Retain);

        assert_eq!(ops.len(), 3);
        assert_eq!(
            ops[0],
            ListOp::Update {
                row_id: 7,
                text: "a".to_string()
            }
        );

        let inserted: Vec<i64> = ops
            .iter()
            .filter_map(|op| match op {
                ListOp::Insert { display_order, .. } => Some(*display_order),
                _ => None,
            })
            .collect();
        assert_eq!(inserted, vec![2, 3]);
    }

    #[test]
    fn empty_store_inserts_everything_from_one() {
        let ops = reconcile(&[], &lines(&["first", "second"]), TrailingRows::Retain);

        assert_eq!(
            ops,
            vec![
                ListOp::Insert {
                    display_order: 1,
                    text: "first".to_string()
                },
                ListOp::Insert {
                    display_order: 2,
                    text: "second".to_string()
                },
            ]
        );
    }

    #[test]
    fn empty_submission_is_a_no_op_when_retaining() {
        assert!(reconcile(&[1, 2], &[], TrailingRows::Retain).is_empty());
    }

    #[test]
    fn prune_deletes_exactly_the_trailing_rows() {
        let ops = reconcile(&[1, 2, 3, 4], &lines(&["x"]), TrailingRows::Prune);

        let deleted: Vec<i64> = ops
            .iter()
            .filter_map(|op| match op {
                ListOp::Delete { row_id } => Some(*row_id),
                _ => None,
            })
            .collect();
        assert_eq!(deleted, vec![2, 3, 4]);
        assert!(matches!(ops[0], ListOp::Update { row_id: 1, .. }));
    }

    #[test]
    fn prune_never_deletes_when_submission_covers_store() {
        let ops = reconcile(&[1, 2], &lines(&["x", "y", "z"]), TrailingRows::Prune);
        assert!(!ops.iter().any(|op| matches!(op, ListOp::Delete { .. })));
    }
}
