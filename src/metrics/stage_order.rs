use crate::records::{Board, StatusCategory, WorkflowCategory};

/// Resolves the ordered list of stages to report on.
///
/// An explicit `transition_order` is used verbatim. Otherwise the stages of
/// every board column are flattened, keeping column order and then the order
/// within each column.
pub fn resolve_transition_order(board: &Board) -> Vec<String> {
    if let Some(order) = &board.transition_order {
        return order.clone();
    }

    board.board_config.values().flatten().cloned().collect()
}

/// Names of the workflow statuses in the "indeterminate" category.
///
/// Categories are visited in `categories` order; a status listed more than once
/// is kept only at its first position. Categories missing from `categories`
/// are ignored.
pub fn collect_in_progress_stages(
    workflows: &[WorkflowCategory],
    categories: &[StatusCategory],
) -> Vec<String> {
    let mut stages: Vec<String> = Vec::new();

    for category in categories.iter().filter(|c| **c == StatusCategory::Indeterminate) {
        let names = workflows
            .iter()
            .filter(|wf| wf.key == category.as_str())
            .flat_map(|wf| wf.workflows.iter())
            .map(|status| &status.untranslated_name);

        for name in names {
            if !stages.contains(name) {
                stages.push(name.clone());
            }
        }
    }

    stages
}
