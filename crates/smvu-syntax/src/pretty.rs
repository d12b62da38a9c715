//! Diagnostic rendering of a built model.

use crate::model::Model;

/// Render the full model structure: every state with its labels, the
/// transition lists, the initial state, and the spec.
pub fn dump(model: &Model) -> String {
    let mut out = String::new();
    out.push_str("states:\n");
    for state in &model.states {
        out.push_str(&format!("  {}: {}\n", state.name, state.labels.join(", ")));
    }
    out.push_str("transitions:\n");
    for state in &model.states {
        let targets: Vec<&str> = state
            .transitions
            .iter()
            .map(|&t| model.states[t].name.as_str())
            .collect();
        out.push_str(&format!("  {} -> {}\n", state.name, targets.join(", ")));
    }
    out.push_str(&format!("initial state: {}\n", model.initial_state().name));
    out.push_str(&format!("spec: {}\n", model.spec));
    out
}
