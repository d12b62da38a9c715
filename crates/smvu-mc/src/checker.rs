//! Backward fixpoint labeling for the existential until-operator.

use smvu_syntax::{Model, PathQuant, Spec};
use thiserror::Error;
use tracing::{debug, info};

/// The synthetic label recorded on every state known to satisfy the
/// checked property. Kept distinct from any derivable 2-character label.
pub const EU_LABEL: &str = "epuq";

/// Model checking error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckError {
    #[error("unsupported operator {operator}: only E [ p U q ] properties can be checked")]
    Unsupported { operator: &'static str },
}

pub type CheckResult<T> = Result<T, CheckError>;

/// Result of a successful check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Names of the satisfying states, in declaration order.
    pub satisfying: Vec<String>,
    /// Full saturation scans performed, including the final scan that
    /// confirms the fixpoint. Bounded by `max(1, |states|)`.
    pub scans: usize,
}

/// Label every state satisfying `E [ p U q ]` with [`EU_LABEL`] and
/// report the satisfying set.
///
/// Least fixpoint over state subsets ordered by inclusion: the base step
/// marks every state satisfying `q` (a zero-length witness path, `p` not
/// required); each saturation scan marks every unmarked state satisfying
/// `p` with at least one marked successor, and the loop stops at the
/// first scan that adds nothing. Labels are only ever added, so at most
/// `|states|` scans run regardless of cycles in the transition graph.
pub fn check(model: &mut Model) -> CheckResult<CheckOutcome> {
    let (p, q) = match &model.spec {
        Spec::Until {
            quant: PathQuant::Exists,
            p,
            q,
        } => (p.clone(), q.clone()),
        other => {
            return Err(CheckError::Unsupported {
                operator: other.operator(),
            })
        }
    };

    for state in &mut model.states {
        if state.satisfies(&q) {
            debug!(state = %state.name, "marked in base step");
            state.labels.push(EU_LABEL.to_string());
        }
    }

    let mut scans = 0;
    let mut changed = true;
    while changed {
        changed = false;
        scans += 1;
        for i in 0..model.states.len() {
            if model.states[i].satisfies(EU_LABEL) {
                continue;
            }
            let state = &model.states[i];
            let reaches_marked = state.satisfies(&p)
                && state
                    .transitions
                    .iter()
                    .any(|&t| model.states[t].satisfies(EU_LABEL));
            if reaches_marked {
                debug!(state = %model.states[i].name, scan = scans, "marked in saturation scan");
                model.states[i].labels.push(EU_LABEL.to_string());
                changed = true;
            }
        }
    }

    let satisfying: Vec<String> = model
        .states
        .iter()
        .filter(|s| s.satisfies(EU_LABEL))
        .map(|s| s.name.clone())
        .collect();
    info!(satisfying = satisfying.len(), scans, "fixpoint reached");

    Ok(CheckOutcome { satisfying, scans })
}
