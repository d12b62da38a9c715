//! States, models, and the proposition satisfaction predicate.

use crate::spec::Spec;

/// Index of a state in its model's state vector.
///
/// Transitions are stored as indices rather than shared references; the
/// builder guarantees every stored id is in bounds.
pub type StateId = usize;

/// A single state of the transition structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    /// Declared identifier.
    pub name: String,
    /// Atomic propositions holding in this state, derived from the name
    /// at construction time. The checker may append its synthetic
    /// until-label later; nothing else ever changes this set.
    pub labels: Vec<String>,
    /// Outgoing transitions in rule order. Duplicates and self-references
    /// are allowed.
    pub transitions: Vec<StateId>,
}

impl State {
    /// Create a state with labels derived from its identifier and no
    /// outgoing transitions yet.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let labels = derive_labels(&name);
        Self {
            name,
            labels,
            transitions: Vec::new(),
        }
    }

    /// Whether this state satisfies a proposition token.
    ///
    /// A `!` prefix negates the rest of the token; prefixes stack, so
    /// `!!x` is equivalent to `x`. A bare token holds iff it is in the
    /// current label set.
    pub fn satisfies(&self, prop: &str) -> bool {
        match prop.strip_prefix('!') {
            Some(inner) => !self.satisfies(inner),
            None => self.labels.iter().any(|l| l == prop),
        }
    }
}

/// Split an identifier into consecutive non-overlapping 2-character label
/// chunks, left to right; an odd-length identifier yields a final
/// 1-character label. This is the only propositional labeling mechanism
/// of the input language.
pub fn derive_labels(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    chars.chunks(2).map(|c| c.iter().collect()).collect()
}

/// A fully built transition structure together with its property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// All states, in declaration order.
    pub states: Vec<State>,
    /// Index of the designated initial state.
    pub initial: StateId,
    /// The CTLSPEC property.
    pub spec: Spec,
}

impl Model {
    /// Look up a state id by name.
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.states.iter().position(|s| s.name == name)
    }

    /// The designated initial state.
    pub fn initial_state(&self) -> &State {
        &self.states[self.initial]
    }
}
