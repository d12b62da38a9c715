//! Line-oriented parser for the smvu model description language.
//!
//! The input is consumed line by line through an explicit phase machine,
//! `NotStarted -> Variables -> Assignments <-> Transition`. Each line
//! either advances the phase, contributes to the model under
//! construction, or aborts the whole build with a fatal error; there is
//! no recovery or partial result.

use crate::model::{Model, State, StateId};
use crate::spec::{PathQuant, Spec, UnaryOp};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// A fatal build error, raised at the first line that cannot be
/// interpreted under the current phase.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: the input must start with the MODULE keyword")]
    MissingModuleHeader { line: u32 },

    #[error("line {line}: variable line cannot be parsed")]
    MalformedVariable { line: u32 },

    #[error("line {line}: no variable is defined")]
    NoStatesDeclared { line: u32 },

    #[error("line {line}: the state set is already declared")]
    StateSetRedeclared { line: u32 },

    #[error("line {line}: duplicate state name '{name}'")]
    DuplicateState { name: String, line: u32 },

    #[error("line {line}: initialization cannot be parsed")]
    MalformedInit { line: u32 },

    #[error("line {line}: transition cannot be parsed")]
    MalformedTransition { line: u32 },

    #[error("line {line}: ctlspec cannot be parsed")]
    MalformedSpec { line: u32 },

    #[error("line {line}: unknown state '{name}'")]
    UnknownState { name: String, line: u32 },

    #[error("line {line}: model is incomplete, {missing} is never declared")]
    Incomplete { missing: &'static str, line: u32 },
}

impl ParseError {
    /// 1-indexed source line the error refers to. For an incomplete
    /// model this is the line count of the input.
    pub fn line(&self) -> u32 {
        match self {
            ParseError::MissingModuleHeader { line }
            | ParseError::MalformedVariable { line }
            | ParseError::NoStatesDeclared { line }
            | ParseError::StateSetRedeclared { line }
            | ParseError::DuplicateState { line, .. }
            | ParseError::MalformedInit { line }
            | ParseError::MalformedTransition { line }
            | ParseError::MalformedSpec { line }
            | ParseError::UnknownState { line, .. }
            | ParseError::Incomplete { line, .. } => *line,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parsing phase. Every input line is interpreted under the current
/// phase, and some lines advance it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing consumed yet; the module header is required next.
    NotStarted,
    /// Inside the variable section, waiting for the state declaration.
    Variables,
    /// Inside the assignment section.
    Assignments,
    /// Inside a `next(state) := case ... esac;` block.
    Transition,
}

/// Incremental model builder: feed lines one at a time, then finish into
/// a complete [`Model`].
pub struct Parser {
    phase: Phase,
    line: u32,
    states: Vec<State>,
    ids: HashMap<String, StateId>,
    initial: Option<StateId>,
    spec: Option<Spec>,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            phase: Phase::NotStarted,
            line: 0,
            states: Vec::new(),
            ids: HashMap::new(),
            initial: None,
            spec: None,
        }
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Consume one input line. Whitespace around the line is
    /// insignificant.
    pub fn feed(&mut self, raw: &str) -> ParseResult<()> {
        self.line += 1;
        let line = raw.trim();
        match self.phase {
            Phase::NotStarted => {
                if !line.starts_with("MODULE") {
                    return Err(ParseError::MissingModuleHeader { line: self.line });
                }
                self.phase = Phase::Variables;
                Ok(())
            }
            Phase::Variables => self.feed_variables(line),
            Phase::Assignments => self.feed_assignments(line),
            Phase::Transition => self.feed_transition(line),
        }
    }

    /// Finish the build. The caller gets a complete, consistent model or
    /// the reason it is incomplete, never a partial value.
    pub fn finish(self) -> ParseResult<Model> {
        let line = self.line;
        if self.states.is_empty() {
            return Err(ParseError::Incomplete {
                missing: "the state set",
                line,
            });
        }
        let initial = self.initial.ok_or(ParseError::Incomplete {
            missing: "the initial state",
            line,
        })?;
        let spec = self.spec.ok_or(ParseError::Incomplete {
            missing: "a CTLSPEC property",
            line,
        })?;
        Ok(Model {
            states: self.states,
            initial,
            spec,
        })
    }

    fn feed_variables(&mut self, line: &str) -> ParseResult<()> {
        if line.starts_with("VAR") {
            return Ok(());
        }
        if line.starts_with("ASSIGN") {
            if self.states.is_empty() {
                return Err(ParseError::NoStatesDeclared { line: self.line });
            }
            self.phase = Phase::Assignments;
            return Ok(());
        }
        self.parse_state_decl(line)
    }

    fn feed_assignments(&mut self, line: &str) -> ParseResult<()> {
        if line.starts_with("init") {
            return self.parse_init(line);
        }
        if line.starts_with("next") {
            self.phase = Phase::Transition;
            return self.feed_transition(line);
        }
        if line.starts_with("CTLSPEC") {
            return self.parse_spec(line);
        }
        Ok(())
    }

    fn feed_transition(&mut self, line: &str) -> ParseResult<()> {
        if line == "esac;" {
            self.phase = Phase::Assignments;
            return Ok(());
        }
        if line.starts_with("next") {
            // `next(state) := case` header: pure syntax, carries no edge.
            let mut cur = Cursor::new(line);
            if !(cur.tag("next")
                && cur.tag("(")
                && cur.tag("state")
                && cur.tag(")")
                && cur.tag(":="))
            {
                return Err(ParseError::MalformedTransition { line: self.line });
            }
            return Ok(());
        }
        if line.starts_with("case") {
            return Ok(());
        }
        if line.starts_with(|c: char| c.is_ascii_digit()) {
            // Numeric default guard, e.g. `1 : {s0};`.
            return Ok(());
        }
        self.parse_transition_rule(line)
    }

    /// `state : { name1, name2, ... };` declares the whole state set in
    /// one shot.
    fn parse_state_decl(&mut self, line: &str) -> ParseResult<()> {
        debug!(line = self.line, "parsing state declaration");
        if !self.states.is_empty() {
            return Err(ParseError::StateSetRedeclared { line: self.line });
        }
        let mut cur = Cursor::new(line);
        if !(cur.tag("state") && cur.tag(":") && cur.tag("{")) {
            return Err(ParseError::MalformedVariable { line: self.line });
        }
        let Some(names) = cur.name_list("}") else {
            return Err(ParseError::MalformedVariable { line: self.line });
        };
        if !cur.tag(";") {
            return Err(ParseError::MalformedVariable { line: self.line });
        }
        for name in names {
            let id = self.states.len();
            if self.ids.insert(name.to_string(), id).is_some() {
                return Err(ParseError::DuplicateState {
                    name: name.to_string(),
                    line: self.line,
                });
            }
            self.states.push(State::new(name));
        }
        debug!(count = self.states.len(), "declared state set");
        Ok(())
    }

    /// `init(state) := NAME;` with NAME a declared state.
    fn parse_init(&mut self, line: &str) -> ParseResult<()> {
        debug!(line = self.line, "parsing initialization");
        let mut cur = Cursor::new(line);
        if !(cur.tag("init") && cur.tag("(") && cur.tag("state") && cur.tag(")") && cur.tag(":="))
        {
            return Err(ParseError::MalformedInit { line: self.line });
        }
        let Some(name) = cur.name() else {
            return Err(ParseError::MalformedInit { line: self.line });
        };
        if !cur.tag(";") {
            return Err(ParseError::MalformedInit { line: self.line });
        }
        self.initial = Some(self.resolve(name)?);
        Ok(())
    }

    /// `[(]state = NAME[)] : {T1, T2, ...};` or a single unbraced target.
    /// Targets are appended in order; repeated rules append repeated
    /// edges.
    fn parse_transition_rule(&mut self, line: &str) -> ParseResult<()> {
        debug!(line = self.line, "parsing transition rule");
        let mut cur = Cursor::new(line);
        cur.tag("(");
        if !(cur.tag("state") && cur.tag("=")) {
            return Err(ParseError::MalformedTransition { line: self.line });
        }
        let Some(from) = cur.name() else {
            return Err(ParseError::MalformedTransition { line: self.line });
        };
        cur.tag(")");
        if !cur.tag(":") {
            return Err(ParseError::MalformedTransition { line: self.line });
        }
        let targets = if cur.tag("{") {
            match cur.name_list("}") {
                Some(names) => names,
                None => return Err(ParseError::MalformedTransition { line: self.line }),
            }
        } else {
            match cur.name() {
                Some(name) => vec![name],
                None => return Err(ParseError::MalformedTransition { line: self.line }),
            }
        };
        if !cur.tag(";") {
            return Err(ParseError::MalformedTransition { line: self.line });
        }
        let from = self.resolve(from)?;
        for target in targets {
            let to = self.resolve(target)?;
            self.states[from].transitions.push(to);
        }
        Ok(())
    }

    /// `CTLSPEC OP p` for the unary operators, or `CTLSPEC E [ p U q ]`
    /// / `CTLSPEC A [ p U q ]` for the until-forms.
    fn parse_spec(&mut self, line: &str) -> ParseResult<()> {
        debug!(line = self.line, "parsing ctlspec");
        let mut cur = Cursor::new(line);
        if !cur.tag("CTLSPEC") {
            return Err(ParseError::MalformedSpec { line: self.line });
        }
        let Some(word) = cur.name() else {
            return Err(ParseError::MalformedSpec { line: self.line });
        };
        let spec = if let Some(op) = UnaryOp::from_keyword(word) {
            let Some(p) = cur.prop() else {
                return Err(ParseError::MalformedSpec { line: self.line });
            };
            Spec::Unary {
                op,
                p: p.to_string(),
            }
        } else {
            let quant = match word {
                "E" => PathQuant::Exists,
                "A" => PathQuant::Forall,
                _ => return Err(ParseError::MalformedSpec { line: self.line }),
            };
            let open = cur.tag("[");
            let p = cur.prop();
            let until = cur.tag("U");
            let q = cur.prop();
            let close = cur.tag("]");
            match (open, p, until, q, close) {
                (true, Some(p), true, Some(q), true) => Spec::Until {
                    quant,
                    p: p.to_string(),
                    q: q.to_string(),
                },
                _ => return Err(ParseError::MalformedSpec { line: self.line }),
            }
        };
        self.spec = Some(spec);
        Ok(())
    }

    fn resolve(&self, name: &str) -> ParseResult<StateId> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| ParseError::UnknownState {
                name: name.to_string(),
                line: self.line,
            })
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a model from a complete source text.
pub fn parse(source: &str) -> ParseResult<Model> {
    let mut parser = Parser::new();
    for line in source.lines() {
        parser.feed(line)?;
    }
    parser.finish()
}

/// Minimal cursor over one line: eats fixed tokens, names, and
/// proposition tokens, skipping the spaces around them.
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    fn skip_spaces(&mut self) {
        self.rest = self.rest.trim_start();
    }

    /// Consume an exact token.
    fn tag(&mut self, token: &str) -> bool {
        self.skip_spaces();
        match self.rest.strip_prefix(token) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    /// Consume a name: one or more ASCII alphanumerics or underscores.
    fn name(&mut self) -> Option<&'a str> {
        self.skip_spaces();
        let end = self
            .rest
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let (name, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(name)
    }

    /// Consume a proposition token: any number of `!` prefixes followed
    /// by a name, returned with the prefixes included.
    fn prop(&mut self) -> Option<&'a str> {
        self.skip_spaces();
        let start = self.rest;
        let after_bangs = start.trim_start_matches('!');
        let bangs = start.len() - after_bangs.len();
        let name_end = after_bangs
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(after_bangs.len());
        if name_end == 0 {
            return None;
        }
        let token = &start[..bangs + name_end];
        self.rest = &start[bangs + name_end..];
        Some(token)
    }

    /// Consume comma-separated names up to the closing token.
    fn name_list(&mut self, close: &str) -> Option<Vec<&'a str>> {
        let mut names = vec![self.name()?];
        loop {
            if self.tag(close) {
                return Some(names);
            }
            if !self.tag(",") {
                return None;
            }
            names.push(self.name()?);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = "\
MODULE main
VAR
state : {s0q1, s1p0, s2p1};
ASSIGN
init(state) := s0q1;
next(state) := case
state = s0q1 : s1p0;
state = s1p0 : s2p1;
state = s2p1 : s2p1;
esac;
CTLSPEC E [ p0 U q1 ]";

    #[test]
    fn test_parse_basic_model() {
        let model = parse(BASIC).unwrap();
        assert_eq!(model.states.len(), 3);
        assert_eq!(model.states[0].name, "s0q1");
        assert_eq!(model.states[0].labels, vec!["s0", "q1"]);
        assert_eq!(model.states[0].transitions, vec![1]);
        assert_eq!(model.states[1].transitions, vec![2]);
        assert_eq!(model.states[2].transitions, vec![2]);
        assert_eq!(model.initial, 0);
        assert_eq!(
            model.spec,
            Spec::Until {
                quant: PathQuant::Exists,
                p: "p0".to_string(),
                q: "q1".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_tolerates_indentation() {
        let source = "\
MODULE main
  VAR
  state : { ab , cd };
  ASSIGN
  init(state) := ab;
  next(state) := case
    state = ab : { cd };
    state = cd : cd;
  esac;
  CTLSPEC E [ ab U cd ]";
        let model = parse(source).unwrap();
        assert_eq!(model.states.len(), 2);
        assert_eq!(model.states[0].transitions, vec![1]);
    }

    #[test]
    fn test_parse_multiple_targets_and_repeats() {
        let source = "\
MODULE main
VAR
state : {ab, cd, ef};
ASSIGN
init(state) := ab;
next(state) := case
state = ab : {cd, ef, ab};
state = ab : {cd};
esac;
CTLSPEC E [ ab U cd ]";
        let model = parse(source).unwrap();
        // No deduplication: repeated rules append repeated edges.
        assert_eq!(model.states[0].transitions, vec![1, 2, 0, 1]);
    }

    #[test]
    fn test_parse_second_case_block() {
        let source = "\
MODULE main
VAR
state : {ab, cd};
ASSIGN
init(state) := ab;
next(state) := case
state = ab : cd;
esac;
next(state) := case
state = cd : cd;
esac;
CTLSPEC E [ ab U cd ]";
        let model = parse(source).unwrap();
        assert_eq!(model.states[0].transitions, vec![1]);
        assert_eq!(model.states[1].transitions, vec![1]);
    }

    #[test]
    fn test_transition_syntax_lines_are_ignored() {
        let source = "\
MODULE main
VAR
state : {ab, cd};
ASSIGN
init(state) := ab;
next(state) := case
case
1 : {ab};
next(state) := case
(state = ab) : {cd};
esac;
CTLSPEC E [ ab U cd ]";
        let model = parse(source).unwrap();
        assert_eq!(model.states[0].transitions, vec![1]);
        assert!(model.states[1].transitions.is_empty());
    }

    #[test]
    fn test_unknown_assignment_lines_are_ignored() {
        let source = "\
MODULE main
VAR
state : {ab};
ASSIGN
-- a comment-ish line
init(state) := ab;
CTLSPEC EX ab";
        assert!(parse(source).is_ok());
    }

    #[test]
    fn test_parse_unary_spec() {
        let source = "\
MODULE main
VAR
state : {ab};
ASSIGN
init(state) := ab;
CTLSPEC AG !ab";
        let model = parse(source).unwrap();
        assert_eq!(
            model.spec,
            Spec::Unary {
                op: UnaryOp::Ag,
                p: "!ab".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_forall_until_spec() {
        let source = "\
MODULE main
VAR
state : {ab};
ASSIGN
init(state) := ab;
CTLSPEC A [ !ab U ab ]";
        let model = parse(source).unwrap();
        assert_eq!(
            model.spec,
            Spec::Until {
                quant: PathQuant::Forall,
                p: "!ab".to_string(),
                q: "ab".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_module_header() {
        let err = parse("VAR\nstate : {ab};").unwrap_err();
        assert_eq!(err, ParseError::MissingModuleHeader { line: 1 });
    }

    #[test]
    fn test_assign_before_declaration() {
        let err = parse("MODULE main\nVAR\nASSIGN").unwrap_err();
        assert_eq!(err, ParseError::NoStatesDeclared { line: 3 });
        assert_eq!(err.line(), 3);
    }

    #[test]
    fn test_malformed_variable_line() {
        let err = parse("MODULE main\nVAR\nstate : ab, cd;").unwrap_err();
        assert_eq!(err, ParseError::MalformedVariable { line: 3 });
    }

    #[test]
    fn test_state_set_redeclared() {
        let err = parse("MODULE main\nstate : {ab};\nstate : {cd};").unwrap_err();
        assert_eq!(err, ParseError::StateSetRedeclared { line: 3 });
    }

    #[test]
    fn test_duplicate_state_name() {
        let err = parse("MODULE main\nstate : {ab, ab};").unwrap_err();
        assert_eq!(
            err,
            ParseError::DuplicateState {
                name: "ab".to_string(),
                line: 2
            }
        );
    }

    #[test]
    fn test_malformed_init() {
        let source = "MODULE main\nstate : {ab};\nASSIGN\ninit(state) = ab;";
        let err = parse(source).unwrap_err();
        assert_eq!(err, ParseError::MalformedInit { line: 4 });
    }

    #[test]
    fn test_unknown_initial_state() {
        let source = "MODULE main\nstate : {ab};\nASSIGN\ninit(state) := zz;";
        let err = parse(source).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownState {
                name: "zz".to_string(),
                line: 4
            }
        );
    }

    #[test]
    fn test_unknown_transition_target() {
        let source = "\
MODULE main
VAR
state : {ab};
ASSIGN
init(state) := ab;
next(state) := case
state = ab : {zz};
esac;";
        let err = parse(source).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownState {
                name: "zz".to_string(),
                line: 7
            }
        );
    }

    #[test]
    fn test_malformed_transition_rule() {
        let source = "\
MODULE main
VAR
state : {ab};
ASSIGN
init(state) := ab;
next(state) := case
state ab : {ab};
esac;";
        let err = parse(source).unwrap_err();
        assert_eq!(err, ParseError::MalformedTransition { line: 7 });
    }

    #[test]
    fn test_malformed_spec() {
        let source = "MODULE main\nstate : {ab};\nASSIGN\nCTLSPEC E [ ab U ab";
        let err = parse(source).unwrap_err();
        assert_eq!(err, ParseError::MalformedSpec { line: 4 });
    }

    #[test]
    fn test_unknown_spec_operator() {
        let source = "MODULE main\nstate : {ab};\nASSIGN\nCTLSPEC EU ab ab";
        let err = parse(source).unwrap_err();
        assert_eq!(err, ParseError::MalformedSpec { line: 4 });
    }

    #[test]
    fn test_incomplete_models() {
        let err = parse("MODULE main").unwrap_err();
        assert_eq!(
            err,
            ParseError::Incomplete {
                missing: "the state set",
                line: 1
            }
        );

        let err = parse("MODULE main\nstate : {ab};\nASSIGN\nCTLSPEC EX ab").unwrap_err();
        assert_eq!(
            err,
            ParseError::Incomplete {
                missing: "the initial state",
                line: 4
            }
        );

        let err = parse("MODULE main\nstate : {ab};\nASSIGN\ninit(state) := ab;").unwrap_err();
        assert_eq!(
            err,
            ParseError::Incomplete {
                missing: "a CTLSPEC property",
                line: 4
            }
        );
    }

    #[test]
    fn test_phase_transitions() {
        let mut parser = Parser::new();
        assert_eq!(parser.phase(), Phase::NotStarted);
        parser.feed("MODULE main").unwrap();
        assert_eq!(parser.phase(), Phase::Variables);
        parser.feed("VAR").unwrap();
        parser.feed("state : {ab};").unwrap();
        assert_eq!(parser.phase(), Phase::Variables);
        parser.feed("ASSIGN").unwrap();
        assert_eq!(parser.phase(), Phase::Assignments);
        parser.feed("next(state) := case").unwrap();
        assert_eq!(parser.phase(), Phase::Transition);
        parser.feed("esac;").unwrap();
        assert_eq!(parser.phase(), Phase::Assignments);
    }
}
