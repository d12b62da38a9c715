//! Parsed CTLSPEC property values.

use std::fmt;

/// Operators taking a single proposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `EX`: some successor.
    Ex,
    /// `AX`: all successors.
    Ax,
    /// `EF`: some path, eventually.
    Ef,
    /// `AF`: all paths, eventually.
    Af,
    /// `EG`: some path, globally.
    Eg,
    /// `AG`: all paths, globally.
    Ag,
}

impl UnaryOp {
    /// Operator tag as written in the input.
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Ex => "EX",
            UnaryOp::Ax => "AX",
            UnaryOp::Ef => "EF",
            UnaryOp::Af => "AF",
            UnaryOp::Eg => "EG",
            UnaryOp::Ag => "AG",
        }
    }

    /// Look up the operator for a spec keyword, if any.
    pub fn from_keyword(word: &str) -> Option<UnaryOp> {
        Some(match word {
            "EX" => UnaryOp::Ex,
            "AX" => UnaryOp::Ax,
            "EF" => UnaryOp::Ef,
            "AF" => UnaryOp::Af,
            "EG" => UnaryOp::Eg,
            "AG" => UnaryOp::Ag,
            _ => return None,
        })
    }
}

/// Path quantifier of an until-formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathQuant {
    /// `E`: there exists a path.
    Exists,
    /// `A`: along all paths.
    Forall,
}

/// A parsed `CTLSPEC` property.
///
/// All eight operator forms are recognized by the parser; only the
/// existential until-form can be checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Spec {
    /// `EX p`, `AX p`, `EF p`, `AF p`, `EG p`, `AG p`.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The proposition token, possibly `!`-prefixed.
        p: String,
    },
    /// `E [ p U q ]` or `A [ p U q ]`.
    Until {
        /// The path quantifier.
        quant: PathQuant,
        /// The proposition that must hold before `q` does.
        p: String,
        /// The proposition that must eventually hold.
        q: String,
    },
}

impl Spec {
    /// Operator tag: `EX` .. `AG` for unary forms, `EU` or `AU` for the
    /// until-forms.
    pub fn operator(&self) -> &'static str {
        match self {
            Spec::Unary { op, .. } => op.name(),
            Spec::Until {
                quant: PathQuant::Exists,
                ..
            } => "EU",
            Spec::Until {
                quant: PathQuant::Forall,
                ..
            } => "AU",
        }
    }
}

impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spec::Unary { op, p } => write!(f, "{} {}", op.name(), p),
            Spec::Until { p, q, .. } => write!(f, "{} {} {}", self.operator(), p, q),
        }
    }
}
