//! Data model, parser, and diagnostics for the smvu model description
//! language: a line-oriented SMV subset with a single CTLSPEC property.

pub mod model;
pub mod parser;
pub mod pretty;
pub mod spec;

pub use model::{derive_labels, Model, State, StateId};
pub use parser::{parse, ParseError, ParseResult, Parser, Phase};
pub use pretty::dump;
pub use spec::{PathQuant, Spec, UnaryOp};
