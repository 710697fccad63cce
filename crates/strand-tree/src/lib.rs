//! Lossless node model for grammar-driven parsers.
//!
//! The tree records every character of the source text, hidden tokens and
//! syntax errors included. It is built append-only by a parser driver through
//! `Builder`, and nodes change their variant by replacement: a new node takes
//! over the old node's slot in a circular sibling list.

mod builder;
mod dump;
mod linkage;
mod model;
mod mutation;
mod nodes;
mod syntax;
mod validate;

/// Incremental builder and mutation API used by parser drivers.
pub use builder::Builder;
/// The finished, read-only tree.
pub use model::NodeModel;
/// Node identity and variants.
pub use nodes::{NodeId, NodeKind};
pub use strand_errors::{Diagnostic, SyntaxErrorMessage};
/// Read-only node handles and traversal.
pub use syntax::{Children, Node, Preorder, WalkEvent};
pub use text_size::{TextRange, TextSize};
pub use validate::InvariantViolation;
