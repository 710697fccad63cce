//! Recorded builder calls.
//!
//! A `Script` is the sequence of calls a parser driver made on a
//! `strand_tree::Builder`, stored as JSON. Replaying it checks every call
//! before it reaches the builder, so a bad script is an error rather than a
//! panic.

mod replay;
#[cfg(test)]
mod tests;

use serde::Deserialize;
use strand_tree::NodeKind;

pub use replay::ReplayedModel;

/// Index into the handle table of a replay. Handle 0 is the root; every
/// call that creates a node appends one.
pub type Handle = u32;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Script {
    /// The text the calls were recorded against, if the script carries it.
    #[serde(default)]
    pub text: Option<String>,
    pub calls: Vec<Call>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One builder call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    Composite {
        grammar: Option<String>,
        #[serde(default)]
        lookahead: u32,
        parent: Option<Handle>,
    },
    Leaf {
        offset: u32,
        length: u32,
        grammar: Option<String>,
        #[serde(default)]
        hidden: bool,
        error: Option<String>,
        parent: Handle,
    },
    AddChild {
        parent: Handle,
        child: Handle,
    },
    Associate {
        node: Handle,
        element: u32,
    },
    Wrap {
        grammar: Option<String>,
        #[serde(default)]
        lookahead: u32,
        node: Handle,
    },
    Error {
        node: Handle,
        message: String,
        issue_code: Option<String>,
        #[serde(default)]
        issue_data: Vec<String>,
    },
    Compress {
        node: Handle,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("malformed script: {0}")]
    Json(#[from] serde_json::Error),

    #[error("the script was recorded against a different text")]
    TextMismatch,

    #[error("call {call}: unknown handle {handle}")]
    UnknownHandle { call: usize, handle: Handle },

    #[error("call {call}: handle {handle} is a leaf and cannot have children")]
    NotAComposite { call: usize, handle: Handle },

    #[error("call {call}: leaf at {offset} of length {length} exceeds the text length {text_len}")]
    OutOfBounds { call: usize, offset: u32, length: u32, text_len: usize },

    #[error("call {call}: leaf at {offset} of length {length} splits a character")]
    SplitsCharacter { call: usize, offset: u32, length: u32 },

    #[error("call {call}: the root cannot be {action}")]
    RootNotAllowed { call: usize, action: &'static str },

    #[error("call {call}: handle {handle} has no parent")]
    Detached { call: usize, handle: Handle },

    #[error("call {call}: handle {handle} is already linked")]
    AlreadyLinked { call: usize, handle: Handle },

    #[error("call {call}: linking {child} under {parent} would create a cycle")]
    Cycle { call: usize, parent: Handle, child: Handle },

    #[error("call {call}: handle {handle} is a {kind:?} and cannot carry a semantic element")]
    NotBindable { call: usize, handle: Handle, kind: NodeKind },
}
