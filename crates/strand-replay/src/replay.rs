use strand_tree::{Builder, NodeId, NodeKind, NodeModel, SyntaxErrorMessage, TextSize};
use tracing::debug;

use crate::{Call, Handle, ReplayError, Script};

/// Models built by replay use grammar rule names and numeric element ids.
pub type ReplayedModel = NodeModel<String, u32>;

impl Script {
    /// Builds the model the script describes over `text`.
    pub fn replay(&self, text: &str) -> Result<ReplayedModel, ReplayError> {
        if let Some(recorded) = &self.text
            && recorded != text
        {
            return Err(ReplayError::TextMismatch);
        }
        let mut replayer = Replayer::new(text);
        for (index, call) in self.calls.iter().enumerate() {
            replayer.call(index, call)?;
        }
        debug!(calls = self.calls.len(), handles = replayer.handles.len(), "script replayed");
        Ok(replayer.builder.finish())
    }
}

struct Replayer<'t> {
    text: &'t str,
    builder: Builder<String, u32>,
    /// Handles keep the id they were created with; lookups follow
    /// replacements, so a handle always names the node in its slot.
    handles: Vec<NodeId>,
}

impl<'t> Replayer<'t> {
    fn new(text: &'t str) -> Self {
        let builder = Builder::new(text);
        let handles = vec![builder.root()];
        Self { text, builder, handles }
    }

    fn node(&self, call: usize, handle: Handle) -> Result<NodeId, ReplayError> {
        let id = self
            .handles
            .get(handle as usize)
            .copied()
            .ok_or(ReplayError::UnknownHandle { call, handle })?;
        Ok(self.builder.model().resolve(id))
    }

    fn kind(&self, id: NodeId) -> NodeKind {
        self.builder.model().node(id).kind()
    }

    fn composite(&self, call: usize, handle: Handle) -> Result<NodeId, ReplayError> {
        let id = self.node(call, handle)?;
        if self.kind(id).is_leaf() {
            return Err(ReplayError::NotAComposite { call, handle });
        }
        Ok(id)
    }

    /// A node that can take part in a replacement: linked, and not the root.
    fn replaceable(
        &self,
        call: usize,
        handle: Handle,
        action: &'static str,
    ) -> Result<NodeId, ReplayError> {
        let id = self.node(call, handle)?;
        let node = self.builder.model().node(id);
        if node.is_root() {
            return Err(ReplayError::RootNotAllowed { call, action });
        }
        if node.parent().is_none() {
            return Err(ReplayError::Detached { call, handle });
        }
        Ok(id)
    }

    fn call(&mut self, index: usize, call: &Call) -> Result<(), ReplayError> {
        match call {
            Call::Composite { grammar, lookahead, parent } => {
                let parent = parent.map(|parent| self.composite(index, parent)).transpose()?;
                let id = self.builder.new_composite(grammar.clone(), *lookahead, parent);
                self.handles.push(id);
            }
            &Call::Leaf { offset, length, ref grammar, hidden, ref error, parent } => {
                let parent = self.composite(index, parent)?;
                let start = offset as usize;
                let end = start + length as usize;
                if end > self.text.len() {
                    return Err(ReplayError::OutOfBounds {
                        call: index,
                        offset,
                        length,
                        text_len: self.text.len(),
                    });
                }
                if !self.text.is_char_boundary(start) || !self.text.is_char_boundary(end) {
                    return Err(ReplayError::SplitsCharacter { call: index, offset, length });
                }
                let error = error.as_deref().map(SyntaxErrorMessage::new);
                let id = self.builder.new_leaf(
                    TextSize::new(offset),
                    TextSize::new(length),
                    grammar.clone(),
                    hidden,
                    error,
                    parent,
                );
                self.handles.push(id);
            }
            &Call::AddChild { parent, child } => {
                let parent_id = self.composite(index, parent)?;
                let child_id = self.node(index, child)?;
                let model = self.builder.model();
                let child_node = model.node(child_id);
                if child_node.is_root() {
                    return Err(ReplayError::RootNotAllowed { call: index, action: "a child" });
                }
                if child_node.parent().is_some() {
                    return Err(ReplayError::AlreadyLinked { call: index, handle: child });
                }
                let parent_node = model.node(parent_id);
                if parent_id == child_id || parent_node.ancestors().any(|it| it.id() == child_id) {
                    return Err(ReplayError::Cycle { call: index, parent, child });
                }
                self.builder.add_child(parent_id, child_id);
            }
            &Call::Associate { node, element } => {
                let id = self.node(index, node)?;
                let kind = self.kind(id);
                if !kind.can_bind_semantic_element() {
                    return Err(ReplayError::NotBindable { call: index, handle: node, kind });
                }
                self.builder.associate_with_semantic_element(id, element);
            }
            Call::Wrap { grammar, lookahead, node } => {
                let id = self.replaceable(index, *node, "wrapped")?;
                let wrapper =
                    self.builder.new_composite_as_parent_of(grammar.clone(), *lookahead, id);
                self.handles.push(wrapper);
            }
            Call::Error { node, message, issue_code, issue_data } => {
                let id = self.replaceable(index, *node, "marked as a syntax error")?;
                let mut error =
                    SyntaxErrorMessage::new(message.as_str()).with_issue_data(issue_data);
                if let Some(code) = issue_code {
                    error = error.with_issue_code(code.as_str());
                }
                self.builder.set_syntax_error(id, error);
            }
            &Call::Compress { node } => {
                let id = self.node(index, node)?;
                let node_ref = self.builder.model().node(id);
                if !node_ref.is_root() && node_ref.parent().is_none() {
                    return Err(ReplayError::Detached { call: index, handle: node });
                }
                self.builder.compress_and_return_parent(id);
            }
        }
        Ok(())
    }
}
