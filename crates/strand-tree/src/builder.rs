//! Append-only construction of the node model.

use std::hash::Hash;

use strand_errors::SyntaxErrorMessage;
use text_size::{TextRange, TextSize};
use tracing::{debug, trace};

use crate::NodeModel;
use crate::nodes::{Composite, NodeData, NodeId, Variant};

/// Builds a `NodeModel` from driver calls made while walking the grammar
/// depth-first.
///
/// Every precondition is a contract on the driver: violating one panics and
/// leaves the model unusable.
pub struct Builder<G, E> {
    pub(crate) model: NodeModel<G, E>,
}

impl<G, E> Builder<G, E> {
    /// Creates the root node over the complete source text.
    pub fn new(text: &str) -> Self {
        Self { model: NodeModel::new(text) }
    }

    pub(crate) fn from_model(model: NodeModel<G, E>) -> Self {
        Self { model }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.model.root
    }

    /// Read access to the model under construction.
    #[inline]
    pub fn model(&self) -> &NodeModel<G, E> {
        &self.model
    }

    /// Creates an empty composite, linked as the last child of `parent` if
    /// one is given.
    ///
    /// The composite can carry a semantic element until it is compressed.
    #[track_caller]
    pub fn new_composite(
        &mut self,
        grammar_element: Option<G>,
        lookahead: u32,
        parent: Option<NodeId>,
    ) -> NodeId {
        let variant = Variant::CompositeWithSemanticElement(Composite::new(lookahead), None);
        let node = self.model.alloc(NodeData::new(variant, grammar_element));
        if let Some(parent) = parent {
            self.link(parent, node);
        }
        node
    }

    /// Creates a leaf for the token at `offset..offset + length` and links it
    /// as the last child of `parent`.
    #[track_caller]
    pub fn new_leaf(
        &mut self,
        offset: TextSize,
        length: TextSize,
        grammar_element: Option<G>,
        is_hidden: bool,
        error: Option<SyntaxErrorMessage>,
        parent: NodeId,
    ) -> NodeId {
        let text_len = self.model.text_len();
        let end = offset.checked_add(length).expect("leaf end overflows `TextSize`");
        assert!(
            end <= text_len,
            "leaf {offset:?}..{end:?} lies outside the source text of length {text_len:?}"
        );
        assert!(
            self.model.text.is_char_boundary(offset.into())
                && self.model.text.is_char_boundary(end.into()),
            "leaf {offset:?}..{end:?} splits a character"
        );
        let variant = Variant::new_leaf(TextRange::new(offset, end), is_hidden, error);
        let node = self.model.alloc(NodeData::new(variant, grammar_element));
        self.link(parent, node);
        node
    }

    /// Links an unparented composite as the last child of `parent`.
    ///
    /// `child` must not be `parent` or one of its ancestors.
    #[track_caller]
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        let parent_node = self.model.node(parent);
        assert!(
            parent != child && parent_node.ancestors().all(|ancestor| ancestor.id() != child),
            "linking {child:?} under {parent:?} would create a cycle"
        );
        self.link(parent, child);
    }

    #[track_caller]
    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.model.expect_live(parent);
        self.model.add_child(parent, child);
    }

    /// Ends construction.
    pub fn finish(self) -> NodeModel<G, E> {
        debug!(nodes = self.model.len(), text_len = self.model.text.len(), "node model finished");
        self.model
    }
}

impl<G, E: Clone + Eq + Hash> Builder<G, E> {
    /// Binds `element` to the composite `node`.
    ///
    /// A previous element of `node` is dropped from the index, and if
    /// `element` was bound elsewhere that node loses it: one element, one node.
    #[track_caller]
    pub fn associate_with_semantic_element(&mut self, node: NodeId, element: E) {
        self.model.expect_live(node);
        let kind = self.model.data(node).variant.kind();
        assert!(kind.can_bind_semantic_element(), "{node:?} is a {kind:?} and cannot be bound");

        if let Some(&holder) = self.model.semantic_index.get(&element)
            && holder != node
            && let Some(slot) = self.model.data_mut(holder).variant.semantic_slot_mut()
        {
            trace!(?holder, ?node, "semantic element moved");
            *slot = None;
        }

        let slot = self.model.data_mut(node).variant.semantic_slot_mut().expect("checked above");
        if let Some(previous) = slot.replace(element.clone())
            && previous != element
        {
            self.model.semantic_index.remove(&previous);
        }
        self.model.semantic_index.insert(element, node);
    }
}
