//! Variant changes after creation.
//!
//! A node never changes its variant in place. The new variant is allocated
//! as a fresh node that takes over the old node's slot and children; the old
//! node is left detached and remembers its successor.

use std::hash::Hash;

use strand_errors::SyntaxErrorMessage;
use tracing::trace;

use crate::Builder;
use crate::nodes::{Composite, NodeData, NodeId, Variant};

impl<G, E> Builder<G, E> {
    /// Inserts a new composite between `existing` and its parent.
    ///
    /// The new composite takes `existing`'s exact place among its siblings and
    /// `existing` becomes its only child. `existing` is then compressed; the
    /// returned id is its parent, i.e. the new composite.
    #[track_caller]
    pub fn new_composite_as_parent_of(
        &mut self,
        grammar_element: Option<G>,
        lookahead: u32,
        existing: NodeId,
    ) -> NodeId {
        self.model.expect_live(existing);
        let variant = Variant::CompositeWithSemanticElement(Composite::new(lookahead), None);
        let wrapper = self.model.alloc(NodeData::new(variant, grammar_element));
        self.take_slot(existing, wrapper);
        self.model.add_child(wrapper, existing);
        trace!(?existing, ?wrapper, "inserted parent");
        self.compress_and_return_parent(existing).expect("wrapped node has a parent")
    }

    /// Replaces a composite that turned out to be pure bookkeeping (no
    /// semantic element) with a lighter variant, keeping its syntax error.
    ///
    /// Bound composites, plain composites, leaves and the root are left as
    /// they are. Returns the parent of the (possibly new) node, `None` for the
    /// root.
    #[track_caller]
    pub fn compress_and_return_parent(&mut self, node: NodeId) -> Option<NodeId> {
        self.model.expect_live(node);
        let compressed = match &self.model.data(node).variant {
            Variant::CompositeWithSemanticElement(composite, None) => {
                Variant::Composite(Composite::new(composite.lookahead))
            }
            Variant::CompositeWithSemanticElementAndSyntaxError(composite, None, error) => {
                Variant::CompositeWithSyntaxError(Composite::new(composite.lookahead), error.clone())
            }
            _ => return self.model.data(node).parent,
        };
        let new = self.replace(node, compressed);
        self.model.data(new).parent
    }

    /// Relinks a freshly allocated node into `old`'s slot and hands it
    /// `old`'s children.
    ///
    /// The single place where a swap re-establishes the sibling and parent
    /// invariants.
    #[track_caller]
    fn replace(&mut self, old: NodeId, variant: Variant<E>) -> NodeId {
        let grammar_element = self.model.data_mut(old).grammar_element.take();
        let new = self.model.alloc(NodeData::new(variant, grammar_element));
        self.take_slot(old, new);

        if let Some(first) = self.model.data(old).first_child() {
            self.model.set_first_child(old, None);
            self.model.set_first_child(new, Some(first));
            let mut child = first;
            loop {
                let data = self.model.data_mut(child);
                data.parent = Some(new);
                child = data.next.expect("linked child has a next sibling");
                if child == first {
                    break;
                }
            }
        }

        self.model.data_mut(old).replaced_by = Some(new);
        trace!(?old, ?new, kind = ?self.model.data(new).variant.kind(), "replaced node");
        new
    }

    /// Moves `new` into the parent and sibling position of `old`, leaving
    /// `old` unlinked.
    #[track_caller]
    fn take_slot(&mut self, old: NodeId, new: NodeId) {
        let data = self.model.data(old);
        let Some(parent) = data.parent else {
            panic!("{old:?} has no parent and cannot be replaced");
        };
        let (Some(next), Some(previous)) = (data.next, data.previous) else {
            panic!("{old:?} is not linked into a sibling list");
        };

        if self.model.data(parent).first_child() == Some(old) {
            self.model.set_first_child(parent, Some(new));
        }
        if next == old {
            let data = self.model.data_mut(new);
            data.next = Some(new);
            data.previous = Some(new);
        } else {
            let data = self.model.data_mut(new);
            data.next = Some(next);
            data.previous = Some(previous);
            self.model.data_mut(next).previous = Some(new);
            self.model.data_mut(previous).next = Some(new);
        }
        self.model.data_mut(new).parent = Some(parent);

        let data = self.model.data_mut(old);
        data.parent = None;
        data.next = None;
        data.previous = None;
    }
}

impl<G, E: Clone + Eq + Hash> Builder<G, E> {
    /// Replaces `node` with an equivalent node carrying `error`.
    ///
    /// Leaves keep their range and visibility; composites keep their look-ahead
    /// and semantic binding, whose index entry moves to the new node. An
    /// existing error is overwritten. Returns the new node.
    #[track_caller]
    pub fn set_syntax_error(
        &mut self,
        node: NodeId,
        error: impl Into<SyntaxErrorMessage>,
    ) -> NodeId {
        self.model.expect_live(node);
        let error = Box::new(error.into());
        let variant = match &mut self.model.data_mut(node).variant {
            Variant::Leaf(leaf) | Variant::LeafWithSyntaxError(leaf, _) => {
                Variant::LeafWithSyntaxError(*leaf, error)
            }
            Variant::HiddenLeaf(leaf) | Variant::HiddenLeafWithSyntaxError(leaf, _) => {
                Variant::HiddenLeafWithSyntaxError(*leaf, error)
            }
            Variant::Composite(composite) | Variant::CompositeWithSyntaxError(composite, _) => {
                Variant::CompositeWithSyntaxError(Composite::new(composite.lookahead), error)
            }
            Variant::CompositeWithSemanticElement(composite, slot)
            | Variant::CompositeWithSemanticElementAndSyntaxError(composite, slot, _) => {
                Variant::CompositeWithSemanticElementAndSyntaxError(
                    Composite::new(composite.lookahead),
                    slot.take(),
                    error,
                )
            }
            Variant::Root(..) => panic!("the root node cannot carry a syntax error"),
        };
        let new = self.replace(node, variant);
        if let Some(element) = self.model.data(new).variant.semantic_element().cloned() {
            self.model.semantic_index.insert(element, new);
        }
        new
    }
}
