//! Circular doubly-linked sibling lists.
//!
//! A composite only stores its first child; `first.previous` is the last
//! child and a sole child links to itself. Every insertion updates both
//! neighbours, so lists of one, two or more nodes are handled alike.

use crate::NodeModel;
use crate::nodes::{NodeId, NodeKind};

impl<G, E> NodeModel<G, E> {
    /// Appends `child` as the last child of `parent`.
    #[track_caller]
    pub(crate) fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.check_valid_new_child(child);
        assert!(self.data(child).variant.kind() != NodeKind::Root, "the root cannot be a child");
        let first_child = self
            .data(parent)
            .variant
            .composite()
            .unwrap_or_else(|| panic!("{parent:?} is a leaf and cannot have children"))
            .first_child;
        match first_child {
            None => {
                let data = self.data_mut(child);
                data.parent = Some(parent);
                data.next = Some(child);
                data.previous = Some(child);
                self.set_first_child(parent, Some(child));
            }
            // Before the first child is after the last one.
            Some(first) => self.insert_before(first, child),
        }
    }

    /// Links `new_node` right before `node` in `node`'s sibling list.
    ///
    /// Inserting before the first child appends at the end of the list; the
    /// first-child slot of the parent is left alone.
    #[track_caller]
    pub(crate) fn insert_before(&mut self, node: NodeId, new_node: NodeId) {
        self.check_valid_new_child(new_node);
        let (parent, previous) = self.linked_position(node);
        let data = self.data_mut(new_node);
        data.parent = Some(parent);
        data.previous = Some(previous);
        data.next = Some(node);
        self.data_mut(previous).next = Some(new_node);
        self.data_mut(node).previous = Some(new_node);
    }

    /// Links `new_node` right after `node` in `node`'s sibling list.
    #[track_caller]
    pub(crate) fn insert_after(&mut self, node: NodeId, new_node: NodeId) {
        self.check_valid_new_child(new_node);
        let (parent, _) = self.linked_position(node);
        let next = self.data(node).next.expect("linked node has a next sibling");
        let data = self.data_mut(new_node);
        data.parent = Some(parent);
        data.previous = Some(node);
        data.next = Some(next);
        self.data_mut(next).previous = Some(new_node);
        self.data_mut(node).next = Some(new_node);
    }

    pub(crate) fn set_first_child(&mut self, parent: NodeId, child: Option<NodeId>) {
        let composite =
            self.data_mut(parent).variant.composite_mut().expect("parent must be a composite");
        composite.first_child = child;
    }

    /// Returns the parent and previous sibling of a linked node.
    #[track_caller]
    fn linked_position(&self, node: NodeId) -> (NodeId, NodeId) {
        let data = self.data(node);
        match (data.parent, data.previous) {
            (Some(parent), Some(previous)) => (parent, previous),
            _ => panic!("{node:?} is not linked into a sibling list"),
        }
    }

    #[track_caller]
    pub(crate) fn check_valid_new_child(&self, child: NodeId) {
        self.expect_live(child);
        let data = self.data(child);
        assert!(
            data.is_unlinked() && data.parent.is_none(),
            "{child:?} is already linked: next = {:?}, previous = {:?}",
            data.next,
            data.previous,
        );
    }
}
