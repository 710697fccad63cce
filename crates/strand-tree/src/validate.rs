//! Structural invariant checks.
//!
//! Used by tests and by drivers that want to verify a model in debug builds.

use std::hash::Hash;

use text_size::TextSize;

use crate::NodeModel;
use crate::nodes::NodeId;

/// A broken node model invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("{node:?} has exactly one of its sibling pointers set")]
    HalfLinked { node: NodeId },
    #[error("the children of {parent:?} do not form a closed circular list")]
    BrokenCycle { parent: NodeId },
    #[error("{child:?} is listed under {parent:?} but its parent is {actual:?}")]
    ForeignChild { parent: NodeId, child: NodeId, actual: Option<NodeId> },
    #[error("{node:?} is reachable more than once")]
    SharedNode { node: NodeId },
    #[error("{node:?} is stale but still linked into the tree")]
    StaleNodeLinked { node: NodeId },
    #[error("{node:?} starts at {start:?}, before its previous sibling ends at {previous_end:?}")]
    UnorderedSiblings { node: NodeId, start: TextSize, previous_end: TextSize },
    #[error("{node:?} ends at {end:?}, past the end of the text at {text_len:?}")]
    OutOfBounds { node: NodeId, end: TextSize, text_len: TextSize },
    #[error("the semantic index points at {node:?}, which is not bound to that element")]
    StaleSemanticIndex { node: NodeId },
    #[error("{node:?} is bound to a semantic element missing from the index")]
    UnindexedSemanticElement { node: NodeId },
}

impl<G, E: Eq + Hash> NodeModel<G, E> {
    /// Verifies circularity, single ownership, ordering, bounds and the
    /// semantic index, reporting the first violation found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut seen = vec![false; self.len()];
        let mut stack = vec![self.root];
        while let Some(parent) = stack.pop() {
            self.check_node(parent)?;
            let Some(first) = self.data(parent).first_child() else { continue };

            let mut child = first;
            let mut previous_end = None::<TextSize>;
            for _ in 0..=self.len() {
                let index = child.index() as usize;
                if seen[index] {
                    return Err(InvariantViolation::SharedNode { node: child });
                }
                seen[index] = true;
                let data = self.data(child);
                if data.parent != Some(parent) {
                    return Err(InvariantViolation::ForeignChild {
                        parent,
                        child,
                        actual: data.parent,
                    });
                }
                let (Some(next), Some(_)) = (data.next, data.previous) else {
                    return Err(InvariantViolation::BrokenCycle { parent });
                };
                if self.data(next).previous != Some(child) {
                    return Err(InvariantViolation::BrokenCycle { parent });
                }

                let node = self.node(child);
                let range = node.total_range();
                if let Some(previous_end) = previous_end
                    && range.start() < previous_end
                {
                    return Err(InvariantViolation::UnorderedSiblings {
                        node: child,
                        start: range.start(),
                        previous_end,
                    });
                }
                previous_end = Some(range.end());
                stack.push(child);

                child = next;
                if child == first {
                    break;
                }
            }
            if child != first {
                return Err(InvariantViolation::BrokenCycle { parent });
            }
        }

        for (element, &node) in &self.semantic_index {
            if self.data(node).variant.semantic_element() != Some(element) {
                return Err(InvariantViolation::StaleSemanticIndex { node });
            }
        }
        Ok(())
    }

    fn check_node(&self, id: NodeId) -> Result<(), InvariantViolation> {
        let data = self.data(id);
        if data.next.is_some() != data.previous.is_some() {
            return Err(InvariantViolation::HalfLinked { node: id });
        }
        if data.replaced_by.is_some() {
            return Err(InvariantViolation::StaleNodeLinked { node: id });
        }
        if let Some(leaf) = data.variant.leaf()
            && leaf.range.end() > self.text_len()
        {
            return Err(InvariantViolation::OutOfBounds {
                node: id,
                end: leaf.range.end(),
                text_len: self.text_len(),
            });
        }
        if let Some(element) = data.variant.semantic_element()
            && self.semantic_index.get(element) != Some(&id)
        {
            return Err(InvariantViolation::UnindexedSemanticElement { node: id });
        }
        Ok(())
    }
}
