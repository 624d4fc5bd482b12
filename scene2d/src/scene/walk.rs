//! Tree traversal helpers.


use crate::scene::{
    NodeId,
    Scene,
};


/// Iterator over a subtree in depth-first pre-order, starting at the
/// subtree root itself.
pub struct Descendants<'a> {
    scene: &'a Scene,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        for &child in self.scene.children(node).iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}


/// Iterator over a node's ancestor chain, starting at the node itself and
/// ending at its peak.
pub struct Ancestors<'a> {
    scene: &'a Scene,
    current: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.current?;
        self.current = self.scene.parent(node);
        Some(node)
    }
}


impl Scene {
    /// Walk `node` and every descendant, parents before children,
    /// siblings in adoption order.
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        Descendants {
            scene: self,
            stack: vec![node],
        }
    }

    /// Walk from `node` up to its peak.
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            scene: self,
            current: Some(node),
        }
    }

    /// Fold over `node` and every descendant, in `descendants` order.
    pub fn fold_descendants<T, F>(&self, node: NodeId, initial: T, mut action: F) -> T
    where
        F: FnMut(T, NodeId) -> T,
    {
        let mut result = initial;
        for current in self.descendants(node) {
            result = action(result, current);
        }
        result
    }

    /// Fold over `node` and every ancestor, in `ancestors` order.
    pub fn fold_ancestors<T, F>(&self, node: NodeId, initial: T, mut action: F) -> T
    where
        F: FnMut(T, NodeId) -> T,
    {
        let mut result = initial;
        for current in self.ancestors(node) {
            result = action(result, current);
        }
        result
    }
}
