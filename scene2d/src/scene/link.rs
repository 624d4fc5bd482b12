//! The two-phase membership protocol and connectivity propagation.
//!
//! Every membership change runs the same transaction: the parent's guards
//! are consulted, then the child's, and only if neither side refuses does
//! the change commit and its notices fire. A refused change leaves no
//! trace.


use crate::{
    event::{
        GuardFn,
        GuardId,
        GuardKind,
        LinkAction,
        LinkChange,
        Notice,
        Veto,
    },
    scene::{
        GuardEntry,
        NodeId,
        Scene,
    },
};
use std::{
    cell::RefCell,
    rc::Rc,
};
use thiserror::Error;


/// Error returned by `Scene::adopt` and `Scene::abandon`. On error the
/// tree is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    /// A guard on either side refused the change.
    #[error("membership change vetoed: {0}")]
    Vetoed(Veto),
    /// The root cannot be adopted by any node.
    #[error("the root cannot be adopted")]
    RootChild,
    /// The child already has a parent; abandon it first.
    #[error("child already has a parent")]
    AlreadyAdopted,
    /// The node is not a child of the given parent.
    #[error("node is not a child of the given parent")]
    NotAChild,
    /// Spatial nodes can only hold spatial children.
    #[error("spatial nodes can only adopt spatial children")]
    NonSpatialChild,
}


impl Scene {
    /// Register a guard at `node` for one side of the membership
    /// protocol. Guards are consulted synchronously, in registration
    /// order, and any `Err` aborts the change before anything commits.
    pub fn guard<F>(&mut self, node: NodeId, kind: GuardKind, hook: F) -> GuardId
    where
        F: FnMut(&Scene, &LinkChange) -> Result<(), Veto> + 'static,
    {
        let seq = self.next_seq();
        let hook: Rc<RefCell<GuardFn>> = Rc::new(RefCell::new(hook));
        self.nodes[node.0].guards.push(GuardEntry { kind, seq, hook });
        GuardId { node, seq }
    }

    /// Remove a guard. Removing one whose node is gone is a no-op.
    pub fn unguard(&mut self, id: GuardId) {
        if let Some(data) = self.nodes.get_mut(id.node.0) {
            data.guards.retain(|entry| entry.seq != id.seq);
        }
    }

    fn consult(
        &self,
        target: NodeId,
        kind: GuardKind,
        change: &LinkChange,
    ) -> Result<(), LinkError> {
        let hooks = self.nodes[target.0]
            .guards
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| Rc::clone(&entry.hook))
            .collect::<Vec<_>>();
        for hook in hooks {
            (hook.borrow_mut())(self, change).map_err(LinkError::Vetoed)?;
        }
        Ok(())
    }

    /// Transfer `child` under `parent`.
    ///
    /// Structural rules are checked first (the root cannot be adopted, a
    /// parented child must be abandoned first, a spatial parent only holds
    /// spatial children), then the parent's `AdoptChild` guards, then the
    /// child's `Adopt` guards. On commit the child joins the parent's
    /// children, its parent pointer is set, `AdoptedChild` fires on the
    /// parent and `Adopted` on the child, and if the parent's peak is the
    /// root or is connected the child subtree connects, parent before
    /// children.
    pub fn adopt(&mut self, parent: NodeId, child: NodeId) -> Result<(), LinkError> {
        assert_ne!(parent, child, "a node cannot adopt itself");
        if child == self.root() {
            return Err(LinkError::RootChild);
        }
        if self.nodes[child.0].parent.is_some() {
            return Err(LinkError::AlreadyAdopted);
        }
        if self.nodes[parent.0].spatial.is_some() && self.nodes[child.0].spatial.is_none() {
            return Err(LinkError::NonSpatialChild);
        }

        let change = LinkChange { action: LinkAction::Adopt, parent, child };
        self.consult(parent, GuardKind::AdoptChild, &change)?;
        self.consult(child, GuardKind::Adopt, &change)?;

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        trace!(
            "'{}' adopted '{}'",
            self.nodes[parent.0].name,
            self.nodes[child.0].name,
        );
        self.emit(parent, &Notice::AdoptedChild { child });
        self.emit(child, &Notice::Adopted { parent });

        if !self.nodes.contains(parent.0) || !self.nodes.contains(child.0) {
            return Ok(());
        }
        let peak = self.peak(parent);
        if peak == self.root() || self.nodes[peak.0].connected {
            self.propagate_connect(child);
        }
        Ok(())
    }

    /// Release `child` from `parent`.
    ///
    /// Mirror of `adopt`: the parent's `AbandonChild` guards are
    /// consulted, then the child's `Abandon` guards. On commit the child
    /// leaves the parent's children, its parent pointer clears,
    /// `AbandonedChild` fires on the parent and `Abandoned` on the child,
    /// and the child subtree disconnects unconditionally, children before
    /// their removed ancestor.
    pub fn abandon(&mut self, parent: NodeId, child: NodeId) -> Result<(), LinkError> {
        if self.nodes[child.0].parent != Some(parent) {
            return Err(LinkError::NotAChild);
        }

        let change = LinkChange { action: LinkAction::Abandon, parent, child };
        self.consult(parent, GuardKind::AbandonChild, &change)?;
        self.consult(child, GuardKind::Abandon, &change)?;

        self.nodes[parent.0].children.retain(|&c| c != child);
        self.nodes[child.0].parent = None;
        trace!(
            "'{}' abandoned '{}'",
            self.nodes[parent.0].name,
            self.nodes[child.0].name,
        );
        self.emit(parent, &Notice::AbandonedChild { child });
        self.emit(child, &Notice::Abandoned { parent });

        if self.nodes.contains(child.0) {
            self.propagate_disconnect(child);
        }
        Ok(())
    }

    /// Whether `child` is currently a child of `parent`.
    pub fn has_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.nodes[parent.0].children.contains(&child)
    }

    /// Abandon every child of `parent`. Children whose abandonment is
    /// vetoed stay in place.
    pub fn clear_children(&mut self, parent: NodeId) {
        let children = self.nodes[parent.0].children.clone();
        for child in children {
            let _ = self.abandon(parent, child);
        }
    }

    /// Mark `target` and every descendant connected, firing `Connect` on
    /// each node before its children. Bodies join the live registry as
    /// their node's notice fires.
    fn propagate_connect(&mut self, target: NodeId) {
        self.nodes[target.0].connected = true;
        if self.nodes[target.0].body.is_some() {
            self.register_body(target);
        }
        self.emit(target, &Notice::Connect);
        if !self.nodes.contains(target.0) {
            return;
        }
        let children = self.nodes[target.0].children.clone();
        for child in children {
            if self.nodes.contains(child.0) {
                self.propagate_connect(child);
            }
        }
    }

    /// Mark `target` and every descendant disconnected. The flag clears
    /// on the way down, but `Disconnect` fires on the way back up, so
    /// children observe it before their removed ancestor.
    fn propagate_disconnect(&mut self, target: NodeId) {
        self.nodes[target.0].connected = false;
        let children = self.nodes[target.0].children.clone();
        for child in children {
            if self.nodes.contains(child.0) {
                self.propagate_disconnect(child);
            }
        }
        self.unregister_body(target);
        self.emit(target, &Notice::Disconnect);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{
        Flow,
        NoticeKind,
    };
    use std::{
        cell::RefCell,
        rc::Rc,
    };

    fn notice_log(
        scene: &mut Scene,
        node: NodeId,
        kind: NoticeKind,
        tag: &'static str,
        log: &Rc<RefCell<Vec<String>>>,
    ) {
        let log = Rc::clone(log);
        scene.listen(node, kind, move |_, _, _| {
            log.borrow_mut().push(tag.to_owned());
            Flow::Continue
        });
    }

    #[test]
    fn adopt_sets_the_exclusive_parent() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        scene.adopt(root, a).unwrap();
        assert_eq!(scene.parent(a), Some(root));
        assert!(scene.has_child(root, a));
        scene.abandon(root, a).unwrap();
        assert_eq!(scene.parent(a), None);
        assert!(!scene.has_child(root, a));
    }

    #[test]
    fn a_parented_child_cannot_be_adopted_again() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        let b = scene.spawn_node("b");
        scene.adopt(root, a).unwrap();
        scene.adopt(root, b).unwrap();
        assert_eq!(scene.adopt(b, a), Err(LinkError::AlreadyAdopted));
        assert_eq!(scene.parent(a), Some(root));
    }

    #[test]
    fn the_root_cannot_be_adopted() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        assert_eq!(scene.adopt(a, root), Err(LinkError::RootChild));
        assert_eq!(scene.parent(root), None);
    }

    #[test]
    fn abandoning_a_non_child_fails() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        assert_eq!(scene.abandon(root, a), Err(LinkError::NotAChild));
    }

    #[test]
    fn a_child_veto_leaves_no_partial_state() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        scene.guard(a, GuardKind::Adopt, |_, _| Err(Veto::new("not today")));
        let err = scene.adopt(root, a).unwrap_err();
        assert_eq!(err, LinkError::Vetoed(Veto::new("not today")));
        assert_eq!(scene.parent(a), None);
        assert!(!scene.has_child(root, a));
        assert!(!scene.is_connected(a));
    }

    #[test]
    fn the_parent_side_is_consulted_before_the_child_side() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        let consulted = Rc::new(RefCell::new(false));
        let consulted2 = Rc::clone(&consulted);
        scene.guard(root, GuardKind::AdoptChild, |_, _| Err(Veto::new("no")));
        scene.guard(a, GuardKind::Adopt, move |_, _| {
            *consulted2.borrow_mut() = true;
            Ok(())
        });
        assert!(scene.adopt(root, a).is_err());
        assert!(!*consulted.borrow());
    }

    #[test]
    fn adoption_connects_the_whole_subtree() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        let b = scene.spawn_node("b");
        let c = scene.spawn_node("c");
        scene.adopt(a, b).unwrap();
        scene.adopt(b, c).unwrap();
        assert!(!scene.is_connected(a));
        scene.adopt(root, a).unwrap();
        assert!(scene.is_connected(a));
        assert!(scene.is_connected(b));
        assert!(scene.is_connected(c));
    }

    #[test]
    fn abandonment_disconnects_the_whole_subtree() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        let b = scene.spawn_node("b");
        let c = scene.spawn_node("c");
        scene.adopt(root, a).unwrap();
        scene.adopt(a, b).unwrap();
        scene.adopt(b, c).unwrap();
        scene.abandon(root, a).unwrap();
        assert!(!scene.is_connected(a));
        assert!(!scene.is_connected(b));
        assert!(!scene.is_connected(c));
    }

    #[test]
    fn connect_fires_parent_before_children() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        let b = scene.spawn_node("b");
        let c = scene.spawn_node("c");
        scene.adopt(a, b).unwrap();
        scene.adopt(b, c).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        notice_log(&mut scene, a, NoticeKind::Connect, "a", &log);
        notice_log(&mut scene, b, NoticeKind::Connect, "b", &log);
        notice_log(&mut scene, c, NoticeKind::Connect, "c", &log);
        scene.adopt(root, a).unwrap();
        assert_eq!(*log.borrow(), ["a", "b", "c"]);
    }

    #[test]
    fn disconnect_fires_children_before_their_removed_ancestor() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        let b = scene.spawn_node("b");
        let c = scene.spawn_node("c");
        scene.adopt(root, a).unwrap();
        scene.adopt(a, b).unwrap();
        scene.adopt(b, c).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        notice_log(&mut scene, a, NoticeKind::Disconnect, "a", &log);
        notice_log(&mut scene, b, NoticeKind::Disconnect, "b", &log);
        notice_log(&mut scene, c, NoticeKind::Disconnect, "c", &log);
        scene.abandon(root, a).unwrap();
        assert_eq!(*log.borrow(), ["c", "b", "a"]);
    }

    #[test]
    fn adoption_notices_fire_parent_side_first() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        let log = Rc::new(RefCell::new(Vec::new()));
        notice_log(&mut scene, root, NoticeKind::AdoptedChild, "adopted-child", &log);
        notice_log(&mut scene, a, NoticeKind::Adopted, "adopted", &log);
        notice_log(&mut scene, a, NoticeKind::Connect, "connect", &log);
        scene.adopt(root, a).unwrap();
        assert_eq!(*log.borrow(), ["adopted-child", "adopted", "connect"]);
    }

    #[test]
    fn spatial_parents_refuse_plain_children() {
        let mut scene = Scene::new();
        let entity = scene.spawn_entity("entity");
        let plain = scene.spawn_node("plain");
        assert_eq!(scene.adopt(entity, plain), Err(LinkError::NonSpatialChild));
        assert_eq!(scene.adopt(plain, entity), Ok(()));
    }

    #[test]
    fn clear_children_keeps_vetoed_children() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        let b = scene.spawn_node("b");
        scene.adopt(root, a).unwrap();
        scene.adopt(root, b).unwrap();
        scene.guard(b, GuardKind::Abandon, |_, _| Err(Veto::new("stays")));
        scene.clear_children(root);
        assert!(!scene.has_child(root, a));
        assert!(scene.has_child(root, b));
    }

    #[test]
    fn reattachment_reconnects() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        let b = scene.spawn_node("b");
        scene.adopt(root, a).unwrap();
        scene.adopt(root, b).unwrap();
        scene.abandon(root, b).unwrap();
        assert!(!scene.is_connected(b));
        scene.adopt(a, b).unwrap();
        assert!(scene.is_connected(b));
        assert_eq!(scene.parent(b), Some(a));
    }
}
