//! The node arena, event dispatch, and tick driving.


use crate::{
    event::{
        Flow,
        GuardHook,
        GuardKind,
        ListenerFn,
        ListenerHook,
        ListenerId,
        Notice,
        NoticeKind,
    },
    physics::Body,
    spatial::Spatial,
};
use slab::Slab;
use std::{
    cell::RefCell,
    rc::Rc,
};


pub mod link;
pub mod walk;

pub use self::link::LinkError;
pub use self::walk::{
    Ancestors,
    Descendants,
};


/// Key of a node in a `Scene`. Using a despawned node's key is a
/// programming error and panics.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub(crate) usize);


pub(crate) struct ListenerEntry {
    pub kind: NoticeKind,
    pub seq: u64,
    pub hook: ListenerHook,
}

pub(crate) struct GuardEntry {
    pub kind: GuardKind,
    pub seq: u64,
    pub hook: GuardHook,
}

pub(crate) struct NodeData {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub connected: bool,
    pub listeners: Vec<ListenerEntry>,
    pub guards: Vec<GuardEntry>,
    pub spatial: Option<Spatial>,
    pub body: Option<Body>,
}

impl NodeData {
    fn new(name: String) -> Self {
        NodeData {
            name,
            parent: None,
            children: Vec::new(),
            connected: false,
            listeners: Vec::new(),
            guards: Vec::new(),
            spatial: None,
            body: None,
        }
    }
}


/// A tree of stateful nodes driven by a per-frame tick.
///
/// Owns the distinguished root node, from which connectivity and tick
/// rebroadcast originate. Constructed once and passed by handle to
/// everything that touches the tree. All dispatch is synchronous and
/// single-threaded: every hook runs to completion before the dispatcher
/// proceeds.
pub struct Scene {
    pub(crate) nodes: Slab<NodeData>,
    root: NodeId,
    /// Connected bodies, in connection order. Collision pairs are examined
    /// in this order.
    pub(crate) bodies: Vec<NodeId>,
    next_seq: u64,
}

impl Scene {
    /// Construct a scene holding only the root node.
    pub fn new() -> Self {
        let mut nodes = Slab::new();
        let root = NodeId(nodes.insert(NodeData::new(String::from("root"))));
        nodes[root.0].connected = true;
        Scene {
            nodes,
            root,
            bodies: Vec::new(),
            next_seq: 0,
        }
    }

    /// The distinguished root node. Always connected, never adoptable,
    /// never despawnable.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached node with no capabilities.
    pub fn spawn_node<N: Into<String>>(&mut self, name: N) -> NodeId {
        let id = NodeId(self.nodes.insert(NodeData::new(name.into())));
        trace!("spawned node '{}' {:?}", self.nodes[id.0].name, id);
        id
    }

    /// Create a detached node with a spatial capability (position and
    /// size, both zero).
    pub fn spawn_entity<N: Into<String>>(&mut self, name: N) -> NodeId {
        let id = self.spawn_node(name);
        self.nodes[id.0].spatial = Some(Spatial::new());
        id
    }

    /// Create a detached node with spatial and body capabilities. The
    /// shape mask is fixed at creation.
    pub fn spawn_corporeal<N, M>(&mut self, name: N, mask: M) -> NodeId
    where
        N: Into<String>,
        M: crate::physics::mask::ShapeMask + 'static,
    {
        let id = self.spawn_entity(name);
        self.nodes[id.0].body = Some(Body::new(Box::new(mask)));
        id
    }

    /// Detach `node` (running the abandon protocol, so guards may refuse)
    /// and drop it and all of its descendants from the scene.
    pub fn despawn(&mut self, node: NodeId) -> Result<(), LinkError> {
        assert_ne!(node, self.root, "the root cannot be despawned");
        if let Some(parent) = self.nodes[node.0].parent {
            self.abandon(parent, node)?;
        }
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            self.unregister_body(id);
            if let Some(data) = self.nodes.try_remove(id.0) {
                trace!("despawned node '{}' {:?}", data.name, id);
                stack.extend(data.children);
            }
        }
        Ok(())
    }

    /// Whether `node` still exists in the scene.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(node.0)
    }

    pub fn name(&self, node: NodeId) -> &str {
        &self.nodes[node.0].name
    }

    pub fn set_name<N: Into<String>>(&mut self, node: NodeId, name: N) {
        self.nodes[node.0].name = name.into();
    }

    /// The node's parent, or `None` if it is detached or is the root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// The node's children, in adoption order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// The topmost ancestor reachable from `node`. A detached node is its
    /// own peak.
    pub fn peak(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.nodes[current.0].parent {
            current = parent;
        }
        current
    }

    /// Whether the node's ancestor chain terminates at the root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.nodes[node.0].connected
    }

    /// Register a listener for `kind` notices at `node`. Listeners run
    /// synchronously in registration order.
    pub fn listen<F>(&mut self, node: NodeId, kind: NoticeKind, hook: F) -> ListenerId
    where
        F: FnMut(&mut Scene, NodeId, &Notice) -> Flow + 'static,
    {
        let seq = self.next_seq();
        let hook: Rc<RefCell<ListenerFn>> = Rc::new(RefCell::new(hook));
        self.nodes[node.0].listeners.push(ListenerEntry { kind, seq, hook });
        ListenerId { node, seq }
    }

    /// Remove a listener. Removing one whose node is gone is a no-op.
    pub fn unlisten(&mut self, id: ListenerId) {
        if let Some(data) = self.nodes.get_mut(id.node.0) {
            data.listeners.retain(|entry| entry.seq != id.seq);
        }
    }

    pub(crate) fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Deliver `notice` to the listeners of `target`, in registration
    /// order. Listeners may mutate the scene freely; delivery at a node
    /// despawned by an earlier listener is a no-op.
    pub fn emit(&mut self, target: NodeId, notice: &Notice) -> Flow {
        let kind = notice.kind();
        let hooks = match self.nodes.get(target.0) {
            Some(data) => data
                .listeners
                .iter()
                .filter(|entry| entry.kind == kind)
                .map(|entry| Rc::clone(&entry.hook))
                .collect::<Vec<_>>(),
            None => return Flow::Continue,
        };
        for hook in hooks {
            if !self.nodes.contains(target.0) {
                break;
            }
            if (hook.borrow_mut())(self, target, notice) == Flow::Stop {
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    /// Deliver `notice` to the root and every reachable descendant, depth
    /// first: visit a node, then push its children. If any listener
    /// returns `Flow::Stop` the whole broadcast aborts immediately.
    pub fn broadcast(&mut self, notice: &Notice) -> Flow {
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            if !self.nodes.contains(node.0) {
                continue;
            }
            if self.emit(node, notice) == Flow::Stop {
                return Flow::Stop;
            }
            stack.extend(self.nodes[node.0].children.iter().copied());
        }
        Flow::Continue
    }

    /// Rebroadcast the frame driver's start notice to the live tree.
    pub fn start(&mut self) -> Flow {
        self.broadcast(&Notice::Start)
    }

    /// Advance one frame: rebroadcast the update notice to the live tree,
    /// then integrate every registered body once, then run the single
    /// collision pass. Physics runs even if a listener stopped the
    /// broadcast.
    pub fn update(&mut self, elapsed: f32) -> Flow {
        let flow = self.broadcast(&Notice::Update { elapsed });
        self.integrate(elapsed);
        self.collision_pass();
        flow
    }
}

impl Default for Scene {
    fn default() -> Self {
        Scene::new()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        cell::RefCell,
        rc::Rc,
    };

    #[test]
    fn root_is_connected_and_parentless() {
        let scene = Scene::new();
        let root = scene.root();
        assert!(scene.is_connected(root));
        assert_eq!(scene.parent(root), None);
        assert_eq!(scene.peak(root), root);
    }

    #[test]
    fn spawned_nodes_start_detached() {
        let mut scene = Scene::new();
        let node = scene.spawn_node("a");
        assert!(!scene.is_connected(node));
        assert_eq!(scene.parent(node), None);
        assert_eq!(scene.peak(node), node);
        assert!(scene.children(node).is_empty());
    }

    #[test]
    fn emit_runs_listeners_in_registration_order() {
        let mut scene = Scene::new();
        let node = scene.spawn_node("a");
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            scene.listen(node, NoticeKind::Start, move |_, _, _| {
                log.borrow_mut().push(tag);
                Flow::Continue
            });
        }
        scene.emit(node, &Notice::Start);
        assert_eq!(*log.borrow(), ["first", "second", "third"]);
    }

    #[test]
    fn unlisten_silences_a_listener() {
        let mut scene = Scene::new();
        let node = scene.spawn_node("a");
        let count = Rc::new(RefCell::new(0));
        let count2 = Rc::clone(&count);
        let id = scene.listen(node, NoticeKind::Start, move |_, _, _| {
            *count2.borrow_mut() += 1;
            Flow::Continue
        });
        scene.emit(node, &Notice::Start);
        scene.unlisten(id);
        scene.emit(node, &Notice::Start);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn broadcast_reaches_every_descendant() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        let b = scene.spawn_node("b");
        let c = scene.spawn_node("c");
        scene.adopt(root, a).unwrap();
        scene.adopt(a, b).unwrap();
        scene.adopt(root, c).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        for node in [root, a, b, c] {
            let log = Rc::clone(&log);
            scene.listen(node, NoticeKind::Update, move |scene, node, _| {
                log.borrow_mut().push(scene.name(node).to_owned());
                Flow::Continue
            });
        }
        scene.broadcast(&Notice::Update { elapsed: 0.0 });
        let mut seen = log.borrow().clone();
        seen.sort();
        assert_eq!(seen, ["a", "b", "c", "root"]);
        assert_eq!(log.borrow()[0], "root");
    }

    #[test]
    fn broadcast_stops_at_the_first_refusal() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        let b = scene.spawn_node("b");
        scene.adopt(root, a).unwrap();
        scene.adopt(a, b).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let log2 = Rc::clone(&log);
        scene.listen(a, NoticeKind::Start, move |_, _, _| {
            log2.borrow_mut().push("a");
            Flow::Stop
        });
        let log3 = Rc::clone(&log);
        scene.listen(b, NoticeKind::Start, move |_, _, _| {
            log3.borrow_mut().push("b");
            Flow::Continue
        });
        assert_eq!(scene.start(), Flow::Stop);
        assert_eq!(*log.borrow(), ["a"]);
    }

    #[test]
    fn despawn_drops_the_whole_subtree() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        let b = scene.spawn_node("b");
        let c = scene.spawn_node("c");
        scene.adopt(root, a).unwrap();
        scene.adopt(a, b).unwrap();
        scene.adopt(b, c).unwrap();
        scene.despawn(a).unwrap();
        assert!(!scene.contains(a));
        assert!(!scene.contains(b));
        assert!(!scene.contains(c));
        assert!(scene.children(root).is_empty());
    }

    #[test]
    fn listeners_may_mutate_the_scene_during_dispatch() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_node("a");
        scene.adopt(root, a).unwrap();
        scene.listen(a, NoticeKind::Update, |scene, node, _| {
            scene.set_name(node, "renamed");
            Flow::Continue
        });
        scene.update(1.0);
        assert_eq!(scene.name(a), "renamed");
    }
}
