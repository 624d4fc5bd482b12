//! Types which exist transiently to convey notices and membership changes
//! between the scene and its hooks.


use crate::scene::{
    Scene,
    NodeId,
};
use std::{
    borrow::Cow,
    cell::RefCell,
    fmt::{
        self,
        Display,
        Formatter,
    },
    rc::Rc,
};


/// A notice delivered to listeners. Carries its payload inline, so a
/// listener never observes a notice with a missing payload.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Notice {
    /// The frame driver started. Broadcast once from the root.
    Start,
    /// A frame elapsed. Broadcast every tick from the root.
    Update { elapsed: f32 },
    /// This node took in a child. Fires on the parent, before `Adopted`
    /// fires on the child.
    AdoptedChild { child: NodeId },
    /// This node was taken in by a parent.
    Adopted { parent: NodeId },
    /// This node let go of a child. Fires on the parent, before
    /// `Abandoned` fires on the child.
    AbandonedChild { child: NodeId },
    /// This node was let go by its parent.
    Abandoned { parent: NodeId },
    /// This node became reachable from the root. Fires parent before
    /// children.
    Connect,
    /// This node became unreachable from the root. Fires children before
    /// parent.
    Disconnect,
    /// The shape masks of this body and `other` began to overlap.
    CollisionBegin { other: NodeId },
    /// The shape masks of this body and `other` overlap this tick. Also
    /// fires on the transition tick, after `CollisionBegin`.
    Collision { other: NodeId },
    /// The shape masks of this body and `other` stopped overlapping.
    CollisionEnd { other: NodeId },
    /// The bounding boxes of this body and `other` began to overlap,
    /// regardless of masks.
    AreaCollisionBegin { other: NodeId },
    /// The bounding boxes of this body and `other` overlap this tick.
    AreaCollision { other: NodeId },
    /// The bounding boxes of this body and `other` stopped overlapping.
    AreaCollisionEnd { other: NodeId },
}

impl Notice {
    pub fn kind(&self) -> NoticeKind {
        match self {
            &Notice::Start => NoticeKind::Start,
            &Notice::Update { .. } => NoticeKind::Update,
            &Notice::AdoptedChild { .. } => NoticeKind::AdoptedChild,
            &Notice::Adopted { .. } => NoticeKind::Adopted,
            &Notice::AbandonedChild { .. } => NoticeKind::AbandonedChild,
            &Notice::Abandoned { .. } => NoticeKind::Abandoned,
            &Notice::Connect => NoticeKind::Connect,
            &Notice::Disconnect => NoticeKind::Disconnect,
            &Notice::CollisionBegin { .. } => NoticeKind::CollisionBegin,
            &Notice::Collision { .. } => NoticeKind::Collision,
            &Notice::CollisionEnd { .. } => NoticeKind::CollisionEnd,
            &Notice::AreaCollisionBegin { .. } => NoticeKind::AreaCollisionBegin,
            &Notice::AreaCollision { .. } => NoticeKind::AreaCollision,
            &Notice::AreaCollisionEnd { .. } => NoticeKind::AreaCollisionEnd,
        }
    }
}


/// Discriminant of `Notice`, used to key listener registration.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum NoticeKind {
    Start,
    Update,
    AdoptedChild,
    Adopted,
    AbandonedChild,
    Abandoned,
    Connect,
    Disconnect,
    CollisionBegin,
    Collision,
    CollisionEnd,
    AreaCollisionBegin,
    AreaCollision,
    AreaCollisionEnd,
}


/// Listener return value steering a root broadcast. `Stop` aborts the
/// whole broadcast for all subsequent nodes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Stop,
}


/// Which membership change a guard is being consulted about.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LinkAction {
    Adopt,
    Abandon,
}

/// Description of a pending membership change, handed to guards before
/// anything is committed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LinkChange {
    pub action: LinkAction,
    pub parent: NodeId,
    pub child: NodeId,
}


/// Which side of which membership change a guard watches. A node's
/// `AdoptChild` guards are consulted when it is about to take in a child,
/// its `Adopt` guards when it is about to be taken in, and likewise for
/// the abandon pair.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GuardKind {
    AdoptChild,
    Adopt,
    AbandonChild,
    Abandon,
}


/// A guard's refusal of a membership change, with a human-readable reason.
#[derive(Debug, Clone, PartialEq)]
pub struct Veto {
    pub reason: Cow<'static, str>,
}

impl Veto {
    pub fn new<R: Into<Cow<'static, str>>>(reason: R) -> Self {
        Veto { reason: reason.into() }
    }
}

impl Display for Veto {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}


pub type ListenerFn = dyn FnMut(&mut Scene, NodeId, &Notice) -> Flow;
pub type GuardFn = dyn FnMut(&Scene, &LinkChange) -> Result<(), Veto>;

pub(crate) type ListenerHook = Rc<RefCell<ListenerFn>>;
pub(crate) type GuardHook = Rc<RefCell<GuardFn>>;


/// Handle to a registered listener, for removal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ListenerId {
    pub(crate) node: NodeId,
    pub(crate) seq: u64,
}

/// Handle to a registered guard, for removal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct GuardId {
    pub(crate) node: NodeId,
    pub(crate) seq: u64,
}


/// Handle to a force applied to a body, for withdrawal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ForceId(pub(crate) usize);
