//! Runtime core of a small 2D real-time scene-graph engine: a tree of
//! stateful nodes driven by a per-frame tick, with a physics layer that
//! tracks overlapping bodies across frames and reports transitions.
//!
//! The external frame driver calls [`Scene::start`] once and
//! [`Scene::update`] every tick with the elapsed seconds; rendering
//! collaborators listen to the same notices and read positions back out.

#[macro_use]
extern crate tracing;


pub mod animator;
pub mod event;
pub mod physics;
pub mod scene;
pub mod spatial;


pub use crate::{
    animator::Animator,
    event::{
        Flow,
        ForceId,
        GuardId,
        GuardKind,
        LinkAction,
        LinkChange,
        ListenerId,
        Notice,
        NoticeKind,
        Veto,
    },
    physics::{
        aa_box::AaBox,
        mask::{
            EllipseMask,
            RectMask,
            ShapeMask,
        },
        MassError,
    },
    scene::{
        Ancestors,
        Descendants,
        LinkError,
        NodeId,
        Scene,
    },
    spatial::{
        AnchorError,
        AreaSector,
    },
};
