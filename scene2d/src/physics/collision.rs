//! The per-tick collision pass over the live body registry.
//!
//! Every connected body is registered exactly once, in connection order.
//! Each tick, after integration, every unordered pair of registered
//! bodies is examined once. The broad phase tests bounding boxes; the
//! narrow phase asks both masks about every integer lattice point inside
//! the overlap region. Pair state persists across ticks and drives the
//! begin/ongoing/end notice transitions.


use crate::{
    event::Notice,
    physics::aa_box::AaBox,
    scene::{
        NodeId,
        Scene,
    },
};
use vek::*;


/// Which pair-state lane a transition runs in: masks (narrow phase) or
/// bounding boxes alone (broad phase).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Lane {
    Mask,
    Area,
}

impl Lane {
    fn begin(self, other: NodeId) -> Notice {
        match self {
            Lane::Mask => Notice::CollisionBegin { other },
            Lane::Area => Notice::AreaCollisionBegin { other },
        }
    }

    fn ongoing(self, other: NodeId) -> Notice {
        match self {
            Lane::Mask => Notice::Collision { other },
            Lane::Area => Notice::AreaCollision { other },
        }
    }

    fn end(self, other: NodeId) -> Notice {
        match self {
            Lane::Mask => Notice::CollisionEnd { other },
            Lane::Area => Notice::AreaCollisionEnd { other },
        }
    }
}


impl Scene {
    /// Connected bodies, in connection order.
    pub fn bodies(&self) -> &[NodeId] {
        &self.bodies
    }

    /// Partners whose shape mask currently overlaps this body's.
    pub fn collisions(&self, node: NodeId) -> &[NodeId] {
        &self.body_ref(node).collisions
    }

    /// Partners whose bounding box currently overlaps this body's.
    pub fn area_collisions(&self, node: NodeId) -> &[NodeId] {
        &self.body_ref(node).area_collisions
    }

    pub(crate) fn register_body(&mut self, node: NodeId) {
        if self.bodies.contains(&node) {
            return;
        }
        debug!("registered body '{}'", self.nodes[node.0].name);
        self.bodies.push(node);
    }

    /// Remove a body from the registry. Removing one that is absent is a
    /// silent no-op.
    pub(crate) fn unregister_body(&mut self, node: NodeId) {
        if let Some(index) = self.bodies.iter().position(|&body| body == node) {
            debug!("released body '{}'", self.nodes[node.0].name);
            self.bodies.remove(index);
        }
    }

    /// This body's bounding box: `global_position ± size / 2`.
    pub fn outline(&self, node: NodeId) -> AaBox {
        AaBox::centered(self.global_position(node), self.size(node))
    }

    /// Examine every unordered pair of registered bodies once. Runs once
    /// per tick, after all bodies have integrated.
    pub(crate) fn collision_pass(&mut self) {
        let ids = self.bodies.clone();
        for first in 0..ids.len() {
            for second in (first + 1)..ids.len() {
                self.step_pair(ids[first], ids[second]);
            }
        }
    }

    fn live_pair(&self, a: NodeId, b: NodeId) -> bool {
        self.nodes.contains(a.0)
            && self.nodes.contains(b.0)
            && self.nodes[a.0].body.is_some()
            && self.nodes[b.0].body.is_some()
    }

    fn step_pair(&mut self, a: NodeId, b: NodeId) {
        if !self.live_pair(a, b) {
            return;
        }
        let region = self.outline(a).overlap(self.outline(b));
        let touching = match region {
            Some(region) => self.masks_meet(a, b, region),
            None => false,
        };
        self.lane_step(a, b, region.is_some(), Lane::Area);
        if !self.live_pair(a, b) {
            return;
        }
        self.lane_step(a, b, touching, Lane::Mask);
    }

    /// Whether both masks claim at least one shared integer lattice point
    /// inside the overlap region, each asked in its own local frame.
    fn masks_meet(&self, a: NodeId, b: NodeId, region: AaBox) -> bool {
        let center_a = self.global_position(a);
        let center_b = self.global_position(b);
        let size_a = self.size(a);
        let size_b = self.size(b);
        let mask_a = &self.body_ref(a).mask;
        let mask_b = &self.body_ref(b).mask;

        let max = region.max();
        let mut y = region.pos.y.ceil();
        while y <= max.y {
            let mut x = region.pos.x.ceil();
            while x <= max.x {
                let point = Vec2 { x, y };
                if mask_a.contains(point - center_a, size_a)
                    && mask_b.contains(point - center_b, size_b)
                {
                    return true;
                }
                x += 1.0;
            }
            y += 1.0;
        }
        false
    }

    /// Drive one lane of the pair state machine. On a false-to-true
    /// transition both bodies receive the begin notice and then the
    /// ongoing notice; while sustained, only the ongoing notice; on a
    /// true-to-false transition both receive the end notice and the pair
    /// drops from both sets. `a` precedes `b` in registry order and its
    /// listeners always fire first.
    fn lane_step(&mut self, a: NodeId, b: NodeId, touching: bool, lane: Lane) {
        let before = {
            let body = self.body_ref(a);
            match lane {
                Lane::Mask => body.collisions.contains(&b),
                Lane::Area => body.area_collisions.contains(&b),
            }
        };
        if touching {
            if !before {
                match lane {
                    Lane::Mask => {
                        debug!(
                            "collision begin between '{}' and '{}'",
                            self.nodes[a.0].name,
                            self.nodes[b.0].name,
                        );
                        self.body_mut(a).collisions.push(b);
                        self.body_mut(b).collisions.push(a);
                    }
                    Lane::Area => {
                        self.body_mut(a).area_collisions.push(b);
                        self.body_mut(b).area_collisions.push(a);
                    }
                }
                self.emit(a, &lane.begin(b));
                self.emit(b, &lane.begin(a));
            }
            self.emit(a, &lane.ongoing(b));
            self.emit(b, &lane.ongoing(a));
        } else if before {
            match lane {
                Lane::Mask => {
                    debug!(
                        "collision end between '{}' and '{}'",
                        self.nodes[a.0].name,
                        self.nodes[b.0].name,
                    );
                    self.body_mut(a).collisions.retain(|&n| n != b);
                    self.body_mut(b).collisions.retain(|&n| n != a);
                }
                Lane::Area => {
                    self.body_mut(a).area_collisions.retain(|&n| n != b);
                    self.body_mut(b).area_collisions.retain(|&n| n != a);
                }
            }
            self.emit(a, &lane.end(b));
            self.emit(b, &lane.end(a));
        }
    }
}
