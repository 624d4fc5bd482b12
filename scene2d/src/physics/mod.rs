//! The body capability: mass, velocity, forces, and per-tick motion
//! integration.


use crate::{
    event::ForceId,
    scene::{
        NodeId,
        Scene,
    },
};
use slab::Slab;
use thiserror::Error;
use vek::*;


pub mod aa_box;
pub mod collision;
pub mod mask;

use self::mask::ShapeMask;


/// Physical state of a node. Every body is also spatial; its shape mask
/// interprets the spatial size.
pub struct Body {
    pub(crate) mass: f32,
    pub(crate) velocity: Vec2<f32>,
    pub(crate) forces: Slab<Vec2<f32>>,
    pub(crate) mask: Box<dyn ShapeMask>,
    /// Partners whose shape mask currently overlaps ours. The only
    /// cross-frame state in the physics layer.
    pub(crate) collisions: Vec<NodeId>,
    /// Partners whose bounding box currently overlaps ours.
    pub(crate) area_collisions: Vec<NodeId>,
}

impl Body {
    pub(crate) fn new(mask: Box<dyn ShapeMask>) -> Self {
        Body {
            mass: 1.0,
            velocity: Vec2::zero(),
            forces: Slab::new(),
            mask,
            collisions: Vec::new(),
            area_collisions: Vec::new(),
        }
    }

    /// Sum of current forces over mass.
    pub(crate) fn acceleration(&self) -> Vec2<f32> {
        let mut total = Vec2::zero();
        for (_, force) in self.forces.iter() {
            total += *force;
        }
        total / self.mass
    }
}


/// Error returned by `Scene::set_mass`. The previous mass is kept.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MassError {
    /// Mass must be strictly positive.
    #[error("mass {0} is out of range (0 - +inf)")]
    NonPositive(f32),
}


impl Scene {
    pub(crate) fn body_ref(&self, node: NodeId) -> &Body {
        match self.nodes[node.0].body {
            Some(ref body) => body,
            None => panic!("node '{}' has no body capability", self.nodes[node.0].name),
        }
    }

    pub(crate) fn body_mut(&mut self, node: NodeId) -> &mut Body {
        if self.nodes[node.0].body.is_some() {
            self.nodes[node.0].body.as_mut().unwrap()
        } else {
            panic!("node '{}' has no body capability", self.nodes[node.0].name)
        }
    }

    /// Whether the node carries physical state.
    pub fn is_body(&self, node: NodeId) -> bool {
        self.nodes[node.0].body.is_some()
    }

    pub fn mass(&self, node: NodeId) -> f32 {
        self.body_ref(node).mass
    }

    /// Assign a new mass. Non-positive values are rejected and the
    /// previous mass is kept.
    pub fn set_mass(&mut self, node: NodeId, value: f32) -> Result<(), MassError> {
        if value > 0.0 {
            self.body_mut(node).mass = value;
            Ok(())
        } else {
            Err(MassError::NonPositive(value))
        }
    }

    pub fn velocity(&self, node: NodeId) -> Vec2<f32> {
        self.body_ref(node).velocity
    }

    pub fn set_velocity(&mut self, node: NodeId, value: Vec2<f32>) {
        self.body_mut(node).velocity = value;
    }

    /// Apply an instantaneous force. It keeps acting every tick until
    /// withdrawn.
    pub fn add_force(&mut self, node: NodeId, force: Vec2<f32>) -> ForceId {
        ForceId(self.body_mut(node).forces.insert(force))
    }

    /// Withdraw a force. Returns the force, or `None` if it was already
    /// withdrawn.
    pub fn remove_force(&mut self, node: NodeId, id: ForceId) -> Option<Vec2<f32>> {
        self.body_mut(node).forces.try_remove(id.0)
    }

    pub fn clear_forces(&mut self, node: NodeId) {
        self.body_mut(node).forces.clear();
    }

    /// The node's current forces, in application order.
    pub fn forces(&self, node: NodeId) -> impl Iterator<Item = Vec2<f32>> + '_ {
        self.body_ref(node).forces.iter().map(|(_, &force)| force)
    }

    /// Derived acceleration: the vector sum of current forces over mass.
    pub fn acceleration(&self, node: NodeId) -> Vec2<f32> {
        self.body_ref(node).acceleration()
    }

    /// Whether a local-space point (relative to the node's center) lies
    /// inside its shape mask.
    pub fn is_inner(&self, node: NodeId, point: Vec2<f32>) -> bool {
        let size = self.size(node);
        self.body_ref(node).mask.contains(point, size)
    }

    /// Advance every registered body by one tick, in registry order:
    /// `velocity += acceleration; position += velocity * elapsed`.
    pub(crate) fn integrate(&mut self, elapsed: f32) {
        let ids = self.bodies.clone();
        for id in ids {
            if !self.nodes.contains(id.0) {
                continue;
            }
            let node = &mut self.nodes[id.0];
            let (Some(spatial), Some(body)) = (node.spatial.as_mut(), node.body.as_mut())
            else {
                continue;
            };
            let acceleration = body.acceleration();
            body.velocity += acceleration;
            spatial.position += body.velocity * elapsed;
        }
    }
}
