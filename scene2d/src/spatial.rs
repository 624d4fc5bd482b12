//! The spatial capability: local position and size, hierarchical global
//! position resolution, and area sector classification.


use crate::scene::{
    NodeId,
    Scene,
};
use std::f32::consts::PI;
use thiserror::Error;
use vek::*;


/// Spatial state of a node. Position and size are read as snapshots and
/// replaced wholesale on assignment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Spatial {
    pub(crate) position: Vec2<f32>,
    pub(crate) size: Extent2<f32>,
    pub(crate) anchor: Vec2<f32>,
}

impl Spatial {
    pub(crate) fn new() -> Self {
        Spatial {
            position: Vec2::zero(),
            size: Extent2::new(0.0, 0.0),
            anchor: Vec2::zero(),
        }
    }
}


/// Direction of another entity from this one, with sector boundaries
/// aligned to this entity's corners rather than its axes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AreaSector {
    Top,
    Right,
    Bottom,
    Left,
}


/// Error returned by `Scene::set_anchor`. The previous anchor is kept.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AnchorError {
    /// Both anchor components must lie in [-1, 1].
    #[error("anchor ({0}, {1}) is out of range [(-1, -1) - (1, 1)]")]
    OutOfRange(f32, f32),
}


impl Scene {
    pub(crate) fn spatial_ref(&self, node: NodeId) -> &Spatial {
        match self.nodes[node.0].spatial {
            Some(ref spatial) => spatial,
            None => panic!("node '{}' has no spatial capability", self.nodes[node.0].name),
        }
    }

    pub(crate) fn spatial_mut(&mut self, node: NodeId) -> &mut Spatial {
        if self.nodes[node.0].spatial.is_some() {
            self.nodes[node.0].spatial.as_mut().unwrap()
        } else {
            panic!("node '{}' has no spatial capability", self.nodes[node.0].name)
        }
    }

    /// Whether the node carries spatial state.
    pub fn is_spatial(&self, node: NodeId) -> bool {
        self.nodes[node.0].spatial.is_some()
    }

    /// Local position, relative to the nearest spatial ancestor.
    pub fn position(&self, node: NodeId) -> Vec2<f32> {
        self.spatial_ref(node).position
    }

    pub fn set_position(&mut self, node: NodeId, value: Vec2<f32>) {
        self.spatial_mut(node).position = value;
    }

    pub fn size(&self, node: NodeId) -> Extent2<f32> {
        self.spatial_ref(node).size
    }

    pub fn set_size(&mut self, node: NodeId, value: Extent2<f32>) {
        self.spatial_mut(node).size = value;
    }

    /// Where the node sits within its parent, in [-1, 1] per axis. Zero
    /// keeps positions relative to the parent's center; (1, 1) pins the
    /// node's corner to the parent's corner.
    pub fn anchor(&self, node: NodeId) -> Vec2<f32> {
        self.spatial_ref(node).anchor
    }

    pub fn set_anchor(&mut self, node: NodeId, value: Vec2<f32>) -> Result<(), AnchorError> {
        if value.x < -1.0 || value.x > 1.0 || value.y < -1.0 || value.y > 1.0 {
            return Err(AnchorError::OutOfRange(value.x, value.y));
        }
        self.spatial_mut(node).anchor = value;
        Ok(())
    }

    /// Global position: the local position composed with the parent's
    /// global position, if and only if the parent is itself spatial. A
    /// non-spatial ancestor breaks the chain without erroring. A nonzero
    /// anchor offsets the result within the parent's extent.
    pub fn global_position(&self, node: NodeId) -> Vec2<f32> {
        let spatial = self.spatial_ref(node);
        let mut result = spatial.position;
        if let Some(parent) = self.nodes[node.0].parent {
            if self.nodes[parent.0].spatial.is_some() {
                result += self.global_position(parent);
                result += self.anchor_offset(node, parent);
            }
        }
        result
    }

    /// Convert a desired global position back into a local offset, under
    /// the same spatial-parent rule as `global_position`.
    pub fn set_global_position(&mut self, node: NodeId, value: Vec2<f32>) {
        let mut result = value;
        if let Some(parent) = self.nodes[node.0].parent {
            if self.nodes[parent.0].spatial.is_some() {
                result -= self.global_position(parent);
                result -= self.anchor_offset(node, parent);
            }
        }
        self.spatial_mut(node).position = result;
    }

    fn anchor_offset(&self, node: NodeId, parent: NodeId) -> Vec2<f32> {
        let spatial = self.spatial_ref(node);
        let parent_size = Vec2::<f32>::from(self.spatial_ref(parent).size);
        (parent_size - Vec2::from(spatial.size)) * spatial.anchor / 2.0
    }

    /// Classify the direction of `other` from `node` into one of four
    /// angular sectors. The sector boundaries pass through this node's
    /// corners: a square sees anything beyond its diagonals as
    /// left/right, anything between them as top/bottom.
    ///
    /// Panics if the relative angle cannot be classified, which cannot
    /// happen for finite positions.
    pub fn area_sector(&self, node: NodeId, other: NodeId) -> AreaSector {
        let size = self.size(node);
        let alpha = (size.w / 2.0).atan2(size.h / 2.0);

        let relative = self.global_position(other) - self.global_position(node);
        let mut angle = relative.x.atan2(relative.y);
        angle += alpha;
        if angle < 0.0 {
            angle += 2.0 * PI;
        }

        let sectors = [
            (2.0 * alpha, AreaSector::Top),
            (PI - 2.0 * alpha, AreaSector::Right),
            (2.0 * alpha, AreaSector::Bottom),
            (PI - 2.0 * alpha, AreaSector::Left),
        ];
        let mut begin = 0.0;
        for &(width, sector) in &sectors {
            let end = begin + width;
            if begin <= angle && angle < end {
                return sector;
            }
            begin = end;
        }
        panic!("angle {} is out of range [0 - 2pi)", angle);
    }
}
