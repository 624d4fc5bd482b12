//! Shape masks for the collision narrow phase.


use vek::*;


/// A body's notion of which local-space points lie inside its shape.
///
/// `point` is relative to the body's center and `size` is the body's
/// current extent, so one mask value serves a body of any size. Supplied
/// when the body is created; the collision narrow phase evaluates it for
/// every shared lattice point of an overlap region.
pub trait ShapeMask {
    fn contains(&self, point: Vec2<f32>, size: Extent2<f32>) -> bool;
}


/// The full rectangle: every point of the bounding box is solid.
#[derive(Debug, Copy, Clone, Default)]
pub struct RectMask;

impl ShapeMask for RectMask {
    fn contains(&self, point: Vec2<f32>, size: Extent2<f32>) -> bool {
        point.x.abs() * 2.0 <= size.w && point.y.abs() * 2.0 <= size.h
    }
}


/// The ellipse inscribed in the bounding box.
#[derive(Debug, Copy, Clone, Default)]
pub struct EllipseMask;

impl ShapeMask for EllipseMask {
    fn contains(&self, point: Vec2<f32>, size: Extent2<f32>) -> bool {
        if size.w <= 0.0 || size.h <= 0.0 {
            return false;
        }
        let x = point.x / (size.w / 2.0);
        let y = point.y / (size.h / 2.0);
        x * x + y * y <= 1.0
    }
}
