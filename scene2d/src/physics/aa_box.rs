
use vek::*;


/// Axis-aligned box. Bounds are inclusive, so boxes sharing an edge count
/// as overlapping.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AaBox {
    pub pos: Vec2<f32>,
    /// Extent is assumed to be non-negative.
    pub ext: Extent2<f32>,
}

impl AaBox {
    /// Box of extent `ext` centered on `center`.
    pub fn centered<V: Into<Vec2<f32>>>(center: V, ext: Extent2<f32>) -> Self {
        AaBox {
            pos: center.into() - Vec2::from(ext) / 2.0,
            ext,
        }
    }

    pub fn max(self) -> Vec2<f32> {
        self.pos + self.ext
    }

    pub fn translate<V: Into<Vec2<f32>>>(mut self, v: V) -> Self {
        self.pos += v.into();
        self
    }

    pub fn contains<V: Into<Vec2<f32>>>(self, pos: V) -> bool {
        let pos = pos.into();
        let max = self.max();
        pos.x >= self.pos.x
            && pos.y >= self.pos.y
            && pos.x <= max.x
            && pos.y <= max.y
    }

    /// The region shared by both boxes, or `None` if they are disjoint.
    /// Touching boxes overlap in a zero-extent region.
    pub fn overlap(self, other: AaBox) -> Option<AaBox> {
        let self_max = self.max();
        let other_max = other.max();
        let min = Vec2 {
            x: self.pos.x.max(other.pos.x),
            y: self.pos.y.max(other.pos.y),
        };
        let max = Vec2 {
            x: self_max.x.min(other_max.x),
            y: self_max.y.min(other_max.y),
        };
        if min.x <= max.x && min.y <= max.y {
            Some(AaBox {
                pos: min,
                ext: Extent2::new(max.x - min.x, max.y - min.y),
            })
        } else {
            None
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use vek::*;

    #[test]
    fn overlap_of_offset_squares() {
        let a = AaBox::centered(Vec2::new(0.0, 0.0), Extent2::new(10.0, 10.0));
        let b = AaBox::centered(Vec2::new(5.0, 5.0), Extent2::new(10.0, 10.0));
        let region = a.overlap(b).unwrap();
        assert_eq!(region.pos, Vec2::new(0.0, 0.0));
        assert_eq!(region.max(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn disjoint_boxes_do_not_overlap() {
        let a = AaBox::centered(Vec2::new(0.0, 0.0), Extent2::new(10.0, 10.0));
        let b = AaBox::centered(Vec2::new(20.0, 0.0), Extent2::new(10.0, 10.0));
        assert_eq!(a.overlap(b), None);
    }

    #[test]
    fn touching_boxes_overlap_in_a_degenerate_region() {
        let a = AaBox::centered(Vec2::new(0.0, 0.0), Extent2::new(10.0, 10.0));
        let b = AaBox::centered(Vec2::new(10.0, 0.0), Extent2::new(10.0, 10.0));
        let region = a.overlap(b).unwrap();
        assert_eq!(region.pos.x, 5.0);
        assert_eq!(region.ext.w, 0.0);
    }

    #[test]
    fn contains_is_inclusive_of_edges() {
        let a = AaBox::centered(Vec2::new(0.0, 0.0), Extent2::new(10.0, 10.0));
        assert!(a.contains(Vec2::new(5.0, 5.0)));
        assert!(a.contains(Vec2::new(0.0, 0.0)));
        assert!(!a.contains(Vec2::new(5.1, 0.0)));
    }
}
