use arbor_common::NodeId;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Cursor state saved and restored by `[` and `]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurtleState {
    pub position: Vec3,
    pub orientation: Quat,
}

impl TurtleState {
    /// Local growth axis in world space.
    #[inline]
    pub fn heading(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Apply a rotation in the turtle's local frame.
    #[inline]
    pub fn turn(&mut self, local: Quat) {
        self.orientation = (self.orientation * local).normalize();
    }
}

/// One branch piece: a quadratic bezier from `start` through `control` to `end`.
///
/// Geometry is derived from this record later; the segment owns none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Emission order within one interpretation pass.
    pub index: usize,
    pub start: Vec3,
    pub control: Vec3,
    pub end: Vec3,
    pub thickness: f32,
    /// Scene node the segment's mesh lives on, once a host created one.
    pub owner: Option<NodeId>,
}

impl Segment {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Unit direction from start to end, `+Y` for zero-length segments.
    pub fn direction(&self) -> Vec3 {
        (self.end - self.start).try_normalize().unwrap_or(Vec3::Y)
    }
}

/// A point where a leaf cluster may grow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeafAnchor {
    pub position: Vec3,
    /// Unit outward direction of the branch at the anchor.
    pub direction: Vec3,
}

/// Recovered irregularities and counters from one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretStats {
    pub symbols: usize,
    pub segments: usize,
    pub skipped_segments: usize,
    pub ignored_symbols: usize,
    pub unmatched_pops: usize,
    pub implicit_closes: usize,
    pub anchors: usize,
}

/// Output of [`crate::TurtleInterpreter::interpret`].
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub segments: Vec<Segment>,
    pub anchors: Vec<LeafAnchor>,
    /// Turtle start position.
    pub origin: Vec3,
    /// Highest `y` reached by any segment end (at least `origin.y`).
    pub max_height: f32,
    pub stats: InterpretStats,
}

impl Interpretation {
    /// Height of the tree above its origin.
    pub fn tree_height(&self) -> f32 {
        self.max_height - self.origin.y
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_follows_orientation() {
        let mut t = TurtleState {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        };
        assert_eq!(t.heading(), Vec3::Y);
        t.turn(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        assert!((t.heading() - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn zero_length_segment_direction_falls_back() {
        let s = Segment {
            index: 0,
            start: Vec3::ONE,
            control: Vec3::ONE,
            end: Vec3::ONE,
            thickness: 0.1,
            owner: None,
        };
        assert_eq!(s.length(), 0.0);
        assert_eq!(s.direction(), Vec3::Y);
    }
}
