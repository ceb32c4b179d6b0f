use std::f32::consts::PI;

use arbor_common::sampling::{in_range, jitter};
use arbor_common::{ConfigError, Transform};
use glam::{Quat, Vec3};
use rand::Rng;

use crate::params::GrowthParams;
use crate::skeleton::{InterpretStats, Interpretation, LeafAnchor, Segment, TurtleState};

/// Turns a symbol sequence into an ordered list of branch segments and leaf
/// anchors.
///
/// | Symbol | Effect |
/// |---|---|
/// | `F` | step forward along the local up axis and emit a segment |
/// | `+` `-` | roll about local Z |
/// | `&` `^` | pitch about local X |
/// | `\` `/` | yaw about local Y |
/// | `\|` | turn 180° about local Y |
/// | `[` `]` | push / pop the turtle state |
///
/// Any other symbol is ignored. An unmatched `]` is ignored and brackets
/// still open at the end are closed as if `]` had been read.
#[derive(Debug, Clone)]
pub struct TurtleInterpreter {
    params: GrowthParams,
}

impl TurtleInterpreter {
    pub fn new(params: GrowthParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &GrowthParams {
        &self.params
    }

    /// Walk `sequence` starting from `origin`.
    ///
    /// Random lengths, angles and control offsets are drawn once per symbol,
    /// so the same sequence yields the same topology with different geometry
    /// unless `rng` is seeded identically.
    pub fn interpret(
        &self,
        sequence: &str,
        origin: Transform,
        rng: &mut impl Rng,
    ) -> Interpretation {
        let _span = tracing::info_span!("interpret", symbols = sequence.len()).entered();

        let mut walk = Walk {
            params: &self.params,
            turtle: TurtleState {
                position: origin.position,
                orientation: origin.rotation,
            },
            stack: Vec::new(),
            base_height: origin.position.y,
            max_height: origin.position.y,
            segments: Vec::new(),
            anchors: Vec::new(),
            stats: InterpretStats::default(),
        };

        for symbol in sequence.chars() {
            walk.step(symbol, rng);
        }
        walk.close_open_brackets();

        let Walk {
            mut segments,
            anchors,
            max_height,
            mut stats,
            ..
        } = walk;

        self.apply_thickness(&mut segments, origin.position, max_height);
        stats.segments = segments.len();
        stats.anchors = anchors.len();

        tracing::debug!(
            segments = stats.segments,
            anchors = stats.anchors,
            unmatched_pops = stats.unmatched_pops,
            implicit_closes = stats.implicit_closes,
            height = max_height - origin.position.y,
            "interpretation complete"
        );

        Interpretation {
            segments,
            anchors,
            origin: origin.position,
            max_height,
            stats,
        }
    }

    /// Thickness needs the final tree height, so it is assigned after the walk.
    fn apply_thickness(&self, segments: &mut [Segment], origin: Vec3, max_height: f32) {
        let taper = &self.params.taper;
        for segment in segments.iter_mut() {
            segment.thickness = taper.width(segment.end, origin, max_height);
        }
        if let (Some(width), Some(first)) = (taper.trunk_width, segments.first_mut()) {
            first.thickness = width;
        }
    }
}

struct Walk<'a> {
    params: &'a GrowthParams,
    turtle: TurtleState,
    stack: Vec<TurtleState>,
    base_height: f32,
    max_height: f32,
    segments: Vec<Segment>,
    anchors: Vec<LeafAnchor>,
    stats: InterpretStats,
}

impl Walk<'_> {
    fn step(&mut self, symbol: char, rng: &mut impl Rng) {
        self.stats.symbols += 1;
        match symbol {
            'F' => self.forward(rng),
            '+' => self.turn(Quat::from_rotation_z(self.angle(rng))),
            '-' => self.turn(Quat::from_rotation_z(-self.angle(rng))),
            '&' => self.turn(Quat::from_rotation_x(self.angle(rng))),
            '^' => self.turn(Quat::from_rotation_x(-self.angle(rng))),
            '\\' => self.turn(Quat::from_rotation_y(self.angle(rng))),
            '/' => self.turn(Quat::from_rotation_y(-self.angle(rng))),
            '|' => self.turn(Quat::from_rotation_y(PI)),
            '[' => self.stack.push(self.turtle),
            ']' => {
                if !self.pop() {
                    self.stats.unmatched_pops += 1;
                    tracing::trace!("unmatched ']' ignored");
                }
            }
            _ => self.stats.ignored_symbols += 1,
        }
    }

    fn angle(&self, rng: &mut impl Rng) -> f32 {
        jitter(rng, self.params.base_angle, self.params.angle_variance).to_radians()
    }

    fn turn(&mut self, local: Quat) {
        self.turtle.turn(local);
    }

    fn forward(&mut self, rng: &mut impl Rng) {
        let p = self.params;
        if p.branch_probability < 1.0 && rng.random::<f32>() >= p.branch_probability {
            self.stats.skipped_segments += 1;
            return;
        }

        let length = jitter(rng, p.base_length, p.length_variance).max(0.0);
        let start = self.turtle.position;
        let end = start + self.turtle.heading() * length;
        self.turtle.position = end;
        self.max_height = self.max_height.max(end.y);

        let offsets = &p.control_jitter;
        let local_offset = Vec3::new(
            jitter(rng, 0.0, offsets.lateral),
            in_range(rng, offsets.vertical),
            jitter(rng, 0.0, offsets.lateral),
        );
        let control = (start + end) * 0.5 + self.turtle.orientation * local_offset;

        self.segments.push(Segment {
            index: self.segments.len(),
            start,
            control,
            end,
            thickness: 0.0,
            owner: None,
        });
    }

    /// Pop the stack, recording a leaf anchor at the branch tip being left.
    /// Returns `false` when the stack is empty.
    fn pop(&mut self) -> bool {
        let Some(saved) = self.stack.pop() else {
            return false;
        };
        self.record_anchor_if_high_enough();
        self.turtle = saved;
        true
    }

    fn record_anchor_if_high_enough(&mut self) {
        let tree_height = self.max_height - self.base_height;
        if tree_height <= f32::EPSILON {
            return;
        }
        let height = self.turtle.position.y - self.base_height;
        if height >= self.params.leaf_threshold * tree_height {
            self.anchors.push(LeafAnchor {
                position: self.turtle.position,
                direction: self.turtle.heading(),
            });
        }
    }

    fn close_open_brackets(&mut self) {
        while self.pop() {
            self.stats.implicit_closes += 1;
        }
    }
}
