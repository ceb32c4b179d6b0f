use std::cmp::Ordering;
use std::collections::BinaryHeap;

use arbor_common::math::smoothstep;
use arbor_common::sampling::{in_range, in_range_u32};
use arbor_common::{ConfigError, NodeId, Transform};
use arbor_leaves::LeafBatcher;
use arbor_mesh::{TubeSpec, build_tube_mesh};
use arbor_scene::SceneHost;
use arbor_turtle::{Interpretation, Segment};
use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{GrowthTiming, MeshSettings, TreeConfig};
use crate::material::BarkPalette;

/// Smallest frame step [`GrowthScheduler::run_to_completion`] will use.
pub const MIN_FRAME_DT: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthPhase {
    /// Branches are being started and animated.
    Branches,
    /// Every branch is done; leaf clusters are being spawned.
    Leaves,
    Complete,
}

/// Counters for one growth run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrowthStats {
    pub branches_total: usize,
    pub branches_started: usize,
    pub branches_completed: usize,
    pub active_branches: usize,
    pub peak_active_branches: usize,
    pub clusters_spawned: usize,
    pub leaves_spawned: usize,
    pub frames: u64,
    /// Simulated seconds since the first frame.
    pub elapsed: f32,
    pub last_frame: f32,
}

/// What a task wants after one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Wait {
    /// Resume this many seconds after the step's scheduled time.
    Seconds(f32),
    /// Resume on the next call to [`GrowthScheduler::advance`].
    NextFrame,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BranchStage {
    Growing,
    Settling,
}

#[derive(Debug, Clone, PartialEq)]
enum Task {
    /// Starts branches in segment order, `next` being the next to start.
    Dispatch { next: usize },
    GrowBranch {
        node: NodeId,
        offset: Vec3,
        started_at: f32,
        duration: f32,
        settle: f32,
        stage: BranchStage,
    },
    /// Spawns one leaf cluster per anchor, `next` being the next anchor.
    SpawnLeaves { next: usize },
}

#[derive(Debug)]
struct Scheduled {
    resume_at: f32,
    seq: u64,
    task: Task,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed so the max-heap pops the earliest (resume_at, seq) first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .resume_at
            .total_cmp(&self.resume_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Timed tasks ordered by resume time, ties broken by insertion order.
#[derive(Debug, Default)]
pub(crate) struct TaskQueue {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl TaskQueue {
    fn push(&mut self, resume_at: f32, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled {
            resume_at,
            seq,
            task,
        });
    }

    /// Remove the earliest task due at or before `now`.
    fn pop_due(&mut self, now: f32) -> Option<Scheduled> {
        if self.heap.peek()?.resume_at <= now {
            self.heap.pop()
        } else {
            None
        }
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Paces tree construction over simulated time.
///
/// Single-threaded and cooperative: the host calls [`advance`](Self::advance)
/// once per frame and every due task runs one step. Branch nodes are created
/// in segment order, at most `parallel_branches` animate at once, and leaf
/// clusters appear only after every branch has finished. A run cannot be
/// cancelled part-way.
#[derive(Debug)]
pub struct GrowthScheduler {
    interpretation: Interpretation,
    timing: GrowthTiming,
    mesh: MeshSettings,
    bark: BarkPalette,
    leaves: LeafBatcher,
    rng: StdRng,
    queue: TaskQueue,
    next_frame: Vec<Task>,
    root: Option<NodeId>,
    clock: f32,
    phase: GrowthPhase,
    stats: GrowthStats,
}

impl GrowthScheduler {
    pub fn new(
        interpretation: Interpretation,
        config: &TreeConfig,
        mut rng: StdRng,
    ) -> Result<Self, ConfigError> {
        config.timing.validate()?;
        config.mesh.validate()?;
        config.bark.validate()?;
        let leaves = LeafBatcher::new(config.leaves.clone(), StdRng::from_rng(&mut rng))?;

        let mut queue = TaskQueue::default();
        queue.push(0.0, Task::Dispatch { next: 0 });
        let stats = GrowthStats {
            branches_total: interpretation.segments.len(),
            ..GrowthStats::default()
        };

        Ok(Self {
            interpretation,
            timing: config.timing,
            mesh: config.mesh,
            bark: config.bark.clone(),
            leaves,
            rng,
            queue,
            next_frame: Vec::new(),
            root: None,
            clock: 0.0,
            phase: GrowthPhase::Branches,
            stats,
        })
    }

    pub fn phase(&self) -> GrowthPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == GrowthPhase::Complete
    }

    pub fn stats(&self) -> &GrowthStats {
        &self.stats
    }

    pub fn leaves(&self) -> &LeafBatcher {
        &self.leaves
    }

    /// Segments with `owner` filled in for every started branch.
    pub fn segments(&self) -> &[Segment] {
        &self.interpretation.segments
    }

    pub fn interpretation(&self) -> &Interpretation {
        &self.interpretation
    }

    /// Tasks waiting on a timer or the next frame.
    pub fn pending_tasks(&self) -> usize {
        self.queue.len() + self.next_frame.len()
    }

    /// Node every branch node is parented to, once the first frame ran.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Advance simulated time by `dt` seconds and run every task now due.
    pub fn advance(&mut self, dt: f32, host: &mut impl SceneHost) -> GrowthPhase {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let _span = tracing::debug_span!("advance", frame = self.stats.frames).entered();

        if self.root.is_none() {
            let root = host.create_node(None);
            host.set_transform(root, Transform::from_position(self.interpretation.origin));
            self.root = Some(root);
        }

        self.clock += dt;
        self.stats.frames += 1;
        self.stats.elapsed = self.clock;
        self.stats.last_frame = dt;

        for task in std::mem::take(&mut self.next_frame) {
            self.queue.push(self.clock, task);
        }

        while let Some(Scheduled {
            resume_at,
            mut task,
            ..
        }) = self.queue.pop_due(self.clock)
        {
            match self.step(&mut task, resume_at, host) {
                Wait::Seconds(delay) => self.queue.push(resume_at + delay.max(0.0), task),
                Wait::NextFrame => self.next_frame.push(task),
                Wait::Done => {}
            }
        }
        self.phase
    }

    /// Advance in fixed `frame_dt` steps until growth completes.
    pub fn run_to_completion(
        &mut self,
        frame_dt: f32,
        host: &mut impl SceneHost,
    ) -> &GrowthStats {
        let frame_dt = if frame_dt >= MIN_FRAME_DT {
            frame_dt
        } else {
            tracing::warn!(frame_dt, min = MIN_FRAME_DT, "frame step raised to minimum");
            MIN_FRAME_DT
        };
        while !self.is_complete() {
            self.advance(frame_dt, host);
        }
        &self.stats
    }

    fn step(&mut self, task: &mut Task, at: f32, host: &mut impl SceneHost) -> Wait {
        match task {
            Task::Dispatch { next } => self.dispatch(next, at, host),
            Task::GrowBranch {
                node,
                offset,
                started_at,
                duration,
                settle,
                stage,
            } => match stage {
                BranchStage::Growing => {
                    let progress = ((at - *started_at) / *duration).min(1.0);
                    let scale = smoothstep(progress);
                    host.set_transform(
                        *node,
                        Transform::from_position(*offset).with_uniform_scale(scale),
                    );
                    if progress < 1.0 {
                        return Wait::NextFrame;
                    }
                    *stage = BranchStage::Settling;
                    Wait::Seconds(*settle)
                }
                BranchStage::Settling => {
                    self.stats.active_branches -= 1;
                    self.stats.branches_completed += 1;
                    Wait::Done
                }
            },
            Task::SpawnLeaves { next } => self.spawn_cluster(next),
        }
    }

    fn dispatch(&mut self, next: &mut usize, at: f32, host: &mut impl SceneHost) -> Wait {
        let total = self.interpretation.segments.len();
        if *next >= total {
            if self.stats.active_branches > 0 {
                return Wait::NextFrame;
            }
            tracing::info!(branches = total, elapsed = at, "branches complete");
            self.phase = GrowthPhase::Leaves;
            self.queue.push(at, Task::SpawnLeaves { next: 0 });
            return Wait::Done;
        }
        if self.stats.active_branches >= self.timing.parallel_branches as usize {
            return Wait::NextFrame;
        }

        let task = self.start_branch(*next, at, host);
        self.queue.push(at, task);
        *next += 1;

        let overlap = in_range(&mut self.rng, self.timing.overlap_jitter);
        Wait::Seconds(self.timing.branch_overlap_delay * overlap)
    }

    /// Create the node and mesh for segment `index` and return its animation task.
    fn start_branch(&mut self, index: usize, at: f32, host: &mut impl SceneHost) -> Task {
        let origin = self.interpretation.origin;
        let segment = self.interpretation.segments[index];
        let share = self.timing.total_growth_time / self.stats.branches_total.max(1) as f32;
        let duration = share * in_range(&mut self.rng, self.timing.duration_jitter);
        let settle = in_range(&mut self.rng, self.timing.settle_delay);
        let material = self.bark.pick(&mut self.rng);

        let spec = TubeSpec {
            start: Vec3::ZERO,
            control: segment.control - segment.start,
            end: segment.end - segment.start,
            base_width: segment.thickness,
            base_height: origin.y - segment.start.y,
            max_height: self.interpretation.max_height - segment.start.y,
            curve_segments: self.mesh.curve_segments,
            radial_segments: self.mesh.radial_segments,
        };

        let node = host.create_node(self.root);
        let offset = segment.start - origin;
        host.attach_mesh(node, build_tube_mesh(&spec), material);
        host.set_transform(node, Transform::from_position(offset).with_uniform_scale(0.0));
        self.interpretation.segments[index].owner = Some(node);

        self.stats.branches_started += 1;
        self.stats.active_branches += 1;
        self.stats.peak_active_branches = self
            .stats
            .peak_active_branches
            .max(self.stats.active_branches);
        tracing::trace!(index, node = node.0, duration, "branch started");

        Task::GrowBranch {
            node,
            offset,
            started_at: at,
            duration: duration.max(f32::EPSILON),
            settle,
            stage: BranchStage::Growing,
        }
    }

    fn spawn_cluster(&mut self, next: &mut usize) -> Wait {
        let Some(anchor) = self.interpretation.anchors.get(*next).copied() else {
            self.finish();
            return Wait::Done;
        };
        let count = in_range_u32(&mut self.rng, self.timing.leaves_per_cluster) as usize;
        let placed = self.leaves.add_leaf_cluster(
            anchor.position,
            anchor.direction,
            count,
            &self.timing.leaf_spread,
        );
        self.stats.clusters_spawned += 1;
        self.stats.leaves_spawned += placed;
        *next += 1;

        if *next < self.interpretation.anchors.len() {
            Wait::Seconds(self.timing.leaf_cluster_stagger)
        } else {
            self.finish();
            Wait::Done
        }
    }

    fn finish(&mut self) {
        self.phase = GrowthPhase::Complete;
        tracing::info!(
            branches = self.stats.branches_completed,
            clusters = self.stats.clusters_spawned,
            leaves = self.leaves.leaf_count(),
            batches = self.leaves.batch_count(),
            elapsed = self.clock,
            "growth complete"
        );
    }
}
