use rand::prelude::*;
use std::cell::Cell;
use std::f32::consts::PI;
use std::rc::Rc;

/// Branch probability while a lineage is still young.
pub const EAGER_BRANCH_RATE: f64 = 0.8;
/// Branch probability once a lineage has passed MIN_BRANCH segments.
pub const STEADY_BRANCH_RATE: f64 = 0.5;
/// Segment count below which a lineage keeps branching eagerly.
pub const MIN_BRANCH: u32 = 30;
/// Half-width of the random fan a child angle is drawn from (15 degrees).
pub const CONE_WIDTH: f32 = 15.0 * PI / 180.0;
/// Upper bound on a single segment's length, in canvas units.
pub const MAX_SEGMENT_LEN: f32 = 6.0;
/// How far past the canvas edge a branch may wander before it is pruned.
pub const OUT_OF_BOUNDS_MARGIN: f32 = 100.0;
/// Canvases narrower than this get one seed per edge instead of two.
pub const NARROW_VIEWPORT: f32 = 500.0;
/// Probability that a pending step is deferred one more tick unexecuted.
pub const DEFER_RATE: f64 = 0.5;
/// Minimum time between processed frames (30 Hz cadence).
pub const FRAME_INTERVAL_MS: u64 = 1000 / 30;

/// Canvas extent in virtual units. One terminal cell spans 5x10 units; the
/// tuning constants above are expressed in the same units.
#[derive(Clone, Copy)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True once a point is outside the canvas by more than the prune margin.
    fn past_margin(&self, x: f32, y: f32) -> bool {
        x < -OUT_OF_BOUNDS_MARGIN
            || y < -OUT_OF_BOUNDS_MARGIN
            || x > self.width + OUT_OF_BOUNDS_MARGIN
            || y > self.height + OUT_OF_BOUNDS_MARGIN
    }
}

/// One line segment produced by an executed step, in canvas units.
#[derive(Clone, Copy, Debug)]
pub struct Segment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// A deferred growth step: origin, heading, and the segment counter shared by
/// every step descended from the same seed.
pub struct GrowthStep {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub counter: Rc<Cell<u32>>,
}

impl GrowthStep {
    fn new(x: f32, y: f32, angle: f32) -> Self {
        Self {
            x,
            y,
            angle,
            counter: Rc::new(Cell::new(0)),
        }
    }

    fn child(&self, x: f32, y: f32, angle: f32) -> Self {
        Self {
            x,
            y,
            angle,
            counter: Rc::clone(&self.counter),
        }
    }
}

/// Branch probability for the current lineage depth.
pub(crate) fn branch_rate(counter: u32) -> f64 {
    if counter <= MIN_BRANCH {
        EAGER_BRANCH_RATE
    } else {
        STEADY_BRANCH_RATE
    }
}

/// Executes growth steps against a bounded canvas. All randomness flows
/// through the one seeded rng so a given seed always grows the same plum.
pub struct Grower {
    rng: StdRng,
    bounds: Bounds,
}

impl Grower {
    pub fn new(seed: u64, bounds: Bounds) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            bounds,
        }
    }

    /// Initial steps: two per edge at random heights in the middle 60% of the
    /// canvas, growing inward. Narrow canvases keep one seed per side.
    pub fn seeds(&mut self) -> Vec<GrowthStep> {
        let mut seeds = Vec::with_capacity(4);
        for _ in 0..2 {
            let left_y = self.edge_height();
            seeds.push(GrowthStep::new(0.0, left_y, 0.0));
            let right_y = self.edge_height();
            seeds.push(GrowthStep::new(self.bounds.width, right_y, PI));
        }
        if self.bounds.width < NARROW_VIEWPORT {
            seeds.truncate(2);
        }
        seeds
    }

    fn edge_height(&mut self) -> f32 {
        let h = self.bounds.height;
        h * 0.2 + self.rng.gen_range(0.0..1.0) * h * 0.6
    }

    /// Run one step: emit its segment, bump the lineage counter, and enqueue
    /// surviving children onto `next`.
    pub fn execute(
        &mut self,
        step: &GrowthStep,
        next: &mut Vec<GrowthStep>,
        sink: &mut dyn FnMut(Segment),
    ) {
        let len = self.rng.gen_range(0.0..MAX_SEGMENT_LEN);
        let nx = step.x + len * step.angle.cos();
        let ny = step.y + len * step.angle.sin();

        sink(Segment {
            x1: step.x,
            y1: step.y,
            x2: nx,
            y2: ny,
        });

        step.counter.set(step.counter.get() + 1);

        if self.bounds.past_margin(nx, ny) {
            return;
        }

        let rate = branch_rate(step.counter.get());
        if self.rng.gen_bool(rate) {
            let spread = self.rng.gen_range(0.0..CONE_WIDTH);
            next.push(step.child(nx, ny, step.angle + spread));
        }
        if self.rng.gen_bool(rate) {
            let spread = self.rng.gen_range(0.0..CONE_WIDTH);
            next.push(step.child(nx, ny, step.angle - spread));
        }
    }

    fn should_defer(&mut self) -> bool {
        self.rng.gen_bool(DEFER_RATE)
    }
}

/// Generation-queue scheduler. Each tick drains the current queue; every
/// pending step is either deferred into the next queue or executed, and
/// execution only ever enqueues into the next queue, so no step re-enters its
/// own generation. A tick that starts empty finishes the animation.
pub struct Scheduler {
    queue: Vec<GrowthStep>,
    ticks: u64,
    finished: bool,
}

impl Scheduler {
    pub fn new(seeds: Vec<GrowthStep>) -> Self {
        Self {
            queue: seeds,
            ticks: 0,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Advance one generation. Returns false once the queue has drained.
    pub fn tick(&mut self, grower: &mut Grower, sink: &mut dyn FnMut(Segment)) -> bool {
        if self.finished {
            return false;
        }

        let previous = std::mem::take(&mut self.queue);
        if previous.is_empty() {
            self.finished = true;
            return false;
        }

        for step in previous {
            if grower.should_defer() {
                self.queue.push(step);
            } else {
                grower.execute(&step, &mut self.queue, sink);
            }
        }

        self.ticks += 1;
        true
    }
}

/// One live animation: grower plus scheduler, replaced wholesale on restart.
/// The epoch counts restarts; an old scheduler is dropped before its
/// replacement exists, so exactly one loop ever owns the canvas.
pub struct Animation {
    grower: Grower,
    scheduler: Scheduler,
    epoch: u32,
}

impl Animation {
    pub fn new(seed: u64, bounds: Bounds) -> Self {
        let mut grower = Grower::new(seed, bounds);
        let seeds = grower.seeds();
        Self {
            grower,
            scheduler: Scheduler::new(seeds),
            epoch: 1,
        }
    }

    /// Cancel the running animation and reseed against fresh bounds.
    pub fn restart(&mut self, seed: u64, bounds: Bounds) {
        let mut grower = Grower::new(seed, bounds);
        let seeds = grower.seeds();
        self.grower = grower;
        self.scheduler = Scheduler::new(seeds);
        self.epoch += 1;
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn is_finished(&self) -> bool {
        self.scheduler.is_finished()
    }

    pub fn ticks(&self) -> u64 {
        self.scheduler.ticks()
    }

    pub fn pending(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn tick(&mut self, sink: &mut dyn FnMut(Segment)) -> bool {
        self.scheduler.tick(&mut self.grower, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_bounds() -> Bounds {
        Bounds::new(600.0, 240.0)
    }

    fn narrow_bounds() -> Bounds {
        Bounds::new(400.0, 240.0)
    }

    #[test]
    fn branch_rate_decays_past_threshold() {
        assert_eq!(branch_rate(0), EAGER_BRANCH_RATE);
        assert_eq!(branch_rate(MIN_BRANCH), EAGER_BRANCH_RATE);
        assert_eq!(branch_rate(MIN_BRANCH + 1), STEADY_BRANCH_RATE);
        assert_eq!(branch_rate(1000), STEADY_BRANCH_RATE);
    }

    #[test]
    fn wide_canvas_gets_four_seeds() {
        let mut grower = Grower::new(7, wide_bounds());
        let seeds = grower.seeds();
        assert_eq!(seeds.len(), 4);
        assert_eq!(seeds.iter().filter(|s| s.angle == 0.0).count(), 2);
        assert_eq!(seeds.iter().filter(|s| s.angle == PI).count(), 2);
    }

    #[test]
    fn narrow_canvas_gets_one_seed_per_side() {
        let mut grower = Grower::new(7, narrow_bounds());
        let seeds = grower.seeds();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].angle, 0.0);
        assert_eq!(seeds[1].angle, PI);
    }

    #[test]
    fn seeds_start_in_middle_band() {
        let bounds = wide_bounds();
        let mut grower = Grower::new(123, bounds);
        for seed in grower.seeds() {
            assert!(seed.y >= bounds.height * 0.2);
            assert!(seed.y <= bounds.height * 0.8);
        }
    }

    #[test]
    fn step_past_margin_is_pruned() {
        let mut grower = Grower::new(1, narrow_bounds());
        let step = GrowthStep::new(-150.0, 10.0, PI);
        let mut next = Vec::new();
        let mut segments = Vec::new();
        grower.execute(&step, &mut next, &mut |s| segments.push(s));
        assert_eq!(segments.len(), 1, "the segment itself is still drawn");
        assert!(next.is_empty(), "no children past the margin");
    }

    #[test]
    fn children_share_the_lineage_counter() {
        // Each execution spawns at least one child with probability 0.96, so
        // some seed in 0..50 must branch; the loop keeps this deterministic.
        let mut found = false;
        for seed in 0..50 {
            let mut grower = Grower::new(seed, wide_bounds());
            let step = GrowthStep::new(300.0, 120.0, 0.0);
            let mut next = Vec::new();
            grower.execute(&step, &mut next, &mut |_| {});
            assert_eq!(step.counter.get(), 1);
            for child in &next {
                assert!(Rc::ptr_eq(&child.counter, &step.counter));
                found = true;
            }
            if found {
                break;
            }
        }
        assert!(found, "no seed in 0..50 produced a child");
    }

    #[test]
    fn counter_accumulates_across_a_lineage() {
        let mut grower = Grower::new(11, wide_bounds());
        let step = GrowthStep::new(300.0, 120.0, 0.0);
        let counter = Rc::clone(&step.counter);
        let mut queue = vec![step];
        let mut executed = 0u32;
        for _ in 0..6 {
            let previous = std::mem::take(&mut queue);
            for s in previous {
                grower.execute(&s, &mut queue, &mut |_| {});
                executed += 1;
            }
        }
        assert_eq!(counter.get(), executed);
    }

    #[test]
    fn animation_terminates_within_bounded_ticks() {
        let mut animation = Animation::new(42, narrow_bounds());
        let mut segments = 0usize;
        let mut ticks = 0u64;
        while animation.tick(&mut |_| segments += 1) {
            ticks += 1;
            assert!(ticks < 10_000, "scheduler failed to drain");
        }
        assert!(animation.is_finished());
        assert!(segments > 0);
    }

    #[test]
    fn finished_scheduler_stays_finished() {
        let mut animation = Animation::new(42, narrow_bounds());
        while animation.tick(&mut |_| {}) {}
        assert!(animation.is_finished());
        assert!(!animation.tick(&mut |_| {}));
        assert_eq!(animation.pending(), 0);
    }

    #[test]
    fn restart_leaves_exactly_one_live_scheduler() {
        let bounds = wide_bounds();
        let mut animation = Animation::new(42, bounds);
        for _ in 0..3 {
            animation.tick(&mut |_| {});
        }

        // Two back-to-back restarts before the first run completes.
        animation.restart(43, bounds);
        animation.restart(44, bounds);

        assert_eq!(animation.epoch(), 3);
        assert_eq!(animation.ticks(), 0);
        assert!(!animation.is_finished());
        assert_eq!(animation.pending(), 4, "fresh seeds only, no stale steps");
    }

    #[test]
    fn same_seed_grows_the_same_plum() {
        let bounds = wide_bounds();
        let collect = |seed: u64| {
            let mut animation = Animation::new(seed, bounds);
            let mut out: Vec<(i64, i64, i64, i64)> = Vec::new();
            while animation.tick(&mut |s| {
                out.push((
                    (s.x1 * 10.0) as i64,
                    (s.y1 * 10.0) as i64,
                    (s.x2 * 10.0) as i64,
                    (s.y2 * 10.0) as i64,
                ));
            }) {}
            out
        };
        assert_eq!(collect(9), collect(9));
        assert_ne!(collect(9), collect(10));
    }
}
