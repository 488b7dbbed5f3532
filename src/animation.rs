use crate::geometry::{double_rotate, orbit, GeometryEngine, Point};

/// Pose of the inner circle at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingFrame {
    pub center: Point,
    pub seed: Point,
    pub orbit_angle: f64,
    pub roll_angle: f64,
}

/// Live angles plus the checkpoint taken when the inner radius changes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AngleAccumulators {
    pub orbit: f64,
    pub roll: f64,
    pub saved_orbit: f64,
    pub saved_roll: f64,
}

#[derive(Debug, Clone)]
pub struct AnimationState {
    angles: AngleAccumulators,
    steps: u64,
    saved_steps: u64,
    center: Point,
    seed: Point,
    last_replay: u64,
    drawn: RollingFrame,
}

impl AnimationState {
    pub fn new(engine: &GeometryEngine) -> AnimationState {
        let (center, seed) = engine.initial_pose();
        AnimationState {
            angles: AngleAccumulators::default(),
            steps: 0,
            saved_steps: 0,
            center,
            seed,
            last_replay: 0,
            drawn: RollingFrame {
                center,
                seed,
                orbit_angle: 0.0,
                roll_angle: 0.0,
            },
        }
    }

    pub fn angles(&self) -> &AngleAccumulators {
        &self.angles
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn saved_steps(&self) -> u64 {
        self.saved_steps
    }

    /// Number of steps replayed by the last `advance_one_step` to catch up
    /// with the checkpoint. Zero unless the radius changed just before.
    pub fn last_replay_steps(&self) -> u64 {
        self.last_replay
    }

    /// The pose produced by the last `advance_one_step`. A checkpoint does
    /// not move it; the rewound pose only shows up after the next step.
    pub fn current_frame(&self) -> RollingFrame {
        self.drawn
    }

    /// Moves the simulation one step forward.
    ///
    /// If a checkpoint is pending the pose is first replayed, without
    /// producing frames, from the canonical start up to the checkpoint using
    /// the engine's current radii.
    pub fn advance_one_step(&mut self, engine: &GeometryEngine) -> RollingFrame {
        let mut replayed = 0;
        while self.steps < self.saved_steps {
            self.step_once(engine);
            replayed += 1;
        }
        self.last_replay = replayed;

        self.step_once(engine);

        let step = engine.step();
        self.saved_steps = self.steps;
        self.angles.saved_orbit += step.outer;
        self.angles.saved_roll += step.inner;

        self.drawn = RollingFrame {
            center: self.center,
            seed: self.seed,
            orbit_angle: self.angles.orbit,
            roll_angle: self.angles.roll,
        };
        self.drawn
    }

    /// Records the current phase and rewinds to the canonical start pose of
    /// `engine`, which must already hold the new radii.
    pub fn checkpoint(&mut self, engine: &GeometryEngine) {
        self.angles.saved_orbit = self.angles.orbit;
        self.angles.saved_roll = self.angles.roll;
        self.saved_steps = self.steps;

        self.angles.orbit = 0.0;
        self.angles.roll = 0.0;
        self.steps = 0;

        let (center, seed) = engine.initial_pose();
        self.center = center;
        self.seed = seed;
    }

    fn step_once(&mut self, engine: &GeometryEngine) {
        let step = engine.step();

        self.seed = double_rotate(&self.center, &self.seed, step);
        self.center = orbit(&self.center, step.outer);

        self.angles.orbit += step.outer;
        self.angles.roll += step.inner;
        self.steps += 1;
    }
}
