use tracing::{debug, info};

use crate::animation::{AngleAccumulators, AnimationState, RollingFrame};
use crate::error::SpirographError;
use crate::geometry::{
    CircleOutline, CircleSpec, CurvePath, GeometryEngine, MIN_INNER_RADIUS, RADIUS_STEP,
};

/// Everything the simulation owns. The viewer only ever borrows it.
#[derive(Debug, Clone)]
pub struct Spirograph {
    engine: GeometryEngine,
    animation: AnimationState,
    revision: u64,
}

impl Spirograph {
    pub fn new(outer_radius: u32, inner_radius: u32) -> Result<Spirograph, SpirographError> {
        if outer_radius < MIN_INNER_RADIUS {
            return Err(SpirographError::OuterRadius(outer_radius));
        }
        if inner_radius < MIN_INNER_RADIUS || inner_radius > outer_radius {
            return Err(SpirographError::InnerRadiusRange {
                inner: inner_radius,
                outer: outer_radius,
            });
        }
        if inner_radius % RADIUS_STEP != 0 {
            return Err(SpirographError::InnerRadiusStep(inner_radius));
        }

        let engine = GeometryEngine::new(CircleSpec::new(outer_radius), CircleSpec::new(inner_radius));
        let animation = AnimationState::new(&engine);

        Ok(Spirograph {
            engine,
            animation,
            revision: 0,
        })
    }

    /// Applies `delta` to the inner radius when the result stays within
    /// `MIN_INNER_RADIUS..=outer`; otherwise nothing changes. Returns whether
    /// the radius changed.
    pub fn request_radius_change(&mut self, delta: i32) -> bool {
        let current = self.engine.inner().radius;
        let target = current as i64 + delta as i64;
        if !self.engine.accepts_inner_radius(target) {
            debug!(current, delta, "ignoring inner radius change");
            return false;
        }

        self.engine.set_inner(CircleSpec::new(target as u32));
        self.animation.checkpoint(&self.engine);
        self.revision += 1;

        info!(from = current, to = target, "inner radius changed");
        true
    }

    pub fn on_radius_increase_requested(&mut self) -> bool {
        self.request_radius_change(RADIUS_STEP as i32)
    }

    pub fn on_radius_decrease_requested(&mut self) -> bool {
        self.request_radius_change(-(RADIUS_STEP as i32))
    }

    pub fn on_tick(&mut self) -> RollingFrame {
        self.animation.advance_one_step(&self.engine)
    }

    pub fn circle_outline(&self) -> &CircleOutline {
        self.engine.outline()
    }

    pub fn curve_path(&self) -> &CurvePath {
        self.engine.curve()
    }

    pub fn current_frame(&self) -> RollingFrame {
        self.animation.current_frame()
    }

    pub fn inner_radius(&self) -> u32 {
        self.engine.inner().radius
    }

    pub fn outer_radius(&self) -> u32 {
        self.engine.outer().radius
    }

    pub fn angles(&self) -> &AngleAccumulators {
        self.animation.angles()
    }

    pub fn steps(&self) -> u64 {
        self.animation.steps()
    }

    pub fn saved_steps(&self) -> u64 {
        self.animation.saved_steps()
    }

    pub fn last_replay_steps(&self) -> u64 {
        self.animation.last_replay_steps()
    }

    /// Bumped every time the meshes are rebuilt.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{generate_hypotrochoid_path, STEP_LENGTH};

    fn distance(a: &RollingFrame, b: &RollingFrame) -> f64 {
        (a.seed - b.seed).norm()
    }

    #[test]
    fn rejects_invalid_startup_radii() {
        assert!(matches!(Spirograph::new(4, 4), Err(SpirographError::OuterRadius(4))));
        assert!(matches!(
            Spirograph::new(400, 0),
            Err(SpirographError::InnerRadiusRange { inner: 0, outer: 400 })
        ));
        assert!(matches!(
            Spirograph::new(400, 405),
            Err(SpirographError::InnerRadiusRange { .. })
        ));
        assert!(matches!(
            Spirograph::new(400, 203),
            Err(SpirographError::InnerRadiusStep(203))
        ));
        assert!(Spirograph::new(400, 400).is_ok());
    }

    #[test]
    fn decrease_at_minimum_is_ignored() {
        let mut session = Spirograph::new(400, 5).unwrap();
        session.on_tick();
        let before = session.current_frame();

        assert!(!session.on_radius_decrease_requested());
        assert_eq!(session.inner_radius(), 5);
        assert_eq!(session.revision(), 0);
        assert_eq!(session.current_frame(), before);
    }

    #[test]
    fn increase_at_outer_radius_is_ignored() {
        let mut session = Spirograph::new(400, 400).unwrap();
        assert!(!session.request_radius_change(5));
        assert_eq!(session.inner_radius(), 400);
        assert_eq!(session.outer_radius(), 400);
    }

    #[test]
    fn increase_within_bounds_applies() {
        let mut session = Spirograph::new(400, 200).unwrap();
        assert!(session.on_radius_increase_requested());
        assert_eq!(session.inner_radius(), 205);
        assert_eq!(session.revision(), 1);
        assert_eq!(session.curve_path(), &generate_hypotrochoid_path(400, 205));
        assert_eq!(session.circle_outline().points().len(), 401);
    }

    #[test]
    fn radius_change_checkpoints_angles() {
        let mut session = Spirograph::new(400, 200).unwrap();
        for _ in 0..20 {
            session.on_tick();
        }
        let orbit = session.angles().orbit;

        session.on_radius_decrease_requested();

        assert_eq!(session.angles().orbit, 0.0);
        assert_eq!(session.angles().saved_orbit, orbit);
        assert_eq!(session.steps(), 0);
    }

    #[test]
    fn paused_radius_change_keeps_the_drawn_pose() {
        let mut session = Spirograph::new(400, 200).unwrap();
        for _ in 0..50 {
            session.on_tick();
        }
        let drawn = session.current_frame();

        assert!(session.on_radius_decrease_requested());
        assert_eq!(session.current_frame(), drawn);
        assert!(session.current_frame().orbit_angle > 0.0);
    }

    #[test]
    fn tracer_stays_continuous_across_a_radius_change() {
        let mut session = Spirograph::new(400, 200).unwrap();

        let mut previous = session.on_tick();
        for _ in 1..50 {
            let frame = session.on_tick();
            assert!(distance(&previous, &frame) <= STEP_LENGTH);
            previous = frame;
        }

        assert!(session.on_radius_decrease_requested());
        let resumed = session.on_tick();
        assert_eq!(session.last_replay_steps(), 50);

        // The drawn jump from the old seed is about 14 units here, because the
        // circle itself changed size. Continuity is measured against the new
        // curve at the orbital phase the old seed had reached.
        let curve = session.curve_path().points();
        assert_eq!(resumed.seed, curve[51]);
        assert!((resumed.seed - curve[50]).norm() <= STEP_LENGTH);
        assert!((resumed.orbit_angle - previous.orbit_angle - 0.025).abs() < 1e-12);

        previous = resumed;
        for _ in 0..50 {
            let frame = session.on_tick();
            assert_eq!(session.last_replay_steps(), 0);
            assert!(distance(&previous, &frame) <= STEP_LENGTH);
            previous = frame;
        }
    }
}
