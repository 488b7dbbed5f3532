use std::f64::consts::PI;

use nalgebra::{Point2, Rotation2, Translation2};

pub type Point = Point2<f64>;

/// Arc length travelled along the outer circle per simulation step.
pub const STEP_LENGTH: f64 = 10.0;
pub const CURVE_POINTS: usize = 20_000;
pub const CIRCLE_SECTIONS: usize = 200;

pub const RADIUS_STEP: u32 = 5;
pub const MIN_INNER_RADIUS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircleSpec {
    pub radius: u32,
}

impl CircleSpec {
    pub fn new(radius: u32) -> CircleSpec {
        CircleSpec { radius }
    }
}

/// Angular deltas of one rolling step: the orbit of the inner centre around the
/// origin and the inner circle's own spin (negative, it rolls inside).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularStep {
    pub outer: f64,
    pub inner: f64,
}

impl AngularStep {
    pub fn new(outer_radius: u32, inner_radius: u32) -> AngularStep {
        AngularStep {
            outer: STEP_LENGTH / outer_radius as f64,
            inner: -STEP_LENGTH / inner_radius as f64,
        }
    }
}

/// Closed line strip approximating the unit circle.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleOutline(Vec<Point>);

impl CircleOutline {
    pub fn points(&self) -> &[Point] {
        &self.0
    }
}

/// The full hypotrochoid for one (R, r) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CurvePath(Vec<Point>);

impl CurvePath {
    pub fn points(&self) -> &[Point] {
        &self.0
    }
}

pub fn generate_circle_outline() -> CircleOutline {
    let rotate = Rotation2::new(PI / CIRCLE_SECTIONS as f64);
    let mut point = Point::new(1.0, 0.0);

    let mut points = Vec::with_capacity(2 * CIRCLE_SECTIONS + 1);
    for _ in 0..=2 * CIRCLE_SECTIONS {
        points.push(point);
        point = rotate * point;
    }

    CircleOutline(points)
}

/// Starting pose of the inner circle: its centre and the seed point halfway
/// along its radius, both on the positive x axis.
pub fn initial_pose(outer_radius: u32, inner_radius: u32) -> (Point, Point) {
    let outer = outer_radius as f64;
    let inner = inner_radius as f64;
    (
        Point::new(outer - inner, 0.0),
        Point::new(outer - inner / 2.0, 0.0),
    )
}

pub fn generate_hypotrochoid_path(outer_radius: u32, inner_radius: u32) -> CurvePath {
    let step = AngularStep::new(outer_radius, inner_radius);
    let (mut center, mut seed) = initial_pose(outer_radius, inner_radius);

    let mut points = Vec::with_capacity(CURVE_POINTS);
    while points.len() < CURVE_POINTS {
        points.push(seed);
        seed = double_rotate(&center, &seed, step);
        center = orbit(&center, step.outer);
    }

    CurvePath(points)
}

/// Rotates `point` about the origin.
pub fn orbit(point: &Point, angle: f64) -> Point {
    Rotation2::new(angle) * *point
}

/// Translation moving `center` onto the origin.
pub fn centering(center: &Point) -> Translation2<f64> {
    Translation2::new(-center.x, -center.y)
}

/// Advances the seed `sp` of an inner circle centred at `cp` by one rolling
/// step and returns the new seed position.
///
/// Both points are first carried around the origin by `step.outer`; then the
/// pair is moved so the centre sits on the origin, spun by `step.inner`, and
/// moved back. The path generator and the animation both go through here.
pub fn double_rotate(cp: &Point, sp: &Point, step: AngularStep) -> Point {
    let cp = orbit(cp, step.outer);
    let sp = orbit(sp, step.outer);

    let to_origin = centering(&cp);
    let spun = Rotation2::new(step.inner) * (to_origin * sp);

    to_origin.inverse() * spun
}

/// Owns both circles and the meshes derived from them.
#[derive(Debug, Clone)]
pub struct GeometryEngine {
    outer: CircleSpec,
    inner: CircleSpec,
    outline: CircleOutline,
    curve: CurvePath,
}

impl GeometryEngine {
    /// Radii must already satisfy `MIN_INNER_RADIUS <= inner <= outer`.
    pub fn new(outer: CircleSpec, inner: CircleSpec) -> GeometryEngine {
        GeometryEngine {
            outer,
            inner,
            outline: generate_circle_outline(),
            curve: generate_hypotrochoid_path(outer.radius, inner.radius),
        }
    }

    pub fn outer(&self) -> CircleSpec {
        self.outer
    }

    pub fn inner(&self) -> CircleSpec {
        self.inner
    }

    pub fn step(&self) -> AngularStep {
        AngularStep::new(self.outer.radius, self.inner.radius)
    }

    pub fn initial_pose(&self) -> (Point, Point) {
        initial_pose(self.outer.radius, self.inner.radius)
    }

    pub fn outline(&self) -> &CircleOutline {
        &self.outline
    }

    pub fn curve(&self) -> &CurvePath {
        &self.curve
    }

    pub fn accepts_inner_radius(&self, radius: i64) -> bool {
        radius >= MIN_INNER_RADIUS as i64 && radius <= self.outer.radius as i64
    }

    /// Swaps in a new inner radius and rebuilds both meshes before returning.
    pub fn set_inner(&mut self, inner: CircleSpec) {
        self.inner = inner;
        self.outline = generate_circle_outline();
        self.curve = generate_hypotrochoid_path(self.outer.radius, self.inner.radius);
    }
}
