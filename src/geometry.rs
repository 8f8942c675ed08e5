//! 2D path construction, polygon helpers and angle wrapping shared by the
//! simulators and the rasterizer.

use glam::Vec2;

/// One path segment, continuing from the previous end point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line(Vec2),
    /// Cubic Bézier: two control points then the end point
    Cubic(Vec2, Vec2, Vec2),
}

/// Single-contour path
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub start: Vec2,
    pub segments: Vec<Segment>,
    pub closed: bool,
}

/// Subdivisions per cubic when flattening
const CUBIC_STEPS: usize = 12;

impl Path {
    pub fn new(start: Vec2) -> Self {
        Self {
            start,
            segments: Vec::new(),
            closed: false,
        }
    }

    pub fn line_to(&mut self, to: Vec2) -> &mut Self {
        self.segments.push(Segment::Line(to));
        self
    }

    pub fn cubic_to(&mut self, c1: Vec2, c2: Vec2, to: Vec2) -> &mut Self {
        self.segments.push(Segment::Cubic(c1, c2, to));
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.closed = true;
        self
    }

    /// Closed polygon through the given points
    pub fn polygon(points: &[Vec2]) -> Self {
        let mut path = Path::new(points.first().copied().unwrap_or(Vec2::ZERO));
        for &p in points.iter().skip(1) {
            path.line_to(p);
        }
        path.close();
        path
    }

    /// Smooth curve through `points` using Catmull-Rom tangents.
    ///
    /// Each interior tangent comes from the neighbouring samples; the end
    /// points reuse themselves as the missing neighbour.
    pub fn catmull_rom(points: &[Vec2]) -> Self {
        let mut path = Path::new(points.first().copied().unwrap_or(Vec2::ZERO));
        if points.len() < 2 {
            return path;
        }
        let last = points.len() - 1;
        for i in 0..last {
            let p0 = points[i.saturating_sub(1)];
            let p1 = points[i];
            let p2 = points[i + 1];
            let p3 = points[(i + 2).min(last)];
            let c1 = p1 + (p2 - p0) / 6.0;
            let c2 = p2 - (p3 - p1) / 6.0;
            path.cubic_to(c1, c2, p2);
        }
        path
    }

    /// Point the path currently ends at
    pub fn end(&self) -> Vec2 {
        match self.segments.last() {
            Some(Segment::Line(p)) | Some(Segment::Cubic(_, _, p)) => *p,
            None => self.start,
        }
    }

    /// Approximate the path with straight edges
    pub fn flatten(&self) -> Vec<Vec2> {
        let mut out = Vec::with_capacity(1 + self.segments.len() * CUBIC_STEPS);
        out.push(self.start);
        let mut current = self.start;
        for segment in &self.segments {
            match *segment {
                Segment::Line(to) => {
                    out.push(to);
                    current = to;
                }
                Segment::Cubic(c1, c2, to) => {
                    for step in 1..=CUBIC_STEPS {
                        let t = step as f32 / CUBIC_STEPS as f32;
                        out.push(cubic_point(current, c1, c2, to, t));
                    }
                    current = to;
                }
            }
        }
        out
    }
}

fn cubic_point(p0: Vec2, c1: Vec2, c2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + c1 * (3.0 * u * u * t) + c2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

/// `phase * rate` reduced to one turn
///
/// Phases are kept in f64 and only the wrapped angle is handed to f32 trig,
/// so oscillations keep their resolution however long the clock has run.
pub fn cycle(phase: f64, rate: f32) -> f32 {
    (phase * rate as f64).rem_euclid(std::f64::consts::TAU) as f32
}

/// Outline of a rounded rectangle centred on the origin
pub fn rounded_rect(half_size: Vec2, radius: f32) -> Vec<Vec2> {
    const ARC_STEPS: usize = 4;
    let r = radius.clamp(0.0, half_size.x.min(half_size.y).max(0.0));
    let inner = half_size - Vec2::splat(r);
    // Corner centres in clockwise order (screen space), starting top-right
    let corners = [
        (Vec2::new(inner.x, -inner.y), -std::f32::consts::FRAC_PI_2),
        (Vec2::new(inner.x, inner.y), 0.0),
        (Vec2::new(-inner.x, inner.y), std::f32::consts::FRAC_PI_2),
        (Vec2::new(-inner.x, -inner.y), std::f32::consts::PI),
    ];
    let mut out = Vec::with_capacity(4 * (ARC_STEPS + 1));
    for (centre, start) in corners {
        for step in 0..=ARC_STEPS {
            let angle = start + std::f32::consts::FRAC_PI_2 * step as f32 / ARC_STEPS as f32;
            out.push(centre + Vec2::from_angle(angle) * r);
        }
    }
    out
}

/// Rotate by `angle` radians around the origin, then move to `origin`
pub fn place(points: &[Vec2], origin: Vec2, angle: f32) -> Vec<Vec2> {
    let rotation = Vec2::from_angle(angle);
    points.iter().map(|&p| origin + rotation.rotate(p)).collect()
}

/// Keep the part of a convex-or-not polygon where `y >= min_y`
/// (Sutherland-Hodgman against one half-plane)
pub fn clip_below(points: &[Vec2], min_y: f32) -> Vec<Vec2> {
    let mut out = Vec::with_capacity(points.len() + 2);
    if points.is_empty() {
        return out;
    }
    let inside = |p: Vec2| p.y >= min_y;
    let mut prev = points[points.len() - 1];
    for &curr in points {
        match (inside(prev), inside(curr)) {
            (true, true) => out.push(curr),
            (true, false) => out.push(intersect_y(prev, curr, min_y)),
            (false, true) => {
                out.push(intersect_y(prev, curr, min_y));
                out.push(curr);
            }
            (false, false) => {}
        }
        prev = curr;
    }
    out
}

fn intersect_y(a: Vec2, b: Vec2, y: f32) -> Vec2 {
    let t = (y - a.y) / (b.y - a.y);
    a.lerp(b, t)
}
