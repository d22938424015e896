//! 2-D vector math and the force laws shared by the simulation.

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).length()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<f64> for Vec2 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;

    fn div(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Pairwise repulsion acting on `a` (the negation acts on `b`). The force
/// falls off with `1 / distance`; coincident points use `min_distance_sq`
/// and push along the x axis so the pair always separates.
pub fn repulsion(a: Vec2, b: Vec2, strength: f64, min_distance_sq: f64) -> Vec2 {
    let mut delta = a - b;
    let mut dist_sq = delta.length_squared();
    if dist_sq == 0.0 {
        dist_sq = min_distance_sq;
        delta = Vec2::new(dist_sq.sqrt(), 0.0);
    }
    let dist = dist_sq.sqrt();
    let force = strength / dist;
    delta / dist * force
}

/// Spring pull between the endpoints of an edge, returned as the force along
/// `source - target` with magnitude `distance^2 / ideal`. Coincident
/// endpoints produce no force.
pub fn attraction(source: Vec2, target: Vec2, ideal: f64) -> Vec2 {
    let delta = source - target;
    let dist = delta.length();
    if dist == 0.0 || ideal <= 0.0 {
        return Vec2::ZERO;
    }
    let force = dist * dist / ideal;
    delta / dist * force
}

/// Weak spring toward `center`.
pub fn centering(position: Vec2, center: Vec2, strength: f64) -> Vec2 {
    (center - position) * strength
}

/// Moves a coordinate back toward `[min, max]` by `stiffness` of the
/// overshoot rather than clamping it.
pub fn soft_bound(value: f64, min: f64, max: f64, stiffness: f64) -> f64 {
    let mut value = value;
    if value < min {
        value += (min - value) * stiffness;
    }
    if value > max {
        value += (max - value) * stiffness;
    }
    value
}

pub fn damp(velocity: Vec2, damping: f64) -> Vec2 {
    velocity * damping
}

/// Characteristic inter-node distance for `count` nodes sharing a `width` by
/// `height` area. The `+ 1` keeps a lone node finite.
pub fn ideal_distance(width: f64, height: f64, count: usize, factor: f64) -> f64 {
    ((width * height) / (count as f64 + 1.0)).sqrt() * factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repulsion_pushes_points_apart() {
        let a = Vec2::new(10.0, 0.0);
        let b = Vec2::new(0.0, 0.0);
        let force = repulsion(a, b, 1200.0, 0.1);
        assert!(force.x > 0.0);
        assert_eq!(force.y, 0.0);
        assert!((force.x - 120.0).abs() < 1e-9);
    }

    #[test]
    fn repulsion_handles_coincident_points() {
        let p = Vec2::new(5.0, 5.0);
        let force = repulsion(p, p, 1200.0, 0.1);
        assert!(force.is_finite());
        assert!(force.length() > 0.0);
    }

    #[test]
    fn attraction_grows_with_distance() {
        let near = attraction(Vec2::new(10.0, 0.0), Vec2::ZERO, 100.0);
        let far = attraction(Vec2::new(20.0, 0.0), Vec2::ZERO, 100.0);
        assert!((near.x - 1.0).abs() < 1e-9);
        assert!((far.x - 4.0).abs() < 1e-9);
        assert_eq!(attraction(Vec2::ZERO, Vec2::ZERO, 100.0), Vec2::ZERO);
    }

    #[test]
    fn soft_bound_nudges_instead_of_clamping() {
        assert_eq!(soft_bound(30.0, 50.0, 350.0, 0.1), 32.0);
        assert_eq!(soft_bound(370.0, 50.0, 350.0, 0.1), 368.0);
        assert_eq!(soft_bound(100.0, 50.0, 350.0, 0.1), 100.0);
    }

    #[test]
    fn ideal_distance_shrinks_as_nodes_grow() {
        let few = ideal_distance(400.0, 400.0, 1, 0.9);
        let many = ideal_distance(400.0, 400.0, 15, 0.9);
        assert!(few > many);
        assert!((many - 90.0).abs() < 1e-9);
    }
}
