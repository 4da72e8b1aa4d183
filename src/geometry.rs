//! Screen-space points and vectors used by the drag monitor

use serde::{Deserialize, Serialize};

/// A location in global screen coordinates (points)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `other` to `self`
    pub fn delta_from(self, other: Point) -> Vector {
        Vector {
            dx: self.x - other.x,
            dy: self.y - other.y,
        }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        self.delta_from(other).length()
    }
}

/// A displacement between two points
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
}

impl Vector {
    pub fn length(self) -> f64 {
        self.dx.hypot(self.dy)
    }

    /// Unit vector in the same direction, or `None` for a zero vector
    pub fn normalized(self) -> Option<Vector> {
        let len = self.length();
        if len <= f64::EPSILON {
            return None;
        }
        Some(Vector {
            dx: self.dx / len,
            dy: self.dy / len,
        })
    }

    pub fn dot(self, other: Vector) -> f64 {
        self.dx * other.dx + self.dy * other.dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(b.distance_to(a), 5.0);
    }

    #[test]
    fn test_opposite_directions_have_negative_dot() {
        let right = Vector { dx: 10.0, dy: 0.0 }.normalized().unwrap();
        let left = Vector { dx: -4.0, dy: 1.0 }.normalized().unwrap();
        assert!(right.dot(left) < -0.9);
    }

    #[test]
    fn test_zero_vector_has_no_direction() {
        assert!(Vector::default().normalized().is_none());
    }
}
