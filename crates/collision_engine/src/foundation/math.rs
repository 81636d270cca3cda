//! Math utilities and types
//!
//! Provides the 2D vector type used by the geometry and spatial modules.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Component-wise minimum of two vectors
pub fn component_min(a: Vec2, b: Vec2) -> Vec2 {
    a.inf(&b)
}

/// Component-wise maximum of two vectors
pub fn component_max(a: Vec2, b: Vec2) -> Vec2 {
    a.sup(&b)
}

/// Component-wise absolute value
pub fn component_abs(v: Vec2) -> Vec2 {
    v.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_min_max() {
        let a = Vec2::new(1.0, 5.0);
        let b = Vec2::new(3.0, -2.0);

        assert_eq!(component_min(a, b), Vec2::new(1.0, -2.0));
        assert_eq!(component_max(a, b), Vec2::new(3.0, 5.0));
    }

    #[test]
    fn test_component_abs() {
        assert_eq!(component_abs(Vec2::new(-4.0, 2.5)), Vec2::new(4.0, 2.5));
    }
}
