//! Interpolation primitives and easing curves

use crate::Vec3;

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl Interpolate for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::lerp(self, *other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.max_abs_diff(*other) < epsilon
    }
}

/// Ease-in-out curve mapping `t` in `[0, 1]` onto `[0, 1]`.
///
/// The first half accelerates as `t^exponent`, the second half mirrors it.
/// `exponent = 2` gives the quadratic curve used for preset transfers.
pub fn ease_in_out(t: f32, exponent: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        0.5 * (2.0 * t).powf(exponent)
    } else {
        1.0 - 0.5 * (2.0 - 2.0 * t).powf(exponent)
    }
}
