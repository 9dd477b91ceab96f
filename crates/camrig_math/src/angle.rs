//! Angle helpers and the scalar filters the camera stick is built from.
//!
//! All angles are in degrees.

use crate::interpolate::Interpolate;

/// Clamp `x` into `[-amplitude, amplitude]`, keeping its sign on overflow.
///
/// `amplitude` is expected to be non-negative.
pub fn clamp_signed(x: f32, amplitude: f32) -> f32 {
    clamp_signed_flagged(x, amplitude).0
}

/// Same as [`clamp_signed`], also reporting whether the value was clamped.
pub fn clamp_signed_flagged(x: f32, amplitude: f32) -> (f32, bool) {
    if x.abs() > amplitude {
        (amplitude.copysign(x), true)
    } else {
        (x, false)
    }
}

/// Map an angle from `[-360, 360]` into `(-180, 180]`.
///
/// Idempotent; inputs already inside the half range are returned unchanged
/// except `-180`, which maps to `180`.
pub fn normalize_half_range(angle: f32) -> f32 {
    let mut angle = angle;
    if angle.abs() > 180.0 {
        angle -= 360.0_f32.copysign(angle);
    }
    if angle == -180.0 {
        angle = 180.0;
    }
    angle
}

/// Representation of `b` (`b` or `b ± 360`) closest to `a`.
///
/// Both inputs are expected in `[-180, 180]`. The result satisfies
/// `|result - a| <= |b - a|` and is congruent to `b` modulo 360, so an
/// interpolation from `a` to the result never goes the long way around.
pub fn nearest_equivalent(a: f32, b: f32) -> f32 {
    let delta = b - a;
    let delta_rev = delta + 360.0_f32.copysign(a);

    if delta_rev.abs() < delta.abs() {
        delta_rev + a
    } else {
        b
    }
}

/// One step of a discrete RC low-pass filter: `y + alpha * (x - y)`.
///
/// `alpha = 0` freezes the output, `alpha = 1` passes `x` through.
pub fn low_pass<T: Interpolate>(x: T, y_prev: T, alpha: f32) -> T {
    y_prev.lerp(&x, alpha)
}

/// Cosine of an angle in degrees
pub fn deg_cos(deg: f32) -> f32 {
    deg.to_radians().cos()
}

/// Arc cosine in degrees; the argument is clamped into `[-1, 1]`.
pub fn deg_acos(x: f32) -> f32 {
    x.clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;

    #[test]
    fn test_clamp_signed_keeps_sign() {
        assert_eq!(clamp_signed(5.0, 3.0), 3.0);
        assert_eq!(clamp_signed(-5.0, 3.0), -3.0);
        assert_eq!(clamp_signed(2.0, 3.0), 2.0);
        assert_eq!(clamp_signed_flagged(-4.0, 1.0), (-1.0, true));
        assert_eq!(clamp_signed_flagged(0.5, 1.0), (0.5, false));
    }

    #[test]
    fn test_normalize_half_range_range_and_idempotence() {
        let mut angle = -360.0_f32;
        while angle <= 360.0 {
            let once = normalize_half_range(angle);
            assert!(once > -180.0 && once <= 180.0, "{angle} -> {once}");
            assert_eq!(normalize_half_range(once), once);
            angle += 7.5;
        }

        assert_eq!(normalize_half_range(190.0), -170.0);
        assert_eq!(normalize_half_range(-190.0), 170.0);
        assert_eq!(normalize_half_range(-180.0), 180.0);
        assert_eq!(normalize_half_range(180.0), 180.0);
    }

    #[test]
    fn test_nearest_equivalent_short_path() {
        assert_eq!(nearest_equivalent(170.0, -170.0), 190.0);
        assert_eq!(nearest_equivalent(-170.0, 170.0), -190.0);
        assert_eq!(nearest_equivalent(10.0, 20.0), 20.0);

        let mut a = -180.0_f32;
        while a <= 180.0 {
            let mut b = -180.0_f32;
            while b <= 180.0 {
                let r = nearest_equivalent(a, b);
                assert!((r - a).abs() <= (b - a).abs() + 1e-4, "a={a} b={b} r={r}");
                let k = (r - b) / 360.0;
                assert!((k - k.round()).abs() < 1e-5, "a={a} b={b} r={r}");
                b += 15.0;
            }
            a += 15.0;
        }
    }

    #[test]
    fn test_low_pass_bounds() {
        assert_eq!(low_pass(10.0_f32, 2.0, 0.0), 2.0);
        assert_eq!(low_pass(10.0_f32, 2.0, 1.0), 10.0);

        for i in 0..=10 {
            let alpha = i as f32 / 10.0;
            let y = low_pass(10.0_f32, 2.0, alpha);
            assert!((2.0..=10.0).contains(&y));
        }

        let v = low_pass(Vec3::new(4.0, 0.0, 0.0), Vec3::ZERO, 0.5);
        assert_eq!(v, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_deg_acos_scenario() {
        let limit = deg_acos(20.0 / 500.0);
        assert!((limit - 87.7076).abs() < 1e-3);
        assert_eq!(deg_acos(2.0), 0.0);
    }
}
