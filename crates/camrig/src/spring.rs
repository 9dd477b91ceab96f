//! Acceleration-driven camera shift
//!
//! The rest point is the spring's equilibrium. Whenever it accelerates, the
//! camera is pushed the opposite way and then eased back, which makes the
//! camera lag behind starts and overshoot stops.

use crate::config::SpringSettings;
use camrig_math::{low_pass, Transform, Vec3};

/// Filter state carried between frames
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpringState {
    /// Rest point world position last frame
    pub rest_position: Vec3,
    /// Rest point world velocity last frame
    pub rest_velocity: Vec3,
    /// Filtered per-frame increment of the offset
    pub shift_step: Vec3,
    /// Spring-smoothed camera offset in the rest point frame
    pub fake_offset: Vec3,
}

/// Converts rest point acceleration into a smoothed camera offset
#[derive(Clone, Debug, Default)]
pub struct SpringShiftFilter {
    state: SpringState,
}

impl SpringShiftFilter {
    pub fn new(rest_position: Vec3) -> Self {
        let mut filter = Self::default();
        filter.reset(rest_position);
        filter
    }

    /// Forget all motion history, treating `rest_position` as the resting place
    pub fn reset(&mut self, rest_position: Vec3) {
        self.state = SpringState {
            rest_position,
            ..SpringState::default()
        };
    }

    pub fn state(&self) -> &SpringState {
        &self.state
    }

    /// Current offset without advancing the filter
    pub fn fake_offset(&self) -> Vec3 {
        self.state.fake_offset
    }

    /// Advance one frame and return the new offset in the rest point frame.
    ///
    /// `dt` must be positive and finite; anything else leaves the state
    /// untouched and returns the previous offset.
    pub fn update(&mut self, dt: f32, rest_world: &Transform, settings: &SpringSettings) -> Vec3 {
        if !(dt > 0.0 && dt.is_finite()) {
            return self.state.fake_offset;
        }

        let s = &mut self.state;

        let rest_now = rest_world.translation;
        let velocity = (rest_now - s.rest_position) / dt;
        let accel = ((s.rest_velocity - velocity) / (dt * settings.stiffness()))
            .clamped_to_max_length(settings.max_shift());

        s.rest_position = rest_now;
        s.rest_velocity = velocity;

        let accel = rest_world.inverse_transform_vector(accel);

        // Second-order low pass; the gain is capped so large steps stay stable
        let gain = (dt / settings.damping()).min(1.0);
        s.shift_step = low_pass((accel - s.fake_offset) * gain, s.shift_step, settings.alpha());
        s.fake_offset += s.shift_step;

        s.fake_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camrig_math::Rotator;

    const DT: f32 = 1.0 / 60.0;

    fn at(x: f32) -> Transform {
        Transform::from_translation(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_rejects_bad_dt() {
        let settings = SpringSettings::default();
        let mut filter = SpringShiftFilter::new(Vec3::ZERO);
        filter.state.fake_offset = Vec3::new(3.0, 0.0, 0.0);
        let before = *filter.state();

        for dt in [0.0, -0.1, f32::NAN, f32::INFINITY] {
            let out = filter.update(dt, &at(100.0), &settings);
            assert_eq!(out, Vec3::new(3.0, 0.0, 0.0));
            assert_eq!(*filter.state(), before);
        }
    }

    #[test]
    fn test_stationary_target_settles() {
        for (stiffness, damping) in [(10.0, 0.33), (0.5, 0.01), (1e-6, 1e-6), (200.0, 5.0)] {
            let mut settings = SpringSettings::default();
            settings.set_stiffness(stiffness);
            settings.set_damping(damping);

            let mut filter = SpringShiftFilter::new(Vec3::ZERO);
            filter.state.fake_offset = Vec3::new(40.0, -25.0, 10.0);

            let rest = at(0.0);
            let mut out = Vec3::ZERO;
            for _ in 0..6000 {
                out = filter.update(DT, &rest, &settings);
            }
            assert!(out.length() < 1e-3, "stiffness={stiffness} damping={damping}: {out:?}");
        }
    }

    #[test]
    fn test_acceleration_pushes_camera_back() {
        let settings = SpringSettings::default();
        let mut filter = SpringShiftFilter::new(Vec3::ZERO);

        // Start moving along +X at 600 units/s
        let mut x = 0.0;
        let mut out = Vec3::ZERO;
        for _ in 0..10 {
            x += 10.0;
            out = filter.update(DT, &at(x), &settings);
        }
        assert!(out.x < 0.0, "camera should lag behind: {out:?}");
        assert!(out.y.abs() < 1e-6 && out.z.abs() < 1e-6);
    }

    #[test]
    fn test_shift_is_expressed_in_rest_frame() {
        let settings = SpringSettings::default();
        let mut filter = SpringShiftFilter::new(Vec3::ZERO);
        let yawed = Rotator::new(0.0, 90.0, 0.0);

        // World motion along +Y is local +X for a rest point yawed by 90
        let mut out = Vec3::ZERO;
        for i in 1..=10 {
            let rest = Transform::from_parts(Vec3::new(0.0, i as f32 * 10.0, 0.0), yawed);
            out = filter.update(DT, &rest, &settings);
        }
        assert!(out.x < 0.0);
        assert!(out.y.abs() < 1e-4);
    }

    #[test]
    fn test_zero_alpha_freezes_offset() {
        let mut settings = SpringSettings::default();
        settings.set_alpha(0.0);

        let mut filter = SpringShiftFilter::new(Vec3::ZERO);
        for i in 1..=20 {
            filter.update(DT, &at(i as f32 * i as f32), &settings);
        }
        assert_eq!(filter.fake_offset(), Vec3::ZERO);
    }
}
