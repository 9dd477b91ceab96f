//! Boost/retard motion scheduling
//!
//! Bringing a body to rest at a given offset with a bounded acceleration is
//! done with two conjugate parabolas: full boost toward the goal until the
//! switch time, then full retard until the stop time. Re-planning every frame
//! with [`boost_retard`] turns the schedule into a closed-loop controller.

use crate::Vec3;

/// Two-parabola schedule for reaching a goal at rest
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TwoParabolas {
    /// Boost acceleration, signed toward the goal
    pub accel: f32,
    /// Seconds until the acceleration flips from boost to retard
    pub switch_time: f32,
    /// Seconds until the body comes to rest at the goal
    pub stop_time: f32,
}

impl TwoParabolas {
    /// Plan the schedule for an exact acceleration magnitude.
    ///
    /// `distance` is the offset from the current position to the goal and
    /// `approach_speed` the current velocity; a speed with the same sign as
    /// `distance` closes the gap. A negative switch time means the goal will
    /// be overshot even under immediate retard.
    ///
    /// Returns `None` for a zero or non-finite acceleration.
    pub fn plan(distance: f32, approach_speed: f32, accel: f32) -> Option<Self> {
        if !(accel.is_finite() && accel != 0.0) {
            return None;
        }

        let accel = accel.abs().copysign(distance);
        let t_comp = approach_speed / accel;
        let switch_time = (0.5 * t_comp * t_comp + distance / accel).sqrt() - t_comp;

        Some(Self {
            accel,
            switch_time,
            stop_time: 2.0 * switch_time + t_comp,
        })
    }

    /// Plan the schedule, easing the acceleration below `max_accel` so that
    /// short moves do not chatter at frame granularity `tick`.
    ///
    /// While closing in, the acceleration is cut to what the remaining
    /// distance needs with the switch at least two ticks away. While moving
    /// away, it is the value that keeps the switch exactly two ticks away.
    pub fn plan_eased(distance: f32, approach_speed: f32, max_accel: f32, tick: f32) -> Option<Self> {
        let switch = 2.0 * tick.abs();

        let eased = if distance.is_sign_negative() == approach_speed.is_sign_negative() {
            let ratio = approach_speed / distance;
            let factor = (0.5 * ratio * ratio).max(1.0 / (switch * switch));
            max_accel.abs().min((factor * distance).abs())
        } else {
            let lead = 2.0 * approach_speed * switch - distance;
            let switch_sq = 2.0 * switch * switch;
            let root = (lead * lead - approach_speed * approach_speed * switch_sq).sqrt();
            let optimal = (root.copysign(distance) - lead) / switch_sq;
            max_accel.abs().min(optimal.abs())
        };

        Self::plan(distance, approach_speed, eased)
    }

    /// Acceleration to apply `tick` seconds into the schedule
    pub fn accel_at(&self, tick: f32) -> f32 {
        if !(self.stop_time >= tick) {
            0.0
        } else if self.switch_time > tick {
            self.accel
        } else {
            -self.accel
        }
    }
}

/// Acceleration for this frame that brings a body to rest `distance` away.
///
/// Zero once the body is at rest on the goal.
pub fn boost_retard(distance: f32, approach_speed: f32, max_accel: f32, tick: f32) -> f32 {
    TwoParabolas::plan_eased(distance, approach_speed, max_accel, tick)
        .map_or(0.0, |plan| plan.accel_at(tick))
}

/// [`boost_retard`] applied to each axis independently
pub fn boost_retard_axes(offsets: Vec3, speeds: Vec3, max_accels: Vec3, tick: f32) -> Vec3 {
    Vec3::new(
        boost_retard(offsets.x, speeds.x, max_accels.x, tick),
        boost_retard(offsets.y, speeds.y, max_accels.y, tick),
        boost_retard(offsets.z, speeds.z, max_accels.z, tick),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: f32 = 1.0 / 60.0;

    /// Integrate a point driven by `boost_retard` toward `goal`
    fn settle(start: f32, speed: f32, goal: f32, frames: usize) -> (f32, f32) {
        let (mut x, mut v) = (start, speed);
        for _ in 0..frames {
            let a = boost_retard(goal - x, v, 200.0, TICK);
            v += a * TICK;
            x += v * TICK;
        }
        (x, v)
    }

    #[test]
    fn test_plan_from_rest() {
        let plan = TwoParabolas::plan(100.0, 0.0, 50.0).unwrap();
        assert_eq!(plan.accel, 50.0);
        assert!((plan.switch_time - 2f32.sqrt()).abs() < 1e-5);
        assert!((plan.stop_time - 2.0 * 2f32.sqrt()).abs() < 1e-5);

        let back = TwoParabolas::plan(-100.0, 0.0, 50.0).unwrap();
        assert_eq!(back.accel, -50.0);
        assert!((back.switch_time - plan.switch_time).abs() < 1e-6);
    }

    #[test]
    fn test_plan_covers_distance() {
        // boost then retard, integrated in closed form
        let (d, v0) = (80.0_f32, -15.0_f32);
        let plan = TwoParabolas::plan(d, v0, 40.0).unwrap();
        let (a, ts) = (plan.accel, plan.switch_time);
        let v_switch = v0 + a * ts;
        let x_switch = v0 * ts + 0.5 * a * ts * ts;
        let tr = plan.stop_time - ts;

        assert!((v_switch - a * tr).abs() < 1e-3);
        assert!((x_switch + v_switch * tr - 0.5 * a * tr * tr - d).abs() < 1e-2);
    }

    #[test]
    fn test_plan_rejects_zero_accel() {
        assert!(TwoParabolas::plan(10.0, 0.0, 0.0).is_none());
        assert!(TwoParabolas::plan(10.0, 0.0, f32::NAN).is_none());
        assert_eq!(boost_retard(0.0, 0.0, 200.0, TICK), 0.0);
    }

    #[test]
    fn test_schedule_phases() {
        let plan = TwoParabolas {
            accel: 3.0,
            switch_time: 0.5,
            stop_time: 1.0,
        };
        assert_eq!(plan.accel_at(0.1), 3.0);
        assert_eq!(plan.accel_at(0.75), -3.0);
        assert_eq!(plan.accel_at(1.5), 0.0);
    }

    #[test]
    fn test_eased_accel_never_exceeds_max() {
        for &(d, v) in &[(500.0, 0.0), (0.5, 0.0), (-40.0, 30.0), (10.0, 90.0)] {
            let plan = TwoParabolas::plan_eased(d, v, 200.0, TICK).unwrap();
            assert!(plan.accel.abs() <= 200.0);
            assert_eq!(plan.accel.is_sign_negative(), f32::is_sign_negative(d));
        }
    }

    #[test]
    fn test_controller_settles() {
        for &(start, speed) in &[(0.0, 0.0), (0.0, -80.0), (0.0, 150.0), (150.0, 0.0)] {
            let (x, v) = settle(start, speed, 100.0, 300);
            assert!((x - 100.0).abs() < 0.05, "start {start}/{speed}: x = {x}");
            assert!(v.abs() < 0.5, "start {start}/{speed}: v = {v}");
        }
    }

    #[test]
    fn test_axes_are_independent() {
        let a = boost_retard_axes(
            Vec3::new(100.0, -100.0, 0.0),
            Vec3::ZERO,
            Vec3::splat(200.0),
            TICK,
        );
        assert_eq!(a, Vec3::new(200.0, -200.0, 0.0));
    }
}
