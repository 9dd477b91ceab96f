//! Stick orbit and camera look offset
//!
//! The stick orbit turns the target (and with it the whole stick) around its
//! pivot. The look offset turns only the camera away from the target. Both
//! run either in permanent mode, where input accumulates and stays, or in
//! spring-back mode, where input picks a goal angle and releasing the stick
//! lets the angle relax back to zero.

use crate::config::{LookSettings, MoveSettings, OrbitSettings, SpringSettings};
use camrig_math::angle::{deg_acos, deg_cos};
use camrig_math::{clamp_signed, clamp_signed_flagged, low_pass, normalize_half_range, Rotator, Vec3};

/// Below this cosine the stick is too close to vertical to recompute limits
const MIN_PITCH_COS: f32 = 1e-4;

/// Yaw goal at full spring-back input
const SPRING_BACK_YAW: f32 = 180.0;
/// Pitch goal at full spring-back input, before limits
const SPRING_BACK_PITCH: f32 = 90.0;
/// Look offset goal at full spring-back input, before limits
const SPRING_BACK_LOOK: f32 = 180.0;

/// Clamp that tolerates an inverted range instead of panicking
fn clamp_range(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

/// Orbit and look state; angles in degrees
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrbitState {
    /// Stick yaw relative to `initial`
    pub yaw: f32,
    /// Stick pitch relative to `initial`
    pub pitch: f32,
    pub pitch_min: f32,
    pub pitch_max: f32,
    /// Largest absolute target pitch that keeps the zenith distance
    pub pitch_limit: f32,
    /// Target rotation the stick angles are measured from
    pub initial: Rotator,
    /// Camera deviation from looking at the target
    pub look_offset: Rotator,
}

/// Where the rest point should sit after [`resting_pose`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RestingPose {
    /// Target rotation that points the stick at the rest point
    pub target_rotation: Rotator,
    /// Stick length
    pub distance: f32,
}

/// Normalize an arbitrary rest point placement (relative to an unrotated
/// target) into a target rotation plus a stick length along -X.
///
/// The rest point is first pushed at least `zenith_limit` away from the
/// target's vertical axis; a rest point right on the axis goes to +X.
pub fn resting_pose(rest_local: Vec3, zenith_limit: f32) -> RestingPose {
    let mut rest = rest_local;
    let to_axis = rest.length_2d();

    if to_axis < zenith_limit {
        if to_axis > 0.0 {
            let factor = zenith_limit / to_axis;
            rest.x *= factor;
            rest.y *= factor;
        } else {
            rest.x = zenith_limit;
            rest.y = 0.0;
        }
    }

    RestingPose {
        target_rotation: Rotator::from_direction(-rest),
        distance: rest.length(),
    }
}

/// Drives the stick orbit, its pitch limits and the camera look offset
#[derive(Clone, Debug, Default)]
pub struct OrientationController {
    state: OrbitState,
}

impl OrientationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &OrbitState {
        &self.state
    }

    pub fn look_offset(&self) -> Rotator {
        self.state.look_offset
    }

    pub fn pitch_range(&self) -> (f32, f32) {
        (self.state.pitch_min, self.state.pitch_max)
    }

    /// Zero the stick angles and the look offset
    pub fn reset(&mut self) {
        self.state = OrbitState::default();
    }

    /// Zero the stick angles, keeping limits and look offset
    pub fn reset_stick(&mut self) {
        self.state.yaw = 0.0;
        self.state.pitch = 0.0;
    }

    /// Capture `target_rotation` as the stick origin and derive symmetric
    /// pitch limits for `distance`
    pub fn set_rotation_limits(&mut self, target_rotation: Rotator, distance: f32, zenith_limit: f32) {
        let s = &mut self.state;
        s.initial = target_rotation;
        s.pitch_limit = if distance > 0.0 {
            deg_acos(zenith_limit / distance)
        } else {
            0.0
        };
        s.pitch_min = -s.pitch_limit - s.initial.pitch;
        s.pitch_max = s.pitch_limit - s.initial.pitch;
    }

    /// Recompute the pitch limit for a new stick length.
    ///
    /// Returns the length actually usable at `target_pitch`, which may be
    /// longer than `distance` when the stick is steep, or `None` when the
    /// stick is too close to vertical, leaving the limits unchanged.
    pub fn recompute_pitch_limit(&mut self, distance: f32, target_pitch: f32, zenith_limit: f32) -> Option<f32> {
        let pcos = deg_cos(target_pitch);
        if pcos <= MIN_PITCH_COS {
            return None;
        }

        let (distance, limit) = if pcos * distance > zenith_limit {
            (distance, deg_acos(zenith_limit / distance))
        } else {
            (zenith_limit / pcos, target_pitch.abs())
        };

        // Shift by the delta so offsets left by a preset transfer survive
        let s = &mut self.state;
        let delta = limit - s.pitch_limit;
        s.pitch_min -= delta;
        s.pitch_max += delta;
        s.pitch_limit = limit;

        Some(distance)
    }

    /// Move along the stick; positive `input` moves toward the target.
    ///
    /// Returns the new stick length.
    pub fn change_distance(
        &mut self,
        input: f32,
        dt: f32,
        distance: f32,
        target_pitch: f32,
        spring: &SpringSettings,
        movement: &MoveSettings,
    ) -> f32 {
        let wanted = (input * movement.rate() * dt - distance).abs();
        let wanted = clamp_range(wanted, movement.distance_min(), movement.distance_max());

        self.recompute_pitch_limit(wanted, target_pitch, spring.zenith_limit())
            .unwrap_or(distance)
    }

    /// Apply stick input and return the new target rotation
    pub fn rotate_stick(&mut self, yaw_input: f32, pitch_input: f32, dt: f32, settings: &OrbitSettings) -> Rotator {
        let s = &mut self.state;

        if settings.permanent() {
            let step = settings.rate() * dt;
            s.yaw = normalize_half_range(s.yaw + yaw_input * step);
            s.pitch = clamp_range(s.pitch + pitch_input * step, s.pitch_min, s.pitch_max);
        } else {
            let yaw_goal = SPRING_BACK_YAW * yaw_input;
            let pitch_goal = clamp_range(SPRING_BACK_PITCH * pitch_input, s.pitch_min, s.pitch_max);
            s.yaw = low_pass(yaw_goal, s.yaw, settings.alpha());
            s.pitch = low_pass(pitch_goal, s.pitch, settings.alpha());
        }

        Rotator::new(s.pitch + s.initial.pitch, s.yaw + s.initial.yaw, 0.0)
    }

    /// Apply camera look input
    pub fn rotate_look(&mut self, yaw_input: f32, pitch_input: f32, dt: f32, settings: &LookSettings) {
        let offset = &mut self.state.look_offset;

        if settings.permanent() {
            let step = settings.rate() * dt;
            offset.yaw = accumulate(offset.yaw + yaw_input * step, settings.yaw_limit());
            offset.pitch = accumulate(offset.pitch + pitch_input * step, settings.pitch_limit());
        } else {
            let yaw_goal = clamp_signed(SPRING_BACK_LOOK * yaw_input, settings.yaw_limit());
            let pitch_goal = clamp_signed(SPRING_BACK_LOOK * pitch_input, settings.pitch_limit());
            offset.yaw = low_pass(yaw_goal, offset.yaw, settings.alpha());
            offset.pitch = low_pass(pitch_goal, offset.pitch, settings.alpha());
        }
    }

    /// Camera rotation relative to the rest point that looks at the target,
    /// then turns by the look offset.
    ///
    /// The offset is applied in a frame with the stick pitch removed, so a
    /// yaw offset swings the camera around the world vertical.
    pub fn look_at(&self, target_rotation: Rotator, camera_local: Vec3, rest_local: Vec3) -> Rotator {
        let pitch = target_rotation.pitch;
        let camera_in_target = camera_local + rest_local;

        let mut unpitched = Rotator::from_direction(Rotator::new(pitch, 0.0, 0.0).rotate_vector(-camera_in_target));
        unpitched.pitch += self.state.look_offset.pitch;
        unpitched.yaw += self.state.look_offset.yaw;

        Rotator::compose(unpitched, Rotator::new(-pitch, 0.0, 0.0))
    }
}

/// Clamp to the limit, or wrap into the half range when the limit was not hit
fn accumulate(angle: f32, limit: f32) -> f32 {
    match clamp_signed_flagged(angle, limit) {
        (clamped, true) => clamped,
        (free, false) => normalize_half_range(free),
    }
}
