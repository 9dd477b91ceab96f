//! Euler rotation in degrees

use crate::{Quat, Vec3};
use std::ops::{Add, Mul, Sub};

/// Pitch/yaw/roll rotation in degrees.
///
/// Pitch turns about Y (positive looks up toward +Z), yaw about Z (positive
/// turns +X toward +Y), roll about X. Applied roll first, then pitch, then yaw.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotator {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotator {
    pub const ZERO: Rotator = Rotator {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };

    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Rotation that turns +X onto `direction`, with zero roll
    pub fn from_direction(direction: Vec3) -> Self {
        let yaw = direction.y.atan2(direction.x).to_degrees();
        let pitch = direction.z.atan2(direction.length_2d()).to_degrees();
        Self::new(pitch, yaw, 0.0)
    }

    /// Map any angle into `(-180, 180]`
    pub fn normalize_axis(angle: f32) -> f32 {
        let wrapped = angle.rem_euclid(360.0);
        if wrapped > 180.0 {
            wrapped - 360.0
        } else {
            wrapped
        }
    }

    /// Copy with every axis mapped into `(-180, 180]`
    pub fn normalized(&self) -> Self {
        Self::new(
            Self::normalize_axis(self.pitch),
            Self::normalize_axis(self.yaw),
            Self::normalize_axis(self.roll),
        )
    }

    /// Axis-wise comparison modulo 360
    pub fn equals(&self, other: Rotator, tolerance: f32) -> bool {
        let d = (*self - other).normalized();
        d.pitch.abs() <= tolerance && d.yaw.abs() <= tolerance && d.roll.abs() <= tolerance
    }

    pub fn to_quat(&self) -> Quat {
        Quat::from_rotator(*self)
    }

    /// Unit vector along the rotated +X axis
    pub fn direction(&self) -> Vec3 {
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        Vec3::new(cp * cy, cp * sy, sp)
    }

    pub fn rotate_vector(&self, v: Vec3) -> Vec3 {
        self.to_quat().rotate_vec3(v)
    }

    /// Rotation equivalent to applying `first`, then `second`
    pub fn compose(first: Rotator, second: Rotator) -> Rotator {
        (second.to_quat() * first.to_quat()).to_rotator()
    }

    /// Component-wise linear interpolation of the raw angles
    pub fn lerp(&self, other: Rotator, t: f32) -> Rotator {
        *self + (other - *self) * t
    }

    /// Shortest-arc interpolation through quaternions
    pub fn slerp(&self, other: Rotator, t: f32) -> Rotator {
        self.to_quat().slerp(other.to_quat(), t).to_rotator()
    }

    /// Turn toward `target` along the shortest arc by the fraction `dt * speed`
    /// of what is left, without the gimbal lock of per-axis interpolation.
    ///
    /// A fraction at or below zero keeps `self`; at or above one returns
    /// `target` exactly.
    pub fn interp_to(&self, target: Rotator, dt: f32, speed: f32) -> Rotator {
        let alpha = dt * speed;
        if !(alpha > 0.0) {
            *self
        } else if alpha >= 1.0 {
            target
        } else {
            self.slerp(target, alpha)
        }
    }

    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite() && self.roll.is_finite()
    }
}

impl Add for Rotator {
    type Output = Rotator;

    fn add(self, rhs: Rotator) -> Rotator {
        Rotator::new(self.pitch + rhs.pitch, self.yaw + rhs.yaw, self.roll + rhs.roll)
    }
}

impl Sub for Rotator {
    type Output = Rotator;

    fn sub(self, rhs: Rotator) -> Rotator {
        Rotator::new(self.pitch - rhs.pitch, self.yaw - rhs.yaw, self.roll - rhs.roll)
    }
}

impl Mul<f32> for Rotator {
    type Output = Rotator;

    fn mul(self, rhs: f32) -> Rotator {
        Rotator::new(self.pitch * rhs, self.yaw * rhs, self.roll * rhs)
    }
}
