//! Quaternion for 3D rotations

use crate::{Rotator, Vec3};

/// Quaternion for representing 3D rotations
///
/// Quaternions avoid gimbal lock and interpolate smoothly. Composition uses
/// the Hamilton product: `a * b` applies `b` first, then `a`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Create a new quaternion
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create from a rotator: roll about X first, then pitch about Y, then yaw about Z.
    ///
    /// Positive pitch lifts the X axis toward +Z, positive yaw turns it toward +Y.
    pub fn from_rotator(rot: Rotator) -> Self {
        let (sp, cp) = (rot.pitch.to_radians() * 0.5).sin_cos();
        let (sy, cy) = (rot.yaw.to_radians() * 0.5).sin_cos();
        let (sr, cr) = (rot.roll.to_radians() * 0.5).sin_cos();

        Self {
            x: cr * sp * sy - sr * cp * cy,
            y: -cr * sp * cy - sr * cp * sy,
            z: cr * cp * sy - sr * sp * cy,
            w: cr * cp * cy + sr * sp * sy,
        }
    }

    /// Convert back to pitch/yaw/roll in degrees
    pub fn to_rotator(&self) -> Rotator {
        const SINGULARITY_THRESHOLD: f32 = 0.4999995;

        let singularity_test = self.z * self.x - self.w * self.y;
        let yaw_y = 2.0 * (self.w * self.z + self.x * self.y);
        let yaw_x = 1.0 - 2.0 * (self.y * self.y + self.z * self.z);
        let yaw = yaw_y.atan2(yaw_x).to_degrees();

        if singularity_test < -SINGULARITY_THRESHOLD {
            let roll = -yaw - 2.0 * self.x.atan2(self.w).to_degrees();
            Rotator::new(-90.0, yaw, Rotator::normalize_axis(roll))
        } else if singularity_test > SINGULARITY_THRESHOLD {
            let roll = yaw - 2.0 * self.x.atan2(self.w).to_degrees();
            Rotator::new(90.0, yaw, Rotator::normalize_axis(roll))
        } else {
            let pitch = (2.0 * singularity_test).clamp(-1.0, 1.0).asin().to_degrees();
            let roll = (-2.0 * (self.w * self.x + self.y * self.z))
                .atan2(1.0 - 2.0 * (self.x * self.x + self.y * self.y))
                .to_degrees();
            Rotator::new(pitch, yaw, roll)
        }
    }

    /// Normalize the quaternion
    pub fn normalize(&self) -> Self {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if len < 1e-6 {
            return Self::IDENTITY;
        }
        let inv_len = 1.0 / len;
        Self {
            x: self.x * inv_len,
            y: self.y * inv_len,
            z: self.z * inv_len,
            w: self.w * inv_len,
        }
    }

    /// Get the conjugate (inverse for unit quaternions)
    pub fn conjugate(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Dot product of two quaternions
    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Multiply two quaternions
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
        }
    }

    /// Rotate a vector by this quaternion
    pub fn rotate_vec3(&self, v: Vec3) -> Vec3 {
        let qv = Self::new(v.x, v.y, v.z, 0.0);
        let result = self.mul(&qv).mul(&self.conjugate());
        Vec3::new(result.x, result.y, result.z)
    }

    /// Rotate a vector by the inverse of this (unit) quaternion
    pub fn unrotate_vec3(&self, v: Vec3) -> Vec3 {
        self.conjugate().rotate_vec3(v)
    }

    /// Instance method for slerp
    pub fn slerp(&self, other: Self, t: f32) -> Self {
        Self::slerp_static(self, &other, t)
    }

    /// Spherical linear interpolation along the shortest arc
    pub fn slerp_static(a: &Quat, b: &Quat, t: f32) -> Quat {
        let mut cos_half_theta = a.dot(*b);

        // If negative dot, negate one quaternion to take shorter path
        let mut b = *b;
        if cos_half_theta < 0.0 {
            b = Self::new(-b.x, -b.y, -b.z, -b.w);
            cos_half_theta = -cos_half_theta;
        }

        // If quaternions are close, use linear interpolation
        if cos_half_theta > 0.9995 {
            return Self::new(
                a.x + t * (b.x - a.x),
                a.y + t * (b.y - a.y),
                a.z + t * (b.z - a.z),
                a.w + t * (b.w - a.w),
            )
            .normalize();
        }

        let half_theta = cos_half_theta.acos();
        let sin_half_theta = (1.0 - cos_half_theta * cos_half_theta).sqrt();

        let ratio_a = ((1.0 - t) * half_theta).sin() / sin_half_theta;
        let ratio_b = (t * half_theta).sin() / sin_half_theta;

        Self::new(
            a.x * ratio_a + b.x * ratio_b,
            a.y * ratio_a + b.y * ratio_b,
            a.z * ratio_a + b.z * ratio_b,
            a.w * ratio_a + b.w * ratio_b,
        )
    }

    /// Turn toward `target` by the fraction `dt * speed` of the remaining arc.
    ///
    /// A fraction at or below zero keeps `self`; at or above one returns `target`.
    pub fn interp_to(&self, target: Quat, dt: f32, speed: f32) -> Quat {
        let alpha = dt * speed;
        if !(alpha > 0.0) {
            *self
        } else if alpha >= 1.0 {
            target
        } else {
            self.slerp(target, alpha)
        }
    }
}

impl std::ops::Mul for Quat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Quat::mul(&self, &rhs)
    }
}
