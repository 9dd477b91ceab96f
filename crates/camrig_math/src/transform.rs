//! Rigid transform (translation + rotation, no scale)

use crate::{Quat, Rotator, Vec3};

/// World or parent-relative placement of a node
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    pub fn from_parts(translation: Vec3, rotation: Rotator) -> Self {
        Self::new(translation, rotation.to_quat())
    }

    /// Local point to the space this transform lives in
    pub fn transform_position(&self, local: Vec3) -> Vec3 {
        self.rotation.rotate_vec3(local) + self.translation
    }

    /// Point in this transform's parent space back to local space
    pub fn inverse_transform_position(&self, point: Vec3) -> Vec3 {
        self.rotation.unrotate_vec3(point - self.translation)
    }

    pub fn transform_vector(&self, local: Vec3) -> Vec3 {
        self.rotation.rotate_vec3(local)
    }

    pub fn inverse_transform_vector(&self, v: Vec3) -> Vec3 {
        self.rotation.unrotate_vec3(v)
    }

    /// Placement of a child whose parent-relative transform is `local`
    pub fn compose(&self, local: &Transform) -> Transform {
        Transform {
            translation: self.transform_position(local.translation),
            rotation: self.rotation.mul(&local.rotation).normalize(),
        }
    }

    /// Turn toward `target`'s rotation by the fraction `dt * speed`, leaving
    /// the translation alone. A fraction at or above one copies `target`
    /// entirely, translation included.
    pub fn interp_rotation_to(&mut self, target: &Transform, dt: f32, speed: f32) {
        if dt * speed >= 1.0 {
            *self = *target;
        } else {
            self.rotation = self.rotation.interp_to(target.rotation, dt, speed);
        }
    }

    /// Transform that maps `world` into this transform's local space
    pub fn relative(&self, world: &Transform) -> Transform {
        Transform {
            translation: self.inverse_transform_position(world.translation),
            rotation: self.rotation.conjugate().mul(&world.rotation).normalize(),
        }
    }
}
