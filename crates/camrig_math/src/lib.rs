//! camrig math
//!
//! Small, dependency-free math layer used by the camera stick:
//!
//! - [`Vec3`], [`Quat`], [`Rotator`] and [`Transform`] in a Z-up, X-forward frame
//! - [`angle`] - signed clamping, half-range normalization, nearest equivalent
//!   angle and the exponential low-pass filter step
//! - [`interpolate`] - the [`Interpolate`] trait and ease-in-out curve
//! - [`motion`] - two-parabola boost/retard scheduling toward a goal at rest

pub mod angle;
pub mod interpolate;
pub mod motion;
mod quat;
mod rotator;
mod transform;
mod vec3;

pub use angle::{clamp_signed, clamp_signed_flagged, low_pass, nearest_equivalent, normalize_half_range};
pub use interpolate::{ease_in_out, Interpolate};
pub use motion::{boost_retard, boost_retard_axes, TwoParabolas};
pub use quat::Quat;
pub use rotator::Rotator;
pub use transform::Transform;
pub use vec3::Vec3;
