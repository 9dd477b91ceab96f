//! Rig configuration
//!
//! Every runtime-tunable value of the camera stick lives here, grouped by the
//! stage that reads it. Setters clamp into the legal range, and
//! [`RigConfig::validate`] re-applies the same clamps to anything that came in
//! through serde, so a config obeys one set of invariants regardless of how it
//! was built.

use crate::error::ConfigError;
use crate::probe::TraceChannel;
use crate::transition::RotationBlend;
use serde::{Deserialize, Serialize};

/// Smallest stiffness/damping allowed; both are divisors in the spring
const MIN_DIVISOR: f32 = 1e-6;

/// Substitute for a zero or negative zenith limit
const MIN_ZENITH: f32 = 0.01;

/// Rotation rates are capped at half a turn per second
const MAX_RATE: f32 = 180.0;

fn clamp_unit(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

fn clamp_rate(v: f32) -> f32 {
    v.clamp(0.0, MAX_RATE)
}

fn clamp_divisor(v: f32) -> f32 {
    if v <= 0.0 {
        MIN_DIVISOR
    } else {
        v
    }
}

/// Store `clamp(v)` in `slot`, or keep the current value when `v` is not finite
fn assign(slot: &mut f32, field: &'static str, v: f32, clamp: impl FnOnce(f32) -> f32) {
    if v.is_finite() {
        *slot = clamp(v);
    } else {
        tracing::warn!(field, value = %v, kept = *slot, "ignoring non-finite rig setting");
    }
}

fn finite(field: &'static str, v: f32) -> Result<f32, ConfigError> {
    if v.is_finite() {
        Ok(v)
    } else {
        tracing::warn!(field, value = %v, "rejecting non-finite rig setting");
        Err(ConfigError::NonFinite { field })
    }
}

// =============================================================================
// Spring
// =============================================================================

/// Acceleration-driven shift of the camera away from its rest point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringSettings {
    max_shift: f32,
    zenith_limit: f32,
    stiffness: f32,
    damping: f32,
    alpha: f32,
}

impl Default for SpringSettings {
    fn default() -> Self {
        Self {
            max_shift: 50.0,
            zenith_limit: 20.0,
            stiffness: 10.0,
            damping: 0.33,
            alpha: 0.02,
        }
    }
}

impl SpringSettings {
    /// Largest shift the spring may request in one frame
    pub fn max_shift(&self) -> f32 {
        self.max_shift
    }

    pub fn set_max_shift(&mut self, v: f32) {
        assign(&mut self.max_shift, "spring.max_shift", v, |v| v.max(0.0));
    }

    /// Minimum horizontal distance between the camera and the target's vertical axis
    pub fn zenith_limit(&self) -> f32 {
        self.zenith_limit
    }

    pub fn set_zenith_limit(&mut self, v: f32) {
        assign(&mut self.zenith_limit, "spring.zenith_limit", v, |v| {
            if v <= 0.0 {
                MIN_ZENITH
            } else {
                v
            }
        });
    }

    pub fn stiffness(&self) -> f32 {
        self.stiffness
    }

    pub fn set_stiffness(&mut self, v: f32) {
        assign(&mut self.stiffness, "spring.stiffness", v, clamp_divisor);
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    pub fn set_damping(&mut self, v: f32) {
        assign(&mut self.damping, "spring.damping", v, clamp_divisor);
    }

    /// Low-pass factor applied to the shift step
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, v: f32) {
        assign(&mut self.alpha, "spring.alpha", v, clamp_unit);
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let mut out = Self::default();
        out.set_max_shift(finite("spring.max_shift", self.max_shift)?);
        out.set_zenith_limit(finite("spring.zenith_limit", self.zenith_limit)?);
        out.set_stiffness(finite("spring.stiffness", self.stiffness)?);
        out.set_damping(finite("spring.damping", self.damping)?);
        out.set_alpha(finite("spring.alpha", self.alpha)?);
        Ok(out)
    }
}

// =============================================================================
// Trace
// =============================================================================

/// Line-of-sight probing between the target and the camera
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    enabled: bool,
    radius: f32,
    channel: TraceChannel,
    rate: f32,
    alpha: f32,
    interval: f32,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 20.0,
            channel: TraceChannel::VISIBILITY,
            rate: 10.0,
            alpha: 0.2,
            interval: 0.085,
        }
    }
}

impl TraceSettings {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Radius of the probing sphere
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, v: f32) {
        assign(&mut self.radius, "trace.radius", v, |v| v.max(0.0));
    }

    pub fn channel(&self) -> TraceChannel {
        self.channel
    }

    pub fn set_channel(&mut self, channel: TraceChannel) {
        self.channel = channel;
    }

    /// How fast the camera slides toward a hit, per second
    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_rate(&mut self, v: f32) {
        assign(&mut self.rate, "trace.rate", v, |v| v.max(0.0));
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, v: f32) {
        assign(&mut self.alpha, "trace.alpha", v, clamp_unit);
    }

    /// Seconds between probes; zero probes every frame
    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn set_interval(&mut self, v: f32) {
        assign(&mut self.interval, "trace.interval", v, |v| v.max(0.0));
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let mut out = Self {
            enabled: self.enabled,
            channel: self.channel,
            ..Self::default()
        };
        out.set_radius(finite("trace.radius", self.radius)?);
        out.set_rate(finite("trace.rate", self.rate)?);
        out.set_alpha(finite("trace.alpha", self.alpha)?);
        out.set_interval(finite("trace.interval", self.interval)?);
        Ok(out)
    }
}

// =============================================================================
// Orbit / look
// =============================================================================

/// Stick orbit around the target
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    permanent: bool,
    rate: f32,
    alpha: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            permanent: true,
            rate: 90.0,
            alpha: 0.1,
        }
    }
}

impl OrbitSettings {
    /// `true` keeps the orbit where input left it, `false` springs back on release
    pub fn permanent(&self) -> bool {
        self.permanent
    }

    pub fn set_permanent(&mut self, permanent: bool) {
        self.permanent = permanent;
    }

    /// Degrees per second in permanent mode
    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_rate(&mut self, v: f32) {
        assign(&mut self.rate, "stick.rate", v, clamp_rate);
    }

    /// Smoothing in spring-back mode
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, v: f32) {
        assign(&mut self.alpha, "stick.alpha", v, clamp_unit);
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let mut out = Self {
            permanent: self.permanent,
            ..Self::default()
        };
        out.set_rate(finite("stick.rate", self.rate)?);
        out.set_alpha(finite("stick.alpha", self.alpha)?);
        Ok(out)
    }
}

/// Camera deviation from looking straight at the target
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookSettings {
    permanent: bool,
    rate: f32,
    alpha: f32,
    pitch_limit: f32,
    yaw_limit: f32,
}

impl Default for LookSettings {
    fn default() -> Self {
        Self {
            permanent: true,
            rate: 175.0,
            alpha: 0.1,
            pitch_limit: 360.0,
            yaw_limit: 360.0,
        }
    }
}

impl LookSettings {
    pub fn permanent(&self) -> bool {
        self.permanent
    }

    pub fn set_permanent(&mut self, permanent: bool) {
        self.permanent = permanent;
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_rate(&mut self, v: f32) {
        assign(&mut self.rate, "look.rate", v, clamp_rate);
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, v: f32) {
        assign(&mut self.alpha, "look.alpha", v, clamp_unit);
    }

    /// Largest pitch offset; anything above 180 is unlimited
    pub fn pitch_limit(&self) -> f32 {
        self.pitch_limit
    }

    pub fn set_pitch_limit(&mut self, v: f32) {
        assign(&mut self.pitch_limit, "look.pitch_limit", v, f32::abs);
    }

    /// Largest yaw offset; anything above 180 is unlimited
    pub fn yaw_limit(&self) -> f32 {
        self.yaw_limit
    }

    pub fn set_yaw_limit(&mut self, v: f32) {
        assign(&mut self.yaw_limit, "look.yaw_limit", v, f32::abs);
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let mut out = Self {
            permanent: self.permanent,
            ..Self::default()
        };
        out.set_rate(finite("look.rate", self.rate)?);
        out.set_alpha(finite("look.alpha", self.alpha)?);
        out.set_pitch_limit(finite("look.pitch_limit", self.pitch_limit)?);
        out.set_yaw_limit(finite("look.yaw_limit", self.yaw_limit)?);
        Ok(out)
    }
}

// =============================================================================
// Distance
// =============================================================================

/// Stick length and how fast it changes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveSettings {
    rate: f32,
    distance_min: f32,
    distance_max: f32,
}

impl Default for MoveSettings {
    fn default() -> Self {
        Self {
            rate: 300.0,
            distance_min: 100.0,
            distance_max: f32::MAX,
        }
    }
}

impl MoveSettings {
    /// Units per second at full distance input
    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_rate(&mut self, v: f32) {
        assign(&mut self.rate, "movement.rate", v, |v| v.max(0.0));
    }

    pub fn distance_min(&self) -> f32 {
        self.distance_min
    }

    pub fn distance_max(&self) -> f32 {
        self.distance_max
    }

    /// Set the allowed stick length. `min` is floored at zero and `max` is
    /// raised to `min` when it falls below it. `max` may be `+inf` for no
    /// upper bound; a NaN bound keeps its current value.
    pub fn set_range(&mut self, min: f32, max: f32) {
        assign(&mut self.distance_min, "movement.distance_min", min, |v| v.max(0.0));
        if max.is_nan() {
            tracing::warn!(
                field = "movement.distance_max",
                kept = self.distance_max,
                "ignoring NaN rig setting"
            );
        } else {
            self.distance_max = max.min(f32::MAX);
        }
        self.distance_max = self.distance_max.max(self.distance_min);
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let mut out = Self::default();
        out.set_rate(finite("movement.rate", self.rate)?);
        let min = finite("movement.distance_min", self.distance_min)?;
        if self.distance_max.is_nan() {
            tracing::warn!(field = "movement.distance_max", "rejecting NaN rig setting");
            return Err(ConfigError::NonFinite {
                field: "movement.distance_max",
            });
        }
        out.set_range(min, self.distance_max);
        Ok(out)
    }
}

// =============================================================================
// Rig
// =============================================================================

/// Complete configuration of a [`CameraRig`](crate::CameraRig)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub spring: SpringSettings,
    pub trace: TraceSettings,
    pub stick: OrbitSettings,
    pub look: LookSettings,
    pub movement: MoveSettings,
    transfer_duration: f32,
    pub transfer_blend: RotationBlend,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            spring: SpringSettings::default(),
            trace: TraceSettings::default(),
            stick: OrbitSettings::default(),
            look: LookSettings::default(),
            movement: MoveSettings::default(),
            transfer_duration: 1.0,
            transfer_blend: RotationBlend::default(),
        }
    }
}

impl RigConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds a preset transfer takes
    pub fn transfer_duration(&self) -> f32 {
        self.transfer_duration
    }

    pub fn set_transfer_duration(&mut self, v: f32) {
        assign(&mut self.transfer_duration, "transfer_duration", v, |v| v.max(0.0));
    }

    /// Reject non-finite values and re-apply every clamp.
    ///
    /// `movement.distance_max` may be `+inf`, which is stored as `f32::MAX`.
    pub fn validate(self) -> Result<RigConfig, ConfigError> {
        let mut out = RigConfig {
            spring: self.spring.validated()?,
            trace: self.trace.validated()?,
            stick: self.stick.validated()?,
            look: self.look.validated()?,
            movement: self.movement.validated()?,
            transfer_duration: 0.0,
            transfer_blend: self.transfer_blend,
        };
        out.set_transfer_duration(finite("transfer_duration", self.transfer_duration)?);
        Ok(out)
    }

    /// Parse and validate a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<RigConfig, ConfigError> {
        let config: RigConfig = serde_json::from_str(json)?;
        config.validate()
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
